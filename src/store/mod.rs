//! Dedup store
//!
//! Two namespaces, both monotonically growing:
//! - crawled links, one JSON array shared by every destination
//! - article titles, scoped to the output file of each destination
//!
//! State is read once, mutated in memory and written back in full after
//! every change. This is only safe with a single writer: two processes
//! sharing the same files will race and lose entries.

pub mod batch;
pub mod links;

pub use batch::PersistedBatch;
pub use links::CrawledLinks;

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use crate::results::ExtractedArticle;
use crate::utils::destination_path;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct DedupStore {
    links: CrawledLinks,
    output_dir: PathBuf,
    /// Keyed by file path, so destinations that sanitize alike share one batch
    batches: HashMap<PathBuf, PersistedBatch>,
}

impl DedupStore {
    /// Opens the store. Missing or corrupt files are treated as empty.
    pub fn open(links_path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            links: CrawledLinks::open(links_path),
            output_dir: output_dir.as_ref().to_path_buf(),
            batches: HashMap::new(),
        }
    }

    pub fn is_crawled(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Records `link` as crawled, writing through to disk
    pub fn record_crawled(&mut self, link: &str) -> Result<(), StoreError> {
        self.links.record(link)
    }

    /// Candidates not yet crawled. Callers should not rely on the order.
    pub fn filter_new<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        self.links.filter_new(candidates)
    }

    /// True if `destination` already stores an article with this title
    pub fn is_duplicate_title(&mut self, title: &str, fp: &Fingerprint, destination: &str) -> bool {
        self.batch(destination).contains_title(title, fp)
    }

    /// Appends accepted articles to the output of `destination`
    pub fn append_articles(
        &mut self,
        destination: &str,
        articles: &[ExtractedArticle],
    ) -> Result<(), StoreError> {
        self.batch(destination).append(articles)
    }

    /// Output file backing `destination`
    pub fn destination_path(&self, destination: &str) -> PathBuf {
        destination_path(&self.output_dir, destination)
    }

    pub fn crawled_links(&self) -> &CrawledLinks {
        &self.links
    }

    /// Batch for `destination`, loaded on first use
    pub fn batch(&mut self, destination: &str) -> &mut PersistedBatch {
        let path = destination_path(&self.output_dir, destination);
        self.batches
            .entry(path)
            .or_insert_with_key(|path| PersistedBatch::open(path))
    }
}
