//! Extraction pipeline
//!
//! Links are processed one at a time against a single backend session:
//!
//! ```text
//! Pending -> Fetching -> FetchFailed                (retry next run)
//!                     -> Fetched -> Extracting -> NotFound
//!                                              -> Extracted -> Duplicate
//!                                                           -> Accepted
//! ```

use crate::backend::RenderingBackend;
use crate::config::{HarvestConfig, NotFoundPolicy};
use crate::extractor::{self, BurnedSchemas, DEFAULT_FIELD_TIMEOUT, Extraction};
use crate::locator::LocatorSchema;
use crate::results::ExtractedArticle;
use crate::store::DedupStore;
use std::time::Duration;

/// Bounded retry for page navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Terminal state of one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Every navigation attempt failed; eligible for a future run
    FetchFailed,
    /// Page loaded but no schema matched
    NotFound,
    /// Title already stored for this destination
    Duplicate,
    /// Article stored
    Accepted,
    /// Article could not be written; eligible for a future run
    StoreFailed,
}

/// Per-run tally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub candidates: usize,
    /// Already crawled, or repeated within the batch
    pub skipped: usize,
    pub fetch_failed: usize,
    pub not_found: usize,
    pub duplicate: usize,
    pub accepted: usize,
    pub store_failed: usize,
}

impl RunReport {
    fn count(&mut self, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::FetchFailed => self.fetch_failed += 1,
            LinkOutcome::NotFound => self.not_found += 1,
            LinkOutcome::Duplicate => self.duplicate += 1,
            LinkOutcome::Accepted => self.accepted += 1,
            LinkOutcome::StoreFailed => self.store_failed += 1,
        }
    }
}

/// Articles accepted by a run, in acceptance order, plus the tally
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub articles: Vec<ExtractedArticle>,
    pub report: RunReport,
}

/// Orchestrates fetch, extraction and dedup over a batch of links
#[derive(Debug, Clone)]
pub struct Pipeline {
    schemas: Vec<LocatorSchema>,
    field_timeout: Duration,
    retry: RetryPolicy,
    not_found_policy: NotFoundPolicy,
}

impl Pipeline {
    /// Create a pipeline with default timeouts and policies
    pub fn new(schemas: Vec<LocatorSchema>) -> Self {
        Self {
            schemas,
            field_timeout: DEFAULT_FIELD_TIMEOUT,
            retry: RetryPolicy::default(),
            not_found_policy: NotFoundPolicy::default(),
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(config.locators.clone())
            .with_field_timeout(config.field_timeout())
            .with_retry(RetryPolicy {
                max_attempts: config.fetch.max_attempts,
                delay: config.fetch.retry_delay(),
            })
            .with_not_found_policy(config.not_found_policy)
    }

    pub fn with_field_timeout(mut self, timeout: Duration) -> Self {
        self.field_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found_policy = policy;
        self
    }

    /// Processes `candidate_links` and stores new articles under `destination`.
    ///
    /// Never fails: every per-link problem is logged and the link skipped.
    pub async fn run<B: RenderingBackend, S: AsRef<str>>(
        &self,
        backend: &mut B,
        store: &mut DedupStore,
        candidate_links: &[S],
        destination: &str,
    ) -> RunOutput {
        let new_links = store.filter_new(candidate_links);
        let mut output = RunOutput::default();
        output.report.candidates = candidate_links.len();
        output.report.skipped = candidate_links.len() - new_links.len();

        ::log::info!(
            "{} of {} links for {} are new",
            new_links.len(),
            candidate_links.len(),
            destination
        );

        for link in &new_links {
            let (outcome, article) = self.process_link(backend, store, link, destination).await;
            output.report.count(outcome);
            if let Some(article) = article {
                output.articles.push(article);
            }
        }

        ::log::info!("Run for {} finished: {:?}", destination, output.report);
        output
    }

    async fn process_link<B: RenderingBackend>(
        &self,
        backend: &mut B,
        store: &mut DedupStore,
        link: &str,
        destination: &str,
    ) -> (LinkOutcome, Option<ExtractedArticle>) {
        if !self.fetch(backend, link).await {
            ::log::error!("Giving up on {} after {} attempts", link, self.retry.max_attempts);
            return (LinkOutcome::FetchFailed, None);
        }

        let mut burned = BurnedSchemas::new();
        let extraction =
            extractor::extract(backend, &self.schemas, &mut burned, self.field_timeout).await;

        let (outcome, article, record) = match extraction {
            Extraction::NotFound => {
                ::log::info!("No article extractable from {}", link);
                let record = self.not_found_policy == NotFoundPolicy::RecordCrawled;
                (LinkOutcome::NotFound, None, record)
            }
            Extraction::Extracted { article, schema } => {
                ::log::debug!("Extracted {} with schema {}", link, schema);
                if store.is_duplicate_title(&article.title, &article.title_fingerprint, destination) {
                    ::log::info!("Duplicate title in {}: {}", destination, article.title);
                    (LinkOutcome::Duplicate, None, true)
                } else {
                    match store.append_articles(destination, std::slice::from_ref(&article)) {
                        Ok(()) => (LinkOutcome::Accepted, Some(article), true),
                        Err(e) => {
                            // Leave the link unrecorded so the article is fetched again
                            ::log::error!("Failed to store article from {}: {}", link, e);
                            (LinkOutcome::StoreFailed, None, false)
                        }
                    }
                }
            }
        };

        if record {
            if let Err(e) = store.record_crawled(link) {
                ::log::error!("Failed to record {} as crawled: {}", link, e);
            }
        }

        (outcome, article)
    }

    /// Navigates to `link`, retrying with a fixed delay
    async fn fetch<B: RenderingBackend>(&self, backend: &mut B, link: &str) -> bool {
        for attempt in 1..=self.retry.max_attempts {
            match backend.navigate(link).await {
                Ok(()) => return true,
                Err(e) => {
                    ::log::warn!(
                        "Attempt {}/{} to load {} failed: {}",
                        attempt,
                        self.retry.max_attempts,
                        link,
                        e
                    );
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }
        false
    }
}
