use crate::error::StoreError;
use crate::fingerprint::FingerprintIndex;
use crate::utils::{load_json_array, write_json_atomic};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Persistent set of links already crawled, stored as a JSON array of strings
#[derive(Debug)]
pub struct CrawledLinks {
    path: PathBuf,
    /// Insertion order, as written to disk
    links: Vec<String>,
    index: FingerprintIndex,
    writable: bool,
}

impl CrawledLinks {
    /// Loads the set from `path`; missing or corrupt files load as empty
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut links = Vec::new();
        let mut index = FingerprintIndex::new();
        let loaded = load_json_array(&path);

        for entry in loaded.entries {
            match entry {
                Value::String(link) => {
                    if index.insert(&link) {
                        links.push(link);
                    }
                }
                other => {
                    ::log::warn!("Ignoring non-string entry in {}: {}", path.display(), other);
                }
            }
        }

        ::log::debug!("Loaded {} crawled links from {}", links.len(), path.display());
        Self {
            path,
            links,
            index,
            writable: loaded.writable,
        }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.index.contains(link)
    }

    /// Records `link` and rewrites the file. On error nothing is recorded.
    pub fn record(&mut self, link: &str) -> Result<(), StoreError> {
        if !self.writable {
            return Err(StoreError::Unwritable(self.path.clone()));
        }
        if self.contains(link) {
            return write_json_atomic(&self.path, &self.links, false);
        }

        self.links.push(link.to_string());
        if let Err(e) = write_json_atomic(&self.path, &self.links, false) {
            self.links.pop();
            return Err(e);
        }
        self.index.insert(link);
        Ok(())
    }

    /// Links not yet recorded, in input order with repeats removed
    pub fn filter_new<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| !self.contains(c))
            .filter(|c| seen.insert(*c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_record_then_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawled_links.json");
        let mut links = CrawledLinks::open(&path);

        links.record("https://a/1").unwrap();

        assert!(links.contains("https://a/1"));
        assert!(links.filter_new(&["https://a/1"]).is_empty());
        assert_eq!(links.filter_new(&["https://a/2"]), vec!["https://a/2"]);
    }

    #[test]
    fn test_record_is_idempotent_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawled_links.json");
        let mut links = CrawledLinks::open(&path);

        links.record("https://a/1").unwrap();
        links.record("https://a/1").unwrap();
        links.record("https://a/2").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"["https://a/1","https://a/2"]"#
        );

        let reopened = CrawledLinks::open(&path);
        assert_eq!(reopened.len(), 2);
        assert!(reopened.contains("https://a/2"));
    }

    #[test]
    fn test_filter_new_drops_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let mut links = CrawledLinks::open(dir.path().join("l.json"));
        links.record("https://a/1").unwrap();

        let fresh = links.filter_new(&["https://a/3", "https://a/1", "https://a/2", "https://a/3"]);
        assert_eq!(fresh, vec!["https://a/3", "https://a/2"]);
    }

    #[test]
    fn test_skips_non_string_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l.json");
        fs::write(&path, r#"["https://a/1", 42, null]"#).unwrap();

        let links = CrawledLinks::open(&path);
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://a/1"));
    }

    #[test]
    fn test_failed_write_records_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawled_links.json");
        let mut links = CrawledLinks::open(&path);
        links.record("https://a/1").unwrap();

        let tmp = dir.path().join("crawled_links.json.tmp");
        fs::create_dir(&tmp).unwrap();
        assert!(links.record("https://a/2").is_err());
        assert!(!links.contains("https://a/2"));
        assert_eq!(links.len(), 1);

        fs::remove_dir(&tmp).unwrap();
        links.record("https://a/3").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"["https://a/1","https://a/3"]"#
        );
    }

    #[test]
    fn test_refuses_to_overwrite_stuck_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawled_links.json");
        fs::write(&path, [b'[', 0xff, b']']).unwrap();
        let aside = dir.path().join("crawled_links.json.corrupt");
        fs::create_dir(&aside).unwrap();
        fs::write(aside.join("keep"), "x").unwrap();

        let mut links = CrawledLinks::open(&path);
        assert!(links.is_empty());
        assert!(matches!(
            links.record("https://a/1"),
            Err(StoreError::Unwritable(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), vec![b'[', 0xff, b']']);
    }
}
