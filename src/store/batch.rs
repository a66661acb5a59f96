use crate::error::StoreError;
use crate::fingerprint::{Fingerprint, FingerprintIndex};
use crate::results::{ExtractedArticle, StoredArticle};
use crate::utils::{load_json_array, write_json_atomic};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Append-only output file for one destination.
///
/// Entries are kept verbatim so appending never rewrites or drops what
/// earlier runs stored. Only well-formed entries take part in title dedup.
#[derive(Debug)]
pub struct PersistedBatch {
    path: PathBuf,
    entries: Vec<Value>,
    titles: FingerprintIndex,
    writable: bool,
}

impl PersistedBatch {
    /// Loads the batch at `path`; missing or corrupt files load as empty
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let loaded = load_json_array(&path);
        let entries = loaded.entries;
        let mut titles = FingerprintIndex::new();

        for (i, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<StoredArticle>(entry.clone()) {
                Ok(stored) => {
                    let article = ExtractedArticle::from(stored);
                    titles.insert_with(article.title_fingerprint, &article.title);
                }
                Err(e) => {
                    ::log::warn!(
                        "Malformed entry {} in {} excluded from dedup: {}",
                        i,
                        path.display(),
                        e
                    );
                }
            }
        }

        Self {
            path,
            entries,
            titles,
            writable: loaded.writable,
        }
    }

    /// True if an entry with this fingerprint and exactly this title exists
    pub fn contains_title(&self, title: &str, fp: &Fingerprint) -> bool {
        self.titles.contains_with(fp, title)
    }

    /// Appends `articles` in order and rewrites the file. Does nothing for an
    /// empty slice.
    pub fn append(&mut self, articles: &[ExtractedArticle]) -> Result<(), StoreError> {
        if articles.is_empty() {
            return Ok(());
        }
        if !self.writable {
            return Err(StoreError::Unwritable(self.path.clone()));
        }

        // Only commit to memory once the file holds the same entries
        let mut next = self.entries.clone();
        for article in articles {
            next.push(serde_json::to_value(article)?);
        }
        write_json_atomic(&self.path, &next, true)?;

        self.entries = next;
        for article in articles {
            self.titles.insert_with(article.title_fingerprint, &article.title);
        }

        ::log::info!(
            "Appended {} articles to {} ({} total)",
            articles.len(),
            self.path.display(),
            self.entries.len()
        );
        Ok(())
    }

    /// Number of stored entries, malformed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use std::fs;

    fn article(title: &str) -> ExtractedArticle {
        ExtractedArticle::new(title.into(), "body".into(), "2024-01-01".into())
    }

    #[test]
    fn test_append_preserves_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.json");
        fs::write(
            &path,
            r#"[{"title":"Old","content":"c","time":"t"},{"title":"broken"}]"#,
        )
        .unwrap();

        let mut batch = PersistedBatch::open(&path);
        assert!(batch.contains_title("Old", &fingerprint("Old")));
        assert!(!batch.contains_title("broken", &fingerprint("broken")));

        batch.append(&[article("New")]).unwrap();

        let stored: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0]["title"], "Old");
        assert_eq!(stored[1]["title"], "broken");
        assert_eq!(stored[2]["title"], "New");
        assert_eq!(stored[2]["title_fingerprint"], fingerprint("New").to_hex());
    }

    #[test]
    fn test_title_match_needs_full_string() {
        let dir = tempfile::tempdir().unwrap();
        let mut batch = PersistedBatch::open(dir.path().join("x.json"));
        batch.append(&[article("T1")]).unwrap();

        let fp = fingerprint("T1");
        assert!(batch.contains_title("T1", &fp));
        assert!(!batch.contains_title("T2", &fp));
    }

    #[test]
    fn test_empty_append_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        let mut batch = PersistedBatch::open(&path);

        batch.append(&[]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_write_leaves_batch_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.json");
        let mut batch = PersistedBatch::open(&path);

        // A directory where the temp file goes makes the write fail
        let tmp = dir.path().join("house.json.tmp");
        fs::create_dir(&tmp).unwrap();
        assert!(batch.append(&[article("A")]).is_err());
        assert!(!batch.contains_title("A", &fingerprint("A")));
        assert!(batch.is_empty());

        fs::remove_dir(&tmp).unwrap();
        batch.append(&[article("B")]).unwrap();

        let stored: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["title"], "B");
    }

    #[test]
    fn test_non_utf8_file_survives_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.json");
        let original = b"[{\"title\":\"\xff\xfe\",\"content\":\"c\",\"time\":\"t\"}]".to_vec();
        fs::write(&path, &original).unwrap();

        let mut batch = PersistedBatch::open(&path);
        assert!(batch.is_empty());
        batch.append(&[article("New")]).unwrap();

        assert_eq!(fs::read(dir.path().join("house.json.corrupt")).unwrap(), original);
        let stored: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["title"], "New");
    }

    #[test]
    fn test_refuses_to_overwrite_stuck_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.json");
        fs::write(&path, "{").unwrap();
        let aside = dir.path().join("house.json.corrupt");
        fs::create_dir(&aside).unwrap();
        fs::write(aside.join("keep"), "x").unwrap();

        let mut batch = PersistedBatch::open(&path);
        assert!(matches!(
            batch.append(&[article("New")]),
            Err(StoreError::Unwritable(_))
        ));
        assert!(!batch.contains_title("New", &fingerprint("New")));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{");
    }
}
