use crate::fingerprint::{Fingerprint, fingerprint};
use serde::{Deserialize, Serialize};

/// An article pulled from a page by one locator schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArticle {
    /// Text of the first title match
    pub title: String,

    /// Concatenated text of all body matches
    pub content: String,

    /// Text of the first time match
    pub time: String,

    /// Fingerprint of `title`
    pub title_fingerprint: Fingerprint,
}

impl ExtractedArticle {
    /// Create an article, deriving the title fingerprint
    pub fn new(title: String, content: String, time: String) -> Self {
        let title_fingerprint = fingerprint(&title);
        Self {
            title,
            content,
            time,
            title_fingerprint,
        }
    }
}

/// Article as stored in an output file. Older files may lack the fingerprint.
#[derive(Debug, Deserialize)]
pub(crate) struct StoredArticle {
    pub title: String,
    pub content: String,
    pub time: String,
    #[serde(default)]
    pub title_fingerprint: Option<Fingerprint>,
}

impl From<StoredArticle> for ExtractedArticle {
    fn from(stored: StoredArticle) -> Self {
        let title_fingerprint = stored
            .title_fingerprint
            .unwrap_or_else(|| fingerprint(&stored.title));
        Self {
            title: stored.title,
            content: stored.content,
            time: stored.time,
            title_fingerprint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_order() {
        let article = ExtractedArticle::new("T1".into(), "C1".into(), "2024-01-01".into());
        let json = serde_json::to_string(&article).unwrap();
        assert!(json.starts_with(r#"{"title":"T1","content":"C1","time":"2024-01-01","title_fingerprint":""#));
        assert!(json.contains(&fingerprint("T1").to_hex()));
    }

    #[test]
    fn test_stored_article_without_fingerprint() {
        let stored: StoredArticle =
            serde_json::from_str(r#"{"title":"T","content":"C","time":"t"}"#).unwrap();
        let article = ExtractedArticle::from(stored);
        assert_eq!(article.title_fingerprint, fingerprint("T"));
    }

    #[test]
    fn test_stored_article_rejects_missing_fields() {
        let parsed = serde_json::from_str::<StoredArticle>(r#"{"title":"T","time":"t"}"#);
        assert!(parsed.is_err());
    }
}
