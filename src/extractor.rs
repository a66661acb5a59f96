//! Field extraction with schema fallback
//!
//! Each [`LocatorSchema`] is tried in configured order against the page the
//! backend currently shows. The first schema that resolves a non-empty
//! title, body and time wins. A schema that fails is burned for the rest of
//! the session and never tried again in it.

use crate::backend::RenderingBackend;
use crate::error::BackendError;
use crate::locator::{FieldSelector, LocatorSchema};
use crate::results::ExtractedArticle;
use std::collections::HashSet;
use std::time::Duration;

/// Default bounded wait for each field
pub const DEFAULT_FIELD_TIMEOUT: Duration = Duration::from_secs(10);

/// Schemas known to have failed within one extraction session
#[derive(Debug, Default, Clone)]
pub struct BurnedSchemas(HashSet<String>);

impl BurnedSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn burn(&mut self, name: &str) {
        self.0.insert(name.to_string());
    }

    pub fn is_burned(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of running the extractor on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// All three fields resolved under the named schema
    Extracted {
        article: ExtractedArticle,
        schema: String,
    },
    /// Every remaining schema failed
    NotFound,
}

/// Why one schema could not be applied
#[derive(Debug)]
enum SchemaMismatch {
    Backend(&'static str, BackendError),
    Empty(&'static str),
}

impl std::fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaMismatch::Backend(field, e) => write!(f, "{} field: {}", field, e),
            SchemaMismatch::Empty(field) => write!(f, "{} field resolved to empty text", field),
        }
    }
}

/// Extracts an article from the current page.
///
/// Burned schemas are skipped; schemas that fail here are added to `burned`.
pub async fn extract<B: RenderingBackend>(
    backend: &mut B,
    schemas: &[LocatorSchema],
    burned: &mut BurnedSchemas,
    timeout: Duration,
) -> Extraction {
    for schema in schemas {
        if burned.is_burned(&schema.name) {
            ::log::debug!("Skipping burned locator schema: {}", schema.name);
            continue;
        }

        ::log::debug!("Trying locator schema: {}", schema.name);
        match apply_schema(backend, schema, timeout).await {
            Ok(article) => {
                return Extraction::Extracted {
                    article,
                    schema: schema.name.clone(),
                };
            }
            Err(mismatch) => {
                ::log::warn!("Locator schema {} failed: {}", schema.name, mismatch);
                burned.burn(&schema.name);
            }
        }
    }

    ::log::info!("No locator schema matched this page");
    Extraction::NotFound
}

async fn apply_schema<B: RenderingBackend>(
    backend: &mut B,
    schema: &LocatorSchema,
    timeout: Duration,
) -> Result<ExtractedArticle, SchemaMismatch> {
    let title = first_text(backend, &schema.title, timeout, "title").await?;

    let content = backend
        .wait_for_elements(&schema.content, timeout)
        .await
        .map_err(|e| SchemaMismatch::Backend("content", e))?
        .into_iter()
        .map(|e| e.text)
        .collect::<String>();
    if content.trim().is_empty() {
        return Err(SchemaMismatch::Empty("content"));
    }

    let time = first_text(backend, &schema.time, timeout, "time").await?;

    Ok(ExtractedArticle::new(title, content, time))
}

async fn first_text<B: RenderingBackend>(
    backend: &mut B,
    selector: &FieldSelector,
    timeout: Duration,
    field: &'static str,
) -> Result<String, SchemaMismatch> {
    let elements = backend
        .wait_for_elements(selector, timeout)
        .await
        .map_err(|e| SchemaMismatch::Backend(field, e))?;

    match elements.into_iter().next() {
        Some(element) if !element.text.trim().is_empty() => Ok(element.text),
        _ => Err(SchemaMismatch::Empty(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SnapshotBackend;
    use crate::fingerprint::fingerprint;

    const ARTICLE: &str = r#"<html><body>
        <h2 class="headline">T1</h2>
        <div class="body"><p>Part one.</p><p>Part two.</p></div>
        <span class="date">2024-01-01</span>
        <h1 class="empty"></h1>
    </body></html>"#;

    fn schema(name: &str, title: &str) -> LocatorSchema {
        LocatorSchema::new(
            name,
            FieldSelector::css(title),
            FieldSelector::css("div.body p"),
            FieldSelector::css("span.date"),
        )
    }

    async fn backend() -> SnapshotBackend {
        let mut backend = SnapshotBackend::new().with_page("https://a/1", ARTICLE);
        backend.navigate("https://a/1").await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_falls_back_to_next_schema() {
        let mut backend = backend().await;
        let schemas = vec![schema("a", "h1.missing"), schema("b", "h2.headline")];
        let mut burned = BurnedSchemas::new();

        let result = extract(&mut backend, &schemas, &mut burned, Duration::ZERO).await;

        let Extraction::Extracted { article, schema } = result else {
            panic!("expected an article");
        };
        assert_eq!(schema, "b");
        assert_eq!(article.title, "T1");
        assert_eq!(article.content, "Part one.Part two.");
        assert_eq!(article.time, "2024-01-01");
        assert_eq!(article.title_fingerprint, fingerprint("T1"));
        assert!(burned.is_burned("a"));
        assert!(!burned.is_burned("b"));
    }

    #[tokio::test]
    async fn test_empty_field_burns_schema() {
        let mut backend = backend().await;
        let schemas = vec![schema("empty", "h1.empty")];
        let mut burned = BurnedSchemas::new();

        let result = extract(&mut backend, &schemas, &mut burned, Duration::ZERO).await;

        assert_eq!(result, Extraction::NotFound);
        assert!(burned.is_burned("empty"));
    }

    #[tokio::test]
    async fn test_burned_schema_is_not_retried() {
        let mut backend = backend().await;
        let schemas = vec![schema("good", "h2.headline")];
        let mut burned = BurnedSchemas::new();
        burned.burn("good");

        let result = extract(&mut backend, &schemas, &mut burned, Duration::ZERO).await;
        assert_eq!(result, Extraction::NotFound);
    }

    #[tokio::test]
    async fn test_first_matching_schema_wins() {
        let mut backend = backend().await;
        let schemas = vec![schema("first", "h2.headline"), schema("second", "h2")];
        let mut burned = BurnedSchemas::new();

        let result = extract(&mut backend, &schemas, &mut burned, Duration::ZERO).await;
        assert!(matches!(result, Extraction::Extracted { ref schema, .. } if schema == "first"));
        assert!(burned.is_empty());
    }
}
