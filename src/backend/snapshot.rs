use super::{PageElement, RenderingBackend};
use crate::error::BackendError;
use crate::locator::FieldSelector;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;

/// Offline backend serving pre-rendered HTML.
///
/// Only CSS selectors are supported. Elements are either present or not, so
/// waits return immediately.
#[derive(Debug, Default)]
pub struct SnapshotBackend {
    pages: HashMap<String, String>,
    failures_left: HashMap<String, usize>,
    visits: HashMap<String, usize>,
    current: Option<String>,
}

impl SnapshotBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Make the next `failures` navigations to `url` fail
    pub fn with_failures(mut self, url: &str, failures: usize) -> Self {
        self.failures_left.insert(url.to_string(), failures);
        self
    }

    /// Number of navigation attempts made to `url`
    pub fn visits(&self, url: &str) -> usize {
        self.visits.get(url).copied().unwrap_or(0)
    }
}

/// Visible text of an element with whitespace collapsed
fn visible_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl RenderingBackend for SnapshotBackend {
    async fn navigate(&mut self, url: &str) -> Result<(), BackendError> {
        *self.visits.entry(url.to_string()).or_default() += 1;

        if let Some(left) = self.failures_left.get_mut(url) {
            if *left > 0 {
                *left -= 1;
                return Err(BackendError::Navigation {
                    url: url.to_string(),
                    reason: "simulated failure".to_string(),
                });
            }
        }

        match self.pages.get(url) {
            Some(html) => {
                self.current = Some(html.clone());
                Ok(())
            }
            None => {
                self.current = None;
                Err(BackendError::Navigation {
                    url: url.to_string(),
                    reason: "no snapshot for this URL".to_string(),
                })
            }
        }
    }

    async fn wait_for_elements(
        &mut self,
        selector: &FieldSelector,
        _timeout: Duration,
    ) -> Result<Vec<PageElement>, BackendError> {
        let css = match selector {
            FieldSelector::Css(css) => css,
            FieldSelector::XPath(_) => {
                return Err(BackendError::UnsupportedSelector(selector.to_string()));
            }
        };
        let parsed = Selector::parse(css)
            .map_err(|e| BackendError::UnsupportedSelector(format!("{}: {}", css, e)))?;

        let html = self
            .current
            .as_deref()
            .ok_or_else(|| BackendError::Command("no page loaded".to_string()))?;
        let doc = Html::parse_document(html);

        let elements = doc
            .select(&parsed)
            .map(|e| PageElement {
                text: visible_text(e),
                href: e.value().attr("href").map(|s| s.to_string()),
            })
            .collect::<Vec<_>>();

        if elements.is_empty() {
            return Err(BackendError::Timeout {
                selector: selector.to_string(),
            });
        }
        Ok(elements)
    }
}
