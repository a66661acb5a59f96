//! Rendering backends
//!
//! The extraction core only needs two operations from a browser: load a URL
//! and wait for elements matching a selector. [`WebDriverBackend`] provides
//! them over a live WebDriver session; [`SnapshotBackend`] evaluates CSS
//! selectors against HTML held in memory.

pub mod snapshot;
pub mod webdriver;

pub use snapshot::SnapshotBackend;
pub use webdriver::WebDriverBackend;

use crate::error::BackendError;
use crate::locator::FieldSelector;
use std::time::Duration;

/// Snapshot of one matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    /// Visible text as reported by the backend
    pub text: String,

    /// `href` attribute, if the element has one
    pub href: Option<String>,
}

impl PageElement {
    pub fn new(text: impl Into<String>, href: Option<String>) -> Self {
        Self {
            text: text.into(),
            href,
        }
    }
}

/// A page-rendering session. One navigation at a time.
pub trait RenderingBackend {
    /// Load `url`, replacing the current page
    async fn navigate(&mut self, url: &str) -> Result<(), BackendError>;

    /// Wait up to `timeout` for at least one element matching `selector` on
    /// the current page, then return every match in document order.
    ///
    /// Returns [`BackendError::Timeout`] when nothing matched in time.
    async fn wait_for_elements(
        &mut self,
        selector: &FieldSelector,
        timeout: Duration,
    ) -> Result<Vec<PageElement>, BackendError>;
}
