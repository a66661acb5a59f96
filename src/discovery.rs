use crate::backend::RenderingBackend;
use crate::config::TargetConfig;
use crate::filter::LinkFilter;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Collects candidate article links from a target's index page.
///
/// Links come back in document order, resolved against the index URL,
/// without fragments or repeats, and truncated to the target's limit. Any
/// failure is logged and yields whatever was collected so far.
pub async fn discover_links<B: RenderingBackend>(
    backend: &mut B,
    target: &TargetConfig,
    timeout: Duration,
) -> Vec<String> {
    let index_url = match Url::parse(&target.index_url) {
        Ok(url) => url,
        Err(e) => {
            ::log::error!("Invalid index URL {}: {}", target.index_url, e);
            return Vec::new();
        }
    };

    let filter = match LinkFilter::for_target(&index_url, target) {
        Ok(filter) => filter,
        Err(e) => {
            ::log::error!("Invalid link pattern for {}: {}", target.index_url, e);
            return Vec::new();
        }
    };

    if let Err(e) = backend.navigate(index_url.as_str()).await {
        ::log::error!("Failed to load index page {}: {}", index_url, e);
        return Vec::new();
    }

    let elements = match backend.wait_for_elements(&target.link_locator, timeout).await {
        Ok(elements) => elements,
        Err(e) => {
            ::log::warn!("No links matching {} on {}: {}", target.link_locator, index_url, e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for href in elements.iter().filter_map(|e| e.href.as_deref()) {
        if links.len() >= target.limit {
            break;
        }

        let Ok(resolved) = index_url.join(href) else {
            ::log::debug!("Unresolvable link {} on {}", href, index_url);
            continue;
        };
        if !filter.accepts(&resolved) {
            ::log::debug!("Link filter rejected: {}", resolved);
            continue;
        }

        let normalized = filter.normalize(&resolved).to_string();
        if seen.insert(normalized.clone()) {
            links.push(normalized);
        }
    }

    ::log::info!("Found {} links on {}", links.len(), index_url);
    links
}
