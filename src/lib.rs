// Re-export modules
pub mod annotate;
pub mod backend;
pub mod config;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod fingerprint;
pub mod locator;
pub mod pipeline;
pub mod results;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use pipeline::{Pipeline, RunOutput};
pub use results::ExtractedArticle;
pub use store::DedupStore;

use annotate::Annotator;
use backend::RenderingBackend;
use config::TargetConfig;
use serde_json::Value;
use std::time::Duration;

/// Outcome of harvesting one target
#[derive(Debug, Default)]
pub struct TargetHarvest {
    /// Newly accepted articles and the run tally
    pub run: RunOutput,

    /// One annotation per accepted article, in the same order
    pub annotations: Vec<Result<Value, error::AnnotationError>>,
}

/// Discovers links on `target`'s index page, extracts new articles from
/// them and, if an annotator is given, annotates each accepted body.
pub async fn harvest_target<B: RenderingBackend, A: Annotator>(
    backend: &mut B,
    store: &mut DedupStore,
    pipeline: &Pipeline,
    target: &TargetConfig,
    discovery_timeout: Duration,
    annotator: Option<&A>,
) -> TargetHarvest {
    ::log::info!("Harvesting {} into {}", target.index_url, target.destination);

    let links = discovery::discover_links(backend, target, discovery_timeout).await;
    let run = pipeline.run(backend, store, &links, &target.destination).await;

    let mut annotations = Vec::new();
    if let Some(annotator) = annotator {
        for article in &run.articles {
            let result = annotator.annotate(&article.content).await;
            if let Err(e) = &result {
                ::log::error!("Annotation failed for '{}': {}", article.title, e);
            }
            annotations.push(result);
        }
    }

    TargetHarvest { run, annotations }
}
