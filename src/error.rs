use thiserror::Error;

/// Failures reported by a rendering backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Could not load the requested page
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// No matching element appeared within the allotted wait
    #[error("timed out waiting for {selector}")]
    Timeout { selector: String },

    /// The browser session went away
    #[error("browser session lost: {0}")]
    Session(String),

    /// The backend cannot evaluate this kind of selector
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),

    /// Any other driver-level command failure
    #[error("backend command failed: {0}")]
    Command(String),
}

/// Failures reading or writing persisted state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file was corrupt at load and could not be moved aside
    #[error("refusing to overwrite unmoved corrupt file {}", .0.display())]
    Unwritable(std::path::PathBuf),
}

/// Failures loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures calling the annotation service
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("annotation service returned {status}: {body}")]
    Status { status: u16, body: String },
}
