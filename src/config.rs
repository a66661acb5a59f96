use crate::error::ConfigError;
use crate::locator::{LocatorSchema, default_schemas};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory holding one output file per destination
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// JSON array of links already crawled
    #[serde(default = "default_crawled_links_path")]
    pub crawled_links_path: PathBuf,

    /// `key=value` file with annotation service credentials
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Bounded wait for each article field, in seconds
    #[serde(default = "default_field_timeout_secs")]
    pub field_timeout_secs: u64,

    /// Page fetch retry policy
    #[serde(default)]
    pub fetch: FetchConfig,

    /// What to do with a link whose page loaded but matched no schema
    #[serde(default)]
    pub not_found_policy: NotFoundPolicy,

    /// Locator schemas in fallback order
    #[serde(default = "default_schemas")]
    pub locators: Vec<LocatorSchema>,

    /// Annotation service settings
    #[serde(default)]
    pub annotation: AnnotationConfig,

    /// Index pages to harvest
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// Retry policy for page navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

/// Handling of links that loaded but yielded no article
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Never fetch the link again
    #[default]
    RecordCrawled,
    /// Try the link again on the next run
    LeaveUnrecorded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_annotation_endpoint")]
    pub endpoint: String,
}

/// One index page and where its articles go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Page listing article links
    pub index_url: String,

    /// Selector for the article links on the index page
    pub link_locator: crate::locator::FieldSelector,

    /// Output key, also the file stem under `data_dir`
    pub destination: String,

    /// Maximum number of links taken from the index page
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Whether links may leave the index page's domain
    #[serde(default)]
    pub allow_external: bool,

    /// Regex patterns for links to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for links to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl HarvestConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locators.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one locator schema is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for schema in &self.locators {
            if !names.insert(schema.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate locator schema name: {}",
                    schema.name
                )));
            }
        }

        if self.fetch.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "fetch.max_attempts must be at least 1".to_string(),
            ));
        }

        for target in &self.targets {
            if target.destination.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "target {} has an empty destination",
                    target.index_url
                )));
            }
        }

        Ok(())
    }

    pub fn field_timeout(&self) -> Duration {
        Duration::from_secs(self.field_timeout_secs)
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            data_dir: default_data_dir(),
            crawled_links_path: default_crawled_links_path(),
            credentials_path: default_credentials_path(),
            field_timeout_secs: default_field_timeout_secs(),
            fetch: FetchConfig::default(),
            not_found_policy: NotFoundPolicy::default(),
            locators: default_schemas(),
            annotation: AnnotationConfig::default(),
            targets: Vec::new(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_annotation_endpoint(),
        }
    }
}

impl TargetConfig {
    pub fn new(index_url: &str, link_locator: crate::locator::FieldSelector, destination: &str) -> Self {
        Self {
            index_url: index_url.to_string(),
            link_locator,
            destination: destination.to_string(),
            limit: default_limit(),
            allow_external: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_crawled_links_path() -> PathBuf {
    PathBuf::from("config/crawled_links.json")
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("config/account.info")
}

fn default_field_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_annotation_endpoint() -> String {
    "https://api.droidtown.co/Articut/API/".to_string()
}
