use crate::config::TargetConfig;
use regex::Regex;
use url::Url;

/// Decides which discovered article links are worth extracting
#[derive(Debug)]
pub struct LinkFilter {
    /// Domain the links must stay on, unless external links are allowed
    required_domain: Option<String>,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a filter scoped to `index_url`
    pub fn new(
        index_url: &Url,
        allow_external: bool,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Self, regex::Error> {
        let mut include_regexes = Vec::with_capacity(include_patterns.len());
        for pattern in include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        // Media and web assets are never articles
        let mut exclude_regexes =
            vec![Regex::new(r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf)$")?];
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        let required_domain = if allow_external {
            None
        } else {
            index_url.domain().map(|d| d.to_string())
        };

        Ok(Self {
            required_domain,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Create the filter described by a target
    pub fn for_target(index_url: &Url, target: &TargetConfig) -> Result<Self, regex::Error> {
        Self::new(
            index_url,
            target.allow_external,
            &target.include_patterns,
            &target.exclude_patterns,
        )
    }

    /// Determine if a link should be extracted
    pub fn accepts(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if let Some(required) = &self.required_domain {
            if url.domain() != Some(required.as_str()) {
                return false;
            }
        }

        // Exclusions take precedence
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|r| r.is_match(url_str))
    }

    /// Drop the fragment so `#comments` variants dedup to one link
    pub fn normalize(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
