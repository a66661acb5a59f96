use serde::{Deserialize, Serialize};
use std::fmt;

/// A single element selector, either XPath or CSS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSelector {
    XPath(String),
    Css(String),
}

impl FieldSelector {
    pub fn xpath(s: &str) -> Self {
        FieldSelector::XPath(s.to_string())
    }

    pub fn css(s: &str) -> Self {
        FieldSelector::Css(s.to_string())
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::XPath(s) => write!(f, "xpath:{}", s),
            FieldSelector::Css(s) => write!(f, "css:{}", s),
        }
    }
}

/// Named bundle of title, body and time selectors.
///
/// Schemas are tried in the order they are configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorSchema {
    /// Identifier used for burn tracking and logs
    pub name: String,

    /// First match is the title
    pub title: FieldSelector,

    /// All matches are concatenated in document order
    pub content: FieldSelector,

    /// First match is the publication time
    pub time: FieldSelector,
}

impl LocatorSchema {
    pub fn new(name: &str, title: FieldSelector, content: FieldSelector, time: FieldSelector) -> Self {
        Self {
            name: name.to_string(),
            title,
            content,
            time,
        }
    }
}

/// Schemas for udn.com article pages
pub fn default_schemas() -> Vec<LocatorSchema> {
    vec![LocatorSchema::new(
        "default",
        FieldSelector::xpath(r#"//h1[@class="article-content__title"]"#),
        FieldSelector::xpath(
            r#"//section[@class="article-content__editor"]/p | //section[@class="article-content__editor "]/p"#,
        ),
        FieldSelector::xpath(r#"//time[@class="article-content__time"]"#),
    )]
}
