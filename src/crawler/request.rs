//! Crawl requests and their labels

use std::fmt;

/// Which handler processes a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// The provider index page; fans out into provider requests
    Discovery,

    /// A single provider's documentation page
    Provider,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Provider => write!(f, "provider"),
        }
    }
}

/// Provider identity carried from discovery to the provider handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderContext {
    /// Stable identifier taken from the last URL path segment
    pub slug: String,

    /// Link text from the index page, or the slug when that was empty
    pub display_name: String,
}

/// A page to fetch, and how to handle it
///
/// Requests are immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub url: String,
    pub label: Label,
    pub context: Option<ProviderContext>,
}

impl CrawlRequest {
    /// The seed request for the provider index page
    pub fn discovery(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: Label::Discovery,
            context: None,
        }
    }

    /// A request for one provider page
    pub fn provider(url: impl Into<String>, context: ProviderContext) -> Self {
        Self {
            url: url.into(),
            label: Label::Provider,
            context: Some(context),
        }
    }

    /// Slug of the provider this request targets, if any
    pub fn slug(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.slug.as_str())
    }
}
