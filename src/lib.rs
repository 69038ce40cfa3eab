//! Capability Registry: a crawler for model-capability tables
//!
//! This crate discovers provider documentation pages from a single index page,
//! extracts each provider's model-capability table, and writes the combined
//! result as one versioned JSON snapshot.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod snapshot;

use thiserror::Error;

/// Main error type for run-level failures
///
/// Per-page problems never surface here; they are absorbed by the crawler and
/// recorded in the [`crawler::CrawlReport`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Discovery failed for {url} after {attempts} attempt(s): {source}")]
    DiscoveryFailed {
        url: String,
        attempts: u32,
        source: FetchError,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure of a single page fetch
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },
}

impl FetchError {
    /// Returns true if another attempt could succeed
    ///
    /// Timeouts, network errors and non-success statuses are transient.
    /// A non-HTML response is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotHtml { .. })
    }
}

/// Snapshot persistence errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlReport, Coordinator};
pub use extract::{extract_capabilities, TableData};
pub use snapshot::{ModelCapability, ProviderData, ProviderSummary, RegistryData};
