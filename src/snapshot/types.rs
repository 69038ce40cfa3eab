//! Snapshot data model
//!
//! These types serialize to the JSON layout the query API reads, with
//! camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Capability flags for a single model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapability {
    /// Model name/identifier (never empty)
    pub model: String,

    /// Column name -> supported flag. Columns the row had no cell for are absent.
    pub capabilities: BTreeMap<String, bool>,
}

impl ModelCapability {
    /// Returns true if the model is marked as supporting `column`
    ///
    /// Absent keys read as unsupported.
    pub fn supports(&self, column: &str) -> bool {
        self.capabilities.get(column).copied().unwrap_or(false)
    }
}

/// Everything scraped from one provider page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderData {
    /// Provider slug (e.g. "openai")
    pub provider: String,

    /// Display name (e.g. "OpenAI")
    pub display_name: String,

    /// Source URL
    pub url: String,

    /// Capability columns in table order
    pub columns: Vec<String>,

    /// Models in table row order; duplicates are kept
    pub models: Vec<ModelCapability>,

    pub scraped_at: DateTime<Utc>,
}

/// Root of the persisted snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryData {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    /// Sorted by display name, case-insensitively
    pub providers: Vec<ProviderData>,
}

/// Per-provider summary served by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub provider: String,
    pub display_name: String,
    pub model_count: usize,
    pub columns: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

impl From<&ProviderData> for ProviderSummary {
    fn from(data: &ProviderData) -> Self {
        Self {
            provider: data.provider.clone(),
            display_name: data.display_name.clone(),
            model_count: data.models.len(),
            columns: data.columns.clone(),
            scraped_at: data.scraped_at,
        }
    }
}

impl RegistryData {
    /// Looks up a provider by slug
    pub fn find_provider(&self, slug: &str) -> Option<&ProviderData> {
        self.providers.iter().find(|p| p.provider == slug)
    }

    /// Summaries of every provider, in snapshot order
    pub fn summaries(&self) -> Vec<ProviderSummary> {
        self.providers.iter().map(ProviderSummary::from).collect()
    }

    /// Slugs of every provider, in snapshot order
    pub fn provider_slugs(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider.as_str()).collect()
    }

    /// Total number of model rows across all providers
    pub fn model_count(&self) -> usize {
        self.providers.iter().map(|p| p.models.len()).sum()
    }
}
