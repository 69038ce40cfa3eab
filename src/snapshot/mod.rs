//! Snapshot module: the single persisted artifact of a crawl
//!
//! This module handles:
//! - The snapshot data model (`RegistryData` and friends)
//! - Building a sorted, versioned snapshot from per-provider results
//! - Atomic persistence and the read side used by the query API

mod store;
mod types;

pub use store::{load_snapshot, write_snapshot};
pub use types::{ModelCapability, ProviderData, ProviderSummary, RegistryData, SNAPSHOT_VERSION};

use chrono::Utc;
use std::cmp::Ordering;

/// Builds a snapshot from the collected provider results
///
/// Providers are ordered by display name, case-insensitively. Every call
/// produces a complete snapshot; nothing is merged with earlier runs.
pub fn build_snapshot(providers: impl IntoIterator<Item = ProviderData>) -> RegistryData {
    let mut providers: Vec<ProviderData> = providers.into_iter().collect();
    providers.sort_by(compare_providers);

    RegistryData {
        version: SNAPSHOT_VERSION,
        updated_at: Utc::now(),
        providers,
    }
}

/// Case-insensitive display-name order
///
/// Ties fall back to the exact display name and then the slug, so the order
/// is total and does not depend on the order providers finished in.
fn compare_providers(a: &ProviderData, b: &ProviderData) -> Ordering {
    compare_display_names(&a.display_name, &b.display_name)
        .then_with(|| a.provider.cmp(&b.provider))
}

fn compare_display_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
