//! Table extractor for provider pages
//!
//! This module locates the model-capability table in a provider page and
//! decodes it into capability columns and per-model flags. Markup varies from
//! page to page, so location is a chain of strategies ([`TableLocator`]) and
//! decoding tolerates missing sections, empty headers and ragged rows.

mod locate;
mod table;

pub use locate::{
    default_locators, find_capabilities_table, locate_table, FirstTableLocator,
    HeadingTableLocator, TableLocator, CAPABILITIES_HEADING,
};
pub use table::{parse_capabilities_table, TableData};

use scraper::Html;

/// Extracts the capability table from an HTML page
///
/// # Returns
///
/// * `Some(TableData)` - A table was located (it may still hold zero models)
/// * `None` - The page contains no table at all
///
/// # Example
///
/// ```
/// use capability_registry::extract::extract_capabilities;
///
/// let html = r#"<table>
///     <thead><tr><th>Model</th><th>Vision</th><th>Tools</th></tr></thead>
///     <tbody><tr><td><code>gpt-4</code></td><td><svg></svg></td><td></td></tr></tbody>
/// </table>"#;
///
/// let data = extract_capabilities(html).unwrap();
/// assert_eq!(data.columns, vec!["Vision", "Tools"]);
/// assert_eq!(data.models[0].model, "gpt-4");
/// assert!(data.models[0].supports("Vision"));
/// assert!(!data.models[0].supports("Tools"));
/// ```
pub fn extract_capabilities(html: &str) -> Option<TableData> {
    let document = Html::parse_document(html);
    find_capabilities_table(&document).map(parse_capabilities_table)
}
