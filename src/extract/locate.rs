//! Table location strategies
//!
//! Each locator either finds a table or reports nothing; [`find_capabilities_table`]
//! tries them in priority order and takes the first hit.

use scraper::{ElementRef, Html, Selector};

/// Phrase that marks the capability section heading
pub const CAPABILITIES_HEADING: &str = "Model Capabilities";

/// A strategy for picking the capability table out of a document
pub trait TableLocator: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Returns the table this strategy selects, if any
    fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>>;
}

/// First table after an `<h2>`/`<h3>` whose text contains a phrase
///
/// The phrase match is case-sensitive. Only the first matching heading is
/// considered. The table does not need to
/// be a sibling of the heading; any table later in document order counts.
#[derive(Debug, Clone)]
pub struct HeadingTableLocator {
    phrase: String,
}

impl HeadingTableLocator {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }

    fn is_matching_heading(&self, element: &ElementRef<'_>) -> bool {
        matches!(element.value().name(), "h2" | "h3")
            && element
                .text()
                .collect::<String>()
                .contains(&self.phrase)
    }
}

impl Default for HeadingTableLocator {
    fn default() -> Self {
        Self::new(CAPABILITIES_HEADING)
    }
}

impl TableLocator for HeadingTableLocator {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let mut heading_seen = false;

        // Pre-order traversal is document order
        for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
            if heading_seen {
                if element.value().name() == "table" {
                    return Some(element);
                }
            } else if self.is_matching_heading(&element) {
                heading_seen = true;
            }
        }

        None
    }
}

/// The first table anywhere in the document
#[derive(Debug, Clone, Default)]
pub struct FirstTableLocator;

impl TableLocator for FirstTableLocator {
    fn name(&self) -> &'static str {
        "first-table"
    }

    fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let selector = Selector::parse("table").ok()?;
        document.select(&selector).next()
    }
}

/// The standard locator chain: capability heading first, then any table
pub fn default_locators() -> Vec<Box<dyn TableLocator>> {
    vec![
        Box::new(HeadingTableLocator::default()),
        Box::new(FirstTableLocator),
    ]
}

/// Runs `locators` in order and returns the first table found
pub fn locate_table<'a>(
    document: &'a Html,
    locators: &[Box<dyn TableLocator>],
) -> Option<ElementRef<'a>> {
    locators.iter().find_map(|locator| {
        let table = locator.locate(document);
        if table.is_some() {
            tracing::trace!("Table located by '{}' strategy", locator.name());
        }
        table
    })
}

/// Finds the capability table using the standard locator chain
pub fn find_capabilities_table(document: &Html) -> Option<ElementRef<'_>> {
    locate_table(document, &default_locators())
}
