//! Page router: dispatches fetched pages to discovery or provider handling
//!
//! Discovery reads the provider index and produces one provider request per
//! provider link. Provider handling runs the table extractor and produces at
//! most one `ProviderData`. Neither handler fails: anything unusable becomes
//! an empty fan-out or a skip outcome.

use crate::crawler::request::{CrawlRequest, Label, ProviderContext};
use crate::extract::extract_capabilities;
use crate::snapshot::ProviderData;
use chrono::Utc;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Result of handling a provider page
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// The capability table produced at least one model
    Scraped(ProviderData),

    /// The page has no table at all
    NoTable,

    /// A table was found but yielded zero model rows
    NoModels,
}

/// What the router decided for a fetched page
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Discovery output: requests to add to the frontier
    Enqueue(Vec<CrawlRequest>),

    /// Provider output
    Provider(ProviderOutcome),
}

/// Dispatches a fetched page by the request's label
///
/// # Arguments
///
/// * `request` - The request that produced the page
/// * `html` - The page body
/// * `page_url` - The final URL of the page, used to resolve relative links
/// * `index_path` - Path prefix under which provider pages live
pub fn route(request: &CrawlRequest, html: &str, page_url: &Url, index_path: &str) -> Routed {
    match request.label {
        Label::Discovery => Routed::Enqueue(discover_providers(html, page_url, index_path)),
        Label::Provider => Routed::Provider(scrape_provider(html, request)),
    }
}

/// Extracts one provider request per provider link on the index page
///
/// # Link Rules
///
/// - Only `<a href>` links on the same origin as the index page
/// - Path must lie under `index_path/`; the index page's own link is skipped
/// - Slug is the final path segment; links ending in `/` yield no slug and are skipped
/// - First link per slug wins; later duplicates are dropped
/// - Display name is the trimmed link text, or the slug when the text is empty
pub fn discover_providers(html: &str, page_url: &Url, index_path: &str) -> Vec<CrawlRequest> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let index_path = index_path.trim_end_matches('/');
    let prefix = format!("{}/", index_path);

    let mut seen = HashSet::new();
    let mut requests = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(mut target) = resolve_link(href, page_url) else {
            continue;
        };

        if target.origin() != page_url.origin() || !target.path().starts_with(&prefix) {
            continue;
        }

        let slug = match target.path().rsplit('/').next() {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => continue,
        };

        if !seen.insert(slug.clone()) {
            continue;
        }

        let text = element.text().collect::<String>();
        let text = text.trim();
        let display_name = if text.is_empty() {
            slug.clone()
        } else {
            text.to_string()
        };

        target.set_fragment(None);
        target.set_query(None);

        requests.push(CrawlRequest::provider(
            target.to_string(),
            ProviderContext { slug, display_name },
        ));
    }

    requests
}

/// Resolves a link href against the page URL
///
/// Returns None for empty, fragment-only, or non-HTTP(S) links.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}

/// Extracts provider data from a provider page
pub fn scrape_provider(html: &str, request: &CrawlRequest) -> ProviderOutcome {
    let Some(table) = extract_capabilities(html) else {
        return ProviderOutcome::NoTable;
    };

    if table.is_empty() {
        return ProviderOutcome::NoModels;
    }

    let (slug, display_name) = match &request.context {
        Some(ctx) => (ctx.slug.clone(), ctx.display_name.clone()),
        None => {
            // Provider requests always carry context; fall back to the URL
            let slug = request
                .url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            (slug.clone(), slug)
        }
    };

    ProviderOutcome::Scraped(ProviderData {
        provider: slug,
        display_name,
        url: request.url.clone(),
        columns: table.columns,
        models: table.models,
        scraped_at: Utc::now(),
    })
}
