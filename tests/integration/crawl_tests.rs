//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock documentation sites and run the
//! full discovery -> scrape -> snapshot cycle end-to-end.

use capability_registry::config::{Config, CrawlerConfig, OutputConfig, SourceConfig};
use capability_registry::crawler::{run_crawl, Coordinator, RequestOutcome, SkipReason};
use capability_registry::snapshot::{load_snapshot, write_snapshot, RegistryData};
use capability_registry::RegistryError;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const INDEX_PATH: &str = "/providers/ai-sdk-providers";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, snapshot_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrency: 5,
            max_retries: 2,
            request_timeout_secs: 5,
            retry_delay_ms: 10, // Very short for testing
        },
        source: SourceConfig {
            base_url: base_url.to_string(),
            index_path: INDEX_PATH.to_string(),
        },
        output: OutputConfig {
            snapshot_path: snapshot_path.to_path_buf(),
        },
        ..Config::default()
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

fn index_page(links: &[(&str, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(slug, name)| format!(r#"<a href="{}/{}">{}</a>"#, INDEX_PATH, slug, name))
        .collect();
    format!(
        r#"<html><body><nav><a href="{}">All providers</a>{}</nav></body></html>"#,
        INDEX_PATH, anchors
    )
}

/// A provider page with a capability table; `rows` are (model, [supported...])
fn provider_page(columns: &[&str], rows: &[(&str, &[bool])]) -> String {
    let header: String = columns.iter().map(|c| format!("<th>{}</th>", c)).collect();
    let body: String = rows
        .iter()
        .map(|(model, flags)| {
            let cells: String = flags
                .iter()
                .map(|f| {
                    if *f {
                        r#"<td><svg viewBox="0 0 24 24"><path d="M5 13l4 4L19 7"/></svg></td>"#
                    } else {
                        "<td></td>"
                    }
                })
                .collect();
            format!("<tr><td><code>{}</code></td>{}</tr>", model, cells)
        })
        .collect();

    format!(
        r#"<html><body>
        <h2>Setup</h2><p>Install the package.</p>
        <h2>Model Capabilities</h2>
        <table><thead><tr><th>Model</th>{}</tr></thead><tbody>{}</tbody></table>
        </body></html>"#,
        header, body
    )
}

async fn mount_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Mounts a site with three providers: two with tables, one without
async fn mount_standard_site(server: &MockServer) {
    mount_page(
        server,
        INDEX_PATH,
        html(index_page(&[
            ("openai", "OpenAI"),
            ("anthropic", "Anthropic"),
            ("openai", "OpenAI again"),
            ("deepinfra", "DeepInfra"),
        ])),
    )
    .await;

    mount_page(
        server,
        &format!("{}/openai", INDEX_PATH),
        html(provider_page(
            &["Image Input", "Tool Usage"],
            &[("gpt-4o", &[true, true]), ("o1-mini", &[false, true])],
        )),
    )
    .await;

    mount_page(
        server,
        &format!("{}/anthropic", INDEX_PATH),
        html(provider_page(
            &["Image Input", "Reasoning"],
            &[("claude-3-7-sonnet", &[true, true])],
        )),
    )
    .await;

    mount_page(
        server,
        &format!("{}/deepinfra", INDEX_PATH),
        html("<html><body><p>See the DeepInfra docs.</p></body></html>"),
    )
    .await;
}

fn without_timestamps(snapshot: &RegistryData) -> Value {
    let mut value = serde_json::to_value(snapshot).expect("serialize snapshot");
    value
        .as_object_mut()
        .expect("snapshot object")
        .remove("updatedAt");
    for provider in value["providers"].as_array_mut().expect("providers array") {
        provider
            .as_object_mut()
            .expect("provider object")
            .remove("scrapedAt");
    }
    value
}

#[tokio::test]
async fn test_full_crawl_writes_sorted_snapshot() {
    let mock_server = MockServer::start().await;
    mount_standard_site(&mock_server).await;

    let dir = TempDir::new().expect("temp dir");
    let snapshot_path = dir.path().join("data").join("data.json");
    let config = create_test_config(&mock_server.uri(), &snapshot_path);

    let run = run_crawl(config).await.expect("Crawl failed");

    // deepinfra has no table and is absent rather than empty
    assert_eq!(run.snapshot.provider_slugs(), vec!["anthropic", "openai"]);
    assert_eq!(run.snapshot.version, 1);

    let openai = run.snapshot.find_provider("openai").expect("openai scraped");
    assert_eq!(openai.display_name, "OpenAI");
    assert_eq!(openai.columns, vec!["Image Input", "Tool Usage"]);
    assert_eq!(openai.models.len(), 2);
    assert!(openai.models[1].supports("Tool Usage"));
    assert!(!openai.models[1].supports("Image Input"));
    assert_eq!(
        openai.url,
        format!("{}{}/openai", mock_server.uri(), INDEX_PATH)
    );

    // What was returned is what was written
    let stored = load_snapshot(&snapshot_path)
        .expect("read snapshot")
        .expect("snapshot exists");
    assert_eq!(stored, run.snapshot);

    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(raw["providers"][1]["displayName"], "OpenAI");
    assert_eq!(
        raw["providers"][1]["models"][0]["capabilities"]["Image Input"],
        true
    );

    let skipped: Vec<_> = run
        .records
        .iter()
        .filter(|r| matches!(r.outcome, RequestOutcome::Skipped(SkipReason::NoTable)))
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].slug.as_deref(), Some("deepinfra"));
}

#[tokio::test]
async fn test_duplicate_provider_links_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX_PATH,
        html(index_page(&[("groq", "Groq"), ("groq", "Groq"), ("groq", "")])),
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/groq", INDEX_PATH)))
        .respond_with(html(provider_page(&["Tools"], &[("llama-3", &[true])])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));

    let report = Coordinator::new(config)
        .unwrap()
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.providers_discovered(), 1);
    assert_eq!(report.providers.len(), 1);
}

#[tokio::test]
async fn test_unreachable_provider_does_not_abort_run() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX_PATH,
        html(index_page(&[
            ("openai", "OpenAI"),
            ("broken", "Broken"),
            ("anthropic", "Anthropic"),
        ])),
    )
    .await;
    mount_page(
        &mock_server,
        &format!("{}/openai", INDEX_PATH),
        html(provider_page(&["Tools"], &[("gpt-4o", &[true])])),
    )
    .await;
    mount_page(
        &mock_server,
        &format!("{}/anthropic", INDEX_PATH),
        html(provider_page(&["Tools"], &[("claude-3-opus", &[true])])),
    )
    .await;

    // First attempt plus two retries
    Mock::given(method("GET"))
        .and(path(format!("{}/broken", INDEX_PATH)))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));

    let run = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(run.snapshot.provider_slugs(), vec!["anthropic", "openai"]);

    let failed: Vec<_> = run
        .records
        .iter()
        .filter(|r| r.outcome.is_failure())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].slug.as_deref(), Some("broken"));
    assert!(matches!(
        failed[0].outcome,
        RequestOutcome::Failed { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_transient_failure_recovers_on_retry() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, INDEX_PATH, html(index_page(&[("flaky", "Flaky")]))).await;

    // Fails once, then serves the page
    Mock::given(method("GET"))
        .and(path(format!("{}/flaky", INDEX_PATH)))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        &format!("{}/flaky", INDEX_PATH),
        html(provider_page(&["Vision"], &[("flaky-1", &[true])])),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));

    let run = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(run.snapshot.provider_slugs(), vec!["flaky"]);
}

#[tokio::test]
async fn test_non_html_provider_is_not_retried() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, INDEX_PATH, html(index_page(&[("pdf", "PDF")]))).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/pdf", INDEX_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));

    let run = run_crawl(config).await.expect("Crawl failed");

    assert!(run.snapshot.providers.is_empty());
    assert!(run.records.iter().any(|r| matches!(
        r.outcome,
        RequestOutcome::Failed { attempts: 1, .. }
    )));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX_PATH,
        html(index_page(&[("slow", "Slow"), ("fast", "Fast")])),
    )
    .await;
    mount_page(
        &mock_server,
        &format!("{}/slow", INDEX_PATH),
        html(provider_page(&["Tools"], &[("slow-1", &[true])]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_page(
        &mock_server,
        &format!("{}/fast", INDEX_PATH),
        html(provider_page(&["Tools"], &[("fast-1", &[true])])),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));
    config.crawler.request_timeout_secs = 1;
    config.crawler.max_retries = 0;

    let run = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(run.snapshot.provider_slugs(), vec!["fast"]);
    assert!(run.records.iter().any(|r| r.slug.as_deref() == Some("slow")
        && matches!(r.outcome, RequestOutcome::Failed { .. })));
}

#[tokio::test]
async fn test_discovery_failure_fails_run_and_keeps_previous_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("data.json");

    // A snapshot from an earlier, successful run
    let previous = capability_registry::snapshot::build_snapshot(Vec::new());
    write_snapshot(&snapshot_path, &previous).unwrap();
    let before = std::fs::read_to_string(&snapshot_path).unwrap();

    let config = create_test_config(&mock_server.uri(), &snapshot_path);
    let result = run_crawl(config).await;

    match result {
        Err(RegistryError::DiscoveryFailed { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected discovery failure, got {:?}", other.map(|r| r.snapshot)),
    }

    let after = std::fs::read_to_string(&snapshot_path).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_index_without_providers_writes_empty_snapshot() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX_PATH,
        html("<html><body><p>Providers coming soon.</p></body></html>"),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("data.json");
    let config = create_test_config(&mock_server.uri(), &snapshot_path);

    let run = run_crawl(config).await.expect("Crawl failed");

    assert!(run.snapshot.providers.is_empty());
    assert!(load_snapshot(&snapshot_path).unwrap().is_some());
}

#[tokio::test]
async fn test_repeated_runs_differ_only_in_timestamps() {
    let mock_server = MockServer::start().await;
    mount_standard_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));

    let first = run_crawl(config.clone()).await.expect("First crawl failed");
    let second = run_crawl(config).await.expect("Second crawl failed");

    assert_eq!(
        without_timestamps(&first.snapshot),
        without_timestamps(&second.snapshot)
    );
}

#[tokio::test]
async fn test_single_worker_drains_frontier() {
    let mock_server = MockServer::start().await;
    mount_standard_site(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));
    config.crawler.max_concurrency = 1;

    let run = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(run.snapshot.provider_slugs(), vec!["anthropic", "openai"]);
    // Discovery plus three distinct providers
    assert_eq!(run.records.len(), 4);
}

/// Serves a provider page after a delay and logs when each request arrived
struct SlowProviderPage {
    body: String,
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for SlowProviderPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        html(self.body.clone()).set_delay(self.delay)
    }
}

/// Largest number of arrivals within any window shorter than one response
///
/// A worker cannot send its next request before its previous response
/// arrived, so this is bounded by the number of requests in flight.
fn peak_overlap(arrivals: &[Instant], window: Duration) -> usize {
    arrivals
        .iter()
        .map(|end| {
            arrivals
                .iter()
                .filter(|t| *t <= end && end.duration_since(**t) < window)
                .count()
        })
        .max()
        .unwrap_or(0)
}

#[tokio::test]
async fn test_in_flight_requests_bounded_by_max_concurrency() {
    let mock_server = MockServer::start().await;

    let slugs: Vec<String> = (0..10).map(|i| format!("provider-{:02}", i)).collect();
    let links: Vec<(&str, &str)> = slugs.iter().map(|s| (s.as_str(), s.as_str())).collect();
    mount_page(&mock_server, INDEX_PATH, html(index_page(&links))).await;

    let delay = Duration::from_millis(300);
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .and(path_regex(r"^/providers/ai-sdk-providers/provider-\d+$"))
        .respond_with(SlowProviderPage {
            body: provider_page(&["Tools"], &[("m1", &[true])]),
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .expect(10)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));
    config.crawler.max_concurrency = 3;

    let run = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(run.snapshot.providers.len(), 10);

    let arrivals = arrivals.lock().unwrap().clone();
    let peak = peak_overlap(&arrivals, delay / 2);
    assert!(peak <= 3, "{} provider requests overlapped", peak);
    assert!(peak > 1, "provider pages were fetched one at a time");
}

#[tokio::test]
async fn test_provider_pages_requested_after_discovery() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        INDEX_PATH,
        html(index_page(&[("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]))
            .set_delay(Duration::from_millis(100)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/providers/ai-sdk-providers/[a-d]$"))
        .respond_with(html(provider_page(&["Tools"], &[("m1", &[true])])))
        .expect(4)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("data.json"));

    let run = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(run.snapshot.provider_slugs(), vec!["a", "b", "c", "d"]);

    let received = mock_server.received_requests().await.expect("request recording");
    let paths: Vec<&str> = received.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths[0], INDEX_PATH);
    assert_eq!(paths.len(), 5);
    assert!(paths[1..].iter().all(|p| p.starts_with(INDEX_PATH) && *p != INDEX_PATH));
}
