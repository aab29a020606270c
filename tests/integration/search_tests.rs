//! Integration tests for the search
//!
//! These tests use wiremock to serve the crawled pages and a temporary SQLite
//! crawl database as the inventory, then run the full search path end-to-end.

use rusqlite::Connection;
use std::path::Path;
use sumi_lens::config::{load_config, Config};
use sumi_lens::inventory::{Inventory, SqliteInventory};
use sumi_lens::output::{format_json_report, write_markdown_report, Notification, SearchView};
use sumi_lens::search::{event_channel, HttpPageFetcher, SearchEvent};
use sumi_lens::{
    Orchestrator, SearchError, SearchPlugin, SearchReport, SearchSession, SearchState,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CRAWL_TABLES: &str = "
    CREATE TABLE pages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL UNIQUE,
        domain TEXT NOT NULL,
        state TEXT NOT NULL,
        title TEXT,
        status_code INTEGER,
        content_type TEXT,
        error_message TEXT
    );
    CREATE TABLE links (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        from_page_id INTEGER NOT NULL REFERENCES pages(id),
        to_page_id INTEGER NOT NULL REFERENCES pages(id)
    );
";

/// A crawled page as the crawler would have recorded it
struct CrawledPage<'a> {
    path: &'a str,
    title: Option<&'a str>,
    status_code: u16,
    content_type: &'a str,
}

impl<'a> CrawledPage<'a> {
    fn html(path: &'a str, title: &'a str) -> Self {
        Self {
            path,
            title: Some(title),
            status_code: 200,
            content_type: "text/html; charset=utf-8",
        }
    }
}

fn create_crawl_database(db_path: &Path, base_url: &str, pages: &[CrawledPage<'_>]) {
    let conn = Connection::open(db_path).expect("Failed to create crawl database");
    conn.execute_batch(CRAWL_TABLES)
        .expect("Failed to create crawl tables");

    for page in pages {
        conn.execute(
            "INSERT INTO pages (url, domain, state, title, status_code, content_type)
             VALUES (?1, '127.0.0.1', 'processed', ?2, ?3, ?4)",
            rusqlite::params![
                format!("{}{}", base_url, page.path),
                page.title,
                page.status_code,
                page.content_type
            ],
        )
        .expect("Failed to insert page");
    }
}

fn write_config(dir: &Path, db_path: &Path, batch_size: usize) -> Config {
    let config_path = dir.join("lens.toml");
    let content = format!(
        r#"
[search]
batch-size = {batch_size}

[fetcher]
timeout-secs = 5
connect-timeout-secs = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[inventory]
database-path = "{}"
"#,
        db_path.display()
    );
    std::fs::write(&config_path, content).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}

fn build_plugin(config: &Config) -> SearchPlugin<HttpPageFetcher> {
    let inventory = SqliteInventory::open(Path::new(&config.inventory.database_path))
        .expect("Failed to open crawl database");
    let fetcher = HttpPageFetcher::from_config(&config.user_agent, &config.fetcher)
        .expect("Failed to build fetcher");
    let orchestrator = Orchestrator::new(fetcher).with_batch_size(config.search.batch_size);

    let mut plugin = SearchPlugin::new(orchestrator, Box::new(inventory));
    plugin.on_load();
    plugin
}

async fn serve_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn page_with(element: &str, count: usize) -> String {
    format!(
        "<html><body>{}</body></html>",
        format!("<{0}>item</{0}>", element).repeat(count)
    )
}

#[derive(Default)]
struct RecordingView {
    notifications: Vec<Notification>,
    last_state: Option<SearchState>,
}

impl SearchView for RecordingView {
    fn notify(&mut self, notification: &Notification) {
        self.notifications.push(notification.clone());
    }

    fn render(&mut self, session: &SearchSession, _report: &SearchReport, _inventory: &Inventory) {
        self.last_state = Some(session.state());
    }
}

#[tokio::test]
async fn test_search_ranks_crawled_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    serve_page(&mock_server, "/", page_with("h1", 2)).await;
    serve_page(&mock_server, "/plain", page_with("p", 3)).await;
    serve_page(&mock_server, "/headings", page_with("h1", 5)).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    create_crawl_database(
        &db_path,
        &base_url,
        &[
            CrawledPage::html("/", "Home"),
            CrawledPage::html("/plain", "Plain"),
            CrawledPage::html("/headings", "Headings"),
            CrawledPage {
                path: "/logo.png",
                title: None,
                status_code: 200,
                content_type: "image/png",
            },
        ],
    );

    let config = write_config(temp_dir.path(), &db_path, 5);
    let mut plugin = build_plugin(&config);
    let mut view = RecordingView::default();
    plugin.on_activate(&mut view, None).unwrap();

    let report = plugin.search(&mut view, "h1").await.unwrap();

    let ranked: Vec<(String, usize)> = report
        .results
        .iter()
        .map(|r| (r.url.clone(), r.count))
        .collect();
    assert_eq!(
        ranked,
        vec![
            (format!("{}/headings", base_url), 5),
            (format!("{}/", base_url), 2),
        ]
    );
    assert_eq!(report.total_matches, 7);
    assert_eq!(report.results[0].title.as_deref(), Some("Headings"));

    let session = plugin.session().unwrap();
    assert_eq!(session.state(), SearchState::Completed);
    assert_eq!(session.processed_count(), session.total_eligible());
    assert_eq!(session.eligible_count(), 3);

    assert_eq!(view.last_state, Some(SearchState::Completed));
    assert_eq!(
        view.notifications,
        vec![Notification::Success(
            "Found 7 matching elements on 2 pages".to_string()
        )]
    );

    // The image was never requested
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.url.path() != "/logo.png"));
}

#[tokio::test]
async fn test_failing_page_is_isolated_across_batches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let paths: Vec<String> = (1..=12).map(|n| format!("/page-{}", n)).collect();
    for (n, page_path) in paths.iter().enumerate() {
        if n + 1 == 7 {
            Mock::given(method("GET"))
                .and(path(page_path.as_str()))
                .respond_with(ResponseTemplate::new(500))
                .mount(&mock_server)
                .await;
        } else {
            serve_page(&mock_server, page_path, page_with("section", 3)).await;
        }
    }

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    let pages: Vec<CrawledPage<'_>> = paths
        .iter()
        .map(|p| CrawledPage::html(p.as_str(), "Page"))
        .collect();
    create_crawl_database(&db_path, &base_url, &pages);

    let config = write_config(temp_dir.path(), &db_path, 5);
    let inventory = SqliteInventory::open(&db_path).unwrap();
    let fetcher = HttpPageFetcher::from_config(&config.user_agent, &config.fetcher).unwrap();
    let (events, mut receiver) = event_channel();
    let orchestrator = Orchestrator::new(fetcher)
        .with_batch_size(config.search.batch_size)
        .with_events(events);
    let mut plugin = SearchPlugin::new(orchestrator, Box::new(inventory));
    plugin.on_load();

    let mut view = RecordingView::default();
    let report = plugin.search(&mut view, "section").await.unwrap();

    assert_eq!(report.results.len(), 11);
    assert_eq!(report.total_matches, 33);
    assert!(report
        .results
        .iter()
        .all(|r| !r.url.ends_with("/page-7")));
    // Equal counts keep inventory order
    assert!(report.results[0].url.ends_with("/page-1"));
    assert!(report.results[10].url.ends_with("/page-12"));

    drop(plugin);
    let mut last_progress = None;
    while let Some(event) = receiver.recv().await {
        if let SearchEvent::Progress(progress) = event {
            last_progress = Some(progress);
        }
    }
    let last_progress = last_progress.expect("No progress events");
    assert_eq!(last_progress.processed, 12);
    assert_eq!(last_progress.total, 12);
    assert_eq!(last_progress.percent, 100);
}

#[tokio::test]
async fn test_invalid_selector_fails_the_search() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    serve_page(&mock_server, "/", page_with("div", 1)).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    create_crawl_database(&db_path, &base_url, &[CrawledPage::html("/", "Home")]);

    let config = write_config(temp_dir.path(), &db_path, 5);
    let mut plugin = build_plugin(&config);
    let mut view = RecordingView::default();

    let result = plugin.search(&mut view, "div[").await;

    assert!(matches!(result, Err(SearchError::SelectorSyntax(_))));
    let session = plugin.session().unwrap();
    assert_eq!(session.state(), SearchState::Failed);
    assert!(session.results().is_empty());
    assert!(session.last_error().unwrap().contains("div["));
    assert!(view.notifications[0].is_error());

    let json = format_json_report(session, session.results()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["state"], "failed");
}

#[tokio::test]
async fn test_blank_selector_fetches_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    serve_page(&mock_server, "/", page_with("div", 1)).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    create_crawl_database(&db_path, &base_url, &[CrawledPage::html("/", "Home")]);

    let config = write_config(temp_dir.path(), &db_path, 5);
    let mut plugin = build_plugin(&config);
    let mut view = RecordingView::default();

    let result = plugin.search(&mut view, "  ").await;

    assert!(matches!(result, Err(SearchError::Validation(_))));
    assert_eq!(plugin.session().unwrap().state(), SearchState::Idle);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_markdown_report_for_completed_search() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let gallery = r#"<img src="a.png"><img src="b.png" alt="b">"#;
    serve_page(&mock_server, "/gallery", gallery.to_string()).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    create_crawl_database(
        &db_path,
        &base_url,
        &[CrawledPage::html("/gallery", "Gallery")],
    );

    let config = write_config(temp_dir.path(), &db_path, 5);
    let mut plugin = build_plugin(&config);
    let mut view = RecordingView::default();

    let report = plugin.search(&mut view, "img:not([alt])").await.unwrap();
    assert_eq!(report.total_matches, 1);

    let report_path = temp_dir.path().join("report.md");
    let session = plugin.session().unwrap();
    write_markdown_report(session, session.results(), &report_path).unwrap();

    let markdown = std::fs::read_to_string(&report_path).unwrap();
    assert!(markdown.contains("- **Selector**: `img:not([alt])`"));
    assert!(markdown.contains("| 1 | "));
    assert!(markdown.contains("| Gallery | 200 | 1 |"));
}
