//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch, classify and download cycle end-to-end with the reqwest-backed
//! collaborators.

use sponge::config::{CrawlConfig, HttpSettings};
use sponge::crawler::{
    build_http_client, execute, Crawler, DownloadGate, DownloadOutcome, HttpDownloader,
    HttpFetcher,
};
use sponge::{canonicalize, CrawlReport, SpongeError, UriState};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server into `output_dir`
fn create_test_config(base_url: &str, output_dir: &Path) -> CrawlConfig {
    let root = canonicalize(&format!("{}/", base_url)).expect("Failed to parse base URL");

    let mut config = CrawlConfig::new(root, output_dir);
    config.mime_types = ["text/plain".to_string()].into();
    config.max_depth = 2;
    config.concurrent_requests = 4;
    config.concurrent_downloads = 2;
    config.http = HttpSettings {
        user_agent: "SpongeTest/1.0".to_string(),
        timeout_secs: 5,
    };
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

fn text(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/plain")
}

fn partial_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("Failed to read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".part"))
        .collect()
}

async fn run_crawler(config: CrawlConfig) -> (CrawlReport, Arc<Crawler<HttpFetcher, HttpDownloader>>) {
    let client = build_http_client(&config.http).expect("Failed to build client");
    let crawler = Arc::new(Crawler::new(
        config,
        HttpFetcher::new(client.clone()),
        HttpDownloader::new(client),
    ));

    let report = Arc::clone(&crawler)
        .run()
        .await
        .expect("Crawl should complete");
    (report, crawler)
}

#[tokio::test]
async fn test_crawl_downloads_linked_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/doc2">Doc</a><a href="/file.txt">File</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doc2"))
        .respond_with(html(r#"<a href="/">Home</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Fetched once for classification, once for the transfer
    Mock::given(method("GET"))
        .and(path("/file.txt"))
        .respond_with(text("hello from sponge"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let (report, crawler) = run_crawler(create_test_config(&base_url, output.path())).await;

    let saved = output.path().join("file.txt");
    assert_eq!(
        std::fs::read_to_string(&saved).expect("File should be downloaded"),
        "hello from sponge"
    );
    assert!(partial_files(output.path()).is_empty());

    assert_eq!(report.fetched, 3);
    assert_eq!(report.documents, 2);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failed, 0);

    let doc2 = canonicalize(&format!("{}/doc2", base_url)).unwrap();
    assert_eq!(crawler.uri_state(&doc2), UriState::Cached);
}

#[tokio::test]
async fn test_execute_creates_output_directory() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="notes%20v2.txt">Notes</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/notes%20v2.txt"))
        .respond_with(text("notes"))
        .mount(&mock_server)
        .await;

    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temp.path().join("nested").join("out");

    execute(create_test_config(&base_url, &output))
        .await
        .expect("Crawl should complete");

    assert!(output.is_dir());
    assert_eq!(
        std::fs::read_to_string(output.join("notes v2.txt")).expect("File should be downloaded"),
        "notes"
    );
}

#[tokio::test]
async fn test_failing_sibling_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/broken">Broken</a><a href="/missing.txt">Missing</a><a href="/good.txt">Good</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/good.txt"))
        .respond_with(text("good"))
        .mount(&mock_server)
        .await;

    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let (report, crawler) = run_crawler(create_test_config(&base_url, output.path())).await;

    assert!(output.path().join("good.txt").exists());
    assert!(!output.path().join("missing.txt").exists());
    assert_eq!(report.failed, 2);
    assert_eq!(report.downloaded, 1);

    let broken = canonicalize(&format!("{}/broken", base_url)).unwrap();
    assert_eq!(crawler.uri_state(&broken), UriState::Failed);
}

#[tokio::test]
async fn test_existing_file_not_downloaded_again() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/file.txt">File</a>"#))
        .mount(&mock_server)
        .await;

    // Only the classification fetch reaches the server
    Mock::given(method("GET"))
        .and(path("/file.txt"))
        .respond_with(text("new content"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(output.path().join("file.txt"), "old content").unwrap();

    let (report, _) = run_crawler(create_test_config(&base_url, output.path())).await;

    assert_eq!(report.already_present, 1);
    assert_eq!(report.downloaded, 0);
    assert_eq!(
        std::fs::read_to_string(output.path().join("file.txt")).unwrap(),
        "old content"
    );
}

#[tokio::test]
async fn test_links_resolved_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/old">Moved</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new/", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/"))
        .respond_with(html(r#"<a href="report.txt">Report</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/report.txt"))
        .respond_with(text("report"))
        .mount(&mock_server)
        .await;

    let output = tempfile::tempdir().expect("Failed to create temp dir");
    run_crawler(create_test_config(&base_url, output.path())).await;

    assert_eq!(
        std::fs::read_to_string(output.path().join("report.txt")).expect("File should be downloaded"),
        "report"
    );
}

#[tokio::test]
async fn test_depth_limit_and_ignored_types() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/level1">L1</a><a href="/logo.png">Logo</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html(r#"<a href="/deep.txt">Deep</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deep.txt"))
        .respond_with(text("too deep"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config(&base_url, output.path());
    config.max_depth = 1;

    let (report, _) = run_crawler(config).await;

    assert_eq!(report.ignored, 1);
    assert_eq!(report.downloaded, 0);
    assert!(!output.path().join("logo.png").exists());
}

#[tokio::test]
async fn test_unwritable_output_aborts_before_crawling() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let result = execute(create_test_config(&base_url, &blocker.join("out"))).await;

    assert!(matches!(result, Err(SpongeError::OutputDirectory { .. })));
}

#[tokio::test]
async fn test_same_name_downloads_never_interleave() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let large = vec![b'A'; 4 * 1024 * 1024];
    let small = vec![b'B'; 2 * 1024 * 1024];

    Mock::given(method("GET"))
        .and(path("/x/f.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(large.clone(), "application/octet-stream"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/y/f.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(small.clone(), "application/octet-stream"))
        .mount(&mock_server)
        .await;

    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let client = build_http_client(&HttpSettings::default()).expect("Failed to build client");
    let gate = DownloadGate::new(HttpDownloader::new(client), output.path(), 2);

    let first = canonicalize(&format!("{}/x/f.bin", base_url)).unwrap();
    let second = canonicalize(&format!("{}/y/f.bin", base_url)).unwrap();

    let (first_outcome, second_outcome) =
        futures::future::join(gate.admit(&first), gate.admit(&second)).await;

    for outcome in [&first_outcome, &second_outcome] {
        assert!(
            !matches!(outcome, DownloadOutcome::Failed),
            "unexpected outcome {:?}",
            outcome
        );
    }

    let saved = std::fs::read(output.path().join("f.bin")).expect("File should be downloaded");
    assert!(
        saved == large || saved == small,
        "file mixes both bodies ({} bytes)",
        saved.len()
    );
    assert!(partial_files(output.path()).is_empty());
}
