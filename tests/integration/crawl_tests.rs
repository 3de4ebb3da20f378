//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from seeding to the final flush.

use std::fs;
use tempfile::TempDir;
use text_harvest::config::Config;
use text_harvest::crawler::Coordinator;
use text_harvest::HarvestError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `dir` and starting at `seed_url`
fn create_test_config(dir: &TempDir, seed_url: String) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = seed_url;
    config.crawler.worker_multiplier = 1;
    config.output.directory = dir.path().display().to_string();
    config.output.file_pattern = "corpus{}.txt".to_string();
    config.output.start_token = "<s>".to_string();
    config.output.end_token = "</s>".to_string();
    config.persistence.visited_path = dir.path().join("visited.json").display().to_string();
    config
}

/// An HTML page with one paragraph and links tucked into a nav bar
fn page(text: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>T</title></head><body><nav>{}</nav><p>{}</p></body></html>",
            anchors, text
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, at: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// Reads every record from an output file, in file order
fn read_records(dir: &TempDir, index: u32) -> Vec<String> {
    let content = fs::read_to_string(dir.path().join(format!("corpus{}.txt", index)))
        .expect("output file exists");
    content
        .lines()
        .map(|line| {
            line.strip_prefix("<s>")
                .and_then(|l| l.strip_suffix("</s>"))
                .expect("record is delimited")
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_linear_chain() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Page A talks about the first topic.", &["/b"]), 1).await;
    mount_page(&server, "/b", page("Page B talks about the second topic.", &["/c"]), 1).await;
    mount_page(&server, "/c", page("Page C talks about the third topic.", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, format!("{}/", server.uri()));
    let mut coordinator = Coordinator::new(config, false).unwrap();

    let summary = coordinator.run().await.expect("crawl succeeds");

    assert_eq!(summary.visited, 3);
    assert!(coordinator.visited().contains(&format!("{}/", server.uri())));
    assert!(coordinator.visited().contains(&format!("{}/b", server.uri())));
    assert!(coordinator.visited().contains(&format!("{}/c", server.uri())));
    assert_eq!(summary.unique_texts, 3);
    assert_eq!(summary.records_written, 3);
    assert_eq!(summary.final_file_index, 0);

    let mut records = read_records(&dir, 0);
    records.sort();
    assert_eq!(
        records,
        vec![
            "Page A talks about the first topic.",
            "Page B talks about the second topic.",
            "Page C talks about the third topic.",
        ]
    );
    assert!(!dir.path().join("corpus1.txt").exists());
}

#[tokio::test]
async fn test_duplicate_content_written_once() {
    let server = MockServer::start().await;
    let text = "Hello World, this is a test page.";
    mount_page(&server, "/", page(text, &["/copy"]), 1).await;
    mount_page(&server, "/copy", page(text, &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, format!("{}/", server.uri()));
    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 2);
    assert_eq!(summary.unique_texts, 1);
    assert_eq!(read_records(&dir, 0), vec![text.to_string()]);
}

#[tokio::test]
async fn test_non_html_response_is_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("The index page links to some data.", &["/data"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"text": "this is not a page at all"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, format!("{}/", server.uri()));
    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 2);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(
        read_records(&dir, 0),
        vec!["The index page links to some data.".to_string()]
    );
}

#[tokio::test]
async fn test_self_loop_fetched_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("This page only links back to itself.", &["/", "#top"]), 1)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, format!("{}/", server.uri()));
    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 1);
    assert_eq!(summary.records_written, 1);
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("The seed page sits at depth one.", &["/deeper"]), 1).await;
    mount_page(&server, "/deeper", page("This page is beyond the limit.", &[]), 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.crawler.depth_limit = Some(1);

    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 1);
    assert_eq!(summary.records_written, 1);
}

#[tokio::test]
async fn test_checkpoint_written_on_flush() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("A page with a single outgoing link.", &["/next"]), 1).await;
    mount_page(&server, "/next", page("The page the first one links to.", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.persistence.enabled = true;
    let checkpoint = config.persistence.visited_path.clone();

    Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    let saved: Vec<String> =
        serde_json::from_str(&fs::read_to_string(checkpoint).unwrap()).unwrap();
    assert_eq!(
        saved,
        vec![
            format!("{}/", server.uri()),
            format!("{}/next", server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_resume_skips_visited_seed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Already crawled in an earlier run.", &[]), 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.persistence.enabled = true;
    fs::write(
        &config.persistence.visited_path,
        serde_json::to_string(&[format!("{}/", server.uri())]).unwrap(),
    )
    .unwrap();

    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 1);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.records_written, 0);
    assert!(!dir.path().join("corpus0.txt").exists());
}

#[tokio::test]
async fn test_fresh_ignores_checkpoint() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Crawled again because of a fresh start.", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.persistence.enabled = true;
    fs::write(
        &config.persistence.visited_path,
        serde_json::to_string(&[format!("{}/", server.uri())]).unwrap(),
    )
    .unwrap();

    let summary = Coordinator::new(config, true)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_fetched, 1);
}

#[tokio::test]
async fn test_rotation_moves_to_next_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("First page of the rotating chain.", &["/2"]), 1).await;
    mount_page(&server, "/2", page("Second page of the rotating chain.", &["/3"]), 1).await;
    mount_page(&server, "/3", page("Third page of the rotating chain.", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.output.buffer_size = 1;
    // Any single record exceeds this ceiling
    config.output.max_file_size_mb = 0.000_01;

    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.records_written, 3);
    for index in 0..3 {
        assert_eq!(read_records(&dir, index).len(), 1, "file {}", index);
    }
    assert!(!dir.path().join("corpus3.txt").exists());
    assert!(summary.final_file_index >= 3);
}

#[tokio::test]
async fn test_http_error_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, format!("{}/missing", server.uri()));
    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 1);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.records_written, 0);
    assert!(!dir.path().join("corpus0.txt").exists());
}

#[tokio::test]
async fn test_converging_links_fetch_target_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("The top of a diamond shaped site.", &["/b", "/c"]), 1).await;
    mount_page(&server, "/b", page("The left side of the diamond page.", &["/d"]), 1).await;
    mount_page(&server, "/c", page("The right side of the diamond page.", &["/d"]), 1).await;
    mount_page(&server, "/d", page("The bottom both sides link down to.", &["/b", "/c"]), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.crawler.worker_multiplier = 4;
    config.crawler.max_concurrent_fetches = 8;

    let summary = Coordinator::new(config, false)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.visited, 4);
    assert_eq!(summary.requests_sent, 4);
    assert_eq!(summary.records_written, 4);
}

#[tokio::test]
async fn test_output_write_failure_ends_run() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("This text can never be written out.", &[]), 1).await;

    let dir = TempDir::new().unwrap();
    // A directory where the first output file should go
    fs::create_dir(dir.path().join("corpus0.txt")).unwrap();

    let mut config = create_test_config(&dir, format!("{}/", server.uri()));
    config.output.buffer_size = 1;

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        Coordinator::new(config, false).unwrap().run(),
    )
    .await
    .expect("crawl stops instead of hanging");

    assert!(matches!(result, Err(HarvestError::Storage(_))));
}
