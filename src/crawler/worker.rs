//! Fetch worker loop
//!
//! Each worker takes one `WorkItem` at a time from the frontier, resolves it to
//! a fetched page or a skip, and feeds the results back: the body onto the
//! text queue and newly discovered links onto the frontier. HTML parsing runs
//! on the blocking pool.

use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::extract_resolved_links;
use crate::crawler::queue::{QueueFull, WorkItem, WorkQueue};
use crate::output::FetchStats;
use crate::state::ItemOutcome;
use crate::storage::VisitedStore;
use crate::url::is_crawlable;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// Everything a fetch worker shares with the others
#[derive(Clone)]
pub struct WorkerContext {
    pub client: Client,
    pub frontier: Arc<WorkQueue<WorkItem>>,
    pub text_queue: Arc<WorkQueue<String>>,
    pub visited: Arc<VisitedStore>,
    pub limiter: Arc<Semaphore>,
    pub stats: Arc<FetchStats>,
    pub depth_limit: Option<u32>,
}

/// Runs a fetch worker until its task is aborted
///
/// Every item taken is marked done exactly once, whatever its outcome.
pub async fn run_worker(id: usize, ctx: WorkerContext) {
    tracing::trace!("Worker {} started", id);

    loop {
        let item = ctx.frontier.get().await;
        let outcome = process_item(&ctx, &item).await;
        ctx.stats.record(outcome);
        ctx.frontier.task_done();
    }
}

/// Resolves one frontier item
///
/// Holds a limiter permit for the whole item, so the limiter rather than the
/// worker count bounds requests in flight.
pub async fn process_item(ctx: &WorkerContext, item: &WorkItem) -> ItemOutcome {
    let Ok(_permit) = ctx.limiter.acquire().await else {
        // Closed limiter means the run is shutting down
        return ItemOutcome::NetworkError;
    };

    if let Some(limit) = ctx.depth_limit {
        if item.depth > limit {
            tracing::trace!("Depth {} beyond limit for {}", item.depth, item.url);
            return ItemOutcome::DepthExceeded;
        }
    }

    if !is_crawlable(&item.url) {
        tracing::debug!("Skipping non-HTTP URL: {}", item.url);
        return ItemOutcome::NotCrawlable;
    }

    // Claim before fetching so two workers never request the same URL
    if !ctx.visited.add(&item.url) {
        return ItemOutcome::AlreadyVisited;
    }

    tracing::debug!("Fetching {} (depth {})", item.url, item.depth);

    let (final_url, body) = match fetch_url(&ctx.client, &item.url).await {
        FetchResult::Success {
            final_url, body, ..
        } => (final_url, body),
        FetchResult::HttpError { status_code } => {
            tracing::debug!("HTTP {} for {}", status_code, item.url);
            return ItemOutcome::HttpError;
        }
        FetchResult::ContentMismatch { content_type } => {
            tracing::debug!("Not HTML ({}): {}", content_type, item.url);
            return ItemOutcome::ContentMismatch;
        }
        FetchResult::NetworkError { error } => {
            tracing::warn!("Fetch failed for {}: {}", item.url, error);
            return ItemOutcome::NetworkError;
        }
    };

    let base = Url::parse(&final_url).or_else(|_| Url::parse(&item.url)).ok();
    let parsed = tokio::task::spawn_blocking(move || {
        let links = match &base {
            Some(base) => extract_resolved_links(&body, base),
            None => Vec::new(),
        };
        (body, links)
    })
    .await;

    let (body, links) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("Link extraction crashed for {}: {}", item.url, e);
            return ItemOutcome::ParseFailed;
        }
    };

    ctx.text_queue.put(body).await;

    for link in links {
        if ctx.visited.contains(&link) {
            continue;
        }
        match ctx.frontier.try_put(item.child(link)) {
            Ok(()) => ctx.stats.record_enqueued_link(),
            // A full frontier drops the link; workers are its only consumers
            // so waiting for space here could stall every worker at once.
            Err(QueueFull(dropped)) => {
                tracing::debug!("Frontier full, dropping {}", dropped.url);
                ctx.stats.record_dropped_link();
            }
        }
    }

    ItemOutcome::Fetched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::build_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(frontier: Option<usize>, depth_limit: Option<u32>) -> WorkerContext {
        WorkerContext {
            client: build_http_client(&Config::default()).unwrap(),
            frontier: Arc::new(WorkQueue::new(frontier)),
            text_queue: Arc::new(WorkQueue::unbounded()),
            visited: Arc::new(VisitedStore::new()),
            limiter: Arc::new(Semaphore::new(2)),
            stats: Arc::new(FetchStats::new()),
            depth_limit,
        }
    }

    fn html_page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
    }

    #[tokio::test]
    async fn test_fetched_page_feeds_both_queues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(html_page(
                r#"<html><body><p>Page A</p><a href="/b">B</a><a href="javascript:void(0)">x</a></body></html>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(None, None);
        let item = WorkItem::seed(format!("{}/a", server.uri()));

        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::Fetched);
        assert_eq!(ctx.text_queue.len(), 1);

        let child = ctx.frontier.try_get().unwrap();
        assert_eq!(child, WorkItem::new(format!("{}/b", server.uri()), 2));
        assert!(ctx.frontier.is_empty());
        assert!(ctx.visited.contains(&item.url));
    }

    #[tokio::test]
    async fn test_visited_url_is_not_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html_page("<p>Hello</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(None, None);
        let item = WorkItem::seed(format!("{}/a", server.uri()));

        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::Fetched);
        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::AlreadyVisited);
    }

    #[tokio::test]
    async fn test_self_link_is_not_enqueued() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(html_page(r#"<a href="/a">me</a>"#))
            .mount(&server)
            .await;

        let ctx = context(None, None);
        let item = WorkItem::seed(format!("{}/a", server.uri()));

        process_item(&ctx, &item).await;
        assert!(ctx.frontier.is_empty());
    }

    #[tokio::test]
    async fn test_depth_limit_rejects_without_fetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html_page("<p>Hello</p>"))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context(None, Some(1));
        let item = WorkItem::new(format!("{}/deep", server.uri()), 2);

        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::DepthExceeded);
        assert!(!ctx.visited.contains(&item.url));
    }

    #[tokio::test]
    async fn test_non_http_url_is_rejected() {
        let ctx = context(None, None);
        let item = WorkItem::seed("mailto:someone@example.com");

        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::NotCrawlable);
        assert!(ctx.visited.is_empty());
    }

    #[tokio::test]
    async fn test_json_response_is_not_queued() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let ctx = context(None, None);
        let item = WorkItem::seed(format!("{}/data", server.uri()));

        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::ContentMismatch);
        assert!(ctx.text_queue.is_empty());
        assert!(ctx.visited.contains(&item.url));
    }

    #[tokio::test]
    async fn test_full_frontier_drops_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html_page(
                r#"<a href="/one">1</a><a href="/two">2</a><a href="/three">3</a>"#,
            ))
            .mount(&server)
            .await;

        let ctx = context(Some(1), None);
        let item = WorkItem::seed(format!("{}/", server.uri()));

        assert_eq!(process_item(&ctx, &item).await, ItemOutcome::Fetched);
        assert_eq!(ctx.frontier.len(), 1);
        assert_eq!(ctx.stats.enqueued_links(), 1);
        assert_eq!(ctx.stats.dropped_links(), 2);
    }

    #[tokio::test]
    async fn test_run_worker_marks_items_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ctx = context(None, None);
        let frontier = Arc::clone(&ctx.frontier);
        let stats = Arc::clone(&ctx.stats);
        frontier
            .put(WorkItem::seed(format!("{}/missing", server.uri())))
            .await;

        let task = tokio::spawn(run_worker(0, ctx));
        tokio::time::timeout(std::time::Duration::from_secs(5), frontier.join())
            .await
            .expect("frontier drained");
        task.abort();

        assert_eq!(stats.count(ItemOutcome::HttpError), 1);
    }
}
