mod common;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use common::{FetchScript, ScriptedFetcher, ScriptedProvider, SurfaceScript};
use delver_common::RunLimits;
use delver_web::extract::PageContentExtractor;
use delver_web::locator::{QuestionLocator, ResultLocator};
use delver_web::organic::OrganicResultCollector;
use delver_web::orchestrator::SearchOrchestrator;
use delver_web::questions::RelatedQuestionCollector;
use delver_web::service::{SearchService, ServiceError};
use delver_web::surface::SurfaceProvider;

const PAGE_ONE: &str =
    "<html><head><title>One</title></head><body><p>First page body.</p></body></html>";
const PAGE_THREE: &str =
    "<html><head><title>Three</title></head><body><p>Third page body.</p></body></html>";

fn orchestrator(
    provider: Arc<dyn SurfaceProvider>,
    fetcher: Arc<ScriptedFetcher>,
) -> SearchOrchestrator {
    SearchOrchestrator::new(
        RelatedQuestionCollector::new(provider.clone(), QuestionLocator::default()),
        OrganicResultCollector::new(provider, ResultLocator::default()),
        PageContentExtractor::new(fetcher),
    )
}

/// A script with questions and organic results both rendered.
fn full_script() -> SurfaceScript {
    let mut script = SurfaceScript::with_questions(["Q1"]).expansion("Q1", &["R1"]);
    script.result_links = vec![
        Some("https://one.example/".to_string()),
        Some("https://two.example/".to_string()),
        Some("https://three.example/".to_string()),
    ];
    script.results_render = true;
    script
}

#[tokio::test]
async fn failed_pages_are_omitted_and_labels_follow_rank() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("https://one.example/", FetchScript::Succeed(PAGE_ONE.into()))
            .page("https://two.example/", FetchScript::FailAlways)
            .page("https://three.example/", FetchScript::Succeed(PAGE_THREE.into())),
    );

    let result = orchestrator(provider, fetcher.clone())
        .run("rust", 5, 3, &CancellationToken::new())
        .await
        .expect("run succeeds");

    // The unreachable second page vanishes; no placeholder, no null.
    assert_eq!(result.website_contents.len(), 2);
    assert_eq!(result.website_contents[0].url, "https://one.example/");
    assert_eq!(result.website_contents[0].website.as_deref(), Some("Website 1"));
    assert_eq!(result.website_contents[1].url, "https://three.example/");
    assert_eq!(result.website_contents[1].website.as_deref(), Some("Website 3"));
    // The dead URL burned its full attempt budget before being dropped.
    assert_eq!(fetcher.attempts_for("https://two.example/"), 3);

    assert_eq!(result.related_questions[0].initial_question, "Q1");
    assert_eq!(result.related_questions[0].related_questions, vec!["R1"]);
}

#[tokio::test]
async fn both_sessions_open_and_close() {
    common::init_test_tracing();
    let (shared, provider) = ScriptedProvider::new(full_script());
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("https://one.example/", FetchScript::Succeed(PAGE_ONE.into()))
            .page("https://two.example/", FetchScript::Succeed(PAGE_ONE.into()))
            .page("https://three.example/", FetchScript::Succeed(PAGE_ONE.into())),
    );

    let result = orchestrator(provider, fetcher)
        .run("rust", 5, 3, &CancellationToken::new())
        .await;

    assert!(result.is_some());
    let script = shared.lock().unwrap();
    // One scoped session per collector, each released.
    assert_eq!(script.opened, 2);
    assert_eq!(script.closed, 2);
}

#[tokio::test]
async fn session_failure_collapses_the_whole_run() {
    common::init_test_tracing();
    let mut script = full_script();
    script.fail_open = true;
    let (_, provider) = ScriptedProvider::new(script);
    let fetcher = Arc::new(ScriptedFetcher::default());

    let result = orchestrator(provider, fetcher)
        .run("rust", 5, 3, &CancellationToken::new())
        .await;

    assert!(result.is_none(), "no partial result on failure");
}

#[tokio::test]
async fn cancelled_deadline_collapses_the_whole_run() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let fetcher = Arc::new(ScriptedFetcher::default());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = orchestrator(provider, fetcher).run("rust", 5, 3, &cancel).await;

    assert!(result.is_none());
}

// ---- Entry operations ----

fn service(provider: Arc<dyn SurfaceProvider>, fetcher: Arc<ScriptedFetcher>) -> SearchService {
    let extractor = PageContentExtractor::new(fetcher.clone());
    SearchService::new(orchestrator(provider, fetcher), extractor)
}

#[tokio::test]
async fn search_rejects_empty_queries() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let svc = service(provider, Arc::new(ScriptedFetcher::default()));

    let outcome = svc
        .search("   ", RunLimits::default(), &CancellationToken::new())
        .await;
    assert!(matches!(outcome, Err(ServiceError::InvalidArgument("query"))));
}

#[tokio::test]
async fn search_maps_collapse_to_scrape_failure() {
    common::init_test_tracing();
    let mut script = full_script();
    script.fail_open = true;
    let (_, provider) = ScriptedProvider::new(script);
    let svc = service(provider, Arc::new(ScriptedFetcher::default()));

    let outcome = svc
        .search("rust", RunLimits::default(), &CancellationToken::new())
        .await;
    assert!(matches!(outcome, Err(ServiceError::ScrapeFailure)));
}

#[tokio::test]
async fn search_returns_the_assembled_result() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("https://one.example/", FetchScript::Succeed(PAGE_ONE.into()))
            .page("https://two.example/", FetchScript::Succeed(PAGE_ONE.into()))
            .page("https://three.example/", FetchScript::Succeed(PAGE_ONE.into())),
    );
    let svc = service(provider, fetcher);

    let result = svc
        .search("rust", RunLimits::default(), &CancellationToken::new())
        .await
        .expect("search succeeds");

    assert_eq!(result.related_questions[0].initial_question, "Q1");
    assert_eq!(result.website_contents.len(), 3);
}

#[tokio::test]
async fn extract_page_rejects_empty_urls() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let svc = service(provider, Arc::new(ScriptedFetcher::default()));

    let outcome = svc.extract_page("").await;
    assert!(matches!(outcome, Err(ServiceError::InvalidArgument("url"))));
}

#[tokio::test]
async fn extract_page_maps_absence_to_extraction_failure() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let fetcher = Arc::new(
        ScriptedFetcher::default().page("https://gone.example/", FetchScript::FailAlways),
    );
    let svc = service(provider, fetcher);

    let outcome = svc.extract_page("https://gone.example/").await;
    assert!(matches!(outcome, Err(ServiceError::ExtractionFailure(_))));
}

#[tokio::test]
async fn extract_page_returns_unlabelled_info() {
    common::init_test_tracing();
    let (_, provider) = ScriptedProvider::new(full_script());
    let fetcher = Arc::new(
        ScriptedFetcher::default().page("https://one.example/", FetchScript::Succeed(PAGE_ONE.into())),
    );
    let svc = service(provider, fetcher);

    let info = svc
        .extract_page("https://one.example/")
        .await
        .expect("extraction succeeds");

    assert_eq!(info.url, "https://one.example/");
    assert_eq!(info.title, "One");
    assert!(info.website.is_none());
}
