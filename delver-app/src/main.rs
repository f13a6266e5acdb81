use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use delver_common::observability::{init_logging, LogConfig};
use delver_common::RunLimits;
use delver_config::{DelverConfig, DelverConfigLoader};
use delver_http::PageClient;
use delver_web::extract::{HttpPageFetcher, PageContentExtractor};
use delver_web::live::WebDriverProvider;
use delver_web::locator::{QuestionLocator, ResultLocator};
use delver_web::organic::OrganicResultCollector;
use delver_web::orchestrator::SearchOrchestrator;
use delver_web::questions::RelatedQuestionCollector;
use delver_web::service::SearchService;
use delver_web::surface::SurfaceProvider;

#[derive(Parser)]
#[command(
    name = "delver",
    version,
    about = "Scrape a search query's related-question tree and top result summaries"
)]
struct Cli {
    /// Configuration file (missing file falls back to compiled defaults).
    #[arg(long, default_value = "delver.yaml", env = "DELVER_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full pipeline: question tree plus summarised top results.
    Search {
        query: String,
        #[arg(long)]
        max_questions: Option<usize>,
        #[arg(long)]
        max_websites: Option<usize>,
        /// Abort the run and release the browser after this many seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
    /// Summarise a single page.
    Extract { url: String },
}

fn build_service(cfg: &DelverConfig) -> Result<SearchService> {
    let provider: Arc<dyn SurfaceProvider> = Arc::new(WebDriverProvider {
        webdriver_url: cfg.engine.webdriver_url.clone(),
        home_url: cfg.engine.home_url.clone(),
        headless: cfg.engine.headless,
        search_input: cfg.selectors.search_input.clone(),
    });

    let mut client =
        PageClient::new()?.with_timeout(Duration::from_secs(cfg.fetch.timeout_secs));
    if let Some(ua) = &cfg.fetch.user_agent {
        client = client.with_user_agent(ua.clone());
    }
    let extractor = PageContentExtractor::new(Arc::new(HttpPageFetcher::new(client)))
        .with_retries(cfg.limits.fetch_retries);

    let questions = RelatedQuestionCollector::new(
        provider.clone(),
        QuestionLocator {
            question: cfg.selectors.question.clone(),
        },
    );
    let organic = OrganicResultCollector::new(
        provider,
        ResultLocator {
            block: cfg.selectors.result_block.clone(),
            link: cfg.selectors.result_link.clone(),
        },
    );

    let orchestrator = SearchOrchestrator::new(questions, organic, extractor.clone());
    Ok(SearchService::new(orchestrator, extractor))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = DelverConfigLoader::new().with_file(&cli.config).load()?;
    init_logging(LogConfig::default())?;

    let service = build_service(&cfg)?;

    match cli.command {
        Command::Search {
            query,
            max_questions,
            max_websites,
            deadline_secs,
        } => {
            let limits = RunLimits {
                max_questions: max_questions.unwrap_or(cfg.limits.max_questions),
                max_websites: max_websites.unwrap_or(cfg.limits.max_websites),
            };

            let cancel = CancellationToken::new();
            if let Some(secs) = deadline_secs {
                let deadline = cancel.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(secs)).await;
                    tracing::warn!(deadline_secs = secs, "deadline reached, cancelling run");
                    deadline.cancel();
                });
            }

            let result = service.search(&query, limits, &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Extract { url } => {
            let info = service.extract_page(&url).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }

    Ok(())
}
