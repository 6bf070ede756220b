//! # News Digest
//!
//! Collects the latest articles from a fixed list of Korean news feeds,
//! extracts each article page, and summarizes it with an OpenAI-compatible
//! chat-completion model, printing the results as Markdown.
//!
//! ## Usage
//!
//! ```sh
//! OPENAI_API_KEY=sk-... news_digest            # prompt, Enter to run
//! OPENAI_API_KEY=sk-... news_digest --once -n 5
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: up to 3 links per feed, in feed order, until the limit is reached
//! 2. **Fetching**: download and extract each article (failures are reported inline)
//! 3. **Summarizing**: one chat-completion request per article
//! 4. **Rendering**: Markdown sections on stdout, in link order
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod feeds;
mod fetcher;
mod http;
mod models;
mod pipeline;
mod render;
mod session;
mod summarizer;
mod utils;

use api::{ChatClient, RetryAsk};
use cli::Cli;
use config::{FileConfig, Settings, load_file_config};
use feeds::HttpFeedReader;
use fetcher::HttpArticleFetcher;
use models::FEED_SOURCES;
use pipeline::Pipeline;
use render::MarkdownRenderer;
use session::Session;
use summarizer::Summarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_digest starting up");

    let args = Cli::parse();
    debug!(?args.limit, ?args.config, once = args.once, "Parsed CLI arguments");

    // ---- Configuration ----
    let file_config = match &args.config {
        Some(path) => load_file_config(path).await?,
        None => FileConfig::default(),
    };
    let settings = match Settings::resolve(&args, file_config) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        limit = settings.limit,
        concurrency = settings.concurrency,
        model = %settings.llm.model,
        api_base = %settings.llm.api_base,
        "Configuration resolved"
    );

    // ---- Clients, built once and shared ----
    let http = http::build_client()?;
    let llm = RetryAsk::new(
        ChatClient::new(http.clone(), &settings.llm),
        settings.llm.max_retries,
        std::time::Duration::from_secs(1),
    );
    let pipeline = Pipeline {
        reader: HttpFeedReader::new(http.clone()),
        fetcher: HttpArticleFetcher::new(http),
        summarizer: Summarizer::new(llm),
        sources: FEED_SOURCES,
        concurrency: settings.concurrency,
    };

    let renderer = MarkdownRenderer::new(std::io::stdout());
    let mut session = Session::new(&pipeline, renderer, settings.limit);

    if settings.once {
        session.run_once().await?;
    } else {
        session
            .run(tokio::io::BufReader::new(tokio::io::stdin()))
            .await?;
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), last_limit = session.limit(), "Execution complete");
    Ok(())
}
