//! Command-line interface definitions.
//!
//! Every option can also come from the YAML file given with `--config`;
//! flags and environment variables win over the file. See [`crate::config`].

use crate::config::{MAX_ARTICLES, MAX_CONCURRENCY, MIN_ARTICLES, check_range};
use clap::Parser;

/// Command-line arguments for the news digest.
///
/// # Examples
///
/// ```sh
/// # Prompt for runs, 8 articles each
/// news_digest
///
/// # One run of 12 articles, two at a time
/// news_digest --once -n 12 --concurrency 2
///
/// # Any OpenAI-compatible endpoint
/// news_digest --api-base http://localhost:8080/v1 --model qwen2.5-7b-instruct
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Number of articles to collect per run (3-20, default 8)
    #[arg(short = 'n', long, value_parser = article_limit)]
    pub limit: Option<usize>,

    /// Run a single batch immediately and exit instead of prompting
    #[arg(long)]
    pub once: bool,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// API key for the chat-completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// Model identifier sent with every completion request
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature for summaries
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Articles fetched and summarized at the same time (1-12, default 1)
    #[arg(long, value_parser = concurrency)]
    pub concurrency: Option<usize>,

    /// Extra attempts for a failed LLM call, with backoff (default 0)
    #[arg(long)]
    pub llm_retries: Option<usize>,
}

fn parse_in_range(s: &str, name: &str, min: usize, max: usize) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a whole number"))?;
    check_range(name, n, min, max).map_err(|e| e.to_string())
}

fn article_limit(s: &str) -> Result<usize, String> {
    parse_in_range(s, "limit", MIN_ARTICLES, MAX_ARTICLES)
}

fn concurrency(s: &str) -> Result<usize, String> {
    parse_in_range(s, "concurrency", 1, MAX_CONCURRENCY)
}
