//! Error types for each stage of the digest pipeline.
//!
//! Every stage fails with its own enum so the presentation loop can decide,
//! per article, what to render and whether to keep going:
//! - [`FeedError`]: a feed could not be retrieved or parsed (the source is skipped)
//! - [`FetchError`]: an article page could not be retrieved or parsed
//! - [`SummaryError`]: the chat-completion call failed
//! - [`ConfigError`]: startup configuration is unusable

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not parse feed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("request to the LLM endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM endpoint rejected the API key (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("LLM endpoint rate limit reached: {message}")]
    RateLimited { message: String },

    #[error("LLM endpoint answered with HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed LLM response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("LLM response contained no generated text")]
    EmptyCompletion,
}

impl SummaryError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SummaryError::Http(_) | SummaryError::RateLimited { .. } => true,
            SummaryError::Api { status, .. } => *status >= 500,
            SummaryError::Unauthorized { .. }
            | SummaryError::Decode(_)
            | SummaryError::EmptyCompletion => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no API key configured; set OPENAI_API_KEY or `api_key` in the config file")]
    MissingApiKey,

    #[error("invalid api_base {0:?}")]
    InvalidApiBase(String),

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: String,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),
}
