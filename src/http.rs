//! The shared HTTP client.
//!
//! One [`Client`] is built at startup and cloned into the feed reader, the
//! article fetcher and the LLM client; clones share the connection pool.

use reqwest::Client;
use std::time::Duration;

/// Per-request timeout for feeds, article pages and LLM calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; news_digest/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

/// A client that never goes through a proxy, for tests against local ports.
#[cfg(test)]
pub(crate) fn offline_client() -> Client {
    Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
