//! Feed link collection.
//!
//! The collector walks [`FEED_SOURCES`](crate::models::FEED_SOURCES) in order,
//! takes up to [`LINKS_PER_SOURCE`] entry links from each feed, and stops as
//! soon as it holds the requested number of links. A feed that cannot be
//! retrieved or parsed is logged and skipped; the remaining sources still
//! contribute.
//!
//! Feed retrieval sits behind the [`FeedReader`] trait so the collection
//! rules can be exercised without the network.

pub mod parser;

use crate::error::FeedError;
use crate::models::FeedSource;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

/// Maximum number of links a single feed contributes to a batch.
pub const LINKS_PER_SOURCE: usize = 3;

/// Something that can list the entry links of a feed, in feed order.
pub trait FeedReader {
    async fn entry_links(&self, source: &FeedSource) -> Result<Vec<String>, FeedError>;
}

/// Reads feeds over HTTP(S) with a shared client.
#[derive(Debug, Clone)]
pub struct HttpFeedReader {
    client: Client,
}

impl HttpFeedReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl FeedReader for HttpFeedReader {
    #[instrument(level = "info", skip_all, fields(source = source.name, url = source.url))]
    async fn entry_links(&self, source: &FeedSource) -> Result<Vec<String>, FeedError> {
        let http = |e: reqwest::Error| FeedError::Http {
            url: source.url.to_string(),
            source: e,
        };

        let response = self.client.get(source.url).send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: source.url.to_string(),
                status: status.as_u16(),
            });
        }

        // Left undecoded; feed-rs reads the encoding from the XML declaration.
        let body = response.bytes().await.map_err(http)?;
        let links = parser::parse_entry_links(&body)?;
        debug!(count = links.len(), bytes = body.len(), "Parsed feed");
        Ok(links)
    }
}

/// Collect up to `limit` article links from `sources`.
///
/// Sources are visited in order and each contributes at most
/// [`LINKS_PER_SOURCE`] links in feed order. Iteration stops once `limit`
/// links are held and the result is truncated to exactly `limit`.
#[instrument(level = "info", skip(reader, sources))]
pub async fn collect_links<R: FeedReader>(
    reader: &R,
    sources: &[FeedSource],
    limit: usize,
) -> Vec<String> {
    let mut links = Vec::with_capacity(limit);

    for source in sources {
        match reader.entry_links(source).await {
            Ok(entries) => {
                let before = links.len();
                links.extend(entries.into_iter().take(LINKS_PER_SOURCE));
                info!(
                    source = source.name,
                    taken = links.len() - before,
                    "Collected feed links"
                );
            }
            Err(e) => {
                warn!(source = source.name, error = %e, "Feed unavailable; skipping source");
            }
        }
        if links.len() >= limit {
            break;
        }
    }

    links.truncate(limit);
    info!(count = links.len(), limit, "Link collection finished");
    links
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::offline_client;
    use crate::models::FEED_SOURCES;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned entry lists keyed by feed URL; unknown URLs fail.
    #[derive(Default)]
    pub(crate) struct StaticFeedReader {
        pub feeds: HashMap<&'static str, Vec<String>>,
        pub visited: RefCell<Vec<&'static str>>,
    }

    impl StaticFeedReader {
        pub fn with(mut self, source: &FeedSource, links: &[&str]) -> Self {
            self.feeds
                .insert(source.url, links.iter().map(|s| s.to_string()).collect());
            self
        }
    }

    impl FeedReader for StaticFeedReader {
        async fn entry_links(&self, source: &FeedSource) -> Result<Vec<String>, FeedError> {
            self.visited.borrow_mut().push(source.name);
            self.feeds
                .get(source.url)
                .cloned()
                .ok_or_else(|| FeedError::Status {
                    url: source.url.to_string(),
                    status: 500,
                })
        }
    }

    fn numbered(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://{prefix}.example/{i}")).collect()
    }

    fn full_reader() -> StaticFeedReader {
        let mut reader = StaticFeedReader::default();
        for (i, source) in FEED_SOURCES.iter().enumerate() {
            reader.feeds.insert(source.url, numbered(&format!("s{i}"), 10));
        }
        reader
    }

    #[tokio::test]
    async fn test_limit_and_per_source_cap_hold_for_every_limit() {
        let reader = full_reader();
        for limit in 3..=20 {
            let links = collect_links(&reader, FEED_SOURCES, limit).await;
            assert!(links.len() <= limit, "limit {limit}");

            for i in 0..FEED_SOURCES.len() {
                let prefix = format!("https://s{i}.example/");
                let per_source = links.iter().filter(|l| l.starts_with(&prefix)).count();
                assert!(per_source <= LINKS_PER_SOURCE, "limit {limit} source {i}");
            }
        }
    }

    #[tokio::test]
    async fn test_order_is_source_then_feed_order() {
        let reader = full_reader();
        let links = collect_links(&reader, FEED_SOURCES, 8).await;
        assert_eq!(
            links,
            vec![
                "https://s0.example/1",
                "https://s0.example/2",
                "https://s0.example/3",
                "https://s1.example/1",
                "https://s1.example/2",
                "https://s1.example/3",
                "https://s2.example/1",
                "https://s2.example/2",
            ]
        );

        let again = collect_links(&reader, FEED_SOURCES, 8).await;
        assert_eq!(links, again);
    }

    #[tokio::test]
    async fn test_stops_visiting_sources_once_limit_reached() {
        let reader = full_reader();
        let links = collect_links(&reader, FEED_SOURCES, 4).await;
        assert_eq!(links.len(), 4);
        assert_eq!(
            *reader.visited.borrow(),
            vec![FEED_SOURCES[0].name, FEED_SOURCES[1].name]
        );
    }

    #[tokio::test]
    async fn test_failing_source_is_skipped() {
        let reader = StaticFeedReader::default()
            .with(&FEED_SOURCES[0], &["https://a.example/1", "https://a.example/2"])
            .with(&FEED_SOURCES[2], &["https://c.example/1"]);

        let links = collect_links(&reader, FEED_SOURCES, 8).await;
        assert_eq!(
            links,
            vec!["https://a.example/1", "https://a.example/2", "https://c.example/1"]
        );
        assert_eq!(reader.visited.borrow().len(), FEED_SOURCES.len());
    }

    #[tokio::test]
    async fn test_duplicates_across_sources_are_kept() {
        let reader = StaticFeedReader::default()
            .with(&FEED_SOURCES[0], &["https://same.example/x"])
            .with(&FEED_SOURCES[1], &["https://same.example/x"]);

        let links = collect_links(&reader, FEED_SOURCES, 3).await;
        assert_eq!(links, vec!["https://same.example/x", "https://same.example/x"]);
    }

    #[tokio::test]
    async fn test_http_reader_reports_unreachable_feed() {
        let reader = HttpFeedReader::new(offline_client());
        let source = FeedSource {
            name: "unreachable",
            url: "http://127.0.0.1:1/feed.xml",
        };
        let err = reader.entry_links(&source).await.unwrap_err();
        assert!(matches!(err, FeedError::Http { .. }));
    }
}
