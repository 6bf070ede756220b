//! Data models shared by the collector, fetcher and presentation loop.
//!
//! - [`FeedSource`]: a named syndication feed, fixed for the process lifetime
//! - [`ArticleRecord`]: structured fields extracted from one article page
//!
//! Records are built fresh for every fetch and dropped once rendered.

use chrono::{DateTime, FixedOffset};

/// A named RSS/Atom feed to pull article links from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSource {
    /// Display name of the outlet.
    pub name: &'static str,
    /// Feed URL.
    pub url: &'static str,
}

/// Korean news feeds, in the order they are visited by the collector.
pub const FEED_SOURCES: &[FeedSource] = &[
    FeedSource {
        name: "구글 뉴스(한국)",
        url: "https://news.google.com/rss?hl=ko&gl=KR&ceid=KR:ko",
    },
    FeedSource {
        name: "한국경제",
        url: "https://www.hankyung.com/feed",
    },
    FeedSource {
        name: "머니투데이",
        url: "http://rss.mt.co.kr/mt_news.xml",
    },
    FeedSource {
        name: "YTN 속보",
        url: "https://www.ytn.co.kr/rss/news.xml",
    },
];

/// The structured content of a single article page.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// Headline, empty when the page exposes none.
    pub title: String,
    /// Main body text, paragraphs separated by blank lines.
    pub text: String,
    /// Publication timestamp when the page declares a parseable one.
    pub publish_date: Option<DateTime<FixedOffset>>,
    /// Bylines in page order, without duplicates.
    pub authors: Vec<String>,
    /// The URL the record was fetched from.
    pub url: String,
}
