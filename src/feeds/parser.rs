//! Entry-link extraction from RSS 0.9/1.0/2.0 and Atom documents.
//!
//! Parsing is delegated to `feed-rs`, which accepts every syndication format
//! the sources publish and decodes the document from its XML declaration.
//! Only entry links are kept:
//!
//! ```text
//! <rss><channel><item><link>…</link></item></channel></rss>
//! <rdf:RDF><channel/><item><link>…</link></item></rdf:RDF>
//! <feed><entry><link rel="alternate" href="…"/></entry></feed>
//! ```

use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseFeedError};

/// The article link of an entry: the first non-empty link whose relation is
/// absent or `alternate`. `self`, `enclosure` and similar links are ignored.
fn article_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .filter(|l| {
            l.rel
                .as_deref()
                .is_none_or(|rel| rel.eq_ignore_ascii_case("alternate"))
        })
        .map(|l| l.href.trim())
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

/// Parse a feed document and return its entry links in document order.
///
/// Entries without a usable link are skipped.
pub fn parse_entry_links(body: &[u8]) -> Result<Vec<String>, ParseFeedError> {
    let feed = parser::parse(body)?;
    Ok(feed.entries.iter().filter_map(article_link).collect())
}
