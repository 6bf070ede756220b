//! Generic article extraction from an HTML page.
//!
//! Pulls the headline, publication date, bylines and body text out of a
//! news page using the metadata most publishers expose:
//!
//! | Field | Sources, in priority order |
//! |-------|----------------------------|
//! | title | `og:title`, `<title>`, first `<h1>` |
//! | date | published-time meta tags, JSON-LD `datePublished`, `<time datetime>` |
//! | authors | author meta tags, JSON-LD `author` |
//! | text | `<p>` in article containers, container text, every `<p>` |

use crate::models::ArticleRecord;
use crate::utils::collapse_whitespace;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Below this many characters a body candidate is considered a miss.
const MIN_BODY_CHARS: usize = 200;

/// Offset assumed for timestamps that carry no zone (the feeds are Korean).
const KST_OFFSET_SECS: i32 = 9 * 3600;

const ARTICLE_CONTAINERS: &str = "[itemprop=articleBody], #articletxt, #textBody, \
     #CmAdContent, #articleBody, #article-body, .article-body, .article_body, \
     #newsct_article, article";

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static OG_TITLE: Lazy<Selector> = Lazy::new(|| sel(r#"meta[property="og:title"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| sel("title"));
static H1: Lazy<Selector> = Lazy::new(|| sel("h1"));
static DATE_META: Lazy<Selector> = Lazy::new(|| {
    sel(r#"meta[property="article:published_time"], meta[property="og:published_time"],
        meta[name="pubdate"], meta[name="article:published_time"], meta[name="date"],
        meta[itemprop="datePublished"]"#)
});
static AUTHOR_META: Lazy<Selector> = Lazy::new(|| {
    sel(r#"meta[name="author"], meta[property="article:author"],
        meta[property="dable:author"], meta[name="byl"]"#)
});
static JSON_LD: Lazy<Selector> = Lazy::new(|| sel(r#"script[type="application/ld+json"]"#));
static TIME: Lazy<Selector> = Lazy::new(|| sel("time[datetime]"));
static CONTAINERS: Lazy<Selector> = Lazy::new(|| sel(ARTICLE_CONTAINERS));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| sel("p"));

/// Build an [`ArticleRecord`] from a downloaded page.
pub fn extract_article(html: &str, url: &str) -> ArticleRecord {
    let document = Html::parse_document(html);
    let json_ld = json_ld_nodes(&document);

    ArticleRecord {
        title: extract_title(&document),
        text: extract_text(&document),
        publish_date: extract_publish_date(&document, &json_ld),
        authors: extract_authors(&document, &json_ld),
        url: url.to_string(),
    }
}

fn meta_content(el: ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("content")
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn extract_title(document: &Html) -> String {
    document
        .select(&OG_TITLE)
        .find_map(meta_content)
        .or_else(|| {
            document
                .select(&TITLE)
                .map(element_text)
                .find(|t| !t.is_empty())
        })
        .or_else(|| {
            document
                .select(&H1)
                .map(element_text)
                .find(|t| !t.is_empty())
        })
        .unwrap_or_default()
}

/// Every JSON-LD node on the page, with top-level arrays and `@graph` flattened.
fn json_ld_nodes(document: &Html) -> Vec<Value> {
    let mut nodes = Vec::new();
    for script in document.select(&JSON_LD) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        let mut pending = vec![json];
        while let Some(node) = pending.pop() {
            match node {
                Value::Array(items) => pending.extend(items.into_iter().rev()),
                Value::Object(mut obj) => {
                    if let Some(graph) = obj.remove("@graph") {
                        pending.push(graph);
                    }
                    nodes.push(Value::Object(obj));
                }
                _ => {}
            }
        }
    }
    nodes
}

/// Parse the timestamp formats seen in news metadata.
///
/// Zone-less values are read as Korea Standard Time.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let kst = FixedOffset::east_opt(KST_OFFSET_SECS)?;
    let naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y.%m.%d %H:%M:%S",
        "%Y.%m.%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .or_else(|| {
        ["%Y-%m-%d", "%Y.%m.%d", "%Y%m%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })?;

    naive.and_local_timezone(kst).single()
}

fn extract_publish_date(document: &Html, json_ld: &[Value]) -> Option<DateTime<FixedOffset>> {
    document
        .select(&DATE_META)
        .filter_map(meta_content)
        .find_map(|s| parse_date(&s))
        .or_else(|| {
            json_ld
                .iter()
                .filter_map(|node| node.get("datePublished").and_then(Value::as_str))
                .find_map(parse_date)
        })
        .or_else(|| {
            document
                .select(&TIME)
                .filter_map(|t| t.value().attr("datetime"))
                .find_map(parse_date)
        })
}

fn json_ld_author_names(author: &Value, out: &mut Vec<String>) {
    match author {
        Value::String(s) => out.push(s.clone()),
        Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(Value::as_str) {
                out.push(name.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                json_ld_author_names(item, out);
            }
        }
        _ => {}
    }
}

fn extract_authors(document: &Html, json_ld: &[Value]) -> Vec<String> {
    let mut names: Vec<String> = document.select(&AUTHOR_META).filter_map(meta_content).collect();
    for node in json_ld {
        if let Some(author) = node.get("author") {
            json_ld_author_names(author, &mut names);
        }
    }

    names
        .into_iter()
        .map(|n| collapse_whitespace(&n))
        .filter(|n| !n.is_empty() && !n.starts_with("http://") && !n.starts_with("https://"))
        .unique()
        .collect()
}

/// Text nodes under `el`, skipping script-like subtrees, one per line.
fn visible_text(el: ElementRef<'_>) -> String {
    el.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value().as_element().is_some_and(|e| {
                    matches!(e.name(), "script" | "style" | "noscript" | "figcaption" | "button")
                })
            });
            if hidden {
                return None;
            }
            let line = collapse_whitespace(text);
            (!line.is_empty()).then_some(line)
        })
        .join("\n")
}

fn joined_paragraphs<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> String {
    paragraphs
        .map(element_text)
        .filter(|p| !p.is_empty())
        .unique()
        .join("\n\n")
}

fn extract_text(document: &Html) -> String {
    let containers: Vec<ElementRef<'_>> = document.select(&CONTAINERS).collect();

    let in_containers = joined_paragraphs(containers.iter().flat_map(|c| c.select(&PARAGRAPH)));
    if in_containers.chars().count() >= MIN_BODY_CHARS {
        return in_containers;
    }

    let container_text = containers
        .iter()
        .map(|c| visible_text(*c))
        .max_by_key(|t| t.chars().count())
        .unwrap_or_default();
    if container_text.chars().count() >= MIN_BODY_CHARS {
        return container_text;
    }

    let everywhere = joined_paragraphs(document.select(&PARAGRAPH));
    [in_containers, container_text, everywhere]
        .into_iter()
        .max_by_key(|t| t.chars().count())
        .unwrap_or_default()
}
