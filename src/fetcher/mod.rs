//! Article retrieval.
//!
//! One URL, one GET, one extraction pass; there is no retry. Failures come
//! back as [`FetchError`] so the caller can report them next to the article
//! and move on. Paywalls, dead links and odd markup are routine here.

pub mod extract;

use crate::error::FetchError;
use crate::models::ArticleRecord;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How far into the page a `<meta charset>` declaration is looked for.
const CHARSET_SNIFF_BYTES: usize = 4096;

static HEADER_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i-u)charset\s*=\s*["']?([a-z0-9_:.\-]+)"#).unwrap());
static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).unwrap()
});

/// Something that turns an article URL into an [`ArticleRecord`].
pub trait ArticleFetcher {
    async fn fetch(&self, url: &str) -> Result<ArticleRecord, FetchError>;
}

/// Downloads pages with the shared HTTP client and extracts them.
#[derive(Debug, Clone)]
pub struct HttpArticleFetcher {
    client: Client,
}

impl HttpArticleFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

fn label_encoding(re: &Regex, haystack: &[u8]) -> Option<&'static Encoding> {
    re.captures(haystack)
        .and_then(|c| Encoding::for_label(c.get(1)?.as_bytes()))
}

/// Decode an HTML body to text.
///
/// A byte-order mark wins, then the `Content-Type` charset, then a
/// `<meta>` declaration near the top of the page; UTF-8 otherwise. Many
/// Korean sites still serve EUC-KR and only say so in the markup.
pub fn decode_html(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(|ct| label_encoding(&HEADER_CHARSET, ct.as_bytes()))
        .or_else(|| {
            let head = &body[..body.len().min(CHARSET_SNIFF_BYTES)];
            label_encoding(&META_CHARSET, head)
        })
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        debug!(encoding = used.name(), "Page contained malformed byte sequences");
    }
    text.into_owned()
}

impl ArticleFetcher for HttpArticleFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<ArticleRecord, FetchError> {
        let parsed = validate_url(url)?;

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en;q=0.5")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let body = decode_html(&bytes, content_type.as_deref());
        let record = extract::extract_article(&body, url);

        if record.text.is_empty() {
            warn!(bytes = body.len(), "No article text found on page");
        }
        info!(
            bytes = body.len(),
            chars = record.text.chars().count(),
            authors = record.authors.len(),
            "Parsed article"
        );
        Ok(record)
    }
}
