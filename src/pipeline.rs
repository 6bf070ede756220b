//! One batch: collect links, then fetch, summarize and render each article.
//!
//! ```text
//! Idle → Collecting → (Fetching → Summarizing → Rendered | Failed) × N → Idle
//! ```
//!
//! By default articles are handled one at a time and every step reaches the
//! renderer as it happens, so an article's page is on screen while its
//! summary is being generated. With `concurrency > 1` articles are processed
//! ahead and each is rendered, in link order, once complete. A failed fetch
//! is rendered inline and skips summarization; a failed summary is rendered
//! inline under the article. Neither stops the batch.

use crate::api::{AskAsync, Completion};
use crate::error::{FetchError, SummaryError};
use crate::feeds::{FeedReader, collect_links};
use crate::fetcher::ArticleFetcher;
use crate::models::{ArticleRecord, FeedSource};
use crate::render::Renderer;
use crate::summarizer::Summarizer;
use futures::stream::{self, StreamExt};
use std::io;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// What happened to a single collected link.
#[derive(Debug)]
pub enum ArticleOutcome {
    /// The page was fetched; the summary may still have failed.
    Fetched {
        record: ArticleRecord,
        summary: Result<String, SummaryError>,
    },
    /// The page could not be fetched, so no summary was attempted.
    FetchFailed { url: String, error: FetchError },
}

/// Counters for one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub collected: usize,
    pub summarized: usize,
    pub fetch_failed: usize,
    pub summary_failed: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: &ArticleOutcome) {
        match outcome {
            ArticleOutcome::Fetched { summary: Ok(_), .. } => self.summarized += 1,
            ArticleOutcome::Fetched { summary: Err(_), .. } => self.summary_failed += 1,
            ArticleOutcome::FetchFailed { .. } => self.fetch_failed += 1,
        }
    }
}

/// The collaborators a batch runs against, built once per process.
#[derive(Debug)]
pub struct Pipeline<R, F, A> {
    pub reader: R,
    pub fetcher: F,
    pub summarizer: Summarizer<A>,
    pub sources: &'static [FeedSource],
    pub concurrency: usize,
}

impl<R, F, A> Pipeline<R, F, A>
where
    R: FeedReader,
    F: ArticleFetcher,
    A: AskAsync<Response = Completion>,
{
    async fn fetch(&self, position: usize, total: usize, url: &str) -> Result<ArticleRecord, FetchError> {
        info!(position, total, %url, "Analyzing article");
        let fetched = self.fetcher.fetch(url).await;
        if let Err(e) = &fetched {
            warn!(position, %url, error = %e, "Fetch failed; skipping summary");
        }
        fetched
    }

    async fn summarize(&self, position: usize, record: &ArticleRecord) -> Result<String, SummaryError> {
        let summary = self.summarizer.summarize(&record.text).await;
        if let Err(e) = &summary {
            error!(position, url = %record.url, error = %e, "Summary failed");
        }
        summary
    }

    async fn process(&self, position: usize, total: usize, url: String) -> ArticleOutcome {
        match self.fetch(position, total, &url).await {
            Ok(record) => {
                let summary = self.summarize(position, &record).await;
                ArticleOutcome::Fetched { record, summary }
            }
            Err(error) => ArticleOutcome::FetchFailed { url, error },
        }
    }

    /// Run one full batch for `limit` articles, rendering as it goes.
    ///
    /// Only rendering errors (for example a closed stdout) abort the batch.
    #[instrument(level = "info", name = "batch", skip(self, renderer))]
    pub async fn run<W: Renderer>(&self, limit: usize, renderer: &mut W) -> io::Result<BatchStats> {
        let t0 = Instant::now();
        renderer.collecting(limit)?;

        let links = collect_links(&self.reader, self.sources, limit).await;
        let total = links.len();
        renderer.collected(total)?;

        let mut stats = BatchStats {
            collected: total,
            ..BatchStats::default()
        };

        if self.concurrency <= 1 {
            for (index, url) in links.into_iter().enumerate() {
                let outcome = self.process_live(index + 1, total, url, renderer).await?;
                stats.record(&outcome);
            }
        } else {
            let outcomes = stream::iter(links.into_iter().enumerate())
                .map(|(index, url)| self.process(index + 1, total, url))
                .buffered(self.concurrency);
            let mut outcomes = std::pin::pin!(outcomes);

            let mut position = 0;
            while let Some(outcome) = outcomes.next().await {
                position += 1;
                stats.record(&outcome);
                replay(renderer, position, total, &outcome)?;
            }
        }

        renderer.finished(&stats)?;
        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            collected = stats.collected,
            summarized = stats.summarized,
            fetch_failed = stats.fetch_failed,
            summary_failed = stats.summary_failed,
            "Batch complete"
        );
        Ok(stats)
    }

    /// One article, rendered step by step: the page is shown before the
    /// summary request is sent.
    async fn process_live<W: Renderer>(
        &self,
        position: usize,
        total: usize,
        url: String,
        renderer: &mut W,
    ) -> io::Result<ArticleOutcome> {
        renderer.article_started(position, total)?;

        let record = match self.fetch(position, total, &url).await {
            Ok(record) => record,
            Err(error) => {
                renderer.fetch_failed(position, &url, &error)?;
                return Ok(ArticleOutcome::FetchFailed { url, error });
            }
        };
        renderer.article_fetched(position, &record)?;

        renderer.summarizing(position)?;
        let summary = self.summarize(position, &record).await;
        renderer.summary(position, &summary)?;

        Ok(ArticleOutcome::Fetched { record, summary })
    }
}

/// Render a finished outcome with the same events the live path emits.
fn replay<W: Renderer>(
    renderer: &mut W,
    position: usize,
    total: usize,
    outcome: &ArticleOutcome,
) -> io::Result<()> {
    renderer.article_started(position, total)?;
    match outcome {
        ArticleOutcome::Fetched { record, summary } => {
            renderer.article_fetched(position, record)?;
            renderer.summarizing(position)?;
            renderer.summary(position, summary)
        }
        ArticleOutcome::FetchFailed { url, error } => renderer.fetch_failed(position, url, error),
    }
}
