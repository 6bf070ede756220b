//! The interactive loop around the pipeline.
//!
//! The session sits idle at a prompt until the user triggers a batch. Each
//! line read from the input is one [`Command`]:
//!
//! | Input | Effect |
//! |-------|--------|
//! | empty line | run a batch with the current article count |
//! | `3`..`20` | change the article count, then run |
//! | `q`, `quit`, `exit`, end of input | leave |

use crate::api::{AskAsync, Completion};
use crate::config::{MAX_ARTICLES, MIN_ARTICLES};
use crate::feeds::FeedReader;
use crate::fetcher::ArticleFetcher;
use crate::pipeline::{BatchStats, Pipeline};
use crate::render::Renderer;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    RunWithLimit(usize),
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Run,
        "q" | "quit" | "exit" => Command::Quit,
        _ => match line.parse::<usize>() {
            Ok(n) if (MIN_ARTICLES..=MAX_ARTICLES).contains(&n) => Command::RunWithLimit(n),
            Ok(n) => Command::Invalid(format!(
                "기사 개수는 {MIN_ARTICLES}~{MAX_ARTICLES} 사이여야 합니다 (입력: {n})"
            )),
            Err(_) => Command::Invalid(format!("알 수 없는 입력입니다: {line}")),
        },
    }
}

/// Owns the renderer and the current article count between batches.
pub struct Session<'p, R, F, A, W> {
    pipeline: &'p Pipeline<R, F, A>,
    renderer: W,
    limit: usize,
}

impl<'p, R, F, A, W> Session<'p, R, F, A, W>
where
    R: FeedReader,
    F: ArticleFetcher,
    A: AskAsync<Response = Completion>,
    W: Renderer,
{
    pub fn new(pipeline: &'p Pipeline<R, F, A>, renderer: W, limit: usize) -> Self {
        Self {
            pipeline,
            renderer,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run a single batch with the current article count.
    pub async fn run_once(&mut self) -> io::Result<BatchStats> {
        self.pipeline.run(self.limit, &mut self.renderer).await
    }

    /// Prompt, read a command, act on it; repeat until told to quit.
    ///
    /// Returns the number of batches that were run.
    pub async fn run<I>(&mut self, input: I) -> io::Result<usize>
    where
        I: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut batches = 0;

        loop {
            self.renderer.prompt(self.limit)?;
            let Some(line) = lines.next_line().await? else {
                debug!("Input closed");
                break;
            };

            match parse_command(&line) {
                Command::Quit => break,
                Command::Invalid(message) => self.renderer.notice(&message)?,
                Command::Run => {
                    self.run_once().await?;
                    batches += 1;
                }
                Command::RunWithLimit(n) => {
                    info!(from = self.limit, to = n, "Article count changed");
                    self.limit = n;
                    self.run_once().await?;
                    batches += 1;
                }
            }
        }

        info!(batches, "Session finished");
        Ok(batches)
    }

    #[cfg(test)]
    pub(crate) fn renderer(&self) -> &W {
        &self.renderer
    }
}
