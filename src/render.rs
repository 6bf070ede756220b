//! Terminal rendering of a batch.
//!
//! The pipeline reports progress through the [`Renderer`] trait, strictly in
//! article order. For each article the events are `article_started`, then
//! either `fetch_failed` or `article_fetched`, `summarizing` and `summary`.
//! [`MarkdownRenderer`] writes each article as a Markdown section to any
//! [`Write`] sink (stdout in the binary):
//!
//! ```text
//! > 1/8 기사 분석 중...
//! ### 1. {title}
//!
//! 🗓 날짜: 2025-05-06 14:30 +09:00
//! ✍ 기자: 김기자, 이기자
//! [🔗 원문 보기](https://...)
//!
//! #### 📄 본문 일부:
//! {first 400 characters}…
//!
//! > 🧠 요약 생성 중...
//! #### 🧠 요약
//! {summary}
//!
//! ---
//! ```

use crate::config::{MAX_ARTICLES, MIN_ARTICLES};
use crate::error::{FetchError, SummaryError};
use crate::models::ArticleRecord;
use crate::pipeline::BatchStats;
use crate::utils::preview;
use std::io::{self, Write};

const MISSING: &str = "정보 없음";

/// Receives batch progress in order.
pub trait Renderer {
    fn collecting(&mut self, limit: usize) -> io::Result<()>;
    fn collected(&mut self, count: usize) -> io::Result<()>;
    /// `position` is 1-based in every article event.
    fn article_started(&mut self, position: usize, total: usize) -> io::Result<()>;
    fn article_fetched(&mut self, position: usize, record: &ArticleRecord) -> io::Result<()>;
    /// Ends the article; no summary follows.
    fn fetch_failed(&mut self, position: usize, url: &str, error: &FetchError) -> io::Result<()>;
    fn summarizing(&mut self, position: usize) -> io::Result<()>;
    /// Ends the article.
    fn summary(&mut self, position: usize, summary: &Result<String, SummaryError>) -> io::Result<()>;
    fn finished(&mut self, stats: &BatchStats) -> io::Result<()>;
    /// Ask for the next command while idle.
    fn prompt(&mut self, limit: usize) -> io::Result<()>;
    /// A one-line message outside any batch.
    fn notice(&mut self, message: &str) -> io::Result<()>;
}

/// Writes batches as Markdown.
#[derive(Debug)]
pub struct MarkdownRenderer<W> {
    out: W,
}

impl<W: Write> MarkdownRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, position: usize, record: &ArticleRecord) -> io::Result<()> {
        let title = if record.title.is_empty() {
            "(제목 없음)"
        } else {
            record.title.as_str()
        };
        let date = record
            .publish_date
            .map(|d| d.format("%Y-%m-%d %H:%M %:z").to_string())
            .unwrap_or_else(|| MISSING.to_string());
        let authors = if record.authors.is_empty() {
            MISSING.to_string()
        } else {
            record.authors.join(", ")
        };

        writeln!(self.out, "### {position}. {title}\n")?;
        writeln!(self.out, "🗓 날짜: {date}  ")?;
        writeln!(self.out, "✍ 기자: {authors}  ")?;
        writeln!(self.out, "[🔗 원문 보기]({})\n", record.url)?;
        writeln!(self.out, "#### 📄 본문 일부:\n")?;
        if record.text.is_empty() {
            writeln!(self.out, "(본문을 찾지 못했습니다)\n")?;
        } else {
            writeln!(self.out, "{}\n", preview(&record.text))?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for MarkdownRenderer<W> {
    fn collecting(&mut self, _limit: usize) -> io::Result<()> {
        writeln!(self.out, "> 여러 뉴스 사이트에서 최신 기사를 자동 수집 중입니다...\n")?;
        self.out.flush()
    }

    fn collected(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "**총 {count}개의 뉴스를 가져왔습니다.**\n")?;
        writeln!(self.out, "----\n")?;
        self.out.flush()
    }

    fn article_started(&mut self, position: usize, total: usize) -> io::Result<()> {
        writeln!(self.out, "> {position}/{total} 기사 분석 중...\n")?;
        self.out.flush()
    }

    fn article_fetched(&mut self, position: usize, record: &ArticleRecord) -> io::Result<()> {
        self.write_record(position, record)?;
        self.out.flush()
    }

    fn fetch_failed(&mut self, position: usize, url: &str, error: &FetchError) -> io::Result<()> {
        writeln!(self.out, "### {position}. {url}\n")?;
        writeln!(self.out, "❌ 크롤링 실패: {error}\n")?;
        writeln!(self.out, "---\n")?;
        self.out.flush()
    }

    fn summarizing(&mut self, _position: usize) -> io::Result<()> {
        writeln!(self.out, "> 🧠 요약 생성 중...\n")?;
        self.out.flush()
    }

    fn summary(&mut self, _position: usize, summary: &Result<String, SummaryError>) -> io::Result<()> {
        writeln!(self.out, "#### 🧠 요약\n")?;
        match summary {
            Ok(text) => writeln!(self.out, "{text}\n")?,
            Err(e) => writeln!(self.out, "❌ 요약 실패: {e}\n")?,
        }
        writeln!(self.out, "---\n")?;
        self.out.flush()
    }

    fn finished(&mut self, stats: &BatchStats) -> io::Result<()> {
        writeln!(
            self.out,
            "완료: 요약 {}건 · 크롤링 실패 {}건 · 요약 실패 {}건\n",
            stats.summarized, stats.fetch_failed, stats.summary_failed
        )?;
        self.out.flush()
    }

    fn prompt(&mut self, limit: usize) -> io::Result<()> {
        write!(
            self.out,
            "Enter: 최신 뉴스 {limit}건 가져오기 & 요약하기 | 숫자({MIN_ARTICLES}-{MAX_ARTICLES}): 개수 변경 후 실행 | q: 종료\n> "
        )?;
        self.out.flush()
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{ELLIPSIS, PREVIEW_CHARS};
    use chrono::DateTime;

    fn record(text: &str) -> ArticleRecord {
        ArticleRecord {
            title: "금리 동결".to_string(),
            text: text.to_string(),
            publish_date: DateTime::parse_from_rfc3339("2025-05-06T14:30:00+09:00").ok(),
            authors: vec!["김기자".to_string(), "이기자".to_string()],
            url: "https://example.com/a".to_string(),
        }
    }

    fn render(record: &ArticleRecord, summary: &Result<String, SummaryError>) -> String {
        let mut renderer = MarkdownRenderer::new(Vec::new());
        renderer.article_started(2, 8).unwrap();
        renderer.article_fetched(2, record).unwrap();
        renderer.summarizing(2).unwrap();
        renderer.summary(2, summary).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_renders_article_section() {
        let md = render(&record("짧은 본문"), &Ok("세 문장 요약.".to_string()));

        assert!(md.starts_with("> 2/8 기사 분석 중...\n"));
        assert!(md.contains("\n### 2. 금리 동결\n"));
        assert!(md.contains("🗓 날짜: 2025-05-06 14:30 +09:00"));
        assert!(md.contains("✍ 기자: 김기자, 이기자"));
        assert!(md.contains("[🔗 원문 보기](https://example.com/a)"));
        assert!(md.contains("#### 📄 본문 일부:\n\n짧은 본문\n"));
        assert!(md.contains("> 🧠 요약 생성 중...\n\n#### 🧠 요약\n\n세 문장 요약.\n"));
        let preview_at = md.find("#### 📄 본문 일부:").unwrap();
        let summary_at = md.find("#### 🧠 요약").unwrap();
        assert!(preview_at < summary_at);
        assert!(md.trim_end().ends_with("---"));
    }

    #[test]
    fn test_long_text_is_previewed() {
        let text = "가".repeat(PREVIEW_CHARS * 2);
        let md = render(&record(&text), &Ok("요약".to_string()));
        let expected = format!("{}{}\n", "가".repeat(PREVIEW_CHARS), ELLIPSIS);
        assert!(md.contains(&expected));
        assert!(!md.contains(&"가".repeat(PREVIEW_CHARS + 1)));
    }

    #[test]
    fn test_missing_metadata() {
        let mut r = record("");
        r.title.clear();
        r.publish_date = None;
        r.authors.clear();
        let md = render(&r, &Err(SummaryError::EmptyCompletion));

        assert!(md.contains("### 2. (제목 없음)"));
        assert!(md.contains("🗓 날짜: 정보 없음"));
        assert!(md.contains("✍ 기자: 정보 없음"));
        assert!(md.contains("(본문을 찾지 못했습니다)"));
        assert!(md.contains("❌ 요약 실패: LLM response contained no generated text"));
    }

    #[test]
    fn test_fetch_failure_section() {
        let error = FetchError::Status {
            url: "https://example.com/paywalled".to_string(),
            status: 403,
        };
        let mut renderer = MarkdownRenderer::new(Vec::new());
        renderer.article_started(2, 8).unwrap();
        renderer
            .fetch_failed(2, "https://example.com/paywalled", &error)
            .unwrap();
        let md = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(md.contains("### 2. https://example.com/paywalled"));
        assert!(md.contains("❌ 크롤링 실패: HTTP 403 from https://example.com/paywalled"));
        assert!(!md.contains("요약"));
    }

    #[test]
    fn test_batch_header_and_footer() {
        let mut renderer = MarkdownRenderer::new(Vec::new());
        renderer.collecting(8).unwrap();
        renderer.collected(7).unwrap();
        renderer
            .finished(&BatchStats {
                collected: 7,
                summarized: 5,
                fetch_failed: 1,
                summary_failed: 1,
            })
            .unwrap();
        let md = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(md.contains("총 7개의 뉴스를 가져왔습니다."));
        assert!(md.contains("완료: 요약 5건 · 크롤링 실패 1건 · 요약 실패 1건"));
    }
}
