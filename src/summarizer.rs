//! Korean news summaries from a chat-completion model.

use crate::api::{AskAsync, Completion};
use crate::error::SummaryError;
use tracing::{info, instrument, warn};

/// Build the summary instruction for an article body.
///
/// Asks for a 3-5 sentence, fact-focused Korean summary with filler removed,
/// followed by the body itself.
pub fn build_prompt(text: &str) -> String {
    format!(
        "\n다음 뉴스 본문을 한국어로 핵심 요약해줘.\n\
         - 길이: 3~5문장\n\
         - 사실 중심으로 작성\n\
         - 불필요한 수식어 제거\n\
         \n\
         본문:\n\
         {text}\n"
    )
}

/// Summarizes article text with one LLM request per call.
#[derive(Debug)]
pub struct Summarizer<A> {
    llm: A,
}

impl<A> Summarizer<A>
where
    A: AskAsync<Response = Completion>,
{
    pub fn new(llm: A) -> Self {
        Self { llm }
    }

    #[cfg(test)]
    pub(crate) fn llm(&self) -> &A {
        &self.llm
    }

    /// Return the model's summary of `text`.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        let completion = self.llm.ask(&build_prompt(text)).await?;
        if completion.finish_reason.as_deref() == Some("length") {
            warn!("Summary was cut off by the token limit");
        }
        info!(chars = completion.text.chars().count(), "Generated summary");
        Ok(completion.text)
    }
}
