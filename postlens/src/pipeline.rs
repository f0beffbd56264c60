//! Caller-side workflow threading one post through the three stages.

use std::sync::Arc;

use crate::analysis::{self, AnalysisPayload};
use crate::error::Result;
use crate::llm::LlmProvider;
use crate::oembed::{self, ContentPayload, EmbedProvider};
use crate::sheets::{self, Record, RowSink};

/// The fetch → analyze → append sequence as an explicit workflow object.
///
/// The workflow holds the provider handles; the payloads are threaded through
/// as immutable data. Each step is a pure function of its input plus one
/// external call, so the caller may stop after any step with nothing to
/// clean up.
pub struct PostWorkflow {
    embed: Arc<dyn EmbedProvider>,
    sentiment_llm: Arc<dyn LlmProvider>,
    summary_llm: Arc<dyn LlmProvider>,
    sink: Arc<dyn RowSink>,
    allowed_prefixes: Vec<String>,
}

impl PostWorkflow {
    pub fn new(
        embed: Arc<dyn EmbedProvider>,
        sentiment_llm: Arc<dyn LlmProvider>,
        summary_llm: Arc<dyn LlmProvider>,
        sink: Arc<dyn RowSink>,
        allowed_prefixes: Vec<String>,
    ) -> Self {
        Self {
            embed,
            sentiment_llm,
            summary_llm,
            sink,
            allowed_prefixes,
        }
    }

    /// Stage one: validate the post URL and fetch its content.
    pub async fn fetch(&self, post_url: &str) -> Result<ContentPayload> {
        oembed::fetch_post_content(self.embed.as_ref(), &self.allowed_prefixes, post_url).await
    }

    /// Stage two: run both inferences over the extracted text.
    pub async fn analyze(&self, content: &ContentPayload) -> Result<AnalysisPayload> {
        self.analyze_text(&content.text).await
    }

    /// Analyze a bare text, for callers holding only the extracted string.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisPayload> {
        analysis::analyze_content(self.sentiment_llm.as_ref(), self.summary_llm.as_ref(), text)
            .await
    }

    /// Combine the two payloads into the record that becomes one sheet row.
    pub fn assemble(content: &ContentPayload, analysis: &AnalysisPayload) -> Record {
        Record {
            author_name: content.author_name.clone(),
            text: content.text.clone(),
            sentiment: analysis.sentiment.to_string(),
            summary: analysis.summary.clone(),
            analyzed_at: analysis.analyzed_at.clone(),
            source_url: content.source_url.clone(),
        }
    }

    /// Stage three: validate the record and append it to the sheet.
    pub async fn append(&self, record: &Record) -> Result<serde_json::Value> {
        sheets::append_record(self.sink.as_ref(), record).await
    }

    /// Run the full sequence for one post URL.
    pub async fn run(&self, post_url: &str) -> Result<(Record, serde_json::Value)> {
        let content = self.fetch(post_url).await?;
        let analysis = self.analyze(&content).await?;
        let record = Self::assemble(&content, &analysis);
        let response = self.append(&record).await?;
        Ok((record, response))
    }
}
