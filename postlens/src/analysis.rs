//! Analysis stage: composes the sentiment and summary inferences and stamps
//! the analysis time.

use chrono::{DateTime, Local, Locale};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::llm::sentiment::{self, Sentiment};
use crate::llm::{summary, LlmProvider};

/// Combined analysis of one post text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    pub sentiment: Sentiment,
    pub summary: String,
    pub analyzed_at: String,
}

/// Run both inferences against the same text and stamp the current time.
///
/// The two calls run sequentially; if either fails the stage fails with that
/// call's error and no partial payload is returned.
pub async fn analyze_content<S, M>(
    sentiment_provider: &S,
    summary_provider: &M,
    text: &str,
) -> Result<AnalysisPayload>
where
    S: LlmProvider + ?Sized,
    M: LlmProvider + ?Sized,
{
    let sentiment = sentiment::classify_sentiment(sentiment_provider, text).await?;
    let summary = summary::summarize_post(summary_provider, text).await?;
    let analyzed_at = format_analysis_time(Local::now());

    info!(%sentiment, summary_chars = summary.len(), "analysis complete");

    Ok(AnalysisPayload {
        sentiment,
        summary,
        analyzed_at,
    })
}

/// Format an analysis timestamp the way it appears in the sheet:
/// numeric day, long Turkish month name, year and 24-hour time.
pub fn format_analysis_time(when: DateTime<Local>) -> String {
    when.format_localized("%-d %B %Y %H:%M", Locale::tr_TR)
        .to_string()
}
