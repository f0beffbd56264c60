use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::{LlmProvider, LlmRequest};
use crate::error::Result;

/// Sentiment label of a post. Always one of exactly three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the sentiment of a post text with one LLM call.
///
/// The text may be the extraction-failure sentinel; whatever string arrives
/// is analyzed as-is.
pub async fn classify_sentiment<P: LlmProvider + ?Sized>(
    provider: &P,
    text: &str,
) -> Result<Sentiment> {
    let prompt = format!(
        "Analyze the sentiment of the following post. Respond only with \"positive\", \"negative\", or \"neutral\":\n\n\"{}\"",
        text
    );

    let response = provider
        .generate(LlmRequest {
            prompt,
            // The answer is a single label, so keep the output tiny and
            // the sampling nearly deterministic.
            max_tokens: Some(10),
            temperature: Some(0.1),
            timeout_seconds: None,
        })
        .await?;

    let sentiment = normalize_label(&response.content);
    debug!(raw = %response.content.trim(), label = %sentiment, "sentiment classified");
    Ok(sentiment)
}

/// Map a raw model reply onto one of the three labels.
///
/// An exact match on the trimmed, lowercased reply is preferred. Models
/// sometimes answer with extra words or punctuation, so otherwise the first
/// label contained in the reply wins, checked positive, then negative, then
/// neutral. Anything else falls back to neutral.
pub fn normalize_label(raw: &str) -> Sentiment {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "positive" => Sentiment::Positive,
        "negative" => Sentiment::Negative,
        "neutral" => Sentiment::Neutral,
        _ => {
            if normalized.contains("positive") {
                Sentiment::Positive
            } else if normalized.contains("negative") {
                Sentiment::Negative
            } else if normalized.contains("neutral") {
                Sentiment::Neutral
            } else {
                Sentiment::Neutral
            }
        }
    }
}
