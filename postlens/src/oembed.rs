//! Content fetch stage: post URL validation, oEmbed provider call and
//! text extraction.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::extract;

/// Public oEmbed endpoint used when no override is configured.
pub const DEFAULT_OEMBED_URL: &str = "https://publish.twitter.com/oembed";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Normalized content payload assembled from the provider response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPayload {
    pub author_name: String,
    pub text: String,
    pub embed_html: String,
    pub source_url: String,
}

/// Raw fields read from the oEmbed response body.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedData {
    pub author_name: String,
    pub html: String,
}

/// Narrow interface over the oEmbed provider, so the stage is testable
/// against fakes without a network.
#[async_trait::async_trait]
pub trait EmbedProvider: Send + Sync {
    /// Fetch the embed representation of one post.
    async fn fetch_embed(&self, post_url: &str) -> Result<EmbedData>;
}

/// HTTP client for an oEmbed-style provider.
pub struct OembedClient {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OembedClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }
}

#[async_trait::async_trait]
impl EmbedProvider for OembedClient {
    async fn fetch_embed(&self, post_url: &str) -> Result<EmbedData> {
        // `omit_script=true` keeps the provider's script loader out of the
        // fragment so the static HTML carries the post text.
        let mut request_url = url::Url::parse(&self.endpoint)
            .map_err(|e| PipelineError::Unavailable(format!("invalid oEmbed endpoint: {}", e)))?;
        request_url
            .query_pairs_mut()
            .append_pair("url", post_url)
            .append_pair("omit_script", "true");

        let response = tokio::time::timeout(self.timeout, self.client.get(request_url).send())
            .await
            .map_err(|_| {
                PipelineError::Unavailable("embed provider request timed out".to_string())
            })?
            .map_err(|e| {
                PipelineError::Unavailable(format!("failed to fetch post content: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound(
                "post not found or invalid URL".to_string(),
            ));
        }

        let body = response.text().await.map_err(|e| {
            PipelineError::Unavailable(format!("failed to read embed provider response: {}", e))
        })?;

        if !status.is_success() {
            // Provider failures come back as a JSON body with an `errors` array.
            if let Ok(err_body) = serde_json::from_str::<OembedErrorBody>(&body) {
                if let Some(first) = err_body.errors.first() {
                    return Err(PipelineError::Provider(format!(
                        "embed provider error: {}",
                        first.message
                    )));
                }
            }
            return Err(PipelineError::Unavailable(format!(
                "embed provider returned status {}",
                status
            )));
        }

        serde_json::from_str::<EmbedData>(&body).map_err(|e| {
            PipelineError::Unavailable(format!("failed to parse embed provider response: {}", e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OembedErrorBody {
    errors: Vec<OembedErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct OembedErrorEntry {
    message: String,
}

/// Fetch and assemble the content payload for one post URL.
///
/// The URL is checked against the allow-listed prefixes before any network
/// call is made.
pub async fn fetch_post_content<P: EmbedProvider + ?Sized>(
    provider: &P,
    allowed_prefixes: &[String],
    post_url: &str,
) -> Result<ContentPayload> {
    if post_url.is_empty() {
        return Err(PipelineError::Validation("post URL is required".to_string()));
    }
    if !allowed_prefixes.iter().any(|p| post_url.starts_with(p)) {
        return Err(PipelineError::Validation(
            "please provide a valid post URL from an allowed host".to_string(),
        ));
    }

    let embed = provider.fetch_embed(post_url).await?;
    let text = extract::extract_post_text(&embed.html);
    info!(author = %embed.author_name, chars = text.len(), "fetched post content");

    Ok(ContentPayload {
        author_name: embed.author_name,
        text,
        embed_html: embed.html,
        source_url: post_url.to_string(),
    })
}
