use super::{LlmProvider, LlmRequest};
use crate::error::Result;

/// Generate a short Turkish summary of a post text with one LLM call.
///
/// The trimmed model output is returned verbatim; unlike sentiment there is
/// no further normalization.
pub async fn summarize_post<P: LlmProvider + ?Sized>(provider: &P, text: &str) -> Result<String> {
    let prompt = format!(
        "Aşağıdaki gönderiyi 1-2 çok kısa ve öz cümleyle Türkçe olarak özetle. \
         Özet, gönderinin ana fikrini, varsa temel tartışmasını ve önemli noktalarını içermeli. \
         Gönderinin tamamını anlamaya çalış ve özetini buna göre oluştur:\n\n\"{}\"",
        text
    );

    let response = provider
        .generate(LlmRequest {
            prompt,
            max_tokens: Some(100),
            temperature: Some(0.7),
            timeout_seconds: None,
        })
        .await?;

    Ok(response.content.trim().to_string())
}
