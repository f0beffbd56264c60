use scraper::{Html, Selector};
use tracing::warn;

/// Sentinel returned when no post text can be located in the embed HTML.
/// This is a content-quality degradation, not a stage failure.
pub const EXTRACTION_FALLBACK: &str =
    "Could not extract specific post content. Raw HTML might be needed.";

/// Extracts the plain post text from an oEmbed HTML fragment.
///
/// The embed markup nests the post text in `<p>` tags inside a
/// `blockquote.twitter-tweet` container. All matching paragraphs are
/// concatenated in document order, separated by a single space, then trimmed.
pub fn extract_post_text(embed_html: &str) -> String {
    let fragment = Html::parse_fragment(embed_html);
    let paragraph_selector = Selector::parse("blockquote.twitter-tweet p").unwrap();

    let parts: Vec<String> = fragment
        .select(&paragraph_selector)
        .map(|element| element.text().collect::<String>())
        .collect();

    if parts.is_empty() {
        warn!("no post text elements found in embed HTML, returning fallback");
        return EXTRACTION_FALLBACK.to_string();
    }

    parts.join(" ").trim().to_string()
}
