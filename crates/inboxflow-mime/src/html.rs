//! HTML flattening for messages that carry no plain-text alternative.

use htmd::HtmlToMarkdown;

use crate::error::{Error, Result};

/// Converts an HTML body into readable text.
///
/// Markup is removed, entities such as `&nbsp;` are decoded, and the contents
/// of `<head>`, `<style>` and `<script>` are dropped. Structural elements keep
/// a light Markdown rendering (headings, list bullets, emphasis).
///
/// # Errors
///
/// Returns an error if the converter rejects the document.
pub fn strip_html(html: &str) -> Result<String> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["head", "style", "script"])
        .build();

    let text = converter
        .convert(html)
        .map_err(|e| Error::Html(e.to_string()))?;

    Ok(text.replace('\u{a0}', " ").trim().to_string())
}
