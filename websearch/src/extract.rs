//! Plain-text extraction from fetched HTML pages.

use std::sync::OnceLock;

use regex_lite::Regex;

#[allow(clippy::expect_used)]
fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("static pattern")
    })
}

#[allow(clippy::expect_used)]
fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("static pattern"))
}

#[allow(clippy::expect_used)]
fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static pattern"))
}

/// Reduce an HTML page to its paragraph text.
///
/// Only `<p>` element content is kept; inner tags are stripped, common
/// entities decoded, and whitespace collapsed. The result is truncated to
/// `max_chars` characters. An empty string means the page had no usable
/// paragraph content.
pub fn extract_paragraph_text(html: &str, max_chars: usize) -> String {
    let html = script_style_re().replace_all(html, " ");

    let mut paragraphs = Vec::new();
    for capture in paragraph_re().captures_iter(&html) {
        let inner = &capture[1];
        let stripped = tag_re().replace_all(inner, " ");
        let decoded = decode_entities(&stripped);
        let collapsed = collapse_whitespace(&decoded);
        if !collapsed.is_empty() {
            paragraphs.push(collapsed);
        }
    }

    truncate_chars(&paragraphs.join("\n"), max_chars)
}

/// Decode the handful of HTML entities that show up in article text.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
