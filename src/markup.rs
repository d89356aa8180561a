//! Markdown-lite rendering for annotation tooltips
//!
//! Supports `**strong**`, `*emphasis*`, `` `code` `` and line breaks. All
//! other text is HTML-escaped. Underscores are left alone since they show up
//! in identifiers far more often than as emphasis.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid code span pattern"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("valid strong pattern"));
// Asterisks must hug the emphasized text, so `a * b * c` stays arithmetic
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^\s*](?:[^*\n]*?[^\s*])?)\*").expect("valid emphasis pattern")
});
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").expect("valid placeholder pattern"));

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render annotation text to HTML
pub fn render(text: &str) -> String {
    // Code spans become private-use placeholders so emphasis can wrap them
    // without reaching inside
    let mut spans = Vec::new();
    let protected = CODE_SPAN.replace_all(text, |caps: &Captures| {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        spans.push(format!("<code>{}</code>", escape_html(inner)));
        format!("\u{E000}{}\u{E001}", spans.len() - 1)
    });

    let escaped = escape_html(&protected);
    let strong = STRONG.replace_all(&escaped, "<strong>$1</strong>");
    let emphasis = EMPHASIS.replace_all(&strong, "<em>$1</em>");
    let restored = PLACEHOLDER.replace_all(&emphasis, |caps: &Captures| {
        caps.get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .and_then(|index| spans.get(index))
            .cloned()
            .unwrap_or_default()
    });

    restored.replace('\n', "<br>")
}
