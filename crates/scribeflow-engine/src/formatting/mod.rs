//! Formatting engine: turns a block's text plus its [`FormatState`] into markup.
//!
//! Formatting is whole-block. Each active format wraps the *entire* content in
//! one marker, always in the same nesting order (outermost first):
//!
//! | format    | marker                                   |
//! |-----------|------------------------------------------|
//! | highlight | `<span style="background-color: …">`     |
//! | color     | `<span style="color: …">`                |
//! | bold      | `<strong>`                               |
//! | italic    | `<em>`                                   |
//! | underline | `<u>`                                    |
//! | code      | `<code class="inline-code">`             |
//!
//! Input is first reduced to plain text by [`plain_text`], which removes exactly
//! the markers above. Rendering already-rendered output therefore yields the same
//! markup again instead of nesting a second layer. Per-character ranges are not
//! representable in this model.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{FormatKind, FormatState};

/// Markers emitted by [`render`], nothing else
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"</?(?:strong|em|u)>|<code class="inline-code">|</code>|<span style="(?:background-)?color: [^"]*">|</span>"#,
    )
    .expect("marker regex is valid")
});

/// Wrapping order, innermost first
const WRAP_ORDER: [FormatKind; 6] = [
    FormatKind::Code,
    FormatKind::Underline,
    FormatKind::Italic,
    FormatKind::Bold,
    FormatKind::Color,
    FormatKind::Highlight,
];

/// Render `content` with every active format in `format` applied
pub fn render(content: &str, format: &FormatState) -> String {
    let mut html = html_escape::encode_text(&plain_text(content)).into_owned();
    for kind in WRAP_ORDER {
        if format.is_active(kind) {
            html = wrap(kind, &html, format);
        }
    }
    html
}

/// Escape text for display without applying any format (used for code blocks)
pub fn render_verbatim(content: &str) -> String {
    html_escape::encode_text(content).into_owned()
}

/// Strip formatting markers and decode entities, leaving the displayable text
pub fn plain_text(content: &str) -> String {
    let stripped = MARKER_RE.replace_all(content, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

fn wrap(kind: FormatKind, inner: &str, format: &FormatState) -> String {
    match kind {
        FormatKind::Bold => format!("<strong>{inner}</strong>"),
        FormatKind::Italic => format!("<em>{inner}</em>"),
        FormatKind::Underline => format!("<u>{inner}</u>"),
        FormatKind::Code => format!(r#"<code class="inline-code">{inner}</code>"#),
        FormatKind::Color | FormatKind::Highlight => {
            let property = if kind == FormatKind::Color {
                "color"
            } else {
                "background-color"
            };
            let value = format.param(kind).unwrap_or_default();
            let value = html_escape::encode_double_quoted_attribute(value);
            format!(r#"<span style="{property}: {value}">{inner}</span>"#)
        }
    }
}
