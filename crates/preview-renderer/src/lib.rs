//! README markdown renderer.
//!
//! Renders a crate README the way the crates.io crate page shows it:
//!
//! - GitHub Flavored Markdown (tables, strikethrough, task lists, footnotes)
//! - Heading anchors with `user-content-` prefixed ids
//! - Fenced code blocks tagged with a `language-*` class, where info strings
//!   made only of rustdoc attributes (`ignore`, `no_run`, ...) mean Rust
//! - Code highlighted on the server with `hl-` classes, styled by
//!   [`highlight::stylesheet`]
//!
//! Raw HTML in the README is sanitized with the crates.io allowlist: scripts,
//! styles and event handler attributes are removed.
//!
//! # Example
//!
//! ```
//! use preview_renderer::ReadmeRenderer;
//!
//! let result = ReadmeRenderer::new().render("# my-crate\n\n```no_run\nfn main() {}\n```\n");
//! assert_eq!(result.title.as_deref(), Some("my-crate"));
//! assert!(result.html.contains(r#"<code class="language-rust">"#));
//! ```

mod fence;
pub mod highlight;
mod renderer;
mod sanitize;
mod slug;

pub use renderer::{Heading, ReadmeRenderer, RenderResult};
pub use slug::Slugger;

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
