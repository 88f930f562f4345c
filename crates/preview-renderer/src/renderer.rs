//! README renderer.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::escape_html;
use crate::fence;
use crate::highlight;
use crate::sanitize::sanitize;
use crate::slug::Slugger;

/// Prefix crates.io puts in front of heading anchor ids.
const DEFAULT_ANCHOR_PREFIX: &str = "user-content-";

/// Result of rendering a README.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Text of the first H1 heading.
    pub title: Option<String>,
    /// Headings in document order.
    pub headings: Vec<Heading>,
}

/// A rendered heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (1-6).
    pub level: u8,
    /// Plain heading text.
    pub title: String,
    /// Anchor id, including the prefix.
    pub id: String,
}

/// Markdown to HTML renderer for crate READMEs.
#[derive(Clone, Debug)]
pub struct ReadmeRenderer {
    gfm: bool,
    anchor_prefix: String,
}

impl Default for ReadmeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadmeRenderer {
    /// Create a renderer with GFM enabled and the crates.io anchor prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            anchor_prefix: DEFAULT_ANCHOR_PREFIX.to_owned(),
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Set the prefix for heading anchor ids.
    #[must_use]
    pub fn with_anchor_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anchor_prefix = prefix.into();
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let base = Options::ENABLE_HEADING_ATTRIBUTES;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM
        } else {
            base
        }
    }

    /// Render markdown to HTML.
    #[must_use]
    pub fn render(&self, markdown: &str) -> RenderResult {
        let events: Vec<Event<'_>> = Parser::new_ext(markdown, self.parser_options()).collect();

        let mut out = Vec::with_capacity(events.len());
        let mut slugger = Slugger::new();
        let mut headings = Vec::new();
        let mut title = None;

        let mut code: Option<CodeBlock> = None;

        for (i, event) in events.iter().enumerate() {
            if let Some(block) = code.as_mut() {
                match event {
                    Event::Text(text) => block.text.push_str(text),
                    Event::End(TagEnd::CodeBlock) => {
                        out.push(Event::Html(block.to_html().into()));
                        code = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    let text = heading_text(&events[i + 1..]);
                    let slug = match id {
                        Some(explicit) => slugger.claim(explicit),
                        None => slugger.slug(&text),
                    };
                    let anchor_id = escape_html(&format!("{}{slug}", self.anchor_prefix));
                    let level_num = heading_level_to_num(*level);

                    if level_num == 1 && title.is_none() {
                        title = Some(text.clone());
                    }

                    out.push(Event::Start(Tag::Heading {
                        level: *level,
                        id: None,
                        classes: classes.clone(),
                        attrs: attrs.clone(),
                    }));
                    out.push(Event::InlineHtml(
                        format!(
                            r##"<a href="#{anchor_id}" id="{anchor_id}" class="anchor" aria-hidden="true"></a>"##
                        )
                        .into(),
                    ));
                    headings.push(Heading {
                        level: level_num,
                        title: text,
                        id: anchor_id,
                    });
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => fence::language(info),
                        CodeBlockKind::Indented => String::new(),
                    };
                    code = Some(CodeBlock {
                        language,
                        text: String::new(),
                    });
                }
                other => out.push(other.clone()),
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, out.into_iter());

        RenderResult {
            html: sanitize(&output),
            title,
            headings,
        }
    }
}

/// A fenced or indented code block being collected.
struct CodeBlock {
    language: String,
    text: String,
}

impl CodeBlock {
    fn to_html(&self) -> String {
        if self.language.is_empty() {
            return format!("<pre><code>{}</code></pre>\n", escape_html(&self.text));
        }

        let body = highlight::highlight(&self.language, &self.text)
            .unwrap_or_else(|| escape_html(&self.text));
        format!(
            "<pre><code class=\"language-{}\">{body}</code></pre>\n",
            escape_html(&self.language)
        )
    }
}

/// Collect plain text of a heading from the events following its start tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_owned()
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> RenderResult {
        ReadmeRenderer::new().render(markdown)
    }

    #[test]
    fn test_heading_anchor() {
        let result = render("## Getting Started");
        assert!(result.html.starts_with(
            "<h2><a href=\"#user-content-getting-started\" id=\"user-content-getting-started\" \
             class=\"anchor\" aria-hidden=\"true\""
        ));
        assert!(result.html.ends_with("</a>Getting Started</h2>\n"));
    }

    #[test]
    fn test_title_is_first_h1() {
        let result = render("Intro\n\n# First\n\n# Second\n");
        assert_eq!(result.title.as_deref(), Some("First"));
    }

    #[test]
    fn test_no_h1_no_title() {
        let result = render("## Usage\n\ntext\n");
        assert_eq!(result.title, None);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## The `Serialize` trait");
        assert_eq!(result.headings[0].title, "The Serialize trait");
        assert_eq!(result.headings[0].id, "user-content-the-serialize-trait");
    }

    #[test]
    fn test_duplicate_headings() {
        let result = render("## Example\n\n## Example\n");
        let ids: Vec<&str> = result.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["user-content-example", "user-content-example-1"]
        );
    }

    #[test]
    fn test_explicit_heading_id() {
        let result = render("## Install {#setup}");
        assert_eq!(result.headings[0].id, "user-content-setup");
        assert_eq!(result.headings[0].title, "Install");
    }

    #[test]
    fn test_heading_levels() {
        let result = render("# A\n\n### B\n\n###### C\n");
        let levels: Vec<u8> = result.headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 3, 6]);
    }

    #[test]
    fn test_custom_anchor_prefix() {
        let result = ReadmeRenderer::new().with_anchor_prefix("").render("## Usage");
        assert_eq!(result.headings[0].id, "usage");
    }

    #[test]
    fn test_rustdoc_fence_is_rust() {
        let result = render("```rust,no_run\nfn main() {}\n```\n");
        assert!(result.html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(result.html.contains(r#"<span class="hl-"#));
    }

    #[test]
    fn test_unknown_language_stays_plain() {
        let result = render("```zzz\na < b\n```\n");
        assert_eq!(
            result.html,
            "<pre><code class=\"language-zzz\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn test_indented_code_block() {
        let result = render("    let x = 1;\n");
        assert_eq!(result.html, "<pre><code>let x = 1;\n</code></pre>\n");
    }

    #[test]
    fn test_unannotated_fence_has_no_class() {
        let result = render("```\nplain\n```\n");
        assert_eq!(result.html, "<pre><code>plain\n</code></pre>\n");
    }

    #[test]
    fn test_gfm_table() {
        let result = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<td>1</td>"));
    }

    #[test]
    fn test_gfm_disabled() {
        let result = ReadmeRenderer::new()
            .with_gfm(false)
            .render("~~gone~~");
        assert!(!result.html.contains("<del>"));
    }

    #[test]
    fn test_strikethrough_and_tasklist() {
        let result = render("~~old~~\n\n- [x] done\n- [ ] todo\n");
        assert!(result.html.contains("<del>old</del>"));
        assert!(result.html.contains("checkbox"));
    }

    #[test]
    fn test_allowlisted_html_survives() {
        let result = render(
            "<p align=\"center\">logo</p>\n\n<details><summary>More</summary>\n\nHidden\n\n</details>\n\n<img src=\"banner.png\" width=\"300\">\n",
        );
        assert!(result.html.contains("<p align=\"center\">logo</p>"));
        assert!(result.html.contains("<details><summary>More</summary>"));
        assert!(result.html.contains("<img src=\"banner.png\" width=\"300\">"));
    }

    #[test]
    fn test_unsafe_html_removed() {
        let result = render(
            "<style>body{display:none}</style>\n\n<img src=x onerror=\"alert(1)\">\n\n<script>alert(2)</script>",
        );
        assert!(!result.html.contains("<style"));
        assert!(!result.html.contains("display:none"));
        assert!(!result.html.contains("<script"));
        assert!(!result.html.contains("onerror"));
        assert!(result.html.contains("<img src=\"x\">"));
    }

    #[test]
    fn test_task_list_checkbox_survives() {
        let result = render("- [x] done\n");
        assert!(result.html.contains("checked"));
        assert!(result.html.contains("type=\"checkbox\""));
    }
}
