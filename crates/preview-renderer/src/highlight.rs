//! Server-side syntax highlighting for fenced code blocks.
//!
//! Code is tokenized with syntect and emitted as `<span>` elements carrying
//! `hl-` prefixed scope classes; [`stylesheet`] provides the matching colours.

use std::sync::LazyLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Prefix of every class emitted for highlighted code.
pub const CLASS_PREFIX: &str = "hl-";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
    prefix: CLASS_PREFIX,
};

/// Closest bundled theme to the GitHub style crates.io uses.
const THEME: &str = "InspiredGitHub";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlight `code` as `language`.
///
/// Returns `None` when no bundled syntax matches, leaving the block plain.
pub(crate) fn highlight(language: &str, code: &str) -> Option<String> {
    let syntax = SYNTAXES.find_syntax_by_token(language)?;
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, CLASS_STYLE);

    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(language, error = %err, "Highlighting failed, rendering plain code");
            return None;
        }
    }

    Some(generator.finalize())
}

/// CSS for the classes emitted by highlighted code blocks.
///
/// Falls back to an empty stylesheet, which leaves code unstyled but intact.
#[must_use]
pub fn stylesheet() -> String {
    let themes = ThemeSet::load_defaults();
    let Some(theme) = themes.themes.get(THEME) else {
        tracing::warn!(theme = THEME, "Highlight theme missing");
        return String::new();
    };

    css_for_theme_with_class_style(theme, CLASS_STYLE).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Failed to generate highlight stylesheet");
        String::new()
    })
}
