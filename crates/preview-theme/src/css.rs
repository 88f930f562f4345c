//! CSS output for theme tokens.
//!
//! Font families become custom properties on `:root` plus `.font-*` classes;
//! other known categories become single-declaration utility classes named the
//! way the utility framework names them (`.max-w-960`, `.grid-cols-crate-info`).

use std::fmt::Write;

use crate::document::{DEFAULT_STACK_MARKER, ThemeDocument, TokenValue};

const DEFAULT_SANS: &[&str] = &[
    "ui-sans-serif",
    "system-ui",
    "sans-serif",
    "Apple Color Emoji",
    "Segoe UI Emoji",
    "Segoe UI Symbol",
    "Noto Color Emoji",
];

const DEFAULT_SERIF: &[&str] = &[
    "ui-serif",
    "Georgia",
    "Cambria",
    "Times New Roman",
    "Times",
    "serif",
];

const DEFAULT_MONO: &[&str] = &[
    "ui-monospace",
    "SFMono-Regular",
    "Menlo",
    "Monaco",
    "Consolas",
    "Liberation Mono",
    "Courier New",
    "monospace",
];

/// Map a token category to its class prefix and CSS property.
fn utility_for(category: &str) -> Option<(&'static str, &'static str)> {
    let utility = match category {
        "maxWidth" => ("max-w", "max-width"),
        "width" => ("w", "width"),
        "height" => ("h", "height"),
        "fontSize" => ("text", "font-size"),
        "padding" => ("p", "padding"),
        "margin" => ("m", "margin"),
        "gridTemplateRows" => ("grid-rows", "grid-template-rows"),
        "gridTemplateColumns" => ("grid-cols", "grid-template-columns"),
        _ => return None,
    };
    Some(utility)
}

fn default_stack(family: &str) -> &'static [&'static str] {
    match family {
        "sans" => DEFAULT_SANS,
        "serif" => DEFAULT_SERIF,
        "mono" => DEFAULT_MONO,
        _ => &[],
    }
}

/// Quote a font family name unless it is a bare identifier.
fn quote_family(name: &str) -> String {
    let bare = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if bare || name.starts_with('"') || name.starts_with('\'') {
        name.to_owned()
    } else {
        format!("\"{name}\"")
    }
}

/// Escape a token name for use in a class selector.
fn escape_class(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn font_stack(family: &str, value: &TokenValue) -> String {
    let entries: &[String] = match value {
        TokenValue::Single(single) => std::slice::from_ref(single),
        TokenValue::Stack(stack) => stack,
    };

    let mut names = Vec::new();
    for entry in entries {
        if entry == DEFAULT_STACK_MARKER {
            names.extend(default_stack(family).iter().map(|name| quote_family(name)));
        } else {
            names.push(quote_family(entry));
        }
    }
    names.join(", ")
}

/// First value of a token; list values beyond the first carry framework
/// options (such as line heights) that plain CSS has no use for.
fn css_value(value: &TokenValue) -> Option<&str> {
    match value {
        TokenValue::Single(single) => Some(single),
        TokenValue::Stack(stack) => stack.first().map(String::as_str),
    }
}

impl ThemeDocument {
    /// Render the `theme.extend` tokens as a stylesheet.
    ///
    /// Categories without a known utility mapping are skipped.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = String::new();

        if let Some(families) = self.theme.extend.get("fontFamily") {
            out.push_str(":root {\n");
            for (family, value) in families {
                let _ = writeln!(out, "  --font-{family}: {};", font_stack(family, value));
            }
            out.push_str("}\n\n");
            for family in families.keys() {
                let _ = writeln!(
                    out,
                    ".font-{} {{ font-family: var(--font-{family}); }}",
                    escape_class(family)
                );
            }
        }

        for (category, tokens) in &self.theme.extend {
            if category == "fontFamily" {
                continue;
            }
            let Some((prefix, property)) = utility_for(category) else {
                tracing::debug!(%category, "No CSS utility for theme category, skipping");
                continue;
            };
            for (name, value) in tokens {
                if let Some(value) = css_value(value) {
                    let _ = writeln!(
                        out,
                        ".{prefix}-{} {{ {property}: {value}; }}",
                        escape_class(name)
                    );
                }
            }
        }

        out
    }
}
