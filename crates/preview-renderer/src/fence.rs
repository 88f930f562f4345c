//! Code fence info string handling.

/// Rustdoc code block attributes that do not name a language.
const RUSTDOC_ATTRIBUTES: &[&str] = &[
    "ignore",
    "should_panic",
    "no_run",
    "compile_fail",
    "standalone_crate",
    "test_harness",
    "allow_fail",
];

fn is_rustdoc_attribute(token: &str) -> bool {
    if RUSTDOC_ATTRIBUTES.contains(&token) || token.starts_with("ignore-") {
        return true;
    }
    token
        .strip_prefix("edition")
        .is_some_and(|year| !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()))
}

/// Resolve the highlighting language of a fenced code block.
///
/// Returns an empty string for unannotated fences.
pub(crate) fn language(info: &str) -> String {
    let tokens: Vec<&str> = info
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return String::new();
    }

    tokens
        .iter()
        .find(|t| !is_rustdoc_attribute(t))
        .map_or_else(|| "rust".to_owned(), |lang| (*lang).to_owned())
}
