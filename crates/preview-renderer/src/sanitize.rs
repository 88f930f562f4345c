//! HTML sanitizing with the crates.io allowlist.
//!
//! crates.io strips scripts, styles, event handlers and unknown classes from
//! rendered READMEs, so the preview does the same.

use std::borrow::Cow;

use ammonia::Builder;

use crate::highlight::CLASS_PREFIX;

/// `rel` added to every link, as on crates.io.
const LINK_REL: &str = "nofollow noopener noreferrer";

/// Sanitize rendered README HTML.
pub(crate) fn sanitize(html: &str) -> String {
    let mut builder = Builder::default();
    builder
        .add_tags(&["input"])
        .add_generic_attributes(&["align"])
        .add_tag_attributes("a", &["id", "class", "aria-hidden"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("span", &["class"])
        .add_tag_attributes("div", &["id", "class"])
        .add_tag_attributes("sup", &["class"])
        .add_tag_attributes("input", &["checked", "disabled", "type"])
        .link_rel(Some(LINK_REL))
        .attribute_filter(filter_attribute);

    builder.clean(html).to_string()
}

/// Keep only the classes the renderer itself emits.
fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if attribute != "class" {
        return Some(Cow::Borrowed(value));
    }

    let kept: Vec<&str> = value
        .split_whitespace()
        .filter(|class| class_allowed(element, class))
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(Cow::Owned(kept.join(" ")))
    }
}

fn class_allowed(element: &str, class: &str) -> bool {
    match element {
        "a" => class == "anchor",
        "code" => class.starts_with("language-"),
        "span" => class.starts_with(CLASS_PREFIX),
        "div" => class == "footnote-definition",
        "sup" => matches!(class, "footnote-reference" | "footnote-definition-label"),
        _ => false,
    }
}
