//! Embedded assets for the cargo-markdown preview page.
//!
//! Everything under `assets/` is compiled into the binary via `rust-embed`.
//! The page template is exposed separately since the server fills it in
//! instead of serving it as-is.

use std::borrow::Cow;

#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
#[exclude = "index.html"]
struct Assets;

/// Mockup page template.
///
/// Placeholders: `{crate_name}`, `{crate_version}`, `{crate_description}`,
/// `{crate_license}`, `{crate_repository}`, `{readme}` and
/// `{hot_reload_script}`.
pub const PAGE_TEMPLATE: &str = include_str!("../assets/index.html");

/// Get a static asset by path (relative to `assets/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Iterate all static asset paths.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}
