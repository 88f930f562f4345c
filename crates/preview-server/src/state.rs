//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use preview_renderer::ReadmeRenderer;
use preview_theme::ThemeVariant;

use crate::live_reload::ReloadHandle;

/// Hot reload wiring, present when hot reload is enabled.
pub(crate) struct HotReload {
    /// Client script with the endpoint substituted.
    pub(crate) script: String,
    /// Reload broadcast.
    pub(crate) handle: ReloadHandle,
}

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// README file to preview. Read on every page request.
    pub(crate) readme_path: PathBuf,
    pub(crate) renderer: ReadmeRenderer,
    /// Selected theme variant.
    pub(crate) theme: ThemeVariant,
    /// CSS generated from the theme, computed once at startup.
    pub(crate) theme_css: String,
    /// Colours for highlighted code blocks.
    pub(crate) highlight_css: String,
    pub(crate) hot_reload: Option<HotReload>,
}

impl AppState {
    /// Check if hot reload is enabled.
    #[must_use]
    pub(crate) fn hot_reload_enabled(&self) -> bool {
        self.hot_reload.is_some()
    }
}
