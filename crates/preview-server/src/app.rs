//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use preview_reload::protocol;

use crate::handlers;
use crate::live_reload;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// Without hot reload, `/ws.js` and `/ws` fall through to the redirect like
/// any other unknown path.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::page::get_page))
        .route("/theme.css", get(handlers::theme::get_css))
        .route("/theme.json", get(handlers::theme::get_json))
        .route("/highlight.css", get(handlers::theme::get_highlight_css));

    if state.hot_reload_enabled() {
        router = router
            .route("/ws.js", get(handlers::script::get_script))
            .route(protocol::PATH, get(live_reload::ws_handler));
    }

    router
        .fallback(static_files::serve_asset)
        .layer(security::security_layers())
        .with_state(state)
}
