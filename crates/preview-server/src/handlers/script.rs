//! Hot reload client script endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Handle GET /ws.js.
pub(crate) async fn get_script(State(state): State<Arc<AppState>>) -> Response {
    let Some(hot_reload) = &state.hot_reload else {
        return StatusCode::NOT_FOUND.into_response();
    };

    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        hot_reload.script.clone(),
    )
        .into_response()
}
