//! Static file serving.
//!
//! Serves embedded assets from `preview-assets`. Every other path redirects
//! to the page, so stale bookmarks and typos land on the preview.

use axum::body::Body;
use axum::http::{Request, header};
use axum::response::{IntoResponse, Redirect, Response};

/// Serve a static asset or redirect to `/`.
pub(crate) async fn serve_asset(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    if let Some(content) = preview_assets::get(path) {
        return (
            [(header::CONTENT_TYPE, preview_assets::mime_for(path))],
            content.into_owned(),
        )
            .into_response();
    }

    tracing::debug!(path = %req.uri().path(), "Redirecting unknown path");
    Redirect::permanent("/").into_response()
}
