//! Response headers for every preview response.
//!
//! The page renders untrusted README HTML, so scripts are locked to the
//! preview origin and the page cannot be framed. Responses default to
//! `Cache-Control: no-cache` so a restarted preview never serves stale assets;
//! handlers that set their own policy keep it.

use axum::http::header::{self, HeaderName};
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower::layer::util::{Identity, Stack};
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy header value.
///
/// READMEs embed badges and screenshots from anywhere, so images are the one
/// resource allowed off-origin.
const CSP: &str = "default-src 'self'; \
                   script-src 'self'; \
                   style-src 'self' 'unsafe-inline'; \
                   font-src 'self' data:; \
                   img-src 'self' data: https: http:; \
                   connect-src 'self' ws: wss:; \
                   frame-ancestors 'none'";

type HeaderLayer = SetResponseHeaderLayer<HeaderValue>;

/// The stack returned by [`security_layers`].
pub(crate) type SecurityLayers = ServiceBuilder<
    Stack<HeaderLayer, Stack<HeaderLayer, Stack<HeaderLayer, Stack<HeaderLayer, Identity>>>>,
>;

/// Build the header layers applied to the whole router.
pub(crate) fn security_layers() -> SecurityLayers {
    ServiceBuilder::new()
        .layer(overriding("content-security-policy", CSP))
        .layer(overriding("x-content-type-options", "nosniff"))
        .layer(overriding("x-frame-options", "DENY"))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
}

fn overriding(name: &'static str, value: &'static str) -> HeaderLayer {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}
