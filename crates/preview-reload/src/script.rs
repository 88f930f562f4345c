//! Browser rendition of the hot reload client.
//!
//! The script implements the same transitions as [`HotReloader`](crate::HotReloader)
//! with WebSocket callbacks and `setTimeout`.

use std::time::Duration;

use crate::protocol::{Endpoint, NORMAL_CLOSURE, SUBPROTOCOL, close_reason};

const TEMPLATE: &str = include_str!("ws.js");

/// Values substituted into the client script.
#[derive(Clone, Debug)]
pub struct ScriptParams<'a> {
    /// Endpoint the browser connects to.
    pub endpoint: &'a Endpoint,
    /// Delay before reconnecting after a drop.
    pub retry_delay: Duration,
    /// Name of the reloaded resource.
    pub resource: &'a str,
}

/// Quote a string as a JavaScript string literal.
fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript; `<` is escaped so the value
    // can never close a surrounding script element.
    serde_json::Value::from(value)
        .to_string()
        .replace('<', "\\u003c")
}

/// Render the client script.
#[must_use]
pub fn render(params: &ScriptParams<'_>) -> String {
    TEMPLATE
        .replace("{hot_reload_url}", &js_string(&params.endpoint.url()))
        .replace("{hot_reload_protocol}", &js_string(SUBPROTOCOL))
        .replace("{retry_delay_ms}", &params.retry_delay.as_millis().to_string())
        .replace("{close_code}", &NORMAL_CLOSURE.to_string())
        .replace("{close_reason}", &js_string(&close_reason(params.resource)))
}
