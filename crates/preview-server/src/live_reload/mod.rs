//! Hot reload: file watching and the WebSocket hub.

mod debouncer;
mod manager;
mod websocket;

pub(crate) use manager::LiveReloadManager;
pub use manager::{DEFAULT_DEBOUNCE, ReloadEvent, ReloadHandle, WatchError};
pub(crate) use websocket::ws_handler;
