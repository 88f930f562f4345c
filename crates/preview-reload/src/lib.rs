//! Hot reload for the cargo-markdown preview page.
//!
//! The preview server pushes a message over a WebSocket whenever the README
//! changes. The client reloads on any message, and after a dropped connection
//! retries until the server is back, reloading once it reconnects.
//!
//! - [`protocol`]: endpoint, sub-protocol and close constants shared by both sides
//! - [`HotReloader`]: sans-IO client state machine
//! - [`run`]: native driver for the state machine (tokio-tungstenite)
//! - [`script`]: the browser client, rendered for a given endpoint
//!
//! # Example
//!
//! ```
//! use preview_reload::{ClientEvent, ClientOptions, Command, HotReloader};
//!
//! let mut client = HotReloader::new(ClientOptions::default());
//! assert_eq!(client.init(), vec![Command::Connect { expect_reload: false }]);
//! assert!(client.handle(ClientEvent::Opened).is_empty());
//! assert!(client.handle(ClientEvent::Message).contains(&Command::Reload));
//! ```

mod client;
mod driver;
pub mod protocol;
pub mod script;

pub use client::{ClientEvent, ClientOptions, Command, ConnectionState, HotReloader, TimerId};
pub use driver::{ClientError, ReloadTarget, run};
pub use protocol::Endpoint;
