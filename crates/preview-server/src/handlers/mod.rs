//! HTTP request handlers.

pub(crate) mod page;
pub(crate) mod script;
pub(crate) mod theme;
