//! CLI command implementations.

pub(crate) mod follow;
pub(crate) mod preview;

pub(crate) use follow::FollowArgs;
pub(crate) use preview::PreviewArgs;
