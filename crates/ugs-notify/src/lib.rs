//! Posting build badges to a UGS metadata server.
//!
//! [`notifier::BadgeNotifier`] ties the pieces together: endpoint resolution,
//! credential lookup, the JSON payload, and a single HTTP POST through a
//! [`transport::Transport`].

pub mod auth;
pub mod endpoint;
pub mod log;
pub mod notifier;
pub mod payload;
pub mod proxy;
pub mod transport;

pub use notifier::{BadgeNotifier, PostBadge, PostOutcome};
