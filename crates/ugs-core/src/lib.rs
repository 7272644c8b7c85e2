//! Core types, configuration, and error handling for ugs-badge.
//!
//! This crate provides the shared foundation used by the notifier and the CLI:
//! - [`UgsError`]: unified error type using `thiserror`
//! - [`UgsConfig`]: process-wide defaults loaded from `.ugs-badge.toml`
//! - Badge types: [`BadgeResult`], [`BadgeParams`], [`BadgeRequest`]

mod config;
mod error;
mod types;

pub use config::{
    ProxyConfig, ServerConfig, UgsConfig, API_URL_ENV, CONFIG_PATH_ENV, CREDENTIAL_ID_ENV,
    DEFAULT_CONFIG_FILE,
};
pub use error::UgsError;
pub use types::{
    non_empty, BadgeParams, BadgeRequest, BadgeResult, OutputFormat, MAX_CHANGELIST,
};

/// A convenience `Result` type for ugs-badge operations.
pub type Result<T> = std::result::Result<T, UgsError>;
