//! Common types shared across Patrol crates.
//!
//! This crate defines the shared error type, the host-platform guard, and the
//! observability helpers used by the binary and the integration tests. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in the browser or HTTP stacks.
//!
//! - [`PatrolError`] and [`Result`]: shared error handling
//! - [`host`]: supported-platform check, consulted once at process start
//! - [`observability`]: centralised tracing/logging initialisation

use std::path::PathBuf;

pub mod host;
pub mod observability;

/// Error types used across the Patrol system.
#[derive(thiserror::Error, Debug)]
pub enum PatrolError {
    /// The process was started on a platform we do not drive a browser on.
    /// Fatal: the binary exits with status 1.
    #[error("unsupported host platform: {0}")]
    UnsupportedPlatform(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The credential file at the given path could not be read.
    #[error("credential file unreadable: {0}")]
    Credentials(PathBuf),

    /// A driver (browser, network, etc.) reported an error.
    #[error("driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`PatrolError`].
pub type Result<T> = std::result::Result<T, PatrolError>;
