//! Error types for the gesture pill
//!
//! Coordinators never hand these across their boundary: a failed surface
//! update or overscan call is logged and treated as "no state change".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("script parse error: {0}")]
    Script(#[from] toml::de::Error),

    #[error("invalid script: {0}")]
    InvalidScript(String),

    #[error("event loop error: {0}")]
    EventLoop(String),

    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("overscan error: {0}")]
    Overscan(#[from] OverscanError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the overlay window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("overlay view is not attached")]
    NotAttached,

    #[error("view queue closed")]
    QueueClosed,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Failures applying overscan insets
#[derive(Error, Debug)]
pub enum OverscanError {
    #[error("overscan is not supported on this device")]
    Unsupported,

    #[error("overscan command failed: {0}")]
    CommandFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
