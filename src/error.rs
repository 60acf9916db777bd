//! # Error Taxonomy
//!
//! Mirrors the kinds called out in spec.md §7, not Rust's type hierarchy:
//! configuration, provider-capability, daemon-start, subprocess, resolution,
//! and state errors all get their own variant so callers can match on
//! *kind* rather than parse a message.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum SpaceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("container provider does not support DNS mode: {0}")]
    Provider(String),

    #[error("DNS daemon failed to start: {0}")]
    DaemonStart(String),

    #[error("compose runtime failed: {0}")]
    Compose(#[from] std::io::Error),

    #[error("container not found")]
    Resolution,

    #[error("daemon state error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, SpaceError>;

/// Exit codes surfaced by the CLI (§6): compose failures and configuration
/// failures are distinguished so a caller scripting against this tool can
/// tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    ComposeFailure = 1,
    ConfigFailure = 2,
}

impl From<&SpaceError> for ExitCode {
    fn from(err: &SpaceError) -> Self {
        match err {
            SpaceError::Config(_) => ExitCode::ConfigFailure,
            SpaceError::Compose(_) => ExitCode::ComposeFailure,
            SpaceError::Provider(_)
            | SpaceError::DaemonStart(_)
            | SpaceError::Resolution
            | SpaceError::State(_) => ExitCode::ComposeFailure,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as i32)
    }
}
