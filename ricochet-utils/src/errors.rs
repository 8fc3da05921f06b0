// Ricochet: error types
//
// The bounce engine itself cannot fail. Errors only come from loading options
// and from caller-supplied hooks, which are isolated from the frame loop.

use std::io;
use thiserror::Error;

/// Errors raised while loading or validating `RicochetOptions`
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid KDL
    #[error("Failed to parse config: {0}")]
    Parse(#[from] kdl::KdlError),

    /// A recognised key carries a value of the wrong type or range
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// `initial-direction` names no known corner
    #[error("Unknown initial direction: '{0}' (expected bottom-right, bottom-left, top-right or top-left)")]
    UnknownDirection(String),

    /// Reading the config file failed
    #[error("Failed to read config: {0}")]
    Io(#[from] io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure reported by a hook.
///
/// Hook failures never stop the animation; they are logged and forwarded to
/// the session's error reporter, if one is installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The hook returned an error
    #[error("Hook failed: {0}")]
    Failed(String),

    /// The hook panicked while running
    #[error("Hook panicked: {0}")]
    Panicked(String),
}

impl HookError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result type returned by fallible hooks
pub type HookResult<T = ()> = Result<T, HookError>;
