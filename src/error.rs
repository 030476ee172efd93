//! Error types and handling infrastructure for rebind.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types and `anyhow` for the binary's top-level error handling.
//!
//! ## Design Principles
//!
//! - **Queries never fail**: `GetButton`/`GetAxis`-style calls absorb every error
//!   and answer with an inert value; only setup paths surface `Result`
//! - **Context preservation**: Include the offending axis, key or path
//! - **Consistency**: Standardized Result type across all modules

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rebind operations.
///
/// This enum covers the failure conditions of the polling collaborators,
/// configuration loading and the terminal host.
#[derive(Error, Debug)]
pub enum BindError {
    /// The host polling primitive has no axis registered under this name
    #[error("Axis not registered: {axis}")]
    AxisNotRegistered { axis: String },

    /// A key name in configuration could not be mapped to a physical key
    #[error("Unknown key name: {name}")]
    UnknownKey { name: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in {path}: {message}")]
    ConfigError { path: PathBuf, message: String },

    /// Terminal setup, teardown or event reading failed
    #[error("Terminal operation failed: {message}")]
    TerminalError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value or argument is out of range
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Standard Result type for rebind operations.
pub type Result<T> = std::result::Result<T, BindError>;

impl BindError {
    /// Create an AxisNotRegistered error for the given axis name
    pub fn axis_not_registered(axis: impl Into<String>) -> Self {
        Self::AxisNotRegistered { axis: axis.into() }
    }

    /// Create an UnknownKey error for an unparseable key name
    pub fn unknown_key(name: impl Into<String>) -> Self {
        Self::UnknownKey { name: name.into() }
    }

    /// Create a ConfigError tied to the file it came from
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a TerminalError from an io::Error with additional context
    pub fn terminal(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::TerminalError {
            message: message.into(),
            source,
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

// Terminal I/O is the only io::Error source outside of config loading, which
// attaches its path explicitly via `BindError::config`.
impl From<std::io::Error> for BindError {
    fn from(err: std::io::Error) -> Self {
        Self::TerminalError {
            message: "I/O operation failed".to_string(),
            source: err,
        }
    }
}
