// src/errors.rs

//! Crate-wide error type.
//!
//! Every variant here is fatal: `main` prints it and exits 1. Per-event
//! conditions that the watch loop recovers from (stale handles, denied
//! access, paths outside the root) are reported as
//! [`crate::engine::Dispatch`] outcomes instead.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OgwatchError {
    #[error("Missing path argument. Use -h for help.")]
    MissingRoot,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{op}: {source}")]
    Os {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{op}: {source}")]
    Privilege {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Unexpected event record: {0}")]
    Protocol(String),

    #[error("event source closed unexpectedly")]
    SourceClosed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("file watch error: {0}")]
    Notify(#[from] notify::Error),
}

impl OgwatchError {
    /// Wrap an OS call failure, naming the failing operation.
    pub fn os(op: &'static str, source: io::Error) -> Self {
        OgwatchError::Os { op, source }
    }

    /// Wrap the `errno` of the OS call that just failed.
    pub fn last_os(op: &'static str) -> Self {
        OgwatchError::Os {
            op,
            source: io::Error::last_os_error(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OgwatchError>;
