//! Error types for configuration sources and output-path resolution.
//!
//! Only [`ResolveError`] ever reaches a caller. [`ConfigError`] describes a
//! file source that could not be read or parsed; the resolver logs it and
//! carries on without that source.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read a single configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path} as {format}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("{path} does not contain a mapping at its root")]
    NotAMapping { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(
        path: impl Into<PathBuf>,
        format: &'static str,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            format,
            message: err.to_string(),
        }
    }
}

/// Errors surfaced to callers of the resolution entry points.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unsupported platform '{0}' (expected 'android' or 'ios')")]
    UnsupportedPlatform(String),

    #[error("cannot determine project root: {0}")]
    ProjectRoot(#[source] std::io::Error),

    #[error("invalid configuration key '{0}'")]
    InvalidKey(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
