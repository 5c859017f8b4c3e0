//! Error types for mr-mergeability

use thiserror::Error;

/// Errors surfaced by the mergeability engine and its collaborators
///
/// Only configuration and check-list errors are fatal to an evaluation.
/// Platform and cache errors are absorbed by the check wrapper and the
/// results store respectively.
#[derive(Debug, Error)]
pub enum Error {
    /// GitLab API returned an error status
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Cache backend failure
    #[error("cache error: {0}")]
    Cache(String),

    /// A stored cache entry could not be turned back into a result
    #[error("corrupt cache entry: {0}")]
    CorruptCacheEntry(String),

    /// Configuration could not be loaded or is invalid
    #[error("config error: {0}")]
    Config(String),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// A check name that does not map to any known check
    #[error("unknown mergeability check: {0}")]
    UnknownCheck(String),

    /// The declared check list cannot be used
    #[error("invalid check list: {0}")]
    InvalidCheckList(String),

    /// Generic platform failure (used by alternative platform implementations)
    #[error("platform error: {0}")]
    Platform(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
