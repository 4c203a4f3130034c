//! Error types for feed aggregation.
//!
//! Only [`FeedError`] can reach a caller of the feed API. [`GeneratorError`]
//! and [`PoolError`] are contained at the invocation boundary: they are logged
//! and turned into an empty contribution, never surfaced.

/// Errors returned by the feed API and its configuration layer.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The request was rejected before any generator was started.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Configuration could not be parsed or failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure raised inside a single generator invocation.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// An upstream service the generator depends on failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The generator could not obtain or use its resource handle.
    #[error("resource error: {0}")]
    Resource(#[from] PoolError),

    /// Upstream data could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Errors from the resource isolation pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool has been closed and hands out no more handles.
    #[error("pool is closed")]
    Closed,

    /// The resource factory failed to create a new handle.
    #[error("failed to create resource: {0}")]
    Create(String),

    /// No handle became available within the configured acquire timeout.
    #[error("timed out acquiring resource after {0}ms")]
    AcquireTimeout(u64),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, FeedError>;
