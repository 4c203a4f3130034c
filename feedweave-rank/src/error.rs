//! Error types for the feedweave-rank crate.
//!
//! Ranking itself never fails; errors only arise when validating
//! caller-supplied weights.

/// Errors that can occur while configuring ranking.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// A scoring weight is negative, NaN or infinite.
    #[error("invalid weight: {0}")]
    InvalidWeight(String),
}

/// Convenience type alias for feedweave-rank results.
pub type Result<T> = std::result::Result<T, RankError>;
