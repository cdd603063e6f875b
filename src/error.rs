//! Error types for the team formation engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific engine scenarios
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid roster: {reason}")]
    InvalidRoster { reason: String },

    #[error("Insufficient roster: have {available} competitors, need at least {required}")]
    InsufficientRoster { available: usize, required: usize },

    #[error("Region {region} cannot be satisfied: teams {uncovered_teams:?} have no regional competitor available")]
    RegionUnsatisfiable {
        region: String,
        uncovered_teams: Vec<usize>,
    },

    #[error("Requested format {requested_sizes:?} does not fit roster of {roster_size}: {reason}")]
    FormatSizeMismatch {
        requested_sizes: Vec<usize>,
        roster_size: usize,
        reason: String,
    },

    #[error("Constraints cannot be satisfied together: {reason}")]
    ImpossibleConstraints { reason: String },

    #[error("Malformed outcome: {reason}")]
    MalformedOutcome { reason: String },

    #[error("Invalid rating state for competitor {competitor_id}: {reason}")]
    RatingStateInvalid {
        competitor_id: u64,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal engine error: {message}")]
    InternalError { message: String },
}
