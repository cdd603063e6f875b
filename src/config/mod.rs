//! Configuration for the team formation and rating engine
//!
//! All thresholds and multiplier tables the engine depends on are collected
//! into explicit configuration values passed in at construction. Nothing is
//! read from ambient or global state.

pub mod engine;
pub mod rating;

// Re-export commonly used types
pub use engine::{ConstraintPolicy, EngineConfig};
pub use rating::{BayesianConfig, MultiFactorConfig, PlacementDeltaConfig, RatingModelConfig};
