//! Team Forge - Team formation and skill rating engine
//!
//! This crate partitions a roster of competitors into balanced teams under
//! caller-supplied constraints, and resolves finished matches against three
//! coexisting rating models (placement delta, multi-factor, and Bayesian
//! skill).

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod rating;
pub mod roster;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{EngineError, Result};
pub use types::*;

// Re-export key components
pub use engine::{AssignmentConstraints, TeamAssignmentEngine};
pub use history::{HistoryStore, InMemoryHistoryStore, PartnershipHistoryIndex};
pub use rating::{rating_model, RatingModel, RatingModelKind};
pub use roster::{Roster, RosterProvider, StaticRosterProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
