//! Team assignment engine
//!
//! This module turns a roster snapshot into a balanced team partition under
//! caller-supplied constraints. The engine selects a structural mode from the
//! roster size, then searches for a low-score partition with the
//! `BalanceScorer` over seeded, independent trials.

pub mod assignment;
pub mod constraints;
pub mod scorer;

// Re-export commonly used types
pub use assignment::TeamAssignmentEngine;
pub use constraints::AssignmentConstraints;
pub use scorer::{BalanceScorer, RegionalExemption};
