//! Assignment engine configuration
//!
//! Collects the structural thresholds and search parameters for team
//! assignment into one explicit value, with validation.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Policy for handling constraints that cannot be satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintPolicy {
    /// Fail the call with the specific unmet condition
    Strict,
    /// Drop the unmet constraint, log a warning, and report the relaxation
    RelaxAndWarn,
}

impl Default for ConstraintPolicy {
    fn default() -> Self {
        ConstraintPolicy::Strict
    }
}

/// Configuration for the team assignment engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rosters at or below this size are placed in a single team
    pub single_team_threshold: usize,
    /// Team sizes used for the asymmetric split at threshold + 1 competitors
    pub asymmetric_sizes: (usize, usize),
    /// Minimum team size for balanced partitions
    pub min_team_size: usize,
    /// Maximum team size for balanced partitions
    pub max_team_size: usize,
    /// Number of independent search trials per assignment
    pub search_trials: usize,
    /// Weight applied to the partnership penalty term of the balance score
    pub partnership_weight: f64,
    /// Largest roster accepted for one assignment call
    pub max_roster_size: usize,
    /// Smallest roster accepted; rosters below this are rejected
    pub min_roster_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            single_team_threshold: 4,
            asymmetric_sizes: (2, 3),
            min_team_size: 3,
            max_team_size: 4,
            search_trials: 15,
            partnership_weight: 10.0,
            max_roster_size: 24,
            min_roster_size: 1,
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.min_team_size == 0 {
            return Err(EngineError::ConfigurationError {
                message: "Minimum team size must be positive".to_string(),
            }
            .into());
        }

        if self.max_team_size < self.min_team_size {
            return Err(EngineError::ConfigurationError {
                message: "Maximum team size must be at least the minimum".to_string(),
            }
            .into());
        }

        if self.search_trials == 0 {
            return Err(EngineError::ConfigurationError {
                message: "At least one search trial is required".to_string(),
            }
            .into());
        }

        let (small, large) = self.asymmetric_sizes;
        if small == 0 || large == 0 || small + large != self.single_team_threshold + 1 {
            return Err(EngineError::ConfigurationError {
                message: format!(
                    "Asymmetric sizes {:?} must be positive and sum to {}",
                    self.asymmetric_sizes,
                    self.single_team_threshold + 1
                ),
            }
            .into());
        }

        if self.partnership_weight < 0.0 {
            return Err(EngineError::ConfigurationError {
                message: "Partnership weight must be non-negative".to_string(),
            }
            .into());
        }

        if self.max_roster_size < self.min_roster_size {
            return Err(EngineError::ConfigurationError {
                message: "Maximum roster size must be at least the minimum".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
