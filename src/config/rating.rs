//! Rating model configuration
//!
//! One configuration value per rating model variant, plus the combined
//! `RatingModelConfig` handed to the variant selector.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::WengLinConfig;

/// Configuration for the placement-delta rating model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementDeltaConfig {
    /// Placement that produces zero rating change
    pub baseline_rank: u32,
    /// Delta awarded for first place
    pub max_positive: f64,
    /// Worst placement still differentiated; placements beyond it clamp
    pub max_rank: u32,
    /// Magnitude of the loss at and beyond `max_rank`
    pub max_negative: f64,
}

impl Default for PlacementDeltaConfig {
    fn default() -> Self {
        Self {
            baseline_rank: 7,
            max_positive: 25.0,
            max_rank: 30,
            max_negative: 40.0,
        }
    }
}

impl PlacementDeltaConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.baseline_rank < 2 {
            return Err(EngineError::ConfigurationError {
                message: "Baseline rank must be at least 2".to_string(),
            }
            .into());
        }

        if self.max_rank <= self.baseline_rank {
            return Err(EngineError::ConfigurationError {
                message: "Maximum rank must be beyond the baseline rank".to_string(),
            }
            .into());
        }

        if self.max_positive <= 0.0 || self.max_negative <= 0.0 {
            return Err(EngineError::ConfigurationError {
                message: "Delta magnitudes must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Configuration for the multi-factor rating model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiFactorConfig {
    /// Base score anchors by placement, monotonically decreasing
    pub placement_scores: Vec<(u32, f64)>,
    /// Absolute floor of the delta clamp
    pub min_change_limit: f64,
    /// Fraction of the competitor's own rating used for the delta clamp
    pub change_limit_fraction: f64,
    /// Slope divisor of the individual adjustment curve
    pub individual_adjustment_scale: f64,
    /// Bounds of the individual adjustment factor
    pub individual_adjustment_bounds: (f64, f64),
    /// Bounds of the opponent strength multiplier
    pub opponent_multiplier_bounds: (f64, f64),
}

impl Default for MultiFactorConfig {
    fn default() -> Self {
        Self {
            // Diminishing gains near the top, escalating losses near the bottom
            placement_scores: vec![
                (1, 50.0),
                (2, 35.0),
                (3, 25.0),
                (4, 18.0),
                (5, 12.0),
                (6, 8.0),
                (7, 4.0),
                (8, 0.0),
                (9, -5.0),
                (10, -10.0),
                (11, -16.0),
                (12, -23.0),
                (13, -31.0),
                (14, -40.0),
                (15, -50.0),
                (16, -62.0),
                (17, -75.0),
                (18, -89.0),
                (19, -104.0),
                (20, -120.0),
                (21, -138.0),
                (22, -157.0),
                (23, -177.0),
                (24, -198.0),
                (25, -220.0),
                (26, -243.0),
                (27, -267.0),
                (28, -292.0),
                (29, -318.0),
                (30, -345.0),
            ],
            min_change_limit: 150.0,
            change_limit_fraction: 0.15,
            individual_adjustment_scale: 1000.0,
            individual_adjustment_bounds: (0.8, 1.2),
            opponent_multiplier_bounds: (0.2, 2.2),
        }
    }
}

impl MultiFactorConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.placement_scores.len() < 2 {
            return Err(EngineError::ConfigurationError {
                message: "Placement score table needs at least two anchors".to_string(),
            }
            .into());
        }

        let mut previous: Option<(u32, f64)> = None;
        for &(rank, score) in &self.placement_scores {
            if let Some((prev_rank, prev_score)) = previous {
                if rank <= prev_rank {
                    return Err(EngineError::ConfigurationError {
                        message: "Placement score ranks must be strictly increasing".to_string(),
                    }
                    .into());
                }
                if score > prev_score {
                    return Err(EngineError::ConfigurationError {
                        message: "Placement scores must be non-increasing".to_string(),
                    }
                    .into());
                }
            }
            previous = Some((rank, score));
        }

        if self.min_change_limit <= 0.0 || self.change_limit_fraction <= 0.0 {
            return Err(EngineError::ConfigurationError {
                message: "Change limits must be positive".to_string(),
            }
            .into());
        }

        if self.individual_adjustment_scale <= 0.0 {
            return Err(EngineError::ConfigurationError {
                message: "Individual adjustment scale must be positive".to_string(),
            }
            .into());
        }

        let (lo, hi) = self.individual_adjustment_bounds;
        if !(lo <= 1.0 && 1.0 <= hi) {
            return Err(EngineError::ConfigurationError {
                message: "Individual adjustment bounds must bracket 1.0".to_string(),
            }
            .into());
        }

        let (lo, hi) = self.opponent_multiplier_bounds;
        if lo <= 0.0 || hi < lo {
            return Err(EngineError::ConfigurationError {
                message: "Opponent multiplier bounds must be positive and ordered".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// First and last ranks of the placement score table
    pub fn rank_range(&self) -> (u32, u32) {
        let first = self.placement_scores.first().map(|&(r, _)| r).unwrap_or(1);
        let last = self.placement_scores.last().map(|&(r, _)| r).unwrap_or(1);
        (first, last)
    }
}

/// Configuration for the Bayesian skill model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianConfig {
    /// Core Weng-Lin parameters
    pub weng_lin_config: WengLinConfig,
    /// Initial skill estimate for new competitors
    pub initial_mu: f64,
    /// Initial uncertainty for new competitors
    pub initial_sigma: f64,
    /// Uncertainty never shrinks below this floor
    pub sigma_floor: f64,
    /// Synthetic member count per estimated external team
    pub external_team_size: usize,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            weng_lin_config: WengLinConfig::new(),
            initial_mu: 25.0,
            initial_sigma: 25.0 / 3.0,
            sigma_floor: 0.1,
            external_team_size: 4,
        }
    }
}

impl BayesianConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.initial_sigma <= 0.0 {
            return Err(EngineError::ConfigurationError {
                message: "Initial uncertainty must be positive".to_string(),
            }
            .into());
        }

        if self.sigma_floor <= 0.0 || self.sigma_floor > self.initial_sigma {
            return Err(EngineError::ConfigurationError {
                message: "Sigma floor must be positive and below the initial uncertainty"
                    .to_string(),
            }
            .into());
        }

        if self.external_team_size == 0 {
            return Err(EngineError::ConfigurationError {
                message: "External team size must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Combined configuration for all rating model variants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingModelConfig {
    pub placement: PlacementDeltaConfig,
    pub multi_factor: MultiFactorConfig,
    pub bayesian: BayesianConfig,
}

impl RatingModelConfig {
    /// Validate all variant configurations
    pub fn validate(&self) -> crate::error::Result<()> {
        self.placement.validate()?;
        self.multi_factor.validate()?;
        self.bayesian.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_valid() {
        assert!(RatingModelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_placement_config_validation() {
        let mut config = PlacementDeltaConfig::default();
        config.max_rank = 7;
        assert!(config.validate().is_err());

        config = PlacementDeltaConfig::default();
        config.baseline_rank = 1;
        assert!(config.validate().is_err());

        config = PlacementDeltaConfig::default();
        config.max_positive = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multi_factor_table_must_be_monotone() {
        let mut config = MultiFactorConfig::default();
        config.placement_scores = vec![(1, 50.0), (2, 60.0)];
        assert!(config.validate().is_err());

        config.placement_scores = vec![(2, 50.0), (1, 40.0)];
        assert!(config.validate().is_err());

        config.placement_scores = vec![(1, 50.0), (8, 0.0), (30, -345.0)];
        assert!(config.validate().is_ok());
        assert_eq!(config.rank_range(), (1, 30));
    }

    #[test]
    fn test_bayesian_sigma_floor_validation() {
        let mut config = BayesianConfig::default();
        config.sigma_floor = 0.0;
        assert!(config.validate().is_err());

        config = BayesianConfig::default();
        config.sigma_floor = 100.0;
        assert!(config.validate().is_err());
    }
}
