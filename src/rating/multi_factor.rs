//! Multi-factor rating model
//!
//! Combines a placement base score with opponent strength, individual skill
//! gap, and a rating-tier curve:
//!
//! `delta = baseScore(p) * opponentMultiplier * individualAdjustment * curveMultiplier`
//!
//! then clamps to `±max(150, 0.15 * rating)`. High-tier competitors climb
//! slowly and drop quickly, which keeps ratings from inflating at the top.

use crate::config::MultiFactorConfig;
use crate::rating::model::{validate_outcome, RatingDeltaSet, RatingModel, RatingModelKind};
use crate::types::{MatchOutcome, RatingDelta, RatingState};
use crate::utils::{clamp_symmetric, mean};
use serde::{Deserialize, Serialize};

/// Placements used when previewing possible outcomes
const PREVIEW_PLACEMENTS: [u32; 8] = [1, 3, 5, 10, 15, 20, 25, 30];

/// Detailed breakdown of one rating change calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChangeBreakdown {
    pub base_score: f64,
    pub opponent_multiplier: f64,
    pub individual_adjustment: f64,
    pub curve_multiplier: f64,
    pub preliminary_change: f64,
    pub final_change: f64,
    pub max_change_limit: f64,
}

/// Rating model combining placement, opponent strength, and curve scaling
#[derive(Debug, Clone)]
pub struct MultiFactorModel {
    config: MultiFactorConfig,
}

impl MultiFactorModel {
    /// Create a new multi-factor model
    pub fn new(config: MultiFactorConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Base score for a placement, interpolating between table anchors
    pub fn base_score(&self, placement: u32) -> f64 {
        let (first_rank, last_rank) = self.config.rank_range();
        let placement = placement.clamp(first_rank, last_rank);

        let table = &self.config.placement_scores;
        if let Some(&(_, score)) = table.iter().find(|&&(rank, _)| rank == placement) {
            return score;
        }

        // Linear interpolation between the surrounding anchors
        let lower = table
            .iter()
            .filter(|&&(rank, _)| rank < placement)
            .last()
            .copied()
            .unwrap_or(table[0]);
        let upper = table
            .iter()
            .find(|&&(rank, _)| rank > placement)
            .copied()
            .unwrap_or(*table.last().unwrap_or(&table[0]));

        if lower.0 == upper.0 {
            return lower.1;
        }

        let ratio = (placement - lower.0) as f64 / (upper.0 - lower.0) as f64;
        lower.1 + (upper.1 - lower.1) * ratio
    }

    /// Multiplier from the gap between opponent strength and own team strength
    ///
    /// Facing stronger opponents raises the multiplier, weaker opponents
    /// lower it; a +-50 band around zero maps to 1.0. Winning against a much
    /// weaker field or collapsing against a much stronger one adjusts the
    /// multiplier further before the final clamp.
    pub fn opponent_multiplier(
        &self,
        own_team_avg: f64,
        opponent_team_avgs: &[f64],
        placement: u32,
    ) -> f64 {
        if opponent_team_avgs.is_empty() {
            return 1.0;
        }

        let strength_diff = mean(opponent_team_avgs) - own_team_avg;

        let mut multiplier: f64 = if strength_diff > 500.0 {
            2.2
        } else if strength_diff > 300.0 {
            1.8
        } else if strength_diff > 150.0 {
            1.4
        } else if strength_diff > 50.0 {
            1.2
        } else if strength_diff > -50.0 {
            1.0
        } else if strength_diff > -150.0 {
            0.8
        } else if strength_diff > -300.0 {
            0.6
        } else if strength_diff > -500.0 {
            0.4
        } else {
            0.2
        };

        if placement <= 3 && strength_diff < -200.0 {
            multiplier *= 0.7;
        } else if placement >= 15 && strength_diff > 200.0 {
            multiplier *= 1.3;
        }

        let (lo, hi) = self.config.opponent_multiplier_bounds;
        multiplier.clamp(lo, hi)
    }

    /// Adjustment from the competitor's own rating relative to the team average
    ///
    /// Linear in the gap (`1.0 + diff / scale`), clamped to the configured
    /// bounds; above-average members see amplified changes, below-average
    /// members damped ones. The default scale of 1000 puts +-100 rating at
    /// 1.1 / 0.9 and saturates the 0.8..1.2 bounds at +-200.
    pub fn individual_adjustment(&self, own_rating: f64, team_avg: f64) -> f64 {
        let (lo, hi) = self.config.individual_adjustment_bounds;
        (1.0 + (own_rating - team_avg) / self.config.individual_adjustment_scale).clamp(lo, hi)
    }

    /// Tier multiplier resisting rating inflation at the top
    pub fn curve_multiplier(&self, current_rating: f64, preliminary_change: f64) -> f64 {
        if preliminary_change > 0.0 {
            if current_rating >= 2000.0 {
                0.3
            } else if current_rating >= 1800.0 {
                0.5
            } else if current_rating >= 1600.0 {
                0.7
            } else if current_rating >= 1400.0 {
                0.85
            } else {
                1.0
            }
        } else if current_rating >= 2000.0 {
            1.5
        } else if current_rating >= 1800.0 {
            1.3
        } else if current_rating >= 1600.0 {
            1.1
        } else {
            1.0
        }
    }

    /// Full breakdown of the rating change for one competitor
    pub fn compute_breakdown(
        &self,
        own_rating: f64,
        team_avg: f64,
        placement: u32,
        opponent_team_avgs: &[f64],
    ) -> RatingChangeBreakdown {
        let base_score = self.base_score(placement);
        let opponent_multiplier =
            self.opponent_multiplier(team_avg, opponent_team_avgs, placement);
        let individual_adjustment = self.individual_adjustment(own_rating, team_avg);

        let preliminary_change = base_score * opponent_multiplier * individual_adjustment;
        let curve_multiplier = self.curve_multiplier(own_rating, preliminary_change);

        let max_change_limit = self
            .config
            .min_change_limit
            .max(own_rating * self.config.change_limit_fraction);
        let final_change = clamp_symmetric(preliminary_change * curve_multiplier, max_change_limit);

        RatingChangeBreakdown {
            base_score,
            opponent_multiplier,
            individual_adjustment,
            curve_multiplier,
            preliminary_change,
            final_change,
            max_change_limit,
        }
    }

    /// Preview the final change at a spread of possible placements
    pub fn preview_changes(
        &self,
        own_rating: f64,
        team_avg: f64,
        opponent_team_avgs: &[f64],
    ) -> Vec<(u32, f64)> {
        PREVIEW_PLACEMENTS
            .iter()
            .map(|&placement| {
                let breakdown =
                    self.compute_breakdown(own_rating, team_avg, placement, opponent_team_avgs);
                (placement, breakdown.final_change)
            })
            .collect()
    }
}

impl RatingModel for MultiFactorModel {
    fn resolve(&self, outcome: &MatchOutcome) -> crate::error::Result<RatingDeltaSet> {
        validate_outcome(outcome)?;

        let team_avgs: Vec<f64> = outcome.teams.iter().map(|t| t.rating_avg()).collect();

        let mut deltas = Vec::new();
        for (index, team) in outcome.teams.iter().enumerate() {
            let opponent_avgs: Vec<f64> = team_avgs
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != index)
                .map(|(_, &avg)| avg)
                .collect();

            for member in &team.members {
                let breakdown = self.compute_breakdown(
                    member.rating,
                    team_avgs[index],
                    team.placement,
                    &opponent_avgs,
                );

                let before = RatingState::from(member);
                let mut after = before;
                after.rating += breakdown.final_change;

                deltas.push(RatingDelta {
                    competitor_id: member.id,
                    before,
                    after,
                    change: breakdown.final_change,
                });
            }
        }

        Ok(RatingDeltaSet {
            variant: RatingModelKind::MultiFactor,
            deltas,
        })
    }

    fn kind(&self) -> RatingModelKind {
        RatingModelKind::MultiFactor
    }
}
