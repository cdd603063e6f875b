//! Placement-delta rating model
//!
//! A deterministic piecewise-linear function of a team's final placement,
//! anchored at a configured baseline rank (zero change), first place
//! (maximum gain), and a maximum tracked rank (maximum loss, clamped).

use crate::config::PlacementDeltaConfig;
use crate::rating::model::{validate_outcome, RatingDeltaSet, RatingModel, RatingModelKind};
use crate::types::{MatchOutcome, RatingDelta, RatingState};

/// Rating model that maps placement directly to a scalar delta
#[derive(Debug, Clone)]
pub struct PlacementDeltaModel {
    config: PlacementDeltaConfig,
}

impl PlacementDeltaModel {
    /// Create a new placement-delta model
    pub fn new(config: PlacementDeltaConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Rating change for a single placement
    ///
    /// Above the baseline the delta scales linearly from zero up to
    /// `max_positive` at first place; below it, linearly down to
    /// `-max_negative` at `max_rank`. Placements beyond `max_rank` clamp.
    pub fn delta_for_placement(&self, placement: u32) -> f64 {
        let placement = placement.max(1);
        let baseline = self.config.baseline_rank;

        if placement <= baseline {
            let span = (baseline - 1) as f64;
            let performance = (baseline - placement) as f64 / span;
            performance * self.config.max_positive
        } else {
            if placement >= self.config.max_rank {
                return -self.config.max_negative;
            }
            let span = (self.config.max_rank - baseline) as f64;
            let performance = (placement - baseline) as f64 / span;
            -performance * self.config.max_negative
        }
    }
}

impl RatingModel for PlacementDeltaModel {
    fn resolve(&self, outcome: &MatchOutcome) -> crate::error::Result<RatingDeltaSet> {
        validate_outcome(outcome)?;

        let mut deltas = Vec::new();
        for team in &outcome.teams {
            let change = self.delta_for_placement(team.placement);

            for member in &team.members {
                let before = RatingState::from(member);
                let mut after = before;
                after.rating += change;

                deltas.push(RatingDelta {
                    competitor_id: member.id,
                    before,
                    after,
                    change,
                });
            }
        }

        Ok(RatingDeltaSet {
            variant: RatingModelKind::Placement,
            deltas,
        })
    }

    fn kind(&self) -> RatingModelKind {
        RatingModelKind::Placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Competitor, PlacedTeam};

    fn default_model() -> PlacementDeltaModel {
        PlacementDeltaModel::new(PlacementDeltaConfig::default()).unwrap()
    }

    #[test]
    fn test_first_place_is_max_positive() {
        let model = default_model();
        assert_eq!(model.delta_for_placement(1), 25.0);
    }

    #[test]
    fn test_baseline_is_zero() {
        let model = default_model();
        assert_eq!(model.delta_for_placement(7), 0.0);
    }

    #[test]
    fn test_just_below_baseline() {
        let model = default_model();
        // -(8 - 7) / (30 - 7) * 40
        let delta = model.delta_for_placement(8);
        assert!((delta - (-40.0 / 23.0)).abs() < 1e-9);
        assert!((delta - (-1.739)).abs() < 0.001);
    }

    #[test]
    fn test_max_rank_and_beyond_clamp() {
        let model = default_model();
        assert_eq!(model.delta_for_placement(30), -40.0);
        assert_eq!(model.delta_for_placement(31), -40.0);
        assert_eq!(model.delta_for_placement(100), -40.0);
    }

    #[test]
    fn test_delta_non_increasing_in_placement() {
        let model = default_model();
        let mut previous = f64::INFINITY;
        for placement in 1..=40 {
            let delta = model.delta_for_placement(placement);
            assert!(
                delta <= previous,
                "delta increased at placement {placement}: {delta} > {previous}"
            );
            previous = delta;
        }
    }

    #[test]
    fn test_zero_placement_clamps_to_first() {
        let model = default_model();
        assert_eq!(model.delta_for_placement(0), model.delta_for_placement(1));
    }

    #[test]
    fn test_resolve_applies_delta_to_every_member() {
        let model = default_model();
        let outcome = MatchOutcome::new(
            vec![
                PlacedTeam::new(
                    1,
                    vec![
                        Competitor::new(1).with_rating(1500.0),
                        Competitor::new(2).with_rating(1600.0),
                    ],
                ),
                PlacedTeam::new(7, vec![Competitor::new(3).with_rating(1400.0)]),
            ],
            false,
        );

        let result = model.resolve(&outcome).unwrap();
        assert_eq!(result.variant, RatingModelKind::Placement);
        assert_eq!(result.deltas.len(), 3);

        let winner = result.get(1).unwrap();
        assert_eq!(winner.change, 25.0);
        assert_eq!(winner.after.rating, 1525.0);

        let baseline = result.get(3).unwrap();
        assert_eq!(baseline.change, 0.0);
        assert_eq!(baseline.after.rating, 1400.0);
    }

    #[test]
    fn test_resolve_rejects_malformed_outcome() {
        let model = default_model();
        let outcome = MatchOutcome::new(vec![PlacedTeam::new(1, vec![])], false);
        assert!(model.resolve(&outcome).is_err());
    }
}
