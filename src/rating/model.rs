//! Rating model trait and variant selection
//!
//! This module defines the interface shared by all rating model variants and
//! the closed set of variants selectable by configuration.

use crate::config::RatingModelConfig;
use crate::error::EngineError;
use crate::rating::bayesian::BayesianSkillModel;
use crate::rating::multi_factor::MultiFactorModel;
use crate::rating::placement::PlacementDeltaModel;
use crate::types::{MatchOutcome, RatingDelta};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Closed set of rating model variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingModelKind {
    Placement,
    MultiFactor,
    Bayesian,
}

impl std::fmt::Display for RatingModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingModelKind::Placement => write!(f, "Placement"),
            RatingModelKind::MultiFactor => write!(f, "MultiFactor"),
            RatingModelKind::Bayesian => write!(f, "Bayesian"),
        }
    }
}

/// Rating deltas for every competitor in an outcome's internal teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDeltaSet {
    pub variant: RatingModelKind,
    pub deltas: Vec<RatingDelta>,
}

impl RatingDeltaSet {
    /// Look up the delta for one competitor
    pub fn get(&self, competitor_id: u64) -> Option<&RatingDelta> {
        self.deltas.iter().find(|d| d.competitor_id == competitor_id)
    }
}

/// Trait for converting a match outcome into per-competitor rating deltas
///
/// Implementations are stateless pure functions over
/// (current rating state, outcome); they never mutate shared state.
pub trait RatingModel: Send + Sync {
    /// Resolve an outcome into deltas for every internal competitor
    ///
    /// Valid outcomes never fail: out-of-range placements are clamped.
    /// Only malformed outcomes (empty team, zero placement, duplicate
    /// competitor) are rejected.
    fn resolve(&self, outcome: &MatchOutcome) -> crate::error::Result<RatingDeltaSet>;

    /// Which variant this model implements
    fn kind(&self) -> RatingModelKind;
}

/// Construct the rating model for a variant from configuration
pub fn rating_model(
    kind: RatingModelKind,
    config: &RatingModelConfig,
) -> crate::error::Result<Box<dyn RatingModel>> {
    Ok(match kind {
        RatingModelKind::Placement => {
            Box::new(PlacementDeltaModel::new(config.placement.clone())?)
        }
        RatingModelKind::MultiFactor => {
            Box::new(MultiFactorModel::new(config.multi_factor.clone())?)
        }
        RatingModelKind::Bayesian => Box::new(BayesianSkillModel::new(config.bayesian.clone())?),
    })
}

/// Shared validation for match outcomes handed to any variant
pub(crate) fn validate_outcome(outcome: &MatchOutcome) -> crate::error::Result<()> {
    if outcome.teams.is_empty() {
        return Err(EngineError::MalformedOutcome {
            reason: "Outcome contains no teams".to_string(),
        }
        .into());
    }

    let mut seen = HashSet::new();
    for team in &outcome.teams {
        if team.members.is_empty() {
            return Err(EngineError::MalformedOutcome {
                reason: format!("Team at placement {} has no members", team.placement),
            }
            .into());
        }

        if team.placement == 0 {
            return Err(EngineError::MalformedOutcome {
                reason: "Placements start at 1".to_string(),
            }
            .into());
        }

        for member in &team.members {
            if !seen.insert(member.id) {
                return Err(EngineError::MalformedOutcome {
                    reason: format!("Competitor {} appears in more than one team", member.id),
                }
                .into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Competitor, PlacedTeam};

    fn outcome_with_teams(teams: Vec<PlacedTeam>) -> MatchOutcome {
        MatchOutcome::new(teams, false)
    }

    #[test]
    fn test_variant_selection() {
        let config = RatingModelConfig::default();

        for kind in [
            RatingModelKind::Placement,
            RatingModelKind::MultiFactor,
            RatingModelKind::Bayesian,
        ] {
            let model = rating_model(kind, &config).unwrap();
            assert_eq!(model.kind(), kind);
        }
    }

    #[test]
    fn test_validate_rejects_empty_outcome() {
        let outcome = outcome_with_teams(vec![]);
        assert!(validate_outcome(&outcome).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_team() {
        let outcome = outcome_with_teams(vec![PlacedTeam::new(1, vec![])]);
        assert!(validate_outcome(&outcome).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_placement() {
        let outcome = outcome_with_teams(vec![PlacedTeam::new(0, vec![Competitor::new(1)])]);
        assert!(validate_outcome(&outcome).is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_competitor() {
        let outcome = outcome_with_teams(vec![
            PlacedTeam::new(1, vec![Competitor::new(1)]),
            PlacedTeam::new(2, vec![Competitor::new(1)]),
        ]);
        assert!(validate_outcome(&outcome).is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_outcome() {
        let outcome = outcome_with_teams(vec![
            PlacedTeam::new(1, vec![Competitor::new(1), Competitor::new(2)]),
            PlacedTeam::new(2, vec![Competitor::new(3)]),
        ]);
        assert!(validate_outcome(&outcome).is_ok());
    }

    #[test]
    fn test_delta_set_lookup() {
        let set = RatingDeltaSet {
            variant: RatingModelKind::Placement,
            deltas: vec![],
        };
        assert!(set.get(1).is_none());
    }
}
