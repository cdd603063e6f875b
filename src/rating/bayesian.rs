//! Bayesian skill model backed by the Weng-Lin (OpenSkill) algorithm
//!
//! Maintains a (mu, sigma) pair per competitor. Team strength is the sum of
//! member mu; team uncertainty is the root of summed variances. After an
//! outcome mu shifts toward actual performance and sigma shrinks
//! monotonically toward a floor, never increasing.
//!
//! When an outcome includes external, untracked competitors (placement gaps),
//! the model synthesizes estimated external teams at the missing placements
//! so internal deltas reflect the full field. Synthetic teams never appear in
//! the returned delta set.

use crate::config::BayesianConfig;
use crate::error::EngineError;
use crate::rating::model::{validate_outcome, RatingDeltaSet, RatingModel, RatingModelKind};
use crate::types::{MatchOutcome, RatingDelta, RatingState, SkillRating};
use crate::utils::mean;
use skillratings::weng_lin::{weng_lin_multi_team, WengLinRating};
use skillratings::MultiTeamOutcome;
use std::collections::HashSet;
use tracing::debug;

/// Bayesian rating model over (mu, sigma) skill states
#[derive(Debug, Clone)]
pub struct BayesianSkillModel {
    config: BayesianConfig,
}

impl BayesianSkillModel {
    /// Create a new Bayesian skill model
    pub fn new(config: BayesianConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Default skill state for new competitors
    pub fn default_skill(&self) -> SkillRating {
        SkillRating {
            mu: self.config.initial_mu,
            sigma: self.config.initial_sigma,
        }
    }

    /// Estimate the per-member skill of external teams from how the internal
    /// teams fared: a field the internal teams beat easily is rated slightly
    /// below the internal average, one they trailed slightly above it
    fn estimate_external_member(&self, outcome: &MatchOutcome) -> SkillRating {
        let team_strengths: Vec<f64> = outcome.teams.iter().map(|t| t.skill_strength()).collect();
        let avg_strength = mean(&team_strengths);

        let placements: Vec<f64> = outcome.teams.iter().map(|t| t.placement as f64).collect();
        let avg_placement = mean(&placements);

        let scale = if avg_placement <= 3.0 {
            0.95
        } else if avg_placement <= 6.0 {
            1.0
        } else {
            1.1
        };

        SkillRating {
            mu: avg_strength * scale / self.config.external_team_size as f64,
            sigma: self.config.initial_sigma,
        }
    }

    fn validate_skill_states(&self, outcome: &MatchOutcome) -> crate::error::Result<()> {
        for member in outcome.competitors() {
            if member.skill.sigma <= 0.0 {
                return Err(EngineError::RatingStateInvalid {
                    competitor_id: member.id,
                    reason: format!("sigma must be positive, got {}", member.skill.sigma),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl RatingModel for BayesianSkillModel {
    fn resolve(&self, outcome: &MatchOutcome) -> crate::error::Result<RatingDeltaSet> {
        validate_outcome(outcome)?;
        self.validate_skill_states(outcome)?;

        // Internal teams, in outcome order
        let mut teams: Vec<(Vec<WengLinRating>, MultiTeamOutcome)> = outcome
            .teams
            .iter()
            .map(|team| {
                let ratings = team.members.iter().map(|m| m.skill.into()).collect();
                (ratings, MultiTeamOutcome::new(team.placement as usize))
            })
            .collect();
        let internal_count = teams.len();

        // Fill placement gaps with estimated external teams
        if outcome.includes_external {
            let max_placement = outcome
                .teams
                .iter()
                .map(|t| t.placement)
                .max()
                .unwrap_or(0);
            let used: HashSet<u32> = outcome.teams.iter().map(|t| t.placement).collect();

            if max_placement as usize > internal_count {
                let external_member: WengLinRating =
                    self.estimate_external_member(outcome).into();

                for placement in 1..=max_placement {
                    if !used.contains(&placement) {
                        let members = vec![external_member; self.config.external_team_size];
                        teams.push((members, MultiTeamOutcome::new(placement as usize)));
                    }
                }

                debug!(
                    internal_teams = internal_count,
                    external_teams = teams.len() - internal_count,
                    "Resolving outcome against an estimated external field"
                );
            }
        }

        let team_refs: Vec<(&[WengLinRating], MultiTeamOutcome)> = teams
            .iter()
            .map(|(members, rank)| (members.as_slice(), *rank))
            .collect();

        let updated = weng_lin_multi_team(&team_refs, &self.config.weng_lin_config);

        let mut deltas = Vec::new();
        for (team_index, team) in outcome.teams.iter().enumerate() {
            for (member_index, member) in team.members.iter().enumerate() {
                let new_rating = updated
                    .get(team_index)
                    .and_then(|t| t.get(member_index))
                    .ok_or_else(|| EngineError::InternalError {
                        message: format!("Missing rating result for competitor {}", member.id),
                    })?;

                let before = RatingState::from(member);
                let mut after = before;
                after.skill.mu = new_rating.rating;
                // Sigma is monotone non-increasing, floored
                after.skill.sigma = new_rating
                    .uncertainty
                    .min(before.skill.sigma)
                    .max(self.config.sigma_floor);

                deltas.push(RatingDelta {
                    competitor_id: member.id,
                    before,
                    after,
                    change: after.skill.display_rating() - before.skill.display_rating(),
                });
            }
        }

        Ok(RatingDeltaSet {
            variant: RatingModelKind::Bayesian,
            deltas,
        })
    }

    fn kind(&self) -> RatingModelKind {
        RatingModelKind::Bayesian
    }
}
