//! Balance scoring for candidate team partitions
//!
//! `score = variance(team rating sums) + weight * sum of partnership
//! penalties for co-assigned pairs`. Lower is better. Balancing total team
//! strength rather than averages keeps unequal-size partitions comparable in
//! combined strength instead of stacking the extra member with weak
//! teammates. The partnership term is present only when
//! partnership-avoidance mode is requested for the call.

use crate::history::PartnershipHistoryIndex;
use crate::types::{Competitor, CompetitorId, RegionCode};
use crate::utils::variance;
use std::collections::HashSet;

/// Pairs forced together by an active regional-diversity requirement
///
/// Reserving one regional competitor per team forces regional members onto
/// mixed teams; penalizing those pairings would fight the reservation, so a
/// pair with exactly one member from the required region is exempt.
#[derive(Debug, Clone)]
pub struct RegionalExemption {
    region: RegionCode,
    regional_ids: HashSet<CompetitorId>,
}

impl RegionalExemption {
    pub fn new(region: impl Into<RegionCode>, regional_ids: HashSet<CompetitorId>) -> Self {
        Self {
            region: region.into(),
            regional_ids,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// True when the pair bypasses the partnership penalty
    pub fn is_exempt(&self, a: CompetitorId, b: CompetitorId) -> bool {
        self.regional_ids.contains(&a) != self.regional_ids.contains(&b)
    }
}

/// Scores candidate partitions; lower scores are better balanced
#[derive(Debug, Clone, Default)]
pub struct BalanceScorer<'a> {
    partnership_weight: f64,
    history: Option<&'a PartnershipHistoryIndex>,
    exemption: Option<RegionalExemption>,
}

impl<'a> BalanceScorer<'a> {
    /// Scorer over strength variance only
    pub fn new() -> Self {
        Self {
            partnership_weight: 0.0,
            history: None,
            exemption: None,
        }
    }

    /// Include the partnership penalty term
    pub fn with_partnership(mut self, history: &'a PartnershipHistoryIndex, weight: f64) -> Self {
        self.history = Some(history);
        self.partnership_weight = weight;
        self
    }

    /// Exempt regionally-forced pairs from the penalty term
    pub fn with_regional_exemption(mut self, exemption: RegionalExemption) -> Self {
        self.exemption = Some(exemption);
        self
    }

    /// Variance of the candidate teams' total ratings
    pub fn strength_variance(&self, teams: &[Vec<&Competitor>]) -> f64 {
        let sums: Vec<f64> = teams
            .iter()
            .filter(|team| !team.is_empty())
            .map(|team| team.iter().map(|c| c.rating).sum::<f64>())
            .collect();
        variance(&sums)
    }

    /// Total partnership penalty across all co-assigned pairs
    pub fn partnership_penalty(&self, teams: &[Vec<&Competitor>]) -> f64 {
        let Some(history) = self.history else {
            return 0.0;
        };

        let mut total = 0.0;
        for team in teams {
            for (i, a) in team.iter().enumerate() {
                for b in &team[i + 1..] {
                    if let Some(exemption) = &self.exemption {
                        if exemption.is_exempt(a.id, b.id) {
                            continue;
                        }
                    }
                    total += history.penalty(a.id, b.id);
                }
            }
        }
        total
    }

    /// Penalty incurred by adding `candidate` to an existing team
    pub fn penalty_of_joining(&self, candidate: &Competitor, team: &[&Competitor]) -> f64 {
        let Some(history) = self.history else {
            return 0.0;
        };

        team.iter()
            .filter(|member| {
                self.exemption
                    .as_ref()
                    .map(|e| !e.is_exempt(candidate.id, member.id))
                    .unwrap_or(true)
            })
            .map(|member| history.penalty(candidate.id, member.id))
            .sum()
    }

    /// Full balance score of a candidate partition
    pub fn score(&self, teams: &[Vec<&Competitor>]) -> f64 {
        self.strength_variance(teams) + self.partnership_weight * self.partnership_penalty(teams)
    }

    pub fn partnership_weight(&self) -> f64 {
        self.partnership_weight
    }
}
