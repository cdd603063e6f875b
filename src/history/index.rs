//! Partnership history read model
//!
//! Counts how often each unordered pair of competitors shared a team in a
//! completed match, and turns those counts into a superlinear penalty that
//! discourages repeatedly teaming the same pair. The index is append-only:
//! counts are never decremented or expired, and the assignment search only
//! reads it. Writes happen strictly after a match is finalized.

use crate::history::store::HistoryStore;
use crate::types::{CompetitorId, MatchOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Exponent of the co-membership penalty curve
const PENALTY_EXPONENT: f64 = 1.5;

/// Co-membership counts over completed matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnershipHistoryIndex {
    counts: HashMap<(CompetitorId, CompetitorId), u32>,
}

fn pair_key(a: CompetitorId, b: CompetitorId) -> (CompetitorId, CompetitorId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PartnershipHistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a set of completed outcomes
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a MatchOutcome>) -> Self {
        let mut index = Self::new();
        for outcome in outcomes {
            index.record_outcome(outcome);
        }
        index
    }

    /// Seed the index from the history store's completed outcomes
    pub fn seed_from_store(store: &dyn HistoryStore) -> crate::error::Result<Self> {
        let outcomes = store.completed_outcomes()?;
        Ok(Self::from_outcomes(outcomes.iter()))
    }

    /// Append one finalized match to the index
    ///
    /// Single-writer: callers serialize finalization per group, after all
    /// reads for that match's assignment search have completed.
    pub fn record_outcome(&mut self, outcome: &MatchOutcome) {
        for team in &outcome.teams {
            for (i, a) in team.members.iter().enumerate() {
                for b in &team.members[i + 1..] {
                    *self.counts.entry(pair_key(a.id, b.id)).or_insert(0) += 1;
                }
            }
        }
    }

    /// Number of completed matches in which the pair shared a team
    pub fn pair_count(&self, a: CompetitorId, b: CompetitorId) -> u32 {
        self.counts.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    /// Superlinear co-assignment penalty for a pair: `count ^ 1.5`
    pub fn penalty(&self, a: CompetitorId, b: CompetitorId) -> f64 {
        (self.pair_count(a, b) as f64).powf(PENALTY_EXPONENT)
    }

    /// Number of distinct pairs with at least one shared match
    pub fn pair_len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Competitor, PlacedTeam};

    fn outcome(teams: Vec<Vec<CompetitorId>>) -> MatchOutcome {
        let placed = teams
            .into_iter()
            .enumerate()
            .map(|(i, ids)| {
                PlacedTeam::new(
                    (i + 1) as u32,
                    ids.into_iter().map(Competitor::new).collect(),
                )
            })
            .collect();
        MatchOutcome::new(placed, false)
    }

    #[test]
    fn test_empty_index_has_zero_penalty() {
        let index = PartnershipHistoryIndex::new();
        assert_eq!(index.pair_count(1, 2), 0);
        assert_eq!(index.penalty(1, 2), 0.0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_pair_count_is_unordered() {
        let mut index = PartnershipHistoryIndex::new();
        index.record_outcome(&outcome(vec![vec![1, 2], vec![3, 4]]));

        assert_eq!(index.pair_count(1, 2), 1);
        assert_eq!(index.pair_count(2, 1), 1);
        assert_eq!(index.pair_count(1, 3), 0);
    }

    #[test]
    fn test_penalty_grows_superlinearly() {
        let mut index = PartnershipHistoryIndex::new();
        for _ in 0..4 {
            index.record_outcome(&outcome(vec![vec![1, 2]]));
        }

        assert_eq!(index.pair_count(1, 2), 4);
        // 4 ^ 1.5 = 8
        assert!((index.penalty(1, 2) - 8.0).abs() < 1e-9);
        // Strictly more than four times the single-match penalty
        assert!(index.penalty(1, 2) > 4.0 * 1.0_f64.powf(1.5));
    }

    #[test]
    fn test_all_team_pairs_recorded() {
        let mut index = PartnershipHistoryIndex::new();
        index.record_outcome(&outcome(vec![vec![1, 2, 3]]));

        assert_eq!(index.pair_count(1, 2), 1);
        assert_eq!(index.pair_count(1, 3), 1);
        assert_eq!(index.pair_count(2, 3), 1);
        assert_eq!(index.pair_len(), 3);
    }

    #[test]
    fn test_opponents_not_recorded() {
        let mut index = PartnershipHistoryIndex::new();
        index.record_outcome(&outcome(vec![vec![1, 2], vec![3, 4]]));

        assert_eq!(index.pair_count(1, 3), 0);
        assert_eq!(index.pair_count(2, 4), 0);
    }

    #[test]
    fn test_from_outcomes_accumulates() {
        let outcomes = vec![
            outcome(vec![vec![1, 2], vec![3, 4]]),
            outcome(vec![vec![1, 2], vec![3, 4]]),
            outcome(vec![vec![1, 3], vec![2, 4]]),
        ];
        let index = PartnershipHistoryIndex::from_outcomes(outcomes.iter());

        assert_eq!(index.pair_count(1, 2), 2);
        assert_eq!(index.pair_count(1, 3), 1);
        assert_eq!(index.pair_count(1, 4), 0);
    }
}
