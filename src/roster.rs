//! Roster snapshot and provider interface
//!
//! A roster is the ordered, duplicate-free set of competitors eligible for
//! one assignment call. The `RosterProvider` trait is the read-only boundary
//! to whatever system knows who is waiting to play.

use crate::error::EngineError;
use crate::types::{Competitor, CompetitorId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, duplicate-free sequence of competitors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    competitors: Vec<Competitor>,
}

impl Roster {
    /// Build a roster, rejecting duplicate competitor ids
    pub fn new(competitors: Vec<Competitor>) -> crate::error::Result<Self> {
        let mut seen = HashSet::with_capacity(competitors.len());
        for competitor in &competitors {
            if !seen.insert(competitor.id) {
                return Err(EngineError::InvalidRoster {
                    reason: format!("Competitor {} appears more than once", competitor.id),
                }
                .into());
            }
        }

        Ok(Self { competitors })
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    /// Look up a competitor by id
    pub fn get(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    /// Split the roster into competitors of the given region and the rest,
    /// preserving roster order within each subset
    pub fn split_by_region(&self, region: &str) -> (Vec<&Competitor>, Vec<&Competitor>) {
        self.competitors
            .iter()
            .partition(|c| c.region.as_deref() == Some(region))
    }
}

/// Read-only source of the roster for a group context
pub trait RosterProvider: Send + Sync {
    /// Supply the current roster snapshot
    fn roster(&self) -> crate::error::Result<Roster>;
}

/// Roster provider backed by a fixed competitor list
#[derive(Debug, Clone)]
pub struct StaticRosterProvider {
    roster: Roster,
}

impl StaticRosterProvider {
    pub fn new(competitors: Vec<Competitor>) -> crate::error::Result<Self> {
        Ok(Self {
            roster: Roster::new(competitors)?,
        })
    }
}

impl RosterProvider for StaticRosterProvider {
    fn roster(&self) -> crate::error::Result<Roster> {
        Ok(self.roster.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competitor(id: CompetitorId, rating: f64) -> Competitor {
        Competitor::new(id).with_rating(rating)
    }

    #[test]
    fn test_roster_rejects_duplicates() {
        let result = Roster::new(vec![competitor(1, 1500.0), competitor(1, 1600.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_roster_preserves_order() {
        let roster = Roster::new(vec![
            competitor(3, 1500.0),
            competitor(1, 1600.0),
            competitor(2, 1400.0),
        ])
        .unwrap();

        let ids: Vec<_> = roster.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(roster.get(1).unwrap().rating, 1600.0);
        assert!(roster.get(9).is_none());
    }

    #[test]
    fn test_split_by_region() {
        let roster = Roster::new(vec![
            competitor(1, 1500.0).with_region("KR"),
            competitor(2, 1600.0),
            competitor(3, 1400.0).with_region("KR"),
            competitor(4, 1450.0).with_region("NA"),
        ])
        .unwrap();

        let (regional, other) = roster.split_by_region("KR");
        assert_eq!(regional.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(other.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn test_static_provider_round_trip() {
        let provider = StaticRosterProvider::new(vec![competitor(1, 1500.0)]).unwrap();
        let roster = provider.roster().unwrap();
        assert_eq!(roster.len(), 1);
    }
}
