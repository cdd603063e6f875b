//! Common types used throughout the team formation engine

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use skillratings::weng_lin::WengLinRating;
use uuid::Uuid;

/// Unique identifier for competitors
pub type CompetitorId = u64;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Region code attached to a competitor (e.g. "KR", "NA", "EU")
pub type RegionCode = String;

/// Scale factor from Bayesian mu to the displayed rating (25 * 60 = 1500 baseline)
pub const DISPLAY_RATING_SCALE: f64 = 60.0;

/// Bayesian skill state for a competitor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillRating {
    pub mu: f64,
    pub sigma: f64,
}

impl Default for SkillRating {
    fn default() -> Self {
        Self {
            mu: 25.0,
            sigma: 25.0 / 3.0,
        }
    }
}

impl SkillRating {
    /// Conservative skill estimate (mu - 3*sigma)
    pub fn ordinal(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }

    /// Linear transform of mu onto the displayed rating scale
    pub fn display_rating(&self) -> f64 {
        self.mu * DISPLAY_RATING_SCALE
    }
}

impl From<WengLinRating> for SkillRating {
    fn from(rating: WengLinRating) -> Self {
        Self {
            mu: rating.rating,
            sigma: rating.uncertainty,
        }
    }
}

impl From<SkillRating> for WengLinRating {
    fn from(rating: SkillRating) -> Self {
        Self {
            rating: rating.mu,
            uncertainty: rating.sigma,
        }
    }
}

/// A competitor eligible for team assignment
///
/// Carries one rating state per active rating model variant: the scalar
/// `rating` shared by the placement and multi-factor models, and the
/// Bayesian `skill` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub region: Option<RegionCode>,
    pub rating: f64,
    pub skill: SkillRating,
    pub games_played: u64,
}

impl Competitor {
    /// Create a competitor with default rating state (first appearance)
    pub fn new(id: CompetitorId) -> Self {
        Self {
            id,
            region: None,
            rating: 1500.0,
            skill: SkillRating::default(),
            games_played: 0,
        }
    }

    /// Builder-style region assignment
    pub fn with_region(mut self, region: impl Into<RegionCode>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder-style scalar rating assignment
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Builder-style skill state assignment
    pub fn with_skill(mut self, mu: f64, sigma: f64) -> Self {
        self.skill = SkillRating { mu, sigma };
        self
    }
}

/// A non-empty set of competitor ids with derived aggregate ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub members: Vec<CompetitorId>,
    /// Sum of member scalar ratings
    pub rating_sum: f64,
    /// Average of member scalar ratings
    pub rating_avg: f64,
}

impl Team {
    /// Build a team from competitor snapshots, deriving both aggregates
    pub fn from_members(members: &[Competitor]) -> crate::error::Result<Self> {
        if members.is_empty() {
            return Err(EngineError::InternalError {
                message: "Cannot build a team with no members".to_string(),
            }
            .into());
        }

        let rating_sum: f64 = members.iter().map(|c| c.rating).sum();
        Ok(Self {
            members: members.iter().map(|c| c.id).collect(),
            rating_sum,
            rating_avg: rating_sum / members.len() as f64,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.members.contains(&id)
    }
}

/// Structural mode the engine selected for an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentMode {
    SingleTeam,
    AsymmetricSplit,
    BalancedPartition,
}

impl std::fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentMode::SingleTeam => write!(f, "SingleTeam"),
            AssignmentMode::AsymmetricSplit => write!(f, "AsymmetricSplit"),
            AssignmentMode::BalancedPartition => write!(f, "BalancedPartition"),
        }
    }
}

/// A constraint the engine relaxed at the caller's request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationNotice {
    pub constraint: String,
    pub effect: String,
}

/// An ordered sequence of teams covering the roster exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPartition {
    pub teams: Vec<Team>,
    pub mode: AssignmentMode,
    /// BalanceScorer score of this partition (lower is better)
    pub balance_score: f64,
    /// Constraints relaxed under a relax-and-warn policy, with their effect
    pub relaxations: Vec<RelaxationNotice>,
}

impl TeamPartition {
    /// Total number of competitors across all teams
    pub fn competitor_count(&self) -> usize {
        self.teams.iter().map(Team::len).sum()
    }

    /// Team sizes in order
    pub fn sizes(&self) -> Vec<usize> {
        self.teams.iter().map(Team::len).collect()
    }
}

/// A team with its final placement and member snapshots at match time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTeam {
    /// Final rank in the match (1 = best)
    pub placement: u32,
    pub members: Vec<Competitor>,
}

impl PlacedTeam {
    pub fn new(placement: u32, members: Vec<Competitor>) -> Self {
        Self { placement, members }
    }

    /// Average scalar rating of the team's members
    pub fn rating_avg(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|c| c.rating).sum::<f64>() / self.members.len() as f64
    }

    /// Combined team strength on the Bayesian scale (sum of member mu)
    pub fn skill_strength(&self) -> f64 {
        self.members.iter().map(|c| c.skill.mu).sum()
    }

    /// Combined team uncertainty (sqrt of summed variances)
    pub fn skill_uncertainty(&self) -> f64 {
        self.members
            .iter()
            .map(|c| c.skill.sigma * c.skill.sigma)
            .sum::<f64>()
            .sqrt()
    }
}

/// Result of a completed match, ordered by placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub match_id: MatchId,
    /// Internal teams with their placements (1 = best)
    pub teams: Vec<PlacedTeam>,
    /// True when some placements in the match belong to external,
    /// untracked competitors (gaps in the internal placement sequence)
    pub includes_external: bool,
}

impl MatchOutcome {
    pub fn new(teams: Vec<PlacedTeam>, includes_external: bool) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            teams,
            includes_external,
        }
    }

    /// All internal competitors across all placed teams
    pub fn competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.teams.iter().flat_map(|t| t.members.iter())
    }
}

/// Snapshot of both rating states for one competitor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    pub rating: f64,
    pub skill: SkillRating,
}

impl From<&Competitor> for RatingState {
    fn from(competitor: &Competitor) -> Self {
        Self {
            rating: competitor.rating,
            skill: competitor.skill,
        }
    }
}

/// Rating change for one competitor after a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDelta {
    pub competitor_id: CompetitorId,
    pub before: RatingState,
    pub after: RatingState,
    /// Signed change on the variant's display scale
    pub change: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_rating_defaults() {
        let skill = SkillRating::default();
        assert_eq!(skill.mu, 25.0);
        assert!((skill.sigma - 25.0 / 3.0).abs() < 1e-9);
        assert_eq!(skill.display_rating(), 1500.0);
        assert_eq!(skill.ordinal(), 0.0);
    }

    #[test]
    fn test_skill_rating_weng_lin_round_trip() {
        let skill = SkillRating { mu: 27.5, sigma: 6.2 };
        let weng_lin: WengLinRating = skill.into();
        assert_eq!(weng_lin.rating, 27.5);
        assert_eq!(weng_lin.uncertainty, 6.2);

        let back: SkillRating = weng_lin.into();
        assert_eq!(back, skill);
    }

    #[test]
    fn test_competitor_builder() {
        let competitor = Competitor::new(42)
            .with_region("KR")
            .with_rating(1700.0)
            .with_skill(28.0, 7.0);

        assert_eq!(competitor.id, 42);
        assert_eq!(competitor.region.as_deref(), Some("KR"));
        assert_eq!(competitor.rating, 1700.0);
        assert_eq!(competitor.skill.mu, 28.0);
        assert_eq!(competitor.games_played, 0);
    }

    #[test]
    fn test_team_aggregates() {
        let members = vec![
            Competitor::new(1).with_rating(1600.0),
            Competitor::new(2).with_rating(1400.0),
        ];
        let team = Team::from_members(&members).unwrap();

        assert_eq!(team.len(), 2);
        assert_eq!(team.rating_sum, 3000.0);
        assert_eq!(team.rating_avg, 1500.0);
        assert!(team.contains(1));
        assert!(!team.contains(3));
    }

    #[test]
    fn test_empty_team_rejected() {
        assert!(Team::from_members(&[]).is_err());
    }

    #[test]
    fn test_placed_team_skill_aggregates() {
        let team = PlacedTeam::new(
            1,
            vec![
                Competitor::new(1).with_skill(25.0, 3.0),
                Competitor::new(2).with_skill(27.0, 4.0),
            ],
        );

        assert_eq!(team.skill_strength(), 52.0);
        assert!((team.skill_uncertainty() - 5.0).abs() < 1e-9);
    }
}
