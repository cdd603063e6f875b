//! Team assignment engine
//!
//! Selects a structural mode from the roster size (single team, asymmetric
//! split, or full balanced partition), reserves regional slots when a region
//! is required, then runs independent seeded search trials alternating
//! shuffled serpentine distribution and greedy construction. Each candidate
//! is tightened by an iterative cross-team swap improvement before scoring,
//! and the lowest-scoring candidate across all trials wins.
//!
//! Trials are pure computations over an immutable snapshot of roster,
//! ratings, and partnership data; nothing is persisted until a final
//! partition is selected, so a caller may abandon the computation at any
//! trial boundary without side effects.

use crate::config::{ConstraintPolicy, EngineConfig};
use crate::engine::constraints::AssignmentConstraints;
use crate::engine::scorer::{BalanceScorer, RegionalExemption};
use crate::error::EngineError;
use crate::history::PartnershipHistoryIndex;
use crate::roster::Roster;
use crate::types::{AssignmentMode, Competitor, RelaxationNotice, Team, TeamPartition};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Engine turning a roster into a balanced team partition
#[derive(Debug)]
pub struct TeamAssignmentEngine {
    config: EngineConfig,
    rng: ChaCha8Rng,
}

impl TeamAssignmentEngine {
    /// Create an engine with a fresh entropy-seeded random source
    pub fn new(config: EngineConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Create an engine with a fixed seed for reproducible assignments
    pub fn with_seed(config: EngineConfig, seed: u64) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assign the roster to teams under the given constraints
    ///
    /// The partnership history is consulted only when the constraints request
    /// partnership avoidance. Constraint violations fail the call unless the
    /// caller opted into the relax-and-warn policy, in which case relaxations
    /// are applied, logged, and reported in the returned partition.
    pub fn assign(
        &mut self,
        roster: &Roster,
        constraints: &AssignmentConstraints,
        history: Option<&PartnershipHistoryIndex>,
    ) -> crate::error::Result<TeamPartition> {
        let n = roster.len();
        let required = self.config.min_roster_size.max(1);
        if n < required {
            return Err(EngineError::InsufficientRoster {
                available: n,
                required,
            }
            .into());
        }
        if n > self.config.max_roster_size {
            return Err(EngineError::InvalidRoster {
                reason: format!(
                    "Roster of {} exceeds the maximum of {}",
                    n, self.config.max_roster_size
                ),
            }
            .into());
        }

        let mut relaxations = Vec::new();

        let (mode, sizes) = self.resolve_structure(n, constraints, &mut relaxations)?;
        debug_assert_eq!(sizes.iter().sum::<usize>(), n);

        // Regional reservation: one anchor slot per team, filled by
        // descending rating, before the remainder is placed
        let mut anchors: Vec<Vec<&Competitor>> = vec![Vec::new(); sizes.len()];
        let mut pool: Vec<&Competitor> = roster.iter().collect();
        let mut exemption = None;

        if let Some(region) = &constraints.required_region {
            let (mut regional, other) = roster.split_by_region(region);

            if regional.len() < sizes.len() {
                match constraints.policy {
                    ConstraintPolicy::Strict => {
                        return Err(self.region_failure(
                            region,
                            regional.len(),
                            &sizes,
                            constraints,
                        ));
                    }
                    ConstraintPolicy::RelaxAndWarn => {
                        // Region dropped; no reservation, no exemption
                        warn!(
                            region = %region,
                            available = regional.len(),
                            teams = sizes.len(),
                            "Relaxing regional requirement: not enough regional competitors"
                        );
                        relaxations.push(RelaxationNotice {
                            constraint: format!("required_region={region}"),
                            effect: format!(
                                "Dropped: only {} of {} teams could be covered",
                                regional.len(),
                                sizes.len()
                            ),
                        });
                    }
                }
            } else {
                regional.sort_by(|a, b| {
                    b.rating
                        .partial_cmp(&a.rating)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                exemption = Some(RegionalExemption::new(
                    region.clone(),
                    regional.iter().map(|c| c.id).collect::<HashSet<_>>(),
                ));

                for (team_index, anchor) in regional.iter().take(sizes.len()).enumerate() {
                    anchors[team_index].push(anchor);
                }

                pool = regional.split_off(sizes.len());
                pool.extend(other);
            }
        }

        self.run_mode(mode, &sizes, &anchors, &pool, constraints, history, exemption, relaxations)
    }

    /// Decide mode and team sizes from the roster size and constraints
    fn resolve_structure(
        &self,
        n: usize,
        constraints: &AssignmentConstraints,
        relaxations: &mut Vec<RelaxationNotice>,
    ) -> crate::error::Result<(AssignmentMode, Vec<usize>)> {
        if let Some(sizes) = &constraints.explicit_sizes {
            match self.validate_explicit_sizes(sizes, n) {
                Ok(()) => {
                    let mode = if sizes.len() == 1 {
                        AssignmentMode::SingleTeam
                    } else {
                        AssignmentMode::BalancedPartition
                    };
                    return Ok((mode, sizes.clone()));
                }
                Err(err) => match constraints.policy {
                    ConstraintPolicy::Strict => return Err(err),
                    ConstraintPolicy::RelaxAndWarn => {
                        warn!(requested = ?sizes, roster = n, "Relaxing explicit format: {err}");
                        relaxations.push(RelaxationNotice {
                            constraint: format!("explicit_sizes={sizes:?}"),
                            effect: "Dropped: falling back to automatic team sizing".to_string(),
                        });
                    }
                },
            }
        }

        if n <= self.config.single_team_threshold {
            return Ok((AssignmentMode::SingleTeam, vec![n]));
        }

        if n == self.config.single_team_threshold + 1 {
            let (small, large) = self.config.asymmetric_sizes;
            return Ok((AssignmentMode::AsymmetricSplit, vec![small, large]));
        }

        Ok((AssignmentMode::BalancedPartition, self.determine_sizes(n)?))
    }

    /// Smallest team count whose near-even split stays inside the size band
    fn determine_sizes(&self, n: usize) -> crate::error::Result<Vec<usize>> {
        for team_count in 1..=n {
            let base = n / team_count;
            let remainder = n % team_count;
            let largest = if remainder > 0 { base + 1 } else { base };

            if base >= self.config.min_team_size && largest <= self.config.max_team_size {
                let mut sizes = vec![base + 1; remainder];
                sizes.extend(std::iter::repeat(base).take(team_count - remainder));
                return Ok(sizes);
            }
        }

        Err(EngineError::ImpossibleConstraints {
            reason: format!(
                "No team count splits {} competitors into teams of {}..={}",
                n, self.config.min_team_size, self.config.max_team_size
            ),
        }
        .into())
    }

    fn validate_explicit_sizes(&self, sizes: &[usize], n: usize) -> crate::error::Result<()> {
        if sizes.is_empty() {
            return Err(EngineError::FormatSizeMismatch {
                requested_sizes: sizes.to_vec(),
                roster_size: n,
                reason: "Format is empty".to_string(),
            }
            .into());
        }

        let total: usize = sizes.iter().sum();
        if total != n {
            return Err(EngineError::FormatSizeMismatch {
                requested_sizes: sizes.to_vec(),
                roster_size: n,
                reason: format!("Sizes sum to {total}, roster has {n}"),
            }
            .into());
        }

        for &size in sizes {
            if size < self.config.min_team_size || size > self.config.max_team_size {
                return Err(EngineError::FormatSizeMismatch {
                    requested_sizes: sizes.to_vec(),
                    roster_size: n,
                    reason: format!(
                        "Team size {} outside {}..={}",
                        size, self.config.min_team_size, self.config.max_team_size
                    ),
                }
                .into());
            }
        }

        Ok(())
    }

    fn region_failure(
        &self,
        region: &str,
        available: usize,
        sizes: &[usize],
        constraints: &AssignmentConstraints,
    ) -> anyhow::Error {
        let uncovered_teams: Vec<usize> = (available..sizes.len()).collect();

        if constraints.explicit_sizes.is_some() {
            return EngineError::ImpossibleConstraints {
                reason: format!(
                    "Format {:?} needs {} regional competitors of {}, only {} available",
                    sizes,
                    sizes.len(),
                    region,
                    available
                ),
            }
            .into();
        }

        EngineError::RegionUnsatisfiable {
            region: region.to_string(),
            uncovered_teams,
        }
        .into()
    }

    #[allow(clippy::too_many_arguments)]
    fn run_mode(
        &mut self,
        mode: AssignmentMode,
        sizes: &[usize],
        anchors: &[Vec<&Competitor>],
        pool: &[&Competitor],
        constraints: &AssignmentConstraints,
        history: Option<&PartnershipHistoryIndex>,
        exemption: Option<RegionalExemption>,
        relaxations: Vec<RelaxationNotice>,
    ) -> crate::error::Result<TeamPartition> {
        let mut scorer = BalanceScorer::new();
        if constraints.avoid_partnerships {
            if let Some(history) = history {
                scorer = scorer.with_partnership(history, self.config.partnership_weight);
                if let Some(exemption) = exemption {
                    scorer = scorer.with_regional_exemption(exemption);
                }
            }
        }

        let candidate = match mode {
            AssignmentMode::SingleTeam => {
                let mut team = anchors[0].clone();
                team.extend_from_slice(pool);
                vec![team]
            }
            AssignmentMode::AsymmetricSplit => asymmetric_split(anchors, pool, sizes),
            AssignmentMode::BalancedPartition => self.search(anchors, pool, sizes, &scorer)?,
        };

        let balance_score = scorer.score(&candidate);
        info!(
            mode = %mode,
            teams = sizes.len(),
            competitors = candidate.iter().map(Vec::len).sum::<usize>(),
            balance_score,
            "Assignment complete"
        );

        let teams = candidate
            .iter()
            .map(|members| {
                let owned: Vec<Competitor> = members.iter().map(|&c| c.clone()).collect();
                Team::from_members(&owned)
            })
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(TeamPartition {
            teams,
            mode,
            balance_score,
            relaxations,
        })
    }

    /// Run independent seeded trials and keep the lowest-scoring candidate
    ///
    /// Even trials use shuffled serpentine distribution, odd trials greedy
    /// construction. Ties go to the earlier trial.
    fn search<'a>(
        &mut self,
        anchors: &[Vec<&'a Competitor>],
        pool: &[&'a Competitor],
        sizes: &[usize],
        scorer: &BalanceScorer<'_>,
    ) -> crate::error::Result<Vec<Vec<&'a Competitor>>> {
        let seeds: Vec<u64> = (0..self.config.search_trials)
            .map(|_| self.rng.gen())
            .collect();

        let mut best: Option<(Vec<Vec<&Competitor>>, f64)> = None;
        for (trial, seed) in seeds.into_iter().enumerate() {
            let mut trial_rng = ChaCha8Rng::seed_from_u64(seed);

            let candidate = if trial % 2 == 0 {
                serpentine_fill(anchors, pool, sizes, &mut trial_rng)
            } else {
                greedy_fill(anchors, pool, sizes, scorer, &mut trial_rng)?
            };
            let candidate = refine_by_swaps(candidate, anchors, scorer);

            let score = scorer.score(&candidate);
            debug!(trial, score, "Search trial candidate");

            if best.as_ref().map(|(_, s)| score < *s).unwrap_or(true) {
                best = Some((candidate, score));
            }
        }

        best.map(|(candidate, _)| candidate)
            .ok_or_else(|| {
                EngineError::InternalError {
                    message: "Search produced no candidate partition".to_string(),
                }
                .into()
            })
    }
}

/// Split into two unequal teams, compensating the smaller team with the
/// higher-rated competitors
fn asymmetric_split<'a>(
    anchors: &[Vec<&'a Competitor>],
    pool: &[&'a Competitor],
    sizes: &[usize],
) -> Vec<Vec<&'a Competitor>> {
    let mut teams: Vec<Vec<&Competitor>> = anchors.to_vec();
    let mut ordered = pool.to_vec();
    ordered.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Fill the smaller team first so the strongest competitors land on it
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|&i| sizes[i]);

    let mut next = ordered.into_iter();
    for team_index in order {
        while teams[team_index].len() < sizes[team_index] {
            match next.next() {
                Some(competitor) => teams[team_index].push(competitor),
                None => break,
            }
        }
    }

    teams
}

/// Serpentine distribution: shuffle (to vary tie order across trials), sort
/// by rating descending, then deal across teams 1..k, k..1, skipping full
/// teams
fn serpentine_fill<'a>(
    anchors: &[Vec<&'a Competitor>],
    pool: &[&'a Competitor],
    sizes: &[usize],
    rng: &mut ChaCha8Rng,
) -> Vec<Vec<&'a Competitor>> {
    let mut teams: Vec<Vec<&Competitor>> = anchors.to_vec();
    let mut ordered = pool.to_vec();
    ordered.shuffle(rng);
    // Stable sort: equal ratings keep their shuffled order
    ordered.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let team_count = sizes.len() as isize;
    let mut index: isize = 0;
    let mut direction: isize = 1;

    let step = |index: &mut isize, direction: &mut isize| {
        *index += *direction;
        if *index >= team_count {
            *index = team_count - 1;
            *direction = -1;
        } else if *index < 0 {
            *index = 0;
            *direction = 1;
        }
    };

    for competitor in ordered {
        // Skip teams already at capacity (anchors count against it)
        let mut guard = 0;
        while teams[index as usize].len() >= sizes[index as usize] && guard <= 2 * team_count {
            step(&mut index, &mut direction);
            guard += 1;
        }

        teams[index as usize].push(competitor);
        step(&mut index, &mut direction);
    }

    teams
}

/// Greedy construction: place each competitor (in randomized order) into the
/// currently weakest eligible team, penalized by its partnership cost there
fn greedy_fill<'a>(
    anchors: &[Vec<&'a Competitor>],
    pool: &[&'a Competitor],
    sizes: &[usize],
    scorer: &BalanceScorer<'_>,
    rng: &mut ChaCha8Rng,
) -> crate::error::Result<Vec<Vec<&'a Competitor>>> {
    let mut teams: Vec<Vec<&Competitor>> = anchors.to_vec();
    let mut ordered = pool.to_vec();
    ordered.shuffle(rng);

    for competitor in ordered {
        let mut best: Option<(usize, f64)> = None;
        for (team_index, team) in teams.iter().enumerate() {
            if team.len() >= sizes[team_index] {
                continue;
            }

            let strength: f64 = team.iter().map(|c| c.rating).sum();
            let cost = strength
                + scorer.partnership_weight() * scorer.penalty_of_joining(competitor, team);

            if best.map(|(_, c)| cost < c).unwrap_or(true) {
                best = Some((team_index, cost));
            }
        }

        let (team_index, _) = best.ok_or_else(|| EngineError::InternalError {
            message: "Greedy construction ran out of team capacity".to_string(),
        })?;
        teams[team_index].push(competitor);
    }

    Ok(teams)
}

/// Iterative improvement over a candidate: repeatedly apply the cross-team
/// swap that lowers the balance score most, until no swap improves it
///
/// Reserved regional anchors occupy the leading slots of each team and are
/// never swapped, so regional coverage survives refinement. The score
/// strictly decreases every pass, so the loop terminates.
fn refine_by_swaps<'a>(
    mut teams: Vec<Vec<&'a Competitor>>,
    anchors: &[Vec<&'a Competitor>],
    scorer: &BalanceScorer<'_>,
) -> Vec<Vec<&'a Competitor>> {
    let locked: Vec<usize> = anchors.iter().map(Vec::len).collect();
    let mut current = scorer.score(&teams);

    let total: usize = teams.iter().map(Vec::len).sum();
    for _ in 0..total.max(1) {
        let mut best: Option<(usize, usize, usize, usize, f64)> = None;

        for t1 in 0..teams.len() {
            for t2 in t1 + 1..teams.len() {
                for i in locked[t1]..teams[t1].len() {
                    for j in locked[t2]..teams[t2].len() {
                        let (a, b) = (teams[t1][i], teams[t2][j]);
                        teams[t1][i] = b;
                        teams[t2][j] = a;
                        let swapped = scorer.score(&teams);
                        teams[t1][i] = a;
                        teams[t2][j] = b;

                        if swapped + 1e-9 < best.map(|(_, _, _, _, s)| s).unwrap_or(current) {
                            best = Some((t1, t2, i, j, swapped));
                        }
                    }
                }
            }
        }

        match best {
            Some((t1, t2, i, j, score)) => {
                let (a, b) = (teams[t1][i], teams[t2][j]);
                teams[t1][i] = b;
                teams[t2][j] = a;
                current = score;
            }
            None => break,
        }
    }

    teams
}
