//! Integration tests for the team formation and rating engine
//!
//! These tests validate the system working end to end, including:
//! - Assignment across all three structural modes
//! - Regional coverage and explicit format constraints
//! - Partnership avoidance fed from recorded history
//! - All three rating variants resolving the same outcome
//! - The full assign -> play -> resolve -> record -> reindex cycle

use proptest::prelude::*;
use std::collections::HashSet;
use team_forge::config::EngineConfig;
use team_forge::engine::{AssignmentConstraints, TeamAssignmentEngine};
use team_forge::history::{HistoryStore, InMemoryHistoryStore, PartnershipHistoryIndex};
use team_forge::rating::{rating_model, RatingModelKind};
use team_forge::roster::Roster;
use team_forge::types::{AssignmentMode, Competitor, MatchOutcome, PlacedTeam, TeamPartition};
use team_forge::EngineError;

fn competitor(id: u64, rating: f64) -> Competitor {
    Competitor::new(id).with_rating(rating)
}

fn roster_of(ratings: &[f64]) -> Roster {
    Roster::new(
        ratings
            .iter()
            .enumerate()
            .map(|(i, &r)| competitor(i as u64 + 1, r))
            .collect(),
    )
    .unwrap()
}

fn seeded_engine(seed: u64) -> TeamAssignmentEngine {
    TeamAssignmentEngine::with_seed(EngineConfig::default(), seed).unwrap()
}

/// Every roster member appears in exactly one team
fn assert_exact_cover(partition: &TeamPartition, roster: &Roster) {
    let mut seen = HashSet::new();
    for team in &partition.teams {
        for &id in &team.members {
            assert!(seen.insert(id), "competitor {id} assigned to two teams");
        }
    }
    assert_eq!(seen.len(), roster.len(), "partition does not cover roster");
}

/// Turn a partition into a placed outcome using the roster's snapshots
fn outcome_from_partition(partition: &TeamPartition, roster: &Roster) -> MatchOutcome {
    let teams = partition
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            PlacedTeam::new(
                i as u32 + 1,
                team.members
                    .iter()
                    .map(|&id| roster.get(id).unwrap().clone())
                    .collect(),
            )
        })
        .collect();
    MatchOutcome::new(teams, false)
}

#[test]
fn test_seven_competitor_partition_is_near_balanced() {
    let roster = roster_of(&[1800.0, 1700.0, 1600.0, 1500.0, 1400.0, 1300.0, 1200.0]);
    let mut engine = seeded_engine(11);

    let partition = engine
        .assign(&roster, &AssignmentConstraints::new(), None)
        .unwrap();

    assert_eq!(partition.mode, AssignmentMode::BalancedPartition);
    assert_eq!(partition.teams.len(), 2);
    assert_exact_cover(&partition, &roster);

    // The closest split of this roster into 4 + 3 members has sums
    // 5400 and 5100, so 300 is the tightest satisfiable tolerance
    let difference = (partition.teams[0].rating_sum - partition.teams[1].rating_sum).abs();
    assert!(difference <= 300.0, "rating sums differ by {difference}");
}

#[test]
fn test_asymmetric_split_compensates_smaller_team() {
    let roster = roster_of(&[2100.0, 2000.0, 1350.0, 1300.0, 1250.0]);
    let mut engine = seeded_engine(11);

    let partition = engine
        .assign(&roster, &AssignmentConstraints::new(), None)
        .unwrap();

    assert_eq!(partition.mode, AssignmentMode::AsymmetricSplit);
    assert_eq!(partition.sizes(), vec![2, 3]);
    assert!(partition.teams[0].rating_sum >= partition.teams[1].rating_sum);
}

#[test]
fn test_explicit_format_honored_and_rejected() {
    let roster = roster_of(&[1500.0; 10]);
    let mut engine = seeded_engine(11);

    let ok = engine
        .assign(
            &roster,
            &AssignmentConstraints::new().with_explicit_sizes(vec![3, 3, 4]),
            None,
        )
        .unwrap();
    assert_eq!(ok.sizes(), vec![3, 3, 4]);
    assert_exact_cover(&ok, &roster);

    let err = engine
        .assign(
            &roster,
            &AssignmentConstraints::new().with_explicit_sizes(vec![3, 3]),
            None,
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::FormatSizeMismatch { .. })
    ));
}

#[test]
fn test_required_region_reaches_every_team() {
    let competitors: Vec<Competitor> = (1..=12)
        .map(|id| {
            let c = competitor(id, 1400.0 + id as f64 * 20.0);
            if id % 4 == 0 {
                c.with_region("KR")
            } else {
                c
            }
        })
        .collect();
    let roster = Roster::new(competitors).unwrap();
    let mut engine = seeded_engine(5);

    let partition = engine
        .assign(
            &roster,
            &AssignmentConstraints::new().with_required_region("KR"),
            None,
        )
        .unwrap();

    assert_eq!(partition.teams.len(), 3);
    assert_exact_cover(&partition, &roster);
    for team in &partition.teams {
        assert!(
            team.members
                .iter()
                .any(|&id| roster.get(id).unwrap().region.as_deref() == Some("KR")),
            "team {:?} has no KR member",
            team.members
        );
    }
}

#[test]
fn test_unsatisfiable_region_fails_or_relaxes_by_policy() {
    let roster = roster_of(&[1500.0; 9]);

    let mut engine = seeded_engine(5);
    let strict = AssignmentConstraints::new().with_required_region("KR");
    let err = engine.assign(&roster, &strict, None).unwrap_err();
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::RegionUnsatisfiable {
            region,
            uncovered_teams,
        }) => {
            assert_eq!(region, "KR");
            assert_eq!(uncovered_teams, &vec![0, 1, 2]);
        }
        other => panic!("expected RegionUnsatisfiable, got {other:?}"),
    }

    let relaxed = engine
        .assign(&roster, &strict.clone().with_relax_and_warn(), None)
        .unwrap();
    assert_eq!(relaxed.relaxations.len(), 1);
    assert_exact_cover(&relaxed, &roster);
}

#[test]
fn test_partnership_avoidance_splits_frequent_pairs() {
    // Pairs (1,2) and (3,4) played together many times
    let mut index = PartnershipHistoryIndex::new();
    for _ in 0..8 {
        index.record_outcome(&MatchOutcome::new(
            vec![
                PlacedTeam::new(1, vec![Competitor::new(1), Competitor::new(2)]),
                PlacedTeam::new(2, vec![Competitor::new(3), Competitor::new(4)]),
            ],
            false,
        ));
    }

    let roster = roster_of(&[1500.0, 1500.0, 1500.0, 1500.0, 1500.0, 1500.0]);
    let mut engine = seeded_engine(21);

    let partition = engine
        .assign(
            &roster,
            &AssignmentConstraints::new().with_partnership_avoidance(),
            Some(&index),
        )
        .unwrap();

    // With equal ratings the only score pressure is the penalty term, so
    // neither frequent pair ends up co-assigned
    for team in &partition.teams {
        assert!(!(team.contains(1) && team.contains(2)));
        assert!(!(team.contains(3) && team.contains(4)));
    }
}

#[test]
fn test_all_three_variants_resolve_one_outcome_independently() {
    let config = team_forge::config::RatingModelConfig::default();
    let outcome = MatchOutcome::new(
        vec![
            PlacedTeam::new(
                1,
                vec![
                    competitor(1, 1600.0).with_skill(27.0, 7.0),
                    competitor(2, 1400.0).with_skill(23.0, 7.5),
                ],
            ),
            PlacedTeam::new(
                2,
                vec![
                    competitor(3, 1550.0).with_skill(26.0, 6.0),
                    competitor(4, 1450.0).with_skill(24.0, 8.0),
                ],
            ),
        ],
        false,
    );

    let placement = rating_model(RatingModelKind::Placement, &config).unwrap();
    let multi_factor = rating_model(RatingModelKind::MultiFactor, &config).unwrap();
    let bayesian = rating_model(RatingModelKind::Bayesian, &config).unwrap();

    let p = placement.resolve(&outcome).unwrap();
    let m = multi_factor.resolve(&outcome).unwrap();
    let b = bayesian.resolve(&outcome).unwrap();

    for set in [&p, &m, &b] {
        assert_eq!(set.deltas.len(), 4);
    }

    // Winners gain under every variant
    assert!(p.get(1).unwrap().change > 0.0);
    assert!(m.get(1).unwrap().change > 0.0);
    assert!(b.get(1).unwrap().change > 0.0);

    // Placement and multi-factor leave the Bayesian state untouched, and
    // the Bayesian variant leaves the scalar rating untouched
    assert_eq!(p.get(1).unwrap().before.skill, p.get(1).unwrap().after.skill);
    assert_eq!(m.get(1).unwrap().before.skill, m.get(1).unwrap().after.skill);
    assert_eq!(
        b.get(1).unwrap().before.rating,
        b.get(1).unwrap().after.rating
    );
}

#[test]
fn test_full_cycle_assign_resolve_record_reindex() {
    let config = team_forge::config::RatingModelConfig::default();
    let store = InMemoryHistoryStore::new();
    let roster = roster_of(&[1700.0, 1650.0, 1600.0, 1550.0, 1500.0, 1450.0, 1400.0, 1350.0]);
    let mut engine = seeded_engine(3);

    // Round one: assign, play, resolve under all variants, record
    let partition = engine
        .assign(&roster, &AssignmentConstraints::new(), None)
        .unwrap();
    assert_exact_cover(&partition, &roster);

    let outcome = outcome_from_partition(&partition, &roster);
    let deltas: Vec<_> = [
        RatingModelKind::Placement,
        RatingModelKind::MultiFactor,
        RatingModelKind::Bayesian,
    ]
    .into_iter()
    .map(|kind| {
        rating_model(kind, &config)
            .unwrap()
            .resolve(&outcome)
            .unwrap()
    })
    .collect();

    store.append_outcome(outcome, deltas).unwrap();
    assert_eq!(store.match_count().unwrap(), 1);

    let entry = store.current_state(1).unwrap().unwrap();
    assert_eq!(entry.games_played, 1);

    // Round two: the partnership index rebuilt from the store now penalizes
    // round one's teammates
    let index = PartnershipHistoryIndex::seed_from_store(&store).unwrap();
    assert!(!index.is_empty());

    let first_team = &partition.teams[0];
    assert!(index.pair_count(first_team.members[0], first_team.members[1]) >= 1);

    let second = engine
        .assign(
            &roster,
            &AssignmentConstraints::new().with_partnership_avoidance(),
            Some(&index),
        )
        .unwrap();
    assert_exact_cover(&second, &roster);
}

#[test]
fn test_single_competitor_forms_single_team() {
    let roster = roster_of(&[1500.0]);
    let mut engine = seeded_engine(1);

    let partition = engine
        .assign(&roster, &AssignmentConstraints::new(), None)
        .unwrap();
    assert_eq!(partition.mode, AssignmentMode::SingleTeam);
    assert_eq!(partition.sizes(), vec![1]);
}

proptest! {
    /// Exact cover and size-band invariants hold for any roster and seed
    #[test]
    fn prop_partition_covers_roster_within_size_band(
        count in 1usize..=24,
        seed in any::<u64>(),
        spread in 0.0f64..600.0,
    ) {
        let ratings: Vec<f64> = (0..count)
            .map(|i| 1200.0 + spread * (i as f64 / count as f64))
            .collect();
        let roster = roster_of(&ratings);
        let mut engine = seeded_engine(seed);

        let partition = engine
            .assign(&roster, &AssignmentConstraints::new(), None)
            .unwrap();

        assert_exact_cover(&partition, &roster);
        prop_assert_eq!(partition.competitor_count(), count);

        if count > 5 {
            for size in partition.sizes() {
                prop_assert!((3..=4).contains(&size));
            }
        }
    }

    /// Bayesian sigma never increases and never goes below the floor
    #[test]
    fn prop_bayesian_sigma_monotone(
        mu_a in 15.0f64..35.0,
        mu_b in 15.0f64..35.0,
        sigma in 0.5f64..9.0,
    ) {
        let config = team_forge::config::RatingModelConfig::default();
        let model = rating_model(RatingModelKind::Bayesian, &config).unwrap();

        let outcome = MatchOutcome::new(
            vec![
                PlacedTeam::new(1, vec![Competitor::new(1).with_skill(mu_a, sigma)]),
                PlacedTeam::new(2, vec![Competitor::new(2).with_skill(mu_b, sigma)]),
            ],
            false,
        );

        let set = model.resolve(&outcome).unwrap();
        for delta in &set.deltas {
            prop_assert!(delta.after.skill.sigma <= delta.before.skill.sigma + 1e-9);
            prop_assert!(delta.after.skill.sigma >= 0.1);
        }
    }

    /// Multi-factor changes stay inside the configured clamp
    #[test]
    fn prop_multi_factor_change_clamped(
        rating in 800.0f64..2600.0,
        opponent in 800.0f64..2600.0,
        placement in 1u32..=40,
    ) {
        let config = team_forge::config::RatingModelConfig::default();
        let model = rating_model(RatingModelKind::MultiFactor, &config).unwrap();

        let outcome = MatchOutcome::new(
            vec![
                PlacedTeam::new(placement, vec![Competitor::new(1).with_rating(rating)]),
                PlacedTeam::new(placement + 1, vec![Competitor::new(2).with_rating(opponent)]),
            ],
            false,
        );

        let set = model.resolve(&outcome).unwrap();
        let limit = 150.0f64.max(0.15 * rating);
        prop_assert!(set.get(1).unwrap().change.abs() <= limit + 1e-9);
    }
}
