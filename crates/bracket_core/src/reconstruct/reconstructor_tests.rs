//! Reconstruction scenarios and structural properties.

use super::*;
use crate::error::BracketError;
use crate::round::{Round, SlotCoordinate, TeamId, FIELD_SIZE};
use crate::stats::{BracketStatistics, StatisticsAccumulator, TrialOutcome};
use proptest::prelude::*;
use std::collections::HashSet;

fn coord(round: Round, slot: u8) -> SlotCoordinate {
    SlotCoordinate::new(round, slot).unwrap()
}

fn empty_stats(total_trials: u32) -> BracketStatistics {
    BracketStatistics { total_trials, ..BracketStatistics::default() }
}

fn entrants() -> [TeamId; 32] {
    std::array::from_fn(|i| TeamId(i as u16))
}

/// 3 home-wins trials and 1 away-wins trial over teams 0..32.
fn full_field() -> BracketStatistics {
    let mut acc = StatisticsAccumulator::new((0..48).map(TeamId));
    for _ in 0..3 {
        acc.record_trial(&TrialOutcome::from_entrants(&entrants(), |_, home, _| home));
    }
    acc.record_trial(&TrialOutcome::from_entrants(&entrants(), |_, _, away| away));
    acc.finish()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_r32_winner_by_win_probability() {
    let mut stats = empty_stats(1000);
    let slot = coord(Round::RoundOf32, 3);
    stats.participation.add(TeamId(7), slot, 1000);
    stats.wins.add(TeamId(7), slot, 620);
    stats.participation.add(TeamId(9), slot, 380);

    let bracket = reconstruct(&stats).unwrap();
    let m = &bracket.round_of_32[3];

    assert_eq!(bracket.winner(slot), Some(TeamId(7)));
    assert_eq!(m.team_a.map(|p| p.team_id), Some(TeamId(7)));
    assert_eq!(m.team_b.map(|p| p.team_id), Some(TeamId(9)));

    let pick = bracket.pick(slot).unwrap();
    assert!((pick.probability - 0.62).abs() < 1e-12);
    assert_eq!(pick.basis, EvidenceBasis::Wins);
    assert!((bracket.joint_probability - 0.62).abs() < 1e-12);
    assert!((bracket.log_probability - 0.62f64.ln()).abs() < 1e-12);
}

#[test]
fn test_later_round_uses_slot_win_counts() {
    let mut stats = empty_stats(1000);
    let r32_2 = coord(Round::RoundOf32, 2);
    let r32_3 = coord(Round::RoundOf32, 3);
    let r16_1 = coord(Round::RoundOf16, 1);

    stats.participation.add(TeamId(7), r32_2, 900);
    stats.wins.add(TeamId(7), r32_2, 700);
    stats.participation.add(TeamId(12), r32_3, 800);
    stats.wins.add(TeamId(12), r32_3, 600);
    // Team 7 appears at R16#1 more often, but team 12 wins there more often.
    stats.participation.add(TeamId(7), r16_1, 700);
    stats.wins.add(TeamId(7), r16_1, 310);
    stats.participation.add(TeamId(12), r16_1, 600);
    stats.wins.add(TeamId(12), r16_1, 440);

    let bracket = reconstruct(&stats).unwrap();
    let pick = bracket.round_of_16.get(&1).unwrap();
    assert_eq!(pick.team_id, TeamId(12));
    assert!((pick.probability - 0.44).abs() < 1e-12);
    assert!(bracket.verify().is_ok());
}

#[test]
fn test_participation_fallback_when_no_wins_recorded() {
    let mut stats = empty_stats(100);
    let r32_0 = coord(Round::RoundOf32, 0);
    let r32_1 = coord(Round::RoundOf32, 1);
    let r16_0 = coord(Round::RoundOf16, 0);
    stats.wins.add(TeamId(1), r32_0, 60);
    stats.participation.add(TeamId(1), r32_0, 100);
    stats.wins.add(TeamId(2), r32_1, 50);
    stats.participation.add(TeamId(2), r32_1, 100);
    stats.participation.add(TeamId(1), r16_0, 30);
    stats.participation.add(TeamId(2), r16_0, 45);

    let bracket = reconstruct(&stats).unwrap();
    let pick = bracket.pick(r16_0).unwrap();
    assert_eq!(pick.team_id, TeamId(2));
    assert_eq!(pick.basis, EvidenceBasis::Participation);

    let wins_only = BracketReconstructor::new(ReconstructionConfig::exact().with_evidence(EvidencePolicy::WinsOnly))
        .reconstruct(&stats)
        .unwrap();
    assert_eq!(wins_only.winner(r16_0), None);
    assert!(wins_only.unresolved_slots().contains(&r16_0));
}

#[test]
fn test_both_zero_leaves_slot_unresolved() {
    let mut stats = empty_stats(10);
    stats.participation.add(TeamId(1), coord(Round::RoundOf32, 0), 10);
    stats.wins.add(TeamId(1), coord(Round::RoundOf32, 0), 10);
    stats.participation.add(TeamId(2), coord(Round::RoundOf32, 1), 10);
    stats.wins.add(TeamId(2), coord(Round::RoundOf32, 1), 10);

    let bracket = reconstruct(&stats).unwrap();
    assert_eq!(bracket.winner(coord(Round::RoundOf16, 0)), None);
    assert_eq!(bracket.champion, None);
    // Only the two R32 winners contribute.
    assert!((bracket.joint_probability - 1.0).abs() < 1e-12);
    assert!(!bracket.is_complete());
}

#[test]
fn test_policy_decides_disagreeing_evidence() {
    let mut stats = empty_stats(1000);
    let slot = coord(Round::RoundOf32, 5);
    stats.participation.add(TeamId(7), slot, 300);
    stats.wins.add(TeamId(7), slot, 100);
    stats.participation.add(TeamId(9), slot, 900);

    let default = reconstruct(&stats).unwrap();
    assert_eq!(default.winner(slot), Some(TeamId(7)));

    let by_participation =
        BracketReconstructor::new(ReconstructionConfig::exact().with_evidence(EvidencePolicy::ParticipationOnly))
            .reconstruct(&stats)
            .unwrap();
    assert_eq!(by_participation.winner(slot), Some(TeamId(9)));
    assert_eq!(by_participation.evidence, EvidencePolicy::ParticipationOnly);
}

#[test]
fn test_tied_evidence_goes_to_lower_id() {
    let mut stats = empty_stats(100);
    let slot = coord(Round::RoundOf32, 0);
    stats.participation.add(TeamId(20), slot, 100);
    stats.wins.add(TeamId(20), slot, 50);
    stats.participation.add(TeamId(4), slot, 100);
    stats.wins.add(TeamId(4), slot, 50);

    let bracket = reconstruct(&stats).unwrap();
    assert_eq!(bracket.winner(slot), Some(TeamId(4)));
    assert_eq!(bracket.round_of_32[0].team_a.map(|p| p.team_id), Some(TeamId(4)));
}

#[test]
fn test_zero_trials_is_insufficient_data() {
    let stats = StatisticsAccumulator::new((0..32).map(TeamId)).finish();
    assert!(matches!(reconstruct(&stats), Err(BracketError::InsufficientData)));
}

#[test]
fn test_sparse_data_degrades_gracefully() {
    let mut stats = empty_stats(50);
    for team in 0..5u16 {
        let slot = coord(Round::RoundOf32, team as u8);
        stats.participation.add(TeamId(team), slot, 50);
        stats.wins.add(TeamId(team), slot, 25);
    }

    let bracket = reconstruct(&stats).unwrap();
    assert_eq!(bracket.r32_teams().len(), 5);
    assert_eq!(bracket.round_of_32.len(), 16);
    assert!(bracket.round_of_32[10].team_a.is_none());
    assert!(bracket.verify().is_ok());
    assert!((bracket.joint_probability - 0.5f64.powi(5)).abs() < 1e-12);
}

// ============================================================================
// Full field
// ============================================================================

#[test]
fn test_full_field_is_consistent() {
    let stats = full_field();
    for config in [ReconstructionConfig::exact(), ReconstructionConfig::fast()] {
        let bracket = BracketReconstructor::new(config).reconstruct(&stats).unwrap();

        let teams = bracket.r32_teams();
        assert_eq!(teams.len(), FIELD_SIZE);
        assert_eq!(teams.iter().collect::<HashSet<_>>().len(), FIELD_SIZE);
        assert!(bracket.verify().is_ok(), "{:?}", bracket.verify());
        assert!(bracket.is_complete());
        assert_eq!(bracket.champion.map(|p| p.team_id), Some(TeamId(0)));
        assert_eq!(bracket.solver, config.solver);
    }
}

#[test]
fn test_full_field_places_teams_at_their_slots() {
    let stats = full_field();
    let bracket = reconstruct(&stats).unwrap();
    for (slot, m) in bracket.round_of_32.iter().enumerate() {
        let mut teams: Vec<u16> = m.teams().map(|t| t.0).collect();
        teams.sort_unstable();
        assert_eq!(teams, vec![slot as u16 * 2, slot as u16 * 2 + 1]);
    }
}

#[test]
fn test_feeder_invariant_holds() {
    let bracket = reconstruct(&full_field()).unwrap();
    let arena = bracket.winner_arena();
    for c in SlotCoordinate::all() {
        if let (Some(w), Some(feeders)) = (*arena.get(c), c.feeders()) {
            assert!(feeders.iter().any(|f| *arena.get(*f) == Some(w)), "{} winner {}", c, w);
        }
    }
}

#[test]
fn test_optimal_beats_greedy_on_contested_slot() {
    let mut stats = empty_stats(1000);
    let r32_0 = coord(Round::RoundOf32, 0);
    let r32_1 = coord(Round::RoundOf32, 1);
    stats.participation.add(TeamId(1), r32_0, 900);
    stats.participation.add(TeamId(1), r32_1, 800);
    stats.participation.add(TeamId(2), r32_0, 850);
    stats.participation.add(TeamId(3), r32_0, 850);
    stats.participation.add(TeamId(4), r32_1, 300);

    let optimal = BracketReconstructor::new(ReconstructionConfig::exact()).reconstruct(&stats).unwrap();
    let greedy = BracketReconstructor::new(ReconstructionConfig::fast()).reconstruct(&stats).unwrap();

    let teams_at = |b: &ReconstructedBracket, slot: usize| {
        let mut t: Vec<TeamId> = b.round_of_32[slot].teams().collect();
        t.sort();
        t
    };
    assert_eq!(teams_at(&optimal, 0), vec![TeamId(2), TeamId(3)]);
    assert_eq!(teams_at(&optimal, 1), vec![TeamId(1), TeamId(4)]);
    assert!(teams_at(&greedy, 0).contains(&TeamId(1)));
    assert!(greedy.verify().is_ok());
}

#[test]
fn test_bracket_json_shape() {
    let bracket = reconstruct(&full_field()).unwrap();
    let json = serde_json::to_value(&bracket).unwrap();
    assert_eq!(json["roundOf32"].as_array().map(|a| a.len()), Some(16));
    assert!(json["roundOf32"][0]["teamA"]["teamId"].is_number());
    assert!(json["roundOf16"]["0"]["probability"].is_number());
    assert_eq!(json["champion"]["teamId"], 0);
    assert_eq!(json["solver"], "optimal");
    assert!(json["jointProbability"].is_number());
}

#[test]
fn test_joint_probability_helper() {
    assert_eq!(joint_probability(std::iter::empty()), (1.0, 0.0));
    let (joint, log) = joint_probability([0.5, 0.5]);
    assert!((joint - 0.25).abs() < 1e-12);
    assert!((log - 0.25f64.ln()).abs() < 1e-12);
}

// ============================================================================
// Properties
// ============================================================================

fn arb_stats() -> impl Strategy<Value = BracketStatistics> {
    (
        1u32..500,
        prop::collection::vec((0u16..40, 0usize..31, 0u32..500, 0u32..500), 0..200),
    )
        .prop_map(|(total, entries)| {
            let mut stats = empty_stats(total);
            for (team, flat, participation, wins) in entries {
                if let Some(c) = SlotCoordinate::from_flat_index(flat) {
                    let participation = participation % (total + 1);
                    stats.participation.add(TeamId(team), c, participation);
                    stats.wins.add(TeamId(team), c, wins.min(participation));
                }
            }
            stats
        })
}

fn arb_matrix() -> impl Strategy<Value = WeightMatrix> {
    (1usize..12, 1usize..8).prop_flat_map(|(rows, sides)| {
        prop::collection::vec((0.0f64..1.0, 0u32..5), rows * sides).prop_map(move |cells| {
            let mut m = WeightMatrix::new((0..rows as u16).map(TeamId).collect(), sides);
            for (i, (p, wins)) in cells.into_iter().enumerate() {
                m.set(i / sides, i % sides, p, wins);
            }
            m
        })
    })
}

proptest! {
    #[test]
    fn prop_reconstruction_is_structurally_valid(stats in arb_stats()) {
        for config in [ReconstructionConfig::exact(), ReconstructionConfig::fast()] {
            let bracket = BracketReconstructor::new(config).reconstruct(&stats).unwrap();
            prop_assert!(bracket.verify().is_ok(), "{:?}", bracket.verify());
            prop_assert!(bracket.joint_probability >= 0.0 && bracket.joint_probability <= 1.0);
            prop_assert!(bracket.log_probability <= 1e-12);
        }
    }

    #[test]
    fn prop_solvers_fill_every_side_they_can(m in arb_matrix()) {
        let expected = m.rows().min(m.sides());
        let optimal = HungarianSolver.solve(&m);
        let greedy = GreedySolver.solve(&m);
        prop_assert_eq!(optimal.filled(), expected);
        prop_assert_eq!(greedy.filled(), expected);

        for a in [&optimal, &greedy] {
            let rows: Vec<usize> = a.side_to_row.iter().flatten().copied().collect();
            prop_assert_eq!(rows.iter().collect::<HashSet<_>>().len(), rows.len());
        }
        prop_assert!(optimal.total_log_weight(&m) >= greedy.total_log_weight(&m) - 1e-4);
    }

    #[test]
    fn prop_joint_probability_non_increasing(terms in prop::collection::vec(0.0f64..=1.0, 0..31)) {
        let mut previous = 1.0;
        for n in 0..=terms.len() {
            let (joint, _) = joint_probability(terms[..n].iter().copied());
            prop_assert!(joint <= previous + 1e-15);
            prop_assert!((0.0..=1.0).contains(&joint));
            previous = joint;
        }
    }
}
