use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::assignment::{solver_for, WeightMatrix, PROBABILITY_FLOOR};
use super::policy::{EvidenceBasis, EvidencePolicy, ReconstructionConfig, SolverPolicy};
use crate::error::{BracketError, Result};
use crate::round::{Round, SlotArena, SlotCoordinate, TeamId, FIELD_SIZE};
use crate::stats::BracketStatistics;

/// A team chosen for a slot together with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPick {
    pub team_id: TeamId,
    pub count: u32,
    pub probability: f64,
    pub basis: EvidenceBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct R32Match {
    pub slot: u8,
    /// Side with the stronger evidence at this slot.
    pub team_a: Option<SlotPick>,
    pub team_b: Option<SlotPick>,
    pub winner: Option<TeamId>,
}

impl R32Match {
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.team_a.iter().chain(self.team_b.iter()).map(|p| p.team_id)
    }

    pub fn winner_pick(&self) -> Option<&SlotPick> {
        let winner = self.winner?;
        self.team_a.iter().chain(self.team_b.iter()).find(|p| p.team_id == winner)
    }
}

/// One coherent bracket derived from aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructedBracket {
    pub round_of_32: Vec<R32Match>,
    pub round_of_16: BTreeMap<u8, SlotPick>,
    pub quarter_finals: BTreeMap<u8, SlotPick>,
    pub semi_finals: BTreeMap<u8, SlotPick>,
    pub champion: Option<SlotPick>,
    pub joint_probability: f64,
    pub log_probability: f64,
    pub solver: SolverPolicy,
    pub evidence: EvidencePolicy,
}

impl ReconstructedBracket {
    fn round_map(&self, round: Round) -> Option<&BTreeMap<u8, SlotPick>> {
        match round {
            Round::RoundOf16 => Some(&self.round_of_16),
            Round::QuarterFinal => Some(&self.quarter_finals),
            Round::SemiFinal => Some(&self.semi_finals),
            Round::RoundOf32 | Round::Final => None,
        }
    }

    pub fn pick(&self, coord: SlotCoordinate) -> Option<&SlotPick> {
        match coord.round {
            Round::RoundOf32 => self.round_of_32.get(coord.slot as usize).and_then(|m| m.winner_pick()),
            Round::Final => self.champion.as_ref(),
            round => self.round_map(round).and_then(|m| m.get(&coord.slot)),
        }
    }

    pub fn winner(&self, coord: SlotCoordinate) -> Option<TeamId> {
        match coord.round {
            Round::RoundOf32 => self.round_of_32.get(coord.slot as usize).and_then(|m| m.winner),
            _ => self.pick(coord).map(|p| p.team_id),
        }
    }

    pub fn winner_arena(&self) -> SlotArena<Option<TeamId>> {
        let mut arena = SlotArena::default();
        for coord in SlotCoordinate::all() {
            arena.set(coord, self.winner(coord));
        }
        arena
    }

    /// Slots without a winner, flat-index order.
    pub fn unresolved_slots(&self) -> Vec<SlotCoordinate> {
        SlotCoordinate::all().filter(|c| self.winner(*c).is_none()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.r32_teams().len() == FIELD_SIZE && self.unresolved_slots().is_empty()
    }

    /// Assigned Round-of-32 teams in slot order.
    pub fn r32_teams(&self) -> Vec<TeamId> {
        self.round_of_32.iter().flat_map(|m| m.teams()).collect()
    }

    /// Check the structural rules: no repeated team among the Round-of-32
    /// entrants or among one round's winners, every winner comes from the
    /// slot's own teams or feeders.
    pub fn verify(&self) -> std::result::Result<(), Vec<String>> {
        let mut problems = Vec::new();

        let mut seen = HashSet::new();
        for team in self.r32_teams() {
            if !seen.insert(team) {
                problems.push(format!("team {} assigned to more than one Round-of-32 side", team));
            }
        }

        for m in &self.round_of_32 {
            if let Some(w) = m.winner {
                if !m.teams().any(|t| t == w) {
                    problems.push(format!("R32#{} winner {} did not play there", m.slot, w));
                }
            }
        }

        for round in Round::ALL {
            let mut winners = HashSet::new();
            for coord in SlotCoordinate::in_round(round) {
                let Some(w) = self.winner(coord) else { continue };
                if !winners.insert(w) {
                    problems.push(format!("team {} wins twice in {}", w, round));
                }
                if let Some(feeders) = coord.feeders() {
                    if !feeders.iter().any(|f| self.winner(*f) == Some(w)) {
                        problems.push(format!("{} winner {} did not win a feeder slot", coord, w));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Joint probability and its log over a sequence of chosen probabilities.
pub fn joint_probability(terms: impl IntoIterator<Item = f64>) -> (f64, f64) {
    terms.into_iter().fold((1.0, 0.0), |(joint, log), p| {
        let p = p.clamp(0.0, 1.0);
        (joint * p, log + p.max(PROBABILITY_FLOOR).ln())
    })
}

#[derive(Debug, Clone, Default)]
pub struct BracketReconstructor {
    config: ReconstructionConfig,
}

impl BracketReconstructor {
    pub fn new(config: ReconstructionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    pub fn reconstruct(&self, stats: &BracketStatistics) -> Result<ReconstructedBracket> {
        if stats.total_trials() == 0 {
            return Err(BracketError::InsufficientData);
        }
        let policy = self.config.evidence;

        let round_of_32 = self.assign_round_of_32(stats);

        let mut winners: SlotArena<Option<TeamId>> = SlotArena::default();
        for m in &round_of_32 {
            if let Some(coord) = SlotCoordinate::new(Round::RoundOf32, m.slot) {
                winners.set(coord, m.winner);
            }
        }

        let mut later: BTreeMap<SlotCoordinate, SlotPick> = BTreeMap::new();
        for round in &Round::ALL[1..] {
            for coord in SlotCoordinate::in_round(*round) {
                let Some(feeders) = coord.feeders() else { continue };
                let candidates: Vec<TeamId> = feeders.iter().filter_map(|f| *winners.get(*f)).collect();
                if let Some(pick) = decide(stats, policy, coord, &candidates) {
                    winners.set(coord, Some(pick.team_id));
                    later.insert(coord, pick);
                }
            }
        }

        let mut bracket = ReconstructedBracket {
            round_of_32,
            round_of_16: BTreeMap::new(),
            quarter_finals: BTreeMap::new(),
            semi_finals: BTreeMap::new(),
            champion: None,
            joint_probability: 1.0,
            log_probability: 0.0,
            solver: self.config.solver,
            evidence: policy,
        };
        for (coord, pick) in later {
            match coord.round {
                Round::RoundOf16 => {
                    bracket.round_of_16.insert(coord.slot, pick);
                }
                Round::QuarterFinal => {
                    bracket.quarter_finals.insert(coord.slot, pick);
                }
                Round::SemiFinal => {
                    bracket.semi_finals.insert(coord.slot, pick);
                }
                Round::Final => bracket.champion = Some(pick),
                Round::RoundOf32 => {}
            }
        }

        let terms: Vec<f64> = SlotCoordinate::all()
            .filter_map(|c| bracket.pick(c).map(|p| p.probability))
            .collect();
        let (joint, log) = joint_probability(terms);
        bracket.joint_probability = joint;
        bracket.log_probability = log;

        log::debug!(
            "Reconstructed bracket ({} solver, {}): {} unresolved slots, log p = {:.4}",
            self.config.solver,
            policy,
            bracket.unresolved_slots().len(),
            bracket.log_probability
        );
        Ok(bracket)
    }

    fn assign_round_of_32(&self, stats: &BracketStatistics) -> Vec<R32Match> {
        let policy = self.config.evidence;
        let candidates = round_of_32_candidates(stats);
        if candidates.len() < FIELD_SIZE {
            log::warn!(
                "Only {} teams have Round-of-32 records; {} sides stay empty",
                candidates.len(),
                FIELD_SIZE - candidates.len()
            );
        }

        let mut matrix = WeightMatrix::new(candidates, FIELD_SIZE);
        for row in 0..matrix.rows() {
            let Some(team) = matrix.team(row) else { continue };
            for coord in SlotCoordinate::in_round(Round::RoundOf32) {
                let (count, _) = policy.evidence(stats, team, coord);
                let probability = stats.probability(count);
                let wins = stats.wins(team, coord);
                let side = coord.slot as usize * 2;
                matrix.set(row, side, probability, wins);
                matrix.set(row, side + 1, probability, wins);
            }
        }

        let solver = solver_for(self.config.solver);
        let assignment = solver.solve(&matrix);
        log::debug!(
            "{} assignment filled {}/{} sides, total log weight {:.4}",
            solver.name(),
            assignment.filled(),
            FIELD_SIZE,
            assignment.total_log_weight(&matrix)
        );

        SlotCoordinate::in_round(Round::RoundOf32)
            .map(|coord| {
                let side = coord.slot as usize * 2;
                let mut sides: Vec<SlotPick> = [side, side + 1]
                    .iter()
                    .filter_map(|s| assignment.team_at(*s, &matrix))
                    .map(|team| side_pick(stats, policy, team, coord))
                    .collect();
                sides.sort_by(|a, b| b.count.cmp(&a.count).then(a.team_id.cmp(&b.team_id)));

                let teams: Vec<TeamId> = sides.iter().map(|p| p.team_id).collect();
                let winner = decide(stats, policy, coord, &teams).map(|p| p.team_id);
                let mut sides = sides.into_iter();
                R32Match { slot: coord.slot, team_a: sides.next(), team_b: sides.next(), winner }
            })
            .collect()
    }
}

/// Teams with any Round-of-32 participation or win record, ascending by id.
fn round_of_32_candidates(stats: &BracketStatistics) -> Vec<TeamId> {
    let mut teams = BTreeSet::new();
    for coord in SlotCoordinate::in_round(Round::RoundOf32) {
        teams.extend(stats.participation_table().teams_at(coord).map(|(t, _)| t));
        teams.extend(stats.win_table().teams_at(coord).map(|(t, _)| t));
    }
    teams.into_iter().collect()
}

fn side_pick(stats: &BracketStatistics, policy: EvidencePolicy, team: TeamId, coord: SlotCoordinate) -> SlotPick {
    let (count, basis) = policy.evidence(stats, team, coord);
    SlotPick { team_id: team, count, probability: stats.probability(count).min(1.0), basis }
}

/// Strongest candidate at `coord` under `policy`; ties go to the lower id.
/// `None` when no candidate has any evidence there.
fn decide(
    stats: &BracketStatistics,
    policy: EvidencePolicy,
    coord: SlotCoordinate,
    candidates: &[TeamId],
) -> Option<SlotPick> {
    candidates
        .iter()
        .map(|&team| (team, policy.decision_key(stats, team, coord)))
        .filter(|(_, key)| *key != (0, 0))
        .min_by(|(ta, ka), (tb, kb)| kb.cmp(ka).then(ta.cmp(tb)))
        .map(|(team, _)| side_pick(stats, policy, team, coord))
}

pub fn reconstruct(stats: &BracketStatistics) -> Result<ReconstructedBracket> {
    BracketReconstructor::default().reconstruct(stats)
}
