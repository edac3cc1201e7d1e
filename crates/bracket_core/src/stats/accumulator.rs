use std::collections::{BTreeMap, BTreeSet};

use super::paths::{OpponentPath, PathStep, DEFAULT_PATH_CAP};
use super::trial::TrialOutcome;
use super::{BracketSignature, BracketStatistics};
use crate::round::{SlotArena, TeamId};

/// Distinct complete-bracket signatures tracked before new ones are dropped.
pub const MAX_TRACKED_SIGNATURES: usize = 1000;

/// Explicit accumulator for one simulation batch.
///
/// Pass it by `&mut` through trial ingestion, then call [`finish`](Self::finish)
/// once. There is no shared or global aggregator.
#[derive(Debug, Clone)]
pub struct StatisticsAccumulator {
    stats: BracketStatistics,
    path_cap: usize,
}

impl StatisticsAccumulator {
    pub fn new(roster: impl IntoIterator<Item = TeamId>) -> Self {
        Self {
            stats: BracketStatistics {
                roster: roster.into_iter().collect::<BTreeSet<_>>(),
                ..BracketStatistics::default()
            },
            path_cap: DEFAULT_PATH_CAP,
        }
    }

    /// Maximum distinct paths kept per team at [`finish`](Self::finish).
    pub fn with_path_cap(mut self, cap: usize) -> Self {
        self.path_cap = cap;
        self
    }

    pub fn total_trials(&self) -> u32 {
        self.stats.total_trials
    }

    pub fn record_trial(&mut self, trial: &TrialOutcome) {
        let stats = &mut self.stats;
        stats.total_trials = stats.total_trials.saturating_add(1);

        let mut matches: Vec<_> = trial.matches.iter().collect();
        matches.sort_by_key(|m| m.coord);

        let mut faced: BTreeMap<TeamId, Vec<PathStep>> = BTreeMap::new();
        let mut winners: SlotArena<Option<TeamId>> = SlotArena::default();
        let mut played = SlotArena::filled(false);

        for m in matches {
            if m.home == m.away {
                log::warn!("Skipping {}: team {} listed on both sides", m.coord, m.home);
                continue;
            }
            if *played.get(m.coord) {
                log::warn!("Skipping repeated match at {} ({} v {})", m.coord, m.home, m.away);
                continue;
            }
            played.set(m.coord, true);

            for team in [m.home, m.away] {
                stats.roster.insert(team);
                stats.participation.increment(team, m.coord);
            }

            match m.winner {
                Some(w) if m.involves(w) => {
                    stats.wins.increment(w, m.coord);
                    winners.set(m.coord, Some(w));
                }
                Some(w) => {
                    log::warn!(
                        "Ignoring winner {} at {}: not one of {} / {}",
                        w,
                        m.coord,
                        m.home,
                        m.away
                    );
                }
                None => {}
            }

            stats.opponents.record(m.coord, m.home, m.away);
            faced.entry(m.home).or_default().push(PathStep { round: m.coord.round, opponent: m.away });
            faced.entry(m.away).or_default().push(PathStep { round: m.coord.round, opponent: m.home });
        }

        for (team, steps) in faced {
            stats.paths.record(team, OpponentPath(steps));
        }

        if let Some(third) = trial.third_place.as_ref().filter(|t| t.home != t.away) {
            let loser = match third.winner {
                Some(w) if w == third.home => Some((w, third.away)),
                Some(w) if w == third.away => Some((w, third.home)),
                Some(w) => {
                    log::warn!("Ignoring third-place winner {}", w);
                    None
                }
                None => None,
            };
            if let Some((winner, loser)) = loser {
                *stats.third_place_wins.entry(winner).or_insert(0) += 1;
                *stats.fourth_place.entry(loser).or_insert(0) += 1;
            }
        }

        record_signature(stats, winners.iter().map(|(_, w)| *w).collect());
    }

    pub fn finish(mut self) -> BracketStatistics {
        self.stats.paths.prune(self.path_cap);
        log::debug!(
            "Aggregated {} trials over {} teams ({} bracket signatures)",
            self.stats.total_trials,
            self.stats.roster.len(),
            self.stats.signatures.len()
        );
        self.stats
    }
}

fn record_signature(stats: &mut BracketStatistics, signature: BracketSignature) {
    if signature.iter().all(Option::is_none) {
        return;
    }
    if let Some(count) = stats.signatures.get_mut(&signature) {
        *count += 1;
    } else if stats.signatures.len() < MAX_TRACKED_SIGNATURES {
        stats.signatures.insert(signature, 1);
    }
}
