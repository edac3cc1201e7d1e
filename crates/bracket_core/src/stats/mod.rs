//! Bracket statistics aggregated over many simulated trials.
//!
//! ## Flow
//! ```text
//! TrialOutcome ──record_trial──▶ StatisticsAccumulator ──finish──▶ BracketStatistics
//!                                                                   │
//!                                   StatisticsBlob (JSON) ◀──to_blob┘
//! ```
//!
//! Participation and wins are separate tables: a team that appears in a
//! slot often is not necessarily a team that wins there.

mod accumulator;
mod blob;
mod paths;
mod summary;
mod tables;
mod trial;

pub use accumulator::{StatisticsAccumulator, MAX_TRACKED_SIGNATURES};
pub use blob::{OpponentRecord, RoundSlotCounts, SignatureRecord, StatisticsBlob};
pub use paths::{OpponentPath, ParsePathError, PathEntry, PathStep, PathTable, DEFAULT_PATH_CAP};
pub use summary::{MostFrequentBracket, RoundReach, TeamSummary};
pub use tables::{OpponentTable, PairKey, SlotTable};
pub use trial::{PlayedMatch, ThirdPlaceMatch, TrialOutcome};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::round::{SlotCoordinate, TeamId};

/// Complete winner list of one trial, flat-index order.
pub type BracketSignature = Vec<Option<TeamId>>;

/// Immutable statistics for one simulation batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BracketStatistics {
    pub(crate) total_trials: u32,
    pub(crate) roster: BTreeSet<TeamId>,
    pub(crate) participation: SlotTable,
    pub(crate) wins: SlotTable,
    pub(crate) opponents: OpponentTable,
    pub(crate) paths: PathTable,
    pub(crate) third_place_wins: BTreeMap<TeamId, u32>,
    pub(crate) fourth_place: BTreeMap<TeamId, u32>,
    pub(crate) signatures: HashMap<BracketSignature, u32>,
}

impl BracketStatistics {
    pub fn total_trials(&self) -> u32 {
        self.total_trials
    }

    /// Every team known to the batch, including teams that never reached
    /// the knockout stage.
    pub fn roster(&self) -> &BTreeSet<TeamId> {
        &self.roster
    }

    pub fn participation(&self, team: TeamId, coord: SlotCoordinate) -> u32 {
        self.participation.count(team, coord)
    }

    pub fn wins(&self, team: TeamId, coord: SlotCoordinate) -> u32 {
        self.wins.count(team, coord)
    }

    pub fn participation_probability(&self, team: TeamId, coord: SlotCoordinate) -> f64 {
        self.probability(self.participation(team, coord))
    }

    pub fn win_probability(&self, team: TeamId, coord: SlotCoordinate) -> f64 {
        self.probability(self.wins(team, coord))
    }

    /// `count / total_trials`, or 0.0 for an empty batch.
    pub fn probability(&self, count: u32) -> f64 {
        if self.total_trials == 0 {
            0.0
        } else {
            count as f64 / self.total_trials as f64
        }
    }

    pub fn participation_table(&self) -> &SlotTable {
        &self.participation
    }

    pub fn win_table(&self) -> &SlotTable {
        &self.wins
    }

    pub fn opponent_table(&self) -> &OpponentTable {
        &self.opponents
    }

    pub fn path_table(&self) -> &PathTable {
        &self.paths
    }

    pub fn opponents_at(&self, coord: SlotCoordinate, team: TeamId) -> Vec<(TeamId, u32)> {
        self.opponents.opponents_of(coord, team)
    }

    pub fn pair_count(&self, coord: SlotCoordinate, a: TeamId, b: TeamId) -> u32 {
        self.opponents.pair_count(coord, a, b)
    }

    /// Teams with any participation record, ascending by id.
    pub fn teams_with_participation(&self) -> Vec<TeamId> {
        self.participation.teams().collect()
    }

    pub fn top_paths(&self, team: TeamId, n: usize) -> Vec<PathEntry> {
        self.paths.top_paths(team, n, self.total_trials)
    }

    pub fn third_place_wins(&self, team: TeamId) -> u32 {
        self.third_place_wins.get(&team).copied().unwrap_or(0)
    }

    /// Third-place play-off losses.
    pub fn fourth_place(&self, team: TeamId) -> u32 {
        self.fourth_place.get(&team).copied().unwrap_or(0)
    }
}
