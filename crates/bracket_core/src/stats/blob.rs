//! JSON interchange form of [`BracketStatistics`].
//!
//! ```json
//! {
//!   "totalTrials": 1000,
//!   "teams": [7, 9],
//!   "participation": { "7": { "roundOf32": { "3": 1000 }, "finalMatch": 0 } },
//!   "wins":          { "7": { "roundOf32": { "3": 620 } } },
//!   "opponents": [ { "round": "round_of_32", "slot": 3, "teamA": 7, "teamB": 9, "count": 1000 } ],
//!   "paths": { "7": { "R32:9": 380 } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::paths::OpponentPath;
use super::BracketStatistics;
use crate::error::Result;
use crate::round::{Round, SlotCoordinate, TeamId, TOTAL_SLOTS};

/// Slot-keyed counters for one team, grouped by round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoundSlotCounts {
    pub round_of_32: BTreeMap<u8, u32>,
    pub round_of_16: BTreeMap<u8, u32>,
    pub quarter_finals: BTreeMap<u8, u32>,
    pub semi_finals: BTreeMap<u8, u32>,
    pub final_match: u32,
}

impl RoundSlotCounts {
    fn insert(&mut self, coord: SlotCoordinate, count: u32) {
        match coord.round {
            Round::RoundOf32 => self.round_of_32.insert(coord.slot, count),
            Round::RoundOf16 => self.round_of_16.insert(coord.slot, count),
            Round::QuarterFinal => self.quarter_finals.insert(coord.slot, count),
            Round::SemiFinal => self.semi_finals.insert(coord.slot, count),
            Round::Final => {
                self.final_match = count;
                None
            }
        };
    }

    /// `(round, raw slot index, count)` for every entry, unchecked.
    fn entries(&self) -> Vec<(Round, u8, u32)> {
        let mut out = Vec::new();
        for (round, map) in [
            (Round::RoundOf32, &self.round_of_32),
            (Round::RoundOf16, &self.round_of_16),
            (Round::QuarterFinal, &self.quarter_finals),
            (Round::SemiFinal, &self.semi_finals),
        ] {
            out.extend(map.iter().map(|(slot, count)| (round, *slot, *count)));
        }
        if self.final_match > 0 {
            out.push((Round::Final, 0, self.final_match));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentRecord {
    pub round: Round,
    pub slot: u8,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub winners: Vec<Option<TeamId>>,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsBlob {
    pub total_trials: u32,
    #[serde(default)]
    pub teams: Vec<TeamId>,
    #[serde(default)]
    pub participation: BTreeMap<TeamId, RoundSlotCounts>,
    #[serde(default)]
    pub wins: BTreeMap<TeamId, RoundSlotCounts>,
    #[serde(default)]
    pub opponents: Vec<OpponentRecord>,
    #[serde(default)]
    pub paths: BTreeMap<TeamId, BTreeMap<String, u32>>,
    #[serde(default)]
    pub third_place: BTreeMap<TeamId, u32>,
    #[serde(default)]
    pub fourth_place: BTreeMap<TeamId, u32>,
    #[serde(default)]
    pub brackets: Vec<SignatureRecord>,
}

impl StatisticsBlob {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl BracketStatistics {
    pub fn to_blob(&self) -> StatisticsBlob {
        let mut blob = StatisticsBlob {
            total_trials: self.total_trials,
            teams: self.roster.iter().copied().collect(),
            third_place: self.third_place_wins.clone(),
            fourth_place: self.fourth_place.clone(),
            ..StatisticsBlob::default()
        };

        for team in self.participation.teams() {
            let counts = blob.participation.entry(team).or_default();
            for (coord, count) in self.participation.slots_for(team) {
                counts.insert(coord, count);
            }
        }
        for team in self.wins.teams() {
            let counts = blob.wins.entry(team).or_default();
            for (coord, count) in self.wins.slots_for(team) {
                counts.insert(coord, count);
            }
        }

        for coord in SlotCoordinate::all() {
            blob.opponents.extend(self.opponents.pairs_at(coord).map(|(pair, count)| OpponentRecord {
                round: coord.round,
                slot: coord.slot,
                team_a: pair.low,
                team_b: pair.high,
                count,
            }));
        }

        for (team, path, count) in self.paths.iter() {
            blob.paths.entry(team).or_default().insert(path.to_string(), count);
        }

        let mut brackets: Vec<SignatureRecord> = self
            .signatures
            .iter()
            .map(|(winners, count)| SignatureRecord { winners: winners.clone(), count: *count })
            .collect();
        brackets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.winners.cmp(&b.winners)));
        blob.brackets = brackets;

        blob
    }

    /// Rebuild statistics from a blob. Entries that do not address a real
    /// slot or parse as a path are skipped with a warning.
    pub fn from_blob(blob: &StatisticsBlob) -> Self {
        let mut stats = BracketStatistics {
            total_trials: blob.total_trials,
            roster: blob.teams.iter().copied().collect(),
            third_place_wins: blob.third_place.clone(),
            fourth_place: blob.fourth_place.clone(),
            ..BracketStatistics::default()
        };

        for (team, counts) in &blob.participation {
            for (round, slot, count) in counts.entries() {
                match SlotCoordinate::new(round, slot) {
                    Some(coord) => stats.participation.add(*team, coord, count),
                    None => log::warn!("Skipping participation for team {} at {} slot {}", team, round, slot),
                }
            }
        }
        for (team, counts) in &blob.wins {
            for (round, slot, count) in counts.entries() {
                match SlotCoordinate::new(round, slot) {
                    Some(coord) => stats.wins.add(*team, coord, count),
                    None => log::warn!("Skipping wins for team {} at {} slot {}", team, round, slot),
                }
            }
        }

        for record in &blob.opponents {
            match SlotCoordinate::new(record.round, record.slot) {
                Some(coord) if record.team_a != record.team_b => {
                    stats.opponents.add(coord, record.team_a, record.team_b, record.count)
                }
                _ => log::warn!(
                    "Skipping opponent record {} vs {} at {} slot {}",
                    record.team_a,
                    record.team_b,
                    record.round,
                    record.slot
                ),
            }
        }

        for (team, paths) in &blob.paths {
            for (key, count) in paths {
                match key.parse::<OpponentPath>() {
                    Ok(path) => stats.paths.add(*team, path, *count),
                    Err(e) => log::warn!("Skipping path for team {}: {}", team, e),
                }
            }
        }

        for record in &blob.brackets {
            if record.winners.len() == TOTAL_SLOTS {
                *stats.signatures.entry(record.winners.clone()).or_insert(0) += record.count;
            } else {
                log::warn!("Skipping bracket signature with {} slots", record.winners.len());
            }
        }

        log::debug!(
            "Loaded statistics: {} trials, {} teams with participation",
            stats.total_trials,
            stats.participation.teams().count()
        );
        stats
    }

    pub fn from_json(json: &str) -> Result<Self> {
        StatisticsBlob::from_json(json).map(|blob| Self::from_blob(&blob))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        self.to_blob().to_json_pretty()
    }
}
