//! Raw counter tables. Counts are stored as integers and normalized only
//! when read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::round::{Round, SlotArena, SlotCoordinate, TeamId};

/// Per-team, per-slot counter (used once for participation, once for wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotTable {
    counts: BTreeMap<TeamId, SlotArena<u32>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, team: TeamId, coord: SlotCoordinate) {
        self.add(team, coord, 1);
    }

    pub fn add(&mut self, team: TeamId, coord: SlotCoordinate, amount: u32) {
        let cell = self.counts.entry(team).or_default().get_mut(coord);
        *cell = cell.saturating_add(amount);
    }

    pub fn count(&self, team: TeamId, coord: SlotCoordinate) -> u32 {
        self.counts.get(&team).map(|arena| *arena.get(coord)).unwrap_or(0)
    }

    /// Sum over every slot of `round`.
    pub fn round_total(&self, team: TeamId, round: Round) -> u32 {
        self.counts.get(&team).map(|arena| arena.round(round).iter().sum()).unwrap_or(0)
    }

    /// Teams with a non-zero count at `coord`, ascending by id.
    pub fn teams_at(&self, coord: SlotCoordinate) -> impl Iterator<Item = (TeamId, u32)> + '_ {
        self.counts.iter().filter_map(move |(team, arena)| {
            let c = *arena.get(coord);
            (c > 0).then_some((*team, c))
        })
    }

    /// Teams with at least one non-zero counter anywhere.
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.counts
            .iter()
            .filter(|(_, arena)| arena.iter().any(|(_, c)| *c > 0))
            .map(|(team, _)| *team)
    }

    pub fn slots_for(&self, team: TeamId) -> impl Iterator<Item = (SlotCoordinate, u32)> + '_ {
        self.counts
            .get(&team)
            .into_iter()
            .flat_map(|arena| arena.iter().filter(|(_, c)| **c > 0).map(|(coord, c)| (coord, *c)))
    }

    pub fn is_empty(&self) -> bool {
        self.teams().next().is_none()
    }
}

/// Opponent pair stored once regardless of which side is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub low: TeamId,
    pub high: TeamId,
}

impl PairKey {
    pub fn new(a: TeamId, b: TeamId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn other(&self, team: TeamId) -> Option<TeamId> {
        if team == self.low {
            Some(self.high)
        } else if team == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// Per-slot canonical pairing counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpponentTable {
    pairs: SlotArena<BTreeMap<PairKey, u32>>,
}

impl OpponentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, coord: SlotCoordinate, a: TeamId, b: TeamId) {
        self.add(coord, a, b, 1);
    }

    pub fn add(&mut self, coord: SlotCoordinate, a: TeamId, b: TeamId, amount: u32) {
        let cell = self.pairs.get_mut(coord).entry(PairKey::new(a, b)).or_insert(0);
        *cell = cell.saturating_add(amount);
    }

    pub fn pair_count(&self, coord: SlotCoordinate, a: TeamId, b: TeamId) -> u32 {
        self.pairs.get(coord).get(&PairKey::new(a, b)).copied().unwrap_or(0)
    }

    /// Opponents `team` faced at `coord`, most frequent first (ties by id).
    pub fn opponents_of(&self, coord: SlotCoordinate, team: TeamId) -> Vec<(TeamId, u32)> {
        let mut faced: Vec<(TeamId, u32)> = self
            .pairs
            .get(coord)
            .iter()
            .filter_map(|(pair, count)| pair.other(team).map(|opp| (opp, *count)))
            .collect();
        faced.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        faced
    }

    pub fn pairs_at(&self, coord: SlotCoordinate) -> impl Iterator<Item = (PairKey, u32)> + '_ {
        self.pairs.get(coord).iter().map(|(k, v)| (*k, *v))
    }

    /// Most frequent pairing at `coord`, ties by the smaller key.
    pub fn most_frequent(&self, coord: SlotCoordinate) -> Option<(PairKey, u32)> {
        self.pairs_at(coord).fold(None, |best, (pair, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((pair, count)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r32(slot: u8) -> SlotCoordinate {
        SlotCoordinate::new(Round::RoundOf32, slot).unwrap()
    }

    #[test]
    fn test_slot_table_counts_independently_per_slot() {
        let mut table = SlotTable::new();
        table.increment(TeamId(7), r32(3));
        table.increment(TeamId(7), r32(3));
        table.increment(TeamId(7), r32(4));

        assert_eq!(table.count(TeamId(7), r32(3)), 2);
        assert_eq!(table.count(TeamId(7), r32(4)), 1);
        assert_eq!(table.count(TeamId(8), r32(3)), 0);
        assert_eq!(table.round_total(TeamId(7), Round::RoundOf32), 3);
        assert_eq!(table.round_total(TeamId(7), Round::RoundOf16), 0);
    }

    #[test]
    fn test_teams_at_skips_zero_counts() {
        let mut table = SlotTable::new();
        table.increment(TeamId(9), r32(3));
        table.add(TeamId(2), r32(3), 0);
        table.increment(TeamId(1), r32(3));
        let teams: Vec<_> = table.teams_at(r32(3)).collect();
        assert_eq!(teams, vec![(TeamId(1), 1), (TeamId(9), 1)]);
        assert_eq!(table.teams().collect::<Vec<_>>(), vec![TeamId(1), TeamId(9)]);
    }

    #[test]
    fn test_pair_key_is_canonical() {
        assert_eq!(PairKey::new(TeamId(9), TeamId(7)), PairKey::new(TeamId(7), TeamId(9)));
        assert_eq!(PairKey::new(TeamId(9), TeamId(7)).low, TeamId(7));
        assert_eq!(PairKey::new(TeamId(9), TeamId(7)).other(TeamId(9)), Some(TeamId(7)));
        assert_eq!(PairKey::new(TeamId(9), TeamId(7)).other(TeamId(1)), None);
    }

    #[test]
    fn test_opponent_pairing_stored_once() {
        let mut table = OpponentTable::new();
        table.record(r32(3), TeamId(7), TeamId(9));
        table.record(r32(3), TeamId(9), TeamId(7));
        table.record(r32(3), TeamId(7), TeamId(11));

        assert_eq!(table.pairs_at(r32(3)).count(), 2);
        assert_eq!(table.pair_count(r32(3), TeamId(9), TeamId(7)), 2);
        assert_eq!(table.opponents_of(r32(3), TeamId(7)), vec![(TeamId(9), 2), (TeamId(11), 1)]);
        assert_eq!(table.opponents_of(r32(3), TeamId(9)), vec![(TeamId(7), 2)]);
        assert_eq!(table.most_frequent(r32(3)), Some((PairKey::new(TeamId(7), TeamId(9)), 2)));
        assert_eq!(table.most_frequent(r32(4)), None);
    }
}
