//! Official match number ↔ bracket coordinate lookup.
//!
//! The Round-of-32 order is fixed by tournament regulation (it encodes the
//! cross-group draw) and is therefore carried as data in a
//! [`MatchNumberTable`]. Later rounds are contiguous ranges; the Final and
//! the third-place play-off are single matches.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BracketError, Result};
use crate::round::{Round, SlotCoordinate};

/// FIFA 2026 Round-of-32 match numbers in bracket slot order.
///
/// Adjacent pairs feed one Round-of-16 match (M89 = W74 v W77, M90 = W73 v W75, ...).
pub const FIFA_2026_ROUND_OF_32: [u8; 16] =
    [74, 77, 73, 75, 76, 78, 79, 80, 83, 84, 81, 82, 86, 88, 85, 87];

/// Where an official match number sits in the tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPosition {
    Bracket(SlotCoordinate),
    ThirdPlace,
}

/// Raw match-number data for one tournament edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchNumberTable {
    /// Match number per R32 slot, slot order.
    pub round_of_32: [u8; 16],
    pub round_of_16_start: u8,
    pub quarter_final_start: u8,
    pub semi_final_start: u8,
    pub third_place: u8,
    #[serde(rename = "final")]
    pub final_match: u8,
}

impl Default for MatchNumberTable {
    fn default() -> Self {
        Self::fifa_2026()
    }
}

impl MatchNumberTable {
    pub fn fifa_2026() -> Self {
        Self {
            round_of_32: FIFA_2026_ROUND_OF_32,
            round_of_16_start: 89,
            quarter_final_start: 97,
            semi_final_start: 101,
            third_place: 103,
            final_match: 104,
        }
    }

    fn match_number(&self, coord: SlotCoordinate) -> Option<u8> {
        let slot = coord.slot;
        match coord.round {
            Round::RoundOf32 => self.round_of_32.get(slot as usize).copied(),
            Round::RoundOf16 => self.round_of_16_start.checked_add(slot),
            Round::QuarterFinal => self.quarter_final_start.checked_add(slot),
            Round::SemiFinal => self.semi_final_start.checked_add(slot),
            Round::Final => Some(self.final_match),
        }
    }
}

/// Bidirectional lookup built from a validated [`MatchNumberTable`].
#[derive(Debug, Clone)]
pub struct SlotIndexMapper {
    table: MatchNumberTable,
    by_match: HashMap<u8, MatchPosition>,
}

impl Default for SlotIndexMapper {
    fn default() -> Self {
        // The built-in table is a permutation with disjoint ranges.
        Self::from_table(MatchNumberTable::fifa_2026())
            .unwrap_or_else(|_| unreachable!("FIFA 2026 match table is valid"))
    }
}

impl SlotIndexMapper {
    /// Build the reverse index, rejecting tables where two positions share a
    /// match number or a contiguous range overflows.
    pub fn from_table(table: MatchNumberTable) -> Result<Self> {
        let mut by_match = HashMap::with_capacity(32);

        for coord in SlotCoordinate::all() {
            let number = table.match_number(coord).ok_or_else(|| {
                BracketError::InvalidMatchTable(format!("match number overflow at {}", coord))
            })?;
            if by_match.insert(number, MatchPosition::Bracket(coord)).is_some() {
                return Err(BracketError::InvalidMatchTable(format!(
                    "match {} assigned twice (second use at {})",
                    number, coord
                )));
            }
        }
        if by_match.insert(table.third_place, MatchPosition::ThirdPlace).is_some() {
            return Err(BracketError::InvalidMatchTable(format!(
                "third-place match {} collides with a bracket match",
                table.third_place
            )));
        }

        Ok(Self { table, by_match })
    }

    pub fn table(&self) -> &MatchNumberTable {
        &self.table
    }

    /// Bracket coordinate of a match number. `None` for unknown numbers and
    /// for the third-place play-off, which has no winner slot.
    pub fn slot_for_match(&self, match_number: u8) -> Option<SlotCoordinate> {
        match self.by_match.get(&match_number)? {
            MatchPosition::Bracket(coord) => Some(*coord),
            MatchPosition::ThirdPlace => None,
        }
    }

    pub fn position_for_match(&self, match_number: u8) -> Option<MatchPosition> {
        self.by_match.get(&match_number).copied()
    }

    /// Match number for `(round, slot)`. `None` when the slot is out of range.
    pub fn match_for_slot(&self, round: Round, slot: u8) -> Option<u8> {
        SlotCoordinate::new(round, slot).and_then(|coord| self.table.match_number(coord))
    }

    pub fn match_for_position(&self, position: MatchPosition) -> Option<u8> {
        match position {
            MatchPosition::Bracket(coord) => self.match_for_slot(coord.round, coord.slot),
            MatchPosition::ThirdPlace => Some(self.table.third_place),
        }
    }

    pub fn third_place_match(&self) -> u8 {
        self.table.third_place
    }

    /// Every known match number in ascending order.
    pub fn match_numbers(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.by_match.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }
}
