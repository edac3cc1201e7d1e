//! Knockout rounds, bracket coordinates and the flat slot arena.
//!
//! The bracket is a fixed binary tree of 31 winner slots:
//!
//! | Round         | Index | Slots |
//! |---------------|-------|-------|
//! | Round of 32   | 0     | 16    |
//! | Round of 16   | 1     | 8     |
//! | Quarter-final | 2     | 4     |
//! | Semi-final    | 3     | 2     |
//! | Final         | 4     | 1     |
//!
//! Slot `k` of round `i` is fed by slots `2k` and `2k+1` of round `i-1`.
//! Nodes are never linked by pointers; every per-slot value lives in a
//! [`SlotArena`] addressed by [`SlotCoordinate::flat_index`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BracketError;

/// Stable team identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u16);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total number of winner slots in the bracket (16+8+4+2+1).
pub const TOTAL_SLOTS: usize = 31;

/// Teams entering the first knockout round.
pub const FIELD_SIZE: usize = 32;

/// Knockout round, ordered from the Round of 32 to the Final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    #[serde(rename = "round_of_32")]
    RoundOf32,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl Round {
    pub const ALL: [Round; 5] =
        [Round::RoundOf32, Round::RoundOf16, Round::QuarterFinal, Round::SemiFinal, Round::Final];

    pub const fn index(self) -> usize {
        match self {
            Round::RoundOf32 => 0,
            Round::RoundOf16 => 1,
            Round::QuarterFinal => 2,
            Round::SemiFinal => 3,
            Round::Final => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Round> {
        Self::ALL.get(index).copied()
    }

    /// Number of slots (matches) in this round.
    pub const fn slot_count(self) -> usize {
        match self {
            Round::RoundOf32 => 16,
            Round::RoundOf16 => 8,
            Round::QuarterFinal => 4,
            Round::SemiFinal => 2,
            Round::Final => 1,
        }
    }

    /// Offset of this round's first slot in the flat arena.
    const fn flat_offset(self) -> usize {
        match self {
            Round::RoundOf32 => 0,
            Round::RoundOf16 => 16,
            Round::QuarterFinal => 24,
            Round::SemiFinal => 28,
            Round::Final => 30,
        }
    }

    pub fn next(self) -> Option<Round> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Round> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Short label used in path keys ("R32", "R16", "QF", "SF", "F").
    pub const fn short_label(self) -> &'static str {
        match self {
            Round::RoundOf32 => "R32",
            Round::RoundOf16 => "R16",
            Round::QuarterFinal => "QF",
            Round::SemiFinal => "SF",
            Round::Final => "F",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Round::RoundOf32 => "Round of 32",
            Round::RoundOf16 => "Round of 16",
            Round::QuarterFinal => "Quarter-finals",
            Round::SemiFinal => "Semi-finals",
            Round::Final => "Final",
        }
    }

    pub fn from_short_label(label: &str) -> Option<Round> {
        Self::ALL.iter().copied().find(|r| r.short_label() == label)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One bracket position: `(round, slot)` with `slot < round.slot_count()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotCoordinate {
    pub round: Round,
    pub slot: u8,
}

impl SlotCoordinate {
    pub fn new(round: Round, slot: u8) -> Option<Self> {
        if (slot as usize) < round.slot_count() {
            Some(Self { round, slot })
        } else {
            None
        }
    }

    pub const fn final_slot() -> Self {
        Self { round: Round::Final, slot: 0 }
    }

    pub const fn flat_index(self) -> usize {
        self.round.flat_offset() + self.slot as usize
    }

    pub fn from_flat_index(index: usize) -> Option<Self> {
        Round::ALL.iter().rev().find(|r| index >= r.flat_offset()).and_then(|&round| {
            let slot = index - round.flat_offset();
            u8::try_from(slot).ok().and_then(|s| Self::new(round, s))
        })
    }

    /// The two prior-round slots whose winners meet here. `None` for R32.
    pub fn feeders(self) -> Option<[SlotCoordinate; 2]> {
        let prev = self.round.previous()?;
        let first = self.slot * 2;
        Some([Self { round: prev, slot: first }, Self { round: prev, slot: first + 1 }])
    }

    /// The slot this slot's winner advances to. `None` for the Final.
    pub fn destination(self) -> Option<SlotCoordinate> {
        let next = self.round.next()?;
        Some(Self { round: next, slot: self.slot / 2 })
    }

    /// All 31 coordinates, R32 first, in flat-index order.
    pub fn all() -> impl Iterator<Item = SlotCoordinate> {
        Round::ALL.into_iter().flat_map(|round| {
            (0..round.slot_count() as u8).map(move |slot| SlotCoordinate { round, slot })
        })
    }

    pub fn in_round(round: Round) -> impl Iterator<Item = SlotCoordinate> {
        (0..round.slot_count() as u8).map(move |slot| SlotCoordinate { round, slot })
    }
}

impl fmt::Display for SlotCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.round.short_label(), self.slot)
    }
}

/// Flat per-slot storage indexed by [`SlotCoordinate`].
///
/// Always holds exactly [`TOTAL_SLOTS`] cells; deserialization rejects any
/// other length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArenaCells<T>")]
pub struct SlotArena<T> {
    cells: Vec<T>,
}

#[derive(Deserialize)]
struct ArenaCells<T> {
    cells: Vec<T>,
}

impl<T> TryFrom<ArenaCells<T>> for SlotArena<T> {
    type Error = BracketError;

    fn try_from(raw: ArenaCells<T>) -> Result<Self, BracketError> {
        if raw.cells.len() != TOTAL_SLOTS {
            return Err(BracketError::InvalidShape(format!(
                "slot arena needs {} cells, got {}",
                TOTAL_SLOTS,
                raw.cells.len()
            )));
        }
        Ok(Self { cells: raw.cells })
    }
}

impl<T: Clone> SlotArena<T> {
    pub fn filled(value: T) -> Self {
        Self { cells: vec![value; TOTAL_SLOTS] }
    }
}

impl<T: Default> Default for SlotArena<T> {
    fn default() -> Self {
        Self { cells: (0..TOTAL_SLOTS).map(|_| T::default()).collect() }
    }
}

impl<T> SlotArena<T> {
    pub fn get(&self, coord: SlotCoordinate) -> &T {
        &self.cells[coord.flat_index()]
    }

    pub fn get_mut(&mut self, coord: SlotCoordinate) -> &mut T {
        &mut self.cells[coord.flat_index()]
    }

    pub fn set(&mut self, coord: SlotCoordinate, value: T) {
        self.cells[coord.flat_index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotCoordinate, &T)> {
        SlotCoordinate::all().zip(self.cells.iter())
    }

    pub fn round(&self, round: Round) -> &[T] {
        let start = round.flat_offset();
        &self.cells[start..start + round.slot_count()]
    }
}
