//! Per-trial outcome records handed over by the simulation engine.

use serde::{Deserialize, Serialize};

use crate::round::{Round, SlotCoordinate, TeamId};

/// One knockout match actually played in a trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedMatch {
    pub coord: SlotCoordinate,
    pub home: TeamId,
    pub away: TeamId,
    /// `None` when the engine did not report a winner.
    #[serde(default)]
    pub winner: Option<TeamId>,
}

impl PlayedMatch {
    pub fn new(coord: SlotCoordinate, home: TeamId, away: TeamId, winner: TeamId) -> Self {
        Self { coord, home, away, winner: Some(winner) }
    }

    pub fn loser(&self) -> Option<TeamId> {
        match self.winner {
            Some(w) if w == self.home => Some(self.away),
            Some(w) if w == self.away => Some(self.home),
            _ => None,
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

/// Third-place play-off; it occupies no winner slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPlaceMatch {
    pub home: TeamId,
    pub away: TeamId,
    #[serde(default)]
    pub winner: Option<TeamId>,
}

/// Everything one trial produced in the knockout stage.
///
/// A record may be partial: only matches that were played are listed, and a
/// team's participation ends at the last slot it reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialOutcome {
    pub matches: Vec<PlayedMatch>,
    #[serde(default)]
    pub third_place: Option<ThirdPlaceMatch>,
}

impl TrialOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match. Out-of-range slots are ignored.
    pub fn with_match(
        mut self,
        round: Round,
        slot: u8,
        home: TeamId,
        away: TeamId,
        winner: TeamId,
    ) -> Self {
        if let Some(coord) = SlotCoordinate::new(round, slot) {
            self.matches.push(PlayedMatch::new(coord, home, away, winner));
        }
        self
    }

    pub fn with_third_place(mut self, home: TeamId, away: TeamId, winner: TeamId) -> Self {
        self.third_place = Some(ThirdPlaceMatch { home, away, winner: Some(winner) });
        self
    }

    /// Build a complete trial from the 32 entrants in R32 side order
    /// (slot 0 home, slot 0 away, slot 1 home, ...) where `pick` decides
    /// every match. Used by tests and demos.
    pub fn from_entrants(
        entrants: &[TeamId; 32],
        mut pick: impl FnMut(SlotCoordinate, TeamId, TeamId) -> TeamId,
    ) -> Self {
        let mut trial = Self::new();
        let mut current: Vec<TeamId> = entrants.to_vec();

        for round in Round::ALL {
            let mut next = Vec::with_capacity(current.len() / 2);
            for (slot, pair) in current.chunks(2).enumerate() {
                let coord = SlotCoordinate { round, slot: slot as u8 };
                let winner = pick(coord, pair[0], pair[1]);
                trial.matches.push(PlayedMatch::new(coord, pair[0], pair[1], winner));
                next.push(winner);
            }
            current = next;
        }
        trial
    }

    pub fn match_at(&self, coord: SlotCoordinate) -> Option<&PlayedMatch> {
        self.matches.iter().find(|m| m.coord == coord)
    }

    pub fn champion(&self) -> Option<TeamId> {
        self.match_at(SlotCoordinate::final_slot()).and_then(|m| m.winner)
    }
}
