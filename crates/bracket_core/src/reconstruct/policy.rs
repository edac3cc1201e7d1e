//! Reconstruction policies and their configuration record.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

use crate::round::{SlotCoordinate, TeamId};
use crate::stats::BracketStatistics;

/// Which statistic decides between candidates.
///
/// Participation and wins can disagree about who is more likely at a slot;
/// the policy names the order in which they are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidencePolicy {
    /// Compare wins first; participation only decides when wins do not.
    #[default]
    WinsThenParticipation,
    /// Wins only. Slots without wins stay unresolved.
    WinsOnly,
    /// Participation only.
    ParticipationOnly,
}

/// Which statistic a count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBasis {
    Wins,
    Participation,
}

impl EvidencePolicy {
    /// The count a single team brings to `coord`, with its basis.
    ///
    /// Under `WinsThenParticipation` a team with no wins at the slot falls
    /// back to its participation count.
    pub fn evidence(self, stats: &BracketStatistics, team: TeamId, coord: SlotCoordinate) -> (u32, EvidenceBasis) {
        match self {
            EvidencePolicy::WinsOnly => (stats.wins(team, coord), EvidenceBasis::Wins),
            EvidencePolicy::ParticipationOnly => (stats.participation(team, coord), EvidenceBasis::Participation),
            EvidencePolicy::WinsThenParticipation => {
                let wins = stats.wins(team, coord);
                if wins > 0 {
                    (wins, EvidenceBasis::Wins)
                } else {
                    (stats.participation(team, coord), EvidenceBasis::Participation)
                }
            }
        }
    }

    /// Comparison key for head-to-head decisions. Larger is stronger;
    /// `(0, 0)` means no evidence.
    pub(crate) fn decision_key(self, stats: &BracketStatistics, team: TeamId, coord: SlotCoordinate) -> (u32, u32) {
        match self {
            EvidencePolicy::WinsOnly => (stats.wins(team, coord), 0),
            EvidencePolicy::ParticipationOnly => (stats.participation(team, coord), 0),
            EvidencePolicy::WinsThenParticipation => (stats.wins(team, coord), stats.participation(team, coord)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EvidencePolicy::WinsThenParticipation => "wins_then_participation",
            EvidencePolicy::WinsOnly => "wins_only",
            EvidencePolicy::ParticipationOnly => "participation_only",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "wins_then_participation" => Some(EvidencePolicy::WinsThenParticipation),
            "wins_only" | "wins" => Some(EvidencePolicy::WinsOnly),
            "participation_only" | "participation" => Some(EvidencePolicy::ParticipationOnly),
            _ => None,
        }
    }
}

impl fmt::Display for EvidencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Round-of-32 assignment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverPolicy {
    /// Globally optimal, duplicate-free assignment.
    #[default]
    Optimal,
    /// Highest-score-first allocation.
    Greedy,
}

impl SolverPolicy {
    pub fn name(self) -> &'static str {
        match self {
            SolverPolicy::Optimal => "optimal",
            SolverPolicy::Greedy => "greedy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "optimal" | "hungarian" => Some(SolverPolicy::Optimal),
            "greedy" => Some(SolverPolicy::Greedy),
            _ => None,
        }
    }
}

impl fmt::Display for SolverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconstructionConfig {
    pub solver: SolverPolicy,
    pub evidence: EvidencePolicy,
}

impl ReconstructionConfig {
    /// Duplicate-free bracket via the optimal solver.
    pub fn exact() -> Self {
        Self { solver: SolverPolicy::Optimal, evidence: EvidencePolicy::WinsThenParticipation }
    }

    /// Approximate bracket via the greedy allocator.
    pub fn fast() -> Self {
        Self { solver: SolverPolicy::Greedy, evidence: EvidencePolicy::WinsThenParticipation }
    }

    pub fn with_evidence(mut self, evidence: EvidencePolicy) -> Self {
        self.evidence = evidence;
        self
    }

    /// Load from environment variable BRACKET_RECONSTRUCTION_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        match env::var("BRACKET_RECONSTRUCTION_PROFILE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "exact" => Self::exact(),
            "fast" => Self::fast(),
            _ => Self::default(),
        }
    }
}
