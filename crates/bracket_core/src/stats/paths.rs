//! Tournament path tracking: the literal opponent sequence each team faced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::round::{Round, TeamId};

/// Default number of distinct paths retained per team.
pub const DEFAULT_PATH_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathStep {
    pub round: Round,
    pub opponent: TeamId,
}

/// Round-ordered opponents, e.g. `R32:1,R16:2,QF:4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OpponentPath(pub Vec<PathStep>);

impl OpponentPath {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Furthest round reached.
    pub fn last_round(&self) -> Option<Round> {
        self.0.last().map(|s| s.round)
    }
}

impl fmt::Display for OpponentPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", step.round.short_label(), step.opponent)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePathError(pub String);

impl fmt::Display for ParsePathError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid path segment '{}'", self.0)
    }
}

impl std::error::Error for ParsePathError {}

impl FromStr for OpponentPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let steps = s
            .split(',')
            .map(|segment| {
                let (label, id) =
                    segment.split_once(':').ok_or_else(|| ParsePathError(segment.to_string()))?;
                let round = Round::from_short_label(label.trim())
                    .ok_or_else(|| ParsePathError(segment.to_string()))?;
                let opponent = id
                    .trim()
                    .parse::<u16>()
                    .map(TeamId)
                    .map_err(|_| ParsePathError(segment.to_string()))?;
                Ok(PathStep { round, opponent })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(steps))
    }
}

/// A path with its frequency, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub path: String,
    pub count: u32,
    pub probability: f64,
}

/// Per-team path frequency tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTable {
    paths: BTreeMap<TeamId, BTreeMap<OpponentPath, u32>>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence. Empty paths are not recorded.
    pub fn record(&mut self, team: TeamId, path: OpponentPath) {
        self.add(team, path, 1);
    }

    pub fn add(&mut self, team: TeamId, path: OpponentPath, amount: u32) {
        if path.is_empty() {
            return;
        }
        let cell = self.paths.entry(team).or_default().entry(path).or_insert(0);
        *cell = cell.saturating_add(amount);
    }

    pub fn count(&self, team: TeamId, path: &OpponentPath) -> u32 {
        self.paths.get(&team).and_then(|p| p.get(path)).copied().unwrap_or(0)
    }

    pub fn distinct_paths(&self, team: TeamId) -> usize {
        self.paths.get(&team).map(|p| p.len()).unwrap_or(0)
    }

    /// Paths sorted by count descending, ties by path order.
    fn ranked(&self, team: TeamId) -> Vec<(&OpponentPath, u32)> {
        let mut entries: Vec<(&OpponentPath, u32)> = self
            .paths
            .get(&team)
            .map(|p| p.iter().map(|(k, v)| (k, *v)).collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn top_paths(&self, team: TeamId, n: usize, total_trials: u32) -> Vec<PathEntry> {
        self.ranked(team)
            .into_iter()
            .take(n)
            .map(|(path, count)| PathEntry {
                path: path.to_string(),
                count,
                probability: if total_trials == 0 {
                    0.0
                } else {
                    count as f64 / total_trials as f64
                },
            })
            .collect()
    }

    /// Keep only the `max_entries` most frequent paths per team.
    pub fn prune(&mut self, max_entries: usize) {
        let teams: Vec<TeamId> = self.paths.keys().copied().collect();
        for team in teams {
            if self.distinct_paths(team) <= max_entries {
                continue;
            }
            let kept: BTreeMap<OpponentPath, u32> = self
                .ranked(team)
                .into_iter()
                .take(max_entries)
                .map(|(path, count)| (path.clone(), count))
                .collect();
            self.paths.insert(team, kept);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamId, &OpponentPath, u32)> + '_ {
        self.paths
            .iter()
            .flat_map(|(team, p)| p.iter().map(move |(path, count)| (*team, path, *count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> OpponentPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_path_display_round_trip() {
        let p = OpponentPath(vec![
            PathStep { round: Round::RoundOf32, opponent: TeamId(1) },
            PathStep { round: Round::RoundOf16, opponent: TeamId(2) },
            PathStep { round: Round::Final, opponent: TeamId(16) },
        ]);
        assert_eq!(p.to_string(), "R32:1,R16:2,F:16");
        assert_eq!(path("R32:1,R16:2,F:16"), p);
        assert_eq!(p.last_round(), Some(Round::Final));
    }

    #[test]
    fn test_path_parse_rejects_garbage() {
        assert!("R32:1,XX:2".parse::<OpponentPath>().is_err());
        assert!("R32-1".parse::<OpponentPath>().is_err());
        assert!("R32:abc".parse::<OpponentPath>().is_err());
        assert!("".parse::<OpponentPath>().unwrap().is_empty());
    }

    #[test]
    fn test_empty_path_not_recorded() {
        let mut table = PathTable::new();
        table.record(TeamId(3), OpponentPath::default());
        assert_eq!(table.distinct_paths(TeamId(3)), 0);
    }

    #[test]
    fn test_top_paths_ordering() {
        let mut table = PathTable::new();
        table.add(TeamId(0), path("R32:1"), 5);
        table.add(TeamId(0), path("R32:1,R16:2"), 8);
        table.add(TeamId(0), path("R32:3"), 5);

        let top = table.top_paths(TeamId(0), 2, 20);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].path, "R32:1,R16:2");
        assert!((top[0].probability - 0.4).abs() < 1e-12);
        assert_eq!(top[1].path, "R32:1");
    }

    #[test]
    fn test_prune_keeps_most_frequent() {
        let mut table = PathTable::new();
        for i in 0..150u16 {
            table.add(TeamId(0), path(&format!("R32:{}", i)), 150 - i as u32);
        }
        table.add(TeamId(1), path("R32:0"), 1);

        table.prune(100);

        assert_eq!(table.distinct_paths(TeamId(0)), 100);
        assert_eq!(table.count(TeamId(0), &path("R32:0")), 150);
        assert_eq!(table.count(TeamId(0), &path("R32:99")), 51);
        assert_eq!(table.count(TeamId(0), &path("R32:100")), 0);
        assert_eq!(table.distinct_paths(TeamId(1)), 1);
    }
}
