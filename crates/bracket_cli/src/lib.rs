//! Command implementations behind the `bracket` binary.
//!
//! Every command reads its inputs from disk, runs one `bracket_core`
//! operation and returns a serializable report; printing is left to `main`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use bracket_core::config::{load_config_file, BracketConfig};
use bracket_core::layout::{compute_layout, LayoutConfig, LayoutGeometry};
use bracket_core::reconstruct::{BracketReconstructor, ReconstructedBracket, ReconstructionConfig};
use bracket_core::round::{Round, SlotCoordinate, TeamId};
use bracket_core::slot_mapper::{MatchNumberTable, MatchPosition, SlotIndexMapper};
use bracket_core::stats::{BracketStatistics, MostFrequentBracket, PathEntry, TeamSummary};

pub fn load_statistics(path: &Path) -> Result<BracketStatistics> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read statistics file: {}", path.display()))?;
    let stats = BracketStatistics::from_json(&json)
        .with_context(|| format!("Failed to parse statistics file: {}", path.display()))?;
    tracing::info!(trials = stats.total_trials(), teams = stats.roster().len(), "Loaded statistics");
    Ok(stats)
}

/// Combined settings document; without a file the reconstruction section
/// follows `BRACKET_RECONSTRUCTION_PROFILE`.
pub fn load_settings(path: Option<&Path>) -> Result<BracketConfig> {
    match path {
        Some(path) => {
            BracketConfig::load(path).with_context(|| format!("Failed to load settings: {}", path.display()))
        }
        None => Ok(BracketConfig { reconstruction: ReconstructionConfig::from_env_or_default(), ..Default::default() }),
    }
}

pub fn load_reconstruction_config(path: Option<&Path>) -> Result<ReconstructionConfig> {
    match path {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load reconstruction config: {}", path.display())),
        None => Ok(ReconstructionConfig::from_env_or_default()),
    }
}

pub fn load_layout_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => {
            let config: LayoutConfig =
                load_config_file(path).with_context(|| format!("Failed to load layout config: {}", path.display()))?;
            Ok(config)
        }
        None => Ok(LayoutConfig::default()),
    }
}

pub fn load_match_table(path: &Path) -> Result<MatchNumberTable> {
    load_config_file(path).with_context(|| format!("Failed to load match table: {}", path.display()))
}

pub fn run_reconstruct(stats: &BracketStatistics, config: ReconstructionConfig) -> Result<ReconstructedBracket> {
    let bracket = BracketReconstructor::new(config)
        .reconstruct(stats)
        .context("Failed to reconstruct bracket")?;

    if let Err(problems) = bracket.verify() {
        for problem in &problems {
            tracing::warn!("{}", problem);
        }
        anyhow::bail!("Reconstructed bracket is inconsistent ({} problems)", problems.len());
    }
    tracing::info!(
        solver = %config.solver,
        evidence = %config.evidence,
        unresolved = bracket.unresolved_slots().len(),
        joint_probability = bracket.joint_probability,
        "Reconstructed bracket"
    );
    Ok(bracket)
}

pub fn run_layout(config: &LayoutConfig) -> Result<LayoutGeometry> {
    compute_layout(config).context("Invalid layout configuration")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupReport {
    pub match_number: u16,
    pub round: Option<Round>,
    pub slot: Option<u8>,
    pub third_place: bool,
    pub label: String,
}

/// Numbers outside the `u8` range report as unknown.
pub fn run_lookup(match_number: u16, table: MatchNumberTable) -> Result<LookupReport> {
    let mapper = SlotIndexMapper::from_table(table).context("Invalid match table")?;
    let position = u8::try_from(match_number).ok().and_then(|n| mapper.position_for_match(n));

    let report = match position {
        Some(MatchPosition::Bracket(coord)) => LookupReport {
            match_number,
            round: Some(coord.round),
            slot: Some(coord.slot),
            third_place: false,
            label: format!("{} slot {}", coord.round, coord.slot),
        },
        Some(MatchPosition::ThirdPlace) => LookupReport {
            match_number,
            round: None,
            slot: None,
            third_place: true,
            label: "Third-place play-off".to_string(),
        },
        None => LookupReport {
            match_number,
            round: None,
            slot: None,
            third_place: false,
            label: "unknown".to_string(),
        },
    };
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsReport {
    pub team: TeamId,
    pub total_trials: u32,
    pub paths: Vec<PathEntry>,
}

pub fn run_paths(stats: &BracketStatistics, team: TeamId, top: usize) -> PathsReport {
    PathsReport { team, total_trials: stats.total_trials(), paths: stats.top_paths(team, top) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_trials: u32,
    pub most_likely_champion: Option<TeamId>,
    pub most_likely_final: Option<[TeamId; 2]>,
    pub rankings: Vec<TeamSummary>,
    pub most_frequent_bracket: Option<MostFrequentBracket>,
}

pub fn run_summary(stats: &BracketStatistics, top: usize) -> SummaryReport {
    let mut rankings = stats.rankings();
    rankings.truncate(top);
    SummaryReport {
        total_trials: stats.total_trials(),
        most_likely_champion: stats.most_likely_champion().map(|(team, _)| team),
        most_likely_final: stats.most_likely_final().map(|(pair, _)| [pair.low, pair.high]),
        rankings,
        most_frequent_bracket: stats.most_frequent_bracket(),
    }
}

pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Convenience for callers holding a coordinate rather than a match number.
pub fn match_number_for(coord: SlotCoordinate) -> Option<u8> {
    SlotIndexMapper::default().match_for_slot(coord.round, coord.slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_core::stats::{StatisticsAccumulator, TrialOutcome};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_stats() -> BracketStatistics {
        let entrants: [TeamId; 32] = std::array::from_fn(|i| TeamId(i as u16));
        let mut acc = StatisticsAccumulator::new(entrants);
        for _ in 0..4 {
            acc.record_trial(&TrialOutcome::from_entrants(&entrants, |_, home, _| home));
        }
        acc.finish()
    }

    fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_statistics_from_file() {
        let file = write_temp(&sample_stats().to_json_pretty().unwrap(), ".json");
        let stats = load_statistics(file.path()).unwrap();
        assert_eq!(stats.total_trials(), 4);
    }

    #[test]
    fn test_load_statistics_reports_path() {
        let file = write_temp("not json", ".json");
        let err = load_statistics(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse statistics file"));
    }

    #[test]
    fn test_reconstruct_and_summary() {
        let stats = sample_stats();
        let bracket = run_reconstruct(&stats, ReconstructionConfig::fast()).unwrap();
        assert_eq!(bracket.champion.map(|p| p.team_id), Some(TeamId(0)));

        let summary = run_summary(&stats, 3);
        assert_eq!(summary.rankings.len(), 3);
        assert_eq!(summary.most_likely_champion, Some(TeamId(0)));
        assert_eq!(summary.most_likely_final, Some([TeamId(0), TeamId(16)]));
    }

    #[test]
    fn test_empty_statistics_fail_reconstruction() {
        let stats = StatisticsAccumulator::new([]).finish();
        assert!(run_reconstruct(&stats, ReconstructionConfig::default()).is_err());
    }

    #[test]
    fn test_layout_config_from_yaml() {
        let file = write_temp("slotWidth: 100\n", ".yaml");
        let config = load_layout_config(Some(file.path())).unwrap();
        assert_eq!(config.slot_width, 100.0);
        let geometry = run_layout(&config).unwrap();
        assert_eq!(geometry.slots.len(), 31);

        let bad = LayoutConfig { round_gap: 0.0, ..LayoutConfig::default() };
        assert!(run_layout(&bad).is_err());
    }

    #[test]
    fn test_lookup() {
        let r = run_lookup(74, MatchNumberTable::default()).unwrap();
        assert_eq!((r.round, r.slot), (Some(Round::RoundOf32), Some(0)));
        assert!(run_lookup(103, MatchNumberTable::default()).unwrap().third_place);
        assert_eq!(run_lookup(200, MatchNumberTable::default()).unwrap().label, "unknown");
        assert_eq!(match_number_for(SlotCoordinate::final_slot()), Some(104));
    }

    #[test]
    fn test_lookup_beyond_u8_is_unknown() {
        let r = run_lookup(300, MatchNumberTable::default()).unwrap();
        assert_eq!(r.match_number, 300);
        assert_eq!((r.round, r.slot, r.third_place), (None, None, false));
        assert_eq!(r.label, "unknown");
        // 330 would wrap onto match 74 as a u8.
        assert_eq!(run_lookup(256 + 74, MatchNumberTable::default()).unwrap().label, "unknown");
    }

    #[test]
    fn test_lookup_with_table_file() {
        let mut table = MatchNumberTable::fifa_2026();
        table.third_place = 110;
        let file = write_temp(&serde_json::to_string(&table).unwrap(), ".json");
        let table = load_match_table(file.path()).unwrap();
        assert!(run_lookup(110, table.clone()).unwrap().third_place);
        assert_eq!(run_lookup(103, table).unwrap().label, "unknown");
    }

    #[test]
    fn test_settings_document() {
        let file = write_temp(
            "layout:\n  slotWidth: 90\nreconstruction:\n  solver: greedy\nmatchNumbers:\n  roundOf32: [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]\n  roundOf16Start: 17\n  quarterFinalStart: 25\n  semiFinalStart: 29\n  thirdPlace: 31\n  final: 32\n",
            ".yaml",
        );
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.layout.slot_width, 90.0);
        assert_eq!(settings.reconstruction, ReconstructionConfig::fast());

        let r = run_lookup(32, settings.match_numbers).unwrap();
        assert_eq!((r.round, r.slot), (Some(Round::Final), Some(0)));

        let bad = write_temp(r#"{"layout": {"roundGap": -1}}"#, ".json");
        let err = load_settings(Some(bad.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load settings"));
    }

    #[test]
    fn test_paths_report() {
        let report = run_paths(&sample_stats(), TeamId(1), 5);
        assert_eq!(report.paths.len(), 1);
        assert_eq!(report.paths[0].path, "R32:0");
        assert_eq!(report.paths[0].probability, 1.0);
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("layout.json");
        write_json(&run_layout(&LayoutConfig::default()).unwrap(), Some(&out)).unwrap();
        let text = fs::read_to_string(out).unwrap();
        assert!(text.contains("\"pathData\""));
    }
}
