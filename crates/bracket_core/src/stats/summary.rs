//! Per-team summaries and batch-wide headlines derived at read time.

use serde::{Deserialize, Serialize};

use super::tables::PairKey;
use super::BracketStatistics;
use crate::round::{Round, SlotArena, SlotCoordinate, TeamId, TOTAL_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReach {
    pub round: Round,
    pub count: u32,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team: TeamId,
    /// How often the team played in each round.
    pub reached: Vec<RoundReach>,
    pub titles: u32,
    pub runner_up: u32,
    pub third_place: u32,
    pub fourth_place: u32,
    pub title_probability: f64,
    pub final_probability: f64,
    pub semi_final_probability: f64,
}

impl TeamSummary {
    pub fn reached_count(&self, round: Round) -> u32 {
        self.reached.iter().find(|r| r.round == round).map(|r| r.count).unwrap_or(0)
    }
}

/// The most often repeated complete winner list for one champion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MostFrequentBracket {
    pub champion: TeamId,
    /// Slot winners in flat-index order (R32 first, Final last).
    pub winners: Vec<Option<TeamId>>,
    pub count: u32,
    pub probability: f64,
}

impl MostFrequentBracket {
    pub fn winner(&self, coord: SlotCoordinate) -> Option<TeamId> {
        self.winners.get(coord.flat_index()).copied().flatten()
    }

    pub fn winner_arena(&self) -> SlotArena<Option<TeamId>> {
        let mut arena = SlotArena::default();
        for coord in SlotCoordinate::all() {
            arena.set(coord, self.winner(coord));
        }
        arena
    }
}

impl BracketStatistics {
    pub fn team_summary(&self, team: TeamId) -> TeamSummary {
        let final_slot = SlotCoordinate::final_slot();
        let titles = self.wins(team, final_slot);
        let finals = self.participation(team, final_slot);

        let semi_finals = self.participation.round_total(team, Round::SemiFinal);
        let reached = Round::ALL
            .iter()
            .map(|&round| {
                let count = self.participation.round_total(team, round);
                RoundReach { round, count, probability: self.probability(count) }
            })
            .collect();

        TeamSummary {
            team,
            reached,
            titles,
            runner_up: finals.saturating_sub(titles),
            third_place: self.third_place_wins(team),
            fourth_place: self.fourth_place(team),
            title_probability: self.probability(titles),
            final_probability: self.probability(finals),
            semi_final_probability: self.probability(semi_finals),
        }
    }

    /// Every known team, most titles first, ties by id.
    pub fn rankings(&self) -> Vec<TeamSummary> {
        let mut teams: Vec<TeamId> = self.roster.iter().copied().collect();
        teams.extend(self.participation.teams().filter(|t| !self.roster.contains(t)));

        let mut summaries: Vec<TeamSummary> = teams.into_iter().map(|t| self.team_summary(t)).collect();
        summaries.sort_by(|a, b| b.titles.cmp(&a.titles).then(a.team.cmp(&b.team)));
        summaries
    }

    /// Team with the most Final wins, ties by lower id. `None` when no
    /// Final winner was ever recorded.
    pub fn most_likely_champion(&self) -> Option<(TeamId, f64)> {
        self.wins
            .teams_at(SlotCoordinate::final_slot())
            .fold(None, |best: Option<(TeamId, u32)>, (team, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((team, count)),
            })
            .map(|(team, count)| (team, self.probability(count)))
    }

    /// Most frequent Final pairing with its probability.
    pub fn most_likely_final(&self) -> Option<(PairKey, f64)> {
        self.opponents
            .most_frequent(SlotCoordinate::final_slot())
            .map(|(pair, count)| (pair, self.probability(count)))
    }

    /// Most repeated complete bracket among those won by the most likely
    /// champion. Ties go to the lexicographically smaller winner list.
    pub fn most_frequent_bracket(&self) -> Option<MostFrequentBracket> {
        let (champion, _) = self.most_likely_champion()?;
        let final_index = SlotCoordinate::final_slot().flat_index();

        self.signatures
            .iter()
            .filter(|(sig, _)| sig.len() == TOTAL_SLOTS && sig[final_index] == Some(champion))
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(sig, &count)| MostFrequentBracket {
                champion,
                winners: sig.clone(),
                count,
                probability: self.probability(count),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{StatisticsAccumulator, TrialOutcome};

    fn entrants() -> [TeamId; 32] {
        std::array::from_fn(|i| TeamId(i as u16))
    }

    /// 3 trials where the home side always wins, 1 where away always wins.
    fn batch() -> BracketStatistics {
        let mut acc = StatisticsAccumulator::new((0..40).map(TeamId));
        for _ in 0..3 {
            acc.record_trial(&TrialOutcome::from_entrants(&entrants(), |_, home, _| home));
        }
        acc.record_trial(&TrialOutcome::from_entrants(&entrants(), |_, _, away| away));
        acc.finish()
    }

    #[test]
    fn test_team_summary_counts() {
        let stats = batch();
        let top = stats.team_summary(TeamId(0));
        assert_eq!(top.titles, 3);
        assert_eq!(top.runner_up, 0);
        assert!((top.title_probability - 0.75).abs() < 1e-12);
        assert_eq!(top.reached_count(Round::RoundOf32), 4);
        assert_eq!(top.reached_count(Round::RoundOf16), 3);
        assert!((top.semi_final_probability - 0.75).abs() < 1e-12);
        assert_eq!(top.fourth_place, 0);

        // Away-always-wins champion is the last entrant.
        let other = stats.team_summary(TeamId(31));
        assert_eq!(other.titles, 1);
        assert_eq!(stats.team_summary(TeamId(16)).runner_up, 3);
    }

    #[test]
    fn test_rankings_include_roster_teams_without_matches() {
        let stats = batch();
        let rankings = stats.rankings();
        assert_eq!(rankings.len(), 40);
        assert_eq!(rankings[0].team, TeamId(0));
        assert_eq!(rankings[1].team, TeamId(31));
        assert_eq!(rankings[2].team, TeamId(1));
        let absent = rankings.iter().find(|s| s.team == TeamId(39)).unwrap();
        assert_eq!(absent.reached_count(Round::RoundOf32), 0);
    }

    #[test]
    fn test_headlines() {
        let stats = batch();
        let (champion, p) = stats.most_likely_champion().unwrap();
        assert_eq!(champion, TeamId(0));
        assert!((p - 0.75).abs() < 1e-12);

        let (pair, p) = stats.most_likely_final().unwrap();
        assert_eq!(pair, PairKey::new(TeamId(0), TeamId(16)));
        assert!((p - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_most_frequent_bracket_follows_champion() {
        let stats = batch();
        let bracket = stats.most_frequent_bracket().unwrap();
        assert_eq!(bracket.champion, TeamId(0));
        assert_eq!(bracket.count, 3);
        assert_eq!(bracket.winner(SlotCoordinate::final_slot()), Some(TeamId(0)));
        let r32_1 = SlotCoordinate::new(Round::RoundOf32, 1).unwrap();
        assert_eq!(*bracket.winner_arena().get(r32_1), Some(TeamId(2)));
    }

    #[test]
    fn test_empty_batch_has_no_headlines() {
        let stats = StatisticsAccumulator::new([]).finish();
        assert!(stats.most_likely_champion().is_none());
        assert!(stats.most_likely_final().is_none());
        assert!(stats.most_frequent_bracket().is_none());
        assert!(stats.rankings().is_empty());
    }
}
