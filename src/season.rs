use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bracket::{Bracket, validate_brackets};
use crate::config::SimConfig;
use crate::error::Result;
use crate::match_parse::{MatchRecord, Winner, regular_season};
use crate::outcome::OutcomeChoice;
use crate::schedule::{Cutoff, WeekBlock, block_weeks, cutoff_date, distinct_dates, is_played};
use crate::simulate::{
    ForcedOutcomes, MatchKey, SimulationInput, SimulationResult, UnplayedMatch, run_monte_carlo,
};
use crate::standings::{StandingsRow, baseline_states, compute_standings, team_universe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmptyReason {
    NoRegularSeasonMatches,
    NoTeams,
    NoWeeks,
}

impl EmptyReason {
    pub fn message(self) -> &'static str {
        match self {
            EmptyReason::NoRegularSeasonMatches => "no regular-season matches to simulate",
            EmptyReason::NoTeams => "no teams found in the regular season",
            EmptyReason::NoWeeks => "no match weeks found in the regular season",
        }
    }
}

/// Regular season of one tournament, ready for what-if queries.
#[derive(Debug, Clone)]
pub struct Season {
    matches: Vec<MatchRecord>,
    teams: Vec<String>,
    weeks: Vec<WeekBlock>,
}

#[derive(Debug, Clone)]
pub enum SeasonSetup {
    Ready(Season),
    Empty(EmptyReason),
}

/// Matches on either side of a cutoff.
#[derive(Debug, Clone)]
pub struct SeasonSplit {
    pub cutoff_date: Option<NaiveDate>,
    pub played: Vec<MatchRecord>,
    pub unplayed: Vec<UnplayedMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureChoices {
    pub key: MatchKey,
    pub best_of: u32,
    pub choices: Vec<OutcomeChoice>,
}

#[derive(Debug, Clone)]
pub struct OddsRequest {
    pub cutoff: Cutoff,
    pub forced: ForcedOutcomes,
    pub brackets: Vec<Bracket>,
    pub iterations: u32,
    pub seed: Option<u64>,
    pub parallelism: Option<usize>,
}

impl OddsRequest {
    pub fn from_config(config: &SimConfig, cutoff: Cutoff, forced: ForcedOutcomes) -> Self {
        Self {
            cutoff,
            forced,
            brackets: config.brackets.clone(),
            iterations: config.iterations(),
            seed: config.seed,
            parallelism: config.parallelism,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsReport {
    pub cutoff_date: Option<NaiveDate>,
    pub unplayed: usize,
    pub standings: Vec<StandingsRow>,
    pub simulation: SimulationResult,
}

#[derive(Debug, Clone)]
pub enum OddsOutcome {
    Report(OddsReport),
    NothingToSimulate(EmptyReason),
}

impl Season {
    pub fn from_matches(all: &[MatchRecord], week_gap_days: i64) -> SeasonSetup {
        let matches = regular_season(all);
        if matches.is_empty() {
            return SeasonSetup::Empty(EmptyReason::NoRegularSeasonMatches);
        }
        let teams = team_universe(&matches);
        if teams.is_empty() {
            return SeasonSetup::Empty(EmptyReason::NoTeams);
        }
        let weeks = block_weeks(&distinct_dates(&matches), week_gap_days);
        if weeks.is_empty() {
            return SeasonSetup::Empty(EmptyReason::NoWeeks);
        }
        SeasonSetup::Ready(Season {
            matches,
            teams,
            weeks,
        })
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn weeks(&self) -> &[WeekBlock] {
        &self.weeks
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// Last week holding at least one decided series, or the pre-season
    /// sentinel when nothing has a winner yet.
    pub fn latest_played_cutoff(&self) -> Cutoff {
        self.weeks
            .iter()
            .rposition(|week| {
                self.matches
                    .iter()
                    .any(|m| m.winner != Winner::Unknown && week.dates().contains(&m.date))
            })
            .map_or(Cutoff::NothingPlayed, Cutoff::Week)
    }

    pub fn split(&self, cutoff: Cutoff) -> Result<SeasonSplit> {
        let cutoff_date = cutoff_date(&self.weeks, cutoff)?;
        let (played, later): (Vec<MatchRecord>, Vec<MatchRecord>) = self
            .matches
            .iter()
            .cloned()
            .partition(|m| is_played(m.date, cutoff_date));
        let unplayed = later
            .into_iter()
            .map(|m| UnplayedMatch {
                team_a: m.team_a,
                team_b: m.team_b,
                date: m.date,
                best_of: m.best_of,
            })
            .collect();
        Ok(SeasonSplit {
            cutoff_date,
            played,
            unplayed,
        })
    }

    pub fn standings(&self, cutoff: Cutoff) -> Result<Vec<StandingsRow>> {
        let split = self.split(cutoff)?;
        Ok(compute_standings(&self.teams, &split.played))
    }

    /// Override choices for every series after the cutoff.
    pub fn unplayed_fixtures(&self, cutoff: Cutoff) -> Result<Vec<FixtureChoices>> {
        self.split(cutoff)?
            .unplayed
            .iter()
            .map(|m| {
                Ok(FixtureChoices {
                    key: m.key(),
                    best_of: m.best_of,
                    choices: m.choices()?,
                })
            })
            .collect()
    }

    pub fn simulate(&self, request: &OddsRequest) -> Result<OddsReport> {
        for issue in validate_brackets(&request.brackets, self.teams.len()) {
            warn!(?issue, "bracket configuration");
        }

        let split = self.split(request.cutoff)?;
        let standings = compute_standings(&self.teams, &split.played);
        let baseline = baseline_states(&self.teams, &standings);

        let simulation = run_monte_carlo(&SimulationInput {
            teams: &self.teams,
            baseline: &baseline,
            unplayed: &split.unplayed,
            forced: &request.forced,
            brackets: &request.brackets,
            iterations: request.iterations,
            seed: request.seed,
            parallelism: request.parallelism,
        })?;

        info!(
            cutoff = ?split.cutoff_date,
            played = split.played.len(),
            unplayed = split.unplayed.len(),
            "playoff odds ready"
        );
        Ok(OddsReport {
            cutoff_date: split.cutoff_date,
            unplayed: split.unplayed.len(),
            standings,
            simulation,
        })
    }
}

/// Parsed matches in, standings plus bracket odds out.
pub fn run_playoff_odds(
    matches: &[MatchRecord],
    config: &SimConfig,
    cutoff: Cutoff,
    forced: ForcedOutcomes,
) -> Result<OddsOutcome> {
    config.validate()?;
    let season = match Season::from_matches(matches, config.week_gap_days) {
        SeasonSetup::Ready(season) => season,
        SeasonSetup::Empty(reason) => return Ok(OddsOutcome::NothingToSimulate(reason)),
    };
    let request = OddsRequest::from_config(config, cutoff, forced);
    season.simulate(&request).map(OddsOutcome::Report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(a: &str, b: &str, day: u32, winner: Winner, playoff: bool) -> MatchRecord {
        let (score_a, score_b) = match winner {
            Winner::TeamA => (2, 0),
            Winner::TeamB => (0, 2),
            Winner::Unknown => (0, 0),
        };
        MatchRecord {
            date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            team_a: a.to_string(),
            team_b: b.to_string(),
            best_of: 3,
            winner,
            score_a,
            score_b,
            is_playoff: playoff,
        }
    }

    #[test]
    fn only_playoffs_means_nothing_to_simulate() {
        let matches = vec![m("A", "B", 1, Winner::TeamA, true)];
        let outcome =
            run_playoff_odds(&matches, &SimConfig::default(), Cutoff::NothingPlayed, ForcedOutcomes::new())
                .unwrap();
        assert!(matches!(
            outcome,
            OddsOutcome::NothingToSimulate(EmptyReason::NoRegularSeasonMatches)
        ));
    }

    #[test]
    fn split_follows_week_cutoff() {
        let matches = vec![
            m("A", "B", 1, Winner::TeamA, false),
            m("C", "D", 2, Winner::TeamB, false),
            m("A", "C", 8, Winner::Unknown, false),
            m("B", "D", 20, Winner::Unknown, true),
        ];
        let SeasonSetup::Ready(season) = Season::from_matches(&matches, 2) else {
            panic!("season should be ready");
        };
        assert_eq!(season.weeks().len(), 2);
        assert_eq!(season.latest_played_cutoff(), Cutoff::Week(0));

        let split = season.split(Cutoff::Week(0)).unwrap();
        assert_eq!(split.played.len(), 2);
        assert_eq!(split.unplayed.len(), 1);

        let split = season.split(Cutoff::NothingPlayed).unwrap();
        assert!(split.played.is_empty());
        assert_eq!(split.unplayed.len(), 3);

        let fixtures = season.unplayed_fixtures(Cutoff::Week(0)).unwrap();
        assert_eq!(fixtures[0].key.wire(), "A|C|2025-08-08");
        assert_eq!(fixtures[0].choices.len(), 5);
    }
}
