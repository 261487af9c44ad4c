use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::match_parse::{MatchRecord, Winner};

/// The two ranking inputs the simulator carries per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamState {
    pub wins: u32,
    pub game_diff: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    pub match_wins: u32,
    pub match_losses: u32,
    pub game_wins: u32,
    pub game_losses: u32,
}

impl StandingsRow {
    fn empty(team: &str) -> Self {
        Self {
            team: team.to_string(),
            match_wins: 0,
            match_losses: 0,
            game_wins: 0,
            game_losses: 0,
        }
    }

    pub fn game_diff(&self) -> i32 {
        self.game_wins as i32 - self.game_losses as i32
    }

    pub fn match_record(&self) -> String {
        format!("{}-{}", self.match_wins, self.match_losses)
    }

    pub fn game_record(&self) -> String {
        format!("{}-{}", self.game_wins, self.game_losses)
    }

    pub fn state(&self) -> TeamState {
        TeamState {
            wins: self.match_wins,
            game_diff: self.game_diff(),
        }
    }
}

/// Descending by match wins, then game differential.
pub fn compare_states(a: &TeamState, b: &TeamState) -> Ordering {
    b.wins.cmp(&a.wins).then(b.game_diff.cmp(&a.game_diff))
}

/// Every team named in any match, alphabetically.
pub fn team_universe(matches: &[MatchRecord]) -> Vec<String> {
    matches
        .iter()
        .flat_map(|m| [m.team_a.as_str(), m.team_b.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Folds `played` into one row per team in `teams`, ranked by
/// [`compare_states`]. Ties keep the order of `teams`.
pub fn compute_standings(teams: &[String], played: &[MatchRecord]) -> Vec<StandingsRow> {
    let index: HashMap<&str, usize> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();
    let mut rows: Vec<StandingsRow> = teams.iter().map(|t| StandingsRow::empty(t)).collect();

    for m in played {
        let (Some(&a), Some(&b)) = (index.get(m.team_a.as_str()), index.get(m.team_b.as_str()))
        else {
            continue;
        };
        rows[a].game_wins += m.score_a;
        rows[a].game_losses += m.score_b;
        rows[b].game_wins += m.score_b;
        rows[b].game_losses += m.score_a;
        match m.winner {
            Winner::TeamA => {
                rows[a].match_wins += 1;
                rows[b].match_losses += 1;
            }
            Winner::TeamB => {
                rows[b].match_wins += 1;
                rows[a].match_losses += 1;
            }
            Winner::Unknown => {}
        }
    }

    rows.sort_by(|x, y| compare_states(&x.state(), &y.state()));
    rows
}

/// Baseline state per team, aligned with `teams`.
pub fn baseline_states(teams: &[String], standings: &[StandingsRow]) -> Vec<TeamState> {
    let by_team: HashMap<&str, TeamState> = standings
        .iter()
        .map(|r| (r.team.as_str(), r.state()))
        .collect();
    teams
        .iter()
        .map(|t| by_team.get(t.as_str()).copied().unwrap_or_default())
        .collect()
}
