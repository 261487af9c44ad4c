use std::cmp::Ordering;
use std::fmt::Write as _;

use serde::Serialize;

use crate::season::{FixtureChoices, OddsReport};
use crate::schedule::WeekBlock;
use crate::simulate::{SimulationResult, TeamOdds};
use crate::standings::StandingsRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsLine {
    pub team: String,
    pub match_record: String,
    pub game_record: String,
    pub game_diff: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityLine {
    pub team: String,
    pub percentages: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityTable {
    pub brackets: Vec<String>,
    pub rows: Vec<ProbabilityLine>,
}

pub fn standings_table(rows: &[StandingsRow]) -> Vec<StandingsLine> {
    rows.iter()
        .map(|r| StandingsLine {
            team: r.team.clone(),
            match_record: r.match_record(),
            game_record: r.game_record(),
            game_diff: r.game_diff(),
        })
        .collect()
}

/// Rows ordered by bracket odds, best bracket first, then expected wins.
pub fn probability_table(result: &SimulationResult) -> ProbabilityTable {
    let mut teams: Vec<&TeamOdds> = result.teams.iter().collect();
    teams.sort_by(|a, b| {
        compare_percentages(&b.percentages, &a.percentages)
            .then(b.expected_wins.total_cmp(&a.expected_wins))
            .then_with(|| a.team.cmp(&b.team))
    });
    ProbabilityTable {
        brackets: result.brackets.clone(),
        rows: teams
            .into_iter()
            .map(|t| ProbabilityLine {
                team: t.team.clone(),
                percentages: t.percentages.clone(),
            })
            .collect(),
    }
}

fn compare_percentages(a: &[f64], b: &[f64]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

pub fn signed(n: i32) -> String {
    if n > 0 { format!("+{n}") } else { n.to_string() }
}

pub fn render_weeks(weeks: &[WeekBlock]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Weeks");
    let _ = writeln!(out, "  none: no matches played");
    for (idx, week) in weeks.iter().enumerate() {
        let _ = writeln!(out, "  {idx}: {}", week.label(idx));
    }
    out
}

pub fn render_standings(rows: &[StandingsRow]) -> String {
    let lines = standings_table(rows);
    let width = team_width(lines.iter().map(|l| l.team.as_str()));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:<width$} {:>7} {:>7} {:>6}",
        "#", "Team", "Match", "Game", "Diff"
    );
    for (idx, line) in lines.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<width$} {:>7} {:>7} {:>6}",
            idx + 1,
            line.team,
            line.match_record,
            line.game_record,
            signed(line.game_diff)
        );
    }
    out
}

pub fn render_probabilities(result: &SimulationResult) -> String {
    let table = probability_table(result);
    let width = team_width(table.rows.iter().map(|r| r.team.as_str()));
    let mut out = String::new();
    let _ = write!(out, "{:<width$}", "Team");
    for name in &table.brackets {
        let col = name.chars().count().max(8);
        let _ = write!(out, " {name:>col$}");
    }
    out.push('\n');
    for row in &table.rows {
        let _ = write!(out, "{:<width$}", row.team);
        for (name, pct) in table.brackets.iter().zip(&row.percentages) {
            let col = name.chars().count().max(8);
            let cell = format!("{pct:.2}%");
            let _ = write!(out, " {cell:>col$}");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "({} iterations)", result.iterations);
    out
}

pub fn render_fixtures(fixtures: &[FixtureChoices]) -> String {
    let mut out = String::new();
    for f in fixtures {
        let _ = writeln!(
            out,
            "{} vs {} on {} (Bo{})",
            f.key.team_a, f.key.team_b, f.key.date, f.best_of
        );
        let _ = writeln!(out, "  key: {}", f.key.wire());
        for choice in &f.choices {
            let _ = writeln!(out, "    {:<10} {}", choice.code(), choice.label);
        }
    }
    out
}

pub fn render_report(report: &OddsReport) -> String {
    let mut out = String::new();
    match report.cutoff_date {
        Some(date) => {
            let _ = writeln!(out, "Standings as of {date}");
        }
        None => {
            let _ = writeln!(out, "Standings before any match");
        }
    }
    out.push_str(&render_standings(&report.standings));
    out.push('\n');
    let _ = writeln!(out, "Bracket odds ({} series left)", report.unplayed);
    out.push_str(&render_probabilities(&report.simulation));
    out
}

fn team_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0).max(4)
}
