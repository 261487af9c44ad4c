use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::{Duration, NaiveDate};
use mlbb_playoff_odds::bracket::default_brackets;
use mlbb_playoff_odds::match_parse::parse_matches_json;
use mlbb_playoff_odds::simulate::{ForcedOutcomes, SimulationInput, UnplayedMatch, run_monte_carlo};
use mlbb_playoff_odds::standings::TeamState;
use mlbb_playoff_odds::team_alias::TeamAliases;

const TEAMS: usize = 9;

fn team_names() -> Vec<String> {
    (0..TEAMS).map(|i| format!("Team {i}")).collect()
}

fn double_round_robin(teams: &[String]) -> Vec<UnplayedMatch> {
    let start = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
    let mut out = Vec::new();
    for leg in 0..2 {
        for i in 0..teams.len() {
            for j in (i + 1)..teams.len() {
                let (a, b) = if leg == 0 { (i, j) } else { (j, i) };
                out.push(UnplayedMatch {
                    team_a: teams[a].clone(),
                    team_b: teams[b].clone(),
                    date: start + Duration::days(out.len() as i64 / 4),
                    best_of: 3,
                });
            }
        }
    }
    out
}

fn sample_matches_json(fixtures: &[UnplayedMatch]) -> String {
    let records: Vec<serde_json::Value> = fixtures
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let (winner, score_a, score_b) = if i % 2 == 0 { ("1", 2, 0) } else { ("2", 1, 2) };
            serde_json::json!({
                "parent": "MPL/Indonesia/Season_16",
                "date": format!("{} 17:00:00", m.date),
                "bestof": m.best_of,
                "winner": winner,
                "section": "Regular Season",
                "match2opponents": [
                    {"name": m.team_a, "score": score_a},
                    {"name": m.team_b, "score": score_b},
                ],
            })
        })
        .collect();
    serde_json::json!({ "result": records }).to_string()
}

fn bench_parse_matches(c: &mut Criterion) {
    let raw = sample_matches_json(&double_round_robin(&team_names()));
    let aliases = TeamAliases::builtin();
    c.bench_function("parse_matches_json", |b| {
        b.iter(|| {
            let matches = parse_matches_json(black_box(&raw), &aliases, None).unwrap();
            black_box(matches.len());
        })
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let teams = team_names();
    let unplayed = double_round_robin(&teams);
    let baseline = vec![TeamState::default(); teams.len()];
    let forced = ForcedOutcomes::new();
    let brackets = default_brackets();
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(10);
    group.bench_function("season_10k", |b| {
        b.iter(|| {
            let result = run_monte_carlo(&SimulationInput {
                teams: &teams,
                baseline: &baseline,
                unplayed: &unplayed,
                forced: &forced,
                brackets: &brackets,
                iterations: 10_000,
                seed: Some(1),
                parallelism: None,
            })
            .unwrap();
            black_box(result.teams.len());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse_matches, bench_monte_carlo);
criterion_main!(benches);
