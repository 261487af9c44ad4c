use chrono::NaiveDate;
use mlbb_playoff_odds::ErrorKind;
use mlbb_playoff_odds::bracket::{Bracket, default_brackets};
use mlbb_playoff_odds::outcome::{OutcomeSelection, SeriesOutcome, Side};
use mlbb_playoff_odds::simulate::{
    ForcedOutcomes, SimulationInput, SimulationResult, UnplayedMatch, run_monte_carlo,
};
use mlbb_playoff_odds::standings::TeamState;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn state(wins: u32, game_diff: i32) -> TeamState {
    TeamState { wins, game_diff }
}

fn fixture(a: &str, b: &str, day: u32, best_of: u32) -> UnplayedMatch {
    UnplayedMatch {
        team_a: a.to_string(),
        team_b: b.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
        best_of,
    }
}

fn round_robin(teams: &[String], best_of: u32) -> Vec<UnplayedMatch> {
    let mut out = Vec::new();
    let mut day = 1;
    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            out.push(fixture(&teams[i], &teams[j], day, best_of));
            day += 1;
        }
    }
    out
}

fn top_two() -> Vec<Bracket> {
    vec![Bracket::new("Top 2", 1, Some(2)), Bracket::new("Rest", 3, None)]
}

struct Run {
    teams: Vec<String>,
    baseline: Vec<TeamState>,
    unplayed: Vec<UnplayedMatch>,
    forced: ForcedOutcomes,
    brackets: Vec<Bracket>,
}

impl Run {
    fn go(&self, iterations: u32, seed: Option<u64>, parallelism: Option<usize>) -> SimulationResult {
        run_monte_carlo(&SimulationInput {
            teams: &self.teams,
            baseline: &self.baseline,
            unplayed: &self.unplayed,
            forced: &self.forced,
            brackets: &self.brackets,
            iterations,
            seed,
            parallelism,
        })
        .expect("simulation should run")
    }
}

#[test]
fn completed_round_robin_is_certain() {
    let run = Run {
        teams: names(&["A", "B", "C", "D"]),
        baseline: vec![state(3, 6), state(2, 2), state(1, -2), state(0, -6)],
        unplayed: Vec::new(),
        forced: ForcedOutcomes::new(),
        brackets: top_two(),
    };
    let result = run.go(1_000, Some(1), None);
    assert_eq!(result.percentage("A", "Top 2"), Some(100.0));
    assert_eq!(result.percentage("B", "Top 2"), Some(100.0));
    assert_eq!(result.percentage("C", "Rest"), Some(100.0));
    assert_eq!(result.percentage("D", "Top 2"), Some(0.0));
    assert_eq!(result.team("A").map(|t| t.expected_wins), Some(3.0));
}

#[test]
fn exact_tie_splits_evenly() {
    let run = Run {
        teams: names(&["A", "B", "C"]),
        baseline: vec![state(2, 3), state(2, 3), state(0, -6)],
        unplayed: Vec::new(),
        forced: ForcedOutcomes::new(),
        brackets: vec![Bracket::new("First", 1, Some(1)), Bracket::new("Other", 2, None)],
    };
    let result = run.go(20_000, Some(42), None);
    let a = result.percentage("A", "First").unwrap();
    let b = result.percentage("B", "First").unwrap();
    assert!((a - 50.0).abs() < 2.0, "A first {a}");
    assert!((a + b - 100.0).abs() < 0.02);
    assert_eq!(result.percentage("C", "Other"), Some(100.0));
}

#[test]
fn fully_forced_season_is_deterministic() {
    let teams = names(&["A", "B", "C", "D"]);
    let unplayed = round_robin(&teams, 3);
    let mut forced = ForcedOutcomes::new();
    for m in &unplayed {
        // earlier alphabet always wins, so A 3-0, B 2-1, C 1-2, D 0-3
        forced.insert(m.key(), OutcomeSelection::Forced(SeriesOutcome::win(Side::A, 2, 1)));
    }
    let run = Run {
        baseline: vec![TeamState::default(); teams.len()],
        teams,
        unplayed,
        forced,
        brackets: default_brackets(),
    };

    let first = run.go(1_000, None, None);
    let second = run.go(1_000, None, Some(2));
    assert_eq!(first, second);
    assert_eq!(first.percentage("A", "Upper Bracket"), Some(100.0));
    assert_eq!(first.percentage("B", "Upper Bracket"), Some(100.0));
    assert_eq!(first.percentage("C", "Lower Bracket"), Some(100.0));
    assert_eq!(first.percentage("D", "Lower Bracket"), Some(100.0));
    assert_eq!(first.team("B").map(|t| t.expected_wins), Some(2.0));
}

#[test]
fn seeded_runs_ignore_thread_count() {
    let teams = names(&["A", "B", "C", "D", "E", "F"]);
    let run = Run {
        baseline: vec![TeamState::default(); teams.len()],
        unplayed: round_robin(&teams, 3),
        teams,
        forced: ForcedOutcomes::new(),
        brackets: default_brackets(),
    };
    let single = run.go(5_000, Some(99), Some(1));
    let many = run.go(5_000, Some(99), Some(4));
    assert_eq!(single, many);
}

#[test]
fn random_series_give_unbiased_expected_wins() {
    let teams = names(&["A", "B", "C", "D"]);
    let run = Run {
        baseline: vec![TeamState::default(); teams.len()],
        unplayed: round_robin(&teams, 3),
        teams,
        forced: ForcedOutcomes::new(),
        brackets: default_brackets(),
    };
    let result = run.go(50_000, Some(2025), None);
    for team in &result.teams {
        assert!(
            (team.expected_wins - 1.5).abs() < 0.05,
            "{} expected wins {}",
            team.team,
            team.expected_wins
        );
    }
}

#[test]
fn percentages_never_exceed_one_hundred() {
    let teams = names(&["A", "B", "C", "D", "E", "F", "G", "H"]);
    let run = Run {
        baseline: vec![TeamState::default(); teams.len()],
        unplayed: round_robin(&teams, 2),
        teams,
        forced: ForcedOutcomes::new(),
        brackets: default_brackets(),
    };
    let result = run.go(3_000, Some(5), None);
    for team in &result.teams {
        let total: f64 = team.percentages.iter().sum();
        assert!(total <= 100.0 + 0.03, "{} sums to {total}", team.team);
        assert!(team.percentages.iter().all(|p| (0.0..=100.0).contains(p)));
    }
}

#[test]
fn forced_key_without_fixture_is_rejected() {
    let teams = names(&["A", "B"]);
    let forced = ForcedOutcomes::from_wire([("A|B|2025-12-01", "A_2-0")]).unwrap();
    let run_input = SimulationInput {
        teams: &teams,
        baseline: &[TeamState::default(), TeamState::default()],
        unplayed: &[fixture("A", "B", 1, 3)],
        forced: &forced,
        brackets: &top_two(),
        iterations: 1_000,
        seed: Some(1),
        parallelism: None,
    };
    let err = run_monte_carlo(&run_input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutcomeDecode);
}

#[test]
fn stale_random_entry_is_ignored() {
    let teams = names(&["A", "B"]);
    let forced = ForcedOutcomes::from_wire([("A|B|2025-12-01", "random")]).unwrap();
    let run = Run {
        baseline: vec![TeamState::default(); 2],
        teams,
        unplayed: vec![fixture("A", "B", 1, 3)],
        forced,
        brackets: top_two(),
    };
    let result = run.go(1_000, Some(3), None);
    assert_eq!(result.percentage("A", "Top 2"), Some(100.0));
}

#[test]
fn forced_outcome_must_fit_best_of() {
    let teams = names(&["A", "B"]);
    let mut forced = ForcedOutcomes::new();
    let m = fixture("A", "B", 1, 3);
    forced.insert(m.key(), OutcomeSelection::Forced(SeriesOutcome::win(Side::B, 4, 1)));
    let input = SimulationInput {
        teams: &teams,
        baseline: &[TeamState::default(), TeamState::default()],
        unplayed: &[m],
        forced: &forced,
        brackets: &top_two(),
        iterations: 1_000,
        seed: Some(1),
        parallelism: None,
    };
    assert!(run_monte_carlo(&input).is_err());
}
