use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bracket::{Bracket, classify};
use crate::error::{OddsError, Result};
use crate::outcome::{
    OutcomeChoice, OutcomeSelection, SeriesOutcome, enumerate_outcomes, ensure_valid_for,
    series_outcomes,
};
use crate::standings::{TeamState, compare_states};

// Iterations per worker task. Fixed so a seeded run gives the same table
// whatever the thread count.
const CHUNK_ITERATIONS: u32 = 512;

/// A regular-season series after the cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplayedMatch {
    pub team_a: String,
    pub team_b: String,
    pub date: NaiveDate,
    pub best_of: u32,
}

impl UnplayedMatch {
    pub fn key(&self) -> MatchKey {
        MatchKey {
            team_a: self.team_a.clone(),
            team_b: self.team_b.clone(),
            date: self.date,
        }
    }

    pub fn choices(&self) -> Result<Vec<OutcomeChoice>> {
        enumerate_outcomes(&self.team_a, &self.team_b, self.best_of)
    }
}

/// Identifies one scheduled series. Wire form is `team_a|team_b|YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub team_a: String,
    pub team_b: String,
    pub date: NaiveDate,
}

impl MatchKey {
    pub fn wire(&self) -> String {
        format!("{}|{}|{}", self.team_a, self.team_b, self.date.format("%Y-%m-%d"))
    }

    pub fn parse_wire(raw: &str) -> Option<Self> {
        let mut parts = raw.split('|');
        let team_a = parts.next()?.to_string();
        let team_b = parts.next()?.to_string();
        let date = NaiveDate::parse_from_str(parts.next()?.trim(), "%Y-%m-%d").ok()?;
        if parts.next().is_some() || team_a.is_empty() || team_b.is_empty() {
            return None;
        }
        Some(Self {
            team_a,
            team_b,
            date,
        })
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire())
    }
}

/// User overrides for unplayed series. Anything absent is `Random`.
#[derive(Debug, Clone, Default)]
pub struct ForcedOutcomes {
    map: HashMap<MatchKey, OutcomeSelection>,
}

impl ForcedOutcomes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: MatchKey, selection: OutcomeSelection) {
        self.map.insert(key, selection);
    }

    pub fn get(&self, key: &MatchKey) -> OutcomeSelection {
        self.map.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Decodes `key -> code` pairs in wire format. Any bad key or code fails
    /// the whole map.
    pub fn from_wire<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut out = Self::new();
        for (key, code) in pairs {
            let parsed = MatchKey::parse_wire(key)
                .ok_or_else(|| OddsError::decode(key, "match key must be team_a|team_b|YYYY-MM-DD"))?;
            out.insert(parsed, code.parse::<OutcomeSelection>()?);
        }
        Ok(out)
    }

    fn forced_keys(&self) -> impl Iterator<Item = &MatchKey> {
        self.map
            .iter()
            .filter(|(_, sel)| matches!(sel, OutcomeSelection::Forced(_)))
            .map(|(k, _)| k)
    }
}

/// Everything one simulation run reads. Nothing here is mutated.
#[derive(Debug, Clone, Copy)]
pub struct SimulationInput<'a> {
    pub teams: &'a [String],
    /// As-of-cutoff state, aligned with `teams`.
    pub baseline: &'a [TeamState],
    pub unplayed: &'a [UnplayedMatch],
    pub forced: &'a ForcedOutcomes,
    pub brackets: &'a [Bracket],
    pub iterations: u32,
    pub seed: Option<u64>,
    /// Worker threads; `None` uses the global rayon pool.
    pub parallelism: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOdds {
    pub team: String,
    /// Percent of iterations per bracket, same order as the bracket list,
    /// rounded to two decimals.
    pub percentages: Vec<f64>,
    /// Mean final match wins across iterations.
    pub expected_wins: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub brackets: Vec<String>,
    pub iterations: u32,
    /// One row per team, in input team order.
    pub teams: Vec<TeamOdds>,
}

impl SimulationResult {
    pub fn team(&self, name: &str) -> Option<&TeamOdds> {
        self.teams.iter().find(|t| t.team == name)
    }

    pub fn percentage(&self, team: &str, bracket: &str) -> Option<f64> {
        let b = self.brackets.iter().position(|n| n == bracket)?;
        self.team(team).map(|t| t.percentages[b])
    }
}

#[derive(Debug, Clone)]
enum Plan {
    Fixed(SeriesOutcome),
    Random(Vec<SeriesOutcome>),
}

#[derive(Debug, Clone)]
struct ResolvedMatch {
    a: usize,
    b: usize,
    plan: Plan,
}

#[derive(Debug, Clone)]
struct Tally {
    num_brackets: usize,
    // team-major: counts[team * num_brackets + bracket]
    counts: Vec<u64>,
    wins: Vec<u64>,
}

impl Tally {
    fn zeroed(num_teams: usize, num_brackets: usize) -> Self {
        Self {
            num_brackets,
            counts: vec![0; num_teams * num_brackets],
            wins: vec![0; num_teams],
        }
    }

    fn merge(mut self, other: Tally) -> Tally {
        for (x, y) in self.counts.iter_mut().zip(other.counts) {
            *x += y;
        }
        for (x, y) in self.wins.iter_mut().zip(other.wins) {
            *x += y;
        }
        self
    }
}

/// Completes the season `iterations` times and reports, per team, how often
/// its final rank fell in each bracket.
///
/// Ranking uses match wins, then game differential, then a uniform random
/// value drawn fresh for every team in every iteration. The same tie can
/// therefore resolve differently from one iteration to the next; that is the
/// intended Monte Carlo treatment of true ties, not a determinism bug.
pub fn run_monte_carlo(input: &SimulationInput<'_>) -> Result<SimulationResult> {
    if input.iterations == 0 {
        return Err(OddsError::InvalidConfig("iterations must be positive".to_string()));
    }
    if input.teams.len() != input.baseline.len() {
        return Err(OddsError::InvalidConfig(format!(
            "baseline has {} entries for {} teams",
            input.baseline.len(),
            input.teams.len()
        )));
    }

    let plans = resolve_plans(input)?;
    let random_matches = plans.iter().filter(|p| matches!(p.plan, Plan::Random(_))).count();
    let base_seed = input.seed.unwrap_or_else(rand::random::<u64>);
    let chunks = input.iterations.div_ceil(CHUNK_ITERATIONS);

    info!(
        teams = input.teams.len(),
        unplayed = plans.len(),
        random_matches,
        iterations = input.iterations,
        chunks,
        "starting monte carlo run"
    );

    let num_teams = input.teams.len();
    let num_brackets = input.brackets.len();
    let tally = with_sim_pool(input.parallelism, || {
        (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let start = chunk * CHUNK_ITERATIONS;
                let count = CHUNK_ITERATIONS.min(input.iterations - start);
                let seed = base_seed.wrapping_add(u64::from(chunk));
                run_chunk(input, &plans, count, seed)
            })
            .reduce(|| Tally::zeroed(num_teams, num_brackets), Tally::merge)
    });

    let n = f64::from(input.iterations);
    let teams = input
        .teams
        .iter()
        .enumerate()
        .map(|(t, name)| TeamOdds {
            team: name.clone(),
            percentages: (0..num_brackets)
                .map(|b| round2(tally.counts[t * num_brackets + b] as f64 / n * 100.0))
                .collect(),
            expected_wins: tally.wins[t] as f64 / n,
        })
        .collect();

    debug!(iterations = input.iterations, "monte carlo run finished");
    Ok(SimulationResult {
        brackets: input.brackets.iter().map(|b| b.name.clone()).collect(),
        iterations: input.iterations,
        teams,
    })
}

fn resolve_plans(input: &SimulationInput<'_>) -> Result<Vec<ResolvedMatch>> {
    let index: HashMap<&str, usize> = input
        .teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let known_keys: HashSet<MatchKey> = input.unplayed.iter().map(UnplayedMatch::key).collect();
    if let Some(stray) = input.forced.forced_keys().find(|k| !known_keys.contains(*k)) {
        return Err(OddsError::decode(
            stray.wire(),
            "forced outcome does not match any unplayed series",
        ));
    }

    let mut out = Vec::with_capacity(input.unplayed.len());
    for m in input.unplayed {
        let (Some(&a), Some(&b)) = (index.get(m.team_a.as_str()), index.get(m.team_b.as_str()))
        else {
            return Err(OddsError::InvalidConfig(format!(
                "unplayed match {} names a team outside the standings",
                m.key()
            )));
        };
        if a == b {
            return Err(OddsError::InvalidConfig(format!(
                "unplayed match {} pits a team against itself",
                m.key()
            )));
        }
        let plan = match input.forced.get(&m.key()) {
            OutcomeSelection::Random => Plan::Random(series_outcomes(m.best_of)?),
            OutcomeSelection::Forced(outcome) => {
                ensure_valid_for(&outcome, m.best_of)?;
                Plan::Fixed(outcome)
            }
        };
        out.push(ResolvedMatch { a, b, plan });
    }
    Ok(out)
}

fn run_chunk(input: &SimulationInput<'_>, plans: &[ResolvedMatch], count: u32, seed: u64) -> Tally {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_brackets = input.brackets.len();
    let mut tally = Tally::zeroed(input.teams.len(), num_brackets);
    let mut states = input.baseline.to_vec();
    let mut order: Vec<(usize, f64)> = Vec::with_capacity(states.len());

    for _ in 0..count {
        states.copy_from_slice(input.baseline);

        for m in plans {
            let outcome = match &m.plan {
                Plan::Fixed(o) => *o,
                // series_outcomes never returns an empty list
                Plan::Random(choices) => match choices.choose(&mut rng) {
                    Some(o) => *o,
                    None => continue,
                },
            };
            let (lo, hi) = (m.a.min(m.b), m.a.max(m.b));
            let (left, right) = states.split_at_mut(hi);
            let (first, second) = (&mut left[lo], &mut right[0]);
            if m.a < m.b {
                outcome.apply(first, second);
            } else {
                outcome.apply(second, first);
            }
        }

        order.clear();
        order.extend((0..states.len()).map(|t| (t, rng.gen_range(0.0..1.0))));
        order.sort_unstable_by(|x, y| {
            compare_states(&states[x.0], &states[y.0]).then(y.1.total_cmp(&x.1))
        });

        for (pos, &(team, _)) in order.iter().enumerate() {
            if let Some(b) = classify(pos as u32 + 1, input.brackets) {
                tally.counts[team * num_brackets + b] += 1;
            }
            tally.wins[team] += u64::from(states[team].wins);
        }
    }
    tally
}

fn with_sim_pool<T>(threads: Option<usize>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let Some(threads) = threads else {
        return action();
    };
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
