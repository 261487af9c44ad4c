use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, default_brackets};
use crate::error::{OddsError, Result};
use crate::schedule::WEEK_GAP_DAYS;
use crate::team_alias::TeamAliases;

pub const DEFAULT_ITERATIONS: u32 = 10_000;
pub const MIN_ITERATIONS: u32 = 1_000;
pub const MAX_ITERATIONS: u32 = 50_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub iterations: u32,
    pub brackets: Vec<Bracket>,
    /// Merged over the built-in alias table.
    pub aliases: TeamAliases,
    pub week_gap_days: i64,
    pub seed: Option<u64>,
    pub expected_parent: Option<String>,
    pub parallelism: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            brackets: default_brackets(),
            aliases: TeamAliases::empty(),
            week_gap_days: WEEK_GAP_DAYS,
            seed: None,
            expected_parent: None,
            parallelism: None,
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: SimConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// `SIM_ITERATIONS`, `SIM_SEED` and `SIM_PARALLELISM` replace file values
    /// when they parse; anything else is ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(n) = lookup("SIM_ITERATIONS").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.iterations = n;
        }
        if let Some(seed) = lookup("SIM_SEED").and_then(|v| v.trim().parse::<u64>().ok()) {
            self.seed = Some(seed);
        }
        if let Some(threads) = lookup("SIM_PARALLELISM").and_then(|v| v.trim().parse::<usize>().ok())
        {
            self.parallelism = Some(threads.clamp(1, 64));
        }
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS)
    }

    pub fn team_aliases(&self) -> TeamAliases {
        TeamAliases::builtin().merged_with(&self.aliases)
    }

    pub fn validate(&self) -> Result<()> {
        if self.brackets.is_empty() {
            return Err(OddsError::InvalidConfig("at least one bracket is required".to_string()));
        }
        for b in &self.brackets {
            if b.name.trim().is_empty() {
                return Err(OddsError::InvalidConfig("bracket names must not be empty".to_string()));
            }
            if b.start_rank == 0 {
                return Err(OddsError::InvalidConfig(format!(
                    "bracket {:?} starts at rank 0; ranks are 1-based",
                    b.name
                )));
            }
            if b.end_rank.is_some_and(|end| end < b.start_rank) {
                return Err(OddsError::InvalidConfig(format!(
                    "bracket {:?} ends before it starts",
                    b.name
                )));
            }
        }
        if self.week_gap_days < 0 {
            return Err(OddsError::InvalidConfig("week_gap_days must be >= 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SimConfig = serde_json::from_str(
            r#"{"iterations": 500, "aliases": {"Old Name": "New Name"},
                "brackets": [{"name": "Playoffs", "start_rank": 1, "end_rank": 6},
                             {"name": "Out", "start_rank": 7, "end_rank": null}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.iterations(), MIN_ITERATIONS);
        assert_eq!(cfg.week_gap_days, WEEK_GAP_DAYS);
        assert_eq!(cfg.brackets[1].end_rank, None);
        assert_eq!(cfg.team_aliases().canonical("old name").as_deref(), Some("New Name"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_style_overrides() {
        let cfg = SimConfig::default().with_overrides(|key| match key {
            "SIM_ITERATIONS" => Some("90000".to_string()),
            "SIM_SEED" => Some("42".to_string()),
            "SIM_PARALLELISM" => Some("abc".to_string()),
            _ => None,
        });
        assert_eq!(cfg.iterations(), MAX_ITERATIONS);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.parallelism, None);
    }

    #[test]
    fn validate_rejects_inverted_bracket() {
        let mut cfg = SimConfig::default();
        cfg.brackets.push(Bracket::new("Broken", 5, Some(2)));
        assert!(matches!(cfg.validate(), Err(OddsError::InvalidConfig(_))));
    }
}
