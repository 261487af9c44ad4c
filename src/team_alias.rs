use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// Rebrands seen across MPL seasons. Keys are compared case-insensitively.
static BUILTIN_ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("ECHO", "Team Liquid PH"),
        ("ECHO Philippines", "Team Liquid PH"),
        ("Team Liquid Philippines", "Team Liquid PH"),
        ("EVOS Legends", "EVOS Glory"),
        ("EVOS Esports", "EVOS Glory"),
        ("RRQ", "RRQ Hoshi"),
        ("Aura Fire", "Team Liquid ID"),
        ("Team Liquid Indonesia", "Team Liquid ID"),
        ("Fnatic ONIC", "Fnatic ONIC PH"),
        ("Smart Omega", "Omega Esports"),
    ]
});

/// Alias -> canonical team name lookup. Injected into the parser so the same
/// code serves any tournament.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct TeamAliases {
    map: HashMap<String, String>,
}

impl TeamAliases {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut out = Self::empty();
        for (alias, canonical) in BUILTIN_ALIASES.iter() {
            out.insert(alias, canonical);
        }
        out
    }

    pub fn insert(&mut self, alias: &str, canonical: &str) {
        let key = alias.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.map.insert(key, canonical.trim().to_string());
    }

    /// Entries in `other` win over existing ones.
    pub fn merged_with(mut self, other: &TeamAliases) -> Self {
        for (alias, canonical) in &other.map {
            self.insert(alias, canonical);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Trims the raw name and maps it through the alias table. Returns `None`
    /// when nothing is left after trimming.
    pub fn canonical(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let resolved = self
            .map
            .get(&trimmed.to_lowercase())
            .map(String::as_str)
            .unwrap_or(trimmed);
        let resolved = resolved.trim();
        if resolved.is_empty() {
            None
        } else {
            Some(resolved.to_string())
        }
    }
}

impl From<HashMap<String, String>> for TeamAliases {
    fn from(raw: HashMap<String, String>) -> Self {
        let mut out = Self::empty();
        for (alias, canonical) in &raw {
            out.insert(alias, canonical);
        }
        out
    }
}

impl From<TeamAliases> for HashMap<String, String> {
    fn from(aliases: TeamAliases) -> Self {
        aliases.map
    }
}
