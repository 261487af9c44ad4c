use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{OddsError, Result};
use crate::team_alias::TeamAliases;

pub const DEFAULT_BEST_OF: u32 = 3;
const PLAYOFF_SECTION: &str = "playoffs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Unknown,
    TeamA,
    TeamB,
}

/// One series, normalized. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub team_a: String,
    pub team_b: String,
    pub best_of: u32,
    pub winner: Winner,
    pub score_a: u32,
    pub score_b: u32,
    pub is_playoff: bool,
}

impl MatchRecord {
    pub fn winner_name(&self) -> Option<&str> {
        match self.winner {
            Winner::TeamA => Some(&self.team_a),
            Winner::TeamB => Some(&self.team_b),
            Winner::Unknown => None,
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team_a == team || self.team_b == team
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    NotTwoOpponents,
    BadDate,
    EmptyTeam,
    SameTeam,
}

/// Accepts the raw API envelope (`{"result": [...]}`), a bare array, or `null`.
pub fn parse_matches_json(
    raw: &str,
    aliases: &TeamAliases,
    expected_parent: Option<&str>,
) -> Result<Vec<MatchRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed)?;
    let records = match &v {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => v
            .get("result")
            .and_then(|r| r.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };
    parse_matches(records, aliases, expected_parent)
}

/// Normalizes raw match records into a date-sorted list. Malformed records are
/// skipped; records from more than one parent tournament fail the whole batch.
pub fn parse_matches(
    records: &[Value],
    aliases: &TeamAliases,
    expected_parent: Option<&str>,
) -> Result<Vec<MatchRecord>> {
    check_single_parent(records, expected_parent)?;

    let mut out = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for (idx, item) in records.iter().enumerate() {
        match parse_match_record(item, aliases) {
            Ok(m) => out.push(m),
            Err(reason) => {
                skipped += 1;
                debug!(record = idx, ?reason, "skipping match record");
            }
        }
    }

    out.sort_by_key(|m| m.date);
    info!(parsed = out.len(), skipped, "parsed match records");
    Ok(out)
}

/// Regular-season matches only; the simulator never sees playoff series.
pub fn regular_season(matches: &[MatchRecord]) -> Vec<MatchRecord> {
    matches.iter().filter(|m| !m.is_playoff).cloned().collect()
}

fn check_single_parent(records: &[Value], expected: Option<&str>) -> Result<()> {
    let parents: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.get("parent").and_then(|p| p.as_str()))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(expected) = expected.map(str::trim).filter(|e| !e.is_empty()) {
        if let Some(found) = parents.iter().find(|p| **p != expected) {
            return Err(OddsError::TournamentMismatch {
                expected: expected.to_string(),
                found: (*found).to_string(),
            });
        }
        return Ok(());
    }

    let mut iter = parents.iter();
    if let (Some(first), Some(second)) = (iter.next(), iter.next()) {
        return Err(OddsError::TournamentMismatch {
            expected: (*first).to_string(),
            found: (*second).to_string(),
        });
    }
    Ok(())
}

fn parse_match_record(v: &Value, aliases: &TeamAliases) -> std::result::Result<MatchRecord, SkipReason> {
    let opponents = v
        .get("match2opponents")
        .and_then(|x| x.as_array())
        .filter(|a| a.len() == 2)
        .ok_or(SkipReason::NotTwoOpponents)?;

    let date = v
        .get("date")
        .and_then(|x| x.as_str())
        .and_then(parse_match_date)
        .ok_or(SkipReason::BadDate)?;

    let team_a = opponent_name(&opponents[0], aliases).ok_or(SkipReason::EmptyTeam)?;
    let team_b = opponent_name(&opponents[1], aliases).ok_or(SkipReason::EmptyTeam)?;
    if team_a == team_b {
        return Err(SkipReason::SameTeam);
    }

    let best_of = v
        .get("bestof")
        .and_then(value_as_u32)
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_BEST_OF);

    let winner = match v.get("winner").and_then(value_as_u32) {
        Some(1) => Winner::TeamA,
        Some(2) => Winner::TeamB,
        _ => Winner::Unknown,
    };

    let is_playoff = section_label(v).is_some_and(|s| s.trim().eq_ignore_ascii_case(PLAYOFF_SECTION));

    Ok(MatchRecord {
        date,
        team_a,
        team_b,
        best_of,
        winner,
        score_a: opponent_score(&opponents[0]),
        score_b: opponent_score(&opponents[1]),
        is_playoff,
    })
}

fn opponent_name(opp: &Value, aliases: &TeamAliases) -> Option<String> {
    let raw = opp.get("name").and_then(|x| x.as_str())?;
    aliases.canonical(raw)
}

// Walkovers come through as -1; anything unreadable counts as zero games.
fn opponent_score(opp: &Value) -> u32 {
    match opp.get("score") {
        Some(Value::Number(n)) => n.as_i64().map(|s| s.max(0) as u32).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(|s| s.max(0) as u32).unwrap_or(0),
        _ => 0,
    }
}

fn section_label(v: &Value) -> Option<&str> {
    v.get("section")
        .and_then(|x| x.as_str())
        .or_else(|| v.get("stage").and_then(|x| x.as_str()))
        .or_else(|| {
            v.get("extradata")
                .and_then(|e| e.get("stage"))
                .and_then(|x| x.as_str())
        })
}

fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` with or without a trailing time part.
pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(a: &str, b: &str, date: &str) -> Value {
        json!({
            "match2opponents": [{"name": a, "score": 2}, {"name": b, "score": 1}],
            "date": date,
            "bestof": 3,
            "winner": "1",
        })
    }

    #[test]
    fn parse_match_date_accepts_datetime_suffix() {
        let d = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        assert_eq!(parse_match_date("2025-08-15 17:00:00"), Some(d));
        assert_eq!(parse_match_date("2025-08-15T17:00:00Z"), Some(d));
        assert_eq!(parse_match_date("2025-08-15"), Some(d));
        assert_eq!(parse_match_date("soon"), None);
    }

    #[test]
    fn skips_malformed_records_without_failing_batch() {
        let records = vec![
            record("ONIC", "RRQ Hoshi", "2025-08-15 17:00:00"),
            json!({"match2opponents": [{"name": "ONIC"}], "date": "2025-08-16"}),
            record("ONIC", "EVOS Glory", "not-a-date"),
            record("  ", "EVOS Glory", "2025-08-16"),
            record("RRQ", "RRQ Hoshi", "2025-08-16"),
        ];
        let out = parse_matches(&records, &TeamAliases::builtin(), None).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].team_b, "RRQ Hoshi");
    }

    #[test]
    fn defaults_and_flags() {
        let records = vec![
            json!({
                "match2opponents": [{"name": "A", "score": "-1"}, {"name": "B", "score": 0}],
                "date": "2025-09-02",
                "winner": "",
                "section": "Playoffs",
            }),
            json!({
                "match2opponents": [{"name": "C", "score": 1}, {"name": "D", "score": 2}],
                "date": "2025-09-01",
                "bestof": "5",
                "winner": 2,
                "section": "Regular Season",
            }),
        ];
        let out = parse_matches(&records, &TeamAliases::empty(), None).unwrap();
        assert_eq!(out[0].team_a, "C");
        assert_eq!(out[0].best_of, 5);
        assert_eq!(out[0].winner, Winner::TeamB);
        assert!(!out[0].is_playoff);

        assert_eq!(out[1].best_of, DEFAULT_BEST_OF);
        assert_eq!(out[1].winner, Winner::Unknown);
        assert_eq!(out[1].score_a, 0);
        assert!(out[1].is_playoff);
    }

    #[test]
    fn mixed_parents_are_rejected() {
        let mut a = record("A", "B", "2025-08-15");
        a["parent"] = json!("MPL/Indonesia/Season_16");
        let mut b = record("C", "D", "2025-08-16");
        b["parent"] = json!("MPL/Philippines/Season_16");

        let err = parse_matches(&[a.clone(), b], &TeamAliases::empty(), None).unwrap_err();
        assert!(matches!(err, OddsError::TournamentMismatch { .. }));

        let err = parse_matches(&[a.clone()], &TeamAliases::empty(), Some("MPL/MENA/Season_8"))
            .unwrap_err();
        assert!(matches!(err, OddsError::TournamentMismatch { .. }));

        let ok = parse_matches(&[a], &TeamAliases::empty(), Some("MPL/Indonesia/Season_16")).unwrap();
        assert_eq!(ok.len(), 1);
    }
}
