use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{OddsError, Result};
use crate::match_parse::MatchRecord;

pub const WEEK_GAP_DAYS: i64 = 2;

/// A run of match dates where each date is at most the gap threshold after
/// the previous one. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBlock {
    dates: Vec<NaiveDate>,
}

impl WeekBlock {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn label(&self, index: usize) -> String {
        if self.dates.len() == 1 {
            format!("Week {} ({})", index + 1, self.first())
        } else {
            format!("Week {} ({} to {})", index + 1, self.first(), self.last())
        }
    }
}

/// Which matches count as already played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cutoff {
    NothingPlayed,
    /// Index into the week-block list; the whole week counts as played.
    Week(usize),
}

impl Cutoff {
    /// `none` / `start` select the pre-season sentinel, anything else must be a
    /// zero-based week index.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("start") {
            return Some(Cutoff::NothingPlayed);
        }
        s.parse::<usize>().ok().map(Cutoff::Week)
    }
}

pub fn distinct_dates(matches: &[MatchRecord]) -> Vec<NaiveDate> {
    matches
        .iter()
        .map(|m| m.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Single pass over sorted distinct dates; a date joins the current block when
/// it is within `gap_days` of the date before it.
pub fn block_weeks(dates: &[NaiveDate], gap_days: i64) -> Vec<WeekBlock> {
    let mut blocks: Vec<WeekBlock> = Vec::new();
    let mut prev: Option<NaiveDate> = None;
    for &date in dates {
        match (prev, blocks.last_mut()) {
            (Some(p), Some(block)) if (date - p).num_days() <= gap_days => {
                block.dates.push(date);
            }
            _ => blocks.push(WeekBlock { dates: vec![date] }),
        }
        prev = Some(date);
    }
    blocks
}

/// Last date treated as played, or `None` when nothing has been played.
pub fn cutoff_date(blocks: &[WeekBlock], cutoff: Cutoff) -> Result<Option<NaiveDate>> {
    match cutoff {
        Cutoff::NothingPlayed => Ok(None),
        Cutoff::Week(index) => blocks
            .get(index)
            .map(|b| Some(b.last()))
            .ok_or(OddsError::InvalidCutoff {
                index,
                weeks: blocks.len(),
            }),
    }
}

pub fn is_played(date: NaiveDate, cutoff: Option<NaiveDate>) -> bool {
    cutoff.is_some_and(|c| date <= c)
}
