use serde::{Deserialize, Serialize};

/// A named band of final ranks. `end_rank: None` is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub name: String,
    pub start_rank: u32,
    #[serde(default)]
    pub end_rank: Option<u32>,
}

impl Bracket {
    pub fn new(name: &str, start_rank: u32, end_rank: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            start_rank,
            end_rank,
        }
    }

    pub fn contains(&self, rank: u32) -> bool {
        rank >= self.start_rank && self.end_rank.is_none_or(|end| rank <= end)
    }

    pub fn range_label(&self) -> String {
        match self.end_rank {
            Some(end) if end == self.start_rank => format!("{end}"),
            Some(end) => format!("{}-{}", self.start_rank, end),
            None => format!("{}+", self.start_rank),
        }
    }
}

pub fn default_brackets() -> Vec<Bracket> {
    vec![
        Bracket::new("Upper Bracket", 1, Some(2)),
        Bracket::new("Lower Bracket", 3, Some(6)),
        Bracket::new("Eliminated", 7, None),
    ]
}

/// Index of the first bracket (in configured order) containing `rank`.
pub fn classify(rank: u32, brackets: &[Bracket]) -> Option<usize> {
    brackets.iter().position(|b| b.contains(rank))
}

pub fn classify_name(rank: u32, brackets: &[Bracket]) -> Option<&str> {
    classify(rank, brackets).map(|i| brackets[i].name.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketIssue {
    /// `start_rank` is zero or after `end_rank`.
    EmptyRange { bracket: String },
    /// Rank claimed by more than one bracket; the first one wins.
    Overlap { rank: u32, first: String, second: String },
    /// Rank that no bracket claims.
    Gap { rank: u32 },
}

/// Checks brackets against ranks `1..=num_teams`. Purely advisory: the
/// classifier keeps first-match-wins semantics whatever this returns.
pub fn validate_brackets(brackets: &[Bracket], num_teams: usize) -> Vec<BracketIssue> {
    let mut issues = Vec::new();
    for b in brackets {
        if b.start_rank == 0 || b.end_rank.is_some_and(|end| end < b.start_rank) {
            issues.push(BracketIssue::EmptyRange {
                bracket: b.name.clone(),
            });
        }
    }
    for rank in 1..=num_teams as u32 {
        let mut owners = brackets.iter().filter(|b| b.contains(rank));
        match (owners.next(), owners.next()) {
            (None, _) => issues.push(BracketIssue::Gap { rank }),
            (Some(first), Some(second)) => issues.push(BracketIssue::Overlap {
                rank,
                first: first.name.clone(),
                second: second.name.clone(),
            }),
            _ => {}
        }
    }
    issues
}
