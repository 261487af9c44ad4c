use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OddsError, Result};
use crate::standings::TeamState;

pub const RANDOM_CODE: &str = "random";
pub const RANDOM_LABEL: &str = "Random";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    fn code(self) -> char {
        match self {
            Side::A => 'A',
            Side::B => 'B',
        }
    }
}

/// Final score of one series. Scores are games won within the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesOutcome {
    Win {
        side: Side,
        winner_games: u32,
        loser_games: u32,
    },
    /// Only reachable in best-of-2.
    Draw { games: u32 },
}

impl SeriesOutcome {
    pub fn win(side: Side, winner_games: u32, loser_games: u32) -> Self {
        SeriesOutcome::Win {
            side,
            winner_games,
            loser_games,
        }
    }

    /// Wire code: `A_2-1`, `B_3-0`, or `D_1-1` for a best-of-2 split.
    pub fn code(&self) -> String {
        match *self {
            SeriesOutcome::Win {
                side,
                winner_games,
                loser_games,
            } => format!("{}_{}-{}", side.code(), winner_games, loser_games),
            SeriesOutcome::Draw { games } => format!("D_{games}-{games}"),
        }
    }

    pub fn label(&self, team_a: &str, team_b: &str) -> String {
        match *self {
            SeriesOutcome::Win {
                side,
                winner_games,
                loser_games,
            } => {
                let team = match side {
                    Side::A => team_a,
                    Side::B => team_b,
                };
                format!("{team} {winner_games}–{loser_games}")
            }
            SeriesOutcome::Draw { games } => format!("Draw {games}–{games}"),
        }
    }

    /// Games won by side A and side B.
    pub fn scores(&self) -> (u32, u32) {
        match *self {
            SeriesOutcome::Win {
                side: Side::A,
                winner_games,
                loser_games,
            } => (winner_games, loser_games),
            SeriesOutcome::Win {
                side: Side::B,
                winner_games,
                loser_games,
            } => (loser_games, winner_games),
            SeriesOutcome::Draw { games } => (games, games),
        }
    }

    /// One match win to the winner, the game margin to its differential and
    /// the negated margin to the loser's. Draws change nothing.
    pub fn apply(&self, team_a: &mut TeamState, team_b: &mut TeamState) {
        let SeriesOutcome::Win {
            side,
            winner_games,
            loser_games,
        } = *self
        else {
            return;
        };
        let margin = winner_games as i32 - loser_games as i32;
        let (winner, loser) = match side {
            Side::A => (team_a, team_b),
            Side::B => (team_b, team_a),
        };
        winner.wins += 1;
        winner.game_diff += margin;
        loser.game_diff -= margin;
    }
}

impl fmt::Display for SeriesOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl FromStr for SeriesOutcome {
    type Err = OddsError;

    fn from_str(raw: &str) -> Result<Self> {
        let code = raw.trim();
        let (prefix, score) = code
            .split_once('_')
            .ok_or_else(|| OddsError::decode(code, "expected <side>_<w>-<l>"))?;
        let (w, l) = score
            .split_once('-')
            .ok_or_else(|| OddsError::decode(code, "expected <w>-<l> score"))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|_| OddsError::decode(code, "winner score is not a number"))?;
        let l = l
            .trim()
            .parse::<u32>()
            .map_err(|_| OddsError::decode(code, "loser score is not a number"))?;

        match prefix {
            "A" | "B" => {
                if w <= l {
                    return Err(OddsError::decode(code, "winner must take more games"));
                }
                let side = if prefix == "A" { Side::A } else { Side::B };
                Ok(SeriesOutcome::win(side, w, l))
            }
            "D" => {
                if w != l {
                    return Err(OddsError::decode(code, "a draw needs level scores"));
                }
                Ok(SeriesOutcome::Draw { games: w })
            }
            _ => Err(OddsError::decode(code, "side must be A, B or D")),
        }
    }
}

/// A user's choice for one unplayed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutcomeSelection {
    #[default]
    Random,
    Forced(SeriesOutcome),
}

impl OutcomeSelection {
    pub fn code(&self) -> String {
        match self {
            OutcomeSelection::Random => RANDOM_CODE.to_string(),
            OutcomeSelection::Forced(o) => o.code(),
        }
    }
}

impl FromStr for OutcomeSelection {
    type Err = OddsError;

    fn from_str(raw: &str) -> Result<Self> {
        if raw.trim().eq_ignore_ascii_case(RANDOM_CODE) {
            return Ok(OutcomeSelection::Random);
        }
        raw.parse::<SeriesOutcome>().map(OutcomeSelection::Forced)
    }
}

/// One entry of a match's choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeChoice {
    pub label: String,
    pub selection: OutcomeSelection,
}

impl OutcomeChoice {
    pub fn code(&self) -> String {
        self.selection.code()
    }
}

/// Every concrete final score a best-of-`n` series can end on.
///
/// Odd `n` needs `(n + 1) / 2` wins and the loser can take `0..wins` games.
/// Best-of-2 has exactly three results including the 1-1 draw. Best-of-1 and
/// other even lengths collapse to a single win per side.
pub fn series_outcomes(best_of: u32) -> Result<Vec<SeriesOutcome>> {
    match best_of {
        0 => Err(OddsError::UnsupportedBestOf(best_of)),
        2 => Ok(vec![
            SeriesOutcome::win(Side::A, 2, 0),
            SeriesOutcome::Draw { games: 1 },
            SeriesOutcome::win(Side::B, 2, 0),
        ]),
        n if n >= 3 && n % 2 == 1 => {
            let need = n.div_ceil(2);
            let mut out = Vec::with_capacity(2 * need as usize);
            for side in [Side::A, Side::B] {
                for lost in 0..need {
                    out.push(SeriesOutcome::win(side, need, lost));
                }
            }
            Ok(out)
        }
        _ => Ok(vec![
            SeriesOutcome::win(Side::A, 1, 0),
            SeriesOutcome::win(Side::B, 1, 0),
        ]),
    }
}

/// Choice list for a host UI: the `Random` sentinel followed by every
/// concrete outcome, labelled with team names.
pub fn enumerate_outcomes(team_a: &str, team_b: &str, best_of: u32) -> Result<Vec<OutcomeChoice>> {
    let concrete = series_outcomes(best_of)?;
    let mut out = Vec::with_capacity(concrete.len() + 1);
    out.push(OutcomeChoice {
        label: RANDOM_LABEL.to_string(),
        selection: OutcomeSelection::Random,
    });
    out.extend(concrete.into_iter().map(|o| OutcomeChoice {
        label: o.label(team_a, team_b),
        selection: OutcomeSelection::Forced(o),
    }));
    Ok(out)
}

/// Fails when `outcome` is not a legal final score for the series length.
pub fn ensure_valid_for(outcome: &SeriesOutcome, best_of: u32) -> Result<()> {
    if series_outcomes(best_of)?.contains(outcome) {
        Ok(())
    } else {
        Err(OddsError::decode(
            outcome.code(),
            format!("not a final score of a best-of-{best_of}"),
        ))
    }
}
