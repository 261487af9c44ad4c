pub mod bracket;
pub mod config;
pub mod error;
pub mod export;
pub mod http_cache;
pub mod http_client;
pub mod match_fetch;
pub mod match_parse;
pub mod outcome;
pub mod report;
pub mod schedule;
pub mod season;
pub mod simulate;
pub mod standings;
pub mod team_alias;
pub mod tournaments;

pub use error::{ErrorKind, OddsError, Result};
pub use season::{OddsOutcome, OddsReport, Season, run_playoff_odds};
