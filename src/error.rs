use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OddsError {
    #[error("match records span several tournaments (expected {expected}, found {found})")]
    TournamentMismatch { expected: String, found: String },

    #[error("cannot decode outcome {code:?}: {reason}")]
    OutcomeDecode { code: String, reason: String },

    #[error("best-of {0} has no outcome enumeration")]
    UnsupportedBestOf(u32),

    #[error("cutoff week {index} is out of range ({weeks} weeks available)")]
    InvalidCutoff { index: usize, weeks: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OddsError>;

/// Stable, machine-readable error category for callers that surface
/// `kind + message` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TournamentMismatch,
    OutcomeDecode,
    UnsupportedBestOf,
    InvalidCutoff,
    InvalidConfig,
    Io,
    Json,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TournamentMismatch => "tournament_mismatch",
            ErrorKind::OutcomeDecode => "outcome_decode",
            ErrorKind::UnsupportedBestOf => "unsupported_best_of",
            ErrorKind::InvalidCutoff => "invalid_cutoff",
            ErrorKind::InvalidConfig => "invalid_config",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OddsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OddsError::TournamentMismatch { .. } => ErrorKind::TournamentMismatch,
            OddsError::OutcomeDecode { .. } => ErrorKind::OutcomeDecode,
            OddsError::UnsupportedBestOf(_) => ErrorKind::UnsupportedBestOf,
            OddsError::InvalidCutoff { .. } => ErrorKind::InvalidCutoff,
            OddsError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            OddsError::Io(_) => ErrorKind::Io,
            OddsError::Json(_) => ErrorKind::Json,
        }
    }

    pub(crate) fn decode(code: impl Into<String>, reason: impl Into<String>) -> Self {
        OddsError::OutcomeDecode {
            code: code.into(),
            reason: reason.into(),
        }
    }
}
