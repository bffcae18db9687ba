//! Error type for the few genuinely fallible operations: configuration and
//! startup asset validation, plus the debug-only list consistency walk.
//!
//! Ordinary gameplay outcomes (a full pool, a destroyed entity, no homing
//! target) are plain `Option`/enum values and never reach this type.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    InvalidConfig { field: &'static str, reason: String },
    ConfigParse { message: String },
    MissingSprite { name: &'static str },
    ListCorrupted { pool: &'static str, expected: usize, walked: usize },
    SlotState { pool: &'static str, slot: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config value for `{field}`: {reason}")
            }
            Self::ConfigParse { message } => write!(f, "config parse error: {message}"),
            Self::MissingSprite { name } => write!(f, "sprite table `{name}` has no frames"),
            Self::ListCorrupted {
                pool,
                expected,
                walked,
            } => write!(
                f,
                "{pool} active list corrupted: count={expected}, walked={walked}"
            ),
            Self::SlotState { pool, slot } => {
                write!(f, "{pool} slot {slot} linked but not enabled (or the reverse)")
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse {
            message: err.to_string(),
        }
    }
}
