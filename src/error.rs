//! Error types for schedule decoding and projection
//!
//! Decoding failures never escape the projector: the rule builder turns them
//! into "no recurrence". They exist so the parsing helpers can use `?` and so
//! the reason can be logged.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Main error type for the schedule engine
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Schedule time is missing")]
    MissingTime,

    #[error("Schedule time '{raw}' must have 5 '/'-separated tokens, found {found}")]
    TokenCount { raw: String, found: usize },

    #[error("Schedule time '{raw}' has non-numeric token '{token}'")]
    NonNumericToken { raw: String, token: String },

    #[error("Schedule time '{raw}' is not a valid calendar date and time")]
    OutOfRange { raw: String },

    #[error("Projection window start {start} is after window end {end}")]
    InvertedWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
