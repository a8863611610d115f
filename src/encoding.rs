//! Legacy Encoding Codes
//!
//! The repository stores scheduling behavior as bare integers. This module
//! names them and parses the `MM/DD/YYYY/HH/MI` time format.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, ScheduleError};

/// Parse an integer-as-string column. Missing, blank or non-integer is `None`.
pub fn parse_code(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<i64>().ok())
}

/// Parse a `MM/DD/YYYY/HH/MI` repository time
pub fn parse_schedule_time(raw: Option<&str>) -> Result<NaiveDateTime> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ScheduleError::MissingTime)?;

    let tokens: Vec<&str> = raw.split('/').collect();
    if tokens.len() != 5 {
        return Err(ScheduleError::TokenCount {
            raw: raw.to_string(),
            found: tokens.len(),
        });
    }

    let mut fields = [0u32; 5];
    for (slot, token) in fields.iter_mut().zip(&tokens) {
        *slot = token
            .trim()
            .parse::<u32>()
            .map_err(|_| ScheduleError::NonNumericToken {
                raw: raw.to_string(),
                token: token.to_string(),
            })?;
    }
    let [month, day, year, hour, minute] = fields;

    let year = i32::try_from(year).map_err(|_| ScheduleError::OutOfRange {
        raw: raw.to_string(),
    })?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| ScheduleError::OutOfRange {
            raw: raw.to_string(),
        })
}

/// `RUN_OPTIONS` execution mode.
///
/// Codes 20 and 24 behave exactly like 4 and 8 for recurrence purposes. The
/// extra flag they carry (a restart-on-failure bit has been suggested) has
/// not been confirmed, so they get their own variants rather than a guessed
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 4: repeat every `DELTA_VALUE` seconds
    Interval,
    /// 20: as `Interval`, plus an unconfirmed flag
    IntervalFlagged,
    /// 8: repeat per the schedule-logic row
    CustomRepeat,
    /// 24: as `CustomRepeat`, plus an unconfirmed flag
    CustomRepeatFlagged,
    /// Above 32: runs continuously or is triggered externally
    Continuous,
    /// Anything else, including a missing value
    Unscheduled,
}

impl RunMode {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(4) => RunMode::Interval,
            Some(20) => RunMode::IntervalFlagged,
            Some(8) => RunMode::CustomRepeat,
            Some(24) => RunMode::CustomRepeatFlagged,
            Some(c) if c > 32 => RunMode::Continuous,
            _ => RunMode::Unscheduled,
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, RunMode::Interval | RunMode::IntervalFlagged)
    }

    pub fn is_custom_repeat(&self) -> bool {
        matches!(self, RunMode::CustomRepeat | RunMode::CustomRepeatFlagged)
    }
}

/// `USER_LOGIC_TYPE` repeat pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLogicType {
    Daily,
    Weekly,
    Monthly,
    Unsupported(Option<i64>),
}

impl UserLogicType {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => UserLogicType::Daily,
            Some(2) => UserLogicType::Weekly,
            Some(4) => UserLogicType::Monthly,
            other => UserLogicType::Unsupported(other),
        }
    }
}

/// `END_OPTIONS` termination mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOption {
    /// 0: stop at `END_TIME`
    EndTime,
    /// 1: stop after `RUN_COUNT` runs
    RunCount,
    /// 2, missing, or anything else
    Forever,
}

impl EndOption {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => EndOption::EndTime,
            Some(1) => EndOption::RunCount,
            _ => EndOption::Forever,
        }
    }
}
