//! Schedule Types - Foundation Repository Records
//!
//! This crate holds the plain data records exchanged between the upstream
//! repository join step, the schedule decoder and the presentation layer.
//!
//! ## Architecture Level: Foundation
//!
//! The decoder crate depends on this crate, but this crate depends on nothing
//! else in the workspace.
//!
//! ## Contents
//!
//! - Workflow and schedule-logic records, with field names preserved exactly
//!   as the repository export spells them (`WORKFLOW_ID`, `RUN_OPTIONS`, ...)
//! - The joined (workflow, schedule) pair
//! - Projected occurrences
//! - Timeline granularity tokens
//!
//! ## Rules
//!
//! 1. **NO DECODING LOGIC** - numeric fields stay as the raw strings the
//!    export delivered; interpreting them is the decoder's job
//! 2. **SERIALIZABLE** - every type supports serde
//! 3. **NO WORKSPACE DEPENDENCIES**

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// REPOSITORY RECORDS
// ============================================================================

/// One workflow row from the repository export.
///
/// Numeric columns arrive as integer-as-string values and are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WorkflowScheduleRecord {
    #[serde(default)]
    pub workflow_id: String,
    #[serde(default)]
    pub workflow_name: String,
    #[serde(default)]
    pub subject_area: String,
    /// Links the workflow to its schedule-logic row
    #[serde(default)]
    pub scheduler_id: String,

    /// Execution mode code (4, 8, 20, 24, ...)
    #[serde(default)]
    pub run_options: Option<String>,
    /// Interval length in seconds for interval execution
    #[serde(default)]
    pub delta_value: Option<String>,
    /// `MM/DD/YYYY/HH/MI`
    #[serde(default)]
    pub start_time: Option<String>,

    /// Termination mode code (0 = end time, 1 = run count, 2 = none)
    #[serde(default)]
    pub end_options: Option<String>,
    /// `MM/DD/YYYY/HH/MI`, used with end option 0
    #[serde(default)]
    pub end_time: Option<String>,
    /// Total runs, used with end option 1
    #[serde(default)]
    pub run_count: Option<String>,
}

impl WorkflowScheduleRecord {
    /// Create a record with identity fields only
    pub fn new(
        workflow_id: impl Into<String>,
        workflow_name: impl Into<String>,
        subject_area: impl Into<String>,
        scheduler_id: impl Into<String>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            workflow_name: workflow_name.into(),
            subject_area: subject_area.into(),
            scheduler_id: scheduler_id.into(),
            ..Self::default()
        }
    }
}

/// One schedule-logic row, keyed by `SCHEDULER_ID`.
///
/// The two logic columns are decimal strings that may exceed 64 bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ScheduleLogicRecord {
    #[serde(default)]
    pub scheduler_id: String,
    /// Repeat pattern code (1 = daily, 2 = weekly, 4 = monthly)
    #[serde(default)]
    pub user_logic_type: Option<String>,
    #[serde(default)]
    pub weekly_logic: Option<String>,
    #[serde(default)]
    pub monthly_logic: Option<String>,
}

impl ScheduleLogicRecord {
    pub fn new(scheduler_id: impl Into<String>) -> Self {
        Self {
            scheduler_id: scheduler_id.into(),
            ..Self::default()
        }
    }
}

/// A workflow paired with its schedule-logic row, if one exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub workflow: WorkflowScheduleRecord,
    #[serde(default)]
    pub schedule: Option<ScheduleLogicRecord>,
}

impl JoinedRecord {
    pub fn new(workflow: WorkflowScheduleRecord, schedule: Option<ScheduleLogicRecord>) -> Self {
        Self { workflow, schedule }
    }
}

// ============================================================================
// PROJECTION OUTPUT
// ============================================================================

/// One projected execution of a workflow.
///
/// `run_time` is repository wall-clock time; the export carries no zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub workflow_id: String,
    pub workflow_name: String,
    pub subject_area: String,
    pub scheduler_id: String,
    pub run_time: NaiveDateTime,
    pub frequency_text: String,
}

// ============================================================================
// TIMELINE GRANULARITY
// ============================================================================

/// Width of one column on the visual timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "hour")]
    Hour,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::ThirtyMinutes => "30min",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Fixed slot length in minutes; `None` for calendar-sized slots
    pub fn fixed_minutes(&self) -> Option<i64> {
        match self {
            Granularity::ThirtyMinutes => Some(30),
            Granularity::Hour => Some(60),
            Granularity::Day => Some(24 * 60),
            Granularity::Week | Granularity::Month => None,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unknown granularity token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown timeline granularity '{0}', expected one of 30min, hour, day, week, month")]
pub struct ParseGranularityError(pub String);

impl std::str::FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30min" => Ok(Granularity::ThirtyMinutes),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}
