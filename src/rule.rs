//! Schedule Rule Builder
//!
//! Turns a workflow row plus its optional schedule-logic row into a
//! [`RecurrenceDescriptor`]. Every unsupported or malformed encoding yields
//! `None` ("no automatic recurrence"); nothing here returns an error.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bitfield::Bitmask;
use crate::encoding::{parse_code, parse_schedule_time, RunMode, UserLogicType};
use schedule_types::{ScheduleLogicRecord, WorkflowScheduleRecord};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Weekday flags, Monday through Sunday
pub const WEEKDAY_BITS: [(u64, Weekday); 7] = [
    (16, Weekday::Mon),
    (17, Weekday::Tue),
    (18, Weekday::Wed),
    (19, Weekday::Thu),
    (20, Weekday::Fri),
    (21, Weekday::Sat),
    (22, Weekday::Sun),
];

/// Bit 0 of `MONTHLY_LOGIC`: set for day-of-month mode, clear for week-of-month
pub const MONTHLY_DAY_MODE_BIT: u64 = 0;

/// Recurrence frequency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Frequency {
    /// Seconds per unit, for units of fixed length
    pub fn fixed_seconds(&self) -> Option<i64> {
        match self {
            Frequency::Second => Some(1),
            Frequency::Minute => Some(SECONDS_PER_MINUTE),
            Frequency::Hour => Some(SECONDS_PER_HOUR),
            Frequency::Day => Some(SECONDS_PER_DAY),
            Frequency::Week | Frequency::Month => None,
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Frequency::Second => "second",
            Frequency::Minute => "minute",
            Frequency::Hour => "hour",
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
        }
    }
}

/// Canonical description of how often and on what calendar pattern a
/// workflow runs. Empty constraint lists mean "not constrained".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceDescriptor {
    pub start: NaiveDateTime,
    pub frequency: Frequency,
    /// Always at least 1
    pub interval: u32,
    /// Monday-first, no duplicates
    pub by_weekday: Vec<Weekday>,
    /// Ascending, each in 1..=31
    pub by_month_day: Vec<u32>,
    /// (ordinal 1..=5, weekday), ordinal-major
    pub by_weekday_ordinal: Vec<(u8, Weekday)>,
}

impl RecurrenceDescriptor {
    pub fn new(start: NaiveDateTime, frequency: Frequency, interval: u32) -> Self {
        Self {
            start,
            frequency,
            interval: interval.max(1),
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            by_weekday_ordinal: Vec::new(),
        }
    }

    pub fn with_weekdays(mut self, weekdays: Vec<Weekday>) -> Self {
        self.by_weekday = weekdays;
        self
    }

    pub fn with_month_days(mut self, days: Vec<u32>) -> Self {
        self.by_month_day = days;
        self
    }

    pub fn with_weekday_ordinals(mut self, pairs: Vec<(u8, Weekday)>) -> Self {
        self.by_weekday_ordinal = pairs;
        self
    }

    /// True when no calendar constraint narrows the frequency
    pub fn is_unconstrained(&self) -> bool {
        self.by_weekday.is_empty()
            && self.by_month_day.is_empty()
            && self.by_weekday_ordinal.is_empty()
    }
}

/// Stateless decoder from repository rows to recurrence descriptors
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleRuleBuilder;

impl ScheduleRuleBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one workflow. `None` means the workflow has no automatic
    /// recurrence, whether by configuration or because the encoding is bad.
    pub fn build(
        &self,
        workflow: &WorkflowScheduleRecord,
        schedule: Option<&ScheduleLogicRecord>,
    ) -> Option<RecurrenceDescriptor> {
        let start = match parse_schedule_time(workflow.start_time.as_deref()) {
            Ok(start) => start,
            Err(e) => {
                debug!("Workflow {} not recurring: {}", workflow.workflow_id, e);
                return None;
            }
        };

        let run_mode = RunMode::from_code(parse_code(workflow.run_options.as_deref()));

        if run_mode.is_interval() {
            return interval_rule(workflow, start);
        }

        if run_mode.is_custom_repeat() {
            if let Some(schedule) = schedule {
                return custom_rule(workflow, schedule, start);
            }
            debug!(
                "Workflow {} uses custom repeat but scheduler {} has no logic row",
                workflow.workflow_id, workflow.scheduler_id
            );
            return None;
        }

        debug!(
            "Workflow {} has no calendar recurrence (run mode {:?})",
            workflow.workflow_id, run_mode
        );
        None
    }
}

/// Fixed-delta interval execution
fn interval_rule(
    workflow: &WorkflowScheduleRecord,
    start: NaiveDateTime,
) -> Option<RecurrenceDescriptor> {
    let delta = match parse_code(workflow.delta_value.as_deref()) {
        Some(d) if d > 0 => d,
        other => {
            debug!(
                "Workflow {} has unusable interval delta {:?}",
                workflow.workflow_id, other
            );
            return None;
        }
    };

    let (frequency, interval) = if delta > SECONDS_PER_DAY && delta % SECONDS_PER_DAY == 0 {
        (Frequency::Day, delta / SECONDS_PER_DAY)
    } else if delta == SECONDS_PER_DAY {
        (Frequency::Day, 1)
    } else if delta >= SECONDS_PER_HOUR && delta % SECONDS_PER_HOUR == 0 {
        (Frequency::Hour, delta / SECONDS_PER_HOUR)
    } else if delta % SECONDS_PER_MINUTE == 0 {
        // Non-whole hours are carried as minutes so the step stays exact
        (Frequency::Minute, delta / SECONDS_PER_MINUTE)
    } else {
        (Frequency::Second, delta)
    };

    let interval = u32::try_from(interval).ok()?;
    Some(RecurrenceDescriptor::new(start, frequency, interval))
}

/// Repeat pattern from the schedule-logic row
fn custom_rule(
    workflow: &WorkflowScheduleRecord,
    schedule: &ScheduleLogicRecord,
    start: NaiveDateTime,
) -> Option<RecurrenceDescriptor> {
    match UserLogicType::from_code(parse_code(schedule.user_logic_type.as_deref())) {
        UserLogicType::Daily => Some(RecurrenceDescriptor::new(start, Frequency::Day, 1)),
        UserLogicType::Weekly => {
            let weekly = Bitmask::parse(schedule.weekly_logic.as_deref());
            Some(
                RecurrenceDescriptor::new(start, Frequency::Week, 1)
                    .with_weekdays(decode_weekdays(&weekly)),
            )
        }
        UserLogicType::Monthly => monthly_rule(workflow, schedule, start),
        UserLogicType::Unsupported(code) => {
            debug!(
                "Workflow {} has unsupported user logic type {:?}",
                workflow.workflow_id, code
            );
            None
        }
    }
}

fn monthly_rule(
    workflow: &WorkflowScheduleRecord,
    schedule: &ScheduleLogicRecord,
    start: NaiveDateTime,
) -> Option<RecurrenceDescriptor> {
    let logic = Bitmask::parse(schedule.monthly_logic.as_deref());
    let monthly = RecurrenceDescriptor::new(start, Frequency::Month, 1);

    if logic.is_set(MONTHLY_DAY_MODE_BIT) {
        let days = logic.set_bits(1..=31).map(|bit| bit as u32).collect();
        return Some(monthly.with_month_days(days));
    }

    let ordinals: Vec<u8> = logic.set_bits(1..=5).map(|bit| bit as u8).collect();
    let weekdays = decode_weekdays(&logic);

    if ordinals.is_empty() || weekdays.is_empty() {
        debug!(
            "Workflow {} monthly week mode needs both ordinals and weekdays (ordinals {:?}, weekdays {:?})",
            workflow.workflow_id, ordinals, weekdays
        );
        return None;
    }

    let pairs = ordinals
        .iter()
        .flat_map(|n| weekdays.iter().map(move |wd| (*n, *wd)))
        .collect();
    Some(monthly.with_weekday_ordinals(pairs))
}

/// Weekdays flagged in bits 16..=22
pub fn decode_weekdays(mask: &Bitmask) -> Vec<Weekday> {
    WEEKDAY_BITS
        .iter()
        .filter(|(bit, _)| mask.is_set(*bit))
        .map(|(_, weekday)| *weekday)
        .collect()
}
