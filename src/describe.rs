//! Human-readable schedule descriptions
//!
//! Produces phrases such as "every 2 hours", "every week on Monday and
//! Friday at 06:15" or "every month on the 2nd Tuesday at 09:00".

use chrono::Weekday;

use crate::config::ProjectionConfig;
use crate::rule::{Frequency, RecurrenceDescriptor, ScheduleRuleBuilder};
use schedule_types::{ScheduleLogicRecord, WorkflowScheduleRecord};

/// Describe a rule. The time-of-day suffix only applies to day, week and
/// month frequencies; finer units already imply the clock time.
pub fn frequency_text(rule: &RecurrenceDescriptor, time_of_day_suffix: bool) -> String {
    let unit = rule.frequency.singular();
    let mut text = if rule.interval == 1 {
        format!("every {}", unit)
    } else {
        format!("every {} {}s", rule.interval, unit)
    };

    if !rule.by_weekday_ordinal.is_empty() {
        let parts: Vec<String> = rule
            .by_weekday_ordinal
            .iter()
            .map(|(n, wd)| format!("{} {}", ordinal(u32::from(*n)), weekday_name(*wd)))
            .collect();
        text.push_str(&format!(" on the {}", join_list(&parts)));
    } else if !rule.by_month_day.is_empty() {
        let parts: Vec<String> = rule.by_month_day.iter().map(|d| ordinal(*d)).collect();
        text.push_str(&format!(" on the {}", join_list(&parts)));
    }

    if !rule.by_weekday.is_empty() {
        let parts: Vec<String> = rule
            .by_weekday
            .iter()
            .map(|wd| weekday_name(*wd).to_string())
            .collect();
        text.push_str(&format!(" on {}", join_list(&parts)));
    }

    let coarse = matches!(
        rule.frequency,
        Frequency::Day | Frequency::Week | Frequency::Month
    );
    if time_of_day_suffix && coarse {
        text.push_str(&format!(" at {}", rule.start.format("%H:%M")));
    }

    text
}

/// Describe one workflow's schedule, or the unscheduled label when it has
/// no automatic recurrence
pub fn describe_schedule(
    workflow: &WorkflowScheduleRecord,
    schedule: Option<&ScheduleLogicRecord>,
    config: &ProjectionConfig,
) -> String {
    match ScheduleRuleBuilder::new().build(workflow, schedule) {
        Some(rule) => frequency_text(&rule, config.time_of_day_suffix),
        None => config.unscheduled_label.clone(),
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// 1st, 2nd, 3rd, 4th, ... 11th, 12th, 13th, ... 21st
fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// "a", "a and b", "a, b and c"
fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
