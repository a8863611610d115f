//! Recurrence Expansion
//!
//! Expands a [`RecurrenceDescriptor`] into concrete instants, following the
//! iCalendar RRULE model: FREQ + INTERVAL, with BYDAY / BYMONTHDAY / nth-BYDAY
//! and either UNTIL or COUNT.
//!
//! - Periods are counted from the start instant: each step of `interval`
//!   units for second/minute/hour/day, Monday-based weeks, calendar months.
//! - Inside a period every day is tested against the constraints; with none,
//!   a weekly rule falls back to the start's weekday and a monthly rule to the
//!   start's day of month. Months without that day are skipped.
//! - Instants before the start never count. COUNT consumes every instant from
//!   the start on, including those that end up before the window.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::rule::{Frequency, RecurrenceDescriptor};

/// Periods scanned before giving up on a rule that never matches
const MAX_PERIODS: u64 = 1_000_000;

/// Limits for one expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionBounds {
    /// Instants before this are consumed but not returned
    pub window_start: NaiveDateTime,
    /// Inclusive upper bound
    pub until: NaiveDateTime,
    /// Total instants allowed from the start instant on
    pub count: Option<u32>,
    /// Maximum instants returned
    pub limit: usize,
}

/// Result of an expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub instants: Vec<NaiveDateTime>,
    /// Stopped before `until`: `limit` was reached with more instants
    /// eligible, or the period scan cap ran out
    pub truncated: bool,
}

/// Expand a rule inside `bounds`, ascending
pub fn expand(rule: &RecurrenceDescriptor, bounds: &ExpansionBounds) -> Expansion {
    let mut expansion = Expansion::default();

    if bounds.count == Some(0) || bounds.until < rule.start || bounds.until < bounds.window_start
    {
        return expansion;
    }

    let (first_period, mut consumed) = starting_point(rule, bounds);
    let mut candidates = Vec::with_capacity(7);

    let last_period = first_period.saturating_add(MAX_PERIODS);
    let mut period = first_period;

    'periods: loop {
        if period >= last_period {
            debug!(
                "Gave up after {} periods without reaching {}",
                MAX_PERIODS, bounds.until
            );
            expansion.truncated = true;
            break;
        }
        candidates.clear();
        let Some(period_floor) = period_candidates(rule, period, &mut candidates) else {
            break;
        };
        if period_floor > bounds.until {
            break;
        }

        for &instant in &candidates {
            if instant < rule.start {
                continue;
            }
            if instant > bounds.until {
                break 'periods;
            }
            if let Some(count) = bounds.count {
                if consumed >= u64::from(count) {
                    break 'periods;
                }
            }
            consumed += 1;

            if instant < bounds.window_start {
                continue;
            }
            if expansion.instants.len() >= bounds.limit {
                expansion.truncated = true;
                break 'periods;
            }
            expansion.instants.push(instant);
        }
        period += 1;
    }

    expansion
}

/// First period worth scanning, and how many instants precede it.
///
/// Without COUNT the scan can begin at the period holding the window start.
/// With COUNT it can only skip ahead when every period yields exactly one
/// instant, so the skipped instants can be counted.
fn starting_point(rule: &RecurrenceDescriptor, bounds: &ExpansionBounds) -> (u64, u64) {
    let interval = i64::from(rule.interval.max(1));
    let window_start = bounds.window_start;

    if let Some(unit) = rule.frequency.fixed_seconds() {
        let step = unit * interval;
        let behind = (window_start - rule.start).num_seconds();
        let period: u64 = if behind <= 0 {
            0
        } else {
            ((behind + step - 1) / step) as u64
        };

        return match bounds.count {
            None => (period, 0),
            Some(_) if rule.is_unconstrained() => (period, period),
            Some(_) => (0, 0),
        };
    }

    if bounds.count.is_some() {
        return (0, 0);
    }

    let units_behind = match rule.frequency {
        Frequency::Week => {
            (week_monday(window_start.date()) - week_monday(rule.start.date())).num_days() / 7
        }
        _ => month_index(window_start.date()) - month_index(rule.start.date()),
    };
    ((units_behind.max(0) / interval) as u64, 0)
}

/// Fill `out` with the period's matching instants, ascending. Returns the
/// earliest instant the period could hold, or `None` past the calendar's end.
fn period_candidates(
    rule: &RecurrenceDescriptor,
    period: u64,
    out: &mut Vec<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    let time = rule.start.time();
    let steps = i64::try_from(period)
        .ok()?
        .checked_mul(i64::from(rule.interval.max(1)))?;

    match rule.frequency {
        Frequency::Second | Frequency::Minute | Frequency::Hour | Frequency::Day => {
            let unit = rule.frequency.fixed_seconds()?;
            let offset = Duration::try_seconds(steps.checked_mul(unit)?)?;
            let instant = rule.start.checked_add_signed(offset)?;
            if matches_constraints(rule, instant.date()) {
                out.push(instant);
            }
            Some(instant)
        }
        Frequency::Week => {
            let monday = week_monday(rule.start.date())
                .checked_add_signed(Duration::try_days(steps.checked_mul(7)?)?)?;
            let anchored = rule.by_weekday.is_empty() && rule.by_weekday_ordinal.is_empty();
            for date in monday.iter_days().take(7) {
                if anchored && date.weekday() != rule.start.weekday() {
                    continue;
                }
                if matches_constraints(rule, date) {
                    out.push(date.and_time(time));
                }
            }
            Some(monday.and_time(time))
        }
        Frequency::Month => {
            let index = month_index(rule.start.date()).checked_add(steps)?;
            let year = i32::try_from(index.div_euclid(12)).ok()?;
            let month = index.rem_euclid(12) as u32 + 1;
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let anchored = rule.is_unconstrained();
            for day in 1..=31 {
                let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                    break;
                };
                if anchored && day != rule.start.day() {
                    continue;
                }
                if matches_constraints(rule, date) {
                    out.push(date.and_time(time));
                }
            }
            Some(first.and_time(time))
        }
    }
}

fn matches_constraints(rule: &RecurrenceDescriptor, date: NaiveDate) -> bool {
    let weekday = date.weekday();
    (rule.by_weekday.is_empty() || rule.by_weekday.contains(&weekday))
        && (rule.by_month_day.is_empty() || rule.by_month_day.contains(&date.day()))
        && (rule.by_weekday_ordinal.is_empty()
            || rule
                .by_weekday_ordinal
                .iter()
                .any(|&(n, wd)| wd == weekday && weekday_ordinal(date) == n))
}

/// 1 for the first seven days of the month, 2 for the next seven, ...
fn weekday_ordinal(date: NaiveDate) -> u8 {
    ((date.day() - 1) / 7 + 1) as u8
}

fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
