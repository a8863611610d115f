//! Timeline Bucketing
//!
//! Places occurrence instants into the columns of a visual timeline.
//!
//! Fixed-width granularities (30 minutes, hour, day) use the offset from the
//! timeline origin divided by the slot width, rounded to the nearest slot so
//! instants a little off a boundary still land in the expected column. Weeks
//! are matched by containment in `[slot, slot + 7 days)` and months by
//! calendar month and year.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, Months, NaiveDateTime, NaiveTime, Timelike};

use schedule_types::{Granularity, Occurrence};

/// Rounded slot offset from `origin` for fixed-width granularities.
///
/// Returns `None` for week and month, which need the slot list. The result
/// may be negative or past the end of any concrete timeline.
pub fn fixed_slot_offset(
    instant: NaiveDateTime,
    granularity: Granularity,
    origin: NaiveDateTime,
) -> Option<i64> {
    let slot_ms = granularity.fixed_minutes()? * 60_000;
    let diff_ms = (instant - origin).num_milliseconds();
    // Round half up: floor((2 * diff + slot) / (2 * slot))
    Some((2 * diff_ms + slot_ms).div_euclid(2 * slot_ms))
}

/// The slot starts of a timeline at one granularity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    granularity: Granularity,
    slots: Vec<NaiveDateTime>,
}

impl Timeline {
    /// Slots covering `start ..= end`: the first slot is `start` aligned down
    /// to the granularity, later slots follow while their start is `<= end`.
    pub fn build(start: NaiveDateTime, end: NaiveDateTime, granularity: Granularity) -> Self {
        let mut slots = Vec::new();
        let mut slot = Some(align_down(start, granularity));

        while let Some(current) = slot {
            if current > end {
                break;
            }
            slots.push(current);
            slot = next_slot(current, granularity);
        }

        Self { granularity, slots }
    }

    /// A timeline over caller-supplied slot starts
    pub fn from_slots(granularity: Granularity, slots: Vec<NaiveDateTime>) -> Self {
        Self { granularity, slots }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn slots(&self) -> &[NaiveDateTime] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn origin(&self) -> Option<NaiveDateTime> {
        self.slots.first().copied()
    }

    /// Column holding `instant`, or `None` when it falls outside the timeline
    pub fn slot_index(&self, instant: NaiveDateTime) -> Option<usize> {
        let origin = self.origin()?;

        match self.granularity {
            Granularity::ThirtyMinutes | Granularity::Hour | Granularity::Day => {
                let offset = fixed_slot_offset(instant, self.granularity, origin)?;
                usize::try_from(offset).ok().filter(|i| *i < self.slots.len())
            }
            Granularity::Week => self
                .slots
                .iter()
                .position(|slot| *slot <= instant && instant < *slot + Duration::days(7)),
            Granularity::Month => self.slots.iter().position(|slot| {
                slot.year() == instant.year() && slot.month() == instant.month()
            }),
        }
    }

    /// Distinct occupied columns per workflow name; runs outside the
    /// timeline are dropped
    pub fn occupied_slots(&self, occurrences: &[Occurrence]) -> BTreeMap<String, BTreeSet<usize>> {
        let mut grouped: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for occurrence in occurrences {
            if let Some(index) = self.slot_index(occurrence.run_time) {
                grouped
                    .entry(occurrence.workflow_name.clone())
                    .or_default()
                    .insert(index);
            }
        }
        grouped
    }
}

fn align_down(instant: NaiveDateTime, granularity: Granularity) -> NaiveDateTime {
    let date = instant.date();
    match granularity {
        Granularity::ThirtyMinutes => {
            let minute = instant.minute() - instant.minute() % 30;
            date.and_time(NaiveTime::from_hms_opt(instant.hour(), minute, 0).unwrap_or(NaiveTime::MIN))
        }
        Granularity::Hour => {
            date.and_time(NaiveTime::from_hms_opt(instant.hour(), 0, 0).unwrap_or(NaiveTime::MIN))
        }
        Granularity::Day | Granularity::Week => date.and_time(NaiveTime::MIN),
        Granularity::Month => date
            .with_day(1)
            .unwrap_or(date)
            .and_time(NaiveTime::MIN),
    }
}

fn next_slot(slot: NaiveDateTime, granularity: Granularity) -> Option<NaiveDateTime> {
    match granularity {
        Granularity::Month => slot.checked_add_months(Months::new(1)),
        _ => {
            let minutes = granularity.fixed_minutes().unwrap_or(7 * 24 * 60);
            slot.checked_add_signed(Duration::minutes(minutes))
        }
    }
}
