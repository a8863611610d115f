//! Occurrence Projector
//!
//! Expands every joined workflow into its run instants inside a query window
//! and merges them into one list ordered by run time. Workflows without a
//! usable schedule simply contribute nothing.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::config::ProjectionConfig;
use crate::describe::frequency_text;
use crate::encoding::{parse_code, parse_schedule_time, EndOption};
use crate::error::{Result, ScheduleError};
use crate::recurrence::{expand, ExpansionBounds};
use crate::rule::{RecurrenceDescriptor, ScheduleRuleBuilder};
use schedule_types::{JoinedRecord, Occurrence, ScheduleLogicRecord, WorkflowScheduleRecord};

/// Inclusive query window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ProjectionWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(ScheduleError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// How a workflow's run sequence ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Last run no later than this instant
    Until(NaiveDateTime),
    /// Fixed number of runs counted from the start instant
    Count(u32),
    /// Runs forever
    Open,
}

impl Termination {
    /// Resolve `END_OPTIONS` / `END_TIME` / `RUN_COUNT`.
    ///
    /// An unreadable end time, or a missing or non-positive run count, falls
    /// back to `Open`.
    pub fn resolve(workflow: &WorkflowScheduleRecord) -> Self {
        let termination = match EndOption::from_code(parse_code(workflow.end_options.as_deref())) {
            EndOption::EndTime => match parse_schedule_time(workflow.end_time.as_deref()) {
                Ok(end) => Termination::Until(end),
                Err(e) => {
                    debug!(
                        "Workflow {} end time ignored, treating as open-ended: {}",
                        workflow.workflow_id, e
                    );
                    Termination::Open
                }
            },
            EndOption::RunCount => match parse_code(workflow.run_count.as_deref()) {
                Some(n) if n > 0 => Termination::Count(u32::try_from(n).unwrap_or(u32::MAX)),
                other => {
                    debug!(
                        "Workflow {} run count {:?} unusable, treating as open-ended",
                        workflow.workflow_id, other
                    );
                    Termination::Open
                }
            },
            EndOption::Forever => Termination::Open,
        };
        trace!("Workflow {} termination: {:?}", workflow.workflow_id, termination);
        termination
    }

    fn bounds(&self, window: &ProjectionWindow, limit: usize) -> ExpansionBounds {
        let (until, count) = match *self {
            Termination::Until(end) => (end.min(window.end), None),
            Termination::Count(n) => (window.end, Some(n)),
            Termination::Open => (window.end, None),
        };
        ExpansionBounds {
            window_start: window.start,
            until,
            count,
            limit,
        }
    }
}

/// Pair each workflow with its schedule-logic row by `SCHEDULER_ID`.
///
/// Ids are compared after trimming; when several rows share an id the last
/// one wins.
pub fn join_schedules(
    workflows: Vec<WorkflowScheduleRecord>,
    schedules: &[ScheduleLogicRecord],
) -> Vec<JoinedRecord> {
    let by_id: HashMap<&str, &ScheduleLogicRecord> = schedules
        .iter()
        .map(|s| (s.scheduler_id.trim(), s))
        .collect();

    workflows
        .into_iter()
        .map(|workflow| {
            let schedule = by_id.get(workflow.scheduler_id.trim()).map(|s| (*s).clone());
            JoinedRecord::new(workflow, schedule)
        })
        .collect()
}

/// Projects joined repository records onto a time window
#[derive(Debug, Clone, Default)]
pub struct OccurrenceProjector {
    config: ProjectionConfig,
    builder: ScheduleRuleBuilder,
}

impl OccurrenceProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            config,
            builder: ScheduleRuleBuilder::new(),
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// All occurrences of all records inside `window`, ascending by run time.
    /// Equal run times keep the input order of their records.
    pub fn project(&self, records: &[JoinedRecord], window: &ProjectionWindow) -> Vec<Occurrence> {
        let mut occurrences = Vec::new();
        let mut recurring = 0usize;

        for record in records {
            let Some(rule) = self
                .builder
                .build(&record.workflow, record.schedule.as_ref())
            else {
                continue;
            };
            recurring += 1;
            occurrences.extend(self.project_rule(&record.workflow, &rule, window));
        }

        occurrences.sort_by_key(|o| o.run_time);

        debug!(
            "Projected {} occurrences from {} records ({} recurring) for {} .. {}",
            occurrences.len(),
            records.len(),
            recurring,
            window.start,
            window.end
        );
        occurrences
    }

    /// Join raw workflow and schedule rows, then project
    pub fn project_repository(
        &self,
        workflows: Vec<WorkflowScheduleRecord>,
        schedules: &[ScheduleLogicRecord],
        window: &ProjectionWindow,
    ) -> Vec<Occurrence> {
        let joined = join_schedules(workflows, schedules);
        self.project(&joined, window)
    }

    /// Occurrences of one already-decoded rule
    pub fn project_rule(
        &self,
        workflow: &WorkflowScheduleRecord,
        rule: &RecurrenceDescriptor,
        window: &ProjectionWindow,
    ) -> Vec<Occurrence> {
        let bounds =
            Termination::resolve(workflow).bounds(window, self.config.max_occurrences_per_workflow);
        let expansion = expand(rule, &bounds);

        if expansion.truncated {
            debug!(
                "Workflow {} truncated after {} occurrences (limit {})",
                workflow.workflow_id,
                expansion.instants.len(),
                self.config.max_occurrences_per_workflow
            );
        }

        let text = frequency_text(rule, self.config.time_of_day_suffix);
        expansion
            .instants
            .into_iter()
            .map(|run_time| Occurrence {
                workflow_id: workflow.workflow_id.clone(),
                workflow_name: workflow.workflow_name.clone(),
                subject_area: workflow.subject_area.clone(),
                scheduler_id: workflow.scheduler_id.clone(),
                run_time,
                frequency_text: text.clone(),
            })
            .collect()
    }
}
