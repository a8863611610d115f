//! End-to-end projection scenarios over JSON-shaped repository rows

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use proptest::prelude::*;
use serde_json::json;

use schedule_spread::{
    describe_schedule, Granularity, JoinedRecord, OccurrenceProjector, ProjectionConfig,
    ProjectionWindow, ScheduleLogicRecord, Timeline, WorkflowScheduleRecord,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

fn workflow(value: serde_json::Value) -> WorkflowScheduleRecord {
    serde_json::from_value(value).unwrap()
}

fn schedule(value: serde_json::Value) -> ScheduleLogicRecord {
    serde_json::from_value(value).unwrap()
}

fn window(start: NaiveDateTime, end: NaiveDateTime) -> ProjectionWindow {
    ProjectionWindow::new(start, end).unwrap()
}

fn repository() -> (Vec<WorkflowScheduleRecord>, Vec<ScheduleLogicRecord>) {
    let workflows = vec![
        workflow(json!({
            "WORKFLOW_ID": "1", "WORKFLOW_NAME": "wf_hourly", "SUBJECT_AREA": "SALES",
            "SCHEDULER_ID": "100", "RUN_OPTIONS": "4", "DELTA_VALUE": "3600",
            "START_TIME": "01/01/2024/00/00", "END_OPTIONS": "2"
        })),
        workflow(json!({
            "WORKFLOW_ID": "2", "WORKFLOW_NAME": "wf_weekdays", "SUBJECT_AREA": "FINANCE",
            "SCHEDULER_ID": "200", "RUN_OPTIONS": "8",
            "START_TIME": "01/01/2024/06/00", "END_OPTIONS": "2"
        })),
        workflow(json!({
            "WORKFLOW_ID": "3", "WORKFLOW_NAME": "wf_month_end", "SUBJECT_AREA": "FINANCE",
            "SCHEDULER_ID": "300", "RUN_OPTIONS": "24",
            "START_TIME": "01/01/2024/23/00", "END_OPTIONS": "0", "END_TIME": "12/31/2024/23/59"
        })),
        workflow(json!({
            "WORKFLOW_ID": "4", "WORKFLOW_NAME": "wf_listener", "SUBJECT_AREA": "OPS",
            "SCHEDULER_ID": "400", "RUN_OPTIONS": "64",
            "START_TIME": "01/01/2024/00/00"
        })),
    ];

    let schedules = vec![
        schedule(json!({
            "SCHEDULER_ID": "200", "USER_LOGIC_TYPE": "2",
            "WEEKLY_LOGIC": ((1u64 << 16) | (1u64 << 20)).to_string(), "MONTHLY_LOGIC": "0"
        })),
        schedule(json!({
            "SCHEDULER_ID": "300", "USER_LOGIC_TYPE": "4",
            "WEEKLY_LOGIC": "0", "MONTHLY_LOGIC": (1u64 | (1u64 << 15) | (1u64 << 31)).to_string()
        })),
    ];

    (workflows, schedules)
}

#[test]
fn hourly_interval_window_yields_six_runs() {
    init_tracing();
    let (workflows, _) = repository();
    let records = vec![JoinedRecord::new(workflows[0].clone(), None)];

    let runs = OccurrenceProjector::default()
        .project(&records, &window(at(2024, 1, 1, 0, 0), at(2024, 1, 1, 5, 0)));

    let times: Vec<NaiveDateTime> = runs.iter().map(|o| o.run_time).collect();
    assert_eq!(
        times,
        (0..=5).map(|h| at(2024, 1, 1, h, 0)).collect::<Vec<_>>()
    );
    assert!(runs.iter().all(|o| o.frequency_text == "every hour"));
}

#[test]
fn run_count_is_consumed_from_start() {
    init_tracing();
    let counted = workflow(json!({
        "WORKFLOW_ID": "9", "WORKFLOW_NAME": "wf_three_times", "SUBJECT_AREA": "OPS",
        "SCHEDULER_ID": "900", "RUN_OPTIONS": "4", "DELTA_VALUE": "86400",
        "START_TIME": "01/01/2024/08/00", "END_OPTIONS": "1", "RUN_COUNT": "3"
    }));
    let records = vec![JoinedRecord::new(counted, None)];
    let projector = OccurrenceProjector::default();

    let long = projector.project(&records, &window(at(2024, 1, 1, 0, 0), at(2026, 1, 1, 0, 0)));
    assert_eq!(long.len(), 3);
    assert_eq!(long[2].run_time, at(2024, 1, 3, 8, 0));

    let after = projector.project(&records, &window(at(2024, 1, 4, 0, 0), at(2026, 1, 1, 0, 0)));
    assert!(after.is_empty());
}

#[test]
fn end_time_stops_runs_before_window_end() {
    let (workflows, schedules) = repository();
    let runs = OccurrenceProjector::default().project_repository(
        vec![workflows[2].clone()],
        &schedules,
        &window(at(2024, 11, 1, 0, 0), at(2025, 3, 1, 0, 0)),
    );

    let end = at(2024, 12, 31, 23, 59);
    assert!(!runs.is_empty());
    assert!(runs.iter().all(|o| o.run_time <= end));
    let times: Vec<NaiveDateTime> = runs.iter().map(|o| o.run_time).collect();
    assert_eq!(
        times,
        vec![
            at(2024, 11, 15, 23, 0),
            at(2024, 12, 15, 23, 0),
            at(2024, 12, 31, 23, 0)
        ]
    );
    assert_eq!(
        runs[0].frequency_text,
        "every month on the 15th and 31st at 23:00"
    );
}

#[test]
fn weekly_without_weekday_bits_runs_once_a_week() {
    let plain = workflow(json!({
        "WORKFLOW_ID": "5", "WORKFLOW_NAME": "wf_weekly", "SUBJECT_AREA": "OPS",
        "SCHEDULER_ID": "500", "RUN_OPTIONS": "8",
        "START_TIME": "01/04/2024/12/00", "END_OPTIONS": "2"
    }));
    let logic = schedule(json!({
        "SCHEDULER_ID": "500", "USER_LOGIC_TYPE": "2", "WEEKLY_LOGIC": "0"
    }));

    let runs = OccurrenceProjector::default().project(
        &[JoinedRecord::new(plain, Some(logic))],
        &window(at(2024, 1, 1, 0, 0), at(2024, 3, 31, 23, 59)),
    );

    assert_eq!(runs.len(), 13);
    assert!(runs.iter().all(|o| o.run_time.weekday() == Weekday::Thu));
    for pair in runs.windows(2) {
        assert_eq!((pair[1].run_time - pair[0].run_time).num_days(), 7);
    }
}

#[test]
fn mixed_repository_is_sorted_and_skips_unscheduled() {
    init_tracing();
    let (workflows, schedules) = repository();
    let runs = OccurrenceProjector::default().project_repository(
        workflows,
        &schedules,
        &window(at(2024, 1, 15, 0, 0), at(2024, 1, 15, 23, 59)),
    );

    // Monday 15th: 24 hourly runs, the 06:00 weekday run, the 23:00 month-day run
    assert_eq!(runs.len(), 26);
    assert!(runs.windows(2).all(|w| w[0].run_time <= w[1].run_time));
    assert!(runs.iter().all(|o| o.workflow_id != "4"));

    let six = &runs[6..8];
    assert_eq!(six[0].run_time, at(2024, 1, 15, 6, 0));
    assert_eq!(six[0].workflow_id, "1");
    assert_eq!(six[1].workflow_id, "2");
    assert_eq!(
        six[1].frequency_text,
        "every week on Monday and Friday at 06:00"
    );
}

#[test]
fn describe_reports_manual_trigger() {
    let (workflows, _) = repository();
    assert_eq!(
        describe_schedule(&workflows[3], None, &ProjectionConfig::default()),
        "Manual/External Trigger"
    );
}

#[test]
fn projected_runs_fill_timeline_columns() {
    let (workflows, schedules) = repository();
    let start = at(2024, 1, 1, 0, 0);
    let end = at(2024, 1, 7, 23, 59);
    let runs = OccurrenceProjector::default().project_repository(workflows, &schedules, &window(start, end));

    let timeline = Timeline::build(start, end, Granularity::Day);
    assert_eq!(timeline.len(), 7);
    let grouped = timeline.occupied_slots(&runs);

    assert_eq!(grouped["wf_hourly"].len(), 7);
    // Monday 1st and Friday 5th
    assert_eq!(
        grouped["wf_weekdays"].iter().copied().collect::<Vec<_>>(),
        vec![0, 4]
    );
    assert!(!grouped.contains_key("wf_month_end"));
}

proptest! {
    #[test]
    fn projection_is_idempotent(offset_hours in 0i64..2_000, span_hours in 0i64..500) {
        let (workflows, schedules) = repository();
        let start = at(2024, 1, 1, 0, 0) + chrono::Duration::hours(offset_hours);
        let end = start + chrono::Duration::hours(span_hours);
        let projector = OccurrenceProjector::default();

        let first = projector.project_repository(workflows.clone(), &schedules, &window(start, end));
        let second = projector.project_repository(workflows, &schedules, &window(start, end));

        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        prop_assert!(first.iter().all(|o| o.run_time >= start && o.run_time <= end));
    }
}
