//! Bitwise Schedule Spread - schedule decoding and occurrence projection
//!
//! ETL workflow repositories store their schedules as integer mode codes and
//! bitmasks instead of a calendar grammar. This crate decodes those rows and
//! expands them into the concrete run instants that fall inside a query
//! window.
//!
//! ## Pipeline
//!
//! - [`bitfield`]: bit tests over arbitrary-precision mask columns
//! - [`rule`]: [`ScheduleRuleBuilder`] turns a workflow row plus its
//!   schedule-logic row into a [`RecurrenceDescriptor`], or `None`
//! - [`recurrence`]: RRULE-style expansion of a descriptor
//! - [`projector`]: [`OccurrenceProjector`] applies termination rules and the
//!   safety ceiling, and merges every workflow's runs in time order
//! - [`timeline`]: maps run instants onto display columns
//!
//! The engine is synchronous and pure: no clock reads, no I/O, no shared
//! state. Loading and joining the repository export happens before it runs.

pub mod bitfield;
pub mod config;
pub mod describe;
pub mod encoding;
pub mod error;
pub mod projector;
pub mod recurrence;
pub mod rule;
pub mod timeline;

pub use bitfield::{is_bit_set, Bitmask};
pub use config::ProjectionConfig;
pub use describe::{describe_schedule, frequency_text};
pub use encoding::{EndOption, RunMode, UserLogicType};
pub use error::ScheduleError;
pub use projector::{join_schedules, OccurrenceProjector, ProjectionWindow, Termination};
pub use recurrence::{expand, Expansion, ExpansionBounds};
pub use rule::{Frequency, RecurrenceDescriptor, ScheduleRuleBuilder};
pub use timeline::{fixed_slot_offset, Timeline};

// Record types shared with the upstream join step
pub use schedule_types::{
    Granularity, JoinedRecord, Occurrence, ScheduleLogicRecord, WorkflowScheduleRecord,
};
