//! Core engine for a weekly semester planner.
//!
//! This crate owns the schedule data model and everything derived from it:
//! - `schedule` for the event store (courses, study blocks, important dates)
//! - `recurrence` for multi-day authoring linked by group ids
//! - `conflict` for advisory same-day overlap detection
//! - `stats` for credit totals, busiest day, and weekly-hour views
//! - `ics`, `export`, `import` for the text adapters around the store
//!
//! Everything is synchronous and in-memory; persistence goes through the
//! injected `storage::KeyValueStore` seam.

pub mod conflict;
pub mod constants;
pub mod dates;
pub mod error;
pub mod event;
pub mod export;
pub mod ics;
pub mod import;
pub mod recurrence;
pub mod schedule;
pub mod stats;
pub mod storage;
pub mod time;

// Re-export the main types at crate root for convenience
pub use conflict::{DayConflict, EventConflict};
pub use dates::{DateKind, DateTemplate, ImportantDate};
pub use error::{ScheduleError, ScheduleResult};
pub use event::*;
pub use recurrence::EditScope;
pub use schedule::{ImportBatch, MergeMode, Schedule, ScheduleMetadata, ScheduleSnapshot};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use time::{ClockTime, DisplayZone};
