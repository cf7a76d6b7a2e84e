//! Error types for the schedule engine.

use chrono::NaiveDate;
use thiserror::Error;

use crate::time::ClockTime;

/// Errors that can occur in schedule operations.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("End time {end} is not after start time {start}")]
    InvalidTimeRange { start: ClockTime, end: ClockTime },

    #[error("End date {end_date} is before start date {start_date}")]
    InvalidDateRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Recurrence group not found: {0}")]
    GroupNotFound(String),

    #[error("Important date not found: {0}")]
    DateNotFound(String),

    #[error("Recurrence requires at least one weekday")]
    EmptyRecurrenceDays,

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
