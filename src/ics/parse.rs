//! ICS parsing using the icalendar crate's parser.
//!
//! Imported VEVENTs land on the weekly grid by the weekday of their
//! DTSTART; the wall-clock times are kept as-is regardless of the source
//! timezone notation. Classification is heuristic: "study" or "work" in
//! the summary makes a study block, an "online" location makes an online
//! course, and the course code is read off the first word of the summary.
//! Date-only VEVENTs become important dates instead of grid events.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::dates::{DateKind, ImportantDate};
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{CourseEvent, CourseKind, StudyBlock};
use crate::schedule::ImportBatch;
use crate::time::ClockTime;

/// Parse ICS content into an import batch.
///
/// Tolerant by design: VEVENTs missing a usable DTSTART/DTEND are skipped
/// rather than failing the file. Ids are derived from the component index
/// so re-importing the same file overwrites instead of duplicating.
pub fn parse_ics(content: &str) -> ScheduleResult<ImportBatch> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| ScheduleError::IcsParse(e.to_string()))?;

    let mut batch = ImportBatch::default();

    for (index, vevent) in calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .enumerate()
    {
        let summary = vevent
            .find_prop("SUMMARY")
            .map(|p| p.val.to_string())
            .unwrap_or_else(|| "Imported Event".to_string());
        let description = vevent
            .find_prop("DESCRIPTION")
            .map(|p| p.val.to_string())
            .filter(|d| !d.is_empty());
        let location = vevent
            .find_prop("LOCATION")
            .map(|p| p.val.to_string())
            .unwrap_or_default();

        let Some(start) = prop_time(vevent, "DTSTART") else {
            continue;
        };

        match start {
            DatePerhapsTime::DateTime(start_dt) => {
                let Some(DatePerhapsTime::DateTime(end_dt)) = prop_time(vevent, "DTEND") else {
                    continue;
                };
                push_timed_event(
                    &mut batch,
                    index,
                    summary,
                    description,
                    location,
                    to_naive(start_dt),
                    to_naive(end_dt),
                );
            }
            DatePerhapsTime::Date(start_date) => {
                // All-day span; DTEND is exclusive per RFC 5545
                let end_date = match prop_time(vevent, "DTEND") {
                    Some(DatePerhapsTime::Date(end)) => {
                        let last = end - Duration::days(1);
                        (last > start_date).then_some(last)
                    }
                    _ => None,
                };
                batch.important_dates.push(ImportantDate {
                    id: format!("imported-ics-date-{}", index),
                    title: summary.clone(),
                    date: start_date,
                    end_date,
                    description,
                    kind: classify_date(&summary),
                });
            }
        }
    }

    Ok(batch)
}

fn push_timed_event(
    batch: &mut ImportBatch,
    index: usize,
    summary: String,
    description: Option<String>,
    location: String,
    start_dt: NaiveDateTime,
    end_dt: NaiveDateTime,
) {
    let day = start_dt.weekday();
    let start = clock_of(start_dt);
    let end = clock_of(end_dt);
    let id = format!("imported-ics-{}", index);

    let summary_lower = summary.to_lowercase();
    if summary_lower.contains("study") || summary_lower.contains("work") {
        batch.study_blocks.push(StudyBlock {
            id,
            title: summary,
            day,
            start,
            end,
            notes: description,
            recurrence_group_id: None,
        });
    } else {
        let kind = if location.to_lowercase().contains("online") {
            CourseKind::Online
        } else {
            CourseKind::InPerson
        };
        let course_code = summary
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        batch.courses.push(CourseEvent {
            id,
            title: summary,
            kind,
            day,
            start,
            end,
            course_code,
            section: String::new(),
            location,
            instructor: None,
            credits: None,
            difficulty: None,
            sentiment: description,
            recurrence_group_id: None,
        });
    }
}

fn prop_time(vevent: &Component<'_>, name: &str) -> Option<DatePerhapsTime> {
    DatePerhapsTime::try_from(vevent.find_prop(name)?).ok()
}

/// Strip the timezone notation and keep the wall-clock value.
fn to_naive(dt: CalendarDateTime) -> NaiveDateTime {
    match dt {
        CalendarDateTime::Floating(naive) => naive,
        CalendarDateTime::Utc(utc) => utc.naive_utc(),
        CalendarDateTime::WithTimezone { date_time, .. } => date_time,
    }
}

fn clock_of(dt: NaiveDateTime) -> ClockTime {
    ClockTime {
        hour: dt.hour() as u8,
        minute: dt.minute() as u8,
    }
}

fn classify_date(summary: &str) -> DateKind {
    let lower = summary.to_lowercase();
    if lower.contains("final") {
        DateKind::Finals
    } else if lower.contains("exam") || lower.contains("midterm") {
        DateKind::Exam
    } else if lower.contains("break") || lower.contains("holiday") {
        DateKind::Break
    } else if lower.contains("due") || lower.contains("deadline") {
        DateKind::Deadline
    } else {
        DateKind::Event
    }
}
