//! Schedule export: CSV and plain-text summary.
//!
//! Exporters consume read-only event snapshots and produce text; the
//! caller decides where it goes (file, clipboard, download) and records
//! the export on the schedule metadata afterward. ICS export lives in the
//! `ics` module.

use std::cmp::Ordering;

use crate::constants::WEEK;
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{EventKind, ScheduleEvent};

const CSV_HEADERS: [&str; 10] = [
    "Title",
    "Day",
    "Start Time",
    "End Time",
    "Type",
    "Location",
    "Instructor",
    "Course Code",
    "Credits",
    "Notes",
];

/// Render the events as CSV with a fixed header row. Async sentinel times
/// render as "Async" in both time columns.
pub fn generate_csv(events: &[ScheduleEvent]) -> ScheduleResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS).map_err(csv_error)?;

    for event in events {
        let (start, end) = if event.is_async() {
            ("Async".to_string(), "Async".to_string())
        } else {
            (event.start().to_string(), event.end().to_string())
        };

        let (location, instructor, course_code, credits, notes) = match event {
            ScheduleEvent::Course(c) => (
                c.location.clone(),
                c.instructor.clone().unwrap_or_default(),
                c.course_code.clone(),
                c.credits.map(|n| n.to_string()).unwrap_or_default(),
                String::new(),
            ),
            ScheduleEvent::Study(b) => (
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                b.notes.clone().unwrap_or_default(),
            ),
        };

        let day = event.day().to_string();
        writer
            .write_record([
                event.title(),
                day.as_str(),
                start.as_str(),
                end.as_str(),
                event.kind().as_str(),
                location.as_str(),
                instructor.as_str(),
                course_code.as_str(),
                credits.as_str(),
                notes.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScheduleError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ScheduleError::Serialization(e.to_string()))
}

fn csv_error(e: csv::Error) -> ScheduleError {
    ScheduleError::Serialization(e.to_string())
}

/// Render the plain-text weekly summary: one section per weekday with
/// events sorted by start time (async entries last), then a statistics
/// footer. Empty days are omitted.
pub fn generate_text_summary(events: &[ScheduleEvent]) -> String {
    let mut summary = String::from("COURSE SCHEDULE SUMMARY\n========================\n\n");

    for day in WEEK {
        let mut day_events: Vec<&ScheduleEvent> =
            events.iter().filter(|e| e.day() == day).collect();
        if day_events.is_empty() {
            continue;
        }
        day_events.sort_by(|a, b| match (a.is_async(), b.is_async()) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.start().cmp(&b.start()),
        });

        summary.push_str(&format!("{}\n─────\n", day.to_string().to_uppercase()));
        for event in day_events {
            if event.is_async() {
                summary.push_str(&format!("• {} (Async)\n", event.title()));
            } else {
                summary.push_str(&format!(
                    "• {} - {}: {}\n",
                    event.start(),
                    event.end(),
                    event.title()
                ));
            }
            if let Some(location) = event.location().filter(|l| !l.is_empty()) {
                summary.push_str(&format!("  Location: {}\n", location));
            }
            if let Some(instructor) = event.instructor().filter(|i| !i.is_empty()) {
                summary.push_str(&format!("  Instructor: {}\n", instructor));
            }
            if let Some(notes) = event.notes().filter(|n| !n.is_empty()) {
                summary.push_str(&format!("  Notes: {}\n", notes));
            }
        }
        summary.push('\n');
    }

    let course_count = events.iter().filter(|e| e.kind() != EventKind::Study).count();
    let study_count = events.iter().filter(|e| e.kind() == EventKind::Study).count();
    let in_person = events.iter().filter(|e| e.kind() == EventKind::InPerson).count();
    let online = events.iter().filter(|e| e.kind() == EventKind::Online).count();

    summary.push_str("STATISTICS\n──────────\n");
    summary.push_str(&format!("Total Courses: {}\n", course_count));
    summary.push_str(&format!("Study Blocks: {}\n", study_count));
    summary.push_str(&format!("In-person Classes: {}\n", in_person));
    summary.push_str(&format!("Online Classes: {}\n", online));

    summary
}
