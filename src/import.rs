//! Import adapters: CSV rows, quick-add text, backup snapshots.
//!
//! Adapters are tolerant: rows that cannot produce a record are skipped
//! instead of failing the batch, and missing fields get workable defaults.
//! File imports derive ids from the row index, so re-importing the same
//! file overwrites its earlier records rather than duplicating them.

use chrono::{NaiveDate, Weekday};

use crate::dates::{DateKind, ImportantDate};
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{
    CourseEvent, CourseKind, CourseTemplate, EventTemplate, ScheduleEvent, StudyBlock,
    StudyTemplate,
};
use crate::recurrence;
use crate::schedule::{ImportBatch, ScheduleSnapshot};
use crate::time::ClockTime;

const FALLBACK_START: ClockTime = ClockTime { hour: 9, minute: 0 };
const FALLBACK_END: ClockTime = ClockTime { hour: 10, minute: 0 };

/// Parse CSV content into an import batch.
///
/// Header names are matched loosely and case-insensitively ("Start Time",
/// "startTime" and "startCT" all address the start column). Routing is by
/// shape: a row with a weekday becomes a weekly event, a row with a
/// calendar date becomes an important date, anything else is skipped.
pub fn parse_csv(content: &str) -> ScheduleResult<ImportBatch> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ScheduleError::CsvParse(e.to_string()))?
        .clone();

    let mut batch = ImportBatch::default();

    for (index, record) in reader.records().enumerate() {
        let Ok(record) = record else {
            continue;
        };
        let row = Row {
            headers: &headers,
            record: &record,
        };

        let kind_tag = row
            .field(&["type", "kind"])
            .unwrap_or_default()
            .to_lowercase();
        let title = row.field(&["title", "name"]);

        if let Some(day) = row.field(&["day"]).and_then(|d| d.parse::<Weekday>().ok()) {
            push_event_row(&mut batch, index, &row, day, &kind_tag, title);
        } else if let Some(date) = row.field(&["date"]).and_then(|d| parse_date(&d)) {
            let end_date = row
                .field(&["enddate", "end date"])
                .and_then(|d| parse_date(&d))
                .filter(|end| *end >= date);
            batch.important_dates.push(ImportantDate {
                id: format!("imported-date-{}", index),
                title: title.unwrap_or_else(|| "Imported Date".to_string()),
                date,
                end_date,
                description: row.field(&["description", "notes"]),
                kind: date_kind_of(&kind_tag),
            });
        }
        // neither weekday nor date: nothing to build from this row
    }

    Ok(batch)
}

fn push_event_row(
    batch: &mut ImportBatch,
    index: usize,
    row: &Row<'_>,
    day: Weekday,
    kind_tag: &str,
    title: Option<String>,
) {
    let start = row
        .field(&["startct", "starttime", "start time", "start"])
        .map(|v| parse_time_or_async(&v))
        .unwrap_or(FALLBACK_START);
    let end = row
        .field(&["endct", "endtime", "end time", "end"])
        .map(|v| parse_time_or_async(&v))
        .unwrap_or(FALLBACK_END);

    if kind_tag == "study" {
        batch.study_blocks.push(StudyBlock {
            id: format!("imported-{}", index),
            title: title.unwrap_or_else(|| "Study Block".to_string()),
            day,
            start,
            end,
            notes: row.field(&["notes", "description"]),
            recurrence_group_id: None,
        });
        return;
    }

    let kind = match kind_tag {
        "online" => CourseKind::Online,
        "exam" => CourseKind::Exam,
        _ => CourseKind::InPerson,
    };
    batch.courses.push(CourseEvent {
        id: format!("imported-course-{}", index),
        title: title.unwrap_or_else(|| "Imported Course".to_string()),
        kind,
        day,
        start,
        end,
        course_code: row
            .field(&["coursecode", "course code", "code"])
            .unwrap_or_default(),
        section: row.field(&["section"]).unwrap_or_default(),
        location: row.field(&["location", "room"]).unwrap_or_default(),
        instructor: row.field(&["instructor", "professor"]),
        credits: row.field(&["credits"]).and_then(|v| v.parse().ok()),
        difficulty: None,
        sentiment: None,
        recurrence_group_id: None,
    });
}

/// Header-indexed access into one CSV record.
struct Row<'a> {
    headers: &'a csv::StringRecord,
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    /// First non-empty value under any of the header aliases.
    fn field(&self, aliases: &[&str]) -> Option<String> {
        for (i, header) in self.headers.iter().enumerate() {
            if aliases.iter().any(|a| header.eq_ignore_ascii_case(a)) {
                if let Some(value) = self
                    .record
                    .get(i)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                {
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}

/// "Async" (any casing) maps to the 00:00 sentinel; unparseable values
/// default to the fallback morning slot.
fn parse_time_or_async(value: &str) -> ClockTime {
    if value.eq_ignore_ascii_case("async") {
        return ClockTime::MIDNIGHT;
    }
    value.parse().unwrap_or(FALLBACK_START)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

fn date_kind_of(tag: &str) -> DateKind {
    match tag {
        "deadline" => DateKind::Deadline,
        "break" => DateKind::Break,
        "exam" => DateKind::Exam,
        "finals" => DateKind::Finals,
        _ => DateKind::Event,
    }
}

/// Parse quick-add text, one entry per line, into an import batch.
///
/// Pipe-format lines (`CODE | Title | Mon,Wed,Fri | 10:00-10:50 |
/// Location`) expand across their weekday list through the recurrence
/// engine, so the occurrences land as one linked group. A line mentioning
/// study or work becomes a study block in a default evening slot; any
/// other bare line becomes a Monday course stub to refine later.
pub fn parse_quick_add(content: &str) -> ScheduleResult<ImportBatch> {
    let mut batch = ImportBatch::default();

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains('|') {
            push_pipe_entry(&mut batch, line)?;
        } else if line.to_lowercase().contains("study") || line.to_lowercase().contains("work") {
            let template = EventTemplate::Study(StudyTemplate {
                title: line.to_string(),
                start: ClockTime { hour: 18, minute: 0 },
                end: ClockTime { hour: 19, minute: 0 },
                notes: None,
            });
            push_expanded(&mut batch, recurrence::expand(&template, &[Weekday::Mon])?);
        } else {
            let template = EventTemplate::Course(CourseTemplate {
                title: line.to_string(),
                kind: CourseKind::InPerson,
                start: FALLBACK_START,
                end: FALLBACK_END,
                course_code: String::new(),
                section: String::new(),
                location: String::new(),
                instructor: None,
                credits: None,
                difficulty: None,
                sentiment: None,
            });
            push_expanded(&mut batch, recurrence::expand(&template, &[Weekday::Mon])?);
        }
    }

    Ok(batch)
}

fn push_pipe_entry(batch: &mut ImportBatch, line: &str) -> ScheduleResult<()> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();
    if parts.len() < 4 {
        return Ok(());
    }

    let course_code = parts[0];
    let title = parts[1];
    let days: Vec<Weekday> = parts[2]
        .split(',')
        .filter_map(|d| d.trim().parse().ok())
        .collect();
    let (start, end) = parse_time_range(parts[3]);
    let location = parts.get(4).copied().unwrap_or_default();

    if days.is_empty() {
        return Ok(());
    }

    let template = EventTemplate::Course(CourseTemplate {
        title: format!("{} {}", course_code, title),
        kind: if location.to_lowercase().contains("online") {
            CourseKind::Online
        } else {
            CourseKind::InPerson
        },
        start,
        end,
        course_code: course_code.to_string(),
        section: String::new(),
        location: location.to_string(),
        instructor: None,
        credits: None,
        difficulty: None,
        sentiment: None,
    });
    push_expanded(batch, recurrence::expand(&template, &days)?);
    Ok(())
}

/// "10:00-10:50" into a (start, end) pair, falling back to the default
/// morning slot when either side is unparseable.
fn parse_time_range(value: &str) -> (ClockTime, ClockTime) {
    let Some((start_raw, end_raw)) = value.split_once('-') else {
        return (FALLBACK_START, FALLBACK_END);
    };
    match (start_raw.trim().parse(), end_raw.trim().parse()) {
        (Ok(start), Ok(end)) => (start, end),
        _ => (FALLBACK_START, FALLBACK_END),
    }
}

fn push_expanded(batch: &mut ImportBatch, events: Vec<ScheduleEvent>) {
    for event in events {
        match event {
            ScheduleEvent::Course(course) => batch.courses.push(course),
            ScheduleEvent::Study(block) => batch.study_blocks.push(block),
        }
    }
}

/// Parse a combined snapshot document (the backup format `Schedule::save`
/// writes) for a full restore.
pub fn parse_snapshot(content: &str) -> ScheduleResult<ScheduleSnapshot> {
    serde_json::from_str(content).map_err(|e| ScheduleError::Serialization(e.to_string()))
}
