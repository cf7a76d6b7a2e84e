//! Derived views over the schedule: credit load, busiest day, weekly
//! hours, campus presence.
//!
//! Everything here is pure and computed on demand from event snapshots;
//! nothing is persisted.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

use crate::constants::WEEK;
use crate::dates::{DateKind, ImportantDate};
use crate::event::{CourseEvent, EventKind, ScheduleEvent};
use crate::time::ClockTime;

/// Credit-hour load classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditLoad {
    Light,
    Normal,
    Heavy,
}

impl CreditLoad {
    /// Over 18 credit hours is heavy, 12 through 18 normal, under 12
    /// light. Both boundaries count as normal.
    pub fn classify(total_credits: u32) -> CreditLoad {
        if total_credits > 18 {
            CreditLoad::Heavy
        } else if total_credits >= 12 {
            CreditLoad::Normal
        } else {
            CreditLoad::Light
        }
    }
}

/// Total credit hours across unique courses.
///
/// A course meeting three days a week is three events but one course; the
/// (course_code, section) pair de-duplicates occurrences before summing.
/// Missing credits count as zero.
pub fn total_credits(courses: &[CourseEvent]) -> u32 {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    courses
        .iter()
        .filter(|course| seen.insert((course.course_code.as_str(), course.section.as_str())))
        .filter_map(|course| course.credits)
        .sum()
}

/// The weekday carrying the most events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    pub day: Weekday,
    pub count: usize,
}

/// Day with the maximum event count, or None for an empty schedule.
///
/// Days are scanned Monday through Sunday and only a strictly greater
/// count replaces the current best, so ties resolve to the earliest
/// weekday.
pub fn busiest_day(events: &[ScheduleEvent]) -> Option<DayLoad> {
    let mut busiest: Option<DayLoad> = None;
    for day in WEEK {
        let count = events.iter().filter(|event| event.day() == day).count();
        if count > 0 && busiest.is_none_or(|best| count > best.count) {
            busiest = Some(DayLoad { day, count });
        }
    }
    busiest
}

/// Earliest course start time, or None when no courses exist. Study
/// blocks are not considered. `ClockTime` ordering matches the string
/// compare the grid header uses, async 00:00 courses included.
pub fn earliest_start(courses: &[CourseEvent]) -> Option<ClockTime> {
    courses.iter().map(|course| course.start).min()
}

/// Where the student needs to be on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CampusStatus {
    OnCampus,
    CampusOptional,
    OffCampus,
}

impl fmt::Display for CampusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CampusStatus::OnCampus => "ON CAMPUS",
            CampusStatus::CampusOptional => "campus optional",
            CampusStatus::OffCampus => "off campus",
        };
        f.write_str(label)
    }
}

/// Classify a day by its count of physically-attended events (in-person
/// classes and exams): two or more make a campus day, exactly one makes
/// campus optional, none means fully remote.
pub fn campus_status(events: &[ScheduleEvent], day: Weekday) -> CampusStatus {
    let on_campus_count = events
        .iter()
        .filter(|event| event.day() == day)
        .filter(|event| event.as_course().is_some_and(|c| c.kind.is_on_campus()))
        .count();

    match on_campus_count {
        0 => CampusStatus::OffCampus,
        1 => CampusStatus::CampusOptional,
        _ => CampusStatus::OnCampus,
    }
}

/// Weekly hour totals, class time and study time split out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyHours {
    pub class_hours: f64,
    pub study_hours: f64,
    pub total_hours: f64,
}

/// Sum event durations in fractional hours. Events with non-positive
/// durations, the async sentinel included, are skipped.
pub fn weekly_hours(events: &[ScheduleEvent]) -> WeeklyHours {
    let mut class_minutes: i64 = 0;
    let mut study_minutes: i64 = 0;

    for event in events {
        let minutes = event.duration_minutes();
        if minutes <= 0 {
            continue;
        }
        match event.kind() {
            EventKind::Study => study_minutes += minutes as i64,
            _ => class_minutes += minutes as i64,
        }
    }

    let class_hours = class_minutes as f64 / 60.0;
    let study_hours = study_minutes as f64 / 60.0;
    WeeklyHours {
        class_hours,
        study_hours,
        total_hours: class_hours + study_hours,
    }
}

/// Upcoming deadline-like dates (deadlines, exams, finals) starting on or
/// after `today`, soonest first, truncated to `limit`.
pub fn upcoming_dates(
    dates: &[ImportantDate],
    today: NaiveDate,
    limit: usize,
) -> Vec<&ImportantDate> {
    let mut upcoming: Vec<&ImportantDate> = dates
        .iter()
        .filter(|date| date.date >= today)
        .filter(|date| {
            matches!(
                date.kind,
                DateKind::Deadline | DateKind::Exam | DateKind::Finals
            )
        })
        .collect();
    upcoming.sort_by_key(|date| date.date);
    upcoming.truncate(limit);
    upcoming
}
