//! ICS generation for the weekly schedule.
//!
//! Every timed event becomes one weekly-recurring VEVENT
//! (`RRULE:FREQ=WEEKLY;BYDAY=…`). Times are written floating, without Z or
//! TZID: the schedule lives in one fixed base timezone and importing
//! calendars should keep the wall-clock values. Async sentinel events have
//! no grid position and are skipped.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use icalendar::{Calendar, Component, EventLike};

use crate::error::ScheduleResult;
use crate::event::ScheduleEvent;
use crate::time::ClockTime;

/// Generate .ics content for the given events.
///
/// `anchor` fixes which concrete week the recurrences start in: each
/// event's DTSTART lands on the first occurrence of its weekday on or
/// after that date. Callers pass today or the semester start, which keeps
/// the output deterministic for a given anchor.
pub fn generate_ics(events: &[ScheduleEvent], anchor: NaiveDate) -> ScheduleResult<String> {
    let mut cal = Calendar::new();
    cal.name("Course Schedule");

    for event in events {
        if event.is_async() {
            continue;
        }

        let start_date = first_weekday_on_or_after(anchor, event.day());

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&format!("{}@semgrid", event.id()));
        ics_event.summary(event.title());
        ics_event.add_property("DTSTART", floating_stamp(start_date, event.start()));
        ics_event.add_property("DTEND", floating_stamp(start_date, event.end()));
        ics_event.add_property(
            "RRULE",
            format!("FREQ=WEEKLY;BYDAY={}", byday_code(event.day())),
        );

        if let Some(description) = event_description(event) {
            ics_event.description(&description);
        }
        if let Some(location) = event.location() {
            if !location.is_empty() {
                ics_event.location(location);
            }
        }

        let ics_event = ics_event.done();
        cal.push(ics_event);
    }

    let cal = cal.done();
    Ok(cal.to_string())
}

/// DESCRIPTION content: study notes for blocks, the instructor line for
/// courses.
fn event_description(event: &ScheduleEvent) -> Option<String> {
    match event {
        ScheduleEvent::Study(block) => block.notes.clone().filter(|n| !n.is_empty()),
        ScheduleEvent::Course(course) => course
            .instructor
            .as_deref()
            .filter(|i| !i.is_empty())
            .map(|i| format!("Instructor: {}", i)),
    }
}

/// First date on or after `anchor` that falls on `day`.
fn first_weekday_on_or_after(anchor: NaiveDate, day: Weekday) -> NaiveDate {
    let offset =
        (day.num_days_from_monday() + 7 - anchor.weekday().num_days_from_monday()) % 7;
    anchor + Duration::days(offset as i64)
}

/// Floating local timestamp, e.g. "20250901T100000".
fn floating_stamp(date: NaiveDate, time: ClockTime) -> String {
    format!(
        "{}T{:02}{:02}00",
        date.format("%Y%m%d"),
        time.hour,
        time.minute
    )
}

/// Two-letter RRULE BYDAY code.
fn byday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CourseEvent, CourseKind, StudyBlock};

    fn make_test_course() -> ScheduleEvent {
        ScheduleEvent::Course(CourseEvent {
            id: "course-1".to_string(),
            title: "Linear Algebra".to_string(),
            kind: CourseKind::InPerson,
            day: Weekday::Wed,
            start: "10:00".parse().unwrap(),
            end: "10:50".parse().unwrap(),
            course_code: "MATH 221".to_string(),
            section: "001".to_string(),
            location: "Hall 12".to_string(),
            instructor: Some("Dr. Chen".to_string()),
            credits: Some(3),
            difficulty: None,
            sentiment: None,
            recurrence_group_id: None,
        })
    }

    fn anchor() -> NaiveDate {
        // a Monday
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_generate_ics_weekly_recurring_event() {
        let events = vec![make_test_course()];
        let ics = generate_ics(&events, anchor()).unwrap();

        assert!(ics.contains("BEGIN:VEVENT"), "ICS:\n{}", ics);
        assert!(ics.contains("UID:course-1@semgrid"), "ICS:\n{}", ics);
        assert!(ics.contains("SUMMARY:Linear Algebra"), "ICS:\n{}", ics);
        assert!(
            ics.contains("RRULE:FREQ=WEEKLY;BYDAY=WE"),
            "RRULE should recur on Wednesday. ICS:\n{}",
            ics
        );
        // Wednesday on or after Mon 2025-09-01 is 2025-09-03
        assert!(
            ics.contains("DTSTART:20250903T100000"),
            "DTSTART should be the first Wednesday, floating. ICS:\n{}",
            ics
        );
        assert!(ics.contains("DTEND:20250903T105000"), "ICS:\n{}", ics);
        assert!(ics.contains("LOCATION:Hall 12"), "ICS:\n{}", ics);
        assert!(ics.contains("DESCRIPTION:Instructor: Dr. Chen"), "ICS:\n{}", ics);
    }

    #[test]
    fn test_generate_ics_anchor_on_same_weekday() {
        let mut course = make_test_course();
        if let ScheduleEvent::Course(c) = &mut course {
            c.day = Weekday::Mon;
        }
        let ics = generate_ics(&[course], anchor()).unwrap();
        assert!(
            ics.contains("DTSTART:20250901T100000"),
            "anchor already on the event's weekday starts that same day. ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_generate_ics_skips_async_events() {
        let mut async_course = make_test_course();
        if let ScheduleEvent::Course(c) = &mut async_course {
            c.start = ClockTime::MIDNIGHT;
            c.end = ClockTime::MIDNIGHT;
        }
        let ics = generate_ics(&[async_course], anchor()).unwrap();
        assert!(
            !ics.contains("BEGIN:VEVENT"),
            "async events have no grid slot and must not export. ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_generate_ics_study_block_notes_become_description() {
        let block = ScheduleEvent::Study(StudyBlock {
            id: "study-1".to_string(),
            title: "Evening Review".to_string(),
            day: Weekday::Sun,
            start: "19:00".parse().unwrap(),
            end: "20:30".parse().unwrap(),
            notes: Some("flashcards".to_string()),
            recurrence_group_id: None,
        });
        let ics = generate_ics(&[block], anchor()).unwrap();

        assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=SU"), "ICS:\n{}", ics);
        assert!(ics.contains("DESCRIPTION:flashcards"), "ICS:\n{}", ics);
        assert!(
            !ics.contains("LOCATION:"),
            "study blocks have no location. ICS:\n{}",
            ics
        );
    }

    #[test]
    fn test_generate_ics_one_vevent_per_event() {
        let mut second = make_test_course();
        if let ScheduleEvent::Course(c) = &mut second {
            c.id = "course-2".to_string();
            c.day = Weekday::Fri;
        }
        let events = vec![make_test_course(), second];
        let ics = generate_ics(&events, anchor()).unwrap();

        let vevent_count = ics.matches("BEGIN:VEVENT").count();
        assert_eq!(vevent_count, 2, "ICS:\n{}", ics);
    }
}
