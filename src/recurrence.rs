//! Weekday expansion for recurring events.
//!
//! One authoring action can cover several weekdays at the same time slot;
//! expansion materializes one occurrence per weekday, all linked by a
//! shared recurrence group id. Group-scoped edit and delete fan-out lives
//! on `Schedule`; this module owns expansion and sibling lookup.

use chrono::Weekday;
use uuid::Uuid;

use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{EventTemplate, ScheduleEvent};

/// How far an edit or delete of a recurring event reaches.
///
/// Callers resolve this from user input whenever
/// `Schedule::needs_scope_decision` says the event has live siblings; the
/// engine never picks a scope on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Touch only the chosen occurrence.
    ThisOccurrence,
    /// Fan out to every event in the recurrence group.
    WholeGroup,
}

/// Expand a template across a set of weekdays into linked occurrences.
///
/// Each occurrence gets a fresh id; all of them share one fresh group id
/// and otherwise carry identical fields. Duplicate weekdays collapse so
/// each day appears at most once. Fails with `EmptyRecurrenceDays` before
/// any id is minted.
pub fn expand(template: &EventTemplate, days: &[Weekday]) -> ScheduleResult<Vec<ScheduleEvent>> {
    if days.is_empty() {
        return Err(ScheduleError::EmptyRecurrenceDays);
    }

    let group_id = fresh_group_id();

    let mut unique_days: Vec<Weekday> = Vec::with_capacity(days.len());
    for &day in days {
        if !unique_days.contains(&day) {
            unique_days.push(day);
        }
    }

    Ok(unique_days
        .into_iter()
        .map(|day| template.instantiate(template.fresh_id(), day, Some(group_id.clone())))
        .collect())
}

/// True iff the event was authored as part of a multi-day group.
pub fn is_recurring(event: &ScheduleEvent) -> bool {
    event.recurrence_group_id().is_some()
}

/// Every event sharing `group_id`, in collection order.
pub fn siblings_of<'a>(events: &'a [ScheduleEvent], group_id: &str) -> Vec<&'a ScheduleEvent> {
    events
        .iter()
        .filter(|event| event.recurrence_group_id() == Some(group_id))
        .collect()
}

pub(crate) fn fresh_group_id() -> String {
    format!("group-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CourseKind, CourseTemplate};
    use std::collections::HashSet;

    fn make_test_template() -> EventTemplate {
        EventTemplate::Course(CourseTemplate {
            title: "Organic Chemistry".to_string(),
            kind: CourseKind::InPerson,
            start: "10:00".parse().unwrap(),
            end: "10:50".parse().unwrap(),
            course_code: "CHEM 232".to_string(),
            section: "002".to_string(),
            location: "Lab 4".to_string(),
            instructor: Some("Dr. Okafor".to_string()),
            credits: Some(4),
            difficulty: None,
            sentiment: None,
        })
    }

    #[test]
    fn test_expand_creates_linked_group() {
        let days = [Weekday::Mon, Weekday::Wed, Weekday::Fri];
        let events = expand(&make_test_template(), &days).unwrap();

        assert_eq!(events.len(), 3);

        let group_id = events[0].recurrence_group_id().unwrap().to_string();
        assert!(group_id.starts_with("group-"), "unexpected group id: {}", group_id);

        let ids: HashSet<&str> = events.iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), 3, "occurrence ids must be distinct");

        for (event, expected_day) in events.iter().zip(days) {
            assert_eq!(event.day(), expected_day);
            assert_eq!(event.recurrence_group_id(), Some(group_id.as_str()));
            assert_eq!(event.start().to_string(), "10:00");
            assert_eq!(event.title(), "Organic Chemistry");
        }
    }

    #[test]
    fn test_expand_empty_days_fails() {
        let result = expand(&make_test_template(), &[]);
        assert!(matches!(result, Err(ScheduleError::EmptyRecurrenceDays)));
    }

    #[test]
    fn test_expand_collapses_duplicate_days() {
        let days = [Weekday::Mon, Weekday::Mon, Weekday::Wed];
        let events = expand(&make_test_template(), &days).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].day(), Weekday::Mon);
        assert_eq!(events[1].day(), Weekday::Wed);
    }

    #[test]
    fn test_single_day_expansion_matches_single_add_shape() {
        let template = make_test_template();
        let events = expand(&template, &[Weekday::Tue]).unwrap();
        assert_eq!(events.len(), 1);

        // identical to a plain add except for the group link
        let single = template.instantiate(template.fresh_id(), Weekday::Tue, None);
        let expanded = &events[0];
        assert!(is_recurring(expanded));
        assert!(!is_recurring(&single));
        assert_eq!(expanded.title(), single.title());
        assert_eq!(expanded.day(), single.day());
        assert_eq!(expanded.start(), single.start());
        assert_eq!(expanded.end(), single.end());
        assert_eq!(expanded.kind(), single.kind());
    }

    #[test]
    fn test_siblings_of_filters_by_group() {
        let group_a = expand(&make_test_template(), &[Weekday::Mon, Weekday::Wed]).unwrap();
        let group_b = expand(&make_test_template(), &[Weekday::Tue]).unwrap();
        let group_a_id = group_a[0].recurrence_group_id().unwrap().to_string();

        let mut all: Vec<ScheduleEvent> = group_a;
        all.extend(group_b);

        let siblings = siblings_of(&all, &group_a_id);
        assert_eq!(siblings.len(), 2);
        assert!(siblings.iter().all(|e| e.recurrence_group_id() == Some(group_a_id.as_str())));
    }
}
