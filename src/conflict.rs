//! Same-day time-overlap detection.
//!
//! Conflicts are advisory: detection never blocks a mutation, and an
//! overlapping schedule is a perfectly storable state. Two ranges on the
//! same day conflict iff `start1 < end2 && start2 < end1`, so back-to-back
//! events sharing a boundary minute do not overlap. Asynchronous sentinel
//! events never participate on either side.

use std::collections::HashSet;

use chrono::Weekday;
use serde::Serialize;

use crate::event::ScheduleEvent;
use crate::time::ClockTime;

/// A detected same-day overlap between two events.
///
/// Derived on demand from the event collections, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventConflict {
    pub event1_id: String,
    pub event2_id: String,
    pub day: Weekday,
    pub overlap_start: ClockTime,
    pub overlap_end: ClockTime,
}

/// One per-day hit from `check_recurring_conflicts`.
#[derive(Debug, Clone)]
pub struct DayConflict<'a> {
    pub day: Weekday,
    pub conflicting_event: &'a ScheduleEvent,
}

fn ranges_overlap(start1: u16, end1: u16, start2: u16, end2: u16) -> bool {
    start1 < end2 && start2 < end1
}

fn is_async_slot(start: ClockTime, end: ClockTime) -> bool {
    start == ClockTime::MIDNIGHT && end == ClockTime::MIDNIGHT
}

/// First existing event on `day` whose time range overlaps the candidate
/// range, in collection order, or None.
///
/// `exclude_id` skips the event being edited so it cannot conflict with
/// itself. An async candidate or async existing event never matches.
pub fn check_event_conflict<'a>(
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
    existing: &'a [ScheduleEvent],
    exclude_id: Option<&str>,
) -> Option<&'a ScheduleEvent> {
    if is_async_slot(start, end) {
        return None;
    }
    let (start1, end1) = (start.total_minutes(), end.total_minutes());

    existing.iter().find(|event| {
        if exclude_id.is_some_and(|id| id == event.id()) {
            return false;
        }
        if event.day() != day || event.is_async() {
            return false;
        }
        ranges_overlap(
            start1,
            end1,
            event.start().total_minutes(),
            event.end().total_minutes(),
        )
    })
}

/// Check one candidate time range against every weekday of a multi-day
/// add.
///
/// Reports at most one conflicting event per day (the first match), which
/// is enough for a pre-add warning; exhaustive audits go through
/// `detect_all_conflicts` instead.
pub fn check_recurring_conflicts<'a>(
    days: &[Weekday],
    start: ClockTime,
    end: ClockTime,
    existing: &'a [ScheduleEvent],
) -> Vec<DayConflict<'a>> {
    days.iter()
        .filter_map(|&day| {
            check_event_conflict(day, start, end, existing, None).map(|conflicting_event| {
                DayConflict {
                    day,
                    conflicting_event,
                }
            })
        })
        .collect()
}

/// All-pairs conflict scan over an event collection.
///
/// Each unordered pair appears at most once, keyed by sorted id, with the
/// overlap window `[max(start1, start2), min(end1, end2))` reported as
/// clock times. Quadratic over same-day events, which stay in the tens
/// for a real semester.
pub fn detect_all_conflicts(events: &[ScheduleEvent]) -> Vec<EventConflict> {
    let mut conflicts = Vec::new();
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();

    for (i, event1) in events.iter().enumerate() {
        if event1.is_async() {
            continue;
        }
        let (start1, end1) = (
            event1.start().total_minutes(),
            event1.end().total_minutes(),
        );

        for event2 in &events[i + 1..] {
            if event2.is_async() || event2.day() != event1.day() {
                continue;
            }
            let (start2, end2) = (
                event2.start().total_minutes(),
                event2.end().total_minutes(),
            );
            if !ranges_overlap(start1, end1, start2, end2) {
                continue;
            }

            let mut pair = [event1.id(), event2.id()];
            pair.sort_unstable();
            if !seen_pairs.insert((pair[0].to_string(), pair[1].to_string())) {
                continue;
            }

            conflicts.push(EventConflict {
                event1_id: event1.id().to_string(),
                event2_id: event2.id().to_string(),
                day: event1.day(),
                overlap_start: ClockTime::from_minutes(start1.max(start2)),
                overlap_end: ClockTime::from_minutes(end1.min(end2)),
            });
        }
    }

    conflicts
}

/// Ids of every event participating in at least one conflict. The grid
/// uses this set to flag cards.
pub fn conflicting_event_ids(events: &[ScheduleEvent]) -> HashSet<String> {
    let mut ids = HashSet::new();
    for conflict in detect_all_conflicts(events) {
        ids.insert(conflict.event1_id);
        ids.insert(conflict.event2_id);
    }
    ids
}
