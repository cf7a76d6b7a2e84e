//! Event types for the weekly schedule.
//!
//! A schedule event occupies one weekday and a time range in the base
//! timezone. Courses and study blocks carry different detail fields, so
//! they are separate structs joined by the `ScheduleEvent` sum type; code
//! that only needs the shared surface (identity, slot, kind) goes through
//! the accessors on the enum.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::ClockTime;

/// Kind tag covering every schedule event, study blocks included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Study,
    InPerson,
    Online,
    Exam,
}

impl EventKind {
    /// Stable lowercase tag, as used in exports and serialized data.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Study => "study",
            EventKind::InPerson => "inperson",
            EventKind::Online => "online",
            EventKind::Exam => "exam",
        }
    }
}

/// Delivery/assessment kind of a course occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    InPerson,
    Online,
    Exam,
}

impl CourseKind {
    /// Whether this kind requires physical campus presence.
    pub fn is_on_campus(&self) -> bool {
        matches!(self, CourseKind::InPerson | CourseKind::Exam)
    }

    pub fn as_event_kind(&self) -> EventKind {
        match self {
            CourseKind::InPerson => EventKind::InPerson,
            CourseKind::Online => EventKind::Online,
            CourseKind::Exam => EventKind::Exam,
        }
    }
}

/// A course occurrence on the weekly grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseEvent {
    pub id: String,
    pub title: String,
    pub kind: CourseKind,
    pub day: Weekday,
    pub start: ClockTime,
    pub end: ClockTime,

    // Registrar fields
    pub course_code: String,
    pub section: String,
    pub location: String,
    pub instructor: Option<String>,
    /// Credit hours; counted once per course, not per occurrence
    pub credits: Option<u32>,

    // Personal annotations
    /// Self-assessed difficulty, 1-5
    pub difficulty: Option<u8>,
    pub sentiment: Option<String>,

    /// Links sibling occurrences created by one multi-day add
    pub recurrence_group_id: Option<String>,
}

/// A study block on the weekly grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyBlock {
    pub id: String,
    pub title: String,
    pub day: Weekday,
    pub start: ClockTime,
    pub end: ClockTime,
    pub notes: Option<String>,
    /// Links sibling occurrences created by one multi-day add
    pub recurrence_group_id: Option<String>,
}

/// A schedule event: either a course occurrence or a study block.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleEvent {
    Course(CourseEvent),
    Study(StudyBlock),
}

impl ScheduleEvent {
    pub fn id(&self) -> &str {
        match self {
            ScheduleEvent::Course(c) => &c.id,
            ScheduleEvent::Study(b) => &b.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ScheduleEvent::Course(c) => &c.title,
            ScheduleEvent::Study(b) => &b.title,
        }
    }

    pub fn day(&self) -> Weekday {
        match self {
            ScheduleEvent::Course(c) => c.day,
            ScheduleEvent::Study(b) => b.day,
        }
    }

    pub fn start(&self) -> ClockTime {
        match self {
            ScheduleEvent::Course(c) => c.start,
            ScheduleEvent::Study(b) => b.start,
        }
    }

    pub fn end(&self) -> ClockTime {
        match self {
            ScheduleEvent::Course(c) => c.end,
            ScheduleEvent::Study(b) => b.end,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ScheduleEvent::Course(c) => c.kind.as_event_kind(),
            ScheduleEvent::Study(_) => EventKind::Study,
        }
    }

    pub fn recurrence_group_id(&self) -> Option<&str> {
        match self {
            ScheduleEvent::Course(c) => c.recurrence_group_id.as_deref(),
            ScheduleEvent::Study(b) => b.recurrence_group_id.as_deref(),
        }
    }

    /// Location for courses; study blocks have none.
    pub fn location(&self) -> Option<&str> {
        match self {
            ScheduleEvent::Course(c) => Some(&c.location),
            ScheduleEvent::Study(_) => None,
        }
    }

    pub fn instructor(&self) -> Option<&str> {
        match self {
            ScheduleEvent::Course(c) => c.instructor.as_deref(),
            ScheduleEvent::Study(_) => None,
        }
    }

    /// Free-form notes for study blocks; courses have none.
    pub fn notes(&self) -> Option<&str> {
        match self {
            ScheduleEvent::Course(_) => None,
            ScheduleEvent::Study(b) => b.notes.as_deref(),
        }
    }

    /// True for the 00:00-00:00 sentinel marking an asynchronous event.
    pub fn is_async(&self) -> bool {
        self.start() == ClockTime::MIDNIGHT && self.end() == ClockTime::MIDNIGHT
    }

    /// Signed duration in minutes. Negative for inverted ranges that
    /// slipped in through imports; aggregations filter those out.
    pub fn duration_minutes(&self) -> i32 {
        self.end().total_minutes() as i32 - self.start().total_minutes() as i32
    }

    pub fn as_course(&self) -> Option<&CourseEvent> {
        match self {
            ScheduleEvent::Course(c) => Some(c),
            ScheduleEvent::Study(_) => None,
        }
    }

    pub fn as_study(&self) -> Option<&StudyBlock> {
        match self {
            ScheduleEvent::Course(_) => None,
            ScheduleEvent::Study(b) => Some(b),
        }
    }
}

/// Authoring payload for a new event: everything except the identity and
/// the weekday slot, which the store (or the recurrence expansion) fills
/// in per occurrence.
#[derive(Debug, Clone)]
pub enum EventTemplate {
    Course(CourseTemplate),
    Study(StudyTemplate),
}

#[derive(Debug, Clone)]
pub struct CourseTemplate {
    pub title: String,
    pub kind: CourseKind,
    pub start: ClockTime,
    pub end: ClockTime,
    pub course_code: String,
    pub section: String,
    pub location: String,
    pub instructor: Option<String>,
    pub credits: Option<u32>,
    pub difficulty: Option<u8>,
    pub sentiment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudyTemplate {
    pub title: String,
    pub start: ClockTime,
    pub end: ClockTime,
    pub notes: Option<String>,
}

impl EventTemplate {
    pub fn start(&self) -> ClockTime {
        match self {
            EventTemplate::Course(t) => t.start,
            EventTemplate::Study(t) => t.start,
        }
    }

    pub fn end(&self) -> ClockTime {
        match self {
            EventTemplate::Course(t) => t.end,
            EventTemplate::Study(t) => t.end,
        }
    }

    /// Mint a fresh occurrence id carrying the variant prefix
    /// ("course-…" or "study-…").
    pub(crate) fn fresh_id(&self) -> String {
        let prefix = match self {
            EventTemplate::Course(_) => "course",
            EventTemplate::Study(_) => "study",
        };
        format!("{}-{}", prefix, Uuid::new_v4())
    }

    /// Materialize one occurrence of this template on a weekday.
    pub(crate) fn instantiate(
        &self,
        id: String,
        day: Weekday,
        recurrence_group_id: Option<String>,
    ) -> ScheduleEvent {
        match self {
            EventTemplate::Course(t) => ScheduleEvent::Course(CourseEvent {
                id,
                title: t.title.clone(),
                kind: t.kind,
                day,
                start: t.start,
                end: t.end,
                course_code: t.course_code.clone(),
                section: t.section.clone(),
                location: t.location.clone(),
                instructor: t.instructor.clone(),
                credits: t.credits,
                difficulty: t.difficulty,
                sentiment: t.sentiment.clone(),
                recurrence_group_id,
            }),
            EventTemplate::Study(t) => ScheduleEvent::Study(StudyBlock {
                id,
                title: t.title.clone(),
                day,
                start: t.start,
                end: t.end,
                notes: t.notes.clone(),
                recurrence_group_id,
            }),
        }
    }
}

/// Field updates for an existing event. `None` fields are left untouched.
///
/// `day` only applies to single-occurrence updates; group updates skip it
/// so every sibling keeps its own slot. Fields that don't exist on the
/// target variant (notes on a course, location on a study block) are
/// ignored. Optional string fields set to an empty string are cleared.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub day: Option<Weekday>,
    pub start: Option<ClockTime>,
    pub end: Option<ClockTime>,
    pub kind: Option<CourseKind>,
    pub course_code: Option<String>,
    pub section: Option<String>,
    pub location: Option<String>,
    pub instructor: Option<String>,
    pub credits: Option<u32>,
    pub difficulty: Option<u8>,
    pub sentiment: Option<String>,
    pub notes: Option<String>,
}

impl EventPatch {
    pub(crate) fn apply_to_course(&self, course: &mut CourseEvent, include_day: bool) {
        if let Some(title) = &self.title {
            course.title = title.clone();
        }
        if include_day {
            if let Some(day) = self.day {
                course.day = day;
            }
        }
        if let Some(start) = self.start {
            course.start = start;
        }
        if let Some(end) = self.end {
            course.end = end;
        }
        if let Some(kind) = self.kind {
            course.kind = kind;
        }
        if let Some(course_code) = &self.course_code {
            course.course_code = course_code.clone();
        }
        if let Some(section) = &self.section {
            course.section = section.clone();
        }
        if let Some(location) = &self.location {
            course.location = location.clone();
        }
        set_optional(&mut course.instructor, &self.instructor);
        if let Some(credits) = self.credits {
            course.credits = Some(credits);
        }
        if let Some(difficulty) = self.difficulty {
            course.difficulty = Some(difficulty);
        }
        set_optional(&mut course.sentiment, &self.sentiment);
    }

    pub(crate) fn apply_to_study(&self, block: &mut StudyBlock, include_day: bool) {
        if let Some(title) = &self.title {
            block.title = title.clone();
        }
        if include_day {
            if let Some(day) = self.day {
                block.day = day;
            }
        }
        if let Some(start) = self.start {
            block.start = start;
        }
        if let Some(end) = self.end {
            block.end = end;
        }
        set_optional(&mut block.notes, &self.notes);
    }
}

/// Patch semantics for optional string fields: absent leaves the value,
/// empty clears it, anything else replaces it.
fn set_optional(target: &mut Option<String>, patch_value: &Option<String>) {
    if let Some(value) = patch_value {
        *target = if value.trim().is_empty() {
            None
        } else {
            Some(value.clone())
        };
    }
}
