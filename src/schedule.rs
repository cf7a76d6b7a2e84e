//! The schedule store.
//!
//! `Schedule` owns the course, study-block and important-date collections
//! plus metadata, and is the only code that mints event identity or
//! touches recurrence-group membership. Callers read snapshots and request
//! mutations; a failed mutation leaves the store exactly as it was.

use chrono::{DateTime, Utc, Weekday};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::conflict::{self, EventConflict};
use crate::constants::BACKUP_REMINDER_AFTER_DAYS;
use crate::dates::{DateTemplate, ImportantDate};
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{CourseEvent, EventPatch, EventTemplate, ScheduleEvent, StudyBlock};
use crate::recurrence::{self, EditScope};
use crate::storage::{KeyValueStore, keys};
use crate::time::ClockTime;

/// Bookkeeping for backup nudges. `created_at` is set once when the store
/// first seeds; `last_exported_at` moves on every recorded export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub created_at: DateTime<Utc>,
    pub last_exported_at: Option<DateTime<Utc>>,
}

impl ScheduleMetadata {
    fn new(created_at: DateTime<Utc>) -> Self {
        ScheduleMetadata {
            created_at,
            last_exported_at: None,
        }
    }

    /// Days since the last export (or since creation when never exported),
    /// once that reaches the reminder threshold. None while fresh.
    pub fn backup_reminder_days(&self, now: DateTime<Utc>) -> Option<i64> {
        let reference = self.last_exported_at.unwrap_or(self.created_at);
        let days = (now - reference).num_days();
        (days >= BACKUP_REMINDER_AFTER_DAYS).then_some(days)
    }
}

/// Everything the schedule persists, bundled for backup and restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub courses: Vec<CourseEvent>,
    pub study_blocks: Vec<StudyBlock>,
    pub important_dates: Vec<ImportantDate>,
    pub metadata: ScheduleMetadata,
}

/// Records produced by an import adapter, ready to merge.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub courses: Vec<CourseEvent>,
    pub study_blocks: Vec<StudyBlock>,
    pub important_dates: Vec<ImportantDate>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.study_blocks.is_empty() && self.important_dates.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.courses.len() + self.study_blocks.len() + self.important_dates.len()
    }
}

/// How `merge` treats the existing collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Keep existing records; incoming ones with a matching id overwrite.
    Append,
    /// Drop every collection first, then take the batch.
    Replace,
}

/// The in-memory event store backing the weekly grid.
#[derive(Debug, Clone)]
pub struct Schedule {
    courses: Vec<CourseEvent>,
    study_blocks: Vec<StudyBlock>,
    important_dates: Vec<ImportantDate>,
    metadata: ScheduleMetadata,
}

impl Schedule {
    /// Empty schedule created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Schedule {
            courses: Vec::new(),
            study_blocks: Vec::new(),
            important_dates: Vec::new(),
            metadata: ScheduleMetadata::new(now),
        }
    }

    // ---- persistence ----

    /// Load a schedule from storage. Missing keys seed empty collections,
    /// and missing metadata seeds a fresh record stamped `now`, so a blank
    /// store yields a usable empty schedule rather than an error.
    pub fn load(store: &dyn KeyValueStore, now: DateTime<Utc>) -> ScheduleResult<Schedule> {
        let courses = read_collection(store, keys::COURSES)?;
        let study_blocks = read_collection(store, keys::STUDY_BLOCKS)?;
        let important_dates = read_collection(store, keys::IMPORTANT_DATES)?;
        let metadata = match store.get(keys::METADATA)? {
            Some(raw) => from_json(&raw)?,
            None => ScheduleMetadata::new(now),
        };

        Ok(Schedule {
            courses,
            study_blocks,
            important_dates,
            metadata,
        })
    }

    /// Write every collection, the metadata, and the combined snapshot.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> ScheduleResult<()> {
        store.set(keys::COURSES, &to_json(&self.courses)?)?;
        store.set(keys::STUDY_BLOCKS, &to_json(&self.study_blocks)?)?;
        store.set(keys::IMPORTANT_DATES, &to_json(&self.important_dates)?)?;
        store.set(keys::METADATA, &to_json(&self.metadata)?)?;
        store.set(keys::SNAPSHOT, &to_json(&self.snapshot())?)?;
        Ok(())
    }

    /// Bundle the full persisted state (the backup document).
    pub fn snapshot(&self) -> ScheduleSnapshot {
        ScheduleSnapshot {
            courses: self.courses.clone(),
            study_blocks: self.study_blocks.clone(),
            important_dates: self.important_dates.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Replace the entire store contents from a snapshot document.
    pub fn restore(&mut self, snapshot: ScheduleSnapshot) {
        self.courses = snapshot.courses;
        self.study_blocks = snapshot.study_blocks;
        self.important_dates = snapshot.important_dates;
        self.metadata = snapshot.metadata;
    }

    // ---- reads ----

    /// All events, courses first then study blocks, insertion order within
    /// each. The order carries no meaning; views sort for display.
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.courses
            .iter()
            .cloned()
            .map(ScheduleEvent::Course)
            .chain(self.study_blocks.iter().cloned().map(ScheduleEvent::Study))
            .collect()
    }

    pub fn events_on(&self, day: Weekday) -> Vec<ScheduleEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.day() == day)
            .collect()
    }

    pub fn courses(&self) -> &[CourseEvent] {
        &self.courses
    }

    pub fn study_blocks(&self) -> &[StudyBlock] {
        &self.study_blocks
    }

    pub fn important_dates(&self) -> &[ImportantDate] {
        &self.important_dates
    }

    pub fn metadata(&self) -> &ScheduleMetadata {
        &self.metadata
    }

    pub fn event_count(&self) -> usize {
        self.courses.len() + self.study_blocks.len()
    }

    pub fn find_event(&self, id: &str) -> Option<ScheduleEvent> {
        if let Some(course) = self.courses.iter().find(|c| c.id == id) {
            return Some(ScheduleEvent::Course(course.clone()));
        }
        self.study_blocks
            .iter()
            .find(|b| b.id == id)
            .map(|b| ScheduleEvent::Study(b.clone()))
    }

    // ---- event mutations ----

    /// Add a single (non-recurring) event on one weekday. Returns its id.
    pub fn add_event(&mut self, template: &EventTemplate, day: Weekday) -> ScheduleResult<String> {
        validate_times(template.start(), template.end())?;
        let id = template.fresh_id();
        self.insert_event(template.instantiate(id.clone(), day, None));
        Ok(id)
    }

    /// Add one authoring action across several weekdays as a linked
    /// recurrence group. Returns the occurrence ids, one per distinct day.
    pub fn add_recurring(
        &mut self,
        template: &EventTemplate,
        days: &[Weekday],
    ) -> ScheduleResult<Vec<String>> {
        validate_times(template.start(), template.end())?;
        let events = recurrence::expand(template, days)?;
        let ids = events.iter().map(|event| event.id().to_string()).collect();
        for event in events {
            self.insert_event(event);
        }
        Ok(ids)
    }

    /// Patch a single event in place. The patched times are validated
    /// before anything is written, so a rejected update changes nothing.
    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> ScheduleResult<()> {
        if let Some(index) = self.courses.iter().position(|c| c.id == id) {
            let mut updated = self.courses[index].clone();
            patch.apply_to_course(&mut updated, true);
            validate_times(updated.start, updated.end)?;
            self.courses[index] = updated;
            return Ok(());
        }

        if let Some(index) = self.study_blocks.iter().position(|b| b.id == id) {
            let mut updated = self.study_blocks[index].clone();
            patch.apply_to_study(&mut updated, true);
            validate_times(updated.start, updated.end)?;
            self.study_blocks[index] = updated;
            return Ok(());
        }

        Err(ScheduleError::EventNotFound(id.to_string()))
    }

    /// Remove a single event by id.
    pub fn remove_event(&mut self, id: &str) -> ScheduleResult<()> {
        if let Some(index) = self.courses.iter().position(|c| c.id == id) {
            self.courses.remove(index);
            return Ok(());
        }
        if let Some(index) = self.study_blocks.iter().position(|b| b.id == id) {
            self.study_blocks.remove(index);
            return Ok(());
        }
        Err(ScheduleError::EventNotFound(id.to_string()))
    }

    // ---- recurrence group operations ----

    /// Whether an edit or delete of this event needs the one-vs-all scope
    /// decision: true iff it belongs to a recurrence group with at least
    /// two surviving members. Callers ask before every such mutation; the
    /// store never picks a scope silently.
    pub fn needs_scope_decision(&self, id: &str) -> bool {
        let Some(event) = self.find_event(id) else {
            return false;
        };
        let Some(group_id) = event.recurrence_group_id() else {
            return false;
        };
        self.group_len(group_id) > 1
    }

    fn group_len(&self, group_id: &str) -> usize {
        let in_courses = self
            .courses
            .iter()
            .filter(|c| c.recurrence_group_id.as_deref() == Some(group_id))
            .count();
        let in_blocks = self
            .study_blocks
            .iter()
            .filter(|b| b.recurrence_group_id.as_deref() == Some(group_id))
            .count();
        in_courses + in_blocks
    }

    /// Apply one patch to every member of a recurrence group. Each sibling
    /// keeps its own id and weekday; the patch's `day` is ignored here. The
    /// patched times are validated for every member before anything is
    /// written, so a rejected update changes nothing.
    pub fn update_group(&mut self, group_id: &str, patch: &EventPatch) -> ScheduleResult<()> {
        // A single-occurrence edit can leave one sibling's times diverged
        // from the rest, so each member's resulting range is checked, not
        // just a sample's.
        let mut members = 0;
        for course in self.courses.iter() {
            if course.recurrence_group_id.as_deref() == Some(group_id) {
                validate_times(
                    patch.start.unwrap_or(course.start),
                    patch.end.unwrap_or(course.end),
                )?;
                members += 1;
            }
        }
        for block in self.study_blocks.iter() {
            if block.recurrence_group_id.as_deref() == Some(group_id) {
                validate_times(
                    patch.start.unwrap_or(block.start),
                    patch.end.unwrap_or(block.end),
                )?;
                members += 1;
            }
        }
        if members == 0 {
            return Err(ScheduleError::GroupNotFound(group_id.to_string()));
        }

        for course in self.courses.iter_mut() {
            if course.recurrence_group_id.as_deref() == Some(group_id) {
                patch.apply_to_course(course, false);
            }
        }
        for block in self.study_blocks.iter_mut() {
            if block.recurrence_group_id.as_deref() == Some(group_id) {
                patch.apply_to_study(block, false);
            }
        }
        Ok(())
    }

    /// Patch an event honoring the caller's recorded scope decision. A
    /// whole-group scope on a non-recurring event degrades to the single
    /// update, so callers can pass their answer through unconditionally.
    pub fn update_with_scope(
        &mut self,
        id: &str,
        patch: &EventPatch,
        scope: EditScope,
    ) -> ScheduleResult<()> {
        match (scope, self.group_of(id)) {
            (EditScope::WholeGroup, Some(group_id)) => self.update_group(&group_id, patch),
            _ => self.update_event(id, patch),
        }
    }

    /// Remove an event honoring the scope decision. Returns how many
    /// events went away.
    pub fn remove_with_scope(&mut self, id: &str, scope: EditScope) -> ScheduleResult<usize> {
        match (scope, self.group_of(id)) {
            (EditScope::WholeGroup, Some(group_id)) => self.delete_group(&group_id),
            _ => {
                self.remove_event(id)?;
                Ok(1)
            }
        }
    }

    fn group_of(&self, id: &str) -> Option<String> {
        self.find_event(id)
            .and_then(|event| event.recurrence_group_id().map(str::to_string))
    }

    /// Remove every member of a recurrence group. Returns how many events
    /// went away.
    pub fn delete_group(&mut self, group_id: &str) -> ScheduleResult<usize> {
        let before = self.event_count();
        self.courses
            .retain(|c| c.recurrence_group_id.as_deref() != Some(group_id));
        self.study_blocks
            .retain(|b| b.recurrence_group_id.as_deref() != Some(group_id));

        let removed = before - self.event_count();
        if removed == 0 {
            return Err(ScheduleError::GroupNotFound(group_id.to_string()));
        }
        Ok(removed)
    }

    // ---- important dates ----

    /// Add an important date. Multi-day spans must end on or after their
    /// start. Returns the new id.
    pub fn add_date(&mut self, template: DateTemplate) -> ScheduleResult<String> {
        if let Some(end_date) = template.end_date {
            if end_date < template.date {
                return Err(ScheduleError::InvalidDateRange {
                    start_date: template.date,
                    end_date,
                });
            }
        }
        let id = DateTemplate::fresh_id();
        self.important_dates.push(template.instantiate(id.clone()));
        Ok(id)
    }

    pub fn remove_date(&mut self, id: &str) -> ScheduleResult<()> {
        let Some(index) = self.important_dates.iter().position(|d| d.id == id) else {
            return Err(ScheduleError::DateNotFound(id.to_string()));
        };
        self.important_dates.remove(index);
        Ok(())
    }

    // ---- import merge ----

    /// Merge an imported batch. Records are de-duplicated by id with the
    /// incoming side winning, so re-importing the same file is idempotent.
    /// Batch contents are taken as-is: adapters own field hygiene, and an
    /// overlapping result is fine because conflicts stay advisory.
    pub fn merge(&mut self, batch: ImportBatch, mode: MergeMode) {
        if mode == MergeMode::Replace {
            self.courses.clear();
            self.study_blocks.clear();
            self.important_dates.clear();
        }
        for course in batch.courses {
            upsert_by_id(&mut self.courses, course, |c| &c.id);
        }
        for block in batch.study_blocks {
            upsert_by_id(&mut self.study_blocks, block, |b| &b.id);
        }
        for date in batch.important_dates {
            upsert_by_id(&mut self.important_dates, date, |d| &d.id);
        }
    }

    // ---- metadata ----

    /// Record a successful export at `at`.
    pub fn mark_exported(&mut self, at: DateTime<Utc>) {
        self.metadata.last_exported_at = Some(at);
    }

    // ---- conflict views ----

    /// All current conflicts, one entry per unordered pair.
    pub fn detect_conflicts(&self) -> Vec<EventConflict> {
        conflict::detect_all_conflicts(&self.events())
    }

    /// Ids of every event involved in a conflict.
    pub fn conflicting_ids(&self) -> std::collections::HashSet<String> {
        conflict::conflicting_event_ids(&self.events())
    }

    /// First stored event that would overlap the candidate slot, cloned
    /// out for warning display. `exclude_id` skips the event being edited.
    pub fn first_conflict_for(
        &self,
        day: Weekday,
        start: ClockTime,
        end: ClockTime,
        exclude_id: Option<&str>,
    ) -> Option<ScheduleEvent> {
        let events = self.events();
        conflict::check_event_conflict(day, start, end, &events, exclude_id).cloned()
    }

    fn insert_event(&mut self, event: ScheduleEvent) {
        match event {
            ScheduleEvent::Course(course) => self.courses.push(course),
            ScheduleEvent::Study(block) => self.study_blocks.push(block),
        }
    }
}

/// Times must run forward unless both sit on the async 00:00 sentinel.
fn validate_times(start: ClockTime, end: ClockTime) -> ScheduleResult<()> {
    if start == ClockTime::MIDNIGHT && end == ClockTime::MIDNIGHT {
        return Ok(());
    }
    if end <= start {
        return Err(ScheduleError::InvalidTimeRange { start, end });
    }
    Ok(())
}

fn upsert_by_id<T, F>(items: &mut Vec<T>, incoming: T, id_of: F)
where
    F: Fn(&T) -> &str,
{
    match items.iter().position(|item| id_of(item) == id_of(&incoming)) {
        Some(index) => items[index] = incoming,
        None => items.push(incoming),
    }
}

fn read_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> ScheduleResult<Vec<T>> {
    match store.get(key)? {
        Some(raw) => from_json(&raw),
        None => Ok(Vec::new()),
    }
}

fn to_json<T: Serialize>(value: &T) -> ScheduleResult<String> {
    serde_json::to_string(value).map_err(|e| ScheduleError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(raw: &str) -> ScheduleResult<T> {
    serde_json::from_str(raw).map_err(|e| ScheduleError::Serialization(e.to_string()))
}
