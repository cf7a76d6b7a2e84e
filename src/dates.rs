//! Calendar-dated markers: exams, deadlines, breaks.
//!
//! Unlike weekly events these carry real dates, not weekday slots. They
//! never enter conflict detection; they exist for list views and the
//! upcoming-deadlines feed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of an important date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Event,
    Deadline,
    Break,
    Exam,
    Finals,
}

/// A dated marker on the semester calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportantDate {
    pub id: String,
    pub title: String,
    /// First (or only) day of the span
    pub date: NaiveDate,
    /// Inclusive last day for multi-day spans; None means single-day
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub kind: DateKind,
}

impl ImportantDate {
    /// Last day of the span; the start date itself for single-day markers.
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.date)
    }

    /// Whether the span covers the given calendar date.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date <= date && date <= self.last_day()
    }

    pub fn is_multi_day(&self) -> bool {
        self.end_date.is_some_and(|end| end > self.date)
    }
}

/// Authoring payload for an important date; the store assigns the id.
#[derive(Debug, Clone)]
pub struct DateTemplate {
    pub title: String,
    pub date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub kind: DateKind,
}

impl DateTemplate {
    pub(crate) fn fresh_id() -> String {
        format!("date-{}", Uuid::new_v4())
    }

    pub(crate) fn instantiate(self, id: String) -> ImportantDate {
        ImportantDate {
            id,
            title: self.title,
            date: self.date,
            end_date: self.end_date,
            description: self.description,
            kind: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_span() {
        let date = ImportantDate {
            id: "date-1".to_string(),
            title: "Midterm".to_string(),
            date: ymd(2025, 10, 14),
            end_date: None,
            description: None,
            kind: DateKind::Exam,
        };
        assert!(!date.is_multi_day());
        assert_eq!(date.last_day(), ymd(2025, 10, 14));
        assert!(date.contains(ymd(2025, 10, 14)));
        assert!(!date.contains(ymd(2025, 10, 15)));
    }

    #[test]
    fn test_multi_day_span_contains_interior_days() {
        let date = ImportantDate {
            id: "date-2".to_string(),
            title: "Spring Break".to_string(),
            date: ymd(2026, 3, 16),
            end_date: Some(ymd(2026, 3, 20)),
            description: None,
            kind: DateKind::Break,
        };
        assert!(date.is_multi_day());
        assert!(date.contains(ymd(2026, 3, 16)));
        assert!(date.contains(ymd(2026, 3, 18)));
        assert!(date.contains(ymd(2026, 3, 20)));
        assert!(!date.contains(ymd(2026, 3, 21)));
    }

    #[test]
    fn test_date_kind_serde_tags() {
        assert_eq!(serde_json::to_string(&DateKind::Finals).unwrap(), "\"finals\"");
        let kind: DateKind = serde_json::from_str("\"deadline\"").unwrap();
        assert_eq!(kind, DateKind::Deadline);
    }
}
