//! Shared constants for the schedule engine.

use chrono::Weekday;

/// Weekdays in grid display order; the week starts on Monday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Days without an export before a backup reminder is due.
pub const BACKUP_REMINDER_AFTER_DAYS: i64 = 7;
