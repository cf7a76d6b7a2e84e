//! Wall-clock time model for the weekly grid.
//!
//! All schedule times are "HH:MM" 24-hour values in the schedule's fixed
//! base timezone. A start/end pair of 00:00/00:00 is the sentinel for
//! asynchronous (untimed) events; conflict checks and grid placement skip
//! those upstream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

const MAX_MINUTES: u16 = 23 * 60 + 59;

/// A wall-clock time of day.
///
/// Ordering is (hour, minute), which agrees with lexicographic order of
/// the zero-padded "HH:MM" form. Serialized as that string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    /// The 00:00 sentinel used by asynchronous events.
    pub const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };

    /// Build a validated time. Out-of-range components are rejected with
    /// `InvalidTimeFormat`, same as string parsing.
    pub fn new(hour: u8, minute: u8) -> ScheduleResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTimeFormat(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Ok(ClockTime { hour, minute })
    }

    /// Minutes since midnight. All interval math runs on this.
    pub fn total_minutes(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Rebuild a time from minutes since midnight, clamping anything past
    /// 23:59. Callers pass minute counts derived from valid times.
    pub fn from_minutes(minutes: u16) -> ClockTime {
        let m = minutes.min(MAX_MINUTES);
        ClockTime {
            hour: (m / 60) as u8,
            minute: (m % 60) as u8,
        }
    }

    /// Format as 12-hour "h:mm AM/PM" after applying a whole-hour display
    /// offset.
    ///
    /// The adjusted hour is clamped to 0..=23 instead of wrapping, so an
    /// event near midnight viewed in an offset zone stays pinned to the
    /// edge of the same day. Known approximation, kept from the app
    /// behavior this engine replaces.
    pub fn format_display(&self, offset_hours: i32) -> String {
        let adjusted = (self.hour as i32 + offset_hours).clamp(0, 23);
        let period = if adjusted >= 12 { "PM" } else { "AM" };
        let display_hour = match adjusted {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        format!("{}:{:02} {}", display_hour, self.minute, period)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ScheduleError;

    /// Parse "HH:MM". Exactly two numeric parts, hour 0-23, minute 0-59;
    /// anything else is `InvalidTimeFormat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTimeFormat(s.to_string());

        let (hour_part, minute_part) = s.split_once(':').ok_or_else(invalid)?;
        if minute_part.contains(':') {
            return Err(invalid());
        }
        let hour: u8 = hour_part.trim().parse().map_err(|_| invalid())?;
        let minute: u8 = minute_part.trim().parse().map_err(|_| invalid())?;

        ClockTime::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display-offset presets for the timezones the grid can render in.
///
/// Offsets are whole hours relative to the schedule's base (Central)
/// timezone. This is presentation math only, not IANA timezone handling:
/// stored times never change, only their rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayZone {
    #[serde(rename = "PT")]
    Pacific,
    #[serde(rename = "MT")]
    Mountain,
    #[serde(rename = "CT")]
    Central,
    #[serde(rename = "ET")]
    Eastern,
}

impl DisplayZone {
    pub fn offset_hours(&self) -> i32 {
        match self {
            DisplayZone::Pacific => -3,
            DisplayZone::Mountain => -1,
            DisplayZone::Central => 0,
            DisplayZone::Eastern => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayZone::Pacific => "Pacific",
            DisplayZone::Mountain => "Mountain",
            DisplayZone::Central => "Central",
            DisplayZone::Eastern => "Eastern",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_times() {
        let time: ClockTime = "09:30".parse().unwrap();
        assert_eq!(time, ClockTime { hour: 9, minute: 30 });

        let midnight: ClockTime = "00:00".parse().unwrap();
        assert_eq!(midnight, ClockTime::MIDNIGHT);

        let late: ClockTime = "23:59".parse().unwrap();
        assert_eq!(late.total_minutes(), 1439);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["", "9", "24:00", "12:60", "ab:cd", "10:15:30", "10-15"] {
            let result = input.parse::<ClockTime>();
            assert!(
                matches!(result, Err(ScheduleError::InvalidTimeFormat(_))),
                "'{}' should fail with InvalidTimeFormat, got {:?}",
                input,
                result
            );
        }
    }

    #[test]
    fn test_display_zero_pads() {
        let time = ClockTime::new(8, 5).unwrap();
        assert_eq!(time.to_string(), "08:05");
    }

    #[test]
    fn test_parse_display_round_trip() {
        for input in ["00:00", "09:05", "13:45", "23:59"] {
            let time: ClockTime = input.parse().unwrap();
            assert_eq!(time.to_string(), input);
        }
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let nine: ClockTime = "09:00".parse().unwrap();
        let nine_thirty: ClockTime = "09:30".parse().unwrap();
        let noon: ClockTime = "12:00".parse().unwrap();
        assert!(nine < nine_thirty);
        assert!(nine_thirty < noon);
        assert!("09:30" < "12:00");
    }

    #[test]
    fn test_from_minutes_round_trip_and_clamp() {
        let time = ClockTime::from_minutes(610);
        assert_eq!(time.to_string(), "10:10");
        assert_eq!(ClockTime::from_minutes(time.total_minutes()), time);

        // past end of day clamps rather than wrapping
        assert_eq!(ClockTime::from_minutes(5000).to_string(), "23:59");
    }

    #[test]
    fn test_format_display_twelve_hour_rendering() {
        let midnight = ClockTime::MIDNIGHT;
        assert_eq!(midnight.format_display(0), "12:00 AM");

        let noon = ClockTime::new(12, 0).unwrap();
        assert_eq!(noon.format_display(0), "12:00 PM");

        let afternoon = ClockTime::new(14, 30).unwrap();
        assert_eq!(afternoon.format_display(0), "2:30 PM");
    }

    #[test]
    fn test_format_display_clamps_at_day_edges() {
        // 23:30 shown one hour east stays on the same day at 11:30 PM
        let late = ClockTime::new(23, 30).unwrap();
        assert_eq!(late.format_display(1), "11:30 PM");

        // 01:15 shown three hours west clamps to the 12 AM hour
        let early = ClockTime::new(1, 15).unwrap();
        assert_eq!(early.format_display(-3), "12:15 AM");
    }

    #[test]
    fn test_display_zone_offsets_and_labels() {
        assert_eq!(DisplayZone::Central.offset_hours(), 0);
        assert_eq!(DisplayZone::Pacific.offset_hours(), -3);
        assert_eq!(DisplayZone::Mountain.offset_hours(), -1);
        assert_eq!(DisplayZone::Eastern.offset_hours(), 1);
        assert_eq!(DisplayZone::Pacific.label(), "Pacific");
        assert_eq!(serde_json::to_string(&DisplayZone::Eastern).unwrap(), "\"ET\"");
    }

    #[test]
    fn test_clock_time_serde_as_string() {
        let time = ClockTime::new(9, 5).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"09:05\"");

        let parsed: ClockTime = serde_json::from_str("\"14:45\"").unwrap();
        assert_eq!(parsed, ClockTime::new(14, 45).unwrap());

        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }
}
