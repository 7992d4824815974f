//! Scheduled time blocks.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::energy::EnergyLevel;
use crate::error::ValidationError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A block of wall-clock time reserved for a task.
///
/// Whether a block is "active" is derived from the current time, never
/// stored: the block is active while the clock is within
/// `[start, start + duration)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Unique identifier
    pub id: String,
    /// Start of the block as "HH:MM" wall-clock time.
    pub start_time: String,
    /// Length in minutes; always greater than zero.
    pub duration: u32,
    /// What the block is reserved for.
    pub task: String,
    #[serde(default)]
    pub energy: EnergyLevel,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TimeBlock {
    /// Create a new block, validating the start time and duration.
    pub fn new(
        start_time: &str,
        duration: u32,
        task: impl Into<String>,
        energy: EnergyLevel,
    ) -> Result<Self, ValidationError> {
        parse_hhmm(start_time)?;
        if duration == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        let now = Utc::now();
        Ok(Self {
            id: format!("block-{}-{}", now.timestamp_millis(), uuid::Uuid::new_v4()),
            start_time: start_time.to_string(),
            duration,
            task: task.into(),
            energy,
            created_at: now,
        })
    }

    /// Start of the block in minutes since midnight, if parseable.
    pub fn start_minutes(&self) -> Option<u32> {
        parse_hhmm(&self.start_time).ok()
    }

    /// Whether `at` falls within `[start, start + duration)`.
    ///
    /// Blocks running past midnight wrap into the next day. A block whose
    /// start time no longer parses is never active.
    pub fn contains(&self, at: NaiveTime) -> bool {
        let Some(start) = self.start_minutes() else {
            return false;
        };
        let minute = at.hour() * 60 + at.minute();
        let end = start + self.duration;
        if end <= MINUTES_PER_DAY {
            start <= minute && minute < end
        } else {
            minute >= start || minute < end - MINUTES_PER_DAY
        }
    }
}

/// Parse "HH:MM" into minutes since midnight.
pub(crate) fn parse_hhmm(s: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
    let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours >= 24 || minutes >= 60 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parse_accepts_valid_times() {
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
        assert_eq!(parse_hhmm("09:30").unwrap(), 570);
        assert_eq!(parse_hhmm("23:59").unwrap(), 1439);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("12:60").is_err());
        assert!(parse_hhmm("noon").is_err());
        assert!(parse_hhmm("9h30").is_err());
        assert!(parse_hhmm("").is_err());
    }

    #[test]
    fn new_rejects_zero_duration() {
        let err = TimeBlock::new("09:00", 0, "standup", EnergyLevel::Medium).unwrap_err();
        assert!(matches!(err, ValidationError::ZeroDuration));
    }

    #[test]
    fn new_rejects_bad_start() {
        assert!(TimeBlock::new("25:00", 30, "x", EnergyLevel::Medium).is_err());
    }

    #[test]
    fn active_within_window() {
        let block = TimeBlock::new("09:00", 90, "deep work", EnergyLevel::High).unwrap();
        assert!(!block.contains(t(8, 59)));
        assert!(block.contains(t(9, 0)));
        assert!(block.contains(t(10, 29)));
        assert!(!block.contains(t(10, 30)));
    }

    #[test]
    fn window_end_is_exclusive() {
        let block = TimeBlock::new("12:00", 1, "micro", EnergyLevel::Low).unwrap();
        assert!(block.contains(t(12, 0)));
        assert!(!block.contains(t(12, 1)));
    }

    #[test]
    fn wraps_past_midnight() {
        let block = TimeBlock::new("23:30", 60, "night owl", EnergyLevel::Low).unwrap();
        assert!(block.contains(t(23, 45)));
        assert!(block.contains(t(0, 15)));
        assert!(!block.contains(t(0, 30)));
        assert!(!block.contains(t(12, 0)));
    }

    #[test]
    fn block_ending_at_midnight_does_not_wrap() {
        let block = TimeBlock::new("23:00", 60, "wind down", EnergyLevel::Low).unwrap();
        assert!(block.contains(t(23, 59)));
        assert!(!block.contains(t(0, 0)));
    }
}
