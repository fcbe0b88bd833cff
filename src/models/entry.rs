//! Study entry data models.
//!
//! A `StudyEntry` is one logged study session. Entries are created once by
//! the session record assembler and are never edited afterwards; the only
//! later mutation is deletion through the store.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const SECS_PER_HOUR: u64 = 3600;
const SECS_PER_MINUTE: u64 = 60;

/// Accumulated focus time, split the way the entry form records it.
///
/// `minutes` and `seconds` are expected to stay within 0..60 but are not
/// validated; aggregation treats every component as an additive amount.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudyTime {
    pub hours: u32,
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
}

impl StudyTime {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Floor-decompose a second count into hours, minutes and seconds.
    pub fn from_seconds(total: u64) -> Self {
        let hours = total / SECS_PER_HOUR;
        let minutes = (total % SECS_PER_HOUR) / SECS_PER_MINUTE;
        let seconds = total % SECS_PER_MINUTE;
        Self {
            hours: u32::try_from(hours).unwrap_or(u32::MAX),
            minutes: minutes as u32,
            seconds: seconds as u32,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * SECS_PER_HOUR
            + u64::from(self.minutes) * SECS_PER_MINUTE
            + u64::from(self.seconds)
    }

    /// `hours + minutes/60 + seconds/3600`, the unit every analytics total uses.
    pub fn fractional_hours(&self) -> f64 {
        f64::from(self.hours) + f64::from(self.minutes) / 60.0 + f64::from(self.seconds) / 3600.0
    }
}

impl fmt::Display for StudyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        write!(f, "{}m", self.minutes)?;
        if self.seconds > 0 {
            write!(f, " {}s", self.seconds)?;
        }
        Ok(())
    }
}

/// The four independent "what did I cover" checkboxes of an entry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionFlags {
    pub theory_done: bool,
    pub questions_done: bool,
    pub law_doctrine_done: bool,
    pub active_review_done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyEntry {
    pub id: String,
    pub date: NaiveDate,
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub completion: CompletionFlags,
    /// Only meaningful when `completion.questions_done` is set; never enforced.
    pub questions_count: u32,
    pub elapsed: StudyTime,
    pub pomodoro_count: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_seconds_recomposes_exactly() {
        for total in [0u64, 59, 60, 61, 3599, 3600, 3661, 86_399, 90_061] {
            let time = StudyTime::from_seconds(total);
            assert_eq!(time.total_seconds(), total);
            assert!(time.minutes < 60);
            assert!(time.seconds < 60);
        }
    }

    #[test]
    fn fractional_hours_adds_all_components() {
        let time = StudyTime::new(1, 30, 0);
        assert!((time.fractional_hours() - 1.5).abs() < 1e-9);

        let time = StudyTime::new(0, 0, 36);
        assert!((time.fractional_hours() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn display_omits_zero_hours_and_seconds() {
        assert_eq!(StudyTime::new(0, 45, 0).to_string(), "45m");
        assert_eq!(StudyTime::new(1, 30, 0).to_string(), "1h 30m");
        assert_eq!(StudyTime::new(0, 2, 5).to_string(), "2m 5s");
        assert_eq!(StudyTime::new(2, 0, 9).to_string(), "2h 0m 9s");
    }
}
