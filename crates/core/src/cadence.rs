//! Reminder cadence evaluation.
//!
//! The sweep recomputes eligibility from the calendar on every run instead
//! of persisting a last-sent marker, so a crashed run can simply be
//! repeated. Reminders land on Mondays (weekly/biweekly) or the first of
//! the month (monthly).

use chrono::{Datelike, NaiveDate, Weekday};

/// Weekly reminders fire on this weekday.
pub const REMINDER_WEEKDAY: Weekday = Weekday::Mon;

/// Frequency values accepted by `notification_preferences.reminder_frequency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl ReminderFrequency {
    /// Parse a stored frequency string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// The string stored in the preferences table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    /// Whether a reminder at this frequency fires on `date`.
    ///
    /// - weekly: every Monday
    /// - biweekly: Mondays in even ISO weeks
    /// - monthly: the first day of the month
    pub fn fires_on(self, date: NaiveDate) -> bool {
        match self {
            Self::Weekly => date.weekday() == REMINDER_WEEKDAY,
            Self::Biweekly => {
                date.weekday() == REMINDER_WEEKDAY && date.iso_week().week() % 2 == 0
            }
            Self::Monthly => date.day() == 1,
        }
    }
}
