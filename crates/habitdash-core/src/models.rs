//! Data models for habitdash
//!
//! Records (`Habit`, `Expense`) are what the repository and the local cache
//! store. The view structs at the bottom are derived by the statistics engine
//! and never persisted.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything that carries a creation timestamp
///
/// The statistics engine filters and buckets records by this instant.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

// ========== Records ==========

/// Reminder settings attached to a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Local time of day the reminder fires
    pub time: NaiveTime,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday
    pub days: Vec<u8>,
}

impl ReminderConfig {
    pub fn new(time: NaiveTime, days: Vec<u8>) -> Self {
        Self {
            enabled: true,
            time,
            days,
        }
    }

    /// Day indices in range, sorted and deduplicated
    pub fn normalized_days(&self) -> Vec<u8> {
        let mut days: Vec<u8> = self.days.iter().copied().filter(|d| *d < 7).collect();
        days.sort_unstable();
        days.dedup();
        days
    }
}

/// A habit the user is tracking
///
/// `completed` is a point-in-time flag without history. Statistics treat
/// `created_at` as the day the habit was acted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub reminder: Option<ReminderConfig>,
}

impl Habit {
    /// Create a new, not yet completed habit with a fresh id
    pub fn new(user_id: Uuid, title: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            completed: false,
            created_at,
            reminder: None,
        }
    }

    pub fn is_reminder_enabled(&self) -> bool {
        self.reminder.as_ref().is_some_and(|r| r.enabled)
    }

    /// Enabled and with at least one day to fire on
    pub fn has_valid_reminder(&self) -> bool {
        self.reminder
            .as_ref()
            .is_some_and(|r| r.enabled && !r.normalized_days().is_empty())
    }
}

impl Timestamped for Habit {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A single expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Free text, compared case-sensitively
    pub category: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(user_id: Uuid, category: &str, amount: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category: category.to_string(),
            amount,
            created_at,
        }
    }
}

impl Timestamped for Expense {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ========== Periods ==========

/// Named window used to scope statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    #[default]
    Month,
    ThreeMonths,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Week,
        Period::Month,
        Period::ThreeMonths,
        Period::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::ThreeMonths => "3m",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "w" => Ok(Self::Week),
            "month" | "m" => Ok(Self::Month),
            "3m" | "3months" | "three_months" | "quarter" => Ok(Self::ThreeMonths),
            "year" | "y" => Ok(Self::Year),
            _ => Err(format!(
                "Unknown period: {} (valid: week, month, 3m, year)",
                s
            )),
        }
    }
}

// ========== Derived View Models ==========

/// Completed habits on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDayData {
    pub date: NaiveDate,
    pub count: usize,
    pub label: String,
}

/// Completion rate of a single habit within the selected period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletionRate {
    pub habit_id: Uuid,
    pub title: String,
    /// Always within [0, 1]
    pub rate: f64,
    pub completed_days: i64,
    pub total_days: i64,
}

/// Spending for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryExpense {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

/// One bucket of the expense time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTimePoint {
    /// First local day covered by the bucket
    pub date: NaiveDate,
    pub amount: f64,
    pub label: String,
}

/// Map a reminder day index (0 = Sunday) to a chrono weekday
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
