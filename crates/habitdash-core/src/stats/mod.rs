//! Statistics engine
//!
//! Pure functions that turn habit and expense records into period-scoped
//! metrics: per-day activity, streaks, completion rates, category breakdowns,
//! time-bucketed series and period-over-period deltas.
//!
//! Nothing here performs I/O or mutates its inputs. The current instant is
//! carried by [`StatsContext`] so a whole computation sees one consistent
//! `now`. Degenerate input yields empty collections, zeros or `None`, never
//! an error.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use habitdash_core::stats::{DashboardStats, StatsContext};
//!
//! let ctx = StatsContext::new(Utc::now(), Calendar::new(Local), Locale::En);
//! let stats = DashboardStats::compute(&habits, &expenses, Period::Month, &ctx);
//! ```

pub mod dashboard;
pub mod expenses;
pub mod habits;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::calendar::{Calendar, Clock};
use crate::format::Locale;
use crate::models::Timestamped;

pub use dashboard::DashboardStats;
pub use expenses::{
    expense_change_percentage, expenses_by_category, expenses_over_time, top_categories,
    total_amount,
};
pub use habits::{
    best_day_of_week, current_streak, habit_completion_rates, habits_per_day, progress,
};

/// Everything a statistics computation needs besides the records
#[derive(Debug, Clone)]
pub struct StatsContext<Tz: TimeZone> {
    pub now: DateTime<Utc>,
    pub calendar: Calendar<Tz>,
    pub locale: Locale,
}

impl<Tz: TimeZone> StatsContext<Tz> {
    pub fn new(now: DateTime<Utc>, calendar: Calendar<Tz>, locale: Locale) -> Self {
        Self {
            now,
            calendar,
            locale,
        }
    }

    /// Context pinned to the clock's current instant
    pub fn at(clock: &dyn Clock, calendar: Calendar<Tz>, locale: Locale) -> Self {
        Self::new(clock.now(), calendar, locale)
    }

    /// Local date of `now`
    pub fn today(&self) -> NaiveDate {
        self.calendar.local_date(&self.now)
    }

    pub fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        self.calendar.local_date(instant)
    }
}

/// Records created at or after `start`
pub fn filter_in_period<T: Timestamped + Clone>(records: &[T], start: DateTime<Utc>) -> Vec<T> {
    records
        .iter()
        .filter(|r| r.created_at() >= start)
        .cloned()
        .collect()
}

/// Records created in `[start, end)`
pub fn filter_in_range<T: Timestamped + Clone>(
    records: &[T],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<T> {
    records
        .iter()
        .filter(|r| {
            let at = r.created_at();
            at >= start && at < end
        })
        .cloned()
        .collect()
}
