//! Calendar arithmetic in a configurable time zone
//!
//! Records store UTC instants. Day, week, month and year boundaries are
//! computed in the calendar's zone, so "today" means the user's local day.

use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday,
};

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant (tests, reproducible reports)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Time zone plus the locale's first day of the week
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
    week_start: Weekday,
}

impl<Tz: TimeZone> Calendar<Tz> {
    /// Calendar with weeks starting on Monday
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            week_start: Weekday::Mon,
        }
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Local calendar date of an instant
    pub fn local_date(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// First instant of a local day
    ///
    /// `None` when local midnight does not exist (a DST gap at 00:00).
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.resolve_local(date.and_hms_opt(0, 0, 0)?)
    }

    /// First day of the week containing `date`
    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        let offset = (date.weekday().num_days_from_monday() + 7
            - self.week_start.num_days_from_monday())
            % 7;
        date - Days::new(u64::from(offset))
    }

    pub fn start_of_month(&self, date: NaiveDate) -> NaiveDate {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
    }

    pub fn start_of_year(&self, date: NaiveDate) -> NaiveDate {
        NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
    }

    /// Shift an instant by whole local days, keeping the wall-clock time
    pub fn add_days(&self, instant: &DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
        let local = self.to_local(instant);
        let shifted = if days >= 0 {
            local.checked_add_days(Days::new(days.unsigned_abs()))?
        } else {
            local.checked_sub_days(Days::new(days.unsigned_abs()))?
        };
        self.resolve_local(shifted)
    }

    /// Shift an instant by calendar months, clamping to the end of shorter months
    pub fn add_months(&self, instant: &DateTime<Utc>, months: i32) -> Option<DateTime<Utc>> {
        let local = self.to_local(instant);
        let delta = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            local.checked_add_months(delta)?
        } else {
            local.checked_sub_months(delta)?
        };
        self.resolve_local(shifted)
    }

    fn to_local(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Default for Calendar<Utc> {
    fn default() -> Self {
        Self::new(Utc)
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
