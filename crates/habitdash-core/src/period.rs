//! Period selector
//!
//! Resolves a named [`Period`] to the start of the current window and the
//! start of the window before it. Always recomputed from `now`; nothing here
//! is cached.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::models::Period;

/// Concrete bounds for a period relative to some `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: DateTime<Utc>,
    pub previous_start: DateTime<Utc>,
}

/// Resolve `period` against `now`
///
/// - week: start of the calendar's week containing `now`
/// - month / year: first instant of the containing month / year
/// - three months: `now` minus three calendar months (rolling, not a quarter)
///
/// `previous_start` is `start` moved back by one period length. If a bound
/// cannot be computed it falls back to `now`.
pub fn resolve_period<Tz: TimeZone>(
    period: Period,
    now: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> PeriodRange {
    let today = calendar.local_date(&now);

    let start = match period {
        Period::Week => calendar.start_of_day(calendar.start_of_week(today)),
        Period::Month => calendar.start_of_day(calendar.start_of_month(today)),
        Period::ThreeMonths => calendar.add_months(&now, -3),
        Period::Year => calendar.start_of_day(calendar.start_of_year(today)),
    }
    .unwrap_or(now);

    let previous_start = match period {
        Period::Week => calendar.add_days(&start, -7),
        Period::Month => calendar.add_months(&start, -1),
        Period::ThreeMonths => calendar.add_months(&start, -3),
        Period::Year => calendar.add_months(&start, -12),
    }
    .unwrap_or(now);

    PeriodRange {
        start,
        previous_start,
    }
}
