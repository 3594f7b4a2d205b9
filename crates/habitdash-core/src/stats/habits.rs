//! Habit statistics
//!
//! There is no per-day completion history: a habit counts as "done on day X"
//! when it is completed and was created on day X.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc, Weekday};

use super::StatsContext;
use crate::calendar::days_between;
use crate::models::{Habit, HabitCompletionRate, HabitDayData};

/// Share of habits currently marked completed, 0 when there are none
pub fn progress(habits: &[Habit]) -> f64 {
    if habits.is_empty() {
        return 0.0;
    }
    let completed = habits.iter().filter(|h| h.completed).count();
    completed as f64 / habits.len() as f64
}

/// Completed habits for each of the last 7 local days, oldest first
///
/// Always returns exactly seven points, the last one being today.
pub fn habits_per_day<Tz: TimeZone>(habits: &[Habit], ctx: &StatsContext<Tz>) -> Vec<HabitDayData> {
    let today = ctx.today();

    (0..7u64)
        .rev()
        .map(|offset| {
            let date = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
            let count = habits
                .iter()
                .filter(|h| h.completed && ctx.local_date(&h.created_at) == date)
                .count();
            HabitDayData {
                date,
                count,
                label: ctx.locale.short_weekday(date.weekday()).to_string(),
            }
        })
        .collect()
}

/// Consecutive days with a completed habit, walking back from today
///
/// A day without activity yet today does not break the streak; counting then
/// starts from yesterday.
pub fn current_streak<Tz: TimeZone>(habits: &[Habit], ctx: &StatsContext<Tz>) -> u32 {
    let active_days: HashSet<NaiveDate> = habits
        .iter()
        .filter(|h| h.completed)
        .map(|h| ctx.local_date(&h.created_at))
        .collect();

    if active_days.is_empty() {
        return 0;
    }

    let today = ctx.today();
    let mut cursor = if active_days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = cursor {
        if !active_days.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }

    streak
}

/// Weekday with the most completed habits, `None` when nothing is completed
///
/// Buckets are scanned Sunday through Saturday and the first maximum wins.
pub fn best_day_of_week<Tz: TimeZone>(habits: &[Habit], ctx: &StatsContext<Tz>) -> Option<Weekday> {
    let mut counts = [0usize; 7];
    for habit in habits.iter().filter(|h| h.completed) {
        let weekday = ctx.local_date(&habit.created_at).weekday();
        counts[weekday.num_days_from_sunday() as usize] += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, count) in counts.iter().copied().enumerate() {
        if count > 0 && best.map_or(true, |(_, max)| count > max) {
            best = Some((idx, count));
        }
    }

    best.map(|(idx, _)| SUNDAY_FIRST[idx])
}

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Completion rate per habit in the period, highest first
///
/// Days are counted from the later of the habit's creation day and the
/// period's first day up to today, with a floor of one. A completed habit
/// counts as a single completed day, so rates never exceed 1.0. Equal rates
/// keep their input order.
pub fn habit_completion_rates<Tz: TimeZone>(
    habits_in_period: &[Habit],
    period_start: DateTime<Utc>,
    ctx: &StatsContext<Tz>,
) -> Vec<HabitCompletionRate> {
    let today = ctx.today();
    let period_day = ctx.local_date(&period_start);

    let mut rates: Vec<HabitCompletionRate> = habits_in_period
        .iter()
        .map(|habit| {
            let effective_start = ctx.local_date(&habit.created_at).max(period_day);
            let total_days = days_between(effective_start, today).max(1);
            let completed_days = i64::from(habit.completed);
            let rate = (completed_days as f64 / total_days as f64).min(1.0);

            HabitCompletionRate {
                habit_id: habit.id,
                title: habit.title.clone(),
                rate,
                completed_days,
                total_days,
            }
        })
        .collect();

    // sort_by is stable, ties keep input order
    rates.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    rates
}
