//! One-shot computation of every dashboard metric

use chrono::{TimeZone, Weekday};
use serde::{Deserialize, Serialize};

use super::{
    best_day_of_week, current_streak, expense_change_percentage, expenses_by_category,
    expenses_over_time, filter_in_period, filter_in_range, habit_completion_rates, habits_per_day,
    progress, total_amount, StatsContext,
};
use crate::models::{
    CategoryExpense, Expense, ExpenseTimePoint, Habit, HabitCompletionRate, HabitDayData, Period,
};
use crate::period::{resolve_period, PeriodRange};

/// Number of categories highlighted in the summary
pub const TOP_CATEGORY_COUNT: usize = 3;

/// Derived statistics for one render of the stats screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub period: Period,
    pub range: PeriodRange,

    // Habits
    pub habits_in_period: usize,
    pub completed_in_period: usize,
    /// Completed share across all habits, in [0, 1]
    pub progress: f64,
    pub habits_per_day: Vec<HabitDayData>,
    pub current_streak: u32,
    pub best_day: Option<Weekday>,
    pub completion_rates: Vec<HabitCompletionRate>,

    // Expenses
    pub total: f64,
    pub previous_total: f64,
    /// `None` when the previous period had no spending
    pub change_percentage: Option<f64>,
    pub categories: Vec<CategoryExpense>,
    pub top_categories: Vec<CategoryExpense>,
    pub series: Vec<ExpenseTimePoint>,
}

impl DashboardStats {
    pub fn compute<Tz: TimeZone>(
        habits: &[Habit],
        expenses: &[Expense],
        period: Period,
        ctx: &StatsContext<Tz>,
    ) -> Self {
        let range = resolve_period(period, ctx.now, &ctx.calendar);

        let period_habits = filter_in_period(habits, range.start);
        let period_expenses = filter_in_period(expenses, range.start);
        let previous_expenses = filter_in_range(expenses, range.previous_start, range.start);

        let total = total_amount(&period_expenses);
        let previous_total = total_amount(&previous_expenses);
        let categories = expenses_by_category(&period_expenses);
        let top_categories = categories.iter().take(TOP_CATEGORY_COUNT).cloned().collect();

        Self {
            period,
            range,
            habits_in_period: period_habits.len(),
            completed_in_period: period_habits.iter().filter(|h| h.completed).count(),
            progress: progress(habits),
            habits_per_day: habits_per_day(habits, ctx),
            current_streak: current_streak(habits, ctx),
            best_day: best_day_of_week(habits, ctx),
            completion_rates: habit_completion_rates(&period_habits, range.start, ctx),
            total,
            previous_total,
            change_percentage: expense_change_percentage(total, previous_total),
            categories,
            top_categories,
            series: expenses_over_time(expenses, period, range.start, ctx),
        }
    }

    /// True when neither habits nor expenses fall in the period
    pub fn is_empty(&self) -> bool {
        self.habits_in_period == 0 && self.categories.is_empty() && self.total == 0.0
    }
}
