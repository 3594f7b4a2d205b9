//! Expense statistics

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};

use super::{filter_in_period, StatsContext};
use crate::format::day_month_label;
use crate::models::{CategoryExpense, Expense, ExpenseTimePoint, Period};

pub fn total_amount(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Spending per category with its share of the total, largest first
///
/// Categories are matched exactly (case-sensitive, untrimmed). Returns an
/// empty list when the total is not positive. Equal amounts keep the order in
/// which their category first appeared.
pub fn expenses_by_category(expenses: &[Expense]) -> Vec<CategoryExpense> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64)> = Vec::new();

    for expense in expenses {
        match index.get(expense.category.as_str()) {
            Some(&i) => groups[i].1 += expense.amount,
            None => {
                index.insert(expense.category.as_str(), groups.len());
                groups.push((expense.category.as_str(), expense.amount));
            }
        }
    }

    let total: f64 = groups.iter().map(|(_, amount)| amount).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut categories: Vec<CategoryExpense> = groups
        .into_iter()
        .map(|(category, amount)| CategoryExpense {
            category: category.to_string(),
            amount,
            percentage: amount / total * 100.0,
        })
        .collect();

    categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    categories
}

/// The `limit` largest categories
pub fn top_categories(expenses: &[Expense], limit: usize) -> Vec<CategoryExpense> {
    let mut categories = expenses_by_category(expenses);
    categories.truncate(limit);
    categories
}

/// Percent change from the previous period's total
///
/// `None` when there is nothing to compare against (previous total <= 0).
/// Positive means spending went up.
pub fn expense_change_percentage(total: f64, previous_total: f64) -> Option<f64> {
    if previous_total <= 0.0 {
        return None;
    }
    Some((total - previous_total) / previous_total * 100.0)
}

/// Expense series for charting, bucketed by the period's granularity
///
/// - week: seven daily buckets from the period's first day
/// - month, three months: seven-day buckets while the bucket has started
/// - year: twelve monthly buckets from the period's first month
///
/// Day and week buckets sum only expenses inside the period. Monthly buckets
/// sum every expense in that calendar month. Buckets that start after today
/// are left out.
pub fn expenses_over_time<Tz: TimeZone>(
    expenses: &[Expense],
    period: Period,
    period_start: DateTime<Utc>,
    ctx: &StatsContext<Tz>,
) -> Vec<ExpenseTimePoint> {
    let start = ctx.local_date(&period_start);
    let today = ctx.today();

    match period {
        Period::Week => {
            let in_period = filter_in_period(expenses, period_start);
            (0..7u64)
                .filter_map(|i| start.checked_add_days(Days::new(i)))
                .filter(|day| *day <= today)
                .map(|day| ExpenseTimePoint {
                    date: day,
                    amount: sum_between(&in_period, day, day.succ_opt(), ctx),
                    label: day_month_label(day),
                })
                .collect()
        }
        Period::Month | Period::ThreeMonths => {
            let in_period = filter_in_period(expenses, period_start);
            let mut points = Vec::new();
            let mut bucket = Some(start);
            while let Some(bucket_start) = bucket.filter(|d| *d <= today) {
                let bucket_end = bucket_start.checked_add_days(Days::new(7));
                points.push(ExpenseTimePoint {
                    date: bucket_start,
                    amount: sum_between(&in_period, bucket_start, bucket_end, ctx),
                    label: day_month_label(bucket_start),
                });
                bucket = bucket_end;
            }
            points
        }
        Period::Year => {
            let first_month = NaiveDate::from_ymd_opt(start.year(), start.month(), 1);
            (0..12u32)
                .filter_map(|i| first_month?.checked_add_months(Months::new(i)))
                .filter(|month| *month <= today)
                .map(|month| ExpenseTimePoint {
                    date: month,
                    amount: sum_between(
                        expenses,
                        month,
                        month.checked_add_months(Months::new(1)),
                        ctx,
                    ),
                    label: ctx.locale.short_month(month.month()).to_string(),
                })
                .collect()
        }
    }
}

/// Sum of expenses whose local day is in `[from, to)`; open-ended when `to` is `None`
fn sum_between<Tz: TimeZone>(
    expenses: &[Expense],
    from: NaiveDate,
    to: Option<NaiveDate>,
    ctx: &StatsContext<Tz>,
) -> f64 {
    expenses
        .iter()
        .filter(|e| {
            let day = ctx.local_date(&e.created_at);
            day >= from && to.map_or(true, |end| day < end)
        })
        .map(|e| e.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::calendar::Calendar;
    use crate::format::Locale;
    use crate::period::resolve_period;

    #[test]
    fn test_total_amount() {
        assert_eq!(total_amount(&[]), 0.0);
        let expenses = vec![expense("A", 10.0, now()), expense("B", 2.5, now())];
        assert_eq!(total_amount(&expenses), 12.5);
    }

    #[test]
    fn test_by_category_empty() {
        assert!(expenses_by_category(&[]).is_empty());
    }

    #[test]
    fn test_by_category_zero_total_is_empty() {
        let expenses = vec![expense("Food", 0.0, now()), expense("Rent", 0.0, now())];
        assert!(expenses_by_category(&expenses).is_empty());
    }

    #[test]
    fn test_by_category_groups_and_percentages() {
        let expenses = vec![
            expense("Food", 30.0, now()),
            expense("Food", 20.0, now()),
            expense("Transport", 50.0, now()),
        ];
        let categories = expenses_by_category(&expenses);
        assert_eq!(categories.len(), 2);
        for c in &categories {
            assert!((c.amount - 50.0).abs() < 1e-9);
            assert!((c.percentage - 50.0).abs() < 1e-9);
        }
        // Equal totals keep first-appearance order
        assert_eq!(categories[0].category, "Food");
        assert_eq!(categories[1].category, "Transport");
    }

    #[test]
    fn test_by_category_case_sensitive() {
        let expenses = vec![
            expense("food", 10.0, now()),
            expense("Food", 10.0, now()),
            expense("Food ", 10.0, now()),
        ];
        assert_eq!(expenses_by_category(&expenses).len(), 3);
    }

    #[test]
    fn test_by_category_sorted_and_sums_to_hundred() {
        let expenses = vec![
            expense("Fun", 5.0, now()),
            expense("Rent", 700.0, now()),
            expense("Food", 120.33, now()),
            expense("Fun", 12.1, now()),
            expense("Health", 0.0, now()),
        ];
        let categories = expenses_by_category(&expenses);
        let names: Vec<_> = categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Fun", "Health"]);
        let sum: f64 = categories.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_categories() {
        let expenses = vec![
            expense("A", 1.0, now()),
            expense("B", 4.0, now()),
            expense("C", 3.0, now()),
            expense("D", 2.0, now()),
        ];
        let top = top_categories(&expenses, 3);
        let names: Vec<_> = top.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_change_percentage() {
        assert_eq!(expense_change_percentage(100.0, 0.0), None);
        assert_eq!(expense_change_percentage(100.0, -5.0), None);
        assert_eq!(expense_change_percentage(150.0, 100.0), Some(50.0));
        assert_eq!(expense_change_percentage(50.0, 100.0), Some(-50.0));
        assert_eq!(expense_change_percentage(0.0, 100.0), Some(-100.0));
    }

    #[test]
    fn test_over_time_week_empty_has_zero_buckets() {
        let ctx = ctx();
        let range = resolve_period(Period::Week, ctx.now, &ctx.calendar);
        let points = expenses_over_time(&[], Period::Week, range.start, &ctx);
        // Monday 11th through Thursday 14th; the rest of the week is in the future
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.amount == 0.0));
        assert_eq!(points[0].label, "11/3");
        assert_eq!(points[3].label, "14/3");
    }

    #[test]
    fn test_over_time_week_full_week() {
        // Sunday evening: every day of a Monday-first week has started
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 20, 0, 0).unwrap();
        let ctx = StatsContext::new(now, Calendar::default(), Locale::En);
        let range = resolve_period(Period::Week, now, &ctx.calendar);
        let expenses = vec![
            expense("Food", 10.0, Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap()),
            expense("Food", 5.0, Utc.with_ymd_and_hms(2024, 3, 11, 18, 0, 0).unwrap()),
            expense("Rent", 7.0, Utc.with_ymd_and_hms(2024, 3, 17, 8, 0, 0).unwrap()),
            // Previous week, outside the period
            expense("Food", 99.0, Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
        ];
        let points = expenses_over_time(&expenses, Period::Week, range.start, &ctx);
        let amounts: Vec<f64> = points.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![15.0, 0.0, 0.0, 0.0, 0.0, 0.0, 7.0]);
    }

    #[test]
    fn test_over_time_month_weekly_buckets() {
        let ctx = ctx();
        let range = resolve_period(Period::Month, ctx.now, &ctx.calendar);
        let expenses = vec![
            expense("A", 1.0, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            expense("A", 2.0, Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 0).unwrap()),
            expense("A", 4.0, Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()),
            expense("A", 8.0, Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap()),
            expense("A", 16.0, Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap()),
        ];
        let points = expenses_over_time(&expenses, Period::Month, range.start, &ctx);
        // Buckets start on the 1st, 8th and 15th; the 15th has not started
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["1/3", "8/3"]);
        assert_eq!(points[0].amount, 3.0);
        assert_eq!(points[1].amount, 12.0);
    }

    #[test]
    fn test_over_time_three_months_starts_on_rolling_day() {
        let ctx = ctx();
        let range = resolve_period(Period::ThreeMonths, ctx.now, &ctx.calendar);
        let points = expenses_over_time(&[], Period::ThreeMonths, range.start, &ctx);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2023, 12, 14).unwrap());
        assert!(points.iter().all(|p| p.date <= ctx.today()));
        // Dec 14 .. Mar 14 is 91 days, 14 buckets including the one starting today
        assert_eq!(points.len(), 14);
    }

    #[test]
    fn test_over_time_year_uses_all_expenses() {
        let ctx = ctx();
        let range = resolve_period(Period::Year, ctx.now, &ctx.calendar);
        let expenses = vec![
            expense("A", 10.0, Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()),
            expense("A", 20.0, Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap()),
            expense("A", 30.0, Utc.with_ymd_and_hms(2023, 12, 31, 10, 0, 0).unwrap()),
        ];
        let points = expenses_over_time(&expenses, Period::Year, range.start, &ctx);
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar"]);
        let amounts: Vec<f64> = points.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![10.0, 0.0, 20.0]);
    }

    #[test]
    fn test_over_time_year_spanish_labels() {
        let now = Utc.with_ymd_and_hms(2024, 12, 20, 10, 0, 0).unwrap();
        let ctx = StatsContext::new(now, Calendar::default(), Locale::Es);
        let range = resolve_period(Period::Year, now, &ctx.calendar);
        let points = expenses_over_time(&[], Period::Year, range.start, &ctx);
        assert_eq!(points.len(), 12);
        assert_eq!(points[0].label, "Ene");
        assert_eq!(points[11].label, "Dic");
    }
}
