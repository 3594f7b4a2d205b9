//! Statistics command implementation

use anyhow::{anyhow, Result};
use habitdash_core::config::AppConfig;
use habitdash_core::format::{format_amount, format_change};
use habitdash_core::models::Period;
use habitdash_core::{DashboardStats, SyncService};

use super::{stats_context, truncate};

/// Width of the largest bar in the spending chart
const BAR_WIDTH: usize = 24;

pub async fn cmd_stats(
    service: &SyncService,
    config: &AppConfig,
    period: &str,
    json: bool,
) -> Result<()> {
    let period: Period = period.parse().map_err(|e: String| anyhow!(e))?;
    let ctx = stats_context(config);
    let stats = service.dashboard(period, &ctx).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_stats(&stats, config);
    Ok(())
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}

pub fn print_stats(stats: &DashboardStats, config: &AppConfig) {
    let locale = config.locale;
    let symbol = &config.currency_symbol;

    println!();
    println!("📊 {}", locale.period_label(stats.period));
    println!("   ─────────────────────────────────────────────────────────────");

    if stats.is_empty() {
        println!("   No habits or expenses in this period yet.");
        println!();
        return;
    }

    // Habits
    println!();
    println!("🎯 Habits");
    println!(
        "   In period: {} ({} completed)",
        stats.habits_in_period, stats.completed_in_period
    );
    println!("   Progress: {:.0}%", stats.progress * 100.0);
    println!("   🔥 Current streak: {} days", stats.current_streak);
    println!("   📅 Best day: {}", locale.best_day_label(stats.best_day));

    let days: Vec<String> = stats
        .habits_per_day
        .iter()
        .map(|d| format!("{} {}", d.label, d.count))
        .collect();
    println!("   Last 7 days: {}", days.join(" │ "));

    if !stats.completion_rates.is_empty() {
        println!();
        println!("   Completion rates:");
        for rate in &stats.completion_rates {
            println!(
                "   {:<30} {:>5.0}%  ({}/{} days)",
                truncate(&rate.title, 30),
                rate.rate * 100.0,
                rate.completed_days,
                rate.total_days
            );
        }
    }

    // Expenses
    println!();
    println!("💰 Expenses");
    println!("   Total: {}", format_amount(stats.total, symbol));
    println!(
        "   Previous period: {} ({})",
        format_amount(stats.previous_total, symbol),
        format_change(stats.change_percentage)
    );

    if !stats.top_categories.is_empty() {
        println!();
        println!("   Top categories:");
        for category in &stats.top_categories {
            println!(
                "   {:<20} {:>10}  {:>5.1}%",
                truncate(&category.category, 20),
                format_amount(category.amount, symbol),
                category.percentage
            );
        }
    }

    let max = stats.series.iter().map(|p| p.amount).fold(0.0, f64::max);
    if max > 0.0 {
        println!();
        println!("   Spending over time:");
        for point in &stats.series {
            println!(
                "   {:>6} {:>10} {}",
                point.label,
                format_amount(point.amount, symbol),
                bar(point.amount, max)
            );
        }
    }

    println!();
}
