//! Pending reminder listing

use anyhow::Result;
use chrono::{Local, Utc};
use habitdash_core::config::AppConfig;
use habitdash_core::db::Database;
use habitdash_core::models::weekday_from_index;
use habitdash_core::{Calendar, NotificationScheduler};

pub fn cmd_reminders(db: &Database, config: &AppConfig) -> Result<()> {
    let pending = db.pending()?;

    if pending.is_empty() {
        println!("No reminders scheduled. Set one with:");
        println!("  habitdash habits remind <id> --time 08:00 --days mon,wed,fri");
        return Ok(());
    }

    let calendar = Calendar::new(Local).with_week_start(config.week_start);
    let now = Utc::now();

    println!();
    println!("⏰ Pending Reminders ({})", pending.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for request in &pending {
        let day = request
            .weekday
            .checked_sub(1)
            .and_then(weekday_from_index)
            .map(|d| config.locale.short_weekday(d))
            .unwrap_or("?");
        let next = request
            .next_occurrence(now, &calendar)
            .map(|at| {
                at.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());

        println!(
            "   {} {:02}:{:02} │ next {} │ {}",
            day, request.hour, request.minute, next, request.body
        );
    }

    Ok(())
}
