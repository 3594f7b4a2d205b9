//! Habit command implementations

use anyhow::{bail, Context, Result};
use chrono::NaiveTime;
use habitdash_core::config::AppConfig;
use habitdash_core::format::Locale;
use habitdash_core::models::{weekday_from_index, Habit, ReminderConfig};
use habitdash_core::SyncService;
use uuid::Uuid;

use super::{resolve_id, truncate};

/// Parse `HH:MM`
pub fn parse_reminder_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .with_context(|| format!("Invalid time '{}', expected HH:MM", input))
}

/// Parse a day list into indices (0 = Sunday)
///
/// Accepts names (`sun`, `monday`), numbers `0`-`6`, `daily` and `weekdays`.
pub fn parse_reminder_days(input: &str) -> Result<Vec<u8>> {
    match input.trim().to_lowercase().as_str() {
        "daily" | "all" => return Ok((0..7).collect()),
        "weekdays" => return Ok((1..6).collect()),
        "weekends" => return Ok(vec![0, 6]),
        _ => {}
    }

    let mut days = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = match part.to_lowercase().as_str() {
            "0" | "sun" | "sunday" => 0,
            "1" | "mon" | "monday" => 1,
            "2" | "tue" | "tuesday" => 2,
            "3" | "wed" | "wednesday" => 3,
            "4" | "thu" | "thursday" => 4,
            "5" | "fri" | "friday" => 5,
            "6" | "sat" | "saturday" => 6,
            _ => bail!("Unknown day '{}'", part),
        };
        if !days.contains(&day) {
            days.push(day);
        }
    }

    if days.is_empty() {
        bail!("No reminder days given");
    }
    days.sort_unstable();
    Ok(days)
}

fn reminder_summary(habit: &Habit, locale: Locale) -> String {
    match &habit.reminder {
        Some(r) if r.enabled => {
            let days: Vec<&str> = r
                .normalized_days()
                .into_iter()
                .filter_map(weekday_from_index)
                .map(|d| locale.short_weekday(d))
                .collect();
            format!("⏰ {} {}", r.time.format("%H:%M"), days.join(" "))
        }
        _ => String::new(),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn resolve_habit(service: &SyncService, input: &str) -> Result<Uuid> {
    let habits = service.cache().fetch_habits(service.user_id())?;
    resolve_id(input, habits.iter().map(|h| h.id), "habit")
}

pub async fn cmd_habits_list(service: &SyncService, config: &AppConfig) -> Result<()> {
    let loaded = service.load_habits().await?;
    let habits = &loaded.records;

    if habits.is_empty() {
        println!("No habits yet. Add one with:");
        println!("  habitdash habits add \"Meditate\"");
        return Ok(());
    }

    let done = habits.iter().filter(|h| h.completed).count();

    println!();
    println!("🎯 Habits ({}/{} completed)", done, habits.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for habit in habits {
        let mark = if habit.completed { "✅" } else { "⬜" };
        println!(
            "   {} [{}] {:<32} {}",
            mark,
            short_id(habit.id),
            truncate(&habit.title, 32),
            reminder_summary(habit, config.locale)
        );
    }

    if loaded.is_stale() {
        println!();
        println!("   ⚠️  Backend unavailable, showing cached habits");
    }

    Ok(())
}

pub async fn cmd_habits_add(service: &SyncService, title: &str) -> Result<()> {
    let habit = service.add_habit(title).await?;
    println!("✅ Added habit [{}] {}", short_id(habit.id), habit.title);
    Ok(())
}

pub async fn cmd_habits_toggle(service: &SyncService, id: &str) -> Result<()> {
    let id = resolve_habit(service, id)?;
    let habit = service.toggle_habit(id).await?;

    if habit.completed {
        println!("✅ Completed: {}", habit.title);
    } else {
        println!("⬜ Not completed: {}", habit.title);
    }
    Ok(())
}

pub async fn cmd_habits_delete(service: &SyncService, id: &str) -> Result<()> {
    let id = resolve_habit(service, id)?;
    let title = service
        .cache()
        .get_habit(id)?
        .map(|h| h.title)
        .unwrap_or_else(|| id.to_string());

    service.delete_habit(id).await?;
    println!("🗑️  Deleted habit: {}", title);
    Ok(())
}

/// Set, update or disable a habit's reminder
///
/// Missing time or days fall back to the current reminder; a new reminder
/// without days fires every day.
pub async fn cmd_habits_remind(
    service: &SyncService,
    config: &AppConfig,
    id: &str,
    time: Option<&str>,
    days: Option<&str>,
    off: bool,
) -> Result<()> {
    let id = resolve_habit(service, id)?;
    let habit = service
        .cache()
        .get_habit(id)?
        .with_context(|| format!("Habit {} not found", id))?;

    let reminder = if off {
        habit.reminder.map(|r| ReminderConfig {
            enabled: false,
            ..r
        })
    } else {
        let current = habit.reminder.as_ref();
        let time = match time {
            Some(t) => parse_reminder_time(t)?,
            None => match current {
                Some(r) => r.time,
                None => bail!("--time is required for a new reminder"),
            },
        };
        let days = match days {
            Some(d) => parse_reminder_days(d)?,
            None => current.map(|r| r.days.clone()).unwrap_or_else(|| (0..7).collect()),
        };
        Some(ReminderConfig::new(time, days))
    };

    let updated = service.update_reminder(id, reminder).await?;

    if updated.is_reminder_enabled() {
        println!(
            "⏰ Reminder set for {}: {}",
            updated.title,
            reminder_summary(&updated, config.locale).trim_start_matches("⏰ ")
        );
    } else {
        println!("🔕 Reminder disabled for {}", updated.title);
    }
    Ok(())
}
