//! Habit cache operations

use chrono::NaiveTime;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Habit, ReminderConfig};

const HABIT_COLUMNS: &str =
    "id, user_id, title, completed, created_at, reminder_enabled, reminder_time, reminder_days";

/// Raw row before validation
struct HabitRow {
    id: String,
    user_id: String,
    title: String,
    completed: bool,
    created_at: String,
    reminder_enabled: bool,
    reminder_time: Option<String>,
    reminder_days: Option<String>,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            completed: row.get(3)?,
            created_at: row.get(4)?,
            reminder_enabled: row.get(5)?,
            reminder_time: row.get(6)?,
            reminder_days: row.get(7)?,
        })
    }

    fn into_habit(self) -> Option<Habit> {
        let reminder = match self.reminder_time {
            Some(time) => Some(ReminderConfig {
                enabled: self.reminder_enabled,
                time: NaiveTime::parse_from_str(&time, "%H:%M:%S").ok()?,
                days: match self.reminder_days {
                    Some(days) => serde_json::from_str(&days).ok()?,
                    None => Vec::new(),
                },
            }),
            None => None,
        };

        Some(Habit {
            id: Uuid::parse_str(&self.id).ok()?,
            user_id: Uuid::parse_str(&self.user_id).ok()?,
            title: self.title,
            completed: self.completed,
            created_at: parse_datetime(&self.created_at)?,
            reminder,
        })
    }
}

fn reminder_columns(habit: &Habit) -> Result<(bool, Option<String>, Option<String>)> {
    match &habit.reminder {
        Some(r) => Ok((
            r.enabled,
            Some(r.time.format("%H:%M:%S").to_string()),
            Some(serde_json::to_string(&r.days)?),
        )),
        None => Ok((false, None, None)),
    }
}

fn collect_habits(rows: Vec<HabitRow>) -> Vec<Habit> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id.clone();
            let habit = row.into_habit();
            if habit.is_none() {
                warn!(habit_id = %id, "Skipping unreadable cached habit");
            }
            habit
        })
        .collect()
}

impl Database {
    /// Replace every cached habit of `user_id` with `habits`
    ///
    /// An empty list leaves the cache untouched.
    pub fn replace_habits(&self, user_id: Uuid, habits: &[Habit]) -> Result<()> {
        if habits.is_empty() {
            debug!(%user_id, "No habits to cache, keeping existing rows");
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM habits WHERE user_id = ?",
            params![user_id.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO habits ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                HABIT_COLUMNS
            ))?;
            for habit in habits {
                let (enabled, time, days) = reminder_columns(habit)?;
                stmt.execute(params![
                    habit.id.to_string(),
                    habit.user_id.to_string(),
                    habit.title,
                    habit.completed,
                    format_datetime(&habit.created_at),
                    enabled,
                    time,
                    days,
                ])?;
            }
        }
        tx.commit()?;

        debug!(%user_id, count = habits.len(), "Cached habits");
        Ok(())
    }

    /// Cached habits of `user_id`, newest first
    pub fn fetch_habits(&self, user_id: Uuid) -> Result<Vec<Habit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ? ORDER BY created_at DESC",
            HABIT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], HabitRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(collect_habits(rows))
    }

    /// Get a habit by ID
    pub fn get_habit(&self, id: Uuid) -> Result<Option<Habit>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?", HABIT_COLUMNS),
                params![id.to_string()],
                HabitRow::from_row,
            )
            .optional()?;

        Ok(row.and_then(HabitRow::into_habit))
    }

    /// Insert a habit, replacing any row with the same id
    pub fn upsert_habit(&self, habit: &Habit) -> Result<()> {
        let conn = self.conn()?;
        let (enabled, time, days) = reminder_columns(habit)?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO habits ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                HABIT_COLUMNS
            ),
            params![
                habit.id.to_string(),
                habit.user_id.to_string(),
                habit.title,
                habit.completed,
                format_datetime(&habit.created_at),
                enabled,
                time,
                days,
            ],
        )?;
        Ok(())
    }

    /// Update title, completion and reminder of an existing habit
    pub fn update_habit(&self, habit: &Habit) -> Result<()> {
        let conn = self.conn()?;
        let (enabled, time, days) = reminder_columns(habit)?;
        let updated = conn.execute(
            "UPDATE habits SET title = ?, completed = ?, reminder_enabled = ?, reminder_time = ?, \
             reminder_days = ? WHERE id = ?",
            params![
                habit.title,
                habit.completed,
                enabled,
                time,
                days,
                habit.id.to_string()
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("habit {}", habit.id)));
        }
        Ok(())
    }

    /// Delete a habit, returning whether it existed
    pub fn delete_habit(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM habits WHERE id = ?", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    pub fn count_habits(&self, user_id: Uuid) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ?",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
