//! Expense cache operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::Expense;

const EXPENSE_COLUMNS: &str = "id, user_id, category, amount, created_at";

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, f64, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn into_expense(
    (id, user_id, category, amount, created_at): (String, String, String, f64, String),
) -> Option<Expense> {
    let expense = Uuid::parse_str(&id)
        .ok()
        .zip(Uuid::parse_str(&user_id).ok())
        .zip(parse_datetime(&created_at))
        .map(|((id, user_id), created_at)| Expense {
            id,
            user_id,
            category,
            amount,
            created_at,
        });

    if expense.is_none() {
        warn!(expense_id = %id, "Skipping unreadable cached expense");
    }
    expense
}

impl Database {
    /// Replace every cached expense of `user_id` with `expenses`
    ///
    /// An empty list leaves the cache untouched.
    pub fn replace_expenses(&self, user_id: Uuid, expenses: &[Expense]) -> Result<()> {
        if expenses.is_empty() {
            debug!(%user_id, "No expenses to cache, keeping existing rows");
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM expenses WHERE user_id = ?",
            params![user_id.to_string()],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO expenses ({}) VALUES (?, ?, ?, ?, ?)",
                EXPENSE_COLUMNS
            ))?;
            for expense in expenses {
                stmt.execute(params![
                    expense.id.to_string(),
                    expense.user_id.to_string(),
                    expense.category,
                    expense.amount,
                    format_datetime(&expense.created_at),
                ])?;
            }
        }
        tx.commit()?;

        debug!(%user_id, count = expenses.len(), "Cached expenses");
        Ok(())
    }

    /// Cached expenses of `user_id`, newest first
    pub fn fetch_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_id = ? ORDER BY created_at DESC",
            EXPENSE_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], expense_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().filter_map(into_expense).collect())
    }

    /// Get an expense by ID
    pub fn get_expense(&self, id: Uuid) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
                params![id.to_string()],
                expense_from_row,
            )
            .optional()?;

        Ok(row.and_then(into_expense))
    }

    /// Insert an expense, replacing any row with the same id
    pub fn upsert_expense(&self, expense: &Expense) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO expenses ({}) VALUES (?, ?, ?, ?, ?)",
                EXPENSE_COLUMNS
            ),
            params![
                expense.id.to_string(),
                expense.user_id.to_string(),
                expense.category,
                expense.amount,
                format_datetime(&expense.created_at),
            ],
        )?;
        Ok(())
    }

    /// Delete an expense, returning whether it existed
    pub fn delete_expense(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ?",
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    pub fn count_expenses(&self, user_id: Uuid) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
