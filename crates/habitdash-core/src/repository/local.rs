//! Offline repository backed by the local cache

use async_trait::async_trait;
use uuid::Uuid;

use super::RecordRepository;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Expense, Habit};

#[async_trait]
impl RecordRepository for Database {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch_habits(&self, user_id: Uuid) -> Result<Vec<Habit>> {
        Database::fetch_habits(self, user_id)
    }

    async fn create_habit(&self, habit: &Habit) -> Result<Habit> {
        self.upsert_habit(habit)?;
        Ok(habit.clone())
    }

    async fn update_habit(&self, habit: &Habit) -> Result<Habit> {
        Database::update_habit(self, habit)?;
        Ok(habit.clone())
    }

    async fn delete_habit(&self, id: Uuid) -> Result<()> {
        if !Database::delete_habit(self, id)? {
            return Err(Error::NotFound(format!("habit {}", id)));
        }
        Ok(())
    }

    async fn fetch_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        Database::fetch_expenses(self, user_id)
    }

    async fn create_expense(&self, expense: &Expense) -> Result<Expense> {
        self.upsert_expense(expense)?;
        Ok(expense.clone())
    }

    async fn delete_expense(&self, id: Uuid) -> Result<()> {
        if !Database::delete_expense(self, id)? {
            return Err(Error::NotFound(format!("expense {}", id)));
        }
        Ok(())
    }
}
