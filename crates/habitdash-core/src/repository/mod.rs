//! Record repositories
//!
//! A repository is where habits and expenses live authoritatively:
//! - `rest` - PostgREST-style remote backend over HTTP
//! - `local` - the SQLite cache itself, for offline use
//!
//! Statistics never talk to a repository directly; the sync service loads
//! records and hands plain collections to the engine.

mod local;
mod rest;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Expense, Habit};

pub use rest::RestRepository;

/// CRUD over habits and expenses for a single user's records
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Short name for logs and status output
    fn name(&self) -> &'static str;

    /// Habits owned by `user_id`, newest first
    async fn fetch_habits(&self, user_id: Uuid) -> Result<Vec<Habit>>;

    /// Store a new habit and return it as persisted
    async fn create_habit(&self, habit: &Habit) -> Result<Habit>;

    /// Update title, completion and reminder of an existing habit
    async fn update_habit(&self, habit: &Habit) -> Result<Habit>;

    async fn delete_habit(&self, id: Uuid) -> Result<()>;

    /// Expenses owned by `user_id`, newest first
    async fn fetch_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>>;

    async fn create_expense(&self, expense: &Expense) -> Result<Expense>;

    async fn delete_expense(&self, id: Uuid) -> Result<()>;
}
