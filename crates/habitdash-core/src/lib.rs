//! Habitdash Core Library
//!
//! Shared functionality for the habitdash habit and expense tracker:
//! - Statistics engine (per-day activity, streaks, completion rates,
//!   category breakdowns, spending series, period-over-period deltas)
//! - Calendar and period resolution in a configurable time zone
//! - Local SQLite cache with optional SQLCipher encryption
//! - Record repositories (PostgREST-style backend, or the cache offline)
//! - Cache-first sync service
//! - Habit reminder planning and scheduling
//! - CSV export and the widget snapshot

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod format;
pub mod models;
pub mod notifications;
pub mod period;
pub mod repository;
pub mod stats;
pub mod sync;
pub mod widget;

/// Test utilities including the mock REST backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use calendar::{Calendar, Clock, FixedClock, SystemClock};
pub use config::{AppConfig, BackendConfig};
pub use db::Database;
pub use error::{Error, Result};
pub use export::ExportKind;
pub use format::Locale;
pub use models::{
    CategoryExpense, Expense, ExpenseTimePoint, Habit, HabitCompletionRate, HabitDayData, Period,
    ReminderConfig, Timestamped,
};
pub use notifications::{NotificationRequest, NotificationScheduler};
pub use period::{resolve_period, PeriodRange};
pub use repository::{RecordRepository, RestRepository};
pub use stats::{DashboardStats, StatsContext};
pub use sync::{Loaded, Source, SyncService};
pub use widget::{WidgetEntry, WidgetHabit, WidgetStore};
