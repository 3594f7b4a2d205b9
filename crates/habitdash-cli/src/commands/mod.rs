//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status, sync) and shared utilities (open_db, build_service)
//! - `expenses` - Expense commands (list, add, delete)
//! - `export` - CSV export command
//! - `habits` - Habit commands (list, add, toggle, delete, remind)
//! - `reminders` - Pending reminder listing
//! - `stats` - Statistics command
//! - `widget` - Widget snapshot command

pub mod core;
pub mod expenses;
pub mod export;
pub mod habits;
pub mod reminders;
pub mod stats;
pub mod widget;

// Re-export command functions for main.rs
pub use core::*;
pub use expenses::*;
pub use export::*;
pub use habits::*;
pub use reminders::*;
pub use stats::*;
pub use widget::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
