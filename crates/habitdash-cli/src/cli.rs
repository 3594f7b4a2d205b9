//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Habitdash - Track habits and spending from the terminal
#[derive(Parser)]
#[command(name = "habitdash")]
#[command(about = "Habit and expense tracker with statistics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Local cache database path
    #[arg(long, default_value = "habitdash.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable cache encryption (not recommended for production)
    ///
    /// By default, the cache is encrypted using SQLCipher.
    /// Set HABITDASH_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the local cache
    Init,

    /// Show cache, config and backend status
    Status,

    /// Pull habits and expenses from the backend into the cache
    Sync,

    /// Manage habits (list, add, toggle, delete, remind)
    Habits {
        #[command(subcommand)]
        action: Option<HabitsAction>,
    },

    /// Manage expenses (list, add, delete)
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Show statistics for a period
    Stats {
        /// Period: week, month, 3m, year
        #[arg(short, long, default_value = "month")]
        period: String,

        /// Print the full statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export records to CSV
    Export {
        /// What to export: habits, expenses, all
        #[arg(default_value = "all")]
        kind: String,

        /// Output directory (defaults to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show the widget snapshot
    Widget,

    /// List pending habit reminders
    Reminders,
}

#[derive(Subcommand)]
pub enum HabitsAction {
    /// List habits, newest first
    List,

    /// Add a habit
    Add {
        /// Habit title
        title: String,
    },

    /// Toggle a habit's completion
    Toggle {
        /// Habit ID (or a unique prefix)
        id: String,
    },

    /// Delete a habit and its reminders
    Delete {
        /// Habit ID (or a unique prefix)
        id: String,
    },

    /// Set or disable a habit's reminder
    Remind {
        /// Habit ID (or a unique prefix)
        id: String,

        /// Time of day, HH:MM
        #[arg(short, long)]
        time: Option<String>,

        /// Comma-separated days: sun,mon,... or 0-6 (0 = Sunday)
        #[arg(short, long)]
        days: Option<String>,

        /// Disable the reminder
        #[arg(long, conflicts_with_all = ["time", "days"])]
        off: bool,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List expenses, newest first
    List {
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Add an expense
    Add {
        /// Category
        category: String,

        /// Amount
        amount: f64,
    },

    /// Delete an expense
    Delete {
        /// Expense ID (or a unique prefix)
        id: String,
    },
}
