//! Habitdash CLI - Habit and expense tracker
//!
//! Usage:
//!   habitdash init                      Initialize the local cache
//!   habitdash habits add "Meditate"     Track a new habit
//!   habitdash expenses add Food 12.50   Record an expense
//!   habitdash stats --period month      Show statistics

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use habitdash_core::AppConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt, &config),
        Commands::Widget => commands::cmd_widget(&config),
        Commands::Reminders => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_reminders(&db, &config)
        }
        Commands::Sync => {
            let service = commands::build_service(&cli.db, cli.no_encrypt, &config)?;
            commands::cmd_sync(&service).await
        }
        Commands::Habits { action } => {
            let service = commands::build_service(&cli.db, cli.no_encrypt, &config)?;
            match action {
                None | Some(HabitsAction::List) => {
                    commands::cmd_habits_list(&service, &config).await
                }
                Some(HabitsAction::Add { title }) => {
                    commands::cmd_habits_add(&service, &title).await
                }
                Some(HabitsAction::Toggle { id }) => {
                    commands::cmd_habits_toggle(&service, &id).await
                }
                Some(HabitsAction::Delete { id }) => {
                    commands::cmd_habits_delete(&service, &id).await
                }
                Some(HabitsAction::Remind {
                    id,
                    time,
                    days,
                    off,
                }) => {
                    commands::cmd_habits_remind(
                        &service,
                        &config,
                        &id,
                        time.as_deref(),
                        days.as_deref(),
                        off,
                    )
                    .await
                }
            }
        }
        Commands::Expenses { action } => {
            let service = commands::build_service(&cli.db, cli.no_encrypt, &config)?;
            match action {
                None => commands::cmd_expenses_list(&service, &config, 20).await,
                Some(ExpensesAction::List { limit }) => {
                    commands::cmd_expenses_list(&service, &config, limit).await
                }
                Some(ExpensesAction::Add { category, amount }) => {
                    commands::cmd_expenses_add(&service, &config, &category, amount).await
                }
                Some(ExpensesAction::Delete { id }) => {
                    commands::cmd_expenses_delete(&service, &id).await
                }
            }
        }
        Commands::Stats { period, json } => {
            let service = commands::build_service(&cli.db, cli.no_encrypt, &config)?;
            commands::cmd_stats(&service, &config, &period, json).await
        }
        Commands::Export { kind, dir } => {
            let service = commands::build_service(&cli.db, cli.no_encrypt, &config)?;
            commands::cmd_export(&service, &config, &kind, dir.as_deref()).await
        }
    }
}
