//! CSV export command implementation

use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::Local;
use habitdash_core::config::AppConfig;
use habitdash_core::export::{write_export, ExportKind};
use habitdash_core::SyncService;

pub async fn cmd_export(
    service: &SyncService,
    config: &AppConfig,
    kind: &str,
    dir: Option<&Path>,
) -> Result<()> {
    let kind: ExportKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let dir = dir.unwrap_or_else(|| Path::new("."));

    let habits = match kind {
        ExportKind::Habits | ExportKind::All => service.load_habits().await?.records,
        ExportKind::Expenses => Vec::new(),
    };
    let expenses = match kind {
        ExportKind::Expenses | ExportKind::All => service.load_expenses().await?.records,
        ExportKind::Habits => Vec::new(),
    };

    let path = write_export(
        dir,
        kind,
        &habits,
        &expenses,
        Local::now().date_naive(),
        config.locale,
    )?;

    println!("📄 Exported to {}", path.display());
    match kind {
        ExportKind::Habits => println!("   Habits: {}", habits.len()),
        ExportKind::Expenses => println!("   Expenses: {}", expenses.len()),
        ExportKind::All => {
            println!("   Habits: {}", habits.len());
            println!("   Expenses: {}", expenses.len());
        }
    }

    Ok(())
}
