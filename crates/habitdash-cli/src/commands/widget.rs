//! Widget snapshot command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use habitdash_core::config::AppConfig;
use habitdash_core::WidgetStore;

use super::truncate;

pub fn cmd_widget(config: &AppConfig) -> Result<()> {
    let dir = config
        .widget_dir()
        .context("No widget directory configured and no data directory found")?;
    let entry = WidgetStore::new(&dir).entry(Utc::now());

    println!();
    println!("📱 Widget ({})", dir.display());
    println!("   ─────────────────────────────────────────────────────────────");

    if entry.total() == 0 {
        println!("   No habits in the snapshot yet.");
        return Ok(());
    }

    println!(
        "   {}/{} completed ({:.0}%)",
        entry.completed(),
        entry.total(),
        entry.progress() * 100.0
    );
    for habit in entry.preview() {
        let mark = if habit.is_completed { "✅" } else { "⬜" };
        println!("   {} {}", mark, truncate(&habit.title, 40));
    }
    if entry.total() > entry.preview().len() {
        println!("   ... and {} more", entry.total() - entry.preview().len());
    }

    Ok(())
}
