//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the local cache
//! - `build_service` - Sync service for the configured backend (or offline)
//! - `cmd_init`, `cmd_status`, `cmd_sync`

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use habitdash_core::config::{default_config_path, AppConfig};
use habitdash_core::db::{Database, DB_KEY_ENV};
use habitdash_core::{
    Calendar, RestRepository, StatsContext, SyncService, SystemClock, WidgetStore,
};
use uuid::Uuid;

/// Open the cache with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Wire the cache to the configured backend, or run offline without one
pub fn service_for(db: Database, config: &AppConfig) -> SyncService {
    let user_id = config.effective_user_id();
    let service = match RestRepository::from_config(&config.backend) {
        Some(repo) => SyncService::new(Arc::new(repo), db, user_id, config.locale),
        None => SyncService::offline(db, user_id, config.locale),
    };

    match config.widget_dir() {
        Some(dir) => service.with_widget(WidgetStore::new(dir)),
        None => service,
    }
}

pub fn build_service(db_path: &Path, no_encrypt: bool, config: &AppConfig) -> Result<SyncService> {
    let db = open_db(db_path, no_encrypt)?;
    Ok(service_for(db, config))
}

/// Statistics context for "now" in the local time zone
pub fn stats_context(config: &AppConfig) -> StatsContext<Local> {
    StatsContext::at(
        &SystemClock,
        Calendar::new(Local).with_week_start(config.week_start),
        config.locale,
    )
}

/// Accept a full UUID or an unambiguous prefix of one of `ids`
pub fn resolve_id<I>(input: &str, ids: I, kind: &str) -> Result<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    let prefix = input.trim().to_lowercase();
    if prefix.is_empty() {
        bail!("Empty {} id", kind);
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No {} matches '{}'", kind, input),
        _ => bail!(
            "'{}' matches {} {}s, use a longer prefix",
            input,
            matches.len(),
            kind
        ),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing cache at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Cache initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Track a habit: habitdash habits add \"Meditate\"");
    println!("  2. Record spending: habitdash expenses add Food 12.50");
    println!("  3. See how it's going: habitdash stats");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool, config: &AppConfig) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Habitdash Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Cache: {}", db_path.display());
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (cache not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    println!();
    match default_config_path() {
        Some(path) if path.exists() => println!("   Config: {}", path.display()),
        _ => println!("   Config: (built-in defaults)"),
    }
    println!(
        "   Locale: {} │ Week starts: {}",
        config.locale.as_str(),
        config.locale.weekday_name(config.week_start)
    );
    match config.user_id {
        Some(id) => println!("   User: {}", id),
        None => println!("   User: (local profile)"),
    }
    match &config.backend.url {
        Some(url) if config.backend.is_configured() => println!("   🌐 Backend: {}", url),
        _ => println!("   📴 Backend: not configured (offline mode)"),
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                let user = config.effective_user_id();
                println!();
                println!("   Habits: {}", db.count_habits(user)?);
                println!("   Expenses: {}", db.count_expenses(user)?);
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening cache: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub async fn cmd_sync(service: &SyncService) -> Result<()> {
    println!("🔄 Syncing from {}...", service.repository_name());

    let (habits, expenses) = service.sync().await.context("Sync failed")?;

    println!("✅ Cached {} habits and {} expenses", habits, expenses);
    Ok(())
}
