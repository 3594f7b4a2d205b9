//! Expense command implementations

use anyhow::Result;
use habitdash_core::config::AppConfig;
use habitdash_core::format::format_amount;
use habitdash_core::stats::total_amount;
use habitdash_core::SyncService;

use super::{resolve_id, truncate};

pub async fn cmd_expenses_list(
    service: &SyncService,
    config: &AppConfig,
    limit: usize,
) -> Result<()> {
    let loaded = service.load_expenses().await?;
    let expenses = &loaded.records;

    if expenses.is_empty() {
        println!("No expenses yet. Record one with:");
        println!("  habitdash expenses add Food 12.50");
        return Ok(());
    }

    println!();
    println!(
        "💰 Expenses ({} total, {})",
        expenses.len(),
        format_amount(total_amount(&expenses), &config.currency_symbol)
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in expenses.iter().take(limit) {
        println!(
            "   [{}] {} │ {:>10} │ {}",
            &expense.id.to_string()[..8],
            expense.created_at.format("%Y-%m-%d"),
            format_amount(expense.amount, &config.currency_symbol),
            truncate(&expense.category, 30)
        );
    }

    if expenses.len() > limit {
        println!("   ... and {} more", expenses.len() - limit);
    }

    if loaded.is_stale() {
        println!();
        println!("   ⚠️  Backend unavailable, showing cached expenses");
    }

    Ok(())
}

pub async fn cmd_expenses_add(
    service: &SyncService,
    config: &AppConfig,
    category: &str,
    amount: f64,
) -> Result<()> {
    let expense = service.add_expense(category, amount).await?;
    println!(
        "✅ Recorded {} in {}",
        format_amount(expense.amount, &config.currency_symbol),
        expense.category
    );
    Ok(())
}

pub async fn cmd_expenses_delete(service: &SyncService, id: &str) -> Result<()> {
    let expenses = service.cache().fetch_expenses(service.user_id())?;
    let id = resolve_id(id, expenses.iter().map(|e| e.id), "expense")?;

    service.delete_expense(id).await?;
    println!("🗑️  Deleted expense {}", id);
    Ok(())
}
