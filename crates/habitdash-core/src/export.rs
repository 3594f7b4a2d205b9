//! CSV export of habits and expenses
//!
//! Three shapes are supported:
//! - habits only
//! - expenses only
//! - both, as one file with a `## ` title line before each section
//!
//! Headers, yes/no values and file names follow the configured locale.
//! Files are written atomically into the target directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, SecondsFormat};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Error, Result};
use crate::format::Locale;
use crate::models::{weekday_from_index, Expense, Habit};

/// What to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Habits,
    Expenses,
    All,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "habits" => Ok(Self::Habits),
            "expenses" => Ok(Self::Expenses),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "Unknown export kind: {} (valid: habits, expenses, all)",
                s
            )),
        }
    }
}

fn habit_headers(locale: Locale) -> [&'static str; 6] {
    match locale {
        Locale::En => [
            "ID",
            "Title",
            "Completed",
            "Created",
            "Reminder enabled",
            "Reminder days",
        ],
        Locale::Es => [
            "ID",
            "Título",
            "Completado",
            "Fecha creación",
            "Recordatorio activo",
            "Días recordatorio",
        ],
    }
}

fn expense_headers(locale: Locale) -> [&'static str; 4] {
    match locale {
        Locale::En => ["ID", "Amount", "Category", "Date"],
        Locale::Es => ["ID", "Monto", "Categoría", "Fecha"],
    }
}

fn yes_no(value: bool, locale: Locale) -> &'static str {
    match (value, locale) {
        (true, Locale::En) => "Yes",
        (true, Locale::Es) => "Sí",
        (false, _) => "No",
    }
}

/// Title lines of the habits and expenses sections in a combined export
fn section_titles(locale: Locale) -> (&'static str, &'static str) {
    match locale {
        Locale::En => ("## HABITS", "## EXPENSES"),
        Locale::Es => ("## HÁBITOS", "## GASTOS"),
    }
}

/// `habits_2024-03-14.csv`, `gastos_2024-03-14.csv`, ...
pub fn export_file_name(kind: ExportKind, date: NaiveDate, locale: Locale) -> String {
    let stem = match (kind, locale) {
        (ExportKind::Habits, Locale::En) => "habits",
        (ExportKind::Habits, Locale::Es) => "habitos",
        (ExportKind::Expenses, Locale::En) => "expenses",
        (ExportKind::Expenses, Locale::Es) => "gastos",
        (ExportKind::All, Locale::En) => "all_data",
        (ExportKind::All, Locale::Es) => "datos_completos",
    };
    format!("{}_{}.csv", stem, date.format("%Y-%m-%d"))
}

/// Reminder days as short names in Sunday-first order, space separated
fn reminder_days_text(habit: &Habit, locale: Locale) -> String {
    habit
        .reminder
        .as_ref()
        .map(|r| {
            r.normalized_days()
                .into_iter()
                .filter_map(weekday_from_index)
                .map(|day| locale.short_weekday(day))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn to_csv_string<W>(write_rows: W) -> Result<String>
where
    W: FnOnce(&mut csv::Writer<Vec<u8>>) -> Result<()>,
{
    let mut writer = WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    write_rows(&mut writer)?;
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
}

/// Habits as CSV, header line first
pub fn habits_csv(habits: &[Habit], locale: Locale) -> Result<String> {
    to_csv_string(|writer| {
        writer.write_record(habit_headers(locale))?;
        for habit in habits {
            let created = habit.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
            writer.write_record([
                habit.id.to_string().as_str(),
                habit.title.as_str(),
                yes_no(habit.completed, locale),
                created.as_str(),
                yes_no(habit.is_reminder_enabled(), locale),
                reminder_days_text(habit, locale).as_str(),
            ])?;
        }
        Ok(())
    })
}

/// Expenses as CSV with two-decimal amounts
pub fn expenses_csv(expenses: &[Expense], locale: Locale) -> Result<String> {
    to_csv_string(|writer| {
        writer.write_record(expense_headers(locale))?;
        for expense in expenses {
            writer.write_record([
                expense.id.to_string(),
                format!("{:.2}", expense.amount),
                expense.category.clone(),
                expense.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ])?;
        }
        Ok(())
    })
}

/// Both sections in one document, separated by a blank line
pub fn combined_csv(habits: &[Habit], expenses: &[Expense], locale: Locale) -> Result<String> {
    let (habits_title, expenses_title) = section_titles(locale);
    Ok(format!(
        "{}\n{}\n{}\n{}",
        habits_title,
        habits_csv(habits, locale)?,
        expenses_title,
        expenses_csv(expenses, locale)?
    ))
}

/// Render `kind` and write it into `dir`, returning the file path
pub fn write_export(
    dir: &Path,
    kind: ExportKind,
    habits: &[Habit],
    expenses: &[Expense],
    date: NaiveDate,
    locale: Locale,
) -> Result<PathBuf> {
    let content = match kind {
        ExportKind::Habits => habits_csv(habits, locale)?,
        ExportKind::Expenses => expenses_csv(expenses, locale)?,
        ExportKind::All => combined_csv(habits, expenses, locale)?,
    };

    let file_name = export_file_name(kind, date, locale);
    let path = dir.join(&file_name);

    let write = || -> std::io::Result<()> {
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    };
    write().map_err(|source| Error::Export {
        file: file_name.clone(),
        source,
    })?;

    let records = match kind {
        ExportKind::Habits => habits.len(),
        ExportKind::Expenses => expenses.len(),
        ExportKind::All => habits.len() + expenses.len(),
    };
    info!(path = %path.display(), "Exported {} records", records);
    Ok(path)
}
