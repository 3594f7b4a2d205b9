//! Display labels for statistics output
//!
//! Kept deliberately small: day and month abbreviations, a short `d/M` date
//! label, amounts and percentage deltas. Spanish labels match the mobile app.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::Period;

/// Placeholder shown when a metric has no data
pub const NO_DATA: &str = "—";

/// Supported label languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Capitalized three-letter day abbreviation
    pub fn short_weekday(&self, day: Weekday) -> &'static str {
        let idx = day.num_days_from_monday() as usize;
        match self {
            Self::En => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][idx],
            Self::Es => ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"][idx],
        }
    }

    pub fn weekday_name(&self, day: Weekday) -> &'static str {
        let idx = day.num_days_from_monday() as usize;
        match self {
            Self::En => [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ][idx],
            Self::Es => [
                "Lunes",
                "Martes",
                "Miércoles",
                "Jueves",
                "Viernes",
                "Sábado",
                "Domingo",
            ][idx],
        }
    }

    /// Capitalized three-letter month abbreviation (`month` is 1-based)
    pub fn short_month(&self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Self::En => [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ][idx],
            Self::Es => [
                "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
            ][idx],
        }
    }

    /// Display title of a statistics period
    pub fn period_label(&self, period: Period) -> &'static str {
        match (self, period) {
            (Self::En, Period::Week) => "This week",
            (Self::En, Period::Month) => "This month",
            (Self::En, Period::ThreeMonths) => "3 months",
            (Self::En, Period::Year) => "This year",
            (Self::Es, Period::Week) => "Esta semana",
            (Self::Es, Period::Month) => "Este mes",
            (Self::Es, Period::ThreeMonths) => "3 meses",
            (Self::Es, Period::Year) => "Este año",
        }
    }

    /// Full weekday name, or the no-data placeholder
    pub fn best_day_label(&self, day: Option<Weekday>) -> &'static str {
        day.map(|d| self.weekday_name(d)).unwrap_or(NO_DATA)
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "en_us" | "en-us" | "english" => Ok(Self::En),
            "es" | "es_es" | "es-es" | "spanish" => Ok(Self::Es),
            _ => Err(format!("Unknown locale: {} (valid: en, es)", s)),
        }
    }
}

/// `d/M` label, e.g. `4/3` for March 4th
pub fn day_month_label(date: NaiveDate) -> String {
    format!("{}/{}", date.day(), date.month())
}

pub fn format_amount(amount: f64, currency_symbol: &str) -> String {
    if amount < 0.0 {
        format!("-{}{:.2}", currency_symbol, amount.abs())
    } else {
        format!("{}{:.2}", currency_symbol, amount)
    }
}

/// Signed percentage with one decimal, or the placeholder
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(p) if p >= 0.0 => format!("+{:.1}%", p),
        Some(p) => format!("{:.1}%", p),
        None => NO_DATA.to_string(),
    }
}
