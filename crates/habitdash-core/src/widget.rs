//! Home-screen widget snapshot
//!
//! The widget reads a small JSON array of habits from a shared file. The
//! snapshot is rewritten after every habit change.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::Habit;

/// File name of the snapshot inside the widget directory
pub const WIDGET_FILE: &str = "widgetHabits.json";

/// Habits shown in the medium widget layout
pub const PREVIEW_COUNT: usize = 3;

/// Lightweight habit shared with the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetHabit {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
}

impl From<&Habit> for WidgetHabit {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id.to_string(),
            title: habit.title.clone(),
            is_completed: habit.completed,
        }
    }
}

/// What the widget renders at a point in time
#[derive(Debug, Clone)]
pub struct WidgetEntry {
    pub date: DateTime<Utc>,
    pub habits: Vec<WidgetHabit>,
}

impl WidgetEntry {
    pub fn new(date: DateTime<Utc>, habits: Vec<WidgetHabit>) -> Self {
        Self { date, habits }
    }

    pub fn completed(&self) -> usize {
        self.habits.iter().filter(|h| h.is_completed).count()
    }

    pub fn total(&self) -> usize {
        self.habits.len()
    }

    /// Completed fraction in `[0, 1]`, zero when there are no habits
    pub fn progress(&self) -> f64 {
        if self.habits.is_empty() {
            return 0.0;
        }
        self.completed() as f64 / self.total() as f64
    }

    pub fn preview(&self) -> &[WidgetHabit] {
        &self.habits[..self.habits.len().min(PREVIEW_COUNT)]
    }
}

/// Reads and writes the snapshot file
#[derive(Debug, Clone)]
pub struct WidgetStore {
    path: PathBuf,
}

impl WidgetStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(WIDGET_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot with `habits`
    pub fn save(&self, habits: &[WidgetHabit]) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_vec(habits)?;
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&json)?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), count = habits.len(), "Saved widget snapshot");
        Ok(())
    }

    /// Snapshot from habit records
    pub fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        let snapshot: Vec<WidgetHabit> = habits.iter().map(WidgetHabit::from).collect();
        self.save(&snapshot)
    }

    /// Current snapshot; a missing or unreadable file yields no habits
    pub fn load(&self) -> Vec<WidgetHabit> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(_) => return Vec::new(),
        };
        serde_json::from_slice(&data).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "Ignoring unreadable widget snapshot: {}", e);
            Vec::new()
        })
    }

    pub fn entry(&self, now: DateTime<Utc>) -> WidgetEntry {
        WidgetEntry::new(now, self.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn widget_habit(title: &str, done: bool) -> WidgetHabit {
        WidgetHabit {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            is_completed: done,
        }
    }

    #[test]
    fn test_entry_progress_and_preview() {
        let entry = WidgetEntry::new(
            Utc::now(),
            vec![
                widget_habit("Meditate", true),
                widget_habit("Exercise", true),
                widget_habit("Read", false),
                widget_habit("Journal", false),
                widget_habit("Water", false),
            ],
        );

        assert_eq!(entry.completed(), 2);
        assert_eq!(entry.total(), 5);
        assert!((entry.progress() - 0.4).abs() < 1e-9);
        assert_eq!(entry.preview().len(), 3);
        assert_eq!(entry.preview()[2].title, "Read");
    }

    #[test]
    fn test_empty_entry() {
        let entry = WidgetEntry::new(Utc::now(), Vec::new());
        assert_eq!(entry.progress(), 0.0);
        assert!(entry.preview().is_empty());
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_string(&WidgetHabit {
            id: "1".into(),
            title: "Walk".into(),
            is_completed: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"id":"1","title":"Walk","isCompleted":true}"#);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = WidgetStore::new(dir.path().join("shared"));

        let mut habit = Habit::new(Uuid::new_v4(), "Stretch", Utc::now());
        habit.completed = true;
        store.save_habits(&[habit.clone()]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, habit.id.to_string());
        assert!(loaded[0].is_completed);
        assert!(store.path().ends_with(WIDGET_FILE));
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = WidgetStore::new(dir.path());
        assert!(store.load().is_empty());

        fs::write(store.path(), b"not json").unwrap();
        assert!(store.load().is_empty());
        assert_eq!(store.entry(Utc::now()).total(), 0);
    }
}
