//! Cache-first synchronization between a repository and the local cache
//!
//! Loads read the cache, then ask the repository for fresh records. Fresh
//! records replace the cache; when the repository is unreachable the cached
//! copy is served instead, provided there is one. Mutations go to the
//! repository first and are mirrored into the cache on success. Habit
//! mutations also keep reminders and the widget snapshot current.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::TimeZone;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::format::Locale;
use crate::models::{Expense, Habit, Period, ReminderConfig};
use crate::notifications::{cancel_reminders, schedule_reminders, NotificationScheduler};
use crate::repository::RecordRepository;
use crate::stats::{DashboardStats, StatsContext};
use crate::widget::WidgetStore;

/// Where a load's records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Cache,
}

/// Records returned by a load, tagged with their origin
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub source: Source,
}

impl<T> Loaded<T> {
    pub fn is_stale(&self) -> bool {
        self.source == Source::Cache
    }
}

pub struct SyncService {
    repository: Arc<dyn RecordRepository>,
    cache: Database,
    scheduler: Arc<dyn NotificationScheduler>,
    widget: Option<WidgetStore>,
    user_id: Uuid,
    locale: Locale,
}

impl SyncService {
    /// Reminders are recorded in the cache database unless a scheduler is set
    pub fn new(
        repository: Arc<dyn RecordRepository>,
        cache: Database,
        user_id: Uuid,
        locale: Locale,
    ) -> Self {
        Self {
            repository,
            scheduler: Arc::new(cache.clone()),
            cache,
            widget: None,
            user_id,
            locale,
        }
    }

    /// Work against the cache alone
    pub fn offline(cache: Database, user_id: Uuid, locale: Locale) -> Self {
        Self::new(Arc::new(cache.clone()), cache, user_id, locale)
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn NotificationScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_widget(mut self, widget: WidgetStore) -> Self {
        self.widget = Some(widget);
        self
    }

    pub fn repository_name(&self) -> &'static str {
        self.repository.name()
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn cache(&self) -> &Database {
        &self.cache
    }

    // ========== Loads ==========

    pub async fn load_habits(&self) -> Result<Loaded<Habit>> {
        let cached = self.cache.fetch_habits(self.user_id)?;

        match self.repository.fetch_habits(self.user_id).await {
            Ok(fresh) => {
                self.cache.replace_habits(self.user_id, &fresh)?;
                debug!(count = fresh.len(), "Loaded habits from {}", self.repository.name());
                self.refresh_widget(&fresh);
                Ok(Loaded {
                    records: fresh,
                    source: Source::Remote,
                })
            }
            Err(e) if !cached.is_empty() => {
                warn!("Using cached habits, {} unavailable: {}", self.repository.name(), e);
                Ok(Loaded {
                    records: cached,
                    source: Source::Cache,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn load_expenses(&self) -> Result<Loaded<Expense>> {
        let cached = self.cache.fetch_expenses(self.user_id)?;

        match self.repository.fetch_expenses(self.user_id).await {
            Ok(fresh) => {
                self.cache.replace_expenses(self.user_id, &fresh)?;
                debug!(count = fresh.len(), "Loaded expenses from {}", self.repository.name());
                Ok(Loaded {
                    records: fresh,
                    source: Source::Remote,
                })
            }
            Err(e) if !cached.is_empty() => {
                warn!("Using cached expenses, {} unavailable: {}", self.repository.name(), e);
                Ok(Loaded {
                    records: cached,
                    source: Source::Cache,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Load both collections and compute the dashboard for `period`
    pub async fn dashboard<Tz: TimeZone>(
        &self,
        period: Period,
        ctx: &StatsContext<Tz>,
    ) -> Result<DashboardStats> {
        let habits = self.load_habits().await?;
        let expenses = self.load_expenses().await?;
        Ok(DashboardStats::compute(
            &habits.records,
            &expenses.records,
            period,
            ctx,
        ))
    }

    /// Pull both collections into the cache, returning their sizes
    pub async fn sync(&self) -> Result<(usize, usize)> {
        let habits = self.repository.fetch_habits(self.user_id).await?;
        let expenses = self.repository.fetch_expenses(self.user_id).await?;

        self.cache.replace_habits(self.user_id, &habits)?;
        self.cache.replace_expenses(self.user_id, &expenses)?;
        self.refresh_widget(&habits);

        self.cancel_orphan_reminders(&habits);

        // Pending reminders follow the synced reminder settings
        for habit in &habits {
            if habit.has_valid_reminder() {
                schedule_reminders(self.scheduler.as_ref(), habit, self.locale);
            } else {
                cancel_reminders(self.scheduler.as_ref(), habit.id);
            }
        }

        info!(
            habits = habits.len(),
            expenses = expenses.len(),
            "Synced from {}",
            self.repository.name()
        );
        Ok((habits.len(), expenses.len()))
    }

    // ========== Habit mutations ==========

    pub async fn add_habit(&self, title: &str) -> Result<Habit> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidData("Habit title cannot be empty".into()));
        }

        let created = self
            .repository
            .create_habit(&Habit::new(self.user_id, title, chrono::Utc::now()))
            .await?;
        self.mirror_habit(&created);
        self.refresh_widget_from_cache();
        Ok(created)
    }

    /// Flip the completion flag of the habit with `id`
    pub async fn toggle_habit(&self, id: Uuid) -> Result<Habit> {
        let mut habit = self.cached_habit(id)?;
        habit.completed = !habit.completed;

        let updated = self.repository.update_habit(&habit).await?;
        self.mirror_habit(&updated);
        self.refresh_widget_from_cache();
        Ok(updated)
    }

    /// Set or clear the reminder of the habit with `id`
    ///
    /// Notifications are scheduled when the new reminder is enabled with at
    /// least one day, and cancelled otherwise.
    pub async fn update_reminder(
        &self,
        id: Uuid,
        reminder: Option<ReminderConfig>,
    ) -> Result<Habit> {
        let mut habit = self.cached_habit(id)?;
        habit.reminder = reminder;

        let updated = self.repository.update_habit(&habit).await?;
        self.mirror_habit(&updated);

        if updated.has_valid_reminder() {
            schedule_reminders(self.scheduler.as_ref(), &updated, self.locale);
        } else {
            cancel_reminders(self.scheduler.as_ref(), updated.id);
        }
        Ok(updated)
    }

    pub async fn delete_habit(&self, id: Uuid) -> Result<()> {
        self.repository.delete_habit(id).await?;
        cancel_reminders(self.scheduler.as_ref(), id);

        if let Err(e) = self.cache.delete_habit(id) {
            warn!(%id, "Failed to remove habit from cache: {}", e);
        }
        self.refresh_widget_from_cache();
        Ok(())
    }

    // ========== Expense mutations ==========

    pub async fn add_expense(&self, category: &str, amount: f64) -> Result<Expense> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::InvalidData("Expense category cannot be empty".into()));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidData(format!("Invalid amount: {}", amount)));
        }

        let created = self
            .repository
            .create_expense(&Expense::new(
                self.user_id,
                category,
                amount,
                chrono::Utc::now(),
            ))
            .await?;
        if let Err(e) = self.cache.upsert_expense(&created) {
            warn!(id = %created.id, "Failed to cache expense: {}", e);
        }
        Ok(created)
    }

    pub async fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.repository.delete_expense(id).await?;
        if let Err(e) = self.cache.delete_expense(id) {
            warn!(%id, "Failed to remove expense from cache: {}", e);
        }
        Ok(())
    }

    // ========== Helpers ==========

    fn cached_habit(&self, id: Uuid) -> Result<Habit> {
        self.cache
            .get_habit(id)?
            .ok_or_else(|| Error::NotFound(format!("habit {}", id)))
    }

    fn mirror_habit(&self, habit: &Habit) {
        if let Err(e) = self.cache.upsert_habit(habit) {
            warn!(id = %habit.id, "Failed to cache habit: {}", e);
        }
    }

    /// Cancel pending reminders of this user's habits that are gone remotely
    ///
    /// An empty fetch leaves reminders alone, like it leaves the cache alone.
    /// Reminders of habits cached for another user are kept.
    fn cancel_orphan_reminders(&self, habits: &[Habit]) {
        if habits.is_empty() {
            return;
        }
        let pending = match self.scheduler.pending() {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Failed to read pending reminders: {}", e);
                return;
            }
        };

        let live: HashSet<Uuid> = habits.iter().map(|h| h.id).collect();
        let mut orphans: Vec<Uuid> = pending
            .iter()
            .map(|request| request.habit_id)
            .filter(|id| !live.contains(id))
            .collect();
        orphans.sort();
        orphans.dedup();

        for habit_id in orphans {
            let other_user = matches!(
                self.cache.get_habit(habit_id),
                Ok(Some(cached)) if cached.user_id != self.user_id
            );
            if !other_user {
                debug!(%habit_id, "Cancelling reminders of deleted habit");
                cancel_reminders(self.scheduler.as_ref(), habit_id);
            }
        }
    }

    fn refresh_widget(&self, habits: &[Habit]) {
        if let Some(widget) = &self.widget {
            if let Err(e) = widget.save_habits(habits) {
                warn!("Failed to update widget snapshot: {}", e);
            }
        }
    }

    fn refresh_widget_from_cache(&self) {
        if self.widget.is_none() {
            return;
        }
        match self.cache.fetch_habits(self.user_id) {
            Ok(habits) => self.refresh_widget(&habits),
            Err(e) => warn!("Failed to read habits for widget: {}", e),
        }
    }
}
