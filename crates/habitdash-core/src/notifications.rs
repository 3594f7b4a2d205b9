//! Habit reminder notifications
//!
//! A habit with an enabled reminder produces one weekly repeating
//! notification per selected weekday. Delivery is behind the
//! [`NotificationScheduler`] trait; scheduling is fire-and-forget, so failures
//! are logged and never surface to the caller.

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::calendar::Calendar;
use crate::error::Result;
use crate::format::Locale;
use crate::models::{weekday_from_index, Habit};

/// A weekly notification waiting to be delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub habit_id: Uuid,
    pub title: String,
    pub body: String,
    /// 1 = Sunday .. 7 = Saturday
    pub weekday: u8,
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
}

impl NotificationRequest {
    /// Next time this notification fires strictly after `after`
    pub fn next_occurrence<Tz: TimeZone>(
        &self,
        after: DateTime<Utc>,
        calendar: &Calendar<Tz>,
    ) -> Option<DateTime<Utc>> {
        let target = weekday_from_index(self.weekday.checked_sub(1)?)?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;
        let today = calendar.local_date(&after);

        // Eight days covers "later today" and "same weekday next week"
        (0..8u64)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter(|day| day.weekday() == target)
            .filter_map(|day| {
                calendar
                    .timezone()
                    .from_local_datetime(&day.and_time(time))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            })
            .find(|at| *at > after)
    }
}

/// Platform seam for local notification delivery
pub trait NotificationScheduler: Send + Sync {
    /// Add or replace a pending notification
    fn add(&self, request: &NotificationRequest) -> Result<()>;

    /// Remove pending notifications by identifier; unknown ids are ignored
    fn remove(&self, identifiers: &[String]) -> Result<()>;

    fn remove_all(&self) -> Result<()>;

    fn pending(&self) -> Result<Vec<NotificationRequest>>;
}

/// Identifier of the notification for `habit_id` on day index `day` (0 = Sunday)
pub fn notification_identifier(habit_id: Uuid, day: u8) -> String {
    format!("habit-{}-{}", habit_id, day)
}

/// Notifications a habit's reminder calls for
///
/// Empty when the reminder is missing, disabled or has no valid days.
pub fn plan_notifications(habit: &Habit, locale: Locale) -> Vec<NotificationRequest> {
    let reminder = match &habit.reminder {
        Some(r) if habit.has_valid_reminder() => r,
        _ => return Vec::new(),
    };

    let (title, body) = match locale {
        Locale::En => ("Habit reminder", format!("Time for: {}", habit.title)),
        Locale::Es => ("Recordatorio de hábito", format!("Es hora de: {}", habit.title)),
    };

    reminder
        .normalized_days()
        .into_iter()
        .map(|day| NotificationRequest {
            identifier: notification_identifier(habit.id, day),
            habit_id: habit.id,
            title: title.to_string(),
            body: body.clone(),
            weekday: day + 1,
            hour: reminder.time.hour(),
            minute: reminder.time.minute(),
            repeats: true,
        })
        .collect()
}

/// Replace the pending reminders of `habit`, returning how many were added
pub fn schedule_reminders(
    scheduler: &dyn NotificationScheduler,
    habit: &Habit,
    locale: Locale,
) -> usize {
    cancel_reminders(scheduler, habit.id);

    let mut scheduled = 0;
    for request in plan_notifications(habit, locale) {
        match scheduler.add(&request) {
            Ok(()) => scheduled += 1,
            Err(e) => warn!(identifier = %request.identifier, "Failed to schedule reminder: {}", e),
        }
    }

    debug!(habit_id = %habit.id, scheduled, "Scheduled reminders");
    scheduled
}

/// Drop every pending reminder of a habit
pub fn cancel_reminders(scheduler: &dyn NotificationScheduler, habit_id: Uuid) {
    let identifiers: Vec<String> = (0..7)
        .map(|day| notification_identifier(habit_id, day))
        .collect();

    if let Err(e) = scheduler.remove(&identifiers) {
        warn!(%habit_id, "Failed to cancel reminders: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::ReminderConfig;
    use chrono::Weekday;

    fn habit_with_reminder(days: Vec<u8>) -> Habit {
        let mut habit = Habit::new(Uuid::new_v4(), "Stretch", Utc::now());
        habit.reminder = Some(ReminderConfig::new(
            NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
            days,
        ));
        habit
    }

    #[test]
    fn test_plan_one_request_per_day() {
        let habit = habit_with_reminder(vec![5, 1, 3]);
        let plan = plan_notifications(&habit, Locale::En);

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].weekday, 2); // Monday
        assert_eq!(plan[1].weekday, 4);
        assert_eq!(plan[2].weekday, 6);
        assert_eq!(plan[0].identifier, format!("habit-{}-1", habit.id));
        assert_eq!(plan[0].hour, 7);
        assert_eq!(plan[0].minute, 45);
        assert!(plan.iter().all(|r| r.repeats));
        assert_eq!(plan[0].title, "Habit reminder");
        assert_eq!(plan[0].body, "Time for: Stretch");
    }

    #[test]
    fn test_plan_spanish_text() {
        let habit = habit_with_reminder(vec![0]);
        let plan = plan_notifications(&habit, Locale::Es);
        assert_eq!(plan[0].title, "Recordatorio de hábito");
        assert_eq!(plan[0].body, "Es hora de: Stretch");
        assert_eq!(plan[0].weekday, 1);
    }

    #[test]
    fn test_plan_empty_without_valid_reminder() {
        let habit = Habit::new(Uuid::new_v4(), "x", Utc::now());
        assert!(plan_notifications(&habit, Locale::En).is_empty());

        let habit = habit_with_reminder(vec![]);
        assert!(plan_notifications(&habit, Locale::En).is_empty());

        let mut habit = habit_with_reminder(vec![1]);
        habit.reminder.as_mut().unwrap().enabled = false;
        assert!(plan_notifications(&habit, Locale::En).is_empty());
    }

    #[test]
    fn test_schedule_replaces_previous_requests() {
        let db = Database::in_memory().unwrap();
        let mut habit = habit_with_reminder(vec![1, 2, 3]);

        assert_eq!(schedule_reminders(&db, &habit, Locale::En), 3);
        assert_eq!(db.pending().unwrap().len(), 3);

        habit.reminder.as_mut().unwrap().days = vec![6];
        assert_eq!(schedule_reminders(&db, &habit, Locale::En), 1);
        let pending = db.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].weekday, 7);
    }

    #[test]
    fn test_cancel_only_touches_one_habit() {
        let db = Database::in_memory().unwrap();
        let a = habit_with_reminder(vec![1, 2]);
        let b = habit_with_reminder(vec![4]);
        schedule_reminders(&db, &a, Locale::En);
        schedule_reminders(&db, &b, Locale::En);

        cancel_reminders(&db, a.id);
        let pending = db.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].habit_id, b.id);

        db.remove_all().unwrap();
        assert!(db.pending().unwrap().is_empty());
    }

    #[test]
    fn test_next_occurrence() {
        let cal = Calendar::default();
        let habit = habit_with_reminder(vec![1]); // Mondays at 07:45
        let request = &plan_notifications(&habit, Locale::En)[0];

        // Thursday 2024-03-14 -> Monday 2024-03-18
        let after = Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap();
        let next = request.next_occurrence(after, &cal).unwrap();
        assert_eq!(next.weekday(), Weekday::Mon);
        assert_eq!(next.day(), 18);
        assert_eq!((next.hour(), next.minute()), (7, 45));

        // Monday after 07:45 rolls to the next week
        let after = Utc.with_ymd_and_hms(2024, 3, 18, 8, 0, 0).unwrap();
        assert_eq!(request.next_occurrence(after, &cal).unwrap().day(), 25);

        // Monday before 07:45 fires the same day
        let after = Utc.with_ymd_and_hms(2024, 3, 18, 6, 0, 0).unwrap();
        assert_eq!(request.next_occurrence(after, &cal).unwrap().day(), 18);
    }
}
