//! Pending notification storage
//!
//! The CLI has no OS notification center to hand requests to, so the cache
//! keeps them and `habitdash reminders` lists what would fire.

use chrono::Utc;
use rusqlite::params;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{format_datetime, Database};
use crate::error::Result;
use crate::notifications::{NotificationRequest, NotificationScheduler};

impl NotificationScheduler for Database {
    fn add(&self, request: &NotificationRequest) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO pending_notifications \
             (identifier, habit_id, title, body, weekday, hour, minute, repeats, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                request.identifier,
                request.habit_id.to_string(),
                request.title,
                request.body,
                request.weekday,
                request.hour,
                request.minute,
                request.repeats,
                format_datetime(&Utc::now()),
            ],
        )?;
        debug!(identifier = %request.identifier, "Stored pending notification");
        Ok(())
    }

    fn remove(&self, identifiers: &[String]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("DELETE FROM pending_notifications WHERE identifier = ?")?;
            for identifier in identifiers {
                stmt.execute(params![identifier])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_all(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM pending_notifications", [])?;
        Ok(())
    }

    fn pending(&self) -> Result<Vec<NotificationRequest>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT identifier, habit_id, title, body, weekday, hour, minute, repeats \
             FROM pending_notifications ORDER BY habit_id, weekday",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let habit_id: String = row.get(1)?;
                Ok((
                    habit_id,
                    NotificationRequest {
                        identifier: row.get(0)?,
                        habit_id: Uuid::nil(),
                        title: row.get(2)?,
                        body: row.get(3)?,
                        weekday: row.get(4)?,
                        hour: row.get(5)?,
                        minute: row.get(6)?,
                        repeats: row.get(7)?,
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let requests = rows
            .into_iter()
            .filter_map(|(habit_id, mut request)| match Uuid::parse_str(&habit_id) {
                Ok(id) => {
                    request.habit_id = id;
                    Some(request)
                }
                Err(_) => {
                    warn!(identifier = %request.identifier, "Skipping notification with bad habit id");
                    None
                }
            })
            .collect();

        Ok(requests)
    }
}
