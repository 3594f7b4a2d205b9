//! Remote repository for a PostgREST-style backend
//!
//! Tables are exposed under `/rest/v1/{table}` and filtered with query
//! operators (`user_id=eq.{id}`). Every request carries the project API key
//! and a bearer token; obtaining the token is outside this crate.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::RecordRepository;
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::{Expense, Habit, ReminderConfig};

/// HTTP client for the remote record store
#[derive(Clone)]
pub struct RestRepository {
    http_client: Client,
    base_url: String,
    api_key: String,
    access_token: String,
}

impl RestRepository {
    pub fn new(base_url: &str, api_key: &str, access_token: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// Build from backend settings; `None` when the backend is not fully configured
    pub fn from_config(backend: &BackendConfig) -> Option<Self> {
        let url = backend.url.as_deref().filter(|s| !s.is_empty())?;
        let key = backend.anon_key.as_deref().filter(|s| !s.is_empty())?;
        let token = backend.access_token.as_deref().unwrap_or(key);
        Some(Self::new(url, key, token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "Backend request");
        self.http_client
            .request(method, format!("{}/rest/v1/{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
    }

    /// Turn non-success statuses into `Error::Server`
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = if status == StatusCode::TOO_MANY_REQUESTS {
            "Too many requests, try again in a moment".to_string()
        } else {
            let body = response.text().await.unwrap_or_default();
            if body.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body
            }
        };

        Err(Error::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Decode a `return=representation` body and take its single row
    async fn decode_single<T: DeserializeOwned>(response: Response) -> Result<T> {
        let mut rows: Vec<T> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(rows.swap_remove(0))
    }
}

/// Habit row as stored by the backend
#[derive(Debug, Serialize, Deserialize)]
struct HabitRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    reminder_enabled: Option<bool>,
    #[serde(default)]
    reminder_time: Option<NaiveTime>,
    #[serde(default)]
    reminder_days: Option<Vec<u8>>,
}

impl From<&Habit> for HabitRecord {
    fn from(habit: &Habit) -> Self {
        let reminder = habit.reminder.as_ref();
        Self {
            id: habit.id,
            user_id: habit.user_id,
            title: habit.title.clone(),
            completed: habit.completed,
            created_at: habit.created_at,
            reminder_enabled: reminder.map(|r| r.enabled),
            reminder_time: reminder.map(|r| r.time),
            reminder_days: reminder.map(|r| r.days.clone()),
        }
    }
}

impl From<HabitRecord> for Habit {
    fn from(record: HabitRecord) -> Self {
        let reminder = record.reminder_time.map(|time| ReminderConfig {
            enabled: record.reminder_enabled.unwrap_or(false),
            time,
            days: record.reminder_days.unwrap_or_default(),
        });
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            completed: record.completed,
            created_at: record.created_at,
            reminder,
        }
    }
}

/// Mutable habit columns sent with PATCH
#[derive(Debug, Serialize)]
struct HabitUpdate<'a> {
    title: &'a str,
    completed: bool,
    reminder_enabled: bool,
    reminder_time: Option<NaiveTime>,
    reminder_days: Option<&'a [u8]>,
}

impl<'a> From<&'a Habit> for HabitUpdate<'a> {
    fn from(habit: &'a Habit) -> Self {
        let reminder = habit.reminder.as_ref();
        Self {
            title: &habit.title,
            completed: habit.completed,
            reminder_enabled: habit.is_reminder_enabled(),
            reminder_time: reminder.map(|r| r.time),
            reminder_days: reminder.map(|r| r.days.as_slice()),
        }
    }
}

/// Expense row as stored by the backend
#[derive(Debug, Serialize, Deserialize)]
struct ExpenseRecord {
    id: Uuid,
    user_id: Uuid,
    category: String,
    amount: f64,
    created_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseRecord {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            user_id: expense.user_id,
            category: expense.category.clone(),
            amount: expense.amount,
            created_at: expense.created_at,
        }
    }
}

impl From<ExpenseRecord> for Expense {
    fn from(record: ExpenseRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            category: record.category,
            amount: record.amount,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl RecordRepository for RestRepository {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch_habits(&self, user_id: Uuid) -> Result<Vec<Habit>> {
        let response = self
            .request(
                Method::GET,
                &format!("habits?user_id=eq.{}&order=created_at.desc", user_id),
            )
            .send()
            .await?;
        let records: Vec<HabitRecord> = Self::decode(Self::check(response).await?).await?;
        debug!(count = records.len(), "Fetched habits");
        Ok(records.into_iter().map(Habit::from).collect())
    }

    async fn create_habit(&self, habit: &Habit) -> Result<Habit> {
        let response = self
            .request(Method::POST, "habits")
            .header("Prefer", "return=representation")
            .json(&[HabitRecord::from(habit)])
            .send()
            .await?;
        let record: HabitRecord = Self::decode_single(Self::check(response).await?).await?;
        Ok(record.into())
    }

    async fn update_habit(&self, habit: &Habit) -> Result<Habit> {
        let response = self
            .request(Method::PATCH, &format!("habits?id=eq.{}", habit.id))
            .header("Prefer", "return=representation")
            .json(&HabitUpdate::from(habit))
            .send()
            .await?;
        let record: HabitRecord = Self::decode_single(Self::check(response).await?).await?;
        Ok(record.into())
    }

    async fn delete_habit(&self, id: Uuid) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("habits?id=eq.{}", id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_expenses(&self, user_id: Uuid) -> Result<Vec<Expense>> {
        let response = self
            .request(
                Method::GET,
                &format!("expenses?user_id=eq.{}&order=created_at.desc", user_id),
            )
            .send()
            .await?;
        let records: Vec<ExpenseRecord> = Self::decode(Self::check(response).await?).await?;
        debug!(count = records.len(), "Fetched expenses");
        Ok(records.into_iter().map(Expense::from).collect())
    }

    async fn create_expense(&self, expense: &Expense) -> Result<Expense> {
        let response = self
            .request(Method::POST, "expenses")
            .header("Prefer", "return=representation")
            .json(&[ExpenseRecord::from(expense)])
            .send()
            .await?;
        let record: ExpenseRecord = Self::decode_single(Self::check(response).await?).await?;
        Ok(record.into())
    }

    async fn delete_expense(&self, id: Uuid) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("expenses?id=eq.{}", id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockBackendServer;
    use chrono::TimeZone;

    fn repo_for(server: &MockBackendServer) -> RestRepository {
        RestRepository::new(&server.url(), "anon-key", "token")
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let mut backend = BackendConfig::default();
        assert!(RestRepository::from_config(&backend).is_none());

        backend.url = Some("https://example.test/".to_string());
        assert!(RestRepository::from_config(&backend).is_none());

        backend.anon_key = Some("key".to_string());
        let repo = RestRepository::from_config(&backend).unwrap();
        assert_eq!(repo.base_url(), "https://example.test");
        // Falls back to the anon key as bearer token
        assert_eq!(repo.access_token, "key");
    }

    #[test]
    fn test_habit_record_wire_format() {
        let mut habit = Habit::new(
            Uuid::nil(),
            "Water",
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        );
        habit.reminder = Some(ReminderConfig::new(
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            vec![1, 2],
        ));

        let json = serde_json::to_value(HabitRecord::from(&habit)).unwrap();
        assert_eq!(json["user_id"], Uuid::nil().to_string());
        assert_eq!(json["created_at"], "2024-03-01T08:00:00Z");
        assert_eq!(json["reminder_enabled"], true);
        assert_eq!(json["reminder_time"], "09:30:00");
        assert_eq!(json["reminder_days"], serde_json::json!([1, 2]));

        let back: Habit = serde_json::from_value::<HabitRecord>(json).unwrap().into();
        assert_eq!(back, habit);
    }

    #[test]
    fn test_habit_record_without_reminder_columns() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "title": "Plain",
            "completed": false,
            "created_at": "2024-03-01T08:00:00+00:00"
        });
        let habit: Habit = serde_json::from_value::<HabitRecord>(json).unwrap().into();
        assert!(habit.reminder.is_none());
    }

    #[tokio::test]
    async fn test_habit_crud_against_mock() {
        let server = MockBackendServer::start().await;
        let repo = repo_for(&server);
        let user = Uuid::new_v4();

        let older = Habit::new(user, "Older", Utc::now() - chrono::Duration::days(1));
        let newer = Habit::new(user, "Newer", Utc::now());
        repo.create_habit(&older).await.unwrap();
        let created = repo.create_habit(&newer).await.unwrap();
        assert_eq!(created, newer);

        // Another user's rows are filtered out
        repo.create_habit(&Habit::new(Uuid::new_v4(), "Other", Utc::now()))
            .await
            .unwrap();

        let habits = repo.fetch_habits(user).await.unwrap();
        let titles: Vec<_> = habits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        let mut toggled = created.clone();
        toggled.completed = true;
        let updated = repo.update_habit(&toggled).await.unwrap();
        assert!(updated.completed);

        repo.delete_habit(created.id).await.unwrap();
        assert_eq!(repo.fetch_habits(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_expense_crud_against_mock() {
        let server = MockBackendServer::start().await;
        let repo = repo_for(&server);
        let user = Uuid::new_v4();

        let expense = Expense::new(user, "Food", 12.5, Utc::now());
        let created = repo.create_expense(&expense).await.unwrap();
        assert_eq!(created, expense);
        assert_eq!(repo.fetch_expenses(user).await.unwrap(), vec![expense.clone()]);

        repo.delete_expense(expense.id).await.unwrap();
        assert!(repo.fetch_expenses(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_habit_is_empty_response() {
        let server = MockBackendServer::start().await;
        let repo = repo_for(&server);
        let habit = Habit::new(Uuid::new_v4(), "Ghost", Utc::now());
        assert!(matches!(
            repo.update_habit(&habit).await,
            Err(Error::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_server_errors() {
        let server = MockBackendServer::start().await;
        let repo = repo_for(&server);

        server.fail_with(500);
        match repo.fetch_habits(Uuid::new_v4()).await {
            Err(Error::Server { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected server error, got {:?}", other.map(|h| h.len())),
        }

        server.fail_with(429);
        match repo.fetch_expenses(Uuid::new_v4()).await {
            Err(Error::Server { status, message }) => {
                assert_eq!(status, 429);
                assert!(message.contains("Too many requests"));
            }
            other => panic!("expected rate limit, got {:?}", other.map(|e| e.len())),
        }
    }

    #[tokio::test]
    async fn test_rejects_missing_api_key() {
        let server = MockBackendServer::start().await;
        let repo = RestRepository::new(&server.url(), "", "token");
        assert!(matches!(
            repo.fetch_habits(Uuid::new_v4()).await,
            Err(Error::Server { status: 401, .. })
        ));
    }
}
