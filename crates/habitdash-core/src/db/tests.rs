use chrono::{Duration, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use super::*;
use crate::models::{Expense, Habit, ReminderConfig};

fn test_db() -> Database {
    Database::in_memory().unwrap()
}

fn habit_at(user_id: Uuid, title: &str, days_ago: i64) -> Habit {
    let created = Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap() - Duration::days(days_ago);
    Habit::new(user_id, title, created)
}

fn expense_at(user_id: Uuid, category: &str, amount: f64, days_ago: i64) -> Expense {
    let created = Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap() - Duration::days(days_ago);
    Expense::new(user_id, category, amount, created)
}

#[test]
fn test_datetime_roundtrip_preserves_order() {
    let a = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
    let b = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
    assert!(format_datetime(&a) < format_datetime(&b));
    assert_eq!(parse_datetime(&format_datetime(&a)), Some(a));
    assert_eq!(parse_datetime("not a date"), None);
}

#[test]
fn test_replace_habits_and_fetch_newest_first() {
    let db = test_db();
    let user = Uuid::new_v4();
    let habits = vec![
        habit_at(user, "old", 5),
        habit_at(user, "new", 0),
        habit_at(user, "mid", 2),
    ];

    db.replace_habits(user, &habits).unwrap();
    let cached = db.fetch_habits(user).unwrap();
    let titles: Vec<_> = cached.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "mid", "old"]);
}

#[test]
fn test_replace_habits_drops_stale_rows() {
    let db = test_db();
    let user = Uuid::new_v4();
    db.replace_habits(user, &[habit_at(user, "a", 1), habit_at(user, "b", 2)])
        .unwrap();
    db.replace_habits(user, &[habit_at(user, "c", 0)]).unwrap();

    let cached = db.fetch_habits(user).unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].title, "c");
}

#[test]
fn test_replace_with_empty_keeps_cache() {
    let db = test_db();
    let user = Uuid::new_v4();
    db.replace_habits(user, &[habit_at(user, "a", 1)]).unwrap();
    db.replace_habits(user, &[]).unwrap();
    assert_eq!(db.fetch_habits(user).unwrap().len(), 1);

    db.replace_expenses(user, &[expense_at(user, "Food", 3.0, 1)])
        .unwrap();
    db.replace_expenses(user, &[]).unwrap();
    assert_eq!(db.fetch_expenses(user).unwrap().len(), 1);
}

#[test]
fn test_replace_is_scoped_to_user() {
    let db = test_db();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    db.replace_habits(alice, &[habit_at(alice, "alice", 1)])
        .unwrap();
    db.replace_habits(bob, &[habit_at(bob, "bob", 1)]).unwrap();
    db.replace_habits(alice, &[habit_at(alice, "alice2", 0)])
        .unwrap();

    assert_eq!(db.fetch_habits(bob).unwrap()[0].title, "bob");
    assert_eq!(db.fetch_habits(alice).unwrap()[0].title, "alice2");
    assert_eq!(db.count_habits(alice).unwrap(), 1);
}

#[test]
fn test_habit_reminder_roundtrip() {
    let db = test_db();
    let user = Uuid::new_v4();
    let mut habit = habit_at(user, "Gym", 0);
    habit.reminder = Some(ReminderConfig::new(
        NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        vec![1, 3, 5],
    ));
    habit.completed = true;

    db.upsert_habit(&habit).unwrap();
    let loaded = db.get_habit(habit.id).unwrap().unwrap();
    assert_eq!(loaded, habit);
}

#[test]
fn test_update_habit() {
    let db = test_db();
    let user = Uuid::new_v4();
    let mut habit = habit_at(user, "Walk", 0);
    db.upsert_habit(&habit).unwrap();

    habit.completed = true;
    habit.title = "Long walk".to_string();
    db.update_habit(&habit).unwrap();

    let loaded = db.get_habit(habit.id).unwrap().unwrap();
    assert!(loaded.completed);
    assert_eq!(loaded.title, "Long walk");
}

#[test]
fn test_update_missing_habit_is_not_found() {
    let db = test_db();
    let habit = habit_at(Uuid::new_v4(), "ghost", 0);
    let err = db.update_habit(&habit).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_delete_habit() {
    let db = test_db();
    let user = Uuid::new_v4();
    let habit = habit_at(user, "Walk", 0);
    db.upsert_habit(&habit).unwrap();

    assert!(db.delete_habit(habit.id).unwrap());
    assert!(!db.delete_habit(habit.id).unwrap());
    assert!(db.get_habit(habit.id).unwrap().is_none());
}

#[test]
fn test_unreadable_rows_are_skipped() {
    let db = test_db();
    let user = Uuid::new_v4();
    db.upsert_habit(&habit_at(user, "good", 0)).unwrap();

    let conn = db.conn().unwrap();
    conn.execute(
        "INSERT INTO habits (id, user_id, title, completed, created_at) VALUES ('bad-id', ?, 'bad', 0, 'yesterday')",
        [user.to_string()],
    )
    .unwrap();

    let habits = db.fetch_habits(user).unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].title, "good");
}

#[test]
fn test_expense_crud() {
    let db = test_db();
    let user = Uuid::new_v4();
    let expense = expense_at(user, "Food", 12.34, 0);

    db.upsert_expense(&expense).unwrap();
    assert_eq!(db.get_expense(expense.id).unwrap(), Some(expense.clone()));
    assert_eq!(db.count_expenses(user).unwrap(), 1);

    assert!(db.delete_expense(expense.id).unwrap());
    assert_eq!(db.count_expenses(user).unwrap(), 0);
}

#[test]
fn test_replace_expenses_newest_first() {
    let db = test_db();
    let user = Uuid::new_v4();
    let expenses = vec![
        expense_at(user, "Rent", 700.0, 10),
        expense_at(user, "Food", 15.0, 0),
    ];
    db.replace_expenses(user, &expenses).unwrap();

    let cached = db.fetch_expenses(user).unwrap();
    assert_eq!(cached[0].category, "Food");
    assert_eq!(cached[1].category, "Rent");
}

#[test]
fn test_clear() {
    let db = test_db();
    let user = Uuid::new_v4();
    db.upsert_habit(&habit_at(user, "a", 0)).unwrap();
    db.upsert_expense(&expense_at(user, "b", 1.0, 0)).unwrap();

    db.clear().unwrap();
    assert_eq!(db.count_habits(user).unwrap(), 0);
    assert_eq!(db.count_expenses(user).unwrap(), 0);
}

#[test]
fn test_unencrypted_reports_not_encrypted() {
    let db = test_db();
    // cipher_version may be present (SQLCipher is bundled) but no key is set
    if std::env::var(DB_KEY_ENV).is_err() {
        assert!(!db.is_encrypted().unwrap());
    }
}

#[test]
fn test_get_missing_record_is_none() {
    let db = Database::in_memory().unwrap();
    assert!(db.get_habit(Uuid::new_v4()).unwrap().is_none());
    assert!(db.get_expense(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_get_surfaces_query_errors() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();
    conn.execute("DROP TABLE habits", []).unwrap();
    conn.execute("DROP TABLE expenses", []).unwrap();
    drop(conn);

    assert!(db.get_habit(Uuid::new_v4()).is_err());
    assert!(db.get_expense(Uuid::new_v4()).is_err());
}
