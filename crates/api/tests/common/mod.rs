#![allow(dead_code)]

use chrono::Utc;
use entity::{lead, user};
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait, Statement, Value,
};
use uuid::Uuid;

/// In-memory SQLite with the production schema shape. Keeping the DDL
/// here (instead of running the migrator) keeps the tests honest about
/// what the services actually read and write.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    bootstrap_sqlite(&db).await;
    db
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await
    .unwrap();

    let ddl = [
        r#"
        CREATE TABLE app_user (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE user_secret (
            user_id TEXT PRIMARY KEY REFERENCES app_user(id) ON DELETE CASCADE,
            password_hash TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE lead (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            lead_type TEXT,
            location TEXT,
            status INTEGER NOT NULL DEFAULT 1,
            stage INTEGER,
            current_entry_id TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE sales_stage (
            code INTEGER PRIMARY KEY,
            label TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE stage_entry (
            id TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL REFERENCES lead(id) ON DELETE CASCADE,
            recorded_by TEXT NOT NULL,
            stage INTEGER NOT NULL,
            payload TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE offer (
            id TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL REFERENCES lead(id) ON DELETE CASCADE,
            recorded_by TEXT NOT NULL,
            amount INTEGER NOT NULL,
            decision INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE followup (
            id TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL REFERENCES lead(id) ON DELETE CASCADE,
            followup_date TEXT NOT NULL,
            summary TEXT NOT NULL,
            state TEXT NOT NULL DEFAULT 'OPEN',
            created_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ];
    for statement in ddl {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, statement))
            .await
            .unwrap();
    }

    let catalog = [
        (1_i16, "Offer Accepted"),
        (2, "Offer Rejected"),
        (3, "Withdrawn"),
        (4, "Solicitor Engaged"),
        (5, "Mortgage"),
        (6, "Survey & Search"),
        (7, "Conveyancing"),
        (8, "Sales Invoice Credited"),
        (9, "Exchange of Contract"),
        (10, "Completion"),
    ];
    for (code, label) in catalog {
        db.execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT INTO sales_stage (code, label) VALUES (?, ?)",
            vec![Value::from(code), label.into()],
        ))
        .await
        .unwrap();
    }
}

pub async fn insert_user(db: &DatabaseConnection, email: &str) -> user::Model {
    let user_id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO app_user (id, email, display_name, is_active, created_at, updated_at) VALUES (?, ?, ?, 1, ?, ?)",
        vec![
            user_id.into(),
            email.into(),
            "Test User".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

pub async fn insert_lead(db: &DatabaseConnection, status: i16) -> lead::Model {
    let lead_id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO lead (id, first_name, last_name, email, phone_number, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            lead_id.into(),
            "Priya".into(),
            "Shah".into(),
            format!("{lead_id}@buyers.test").into(),
            "07700900123".into(),
            status.into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    lead::Entity::find_by_id(lead_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}
