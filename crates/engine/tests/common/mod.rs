#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, Page, RecordFields, RecordKind};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Registers `name` as `{name}@example.org` and returns its id.
pub async fn user(engine: &Engine, name: &str) -> i64 {
    engine
        .create_user(name, &format!("{name}@example.org"), "hashed")
        .await
        .unwrap()
        .id
}

pub fn page(number: u64) -> Page {
    Page::new(number, 20).unwrap()
}

pub fn fields(name: &str, kind: RecordKind, amount: &str) -> RecordFields {
    RecordFields {
        name: name.to_string(),
        kind,
        date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        amount: amount.parse().unwrap(),
    }
}

pub async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

/// Makes every statement of `event` on `table` fail.
pub async fn inject_failure(db: &DatabaseConnection, event: &str, table: &str) {
    db.execute_unprepared(&format!(
        "CREATE TRIGGER fail_{table} BEFORE {event} ON {table} \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
    ))
    .await
    .unwrap();
}

pub async fn clear_failure(db: &DatabaseConnection, table: &str) {
    db.execute_unprepared(&format!("DROP TRIGGER fail_{table}"))
        .await
        .unwrap();
}
