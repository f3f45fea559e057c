//! Integration tests for database migrations and connection pooling.
//!
//! Each test gets its own database from `pacer-test-utils`.

use sqlx::Row;
use uuid::Uuid;

use pacer_db::config::DbConfig;
use pacer_db::pool;
use pacer_test_utils::{TestDb, drop_database, pg_url};

/// Expected tables created by the initial migration.
const EXPECTED_TABLES: &[&str] = &["activities", "training_plans", "workouts"];

#[tokio::test]
async fn migrations_create_all_tables() {
    let db = TestDb::new().await;

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT tablename::text FROM pg_tables \
         WHERE schemaname = 'public' AND tablename NOT LIKE '\\_sqlx%' \
         ORDER BY tablename",
    )
    .fetch_all(&db.pool)
    .await
    .expect("should list tables");

    let names: Vec<&str> = rows.iter().map(|(name,)| name.as_str()).collect();
    assert_eq!(names, EXPECTED_TABLES);

    db.teardown().await;
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = TestDb::new().await;

    // TestDb::new already ran them once.
    pool::run_migrations(&db.pool)
        .await
        .expect("second migration run should succeed");

    for table in EXPECTED_TABLES {
        let query = format!("SELECT COUNT(*) AS cnt FROM {table}");
        let row = sqlx::query(&query)
            .fetch_one(&db.pool)
            .await
            .unwrap_or_else(|e| panic!("failed to count {table}: {e}"));
        let count: i64 = row.get("cnt");
        assert_eq!(count, 0, "table {table} should be empty after migrations");
    }

    db.teardown().await;
}

#[tokio::test]
async fn table_counts_skips_sqlx_bookkeeping() {
    let db = TestDb::new().await;

    let counts = pool::table_counts(&db.pool)
        .await
        .expect("table_counts should succeed");

    let names: Vec<&str> = counts.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, EXPECTED_TABLES);
    assert!(counts.iter().all(|(_, count)| *count == 0));

    db.teardown().await;
}

#[tokio::test]
async fn workout_distance_must_be_non_negative() {
    let db = TestDb::new().await;

    let (plan_id,): (Uuid,) =
        sqlx::query_as("INSERT INTO training_plans (user_id) VALUES ('u1') RETURNING id")
            .fetch_one(&db.pool)
            .await
            .expect("plan insert");

    let result = sqlx::query(
        "INSERT INTO workouts (plan_id, user_id, scheduled_date, distance_km) \
         VALUES ($1, 'u1', DATE '2026-01-01', -1)",
    )
    .bind(plan_id)
    .execute(&db.pool)
    .await;
    assert!(result.is_err(), "check constraint should reject negative km");

    db.teardown().await;
}

#[tokio::test]
async fn create_pool_applies_statement_timeout() {
    let db = TestDb::new().await;

    let config = DbConfig::new(db.url.clone())
        .with_statement_timeout(Some(std::time::Duration::from_millis(1500)))
        .with_max_connections(1);
    let timed = pool::create_pool(&config).await.expect("pool should connect");

    let (setting,): (String,) = sqlx::query_as("SHOW statement_timeout")
        .fetch_one(&timed)
        .await
        .expect("show should work");
    assert_eq!(setting, "1500ms");

    let slow = sqlx::query("SELECT pg_sleep(5)").execute(&timed).await;
    assert!(slow.is_err(), "statement should be cancelled by the timeout");

    timed.close().await;
    db.teardown().await;
}

#[tokio::test]
async fn ensure_database_exists_is_idempotent() {
    let db_name = format!("pacer_test_{}", Uuid::new_v4().simple());
    let config = DbConfig::new(format!("{}/{db_name}", pg_url().await));

    pool::ensure_database_exists(&config)
        .await
        .expect("first ensure should succeed");
    pool::ensure_database_exists(&config)
        .await
        .expect("second ensure should succeed (idempotent)");

    drop_database(&db_name).await;
}
