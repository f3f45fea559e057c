//! Shared test utilities for pacer integration tests.
//!
//! One PostgreSQL server is shared per test binary; every test gets a fresh
//! database inside it with migrations applied.
//!
//! Set `PACER_TEST_PG_URL` (server root, no database name) to reuse an
//! already running server instead of starting a container.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use pacer_db::pool;

struct SharedPg {
    base_url: String,
    /// Keeps the container alive. `None` when using an external server.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var("PACER_TEST_PG_URL") {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Base URL of the shared server (no database name appended).
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn maintenance_pool() -> PgPool {
    let maint_url = format!("{}/postgres", pg_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&maint_url)
        .await
        .expect("failed to connect to maintenance database")
}

/// A throwaway database with migrations applied.
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
    pub url: String,
}

impl TestDb {
    /// Create a uniquely named database and migrate it.
    pub async fn new() -> Self {
        let name = format!("pacer_test_{}", Uuid::new_v4().simple());

        let maint_pool = maintenance_pool().await;
        let stmt = format!("CREATE DATABASE {name}");
        maint_pool
            .execute(stmt.as_str())
            .await
            .unwrap_or_else(|e| panic!("failed to create temp database {name}: {e}"));
        maint_pool.close().await;

        let url = format!("{}/{name}", pg_url().await);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect to temp database {name}: {e}"));

        pool::run_migrations(&pool)
            .await
            .expect("migrations should succeed");

        Self { pool, name, url }
    }

    /// Close the pool and drop the database.
    pub async fn teardown(self) {
        self.pool.close().await;
        drop_database(&self.name).await;
    }
}

/// Drop a database, terminating any connections still attached to it.
/// Safe to call for a database that no longer exists.
pub async fn drop_database(name: &str) {
    let maint_pool = maintenance_pool().await;

    let terminate = format!(
        "SELECT pg_terminate_backend(pid) \
         FROM pg_stat_activity \
         WHERE datname = '{name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint_pool.execute(terminate.as_str()).await;

    let stmt = format!("DROP DATABASE IF EXISTS {name}");
    let _ = maint_pool.execute(stmt.as_str()).await;
    maint_pool.close().await;
}
