//! Shared helpers for unit and integration tests.

use crate::config::Config;
use crate::server::Server;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

/// Configuration backed by in-memory SQLite.
///
/// An in-memory SQLite database is visible only to the connection that
/// opened it, so the pool is pinned to a single connection.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config
}

/// Fresh in-memory database connection with migrations applied
pub async fn test_connection() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let connection = sea_orm::Database::connect(options)
        .await
        .expect("failed to open in-memory database");

    crate::database::migration::Migrator::up(&connection, None)
        .await
        .expect("failed to run migrations");

    connection
}

/// Fully initialized server on an in-memory database
pub async fn test_server() -> Server {
    let server = Server::new(test_config())
        .await
        .expect("failed to build test server");
    server
        .database
        .migrate()
        .await
        .expect("failed to run migrations");
    server
}

/// Midnight UTC on the first day of a `YYYY-MM` month
pub fn month(ym: &str) -> DateTime<Utc> {
    let date = format!("{}-01", ym)
        .parse::<NaiveDate>()
        .expect("bad YYYY-MM literal");
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("valid midnight"))
}
