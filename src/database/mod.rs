//! Database access layer with domain-specific DAOs
//!
//! Each domain (services, subscriptions) has its own DAO for focused
//! operations on a shared sea-orm connection pool.

use crate::config::DatabaseConfig;
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::time::Duration;
use thiserror::Error;

pub mod dao;
pub mod entities;
pub mod migration;

pub use dao::{NewSubscription, ServicesDao, Subscription, SubscriptionFilter, SubscriptionsDao};

/// Database error types
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Record not found")]
    NotFound,
    #[error("Migration error: {0}")]
    Migration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database connection manager
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Create database manager from configuration
    pub async fn new_from_config(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let mut options = ConnectOptions::new(&config.url);
        options
            .max_connections(config.max_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

        let connection = sea_orm::Database::connect(options)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(Self { connection })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DatabaseResult<()> {
        use crate::database::migration::Migrator;
        use sea_orm_migration::MigratorTrait;

        tracing::info!("Running database migrations");

        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::Migration(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Successfully completed all migrations");
        Ok(())
    }

    /// Health check for database connection
    pub async fn health_check(&self) -> DatabaseResult<()> {
        self.connection
            .ping()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Get subscriptions DAO
    pub fn subscriptions(&self) -> SubscriptionsDao {
        SubscriptionsDao::new(self.connection.clone())
    }

    /// Get direct database connection (for migrations and admin operations)
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
