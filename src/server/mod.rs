use crate::{
    config::Config,
    database::Database,
    error::AppError,
    routes::{create_health_routes, create_subscription_routes},
    shutdown::ShutdownCoordinator,
    subscriptions::{SubscriptionService, SubscriptionServiceImpl},
};
use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub database: Arc<Database>,
    pub subscriptions: Arc<dyn SubscriptionService>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let database = Arc::new(Database::new_from_config(&config.database).await?);

        let subscriptions: Arc<dyn SubscriptionService> =
            Arc::new(SubscriptionServiceImpl::new(database.subscriptions()));

        let shutdown_coordinator = Arc::new(ShutdownCoordinator::new());

        Ok(Self {
            config: Arc::new(config),
            database,
            subscriptions,
            shutdown_coordinator,
        })
    }

    pub async fn run(&self) -> Result<(), AppError> {
        // Run database migrations on startup to ensure tables exist
        self.database.migrate().await?;

        let app = self.create_app();

        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to address: {}", e)))?;

        info!("Server listening on http://{}", addr);

        // Spawn shutdown signal handler
        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.wait_for_shutdown_signal().await;
        });

        let shutdown_rx = self.shutdown_coordinator.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let mut rx = shutdown_rx;
                let _ = rx.changed().await;
                info!("Graceful shutdown initiated");
            })
            .await
            .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Creates an application router
    pub fn create_app(&self) -> Router {
        Router::new()
            .nest("/health", create_health_routes())
            .merge(create_subscription_routes())
            .layer(CorsLayer::permissive())
            .with_state(self.clone())
    }
}
