use crate::{error::AppError, server::Server};
use axum::{Router, extract::State, response::Json, routing::get};
use serde_json::{Value, json};

/// Create health check routes
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/", get(health_check))
}

async fn health_check(State(server): State<Server>) -> Result<Json<Value>, AppError> {
    server.database.health_check().await?;

    Ok(Json(json!({ "status": "ok" })))
}
