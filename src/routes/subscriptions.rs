use crate::{
    database::{NewSubscription, Subscription, SubscriptionFilter},
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

/// Create subscription API routes
pub fn create_subscription_routes() -> Router<Server> {
    Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/subscriptions/summary", get(get_summary))
        .route(
            "/subscriptions/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
}

/// Request body for create and update
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Query parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Query parameters for the summary endpoint
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

async fn create_subscription(
    State(server): State<Server>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let sub = validate_request(body)?;
    let id = server.subscriptions.create(sub).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn get_subscription(
    State(server): State<Server>,
    Path(id): Path<i32>,
) -> Result<Json<Subscription>, AppError> {
    let sub = server.subscriptions.get_by_id(id).await?;
    Ok(Json(sub))
}

async fn update_subscription(
    State(server): State<Server>,
    Path(id): Path<i32>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let sub = validate_request(body)?;
    // Update is a full replacement; unlike create there is no defaulting
    if sub.start_date.is_none() {
        return Err(AppError::Validation("invalid start_date: missing".to_string()));
    }
    server.subscriptions.update(id, sub).await?;

    Ok(Json(json!({ "status": "ok" })))
}

async fn delete_subscription(
    State(server): State<Server>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    server.subscriptions.delete(id).await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn list_subscriptions(
    State(server): State<Server>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let filter = SubscriptionFilter {
        user_id: non_empty(params.user_id),
        service_name: non_empty(params.service_name),
    };

    let items = server.subscriptions.list(filter).await?;
    Ok(Json(items))
}

async fn get_summary(
    State(server): State<Server>,
    Query(params): Query<SummaryQuery>,
) -> Result<Json<Value>, AppError> {
    let from = parse_month(params.from.as_deref().unwrap_or_default())
        .map_err(|e| AppError::Validation(format!("invalid from: {}", e)))?;
    let to = parse_month(params.to.as_deref().unwrap_or_default())
        .map_err(|e| AppError::Validation(format!("invalid to: {}", e)))?;

    let filter = SubscriptionFilter {
        user_id: non_empty(params.user_id),
        service_name: non_empty(params.service_name),
    };

    let total = server.subscriptions.sum_total(from, to, filter).await?;
    Ok(Json(json!({ "total": total })))
}

fn validate_request(body: SubscriptionRequest) -> Result<NewSubscription, AppError> {
    if uuid::Uuid::parse_str(&body.user_id).is_err() {
        return Err(AppError::Validation("invalid user_id".to_string()));
    }
    if body.price < 0 {
        return Err(AppError::Validation("price must be non-negative".to_string()));
    }

    let start_date = match body.start_date.as_deref() {
        Some(s) => Some(
            parse_month(s).map_err(|e| AppError::Validation(format!("invalid start_date: {}", e)))?,
        ),
        None => None,
    };
    let end_date = match body.end_date.as_deref() {
        Some(s) => Some(
            parse_month(s).map_err(|e| AppError::Validation(format!("invalid end_date: {}", e)))?,
        ),
        None => None,
    };

    Ok(NewSubscription {
        service_name: body.service_name,
        price: body.price,
        user_id: body.user_id,
        start_date,
        end_date,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Parse an `MM-YYYY` month literal into midnight UTC on its first day
fn parse_month(s: &str) -> Result<DateTime<Utc>, String> {
    let (month_part, year_part) = match s.split_once('-') {
        Some((m, y)) if m.len() == 2 && y.len() == 4 => (m, y),
        _ => return Err("bad format, expected MM-YYYY".to_string()),
    };

    let month: u32 = month_part.parse().map_err(|_| "bad month".to_string())?;
    if !(1..=12).contains(&month) {
        return Err("bad month".to_string());
    }

    let year: i32 = year_part.parse().map_err(|_| "bad year".to_string())?;
    if !(1900..=3000).contains(&year) {
        return Err("bad year".to_string());
    }

    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| "bad date".to_string())
}
