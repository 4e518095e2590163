use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::{success, CoordinatesQuery, Empty, OrderBody, OrdersBody, Success};
use crate::api::rest::extract::{ApiJson, ApiQuery};
use crate::auth::Authenticated;
use crate::engine::dispatch::{oldest_ready_order, ready_orders_near};
use crate::engine::lifecycle;
use crate::engine::revenue::{weekly_revenue, DailyRevenue};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/driver/orders/ready", get(ready_orders))
        .route("/api/driver/order/get-ready-order", get(oldest_order))
        .route("/api/driver/order/pick", post(pick_order))
        .route("/api/driver/order/latest", get(latest_order))
        .route("/api/driver/order/complete", post(complete_order))
        .route("/api/driver/revenue", get(revenue))
        .route("/api/driver/location/update", post(update_location))
}

#[derive(Deserialize)]
pub struct OrderIdRequest {
    pub order_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: String,
}

#[derive(Serialize)]
pub struct NoOrderBody {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct RevenueBody {
    pub revenue: Vec<DailyRevenue>,
}

async fn ready_orders(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiQuery(query): ApiQuery<CoordinatesQuery>,
) -> Result<Json<OrdersBody>, AppError> {
    auth.driver()?;
    let point = query.point()?;

    let start = Instant::now();
    let orders = ready_orders_near(&state.store, &point, state.config.dispatch.radius_km);
    state
        .metrics
        .dispatch_query_seconds
        .with_label_values(&["ready_orders"])
        .observe(start.elapsed().as_secs_f64());

    Ok(Json(OrdersBody { orders }))
}

async fn oldest_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiQuery(query): ApiQuery<CoordinatesQuery>,
) -> Result<Response, AppError> {
    auth.driver()?;
    let point = query.point()?;

    let start = Instant::now();
    let order = oldest_ready_order(&state.store, &point, state.config.dispatch.radius_km);
    state
        .metrics
        .dispatch_query_seconds
        .with_label_values(&["oldest_ready_order"])
        .observe(start.elapsed().as_secs_f64());

    Ok(match order {
        Some(order) => Json(OrderBody { order: Some(order) }).into_response(),
        None => success(NoOrderBody {
            message: "No orders are ready in your vicinity",
        })
        .into_response(),
    })
}

async fn pick_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiJson(payload): ApiJson<OrderIdRequest>,
) -> Result<Json<Success<OrderBody>>, AppError> {
    let driver_id = auth.driver()?;
    let order = lifecycle::claim(&state, driver_id, payload.order_id)?;

    Ok(success(OrderBody { order: Some(order) }))
}

async fn latest_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<OrderBody>, AppError> {
    let driver_id = auth.driver()?;

    let order = state
        .store
        .orders_where(|order| order.driver_id == Some(driver_id))
        .into_iter()
        .max_by_key(|order| order.picked_at);

    Ok(Json(OrderBody { order }))
}

async fn complete_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiJson(payload): ApiJson<OrderIdRequest>,
) -> Result<Json<Success<OrderBody>>, AppError> {
    let driver_id = auth.driver()?;
    let order = lifecycle::complete(&state, driver_id, payload.order_id)?;

    Ok(success(OrderBody { order: Some(order) }))
}

async fn revenue(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<RevenueBody>, AppError> {
    let driver_id = auth.driver()?;

    let orders = state
        .store
        .orders_where(|order| order.driver_id == Some(driver_id));
    let today = state.local_now().date_naive();
    let revenue = weekly_revenue(&orders, today, &state.config.dispatch.utc_offset);

    Ok(Json(RevenueBody { revenue }))
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiJson(payload): ApiJson<UpdateLocationRequest>,
) -> Result<Json<Success<Empty>>, AppError> {
    let driver_id = auth.driver()?;

    let location = payload.location.trim();
    if location.is_empty() {
        return Err(AppError::BadRequest("location cannot be empty".to_string()));
    }

    state
        .store
        .update_driver_location(&driver_id, location.to_string(), Utc::now())
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    Ok(success(Empty {}))
}
