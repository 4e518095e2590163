use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::{success, OrderBody, OrdersBody, Success};
use crate::api::rest::extract::{ApiPath, ApiQuery};
use crate::auth::Authenticated;
use crate::engine::lifecycle;
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/restaurant/orders", get(list_orders))
        .route("/api/restaurant/order/:id/ready", post(mark_ready))
        .route("/api/restaurant/order/notification", get(notification))
}

#[derive(Deserialize)]
pub struct NotificationParams {
    pub since: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct NotificationBody {
    pub notification: usize,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<OrdersBody>, AppError> {
    let restaurant_id = auth.restaurant()?;

    let mut orders = state
        .store
        .orders_where(|order| order.restaurant_id == restaurant_id);
    orders.reverse();

    Ok(Json(OrdersBody { orders }))
}

async fn mark_ready(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiPath(order_id): ApiPath<Uuid>,
) -> Result<Json<Success<OrderBody>>, AppError> {
    let restaurant_id = auth.restaurant()?;
    let order = lifecycle::mark_ready(&state, restaurant_id, order_id)?;

    Ok(success(OrderBody { order: Some(order) }))
}

/// Number of orders placed since the caller last polled.
async fn notification(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiQuery(params): ApiQuery<NotificationParams>,
) -> Result<Json<NotificationBody>, AppError> {
    let restaurant_id = auth.restaurant()?;

    let notification = state
        .store
        .orders_where(|order| order.restaurant_id == restaurant_id && order.created_at > params.since)
        .len();

    Ok(Json(NotificationBody { notification }))
}
