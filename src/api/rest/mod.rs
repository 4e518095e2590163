pub mod accounts;
pub mod customers;
pub mod drivers;
pub mod extract;
pub mod restaurants;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(accounts::router())
        .merge(customers::router())
        .merge(restaurants::router())
        .merge(drivers::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// `{"status": "success", ...body}`
#[derive(Serialize)]
pub struct Success<T> {
    status: &'static str,
    #[serde(flatten)]
    body: T,
}

pub fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        status: "success",
        body,
    })
}

#[derive(Serialize)]
pub struct OrdersBody {
    pub orders: Vec<Order>,
}

#[derive(Serialize)]
pub struct OrderBody {
    pub order: Option<Order>,
}

#[derive(Serialize)]
pub struct Empty {}

/// Raw coordinates so that missing or malformed values produce the failure
/// payload instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl CoordinatesQuery {
    pub fn point(&self) -> Result<GeoPoint, AppError> {
        GeoPoint::parse(self.latitude.as_deref(), self.longitude.as_deref())
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    restaurants: usize,
    customers: usize,
    drivers: usize,
    orders: usize,
    active_deliveries: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let counts = state.store.counts();

    Json(HealthResponse {
        status: "ok",
        restaurants: counts.restaurants,
        customers: counts.customers,
        drivers: counts.drivers,
        orders: counts.orders,
        active_deliveries: state.store.active_delivery_count(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
