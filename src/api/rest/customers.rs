use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::{success, OrderBody, Success};
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::auth::Authenticated;
use crate::engine::checkout::{Checkout, CheckoutError, PlaceOrderRequest};
use crate::engine::dispatch::{nearby_open_restaurants, NearbyQuery};
use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::meal::Meal;
use crate::models::order::OrderStatus;
use crate::models::restaurant::Restaurant;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/customer/restaurants", get(list_restaurants))
        .route("/api/customer/nearby-restaurants", get(nearby_restaurants))
        .route("/api/customer/meals/:restaurant_id", get(list_meals))
        .route("/api/customer/order/add", post(add_order))
        .route("/api/customer/order/latest", get(latest_order))
        .route("/api/customer/driver/location", get(driver_location))
}

#[derive(Serialize)]
pub struct RestaurantsBody {
    pub restaurants: Vec<Restaurant>,
}

#[derive(Serialize)]
pub struct MealsBody {
    pub meals: Vec<Meal>,
}

#[derive(Serialize)]
pub struct LocationBody {
    pub location: String,
}

#[derive(Deserialize)]
pub struct NearbyParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub starting_id: Option<Uuid>,
    pub batch_size: Option<usize>,
    pub distance: Option<f64>,
}

async fn list_restaurants(State(state): State<Arc<AppState>>) -> Json<RestaurantsBody> {
    let mut restaurants = state.store.restaurants();
    restaurants.reverse();
    Json(RestaurantsBody { restaurants })
}

async fn nearby_restaurants(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<NearbyParams>,
) -> Result<Json<RestaurantsBody>, AppError> {
    let point = GeoPoint::parse(params.latitude.as_deref(), params.longitude.as_deref())?;
    let settings = &state.config.dispatch;

    let radius_km = params.distance.unwrap_or(settings.radius_km);
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(AppError::BadRequest("distance must be >= 0".to_string()));
    }

    let query = NearbyQuery {
        starting_after: params.starting_id,
        batch_size: params.batch_size.unwrap_or(settings.nearby_batch_size),
        radius_km,
    };

    let start = Instant::now();
    let restaurants =
        nearby_open_restaurants(&state.store, &point, &query, state.local_now().time());
    state
        .metrics
        .dispatch_query_seconds
        .with_label_values(&["nearby_restaurants"])
        .observe(start.elapsed().as_secs_f64());

    Ok(Json(RestaurantsBody { restaurants }))
}

async fn list_meals(
    State(state): State<Arc<AppState>>,
    ApiPath(restaurant_id): ApiPath<Uuid>,
) -> Result<Json<MealsBody>, AppError> {
    if state.store.restaurant(&restaurant_id).is_none() {
        return Err(AppError::NotFound(format!(
            "restaurant {restaurant_id} not found"
        )));
    }

    Ok(Json(MealsBody {
        meals: state.store.meals_for(&restaurant_id),
    }))
}

async fn add_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiJson(payload): ApiJson<PlaceOrderRequest>,
) -> Result<Json<Success<OrderBody>>, AppError> {
    let customer_id = auth.customer()?;

    let checkout = Checkout {
        store: &state.store,
        payments: state.payments.as_ref(),
        pricing: &state.config.pricing,
    };

    match checkout
        .place_order(customer_id, payload, state.local_now())
        .await
    {
        Ok(order) => {
            state
                .metrics
                .payments_total
                .with_label_values(&["success"])
                .inc();
            state.metrics.orders_created_total.inc();
            state.publish(&order);

            Ok(success(OrderBody { order: Some(order) }))
        }
        Err(err) => {
            if matches!(err, CheckoutError::Payment(_)) {
                state
                    .metrics
                    .payments_total
                    .with_label_values(&["failed"])
                    .inc();
            }
            Err(err.into())
        }
    }
}

async fn latest_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<OrderBody>, AppError> {
    let customer_id = auth.customer()?;
    let order = state
        .store
        .orders_where(|order| order.customer_id == customer_id)
        .pop();

    Ok(Json(OrderBody { order }))
}

async fn driver_location(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<LocationBody>, AppError> {
    let customer_id = auth.customer()?;

    let driver_id = state
        .store
        .orders_where(|order| {
            order.customer_id == customer_id && order.status == OrderStatus::OnTheWay
        })
        .pop()
        .and_then(|order| order.driver_id)
        .ok_or_else(|| AppError::NotFound("no order is on the way".to_string()))?;

    let driver = state
        .store
        .driver(&driver_id)
        .ok_or_else(|| AppError::NotFound(format!("driver {driver_id} not found")))?;

    Ok(Json(LocationBody {
        location: driver.location,
    }))
}
