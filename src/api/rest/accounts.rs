use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::{success, Success};
use crate::api::rest::extract::ApiJson;
use crate::auth::{AccessToken, Authenticated, Principal};
use crate::error::AppError;
use crate::models::customer::Customer;
use crate::models::driver::Driver;
use crate::models::location::GeoPoint;
use crate::models::meal::{Meal, MAX_PRICE_MINOR};
use crate::models::restaurant::Restaurant;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/customers", post(register_customer))
        .route("/api/drivers", post(register_driver))
        .route("/api/restaurants", post(register_restaurant))
        .route("/api/restaurant/meals", post(create_meal))
}

#[derive(Deserialize)]
pub struct RegisterCustomerRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Deserialize)]
pub struct RegisterDriverRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Deserialize)]
pub struct RegisterRestaurantRequest {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    #[serde(default = "default_true")]
    pub is_open_for_orders: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    pub price: u64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

#[derive(Serialize)]
pub struct Registered<T> {
    pub account: T,
    pub access_token: AccessToken,
}

#[derive(Serialize)]
pub struct MealBody {
    pub meal: Meal,
}

fn required_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}

fn issue_token(state: &AppState, principal: Principal) -> AccessToken {
    let token = AccessToken::issue(principal, state.config.auth.token_ttl_secs, Utc::now());
    state.store.insert_token(token.clone());
    token
}

async fn register_customer(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterCustomerRequest>,
) -> Result<Json<Success<Registered<Customer>>>, AppError> {
    let customer = Customer {
        id: Uuid::now_v7(),
        name: required_name(&payload.name)?,
        phone: payload.phone,
        address: payload.address,
        created_at: Utc::now(),
    };

    state.store.insert_customer(customer.clone());
    let access_token = issue_token(&state, Principal::Customer(customer.id));

    Ok(success(Registered {
        account: customer,
        access_token,
    }))
}

async fn register_driver(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterDriverRequest>,
) -> Result<Json<Success<Registered<Driver>>>, AppError> {
    let driver = Driver {
        id: Uuid::now_v7(),
        name: required_name(&payload.name)?,
        phone: payload.phone,
        location: String::new(),
        updated_at: Utc::now(),
    };

    state.store.insert_driver(driver.clone());
    let access_token = issue_token(&state, Principal::Driver(driver.id));

    Ok(success(Registered {
        account: driver,
        access_token,
    }))
}

async fn register_restaurant(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRestaurantRequest>,
) -> Result<Json<Success<Registered<Restaurant>>>, AppError> {
    let location = match (payload.latitude, payload.longitude) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "latitude and longitude must be given together".to_string(),
            ));
        }
    };

    let restaurant = Restaurant {
        id: Uuid::now_v7(),
        name: required_name(&payload.name)?,
        phone: payload.phone,
        address: payload.address,
        location,
        opening_time: payload.opening_time,
        closing_time: payload.closing_time,
        is_open_for_orders: payload.is_open_for_orders,
        created_at: Utc::now(),
    };

    state.store.insert_restaurant(restaurant.clone());
    let access_token = issue_token(&state, Principal::Restaurant(restaurant.id));

    Ok(success(Registered {
        account: restaurant,
        access_token,
    }))
}

async fn create_meal(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ApiJson(payload): ApiJson<CreateMealRequest>,
) -> Result<Json<Success<MealBody>>, AppError> {
    let restaurant_id = auth.restaurant()?;
    if payload.price == 0 || payload.price > MAX_PRICE_MINOR {
        return Err(AppError::BadRequest(format!(
            "price must be between 1 and {MAX_PRICE_MINOR}"
        )));
    }

    let meal = Meal {
        id: Uuid::now_v7(),
        restaurant_id,
        name: required_name(&payload.name)?,
        short_description: payload.short_description,
        price: payload.price,
        is_available: payload.is_available,
    };

    state.store.insert_meal(meal.clone());
    Ok(success(MealBody { meal }))
}
