//! In-process tables standing in for the relational store.
//!
//! Row-level atomicity comes from `DashMap` shard locks. Operations that touch
//! a slot table and the orders table always lock the slot table first.

mod checkout;
mod transitions;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

pub use checkout::CheckoutReservation;
pub use transitions::TransitionError;

use crate::auth::{AccessToken, AuthError, Principal};
use crate::models::customer::Customer;
use crate::models::driver::Driver;
use crate::models::meal::Meal;
use crate::models::order::Order;
use crate::models::restaurant::Restaurant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CustomerSlot {
    CheckingOut,
    Order(Uuid),
}

#[derive(Default)]
pub struct Store {
    restaurants: DashMap<Uuid, Restaurant>,
    customers: DashMap<Uuid, Customer>,
    drivers: DashMap<Uuid, Driver>,
    meals: DashMap<Uuid, Meal>,
    orders: DashMap<Uuid, Order>,
    tokens: DashMap<String, AccessToken>,
    /// driver -> the order they are delivering
    active_deliveries: DashMap<Uuid, Uuid>,
    /// customer -> undelivered order or checkout in flight
    open_orders: DashMap<Uuid, CustomerSlot>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_restaurant(&self, restaurant: Restaurant) {
        self.restaurants.insert(restaurant.id, restaurant);
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn insert_driver(&self, driver: Driver) {
        self.drivers.insert(driver.id, driver);
    }

    pub fn insert_meal(&self, meal: Meal) {
        self.meals.insert(meal.id, meal);
    }

    pub fn restaurant(&self, id: &Uuid) -> Option<Restaurant> {
        self.restaurants.get(id).map(|entry| entry.value().clone())
    }

    pub fn driver(&self, id: &Uuid) -> Option<Driver> {
        self.drivers.get(id).map(|entry| entry.value().clone())
    }

    pub fn meal(&self, id: &Uuid) -> Option<Meal> {
        self.meals.get(id).map(|entry| entry.value().clone())
    }

    pub fn order(&self, id: &Uuid) -> Option<Order> {
        self.orders.get(id).map(|entry| entry.value().clone())
    }

    /// All restaurants in id (creation) order.
    pub fn restaurants(&self) -> Vec<Restaurant> {
        let mut restaurants: Vec<Restaurant> = self
            .restaurants
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        restaurants.sort_by_key(|restaurant| restaurant.id);
        restaurants
    }

    /// Meals of one restaurant, newest first.
    pub fn meals_for(&self, restaurant_id: &Uuid) -> Vec<Meal> {
        let mut meals: Vec<Meal> = self
            .meals
            .iter()
            .filter(|entry| entry.restaurant_id == *restaurant_id)
            .map(|entry| entry.value().clone())
            .collect();
        meals.sort_by(|a, b| b.id.cmp(&a.id));
        meals
    }

    /// Snapshot of the orders matching `filter`, oldest first.
    pub fn orders_where<F>(&self, filter: F) -> Vec<Order>
    where
        F: Fn(&Order) -> bool,
    {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        orders
    }

    pub fn update_driver_location(
        &self,
        driver_id: &Uuid,
        location: String,
        at: DateTime<Utc>,
    ) -> Option<Driver> {
        let mut driver = self.drivers.get_mut(driver_id)?;
        driver.location = location;
        driver.updated_at = at;
        Some(driver.clone())
    }

    pub fn insert_token(&self, token: AccessToken) {
        self.tokens.insert(token.token.clone(), token);
    }

    pub fn resolve_token(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, AuthError> {
        // the read guard must be released before removing from the same shard
        let live = {
            let entry = self.tokens.get(token).ok_or(AuthError::Invalid)?;
            (!entry.is_expired(now)).then_some(entry.principal)
        };

        live.ok_or_else(|| {
            self.tokens.remove(token);
            AuthError::Expired
        })
    }

    pub fn active_delivery_count(&self) -> usize {
        self.active_deliveries.len()
    }

    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            restaurants: self.restaurants.len(),
            customers: self.customers.len(),
            drivers: self.drivers.len(),
            orders: self.orders.len(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoreCounts {
    pub restaurants: usize,
    pub customers: usize,
    pub drivers: usize,
    pub orders: usize,
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::models::location::GeoPoint;
    use crate::models::order::{Order, OrderDetail, OrderStatus};
    use crate::models::restaurant::Restaurant;

    pub fn restaurant_at(location: Option<GeoPoint>) -> Restaurant {
        Restaurant {
            id: Uuid::now_v7(),
            name: "Test Kitchen".to_string(),
            phone: "0400 000 000".to_string(),
            address: "1 George St".to_string(),
            location,
            opening_time: None,
            closing_time: None,
            is_open_for_orders: true,
            created_at: Utc::now(),
        }
    }

    pub fn order_for(
        restaurant_id: Uuid,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Order {
        Order {
            id: Uuid::now_v7(),
            customer_id: Uuid::now_v7(),
            restaurant_id,
            driver_id: None,
            address: "12 Pitt St".to_string(),
            extra_notes: None,
            subtotal: 2000,
            shipping: 500,
            total: 2500,
            status,
            created_at,
            picked_at: None,
            delivered_at: None,
            order_details: vec![OrderDetail {
                meal_id: Uuid::now_v7(),
                meal_name: "Pho".to_string(),
                quantity: 2,
                sub_total: 2000,
            }],
        }
    }
}
