//! Location queries for drivers and customers.
//!
//! Every query is a linear scan over the restaurants table. That is fine for a
//! small fleet; a larger deployment would want a spatial index here.

use std::collections::HashSet;

use chrono::NaiveTime;
use uuid::Uuid;

use crate::geo::within_radius;
use crate::models::location::GeoPoint;
use crate::models::order::Order;
use crate::models::restaurant::Restaurant;
use crate::store::Store;

/// READY, unassigned orders from restaurants within `radius_km`, newest first.
pub fn ready_orders_near(store: &Store, driver: &GeoPoint, radius_km: f64) -> Vec<Order> {
    let nearby: HashSet<Uuid> = store
        .restaurants()
        .into_iter()
        .filter(|restaurant| within_radius(restaurant.location.as_ref(), driver, radius_km))
        .map(|restaurant| restaurant.id)
        .collect();

    let mut orders =
        store.orders_where(|order| order.is_claimable() && nearby.contains(&order.restaurant_id));
    orders.reverse();
    orders
}

/// The longest-waiting READY order whose restaurant is within `radius_km`.
pub fn oldest_ready_order(store: &Store, driver: &GeoPoint, radius_km: f64) -> Option<Order> {
    store
        .orders_where(Order::is_claimable)
        .into_iter()
        .find(|order| {
            store
                .restaurant(&order.restaurant_id)
                .is_some_and(|restaurant| {
                    within_radius(restaurant.location.as_ref(), driver, radius_km)
                })
        })
}

#[derive(Debug, Clone)]
pub struct NearbyQuery {
    /// Resume after this restaurant id.
    pub starting_after: Option<Uuid>,
    pub batch_size: usize,
    pub radius_km: f64,
}

/// Open restaurants within range of a customer, in id order, at most
/// `batch_size` of them.
pub fn nearby_open_restaurants(
    store: &Store,
    customer: &GeoPoint,
    query: &NearbyQuery,
    local_time: NaiveTime,
) -> Vec<Restaurant> {
    store
        .restaurants()
        .into_iter()
        .filter(|restaurant| query.starting_after.is_none_or(|after| restaurant.id > after))
        .filter(|restaurant| {
            within_radius(restaurant.location.as_ref(), customer, query.radius_km)
                && restaurant.is_open_at(local_time)
        })
        .take(query.batch_size)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime, Utc};
    use uuid::Uuid;

    use super::{nearby_open_restaurants, oldest_ready_order, ready_orders_near, NearbyQuery};
    use crate::models::location::GeoPoint;
    use crate::models::order::OrderStatus;
    use crate::models::restaurant::Restaurant;
    use crate::store::test_support::{order_for, restaurant_at};
    use crate::store::Store;

    const DRIVER: GeoPoint = GeoPoint {
        lat: -33.8688,
        lng: 151.2093,
    };

    fn near() -> Option<GeoPoint> {
        Some(GeoPoint {
            lat: -33.8500,
            lng: 151.2100,
        })
    }

    fn far() -> Option<GeoPoint> {
        Some(GeoPoint {
            lat: -33.7000,
            lng: 151.1000,
        })
    }

    fn add_restaurant(store: &Store, location: Option<GeoPoint>) -> Restaurant {
        let restaurant = restaurant_at(location);
        store.insert_restaurant(restaurant.clone());
        restaurant
    }

    fn add_order(store: &Store, restaurant: &Restaurant, status: OrderStatus, age_mins: i64) -> Uuid {
        let created_at = Utc::now() - Duration::minutes(age_mins);
        let order = order_for(restaurant.id, status, created_at);
        let id = order.id;
        let reservation = store.reserve_checkout(order.customer_id).unwrap();
        reservation.commit(order);
        id
    }

    #[test]
    fn ready_orders_are_filtered_by_radius_and_sorted_newest_first() {
        let store = Store::new();
        let nearby = add_restaurant(&store, near());
        let distant = add_restaurant(&store, far());

        let older = add_order(&store, &nearby, OrderStatus::Ready, 30);
        let newer = add_order(&store, &nearby, OrderStatus::Ready, 5);
        add_order(&store, &nearby, OrderStatus::Preparing, 1);
        add_order(&store, &distant, OrderStatus::Ready, 10);

        let ids: Vec<Uuid> = ready_orders_near(&store, &DRIVER, 5.0)
            .into_iter()
            .map(|order| order.id)
            .collect();

        assert_eq!(ids, vec![newer, older]);
    }

    #[test]
    fn restaurants_without_coordinates_never_match() {
        let store = Store::new();
        let unlocated = add_restaurant(&store, None);
        add_order(&store, &unlocated, OrderStatus::Ready, 10);

        assert!(ready_orders_near(&store, &DRIVER, 20_000.0).is_empty());
        assert!(oldest_ready_order(&store, &DRIVER, 20_000.0).is_none());
    }

    #[test]
    fn claimed_orders_drop_out_of_dispatch() {
        let store = Store::new();
        let nearby = add_restaurant(&store, near());
        let order_id = add_order(&store, &nearby, OrderStatus::Ready, 10);

        store.claim_order(order_id, Uuid::now_v7(), Utc::now()).unwrap();

        assert!(ready_orders_near(&store, &DRIVER, 5.0).is_empty());
        assert!(oldest_ready_order(&store, &DRIVER, 5.0).is_none());
    }

    #[test]
    fn oldest_skips_distant_orders() {
        let store = Store::new();
        let nearby = add_restaurant(&store, near());
        let distant = add_restaurant(&store, far());

        add_order(&store, &distant, OrderStatus::Ready, 60);
        let oldest_near = add_order(&store, &nearby, OrderStatus::Ready, 45);
        add_order(&store, &nearby, OrderStatus::Ready, 15);

        let order = oldest_ready_order(&store, &DRIVER, 5.0).unwrap();
        assert_eq!(order.id, oldest_near);

        let order = oldest_ready_order(&store, &DRIVER, 50.0).unwrap();
        assert_ne!(order.id, oldest_near);
    }

    #[test]
    fn nearby_restaurants_page_through_open_ones() {
        let store = Store::new();
        let first = add_restaurant(&store, near());
        add_restaurant(&store, far());
        add_restaurant(&store, None);
        let mut closed = restaurant_at(near());
        closed.is_open_for_orders = false;
        store.insert_restaurant(closed);
        let second = add_restaurant(&store, near());
        let third = add_restaurant(&store, near());
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

        let mut query = NearbyQuery {
            starting_after: None,
            batch_size: 2,
            radius_km: 5.0,
        };
        let page: Vec<Uuid> = nearby_open_restaurants(&store, &DRIVER, &query, noon)
            .into_iter()
            .map(|restaurant| restaurant.id)
            .collect();
        assert_eq!(page, vec![first.id, second.id]);

        query.starting_after = Some(second.id);
        let page: Vec<Uuid> = nearby_open_restaurants(&store, &DRIVER, &query, noon)
            .into_iter()
            .map(|restaurant| restaurant.id)
            .collect();
        assert_eq!(page, vec![third.id]);
    }
}
