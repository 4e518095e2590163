use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub location: Option<GeoPoint>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub is_open_for_orders: bool,
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    /// Open when the manual flag is set and `local_time` falls in
    /// `[opening_time, closing_time)`. A missing boundary means no hours apply.
    pub fn is_open_at(&self, local_time: NaiveTime) -> bool {
        let within_hours = match (self.opening_time, self.closing_time) {
            (Some(opening), Some(closing)) => opening <= local_time && local_time < closing,
            _ => true,
        };

        within_hours && self.is_open_for_orders
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    use super::Restaurant;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn restaurant(hours: Option<(NaiveTime, NaiveTime)>, flag: bool) -> Restaurant {
        Restaurant {
            id: Uuid::now_v7(),
            name: "Bite".to_string(),
            phone: String::new(),
            address: String::new(),
            location: None,
            opening_time: hours.map(|(opening, _)| opening),
            closing_time: hours.map(|(_, closing)| closing),
            is_open_for_orders: flag,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_inside_hours_with_flag_set() {
        let r = restaurant(Some((hm(9, 0), hm(21, 0))), true);
        assert!(r.is_open_at(hm(9, 0)));
        assert!(r.is_open_at(hm(20, 59)));
    }

    #[test]
    fn closed_outside_hours_even_with_flag_set() {
        let r = restaurant(Some((hm(9, 0), hm(21, 0))), true);
        assert!(!r.is_open_at(hm(8, 59)));
        assert!(!r.is_open_at(hm(21, 0)));
        assert!(!r.is_open_at(hm(23, 30)));
    }

    #[test]
    fn manual_flag_closes_restaurant() {
        let r = restaurant(Some((hm(9, 0), hm(21, 0))), false);
        assert!(!r.is_open_at(hm(12, 0)));

        let r = restaurant(None, false);
        assert!(!r.is_open_at(hm(12, 0)));
    }

    #[test]
    fn missing_boundary_is_always_time_open() {
        let r = restaurant(None, true);
        assert!(r.is_open_at(hm(3, 0)));

        let mut r = restaurant(Some((hm(9, 0), hm(21, 0))), true);
        r.closing_time = None;
        assert!(r.is_open_at(hm(3, 0)));
    }
}
