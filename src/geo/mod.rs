use crate::models::location::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Distance from an optionally located place, `None` when it has no coordinates.
pub fn distance_km(from: Option<&GeoPoint>, to: &GeoPoint) -> Option<f64> {
    from.map(|point| haversine_km(point, to))
}

/// Unknown distance never counts as inside the radius.
pub fn within_radius(from: Option<&GeoPoint>, to: &GeoPoint, radius_km: f64) -> bool {
    distance_km(from, to).is_some_and(|distance| distance <= radius_km)
}

#[cfg(test)]
mod tests {
    use super::{distance_km, haversine_km, within_radius};
    use crate::models::location::GeoPoint;

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 53.5511,
            lng: 9.9937,
        };
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn missing_coordinates_are_unknown_not_zero() {
        let driver = GeoPoint {
            lat: -33.8688,
            lng: 151.2093,
        };

        assert_eq!(distance_km(None, &driver), None);
        assert!(!within_radius(None, &driver, 5.0));
        assert!(!within_radius(None, &driver, f64::MAX));
    }

    #[test]
    fn radius_is_inclusive() {
        let restaurant = GeoPoint {
            lat: -33.8688,
            lng: 151.2093,
        };
        // roughly 4.4 km north
        let near = GeoPoint {
            lat: -33.8288,
            lng: 151.2093,
        };
        // roughly 11 km north
        let far = GeoPoint {
            lat: -33.7688,
            lng: 151.2093,
        };

        assert!(within_radius(Some(&restaurant), &near, 5.0));
        assert!(!within_radius(Some(&restaurant), &far, 5.0));
        assert!(within_radius(Some(&restaurant), &restaurant, 0.0));
    }
}
