use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, AppError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if !valid {
            return Err(AppError::BadRequest(format!(
                "invalid co-ordinates: ({lat}, {lng})"
            )));
        }

        Ok(Self { lat, lng })
    }

    /// Parses a point from raw query values, rejecting missing halves.
    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> Result<Self, AppError> {
        let (Some(lat), Some(lng)) = (non_blank(lat), non_blank(lng)) else {
            return Err(AppError::BadRequest(
                "latitude and longitude co-ordinates required".to_string(),
            ));
        };

        let lat = lat
            .parse::<f64>()
            .map_err(|err| AppError::BadRequest(format!("invalid latitude {lat}: {err}")))?;
        let lng = lng
            .parse::<f64>()
            .map_err(|err| AppError::BadRequest(format!("invalid longitude {lng}: {err}")))?;

        Self::new(lat, lng)
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}
