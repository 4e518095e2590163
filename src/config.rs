use std::env;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub event_buffer_size: usize,
    pub dispatch: DispatchSettings,
    pub pricing: PricingSettings,
    pub auth: AuthSettings,
    pub payment: PaymentSettings,
}

/// Operating radius and paging defaults for location queries.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub radius_km: f64,
    pub nearby_batch_size: usize,
    /// Offset used to evaluate restaurant opening hours and revenue days.
    pub utc_offset: FixedOffset,
}

#[derive(Debug, Clone)]
pub struct PricingSettings {
    pub shipping_fee_minor: u64,
    pub free_shipping_threshold_minor: u64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub stripe_api_key: Option<String>,
    pub stripe_base_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            event_buffer_size: 1024,
            dispatch: DispatchSettings::default(),
            pricing: PricingSettings::default(),
            auth: AuthSettings::default(),
            payment: PaymentSettings::default(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            nearby_batch_size: 10,
            utc_offset: Utc.fix(),
        }
    }
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            shipping_fee_minor: 500,
            free_shipping_threshold_minor: 5000,
            currency: "aud".to_string(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_secs: 86_400,
        }
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            stripe_api_key: None,
            stripe_base_url: "https://api.stripe.com".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") | Err(_) => LogFormat::Compact,
            Ok(other) => {
                return Err(AppError::Internal(format!(
                    "invalid LOG_FORMAT: {other}, expected compact/json"
                )));
            }
        };

        let radius_km: f64 = parse_or_default("DISPATCH_RADIUS_KM", defaults.dispatch.radius_km)?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::Internal(
                "invalid DISPATCH_RADIUS_KM: must be a positive number".to_string(),
            ));
        }

        let offset_minutes: i32 = parse_or_default("UTC_OFFSET_MINUTES", 0)?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            AppError::Internal(format!("invalid UTC_OFFSET_MINUTES: {offset_minutes}"))
        })?;

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            dispatch: DispatchSettings {
                radius_km,
                nearby_batch_size: parse_or_default(
                    "NEARBY_BATCH_SIZE",
                    defaults.dispatch.nearby_batch_size,
                )?,
                utc_offset,
            },
            pricing: PricingSettings {
                shipping_fee_minor: parse_or_default(
                    "SHIPPING_FEE_MINOR",
                    defaults.pricing.shipping_fee_minor,
                )?,
                free_shipping_threshold_minor: parse_or_default(
                    "FREE_SHIPPING_THRESHOLD_MINOR",
                    defaults.pricing.free_shipping_threshold_minor,
                )?,
                currency: env::var("CURRENCY").unwrap_or(defaults.pricing.currency),
            },
            auth: AuthSettings {
                token_ttl_secs: parse_or_default("TOKEN_TTL_SECS", defaults.auth.token_ttl_secs)?,
            },
            payment: PaymentSettings {
                stripe_api_key: env::var("STRIPE_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                stripe_base_url: env::var("STRIPE_BASE_URL")
                    .unwrap_or(defaults.payment.stripe_base_url),
                timeout_secs: parse_or_default(
                    "PAYMENT_TIMEOUT_SECS",
                    defaults.payment.timeout_secs,
                )?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
