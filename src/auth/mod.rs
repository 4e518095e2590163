//! Bearer tokens and the principals they resolve to.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Principal {
    Customer(Uuid),
    Driver(Uuid),
    Restaurant(Uuid),
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn issue(principal: Principal, ttl_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            principal,
            expires_at: now + Duration::seconds(ttl_secs),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("missing or invalid Authorization header")]
    Missing,

    #[error("invalid access token")]
    Invalid,

    #[error("access token expired")]
    Expired,
}

/// Principal resolved from the request's bearer token.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    pub fn customer(&self) -> Result<Uuid, AppError> {
        match self.0 {
            Principal::Customer(id) => Ok(id),
            _ => Err(AppError::Forbidden("customer access required".to_string())),
        }
    }

    pub fn driver(&self) -> Result<Uuid, AppError> {
        match self.0 {
            Principal::Driver(id) => Ok(id),
            _ => Err(AppError::Forbidden("driver access required".to_string())),
        }
    }

    pub fn restaurant(&self) -> Result<Uuid, AppError> {
        match self.0 {
            Principal::Restaurant(id) => Ok(id),
            _ => Err(AppError::Forbidden("restaurant access required".to_string())),
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::Missing)?;
        let principal = state.store.resolve_token(token, Utc::now())?;

        Ok(Self(principal))
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
