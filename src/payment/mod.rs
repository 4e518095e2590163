//! Payment capture behind a gateway trait.

mod sandbox;
mod stripe;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use sandbox::SandboxGateway;
pub use stripe::StripeGateway;

#[derive(Debug, Clone, Serialize)]
pub struct Charge {
    /// Amount in minor currency units.
    pub amount_minor: u64,
    pub currency: String,
    /// Card or payment-method token supplied by the customer app.
    pub source: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub charge_id: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("Failed to connect to payment gateway: {0}")]
    Transport(String),

    #[error("invalid charge: {0}")]
    InvalidCharge(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn capture(&self, charge: &Charge) -> Result<Receipt, PaymentError>;
}
