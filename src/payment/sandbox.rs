use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::{Charge, PaymentError, PaymentGateway, Receipt};

/// Approves every positive charge without contacting a processor.
#[derive(Debug, Default, Clone)]
pub struct SandboxGateway;

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn capture(&self, charge: &Charge) -> Result<Receipt, PaymentError> {
        if charge.amount_minor == 0 {
            return Err(PaymentError::InvalidCharge(
                "amount must be greater than zero".to_string(),
            ));
        }

        let charge_id = format!("sandbox_{}", Uuid::new_v4().simple());
        info!(
            charge_id = %charge_id,
            amount_minor = charge.amount_minor,
            currency = %charge.currency,
            "sandbox charge approved"
        );

        Ok(Receipt { charge_id })
    }
}
