use serde::Serialize;
use thiserror::Error;

use crate::config::PricingSettings;
use crate::models::order::OrderDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
}

/// Shipping is waived only above the threshold; a subtotal exactly at the
/// threshold still pays the fee.
pub fn shipping_for(subtotal: u64, settings: &PricingSettings) -> u64 {
    if subtotal > settings.free_shipping_threshold_minor {
        0
    } else {
        settings.shipping_fee_minor
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("order total exceeds the maximum chargeable amount")]
    Overflow,
}

pub fn quote(details: &[OrderDetail], settings: &PricingSettings) -> Result<Quote, PricingError> {
    let subtotal = details
        .iter()
        .try_fold(0u64, |sum, detail| sum.checked_add(detail.sub_total))
        .ok_or(PricingError::Overflow)?;
    let shipping = shipping_for(subtotal, settings);
    let total = subtotal
        .checked_add(shipping)
        .ok_or(PricingError::Overflow)?;

    Ok(Quote {
        subtotal,
        shipping,
        total,
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{quote, shipping_for, PricingError};
    use crate::config::PricingSettings;
    use crate::models::order::OrderDetail;

    fn detail(sub_total: u64) -> OrderDetail {
        OrderDetail {
            meal_id: Uuid::now_v7(),
            meal_name: "Laksa".to_string(),
            quantity: 1,
            sub_total,
        }
    }

    #[test]
    fn small_orders_pay_shipping() {
        let settings = PricingSettings::default();
        let q = quote(&[detail(1250), detail(2000)], &settings).unwrap();

        assert_eq!(q.subtotal, 3250);
        assert_eq!(q.shipping, 500);
        assert_eq!(q.total, 3750);
    }

    #[test]
    fn large_orders_ship_free() {
        let settings = PricingSettings::default();
        let q = quote(&[detail(3000), detail(2001)], &settings).unwrap();

        assert_eq!(q.shipping, 0);
        assert_eq!(q.total, 5001);
    }

    #[test]
    fn totals_that_overflow_are_rejected() {
        let settings = PricingSettings::default();
        let half = u64::MAX / 2 + 1;

        assert_eq!(
            quote(&[detail(half), detail(half)], &settings),
            Err(PricingError::Overflow)
        );
        // subtotal fits but the shipping fee pushes it over
        let settings = PricingSettings {
            free_shipping_threshold_minor: u64::MAX,
            ..PricingSettings::default()
        };
        assert_eq!(
            quote(&[detail(u64::MAX - 100)], &settings),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn threshold_itself_pays_shipping() {
        let settings = PricingSettings::default();
        assert_eq!(shipping_for(4999, &settings), 500);
        assert_eq!(shipping_for(5000, &settings), 500);
        assert_eq!(shipping_for(5001, &settings), 0);
    }

    #[test]
    fn fee_and_threshold_follow_settings() {
        let settings = PricingSettings {
            shipping_fee_minor: 799,
            free_shipping_threshold_minor: 10_000,
            currency: "nzd".to_string(),
        };
        assert_eq!(shipping_for(6000, &settings), 799);
        assert_eq!(shipping_for(10_001, &settings), 0);
    }
}
