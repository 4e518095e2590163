use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PricingSettings;
use crate::engine::pricing::{quote, PricingError};
use crate::models::order::{Order, OrderDetail, OrderStatus};
use crate::payment::{Charge, PaymentError, PaymentGateway};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
    pub meal_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub restaurant_id: Uuid,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub order_details: Vec<OrderLineRequest>,
    pub payment_token: String,
    pub extra_notes: Option<String>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your last order must be completed.")]
    OrderInProgress,

    #[error("Address is required")]
    AddressRequired,

    #[error("order must contain at least one meal")]
    EmptyOrder,

    #[error("invalid quantity for meal {0}")]
    InvalidQuantity(Uuid),

    #[error("restaurant {0} not found")]
    RestaurantNotFound(Uuid),

    #[error("restaurant is not accepting orders")]
    RestaurantClosed,

    #[error("meal {0} not found")]
    MealNotFound(Uuid),

    #[error("meal {0} is not available")]
    MealUnavailable(Uuid),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

pub struct Checkout<'a> {
    pub store: &'a Store,
    pub payments: &'a dyn PaymentGateway,
    pub pricing: &'a PricingSettings,
}

impl Checkout<'_> {
    /// Prices, charges and stores a new PREPARING order.
    ///
    /// The customer's order slot is taken before anything else, so a customer
    /// with an undelivered order is turned away before payment is attempted.
    /// Nothing is stored unless the capture succeeds.
    pub async fn place_order(
        &self,
        customer_id: Uuid,
        request: PlaceOrderRequest,
        now: DateTime<FixedOffset>,
    ) -> Result<Order, CheckoutError> {
        let reservation = self
            .store
            .reserve_checkout(customer_id)
            .ok_or(CheckoutError::OrderInProgress)?;

        let address = request.address.trim();
        if address.is_empty() {
            return Err(CheckoutError::AddressRequired);
        }
        if request.order_details.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }

        let restaurant = self
            .store
            .restaurant(&request.restaurant_id)
            .ok_or(CheckoutError::RestaurantNotFound(request.restaurant_id))?;
        if !restaurant.is_open_at(now.time()) {
            return Err(CheckoutError::RestaurantClosed);
        }

        let details = request
            .order_details
            .iter()
            .map(|line| self.price_line(restaurant.id, line))
            .collect::<Result<Vec<_>, _>>()?;
        let quote = quote(&details, self.pricing)?;

        let charge = Charge {
            amount_minor: quote.total,
            currency: self.pricing.currency.clone(),
            source: request.payment_token.clone(),
            description: format!("Order from {}", restaurant.name),
        };

        let receipt = match self.payments.capture(&charge).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(
                    customer_id = %reservation.customer_id(),
                    amount_minor = charge.amount_minor,
                    error = %err,
                    "payment capture failed; order not created"
                );
                return Err(err.into());
            }
        };

        let order = Order {
            id: Uuid::now_v7(),
            customer_id,
            restaurant_id: restaurant.id,
            driver_id: None,
            address: address.to_string(),
            extra_notes: request.extra_notes.filter(|notes| !notes.trim().is_empty()),
            subtotal: quote.subtotal,
            shipping: quote.shipping,
            total: quote.total,
            status: OrderStatus::Preparing,
            created_at: now.with_timezone(&Utc),
            picked_at: None,
            delivered_at: None,
            order_details: details,
        };

        let order = reservation.commit(order);
        info!(
            order_id = %order.id,
            customer_id = %customer_id,
            restaurant_id = %order.restaurant_id,
            total = order.total,
            charge_id = %receipt.charge_id,
            "order placed"
        );

        Ok(order)
    }

    fn price_line(
        &self,
        restaurant_id: Uuid,
        line: &OrderLineRequest,
    ) -> Result<OrderDetail, CheckoutError> {
        if line.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(line.meal_id));
        }

        let meal = self
            .store
            .meal(&line.meal_id)
            .filter(|meal| meal.restaurant_id == restaurant_id)
            .ok_or(CheckoutError::MealNotFound(line.meal_id))?;
        if !meal.is_available {
            return Err(CheckoutError::MealUnavailable(meal.id));
        }

        let sub_total = meal
            .price
            .checked_mul(u64::from(line.quantity))
            .ok_or(CheckoutError::InvalidQuantity(meal.id))?;

        Ok(OrderDetail {
            meal_id: meal.id,
            meal_name: meal.name,
            quantity: line.quantity,
            sub_total,
        })
    }
}
