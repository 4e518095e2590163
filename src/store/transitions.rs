use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use thiserror::Error;
use uuid::Uuid;

use super::{CustomerSlot, Store};
use crate::models::order::{Order, OrderStatus};

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("order {0} not found")]
    NotFound(Uuid),

    #[error("This order has been picked up by another driver")]
    AlreadyClaimed,

    #[error("Only one order can be delivered at a time")]
    DriverBusy,

    #[error("order is {current}, cannot move to {target}")]
    InvalidState {
        current: OrderStatus,
        target: OrderStatus,
    },
}

fn advance(order: &mut Order, target: OrderStatus) -> Result<(), TransitionError> {
    if !order.status.can_advance_to(target) {
        return Err(TransitionError::InvalidState {
            current: order.status,
            target,
        });
    }

    order.status = target;
    Ok(())
}

impl Store {
    /// PREPARING -> READY, only for the restaurant that owns the order.
    pub fn mark_ready(&self, order_id: Uuid, restaurant_id: Uuid) -> Result<Order, TransitionError> {
        let mut order = self
            .orders
            .get_mut(&order_id)
            .filter(|order| order.restaurant_id == restaurant_id)
            .ok_or(TransitionError::NotFound(order_id))?;

        advance(&mut order, OrderStatus::Ready)?;
        Ok(order.clone())
    }

    /// READY/unassigned -> ONTHEWAY for `driver_id`.
    ///
    /// The driver's delivery slot and the order row are held together, so the
    /// one-active-order check and the conditional write are a single step. Of
    /// any number of concurrent claims on one order exactly one succeeds.
    pub fn claim_order(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Order, TransitionError> {
        let slot = match self.active_deliveries.entry(driver_id) {
            Entry::Occupied(_) => return Err(TransitionError::DriverBusy),
            Entry::Vacant(slot) => slot,
        };

        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or(TransitionError::NotFound(order_id))?;

        if !order.is_claimable() {
            return Err(TransitionError::AlreadyClaimed);
        }

        advance(&mut order, OrderStatus::OnTheWay)?;
        order.driver_id = Some(driver_id);
        order.picked_at = Some(at);
        slot.insert(order_id);

        Ok(order.clone())
    }

    /// ONTHEWAY -> DELIVERED for the assigned driver; frees the driver and the
    /// customer to start another order.
    pub fn complete_order(
        &self,
        order_id: Uuid,
        driver_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Order, TransitionError> {
        let delivered = {
            let slot = self.active_deliveries.entry(driver_id);

            let mut order = self
                .orders
                .get_mut(&order_id)
                .filter(|order| order.driver_id == Some(driver_id))
                .ok_or(TransitionError::NotFound(order_id))?;

            advance(&mut order, OrderStatus::Delivered)?;
            order.delivered_at = Some(at);

            if let Entry::Occupied(slot) = slot {
                if *slot.get() == order_id {
                    slot.remove();
                }
            }

            order.clone()
        };

        self.open_orders
            .remove_if(&delivered.customer_id, |_, slot| {
                *slot == CustomerSlot::Order(order_id)
            });

        Ok(delivered)
    }
}
