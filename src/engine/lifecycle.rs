//! Status transitions after creation, with their events and metrics.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::Order;
use crate::state::AppState;
use crate::store::TransitionError;

pub fn mark_ready(state: &AppState, restaurant_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
    let order = state.store.mark_ready(order_id, restaurant_id)?;

    info!(order_id = %order.id, restaurant_id = %restaurant_id, "order ready for pickup");
    state.publish(&order);
    Ok(order)
}

pub fn claim(state: &AppState, driver_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
    match state.store.claim_order(order_id, driver_id, Utc::now()) {
        Ok(order) => {
            state
                .metrics
                .claims_total
                .with_label_values(&["success"])
                .inc();
            state.sync_active_deliveries();

            info!(order_id = %order.id, driver_id = %driver_id, "order claimed");
            state.publish(&order);
            Ok(order)
        }
        Err(err) => {
            state
                .metrics
                .claims_total
                .with_label_values(&[claim_outcome(&err)])
                .inc();

            warn!(order_id = %order_id, driver_id = %driver_id, error = %err, "claim rejected");
            Err(err.into())
        }
    }
}

pub fn complete(state: &AppState, driver_id: Uuid, order_id: Uuid) -> Result<Order, AppError> {
    let order = state.store.complete_order(order_id, driver_id, Utc::now())?;
    state.sync_active_deliveries();

    info!(order_id = %order.id, driver_id = %driver_id, "order delivered");
    state.publish(&order);
    Ok(order)
}

fn claim_outcome(err: &TransitionError) -> &'static str {
    match err {
        TransitionError::AlreadyClaimed => "already_claimed",
        TransitionError::DriverBusy => "driver_busy",
        TransitionError::NotFound(_) => "not_found",
        TransitionError::InvalidState { .. } => "invalid_state",
    }
}
