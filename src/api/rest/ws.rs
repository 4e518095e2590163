use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::auth::{Authenticated, Principal};
use crate::models::order::{OrderEvent, OrderStatus};
use crate::state::AppState;

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Authenticated(principal): Authenticated,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, principal))
}

/// Restaurants and customers see their own orders. Drivers see their own
/// deliveries plus every order that becomes ready for pickup.
pub fn visible_to(principal: &Principal, event: &OrderEvent) -> bool {
    match *principal {
        Principal::Restaurant(id) => event.restaurant_id == id,
        Principal::Customer(id) => event.customer_id == id,
        Principal::Driver(id) => {
            event.driver_id == Some(id)
                || (event.status == OrderStatus::Ready && event.driver_id.is_none())
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, principal: Principal) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.order_events_tx.subscribe();

    info!(principal = ?principal, "order feed subscriber connected");

    let send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "order feed subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if !visible_to(&principal, &event) {
                continue;
            }

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize order event for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    run_until_either(send_task, recv_task).await;

    info!(principal = ?principal, "order feed subscriber disconnected");
}

/// Waits for the first task to finish and aborts the other.
async fn run_until_either(mut first: JoinHandle<()>, mut second: JoinHandle<()>) {
    tokio::select! {
        _ = &mut first => second.abort(),
        _ = &mut second => first.abort(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use tokio::sync::oneshot;

    use super::{run_until_either, visible_to};
    use crate::auth::Principal;
    use crate::models::order::{OrderEvent, OrderStatus};

    fn event(status: OrderStatus, driver_id: Option<Uuid>) -> OrderEvent {
        OrderEvent {
            order_id: Uuid::now_v7(),
            customer_id: Uuid::now_v7(),
            restaurant_id: Uuid::now_v7(),
            status,
            driver_id,
            at: Utc::now(),
        }
    }

    #[test]
    fn restaurants_and_customers_only_see_their_orders() {
        let placed = event(OrderStatus::Preparing, None);

        assert!(visible_to(&Principal::Restaurant(placed.restaurant_id), &placed));
        assert!(visible_to(&Principal::Customer(placed.customer_id), &placed));
        assert!(!visible_to(&Principal::Restaurant(Uuid::now_v7()), &placed));
        assert!(!visible_to(&Principal::Customer(Uuid::now_v7()), &placed));
    }

    #[test]
    fn drivers_see_pickups_and_their_own_deliveries() {
        let driver = Uuid::now_v7();
        let principal = Principal::Driver(driver);

        assert!(visible_to(&principal, &event(OrderStatus::Ready, None)));
        assert!(visible_to(&principal, &event(OrderStatus::OnTheWay, Some(driver))));
        assert!(!visible_to(&principal, &event(OrderStatus::Preparing, None)));
        assert!(!visible_to(
            &principal,
            &event(OrderStatus::OnTheWay, Some(Uuid::now_v7()))
        ));
    }

    #[tokio::test]
    async fn finished_task_aborts_its_partner() {
        let (guard_tx, guard_rx) = oneshot::channel::<()>();
        let finished = tokio::spawn(async {});
        let pending = tokio::spawn(async move {
            let _guard = guard_tx;
            std::future::pending::<()>().await;
        });

        run_until_either(finished, pending).await;

        // the sender is dropped only once the pending task is torn down
        assert!(guard_rx.await.is_err());
    }
}
