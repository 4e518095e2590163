use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::order::{Order, OrderEvent};
use crate::observability::metrics::Metrics;
use crate::payment::{PaymentGateway, SandboxGateway, StripeGateway};
use crate::store::Store;

pub struct AppState {
    pub store: Store,
    pub payments: Arc<dyn PaymentGateway>,
    pub config: Config,
    pub order_events_tx: broadcast::Sender<OrderEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config, payments: Arc<dyn PaymentGateway>) -> Self {
        let (order_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size.max(1));

        Self {
            store: Store::new(),
            payments,
            config,
            order_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// Picks Stripe when an API key is configured, the sandbox otherwise.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let payments: Arc<dyn PaymentGateway> = match &config.payment.stripe_api_key {
            Some(key) => {
                let gateway = StripeGateway::new(&config.payment, key.clone())
                    .map_err(|err| AppError::Internal(err.to_string()))?;
                info!(base_url = %config.payment.stripe_base_url, "using stripe payment gateway");
                Arc::new(gateway)
            }
            None => {
                warn!("STRIPE_API_KEY not set; charges go to the sandbox gateway");
                Arc::new(SandboxGateway)
            }
        };

        Ok(Self::new(config, payments))
    }

    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.config.dispatch.utc_offset)
    }

    pub fn publish(&self, order: &Order) {
        // no subscribers is not an error
        let _ = self
            .order_events_tx
            .send(OrderEvent::from_order(order, Utc::now()));
    }

    pub fn sync_active_deliveries(&self) {
        self.metrics
            .active_deliveries
            .set(self.store.active_delivery_count() as i64);
    }
}
