use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{Charge, PaymentError, PaymentGateway, Receipt};
use crate::config::PaymentSettings;

/// Captures charges through the Stripe charges API.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ChargeResponse {
    id: String,
    status: String,
    failure_message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(settings: &PaymentSettings, api_key: String) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| PaymentError::Transport(format!("failed to build client: {err}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.stripe_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn capture(&self, charge: &Charge) -> Result<Receipt, PaymentError> {
        let amount = charge.amount_minor.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", charge.currency.as_str()),
            ("source", charge.source.as_str()),
            ("description", charge.description.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/charges", self.base_url))
            .bearer_auth(&self.api_key)
            .form(&params)
            .send()
            .await
            .map_err(|err| PaymentError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| format!("gateway responded with {status}"));
            warn!(http_status = %status, error = %message, "charge rejected");
            return Err(PaymentError::Declined(message));
        }

        let body: ChargeResponse = response
            .json()
            .await
            .map_err(|err| PaymentError::Transport(format!("unreadable charge response: {err}")))?;

        if body.status == "failed" {
            let message = body
                .failure_message
                .unwrap_or_else(|| "charge failed".to_string());
            warn!(charge_id = %body.id, error = %message, "charge failed");
            return Err(PaymentError::Declined(message));
        }

        info!(charge_id = %body.id, amount_minor = charge.amount_minor, "charge captured");
        Ok(Receipt { charge_id: body.id })
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    use super::StripeGateway;
    use crate::config::PaymentSettings;
    use crate::payment::{Charge, PaymentError, PaymentGateway};

    async fn fake_charges(
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let authorized = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer sk_test");
        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "message": "Invalid API Key" } })),
            );
        }

        match form.get("source").map(String::as_str) {
            Some("tok_chargeDeclined") => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({ "error": { "message": "Your card was declined." } })),
            ),
            Some("tok_failed") => (
                StatusCode::OK,
                Json(json!({ "id": "ch_2", "status": "failed", "failure_message": "insufficient funds" })),
            ),
            _ => (
                StatusCode::OK,
                Json(json!({ "id": format!("ch_{}", form["amount"]), "status": "succeeded" })),
            ),
        }
    }

    async fn gateway(api_key: &str) -> StripeGateway {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/v1/charges", post(fake_charges));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let settings = PaymentSettings {
            stripe_api_key: Some(api_key.to_string()),
            stripe_base_url: format!("http://{addr}/"),
            timeout_secs: 5,
        };
        StripeGateway::new(&settings, api_key.to_string()).unwrap()
    }

    fn charge(source: &str) -> Charge {
        Charge {
            amount_minor: 2500,
            currency: "aud".to_string(),
            source: source.to_string(),
            description: "order".to_string(),
        }
    }

    #[tokio::test]
    async fn successful_charge_returns_receipt() {
        let gateway = gateway("sk_test").await;
        let receipt = gateway.capture(&charge("tok_visa")).await.unwrap();
        assert_eq!(receipt.charge_id, "ch_2500");
    }

    #[tokio::test]
    async fn declined_card_surfaces_gateway_message() {
        let gateway = gateway("sk_test").await;
        let err = gateway.capture(&charge("tok_chargeDeclined")).await.unwrap_err();
        assert_eq!(err, PaymentError::Declined("Your card was declined.".to_string()));
    }

    #[tokio::test]
    async fn failed_status_is_a_decline() {
        let gateway = gateway("sk_test").await;
        let err = gateway.capture(&charge("tok_failed")).await.unwrap_err();
        assert_eq!(err, PaymentError::Declined("insufficient funds".to_string()));
    }

    #[tokio::test]
    async fn bad_api_key_is_rejected() {
        let gateway = gateway("sk_wrong").await;
        let err = gateway.capture(&charge("tok_visa")).await.unwrap_err();
        assert_eq!(err, PaymentError::Declined("Invalid API Key".to_string()));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        let settings = PaymentSettings {
            stripe_api_key: None,
            stripe_base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
        };
        let gateway = StripeGateway::new(&settings, "sk_test".to_string()).unwrap();
        let err = gateway.capture(&charge("tok_visa")).await.unwrap_err();
        assert!(matches!(err, PaymentError::Transport(_)));
    }
}
