use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::PaymentError;
use crate::models::SnapTransaction;

/// Thin client for the Midtrans Snap API. Authenticates with Basic auth:
/// the server key as username, empty password.
pub struct MidtransClient {
    client: Client,
    base_url: String,
    server_key: String,
}

impl MidtransClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.midtrans_base_url.clone(),
            server_key: config.midtrans_server_key.clone(),
        }
    }

    fn auth_header(&self) -> String {
        let credentials = BASE64.encode(format!("{}:", self.server_key));
        format!("Basic {}", credentials)
    }

    pub async fn create_transaction(
        &self,
        order_id: &str,
        gross_amount: f64,
        customer_name: &str,
        doctor_name: &str,
        finish_url: &str,
    ) -> Result<SnapTransaction, PaymentError> {
        let url = format!("{}/snap/v1/transactions", self.base_url);
        debug!("Creating Snap transaction {} at {}", order_id, url);

        let body = json!({
            "transaction_details": {
                "order_id": order_id,
                "gross_amount": gross_amount
            },
            "item_details": [{
                "id": order_id,
                "price": gross_amount,
                "quantity": 1,
                "name": format!("Consultation with {}", doctor_name)
            }],
            "customer_details": {
                "first_name": customer_name
            },
            "callbacks": {
                "finish": finish_url
            }
        });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.auth_header()) {
            headers.insert(AUTHORIZATION, value);
        }

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::GatewayError(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::GatewayError(e.to_string()))?;

        if !status.is_success() {
            // Midtrans reports failures as an error_messages array; the
            // first entry is the most specific one.
            let message = payload["error_messages"][0]
                .as_str()
                .unwrap_or("Payment gateway rejected the transaction")
                .to_string();
            error!("Snap transaction {} failed ({}): {}", order_id, status, message);
            return Err(PaymentError::GatewayError(message));
        }

        let transaction: SnapTransaction = serde_json::from_value(payload)?;
        debug!("Snap transaction {} created", order_id);
        Ok(transaction)
    }
}
