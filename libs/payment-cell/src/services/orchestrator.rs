use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::PaymentError;
use crate::models::{
    CreatePayment, CreatePaymentResponse, MidtransNotification, PaymentStatus,
};
use crate::services::gateway::MidtransClient;
use crate::services::signature::{generate_order_id, map_transaction_status};

pub struct PaymentService {
    supabase: SupabaseClient,
    gateway: MidtransClient,
    public_app_url: String,
}

impl PaymentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            gateway: MidtransClient::new(config),
            public_app_url: config.public_app_url.clone(),
        }
    }

    /// Creates a gateway transaction and its pending payment row.
    ///
    /// Order of side effects: display-name lookups (best effort), order-id
    /// generation, pending row insert, gateway call. A gateway failure after
    /// the insert leaves the row pending; the row is keyed by an order id the
    /// gateway never saw, so it can never be confirmed by a webhook.
    pub async fn create_payment(
        &self,
        request: CreatePayment,
    ) -> Result<CreatePaymentResponse, PaymentError> {
        let (customer_name, doctor_name) = self
            .display_names(&request.user_id, &request.doctor_id)
            .await;

        let order_id = generate_order_id();
        debug!("Creating payment {} for user {}", order_id, request.user_id);

        let payment_data = json!({
            "user_id": request.user_id,
            "doctor_id": request.doctor_id,
            "consultation_id": request.consultation_id,
            "amount": request.amount,
            "status": PaymentStatus::Pending.as_str(),
            "midtrans_order_id": order_id,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let inserted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/payments",
                None,
                Some(payment_data),
                Some(headers),
            )
            .await
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        let payment_id = inserted
            .first()
            .and_then(|row| row["id"].as_str())
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| {
                PaymentError::DatabaseError("Failed to create payment row".to_string())
            })?;

        let finish_url = format!(
            "{}/payment/confirmation/{}",
            self.public_app_url, payment_id
        );

        let transaction = self
            .gateway
            .create_transaction(
                &order_id,
                request.amount,
                &customer_name,
                &doctor_name,
                &finish_url,
            )
            .await?;

        // Keep the token alongside the row for later client retrieval.
        let token_update = json!({
            "snap_token": transaction.token,
            "updated_at": Utc::now().to_rfc3339()
        });
        if let Err(e) = self
            .supabase
            .request::<Vec<Value>>(
                Method::PATCH,
                &format!("/rest/v1/payments?id=eq.{}", payment_id),
                None,
                Some(token_update),
            )
            .await
        {
            warn!("Failed to store snap token for payment {}: {}", payment_id, e);
        }

        Ok(CreatePaymentResponse {
            success: true,
            payment_id,
            snap_token: transaction.token,
            redirect_url: transaction.redirect_url,
        })
    }

    /// Applies a verified gateway notification to the payment row keyed by
    /// its unique order id. Signature verification happens at the handler
    /// boundary before this runs.
    pub async fn apply_notification(
        &self,
        notification: &MidtransNotification,
    ) -> Result<PaymentStatus, PaymentError> {
        let status = map_transaction_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );

        debug!(
            "Webhook for order {}: {} / {:?} -> {}",
            notification.order_id,
            notification.transaction_status,
            notification.fraud_status,
            status.as_str()
        );

        let update = json!({
            "status": status.as_str(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!(
                    "/rest/v1/payments?midtrans_order_id=eq.{}",
                    notification.order_id
                ),
                None,
                Some(update),
                Some(headers),
            )
            .await
            .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;

        let Some(payment) = updated.first() else {
            warn!("Webhook for unknown order id: {}", notification.order_id);
            return Ok(status);
        };

        // A terminal payment outcome carries over to the consultation the
        // payment was booked for, when the link exists.
        if let Some(consultation_id) = payment["consultation_id"].as_str() {
            let payment_status = match status {
                PaymentStatus::Success => Some("confirmed"),
                PaymentStatus::Failed => Some("failed"),
                _ => None,
            };

            if let Some(payment_status) = payment_status {
                self.supabase
                    .request::<Vec<Value>>(
                        Method::PATCH,
                        &format!("/rest/v1/consultations?id=eq.{}", consultation_id),
                        None,
                        Some(json!({
                            "payment_status": payment_status,
                            "updated_at": Utc::now().to_rfc3339()
                        })),
                    )
                    .await
                    .map_err(|e| PaymentError::DatabaseError(e.to_string()))?;
            }
        }

        Ok(status)
    }

    /// Best-effort display names for the gateway receipt. Missing rows or
    /// lookup failures fall back to placeholders; they never block payment.
    async fn display_names(&self, user_id: &str, doctor_id: &str) -> (String, String) {
        let customer = self
            .lookup_name("/rest/v1/profiles?select=full_name&id=eq.", user_id)
            .await
            .unwrap_or_else(|| "Customer".to_string());

        let doctor = self
            .lookup_name("/rest/v1/doctors?select=full_name&id=eq.", doctor_id)
            .await
            .unwrap_or_else(|| "Doctor".to_string());

        (customer, doctor)
    }

    async fn lookup_name(&self, path_prefix: &str, id: &str) -> Option<String> {
        let path = format!("{}{}", path_prefix, id);
        match self.supabase.request::<Vec<Value>>(Method::GET, &path, None, None).await {
            Ok(rows) => rows
                .first()
                .and_then(|row| row["full_name"].as_str())
                .map(String::from),
            Err(e) => {
                warn!("Name lookup failed for {}: {}", id, e);
                None
            }
        }
    }
}
