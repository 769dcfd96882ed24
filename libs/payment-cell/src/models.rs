use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Challenge,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Challenge => "challenge",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: String,
    pub doctor_id: String,
    pub consultation_id: Option<Uuid>,
    pub amount: f64,
    pub status: PaymentStatus,
    /// Unique order id correlating the gateway transaction with this row.
    pub midtrans_order_id: String,
    pub snap_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw create-payment body. Every field is optional so missing values can be
/// rejected with a 400 instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub doctor_id: Option<String>,
    pub user_id: Option<String>,
    pub amount: Option<f64>,
    pub consultation_id: Option<Uuid>,
}

/// Validated form of [`CreatePaymentRequest`].
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub doctor_id: String,
    pub user_id: String,
    pub amount: f64,
    pub consultation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment_id: Uuid,
    pub snap_token: String,
    pub redirect_url: String,
}

/// Token pair returned by the Snap transaction-creation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapTransaction {
    pub token: String,
    pub redirect_url: String,
}

/// Inbound webhook notification, per the Midtrans notification schema.
#[derive(Debug, Clone, Deserialize)]
pub struct MidtransNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
}
