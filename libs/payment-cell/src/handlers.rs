use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{error, info};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::error::PaymentError;
use crate::models::{CreatePayment, CreatePaymentRequest, MidtransNotification};
use crate::services::orchestrator::PaymentService;
use crate::services::signature::verify_signature;

fn map_payment_error(e: PaymentError) -> AppError {
    error!("Payment operation failed: {}", e);
    match e {
        PaymentError::ValidationError(msg) => AppError::ValidationError(msg),
        // Gateway detail is logged above; clients get a generic message.
        PaymentError::GatewayError(_) => {
            AppError::ExternalService("Payment could not be processed".to_string())
        }
        PaymentError::DatabaseError(_) | PaymentError::SerializationError(_) => {
            AppError::Internal("Payment could not be processed".to_string())
        }
    }
}

fn validate_create_request(request: CreatePaymentRequest) -> Result<CreatePayment, AppError> {
    let doctor_id = request
        .doctor_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::ValidationError("doctorId is required".to_string()))?;
    let user_id = request
        .user_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::ValidationError("userId is required".to_string()))?;
    let amount = request
        .amount
        .ok_or_else(|| AppError::ValidationError("amount is required".to_string()))?;

    if amount <= 0.0 {
        return Err(AppError::ValidationError(
            "amount must be greater than zero".to_string(),
        ));
    }

    Ok(CreatePayment {
        doctor_id,
        user_id,
        amount,
        consultation_id: request.consultation_id,
    })
}

#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let request = validate_create_request(request)?;
    info!(
        "Payment create request: user {} -> doctor {}",
        request.user_id, request.doctor_id
    );

    let service = PaymentService::new(&state);
    let response = service
        .create_payment(request)
        .await
        .map_err(map_payment_error)?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn payment_webhook(
    State(state): State<Arc<AppConfig>>,
    Json(notification): Json<MidtransNotification>,
) -> Result<Json<Value>, AppError> {
    let valid = verify_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        &state.midtrans_server_key,
        &notification.signature_key,
    );

    if !valid {
        return Err(AppError::Forbidden("Invalid webhook signature".to_string()));
    }

    info!(
        "Verified webhook for order {} ({})",
        notification.order_id, notification.transaction_status
    );

    let service = PaymentService::new(&state);
    service
        .apply_notification(&notification)
        .await
        .map_err(map_payment_error)?;

    Ok(Json(json!({ "success": true })))
}
