use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Extension, Path, State, WebSocketUpgrade,
    },
    response::Response,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::error::ConsultationError;
use crate::models::{
    Consultation, CreateConsultationRequest, SenderType, SendMessageRequest, UpdateStatusRequest,
};
use crate::services::{
    consultation::ConsultationService, messages::MessageService, relay::MessageRelay,
};

/// Router state: the per-request config plus the one piece of shared
/// cross-request state, the live message relay.
#[derive(Clone)]
pub struct ConsultationState {
    pub config: Arc<AppConfig>,
    pub relay: Arc<MessageRelay>,
}

impl ConsultationState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            relay: Arc::new(MessageRelay::new()),
        }
    }
}

fn map_consultation_error(e: ConsultationError) -> AppError {
    error!("Consultation operation failed: {}", e);
    match e {
        ConsultationError::NotFound(_) => {
            AppError::NotFound("Consultation not found".to_string())
        }
        ConsultationError::InvalidStatusTransition { from, to } => AppError::BadRequest(format!(
            "Cannot move consultation from {} to {}",
            from, to
        )),
        ConsultationError::ValidationError(msg) => AppError::ValidationError(msg),
        ConsultationError::DatabaseError(_) | ConsultationError::SerializationError(_) => {
            AppError::Internal("Operation failed".to_string())
        }
    }
}

async fn authorize_participant(
    service: &ConsultationService,
    consultation_id: Uuid,
    user: &User,
    token: &str,
) -> Result<Consultation, AppError> {
    let consultation = service
        .get(consultation_id, token)
        .await
        .map_err(map_consultation_error)?;

    let participant = service
        .is_participant(&consultation, &user.id, token)
        .await
        .map_err(map_consultation_error)?;

    if !participant {
        return Err(AppError::Forbidden(
            "Not a participant of this consultation".to_string(),
        ));
    }

    Ok(consultation)
}

#[axum::debug_handler]
pub async fn book_consultation(
    State(state): State<ConsultationState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    info!("Booking consultation for user {}", user.id);

    let service = ConsultationService::new(&state.config);
    let consultation = service
        .book(&user.id, request, auth.token())
        .await
        .map_err(map_consultation_error)?;

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn list_consultations(
    State(state): State<ConsultationState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state.config);
    let consultations = service
        .list_for(&user.id, auth.token())
        .await
        .map_err(map_consultation_error)?;

    Ok(Json(json!({
        "consultations": consultations,
        "total": consultations.len()
    })))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state.config);
    let consultation =
        authorize_participant(&service, consultation_id, &user, auth.token()).await?;

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn update_consultation_status(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state.config);
    authorize_participant(&service, consultation_id, &user, auth.token()).await?;

    let updated = service
        .update_status(consultation_id, request.status, auth.token())
        .await
        .map_err(map_consultation_error)?;

    Ok(Json(json!(updated)))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state.config);
    authorize_participant(&service, consultation_id, &user, auth.token()).await?;

    let messages = MessageService::new(&state.config)
        .fetch(consultation_id, auth.token())
        .await
        .map_err(map_consultation_error)?;

    Ok(Json(json!({
        "messages": messages,
        "total": messages.len()
    })))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state.config);
    let consultation =
        authorize_participant(&service, consultation_id, &user, auth.token()).await?;

    let sender_type = if consultation.user_id == user.id {
        SenderType::User
    } else {
        SenderType::Doctor
    };

    let message = MessageService::new(&state.config)
        .send(consultation_id, &user.id, sender_type, request, auth.token())
        .await
        .map_err(map_consultation_error)?;

    let delivered = state.relay.publish(message.clone()).await;
    debug!(
        "Message {} relayed to {} live subscribers",
        message.id, delivered
    );

    Ok(Json(json!(message)))
}

#[axum::debug_handler]
pub async fn live_messages(
    State(state): State<ConsultationState>,
    Path(consultation_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let service = ConsultationService::new(&state.config);
    authorize_participant(&service, consultation_id, &user, auth.token()).await?;

    info!(
        "Opening live message stream for consultation {} (user {})",
        consultation_id, user.id
    );

    let relay = state.relay.clone();
    Ok(ws.on_upgrade(move |socket| stream_messages(socket, relay, consultation_id)))
}

async fn stream_messages(mut socket: WebSocket, relay: Arc<MessageRelay>, consultation_id: Uuid) {
    let mut subscription = relay.subscribe(consultation_id).await;

    loop {
        tokio::select! {
            published = subscription.recv() => {
                let Some(message) = published else { break };
                let Ok(text) = serde_json::to_string(&message) else { continue };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("Live message stream for {} closed", consultation_id);
}
