use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::ConsultationError;
use crate::models::{ConsultationMessage, SenderType, SendMessageRequest};

pub struct MessageService {
    supabase: SupabaseClient,
}

impl MessageService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Message history for a consultation in creation order. Fetch failures
    /// are surfaced to the caller, never silently turned into an empty list.
    pub async fn fetch(
        &self,
        consultation_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<ConsultationMessage>, ConsultationError> {
        let path = format!(
            "/rest/v1/consultation_messages?consultation_id=eq.{}&order=created_at.asc",
            consultation_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        let messages = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ConsultationMessage>, _>>()?;

        debug!(
            "Fetched {} messages for consultation {}",
            messages.len(),
            consultation_id
        );
        Ok(messages)
    }

    /// Appends one message row and returns it as stored.
    pub async fn send(
        &self,
        consultation_id: Uuid,
        sender_id: &str,
        sender_type: SenderType,
        request: SendMessageRequest,
        auth_token: &str,
    ) -> Result<ConsultationMessage, ConsultationError> {
        if request.message.trim().is_empty() {
            return Err(ConsultationError::ValidationError(
                "message must not be empty".to_string(),
            ));
        }

        let message_data = json!({
            "consultation_id": consultation_id,
            "sender_id": sender_id,
            "sender_type": sender_type,
            "message": request.message,
            "message_type": request.message_type.unwrap_or_else(|| "text".to_string()),
            "created_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/consultation_messages",
                Some(auth_token),
                Some(message_data),
                Some(headers),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ConsultationError::DatabaseError("Insert returned no row".to_string()))?;

        Ok(serde_json::from_value(row)?)
    }
}
