use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::ConsultationError;
use crate::models::{Consultation, ConsultationStatus, CreateConsultationRequest};

pub struct ConsultationService {
    supabase: SupabaseClient,
}

impl ConsultationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Books a session: total cost comes from the doctor's hourly rate,
    /// status starts at scheduled with payment pending.
    pub async fn book(
        &self,
        user_id: &str,
        request: CreateConsultationRequest,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        debug!("Booking consultation with doctor {}", request.doctor_id);

        let doctor_path = format!(
            "/rest/v1/doctors?select=hourly_rate&id=eq.{}",
            request.doctor_id
        );
        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &doctor_path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        let hourly_rate = doctors
            .first()
            .and_then(|row| row["hourly_rate"].as_f64())
            .ok_or_else(|| ConsultationError::NotFound(request.doctor_id.to_string()))?;

        let consultation_data = json!({
            "user_id": user_id,
            "doctor_id": request.doctor_id,
            "status": ConsultationStatus::Scheduled.as_str(),
            "payment_status": "pending",
            "scheduled_at": request.scheduled_at.to_rfc3339(),
            "total_cost": hourly_rate,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
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
                "/rest/v1/consultations",
                Some(auth_token),
                Some(consultation_data),
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

    /// All consultations the caller participates in, as patient or doctor,
    /// newest first.
    pub async fn list_for(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let filter = match self.doctor_id_for_user(user_id, auth_token).await? {
            Some(doctor_id) => format!("or=(user_id.eq.{},doctor_id.eq.{})", user_id, doctor_id),
            None => format!("user_id=eq.{}", user_id),
        };

        let path = format!(
            "/rest/v1/consultations?{}&order=created_at.desc",
            filter
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        let consultations = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Consultation>, _>>()?;

        Ok(consultations)
    }

    pub async fn get(
        &self,
        consultation_id: Uuid,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        let path = format!("/rest/v1/consultations?id=eq.{}", consultation_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ConsultationError::NotFound(consultation_id.to_string()))?;

        Ok(serde_json::from_value(row)?)
    }

    /// Whether the caller is the booking user or the consulted doctor.
    pub async fn is_participant(
        &self,
        consultation: &Consultation,
        user_id: &str,
        auth_token: &str,
    ) -> Result<bool, ConsultationError> {
        if consultation.user_id == user_id {
            return Ok(true);
        }

        let path = format!(
            "/rest/v1/doctors?select=user_id&id=eq.{}",
            consultation.doctor_id
        );
        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        Ok(doctors
            .first()
            .and_then(|row| row["user_id"].as_str())
            .map(|id| id == user_id)
            .unwrap_or(false))
    }

    /// Applies a lifecycle transition, stamping started_at/ended_at as the
    /// session moves through its states.
    pub async fn update_status(
        &self,
        consultation_id: Uuid,
        new_status: ConsultationStatus,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        let current = self.get(consultation_id, auth_token).await?;

        if !current.status.can_transition(new_status) {
            return Err(ConsultationError::InvalidStatusTransition {
                from: current.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }

        let mut update = serde_json::Map::new();
        update.insert("status".to_string(), json!(new_status.as_str()));
        update.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        if new_status == ConsultationStatus::Ongoing {
            update.insert("started_at".to_string(), json!(Utc::now().to_rfc3339()));
        }
        if new_status.is_terminal() {
            update.insert("ended_at".to_string(), json!(Utc::now().to_rfc3339()));
        }

        let path = format!("/rest/v1/consultations?id=eq.{}", consultation_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update)),
                Some(headers),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ConsultationError::NotFound(consultation_id.to_string()))?;

        Ok(serde_json::from_value(row)?)
    }

    async fn doctor_id_for_user(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Option<Uuid>, ConsultationError> {
        let path = format!("/rest/v1/doctors?select=id&user_id=eq.{}", user_id);
        let doctors: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        Ok(doctors
            .first()
            .and_then(|row| row["id"].as_str())
            .and_then(|id| Uuid::parse_str(id).ok()))
    }
}
