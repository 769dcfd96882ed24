use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorSearchQuery, RegisterDoctorRequest};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Registers the caller as a doctor. One row per user_id; a second
    /// registration for the same user is rejected.
    pub async fn register(
        &self,
        user_id: &str,
        request: RegisterDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor> {
        debug!("Registering doctor profile for user: {}", user_id);

        if request.hourly_rate <= 0.0 {
            return Err(anyhow!("hourly_rate must be greater than zero"));
        }

        let existing_path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, Some(auth_token), None)
            .await?;

        if !existing.is_empty() {
            return Err(anyhow!("Doctor profile already exists for this user"));
        }

        let doctor_data = json!({
            "user_id": user_id,
            "full_name": request.full_name,
            "specialization": request.specialization,
            "hourly_rate": request.hourly_rate,
            "is_verified": true, // Auto-verified in the current build
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
                "/rest/v1/doctors",
                Some(auth_token),
                Some(doctor_data),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to create doctor profile"))?;

        let doctor: Doctor = serde_json::from_value(row)?;
        debug!("Doctor profile created with ID: {}", doctor.id);
        Ok(doctor)
    }

    /// Verified doctors ordered by hourly rate, cheapest first.
    pub async fn list(&self, query: DoctorSearchQuery) -> Result<Vec<Doctor>> {
        let mut query_parts = vec!["is_verified=eq.true".to_string()];

        if let Some(specialization) = query.specialization {
            query_parts.push(format!("specialization=ilike.%{}%", specialization));
        }

        let mut path = format!("/rest/v1/doctors?{}", query_parts.join("&"));
        path.push_str("&order=hourly_rate.asc");

        if let Some(limit) = query.limit {
            path.push_str(&format!("&limit={}", limit));
        }
        if let Some(offset) = query.offset {
            path.push_str(&format!("&offset={}", offset));
        }

        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let doctors = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }

    pub async fn get(&self, doctor_id: Uuid) -> Result<Doctor> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None, None).await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Doctor not found"))?;

        Ok(serde_json::from_value(row)?)
    }
}
