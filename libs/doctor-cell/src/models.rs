use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    /// One doctor row per auth user.
    pub user_id: String,
    pub full_name: String,
    pub specialization: String,
    pub hourly_rate: f64,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDoctorRequest {
    pub full_name: String,
    pub specialization: String,
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialization: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}
