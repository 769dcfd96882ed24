use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub onboarding_completed: bool,
    pub is_pregnant: Option<bool>,
    pub due_date: Option<NaiveDate>,
    pub child_birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub full_name: Option<String>,
}

/// Pregnancy/child fields recorded during onboarding. All optional so a
/// mother can fill in either a due date or an existing child's birth date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingRequest {
    pub full_name: Option<String>,
    pub is_pregnant: Option<bool>,
    pub due_date: Option<NaiveDate>,
    pub child_birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}
