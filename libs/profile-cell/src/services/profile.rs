use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateProfileRequest, OnboardingRequest, Profile, Role};

pub struct ProfileService {
    supabase: SupabaseClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get(&self, user_id: &str, auth_token: &str) -> Result<Option<Profile>> {
        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Creates the default profile for a freshly signed-up account.
    /// Every account starts as a plain `user` with onboarding pending.
    pub async fn create_default(
        &self,
        user_id: &str,
        request: CreateProfileRequest,
        auth_token: &str,
    ) -> Result<Profile> {
        debug!("Creating default profile for user: {}", user_id);

        let profile_data = json!({
            "id": user_id,
            "role": Role::User.as_str(),
            "full_name": request.full_name,
            "onboarding_completed": false,
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
                "/rest/v1/profiles",
                Some(auth_token),
                Some(profile_data),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to create profile"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        request: OnboardingRequest,
        auth_token: &str,
    ) -> Result<Profile> {
        let mut update = json!({
            "onboarding_completed": true,
            "updated_at": Utc::now().to_rfc3339()
        });

        if let Some(full_name) = request.full_name {
            update["full_name"] = json!(full_name);
        }
        if let Some(is_pregnant) = request.is_pregnant {
            update["is_pregnant"] = json!(is_pregnant);
        }
        if let Some(due_date) = request.due_date {
            update["due_date"] = json!(due_date);
        }
        if let Some(child_birth_date) = request.child_birth_date {
            update["child_birth_date"] = json!(child_birth_date);
        }

        self.patch(user_id, update, auth_token).await
    }

    pub async fn set_role(&self, user_id: &str, role: Role, auth_token: &str) -> Result<Profile> {
        debug!("Setting role {} for user: {}", role.as_str(), user_id);

        let update = json!({
            "role": role.as_str(),
            "updated_at": Utc::now().to_rfc3339()
        });

        self.patch(user_id, update, auth_token).await
    }

    async fn patch(&self, user_id: &str, update: Value, auth_token: &str) -> Result<Profile> {
        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(update), Some(headers))
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Profile not found"))?;

        Ok(serde_json::from_value(row)?)
    }
}
