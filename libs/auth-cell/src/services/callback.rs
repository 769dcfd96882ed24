use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ExchangedSession, ProfileState};

pub struct CallbackService {
    supabase: SupabaseClient,
}

impl CallbackService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Exchanges the one-time auth code from the OAuth/email callback for a
    /// session at the Supabase PKCE token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<ExchangedSession> {
        debug!("Exchanging auth code for session");

        let session: ExchangedSession = self
            .supabase
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=pkce",
                None,
                Some(json!({ "auth_code": code })),
            )
            .await?;

        Ok(session)
    }

    pub async fn profile_state(&self, user_id: &str, auth_token: &str) -> Result<ProfileState> {
        let path = format!(
            "/rest/v1/profiles?id=eq.{}&select=role,onboarding_completed",
            user_id
        );
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(ProfileState::Exists {
                role: row["role"].as_str().unwrap_or("user").to_string(),
                onboarding_completed: row["onboarding_completed"].as_bool().unwrap_or(false),
            }),
            None => Ok(ProfileState::Missing),
        }
    }

    /// First sign-in has no profile row yet. Creation is best-effort: the
    /// user still lands on onboarding even if the insert is rejected, and the
    /// onboarding flow retries creation.
    pub async fn create_default_profile(&self, user_id: &str, auth_token: &str) {
        let profile_data = json!({
            "id": user_id,
            "role": "user",
            "onboarding_completed": false,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Result<Vec<Value>> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/profiles",
                Some(auth_token),
                Some(profile_data),
                Some(headers),
            )
            .await;

        if let Err(e) = result {
            warn!("Failed to create default profile for {}: {}", user_id, e);
        }
    }
}
