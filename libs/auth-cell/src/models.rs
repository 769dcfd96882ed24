use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub register: Option<String>,
    pub next: Option<String>,
}

/// Token response from the Supabase PKCE code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangedSession {
    pub access_token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

/// What the redirect decision needs to know about the caller's profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileState {
    Missing,
    Exists {
        role: String,
        onboarding_completed: bool,
    },
}
