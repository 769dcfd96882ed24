use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub midtrans_server_key: String,
    pub midtrans_base_url: String,
    pub public_app_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            midtrans_server_key: env::var("MIDTRANS_SERVER_KEY")
                .unwrap_or_else(|_| {
                    warn!("MIDTRANS_SERVER_KEY not set, using empty value");
                    String::new()
                }),
            midtrans_base_url: env::var("MIDTRANS_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("MIDTRANS_BASE_URL not set, using sandbox default");
                    "https://app.sandbox.midtrans.com".to_string()
                }),
            public_app_url: env::var("PUBLIC_APP_URL")
                .unwrap_or_else(|_| {
                    warn!("PUBLIC_APP_URL not set, using default");
                    "http://localhost:3000".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    // Payment features fail at first use when these are missing, not at startup.
    pub fn is_payments_configured(&self) -> bool {
        !self.midtrans_server_key.is_empty() && !self.midtrans_base_url.is_empty()
    }
}
