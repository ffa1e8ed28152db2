use std::env;

use anyhow::Context;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub supabase: Option<SupabaseConfig>,
}

/// Credentials for the Supabase storage bucket holding product images.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub bucket: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_minutes = env::var("JWT_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(60);
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let supabase = SupabaseConfig::from_parts(
            env::var("SUPABASE_URL").ok(),
            env::var("SUPABASE_KEY").ok(),
            env::var("SUPABASE_BUCKET").ok(),
        )?;

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_minutes,
            upload_dir,
            max_upload_bytes,
            supabase,
        })
    }
}

impl SupabaseConfig {
    /// All three settings must be present together, or none of them.
    pub fn from_parts(
        url: Option<String>,
        key: Option<String>,
        bucket: Option<String>,
    ) -> anyhow::Result<Option<Self>> {
        match (url, key, bucket) {
            (None, None, None) => Ok(None),
            (Some(url), Some(key), Some(bucket)) => Ok(Some(Self {
                url: url.trim_end_matches('/').to_string(),
                key,
                bucket,
            })),
            _ => anyhow::bail!(
                "SUPABASE_URL, SUPABASE_KEY and SUPABASE_BUCKET must be set together"
            ),
        }
    }
}
