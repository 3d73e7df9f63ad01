//! Configuration module
//!
//! Environment-driven configuration for the API and its backing services.
//! Required settings (database URL, JWT secret) fail fast at load time; absence
//! of a secret must never silently degrade into an unauthenticated service.

use std::env;

use anyhow::{bail, Context};

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 10;
const DEFAULT_PRESIGN_MIN_SECS: u64 = 60;
const DEFAULT_PRESIGN_MAX_SECS: u64 = 3600;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,

    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,

    /// Shared secret used to verify bearer tokens issued by the hosted auth provider.
    pub jwt_secret: String,

    pub s3_bucket: String,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, Supabase Storage, etc.)
    pub s3_endpoint: Option<String>,

    pub max_upload_size_bytes: usize,
    /// Bounds for presigned URL expiry on revised documents.
    pub presign_min_secs: u64,
    pub presign_max_secs: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("{} environment variable must be set", key))
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb: usize = env_parse("MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB);

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_CONNECTION_TIMEOUT_SECS),
            jwt_secret,
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "surat-documents".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            presign_min_secs: env_parse("PRESIGN_MIN_SECS", DEFAULT_PRESIGN_MIN_SECS),
            presign_max_secs: env_parse("PRESIGN_MAX_SECS", DEFAULT_PRESIGN_MAX_SECS),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Clamp a requested presigned-URL lifetime into the configured window,
    /// defaulting to the minimum when the caller does not ask for one.
    pub fn clamp_presign_secs(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.presign_min_secs)
            .clamp(self.presign_min_secs, self.presign_max_secs)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 16 {
            bail!("JWT_SECRET must be at least 16 characters");
        }
        if self.max_upload_size_bytes == 0 {
            bail!("MAX_UPLOAD_SIZE_MB must be greater than zero");
        }
        if self.presign_min_secs == 0 || self.presign_min_secs > self.presign_max_secs {
            bail!(
                "invalid presign expiry bounds: min={} max={}",
                self.presign_min_secs,
                self.presign_max_secs
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_bounds(min: u64, max: u64) -> Config {
        Config {
            server_port: DEFAULT_SERVER_PORT,
            environment: "test".to_string(),
            cors_origins: vec![],
            database_url: "postgres://localhost/surat_test".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: "test-secret-at-least-16-chars".to_string(),
            s3_bucket: "surat-documents".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            max_upload_size_bytes: 10 * 1024 * 1024,
            presign_min_secs: min,
            presign_max_secs: max,
        }
    }

    #[test]
    fn test_clamp_presign_secs_honors_configured_bounds() {
        let config = config_with_bounds(120, 900);
        assert_eq!(config.clamp_presign_secs(None), 120);
        assert_eq!(config.clamp_presign_secs(Some(10)), 120);
        assert_eq!(config.clamp_presign_secs(Some(300)), 300);
        assert_eq!(config.clamp_presign_secs(Some(7200)), 900);
    }

    #[test]
    fn test_validate_rejects_inverted_presign_bounds() {
        assert!(config_with_bounds(900, 120).validate().is_err());
        assert!(config_with_bounds(0, 900).validate().is_err());
        assert!(config_with_bounds(60, 3600).validate().is_ok());
    }
}
