//! Configuration management for the skill Lambda.

use std::env;

/// Default pre-signed URL lifetime when the environment does not say otherwise.
const DEFAULT_URL_EXPIRY_MINUTES: u64 = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket holding per-user state records and synthesized audio
    pub persistence_bucket: String,
    /// Base URL of the joke-text provider
    pub jokes_url: String,
    /// Lifetime of pre-signed playback URLs, in minutes
    pub presigned_url_expires_minutes: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            persistence_bucket: env::var("S3_PERSISTENCE_BUCKET")?,
            jokes_url: env::var("JOKES_URL")?,
            presigned_url_expires_minutes: env::var("PRE_SIGNED_URL_EXPIRES_IN_MINUTES")
                .ok()
                .and_then(|minutes| minutes.parse().ok())
                .unwrap_or(DEFAULT_URL_EXPIRY_MINUTES),
        })
    }

    /// Pre-signed URL lifetime in seconds.
    pub fn presigned_url_expires_secs(&self) -> u64 {
        self.presigned_url_expires_minutes * 60
    }
}
