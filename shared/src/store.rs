//! Persisted session state and audio access in S3.
//!
//! One bucket carries everything: a JSON state object keyed by the Amazon
//! user id, and the MP3 objects Polly drops under each category's prefix.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{Error, Result};
use crate::models::SessionState;

/// Loads and saves per-user session state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load a user's state, or `None` for a user never seen before.
    async fn load(&self, user_id: &str) -> Result<Option<SessionState>>;

    async fn save(&self, user_id: &str, state: &SessionState) -> Result<()>;
}

/// Produces temporary playback URLs for stored audio objects.
#[async_trait]
pub trait AudioUrlSigner: Send + Sync {
    async fn presign(&self, object_key: &str) -> Result<String>;
}

/// State store keeping one JSON object per user.
pub struct S3StateStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3StateStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl StateStore for S3StateStore {
    async fn load(&self, user_id: &str) -> Result<Option<SessionState>> {
        let object = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(user_id)
            .send()
            .await
        {
            Ok(object) => object,
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_no_such_key() {
                    return Ok(None);
                }
                return Err(Error::Storage(format!(
                    "Failed to load session state: {}",
                    service_error
                )));
            }
        };

        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| Error::Storage(format!("Failed to read session state body: {}", e)))?
            .into_bytes();

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, user_id: &str, state: &SessionState) -> Result<()> {
        let body = serde_json::to_vec(state)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(user_id)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to save session state: {}", e)))?;

        Ok(())
    }
}

/// Signer producing pre-signed GET URLs against the audio bucket.
pub struct S3AudioUrlSigner {
    client: aws_sdk_s3::Client,
    bucket: String,
    expires_in: Duration,
}

impl S3AudioUrlSigner {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            expires_in,
        }
    }
}

#[async_trait]
impl AudioUrlSigner for S3AudioUrlSigner {
    async fn presign(&self, object_key: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.expires_in)
            .map_err(|e| Error::Config(format!("Invalid pre-signed URL expiry: {}", e)))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|e| Error::Storage(format!("Failed to pre-sign audio URL: {}", e)))?;

        Ok(request.uri().to_owned())
    }
}

/// Derive an object key from a Polly task output URI.
///
/// Task URIs look like
/// `https://s3.us-east-1.amazonaws.com/bucket/ANECDOTES/joke.<id>.mp3`;
/// the key is the last two path segments.
pub fn storage_key_from_uri(uri: &str) -> Result<String> {
    let mut segments = uri.rsplit('/').filter(|segment| !segment.is_empty());
    let file = segments.next();
    let prefix = segments.next();

    match (prefix, file) {
        (Some(prefix), Some(file)) => Ok(format!("{}/{}", prefix, file)),
        _ => Err(Error::AudioLocation(format!(
            "Cannot derive a storage key from URI: {}",
            uri
        ))),
    }
}
