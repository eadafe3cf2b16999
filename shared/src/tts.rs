//! Speech synthesis through Amazon Polly.

use async_trait::async_trait;
use aws_sdk_polly::types::{Engine, OutputFormat, TextType, VoiceId};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::ContentCategory;

/// Turns SSML into stored audio and reports where it will land.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Start synthesis of `ssml` and return the URI of the output object.
    async fn synthesize(&self, category: ContentCategory, ssml: &str) -> Result<String>;
}

/// Synthesizer backed by Polly asynchronous synthesis tasks.
///
/// Tasks write their MP3 output straight to S3 under the category's key
/// prefix. The returned URI names the object Polly will create, not audio
/// that already exists.
pub struct PollySynthesizer {
    client: aws_sdk_polly::Client,
    output_bucket: String,
}

impl PollySynthesizer {
    pub fn new(client: aws_sdk_polly::Client, output_bucket: impl Into<String>) -> Self {
        Self {
            client,
            output_bucket: output_bucket.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn synthesize(&self, category: ContentCategory, ssml: &str) -> Result<String> {
        let output = self
            .client
            .start_speech_synthesis_task()
            .engine(Engine::Standard)
            .output_format(OutputFormat::Mp3)
            .text_type(TextType::Ssml)
            .text(ssml)
            .voice_id(VoiceId::Tatyana)
            .output_s3_bucket_name(&self.output_bucket)
            .output_s3_key_prefix(category.audio_key_prefix())
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("Failed to start synthesis task: {}", e)))?;

        let task = output
            .synthesis_task()
            .ok_or_else(|| Error::Synthesis("Synthesis task missing from response".to_owned()))?;
        let uri = task
            .output_uri()
            .ok_or_else(|| Error::Synthesis("Synthesis task has no output URI".to_owned()))?;

        info!(category = %category, uri = %uri, "Started speech synthesis task");

        Ok(uri.to_owned())
    }
}
