//! Alexa Skill Lambda - Tells Russian jokes as Polly-synthesized audio.

use std::sync::Arc;
use std::time::Duration;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::provider::HttpJokeProvider;
use shared::store::{S3AudioUrlSigner, S3StateStore};
use shared::tts::PollySynthesizer;
use shared::{Config, ResponseEnvelope, Skill};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct AppState {
    skill: Skill,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env().map_err(|e| format!("Incomplete environment: {}", e))?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let polly_client = aws_sdk_polly::Client::new(&aws_config);
        let s3_client = aws_sdk_s3::Client::new(&aws_config);

        let provider = Arc::new(HttpJokeProvider::new(&config.jokes_url));
        let synthesizer = Arc::new(PollySynthesizer::new(
            polly_client,
            &config.persistence_bucket,
        ));
        let store = Arc::new(S3StateStore::new(
            s3_client.clone(),
            &config.persistence_bucket,
        ));
        let signer = Arc::new(S3AudioUrlSigner::new(
            s3_client,
            &config.persistence_bucket,
            Duration::from_secs(config.presigned_url_expires_secs()),
        ));

        Ok(Self {
            skill: Skill::new(provider, synthesizer, store, signer),
        })
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<Value>,
) -> Result<ResponseEnvelope, Error> {
    Ok(state.skill.handle_turn(event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    info!("Joke skill initialized");
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
