//! Turn orchestration: one Alexa request in, one response envelope out.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::alexa::{Intent, Request, RequestEnvelope, ResponseBuilder, ResponseEnvelope, Slot};
use crate::error::{Error, Result};
use crate::i18n::Language;
use crate::jokes::{self, JokePoolManager};
use crate::models::{AudioJoke, ContentCategory, SessionState};
use crate::provider::JokeProvider;
use crate::speech::audio_tag;
use crate::store::{self, AudioUrlSigner, StateStore};
use crate::tts::SpeechSynthesizer;

const NEXT_JOKE_INTENT: &str = "NextJokeIntent";
const CHANGE_CONTENT_TYPE_INTENT: &str = "ChangeContentTypeIntent";
const HELP_INTENT: &str = "AMAZON.HelpIntent";
const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
const STOP_INTENT: &str = "AMAZON.StopIntent";

/// Slot carrying the requested category on a change request.
const CONTENT_TYPE_SLOT: &str = "contentType";

/// State plus the joke picked for this turn, if any. Never persisted.
struct PreparedTurn {
    state: SessionState,
    pending_selection: Option<AudioJoke>,
}

/// The skill's request-to-response orchestrator.
///
/// Every turn ends in a speakable envelope; failures collapse into a
/// localized apology instead of surfacing to Alexa as Lambda errors.
pub struct Skill {
    pool_manager: JokePoolManager,
    store: Arc<dyn StateStore>,
    signer: Arc<dyn AudioUrlSigner>,
}

impl Skill {
    pub fn new(
        provider: Arc<dyn JokeProvider>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn StateStore>,
        signer: Arc<dyn AudioUrlSigner>,
    ) -> Self {
        Self {
            pool_manager: JokePoolManager::new(provider, synthesizer, Arc::clone(&store)),
            store,
            signer,
        }
    }

    /// Handle one raw request payload.
    pub async fn handle_turn(&self, payload: Value) -> ResponseEnvelope {
        let language = payload
            .pointer("/request/locale")
            .and_then(Value::as_str)
            .map(Language::from_locale)
            .unwrap_or(Language::English);

        match self.try_handle_turn(payload, language).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Turn failed");
                ResponseBuilder::new()
                    .speak(language.try_later())
                    .reprompt(language.try_later())
                    .build()
            }
        }
    }

    async fn try_handle_turn(
        &self,
        payload: Value,
        language: Language,
    ) -> Result<ResponseEnvelope> {
        let envelope: RequestEnvelope = serde_json::from_value(payload)?;

        match &envelope.request {
            Request::Launch { .. } => {
                let user_id = required_user_id(&envelope)?;
                let turn = self.prepare_turn(user_id).await?;
                self.answer_with_joke(language, user_id, turn).await
            }
            Request::Intent { intent, .. } => {
                let user_id = required_user_id(&envelope)?;
                self.handle_intent(language, user_id, intent).await
            }
            // Session teardown needs no user state, so the id is not demanded.
            Request::SessionEnded { reason, .. } => {
                info!(reason = ?reason, "Session ended");
                Ok(ResponseBuilder::new().build())
            }
        }
    }

    async fn handle_intent(
        &self,
        language: Language,
        user_id: &str,
        intent: &Intent,
    ) -> Result<ResponseEnvelope> {
        match intent.name.as_str() {
            CHANGE_CONTENT_TYPE_INTENT => self.switch_category(language, user_id, intent).await,
            NEXT_JOKE_INTENT => {
                let turn = self.prepare_turn(user_id).await?;
                self.answer_with_joke(language, user_id, turn).await
            }
            HELP_INTENT => {
                self.prepare_turn(user_id).await?;
                Ok(ResponseBuilder::new()
                    .speak(language.help())
                    .reprompt(language.help())
                    .build())
            }
            CANCEL_INTENT | STOP_INTENT => {
                self.prepare_turn(user_id).await?;
                Ok(ResponseBuilder::new().speak(language.goodbye()).build())
            }
            other => {
                self.prepare_turn(user_id).await?;
                Ok(ResponseBuilder::new()
                    .speak(format!("You just triggered {}", other))
                    .build())
            }
        }
    }

    /// Load the caller's state and do the turn's pool work.
    ///
    /// First contact primes every category; later turns top up the active
    /// pool with one joke and pick the joke to play. Pool failures are
    /// absorbed so the turn can still answer, but a state load failure
    /// aborts the turn.
    async fn prepare_turn(&self, user_id: &str) -> Result<PreparedTurn> {
        let mut state = self.store.load(user_id).await?.unwrap_or_default();

        if state.skill_called_first_time {
            self.pool_manager
                .prime_all_categories(user_id, &mut state)
                .await;
        } else {
            self.pool_manager
                .refill_selected_category(user_id, &mut state)
                .await;
        }

        let pending_selection = if state.skill_called_first_time {
            None
        } else {
            let mut rng = rand::thread_rng();
            jokes::select_for_playback(state.pool(state.content_type), &mut rng).cloned()
        };

        Ok(PreparedTurn {
            state,
            pending_selection,
        })
    }

    /// Welcome first-timers; give everyone else a joke or a fallback line.
    async fn answer_with_joke(
        &self,
        language: Language,
        user_id: &str,
        mut turn: PreparedTurn,
    ) -> Result<ResponseEnvelope> {
        if turn.state.skill_called_first_time {
            turn.state.skill_called_first_time = false;
            self.store.save(user_id, &turn.state).await?;
            return Ok(ResponseBuilder::new()
                .speak(language.welcome())
                .reprompt(language.welcome())
                .build());
        }

        match turn.pending_selection {
            Some(joke) => {
                let key = store::storage_key_from_uri(&joke.audio_file_uri)?;
                let url = self.signer.presign(&key).await?;
                Ok(ResponseBuilder::new()
                    .speak(audio_tag(&url))
                    .with_should_end_session(false)
                    .build())
            }
            None => {
                let line = {
                    let mut rng = rand::thread_rng();
                    let lines = language.no_joke_lines();
                    lines[jokes::pick_uniform(&mut rng, lines.len())]
                };
                Ok(ResponseBuilder::new().speak(line).build())
            }
        }
    }

    /// Point the user's pools at a different category.
    async fn switch_category(
        &self,
        language: Language,
        user_id: &str,
        intent: &Intent,
    ) -> Result<ResponseEnvelope> {
        let requested = intent
            .slots
            .get(CONTENT_TYPE_SLOT)
            .and_then(Slot::resolved_id)
            .and_then(|id| ContentCategory::from_slot_id(id).ok());

        let Some(category) = requested else {
            return Ok(ResponseBuilder::new()
                .speak(language.unknown_content_type())
                .reprompt(language.welcome())
                .build());
        };

        let mut state = self.store.load(user_id).await?.unwrap_or_default();
        state.content_type = category;
        self.store.save(user_id, &state).await?;
        info!(category = %category, "Switched content type");

        Ok(ResponseBuilder::new()
            .speak(language.chosen_content_type(category))
            .with_should_end_session(true)
            .build())
    }
}

/// User id from the envelope, required by every turn that touches state.
fn required_user_id(envelope: &RequestEnvelope) -> Result<&str> {
    envelope
        .user_id()
        .ok_or_else(|| Error::Envelope("Request carries no user id".to_owned()))
}
