//! Alexa request envelopes and response building.
//!
//! Covers the subset of the Alexa Skills Kit wire format the skill consumes:
//! launch, intent, and session-ended requests on the way in, SSML speech with
//! an optional reprompt on the way out.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamped on every response envelope.
const RESPONSE_VERSION: &str = "1.0";

/// Status code of a slot resolution that matched a known entity.
pub const ER_SUCCESS_MATCH: &str = "ER_SUCCESS_MATCH";

/// Top-level request payload delivered to the Lambda.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub version: String,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<Context>,
    pub request: Request,
}

impl RequestEnvelope {
    /// Amazon user id, preferring the system context over the session.
    pub fn user_id(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|context| context.system.as_ref())
            .and_then(|system| system.user.as_ref())
            .map(|user| user.user_id.as_str())
            .or_else(|| {
                self.session
                    .as_ref()
                    .and_then(|session| session.user.as_ref())
                    .map(|user| user.user_id.as_str())
            })
    }

    pub fn locale(&self) -> Option<&str> {
        self.request.locale()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemContext {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

/// The request variants the skill handles.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "LaunchRequest", rename_all = "camelCase")]
    Launch {
        request_id: String,
        timestamp: DateTime<Utc>,
        #[serde(default)]
        locale: Option<String>,
    },
    #[serde(rename = "IntentRequest", rename_all = "camelCase")]
    Intent {
        request_id: String,
        timestamp: DateTime<Utc>,
        #[serde(default)]
        locale: Option<String>,
        intent: Intent,
    },
    #[serde(rename = "SessionEndedRequest", rename_all = "camelCase")]
    SessionEnded {
        request_id: String,
        timestamp: DateTime<Utc>,
        #[serde(default)]
        locale: Option<String>,
        #[serde(default)]
        reason: Option<String>,
    },
}

impl Request {
    pub fn locale(&self) -> Option<&str> {
        match self {
            Request::Launch { locale, .. }
            | Request::Intent { locale, .. }
            | Request::SessionEnded { locale, .. } => locale.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub resolutions: Option<Resolutions>,
}

impl Slot {
    /// Entity id from the first resolution authority, if it reported a match.
    ///
    /// Authorities past the first are ignored.
    pub fn resolved_id(&self) -> Option<&str> {
        let resolution = self.resolutions.as_ref()?.per_authority.first()?;
        if resolution.status.code != ER_SUCCESS_MATCH {
            return None;
        }
        resolution
            .values
            .first()
            .map(|wrapper| wrapper.value.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resolutions {
    #[serde(rename = "resolutionsPerAuthority", default)]
    pub per_authority: Vec<Resolution>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resolution {
    pub status: ResolutionStatus,
    #[serde(default)]
    pub values: Vec<ResolutionValueWrapper>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionStatus {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionValueWrapper {
    pub value: ResolutionValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionValue {
    pub name: String,
    pub id: String,
}

/// Top-level response payload returned to Alexa.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: Response,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
}

impl OutputSpeech {
    /// Wrap plain text or an SSML fragment in a `<speak>` envelope.
    fn ssml(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        let ssml = if trimmed.starts_with("<speak>") {
            trimmed.to_owned()
        } else {
            format!("<speak>{}</speak>", trimmed)
        };
        OutputSpeech::Ssml { ssml }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// Builds response envelopes one fluent call at a time.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    output_speech: Option<OutputSpeech>,
    reprompt: Option<Reprompt>,
    should_end_session: Option<bool>,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the spoken output.
    pub fn speak(mut self, text: impl Into<String>) -> Self {
        self.output_speech = Some(OutputSpeech::ssml(text));
        self
    }

    /// Set the reprompt and keep the session open for the answer.
    pub fn reprompt(mut self, text: impl Into<String>) -> Self {
        self.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(text),
        });
        self.should_end_session = Some(false);
        self
    }

    pub fn with_should_end_session(mut self, end: bool) -> Self {
        self.should_end_session = Some(end);
        self
    }

    pub fn build(self) -> ResponseEnvelope {
        ResponseEnvelope {
            version: RESPONSE_VERSION.to_owned(),
            response: Response {
                output_speech: self.output_speech,
                reprompt: self.reprompt,
                should_end_session: self.should_end_session,
            },
        }
    }
}
