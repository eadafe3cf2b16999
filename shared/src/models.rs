//! Shared data models: jokes, categories, and the per-user state record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A joke paired with the location of its synthesized audio.
///
/// `text` is the exact marked-up text handed to the synthesizer;
/// `audio_file_uri` points at the audio object the synthesis task writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioJoke {
    pub text: String,
    pub audio_file_uri: String,
}

impl AudioJoke {
    pub fn new(text: impl Into<String>, audio_file_uri: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audio_file_uri: audio_file_uri.into(),
        }
    }
}

/// One of the closed set of joke genres a user can select.
///
/// The numeric ids are the provider's `CType` values and double as the wire
/// representation inside the persisted state record. The slot ids are the
/// interaction-model identifiers delivered through slot resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum ContentCategory {
    Anecdotes,
    Aphorisms,
    Adults,
}

impl ContentCategory {
    /// Every known category, in wire-id order.
    pub const ALL: [ContentCategory; 3] = [
        ContentCategory::Anecdotes,
        ContentCategory::Aphorisms,
        ContentCategory::Adults,
    ];

    /// Provider/state numeric id.
    pub fn id(self) -> i32 {
        match self {
            ContentCategory::Anecdotes => 1,
            ContentCategory::Aphorisms => 4,
            ContentCategory::Adults => 11,
        }
    }

    /// Interaction-model slot id.
    pub fn slot_id(self) -> &'static str {
        match self {
            ContentCategory::Anecdotes => "ANECDOTES",
            ContentCategory::Aphorisms => "APHORISMS",
            ContentCategory::Adults => "ADULTS",
        }
    }

    /// Resolve a numeric id, rejecting anything outside the known set.
    pub fn from_id(id: i32) -> Result<Self> {
        match id {
            1 => Ok(ContentCategory::Anecdotes),
            4 => Ok(ContentCategory::Aphorisms),
            11 => Ok(ContentCategory::Adults),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }

    /// Resolve an interaction-model slot id.
    pub fn from_slot_id(slot_id: &str) -> Result<Self> {
        match slot_id {
            "ANECDOTES" => Ok(ContentCategory::Anecdotes),
            "APHORISMS" => Ok(ContentCategory::Aphorisms),
            "ADULTS" => Ok(ContentCategory::Adults),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }

    /// Storage key prefix for audio synthesized in this category.
    pub fn audio_key_prefix(self) -> String {
        format!("{}/joke", self.slot_id())
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot_id())
    }
}

impl From<ContentCategory> for i32 {
    fn from(category: ContentCategory) -> Self {
        category.id()
    }
}

impl TryFrom<i32> for ContentCategory {
    type Error = Error;

    fn try_from(id: i32) -> Result<Self> {
        ContentCategory::from_id(id)
    }
}

/// Durable per-user record, stored as one JSON object keyed by the Alexa
/// user id.
///
/// Field names match the legacy wire shape:
/// `{"jokes": {"1": [...]}, "skillCalledFirstTime": true, "contentType": 1}`.
/// Pool entries keep arrival order and are never reordered or deduplicated.
/// Fields missing from older records fall back to their defaults, the same
/// merge the previous deployment applied on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub jokes: BTreeMap<ContentCategory, Vec<AudioJoke>>,
    pub skill_called_first_time: bool,
    pub content_type: ContentCategory,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            jokes: ContentCategory::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
            skill_called_first_time: true,
            content_type: ContentCategory::Anecdotes,
        }
    }
}

impl SessionState {
    /// The pool for one category (empty if the record predates the category).
    pub fn pool(&self, category: ContentCategory) -> &[AudioJoke] {
        self.jokes
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Mutable pool access, materializing the entry when missing.
    pub fn pool_mut(&mut self, category: ContentCategory) -> &mut Vec<AudioJoke> {
        self.jokes.entry(category).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_id_round_trip() {
        for category in ContentCategory::ALL {
            assert_eq!(ContentCategory::from_id(category.id()).unwrap(), category);
            assert_eq!(
                ContentCategory::from_slot_id(category.slot_id()).unwrap(),
                category
            );
        }
    }

    #[test]
    fn test_unknown_category_id_is_rejected() {
        let err = ContentCategory::from_id(2).unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(ref id) if id == "2"));

        let err = ContentCategory::from_slot_id("LIMERICKS").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(ref id) if id == "LIMERICKS"));
    }

    #[test]
    fn test_audio_key_prefix() {
        assert_eq!(ContentCategory::Anecdotes.audio_key_prefix(), "ANECDOTES/joke");
        assert_eq!(ContentCategory::Adults.audio_key_prefix(), "ADULTS/joke");
    }

    #[test]
    fn test_default_state_has_all_pools_empty() {
        let state = SessionState::default();
        assert!(state.skill_called_first_time);
        assert_eq!(state.content_type, ContentCategory::Anecdotes);
        for category in ContentCategory::ALL {
            assert!(state.pool(category).is_empty());
        }
    }

    #[test]
    fn test_state_serializes_to_legacy_wire_shape() {
        let mut state = SessionState::default();
        state
            .pool_mut(ContentCategory::Anecdotes)
            .push(AudioJoke::new("<speak>a</speak>", "https://s3/bucket/ANECDOTES/joke.1.mp3"));

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "jokes": {
                    "1": [{"text": "<speak>a</speak>", "audioFileUri": "https://s3/bucket/ANECDOTES/joke.1.mp3"}],
                    "4": [],
                    "11": []
                },
                "skillCalledFirstTime": true,
                "contentType": 1
            })
        );
    }

    #[test]
    fn test_state_deserializes_from_legacy_wire_shape() {
        let json = r#"{
            "jokes": {"1": [], "4": [{"text": "t", "audioFileUri": "u"}], "11": []},
            "skillCalledFirstTime": false,
            "contentType": 4
        }"#;
        let state: SessionState = serde_json::from_str(json).unwrap();
        assert!(!state.skill_called_first_time);
        assert_eq!(state.content_type, ContentCategory::Aphorisms);
        assert_eq!(state.pool(ContentCategory::Aphorisms).len(), 1);
    }

    #[test]
    fn test_state_with_unknown_category_id_fails_to_parse() {
        let json = r#"{"jokes": {}, "skillCalledFirstTime": true, "contentType": 7}"#;
        assert!(serde_json::from_str::<SessionState>(json).is_err());
    }

    #[test]
    fn test_partial_record_merges_with_defaults() {
        // Records written by older deployments can carry a lone field.
        let state: SessionState = serde_json::from_str(r#"{"contentType": 11}"#).unwrap();
        assert!(state.skill_called_first_time);
        assert_eq!(state.content_type, ContentCategory::Adults);
        for category in ContentCategory::ALL {
            assert!(state.pool(category).is_empty());
        }
    }
}
