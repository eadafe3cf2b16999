//! Shared library for the Russian Jokes Alexa skill.
//!
//! This crate provides the skill's turn orchestration plus everything it
//! talks through: the upstream joke provider, Polly synthesis, and S3
//! persistence.

pub mod alexa;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod i18n;
pub mod jokes;
pub mod models;
pub mod provider;
pub mod skill;
pub mod speech;
pub mod store;
pub mod tts;

pub use alexa::{RequestEnvelope, ResponseEnvelope};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{AudioJoke, ContentCategory, SessionState};
pub use skill::Skill;
