//! Conversational record entry.
//!
//! A message is first read by the keyword rules in [`rules`]. When a required
//! field is still missing and a [`CompletionClient`] is configured, the message
//! is also sent to a chat-completion model that answers with JSON; its fields
//! only fill gaps the rules left open.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

pub mod chat_service;
pub mod rules;

pub use chat_service::{ChatService, ChatTurn};

/// Port to a chat-completion model that replies with a JSON object
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete_json(&self, system_prompt: &str, user_message: &str) -> Result<Value>;
}
