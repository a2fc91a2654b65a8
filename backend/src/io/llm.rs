//! Client for an OpenAI-compatible `/chat/completions` endpoint.
//!
//! The model is asked to answer with a JSON object. Replies wrapped in a
//! markdown code fence are accepted.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::config::LlmConfig;
use crate::domain::CompletionClient;

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete_json(&self, system_prompt: &str, user_message: &str) -> Result<Value> {
        let payload = json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message }
            ]
        });

        debug!("Sending completion request to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion endpoint returned {}: {}", status, body);
            return Err(anyhow!("Completion endpoint returned {}", status));
        }

        let body: Value = response.json().await.context("Completion response is not JSON")?;
        let content = message_content(&body)
            .ok_or_else(|| anyhow!("Completion response has no message content"))?;
        parse_json_reply(content)
    }
}

/// `choices[0].message.content` of a completion response
fn message_content(body: &Value) -> Option<&str> {
    body.get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
}

/// Parse the model's text as a JSON object, tolerating a ```json fence
pub fn parse_json_reply(content: &str) -> Result<Value> {
    let trimmed = content.trim();
    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    };

    let value: Value = serde_json::from_str(unfenced).context("Model reply is not valid JSON")?;
    if !value.is_object() {
        return Err(anyhow!("Model reply is not a JSON object"));
    }
    Ok(value)
}
