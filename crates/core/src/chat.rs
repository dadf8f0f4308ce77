use crate::error::ServiceError;
use crate::models::{CallUsage, ChatMessage};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";

/// gpt-4 list price per 1K tokens, used for the estimated-cost counter.
const PROMPT_COST_PER_1K: f64 = 0.03;
const COMPLETION_COST_PER_1K: f64 = 0.06;

#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub answer: String,
    pub usage: CallUsage,
}

#[async_trait]
pub trait ChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ServiceError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint. Temperature
/// is pinned to zero: deterministic-leaning, not guaranteed deterministic.
pub struct OpenAiChatModel {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ServiceError> {
        let payload = messages
            .iter()
            .map(|message| {
                json!({
                    "role": message.role.as_str(),
                    "content": message.content,
                })
            })
            .collect::<Vec<_>>();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "temperature": 0,
                "messages": payload,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Chat(response.status().to_string()));
        }

        let parsed: Value = response.json().await?;
        let answer = parsed
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::Chat("response has no message content".to_string())
            })?;

        let prompt_tokens = parsed
            .pointer("/usage/prompt_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let completion_tokens = parsed
            .pointer("/usage/completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let total_tokens = parsed
            .pointer("/usage/total_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(prompt_tokens + completion_tokens);

        Ok(ChatCompletion {
            answer,
            usage: CallUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
                cost: estimate_cost(prompt_tokens, completion_tokens),
            },
        })
    }
}

pub fn estimate_cost(prompt_tokens: u64, completion_tokens: u64) -> f64 {
    (prompt_tokens as f64 / 1_000.0) * PROMPT_COST_PER_1K
        + (completion_tokens as f64 / 1_000.0) * COMPLETION_COST_PER_1K
}

#[cfg(test)]
mod tests {
    use super::estimate_cost;

    #[test]
    fn cost_follows_the_gpt4_price_table() {
        assert!((estimate_cost(1_000, 1_000) - 0.09).abs() < 1e-12);
        assert!((estimate_cost(0, 0)).abs() < 1e-12);
        assert!((estimate_cost(500, 0) - 0.015).abs() < 1e-12);
    }
}
