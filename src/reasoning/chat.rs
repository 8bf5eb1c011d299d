//! OpenAI-compatible chat completions client
//!
//! Serves both agent replies (persona as system message) and intent
//! extraction (JSON response mode). Works against any endpoint speaking the
//! `/chat/completions` dialect, including Gemini's OpenAI-compatible surface.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::intent::{parse_intent_json, IntentExtractor};
use super::ReasoningClient;
use crate::config::ReasoningConfig;
use crate::domain::{AgentRole, HistoryTurn, Speaker, TransferIntent};
use crate::error::{HubError, Result};

const INTENT_SYSTEM_PROMPT: &str = "You parse user requests for USDC transactions on the ARC blockchain. \
Reply with a single JSON object with keys \"amount\" (number), \"recipient\" (string) and \"isValid\" (boolean). \
Set isValid to false when the request does not ask for a transfer.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Build the message list for one agent reply
pub fn build_messages(role: AgentRole, prompt: &str, history: &[HistoryTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new("system", role.persona()));
    messages.extend(history.iter().map(|turn| {
        let chat_role = match turn.speaker {
            Speaker::User => "user",
            _ => "assistant",
        };
        ChatMessage::new(chat_role, turn.text.clone())
    }));
    messages.push(ChatMessage::new("user", prompt));
    messages
}

pub struct ChatCompletionsClient {
    config: ReasoningConfig,
    api_key: String,
    http: Client,
}

impl ChatCompletionsClient {
    pub fn new(config: ReasoningConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HubError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            http,
        })
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Chat completions error: {} - {}", status, body);
            return Err(HubError::Internal(format!(
                "chat completions returned {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        debug!("Chat response received: {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl ReasoningClient for ChatCompletionsClient {
    #[instrument(skip(self, prompt, history), fields(history = history.len()))]
    async fn respond(
        &self,
        role: AgentRole,
        prompt: &str,
        history: &[HistoryTurn],
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: build_messages(role, prompt, history),
            temperature: Some(self.config.temperature),
            response_format: None,
        };

        let text = self
            .complete(&request)
            .await
            .map_err(|e| HubError::ReasoningUnavailable(format!("{} reply failed: {}", role, e)))?;

        if text.trim().is_empty() {
            return Err(HubError::ReasoningUnavailable(format!(
                "{} reply was empty",
                role
            )));
        }
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl IntentExtractor for ChatCompletionsClient {
    async fn try_extract(&self, text: &str) -> Result<TransferIntent> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", INTENT_SYSTEM_PROMPT),
                ChatMessage::new(
                    "user",
                    format!(
                        "Parse the following user request for a USDC transaction on the ARC blockchain: \"{}\". \
                         Extract the amount and recipient address if present. Return as JSON.",
                        text
                    ),
                ),
            ],
            temperature: Some(0.0),
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let reply = self.complete(&request).await?;
        parse_intent_json(&reply)
    }
}
