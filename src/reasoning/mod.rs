//! Language-model collaborators
//!
//! The orchestrator only sees two contracts:
//! - [`ReasoningClient`]: persona-framed reply text for one agent
//! - [`IntentExtractor`]: structured transfer intent for one command
//!
//! `ChatCompletionsClient` implements both against an OpenAI-compatible
//! endpoint. The scripted and heuristic variants run without network access.

pub mod chat;
pub mod intent;
pub mod scripted;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::ReasoningConfig;
use crate::domain::{AgentRole, HistoryTurn};
use crate::error::Result;

pub use chat::ChatCompletionsClient;
pub use intent::{extract_json, parse_intent_json, HeuristicIntentExtractor, IntentExtractor};
pub use scripted::ScriptedReasoner;

/// Prompt used for the Executor when a command carries no transfer
pub const STANDING_BY_PROMPT: &str =
    "No valid transaction intent found. Standing by for instructions.";

/// Produces one agent's reply to a command.
///
/// Implementations must surface every failure (transport error, timeout,
/// empty or malformed reply) as `HubError::ReasoningUnavailable`; the
/// orchestrator treats that as fatal for the turn and never retries.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn respond(&self, role: AgentRole, prompt: &str, history: &[HistoryTurn])
        -> Result<String>;
}

/// Pick collaborators from configuration: the chat endpoint when an API key
/// is present, the offline pair otherwise.
pub fn from_config(
    config: &ReasoningConfig,
) -> Result<(Arc<dyn ReasoningClient>, Arc<dyn IntentExtractor>)> {
    match config.api_key() {
        Some(api_key) => {
            let client = Arc::new(ChatCompletionsClient::new(config.clone(), api_key)?);
            info!(
                "Reasoning via {} (model {})",
                config.base_url, config.model
            );
            let reasoner: Arc<dyn ReasoningClient> = client.clone();
            let extractor: Arc<dyn IntentExtractor> = client;
            Ok((reasoner, extractor))
        }
        None => {
            info!(
                "{} not set; using scripted reasoning and heuristic intent extraction",
                config.api_key_env
            );
            let reasoner: Arc<dyn ReasoningClient> = Arc::new(ScriptedReasoner::new());
            let extractor: Arc<dyn IntentExtractor> = Arc::new(HeuristicIntentExtractor::new());
            Ok((reasoner, extractor))
        }
    }
}
