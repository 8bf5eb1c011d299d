//! Scripted reasoning for offline sessions

use async_trait::async_trait;

use super::{ReasoningClient, STANDING_BY_PROMPT};
use crate::domain::{AgentRole, HistoryTurn};
use crate::error::Result;

/// Deterministic persona replies; never fails
#[derive(Debug, Clone, Default)]
pub struct ScriptedReasoner;

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self
    }

    fn reply(role: AgentRole, prompt: &str, history_len: usize) -> String {
        let excerpt: String = prompt.chars().take(80).collect();
        match role {
            AgentRole::Strategist => format!(
                "{}: Reviewed \"{}\" against {} prior message(s). Fees on ARC are negligible; \
                 the request is financially reasonable if the wallet covers it.",
                role.display_name(),
                excerpt,
                history_len
            ),
            AgentRole::Guardian => format!(
                "{}: No sanctioned patterns detected in \"{}\". Verify the recipient address \
                 before any large transfer.",
                role.display_name(),
                excerpt
            ),
            AgentRole::Executor if prompt == STANDING_BY_PROMPT => format!(
                "{}: No transfer instruction detected. Standing by for instructions.",
                role.display_name()
            ),
            AgentRole::Executor => format!(
                "{}: Ready to route the transfer through the Circle developer API.",
                role.display_name()
            ),
        }
    }
}

#[async_trait]
impl ReasoningClient for ScriptedReasoner {
    async fn respond(
        &self,
        role: AgentRole,
        prompt: &str,
        history: &[HistoryTurn],
    ) -> Result<String> {
        Ok(Self::reply(role, prompt, history.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_are_persona_voiced() {
        let reasoner = ScriptedReasoner::new();

        let reply = reasoner
            .respond(AgentRole::Strategist, "send 5 to 0xabc", &[])
            .await
            .unwrap();
        assert!(reply.starts_with("Aria"));

        let reply = reasoner
            .respond(AgentRole::Executor, STANDING_BY_PROMPT, &[])
            .await
            .unwrap();
        assert!(reply.contains("Standing by"));
    }
}
