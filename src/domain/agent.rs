use serde::{Deserialize, Serialize};
use std::fmt;

/// The three fixed roles driven through every turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Strategist,
    Executor,
    Guardian,
}

impl AgentRole {
    /// Registry order
    pub const ALL: [AgentRole; 3] = [
        AgentRole::Strategist,
        AgentRole::Executor,
        AgentRole::Guardian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Strategist => "Strategist",
            AgentRole::Executor => "Executor",
            AgentRole::Guardian => "Guardian",
        }
    }

    /// Persona name shown next to the role
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::Strategist => "Aria",
            AgentRole::Executor => "Atlas",
            AgentRole::Guardian => "Sentry",
        }
    }

    /// Capability line shown on the agent card
    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::Strategist => {
                "Analyzes market conditions and optimizes transaction timings for efficiency."
            }
            AgentRole::Executor => {
                "Interfaces with Circle Wallet APIs to sign and broadcast transactions to ARC."
            }
            AgentRole::Guardian => {
                "Monitors for security risks, compliance, and unusual transaction patterns."
            }
        }
    }

    /// Persona instruction sent as system framing to the language model
    pub fn persona(&self) -> &'static str {
        match self {
            AgentRole::Strategist => {
                "You are Aria, the Financial Strategist for a Circle Wallet on the ARC blockchain. \
                 Your job is to evaluate if a transaction makes sense financially. \
                 Users want to send USDC. Be concise, professional, and data-driven."
            }
            AgentRole::Executor => {
                "You are Atlas, the Transaction Executor. \
                 You handle the technical details of sending USDC on ARC via Circle APIs. \
                 Focus on addresses, gas estimates (ARC), and execution steps."
            }
            AgentRole::Guardian => {
                "You are Sentry, the Security Guardian. \
                 You look for risks, large transfers, or suspicious recipients. \
                 Be alert and protective."
            }
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Agent status as rendered on the status board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AgentStatus {
    #[default]
    Idle,
    Thinking,
    Executing,
    Alert,
}

impl AgentStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, AgentStatus::Thinking | AgentStatus::Executing)
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "Idle"),
            AgentStatus::Thinking => write!(f, "Thinking"),
            AgentStatus::Executing => write!(f, "Executing"),
            AgentStatus::Alert => write!(f, "Alert"),
        }
    }
}

/// One participating agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub role: AgentRole,
    pub display_name: String,
    pub description: String,
    pub status: AgentStatus,
}

impl Agent {
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            display_name: role.display_name().to_string(),
            description: role.description().to_string(),
            status: AgentStatus::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_agent_is_idle() {
        let agent = Agent::new(AgentRole::Strategist);
        assert_eq!(agent.display_name, "Aria");
        assert_eq!(agent.status, AgentStatus::Idle);
        assert!(!agent.status.is_busy());
    }
}
