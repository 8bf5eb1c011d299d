use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::agent::AgentRole;

/// Who authored a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Strategist,
    Executor,
    Guardian,
    System,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Strategist => "Strategist",
            Speaker::Executor => "Executor",
            Speaker::Guardian => "Guardian",
            Speaker::System => "System",
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Speaker::User)
    }
}

impl From<AgentRole> for Speaker {
    fn from(role: AgentRole) -> Self {
        match role {
            AgentRole::Strategist => Speaker::Strategist,
            AgentRole::Executor => Speaker::Executor,
            AgentRole::Guardian => Speaker::Guardian,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only conversation line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub speaker: Speaker,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_technical: bool,
}

impl ConversationEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            text: text.into(),
            created_at: Utc::now(),
            is_technical: false,
        }
    }

    /// SDK trace line; never fed back to the reasoning client
    pub fn technical(text: impl Into<String>) -> Self {
        Self {
            is_technical: true,
            ..Self::new(Speaker::System, text)
        }
    }

    pub fn as_turn(&self) -> HistoryTurn {
        HistoryTurn {
            speaker: self.speaker,
            text: self.text.clone(),
        }
    }
}

/// Prior conversation line handed to the reasoning client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub speaker: Speaker,
    pub text: String,
}
