//! Agent Registry: the fixed catalog of participating agents
//!
//! Exactly three agents exist for the lifetime of the process. Only the
//! orchestrator mutates their status, one phase at a time.

use crate::domain::{Agent, AgentRole, AgentStatus};

#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: [Agent; 3],
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: AgentRole::ALL.map(Agent::new),
        }
    }

    /// Agents in fixed order: Strategist, Executor, Guardian
    pub fn list_agents(&self) -> Vec<Agent> {
        self.agents.to_vec()
    }

    pub fn get(&self, role: AgentRole) -> &Agent {
        &self.agents[Self::slot(role)]
    }

    pub fn status(&self, role: AgentRole) -> AgentStatus {
        self.get(role).status
    }

    /// Returns the previous status
    pub fn set_status(&mut self, role: AgentRole, status: AgentStatus) -> AgentStatus {
        let agent = &mut self.agents[Self::slot(role)];
        std::mem::replace(&mut agent.status, status)
    }

    /// Recovery action after a failed turn: every agent back to Idle
    pub fn reset_all(&mut self) {
        for agent in self.agents.iter_mut() {
            agent.status = AgentStatus::Idle;
        }
    }

    pub fn all_idle(&self) -> bool {
        self.agents.iter().all(|a| a.status == AgentStatus::Idle)
    }

    fn slot(role: AgentRole) -> usize {
        match role {
            AgentRole::Strategist => 0,
            AgentRole::Executor => 1,
            AgentRole::Guardian => 2,
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
