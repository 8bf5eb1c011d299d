//! Orchestration core
//!
//! Owns all hub state (agents, conversation, wallet, transactions, API logs)
//! and sequences one command at a time through the agents.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{ConfirmationHandle, Orchestrator, TurnOutcome, TurnReport};
pub use state::{HubEvent, HubSnapshot, HubState};
