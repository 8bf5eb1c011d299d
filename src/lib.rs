pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod reasoning;

pub use agents::AgentRegistry;
pub use config::AppConfig;
pub use domain::{
    AgentRole, AgentStatus, ApiCallLog, ConversationEntry, Speaker, TransactionRecord,
    TransactionStatus, TransferIntent, TurnPhase, WalletState,
};
pub use error::{HubError, Result};
pub use ledger::{LedgerClient, SimulatedLedger};
pub use orchestrator::{
    ConfirmationHandle, HubEvent, HubSnapshot, Orchestrator, TurnOutcome, TurnReport,
};
pub use reasoning::{IntentExtractor, ReasoningClient};
