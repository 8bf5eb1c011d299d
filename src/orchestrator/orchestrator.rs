//! Orchestrator: the turn sequencer
//!
//! One command drives the agents through a fixed sequence:
//!   IDLE -> STRATEGIZE -> GUARD -> EXTRACT_INTENT -> (NO_INTENT | EXECUTE) -> IDLE
//!
//! Phases run strictly one after another. A busy flag rejects overlapping
//! commands. Any reasoning or ledger failure aborts the rest of the turn,
//! posts a single Guardian notice and resets every agent to Idle. The
//! confirmation of a broadcast transfer runs as a detached delayed task.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, Instrument};
use uuid::Uuid;

use crate::config::{AppConfig, OrchestratorConfig};
use crate::domain::{
    demo_history, AgentRole, AgentStatus, ConversationEntry, Speaker, TransactionRecord,
    TransactionStatus, TransferIntent, TurnPhase, WalletState,
};
use crate::error::{HubError, Result};
use crate::ledger::{LedgerClient, SimulatedLedger};
use crate::reasoning::{self, IntentExtractor, ReasoningClient, STANDING_BY_PROMPT};

use super::state::{HubEvent, HubSnapshot, HubState};

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The command described no transfer; the Executor stood by
    NoIntent,
    /// A transfer was broadcast and awaits confirmation
    Broadcast {
        transaction_id: Uuid,
        broadcast_id: String,
        intent: TransferIntent,
    },
    /// A collaborator failed; the turn was abandoned and agents reset
    Aborted { phase: TurnPhase, reason: String },
}

/// Observability handle for a scheduled confirmation. Dropping it does not cancel the task.
#[derive(Debug)]
pub struct ConfirmationHandle {
    pub transaction_id: Uuid,
    handle: JoinHandle<Result<TransactionStatus>>,
}

impl ConfirmationHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the confirmation to fire and return the final status
    pub async fn wait(self) -> Result<TransactionStatus> {
        self.handle
            .await
            .map_err(|e| HubError::Internal(format!("confirmation task failed: {}", e)))?
    }
}

#[derive(Debug)]
pub struct TurnReport {
    pub turn_id: Uuid,
    pub outcome: TurnOutcome,
    pub confirmation: Option<ConfirmationHandle>,
}

/// Releases the busy flag when the turn ends, however it ends
struct TurnGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Clonable handle to the orchestration core
#[derive(Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    wallet_id: String,
    history_limit: usize,
    state: Arc<RwLock<HubState>>,
    busy: Arc<AtomicBool>,
    reasoning: Arc<dyn ReasoningClient>,
    intents: Arc<dyn IntentExtractor>,
    ledger: Arc<dyn LedgerClient>,
}

impl Orchestrator {
    pub fn new(
        config: &AppConfig,
        reasoning: Arc<dyn ReasoningClient>,
        intents: Arc<dyn IntentExtractor>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        let wallet = WalletState::new(
            config.wallet.address.clone(),
            config.wallet.opening_balance,
            config.ledger.is_connected(),
        );
        let mut state = HubState::new(wallet, config.orchestrator.event_channel_capacity);
        if config.wallet.seed_demo_history {
            state = state.with_transactions(demo_history());
        }

        Self {
            config: config.orchestrator.clone(),
            wallet_id: config.wallet.wallet_id.clone(),
            history_limit: config.reasoning.history_limit.max(1),
            state: Arc::new(RwLock::new(state)),
            busy: Arc::new(AtomicBool::new(false)),
            reasoning,
            intents,
            ledger,
        }
    }

    /// Wire collaborators from configuration: reasoning per API key presence,
    /// the simulated wallet API for the ledger
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let (reasoner, extractor) = reasoning::from_config(&config.reasoning)?;
        let ledger: Arc<dyn LedgerClient> = Arc::new(SimulatedLedger::new(&config.ledger));
        Ok(Self::new(config, reasoner, extractor, ledger))
    }

    // ==================== Observable state ====================

    pub async fn snapshot(&self) -> HubSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.state.read().await.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn phase(&self) -> TurnPhase {
        self.state.read().await.phase()
    }

    pub async fn phase_history(&self) -> Vec<TurnPhase> {
        let state = self.state.read().await;
        state.phase_log().iter().map(|t| t.to).collect()
    }

    // ==================== Turn entry point ====================

    /// Run one full turn for a free-text command.
    ///
    /// Collaborator failures never surface here; they end the turn with
    /// `TurnOutcome::Aborted`. Errors are `TurnInProgress` when another
    /// command is still being sequenced, or `Internal` if the turn task dies.
    ///
    /// Once accepted, the turn runs on its own task: dropping the returned
    /// future does not stop it, and the busy flag stays set until it ends.
    #[instrument(skip(self, command), fields(len = command.len()))]
    pub async fn submit(&self, command: &str) -> Result<TurnReport> {
        let guard = self.acquire().await?;
        let this = self.clone();
        let command = command.to_string();
        tokio::spawn(async move { this.run_turn(&command, guard).await }.in_current_span())
            .await
            .map_err(|e| HubError::Internal(format!("turn task failed: {}", e)))?
    }

    async fn run_turn(&self, command: &str, _guard: TurnGuard) -> Result<TurnReport> {
        let turn_id = Uuid::new_v4();
        info!(%turn_id, "Turn started");

        // Phase first, so a rejected transition leaves no orphan entry
        let user_entry = {
            let mut state = self.state.write().await;
            state.transition(TurnPhase::Strategize, "command received")?;
            state.append(ConversationEntry::new(Speaker::User, command))
        };

        match self.run_phases(command, user_entry).await {
            Ok((outcome, confirmation)) => {
                info!(%turn_id, ?outcome, "Turn finished");
                Ok(TurnReport {
                    turn_id,
                    outcome,
                    confirmation,
                })
            }
            Err(e) => {
                let phase = self.abort(&e).await;
                Ok(TurnReport {
                    turn_id,
                    outcome: TurnOutcome::Aborted {
                        phase,
                        reason: e.to_string(),
                    },
                    confirmation: None,
                })
            }
        }
    }

    async fn acquire(&self) -> Result<TurnGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let phase = self.state.read().await.phase();
            info!("Command rejected: turn in progress ({})", phase);
            return Err(HubError::TurnInProgress {
                phase: phase.to_string(),
            });
        }
        Ok(TurnGuard {
            busy: self.busy.clone(),
        })
    }

    async fn run_phases(
        &self,
        command: &str,
        user_entry: Uuid,
    ) -> Result<(TurnOutcome, Option<ConfirmationHandle>)> {
        // STRATEGIZE
        self.consult(AgentRole::Strategist, command, Some(user_entry))
            .await?;
        self.transition(TurnPhase::Guard, "strategy posted").await?;

        // GUARD
        self.consult(AgentRole::Guardian, command, Some(user_entry))
            .await?;
        self.transition(TurnPhase::ExtractIntent, "screening posted")
            .await?;

        // EXTRACT_INTENT, always on the original command text
        let intent = self.intents.extract(command).await;
        debug!(?intent, "Intent extracted");

        if !intent.is_actionable() {
            self.transition(TurnPhase::NoIntent, "no transfer requested")
                .await?;
            self.stand_by().await?;
            self.transition(TurnPhase::Idle, "executor standing by")
                .await?;
            return Ok((TurnOutcome::NoIntent, None));
        }

        self.transition(TurnPhase::Execute, "transfer requested")
            .await?;
        let (outcome, confirmation) = self.execute(intent).await?;
        self.transition(TurnPhase::Idle, "broadcast submitted")
            .await?;
        Ok((outcome, Some(confirmation)))
    }

    async fn transition(&self, to: TurnPhase, reason: &str) -> Result<()> {
        self.state.write().await.transition(to, reason)
    }

    async fn set_status(&self, role: AgentRole, status: AgentStatus) {
        self.state.write().await.set_status(role, status);
    }

    async fn say(&self, speaker: Speaker, text: impl Into<String>) {
        self.state
            .write()
            .await
            .append(ConversationEntry::new(speaker, text));
    }

    /// Thinking -> reply -> Idle for one agent
    async fn consult(&self, role: AgentRole, command: &str, exclude: Option<Uuid>) -> Result<()> {
        let history = {
            let mut state = self.state.write().await;
            state.set_status(role, AgentStatus::Thinking);
            state.history(self.history_limit, exclude)
        };

        let reply = self.reasoning.respond(role, command, &history).await?;

        let mut state = self.state.write().await;
        state.append(ConversationEntry::new(role.into(), reply));
        state.set_status(role, AgentStatus::Idle);
        Ok(())
    }

    async fn stand_by(&self) -> Result<()> {
        self.set_status(AgentRole::Executor, AgentStatus::Thinking)
            .await;

        let reply = self
            .reasoning
            .respond(AgentRole::Executor, STANDING_BY_PROMPT, &[])
            .await?;

        let mut state = self.state.write().await;
        state.append(ConversationEntry::new(Speaker::Executor, reply));
        state.set_status(AgentRole::Executor, AgentStatus::Idle);
        Ok(())
    }

    async fn execute(&self, intent: TransferIntent) -> Result<(TurnOutcome, ConfirmationHandle)> {
        self.set_status(AgentRole::Executor, AgentStatus::Thinking)
            .await;

        // Balance check
        let address = self.state.read().await.wallet().address.clone();
        let response = self.ledger.check_balance(&address).await?;
        let (log, result) = response.into_parts();
        self.state.write().await.record_api_call(log, result.is_ok());
        result?;

        // Fee quote
        let gas = self.ledger.gas_price().await?;
        self.say(
            Speaker::Executor,
            format!(
                "Checking network resources... ARC Gas Price: {} ARC. Ready for Circle API broadcast.",
                gas
            ),
        )
        .await;

        self.set_status(AgentRole::Executor, AgentStatus::Executing)
            .await;

        // Broadcast
        let response = self
            .ledger
            .broadcast_transfer(&self.wallet_id, intent.amount, &intent.recipient)
            .await?;
        let (log, result) = response.into_parts();
        self.state.write().await.record_api_call(log, result.is_ok());
        let receipt = result?;

        let transaction_id = {
            let mut state = self.state.write().await;
            state.append(ConversationEntry::new(
                Speaker::Executor,
                format!(
                    "Transaction initiated successfully. Circle ID: {}. Monitoring ARC for finality...",
                    receipt.id
                ),
            ));
            state.open_transaction(TransactionRecord::pending(
                intent.amount,
                intent.recipient.clone(),
                receipt.id.clone(),
            ))
        };
        info!(
            %transaction_id,
            broadcast_id = %receipt.id,
            amount = %intent.amount,
            recipient = %intent.recipient,
            "Transfer broadcast; confirmation scheduled"
        );

        let confirmation = self.schedule_confirmation(transaction_id);
        Ok((
            TurnOutcome::Broadcast {
                transaction_id,
                broadcast_id: receipt.id,
                intent,
            },
            confirmation,
        ))
    }

    fn schedule_confirmation(&self, transaction_id: Uuid) -> ConfirmationHandle {
        let state = self.state.clone();
        let delay = self.config.confirmation_delay();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.write().await.settle_transaction(transaction_id)
        });

        ConfirmationHandle {
            transaction_id,
            handle,
        }
    }

    /// Post the failure notice, reset every agent and return the phase the turn died in
    async fn abort(&self, err: &HubError) -> TurnPhase {
        let mut state = self.state.write().await;
        let phase = state.phase();
        error!("Turn aborted during {}: {}", phase, err);

        state.append(ConversationEntry::new(
            Speaker::Guardian,
            format!(
                "An error occurred during agent coordination ({}). System reset.",
                err.kind()
            ),
        ));
        state.reset_agents();
        state.abort_to_idle(format!("aborted: {}", err.kind()));
        phase
    }
}
