//! Hub State: the single owned container behind the orchestrator
//!
//! Every mutation goes through a method here so that the matching
//! [`HubEvent`] is published in the same critical section.

use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agents::AgentRegistry;
use crate::domain::{
    Agent, AgentRole, AgentStatus, ApiCallLog, ApiLogRing, ConversationEntry, HistoryTurn,
    PhaseTransition, TransactionRecord, TransactionStatus, TurnPhase, WalletState,
    API_LOG_CAPACITY,
};
use crate::error::{HubError, Result};

/// Incremental change notifications for front-ends
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HubEvent {
    PhaseChanged { from: TurnPhase, to: TurnPhase },
    AgentStatusChanged { role: AgentRole, status: AgentStatus },
    EntryAppended { entry: ConversationEntry },
    ApiCallRecorded { log: ApiCallLog },
    TransactionUpdated { transaction: TransactionRecord },
    BalanceChanged { balance: Decimal },
}

/// Serializable view of everything the presentation layer renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSnapshot {
    pub agents: Vec<Agent>,
    pub conversation: Vec<ConversationEntry>,
    pub wallet: WalletState,
    /// Most recent first
    pub transactions: Vec<TransactionRecord>,
    /// Most recent first
    pub api_logs: Vec<ApiCallLog>,
    pub phase: TurnPhase,
    pub pending_confirmations: usize,
}

impl HubSnapshot {
    pub fn transaction(&self, id: Uuid) -> Option<&TransactionRecord> {
        self.transactions.iter().find(|t| t.id == id)
    }
}

pub struct HubState {
    registry: AgentRegistry,
    conversation: Vec<ConversationEntry>,
    wallet: WalletState,
    transactions: Vec<TransactionRecord>,
    api_logs: ApiLogRing,
    phase: TurnPhase,
    /// Transitions of the current (or most recent) turn
    phase_log: Vec<PhaseTransition>,
    pending_confirmations: usize,
    events: broadcast::Sender<HubEvent>,
}

impl HubState {
    pub fn new(wallet: WalletState, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            registry: AgentRegistry::new(),
            conversation: Vec::new(),
            wallet,
            transactions: Vec::new(),
            api_logs: ApiLogRing::new(API_LOG_CAPACITY),
            phase: TurnPhase::Idle,
            phase_log: Vec::new(),
            pending_confirmations: 0,
            events,
        }
    }

    /// Seed the feed with settled history (most recent first)
    pub fn with_transactions(mut self, history: Vec<TransactionRecord>) -> Self {
        self.transactions = history;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: HubEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ==================== Reads ====================

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn phase_log(&self) -> &[PhaseTransition] {
        &self.phase_log
    }

    pub fn agent_status(&self, role: AgentRole) -> AgentStatus {
        self.registry.status(role)
    }

    pub fn wallet(&self) -> &WalletState {
        &self.wallet
    }

    pub fn pending_confirmations(&self) -> usize {
        self.pending_confirmations
    }

    /// Non-technical conversation in original order, minus `exclude`, capped to the last `limit`
    pub fn history(&self, limit: usize, exclude: Option<Uuid>) -> Vec<HistoryTurn> {
        let turns: Vec<HistoryTurn> = self
            .conversation
            .iter()
            .filter(|e| !e.is_technical && Some(e.id) != exclude)
            .map(ConversationEntry::as_turn)
            .collect();
        let skip = turns.len().saturating_sub(limit);
        turns.into_iter().skip(skip).collect()
    }

    pub fn snapshot(&self) -> HubSnapshot {
        HubSnapshot {
            agents: self.registry.list_agents(),
            conversation: self.conversation.clone(),
            wallet: self.wallet.clone(),
            transactions: self.transactions.clone(),
            api_logs: self.api_logs.to_vec(),
            phase: self.phase,
            pending_confirmations: self.pending_confirmations,
        }
    }

    // ==================== Turn phases ====================

    pub fn transition(&mut self, to: TurnPhase, reason: impl Into<String>) -> Result<()> {
        let from = self.phase;
        if !from.can_transition_to(to) {
            return Err(HubError::InvalidPhaseTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if from == TurnPhase::Idle {
            self.phase_log.clear();
        }
        self.apply_phase(from, to, reason.into());
        Ok(())
    }

    /// Return to Idle from wherever the turn stopped
    pub fn abort_to_idle(&mut self, reason: impl Into<String>) {
        let from = self.phase;
        if from != TurnPhase::Idle {
            self.apply_phase(from, TurnPhase::Idle, reason.into());
        }
    }

    fn apply_phase(&mut self, from: TurnPhase, to: TurnPhase, reason: String) {
        debug!("Phase {} -> {}: {}", from, to, reason);
        self.phase = to;
        self.phase_log.push(PhaseTransition::new(from, to, reason));
        self.emit(HubEvent::PhaseChanged { from, to });
    }

    // ==================== Agents ====================

    pub fn set_status(&mut self, role: AgentRole, status: AgentStatus) {
        let previous = self.registry.set_status(role, status);
        if previous != status {
            self.emit(HubEvent::AgentStatusChanged { role, status });
        }
    }

    /// Every agent back to Idle, with one event per agent that actually changed
    pub fn reset_agents(&mut self) {
        if self.registry.all_idle() {
            return;
        }
        let previous = self.registry.list_agents();
        self.registry.reset_all();
        for agent in previous.into_iter().filter(|a| a.status != AgentStatus::Idle) {
            self.emit(HubEvent::AgentStatusChanged {
                role: agent.role,
                status: AgentStatus::Idle,
            });
        }
    }

    // ==================== Conversation & logs ====================

    pub fn append(&mut self, entry: ConversationEntry) -> Uuid {
        let id = entry.id;
        self.conversation.push(entry.clone());
        self.emit(HubEvent::EntryAppended { entry });
        id
    }

    /// Push a ledger log into the ring; mirror it into the conversation when requested
    pub fn record_api_call(&mut self, log: ApiCallLog, mirror: bool) {
        if mirror {
            self.append(ConversationEntry::technical(log.summary()));
        }
        self.api_logs.push(log.clone());
        self.emit(HubEvent::ApiCallRecorded { log });
    }

    // ==================== Transactions ====================

    /// Register a broadcast transfer awaiting confirmation
    pub fn open_transaction(&mut self, record: TransactionRecord) -> Uuid {
        let id = record.id;
        self.transactions.insert(0, record.clone());
        self.pending_confirmations += 1;
        self.emit(HubEvent::TransactionUpdated { transaction: record });
        id
    }

    /// Finalize a pending transfer: debit and complete, or fail with the balance untouched.
    ///
    /// Balance and record change together under the caller's write lock.
    pub fn settle_transaction(&mut self, id: Uuid) -> Result<TransactionStatus> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| HubError::Internal(format!("unknown transaction {}", id)))?;

        // Already settled records are returned as they stand
        let current = self.transactions[index].status;
        if !current.can_transition_to(TransactionStatus::Completed) {
            return Ok(current);
        }

        let amount = self.transactions[index].amount;
        let status = match self.wallet.debit(amount) {
            Ok(balance) => {
                let record = &mut self.transactions[index];
                record.status = TransactionStatus::Completed;
                record.tx_hash = Some(synthetic_tx_hash());
                info!(
                    "Transfer {} of {} USDC to {} completed; balance {}",
                    id, amount, record.recipient, balance
                );
                self.emit(HubEvent::BalanceChanged { balance });
                TransactionStatus::Completed
            }
            Err(e) => {
                warn!("Transfer {} rejected at confirmation: {}", id, e);
                self.transactions[index].status = TransactionStatus::Failed;
                TransactionStatus::Failed
            }
        };
        self.emit(HubEvent::TransactionUpdated {
            transaction: self.transactions[index].clone(),
        });

        self.pending_confirmations = self.pending_confirmations.saturating_sub(1);
        // NoIntent and Execute belong to the Executor of a newer turn
        let executor_busy = matches!(self.phase, TurnPhase::NoIntent | TurnPhase::Execute);
        if self.pending_confirmations == 0 && !executor_busy {
            self.set_status(AgentRole::Executor, AgentStatus::Idle);
        }

        Ok(status)
    }
}

fn synthetic_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HttpMethod, Speaker};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn state(balance: Decimal) -> HubState {
        HubState::new(WalletState::new("0xwallet", balance, false), 64)
    }

    #[test]
    fn test_history_skips_technical_and_excluded() {
        let mut state = state(dec!(100));
        state.append(ConversationEntry::new(Speaker::User, "first"));
        state.append(ConversationEntry::technical("[SDK] GET /x - HTTP 200"));
        state.append(ConversationEntry::new(Speaker::Strategist, "reply"));
        let current = state.append(ConversationEntry::new(Speaker::User, "second"));

        let history = state.history(20, Some(current));
        let texts: Vec<&str> = history.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "reply"]);
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let mut state = state(dec!(100));
        for i in 0..5 {
            state.append(ConversationEntry::new(Speaker::User, format!("m{i}")));
        }
        let history = state.history(2, None);
        let texts: Vec<&str> = history.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["m3", "m4"]);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut state = state(dec!(100));
        let err = state.transition(TurnPhase::Execute, "skip ahead").unwrap_err();
        assert!(matches!(err, HubError::InvalidPhaseTransition { .. }));
        assert_eq!(state.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_record_api_call_mirrors_when_asked() {
        let mut state = state(dec!(100));
        let log = ApiCallLog {
            id: "a".into(),
            method: HttpMethod::Get,
            endpoint: "/v1/w3s/wallets/0xwallet/balances".into(),
            http_status: 200,
            timestamp: Utc::now(),
            payload: None,
        };

        state.record_api_call(log.clone(), true);
        state.record_api_call(log, false);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.api_logs.len(), 2);
        assert_eq!(snapshot.conversation.len(), 1);
        assert!(snapshot.conversation[0].is_technical);
        assert_eq!(snapshot.conversation[0].speaker, Speaker::System);
    }

    #[test]
    fn test_settle_completes_and_debits() {
        let mut state = state(dec!(5420.50));
        state.set_status(AgentRole::Executor, AgentStatus::Executing);
        let id = state.open_transaction(TransactionRecord::pending(dec!(50), "0xabc", "b1"));

        let status = state.settle_transaction(id).unwrap();

        let snapshot = state.snapshot();
        assert_eq!(status, TransactionStatus::Completed);
        assert_eq!(snapshot.wallet.balance, dec!(5370.50));
        let record = snapshot.transaction(id).unwrap();
        assert!(record.tx_hash.as_deref().is_some_and(|h| h.starts_with("0x") && h.len() == 66));
        assert_eq!(state.agent_status(AgentRole::Executor), AgentStatus::Idle);
        assert_eq!(state.pending_confirmations(), 0);
    }

    #[test]
    fn test_settle_overdraft_fails_without_debit() {
        let mut state = state(dec!(5420.50));
        let id = state.open_transaction(TransactionRecord::pending(dec!(10000), "0xabc", "b1"));

        let status = state.settle_transaction(id).unwrap();

        assert_eq!(status, TransactionStatus::Failed);
        assert_eq!(state.wallet().balance, dec!(5420.50));
        assert!(state.snapshot().transaction(id).unwrap().tx_hash.is_none());
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut state = state(dec!(100));
        let id = state.open_transaction(TransactionRecord::pending(dec!(40), "0xabc", "b1"));

        state.settle_transaction(id).unwrap();
        let again = state.settle_transaction(id).unwrap();

        assert_eq!(again, TransactionStatus::Completed);
        assert_eq!(state.wallet().balance, dec!(60));
    }

    #[test]
    fn test_settle_leaves_executor_to_executing_turn() {
        let mut state = state(dec!(100));
        let id = state.open_transaction(TransactionRecord::pending(dec!(10), "0xabc", "b1"));
        for phase in [
            TurnPhase::Strategize,
            TurnPhase::Guard,
            TurnPhase::ExtractIntent,
            TurnPhase::Execute,
        ] {
            state.transition(phase, "next command").unwrap();
        }
        state.set_status(AgentRole::Executor, AgentStatus::Executing);

        state.settle_transaction(id).unwrap();

        assert_eq!(state.agent_status(AgentRole::Executor), AgentStatus::Executing);
    }

    #[test]
    fn test_settle_idles_executor_during_strategize() {
        let mut state = state(dec!(100));
        state.set_status(AgentRole::Executor, AgentStatus::Executing);
        let id = state.open_transaction(TransactionRecord::pending(dec!(10), "0xabc", "b1"));
        state.transition(TurnPhase::Strategize, "next command").unwrap();

        state.settle_transaction(id).unwrap();

        assert_eq!(state.agent_status(AgentRole::Executor), AgentStatus::Idle);
    }

    #[tokio::test]
    async fn test_reset_agents_announces_only_changed_agents() {
        let mut state = state(dec!(100));
        state.set_status(AgentRole::Strategist, AgentStatus::Thinking);
        state.set_status(AgentRole::Guardian, AgentStatus::Alert);
        let mut rx = state.subscribe();

        state.reset_agents();
        state.reset_agents();

        let mut reset = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                HubEvent::AgentStatusChanged { role, status } => {
                    assert_eq!(status, AgentStatus::Idle);
                    reset.push(role);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(reset, vec![AgentRole::Strategist, AgentRole::Guardian]);
        for role in AgentRole::ALL {
            assert_eq!(state.agent_status(role), AgentStatus::Idle);
        }
    }

    #[test]
    fn test_api_log_capacity_is_fixed() {
        let mut state = state(dec!(100));
        for i in 0..(API_LOG_CAPACITY + 2) {
            state.record_api_call(
                ApiCallLog {
                    id: i.to_string(),
                    method: HttpMethod::Get,
                    endpoint: "/v1/w3s/wallets/0xwallet/balances".into(),
                    http_status: 200,
                    timestamp: Utc::now(),
                    payload: None,
                },
                false,
            );
        }

        let logs = state.snapshot().api_logs;
        assert_eq!(logs.len(), 10);
        assert_eq!(logs[0].id, "11");
    }

    #[tokio::test]
    async fn test_events_published() {
        let mut state = state(dec!(100));
        let mut rx = state.subscribe();

        state.set_status(AgentRole::Guardian, AgentStatus::Thinking);
        state.append(ConversationEntry::new(Speaker::Guardian, "ok"));

        assert!(matches!(
            rx.recv().await.unwrap(),
            HubEvent::AgentStatusChanged {
                role: AgentRole::Guardian,
                status: AgentStatus::Thinking
            }
        ));
        assert!(matches!(rx.recv().await.unwrap(), HubEvent::EntryAppended { .. }));
    }
}
