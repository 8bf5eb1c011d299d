//! Output formatting for `arc-hub` commands.
//!
//! Tables for the status board, transaction feed and API log; one-line
//! renderings for streamed hub events.

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::domain::{
    Agent, ApiCallLog, ConversationEntry, Speaker, TransactionRecord, WalletState,
};
use crate::orchestrator::{HubEvent, HubSnapshot};

#[derive(Debug, Serialize, Tabled)]
pub struct AgentRow {
    pub role: String,
    pub name: String,
    pub status: String,
    pub description: String,
}

impl From<&Agent> for AgentRow {
    fn from(agent: &Agent) -> Self {
        Self {
            role: agent.role.to_string(),
            name: agent.display_name.clone(),
            status: agent.status.to_string(),
            description: agent.description.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct TransactionRow {
    pub time: String,
    pub amount: String,
    pub recipient: String,
    pub status: String,
    pub hash: String,
}

impl From<&TransactionRecord> for TransactionRow {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            time: tx.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            amount: format!("{} USDC", tx.amount),
            recipient: tx.recipient.clone(),
            status: tx.status.to_string(),
            hash: tx.tx_hash.as_deref().map(short_hash).unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ApiLogRow {
    pub time: String,
    pub method: String,
    pub endpoint: String,
    pub status: u16,
}

impl From<&ApiCallLog> for ApiLogRow {
    fn from(log: &ApiCallLog) -> Self {
        Self {
            time: log.timestamp.format("%H:%M:%S").to_string(),
            method: log.method.to_string(),
            endpoint: log.endpoint.clone(),
            status: log.http_status,
        }
    }
}

fn short_hash(hash: &str) -> String {
    if hash.len() > 14 {
        format!("{}...{}", &hash[..8], &hash[hash.len() - 4..])
    } else {
        hash.to_string()
    }
}

fn print_rows<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("(no results)");
    } else {
        println!("{}", Table::new(rows));
    }
}

pub fn print_agents(agents: &[Agent]) {
    print_rows(agents.iter().map(AgentRow::from).collect());
}

pub fn print_transactions(transactions: &[TransactionRecord]) {
    print_rows(transactions.iter().map(TransactionRow::from).collect());
}

pub fn print_api_logs(logs: &[ApiCallLog]) {
    print_rows(logs.iter().map(ApiLogRow::from).collect());
}

pub fn print_wallet(wallet: &WalletState) {
    let link = if wallet.connection_live { "live" } else { "simulated" };
    println!(
        "{} {} on {} | {} ({})",
        wallet.balance, wallet.currency, wallet.network, wallet.address, link
    );
}

pub fn print_snapshot(snapshot: &HubSnapshot) {
    print_wallet(&snapshot.wallet);
    println!();
    print_agents(&snapshot.agents);
    println!();
    print_transactions(&snapshot.transactions);
}

/// Print any Serialize value as pretty JSON.
pub fn print_json<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

pub fn format_entry(entry: &ConversationEntry) -> String {
    let color = match entry.speaker {
        Speaker::User => "\x1b[37m",
        Speaker::Strategist => "\x1b[35m",
        Speaker::Executor => "\x1b[36m",
        Speaker::Guardian => "\x1b[33m",
        Speaker::System => "\x1b[90m",
    };
    format!("{}{:>10}\x1b[0m | {}", color, entry.speaker.as_str(), entry.text)
}

/// One line per event worth showing in an interactive session
pub fn format_event(event: &HubEvent) -> Option<String> {
    match event {
        HubEvent::EntryAppended { entry } if !entry.speaker.is_user() => Some(format_entry(entry)),
        HubEvent::TransactionUpdated { transaction } if transaction.status.is_terminal() => {
            Some(format!(
                "\x1b[32m{:>10}\x1b[0m | {} USDC to {} {}",
                "Ledger", transaction.amount, transaction.recipient, transaction.status
            ))
        }
        HubEvent::BalanceChanged { balance } => {
            Some(format!("\x1b[32m{:>10}\x1b[0m | balance {} USDC", "Wallet", balance))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_short_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(short_hash(&hash), "0xababab...abab");
        assert_eq!(short_hash("0x12"), "0x12");
    }

    #[test]
    fn test_user_entries_are_not_echoed() {
        let event = HubEvent::EntryAppended {
            entry: ConversationEntry::new(Speaker::User, "hello"),
        };
        assert!(format_event(&event).is_none());

        let event = HubEvent::EntryAppended {
            entry: ConversationEntry::new(Speaker::Guardian, "screening passed"),
        };
        assert!(format_event(&event).unwrap().contains("screening passed"));
    }

    #[test]
    fn test_only_settled_transactions_are_shown() {
        let mut tx = TransactionRecord::pending(dec!(50), "0xabc", "bcast");
        let pending = HubEvent::TransactionUpdated { transaction: tx.clone() };
        assert!(format_event(&pending).is_none());

        tx.status = TransactionStatus::Completed;
        let settled = HubEvent::TransactionUpdated { transaction: tx };
        assert!(format_event(&settled).unwrap().contains("Completed"));
    }
}
