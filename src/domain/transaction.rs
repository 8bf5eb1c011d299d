use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a transfer as seen on the transaction feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Broadcast accepted, waiting for confirmation
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Only Pending may move, and only to a terminal status
    pub fn can_transition_to(&self, target: TransactionStatus) -> bool {
        matches!(
            (self, target),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the transaction feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub recipient: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub tx_hash: Option<String>,
    /// Ledger id returned by the broadcast, when this record came from one
    pub broadcast_id: Option<String>,
}

impl TransactionRecord {
    pub fn pending(amount: Decimal, recipient: impl Into<String>, broadcast_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            recipient: recipient.into(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
            tx_hash: None,
            broadcast_id: Some(broadcast_id.into()),
        }
    }
}

/// A few settled transfers used to populate the feed of a fresh demo session
pub fn demo_history() -> Vec<TransactionRecord> {
    let at = |y, m, d, h, min| {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap_or_else(Utc::now)
    };
    let settled = |amount: i64, recipient: &str, status, created_at| TransactionRecord {
        id: Uuid::new_v4(),
        amount: Decimal::from(amount),
        recipient: recipient.to_string(),
        status,
        created_at,
        tx_hash: None,
        broadcast_id: None,
    };

    vec![
        settled(250, "0xabc...123", TransactionStatus::Completed, at(2024, 5, 20, 14, 30)),
        settled(1200, "0xdef...456", TransactionStatus::Completed, at(2024, 5, 19, 9, 15)),
        settled(50, "0xghi...789", TransactionStatus::Failed, at(2024, 5, 18, 16, 45)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_transitions() {
        use TransactionStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn test_pending_record() {
        let record = TransactionRecord::pending(dec!(50), "0xabc", "bcast-1");
        assert_eq!(record.status, TransactionStatus::Pending);
        assert!(record.tx_hash.is_none());
        assert_eq!(record.broadcast_id.as_deref(), Some("bcast-1"));
    }

    #[test]
    fn test_demo_history_is_most_recent_first() {
        let history = demo_history();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].created_at > w[1].created_at));
        assert!(history.iter().all(|t| t.status.is_terminal()));
    }
}
