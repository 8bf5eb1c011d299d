//! Wallet-network collaborator
//!
//! Every call returns `{ ok, data, log }`. A broadcast is a submission, not a
//! confirmation; confirmation is owned by the orchestrator.

pub mod simulated;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ApiCallLog;
use crate::error::{HubError, Result};

pub use simulated::SimulatedLedger;

/// Developer-controlled wallet endpoints
pub fn balances_endpoint(address: &str) -> String {
    format!("/v1/w3s/wallets/{}/balances", address)
}

pub const TRANSACTIONS_ENDPOINT: &str = "/v1/w3s/developer/transactions";

/// Token id submitted with every USDC transfer
pub const USDC_TOKEN_ID: &str = "usdc-token-id";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerResponse<T> {
    pub ok: bool,
    pub data: T,
    pub log: ApiCallLog,
}

impl<T> LedgerResponse<T> {
    /// Split into the log (always kept) and the payload (only when the call succeeded)
    pub fn into_parts(self) -> (ApiCallLog, Result<T>) {
        let LedgerResponse { ok, data, log } = self;
        if ok && log.is_success() {
            (log, Ok(data))
        } else {
            let err = HubError::ledger(
                log.method.as_str(),
                log.endpoint.clone(),
                format!("HTTP {}", log.http_status),
            );
            (log, Err(err))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub request_id: String,
    pub address: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReceipt {
    /// Ledger-assigned id used to track finality
    pub id: String,
    pub state: String,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read-only balance lookup
    async fn check_balance(&self, address: &str) -> Result<LedgerResponse<BalanceSnapshot>>;

    /// Submit a transfer; returns the broadcast id, not a confirmation
    async fn broadcast_transfer(
        &self,
        wallet_id: &str,
        amount: Decimal,
        recipient: &str,
    ) -> Result<LedgerResponse<BroadcastReceipt>>;

    /// Current network fee, in ARC
    async fn gas_price(&self) -> Result<Decimal>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HttpMethod;
    use chrono::Utc;

    fn response(status: u16, ok: bool) -> LedgerResponse<u32> {
        LedgerResponse {
            ok,
            data: 7,
            log: ApiCallLog {
                id: "x".into(),
                method: HttpMethod::Post,
                endpoint: TRANSACTIONS_ENDPOINT.into(),
                http_status: status,
                timestamp: Utc::now(),
                payload: None,
            },
        }
    }

    #[test]
    fn test_into_parts_success() {
        let (log, data) = response(200, true).into_parts();
        assert_eq!(log.http_status, 200);
        assert_eq!(data.unwrap(), 7);
    }

    #[test]
    fn test_into_parts_failure_keeps_log() {
        let (log, data) = response(503, false).into_parts();
        assert_eq!(log.http_status, 503);
        assert!(matches!(data, Err(HubError::LedgerCallFailed { .. })));
    }

    #[test]
    fn test_non_2xx_is_failure_even_if_ok() {
        let (_, data) = response(500, true).into_parts();
        assert!(data.is_err());
    }
}
