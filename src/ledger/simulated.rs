//! Simulated Circle W3S wallet API
//!
//! Adds artificial latency, assigns random ids and reports HTTP 200 unless a
//! failure rate is configured, in which case a call may come back as 503.

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    balances_endpoint, BalanceSnapshot, BroadcastReceipt, LedgerClient, LedgerResponse,
    TRANSACTIONS_ENDPOINT, USDC_TOKEN_ID,
};
use crate::config::LedgerConfig;
use crate::domain::{ApiCallLog, HttpMethod};
use crate::error::Result;

/// Gas quotes fall in [0.0100, 0.0600) ARC
const GAS_MIN_TEN_THOUSANDTHS: i64 = 100;
const GAS_MAX_TEN_THOUSANDTHS: i64 = 600;

pub struct SimulatedLedger {
    min_latency: Duration,
    max_latency: Duration,
    failure_rate: f64,
}

/// Random draws for one call, taken before any await point
struct Roll {
    latency: Duration,
    fails: bool,
    log_id: String,
    data_id: String,
}

impl SimulatedLedger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            min_latency: Duration::from_millis(config.min_latency_ms),
            max_latency: Duration::from_millis(config.max_latency_ms.max(config.min_latency_ms)),
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Zero latency, never fails
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
            failure_rate: 0.0,
        }
    }

    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    fn roll(&self) -> Roll {
        let mut rng = rand::thread_rng();
        let latency = if self.max_latency > self.min_latency {
            rng.gen_range(self.min_latency..=self.max_latency)
        } else {
            self.min_latency
        };
        Roll {
            latency,
            fails: self.failure_rate > 0.0 && rng.gen_bool(self.failure_rate),
            log_id: random_id(&mut rng, 7),
            data_id: random_id(&mut rng, 13),
        }
    }

    async fn call(
        &self,
        method: HttpMethod,
        endpoint: String,
        payload: Option<serde_json::Value>,
    ) -> (Roll, ApiCallLog) {
        let roll = self.roll();
        tokio::time::sleep(roll.latency).await;

        let http_status = if roll.fails { 503 } else { 200 };
        if roll.fails {
            warn!("Simulated {} {} failed with HTTP 503", method, endpoint);
        } else {
            debug!(
                "Simulated {} {} -> 200 after {}ms",
                method,
                endpoint,
                roll.latency.as_millis()
            );
        }

        let log = ApiCallLog {
            id: roll.log_id.clone(),
            method,
            endpoint,
            http_status,
            timestamp: Utc::now(),
            payload,
        };
        (roll, log)
    }
}

fn random_id<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn check_balance(&self, address: &str) -> Result<LedgerResponse<BalanceSnapshot>> {
        let (roll, log) = self
            .call(HttpMethod::Get, balances_endpoint(address), None)
            .await;

        Ok(LedgerResponse {
            ok: !roll.fails,
            data: BalanceSnapshot {
                request_id: roll.data_id,
                address: address.to_string(),
                state: "COMPLETE".to_string(),
            },
            log,
        })
    }

    async fn broadcast_transfer(
        &self,
        wallet_id: &str,
        amount: Decimal,
        recipient: &str,
    ) -> Result<LedgerResponse<BroadcastReceipt>> {
        let payload = json!({
            "walletId": wallet_id,
            "tokenId": USDC_TOKEN_ID,
            "amounts": [amount.to_string()],
            "destinationAddress": recipient,
        });
        let (roll, log) = self
            .call(HttpMethod::Post, TRANSACTIONS_ENDPOINT.to_string(), Some(payload))
            .await;

        Ok(LedgerResponse {
            ok: !roll.fails,
            data: BroadcastReceipt {
                id: roll.data_id,
                state: if roll.fails { "FAILED" } else { "INITIATED" }.to_string(),
            },
            log,
        })
    }

    async fn gas_price(&self) -> Result<Decimal> {
        let raw = rand::thread_rng().gen_range(GAS_MIN_TEN_THOUSANDTHS..GAS_MAX_TEN_THOUSANDTHS);
        Ok(Decimal::new(raw, 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_gas_price_range() {
        let ledger = SimulatedLedger::instant();
        for _ in 0..200 {
            let gas = ledger.gas_price().await.unwrap();
            assert!(gas >= dec!(0.01) && gas < dec!(0.06), "gas {gas}");
        }
    }

    #[tokio::test]
    async fn test_balance_check_logs_get() {
        let ledger = SimulatedLedger::instant();
        let response = ledger.check_balance("0xabc").await.unwrap();

        assert!(response.ok);
        assert_eq!(response.log.method, HttpMethod::Get);
        assert_eq!(response.log.endpoint, "/v1/w3s/wallets/0xabc/balances");
        assert_eq!(response.log.http_status, 200);
    }

    #[tokio::test]
    async fn test_broadcast_payload() {
        let ledger = SimulatedLedger::instant();
        let response = ledger
            .broadcast_transfer("wallet-1", dec!(50), "0xabc")
            .await
            .unwrap();

        assert!(response.ok);
        assert!(!response.data.id.is_empty());
        let payload = response.log.payload.unwrap();
        assert_eq!(payload["amounts"][0], "50");
        assert_eq!(payload["destinationAddress"], "0xabc");
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let ledger = SimulatedLedger::instant().with_failure_rate(1.0);
        let response = ledger.check_balance("0xabc").await.unwrap();

        assert!(!response.ok);
        assert_eq!(response.log.http_status, 503);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_within_configured_range() {
        let ledger = SimulatedLedger::new(&AppConfig::default_config().ledger);
        let started = tokio::time::Instant::now();
        ledger.check_balance("0xabc").await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(800));
        assert!(elapsed <= Duration::from_millis(1801));
    }
}
