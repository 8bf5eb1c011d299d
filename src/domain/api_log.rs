use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request/response record produced by every ledger call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub id: String,
    pub method: HttpMethod,
    pub endpoint: String,
    pub http_status: u16,
    pub timestamp: DateTime<Utc>,
    pub payload: Option<serde_json::Value>,
}

impl ApiCallLog {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status)
    }

    /// One-line form mirrored into the conversation
    pub fn summary(&self) -> String {
        format!(
            "[SDK] {} {} - HTTP {}",
            self.method, self.endpoint, self.http_status
        )
    }
}

/// Number of wallet API calls kept for display
pub const API_LOG_CAPACITY: usize = 10;

/// Fixed-capacity log, most recent first
#[derive(Debug, Clone)]
pub struct ApiLogRing {
    entries: VecDeque<ApiCallLog>,
    capacity: usize,
}

impl ApiLogRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest entry when full
    pub fn push(&mut self, log: ApiCallLog) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(log);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiCallLog> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ApiCallLog> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(id: usize) -> ApiCallLog {
        ApiCallLog {
            id: id.to_string(),
            method: HttpMethod::Get,
            endpoint: "/v1/w3s/wallets/0xabc/balances".to_string(),
            http_status: 200,
            timestamp: Utc::now(),
            payload: None,
        }
    }

    #[test]
    fn test_ring_evicts_oldest_first() {
        let mut ring = ApiLogRing::new(API_LOG_CAPACITY);
        for i in 0..15 {
            ring.push(log(i));
            assert!(ring.len() <= 10);
        }

        let ids: Vec<String> = ring.iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids.first().map(String::as_str), Some("14"));
        assert_eq!(ids.last().map(String::as_str), Some("5"));
        assert_eq!(ring.len(), 10);
    }

    #[test]
    fn test_summary_format() {
        assert_eq!(
            log(1).summary(),
            "[SDK] GET /v1/w3s/wallets/0xabc/balances - HTTP 200"
        );
    }

    #[test]
    fn test_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Post).unwrap();
        assert_eq!(json, "\"POST\"");
    }
}
