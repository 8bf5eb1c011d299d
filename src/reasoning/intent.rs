//! Intent extraction
//!
//! Every extraction failure degrades to [`TransferIntent::none`] instead of
//! propagating.

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::domain::TransferIntent;
use crate::error::{HubError, Result};

/// USDC carries six decimals
const USDC_DECIMALS: u32 = 6;

#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Fallible extraction; errors are `HubError::IntentUnparseable` or transport errors
    async fn try_extract(&self, text: &str) -> Result<TransferIntent>;

    /// Always returns a well-formed intent
    async fn extract(&self, text: &str) -> TransferIntent {
        match self.try_extract(text).await {
            Ok(intent) => intent.sanitized(),
            Err(e) => {
                warn!("Intent extraction degraded to no-intent: {}", e);
                TransferIntent::none()
            }
        }
    }
}

/// Extract JSON from a response that may contain markdown code blocks
pub fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            let content = text[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                return content[newline + 1..].trim();
            }
            return content;
        }
    }

    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end > start {
                return &text[start..=end];
            }
        }
    }

    text.trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIntent {
    #[serde(default)]
    amount: serde_json::Value,
    #[serde(default)]
    recipient: Option<String>,
    #[serde(default, alias = "is_valid", alias = "valid")]
    is_valid: bool,
}

fn parse_amount(value: &serde_json::Value) -> Result<Decimal> {
    let amount = match value {
        serde_json::Value::Null => Some(Decimal::ZERO),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    };

    amount
        .map(|a| a.round_dp(USDC_DECIMALS))
        .ok_or_else(|| HubError::IntentUnparseable(format!("unreadable amount: {}", value)))
}

/// Parse a model reply of the shape `{"amount", "recipient", "isValid"}`
pub fn parse_intent_json(text: &str) -> Result<TransferIntent> {
    let json_str = extract_json(text);
    let raw: RawIntent = serde_json::from_str(json_str)
        .map_err(|e| HubError::IntentUnparseable(format!("{}: {}", e, json_str)))?;

    Ok(TransferIntent {
        amount: parse_amount(&raw.amount)?,
        recipient: raw.recipient.unwrap_or_default(),
        is_valid: raw.is_valid,
    })
}

/// Offline extractor: first number is the amount, first `0x…` token the recipient
#[derive(Debug, Clone, Default)]
pub struct HeuristicIntentExtractor;

impl HeuristicIntentExtractor {
    pub fn new() -> Self {
        Self
    }

    fn scan(text: &str) -> TransferIntent {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| matches!(c, ',' | ';' | '!' | '?' | '"' | '\'')))
            .collect();

        let amount = tokens.iter().find_map(|t| {
            let t = t.trim_start_matches('$').replace(',', "");
            let t = t.trim_end_matches('.');
            if t.starts_with("0x") {
                return None;
            }
            Decimal::from_str(t).ok().filter(|a| *a > Decimal::ZERO)
        });

        let recipient = tokens
            .iter()
            .find(|t| t.len() > 2 && t.to_lowercase().starts_with("0x"))
            .map(|t| t.trim_end_matches('.').to_string());

        match (amount, recipient) {
            (Some(amount), Some(recipient)) => TransferIntent::new(
                amount.round_dp(USDC_DECIMALS),
                recipient,
                true,
            ),
            (Some(amount), None) => TransferIntent::new(amount, "", false),
            _ => TransferIntent::none(),
        }
    }
}

#[async_trait]
impl IntentExtractor for HeuristicIntentExtractor {
    async fn try_extract(&self, text: &str) -> Result<TransferIntent> {
        let intent = Self::scan(text);
        debug!(?intent, "Heuristic intent");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_extract_json_from_code_block() {
        let text = "Here you go:\n```json\n{\"amount\": 50, \"recipient\": \"0xabc\", \"isValid\": true}\n```";
        let json = extract_json(text);
        assert!(json.starts_with('{'));
        assert!(json.contains("recipient"));
    }

    #[test]
    fn test_parse_intent_json() {
        let intent =
            parse_intent_json(r#"{"amount": 50, "recipient": "0xabc", "isValid": true}"#).unwrap();
        assert_eq!(intent, TransferIntent::new(dec!(50), "0xabc", true));
    }

    #[test]
    fn test_parse_intent_json_string_amount() {
        let intent =
            parse_intent_json(r#"{"amount": "1,250.75", "recipient": "0xdef", "is_valid": true}"#)
                .unwrap();
        assert_eq!(intent.amount, dec!(1250.75));
        assert!(intent.is_valid);
    }

    #[test]
    fn test_parse_intent_json_rejects_prose() {
        let err = parse_intent_json("I could not find a transfer here.").unwrap_err();
        assert!(matches!(err, HubError::IntentUnparseable(_)));
    }

    #[tokio::test]
    async fn test_heuristic_extracts_transfer() {
        let extractor = HeuristicIntentExtractor::new();
        let intent = extractor.extract("Pay the vendor 50 USDC to 0xabc").await;
        assert_eq!(intent, TransferIntent::new(dec!(50), "0xabc", true));
    }

    #[tokio::test]
    async fn test_heuristic_no_transfer() {
        let extractor = HeuristicIntentExtractor::new();
        let intent = extractor.extract("What's the weather").await;
        assert_eq!(intent, TransferIntent::none());
        assert!(!intent.is_actionable());
    }

    struct Broken;

    #[async_trait]
    impl IntentExtractor for Broken {
        async fn try_extract(&self, _text: &str) -> Result<TransferIntent> {
            Err(HubError::IntentUnparseable("garbage".into()))
        }
    }

    #[tokio::test]
    async fn test_failed_extraction_degrades() {
        let intent = Broken.extract("send 5 to 0xabc").await;
        assert_eq!(intent, TransferIntent::none());
    }
}
