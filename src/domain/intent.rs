use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Structured reading of a command as a possible transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferIntent {
    pub amount: Decimal,
    pub recipient: String,
    pub is_valid: bool,
}

impl TransferIntent {
    pub fn new(amount: Decimal, recipient: impl Into<String>, is_valid: bool) -> Self {
        Self {
            amount,
            recipient: recipient.into(),
            is_valid,
        }
    }

    /// The value every failed extraction degrades to
    pub fn none() -> Self {
        Self {
            amount: Decimal::ZERO,
            recipient: String::new(),
            is_valid: false,
        }
    }

    /// Clamp whatever an extractor produced into a well-formed intent.
    ///
    /// Negative amounts and blank recipients cannot describe a transfer.
    pub fn sanitized(self) -> Self {
        let recipient = self.recipient.trim().to_string();
        if self.amount < Decimal::ZERO {
            return Self::none();
        }
        Self {
            is_valid: self.is_valid && !recipient.is_empty(),
            amount: self.amount,
            recipient,
        }
    }

    /// Whether the turn should take the EXECUTE branch
    pub fn is_actionable(&self) -> bool {
        self.is_valid && self.amount > Decimal::ZERO
    }
}

impl Default for TransferIntent {
    fn default() -> Self {
        Self::none()
    }
}
