use thiserror::Error;

/// Main error type for the agent hub
#[derive(Error, Debug)]
pub enum HubError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Collaborator errors
    #[error("Reasoning unavailable: {0}")]
    ReasoningUnavailable(String),

    #[error("Intent unparseable: {0}")]
    IntentUnparseable(String),

    #[error("Ledger call failed: {method} {endpoint} - {reason}")]
    LedgerCallFailed {
        method: String,
        endpoint: String,
        reason: String,
    },

    // Business-rule rejections
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    // Turn sequencing errors
    #[error("Invalid phase transition: from {from} to {to}")]
    InvalidPhaseTransition { from: String, to: String },

    #[error("A turn is already in progress ({phase}); command rejected")]
    TurnInProgress { phase: String },

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Shorthand for a ledger failure on a given endpoint
    pub fn ledger(method: impl Into<String>, endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        HubError::LedgerCallFailed {
            method: method.into(),
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Short label used when reporting a failed turn in the conversation
    pub fn kind(&self) -> &'static str {
        match self {
            HubError::ReasoningUnavailable(_) => "reasoning unavailable",
            HubError::LedgerCallFailed { .. } => "ledger call failed",
            HubError::IntentUnparseable(_) => "intent unparseable",
            HubError::InsufficientBalance { .. } => "insufficient balance",
            HubError::Http(_) => "network error",
            _ => "internal error",
        }
    }
}

/// Result type alias for HubError
pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_message() {
        let err = HubError::ledger("POST", "/v1/w3s/developer/transactions", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "Ledger call failed: POST /v1/w3s/developer/transactions - HTTP 503"
        );
    }
}
