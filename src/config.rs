use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub wallet: WalletConfig,
    pub reasoning: ReasoningConfig,
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Address shown on the balance card and queried by the balance check
    pub address: String,
    /// Wallet id submitted with every broadcast
    pub wallet_id: String,
    /// Opening USDC balance
    pub opening_balance: Decimal,
    /// Seed the transaction feed with a few historical transfers
    #[serde(default)]
    pub seed_demo_history: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReasoningConfig {
    /// OpenAI-compatible chat completions base URL
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature for agent replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum number of prior non-technical entries sent as history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_api_key_env() -> String {
    "ARC_HUB_LLM_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_history_limit() -> usize {
    20
}

impl ReasoningConfig {
    /// API key read from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Lower bound of simulated network latency (ms)
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    /// Upper bound of simulated network latency (ms)
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
    /// Probability in [0, 1] that a simulated call fails with HTTP 503
    #[serde(default)]
    pub failure_rate: f64,
    /// Developer credentials; when all are present the wallet reports a live connection
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub entity_secret: Option<String>,
    #[serde(default = "default_app_id")]
    pub app_id: String,
}

fn default_min_latency_ms() -> u64 {
    800
}

fn default_max_latency_ms() -> u64 {
    1800
}

fn default_app_id() -> String {
    "arc-multi-agent-v1".to_string()
}

impl LedgerConfig {
    /// Whether developer credentials are configured
    pub fn is_connected(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.api_key) && present(&self.entity_secret)
    }
}

/// Turn sequencer settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Delay between broadcast and simulated confirmation (ms)
    pub confirmation_delay_ms: u64,
    /// Capacity of the state event broadcast channel
    pub event_channel_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confirmation_delay_ms: 2000,
            event_channel_capacity: 256,
        }
    }
}

impl OrchestratorConfig {
    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Self::default_config();

        let builder = Config::builder()
            // Start with default values
            .set_default("wallet.address", defaults.wallet.address)?
            .set_default("wallet.wallet_id", defaults.wallet.wallet_id)?
            .set_default("wallet.opening_balance", defaults.wallet.opening_balance.to_string())?
            .set_default("wallet.seed_demo_history", true)?
            .set_default("reasoning.base_url", defaults.reasoning.base_url)?
            .set_default("reasoning.model", defaults.reasoning.model)?
            .set_default("ledger.failure_rate", 0.0)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/demo.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ARC_HUB_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (ARC_HUB_WALLET__ADDRESS, etc.)
            .add_source(
                Environment::with_prefix("ARC_HUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Built-in configuration matching the demo wallet
    pub fn default_config() -> Self {
        use rust_decimal_macros::dec;

        Self {
            wallet: WalletConfig {
                address: "0x3f1a...9e4b".to_string(),
                wallet_id: "0x3f1a...9e4b".to_string(),
                opening_balance: dec!(5420.50),
                seed_demo_history: true,
            },
            reasoning: ReasoningConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
                model: "gemini-3-flash-preview".to_string(),
                api_key_env: default_api_key_env(),
                timeout_secs: default_request_timeout_secs(),
                temperature: default_temperature(),
                history_limit: default_history_limit(),
            },
            ledger: LedgerConfig {
                min_latency_ms: default_min_latency_ms(),
                max_latency_ms: default_max_latency_ms(),
                failure_rate: 0.0,
                api_key: None,
                entity_secret: None,
                app_id: default_app_id(),
            },
            orchestrator: OrchestratorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.wallet.opening_balance < Decimal::ZERO {
            errors.push("wallet.opening_balance must not be negative".to_string());
        }

        if self.wallet.address.trim().is_empty() {
            errors.push("wallet.address must not be empty".to_string());
        }

        if self.reasoning.history_limit == 0 {
            errors.push("reasoning.history_limit must be at least 1".to_string());
        }

        if self.ledger.min_latency_ms > self.ledger.max_latency_ms {
            errors.push("ledger.min_latency_ms must not exceed ledger.max_latency_ms".to_string());
        }

        if !(0.0..=1.0).contains(&self.ledger.failure_rate) {
            errors.push("ledger.failure_rate must be between 0 and 1".to_string());
        }

        if self.orchestrator.event_channel_capacity == 0 {
            errors.push("orchestrator.event_channel_capacity must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.wallet.opening_balance, dec!(5420.50));
        assert_eq!(config.orchestrator.confirmation_delay_ms, 2000);
        assert_eq!(config.orchestrator.event_channel_capacity, 256);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = AppConfig::default_config();
        config.wallet.opening_balance = dec!(-1);
        config.ledger.failure_rate = 1.5;
        config.ledger.min_latency_ms = 2000;
        config.ledger.max_latency_ms = 100;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_ledger_connection_requires_both_credentials() {
        let mut ledger = AppConfig::default_config().ledger;
        assert!(!ledger.is_connected());

        ledger.api_key = Some("key".into());
        assert!(!ledger.is_connected());

        ledger.entity_secret = Some("secret".into());
        assert!(ledger.is_connected());
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config = AppConfig::load_from("no-such-config-dir").unwrap();
        assert_eq!(config.wallet.opening_balance, dec!(5420.50));
        assert_eq!(config.ledger.min_latency_ms, 800);
        assert_eq!(config.reasoning.history_limit, 20);
        assert!(config.validate().is_ok());
    }
}
