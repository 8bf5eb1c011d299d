//! arc-hub CLI
//!
//! Commands:
//! - `arc-hub repl` - Interactive session with the three agents (default)
//! - `arc-hub send <text>` - Run one turn and print the resulting state as JSON
//! - `arc-hub status` - Print the opening hub state

pub mod output;
pub mod shell;

use clap::{Parser, Subcommand};

/// Multi-agent USDC transfer hub on the ARC network
#[derive(Parser, Debug)]
#[command(name = "arc-hub")]
#[command(author, version, about = "Strategist, Executor and Guardian agents coordinating USDC transfers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and environment overlays
    #[arg(short, long, default_value = "config", env = "ARC_HUB_CONFIG_DIR")]
    pub config_dir: String,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive session
    Repl,

    /// Submit one command, wait for any confirmation and print the outcome
    Send {
        /// Free-text command, e.g. "Send 50 USDC to 0xabc"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Return right after the broadcast instead of waiting for confirmation
        #[arg(long)]
        no_wait: bool,
    },

    /// Show agents, wallet and the transaction feed
    Status {
        /// Print as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_joins_words() {
        let cli = Cli::try_parse_from(["arc-hub", "send", "Send", "50", "USDC", "to", "0xabc"])
            .unwrap();
        match cli.command {
            Some(Commands::Send { text, no_wait }) => {
                assert_eq!(text.join(" "), "Send 50 USDC to 0xabc");
                assert!(!no_wait);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_repl_is_default() {
        let cli = Cli::try_parse_from(["arc-hub"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config_dir, "config");
    }
}
