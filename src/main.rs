use anyhow::{bail, Context};
use arc_agent_hub::cli::{output, shell, Cli, Commands};
use arc_agent_hub::config::{AppConfig, LoggingConfig};
use arc_agent_hub::orchestrator::{Orchestrator, TurnOutcome};
use clap::Parser;
use serde_json::json;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)
        .with_context(|| format!("loading configuration from {}", cli.config_dir))?;
    if let Err(errors) = config.validate() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }

    match cli.command.clone().unwrap_or(Commands::Repl) {
        Commands::Repl => {
            init_logging_simple();
            let hub = Orchestrator::from_config(&config)?;
            shell::run(hub).await?;
        }
        Commands::Send { text, no_wait } => {
            init_logging(&config.logging, cli.json_logs);
            let hub = Orchestrator::from_config(&config)?;
            run_send(hub, &text.join(" "), no_wait).await?;
        }
        Commands::Status { json } => {
            init_logging_simple();
            let hub = Orchestrator::from_config(&config)?;
            let snapshot = hub.snapshot().await;
            if json {
                output::print_json(&snapshot)?;
            } else {
                output::print_snapshot(&snapshot);
            }
        }
    }

    Ok(())
}

async fn run_send(hub: Orchestrator, command: &str, no_wait: bool) -> anyhow::Result<()> {
    let report = hub.submit(command).await?;

    let mut settled = None;
    if let Some(confirmation) = report.confirmation {
        if no_wait {
            info!(
                transaction_id = %confirmation.transaction_id,
                "Not waiting for confirmation"
            );
        } else {
            tokio::select! {
                status = confirmation.wait() => settled = Some(status?),
                _ = signal::ctrl_c() => warn!("Interrupted before confirmation"),
            }
        }
    }

    let snapshot = hub.snapshot().await;
    output::print_json(&json!({
        "turnId": report.turn_id,
        "outcome": report.outcome,
        "settledStatus": settled,
        "wallet": snapshot.wallet,
        "conversation": snapshot.conversation,
        "transactions": snapshot.transactions,
        "apiLogs": snapshot.api_logs,
    }))?;

    if let TurnOutcome::Aborted { reason, .. } = &report.outcome {
        bail!("turn aborted: {}", reason);
    }
    Ok(())
}

fn init_logging(logging: &LoggingConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},arc_agent_hub=debug", logging.level)));

    if json || logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn init_logging_simple() {
    // Keep the interactive session readable
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}
