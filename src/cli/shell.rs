//! `arc-hub repl`: interactive session with the agents.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::broadcast::error::RecvError;

use super::output;
use crate::orchestrator::{Orchestrator, TurnOutcome};

pub async fn run(hub: Orchestrator) -> anyhow::Result<()> {
    println!("\x1b[36mARC Agent Hub\x1b[0m");
    println!("Talk to Aria, Atlas and Sentry. E.g.: Send 50 USDC to 0x71C7656EC7ab88b098defB751B7401B5f6d8976F");
    println!("Type '/help' for available commands, '/quit' to exit.");
    println!();
    output::print_wallet(&hub.snapshot().await.wallet);

    let mut events = hub.subscribe().await;
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = output::format_event(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    println!("\x1b[90m({skipped} updates skipped)\x1b[0m");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("\x1b[36marc>\x1b[0m ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line {
                    "/quit" | "/exit" | "/q" => break,
                    "/help" | "/?" => print_shell_help(),
                    "/agents" => output::print_agents(&hub.snapshot().await.agents),
                    "/wallet" => output::print_wallet(&hub.snapshot().await.wallet),
                    "/txs" => output::print_transactions(&hub.snapshot().await.transactions),
                    "/logs" => output::print_api_logs(&hub.snapshot().await.api_logs),
                    cmd if cmd.starts_with('/') => {
                        eprintln!("unknown command: {cmd} (try /help)");
                    }
                    command => match hub.submit(command).await {
                        Ok(report) => {
                            if let TurnOutcome::Aborted { phase, reason } = &report.outcome {
                                eprintln!("\x1b[31mturn aborted in {phase}: {reason}\x1b[0m");
                            }
                        }
                        Err(e) => eprintln!("\x1b[31m{e}\x1b[0m"),
                    },
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    printer.abort();
    Ok(())
}

fn print_shell_help() {
    println!("Anything not starting with '/' is sent to the agents.");
    println!("  /agents  (agent status board)");
    println!("  /wallet  (balance and address)");
    println!("  /txs     (transaction feed)");
    println!("  /logs    (recent wallet API calls)");
    println!("  /help    (this message)");
    println!("  /quit    (leave the session)");
}
