mod commands;
mod engine;
mod render;
mod state;

use crate::commands::Flow;
use crate::state::AppState;
use anyhow::Result;
use finconsole_core::autofill::GeminiAutoFill;
use finconsole_core::config::{Backend, ConsoleConfig};
use finconsole_core::execution::{ExecutionPort, HttpExecutor, MockExecutor};
use finconsole_core::pages::PageCatalog;
use finconsole_core::secrets::EnvSecretStore;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ConsoleConfig::from_env()?;

    let mut catalog = PageCatalog::builtin();
    if let Some(dir) = &config.pages_dir {
        let loaded = catalog.load_from_directory(dir)?;
        tracing::info!(count = loaded, "Loaded custom pages");
    }

    let executor: Arc<dyn ExecutionPort> = match config.backend {
        Backend::Mock => Arc::new(MockExecutor::new(config.mock.clone())),
        Backend::Http => Arc::new(HttpExecutor::new(config.base_urls.clone())?),
    };
    tracing::info!(backend = executor.name(), env = %config.environment, "Execution backend ready");

    let autofill = GeminiAutoFill::from_secrets(&EnvSecretStore, &config.ai).await?;
    if !autofill.has_credential() {
        tracing::warn!("No AI credential configured; auto-fill will leave fields unchanged");
    }

    let (engine_tx, engine_rx) = mpsc::channel(32);
    let (events_tx, mut events_rx) = mpsc::channel(32);
    engine::spawn_engine(engine_rx, events_tx, executor, Arc::new(autofill));

    let mut state = AppState::new(catalog, &config)?;
    println!("Financial process debug console. Type `help` for commands.");
    println!("{}", render::page(&state.session));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match commands::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match commands::dispatch(&mut state, command, &engine_tx).await {
                    Ok(Flow::Continue(out)) => println!("{}", out),
                    Ok(Flow::Quit) => break,
                    Err(e) => println!("error: {}", e),
                }
            }
            Some(event) = events_rx.recv() => {
                println!("\n{}", state.apply_event(event));
            }
        }
    }

    Ok(())
}
