use finconsole_core::autofill::{AutoFill, Suggestion};
use finconsole_core::execution::{ExecutionPort, ExecutionRecord};
use finconsole_core::session::{PendingSubmission, PendingSuggestion};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub enum EngineCommand {
    Execute(PendingSubmission),
    Suggest(PendingSuggestion),
}

pub enum EngineEvent {
    Executed(PendingSubmission, ExecutionRecord),
    Suggested(PendingSuggestion, Suggestion),
}

/// Runs every request on its own task; results come back in completion order.
pub fn spawn_engine(
    mut engine_rx: mpsc::Receiver<EngineCommand>,
    events_tx: mpsc::Sender<EngineEvent>,
    executor: Arc<dyn ExecutionPort>,
    autofill: Arc<dyn AutoFill>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(cmd) = engine_rx.recv().await {
            let tx = events_tx.clone();
            match cmd {
                EngineCommand::Execute(pending) => {
                    let executor = executor.clone();
                    tokio::spawn(async move {
                        let record = executor.execute(pending.request.clone()).await;
                        let _ = tx.send(EngineEvent::Executed(pending, record)).await;
                    });
                }
                EngineCommand::Suggest(pending) => {
                    let autofill = autofill.clone();
                    tokio::spawn(async move {
                        let suggestion = autofill.suggest(&pending.fields).await;
                        let _ = tx.send(EngineEvent::Suggested(pending, suggestion)).await;
                    });
                }
            }
        }
        tracing::debug!("Engine channel closed");
    })
}
