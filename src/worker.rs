//! Background worker delivering leads to the configured sink.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::Config,
    lead::LeadRecord,
    sink::{self, LeadSink},
};

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Deliver a validated lead.
    Submit(LeadRecord),
    /// Apply updated settings (rebuilds the sink).
    SaveSettings(Config),
}

/// Events emitted by the worker for UI updates.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// Lead delivered; `destination` says where.
    Submitted { lead_id: Uuid, destination: String },
    /// Lead could not be delivered.
    SubmitFailed { lead_id: Uuid, error: String },
    /// Informational log message.
    Log(String),
    /// User-visible error message.
    Error(String),
}

/// Main worker loop: handle commands sequentially until the UI hangs up.
pub async fn run(mut rx: mpsc::Receiver<WorkerCmd>, tx: mpsc::Sender<WorkerEvent>, cfg: Config) {
    tracing::info!("worker started");
    let mut sink = build_sink(&cfg, &tx).await;

    while let Some(cmd) = rx.recv().await {
        match cmd {
            WorkerCmd::SaveSettings(new_cfg) => {
                tracing::info!("settings updated");
                sink = build_sink(&new_cfg, &tx).await;
                let _ = tx.send(WorkerEvent::Log("settings updated".into())).await;
            }

            WorkerCmd::Submit(lead) => {
                let lead_id = lead.id;
                tracing::info!("submit lead start: {lead_id}");
                let Some(s) = sink.as_ref() else {
                    let _ = tx
                        .send(WorkerEvent::SubmitFailed {
                            lead_id,
                            error: "submission target is not configured".into(),
                        })
                        .await;
                    continue;
                };

                match s.submit(&lead).await {
                    Ok(destination) => {
                        tracing::info!("submit lead done: {lead_id} -> {destination}");
                        let _ = tx
                            .send(WorkerEvent::Submitted {
                                lead_id,
                                destination,
                            })
                            .await;
                    }
                    Err(e) => {
                        tracing::error!("submit lead failed: {lead_id}: {e:#}");
                        let _ = tx
                            .send(WorkerEvent::SubmitFailed {
                                lead_id,
                                error: format!("{e:#}"),
                            })
                            .await;
                    }
                }
            }
        }
    }
    tracing::info!("worker stopped");
}

/// Build the sink, reporting failures to the UI instead of stopping the worker.
async fn build_sink(cfg: &Config, tx: &mpsc::Sender<WorkerEvent>) -> Option<Box<dyn LeadSink>> {
    match sink::from_config(&cfg.submission) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!("sink init failed: {e}");
            let _ = tx
                .send(WorkerEvent::Error(format!("sink init failed: {e}")))
                .await;
            None
        }
    }
}
