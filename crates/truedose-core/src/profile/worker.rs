//! Background delivery of session results.
//!
//! The engine only ever pushes onto an unbounded channel, which never
//! blocks. A tokio task drains the channel and writes each result through
//! the [`ProfileSync`] store on the blocking pool. Failures are logged and
//! collected in the [`SyncReport`] returned when the channel closes.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{ProfileSync, ResultSink, SessionResult};
use crate::error::SyncError;

/// Sending half handed to the engine.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionResult>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<SessionResult>) -> Self {
        Self { tx }
    }
}

impl ResultSink for ChannelSink {
    fn submit(&self, result: SessionResult) -> Result<(), SyncError> {
        self.tx.send(result).map_err(|_| SyncError::ChannelClosed)
    }
}

/// What the worker managed to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub delivered: usize,
    pub failed: Vec<(Uuid, SyncError)>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Start the worker on the current tokio runtime.
///
/// The worker runs until every [`ChannelSink`] clone has been dropped.
pub fn spawn_profile_sync(store: Arc<dyn ProfileSync>) -> (ChannelSink, JoinHandle<SyncReport>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run(store, rx));
    (ChannelSink::new(tx), handle)
}

async fn run(
    store: Arc<dyn ProfileSync>,
    mut rx: mpsc::UnboundedReceiver<SessionResult>,
) -> SyncReport {
    let mut report = SyncReport::default();

    while let Some(result) = rx.recv().await {
        let session_id = result.session_id;
        let store = Arc::clone(&store);
        let outcome = tokio::task::spawn_blocking(move || store.record_result(&result))
            .await
            .unwrap_or_else(|e| Err(SyncError::Store(e.to_string())));

        match outcome {
            Ok(()) => {
                tracing::info!(%session_id, "session result stored");
                report.delivered += 1;
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "failed to store session result");
                report.failed.push((session_id, e));
            }
        }
    }

    report
}
