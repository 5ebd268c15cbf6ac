//! High-level runtime orchestrator.
//!
//! The runtime owns the session worker, wires up the command channel, and
//! hands out [`ScoringHandle`]s for clients to drive scoring sessions.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{Result, RuntimeError, ScoringHandle};
use crate::ledger::SessionLedger;
use crate::oracle::OracleBundle;
use crate::repository::ScoringStore;
use crate::workers::{Command, SessionWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that serializes scoring edits.
///
/// [`ScoringHandle`] provides a cloneable façade for clients.
pub struct ScoringRuntime {
    handle: ScoringHandle,
    worker_handle: JoinHandle<()>,
}

impl ScoringRuntime {
    /// Spawns the session worker over `store`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S>(store: Arc<S>, oracles: OracleBundle, config: RuntimeConfig) -> Self
    where
        S: ScoringStore + 'static,
    {
        let (command_tx, command_rx) =
            mpsc::channel::<Command>(config.command_buffer_size.max(1));
        let handle = ScoringHandle::new(command_tx);

        let worker = SessionWorker::new(SessionLedger::new(store), oracles, command_rx);
        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Self {
            handle,
            worker_handle,
        }
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> ScoringHandle {
        self.handle.clone()
    }

    /// Stops the worker and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        match self.handle.shutdown().await {
            Ok(()) | Err(RuntimeError::CommandChannelClosed) => {}
            Err(err) => return Err(err),
        }
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;
        Ok(())
    }
}
