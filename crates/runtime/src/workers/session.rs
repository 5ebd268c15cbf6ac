//! Session worker that owns the single write path into the scoring store.
//!
//! Receives commands from [`ScoringHandle`](crate::api::ScoringHandle),
//! applies ledger edits through [`SessionLedger`], and answers summary queries
//! against the shared [`OracleBundle`].

use std::sync::Arc;

use archery_core::{
    Arrow, ArrowRecord, RoundDefinition, SessionId, SessionSummary, end_size_limit,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::api::{Result, RuntimeError};
use crate::ledger::SessionLedger;
use crate::oracle::OracleBundle;
use crate::repository::{NewSession, ScoringStore, Session};

/// Commands that can be sent to the session worker.
pub enum Command {
    CreateSession {
        draft: NewSession,
        reply: oneshot::Sender<Result<Session>>,
    },
    AppendEnd {
        session: SessionId,
        arrows: Vec<Arrow>,
        reply: oneshot::Sender<Result<Vec<ArrowRecord>>>,
    },
    InsertEnd {
        session: SessionId,
        first_arrow_number: u32,
        arrows: Vec<Arrow>,
        reply: oneshot::Sender<Result<Vec<ArrowRecord>>>,
    },
    DeleteEnd {
        session: SessionId,
        first_arrow_number: u32,
        count: u32,
        reply: oneshot::Sender<Result<Vec<ArrowRecord>>>,
    },
    ReplaceEnd {
        session: SessionId,
        first_arrow_number: u32,
        size: usize,
        arrows: Vec<Arrow>,
        reply: oneshot::Sender<Result<Vec<ArrowRecord>>>,
    },
    Repair {
        session: SessionId,
        reply: oneshot::Sender<Result<Vec<ArrowRecord>>>,
    },
    /// Arrows of a session (read-only).
    Arrows {
        session: SessionId,
        reply: oneshot::Sender<Result<Vec<ArrowRecord>>>,
    },
    Summary {
        session: SessionId,
        reply: oneshot::Sender<Result<SessionSummary>>,
    },
    /// Arrows to enter for the next end, bounded by what is left at the
    /// current distance.
    NextEndSize {
        session: SessionId,
        reply: oneshot::Sender<Result<u32>>,
    },
    DeleteSession {
        session: SessionId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Stops the worker after replying.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Background task that serializes every session edit.
///
/// Store access runs on tokio's blocking pool; the worker awaits each command
/// before taking the next, so edits still apply one at a time.
pub struct SessionWorker<S> {
    ledger: Arc<SessionLedger<S>>,
    oracles: OracleBundle,
    command_rx: mpsc::Receiver<Command>,
}

impl<S: ScoringStore + 'static> SessionWorker<S> {
    pub fn new(
        ledger: SessionLedger<S>,
        oracles: OracleBundle,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        info!(
            "SessionWorker initialized with {} rounds, {} classification rows",
            oracles.rounds.len(),
            oracles.classifications.len()
        );

        Self {
            ledger: Arc::new(ledger),
            oracles,
            command_rx,
        }
    }

    /// Main worker loop. Ends on [`Command::Shutdown`] or when every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }
                else => break,
            }
        }
        info!("SessionWorker stopped");
    }

    /// Returns `false` once the worker should stop.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::CreateSession { draft, reply } => {
                let result = self.blocking(move |ledger| ledger.create_session(draft)).await;
                respond(reply, result, "CreateSession");
            }
            Command::AppendEnd {
                session,
                arrows,
                reply,
            } => {
                let result = self
                    .blocking(move |ledger| ledger.append_end(session, &arrows))
                    .await;
                respond(reply, result, "AppendEnd");
            }
            Command::InsertEnd {
                session,
                first_arrow_number,
                arrows,
                reply,
            } => {
                let result = self
                    .blocking(move |ledger| {
                        ledger.insert_end(session, first_arrow_number, &arrows)
                    })
                    .await;
                respond(reply, result, "InsertEnd");
            }
            Command::DeleteEnd {
                session,
                first_arrow_number,
                count,
                reply,
            } => {
                let result = self
                    .blocking(move |ledger| ledger.delete_end(session, first_arrow_number, count))
                    .await;
                respond(reply, result, "DeleteEnd");
            }
            Command::ReplaceEnd {
                session,
                first_arrow_number,
                size,
                arrows,
                reply,
            } => {
                let result = self
                    .blocking(move |ledger| {
                        ledger.replace_end(session, first_arrow_number, size, &arrows)
                    })
                    .await;
                respond(reply, result, "ReplaceEnd");
            }
            Command::Repair { session, reply } => {
                let result = self.blocking(move |ledger| ledger.repair(session)).await;
                respond(reply, result, "Repair");
            }
            Command::Arrows { session, reply } => {
                let result = self.blocking(move |ledger| ledger.arrows(session)).await;
                respond(reply, result, "Arrows");
            }
            Command::Summary { session, reply } => {
                let oracles = self.oracles.clone();
                let result = self
                    .blocking(move |ledger| summary(ledger, &oracles, session))
                    .await;
                respond(reply, result, "Summary");
            }
            Command::NextEndSize { session, reply } => {
                let oracles = self.oracles.clone();
                let result = self
                    .blocking(move |ledger| next_end_size(ledger, &oracles, session))
                    .await;
                respond(reply, result, "NextEndSize");
            }
            Command::DeleteSession { session, reply } => {
                let result = self
                    .blocking(move |ledger| ledger.delete_session(session))
                    .await;
                respond(reply, result, "DeleteSession");
            }
            Command::Shutdown { reply } => {
                if reply.send(()).is_err() {
                    debug!("Shutdown reply channel closed (caller dropped)");
                }
                return false;
            }
        }
        true
    }

    /// Runs a store operation on the blocking pool and waits for it.
    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SessionLedger<S>) -> Result<T> + Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        tokio::task::spawn_blocking(move || op(&ledger))
            .await
            .map_err(RuntimeError::WorkerJoin)?
    }
}

fn round_of<'a>(
    oracles: &'a OracleBundle,
    session: &Session,
) -> Result<Option<&'a RoundDefinition>> {
    match session.round_id {
        None => Ok(None),
        Some(round_id) => oracles
            .round(round_id)
            .map(Some)
            .ok_or(RuntimeError::UnknownRound {
                session: session.id,
                round_id,
            }),
    }
}

fn summary<S: ScoringStore>(
    ledger: &SessionLedger<S>,
    oracles: &OracleBundle,
    id: SessionId,
) -> Result<SessionSummary> {
    let session = ledger.session(id)?;
    let round = round_of(oracles, &session)?;
    let arrows: Vec<Arrow> = ledger
        .arrows(id)?
        .into_iter()
        .map(|record| record.arrow)
        .collect();

    let context = oracles.summary_context(&session, round);
    Ok(SessionSummary::compute(&arrows, &context))
}

fn next_end_size<S: ScoringStore>(
    ledger: &SessionLedger<S>,
    oracles: &OracleBundle,
    id: SessionId,
) -> Result<u32> {
    let session = ledger.session(id)?;
    let round = round_of(oracles, &session)?;
    let shot = ledger.arrows(id)?.len() as u32;
    let preferred = oracles.config.end_size_for(round);
    Ok(end_size_limit(round, session.sub_type_id, shot, preferred))
}

fn respond<T>(reply: oneshot::Sender<Result<T>>, result: Result<T>, command: &str) {
    if let Err(err) = &result {
        debug!("{command} failed: {err}");
    }
    if reply.send(result).is_err() {
        debug!("{command} reply channel closed (caller dropped)");
    }
}
