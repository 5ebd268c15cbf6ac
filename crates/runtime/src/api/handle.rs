//! Cloneable façade for issuing commands to the runtime.
//!
//! [`ScoringHandle`] hides channel plumbing and offers async helpers for
//! editing a session's arrows and reading its statistics.
use tokio::sync::{mpsc, oneshot};

use archery_core::{Arrow, ArrowRecord, SessionId, SessionSummary};

use super::errors::{Result, RuntimeError};
use crate::repository::{NewSession, Session};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct ScoringHandle {
    command_tx: mpsc::Sender<Command>,
}

impl ScoringHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub async fn create_session(&self, draft: NewSession) -> Result<Session> {
        self.request(|reply| Command::CreateSession { draft, reply })
            .await
    }

    /// Appends an end; returns the session's arrows afterwards.
    pub async fn append_end(
        &self,
        session: SessionId,
        arrows: Vec<Arrow>,
    ) -> Result<Vec<ArrowRecord>> {
        self.request(|reply| Command::AppendEnd {
            session,
            arrows,
            reply,
        })
        .await
    }

    /// Inserts an end so its first arrow becomes `first_arrow_number`.
    pub async fn insert_end(
        &self,
        session: SessionId,
        first_arrow_number: u32,
        arrows: Vec<Arrow>,
    ) -> Result<Vec<ArrowRecord>> {
        self.request(|reply| Command::InsertEnd {
            session,
            first_arrow_number,
            arrows,
            reply,
        })
        .await
    }

    pub async fn delete_end(
        &self,
        session: SessionId,
        first_arrow_number: u32,
        count: u32,
    ) -> Result<Vec<ArrowRecord>> {
        self.request(|reply| Command::DeleteEnd {
            session,
            first_arrow_number,
            count,
            reply,
        })
        .await
    }

    pub async fn replace_end(
        &self,
        session: SessionId,
        first_arrow_number: u32,
        size: usize,
        arrows: Vec<Arrow>,
    ) -> Result<Vec<ArrowRecord>> {
        self.request(|reply| Command::ReplaceEnd {
            session,
            first_arrow_number,
            size,
            arrows,
            reply,
        })
        .await
    }

    /// Renumbers a session whose stored numbering has gaps.
    pub async fn repair(&self, session: SessionId) -> Result<Vec<ArrowRecord>> {
        self.request(|reply| Command::Repair { session, reply })
            .await
    }

    pub async fn arrows(&self, session: SessionId) -> Result<Vec<ArrowRecord>> {
        self.request(|reply| Command::Arrows { session, reply })
            .await
    }

    /// Score sheet plus handicap and classification once the round is complete.
    pub async fn summary(&self, session: SessionId) -> Result<SessionSummary> {
        self.request(|reply| Command::Summary { session, reply })
            .await
    }

    /// Size of the next end, 0 once the round is complete.
    pub async fn next_end_size(&self, session: SessionId) -> Result<u32> {
        self.request(|reply| Command::NextEndSize { session, reply })
            .await
    }

    pub async fn delete_session(&self, session: SessionId) -> Result<()> {
        self.request(|reply| Command::DeleteSession { session, reply })
            .await
    }

    /// Asks the worker to stop. Later requests fail with
    /// [`RuntimeError::CommandChannelClosed`].
    pub async fn shutdown(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
