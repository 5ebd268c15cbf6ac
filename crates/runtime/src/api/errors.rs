//! Unified error types surfaced by the runtime API.
//!
//! Wraps ledger precondition failures, repository failures and worker
//! coordination errors so clients can bubble them up with consistent context.
use archery_core::{ErrorSeverity, LedgerError, ScoringError, SessionId};
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{session} changed while editing: expected last arrow {expected}, found {found}")]
    StaleSnapshot {
        session: SessionId,
        expected: u32,
        found: u32,
    },

    #[error("{session} references unknown round {round_id}")]
    UnknownRound { session: SessionId, round_id: u32 },

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker task failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    /// Severity of the underlying failure.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Ledger(err) => err.severity(),
            Self::StaleSnapshot { .. } => ErrorSeverity::Recoverable,
            Self::UnknownRound { .. } => ErrorSeverity::Validation,
            Self::Repository(RepositoryError::UnknownSession(_))
            | Self::Repository(RepositoryError::SessionExists(_)) => ErrorSeverity::Validation,
            Self::Repository(_) => ErrorSeverity::Internal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
        }
    }
}
