//! Error types raised by repository implementations.

use archery_core::SessionId;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("scoring store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("unknown {0}")]
    UnknownSession(SessionId),

    #[error("{0} already exists")]
    SessionExists(SessionId),

    #[error("{session} has no arrow {arrow_number} to update")]
    MissingArrow {
        session: SessionId,
        arrow_number: u32,
    },

    #[error("{session} already has arrow {arrow_number}")]
    DuplicateArrow {
        session: SessionId,
        arrow_number: u32,
    },

    #[error("record for {found} written to {session}")]
    ForeignRecord { session: SessionId, found: SessionId },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
