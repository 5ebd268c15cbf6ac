//! Ledger precondition failures.
//!
//! Every variant is an invalid-range failure: the requested edit does not fit
//! the snapshot it was computed against. Nothing is partially applied.

use crate::arrow::SessionId;
use crate::error::{ErrorSeverity, ScoringError};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No arrows were supplied for an end.
    #[error("no arrows supplied")]
    EmptyArrows,

    /// An operation that edits existing arrows was given an empty snapshot.
    #[error("session has no arrows to edit")]
    EmptySnapshot,

    /// The snapshot contains records from more than one session.
    #[error("snapshot mixes {expected} and {found}")]
    MixedSessions {
        expected: SessionId,
        found: SessionId,
    },

    /// Insert position outside `[1, max_arrow_number]`.
    #[error("arrow number {first} is outside 1..={max}")]
    StartOutOfRange { first: u32, max: u32 },

    /// No record carries the arrow number an edit starts from.
    #[error("no arrow numbered {0}")]
    NoSuchArrow(u32),

    /// A delete of zero arrows was requested.
    #[error("delete count must be positive")]
    ZeroCount,

    /// The replacement end does not have the declared size.
    #[error("end size {expected} does not match {actual} supplied arrows")]
    EndSizeMismatch { expected: usize, actual: usize },

    /// No end of the requested size exists at the offset.
    #[error("no end of {size} arrows starting at {first}")]
    EndNotFound { first: u32, size: usize },

    /// The snapshot is not numbered `1..=N` without gaps or duplicates.
    #[error("snapshot numbering is not dense at arrow {at}")]
    NonContiguousSnapshot { at: u32 },

    /// Arrow value outside the scoring range.
    #[error("invalid arrow: score {score}, x {is_x}")]
    InvalidArrow { score: u8, is_x: bool },

    /// Arrow text could not be parsed.
    #[error("cannot parse arrow '{0}'")]
    UnparsableArrow(String),
}

impl ScoringError for LedgerError {
    fn severity(&self) -> ErrorSeverity {
        use LedgerError::*;
        match self {
            MixedSessions { .. } | NonContiguousSnapshot { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use LedgerError::*;
        match self {
            EmptyArrows => "LEDGER_EMPTY_ARROWS",
            EmptySnapshot => "LEDGER_EMPTY_SNAPSHOT",
            MixedSessions { .. } => "LEDGER_MIXED_SESSIONS",
            StartOutOfRange { .. } => "LEDGER_START_OUT_OF_RANGE",
            NoSuchArrow(_) => "LEDGER_NO_SUCH_ARROW",
            ZeroCount => "LEDGER_ZERO_COUNT",
            EndSizeMismatch { .. } => "LEDGER_END_SIZE_MISMATCH",
            EndNotFound { .. } => "LEDGER_END_NOT_FOUND",
            NonContiguousSnapshot { .. } => "LEDGER_NON_CONTIGUOUS",
            InvalidArrow { .. } => "LEDGER_INVALID_ARROW",
            UnparsableArrow(_) => "LEDGER_UNPARSABLE_ARROW",
        }
    }
}
