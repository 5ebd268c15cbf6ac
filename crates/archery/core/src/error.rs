//! Common error infrastructure for archery-core.
//!
//! Domain-specific errors ([`crate::ledger::LedgerError`],
//! [`crate::round::ValidationError`]) live next to the operations that raise
//! them. This module holds the shared classification used by callers to
//! decide how to react to a failure.
//!
//! Absent reference data is deliberately *not* an error here: handicap and
//! classification lookups return `None` and [`MissingData`] only describes why.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed later.
    Recoverable,

    /// Invalid input; the request must change before it can succeed.
    ///
    /// Examples: malformed arrow-number range, inconsistent round definition
    Validation,

    /// Unexpected inconsistency in data the caller handed over.
    ///
    /// Examples: snapshot with gaps in its numbering
    Internal,

    /// Unrecoverable failure.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates corrupted input or a bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common interface implemented by every error type in archery-core.
pub trait ScoringError: std::error::Error {
    /// Severity used by callers to choose a recovery strategy.
    fn severity(&self) -> ErrorSeverity;

    /// Stable machine-readable code, suitable for logs and UI message lookup.
    fn error_code(&self) -> &'static str;
}

/// Reason a handicap or classification figure could not be produced.
///
/// Returned alongside (or instead of) an absent value when the round shape is
/// incomplete. This is an expected transient state, not a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissingData {
    /// The round has no arrow counts.
    ArrowCounts,
    /// The requested sub-type resolves to no distances.
    Distances,
    /// A face list was supplied whose length fits neither the round nor a single face.
    Faces,
    /// No classification thresholds are known for the round/archer combination.
    Thresholds,
}

impl MissingData {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ArrowCounts => "round has no arrow counts",
            Self::Distances => "sub-type has no distances",
            Self::Faces => "face list does not match the round's distances",
            Self::Thresholds => "no classification thresholds for this archer",
        }
    }
}

impl core::fmt::Display for MissingData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
