//! Deterministic archery scoring logic shared by the runtime and tools.
//!
//! `archery-core` holds the reference-data model ([`round`]), the arrow
//! ledger that keeps a session's arrow numbering dense ([`ledger`]), the
//! handicap and classification engines, and score-sheet aggregation. Every
//! API here is a pure function over immutable inputs; persistence, loading
//! and logging live in `archery-content` and `runtime`.
pub mod aggregate;
pub mod arrow;
pub mod classification;
pub mod config;
pub mod error;
pub mod handicap;
pub mod ledger;
pub mod round;
pub mod summary;

pub use aggregate::{
    EndRow, GoldsType, ScoreAggregator, ScoreSheet, Section, SectionKind, Totals,
};
pub use arrow::{Arrow, ArrowRecord, SessionId};
pub use classification::{
    AgeCategory, ArcherProfile, Bowstyle, BowstyleParams, ClassHandicaps, Classification,
    ClassificationError, ClassificationResult, ClassificationTable, Gender, Thresholds,
};
pub use config::ScoringConfig;
pub use error::{ErrorSeverity, MissingData, ScoringError};
pub use handicap::{
    HandicapEntry, HandicapOptions, HandicapSystem, HandicapTable, MIN_HANDICAP, TableEntry,
    TableTarget, handicap_for_score, score_for_handicap,
};
pub use ledger::{
    LedgerDelta, LedgerError, RemainingAtDistance, append_end, check_dense, delete_end,
    end_size_limit, insert_end, remaining_arrows, renumber, replace_end,
};
pub use round::{
    DistanceArrowCount, DistanceUnit, Face, Pass, RoundCatalog, RoundDefinition, RoundDistance,
    SubType, ValidationError, ValidationRule, normalize_name,
};
pub use summary::{SessionSummary, SummaryContext};
