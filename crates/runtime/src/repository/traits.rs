//! Repository contracts for sessions and their arrow sequences.

use archery_core::{ArrowRecord, LedgerDelta, SessionId};

use super::Result;
use super::types::Session;

/// Ordered arrow store keyed by `(session id, arrow number)`.
///
/// Implementations apply each delta atomically: either every row change
/// lands or none does.
pub trait ArrowRepository: Send + Sync {
    /// Arrows of a session ordered by arrow number.
    fn snapshot(&self, session: SessionId) -> Result<Vec<ArrowRecord>>;

    /// Applies deletes, then updates (keys must exist), then inserts (keys must not).
    fn apply(&self, session: SessionId, delta: &LedgerDelta) -> Result<()>;

    /// Highest arrow number stored for a session, 0 when empty.
    fn max_arrow_number(&self, session: SessionId) -> Result<u32> {
        Ok(self
            .snapshot(session)?
            .iter()
            .map(|record| record.arrow_number)
            .max()
            .unwrap_or(0))
    }

    /// Batch update of existing rows.
    fn update(&self, session: SessionId, records: &[ArrowRecord]) -> Result<()> {
        self.apply(
            session,
            &LedgerDelta {
                update: records.to_vec(),
                ..LedgerDelta::default()
            },
        )
    }

    /// Batch insert of new rows.
    fn insert(&self, session: SessionId, records: &[ArrowRecord]) -> Result<()> {
        self.apply(
            session,
            &LedgerDelta {
                insert: records.to_vec(),
                ..LedgerDelta::default()
            },
        )
    }

    /// Batch delete by arrow number.
    fn delete_numbers(&self, session: SessionId, numbers: &[u32]) -> Result<()> {
        self.apply(
            session,
            &LedgerDelta {
                delete: numbers.to_vec(),
                ..LedgerDelta::default()
            },
        )
    }
}

/// Session metadata store. Deleting a session deletes its arrows.
pub trait SessionRepository: Send + Sync {
    fn create_session(&self, session: &Session) -> Result<()>;

    fn session(&self, id: SessionId) -> Result<Option<Session>>;

    fn delete_session(&self, id: SessionId) -> Result<()>;

    /// All session ids in ascending order.
    fn list_sessions(&self) -> Result<Vec<SessionId>>;
}

/// A store holding both sessions and arrows.
pub trait ScoringStore: ArrowRepository + SessionRepository {}

impl<T> ScoringStore for T where T: ArrowRepository + SessionRepository {}
