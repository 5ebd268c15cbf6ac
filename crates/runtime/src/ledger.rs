//! Applies ledger edits to a store as one read-compute-apply unit.
//!
//! [`archery_core::ledger`] computes deltas from a snapshot but never touches
//! storage. `SessionLedger` supplies the missing half: it holds a per-session
//! lock across the snapshot read and the delta write, and re-checks the last
//! arrow number before writing so a delta is never applied to a snapshot it
//! was not computed from.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use archery_core::{Arrow, ArrowRecord, LedgerDelta, LedgerError, SessionId, ledger};
use tracing::debug;

use crate::api::{Result, RuntimeError};
use crate::repository::{NewSession, RepositoryError, ScoringStore, Session};

/// Per-session single-writer over a [`ScoringStore`].
pub struct SessionLedger<S> {
    store: Arc<S>,
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl<S: ScoringStore> SessionLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Creates a session with the next free id.
    pub fn create_session(&self, draft: NewSession) -> Result<Session> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let next = self
            .store
            .list_sessions()?
            .last()
            .map_or(1, |last| last.0 + 1);
        let session = draft.into_session(SessionId(next));
        self.store.create_session(&session)?;
        locks.insert(session.id, Arc::new(Mutex::new(())));

        debug!("Created {} for round {:?}", session.id, session.round_id);
        Ok(session)
    }

    pub fn session(&self, id: SessionId) -> Result<Session> {
        self.store
            .session(id)?
            .ok_or(RuntimeError::Repository(RepositoryError::UnknownSession(id)))
    }

    /// Arrows of a session in shooting order.
    pub fn arrows(&self, id: SessionId) -> Result<Vec<ArrowRecord>> {
        Ok(self.store.snapshot(id)?)
    }

    pub fn append_end(&self, id: SessionId, arrows: &[Arrow]) -> Result<Vec<ArrowRecord>> {
        self.commit(id, "append", |current| {
            ledger::append_end(current, id, arrows)
        })
    }

    pub fn insert_end(
        &self,
        id: SessionId,
        first_arrow_number: u32,
        arrows: &[Arrow],
    ) -> Result<Vec<ArrowRecord>> {
        self.commit(id, "insert", |current| {
            ledger::insert_end(current, first_arrow_number, arrows)
        })
    }

    pub fn delete_end(
        &self,
        id: SessionId,
        first_arrow_number: u32,
        count: u32,
    ) -> Result<Vec<ArrowRecord>> {
        self.commit(id, "delete", |current| {
            ledger::delete_end(current, first_arrow_number, count)
        })
    }

    pub fn replace_end(
        &self,
        id: SessionId,
        first_arrow_number: u32,
        size: usize,
        arrows: &[Arrow],
    ) -> Result<Vec<ArrowRecord>> {
        self.commit(id, "replace", |current| {
            ledger::replace_end(current, first_arrow_number, size, arrows)
        })
    }

    /// Closes gaps left in a store by an interrupted or foreign writer.
    pub fn repair(&self, id: SessionId) -> Result<Vec<ArrowRecord>> {
        self.commit(id, "repair", ledger::renumber)
    }

    pub fn delete_session(&self, id: SessionId) -> Result<()> {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        self.store.delete_session(id)?;

        self.locks
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .remove(&id);
        debug!("Deleted {}", id);
        Ok(())
    }

    fn lock_for(&self, id: SessionId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    fn commit<F>(&self, id: SessionId, op: &'static str, compute: F) -> Result<Vec<ArrowRecord>>
    where
        F: FnOnce(&[ArrowRecord]) -> std::result::Result<LedgerDelta, LedgerError>,
    {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock().map_err(|_| RepositoryError::LockPoisoned)?;

        let snapshot = self.store.snapshot(id)?;
        let delta = compute(&snapshot)?;

        let expected = last_arrow_number(&snapshot);
        let found = self.store.max_arrow_number(id)?;
        if found != expected {
            return Err(RuntimeError::StaleSnapshot {
                session: id,
                expected,
                found,
            });
        }

        if !delta.is_empty() {
            self.store.apply(id, &delta)?;
        }
        debug!(
            "{op} on {id}: {} updated, {} inserted, {} deleted",
            delta.update.len(),
            delta.insert.len(),
            delta.delete.len()
        );
        Ok(delta.apply(&snapshot))
    }
}

fn last_arrow_number(snapshot: &[ArrowRecord]) -> u32 {
    snapshot
        .iter()
        .map(|record| record.arrow_number)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ArrowRepository, InMemoryScoringStore};

    fn arrows(scores: &[u8]) -> Vec<Arrow> {
        scores.iter().map(|s| Arrow::new(*s, false).unwrap()).collect()
    }

    fn scores(records: &[ArrowRecord]) -> Vec<u8> {
        records.iter().map(|r| r.arrow.score()).collect()
    }

    fn ledger() -> (SessionLedger<InMemoryScoringStore>, SessionId) {
        let ledger = SessionLedger::new(Arc::new(InMemoryScoringStore::new()));
        let session = ledger.create_session(NewSession::default()).unwrap();
        (ledger, session.id)
    }

    #[test]
    fn session_ids_are_sequential() {
        let (ledger, first) = ledger();
        let second = ledger.create_session(NewSession::default()).unwrap();
        assert_eq!(first, SessionId(1));
        assert_eq!(second.id, SessionId(2));
    }

    #[test]
    fn edits_round_trip_through_the_store() {
        let (ledger, id) = ledger();
        ledger.append_end(id, &arrows(&[9, 9, 9])).unwrap();
        ledger.append_end(id, &arrows(&[7, 7, 7])).unwrap();

        let after_insert = ledger.insert_end(id, 4, &arrows(&[5, 5, 5])).unwrap();
        assert_eq!(scores(&after_insert), [9, 9, 9, 5, 5, 5, 7, 7, 7]);

        let after_delete = ledger.delete_end(id, 1, 3).unwrap();
        assert_eq!(scores(&after_delete), [5, 5, 5, 7, 7, 7]);

        ledger.replace_end(id, 4, 3, &arrows(&[10, 10, 10])).unwrap();
        assert_eq!(scores(&ledger.arrows(id).unwrap()), [5, 5, 5, 10, 10, 10]);
    }

    #[test]
    fn ledger_errors_leave_the_store_unchanged() {
        let (ledger, id) = ledger();
        ledger.append_end(id, &arrows(&[8, 8, 8])).unwrap();

        let err = ledger.delete_end(id, 4, 1).unwrap_err();
        assert!(matches!(err, RuntimeError::Ledger(LedgerError::NoSuchArrow(4))));
        assert_eq!(ledger.arrows(id).unwrap().len(), 3);
    }

    #[test]
    fn repair_closes_gaps() {
        let (ledger, id) = ledger();
        ledger
            .store()
            .insert(
                id,
                &[
                    ArrowRecord::new(id, 1, Arrow::x()),
                    ArrowRecord::new(id, 4, Arrow::miss()),
                ],
            )
            .unwrap();

        let repaired = ledger.repair(id).unwrap();
        let numbers: Vec<u32> = repaired.iter().map(|r| r.arrow_number).collect();
        assert_eq!(numbers, [1, 2]);
        assert_eq!(ledger.arrows(id).unwrap(), repaired);
    }

    #[test]
    fn unknown_session_is_reported() {
        let (ledger, _) = ledger();
        let err = ledger.append_end(SessionId(99), &arrows(&[1])).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Repository(RepositoryError::UnknownSession(SessionId(99)))
        ));
    }
}
