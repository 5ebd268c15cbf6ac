//! In-memory scoring store.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use archery_core::{ArrowRecord, LedgerDelta, SessionId};

use super::{
    ArrowRepository, RepositoryError, Result, Session, SessionRepository, apply_delta,
};

struct SessionEntry {
    session: Session,
    arrows: BTreeMap<u32, ArrowRecord>,
}

/// In-memory store for testing and short-lived sessions.
///
/// Thread-safe but not persistent across process restarts.
pub struct InMemoryScoringStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl InMemoryScoringStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryScoringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrowRepository for InMemoryScoringStore {
    fn snapshot(&self, session: SessionId) -> Result<Vec<ArrowRecord>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        sessions
            .get(&session)
            .map(|entry| entry.arrows.values().copied().collect())
            .ok_or(RepositoryError::UnknownSession(session))
    }

    fn apply(&self, session: SessionId, delta: &LedgerDelta) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let entry = sessions
            .get_mut(&session)
            .ok_or(RepositoryError::UnknownSession(session))?;
        entry.arrows = apply_delta(&entry.arrows, session, delta)?;
        Ok(())
    }

    fn max_arrow_number(&self, session: SessionId) -> Result<u32> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        sessions
            .get(&session)
            .map(|entry| entry.arrows.keys().next_back().copied().unwrap_or(0))
            .ok_or(RepositoryError::UnknownSession(session))
    }
}

impl SessionRepository for InMemoryScoringStore {
    fn create_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        if sessions.contains_key(&session.id) {
            return Err(RepositoryError::SessionExists(session.id));
        }
        sessions.insert(
            session.id,
            SessionEntry {
                session: session.clone(),
                arrows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn session(&self, id: SessionId) -> Result<Option<Session>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(sessions.get(&id).map(|entry| entry.session.clone()))
    }

    fn delete_session(&self, id: SessionId) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        sessions.remove(&id);
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut ids: Vec<SessionId> = sessions.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::NewSession;
    use archery_core::Arrow;

    #[test]
    fn failed_delta_leaves_rows_untouched() {
        let store = InMemoryScoringStore::new();
        let id = SessionId(1);
        store
            .create_session(&NewSession::default().into_session(id))
            .unwrap();
        store
            .insert(id, &[ArrowRecord::new(id, 1, Arrow::miss())])
            .unwrap();

        let delta = LedgerDelta {
            update: vec![ArrowRecord::new(id, 1, Arrow::x())],
            insert: vec![ArrowRecord::new(id, 1, Arrow::x())],
            ..LedgerDelta::default()
        };
        assert!(store.apply(id, &delta).is_err());
        assert_eq!(
            store.snapshot(id).unwrap(),
            vec![ArrowRecord::new(id, 1, Arrow::miss())]
        );
    }

    #[test]
    fn deleting_a_session_removes_its_arrows() {
        let store = InMemoryScoringStore::new();
        let id = SessionId(3);
        store
            .create_session(&NewSession::default().into_session(id))
            .unwrap();
        store
            .insert(id, &[ArrowRecord::new(id, 1, Arrow::x())])
            .unwrap();

        store.delete_session(id).unwrap();
        assert!(store.session(id).unwrap().is_none());
        assert!(matches!(
            store.snapshot(id),
            Err(RepositoryError::UnknownSession(_))
        ));
    }

    #[test]
    fn duplicate_session_is_rejected() {
        let store = InMemoryScoringStore::new();
        let session = NewSession::default().into_session(SessionId(1));
        store.create_session(&session).unwrap();
        assert!(matches!(
            store.create_session(&session),
            Err(RepositoryError::SessionExists(SessionId(1)))
        ));
    }
}
