//! File-based scoring store: one JSON document per session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use archery_core::{ArrowRecord, LedgerDelta, SessionId};
use serde::{Deserialize, Serialize};

use super::{
    ArrowRepository, RepositoryError, Result, Session, SessionRepository, apply_delta,
};

#[derive(Serialize, Deserialize)]
struct SessionFile {
    session: Session,
    #[serde(default)]
    arrows: Vec<ArrowRecord>,
}

/// Stores each session and its arrows in `session_<id>.json`.
///
/// Writes go to a temp file that is then renamed over the old document, so a
/// delta is either fully persisted or not at all.
pub struct FileScoringStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileScoringStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Opens the store under the platform data directory.
    ///
    /// - Linux: `~/.local/share/archery/sessions`
    /// - macOS: `~/Library/Application Support/archery/sessions`
    /// - Fallback: `./archery_data/sessions`
    pub fn in_data_dir() -> Result<Self> {
        let dir = directories::ProjectDirs::from("", "", "archery")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./archery_data"));
        Self::new(dir.join("sessions"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn session_path(&self, id: SessionId) -> PathBuf {
        self.base_dir.join(format!("session_{}.json", id.0))
    }

    fn read(&self, id: SessionId) -> Result<Option<SessionFile>> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let file: SessionFile =
            serde_json::from_str(&json).map_err(|e| RepositoryError::Json(e.to_string()))?;
        if file.session.id != id {
            return Err(RepositoryError::CorruptedData(format!(
                "{} holds {}",
                path.display(),
                file.session.id
            )));
        }
        Ok(Some(file))
    }

    fn write(&self, file: &SessionFile) -> Result<()> {
        let path = self.session_path(file.session.id);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(file)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(
            "Saved {} with {} arrows: {}",
            file.session.id,
            file.arrows.len(),
            path.display()
        );
        Ok(())
    }
}

impl ArrowRepository for FileScoringStore {
    fn snapshot(&self, session: SessionId) -> Result<Vec<ArrowRecord>> {
        let file = self
            .read(session)?
            .ok_or(RepositoryError::UnknownSession(session))?;

        let mut arrows = file.arrows;
        arrows.sort_by_key(|record| record.arrow_number);
        Ok(arrows)
    }

    fn apply(&self, session: SessionId, delta: &LedgerDelta) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut file = self
            .read(session)?
            .ok_or(RepositoryError::UnknownSession(session))?;

        let mut rows = BTreeMap::new();
        for record in file.arrows {
            if rows.insert(record.arrow_number, record).is_some() {
                return Err(RepositoryError::CorruptedData(format!(
                    "{session} stores arrow {} twice",
                    record.arrow_number
                )));
            }
        }
        file.arrows = apply_delta(&rows, session, delta)?.into_values().collect();
        self.write(&file)
    }
}

impl SessionRepository for FileScoringStore {
    fn create_session(&self, session: &Session) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        if self.session_path(session.id).exists() {
            return Err(RepositoryError::SessionExists(session.id));
        }
        self.write(&SessionFile {
            session: session.clone(),
            arrows: Vec::new(),
        })
    }

    fn session(&self, id: SessionId) -> Result<Option<Session>> {
        Ok(self.read(id)?.map(|file| file.session))
    }

    fn delete_session(&self, id: SessionId) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let path = self.session_path(id);
        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::info!("Deleted {}: {}", id, path.display());
        }
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionId>> {
        let mut sessions = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;
        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename
                    .strip_prefix("session_")
                    .and_then(|s| s.strip_suffix(".json"))
                    .and_then(|s| s.parse::<u32>().ok())
            {
                sessions.push(SessionId(id));
            }
        }

        sessions.sort();
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::NewSession;
    use archery_core::Arrow;

    #[test]
    fn arrows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = SessionId(7);
        {
            let store = FileScoringStore::new(dir.path()).unwrap();
            store
                .create_session(&NewSession::for_round(10, None).into_session(id))
                .unwrap();
            store
                .insert(
                    id,
                    &[
                        ArrowRecord::new(id, 1, Arrow::x()),
                        ArrowRecord::new(id, 2, Arrow::miss()),
                    ],
                )
                .unwrap();
        }

        let store = FileScoringStore::new(dir.path()).unwrap();
        assert_eq!(store.list_sessions().unwrap(), vec![id]);
        assert_eq!(store.session(id).unwrap().unwrap().round_id, Some(10));
        assert_eq!(store.max_arrow_number(id).unwrap(), 2);
        assert!(store.snapshot(id).unwrap()[0].arrow.is_x());
    }

    #[test]
    fn rejected_delta_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileScoringStore::new(dir.path()).unwrap();
        let id = SessionId(1);
        store
            .create_session(&NewSession::default().into_session(id))
            .unwrap();
        store
            .insert(id, &[ArrowRecord::new(id, 1, Arrow::miss())])
            .unwrap();

        let result = store.update(id, &[ArrowRecord::new(id, 2, Arrow::x())]);
        assert!(matches!(result, Err(RepositoryError::MissingArrow { .. })));
        assert_eq!(store.snapshot(id).unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileScoringStore::new(dir.path()).unwrap();
        let id = SessionId(2);
        store
            .create_session(&NewSession::default().into_session(id))
            .unwrap();

        store.delete_session(id).unwrap();
        assert!(store.list_sessions().unwrap().is_empty());
        assert!(store.session(id).unwrap().is_none());
    }
}
