//! Repository layer for session data
//!
//! Repositories hold data that CHANGES while scoring:
//! - Sessions (round, date, archer)
//! - Arrow sequences keyed by `(session id, arrow number)`
//!
//! Static reference data (rounds, classification tables) is handled by the
//! oracle bundle, not repositories.

mod error;
mod file;
mod memory;
mod traits;
mod types;

use std::collections::BTreeMap;

use archery_core::{ArrowRecord, LedgerDelta, SessionId};

pub use error::{RepositoryError, Result};
pub use file::FileScoringStore;
pub use memory::InMemoryScoringStore;
pub use traits::{ArrowRepository, ScoringStore, SessionRepository};
pub use types::{NewSession, Session};

/// Applies a delta to one session's rows, rejecting key conflicts.
///
/// `rows` is left untouched on error; callers work on a copy and swap it in.
pub(crate) fn apply_delta(
    rows: &BTreeMap<u32, ArrowRecord>,
    session: SessionId,
    delta: &LedgerDelta,
) -> Result<BTreeMap<u32, ArrowRecord>> {
    let mut next = rows.clone();
    for number in &delta.delete {
        next.remove(number);
    }
    for record in &delta.update {
        check_owner(session, record)?;
        match next.get_mut(&record.arrow_number) {
            Some(row) => *row = *record,
            None => {
                return Err(RepositoryError::MissingArrow {
                    session,
                    arrow_number: record.arrow_number,
                });
            }
        }
    }
    for record in &delta.insert {
        check_owner(session, record)?;
        if next.insert(record.arrow_number, *record).is_some() {
            return Err(RepositoryError::DuplicateArrow {
                session,
                arrow_number: record.arrow_number,
            });
        }
    }
    Ok(next)
}

fn check_owner(session: SessionId, record: &ArrowRecord) -> Result<()> {
    if record.session_id == session {
        Ok(())
    } else {
        Err(RepositoryError::ForeignRecord {
            session,
            found: record.session_id,
        })
    }
}
