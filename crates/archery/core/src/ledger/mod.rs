//! Arrow-sequence ledger.
//!
//! Pure edit operations over a session's arrow snapshot. Each operation
//! validates its preconditions against the snapshot and returns a
//! [`LedgerDelta`] describing the rows to update, insert and delete in a store
//! keyed by `(session_id, arrow_number)`. Applying the whole delta to the same
//! snapshot always leaves the session numbered `1..=N` with no gaps.
//!
//! The ledger never touches storage. Callers must apply a delta against the
//! exact snapshot it was computed from (one writer per session).

mod error;
mod remaining;

use std::collections::BTreeMap;

use crate::arrow::{Arrow, ArrowRecord, SessionId};

pub use error::LedgerError;
pub use remaining::{RemainingAtDistance, end_size_limit, remaining_arrows};

/// Row changes produced by a ledger operation.
///
/// - `update`: rows whose arrow number already exists, overwritten in place
/// - `insert`: rows with arrow numbers that did not exist before
/// - `delete`: arrow numbers that no longer exist afterwards
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerDelta {
    pub update: Vec<ArrowRecord>,
    pub insert: Vec<ArrowRecord>,
    pub delete: Vec<u32>,
}

impl LedgerDelta {
    pub fn is_empty(&self) -> bool {
        self.update.is_empty() && self.insert.is_empty() && self.delete.is_empty()
    }

    /// Applies the delta to the snapshot it was computed from.
    ///
    /// Returns the resulting records ordered by arrow number.
    pub fn apply(&self, snapshot: &[ArrowRecord]) -> Vec<ArrowRecord> {
        let mut rows: BTreeMap<u32, ArrowRecord> = snapshot
            .iter()
            .map(|record| (record.arrow_number, *record))
            .collect();

        for number in &self.delete {
            rows.remove(number);
        }
        for record in self.update.iter().chain(&self.insert) {
            rows.insert(record.arrow_number, *record);
        }

        rows.into_values().collect()
    }
}

/// Sorted, validated view of a snapshot.
struct Snapshot {
    session: Option<SessionId>,
    records: Vec<ArrowRecord>,
}

impl Snapshot {
    fn new(current: &[ArrowRecord]) -> Result<Self, LedgerError> {
        let session = session_of(current)?;
        let mut records = current.to_vec();
        records.sort_by_key(|record| record.arrow_number);
        check_sorted_dense(&records)?;
        Ok(Self { session, records })
    }

    fn non_empty(current: &[ArrowRecord]) -> Result<(SessionId, Vec<ArrowRecord>), LedgerError> {
        let snapshot = Self::new(current)?;
        match snapshot.session {
            Some(session) => Ok((session, snapshot.records)),
            None => Err(LedgerError::EmptySnapshot),
        }
    }

    fn max(&self) -> u32 {
        self.records.len() as u32
    }
}

fn session_of(records: &[ArrowRecord]) -> Result<Option<SessionId>, LedgerError> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    if let Some(other) = records.iter().find(|r| r.session_id != first.session_id) {
        return Err(LedgerError::MixedSessions {
            expected: first.session_id,
            found: other.session_id,
        });
    }
    Ok(Some(first.session_id))
}

fn check_sorted_dense(sorted: &[ArrowRecord]) -> Result<(), LedgerError> {
    for (index, record) in sorted.iter().enumerate() {
        let expected = index as u32 + 1;
        if record.arrow_number != expected {
            return Err(LedgerError::NonContiguousSnapshot { at: expected });
        }
    }
    Ok(())
}

/// Verifies that `records` belong to one session and are numbered `1..=N`.
pub fn check_dense(records: &[ArrowRecord]) -> Result<(), LedgerError> {
    Snapshot::new(records).map(|_| ())
}

fn records_from(session: SessionId, first: u32, arrows: &[Arrow]) -> Vec<ArrowRecord> {
    arrows
        .iter()
        .zip(first..)
        .map(|(arrow, number)| ArrowRecord::new(session, number, *arrow))
        .collect()
}

/// Appends an end after the last arrow of the session.
///
/// New arrows take numbers `max + 1 ..= max + len`; nothing is renumbered, so
/// the delta only contains inserts.
pub fn append_end(
    current: &[ArrowRecord],
    session: SessionId,
    new_arrows: &[Arrow],
) -> Result<LedgerDelta, LedgerError> {
    if new_arrows.is_empty() {
        return Err(LedgerError::EmptyArrows);
    }
    let snapshot = Snapshot::new(current)?;
    match snapshot.session {
        Some(existing) if existing != session => {
            return Err(LedgerError::MixedSessions {
                expected: existing,
                found: session,
            });
        }
        _ => {}
    }

    Ok(LedgerDelta {
        insert: records_from(session, snapshot.max() + 1, new_arrows),
        ..LedgerDelta::default()
    })
}

/// Inserts an end so that its first arrow takes `first_arrow_number`.
///
/// Every record at or after `first_arrow_number` moves up by `len(new_arrows)`.
/// Output rows landing on numbers that already existed are updates, the rest
/// are inserts.
pub fn insert_end(
    current: &[ArrowRecord],
    first_arrow_number: u32,
    new_arrows: &[Arrow],
) -> Result<LedgerDelta, LedgerError> {
    if new_arrows.is_empty() {
        return Err(LedgerError::EmptyArrows);
    }
    let (session, records) = Snapshot::non_empty(current)?;
    let max = records.len() as u32;
    if first_arrow_number < 1 || first_arrow_number > max {
        return Err(LedgerError::StartOutOfRange {
            first: first_arrow_number,
            max,
        });
    }

    let shift = new_arrows.len() as u32;
    let shifted = records
        .iter()
        .filter(|record| record.arrow_number >= first_arrow_number)
        .map(|record| record.renumbered(record.arrow_number + shift));
    let inserted = records_from(session, first_arrow_number, new_arrows);

    let (mut update, mut insert): (Vec<_>, Vec<_>) = inserted
        .into_iter()
        .chain(shifted)
        .partition(|record| record.arrow_number <= max);
    update.sort_by_key(|record| record.arrow_number);
    insert.sort_by_key(|record| record.arrow_number);

    Ok(LedgerDelta {
        update,
        insert,
        delete: Vec::new(),
    })
}

/// Deletes `count` arrows starting at `first_arrow_number`.
///
/// Later records move down by `min(count, available)` and the trailing numbers
/// left duplicated by the shift are deleted.
pub fn delete_end(
    current: &[ArrowRecord],
    first_arrow_number: u32,
    count: u32,
) -> Result<LedgerDelta, LedgerError> {
    if count == 0 {
        return Err(LedgerError::ZeroCount);
    }
    let (_, records) = Snapshot::non_empty(current)?;
    let max = records.len() as u32;
    if first_arrow_number < 1 || first_arrow_number > max {
        return Err(LedgerError::NoSuchArrow(first_arrow_number));
    }

    let removed = count.min(max - first_arrow_number + 1);
    let update = records
        .iter()
        .filter(|record| record.arrow_number >= first_arrow_number + removed)
        .map(|record| record.renumbered(record.arrow_number - removed))
        .collect();
    let delete = (max - removed + 1..=max).collect();

    Ok(LedgerDelta {
        update,
        insert: Vec::new(),
        delete,
    })
}

/// Overwrites the end of `size` arrows starting at `first_arrow_number`.
pub fn replace_end(
    current: &[ArrowRecord],
    first_arrow_number: u32,
    size: usize,
    new_arrows: &[Arrow],
) -> Result<LedgerDelta, LedgerError> {
    if new_arrows.len() != size {
        return Err(LedgerError::EndSizeMismatch {
            expected: size,
            actual: new_arrows.len(),
        });
    }
    if size == 0 {
        return Err(LedgerError::EmptyArrows);
    }
    let (session, records) = Snapshot::non_empty(current)?;
    let max = records.len() as u64;
    let last = first_arrow_number as u64 + size as u64 - 1;
    if first_arrow_number < 1 || last > max {
        return Err(LedgerError::EndNotFound {
            first: first_arrow_number,
            size,
        });
    }

    Ok(LedgerDelta {
        update: records_from(session, first_arrow_number, new_arrows),
        ..LedgerDelta::default()
    })
}

/// Computes the delta that restores dense numbering for a damaged snapshot.
///
/// Records keep their relative order by current arrow number and are
/// renumbered `1..=N`.
pub fn renumber(current: &[ArrowRecord]) -> Result<LedgerDelta, LedgerError> {
    session_of(current)?;
    let mut ordered = current.to_vec();
    ordered.sort_by_key(|record| record.arrow_number);

    let existing: std::collections::BTreeSet<u32> =
        ordered.iter().map(|record| record.arrow_number).collect();
    let target = ordered.len() as u32;

    let mut delta = LedgerDelta::default();
    for (record, number) in ordered.iter().zip(1..) {
        if record.arrow_number == number {
            continue;
        }
        let moved = record.renumbered(number);
        if existing.contains(&number) {
            delta.update.push(moved);
        } else {
            delta.insert.push(moved);
        }
    }
    delta.delete = existing.into_iter().filter(|n| *n > target).collect();
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: SessionId = SessionId(1);

    fn arrows(scores: &[u8]) -> Vec<Arrow> {
        scores.iter().map(|s| Arrow::new(*s, false).unwrap()).collect()
    }

    fn session_of_scores(scores: &[u8]) -> Vec<ArrowRecord> {
        records_from(SESSION, 1, &arrows(scores))
    }

    fn numbers(records: &[ArrowRecord]) -> Vec<u32> {
        records.iter().map(|r| r.arrow_number).collect()
    }

    fn scores(records: &[ArrowRecord]) -> Vec<u8> {
        records.iter().map(|r| r.arrow.score()).collect()
    }

    #[test]
    fn append_to_empty_numbers_from_one() {
        let delta = append_end(&[], SESSION, &arrows(&[10; 6])).unwrap();
        assert!(delta.update.is_empty());
        assert_eq!(numbers(&delta.insert), vec![1, 2, 3, 4, 5, 6]);
        let total: u32 = delta.insert.iter().map(|r| r.arrow.score() as u32).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn append_continues_numbering() {
        let current = session_of_scores(&[9, 9, 9]);
        let delta = append_end(&current, SESSION, &arrows(&[1, 2])).unwrap();
        assert_eq!(numbers(&delta.insert), vec![4, 5]);
    }

    #[test]
    fn append_rejects_foreign_session() {
        let current = session_of_scores(&[9]);
        let err = append_end(&current, SessionId(2), &arrows(&[1])).unwrap_err();
        assert!(matches!(err, LedgerError::MixedSessions { .. }));
    }

    #[test]
    fn insert_at_start_shifts_everything() {
        let current = session_of_scores(&[1, 2, 3, 4, 5, 6]);
        let delta = insert_end(&current, 1, &arrows(&[10; 6])).unwrap();

        // Numbers 1..=6 already existed, 7..=12 are new rows.
        assert_eq!(numbers(&delta.update), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(scores(&delta.update), vec![10; 6]);
        assert_eq!(numbers(&delta.insert), vec![7, 8, 9, 10, 11, 12]);
        assert_eq!(scores(&delta.insert), vec![1, 2, 3, 4, 5, 6]);

        let after = delta.apply(&current);
        assert_eq!(numbers(&after), (1..=12).collect::<Vec<_>>());
        assert_eq!(scores(&after), vec![10, 10, 10, 10, 10, 10, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn insert_six_before_first_arrow_moves_originals_to_seven_through_twelve() {
        let current = session_of_scores(&[1, 2, 3, 4, 5, 6]);
        let delta = insert_end(&current, 1, &arrows(&[9; 6])).unwrap();

        let after = delta.apply(&current);
        let originals: Vec<u32> = after
            .iter()
            .filter(|record| record.arrow.score() < 9)
            .map(|record| record.arrow_number)
            .collect();
        let inserted: Vec<u32> = after
            .iter()
            .filter(|record| record.arrow.score() == 9)
            .map(|record| record.arrow_number)
            .collect();
        assert_eq!(originals, vec![7, 8, 9, 10, 11, 12]);
        assert_eq!(inserted, vec![1, 2, 3, 4, 5, 6]);

        // Rows are keyed by arrow number: occupied keys are rewritten, fresh keys added.
        assert!(delta.update.iter().all(|record| record.arrow_number <= 6));
        assert!(delta.insert.iter().all(|record| record.arrow_number > 6));
        assert_eq!(delta.update.len() + delta.insert.len(), 12);
        assert!(delta.delete.is_empty());
    }

    #[test]
    fn insert_in_middle() {
        let current = session_of_scores(&[1, 2, 3, 4]);
        let delta = insert_end(&current, 3, &arrows(&[9, 9])).unwrap();
        let after = delta.apply(&current);
        assert_eq!(scores(&after), vec![1, 2, 9, 9, 3, 4]);
        check_dense(&after).unwrap();
    }

    #[test]
    fn insert_rejects_out_of_range_start() {
        let current = session_of_scores(&[1, 2, 3]);
        assert_eq!(
            insert_end(&current, 4, &arrows(&[1])),
            Err(LedgerError::StartOutOfRange { first: 4, max: 3 })
        );
        assert!(insert_end(&current, 0, &arrows(&[1])).is_err());
        assert_eq!(
            insert_end(&[], 1, &arrows(&[1])),
            Err(LedgerError::EmptySnapshot)
        );
    }

    #[test]
    fn delete_last_end() {
        let current = session_of_scores(&[5; 12]);
        let delta = delete_end(&current, 7, 6).unwrap();
        assert!(delta.update.is_empty());
        assert_eq!(delta.delete, vec![7, 8, 9, 10, 11, 12]);
        let after = delta.apply(&current);
        assert_eq!(numbers(&after), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn delete_middle_end_shifts_down() {
        let current = session_of_scores(&[1, 2, 3, 4, 5, 6]);
        let delta = delete_end(&current, 2, 2).unwrap();
        assert_eq!(numbers(&delta.update), vec![2, 3, 4]);
        assert_eq!(delta.delete, vec![5, 6]);
        assert_eq!(scores(&delta.apply(&current)), vec![1, 4, 5, 6]);
    }

    #[test]
    fn delete_clamps_count_to_available() {
        let current = session_of_scores(&[1, 2, 3, 4]);
        let delta = delete_end(&current, 3, 10).unwrap();
        assert_eq!(delta.delete, vec![3, 4]);
        assert_eq!(scores(&delta.apply(&current)), vec![1, 2]);
    }

    #[test]
    fn delete_requires_existing_start() {
        let current = session_of_scores(&[1, 2]);
        assert_eq!(delete_end(&current, 3, 1), Err(LedgerError::NoSuchArrow(3)));
        assert_eq!(delete_end(&current, 1, 0), Err(LedgerError::ZeroCount));
    }

    #[test]
    fn replace_overwrites_in_place() {
        let current = session_of_scores(&[1, 2, 3, 4, 5, 6]);
        let delta = replace_end(&current, 4, 3, &arrows(&[7, 8, 9])).unwrap();
        assert!(delta.insert.is_empty() && delta.delete.is_empty());
        assert_eq!(scores(&delta.apply(&current)), vec![1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn replace_rejects_missing_end() {
        let current = session_of_scores(&[1, 2, 3]);
        assert_eq!(
            replace_end(&current, 2, 3, &arrows(&[1, 1, 1])),
            Err(LedgerError::EndNotFound { first: 2, size: 3 })
        );
        assert_eq!(
            replace_end(&current, 1, 2, &arrows(&[1])),
            Err(LedgerError::EndSizeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn rejects_gapped_snapshot() {
        let mut current = session_of_scores(&[1, 2, 3]);
        current[2].arrow_number = 5;
        assert_eq!(
            delete_end(&current, 1, 1),
            Err(LedgerError::NonContiguousSnapshot { at: 3 })
        );
    }

    #[test]
    fn renumber_closes_gaps() {
        let mut current = session_of_scores(&[1, 2, 3, 4]);
        current[1].arrow_number = 5;
        current[3].arrow_number = 7;
        // Numbers are now 1, 5, 3, 7.
        let delta = renumber(&current).unwrap();
        let after = delta.apply(&current);
        check_dense(&after).unwrap();
        assert_eq!(scores(&after), vec![1, 3, 2, 4]);
    }

    #[test]
    fn renumber_of_dense_snapshot_is_empty() {
        let current = session_of_scores(&[1, 2, 3]);
        assert!(renumber(&current).unwrap().is_empty());
    }
}
