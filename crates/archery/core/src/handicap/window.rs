//! Table excerpts centred on a handicap or score.

use super::{HandicapEntry, HandicapTable};

/// Rows shown either side of the highlighted row.
const CONTEXT_ROWS: usize = 5;

/// What the excerpt is centred on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableTarget {
    Handicap(f64),
    Score(u32),
}

/// One row of a table excerpt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableEntry {
    pub handicap: i32,
    pub score: u32,
    pub highlighted: bool,
}

impl HandicapTable {
    /// Excerpt of the table around a handicap or score.
    ///
    /// Handicaps sharing a score are collapsed into the worst of them, so
    /// every row has a distinct score. The row matching the target is
    /// highlighted with up to five rows before and after it.
    pub fn table_window(&self, target: TableTarget) -> Vec<TableEntry> {
        let rows = collapse_ties(&self.entries());
        let handicap = match target {
            TableTarget::Handicap(handicap) => handicap.round() as i32,
            TableTarget::Score(score) => self.handicap_for_score(score) as i32,
        };
        // Collapsed rows keep the worst handicap of a tie; the first row at or
        // beyond the target is the one carrying its score.
        let centre = rows
            .iter()
            .position(|row| row.handicap >= handicap)
            .unwrap_or(rows.len().saturating_sub(1));

        let start = centre.saturating_sub(CONTEXT_ROWS);
        let end = (centre + CONTEXT_ROWS + 1).min(rows.len());
        rows[start..end]
            .iter()
            .enumerate()
            .map(|(offset, row)| TableEntry {
                handicap: row.handicap,
                score: row.score,
                highlighted: start + offset == centre,
            })
            .collect()
    }
}

fn collapse_ties(entries: &[HandicapEntry]) -> Vec<HandicapEntry> {
    let mut rows: Vec<HandicapEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match rows.last_mut() {
            Some(last) if last.score == entry.score => last.handicap = entry.handicap,
            _ => rows.push(*entry),
        }
    }
    rows
}
