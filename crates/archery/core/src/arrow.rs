//! Arrow values and the persisted arrow record.

use core::fmt;
use core::str::FromStr;

use crate::ledger::LedgerError;

/// Identifier of a scoring session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// A single scored arrow.
///
/// Invariant: `score <= 10` and `is_x` implies `score == 10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawArrow", into = "RawArrow"))]
pub struct Arrow {
    score: u8,
    is_x: bool,
}

impl Arrow {
    pub const MAX_SCORE: u8 = 10;

    /// Creates an arrow, rejecting values outside the scoring range.
    pub fn new(score: u8, is_x: bool) -> Result<Self, LedgerError> {
        if score > Self::MAX_SCORE || (is_x && score != Self::MAX_SCORE) {
            return Err(LedgerError::InvalidArrow { score, is_x });
        }
        Ok(Self { score, is_x })
    }

    /// An arrow in the inner ten.
    pub const fn x() -> Self {
        Self {
            score: Self::MAX_SCORE,
            is_x: true,
        }
    }

    /// A missed arrow.
    pub const fn miss() -> Self {
        Self {
            score: 0,
            is_x: false,
        }
    }

    pub const fn score(&self) -> u8 {
        self.score
    }

    pub const fn is_x(&self) -> bool {
        self.is_x
    }

    pub const fn is_hit(&self) -> bool {
        self.score > 0
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_x, self.score) {
            (true, _) => f.write_str("X"),
            (false, 0) => f.write_str("M"),
            (false, score) => write!(f, "{}", score),
        }
    }
}

impl FromStr for Arrow {
    type Err = LedgerError;

    /// Parses `X`, `M` or a number from 0 to 10 (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("x") {
            return Ok(Self::x());
        }
        if trimmed.eq_ignore_ascii_case("m") {
            return Ok(Self::miss());
        }
        let score = trimmed
            .parse::<u8>()
            .map_err(|_| LedgerError::UnparsableArrow(trimmed.to_string()))?;
        Self::new(score, false)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawArrow {
    score: u8,
    #[serde(default)]
    is_x: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<RawArrow> for Arrow {
    type Error = LedgerError;

    fn try_from(raw: RawArrow) -> Result<Self, Self::Error> {
        Arrow::new(raw.score, raw.is_x)
    }
}

#[cfg(feature = "serde")]
impl From<Arrow> for RawArrow {
    fn from(arrow: Arrow) -> Self {
        Self {
            score: arrow.score,
            is_x: arrow.is_x,
        }
    }
}

/// A persisted arrow, keyed by `(session_id, arrow_number)`.
///
/// Arrow numbers start at 1 and are dense within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrowRecord {
    pub session_id: SessionId,
    pub arrow_number: u32,
    pub arrow: Arrow,
}

impl ArrowRecord {
    pub const fn new(session_id: SessionId, arrow_number: u32, arrow: Arrow) -> Self {
        Self {
            session_id,
            arrow_number,
            arrow,
        }
    }

    /// Returns a copy of this record moved to another arrow number.
    #[must_use]
    pub const fn renumbered(self, arrow_number: u32) -> Self {
        Self {
            arrow_number,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_x_below_ten() {
        assert!(Arrow::new(9, true).is_err());
        assert!(Arrow::new(11, false).is_err());
        assert!(Arrow::new(10, true).is_ok());
    }

    #[test]
    fn parses_symbols() {
        assert_eq!("x".parse::<Arrow>().unwrap(), Arrow::x());
        assert_eq!(" M ".parse::<Arrow>().unwrap(), Arrow::miss());
        assert_eq!("7".parse::<Arrow>().unwrap().score(), 7);
        assert!("12".parse::<Arrow>().is_err());
        assert!("seven".parse::<Arrow>().is_err());
    }

    #[test]
    fn display_round_trips_symbols() {
        for text in ["X", "M", "10", "3"] {
            assert_eq!(text.parse::<Arrow>().unwrap().to_string(), text);
        }
    }
}
