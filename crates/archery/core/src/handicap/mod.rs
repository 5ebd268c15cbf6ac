//! Handicap ↔ score conversion for a fixed round shape.
//!
//! A [`HandicapTable`] resolves a round, sub-type and face list into scored
//! passes once, then answers both directions of the lookup:
//!
//! ```text
//! score(h)   = round( Σ passes  arrows × E[arrow score | σ(h, distance)] )
//! handicap(s) = highest h whose score(h) is the largest score ≤ s
//! ```
//!
//! `score(h)` is non-increasing in `h` for every parameter combination, which
//! is what makes the linear inverse scan well defined.
//!
//! Lookups on rounds without arrow counts or distances yield `None`
//! (see [`MissingData`]); callers show nothing rather than fail.

mod model;
mod window;

use crate::error::MissingData;
use crate::round::{Face, RoundDefinition};

use model::{ZoneScoring, expected_arrow_score};

pub use window::{TableEntry, TableTarget};

/// Best (lowest) handicap on either scale.
pub const MIN_HANDICAP: i32 = 0;

/// Handicap scale in use.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HandicapSystem {
    /// Pre-2023 tables, 0 to 100.
    Legacy,
    /// 2023 tables, 0 to 150.
    #[default]
    #[strum(to_string = "agb2023", serialize = "2023")]
    #[cfg_attr(feature = "serde", serde(rename = "agb2023"))]
    Agb2023,
}

impl HandicapSystem {
    /// Worst handicap on this scale.
    pub const fn max_handicap(&self) -> i32 {
        match self {
            Self::Legacy => 100,
            Self::Agb2023 => 150,
        }
    }
}

/// Parameters that select how a round is scored for handicap purposes.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandicapOptions<'a> {
    pub sub_type: Option<u32>,
    /// Score the ten ring as the X ring (compound archers).
    pub inner_ten_archer: bool,
    /// Faces shot: one for all distances, or one per distance. `None` uses the
    /// round's primary face.
    pub faces: Option<&'a [Face]>,
    pub system: HandicapSystem,
}

impl<'a> HandicapOptions<'a> {
    pub fn new(system: HandicapSystem) -> Self {
        Self {
            system,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_sub_type(mut self, sub_type: Option<u32>) -> Self {
        self.sub_type = sub_type;
        self
    }

    #[must_use]
    pub fn with_inner_ten(mut self, inner_ten_archer: bool) -> Self {
        self.inner_ten_archer = inner_ten_archer;
        self
    }

    #[must_use]
    pub fn with_faces(mut self, faces: &'a [Face]) -> Self {
        self.faces = Some(faces);
        self
    }
}

/// Handicap paired with the score it predicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandicapEntry {
    pub handicap: i32,
    pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScoredPass {
    arrows: u32,
    distance_m: f64,
    face_diameter_m: f64,
    scoring: ZoneScoring,
}

/// Resolved round shape able to convert between handicaps and scores.
#[derive(Clone, Debug, PartialEq)]
pub struct HandicapTable {
    system: HandicapSystem,
    inner_ten: bool,
    arrow_radius_m: f64,
    passes: Vec<ScoredPass>,
}

impl HandicapTable {
    /// Resolves the round shape, reporting which data is missing on failure.
    pub fn try_new(
        round: &RoundDefinition,
        options: &HandicapOptions<'_>,
    ) -> Result<Self, MissingData> {
        if round.arrow_counts.is_empty() {
            return Err(MissingData::ArrowCounts);
        }
        let passes = round
            .passes(options.sub_type)
            .ok_or(MissingData::Distances)?;

        let primary = [round.primary_face()];
        let faces = options.faces.unwrap_or(&primary);
        let face_at = |index: usize| match faces.len() {
            1 => Ok(faces[0]),
            n if n == passes.len() => Ok(faces[index]),
            _ => Err(MissingData::Faces),
        };

        let imperial = round.uses_imperial_scoring();
        let unit = round.distance_unit();
        let scored = passes
            .iter()
            .enumerate()
            .map(|(index, pass)| {
                Ok(ScoredPass {
                    arrows: pass.arrow_count,
                    distance_m: unit.to_metres(pass.distance),
                    face_diameter_m: pass.face_size_cm / 100.0,
                    scoring: ZoneScoring::for_face(face_at(index)?, imperial),
                })
            })
            .collect::<Result<Vec<_>, MissingData>>()?;

        Ok(Self {
            system: options.system,
            inner_ten: options.inner_ten_archer,
            arrow_radius_m: options.system.arrow_radius(round.is_outdoor),
            passes: scored,
        })
    }

    /// Resolves the round shape; `None` when the round lacks the data needed.
    pub fn new(round: &RoundDefinition, options: &HandicapOptions<'_>) -> Option<Self> {
        Self::try_new(round, options).ok()
    }

    pub const fn system(&self) -> HandicapSystem {
        self.system
    }

    /// Highest score the round allows.
    pub fn max_score(&self) -> u32 {
        self.passes
            .iter()
            .map(|pass| pass.arrows * pass.scoring.max_arrow_score())
            .sum()
    }

    /// Expected score before rounding.
    pub fn expected_score(&self, handicap: f64) -> f64 {
        self.passes
            .iter()
            .map(|pass| {
                let sigma = self.system.sigma_radial(handicap, pass.distance_m);
                let per_arrow = expected_arrow_score(
                    pass.scoring,
                    self.inner_ten,
                    pass.face_diameter_m,
                    self.arrow_radius_m,
                    sigma,
                );
                pass.arrows as f64 * per_arrow
            })
            .sum()
    }

    /// Expected round score for a handicap, rounded to the nearest integer.
    pub fn score_for_handicap(&self, handicap: f64) -> u32 {
        let score = self.expected_score(handicap).round().max(0.0) as u32;
        score.min(self.max_score())
    }

    /// Scores for every whole handicap on the scale, best handicap first.
    pub fn entries(&self) -> Vec<HandicapEntry> {
        (MIN_HANDICAP..=self.system.max_handicap())
            .map(|handicap| HandicapEntry {
                handicap,
                score: self.score_for_handicap(handicap as f64),
            })
            .collect()
    }

    /// Handicap for an achieved score.
    ///
    /// Picks the largest tabulated score not exceeding `score`; when several
    /// handicaps share it, the worst (highest) one wins. Scores below the
    /// worst handicap's score map to the worst handicap.
    pub fn handicap_for_score(&self, score: u32) -> f64 {
        handicap_in(&self.entries(), score) as f64
    }
}

fn handicap_in(entries: &[HandicapEntry], score: u32) -> i32 {
    let mut best: Option<HandicapEntry> = None;
    for entry in entries {
        if entry.score > score {
            continue;
        }
        match best {
            None => best = Some(*entry),
            Some(found) if found.score == entry.score => best = Some(*entry),
            Some(_) => break,
        }
    }
    best.or(entries.last().copied())
        .map_or(MIN_HANDICAP, |entry| entry.handicap)
}

/// Expected score for a handicap on a round; `None` without a round shape.
pub fn score_for_handicap(
    round: &RoundDefinition,
    options: &HandicapOptions<'_>,
    handicap: f64,
) -> Option<u32> {
    HandicapTable::new(round, options).map(|table| table.score_for_handicap(handicap))
}

/// Handicap for a score on a round; `None` without a round shape.
pub fn handicap_for_score(
    round: &RoundDefinition,
    options: &HandicapOptions<'_>,
    score: u32,
) -> Option<f64> {
    HandicapTable::new(round, options).map(|table| table.handicap_for_score(score))
}
