//! Class handicaps generated from per-bowstyle datum and step parameters.

use std::collections::BTreeMap;

use super::{AgeCategory, Bowstyle, Classification, Gender};
use crate::handicap::HandicapSystem;

/// Parameters placing one bowstyle's classes on the handicap scale.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BowstyleParams {
    /// Handicap of an adult male Master Bowman.
    pub datum: f64,
    /// Handicap gap between neighbouring classes.
    pub class_step: f64,
    /// Added for female archers.
    pub gender_step: f64,
    /// Added once per age step below or above adult.
    pub age_step: f64,
}

/// Handicap thresholds for every class, bowstyle, gender and age category.
///
/// ```text
/// hc(class) = datum
///           + age_step    × age.steps()
///           + gender_step × [female]
///           + class_step  × (class offset from Master Bowman)
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassHandicaps {
    pub system: HandicapSystem,
    params: BTreeMap<Bowstyle, BowstyleParams>,
}

impl ClassHandicaps {
    pub fn new(system: HandicapSystem) -> Self {
        Self {
            system,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_bowstyle(mut self, bowstyle: Bowstyle, params: BowstyleParams) -> Self {
        self.params.insert(bowstyle, params);
        self
    }

    pub fn insert(&mut self, bowstyle: Bowstyle, params: BowstyleParams) {
        self.params.insert(bowstyle, params);
    }

    pub fn params(&self, bowstyle: Bowstyle) -> Option<&BowstyleParams> {
        self.params.get(&bowstyle)
    }

    pub fn bowstyles(&self) -> impl Iterator<Item = Bowstyle> + '_ {
        self.params.keys().copied()
    }

    /// Handicap an archer must shoot to reach `class`.
    pub fn handicap(
        &self,
        bowstyle: Bowstyle,
        gender: Gender,
        age: AgeCategory,
        class: Classification,
    ) -> Option<f64> {
        let params = self.params.get(&bowstyle)?;
        let gender_steps = match gender {
            Gender::Male => 0.0,
            Gender::Female => 1.0,
        };
        let handicap = params.datum
            + params.age_step * age.steps() as f64
            + params.gender_step * gender_steps
            + params.class_step * class.offset_from_master_bowman() as f64;
        Some(handicap.clamp(0.0, self.system.max_handicap() as f64))
    }

    /// Handicaps for all nine classes, lowest class first.
    pub fn ladder(
        &self,
        bowstyle: Bowstyle,
        gender: Gender,
        age: AgeCategory,
    ) -> Option<[f64; Classification::COUNT]> {
        self.params.get(&bowstyle)?;
        let mut ladder = [0.0; Classification::COUNT];
        for (slot, class) in ladder.iter_mut().zip(Classification::ALL) {
            *slot = self.handicap(bowstyle, gender, age, class)?;
        }
        Some(ladder)
    }
}
