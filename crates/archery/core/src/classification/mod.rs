//! Classification bands and score thresholds.
//!
//! Thresholds are keyed by `(round name hint, bowstyle, gender, age)`. They
//! are either derived from [`ClassHandicaps`] by converting each class
//! handicap into a score on the round, or supplied explicitly as score rows.

mod handicaps;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ErrorSeverity, MissingData, ScoringError};
use crate::handicap::{HandicapOptions, HandicapTable};
use crate::round::{Face, RoundCatalog, RoundDefinition, SubType, normalize_name};

pub use handicaps::{BowstyleParams, ClassHandicaps};

/// Classification bands, lowest first.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Classification {
    #[strum(to_string = "Archer 3rd Class", serialize = "A3")]
    Archer3rd,
    #[strum(to_string = "Archer 2nd Class", serialize = "A2")]
    Archer2nd,
    #[strum(to_string = "Archer 1st Class", serialize = "A1")]
    Archer1st,
    #[strum(to_string = "Bowman 3rd Class", serialize = "B3")]
    Bowman3rd,
    #[strum(to_string = "Bowman 2nd Class", serialize = "B2")]
    Bowman2nd,
    #[strum(to_string = "Bowman 1st Class", serialize = "B1")]
    Bowman1st,
    #[strum(to_string = "Master Bowman", serialize = "MB")]
    MasterBowman,
    #[strum(to_string = "Grand Master Bowman", serialize = "GMB")]
    GrandMasterBowman,
    #[strum(to_string = "Elite Master Bowman", serialize = "EMB")]
    EliteMasterBowman,
}

impl Classification {
    pub const COUNT: usize = 9;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Archer3rd,
        Self::Archer2nd,
        Self::Archer1st,
        Self::Bowman3rd,
        Self::Bowman2nd,
        Self::Bowman1st,
        Self::MasterBowman,
        Self::GrandMasterBowman,
        Self::EliteMasterBowman,
    ];

    pub const fn short_code(&self) -> &'static str {
        match self {
            Self::Archer3rd => "A3",
            Self::Archer2nd => "A2",
            Self::Archer1st => "A1",
            Self::Bowman3rd => "B3",
            Self::Bowman2nd => "B2",
            Self::Bowman1st => "B1",
            Self::MasterBowman => "MB",
            Self::GrandMasterBowman => "GMB",
            Self::EliteMasterBowman => "EMB",
        }
    }

    /// Classes between this one and Master Bowman; positive below it.
    pub const fn offset_from_master_bowman(&self) -> i32 {
        6 - *self as i32
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Bowstyle {
    Recurve,
    Compound,
    Barebow,
    Longbow,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Gender {
    #[strum(to_string = "male", serialize = "gents")]
    Male,
    #[strum(to_string = "female", serialize = "ladies")]
    Female,
}

/// Age categories, in the order tables list them.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AgeCategory {
    #[default]
    Adult,
    #[strum(to_string = "over_50", serialize = "50+")]
    Over50,
    #[strum(to_string = "under_21", serialize = "u21")]
    Under21,
    #[strum(to_string = "under_18", serialize = "u18")]
    Under18,
    #[strum(to_string = "under_16", serialize = "u16")]
    Under16,
    #[strum(to_string = "under_15", serialize = "u15")]
    Under15,
    #[strum(to_string = "under_14", serialize = "u14")]
    Under14,
    #[strum(to_string = "under_12", serialize = "u12")]
    Under12,
}

impl AgeCategory {
    /// Age steps away from the adult datum.
    pub const fn steps(&self) -> u32 {
        match self {
            Self::Adult => 0,
            Self::Over50 | Self::Under21 => 1,
            Self::Under18 => 2,
            Self::Under16 => 3,
            Self::Under15 => 4,
            Self::Under14 => 5,
            Self::Under12 => 6,
        }
    }

    /// Upper age bound for junior categories.
    pub const fn under_age(&self) -> Option<u32> {
        match self {
            Self::Adult | Self::Over50 => None,
            Self::Under21 => Some(21),
            Self::Under18 => Some(18),
            Self::Under16 => Some(16),
            Self::Under15 => Some(15),
            Self::Under14 => Some(14),
            Self::Under12 => Some(12),
        }
    }
}

/// Who shot the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcherProfile {
    pub bowstyle: Bowstyle,
    pub gender: Gender,
    pub age: AgeCategory,
}

impl SubType {
    fn under_age_for(&self, gender: Gender) -> Option<u32> {
        match gender {
            Gender::Male => self.gents_under_age,
            Gender::Female => self.ladies_under_age,
        }
    }

    /// Whether an archer may shoot this sub-type for classification.
    ///
    /// Open sub-types admit everyone; age-limited ones admit juniors whose
    /// category bound does not exceed the limit.
    pub fn admits(&self, gender: Gender, age: AgeCategory) -> bool {
        match self.under_age_for(gender) {
            None => true,
            Some(limit) => age.under_age().is_some_and(|bound| bound <= limit),
        }
    }

    /// The sub-type an archer would normally shoot: the tightest age limit
    /// they qualify for, else the lowest-id open sub-type.
    pub fn for_archer(sub_types: &[SubType], gender: Gender, age: AgeCategory) -> Option<&SubType> {
        let limited = sub_types
            .iter()
            .filter(|s| s.under_age_for(gender).is_some() && s.admits(gender, age))
            .min_by_key(|s| (s.under_age_for(gender), s.id));
        limited.or_else(|| {
            sub_types
                .iter()
                .filter(|s| s.under_age_for(gender).is_none())
                .min_by_key(|s| s.id)
        })
    }
}

/// Classification thresholds could not be admitted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("thresholds for '{round}' must not decrease from A3 to EMB")]
    ThresholdsNotAscending { round: String },
}

impl ScoringError for ClassificationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ThresholdsNotAscending { .. } => "CLASSIFICATION_THRESHOLDS_NOT_ASCENDING",
        }
    }
}

/// Minimum scores for each band, lowest band first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds(pub [u32; Classification::COUNT]);

impl Thresholds {
    pub fn is_ascending(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }

    /// Highest band whose threshold `score` meets.
    pub fn band_for(&self, score: u32) -> Option<Classification> {
        Classification::ALL
            .iter()
            .zip(self.0)
            .rev()
            .find(|(_, threshold)| score >= *threshold)
            .map(|(class, _)| *class)
    }

    pub fn get(&self, class: Classification) -> u32 {
        self.0[class as usize]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ThresholdKey {
    round: String,
    bowstyle: Bowstyle,
    gender: Gender,
    age: AgeCategory,
}

/// Outcome of classifying a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationResult {
    pub classification: Classification,
    /// Whether the round, face and sub-type count for official records.
    pub is_official: bool,
}

/// Score thresholds for every round and archer profile.
#[derive(Clone, Debug, Default)]
pub struct ClassificationTable {
    thresholds: BTreeMap<ThresholdKey, Thresholds>,
    official_rounds: BTreeSet<String>,
}

impl ClassificationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds thresholds for every round in the catalog from class handicaps.
    ///
    /// Each profile is scored on the sub-type it would normally shoot. Rounds
    /// without a usable shape for a profile get no thresholds for it.
    pub fn derive(rounds: &RoundCatalog, handicaps: &ClassHandicaps) -> Self {
        let mut table = Self::new();
        for round in rounds.iter() {
            for bowstyle in handicaps.bowstyles() {
                for gender in [Gender::Male, Gender::Female] {
                    for age in <AgeCategory as strum::IntoEnumIterator>::iter() {
                        let profile = ArcherProfile {
                            bowstyle,
                            gender,
                            age,
                        };
                        if let Some(thresholds) = derive_thresholds(round, handicaps, &profile) {
                            table.thresholds.insert(
                                ThresholdKey {
                                    round: round.name_hint(),
                                    bowstyle,
                                    gender,
                                    age,
                                },
                                thresholds,
                            );
                        }
                    }
                }
            }
        }
        table
    }

    /// Adds or replaces explicit thresholds for a round and profile.
    pub fn insert_thresholds(
        &mut self,
        round_name: &str,
        profile: ArcherProfile,
        thresholds: Thresholds,
    ) -> Result<(), ClassificationError> {
        if !thresholds.is_ascending() {
            return Err(ClassificationError::ThresholdsNotAscending {
                round: round_name.to_string(),
            });
        }
        self.thresholds.insert(
            ThresholdKey {
                round: normalize_name(round_name),
                bowstyle: profile.bowstyle,
                gender: profile.gender,
                age: profile.age,
            },
            thresholds,
        );
        Ok(())
    }

    /// Marks a round (by name) as shootable for official classifications.
    pub fn mark_official(&mut self, round_name: &str) {
        self.official_rounds.insert(normalize_name(round_name));
    }

    /// Matches the round by its classification key or its display name.
    pub fn is_official_round(&self, round: &RoundDefinition) -> bool {
        self.official_rounds.contains(&round.name_hint())
            || self
                .official_rounds
                .contains(&normalize_name(&round.display_name))
    }

    /// Score thresholds for the archer on the round, or why there are none.
    pub fn try_thresholds(
        &self,
        round: &RoundDefinition,
        profile: &ArcherProfile,
    ) -> Result<&Thresholds, MissingData> {
        self.thresholds
            .get(&ThresholdKey {
                round: round.name_hint(),
                bowstyle: profile.bowstyle,
                gender: profile.gender,
                age: profile.age,
            })
            .ok_or(MissingData::Thresholds)
    }

    pub fn thresholds(&self, round: &RoundDefinition, profile: &ArcherProfile) -> Option<&Thresholds> {
        self.try_thresholds(round, profile).ok()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Classifies a score; `None` without thresholds or below Archer 3rd.
    ///
    /// The result is official when the round is listed as official, the
    /// face shot is the round's primary face and the sub-type shot admits
    /// the archer.
    pub fn classify(
        &self,
        score: u32,
        round: &RoundDefinition,
        profile: &ArcherProfile,
        sub_type: Option<u32>,
        face: Option<Face>,
    ) -> Option<ClassificationResult> {
        let classification = self.thresholds(round, profile)?.band_for(score)?;

        let face_ok = face.is_none_or(|face| face == round.primary_face());
        let sub_type_ok = round
            .resolve_sub_type(sub_type)
            .and_then(|id| round.sub_type(id))
            .is_none_or(|shot| shot.admits(profile.gender, profile.age));

        Some(ClassificationResult {
            classification,
            is_official: self.is_official_round(round) && face_ok && sub_type_ok,
        })
    }
}

fn derive_thresholds(
    round: &RoundDefinition,
    handicaps: &ClassHandicaps,
    profile: &ArcherProfile,
) -> Option<Thresholds> {
    let ladder = handicaps.ladder(profile.bowstyle, profile.gender, profile.age)?;
    let sub_type = if round.sub_types.is_empty() {
        None
    } else {
        Some(SubType::for_archer(&round.sub_types, profile.gender, profile.age)?.id)
    };
    let options = HandicapOptions::new(handicaps.system)
        .with_sub_type(sub_type)
        .with_inner_ten(profile.bowstyle == Bowstyle::Compound && !round.is_outdoor);
    let table = HandicapTable::new(round, &options)?;

    let mut scores = [0u32; Classification::COUNT];
    for (slot, handicap) in scores.iter_mut().zip(ladder) {
        // A class nobody can miss is not a meaningful threshold.
        *slot = table.score_for_handicap(handicap).max(1);
    }
    Some(Thresholds(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handicap::HandicapSystem;
    use crate::round::tests::two_distance_round;

    const RECURVE: BowstyleParams = BowstyleParams {
        datum: 30.0,
        class_step: 7.0,
        gender_step: 7.0,
        age_step: 6.0,
    };

    fn adult_recurve(gender: Gender) -> ArcherProfile {
        ArcherProfile {
            bowstyle: Bowstyle::Recurve,
            gender,
            age: AgeCategory::Adult,
        }
    }

    fn derived() -> (RoundDefinition, ClassificationTable) {
        let round = two_distance_round();
        let catalog = RoundCatalog::from_rounds([round.clone()]).unwrap();
        let handicaps =
            ClassHandicaps::new(HandicapSystem::Agb2023).with_bowstyle(Bowstyle::Recurve, RECURVE);
        let mut table = ClassificationTable::derive(&catalog, &handicaps);
        table.mark_official("Test Double");
        (round, table)
    }

    #[test]
    fn bands_are_ordered() {
        assert!(Classification::Archer3rd < Classification::Bowman1st);
        assert!(Classification::GrandMasterBowman < Classification::EliteMasterBowman);
        assert_eq!(Classification::MasterBowman.offset_from_master_bowman(), 0);
        assert_eq!(Classification::Archer3rd.offset_from_master_bowman(), 6);
        assert_eq!(Classification::EliteMasterBowman.offset_from_master_bowman(), -2);
    }

    #[test]
    fn names_parse() {
        assert_eq!("gmb".parse::<Classification>().unwrap(), Classification::GrandMasterBowman);
        assert_eq!(Classification::Bowman2nd.to_string(), "Bowman 2nd Class");
        assert_eq!("Ladies".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("u16".parse::<AgeCategory>().unwrap(), AgeCategory::Under16);
        assert_eq!("under_18".parse::<AgeCategory>().unwrap(), AgeCategory::Under18);
        assert_eq!("BAREBOW".parse::<Bowstyle>().unwrap(), Bowstyle::Barebow);
    }

    #[test]
    fn band_is_highest_threshold_met() {
        let thresholds = Thresholds([100, 200, 300, 400, 500, 600, 700, 800, 900]);
        assert_eq!(thresholds.band_for(99), None);
        assert_eq!(thresholds.band_for(100), Some(Classification::Archer3rd));
        assert_eq!(thresholds.band_for(650), Some(Classification::Bowman1st));
        assert_eq!(thresholds.band_for(1000), Some(Classification::EliteMasterBowman));
    }

    #[test]
    fn derived_thresholds_ascend_and_differ_by_gender() {
        let (round, table) = derived();
        let male = table.thresholds(&round, &adult_recurve(Gender::Male)).unwrap();
        let female = table.thresholds(&round, &adult_recurve(Gender::Female)).unwrap();
        assert!(male.is_ascending());
        assert!(female.is_ascending());
        assert!(female.get(Classification::MasterBowman) <= male.get(Classification::MasterBowman));
    }

    #[test]
    fn classify_uses_derived_thresholds() {
        let (round, table) = derived();
        let profile = adult_recurve(Gender::Male);
        let thresholds = *table.thresholds(&round, &profile).unwrap();
        let mb = thresholds.get(Classification::MasterBowman);

        let result = table.classify(mb, &round, &profile, Some(1), None).unwrap();
        assert!(result.classification >= Classification::MasterBowman);
        assert!(result.is_official);

        let below = thresholds.get(Classification::Archer3rd) - 1;
        assert!(table.classify(below, &round, &profile, Some(1), None).is_none());
    }

    #[test]
    fn non_primary_face_is_unofficial() {
        let (round, table) = derived();
        let profile = adult_recurve(Gender::Male);
        let result = table
            .classify(700, &round, &profile, None, Some(Face::Triple))
            .unwrap();
        assert!(!result.is_official);
    }

    #[test]
    fn unknown_profile_is_absent() {
        let (round, table) = derived();
        let longbow = ArcherProfile {
            bowstyle: Bowstyle::Longbow,
            ..adult_recurve(Gender::Male)
        };
        assert!(table.classify(700, &round, &longbow, None, None).is_none());
        assert_eq!(
            table.try_thresholds(&round, &longbow),
            Err(MissingData::Thresholds)
        );
        assert!(table.try_thresholds(&round, &adult_recurve(Gender::Male)).is_ok());
    }

    #[test]
    fn explicit_thresholds_must_ascend() {
        let mut table = ClassificationTable::new();
        let profile = adult_recurve(Gender::Male);
        let bad = Thresholds([5, 4, 3, 2, 1, 0, 0, 0, 0]);
        assert!(matches!(
            table.insert_thresholds("Portsmouth", profile, bad),
            Err(ClassificationError::ThresholdsNotAscending { .. })
        ));
        let good = Thresholds([300, 350, 400, 450, 500, 530, 560, 575, 585]);
        table.insert_thresholds("Portsmouth", profile, good).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn sub_type_for_archer_prefers_tightest_limit() {
        let sub_types = [
            SubType::new(1, "Open"),
            SubType::new(2, "Junior").with_age_limits(Some(18), Some(18)),
            SubType::new(3, "Cadet").with_age_limits(Some(14), Some(15)),
        ];
        let pick = |gender, age| SubType::for_archer(&sub_types, gender, age).map(|s| s.id);
        assert_eq!(pick(Gender::Male, AgeCategory::Adult), Some(1));
        assert_eq!(pick(Gender::Male, AgeCategory::Under16), Some(2));
        assert_eq!(pick(Gender::Male, AgeCategory::Under12), Some(3));
        assert_eq!(pick(Gender::Female, AgeCategory::Under15), Some(3));
        assert!(!sub_types[2].admits(Gender::Male, AgeCategory::Adult));
        assert!(sub_types[0].admits(Gender::Male, AgeCategory::Under12));
    }
}
