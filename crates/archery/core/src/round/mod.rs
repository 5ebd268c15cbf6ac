//! Round definitions: distances, arrow counts, sub-types and target faces.
//!
//! Definitions are immutable reference data. They are validated once with
//! [`RoundDefinition::validate`] before being admitted into a
//! [`RoundCatalog`], after which they can be shared freely across threads.

mod validate;

use std::collections::BTreeMap;

pub use validate::{ValidationError, ValidationRule, normalize_name};

/// Sub-type id used by distance entries that do not name one.
pub const DEFAULT_SUB_TYPE_ID: u32 = 1;

/// Metres per yard, used to convert imperial distances.
pub const METRES_PER_YARD: f64 = 0.9144;

/// Target face layouts.
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
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Face {
    /// Complete ten-zone (or imperial five-zone) face.
    #[default]
    Full,
    /// Vertical triple spot: rings 6 to 10 only.
    Triple,
    /// Six-ring face: rings 5 to 10 only.
    FitaSix,
    /// Worcester face, scored 5 to 1.
    Worcester,
    /// Worcester face where only the centre five counts.
    WorcesterFive,
}

impl Face {
    pub const fn is_worcester(&self) -> bool {
        matches!(self, Self::Worcester | Self::WorcesterFive)
    }
}

/// Unit distances of a round are measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceUnit {
    #[strum(serialize = "m")]
    Metres,
    #[strum(serialize = "yd")]
    Yards,
}

impl DistanceUnit {
    pub fn to_metres(&self, distance: u32) -> f64 {
        match self {
            Self::Metres => distance as f64,
            Self::Yards => distance as f64 * METRES_PER_YARD,
        }
    }
}

/// A variant of a round sharing its structure but shot at other distances.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubType {
    pub id: u32,
    pub name: String,
    pub gents_under_age: Option<u32>,
    pub ladies_under_age: Option<u32>,
}

impl SubType {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            gents_under_age: None,
            ladies_under_age: None,
        }
    }

    #[must_use]
    pub fn with_age_limits(mut self, gents: Option<u32>, ladies: Option<u32>) -> Self {
        self.gents_under_age = gents;
        self.ladies_under_age = ladies;
        self
    }
}

/// Number of arrows shot at one distance and the face size used there.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceArrowCount {
    pub distance_number: u32,
    pub face_size_cm: f64,
    pub arrow_count: u32,
}

impl DistanceArrowCount {
    pub const fn new(distance_number: u32, face_size_cm: f64, arrow_count: u32) -> Self {
        Self {
            distance_number,
            face_size_cm,
            arrow_count,
        }
    }
}

/// Distance shot at `distance_number` by one sub-type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundDistance {
    pub distance_number: u32,
    pub sub_type_id: u32,
    pub distance: u32,
}

impl RoundDistance {
    pub const fn new(distance_number: u32, sub_type_id: u32, distance: u32) -> Self {
        Self {
            distance_number,
            sub_type_id,
            distance,
        }
    }
}

/// Static description of a round.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundDefinition {
    pub id: u32,
    pub display_name: String,
    /// Name used to key classification tables, when it differs from the display name.
    pub legacy_name: Option<String>,
    pub is_outdoor: bool,
    pub is_metric: bool,
    pub five_arrow_end: bool,
    pub permitted_faces: Vec<Face>,
    pub sub_types: Vec<SubType>,
    pub arrow_counts: Vec<DistanceArrowCount>,
    pub distances: Vec<RoundDistance>,
}

/// One distance of a resolved round, in shooting order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pass {
    pub distance_number: u32,
    pub distance: u32,
    pub arrow_count: u32,
    pub face_size_cm: f64,
}

impl RoundDefinition {
    /// Key used by classification tables.
    pub fn name_hint(&self) -> String {
        normalize_name(self.legacy_name.as_deref().unwrap_or(&self.display_name))
    }

    pub const fn distance_unit(&self) -> DistanceUnit {
        if self.is_metric {
            DistanceUnit::Metres
        } else {
            DistanceUnit::Yards
        }
    }

    /// Face the round is normally shot on.
    pub fn primary_face(&self) -> Face {
        self.permitted_faces.first().copied().unwrap_or_default()
    }

    /// Whether the round scores on the imperial five-zone (9-7-5-3-1) layout.
    pub const fn uses_imperial_scoring(&self) -> bool {
        !self.is_metric && self.is_outdoor
    }

    /// Total arrows across all distances.
    pub fn total_arrows(&self) -> u32 {
        self.arrow_counts.iter().map(|count| count.arrow_count).sum()
    }

    /// Usual end size: five for five-arrow-end rounds, otherwise six outdoors
    /// and three indoors.
    pub const fn default_end_size(&self) -> u32 {
        if self.five_arrow_end {
            5
        } else if self.is_outdoor {
            6
        } else {
            3
        }
    }

    /// Resolves an optional sub-type request to the id used by distance entries.
    ///
    /// Rounds without sub-types use [`DEFAULT_SUB_TYPE_ID`]. Without a request
    /// the lowest sub-type id is used. Unknown ids resolve to `None`.
    pub fn resolve_sub_type(&self, sub_type: Option<u32>) -> Option<u32> {
        match (sub_type, self.sub_types.is_empty()) {
            (None, true) => Some(DEFAULT_SUB_TYPE_ID),
            (None, false) => self.sub_types.iter().map(|s| s.id).min(),
            (Some(id), true) => (id == DEFAULT_SUB_TYPE_ID).then_some(id),
            (Some(id), false) => self.sub_types.iter().any(|s| s.id == id).then_some(id),
        }
    }

    pub fn sub_type(&self, id: u32) -> Option<&SubType> {
        self.sub_types.iter().find(|s| s.id == id)
    }

    /// Distances of a sub-type with their arrow counts, in shooting order.
    ///
    /// Returns `None` when the round has no arrow counts, the sub-type has no
    /// distances, or an arrow count has no matching distance.
    pub fn passes(&self, sub_type: Option<u32>) -> Option<Vec<Pass>> {
        if self.arrow_counts.is_empty() {
            return None;
        }
        let sub_type = self.resolve_sub_type(sub_type)?;
        let distances: BTreeMap<u32, u32> = self
            .distances
            .iter()
            .filter(|d| d.sub_type_id == sub_type)
            .map(|d| (d.distance_number, d.distance))
            .collect();
        if distances.is_empty() {
            return None;
        }

        let mut counts = self.arrow_counts.clone();
        counts.sort_by_key(|count| count.distance_number);
        counts
            .iter()
            .map(|count| {
                distances.get(&count.distance_number).map(|distance| Pass {
                    distance_number: count.distance_number,
                    distance: *distance,
                    arrow_count: count.arrow_count,
                    face_size_cm: count.face_size_cm,
                })
            })
            .collect()
    }

    /// Longest distance shot by the sub-type.
    pub fn max_distance(&self, sub_type: Option<u32>) -> Option<u32> {
        self.passes(sub_type)?.iter().map(|pass| pass.distance).max()
    }
}

/// Validated rounds indexed by id.
#[derive(Clone, Debug, Default)]
pub struct RoundCatalog {
    rounds: BTreeMap<u32, RoundDefinition>,
}

impl RoundCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and admits a round, replacing any round with the same id.
    pub fn insert(&mut self, round: RoundDefinition) -> Result<(), ValidationError> {
        round.validate()?;
        self.rounds.insert(round.id, round);
        Ok(())
    }

    /// Builds a catalog, rejecting the whole set if any round is invalid.
    pub fn from_rounds(
        rounds: impl IntoIterator<Item = RoundDefinition>,
    ) -> Result<Self, ValidationError> {
        let mut catalog = Self::new();
        for round in rounds {
            catalog.insert(round)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, id: u32) -> Option<&RoundDefinition> {
        self.rounds.get(&id)
    }

    /// Finds a round by display name or legacy name (case and punctuation insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&RoundDefinition> {
        let wanted = normalize_name(name);
        self.rounds.values().find(|round| {
            normalize_name(&round.display_name) == wanted || round.name_hint() == wanted
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundDefinition> {
        self.rounds.values()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two-distance metric round with gents/ladies sub-types.
    pub(crate) fn two_distance_round() -> RoundDefinition {
        RoundDefinition {
            id: 7,
            display_name: "Test Double".into(),
            legacy_name: None,
            is_outdoor: true,
            is_metric: true,
            five_arrow_end: false,
            permitted_faces: vec![Face::Full],
            sub_types: vec![SubType::new(1, "Gents"), SubType::new(2, "Ladies")],
            arrow_counts: vec![
                DistanceArrowCount::new(1, 122.0, 36),
                DistanceArrowCount::new(2, 80.0, 36),
            ],
            distances: vec![
                RoundDistance::new(1, 1, 70),
                RoundDistance::new(2, 1, 50),
                RoundDistance::new(1, 2, 60),
                RoundDistance::new(2, 2, 50),
            ],
        }
    }

    #[test]
    fn passes_follow_distance_number_order() {
        let round = two_distance_round();
        let passes = round.passes(Some(2)).unwrap();
        assert_eq!(
            passes.iter().map(|p| p.distance).collect::<Vec<_>>(),
            vec![60, 50]
        );
        assert_eq!(passes[1].face_size_cm, 80.0);
    }

    #[test]
    fn resolves_default_sub_type() {
        let mut round = two_distance_round();
        assert_eq!(round.resolve_sub_type(None), Some(1));
        assert_eq!(round.resolve_sub_type(Some(3)), None);

        round.sub_types.clear();
        round.distances.retain(|d| d.sub_type_id == 1);
        assert_eq!(round.resolve_sub_type(None), Some(1));
        assert_eq!(round.max_distance(None), Some(70));
    }

    #[test]
    fn missing_arrow_counts_yield_no_passes() {
        let mut round = two_distance_round();
        round.arrow_counts.clear();
        assert!(round.passes(None).is_none());
    }

    #[test]
    fn catalog_lookup_by_name() {
        let catalog = RoundCatalog::from_rounds([two_distance_round()]).unwrap();
        assert_eq!(catalog.find_by_name("test-double").map(|r| r.id), Some(7));
        assert!(catalog.get(8).is_none());
    }

    #[test]
    fn face_names_parse_case_insensitively() {
        assert_eq!("triple".parse::<Face>().unwrap(), Face::Triple);
        assert_eq!("WORCESTER_FIVE".parse::<Face>().unwrap(), Face::WorcesterFive);
        assert_eq!(Face::FitaSix.to_string(), "FITA_SIX");
    }
}
