//! Structural validation of round definitions.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::{DEFAULT_SUB_TYPE_ID, RoundDefinition};
use crate::error::{ErrorSeverity, ScoringError};

/// A round definition failed validation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("round '{round}': {rule}")]
pub struct ValidationError {
    /// Display name of the offending round.
    pub round: String,
    pub rule: ValidationRule,
}

impl ValidationError {
    pub fn new(round: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            round: round.into(),
            rule,
        }
    }
}

/// The specific consistency rule a round definition violated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationRule {
    #[error("display name is empty")]
    EmptyDisplayName,

    #[error("no arrow counts")]
    NoArrowCounts,

    #[error("no distances")]
    NoDistances,

    #[error(
        "{distances} distances do not match {arrow_counts} arrow counts for {sub_types} sub-types"
    )]
    DistanceCountMismatch {
        arrow_counts: usize,
        sub_types: usize,
        distances: usize,
    },

    #[error("duplicate sub-type id {0}")]
    DuplicateSubTypeId(u32),

    #[error("duplicate arrow count for distance {0}")]
    DuplicateArrowCount(u32),

    #[error("duplicate distance {distance_number} for sub-type {sub_type_id}")]
    DuplicateDistance {
        sub_type_id: u32,
        distance_number: u32,
    },

    #[error("distance refers to unknown sub-type {0}")]
    UnknownSubType(u32),

    #[error("sub-type {sub_type_id} distance {distance_number} is longer than the one before it")]
    DistancesIncreasing {
        sub_type_id: u32,
        distance_number: u32,
    },

    #[error("sub-type {sub_type_id} distance numbers do not match the arrow counts")]
    DistanceNumbersMismatch { sub_type_id: u32 },

    #[error("arrow count for distance {0} is zero")]
    ZeroArrowCount(u32),

    #[error("face size for distance {0} is not positive")]
    InvalidFaceSize(u32),

    #[error("distance {0} is zero")]
    ZeroDistance(u32),

    #[error("sub-type {0} has no name")]
    MissingSubTypeName(u32),

    #[error("duplicate sub-type name '{0}'")]
    DuplicateSubTypeName(String),

    #[error("unknown face '{0}'")]
    UnknownFace(String),
}

impl ScoringError for ValidationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use ValidationRule::*;
        match self.rule {
            EmptyDisplayName => "ROUND_EMPTY_NAME",
            NoArrowCounts => "ROUND_NO_ARROW_COUNTS",
            NoDistances => "ROUND_NO_DISTANCES",
            DistanceCountMismatch { .. } => "ROUND_DISTANCE_COUNT_MISMATCH",
            DuplicateSubTypeId(_) => "ROUND_DUPLICATE_SUB_TYPE_ID",
            DuplicateArrowCount(_) => "ROUND_DUPLICATE_ARROW_COUNT",
            DuplicateDistance { .. } => "ROUND_DUPLICATE_DISTANCE",
            UnknownSubType(_) => "ROUND_UNKNOWN_SUB_TYPE",
            DistancesIncreasing { .. } => "ROUND_DISTANCES_INCREASING",
            DistanceNumbersMismatch { .. } => "ROUND_DISTANCE_NUMBERS_MISMATCH",
            ZeroArrowCount(_) => "ROUND_ZERO_ARROW_COUNT",
            InvalidFaceSize(_) => "ROUND_INVALID_FACE_SIZE",
            ZeroDistance(_) => "ROUND_ZERO_DISTANCE",
            MissingSubTypeName(_) => "ROUND_MISSING_SUB_TYPE_NAME",
            DuplicateSubTypeName(_) => "ROUND_DUPLICATE_SUB_TYPE_NAME",
            UnknownFace(_) => "ROUND_UNKNOWN_FACE",
        }
    }
}

/// Lower-cases a name and drops everything but letters and digits.
///
/// `"Bristol I"`, `"bristol-i"` and `"BRISTOL_I"` all normalize to `"bristoli"`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl RoundDefinition {
    /// Checks the definition's internal consistency.
    ///
    /// Rules are checked in a fixed order and the first violation is reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fail = |rule| Err(ValidationError::new(self.display_name.clone(), rule));

        if self.display_name.trim().is_empty() {
            return fail(ValidationRule::EmptyDisplayName);
        }
        if self.arrow_counts.is_empty() {
            return fail(ValidationRule::NoArrowCounts);
        }
        if self.distances.is_empty() {
            return fail(ValidationRule::NoDistances);
        }

        let expected = self.arrow_counts.len() * self.sub_types.len().max(1);
        if self.distances.len() != expected {
            return fail(ValidationRule::DistanceCountMismatch {
                arrow_counts: self.arrow_counts.len(),
                sub_types: self.sub_types.len(),
                distances: self.distances.len(),
            });
        }

        let mut sub_type_ids = BTreeSet::new();
        for sub_type in &self.sub_types {
            if !sub_type_ids.insert(sub_type.id) {
                return fail(ValidationRule::DuplicateSubTypeId(sub_type.id));
            }
        }
        if sub_type_ids.is_empty() {
            sub_type_ids.insert(DEFAULT_SUB_TYPE_ID);
        }

        let mut count_numbers = BTreeSet::new();
        for count in &self.arrow_counts {
            if !count_numbers.insert(count.distance_number) {
                return fail(ValidationRule::DuplicateArrowCount(count.distance_number));
            }
            if count.arrow_count == 0 {
                return fail(ValidationRule::ZeroArrowCount(count.distance_number));
            }
            if !(count.face_size_cm > 0.0) {
                return fail(ValidationRule::InvalidFaceSize(count.distance_number));
            }
        }

        let mut by_sub_type: BTreeMap<u32, BTreeMap<u32, u32>> = BTreeMap::new();
        for entry in &self.distances {
            if !sub_type_ids.contains(&entry.sub_type_id) {
                return fail(ValidationRule::UnknownSubType(entry.sub_type_id));
            }
            if entry.distance == 0 {
                return fail(ValidationRule::ZeroDistance(entry.distance_number));
            }
            let numbers = by_sub_type.entry(entry.sub_type_id).or_default();
            if numbers
                .insert(entry.distance_number, entry.distance)
                .is_some()
            {
                return fail(ValidationRule::DuplicateDistance {
                    sub_type_id: entry.sub_type_id,
                    distance_number: entry.distance_number,
                });
            }
        }

        for sub_type_id in &sub_type_ids {
            let Some(distances) = by_sub_type.get(sub_type_id) else {
                return fail(ValidationRule::DistanceNumbersMismatch {
                    sub_type_id: *sub_type_id,
                });
            };
            if !distances.keys().eq(count_numbers.iter()) {
                return fail(ValidationRule::DistanceNumbersMismatch {
                    sub_type_id: *sub_type_id,
                });
            }
            // BTreeMap iterates by ascending distance number.
            let mut previous = u32::MAX;
            for (number, distance) in distances {
                if *distance > previous {
                    return fail(ValidationRule::DistancesIncreasing {
                        sub_type_id: *sub_type_id,
                        distance_number: *number,
                    });
                }
                previous = *distance;
            }
        }

        if self.sub_types.len() > 1 {
            let mut names = HashSet::new();
            for sub_type in &self.sub_types {
                let normalized = normalize_name(&sub_type.name);
                if normalized.is_empty() {
                    return fail(ValidationRule::MissingSubTypeName(sub_type.id));
                }
                if !names.insert(normalized) {
                    return fail(ValidationRule::DuplicateSubTypeName(sub_type.name.clone()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::tests::two_distance_round;
    use crate::round::{DistanceArrowCount, RoundDistance, SubType};

    fn rule_of(round: &RoundDefinition) -> ValidationRule {
        round.validate().unwrap_err().rule
    }

    #[test]
    fn accepts_consistent_round() {
        two_distance_round().validate().unwrap();
    }

    #[test]
    fn accepts_single_sub_type_round() {
        let round = RoundDefinition {
            sub_types: vec![SubType::new(1, "")],
            distances: vec![RoundDistance::new(1, 1, 70), RoundDistance::new(2, 1, 60)],
            ..two_distance_round()
        };
        round.validate().unwrap();
    }

    #[test]
    fn rejects_mismatched_distance_count() {
        let mut round = two_distance_round();
        round.distances.pop();
        let err = round.validate().unwrap_err();
        assert_eq!(err.round, "Test Double");
        assert!(matches!(
            err.rule,
            ValidationRule::DistanceCountMismatch { distances: 3, .. }
        ));
    }

    #[test]
    fn rejects_duplicate_sub_type_ids() {
        let mut round = two_distance_round();
        round.sub_types[1].id = 1;
        assert_eq!(rule_of(&round), ValidationRule::DuplicateSubTypeId(1));
    }

    #[test]
    fn rejects_duplicate_distance_pairs() {
        let mut round = two_distance_round();
        round.distances[1].distance_number = 1;
        assert_eq!(
            rule_of(&round),
            ValidationRule::DuplicateDistance {
                sub_type_id: 1,
                distance_number: 1
            }
        );
    }

    #[test]
    fn rejects_increasing_distances() {
        let mut round = two_distance_round();
        round.distances[1].distance = 80;
        assert_eq!(
            rule_of(&round),
            ValidationRule::DistancesIncreasing {
                sub_type_id: 1,
                distance_number: 2
            }
        );
    }

    #[test]
    fn rejects_distance_numbers_not_in_arrow_counts() {
        let mut round = two_distance_round();
        round.distances[3].distance_number = 3;
        assert_eq!(
            rule_of(&round),
            ValidationRule::DistanceNumbersMismatch { sub_type_id: 2 }
        );
    }

    #[test]
    fn rejects_duplicate_normalized_sub_type_names() {
        let mut round = two_distance_round();
        round.sub_types[0].name = "Bristol I".into();
        round.sub_types[1].name = "bristol-i".into();
        assert_eq!(
            rule_of(&round),
            ValidationRule::DuplicateSubTypeName("bristol-i".into())
        );
    }

    #[test]
    fn rejects_blank_sub_type_names_when_several() {
        let mut round = two_distance_round();
        round.sub_types[1].name = "  ".into();
        assert_eq!(rule_of(&round), ValidationRule::MissingSubTypeName(2));
    }

    #[test]
    fn rejects_empty_counts_and_distances() {
        let mut round = two_distance_round();
        round.arrow_counts.clear();
        assert_eq!(rule_of(&round), ValidationRule::NoArrowCounts);

        let mut round = two_distance_round();
        round.distances.clear();
        assert_eq!(rule_of(&round), ValidationRule::NoDistances);
    }

    #[test]
    fn rejects_unknown_sub_type_reference() {
        let mut round = two_distance_round();
        round.distances[3].sub_type_id = 9;
        assert_eq!(rule_of(&round), ValidationRule::UnknownSubType(9));
    }

    #[test]
    fn rejects_zero_arrow_count() {
        let mut round = two_distance_round();
        round.arrow_counts[0] = DistanceArrowCount::new(1, 122.0, 0);
        assert_eq!(rule_of(&round), ValidationRule::ZeroArrowCount(1));
    }

    #[test]
    fn error_message_names_round_and_rule() {
        let mut round = two_distance_round();
        round.arrow_counts.clear();
        assert_eq!(
            round.validate().unwrap_err().to_string(),
            "round 'Test Double': no arrow counts"
        );
    }
}
