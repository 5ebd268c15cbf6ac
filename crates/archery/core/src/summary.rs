//! Session statistics combining the score sheet with handicap and
//! classification lookups.

use crate::aggregate::{ScoreAggregator, ScoreSheet};
use crate::arrow::Arrow;
use crate::classification::{ArcherProfile, ClassificationResult, ClassificationTable};
use crate::config::ScoringConfig;
use crate::handicap::{HandicapOptions, HandicapTable};
use crate::ledger::{RemainingAtDistance, remaining_arrows};
use crate::round::{Face, RoundDefinition};

/// What a session was shot as and who shot it.
#[derive(Clone, Copy, Debug)]
pub struct SummaryContext<'a> {
    pub round: Option<&'a RoundDefinition>,
    pub sub_type: Option<u32>,
    pub face: Option<Face>,
    pub config: &'a ScoringConfig,
    pub archer: Option<ArcherProfile>,
    pub classifications: Option<&'a ClassificationTable>,
}

impl<'a> SummaryContext<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self {
            round: None,
            sub_type: None,
            face: None,
            config,
            archer: None,
            classifications: None,
        }
    }

    #[must_use]
    pub fn with_round(mut self, round: &'a RoundDefinition, sub_type: Option<u32>) -> Self {
        self.round = Some(round);
        self.sub_type = sub_type;
        self
    }

    #[must_use]
    pub fn with_face(mut self, face: Face) -> Self {
        self.face = Some(face);
        self
    }

    #[must_use]
    pub fn with_classifications(
        mut self,
        archer: ArcherProfile,
        table: &'a ClassificationTable,
    ) -> Self {
        self.archer = Some(archer);
        self.classifications = Some(table);
        self
    }
}

/// Statistics shown for a session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub sheet: ScoreSheet,
    /// `None` without a round.
    pub remaining: Option<Vec<RemainingAtDistance>>,
    pub is_complete: bool,
    /// Only for completed rounds with a usable shape.
    pub handicap: Option<f64>,
    /// Only for completed rounds with thresholds for the archer.
    pub classification: Option<ClassificationResult>,
}

impl SessionSummary {
    pub fn compute(arrows: &[Arrow], context: &SummaryContext<'_>) -> Self {
        let config = context.config;
        let aggregator = match context.round {
            Some(round) => ScoreAggregator::for_round(round, context.sub_type),
            None => ScoreAggregator::new(config.end_size_for(None), config.golds_for(None)),
        }
        .with_end_size(config.end_size_for(context.round))
        .with_golds(config.golds_for(context.round));
        let sheet = aggregator.aggregate(arrows);

        let shot = arrows.len() as u32;
        let remaining = context
            .round
            .and_then(|round| remaining_arrows(round, context.sub_type, shot));
        let is_complete = remaining
            .as_ref()
            .is_some_and(|remaining| remaining.iter().all(|r| r.remaining == 0));

        let mut summary = Self {
            sheet,
            remaining,
            is_complete,
            handicap: None,
            classification: None,
        };
        let Some(round) = context.round.filter(|_| is_complete) else {
            return summary;
        };

        let score = summary.sheet.round_total().score;
        let faces = context.face.map(|face| [face]);
        let mut options = HandicapOptions::new(config.handicap_system)
            .with_sub_type(context.sub_type)
            .with_inner_ten(config.inner_ten_archer);
        if let Some(faces) = faces.as_ref() {
            options = options.with_faces(faces);
        }
        summary.handicap = HandicapTable::new(round, &options)
            .map(|table| table.handicap_for_score(score));

        if let (Some(archer), Some(table)) = (context.archer, context.classifications) {
            summary.classification =
                table.classify(score, round, &archer, context.sub_type, context.face);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{AgeCategory, Bowstyle, Gender, Thresholds};
    use crate::round::tests::two_distance_round;

    fn eights(count: usize) -> Vec<Arrow> {
        vec![Arrow::new(8, false).unwrap(); count]
    }

    #[test]
    fn incomplete_round_has_no_handicap() {
        let round = two_distance_round();
        let config = ScoringConfig::default();
        let context = SummaryContext::new(&config).with_round(&round, Some(1));
        let summary = SessionSummary::compute(&eights(40), &context);

        assert!(!summary.is_complete);
        assert_eq!(summary.remaining.as_ref().unwrap()[0].remaining, 32);
        assert!(summary.handicap.is_none());
        assert_eq!(summary.sheet.grand_total.score, 320);
    }

    #[test]
    fn complete_round_gets_handicap_and_classification() {
        let round = two_distance_round();
        let config = ScoringConfig::default();
        let archer = ArcherProfile {
            bowstyle: Bowstyle::Recurve,
            gender: Gender::Male,
            age: AgeCategory::Adult,
        };
        let mut table = ClassificationTable::new();
        table
            .insert_thresholds(
                "Test Double",
                archer,
                Thresholds([300, 350, 400, 450, 500, 550, 600, 650, 700]),
            )
            .unwrap();
        let context = SummaryContext::new(&config)
            .with_round(&round, Some(1))
            .with_classifications(archer, &table);

        // Surplus arrows do not count towards the round score.
        let summary = SessionSummary::compute(&eights(74), &context);
        assert!(summary.is_complete);
        assert_eq!(summary.sheet.round_total().score, 576);

        let handicap = summary.handicap.unwrap();
        let expected = HandicapTable::new(&round, &HandicapOptions::default().with_sub_type(Some(1)))
            .unwrap()
            .handicap_for_score(576);
        assert_eq!(handicap, expected);

        let classification = summary.classification.unwrap();
        assert_eq!(
            classification.classification,
            crate::classification::Classification::Bowman1st
        );
        assert!(!classification.is_official);
    }

    #[test]
    fn no_round_uses_config_layout() {
        let config = ScoringConfig {
            default_end_size: Some(3),
            ..ScoringConfig::default()
        };
        let summary = SessionSummary::compute(&eights(7), &SummaryContext::new(&config));
        assert!(summary.remaining.is_none());
        assert!(!summary.is_complete);
        assert_eq!(summary.sheet.ends().count(), 3);
    }
}
