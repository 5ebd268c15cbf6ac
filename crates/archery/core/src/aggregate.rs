//! Score sheets: per-end rows, per-distance subtotals and grand totals.
//!
//! Aggregation is a pure function of the arrows and the sheet layout, so it
//! is recomputed from scratch whenever the arrows change.

use crate::arrow::Arrow;
use crate::round::{DistanceUnit, Pass, RoundDefinition};

/// Which hits count as golds.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GoldsType {
    Nines,
    Tens,
    Xs,
}

impl GoldsType {
    /// Nines for imperial rounds, tens otherwise.
    pub fn default_for(round: Option<&RoundDefinition>) -> Self {
        match round {
            Some(round) if round.uses_imperial_scoring() => Self::Nines,
            _ => Self::Tens,
        }
    }

    pub fn is_gold(&self, arrow: &Arrow) -> bool {
        match self {
            Self::Nines => arrow.score() >= 9,
            Self::Tens => arrow.score() >= 10,
            Self::Xs => arrow.is_x(),
        }
    }
}

impl RoundDefinition {
    pub fn default_golds_type(&self) -> GoldsType {
        GoldsType::default_for(Some(self))
    }
}

/// Counts and score over a group of arrows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Totals {
    pub arrows: u32,
    pub hits: u32,
    pub score: u32,
    pub golds: u32,
    pub xs: u32,
}

impl Totals {
    pub fn of(arrows: &[Arrow], golds: GoldsType) -> Self {
        let mut totals = Self::default();
        for arrow in arrows {
            totals.add(arrow, golds);
        }
        totals
    }

    fn add(&mut self, arrow: &Arrow, golds: GoldsType) {
        self.arrows += 1;
        self.hits += u32::from(arrow.is_hit());
        self.score += u32::from(arrow.score());
        self.golds += u32::from(golds.is_gold(arrow));
        self.xs += u32::from(arrow.is_x());
    }

    fn merge(&mut self, other: &Totals) {
        self.arrows += other.arrows;
        self.hits += other.hits;
        self.score += other.score;
        self.golds += other.golds;
        self.xs += other.xs;
    }
}

/// One end of the sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndRow {
    /// 1-based across the whole sheet.
    pub end_number: u32,
    /// Arrow number of the end's first arrow.
    pub first_arrow: u32,
    pub arrows: Vec<Arrow>,
    pub totals: Totals,
    /// Score of every arrow up to and including this end.
    pub running_total: u32,
}

/// What a section of the sheet covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionKind {
    /// One distance of the round.
    Distance { distance: u32, unit: DistanceUnit },
    /// Arrows shot beyond the round's arrow count.
    Surplus,
    /// No round: every arrow in one section.
    Unbounded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    pub kind: SectionKind,
    pub ends: Vec<EndRow>,
    pub subtotal: Totals,
}

/// Aggregated rows for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreSheet {
    pub sections: Vec<Section>,
    /// Totals over every arrow, surplus included.
    pub grand_total: Totals,
}

impl ScoreSheet {
    /// Totals over the round's own distances, surplus excluded.
    pub fn round_total(&self) -> Totals {
        let mut totals = Totals::default();
        for section in &self.sections {
            if section.kind != SectionKind::Surplus {
                totals.merge(&section.subtotal);
            }
        }
        totals
    }

    pub fn surplus(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.kind == SectionKind::Surplus)
    }

    pub fn ends(&self) -> impl Iterator<Item = &EndRow> {
        self.sections.iter().flat_map(|section| section.ends.iter())
    }
}

/// Sheet layout: optional round shape, end size and golds rule.
#[derive(Clone, Copy, Debug)]
pub struct ScoreAggregator<'a> {
    round: Option<&'a RoundDefinition>,
    sub_type: Option<u32>,
    end_size: u32,
    golds: GoldsType,
}

impl<'a> ScoreAggregator<'a> {
    /// Layout without a round: ends of `end_size`, one section.
    pub fn new(end_size: u32, golds: GoldsType) -> Self {
        Self {
            round: None,
            sub_type: None,
            end_size,
            golds,
        }
    }

    /// Layout following a round, with its usual end size and golds rule.
    pub fn for_round(round: &'a RoundDefinition, sub_type: Option<u32>) -> Self {
        Self {
            round: Some(round),
            sub_type,
            end_size: round.default_end_size(),
            golds: round.default_golds_type(),
        }
    }

    #[must_use]
    pub fn with_end_size(mut self, end_size: u32) -> Self {
        self.end_size = end_size;
        self
    }

    #[must_use]
    pub fn with_golds(mut self, golds: GoldsType) -> Self {
        self.golds = golds;
        self
    }

    pub const fn golds(&self) -> GoldsType {
        self.golds
    }

    pub fn aggregate(&self, arrows: &[Arrow]) -> ScoreSheet {
        let passes = self
            .round
            .and_then(|round| Some((round.passes(self.sub_type)?, round.distance_unit())));

        let mut groups: Vec<(SectionKind, &[Arrow])> = Vec::new();
        match passes {
            Some((passes, unit)) => {
                let mut rest = arrows;
                for Pass {
                    distance,
                    arrow_count,
                    ..
                } in passes
                {
                    if rest.is_empty() {
                        break;
                    }
                    let (here, after) = rest.split_at(rest.len().min(arrow_count as usize));
                    groups.push((SectionKind::Distance { distance, unit }, here));
                    rest = after;
                }
                if !rest.is_empty() {
                    groups.push((SectionKind::Surplus, rest));
                }
            }
            None if arrows.is_empty() => {}
            None => groups.push((SectionKind::Unbounded, arrows)),
        }

        let end_size = self.end_size.max(1) as usize;
        let mut sheet = ScoreSheet::default();
        let mut end_number = 0;
        let mut first_arrow = 1;
        for (kind, group) in groups {
            let mut section = Section {
                kind,
                ends: Vec::new(),
                subtotal: Totals::default(),
            };
            for chunk in group.chunks(end_size) {
                end_number += 1;
                let totals = Totals::of(chunk, self.golds);
                section.subtotal.merge(&totals);
                sheet.grand_total.merge(&totals);
                section.ends.push(EndRow {
                    end_number,
                    first_arrow,
                    arrows: chunk.to_vec(),
                    totals,
                    running_total: sheet.grand_total.score,
                });
                first_arrow += chunk.len() as u32;
            }
            sheet.sections.push(section);
        }
        sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::tests::two_distance_round;

    fn arrows(scores: &[u8]) -> Vec<Arrow> {
        scores
            .iter()
            .map(|&score| Arrow::new(score, false).unwrap())
            .collect()
    }

    #[test]
    fn ends_without_round() {
        let mut shot = arrows(&[9, 9, 8, 0, 7, 10, 5]);
        shot.push(Arrow::x());
        let sheet = ScoreAggregator::new(3, GoldsType::Tens).aggregate(&shot);

        assert_eq!(sheet.sections.len(), 1);
        assert_eq!(sheet.sections[0].kind, SectionKind::Unbounded);
        let ends: Vec<_> = sheet.ends().collect();
        assert_eq!(ends.len(), 3);
        assert_eq!(ends[0].totals.score, 26);
        assert_eq!(ends[1].totals.hits, 2);
        assert_eq!(ends[1].first_arrow, 4);
        assert_eq!(ends[2].arrows.len(), 2);
        assert_eq!(ends[2].running_total, 58);
        assert_eq!(sheet.grand_total.golds, 2);
        assert_eq!(sheet.grand_total.xs, 1);
    }

    #[test]
    fn golds_rules() {
        let shot = [Arrow::x(), Arrow::new(10, false).unwrap(), Arrow::new(9, false).unwrap()];
        assert_eq!(Totals::of(&shot, GoldsType::Xs).golds, 1);
        assert_eq!(Totals::of(&shot, GoldsType::Tens).golds, 2);
        assert_eq!(Totals::of(&shot, GoldsType::Nines).golds, 3);
    }

    #[test]
    fn distances_split_and_surplus_collected() {
        let round = two_distance_round();
        let shot = arrows(&[8; 80]);
        let sheet = ScoreAggregator::for_round(&round, Some(1)).aggregate(&shot);

        assert_eq!(sheet.sections.len(), 3);
        assert_eq!(
            sheet.sections[0].kind,
            SectionKind::Distance {
                distance: 70,
                unit: DistanceUnit::Metres
            }
        );
        assert_eq!(sheet.sections[0].subtotal.arrows, 36);
        assert_eq!(sheet.sections[0].ends.len(), 6);
        assert_eq!(sheet.sections[1].subtotal.score, 36 * 8);
        let surplus = sheet.surplus().unwrap();
        assert_eq!(surplus.subtotal.arrows, 8);
        assert_eq!(sheet.round_total().arrows, 72);
        assert_eq!(sheet.grand_total.arrows, 80);
        assert_eq!(sheet.ends().last().unwrap().running_total, 640);
    }

    #[test]
    fn ends_do_not_cross_distances() {
        let round = two_distance_round();
        let shot = arrows(&[5; 40]);
        let sheet = ScoreAggregator::for_round(&round, None)
            .with_end_size(5)
            .aggregate(&shot);
        // 36 at the first distance: seven ends of five and one of one.
        assert_eq!(sheet.sections[0].ends.len(), 8);
        assert_eq!(sheet.sections[0].ends[7].arrows.len(), 1);
        assert_eq!(sheet.sections[1].ends[0].end_number, 9);
        assert_eq!(sheet.sections[1].ends[0].first_arrow, 37);
    }

    #[test]
    fn partial_round_lists_only_shot_distances() {
        let round = two_distance_round();
        let sheet = ScoreAggregator::for_round(&round, None).aggregate(&arrows(&[10; 12]));
        assert_eq!(sheet.sections.len(), 1);
        assert!(sheet.surplus().is_none());
        assert_eq!(sheet.grand_total.score, 120);
    }

    #[test]
    fn imperial_rounds_count_nines() {
        let mut round = two_distance_round();
        round.is_metric = false;
        assert_eq!(round.default_golds_type(), GoldsType::Nines);
        round.is_outdoor = false;
        assert_eq!(round.default_golds_type(), GoldsType::Tens);
        assert_eq!(GoldsType::default_for(None), GoldsType::Tens);
    }

    #[test]
    fn empty_sheet() {
        let sheet = ScoreAggregator::new(6, GoldsType::Tens).aggregate(&[]);
        assert!(sheet.sections.is_empty());
        assert_eq!(sheet.grand_total, Totals::default());
    }
}
