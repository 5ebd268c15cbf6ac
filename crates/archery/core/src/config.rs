//! Scoring preferences.
//!
//! [`ScoringConfig`] holds the defaults a session falls back to: the handicap
//! system and inner-ten scoring, plus optional golds and end-size overrides.
//! `archery-content` reads it from `config.toml`.

use crate::aggregate::GoldsType;
use crate::handicap::HandicapSystem;
use crate::round::RoundDefinition;

/// Scoring preferences applied when none are given per session.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringConfig {
    pub handicap_system: HandicapSystem,
    /// Compound-style scoring: only the X ring counts as ten for handicaps.
    pub inner_ten_archer: bool,
    /// Golds rule used instead of the round's own.
    pub golds_override: Option<GoldsType>,
    /// End size used instead of the round's own.
    pub default_end_size: Option<u8>,
}

impl ScoringConfig {
    /// Arrows per end when neither config nor round says otherwise.
    pub const FALLBACK_END_SIZE: u32 = 6;
    /// Largest end size accepted from configuration.
    pub const MAX_END_SIZE: u8 = 12;

    pub fn new() -> Self {
        Self {
            handicap_system: HandicapSystem::default(),
            inner_ten_archer: false,
            golds_override: None,
            default_end_size: None,
        }
    }

    pub fn with_handicap_system(handicap_system: HandicapSystem) -> Self {
        Self {
            handicap_system,
            ..Self::new()
        }
    }

    /// End size for a session, preferring configuration over the round.
    pub fn end_size_for(&self, round: Option<&RoundDefinition>) -> u32 {
        match (self.default_end_size, round) {
            (Some(size), _) => u32::from(size.clamp(1, Self::MAX_END_SIZE)),
            (None, Some(round)) => round.default_end_size(),
            (None, None) => Self::FALLBACK_END_SIZE,
        }
    }

    pub fn golds_for(&self, round: Option<&RoundDefinition>) -> GoldsType {
        self.golds_override
            .unwrap_or_else(|| GoldsType::default_for(round))
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::tests::two_distance_round;

    #[test]
    fn overrides_win_over_round_defaults() {
        let round = two_distance_round();
        let mut config = ScoringConfig::default();
        assert_eq!(config.end_size_for(Some(&round)), 6);
        assert_eq!(config.end_size_for(None), ScoringConfig::FALLBACK_END_SIZE);
        assert_eq!(config.golds_for(Some(&round)), GoldsType::Tens);

        config.default_end_size = Some(3);
        config.golds_override = Some(GoldsType::Xs);
        assert_eq!(config.end_size_for(Some(&round)), 3);
        assert_eq!(config.golds_for(Some(&round)), GoldsType::Xs);

        config.default_end_size = Some(0);
        assert_eq!(config.end_size_for(None), 1);
    }
}
