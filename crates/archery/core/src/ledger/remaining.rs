//! Arrows left to shoot at each distance of a round.

use crate::round::{DistanceUnit, RoundDefinition};

/// Arrows still to be shot at one distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemainingAtDistance {
    pub remaining: u32,
    pub distance: u32,
    pub unit: DistanceUnit,
}

/// Remaining arrows per distance, starting with the distance currently being shot.
///
/// Distances already completed are omitted. Once every distance is exhausted
/// the result is a single entry for the last distance with `remaining == 0`,
/// which marks the round as complete.
///
/// Returns `None` when the round shape cannot be resolved for the sub-type.
pub fn remaining_arrows(
    round: &RoundDefinition,
    sub_type: Option<u32>,
    arrows_shot: u32,
) -> Option<Vec<RemainingAtDistance>> {
    let passes = round.passes(sub_type)?;
    let unit = round.distance_unit();

    let mut shot_before = 0u32;
    let mut remaining = Vec::with_capacity(passes.len());
    for pass in &passes {
        let shot_here = arrows_shot.saturating_sub(shot_before).min(pass.arrow_count);
        let left = pass.arrow_count - shot_here;
        if left > 0 {
            remaining.push(RemainingAtDistance {
                remaining: left,
                distance: pass.distance,
                unit,
            });
        }
        shot_before += pass.arrow_count;
    }

    if remaining.is_empty() {
        let last = passes.last()?;
        remaining.push(RemainingAtDistance {
            remaining: 0,
            distance: last.distance,
            unit,
        });
    }
    Some(remaining)
}

/// Clamps a preferred end size to the arrows left at the current distance.
///
/// Without a resolvable round shape the preferred size is returned unchanged.
/// A completed round yields zero.
pub fn end_size_limit(
    round: Option<&RoundDefinition>,
    sub_type: Option<u32>,
    arrows_shot: u32,
    preferred_end_size: u32,
) -> u32 {
    let current = round
        .and_then(|round| remaining_arrows(round, sub_type, arrows_shot))
        .and_then(|remaining| remaining.first().copied());
    match current {
        Some(current) => preferred_end_size.min(current.remaining),
        None => preferred_end_size,
    }
}
