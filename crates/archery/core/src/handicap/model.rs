//! Arrow-group dispersion model and per-face expected scores.
//!
//! Both handicap systems model an archer's group as a circular normal
//! distribution whose angular spread grows geometrically with handicap. The
//! probability that an arrow lands outside radius `a` is `exp(-(a / σ)²)`,
//! from which the expected score of each face layout follows.

use super::HandicapSystem;
use crate::round::Face;

const ANGULAR_DATUM_RAD: f64 = 5.0e-4;

// 2023 model.
const AGB_DATUM: f64 = 6.0;
const AGB_STEP_PERCENT: f64 = 3.5;
const AGB_DISTANCE_FACTOR: f64 = 0.00365;

// Legacy model.
const LEGACY_DATUM: f64 = 12.9;
const LEGACY_STEP_PERCENT: f64 = 3.6;
const LEGACY_K1: f64 = 1.429e-6;
const LEGACY_K2: f64 = 1.07;
const LEGACY_K3: f64 = 4.3;

/// Arrow diameters in metres.
const LEGACY_ARROW_DIAMETER: f64 = 7.14e-3;
const AGB_OUTDOOR_ARROW_DIAMETER: f64 = 5.5e-3;
const AGB_INDOOR_ARROW_DIAMETER: f64 = 9.3e-3;

/// Scoring layout of one pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ZoneScoring {
    /// Ten-zone metric scoring on the given face.
    Metric(Face),
    /// Five-zone 9-7-5-3-1 scoring.
    Imperial,
    /// Five-zone 5-4-3-2-1 scoring.
    Worcester,
    /// Only the Worcester centre scores.
    WorcesterFive,
}

impl ZoneScoring {
    pub(crate) fn for_face(face: Face, imperial: bool) -> Self {
        match face {
            Face::Worcester => Self::Worcester,
            Face::WorcesterFive => Self::WorcesterFive,
            _ if imperial => Self::Imperial,
            other => Self::Metric(other),
        }
    }

    pub(crate) const fn max_arrow_score(&self) -> u32 {
        match self {
            Self::Metric(_) => 10,
            Self::Imperial => 9,
            Self::Worcester | Self::WorcesterFive => 5,
        }
    }
}

impl HandicapSystem {
    /// Angular standard deviation of the group, in radians.
    fn sigma_theta(&self, handicap: f64, distance_m: f64) -> f64 {
        match self {
            Self::Agb2023 => {
                ANGULAR_DATUM_RAD
                    * (1.0 + AGB_STEP_PERCENT / 100.0).powf(handicap + AGB_DATUM)
                    * (AGB_DISTANCE_FACTOR * distance_m).exp()
            }
            Self::Legacy => {
                ANGULAR_DATUM_RAD
                    * (1.0 + LEGACY_STEP_PERCENT / 100.0).powf(handicap + LEGACY_DATUM)
                    * (LEGACY_K1 * LEGACY_K2.powf(handicap + LEGACY_K3) * distance_m.powi(2)).exp()
            }
        }
    }

    /// Radial standard deviation of the group at the target, in metres.
    pub(crate) fn sigma_radial(&self, handicap: f64, distance_m: f64) -> f64 {
        distance_m * self.sigma_theta(handicap, distance_m)
    }

    /// Arrow radius in metres.
    pub(crate) const fn arrow_radius(&self, outdoor: bool) -> f64 {
        let diameter = match (self, outdoor) {
            (Self::Legacy, _) => LEGACY_ARROW_DIAMETER,
            (Self::Agb2023, true) => AGB_OUTDOOR_ARROW_DIAMETER,
            (Self::Agb2023, false) => AGB_INDOOR_ARROW_DIAMETER,
        };
        diameter / 2.0
    }
}

/// Expected score of a single arrow.
///
/// `inner_ten` narrows the ten ring of metric faces to the X ring.
pub(crate) fn expected_arrow_score(
    scoring: ZoneScoring,
    inner_ten: bool,
    face_diameter_m: f64,
    arrow_radius_m: f64,
    sigma_r: f64,
) -> f64 {
    // Probability of landing outside a ring of the given radius (arrow edge counts).
    let outside = |radius: f64| (-((radius + arrow_radius_m) / sigma_r).powi(2)).exp();

    match scoring {
        ZoneScoring::Metric(face) => {
            let ring = face_diameter_m / 20.0;
            let ten = if inner_ten {
                outside(ring / 2.0)
            } else {
                outside(ring)
            };
            let rings = |from: u32, to: u32| -> f64 {
                (from..=to).map(|n| outside(n as f64 * ring)).sum()
            };
            match face {
                Face::Triple => 10.0 - ten - rings(2, 4) - 6.0 * outside(5.0 * ring),
                Face::FitaSix => 10.0 - ten - rings(2, 5) - 5.0 * outside(6.0 * ring),
                _ => 10.0 - ten - rings(2, 10),
            }
        }
        ZoneScoring::Imperial => {
            let ring = face_diameter_m / 10.0;
            let inner: f64 = (1..=4).map(|n| outside(n as f64 * ring)).sum();
            9.0 - 2.0 * inner - outside(5.0 * ring)
        }
        ZoneScoring::Worcester => {
            let ring = face_diameter_m / 10.0;
            5.0 - (1..=5).map(|n| outside(n as f64 * ring)).sum::<f64>()
        }
        ZoneScoring::WorcesterFive => {
            let ring = face_diameter_m / 10.0;
            5.0 - 5.0 * outside(ring)
        }
    }
}
