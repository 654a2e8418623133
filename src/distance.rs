//! Perigee/apogee classification of an Earth–Moon distance.

use serde::Serialize;

/// Closer than this is a supermoon, km.
pub const SUPERMOON_THRESHOLD_KM: f64 = 362_000.0;
/// Further than this is a micromoon, km.
pub const MICROMOON_THRESHOLD_KM: f64 = 405_000.0;
/// Closest physically possible perigee, km.
pub const PERIGEE_MIN_KM: f64 = 356_000.0;
/// Furthest physically possible apogee, km.
pub const APOGEE_MAX_KM: f64 = 406_700.0;

/// Derived from a distance; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceClassification {
    /// Distance rounded to the nearest km
    pub km: f64,
    /// 0 at the closest perigee, 1 at the furthest apogee
    pub normalised: f64,
    pub is_supermoon: bool,
    pub is_micromoon: bool,
    pub label: &'static str,
}

impl DistanceClassification {
    pub fn from_km(distance_km: f64) -> Self {
        let normalised = ((distance_km - PERIGEE_MIN_KM) / (APOGEE_MAX_KM - PERIGEE_MIN_KM))
            .clamp(0.0, 1.0);

        let label = if distance_km < SUPERMOON_THRESHOLD_KM {
            "Supermoon \u{00b7} Very close"
        } else if distance_km < 370_000.0 {
            "Closer than average"
        } else if distance_km < 385_000.0 {
            "Near average distance"
        } else if distance_km < 400_000.0 {
            "Further than average"
        } else {
            "Micromoon \u{00b7} Very distant"
        };

        Self {
            km: distance_km.round(),
            normalised,
            is_supermoon: distance_km < SUPERMOON_THRESHOLD_KM,
            is_micromoon: distance_km > MICROMOON_THRESHOLD_KM,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let close = DistanceClassification::from_km(360_000.0);
        assert!(close.is_supermoon && !close.is_micromoon);

        let far = DistanceClassification::from_km(406_000.0);
        assert!(far.is_micromoon && !far.is_supermoon);

        let average = DistanceClassification::from_km(380_000.0);
        assert!(!average.is_supermoon && !average.is_micromoon);
        assert_eq!(average.label, "Near average distance");
    }

    #[test]
    fn thresholds_are_strict() {
        assert!(!DistanceClassification::from_km(SUPERMOON_THRESHOLD_KM).is_supermoon);
        assert!(!DistanceClassification::from_km(MICROMOON_THRESHOLD_KM).is_micromoon);
    }

    #[test]
    fn normalisation_is_linear_and_clamped() {
        assert_eq!(DistanceClassification::from_km(PERIGEE_MIN_KM).normalised, 0.0);
        assert_eq!(DistanceClassification::from_km(APOGEE_MAX_KM).normalised, 1.0);
        let mid = DistanceClassification::from_km((PERIGEE_MIN_KM + APOGEE_MAX_KM) / 2.0);
        assert!((mid.normalised - 0.5).abs() < 1e-12);
        assert_eq!(DistanceClassification::from_km(300_000.0).normalised, 0.0);
        assert_eq!(DistanceClassification::from_km(500_000.0).normalised, 1.0);
    }

    #[test]
    fn labels_and_rounding() {
        assert_eq!(DistanceClassification::from_km(365_000.0).label, "Closer than average");
        assert_eq!(DistanceClassification::from_km(390_000.0).label, "Further than average");
        assert_eq!(
            DistanceClassification::from_km(402_000.0).label,
            "Micromoon \u{00b7} Very distant"
        );
        assert_eq!(DistanceClassification::from_km(384_400.4).km, 384_400.0);
    }
}
