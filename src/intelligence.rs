//! Session intelligence: phase, zodiac and distance rule tables folded into
//! one practitioner-facing recommendation.
//!
//! ## Combination Rules
//! - **Frequencies**: the phase's ranked list, then the zodiac bonus only if
//!   no entry already has that exact Hz (first match wins)
//! - **Instruments**: phase instruments first, then zodiac-only additions,
//!   no duplicates
//! - **Avoid**: phase items then zodiac items, duplicates kept
//! - **Guidance**: fixed template, see [`combine`]

use crate::distance::DistanceClassification;
use crate::ephemeris::MoonState;
use crate::phase::{is_waxing, PhaseName};
use crate::profiles::{
    phase_profile, zodiac_profile, Frequency, FrequencyKind, PhaseProfile, ZodiacProfile,
    MOON_TONE_HZ,
};
use crate::zodiac::{ZodiacSign, ZodiacState};
use serde::Serialize;
use std::borrow::Cow;

/// Phase above which the guidance speaks of releasing energy.
const RELEASE_THRESHOLD: f64 = 0.525;

const SUPERMOON_TEXT: &str = "The moon is at perigee — exceptionally close to Earth. \
    Expect amplified emotional intensity. Sessions may feel more potent than usual.";
const MICROMOON_TEXT: &str = "The moon is near apogee — distant and reflective. \
    A good time for contemplative, introspective work.";
const WAXING_TEXT: &str = "Energy is building. Focus on growth, activation, and amplification.";
const WANING_TEXT: &str = "Energy is releasing. Focus on integration, surrender, and letting go.";

/// The Moon's synodic period octaved into the audible range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonTone {
    pub hz: f64,
    pub note: &'static str,
    pub label: &'static str,
}

pub const MOON_TONE: MoonTone = MoonTone {
    hz: MOON_TONE_HZ,
    note: "D#/Eb",
    label: "Synodic Moon tone (Cousto)",
};

/// Consolidated recommendation for one moment.
///
/// A pure function of its inputs; recompute it whenever they change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionIntelligence {
    pub phase_name: PhaseName,
    pub sign: ZodiacSign,
    pub phase: &'static PhaseProfile,
    pub zodiac: &'static ZodiacProfile,
    pub frequencies: Vec<Frequency>,
    pub instruments: Vec<&'static str>,
    pub avoid: Vec<&'static str>,
    pub guidance: String,
    pub distance: DistanceClassification,
    pub is_waxing: bool,
    pub subtitle: &'static str,
    pub quote: &'static str,
    pub moon_tone: MoonTone,
}

/// Look up both profiles and classify the distance, then [`combine`].
///
/// Distance is taken from the ephemeris state, not from the zodiac series.
pub fn build_session_intelligence(moon: &MoonState, zodiac: &ZodiacState) -> SessionIntelligence {
    combine(
        phase_profile(moon.phase_name),
        zodiac_profile(zodiac.sign),
        DistanceClassification::from_km(moon.distance_km),
        moon,
    )
}

/// Fold one phase profile, one zodiac profile and a distance class into a
/// recommendation for `moon`.
pub fn combine(
    phase: &'static PhaseProfile,
    zodiac: &'static ZodiacProfile,
    distance: DistanceClassification,
    moon: &MoonState,
) -> SessionIntelligence {
    let guidance = guidance_text(phase, zodiac, &distance, moon.phase);

    SessionIntelligence {
        phase_name: phase.phase,
        sign: zodiac.sign,
        phase,
        zodiac,
        frequencies: frequency_list(phase, zodiac),
        instruments: instrument_list(phase, zodiac),
        avoid: phase
            .avoid
            .iter()
            .chain(zodiac.avoid_instruments)
            .copied()
            .collect(),
        guidance,
        distance,
        is_waxing: is_waxing(moon.phase),
        subtitle: phase.subtitle,
        quote: phase.quote,
        moon_tone: MOON_TONE,
    }
}

fn frequency_list(phase: &PhaseProfile, zodiac: &ZodiacProfile) -> Vec<Frequency> {
    let mut frequencies = phase.frequencies.to_vec();
    if !frequencies.iter().any(|f| f.hz == zodiac.bonus_hz) {
        frequencies.push(Frequency {
            hz: zodiac.bonus_hz,
            label: Cow::Owned(format!("{} ({} bonus)", zodiac.bonus_label, zodiac.sign.name())),
            kind: FrequencyKind::Secondary,
        });
    }
    frequencies
}

fn instrument_list(phase: &PhaseProfile, zodiac: &ZodiacProfile) -> Vec<&'static str> {
    let mut instruments: Vec<&'static str> = Vec::new();
    for &name in phase.instruments.iter().chain(zodiac.instruments) {
        if !instruments.contains(&name) {
            instruments.push(name);
        }
    }
    instruments
}

fn guidance_text(
    phase: &PhaseProfile,
    zodiac: &ZodiacProfile,
    distance: &DistanceClassification,
    moon_phase: f64,
) -> String {
    let mut parts = vec![
        format!(
            "The {} in {} brings {} energy meeting {} {} influence.",
            phase.phase.display_name(),
            zodiac.sign.name(),
            phase.energy.to_lowercase(),
            zodiac.element().name().to_lowercase(),
            zodiac.quality().name().to_lowercase(),
        ),
        zodiac.session_mood.to_string(),
    ];

    if distance.is_supermoon {
        parts.push(SUPERMOON_TEXT.to_string());
    } else if distance.is_micromoon {
        parts.push(MICROMOON_TEXT.to_string());
    }

    if is_waxing(moon_phase) {
        parts.push(WAXING_TEXT.to_string());
    } else if moon_phase > RELEASE_THRESHOLD {
        parts.push(WANING_TEXT.to_string());
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn moon(phase: f64, distance_km: f64) -> MoonState {
        MoonState {
            instant: Utc.with_ymd_and_hms(2024, 1, 25, 18, 0, 0).unwrap(),
            phase,
            illumination: (1.0 - (phase * std::f64::consts::TAU).cos()) / 2.0,
            phase_name: PhaseName::from_phase(phase),
            bright_limb_angle: 0.0,
            altitude: 0.3,
            azimuth: 0.0,
            parallactic_angle: 0.0,
            distance_km,
            rise: None,
            set: None,
            always_above_horizon: false,
            always_below_horizon: false,
            is_above_horizon: true,
        }
    }

    fn zodiac(sign: ZodiacSign) -> ZodiacState {
        let lon = sign.index() as f64 * 30.0 + 10.0;
        ZodiacState {
            ecliptic_longitude_deg: lon,
            ecliptic_latitude_deg: 1.0,
            sign,
            degree_in_sign: 10.0,
            distance_km: 380_000.0,
        }
    }

    #[test]
    fn bonus_frequency_is_not_duplicated() {
        // Full Moon already prescribes 528 Hz; Leo's bonus is 528 Hz
        let session = build_session_intelligence(&moon(0.51, 380_000.0), &zodiac(ZodiacSign::Leo));
        let hz: Vec<f64> = session.frequencies.iter().map(|f| f.hz).collect();
        assert_eq!(hz, vec![432.0, 528.0, 210.42]);
        assert_eq!(session.frequencies[1].label, "Transformation (MI)");
    }

    #[test]
    fn bonus_frequency_is_appended_as_secondary() {
        let session =
            build_session_intelligence(&moon(0.51, 380_000.0), &zodiac(ZodiacSign::Aries));
        assert_eq!(session.frequencies.len(), 4);
        let bonus = &session.frequencies[3];
        assert_eq!(bonus.hz, 417.0);
        assert_eq!(bonus.kind, FrequencyKind::Secondary);
        assert_eq!(bonus.label, "Facilitating change (RE) (Aries bonus)");
    }

    #[test]
    fn instruments_union_keeps_phase_order_first() {
        let session = build_session_intelligence(&moon(0.51, 380_000.0), &zodiac(ZodiacSign::Leo));
        assert_eq!(
            session.instruments,
            vec!["Gong", "Large crystal bowls", "Drums", "Voice", "All instruments welcome"]
        );

        let session = build_session_intelligence(&moon(0.0, 380_000.0), &zodiac(ZodiacSign::Pisces));
        assert_eq!(
            session.instruments,
            vec![
                "Monochord",
                "Crystal singing bowls (low)",
                "Shruti box",
                "Ocean drum",
                "Crystal singing bowls",
                "Voice",
            ]
        );
    }

    #[test]
    fn avoid_list_is_plain_concatenation() {
        let session = build_session_intelligence(&moon(0.51, 380_000.0), &zodiac(ZodiacSign::Leo));
        assert_eq!(session.avoid.len(), 3);
        assert_eq!(session.avoid[2], "Overly subtle instruments — this energy wants presence");
    }

    #[test]
    fn guidance_for_a_waxing_supermoon() {
        let session =
            build_session_intelligence(&moon(0.3, 360_000.0), &zodiac(ZodiacSign::Scorpio));
        assert!(session.guidance.starts_with(
            "The Waxing Gibbous in Scorpio brings building, refining, almost full, anticipatory \
             energy meeting water fixed influence. Go deep."
        ));
        assert!(session.guidance.contains("at perigee"));
        assert!(session.guidance.ends_with(WAXING_TEXT));
        assert!(session.is_waxing);
    }

    #[test]
    fn guidance_for_a_waning_micromoon() {
        let session =
            build_session_intelligence(&moon(0.8, 406_000.0), &zodiac(ZodiacSign::Virgo));
        assert!(session.guidance.contains(MICROMOON_TEXT));
        assert!(!session.guidance.contains("perigee"));
        assert!(session.guidance.ends_with(WANING_TEXT));
        assert!(!session.is_waxing);
    }

    #[test]
    fn guidance_is_silent_inside_the_full_band() {
        let session = build_session_intelligence(&moon(0.51, 380_000.0), &zodiac(ZodiacSign::Leo));
        assert!(!session.guidance.contains(WAXING_TEXT));
        assert!(!session.guidance.contains(WANING_TEXT));
        assert!(session.guidance.ends_with("joyful movement."));
    }

    #[test]
    fn carries_phase_text_and_moon_tone() {
        let session = build_session_intelligence(&moon(0.0, 380_000.0), &zodiac(ZodiacSign::Aries));
        assert_eq!(session.subtitle, "Void & Beginning");
        assert_eq!(session.phase_name, PhaseName::NewMoon);
        assert_eq!(session.moon_tone.note, "D#/Eb");
        assert_eq!(session.distance.label, "Near average distance");
    }

    #[test]
    fn identical_inputs_give_identical_records() {
        let m = moon(0.66, 371_000.0);
        let z = zodiac(ZodiacSign::Libra);
        assert_eq!(build_session_intelligence(&m, &z), build_session_intelligence(&m, &z));
    }
}
