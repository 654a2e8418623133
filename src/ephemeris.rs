//! # Ephemeris Engine
//!
//! Computes the Moon's observable state for an observer and instant: synodic
//! phase, illuminated fraction, sky position, distance, and the day's rise and
//! set times.
//!
//! ## Model Characteristics
//!
//! ### Phase & Illumination
//! - **Phase angle**: from the geocentric elongation of the compact Moon model
//!   against the mean Sun ([`crate::astro`])
//! - **Phase fraction**: 0 = new, 0.5 = full, always reported in [0, 1)
//! - **Bright limb**: position angle of the lit limb's midpoint, used only to
//!   decide waxing vs waning
//!
//! ### Rise & Set
//! - **Window**: the local-mean-time day (offset `longitude / 15` hours) that
//!   contains the instant
//! - **Search**: altitude sampled hourly, a parabola fitted through every
//!   2-hour triple, roots inside the segment taken as events
//! - **Horizon**: 0.133° above the geometric horizon (mean lunar parallax,
//!   semidiameter and refraction folded together)
//! - **No event**: `None`, which is a normal outcome; when neither event
//!   occurs the Moon is flagged as always above or always below the horizon
//!
//! ### Accuracy Trade-offs
//! - ✅ **Phase bucket**: well inside the ±0.0125 margin of the narrow buckets
//! - ✅ **Deterministic**: pure function of `(latitude, longitude, instant)`
//! - ❌ **Position**: about a degree; the zodiac locator uses its own series
//! - ❌ **Rise/set**: a few minutes

use crate::astro::{
    self, astro_refraction, days_since_j2000, horizontal, moon_coords, sidereal_time, sun_coords,
    RAD, SUN_DISTANCE_KM,
};
use crate::phase::PhaseName;
use chrono::{DateTime, Duration, Utc};
use core::f64::consts::PI;
use serde::{Deserialize, Serialize};

/// Altitude of the Moon's centre at rise/set, radians.
const RISE_SET_ALTITUDE: f64 = 0.133 * RAD;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: i64 = 86_400_000;

/// Upper bound for the next-transition scan, in hours (30 days).
pub const TRANSITION_SEARCH_HOURS: u32 = 30 * 24;

/// Everything the engine knows about the Moon at one instant and place.
///
/// Immutable snapshot; a new one is computed on every poll or location change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonState {
    /// Instant this snapshot describes
    pub instant: DateTime<Utc>,
    /// Synodic phase in [0, 1): 0 = new, 0.5 = full
    pub phase: f64,
    /// Illuminated fraction of the disk, [0, 1]
    pub illumination: f64,
    /// Named bucket derived from `phase`
    pub phase_name: PhaseName,
    /// Position angle of the bright limb midpoint, radians
    pub bright_limb_angle: f64,
    /// Apparent altitude including refraction, radians
    pub altitude: f64,
    /// Azimuth from south, positive westward, radians
    pub azimuth: f64,
    /// Parallactic angle, radians
    pub parallactic_angle: f64,
    /// Geocentric distance from the phase model, km
    pub distance_km: f64,
    /// Moonrise inside the local day, if any
    pub rise: Option<DateTime<Utc>>,
    /// Moonset inside the local day, if any
    pub set: Option<DateTime<Utc>>,
    /// Neither event today and the Moon stays up
    pub always_above_horizon: bool,
    /// Neither event today and the Moon stays down
    pub always_below_horizon: bool,
    /// Altitude above zero at `instant`
    pub is_above_horizon: bool,
}

/// Phase portion of [`MoonState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Illumination {
    pub phase: f64,
    pub fraction: f64,
    pub angle: f64,
}

/// Sky-position portion of [`MoonState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPosition {
    pub azimuth: f64,
    pub altitude: f64,
    pub distance_km: f64,
    pub parallactic_angle: f64,
}

/// Rise/set portion of [`MoonState`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoonTimes {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
    pub always_up: bool,
    pub always_down: bool,
}

/// First bucket change after a start instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Bucket entered at `instant` (the current bucket if none was found)
    pub phase: PhaseName,
    /// First hourly probe showing the new bucket
    pub instant: DateTime<Utc>,
    /// Whole hours from the start instant
    pub hours_until: u32,
}

/// Compute the full Moon state for an observer.
///
/// Total for finite inputs; NaN coordinates propagate into the angular fields
/// instead of panicking.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use lunar_core_lib::ephemeris::compute_moon_state;
/// use lunar_core_lib::phase::PhaseName;
///
/// // New moon of 2024-01-11 11:57 UTC seen from London
/// let at = Utc.with_ymd_and_hms(2024, 1, 11, 11, 57, 0).unwrap();
/// let moon = compute_moon_state(51.5074, -0.1278, at);
/// assert_eq!(moon.phase_name, PhaseName::NewMoon);
/// assert!(moon.illumination < 0.03);
/// ```
pub fn compute_moon_state(latitude: f64, longitude: f64, instant: DateTime<Utc>) -> MoonState {
    let illumination = moon_illumination(instant);
    let position = moon_position(latitude, longitude, instant);
    let times = moon_times(latitude, longitude, instant);

    MoonState {
        instant,
        phase: illumination.phase,
        illumination: illumination.fraction,
        phase_name: PhaseName::from_phase(illumination.phase),
        bright_limb_angle: illumination.angle,
        altitude: position.altitude,
        azimuth: position.azimuth,
        parallactic_angle: position.parallactic_angle,
        distance_km: position.distance_km,
        rise: times.rise,
        set: times.set,
        always_above_horizon: times.always_up,
        always_below_horizon: times.always_down,
        is_above_horizon: position.altitude > 0.0,
    }
}

/// Phase fraction, illuminated fraction and bright-limb angle.
pub fn moon_illumination(instant: DateTime<Utc>) -> Illumination {
    illumination_at(days_since_j2000(instant))
}

fn illumination_at(days: f64) -> Illumination {
    let sun = sun_coords(days);
    let moon = moon_coords(days);
    let m = moon.equatorial;

    let dra = sun.right_ascension - m.right_ascension;

    // geocentric elongation of the Moon from the Sun
    let elongation = (sun.declination.sin() * m.declination.sin()
        + sun.declination.cos() * m.declination.cos() * dra.cos())
    .clamp(-1.0, 1.0)
    .acos();
    // Sun–Moon–Earth phase angle
    let inc = (SUN_DISTANCE_KM * elongation.sin())
        .atan2(moon.distance_km - SUN_DISTANCE_KM * elongation.cos());
    let angle = (sun.declination.cos() * dra.sin()).atan2(
        sun.declination.sin() * m.declination.cos()
            - sun.declination.cos() * m.declination.sin() * dra.cos(),
    );

    let side = if angle < 0.0 { -1.0 } else { 1.0 };
    let phase = (0.5 + 0.5 * inc * side / PI).rem_euclid(1.0);

    Illumination {
        phase,
        fraction: (1.0 + inc.cos()) / 2.0,
        angle,
    }
}

/// Topocentric altitude/azimuth (refracted) and distance.
pub fn moon_position(latitude: f64, longitude: f64, instant: DateTime<Utc>) -> MoonPosition {
    position_at(days_since_j2000(instant), latitude * RAD, -longitude * RAD)
}

fn position_at(days: f64, phi: f64, lw: f64) -> MoonPosition {
    let moon = moon_coords(days);
    let dec = moon.equatorial.declination;
    let hour_angle = sidereal_time(days, lw) - moon.equatorial.right_ascension;
    let sky = horizontal(hour_angle, phi, dec);
    let parallactic_angle = hour_angle
        .sin()
        .atan2(phi.tan() * dec.cos() - dec.sin() * hour_angle.cos());

    MoonPosition {
        azimuth: sky.azimuth,
        altitude: sky.altitude + astro_refraction(sky.altitude),
        distance_km: moon.distance_km,
        parallactic_angle,
    }
}

/// Start of the local-mean-time day containing `instant`.
pub fn local_day_start(longitude: f64, instant: DateTime<Utc>) -> DateTime<Utc> {
    let offset_ms = if longitude.is_finite() {
        (longitude / 15.0 * MS_PER_HOUR).round() as i64
    } else {
        0
    };
    let ms = instant.timestamp_millis();
    let start_ms = (ms + offset_ms).div_euclid(MS_PER_DAY) * MS_PER_DAY - offset_ms;
    instant
        .checked_sub_signed(Duration::milliseconds(ms - start_ms))
        .unwrap_or(instant)
}

fn hours_later(start: DateTime<Utc>, hours: f64) -> Option<DateTime<Utc>> {
    start.checked_add_signed(Duration::milliseconds((hours * MS_PER_HOUR).round() as i64))
}

/// Moonrise and moonset within the local day containing `instant`.
pub fn moon_times(latitude: f64, longitude: f64, instant: DateTime<Utc>) -> MoonTimes {
    let start = local_day_start(longitude, instant);
    let d0 = days_since_j2000(start);
    let (phi, lw) = (latitude * RAD, -longitude * RAD);
    let altitude = |hours: f64| position_at(d0 + hours / 24.0, phi, lw).altitude - RISE_SET_ALTITUDE;

    let mut h0 = altitude(0.0);
    let mut rise = None;
    let mut set = None;
    let mut ye = 0.0;

    let mut i = 1.0;
    while i <= 24.0 {
        let h1 = altitude(i);
        let h2 = altitude(i + 1.0);

        // parabola through (−1, h0), (0, h1), (1, h2)
        let a = (h0 + h2) / 2.0 - h1;
        let b = (h2 - h0) / 2.0;
        let xe = -b / (2.0 * a);
        ye = (a * xe + b) * xe + h1;
        let d = b * b - 4.0 * a * h1;

        if d >= 0.0 {
            let dx = d.sqrt() / (a.abs() * 2.0);
            let mut x1 = xe - dx;
            let x2 = xe + dx;
            let roots = [x1, x2].iter().filter(|x| x.abs() <= 1.0).count();
            if x1 < -1.0 {
                x1 = x2;
            }

            match roots {
                1 if h0 < 0.0 => rise = Some(i + x1),
                1 => set = Some(i + x1),
                2 => {
                    let (up, down) = if ye < 0.0 { (x2, x1) } else { (x1, x2) };
                    rise = Some(i + up);
                    set = Some(i + down);
                }
                _ => {}
            }
        }

        if rise.is_some() && set.is_some() {
            break;
        }
        h0 = h2;
        i += 2.0;
    }

    let none_today = rise.is_none() && set.is_none();
    MoonTimes {
        rise: rise.and_then(|h| hours_later(start, h)),
        set: set.and_then(|h| hours_later(start, h)),
        always_up: none_today && ye > 0.0,
        always_down: none_today && !(ye > 0.0),
    }
}

/// Scan forward hour by hour for the next phase-bucket change.
///
/// Bounded to [`TRANSITION_SEARCH_HOURS`]; if nothing changes in that span the
/// current bucket is returned with the last probed instant.
pub fn next_phase_transition(start: DateTime<Utc>) -> PhaseTransition {
    let current = PhaseName::from_phase(moon_illumination(start).phase);
    let mut probe = start;
    let mut hours = 0;

    for hour in 1..=TRANSITION_SEARCH_HOURS {
        let Some(at) = start.checked_add_signed(Duration::hours(hour as i64)) else {
            break;
        };
        probe = at;
        hours = hour;
        let name = PhaseName::from_phase(moon_illumination(at).phase);
        if name != current {
            return PhaseTransition {
                phase: name,
                instant: at,
                hours_until: hour,
            };
        }
    }

    PhaseTransition {
        phase: current,
        instant: probe,
        hours_until: hours,
    }
}

/// Time the Moon spends up between a rise and a set, if both exist.
pub fn moon_duration(
    rise: Option<DateTime<Utc>>,
    set: Option<DateTime<Utc>>,
) -> Option<Duration> {
    let (rise, set) = (rise?, set?);
    Some((set - rise).abs())
}

/// Format a duration as "Xh Ym".
pub fn format_duration_hm(duration: Duration) -> String {
    let minutes = duration.num_minutes().abs();
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Format whole hours as "N days, M hours" with singular forms.
pub fn format_time_until(hours_until: u32) -> String {
    let days = hours_until / 24;
    let hours = hours_until % 24;
    let plural = |n: u32, unit: &str| format!("{n} {unit}{}", if n == 1 { "" } else { "s" });

    match (days, hours) {
        (0, h) => plural(h, "hour"),
        (d, 0) => plural(d, "day"),
        (d, h) => format!("{}, {}", plural(d, "day"), plural(h, "hour")),
    }
}

/// Synodic phase at a Julian-day offset; used by batch callers that already
/// hold day numbers.
pub fn phase_at_days(days: f64) -> f64 {
    illumination_at(days).phase
}

/// Convenience for callers holding a Julian day rather than an instant.
pub fn phase_at_julian_day(jd: f64) -> f64 {
    phase_at_days(jd - astro::J2000)
}
