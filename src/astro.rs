//! Low-precision positional astronomy shared by the ephemeris engine.
//!
//! Mean-element Sun and Moon (a handful of periodic terms, good to about a
//! degree), Julian-day bookkeeping, sidereal time and the equatorial →
//! horizontal transform.
//! References: Meeus, *Astronomical Algorithms* 2nd ed. (ch. 7, 12, 13, 16);
//! Espenak & Meeus (2006) polynomial ΔT expressions.

use chrono::{DateTime, Utc};
use core::f64::consts::PI;

/// Degrees → radians.
pub const RAD: f64 = PI / 180.0;

/// Julian day of the Unix epoch.
const J1970: f64 = 2_440_588.0;

/// Julian day of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000: f64 = 2_451_545.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Mean obliquity of the ecliptic near J2000.
const OBLIQUITY: f64 = 23.4397 * RAD;

/// Mean Sun–Earth distance in km, used for the Moon's phase angle.
pub const SUN_DISTANCE_KM: f64 = 149_598_000.0;

/// Equatorial coordinates in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equatorial {
    pub right_ascension: f64,
    pub declination: f64,
}

/// Topocentric horizontal coordinates in radians.
///
/// Azimuth is measured from south, positive toward the west.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub azimuth: f64,
    pub altitude: f64,
}

/// Geocentric Moon from the compact model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonCoords {
    pub equatorial: Equatorial,
    /// Distance Earth centre → Moon centre in km.
    pub distance_km: f64,
}

/// Julian day (UT) of an instant, with millisecond resolution.
pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / MS_PER_DAY - 0.5 + J1970
}

/// Days elapsed since J2000.0 (UT based).
pub fn days_since_j2000(instant: DateTime<Utc>) -> f64 {
    julian_day(instant) - J2000
}

/// TT − UT in seconds for a decimal year.
pub fn delta_t_seconds(year: f64) -> f64 {
    let long_term = |y: f64| {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    };

    if (1941.0..1961.0).contains(&year) {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t.powi(3) / 2547.0
    } else if (1961.0..1986.0).contains(&year) {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if (1986.0..2005.0).contains(&year) {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if (2005.0..2050.0).contains(&year) {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else if (2050.0..2150.0).contains(&year) {
        long_term(year) - 0.5628 * (2150.0 - year)
    } else {
        long_term(year)
    }
}

/// Julian Ephemeris Day (TT) of an instant.
pub fn julian_ephemeris_day(instant: DateTime<Utc>) -> f64 {
    let jd = julian_day(instant);
    let year = 2000.0 + (jd - J2000) / 365.25;
    jd + delta_t_seconds(year) / 86_400.0
}

/// Ecliptic (λ, β) → right ascension, radians.
pub fn right_ascension(lon: f64, lat: f64) -> f64 {
    (lon.sin() * OBLIQUITY.cos() - lat.tan() * OBLIQUITY.sin()).atan2(lon.cos())
}

/// Ecliptic (λ, β) → declination, radians.
pub fn declination(lon: f64, lat: f64) -> f64 {
    (lat.sin() * OBLIQUITY.cos() + lat.cos() * OBLIQUITY.sin() * lon.sin()).asin()
}

/// Local sidereal time in radians; `lw` is west longitude in radians.
pub fn sidereal_time(days: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.985_623_5 * days) - lw
}

/// Hour angle / latitude / declination → azimuth (from south) and altitude.
pub fn horizontal(hour_angle: f64, phi: f64, dec: f64) -> Horizontal {
    Horizontal {
        azimuth: hour_angle
            .sin()
            .atan2(hour_angle.cos() * phi.sin() - dec.tan() * phi.cos()),
        altitude: (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos()).asin(),
    }
}

/// Atmospheric refraction in radians for a true altitude in radians.
///
/// Saemundsson's formula; altitudes below the horizon are treated as zero so
/// the correction stays finite.
pub fn astro_refraction(altitude: f64) -> f64 {
    let h = altitude.max(0.0);
    0.000_296_7 / (h + 0.003_125_36 / (h + 0.089_011_79)).tan()
}

/// Mean anomaly of the Sun, radians.
fn solar_mean_anomaly(days: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * days)
}

/// Apparent ecliptic longitude of the Sun, radians.
fn solar_ecliptic_longitude(mean_anomaly: f64) -> f64 {
    // equation of centre
    let c = RAD
        * (1.9148 * mean_anomaly.sin()
            + 0.02 * (2.0 * mean_anomaly).sin()
            + 0.0003 * (3.0 * mean_anomaly).sin());
    // perihelion of the Earth
    let perihelion = RAD * 102.9372;
    mean_anomaly + c + perihelion + PI
}

/// Geocentric equatorial Sun.
pub fn sun_coords(days: f64) -> Equatorial {
    let lon = solar_ecliptic_longitude(solar_mean_anomaly(days));
    Equatorial {
        right_ascension: right_ascension(lon, 0.0),
        declination: declination(lon, 0.0),
    }
}

/// Geocentric equatorial Moon from three mean elements and their leading
/// periodic terms.
pub fn moon_coords(days: f64) -> MoonCoords {
    // ---------- mean elements --------------------------------------------------
    let mean_longitude = RAD * (218.316 + 13.176_396 * days);
    let mean_anomaly = RAD * (134.963 + 13.064_993 * days);
    let mean_distance = RAD * (93.272 + 13.229_350 * days);

    // ---------- leading perturbations -----------------------------------------
    let lon = mean_longitude + RAD * 6.289 * mean_anomaly.sin();
    let lat = RAD * 5.128 * mean_distance.sin();
    let distance_km = 385_001.0 - 20_905.0 * mean_anomaly.cos();

    MoonCoords {
        equatorial: Equatorial {
            right_ascension: right_ascension(lon, lat),
            declination: declination(lon, lat),
        },
        distance_km,
    }
}
