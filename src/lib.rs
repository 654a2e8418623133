//! # Lunar Practitioner Core Library
//!
//! This library computes the Moon's physical state and zodiac position for any
//! instant and place, draws the lit/shadowed disk, and combines phase, zodiac and
//! distance rule tables into a single "session intelligence" record for sound
//! practitioners.
//!
//! ## Design Philosophy
//!
//! ### Pure Computation
//! - **No hidden state**: every engine is a function of its explicit inputs, so
//!   the same `(latitude, longitude, instant)` always yields the same result
//! - **Never "now" by default**: instants are passed in; apart from the
//!   binary, only the calendar's `is_today` fallback reads the clock
//! - **Thread-safe**: nothing here locks, so callers may fan lookups out freely
//!
//! ### Two Independent Models
//! The phase/illumination/sky-position engine ([`ephemeris`]) uses a compact
//! low-precision model, while the zodiac locator ([`zodiac`]) evaluates a
//! longer periodic series ([`meeus`]). Their distances are reported as two
//! separately labelled fields and are never merged.
//!
//! ### Data Flow
//! 1. **Ephemeris**: `(lat, lon, instant)` → [`ephemeris::MoonState`]
//! 2. **Zodiac**: `instant` → [`zodiac::ZodiacState`] (async, series loaded once)
//! 3. **Intelligence**: both states → [`intelligence::SessionIntelligence`]
//! 4. **Rendering**: phase → [`terminator`] geometry → [`renderer`] pixels
//! 5. **Calendar**: steps 1–3 repeated per day by [`calendar`]
//!
//! ## Core Types
//!
//! Callers validate coordinates through [`Location::new`] before handing raw
//! degrees to the engines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Module declarations
pub mod astro;
pub mod audio;
pub mod calendar;
pub mod canvas;
pub mod config;
pub mod distance;
pub mod ephemeris;
pub mod intelligence;
pub mod meeus;
pub mod phase;
pub mod profiles;
pub mod renderer;
pub mod terminator;
pub mod zodiac;

/// Rejected observer coordinates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Latitude outside [-90, 90] degrees or not finite
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180] degrees or not finite
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// An already-validated observer position.
///
/// The engines themselves take plain `f64` degrees and do not re-validate;
/// this type is the checkpoint used by configuration and the CLI.
///
/// # Example
/// ```
/// use lunar_core_lib::Location;
///
/// let london = Location::new(51.5074, -0.1278).unwrap();
/// assert_eq!(london.latitude, 51.5074);
///
/// assert!(Location::new(91.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Degrees north, [-90, 90]
    pub latitude: f64,
    /// Degrees east, [-180, 180]
    pub longitude: f64,
}

impl Location {
    /// Validate and build a location.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InputError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InputError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InputError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_accepts_poles_and_antimeridian() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn location_rejects_out_of_range_and_nan() {
        assert_eq!(
            Location::new(-90.5, 0.0),
            Err(InputError::LatitudeOutOfRange(-90.5))
        );
        assert_eq!(
            Location::new(0.0, 181.0),
            Err(InputError::LongitudeOutOfRange(181.0))
        );
        assert!(Location::new(f64::NAN, 0.0).is_err());
        assert!(Location::new(0.0, f64::INFINITY).is_err());
    }
}
