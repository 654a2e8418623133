//! # End-to-End Engine Scenarios
//!
//! These tests drive the library the way the CLI does: resolve a location,
//! compute the moon state, look up the zodiac sign, assemble the session and
//! render reports. Instants are fixed so results never depend on the clock.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use lunar_core_lib::calendar::compute_calendar_window;
use lunar_core_lib::canvas::GrayCanvas;
use lunar_core_lib::ephemeris::compute_moon_state;
use lunar_core_lib::phase::PhaseName;
use lunar_core_lib::renderer::draw_moon_mono;
use lunar_core_lib::zodiac::{ZodiacError, ZodiacLocator, ZodiacSign, ZodiacSource, ZodiacState};
use lunar_core_lib::Location;
use std::sync::Arc;

use crate::report::{self, Snapshot};

fn london() -> Location {
    Location::new(51.5074, -0.1278).unwrap()
}

/// Zodiac source whose series is never available.
struct OfflineSource;

#[async_trait]
impl ZodiacSource for OfflineSource {
    async fn zodiac_state(&self, _instant: DateTime<Utc>) -> Result<ZodiacState, ZodiacError> {
        Err(ZodiacError::ResourceUnavailable("offline".into()))
    }
}

/// Fails for a single date, delegates otherwise.
struct OneBadDay {
    bad: NaiveDate,
    inner: ZodiacLocator,
}

#[async_trait]
impl ZodiacSource for OneBadDay {
    async fn zodiac_state(&self, instant: DateTime<Utc>) -> Result<ZodiacState, ZodiacError> {
        if instant.date_naive() == self.bad {
            return Err(ZodiacError::ResourceUnavailable("bad day".into()));
        }
        self.inner.compute_zodiac_state(instant).await
    }
}

/// The new moon of 11 January 2024 seen from London.
///
/// The Sun and Moon were both in Capricorn, so the whole session should read
/// as a Capricorn new moon.
#[tokio::test]
async fn london_new_moon_session() {
    let at = Utc.with_ymd_and_hms(2024, 1, 11, 11, 57, 0).unwrap();
    let snapshot = Snapshot::compute(&ZodiacLocator::new(), london(), at)
        .await
        .unwrap();

    assert_eq!(snapshot.moon.phase_name, PhaseName::NewMoon);
    assert!(
        snapshot.moon.illumination < 0.03,
        "New moon illumination {} should be under 3 %",
        snapshot.moon.illumination
    );
    assert_eq!(snapshot.zodiac.sign, ZodiacSign::Capricorn);
    assert_eq!(snapshot.intelligence.subtitle, "Void & Beginning");
    assert!(snapshot
        .intelligence
        .guidance
        .starts_with("The New Moon in Capricorn brings"));

    // next bucket is the waxing crescent, less than two days away
    assert_eq!(snapshot.next_transition.phase, PhaseName::WaxingCrescent);
    assert!(snapshot.next_transition.hours_until <= 30);
}

/// Six hours after the full moon of 25 January 2024 the Moon is in Leo.
///
/// Leo's bonus frequency (528 Hz) is already on the full moon list, so it
/// must not be added twice.
#[tokio::test]
async fn full_moon_in_leo_deduplicates_the_bonus() {
    let at = Utc.with_ymd_and_hms(2024, 1, 26, 0, 0, 0).unwrap();
    let snapshot = Snapshot::compute(&ZodiacLocator::new(), london(), at)
        .await
        .unwrap();

    assert_eq!(snapshot.moon.phase_name, PhaseName::FullMoon);
    assert_eq!(snapshot.zodiac.sign, ZodiacSign::Leo);
    let hz: Vec<f64> = snapshot
        .intelligence
        .frequencies
        .iter()
        .map(|f| f.hz)
        .collect();
    assert_eq!(hz, vec![432.0, 528.0, 210.42]);
    assert!(snapshot.moon.illumination > 0.97);
}

/// The session cannot be assembled without a zodiac position.
#[tokio::test]
async fn session_reports_zodiac_failures() {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let result = Snapshot::compute(&OfflineSource, london(), at).await;
    assert_eq!(
        result.err(),
        Some(ZodiacError::ResourceUnavailable("offline".into()))
    );
}

/// Snapshots serialize with the wire names the front ends expect.
#[tokio::test]
async fn snapshot_json_shape() {
    let at = Utc.with_ymd_and_hms(2024, 1, 26, 0, 0, 0).unwrap();
    let snapshot = Snapshot::compute(&ZodiacLocator::new(), london(), at)
        .await
        .unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["moon"]["phase_name"], "FULL_MOON");
    assert_eq!(json["zodiac"]["sign"], "LEO");
    assert_eq!(json["intelligence"]["moon_tone"]["note"], "D#/Eb");
    assert_eq!(json["location"]["latitude"], 51.5074);
    assert!(json["intelligence"]["frequencies"].is_array());
}

/// A calendar month where one lookup fails still lists every day, and the
/// report marks the failed day's sign as unknown.
#[tokio::test]
async fn calendar_report_survives_a_failed_day() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bad = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
    let source = Arc::new(OneBadDay {
        bad,
        inner: ZodiacLocator::new(),
    });
    let location = london();
    let days = compute_calendar_window(
        source,
        location.latitude,
        location.longitude,
        start,
        30,
        Some(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()),
    )
    .await;

    assert_eq!(days.len(), 30);
    let text = report::calendar_text(&days);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 30, "One report line per day");

    assert!(lines[10].starts_with("*Thu 2024-01-11 New Moon"));
    assert!(lines[10].contains("NEW"));
    assert!(lines[19].contains(" ? "), "Failed day shows no sign: {}", lines[19]);
    assert!(days[19].intelligence.is_none());
    assert!(days[19].moon.illumination > 0.5);
}

/// Text reports contain the headline fields.
#[test]
fn moon_report_lists_core_fields() {
    // six hours after first quarter (2024-01-18 03:53)
    let at = Utc.with_ymd_and_hms(2024, 1, 18, 10, 0, 0).unwrap();
    let moon = compute_moon_state(51.5074, -0.1278, at);
    let text = report::moon_text(&moon);

    assert!(text.starts_with("First Quarter"));
    assert!(text.contains("Illumination"));
    assert!(text.contains("from south"));
    assert!(text.contains("Rise/Set"));
}

/// Polar summer: the Moon can stay up or down all day without a rise or set.
#[test]
fn moon_report_handles_missing_events() {
    let mut moon = compute_moon_state(
        78.22,
        15.65,
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    );
    moon.rise = None;
    moon.set = None;
    moon.always_above_horizon = true;
    moon.always_below_horizon = false;
    let text = report::moon_text(&moon);
    assert!(text.contains("up all day"));
    assert!(!text.contains("Visible"));
}

/// The monochrome renderer works through a color-converted gray canvas, the
/// way the CLI writes PBM files.
#[test]
fn mono_render_into_gray_canvas() {
    let at = Utc.with_ymd_and_hms(2024, 1, 26, 0, 0, 0).unwrap();
    let moon = compute_moon_state(51.5074, -0.1278, at);

    let mut canvas = GrayCanvas::new(64, 80);
    draw_moon_mono(
        &mut canvas.color_converted::<BinaryColor>(),
        Point::new(32, 32),
        30,
        &moon,
        Some("Full Moon"),
    )
    .unwrap();

    // a full moon is lit (white) at the centre, the sky stays black
    assert_eq!(canvas.pixel(32, 32), Some(255));
    assert_eq!(canvas.pixel(0, 0), Some(0));
    let pbm = canvas.to_pbm(128);
    assert!(pbm.starts_with(b"P4\n64 80\n"));
    assert_eq!(pbm.len(), "P4\n64 80\n".len() + 8 * 80);
}
