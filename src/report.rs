//! Terminal reports for the CLI.
//!
//! Each engine result gets a plain-text rendering here; `--json` output goes
//! through serde instead and never touches these functions.

use chrono::{DateTime, Utc};
use lunar_core_lib::astro::RAD;
use lunar_core_lib::calendar::CalendarDay;
use lunar_core_lib::ephemeris::{
    format_duration_hm, format_time_until, moon_duration, next_phase_transition, MoonState,
    PhaseTransition,
};
use lunar_core_lib::intelligence::{build_session_intelligence, SessionIntelligence};
use lunar_core_lib::phase::{phase_direction, phase_progress};
use lunar_core_lib::zodiac::{ZodiacError, ZodiacSource, ZodiacState};
use lunar_core_lib::{ephemeris::compute_moon_state, Location};
use serde::Serialize;

/// Everything the session view shows for one instant.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub location: Location,
    pub moon: MoonState,
    pub zodiac: ZodiacState,
    pub intelligence: SessionIntelligence,
    pub next_transition: PhaseTransition,
}

impl Snapshot {
    pub async fn compute<S>(
        source: &S,
        location: Location,
        at: DateTime<Utc>,
    ) -> Result<Self, ZodiacError>
    where
        S: ZodiacSource + ?Sized,
    {
        let moon = compute_moon_state(location.latitude, location.longitude, at);
        let zodiac = source.zodiac_state(at).await?;
        let intelligence = build_session_intelligence(&moon, &zodiac);
        Ok(Self {
            location,
            next_transition: next_phase_transition(at),
            moon,
            zodiac,
            intelligence,
        })
    }
}

fn time_or_dash(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%H:%M UTC").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

pub fn moon_text(moon: &MoonState) -> String {
    let mut lines = vec![
        format!("{}  ({})", moon.phase_name.display_name(), phase_direction(moon.phase)),
        format!(
            "Phase         {:.1} % of cycle, {:.0} % through this phase",
            moon.phase * 100.0,
            phase_progress(moon.phase) * 100.0
        ),
        format!("Illumination  {:.1} %", moon.illumination * 100.0),
        format!(
            "Altitude      {:.1}°  ({})",
            moon.altitude / RAD,
            if moon.is_above_horizon {
                "above horizon"
            } else {
                "below horizon"
            }
        ),
        format!("Azimuth       {:.1}° from south", moon.azimuth / RAD),
        format!("Distance      {:.0} km", moon.distance_km),
    ];

    if moon.always_above_horizon {
        lines.push("Rise/Set      up all day".to_string());
    } else if moon.always_below_horizon {
        lines.push("Rise/Set      down all day".to_string());
    } else {
        lines.push(format!(
            "Rise/Set      {} / {}",
            time_or_dash(moon.rise),
            time_or_dash(moon.set)
        ));
    }
    if let Some(visible) = moon_duration(moon.rise, moon.set) {
        lines.push(format!("Visible       {}", format_duration_hm(visible)));
    }
    lines.join("\n")
}

pub fn zodiac_text(zodiac: &ZodiacState) -> String {
    let sign = zodiac.sign;
    [
        format!(
            "{} {}  {:.2}° ({} {})",
            sign.symbol(),
            sign.name(),
            zodiac.degree_in_sign,
            sign.element().name(),
            sign.quality().name()
        ),
        format!(
            "Ecliptic      λ {:.3}°  β {:+.3}°",
            zodiac.ecliptic_longitude_deg, zodiac.ecliptic_latitude_deg
        ),
        format!("Range         {:.0} km", zodiac.distance_km),
    ]
    .join("\n")
}

pub fn transition_text(transition: &PhaseTransition) -> String {
    format!(
        "Next: {} in {} ({})",
        transition.phase.display_name(),
        format_time_until(transition.hours_until),
        transition.instant.format("%Y-%m-%d %H:00 UTC")
    )
}

pub fn session_text(session: &SessionIntelligence) -> String {
    let mut lines = vec![
        format!(
            "{} in {}: {}",
            session.phase_name.display_name(),
            session.sign.name(),
            session.subtitle
        ),
        format!("\"{}\"", session.quote),
        String::new(),
        "Frequencies".to_string(),
    ];
    lines.extend(
        session
            .frequencies
            .iter()
            .map(|f| format!("  {:>8.2} Hz  {}", f.hz, f.label)),
    );
    lines.push(format!(
        "  {:>8.2} Hz  {} ({})",
        session.moon_tone.hz, session.moon_tone.label, session.moon_tone.note
    ));
    lines.push(format!("Instruments   {}", session.instruments.join(", ")));
    lines.push(format!("Avoid         {}", session.avoid.join("; ")));
    lines.push(format!(
        "Distance      {:.0} km, {}",
        session.distance.km, session.distance.label
    ));
    lines.push(String::new());
    lines.push(session.guidance.clone());
    lines.join("\n")
}

pub fn snapshot_text(snapshot: &Snapshot) -> String {
    [
        moon_text(&snapshot.moon),
        zodiac_text(&snapshot.zodiac),
        transition_text(&snapshot.next_transition),
        session_text(&snapshot.intelligence),
    ]
    .join("\n\n")
}

/// One row per day.
pub fn calendar_text(days: &[CalendarDay]) -> String {
    days.iter()
        .map(|day| {
            let sign = day
                .zodiac
                .as_ref()
                .map(|z| format!("{} {:<11}", z.sign.symbol(), z.sign.name()))
                .unwrap_or_else(|| format!("{:<13}", "?"));
            let mut flags = Vec::new();
            if day.is_new_moon {
                flags.push("NEW");
            }
            if day.is_full_moon {
                flags.push("FULL");
            }
            if day.is_supermoon {
                flags.push("SUPER");
            }
            format!(
                "{}{} {:<16} {:>5.1} %  {}  {}",
                if day.is_today { '*' } else { ' ' },
                day.date.format("%a %Y-%m-%d"),
                day.moon.phase_name.display_name(),
                day.moon.illumination * 100.0,
                sign,
                flags.join(" ")
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
