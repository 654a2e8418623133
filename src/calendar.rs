//! # Calendar Batch
//!
//! Runs the ephemeris, zodiac and intelligence engines once per day over a
//! window of consecutive days for one location.
//!
//! ## Behaviour
//! - **Pinned hour**: every day is evaluated at 12:00 UTC so a day never
//!   drifts across a date boundary
//! - **Moon first**: ephemeris states are cheap and computed in order
//! - **Zodiac fan-out**: one lookup task per day, all joined before output
//! - **Partial failure**: a failed lookup leaves that day's zodiac and
//!   intelligence empty; the moon state is always present

use crate::distance::DistanceClassification;
use crate::ephemeris::{compute_moon_state, MoonState};
use crate::intelligence::{build_session_intelligence, SessionIntelligence};
use crate::phase::PhaseName;
use crate::zodiac::{ZodiacError, ZodiacSource, ZodiacState};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Hour of day (UTC) at which every calendar day is evaluated.
pub const PINNED_HOUR: u32 = 12;

/// Default window length.
pub const DEFAULT_DAYS: u32 = 30;

/// Snapshot of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub moon: MoonState,
    pub zodiac: Option<ZodiacState>,
    pub intelligence: Option<SessionIntelligence>,
    pub distance: DistanceClassification,
    pub is_new_moon: bool,
    pub is_full_moon: bool,
    pub is_supermoon: bool,
    pub is_today: bool,
}

/// The instant at which `date` is evaluated.
pub fn pinned_instant(date: NaiveDate) -> DateTime<Utc> {
    let noon = NaiveTime::from_hms_opt(PINNED_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(noon).and_utc()
}

/// Snapshots for `days` consecutive days from `start`, in ascending order.
///
/// Never fails. `today` marks the matching day's `is_today`; `None` means the
/// current UTC date. The window stops early only if a date would fall outside
/// the representable calendar.
pub async fn compute_calendar_window<S>(
    source: Arc<S>,
    latitude: f64,
    longitude: f64,
    start: NaiveDate,
    days: u32,
    today: Option<NaiveDate>,
) -> Vec<CalendarDay>
where
    S: ZodiacSource + 'static,
{
    let today = today.unwrap_or_else(|| Utc::now().date_naive());

    let dates: Vec<NaiveDate> = (0..days)
        .map_while(|offset| start.checked_add_days(Days::new(u64::from(offset))))
        .collect();
    debug!(
        "Computing calendar window of {} days from {} at ({:.4}, {:.4})",
        dates.len(),
        start,
        latitude,
        longitude
    );

    let moons: Vec<MoonState> = dates
        .iter()
        .map(|&date| compute_moon_state(latitude, longitude, pinned_instant(date)))
        .collect();

    let lookups: Vec<_> = dates
        .iter()
        .map(|&date| {
            let source = Arc::clone(&source);
            tokio::spawn(async move { source.zodiac_state(pinned_instant(date)).await })
        })
        .collect();

    let mut calendar = Vec::with_capacity(dates.len());
    for ((date, moon), lookup) in dates.into_iter().zip(moons).zip(lookups) {
        let zodiac = match lookup.await {
            Ok(Ok(state)) => Some(state),
            Ok(Err(e)) => {
                warn!("Zodiac lookup for {} failed: {}", date, e);
                None
            }
            Err(join_error) => {
                let e = ZodiacError::Task(join_error.to_string());
                warn!("Zodiac lookup for {} failed: {}", date, e);
                None
            }
        };
        calendar.push(CalendarDay::assemble(date, moon, zodiac, today));
    }
    calendar
}

impl CalendarDay {
    fn assemble(
        date: NaiveDate,
        moon: MoonState,
        zodiac: Option<ZodiacState>,
        today: NaiveDate,
    ) -> Self {
        let intelligence = zodiac
            .as_ref()
            .map(|zodiac| build_session_intelligence(&moon, zodiac));
        let distance = DistanceClassification::from_km(moon.distance_km);

        Self {
            date,
            is_new_moon: moon.phase_name == PhaseName::NewMoon,
            is_full_moon: moon.phase_name == PhaseName::FullMoon,
            is_supermoon: distance.is_supermoon,
            is_today: date == today,
            moon,
            zodiac,
            intelligence,
            distance,
        }
    }
}
