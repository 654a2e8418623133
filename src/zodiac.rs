//! Zodiac locator: the Moon's ecliptic position mapped onto twelve 30° signs.
//!
//! The periodic series behind it ([`LunarSeries`]) is treated as a resource
//! that is loaded asynchronously on first use and then shared. Concurrent
//! callers that arrive before the load finishes all wait on the same attempt
//! and receive its outcome, success or failure. A failed attempt is
//! forgotten once reported, so the next call starts a fresh load.

use crate::astro::julian_ephemeris_day;
use crate::meeus::{EclipticPosition, LunarSeries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{watch, OnceCell};
use tracing::{debug, info, warn};

/// Width of one sign in degrees.
const SIGN_WIDTH_DEG: f64 = 30.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZodiacError {
    /// The lunar series could not be loaded
    #[error("lunar series unavailable: {0}")]
    ResourceUnavailable(String),

    /// A lookup task panicked or was cancelled
    #[error("zodiac lookup task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Earth => "Earth",
            Self::Air => "Air",
            Self::Water => "Water",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Cardinal,
    Fixed,
    Mutable,
}

impl Quality {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cardinal => "Cardinal",
            Self::Fixed => "Fixed",
            Self::Mutable => "Mutable",
        }
    }
}

/// The twelve signs in ecliptic order, Aries at 0°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign at a table position; wraps modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::Aries => '\u{2648}',
            Self::Taurus => '\u{2649}',
            Self::Gemini => '\u{264A}',
            Self::Cancer => '\u{264B}',
            Self::Leo => '\u{264C}',
            Self::Virgo => '\u{264D}',
            Self::Libra => '\u{264E}',
            Self::Scorpio => '\u{264F}',
            Self::Sagittarius => '\u{2650}',
            Self::Capricorn => '\u{2651}',
            Self::Aquarius => '\u{2652}',
            Self::Pisces => '\u{2653}',
        }
    }

    /// Elements cycle fire → earth → air → water from Aries.
    pub const fn element(self) -> Element {
        match self as usize % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    /// Qualities cycle cardinal → fixed → mutable from Aries.
    pub const fn quality(self) -> Quality {
        match self as usize % 3 {
            0 => Quality::Cardinal,
            1 => Quality::Fixed,
            _ => Quality::Mutable,
        }
    }
}

/// Wrap any longitude into [0, 360).
pub fn normalize_longitude(longitude_deg: f64) -> f64 {
    let wrapped = longitude_deg.rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// `floor(lon / 30)` into the fixed sign table.
pub fn sign_from_longitude(longitude_deg: f64) -> ZodiacSign {
    let index = (normalize_longitude(longitude_deg) / SIGN_WIDTH_DEG).floor() as usize;
    ZodiacSign::from_index(index)
}

/// Degrees past the start of the current sign, [0, 30).
pub fn degree_in_sign(longitude_deg: f64) -> f64 {
    normalize_longitude(longitude_deg) % SIGN_WIDTH_DEG
}

/// Where the Moon sits on the ecliptic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZodiacState {
    /// [0, 360)
    pub ecliptic_longitude_deg: f64,
    pub ecliptic_latitude_deg: f64,
    pub sign: ZodiacSign,
    /// [0, 30)
    pub degree_in_sign: f64,
    /// Orbital range from the series; independent of `MoonState::distance_km`
    pub distance_km: f64,
}

impl From<EclipticPosition> for ZodiacState {
    fn from(position: EclipticPosition) -> Self {
        let longitude = normalize_longitude(position.longitude_deg);
        Self {
            ecliptic_longitude_deg: longitude,
            ecliptic_latitude_deg: position.latitude_deg,
            sign: sign_from_longitude(longitude),
            degree_in_sign: degree_in_sign(longitude),
            distance_km: position.distance_km,
        }
    }
}

/// Produces the lunar series on demand.
#[async_trait]
pub trait SeriesLoader: Send + Sync {
    async fn load(&self) -> Result<LunarSeries, ZodiacError>;
}

/// Loader for the compiled-in 120-term tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSeries;

#[async_trait]
impl SeriesLoader for BuiltinSeries {
    async fn load(&self) -> Result<LunarSeries, ZodiacError> {
        Ok(LunarSeries::meeus())
    }
}

/// Anything that can answer "which sign is the Moon in at this instant?".
///
/// The calendar batch is written against this trait so lookups can be
/// substituted.
#[async_trait]
pub trait ZodiacSource: Send + Sync {
    async fn zodiac_state(&self, instant: DateTime<Utc>) -> Result<ZodiacState, ZodiacError>;
}

type LoadOutcome = Result<Arc<LunarSeries>, ZodiacError>;
type PendingLoad = watch::Receiver<Option<LoadOutcome>>;

#[derive(Default)]
struct SeriesSlot {
    ready: OnceCell<Arc<LunarSeries>>,
    /// The attempt in flight, if any
    pending: Mutex<Option<PendingLoad>>,
}

impl SeriesSlot {
    fn pending(&self) -> MutexGuard<'_, Option<PendingLoad>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Zodiac lookups backed by a lazily loaded, shared [`LunarSeries`].
pub struct ZodiacLocator<L = BuiltinSeries> {
    loader: Arc<L>,
    slot: Arc<SeriesSlot>,
}

impl ZodiacLocator<BuiltinSeries> {
    pub fn new() -> Self {
        Self::with_loader(BuiltinSeries)
    }
}

impl Default for ZodiacLocator<BuiltinSeries> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: SeriesLoader + 'static> ZodiacLocator<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            slot: Arc::new(SeriesSlot::default()),
        }
    }

    /// True once the series has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.slot.ready.initialized()
    }

    /// The loaded series, joining the attempt in flight or starting one.
    async fn series(&self) -> Result<Arc<LunarSeries>, ZodiacError> {
        if let Some(series) = self.slot.ready.get() {
            return Ok(Arc::clone(series));
        }

        let mut rx = {
            let mut pending = self.slot.pending();
            // a finishing load fills `ready` before it clears `pending`
            if let Some(series) = self.slot.ready.get() {
                return Ok(Arc::clone(series));
            }
            match pending.as_ref() {
                Some(rx) => {
                    debug!("Waiting on the lunar series load in flight");
                    rx.clone()
                }
                None => {
                    let rx = self.start_load();
                    *pending = Some(rx.clone());
                    rx
                }
            }
        };

        loop {
            let outcome = rx.borrow_and_update().clone();
            if let Some(outcome) = outcome {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // the load task died without reporting
                let mut pending = self.slot.pending();
                if pending.as_ref().is_some_and(|p| p.same_channel(&rx)) {
                    *pending = None;
                }
                return Err(ZodiacError::Task("lunar series load aborted".into()));
            }
        }
    }

    /// Run one load attempt on its own task so that it completes even if the
    /// caller that started it is dropped.
    fn start_load(&self) -> PendingLoad {
        let (tx, rx) = watch::channel(None);
        let loader = Arc::clone(&self.loader);
        let slot = Arc::clone(&self.slot);
        debug!("Loading lunar series");

        tokio::spawn(async move {
            let outcome = match loader.load().await {
                Ok(series) => {
                    info!("Lunar series loaded ({} terms)", series.term_count());
                    let series = Arc::new(series);
                    if slot.ready.set(Arc::clone(&series)).is_err() {
                        warn!("Lunar series was already loaded");
                    }
                    Ok(series)
                }
                Err(e) => {
                    warn!("Lunar series failed to load: {}", e);
                    Err(e)
                }
            };
            *slot.pending() = None;
            tx.send_replace(Some(outcome));
        });
        rx
    }

    /// Ecliptic position and sign of the Moon at `instant`.
    ///
    /// Fails only when the series cannot be loaded.
    pub async fn compute_zodiac_state(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<ZodiacState, ZodiacError> {
        let series = self.series().await?;
        let jde = julian_ephemeris_day(instant);
        let state = ZodiacState::from(series.position(jde));
        debug!(
            "Moon at {:.3}° ({} {:.2}°) for {}",
            state.ecliptic_longitude_deg,
            state.sign.name(),
            state.degree_in_sign,
            instant
        );
        Ok(state)
    }
}

#[async_trait]
impl<L: SeriesLoader + 'static> ZodiacSource for ZodiacLocator<L> {
    async fn zodiac_state(&self, instant: DateTime<Utc>) -> Result<ZodiacState, ZodiacError> {
        self.compute_zodiac_state(instant).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        loads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SeriesLoader for CountingLoader {
        async fn load(&self) -> Result<LunarSeries, ZodiacError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            // give the other callers time to pile up behind the load
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            Ok(LunarSeries::meeus())
        }
    }

    struct FailingLoader {
        attempts: Arc<AtomicUsize>,
        delay: std::time::Duration,
    }

    impl FailingLoader {
        fn new(attempts: &Arc<AtomicUsize>, delay_ms: u64) -> Self {
            Self {
                attempts: Arc::clone(attempts),
                delay: std::time::Duration::from_millis(delay_ms),
            }
        }
    }

    #[async_trait]
    impl SeriesLoader for FailingLoader {
        async fn load(&self) -> Result<LunarSeries, ZodiacError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Err(ZodiacError::ResourceUnavailable("module missing".into()))
        }
    }

    #[test]
    fn sign_is_periodic_in_360() {
        for i in 0..3600 {
            // stay clear of exact boundaries where adding 360k can round across
            let lon = i as f64 * 0.1 + 0.05;
            let sign = sign_from_longitude(lon);
            for k in [-3.0, -1.0, 1.0, 2.0, 10.0] {
                assert_eq!(sign_from_longitude(lon + 360.0 * k), sign, "lon {lon} k {k}");
            }
            let degree = degree_in_sign(lon);
            assert!((0.0..30.0).contains(&degree));
        }
    }

    #[test]
    fn sign_and_degree_rebuild_the_longitude() {
        for lon in [0.0, 29.999, 30.0, 133.16, 359.99, -45.5, 725.25] {
            let rebuilt = sign_from_longitude(lon).index() as f64 * 30.0 + degree_in_sign(lon);
            assert!((rebuilt - normalize_longitude(lon)).abs() < 1e-9, "lon {lon}");
        }
    }

    #[test]
    fn sign_boundaries() {
        assert_eq!(sign_from_longitude(0.0), ZodiacSign::Aries);
        assert_eq!(sign_from_longitude(29.9999), ZodiacSign::Aries);
        assert_eq!(sign_from_longitude(30.0), ZodiacSign::Taurus);
        assert_eq!(sign_from_longitude(359.9999), ZodiacSign::Pisces);
        assert_eq!(sign_from_longitude(-0.5), ZodiacSign::Pisces);
        assert_eq!(normalize_longitude(-1e-15), 0.0);
    }

    #[test]
    fn sign_attributes() {
        assert_eq!(ZodiacSign::Leo.element(), Element::Fire);
        assert_eq!(ZodiacSign::Leo.quality(), Quality::Fixed);
        assert_eq!(ZodiacSign::Capricorn.element(), Element::Earth);
        assert_eq!(ZodiacSign::Capricorn.quality(), Quality::Cardinal);
        assert_eq!(ZodiacSign::Pisces.element(), Element::Water);
        assert_eq!(ZodiacSign::Pisces.quality(), Quality::Mutable);
        assert_eq!(ZodiacSign::Gemini.symbol(), '♊');
        assert_eq!(ZodiacSign::from_index(13), ZodiacSign::Taurus);
    }

    #[tokio::test]
    async fn locates_the_moon_in_leo_april_1992() {
        let locator = ZodiacLocator::new();
        let at = Utc.with_ymd_and_hms(1992, 4, 12, 0, 0, 0).unwrap();
        let state = locator.compute_zodiac_state(at).await.unwrap();
        assert_eq!(state.sign, ZodiacSign::Leo);
        assert!((state.ecliptic_longitude_deg - 133.17).abs() < 0.05);
        assert!((state.degree_in_sign - 13.17).abs() < 0.05);
        assert!((state.distance_km - 368_410.0).abs() < 50.0);
        assert!(locator.is_loaded());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_load_the_series_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let locator = Arc::new(ZodiacLocator::with_loader(CountingLoader {
            loads: Arc::clone(&loads),
        }));
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|day| {
                let locator = Arc::clone(&locator);
                tokio::spawn(async move {
                    locator
                        .compute_zodiac_state(base + chrono::Duration::days(day))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let locator = ZodiacLocator::with_loader(FailingLoader::new(&attempts, 0));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let err = locator.compute_zodiac_state(at).await.unwrap_err();
        assert!(matches!(err, ZodiacError::ResourceUnavailable(_)));
        assert!(!locator.is_loaded());

        assert!(locator.zodiac_state(at).await.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_failed_load() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let locator = Arc::new(ZodiacLocator::with_loader(FailingLoader::new(&attempts, 50)));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locator = Arc::clone(&locator);
                tokio::spawn(async move { locator.compute_zodiac_state(at).await })
            })
            .collect();

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert_eq!(err, ZodiacError::ResourceUnavailable("module missing".into()));
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(!locator.is_loaded());

        // the failure is not cached
        assert!(locator.compute_zodiac_state(at).await.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropped_caller_does_not_abandon_the_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let locator = ZodiacLocator::with_loader(CountingLoader {
            loads: Arc::clone(&loads),
        });
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        // start a lookup and drop it before the load can finish
        let first = locator.compute_zodiac_state(at);
        let timed_out = tokio::time::timeout(std::time::Duration::ZERO, first).await;
        assert!(timed_out.is_err());

        assert!(locator.compute_zodiac_state(at).await.is_ok());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
