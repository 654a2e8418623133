//! Named lunar phases.
//!
//! The synodic cycle is a fraction in [0, 1) with 0 = new and 0.5 = full.
//! Eight named buckets partition it using one fixed boundary table shared by
//! rendering, the intelligence engine and the calendar. The new-moon bucket
//! straddles the wrap point: it covers [0.975, 1) ∪ [0, 0.025).

use serde::{Deserialize, Serialize};

/// Lower edges of the buckets, in cycle order starting at `NewMoon`.
///
/// `NewMoon` starts at −0.025, i.e. at 0.975 of the previous cycle.
const BUCKET_STARTS: [f64; 8] = [-0.025, 0.025, 0.25, 0.275, 0.5, 0.525, 0.75, 0.775];

/// Upper edge of the last bucket (`WaningCrescent`).
const CYCLE_WRAP: f64 = 0.975;

/// One of the eight named phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

/// All phases in cycle order.
pub const ALL_PHASES: [PhaseName; 8] = [
    PhaseName::NewMoon,
    PhaseName::WaxingCrescent,
    PhaseName::FirstQuarter,
    PhaseName::WaxingGibbous,
    PhaseName::FullMoon,
    PhaseName::WaningGibbous,
    PhaseName::LastQuarter,
    PhaseName::WaningCrescent,
];

impl PhaseName {
    /// Classify a synodic phase fraction.
    ///
    /// Values outside [0, 1) are wrapped first; NaN lands in `WaningCrescent`
    /// rather than panicking.
    pub fn from_phase(phase: f64) -> Self {
        let p = phase.rem_euclid(1.0);
        if !(0.025..CYCLE_WRAP).contains(&p) {
            if p.is_nan() {
                return Self::WaningCrescent;
            }
            return Self::NewMoon;
        }
        // first bucket whose successor starts above p
        ALL_PHASES
            .iter()
            .zip(BUCKET_STARTS.iter().skip(1).chain(std::iter::once(&CYCLE_WRAP)))
            .find(|(_, &end)| p < end)
            .map(|(&name, _)| name)
            .unwrap_or(Self::WaningCrescent)
    }

    /// 0-based position in the cycle (NewMoon = 0 .. WaningCrescent = 7).
    pub const fn index(self) -> usize {
        match self {
            Self::NewMoon => 0,
            Self::WaxingCrescent => 1,
            Self::FirstQuarter => 2,
            Self::WaxingGibbous => 3,
            Self::FullMoon => 4,
            Self::WaningGibbous => 5,
            Self::LastQuarter => 6,
            Self::WaningCrescent => 7,
        }
    }

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::NewMoon => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::FullMoon => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }

    /// `[start, end)` of this bucket; `NewMoon` reports [−0.025, 0.025).
    pub fn range(self) -> (f64, f64) {
        let i = self.index();
        let end = BUCKET_STARTS.get(i + 1).copied().unwrap_or(CYCLE_WRAP);
        (BUCKET_STARTS[i], end)
    }
}

/// How far through its current bucket a phase is, in [0, 1].
///
/// Phases at or past 0.975 are shifted back by one cycle so the new-moon
/// bucket is measured continuously across the wrap.
pub fn phase_progress(phase: f64) -> f64 {
    let mut adjusted = phase.rem_euclid(1.0);
    if adjusted >= CYCLE_WRAP {
        adjusted -= 1.0;
    }
    let (start, end) = PhaseName::from_phase(adjusted).range();
    ((adjusted - start) / (end - start)).clamp(0.0, 1.0)
}

/// Moon is building toward full.
pub fn is_waxing(phase: f64) -> bool {
    phase < 0.5
}

/// Short direction text for a phase fraction.
pub fn phase_direction(phase: f64) -> &'static str {
    if !(0.025..CYCLE_WRAP).contains(&phase) {
        "New — beginning"
    } else if phase < 0.5 {
        "Growing toward Full"
    } else if phase < 0.525 {
        "Full — peak illumination"
    } else {
        "Waning toward New"
    }
}
