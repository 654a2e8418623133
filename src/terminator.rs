//! Terminator geometry and the stateless shading curves used to paint the
//! Moon's disk.
//!
//! ## Coordinate System
//! Screen space relative to the disk centre: `x` grows to the right, `y`
//! grows downward. Rows are parameterised by an angle `a` from +π/2 (top of
//! the disk) to −π/2 (bottom), so row `a` sits at `y = −r·sin a` and its
//! half-chord is `r·cos a`.
//!
//! ## Model
//! With `k = cos(2π·phase)`, the terminator crosses row `a` at
//! `x = dir · k · r · cos a`, where `dir` is +1 while waxing
//! (`sin(2π·phase) ≥ 0`) and −1 while waning. Waxing moons are lit on the
//! right, waning moons on the left; the shadow is bounded by the limb on the
//! dark side and by the terminator curve. At `k = ±1` the curve coincides
//! with a limb, so new and full degrade smoothly without special cases.

use core::f64::consts::{PI, TAU};
use serde::Serialize;

/// Default number of row samples for the path.
pub const DEFAULT_STEPS: usize = 90;
/// Fewer samples facet visibly.
pub const MIN_STEPS: usize = 64;

/// Opacity of the hard shadow fill.
pub const SHADOW_OPACITY: f64 = 0.94;

/// Earthshine is only painted below this illuminated fraction.
pub const EARTHSHINE_THRESHOLD: f64 = 0.45;
const EARTHSHINE_GAIN: f64 = 0.25;

/// `(|Δk|, opacity)` for the soft passes, innermost first.
const PENUMBRA_STEPS: [(f64, f64); 3] = [(0.005, 0.5), (0.02, 0.25), (0.06, 0.1)];

/// Surface brightness stops `(t, luma)` from the bright centre outward.
const SURFACE_STOPS: [(f64, f64); 6] = [
    (0.0, 212.0),
    (0.3, 183.0),
    (0.6, 153.0),
    (0.85, 121.0),
    (1.0, 89.0),
    (f64::INFINITY, 89.0),
];

/// Limb darkening stops `(t, alpha)`; `t` runs from 0.3 r to r.
const LIMB_STOPS: [(f64, f64); 3] = [(0.0, 0.0), (0.7, 0.08), (1.0, 0.4)];

/// A point relative to the disk centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// The terminator for one phase, independent of disk size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Terminator {
    /// `cos(2π·phase)`, in [−1, 1]
    pub k: f64,
    pub waxing: bool,
}

/// One cosmetic soft-edge layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PenumbraPass {
    pub terminator: Terminator,
    pub opacity: f64,
}

impl Terminator {
    pub fn from_phase(phase: f64) -> Self {
        let angle = phase * TAU;
        Self {
            k: angle.cos(),
            waxing: angle.sin() >= 0.0,
        }
    }

    /// +1 while waxing, −1 while waning.
    pub fn direction(&self) -> f64 {
        if self.waxing {
            1.0
        } else {
            -1.0
        }
    }

    /// Screen x of the terminator on the row at height `y`.
    pub fn x_at(&self, y: f64, radius: f64) -> f64 {
        let half_chord = (radius * radius - y * y).max(0.0).sqrt();
        self.direction() * self.k * half_chord
    }

    /// True when `(x, y)` is on the sunlit side of the terminator.
    ///
    /// Does not check that the point is inside the disk.
    pub fn is_lit(&self, x: f64, y: f64, radius: f64) -> bool {
        let edge = self.x_at(y, radius);
        if self.waxing {
            x > edge
        } else {
            x < edge
        }
    }

    /// Soft passes, each widening the shadow slightly toward the lit limb.
    ///
    /// `k` only ever grows, so a pass's shadow always contains the hard one.
    pub fn penumbra(&self) -> [PenumbraPass; 3] {
        PENUMBRA_STEPS.map(|(delta, opacity)| PenumbraPass {
            terminator: Terminator {
                k: (self.k + delta).min(1.0),
                waxing: self.waxing,
            },
            opacity,
        })
    }
}

/// Sampled shadow outline for one phase and disk radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerminatorPath {
    pub radius: f64,
    pub terminator: Terminator,
    /// Terminator curve, top of the disk to the bottom
    pub curve: Vec<PathPoint>,
    /// Closed outline: dark-side limb top → bottom, then the curve back up
    pub shadow: Vec<PathPoint>,
}

/// Shadow outline with [`DEFAULT_STEPS`] row samples.
pub fn terminator_path(phase: f64, radius: f64) -> TerminatorPath {
    terminator_path_with_steps(phase, radius, DEFAULT_STEPS)
}

/// Shadow outline with `steps` row samples (at least [`MIN_STEPS`]).
pub fn terminator_path_with_steps(phase: f64, radius: f64, steps: usize) -> TerminatorPath {
    outline(Terminator::from_phase(phase), radius, steps.max(MIN_STEPS))
}

fn outline(terminator: Terminator, radius: f64, steps: usize) -> TerminatorPath {
    let row_angle = |i: usize| PI / 2.0 - (i as f64 / steps as f64) * PI;
    // the dark limb is on the left while waxing
    let limb_side = -terminator.direction();

    let curve: Vec<PathPoint> = (0..=steps)
        .map(|i| {
            let a = row_angle(i);
            PathPoint {
                x: terminator.direction() * terminator.k * radius * a.cos(),
                y: -radius * a.sin(),
            }
        })
        .collect();

    let limb = (0..=steps).map(|i| {
        let a = row_angle(i);
        PathPoint {
            x: limb_side * radius * a.cos(),
            y: -radius * a.sin(),
        }
    });

    let shadow = limb.chain(curve.iter().rev().copied()).collect();

    TerminatorPath {
        radius,
        terminator,
        curve,
        shadow,
    }
}

impl TerminatorPath {
    /// Area enclosed by the shadow outline (shoelace).
    pub fn shadow_area(&self) -> f64 {
        let n = self.shadow.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let p = self.shadow[i];
                let q = self.shadow[(i + 1) % n];
                p.x * q.y - q.x * p.y
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Fraction of the disk outside the shadow outline.
    pub fn lit_fraction(&self) -> f64 {
        let disk = PI * self.radius * self.radius;
        if !(disk > 0.0) || !disk.is_finite() {
            return (1.0 - self.terminator.k) / 2.0;
        }
        (1.0 - self.shadow_area() / disk).clamp(0.0, 1.0)
    }

    /// Soft-edge outlines at the same sampling density.
    pub fn penumbra_paths(&self) -> Vec<(TerminatorPath, f64)> {
        let steps = self.curve.len().saturating_sub(1);
        self.terminator
            .penumbra()
            .iter()
            .map(|pass| (outline(pass.terminator, self.radius, steps), pass.opacity))
            .collect()
    }

    /// SVG path data for the shadow, translated to `(cx, cy)`.
    pub fn to_svg_path(&self, cx: f64, cy: f64) -> String {
        let mut d = String::new();
        for (i, p) in self.shadow.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            d.push_str(&format!("{}{:.2} {:.2} ", cmd, cx + p.x, cy + p.y));
        }
        d.push('Z');
        d
    }
}

fn interpolate(stops: &[(f64, f64)], t: f64) -> f64 {
    let t = t.max(0.0);
    stops
        .windows(2)
        .find(|w| t <= w[1].0)
        .map(|w| {
            let (t0, v0) = w[0];
            let (t1, v1) = w[1];
            if t1.is_infinite() {
                return v0;
            }
            v0 + (v1 - v0) * (t - t0) / (t1 - t0)
        })
        .unwrap_or(stops[stops.len() - 1].1)
}

/// Base surface brightness at `(x, y)`, brightest slightly up and left of
/// centre.
pub fn surface_luma(x: f64, y: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return SURFACE_STOPS[0].1;
    }
    let (hx, hy) = (-0.15 * radius, -0.1 * radius);
    let t = ((x - hx).powi(2) + (y - hy).powi(2)).sqrt() / radius;
    interpolate(&SURFACE_STOPS, t)
}

/// Black overlay alpha for radial distance `rho = d / r`.
pub fn limb_darkening(rho: f64) -> f64 {
    interpolate(&LIMB_STOPS, (rho - 0.3) / 0.7)
}

/// Strength of the dark-limb tint, zero at or above the threshold.
pub fn earthshine_strength(illumination: f64) -> f64 {
    if illumination < EARTHSHINE_THRESHOLD {
        (EARTHSHINE_THRESHOLD - illumination.max(0.0)) * EARTHSHINE_GAIN
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_lit(phase: f64) -> f64 {
        (1.0 - (phase * TAU).cos()) / 2.0
    }

    #[test]
    fn new_moon_is_dark_and_full_moon_is_lit() {
        assert!(terminator_path(0.0, 100.0).lit_fraction() < 0.01);
        assert!(terminator_path(0.5, 100.0).lit_fraction() > 0.99);
        assert!(terminator_path(0.9999, 100.0).lit_fraction() < 0.01);
    }

    #[test]
    fn lit_fraction_follows_the_phase_curve() {
        for i in 0..40 {
            let phase = i as f64 / 40.0;
            let lit = terminator_path(phase, 50.0).lit_fraction();
            assert!(
                (lit - expected_lit(phase)).abs() < 0.01,
                "phase {phase}: lit {lit} vs {}",
                expected_lit(phase)
            );
        }
    }

    #[test]
    fn quarters_are_continuous() {
        for quarter in [0.25, 0.75] {
            let before = terminator_path(quarter - 1e-4, 40.0);
            let after = terminator_path(quarter + 1e-4, 40.0);
            assert!((before.lit_fraction() - after.lit_fraction()).abs() < 0.01);
            for (p, q) in before.curve.iter().zip(&after.curve) {
                assert!((p.x - q.x).abs() < 0.1, "jump at quarter {quarter}");
            }
        }
    }

    #[test]
    fn lit_side_follows_direction() {
        // waxing crescent: right limb lit, left dark
        let t = Terminator::from_phase(0.1);
        assert!(t.is_lit(9.5, 0.0, 10.0));
        assert!(!t.is_lit(-9.5, 0.0, 10.0));
        // waning crescent: left limb lit
        let t = Terminator::from_phase(0.9);
        assert!(t.is_lit(-9.5, 0.0, 10.0));
        assert!(!t.is_lit(9.5, 0.0, 10.0));
        // waning gibbous: only a right sliver is dark
        let t = Terminator::from_phase(0.6);
        assert!(t.is_lit(5.0, 0.0, 10.0));
        assert!(!t.is_lit(9.5, 0.0, 10.0));
    }

    #[test]
    fn pixel_test_matches_polygon() {
        let r = 40.0;
        for phase in [0.1, 0.3, 0.45, 0.62, 0.8, 0.95] {
            let t = Terminator::from_phase(phase);
            let (mut lit, mut total) = (0usize, 0usize);
            for py in -40..40 {
                for px in -40..40 {
                    let (x, y) = (px as f64 + 0.5, py as f64 + 0.5);
                    if x * x + y * y <= r * r {
                        total += 1;
                        if t.is_lit(x, y, r) {
                            lit += 1;
                        }
                    }
                }
            }
            let raster = lit as f64 / total as f64;
            assert!((raster - expected_lit(phase)).abs() < 0.02, "phase {phase}");
        }
    }

    #[test]
    fn penumbra_never_inverts_the_hard_edge() {
        for i in 0..100 {
            let phase = i as f64 / 100.0;
            let hard = Terminator::from_phase(phase);
            let passes = hard.penumbra();
            let mut last_opacity = 1.0;
            for pass in passes {
                assert!(pass.terminator.k >= hard.k);
                assert!(pass.terminator.k <= 1.0);
                assert_eq!(pass.terminator.waxing, hard.waxing);
                assert!(pass.opacity < last_opacity);
                last_opacity = pass.opacity;
                // shifted toward the lit side
                let shift = pass.terminator.x_at(0.0, 10.0) - hard.x_at(0.0, 10.0);
                assert!(shift * hard.direction() >= 0.0);
            }
        }
    }

    #[test]
    fn penumbra_paths_cover_at_least_the_hard_shadow() {
        let path = terminator_path(0.3, 30.0);
        for (soft, _) in path.penumbra_paths() {
            assert!(soft.shadow_area() >= path.shadow_area());
        }
    }

    #[test]
    fn sampling_floor_is_enforced() {
        let path = terminator_path_with_steps(0.2, 10.0, 4);
        assert_eq!(path.curve.len(), MIN_STEPS + 1);
        assert_eq!(path.shadow.len(), 2 * (MIN_STEPS + 1));
    }

    #[test]
    fn svg_path_is_closed() {
        let d = terminator_path(0.25, 10.0).to_svg_path(16.0, 16.0);
        assert!(d.starts_with("M16.00 6.00"));
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn shading_curves() {
        assert_eq!(limb_darkening(0.0), 0.0);
        assert_eq!(limb_darkening(0.3), 0.0);
        assert!((limb_darkening(1.0) - 0.4).abs() < 1e-12);
        assert!(limb_darkening(0.9) > limb_darkening(0.6));

        assert!(surface_luma(-1.5, -1.0, 10.0) > surface_luma(9.0, 0.0, 10.0));

        assert!(earthshine_strength(0.05) > earthshine_strength(0.3));
        assert_eq!(earthshine_strength(0.45), 0.0);
        assert_eq!(earthshine_strength(0.9), 0.0);
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let path = terminator_path(f64::NAN, 10.0);
        assert_eq!(path.curve.len(), DEFAULT_STEPS + 1);
        let empty = terminator_path(0.25, 0.0);
        assert!((empty.lit_fraction() - 0.5).abs() < 1e-9);
    }
}
