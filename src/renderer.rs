//! # Moon Disk Rendering
//!
//! Paints a [`MoonState`] as a shaded disk into any embedded-graphics
//! `DrawTarget`. Grayscale targets get the full treatment; monochrome targets
//! (e-ink panels, the mock display in tests) get a hard lit/dark split.
//!
//! ## Shading Pipeline (per pixel, inside the disk)
//! 1. **Surface**: radial brightness gradient, brightest up-left of centre
//! 2. **Limb darkening**: black overlay growing toward the edge
//! 3. **Penumbra**: three soft passes just outside the terminator (optional)
//! 4. **Shadow**: hard fill at 94 % opacity on the dark side
//! 5. **Earthshine**: faint blue-gray lift of the dark side below 45 % lit

use crate::canvas::GrayCanvas;
use crate::ephemeris::MoonState;
use crate::terminator::{
    earthshine_strength, limb_darkening, surface_luma, Terminator, SHADOW_OPACITY,
};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::{BinaryColor, Gray8},
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
    text::{Alignment, Text},
};

/// Luma of the shadow fill.
const SHADOW_LUMA: f64 = 6.0;
/// Luma of the earthshine tint.
const EARTHSHINE_LUMA: f64 = 129.0;

/// Which cosmetic layers to paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingOptions {
    pub penumbra: bool,
    pub limb_darkening: bool,
    pub earthshine: bool,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            penumbra: true,
            limb_darkening: true,
            earthshine: true,
        }
    }
}

fn blend(base: f64, over: f64, alpha: f64) -> f64 {
    base * (1.0 - alpha) + over * alpha
}

/// Luma of the disk at `(x, y)` relative to its centre, or `None` outside.
pub fn shade_pixel(
    x: f64,
    y: f64,
    radius: f64,
    terminator: &Terminator,
    illumination: f64,
    options: &ShadingOptions,
) -> Option<u8> {
    let distance = (x * x + y * y).sqrt();
    if distance > radius {
        return None;
    }
    let rho = if radius > 0.0 { distance / radius } else { 0.0 };

    let mut luma = surface_luma(x, y, radius);
    if options.limb_darkening {
        luma *= 1.0 - limb_darkening(rho);
    }

    if options.penumbra {
        for pass in terminator.penumbra() {
            if !pass.terminator.is_lit(x, y, radius) {
                luma = blend(luma, SHADOW_LUMA, pass.opacity);
            }
        }
    }

    if !terminator.is_lit(x, y, radius) {
        luma = blend(luma, SHADOW_LUMA, SHADOW_OPACITY);
        if options.earthshine {
            let strength = earthshine_strength(illumination) * (1.0 - 0.5 * rho);
            luma = blend(luma, EARTHSHINE_LUMA, strength);
        }
    }

    Some(luma.round().clamp(0.0, 255.0) as u8)
}

/// Offsets of every pixel centre inside a disk of `radius`.
fn disk_offsets(radius: u32) -> impl Iterator<Item = (i32, i32)> {
    let r = radius as i32;
    let r2 = (radius as i64).pow(2);
    (-r..=r).flat_map(move |dy| {
        (-r..=r)
            .filter(move |dx| (*dx as i64).pow(2) + (dy as i64).pow(2) <= r2)
            .map(move |dx| (dx, dy))
    })
}

/// Shade the disk of `moon` centred at `center` into a grayscale target.
///
/// Pixels outside the target's bounding box are skipped.
pub fn draw_moon<D>(
    target: &mut D,
    center: Point,
    radius: u32,
    moon: &MoonState,
    options: &ShadingOptions,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Gray8>,
{
    if radius == 0 {
        return Ok(());
    }
    let bounds = target.bounding_box();
    let terminator = Terminator::from_phase(moon.phase);
    let r = radius as f64;

    let pixels = disk_offsets(radius).filter_map(|(dx, dy)| {
        let point = center + Point::new(dx, dy);
        if !bounds.contains(point) {
            return None;
        }
        shade_pixel(dx as f64, dy as f64, r, &terminator, moon.illumination, options)
            .map(|luma| Pixel(point, Gray8::new(luma)))
    });
    target.draw_iter(pixels)
}

/// Hard lit/dark disk for monochrome targets, outlined, with an optional
/// caption centred below it.
pub fn draw_moon_mono<D>(
    target: &mut D,
    center: Point,
    radius: u32,
    moon: &MoonState,
    caption: Option<&str>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if radius == 0 {
        return Ok(());
    }
    let bounds = target.bounding_box();
    let terminator = Terminator::from_phase(moon.phase);
    let r = radius as f64;

    let pixels = disk_offsets(radius).filter_map(|(dx, dy)| {
        let point = center + Point::new(dx, dy);
        bounds.contains(point).then(|| {
            let lit = terminator.is_lit(dx as f64, dy as f64, r);
            Pixel(point, BinaryColor::from(lit))
        })
    });
    target.draw_iter(pixels)?;

    // keep the dark side visible on a dark background
    Circle::with_center(center, radius.saturating_mul(2).saturating_add(1))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)?;

    if let Some(text) = caption {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_alignment(
            text,
            center + Point::new(0, (radius as i32).saturating_add(12)),
            style,
            Alignment::Center,
        )
        .draw(target)?;
    }
    Ok(())
}

/// Largest radius [`draw_ascii`] renders; larger requests are clamped.
pub const MAX_ASCII_RADIUS: u32 = 200;

/// Terminal rendering: the shaded disk at `radius` rows, two characters per
/// pixel so it looks round.
pub fn draw_ascii(moon: &MoonState, radius: u32) -> String {
    let radius = radius.min(MAX_ASCII_RADIUS);
    let size = radius * 2 + 1;
    let mut canvas = GrayCanvas::new(size, size);
    let center = Point::new(radius as i32, radius as i32);
    draw_moon(&mut canvas, center, radius, moon, &ShadingOptions::default())
        .unwrap_or_else(|never| match never {});
    canvas.to_ascii(true)
}
