//! In-memory 8-bit grayscale framebuffer.
//!
//! Implements `embedded_graphics::DrawTarget`, so the moon renderer and any
//! embedded-graphics primitive can paint into it. The buffer can then be
//! dumped as ASCII art, as a binary PGM, or packed one bit per pixel for
//! monochrome output.

use embedded_graphics::{
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
};

/// Dark → bright ramp for terminal output.
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

pub struct GrayCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayCanvas {
    /// Black canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear_to(&mut self, luma: u8) {
        self.pixels.fill(luma);
    }

    /// Row-major luma values.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, luma: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y * self.width + x) as usize;
        self.pixels[index] = luma;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// One character per pixel, rows joined by newlines.
    ///
    /// With `double_width` each pixel becomes two characters, which looks
    /// round in a terminal whose cells are about twice as tall as wide.
    pub fn to_ascii(&self, double_width: bool) -> String {
        let repeat = if double_width { 2 } else { 1 };
        let mut out = String::with_capacity(self.pixels.len() * repeat + self.height as usize);
        for row in self.pixels.chunks(self.width.max(1) as usize) {
            for &luma in row {
                let index = luma as usize * (ASCII_RAMP.len() - 1) / 255;
                for _ in 0..repeat {
                    out.push(ASCII_RAMP[index] as char);
                }
            }
            out.push('\n');
        }
        out
    }

    /// Binary PGM (P5) image.
    pub fn to_pgm(&self) -> Vec<u8> {
        let mut out = format!("P5\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.extend_from_slice(&self.pixels);
        out
    }

    /// Pack to one bit per pixel, MSB first, rows padded to whole bytes.
    /// A set bit marks a pixel darker than `threshold`.
    pub fn pack_mono(&self, threshold: u8) -> Vec<u8> {
        let bytes_per_row = self.width.div_ceil(8);
        let mut packed = vec![0u8; (bytes_per_row * self.height) as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixels[(y * self.width + x) as usize] < threshold {
                    let byte_index = (y * bytes_per_row + x / 8) as usize;
                    packed[byte_index] |= 0x80 >> (x % 8);
                }
            }
        }
        packed
    }

    /// Binary PBM (P4) image, black where luma is below `threshold`.
    pub fn to_pbm(&self, threshold: u8) -> Vec<u8> {
        let mut out = format!("P4\n{} {}\n", self.width, self.height).into_bytes();
        out.extend(self.pack_mono(threshold));
        out
    }
}

impl DrawTarget for GrayCanvas {
    type Color = Gray8;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color.luma());
            }
        }
        Ok(())
    }
}

impl OriginDimensions for GrayCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
