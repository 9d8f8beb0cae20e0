//! Glyph rasterization for the text sampler.
//!
//! The sampler only needs a coverage raster of the string, so the rasterizer
//! sits behind [`GlyphRasterizer`]. The built-in [`BitmapFont`] is a 5x7 cell
//! font scaled to any size; hosts with a real font engine can plug their own.

use image::{GrayImage, Luma};

/// Renders text into an 8-bit coverage raster.
pub trait GlyphRasterizer: Send + Sync {
    /// Width in pixels of `text` rendered at `font_size`.
    fn measure(&self, text: &str, font_size: f32) -> f32;

    /// Render `text` at `font_size`. The image is `ceil(measure)` wide and
    /// `ceil(font_size)` tall; luma is coverage (0 = empty, 255 = solid).
    fn rasterize(&self, text: &str, font_size: f32) -> GrayImage;
}

/// Glyph cell width in font units (excluding spacing).
const CELL_W: u32 = 5;
/// Glyph cell height in font units.
const CELL_H: u32 = 7;
/// Horizontal advance per character in font units.
const ADVANCE: u32 = CELL_W + 1;
/// Subsamples per pixel axis when computing coverage.
const SUPERSAMPLE: u32 = 2;

/// Scalable 5x7 bitmap font.
///
/// Letters are case-folded; `♥` and `❤` render as a heart. Characters
/// without a glyph advance like a space.
#[derive(Debug, Default, Clone, Copy)]
pub struct BitmapFont;

impl BitmapFont {
    pub fn new() -> Self {
        Self
    }

    fn unit(font_size: f32) -> f32 {
        font_size / CELL_H as f32
    }

    fn lit(chars: &[Option<[u8; 7]>], u: f32, v: f32) -> bool {
        if u < 0.0 || v < 0.0 {
            return false;
        }
        let (u, v) = (u as u32, v as u32);
        let index = (u / ADVANCE) as usize;
        let col = u % ADVANCE;
        if col >= CELL_W || v >= CELL_H {
            return false;
        }
        match chars.get(index) {
            Some(Some(rows)) => rows[v as usize] & (1 << (CELL_W - 1 - col)) != 0,
            _ => false,
        }
    }
}

impl GlyphRasterizer for BitmapFont {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        let count = text.chars().count() as u32;
        if count == 0 || !(font_size > 0.0) {
            return 0.0;
        }
        (count * ADVANCE - 1) as f32 * Self::unit(font_size)
    }

    fn rasterize(&self, text: &str, font_size: f32) -> GrayImage {
        let width = self.measure(text, font_size).ceil() as u32;
        let height = if font_size > 0.0 { font_size.ceil() as u32 } else { 0 };
        let mut raster = GrayImage::new(width, height);
        if width == 0 || height == 0 {
            return raster;
        }

        let chars: Vec<Option<[u8; 7]>> = text.chars().map(glyph).collect();
        let unit = Self::unit(font_size);
        let step = 1.0 / SUPERSAMPLE as f32;
        let total = SUPERSAMPLE * SUPERSAMPLE;

        for (px, py, pixel) in raster.enumerate_pixels_mut() {
            let mut hits = 0;
            for sy in 0..SUPERSAMPLE {
                for sx in 0..SUPERSAMPLE {
                    let x = px as f32 + (sx as f32 + 0.5) * step;
                    let y = py as f32 + (sy as f32 + 0.5) * step;
                    if Self::lit(&chars, x / unit, y / unit) {
                        hits += 1;
                    }
                }
            }
            *pixel = Luma([(hits * 255 / total) as u8]);
        }

        raster
    }
}

/// Row bitmaps for a character, top row first, leftmost column in bit 4.
fn glyph(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '♥' | '❤' => [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00],
        _ => return None,
    };
    Some(rows)
}
