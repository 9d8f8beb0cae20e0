//! Text sampling: rasterize a string and keep every bright pixel on a grid.

use super::font::GlyphRasterizer;
use crate::config::{CanvasSize, TextConfig};
use glam::{Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;

/// Layout chosen for a sampled string, kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    /// Final font size after shrinking to fit.
    pub font_size: f32,
    /// Grid step used while scanning the raster.
    pub gap: f32,
    /// Top-left corner of the raster on the canvas.
    pub offset: Vec2,
    /// Number of raster pixels above the coverage threshold.
    pub lit_area: u32,
}

/// Sample `config.text` centred on the canvas.
///
/// Returns the shuffled points and the layout used, or an empty list and
/// `None` for empty text, a zero canvas, or text too small to rasterize.
pub fn sample<R: Rng + ?Sized>(
    rasterizer: &dyn GlyphRasterizer,
    config: &TextConfig,
    canvas: CanvasSize,
    rng: &mut R,
) -> (Vec<Vec3>, Option<TextLayout>) {
    let text = config.text.trim();
    if text.is_empty() || canvas.is_empty() {
        return (Vec::new(), None);
    }

    let (w, h) = (canvas.width as f32, canvas.height as f32);
    let max_width = w * config.width_fraction;
    let mut font_size = (h * config.max_height_fraction).min(h);

    let measured = rasterizer.measure(text, font_size);
    if !(measured > 0.0) {
        return (Vec::new(), None);
    }
    if measured > max_width {
        font_size *= max_width / measured;
    }
    if font_size < 1.0 {
        return (Vec::new(), None);
    }

    let raster = rasterizer.rasterize(text, font_size);
    let threshold = config.alpha_threshold;
    let lit_area = raster.pixels().filter(|p| p.0[0] > threshold).count() as u32;
    if lit_area == 0 {
        return (Vec::new(), None);
    }

    let budget = if canvas.width < config.mobile_breakpoint {
        config.mobile_point_budget
    } else {
        config.point_budget
    }
    .max(1);
    let gap = (lit_area as f32 / budget as f32)
        .sqrt()
        .clamp(config.min_gap, config.max_gap);

    let (rw, rh) = raster.dimensions();
    let offset = Vec2::new(
        ((w - rw as f32) / 2.0).max(0.0),
        ((h - rh as f32) / 2.0).max(0.0),
    );

    let mut points = Vec::new();
    let mut y = 0.0;
    while y < rh as f32 {
        let py = y as u32;
        let mut x = 0.0;
        while x < rw as f32 {
            let px = x as u32;
            if raster.get_pixel(px, py).0[0] > threshold {
                let p = offset + Vec2::new(px as f32, py as f32);
                if p.x <= w && p.y <= h {
                    points.push(p.extend(0.0));
                }
            }
            x += gap;
        }
        y += gap;
    }

    points.shuffle(rng);

    (
        points,
        Some(TextLayout {
            font_size,
            gap,
            offset,
            lit_area,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::font::BitmapFont;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn run(text: &str, width: u32, height: u32) -> (Vec<Vec3>, Option<TextLayout>) {
        let config = TextConfig {
            text: text.into(),
            ..Default::default()
        };
        let mut rng = SmallRng::seed_from_u64(7);
        sample(&BitmapFont, &config, CanvasSize::new(width, height), &mut rng)
    }

    #[test]
    fn test_love_fits_and_respects_budget() {
        let (points, layout) = run("LOVE", 800, 600);
        let layout = layout.unwrap();
        assert!(layout.font_size * 23.0 / 7.0 <= 800.0 * 0.8 + 0.5);
        assert!(layout.gap >= 2.0 && layout.gap <= 6.0);
        assert!(points.len() > 500, "too sparse: {}", points.len());
        assert!(points.len() < 4000, "too dense: {}", points.len());
        for p in &points {
            assert!(p.x >= 0.0 && p.x <= 800.0 && p.y >= 0.0 && p.y <= 600.0);
        }
    }

    #[test]
    fn test_long_text_shrinks() {
        let (_, short) = run("HI", 800, 600);
        let (_, long) = run("HAPPY VALENTINES DAY", 800, 600);
        assert!(long.unwrap().font_size < short.unwrap().font_size);
    }

    #[test]
    fn test_mobile_budget_is_coarser() {
        let (desktop, _) = run("LOVE", 800, 600);
        let (mobile, _) = run("LOVE", 400, 600);
        assert!(mobile.len() < desktop.len());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(run("", 800, 600).0.is_empty());
        assert!(run("   ", 800, 600).0.is_empty());
        assert!(run("LOVE", 0, 600).0.is_empty());
        assert!(run("LOVE", 800, 0).0.is_empty());
    }
}
