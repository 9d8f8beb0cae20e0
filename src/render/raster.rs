//! Software rasterizer backend.
//!
//! Pixels are stored premultiplied in an [`Rgba32FImage`] so additive glows
//! can exceed 1.0 before the final export clamps them. Edges are antialiased
//! by pixel-centre coverage.

use super::path::Polyline;
use super::{DrawState, Path, Surface};
use crate::error::RenderError;
use crate::visuals::BlendMode;
use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, Rgba32FImage, RgbaImage};

/// Sub-samples per axis when filling paths.
const PATH_SUPERSAMPLE: u32 = 2;

/// A 2D surface backed by a float image.
pub struct RasterSurface {
    image: Rgba32FImage,
    background: Vec3,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RasterSurface {
    /// A transparent surface that exports over `background`.
    pub fn new(width: u32, height: u32, background: Vec3) -> Self {
        Self {
            image: Rgba32FImage::new(width, height),
            background,
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// Recreate the pixel buffer at a new size. Contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = Rgba32FImage::new(width, height);
    }

    pub fn set_background(&mut self, background: Vec3) {
        self.background = background;
    }

    /// Premultiplied RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        (x < self.image.width() && y < self.image.height())
            .then(|| Vec4::from_array(self.image.get_pixel(x, y).0))
    }

    /// Final color at `(x, y)` after compositing over the background.
    pub fn color_at(&self, x: u32, y: u32) -> Option<Vec3> {
        self.pixel(x, y).map(|p| self.over_background(p))
    }

    /// Export as 8-bit RGBA composited over the background.
    pub fn to_rgba8(&self) -> RgbaImage {
        RgbaImage::from_fn(self.image.width(), self.image.height(), |x, y| {
            let c = self.over_background(Vec4::from_array(self.image.get_pixel(x, y).0));
            let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
            Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
        })
    }

    /// Write the frame as a PNG.
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> Result<(), RenderError> {
        self.to_rgba8()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn over_background(&self, p: Vec4) -> Vec3 {
        p.truncate() + self.background * (1.0 - p.w.clamp(0.0, 1.0))
    }

    /// Composite one straight-alpha `color` at `coverage` into pixel `(x, y)`.
    fn blend(&mut self, x: u32, y: u32, color: Vec4, coverage: f32) {
        let a = (color.w * self.state.alpha * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let src = (color.truncate() * a).extend(a);
        let px = self.image.get_pixel_mut(x, y);
        let dst = Vec4::from_array(px.0);

        let out = match self.state.blend {
            BlendMode::Alpha => src + dst * (1.0 - a),
            BlendMode::Additive => {
                let sum = src + dst;
                sum.truncate().extend(sum.w.min(1.0))
            }
            BlendMode::Multiply => {
                let rgb = src.truncate() * (1.0 - dst.w)
                    + dst.truncate() * (1.0 - a)
                    + src.truncate() * dst.truncate();
                rgb.extend(a + dst.w * (1.0 - a))
            }
            BlendMode::DestinationOut => dst * (1.0 - a),
        };
        px.0 = out.to_array();
    }

    /// Pixel rectangle covering `min..max`, clipped to the image.
    fn clip(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(w);
        let y1 = max.y.ceil().min(h);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        } else {
            log::warn!("restore() without matching save()");
        }
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn clear(&mut self, color: Vec3) {
        let fill = Rgba(color.extend(1.0).to_array());
        for px in self.image.pixels_mut() {
            *px = fill;
        }
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Vec4) {
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        if !(radius > 0.0) {
            return;
        }
        let reach = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - reach, center + reach) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = pixel_center(x, y).distance(center);
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Vec4, outer: Vec4) {
        if !(radius > 0.0) {
            return;
        }
        let reach = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(center - reach, center + reach) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = pixel_center(x, y).distance(center);
                if d > radius {
                    continue;
                }
                let color = inner.lerp(outer, d / radius);
                self.blend(x, y, color, 1.0);
            }
        }
    }

    fn fill_path(&mut self, path: &Path, color: Vec4) {
        let lines = path.flatten();
        let Some((min, max)) = path.bounds() else {
            return;
        };
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };
        let n = PATH_SUPERSAMPLE;
        let step = 1.0 / n as f32;
        for y in y0..y1 {
            for x in x0..x1 {
                let mut hits = 0;
                for sy in 0..n {
                    for sx in 0..n {
                        let p = Vec2::new(
                            x as f32 + (sx as f32 + 0.5) * step,
                            y as f32 + (sy as f32 + 0.5) * step,
                        );
                        if inside(&lines, p) {
                            hits += 1;
                        }
                    }
                }
                if hits > 0 {
                    self.blend(x, y, color, hits as f32 / (n * n) as f32);
                }
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f32, color: Vec4) {
        if !(width > 0.0) {
            return;
        }
        let lines = path.flatten();
        let Some((min, max)) = path.bounds() else {
            return;
        };
        let half = width * 0.5;
        let pad = Vec2::splat(half + 1.0);
        let Some((x0, y0, x1, y1)) = self.clip(min - pad, max + pad) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let d = distance_to_lines(&lines, pixel_center(x, y));
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

#[inline]
fn pixel_center(x: u32, y: u32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// Every segment of a polyline, including the closing edge.
fn segments(line: &Polyline) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let pts = &line.points;
    let closing = (line.closed && pts.len() > 2).then(|| (pts[pts.len() - 1], pts[0]));
    pts.windows(2).map(|w| (w[0], w[1])).chain(closing)
}

/// Even-odd point-in-polygon test. Open subpaths are treated as closed.
fn inside(lines: &[Polyline], p: Vec2) -> bool {
    let mut crossings = 0;
    for line in lines {
        let pts = &line.points;
        if pts.len() < 3 {
            continue;
        }
        let mut prev = pts[pts.len() - 1];
        for &cur in pts {
            if (cur.y > p.y) != (prev.y > p.y) {
                let x = prev.x + (p.y - prev.y) / (cur.y - prev.y) * (cur.x - prev.x);
                if p.x < x {
                    crossings += 1;
                }
            }
            prev = cur;
        }
    }
    crossings % 2 == 1
}

fn distance_to_lines(lines: &[Polyline], p: Vec2) -> f32 {
    lines
        .iter()
        .flat_map(segments)
        .map(|(a, b)| distance_to_segment(p, a, b))
        .fold(f32::INFINITY, f32::min)
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::path;

    fn surface() -> RasterSurface {
        RasterSurface::new(32, 32, Vec3::new(0.1, 0.1, 0.1))
    }

    #[test]
    fn test_clear_is_opaque() {
        let mut s = surface();
        s.clear(Vec3::new(0.2, 0.3, 0.4));
        assert_eq!(s.pixel(5, 5), Some(Vec4::new(0.2, 0.3, 0.4, 1.0)));
        assert_eq!(s.pixel(32, 0), None);
    }

    #[test]
    fn test_circle_covers_center_only() {
        let mut s = surface();
        s.fill_circle(Vec2::new(16.0, 16.0), 4.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let c = s.pixel(16, 16).unwrap();
        assert!((c.x - 1.0).abs() < 1e-5 && (c.w - 1.0).abs() < 1e-5);
        assert_eq!(s.pixel(0, 0).unwrap().w, 0.0);
        assert_eq!(s.pixel(16, 25).unwrap().w, 0.0);
    }

    #[test]
    fn test_global_alpha_and_restore() {
        let mut s = surface();
        s.save();
        s.set_global_alpha(0.5);
        s.fill_rect(Vec2::ZERO, Vec2::new(4.0, 4.0), Vec4::ONE);
        s.restore();
        assert!((s.pixel(1, 1).unwrap().w - 0.5).abs() < 1e-5);

        s.fill_rect(Vec2::new(8.0, 0.0), Vec2::new(12.0, 4.0), Vec4::ONE);
        assert!((s.pixel(9, 1).unwrap().w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_destination_out_fades() {
        let mut s = surface();
        s.clear(Vec3::ONE);
        s.set_blend_mode(BlendMode::DestinationOut);
        s.set_global_alpha(0.25);
        s.fill_rect(Vec2::ZERO, Vec2::new(32.0, 32.0), Vec4::ONE);
        let p = s.pixel(3, 3).unwrap();
        assert!((p.w - 0.75).abs() < 1e-5);
        assert!((p.x - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_additive_accumulates() {
        let mut s = surface();
        s.set_blend_mode(BlendMode::Additive);
        for _ in 0..2 {
            s.fill_rect(Vec2::ZERO, Vec2::new(2.0, 2.0), Vec4::new(0.4, 0.0, 0.0, 1.0));
        }
        let p = s.pixel(0, 0).unwrap();
        assert!((p.x - 0.8).abs() < 1e-5);
        assert_eq!(p.w, 1.0);
    }

    #[test]
    fn test_heart_fill_and_stroke() {
        let mut s = surface();
        let heart = path::heart(Vec2::new(16.0, 16.0), 10.0);
        s.fill_path(&heart, Vec4::ONE);
        assert!(s.pixel(16, 18).unwrap().w > 0.99);
        assert_eq!(s.pixel(2, 30).unwrap().w, 0.0);

        let mut s = surface();
        s.stroke_path(&heart, 1.5, Vec4::ONE);
        assert_eq!(s.pixel(16, 18).unwrap().w, 0.0);
        assert!(s.pixel(16, 25).unwrap().w > 0.0);
    }

    #[test]
    fn test_unbalanced_restore_is_harmless() {
        let mut s = surface();
        s.set_global_alpha(0.3);
        s.restore();
        s.fill_rect(Vec2::ZERO, Vec2::ONE, Vec4::ONE);
        assert!((s.pixel(0, 0).unwrap().w - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_export_png() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("frame.png");
        let mut s = surface();
        s.fill_circle(Vec2::new(8.0, 8.0), 3.0, Vec4::ONE);
        s.save_png(&file).unwrap();
        let img = image::open(&file).unwrap();
        assert_eq!(img.width(), 32);
        assert_eq!(s.to_rgba8().get_pixel(0, 0).0, [26, 26, 26, 255]);
    }
}
