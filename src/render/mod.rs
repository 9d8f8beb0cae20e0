//! Drawing particles onto a 2D surface.
//!
//! The renderer speaks to an abstract [`Surface`] (the shape of an HTML
//! canvas 2D context): fills, strokes, gradients and clears with a
//! save/restore state stack. Two backends ship with the crate:
//!
//! - [`RasterSurface`]: software rasterizer on a float RGBA image, with PNG
//!   export.
//! - [`RecordingSurface`]: records every call as a [`DrawOp`] for tests or
//!   for replay onto a real canvas.
//!
//! Each frame the [`Renderer`]:
//!
//! 1. fades or clears the previous frame depending on [`TrailMode`],
//! 2. projects live particles and drops invalid or invisible ones,
//! 3. sorts farthest-first under a perspective camera,
//! 4. draws each particle (trail, glow, body) inside a [`SurfaceGuard`] so no
//!    state leaks from one particle to the next.

pub mod instances;
pub mod path;
pub mod raster;
pub mod recorder;

pub use instances::SpriteInstance;
pub use path::Path;
pub use raster::RasterSurface;
pub use recorder::{DrawOp, RecordingSurface};

use crate::camera::{Projected, Projector};
use crate::particle::Particle;
use crate::pool::ParticlePool;
use crate::visuals::{BlendMode, ParticleShape, TrailMode, VisualConfig};
use glam::{Vec2, Vec3, Vec4};
use std::ops::{Deref, DerefMut};

/// Inner/outer star radius ratio for star particles.
const STAR_INNER: f32 = 0.45;
/// Trail segments reach at most this fraction of the particle's alpha.
const TRAIL_ALPHA: f32 = 0.6;

/// A 2D drawing context.
///
/// Colors are straight (non-premultiplied) RGBA in `[0, 1]`. The effective
/// opacity of every draw is `color.w * global_alpha`.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Push the current global alpha and blend mode.
    fn save(&mut self);

    /// Pop the state pushed by the matching [`save`](Surface::save).
    fn restore(&mut self);

    fn set_global_alpha(&mut self, alpha: f32);

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Fill the whole surface with an opaque color, ignoring state.
    fn clear(&mut self, color: Vec3);

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Vec4);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4);

    /// Radial gradient from `inner` at the centre to `outer` at `radius`.
    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Vec4, outer: Vec4);

    fn fill_path(&mut self, path: &Path, color: Vec4);

    fn stroke_path(&mut self, path: &Path, width: f32, color: Vec4);
}

/// Saves surface state on creation and restores it on drop.
pub struct SurfaceGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> SurfaceGuard<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for SurfaceGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for SurfaceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for SurfaceGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// Collect drawable particles as `(slot, projection)` in painter's order.
///
/// Dead particles, particles with `alpha <= 0` or `size <= 0`, and invalid
/// projections are skipped. Under a perspective camera the result is sorted
/// farthest first.
pub fn visible(pool: &ParticlePool, projector: &Projector, out: &mut Vec<(usize, Projected)>) {
    out.clear();
    for (i, p) in pool.iter_live() {
        if !p.is_visible() {
            continue;
        }
        let projected = projector.project(p.position);
        if projected.is_valid() {
            out.push((i, projected));
        }
    }
    if projector.is_perspective() {
        out.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));
    }
}

/// Draws a particle pool each frame.
#[derive(Debug, Default)]
pub struct Renderer {
    order: Vec<(usize, Projected)>,
    trail_points: Vec<Vec2>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one frame. Returns the number of particles drawn.
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        pool: &ParticlePool,
        projector: &Projector,
        visuals: &VisualConfig,
        surface: &mut S,
    ) -> usize {
        self.prologue(visuals, surface);

        let mut order = std::mem::take(&mut self.order);
        visible(pool, projector, &mut order);

        for &(i, projected) in &order {
            if let Some(p) = pool.get(i) {
                let mut guard = SurfaceGuard::new(&mut *surface);
                self.draw_particle(p, projected, projector, visuals, &mut *guard);
            }
        }

        let drawn = order.len();
        self.order = order;
        drawn
    }

    /// Clear, or fade the previous frame for accumulation trails.
    fn prologue<S: Surface + ?Sized>(&self, visuals: &VisualConfig, surface: &mut S) {
        match visuals.trail_mode {
            TrailMode::History => surface.clear(visuals.background),
            TrailMode::Accumulate => {
                let (w, h) = surface.size();
                let mut s = SurfaceGuard::new(surface);
                s.set_blend_mode(BlendMode::DestinationOut);
                s.set_global_alpha(visuals.fade_alpha);
                s.fill_rect(Vec2::ZERO, Vec2::new(w as f32, h as f32), Vec4::ONE);
            }
        }
    }

    fn draw_particle<S: Surface + ?Sized>(
        &mut self,
        p: &Particle,
        projected: Projected,
        projector: &Projector,
        visuals: &VisualConfig,
        surface: &mut S,
    ) {
        let rgb = p.color.to_rgb();
        let center = projected.screen;
        let radius = p.size * projected.scale;
        if !(radius > 0.0) {
            return;
        }

        // Trail, faint at the tail
        if visuals.trail_mode == TrailMode::History && p.trail.len() > 1 {
            self.trail_points.clear();
            self.trail_points.extend(p.trail.iter().filter_map(|&q| {
                let t = projector.project(q);
                t.is_valid().then_some(t.screen)
            }));
            let n = self.trail_points.len();
            if n > 1 {
                surface.set_blend_mode(visuals.blend_mode);
                let width = (radius * 0.8).max(0.5);
                for k in 1..n {
                    let alpha = p.alpha * TRAIL_ALPHA * k as f32 / n as f32;
                    let mut segment = Path::new();
                    segment
                        .move_to(self.trail_points[k - 1])
                        .line_to(self.trail_points[k]);
                    surface.stroke_path(&segment, width, rgb.extend(alpha));
                }
            }
        }

        // Glow
        if visuals.glow_intensity > 0.0 && visuals.glow_alpha > 0.0 {
            surface.set_blend_mode(BlendMode::Additive);
            surface.set_global_alpha(1.0);
            let inner = rgb.extend(visuals.glow_alpha * p.alpha);
            surface.fill_radial_gradient(
                center,
                radius * visuals.glow_intensity,
                inner,
                rgb.extend(0.0),
            );
        }

        // Body
        surface.set_blend_mode(visuals.blend_mode);
        surface.set_global_alpha(p.alpha);
        let color = rgb.extend(1.0);
        match p.shape {
            ParticleShape::Circle => surface.fill_circle(center, radius, color),
            ParticleShape::Heart => surface.fill_path(&path::heart(center, radius), color),
            ParticleShape::Star => {
                surface.fill_path(&path::star(center, radius, radius * STAR_INNER, 5), color)
            }
            ParticleShape::Ring => {
                let width = visuals.line_width * projected.scale.max(0.1);
                surface.stroke_path(&path::heart(center, radius), width, color)
            }
        }
    }
}

/// Save/restore state shared by the bundled backends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DrawState {
    pub alpha: f32,
    pub blend: BlendMode,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blend: BlendMode::Alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasSize;
    use crate::particle::Phase;

    fn pool_with(positions: &[Vec3]) -> ParticlePool {
        let mut pool = ParticlePool::new(positions.len() + 2, positions.len() + 2, 4);
        for &pos in positions {
            pool.spawn(Phase::Burn, pos, 0, |p| p.set_size(3.0));
        }
        pool
    }

    #[test]
    fn test_guard_balances_save_restore() {
        let mut surface = RecordingSurface::new(10, 10);
        {
            let mut guard = SurfaceGuard::new(&mut surface);
            guard.set_global_alpha(0.3);
        }
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.ops(), &[DrawOp::Save, DrawOp::SetGlobalAlpha(0.3), DrawOp::Restore]);
    }

    #[test]
    fn test_skips_invisible_particles() {
        let mut pool = pool_with(&[Vec3::new(5.0, 5.0, 0.0), Vec3::new(6.0, 6.0, 0.0)]);
        pool.get_mut(0).unwrap().alpha = 0.0;
        let projector = Projector::flat(CanvasSize::new(20, 20));
        let mut surface = RecordingSurface::new(20, 20);
        let drawn = Renderer::new().draw(&pool, &projector, &VisualConfig::default(), &mut surface);
        assert_eq!(drawn, 1);
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_skips_invalid_projection() {
        let pool = pool_with(&[Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO]);
        let mut camera_config = crate::config::CameraConfig::default();
        camera_config.perspective = true;
        let projector = Projector::from_config(&camera_config, CanvasSize::new(100, 100));
        let mut out = Vec::new();
        visible(&pool, &projector, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 1);
    }

    #[test]
    fn test_painter_order_farthest_first() {
        let pool = pool_with(&[
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 0.0),
        ]);
        let mut camera_config = crate::config::CameraConfig::default();
        camera_config.perspective = true;
        camera_config.pitch = 0.0;
        let projector = Projector::from_config(&camera_config, CanvasSize::new(100, 100));
        let mut out = Vec::new();
        visible(&pool, &projector, &mut out);
        let slots: Vec<usize> = out.iter().map(|(i, _)| *i).collect();
        assert_eq!(slots, vec![1, 2, 0]);
    }

    #[test]
    fn test_history_clears_accumulate_fades() {
        let pool = pool_with(&[]);
        let projector = Projector::flat(CanvasSize::new(8, 8));
        let mut visuals = VisualConfig::default();

        let mut surface = RecordingSurface::new(8, 8);
        Renderer::new().draw(&pool, &projector, &visuals, &mut surface);
        assert!(matches!(surface.ops()[0], DrawOp::Clear(_)));

        visuals.accumulate(0.25);
        let mut surface = RecordingSurface::new(8, 8);
        Renderer::new().draw(&pool, &projector, &visuals, &mut surface);
        assert!(surface
            .ops()
            .contains(&DrawOp::SetBlendMode(BlendMode::DestinationOut)));
        assert!(surface.ops().contains(&DrawOp::SetGlobalAlpha(0.25)));
        assert!(!surface.ops().iter().any(|op| matches!(op, DrawOp::Clear(_))));
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_body_shapes() {
        let projector = Projector::flat(CanvasSize::new(50, 50));
        for (shape, expect_stroke) in [
            (ParticleShape::Circle, false),
            (ParticleShape::Heart, false),
            (ParticleShape::Star, false),
            (ParticleShape::Ring, true),
        ] {
            let mut pool = pool_with(&[Vec3::new(25.0, 25.0, 0.0)]);
            pool.get_mut(0).unwrap().shape = shape;
            let mut visuals = VisualConfig::default();
            visuals.trails(0).glow(0.0);
            let mut surface = RecordingSurface::new(50, 50);
            Renderer::new().draw(&pool, &projector, &visuals, &mut surface);
            let strokes = surface
                .ops()
                .iter()
                .filter(|op| matches!(op, DrawOp::StrokePath { .. }))
                .count();
            assert_eq!(strokes > 0, expect_stroke, "{:?}", shape);
        }
    }
}
