//! Spawn context for particle initialization.
//!
//! Wraps the simulation's seeded RNG with helpers for the positions,
//! directions, sizes and colors that emitters and scenes need.

use crate::visuals::{Hsl, Palette};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Helpers over the simulation RNG.
///
/// Every random draw in the engine goes through one [`SmallRng`], so a fixed
/// seed reproduces a run exactly:
///
/// ```ignore
/// let mut rng = SmallRng::seed_from_u64(7);
/// let mut ctx = SpawnContext::new(&mut rng);
/// let dir = ctx.random_direction_2d();
/// let color = ctx.palette_color(Palette::Rose, 8.0);
/// ```
pub struct SpawnContext<'a> {
    rng: &'a mut SmallRng,
}

impl<'a> SpawnContext<'a> {
    pub fn new(rng: &'a mut SmallRng) -> Self {
        Self { rng }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random index in `0..len`, `None` when `len` is zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    // ========== Position helpers ==========

    /// Random point inside a sphere of given radius, centered at origin.
    ///
    /// Distribution is uniform throughout the volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        // Cube root for uniform volume distribution
        let r = radius * self.random().cbrt();
        self.random_direction() * r
    }

    /// Random point on the segment from `start` to `end`.
    pub fn random_on_line(&mut self, start: Vec3, end: Vec3) -> Vec3 {
        start.lerp(end, self.random())
    }

    // ========== Direction/velocity helpers ==========

    /// Random unit vector, uniform on the unit sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        let z = self.random_range(-1.0, 1.0);
        let theta = self.random_range(0.0, TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }

    /// Random unit vector in the screen plane.
    pub fn random_direction_2d(&mut self) -> Vec2 {
        let theta = self.random_range(0.0, TAU);
        Vec2::new(theta.cos(), theta.sin())
    }

    // ========== Appearance helpers ==========

    /// Random size in `[min, max]`.
    pub fn size(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.random()
    }

    /// Random color from `palette` with up to `jitter` degrees of hue noise.
    pub fn palette_color(&mut self, palette: Palette, jitter: f32) -> Hsl {
        let base = Hsl::from_rgb(palette.sample(self.random()));
        base.shifted(self.random_range(-jitter, jitter))
    }

    /// `color` with up to `jitter` degrees of hue noise.
    pub fn jitter_hue(&mut self, color: Hsl, jitter: f32) -> Hsl {
        color.shifted(self.random_range(-jitter, jitter))
    }

    /// Random offset into the turbulence function.
    pub fn noise_phase(&mut self) -> f32 {
        self.random_range(0.0, 1000.0)
    }
}
