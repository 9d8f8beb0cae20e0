//! Shape sampling: turn a semantic target into a cloud of target points.
//!
//! The sampler runs only when its inputs change (text, scale, shape or
//! canvas size), never per tick. Each run produces a fresh [`TargetSet`]
//! which replaces the previous one wholesale; particles refer to points by
//! index and carry the generation they were assigned under, so a stale index
//! is detected rather than silently aliased.
//!
//! | Source | Space | Method |
//! |--------|-------|--------|
//! | [`ShapeSource::Text`] | canvas px | raster scan on a gap grid, shuffled |
//! | [`ShapeSource::Heart`] | canvas px | parametric heart curve |
//! | [`ShapeSource::Scatter`] | canvas px | uniform disk |
//! | [`ShapeSource::Sphere`] | world | golden-angle spiral |
//! | [`ShapeSource::Heart3d`] | world | stacked heart slices |

pub mod curve;
pub mod font;
pub mod text;
pub mod volume;

use crate::config::{CanvasSize, TextConfig};
use crate::error::ConfigError;
use font::{BitmapFont, GlyphRasterizer};
use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound on the points a single shape may request.
pub const MAX_SHAPE_POINTS: u32 = 200_000;

/// Upper bound on column buckets in a [`TargetSet`].
const MAX_COLUMNS: usize = 4096;

/// What the particles should assemble into.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeSource {
    /// No target shape; the scene never assembles.
    None,
    /// The string in [`TextConfig::text`].
    #[default]
    Text,
    /// Parametric heart, `scale` is the width as a fraction of the smaller
    /// canvas dimension.
    Heart { samples: u32, scale: f32 },
    /// Golden-angle sphere in world units.
    Sphere { count: u32, radius: f32 },
    /// Stacked heart-curve slices in world units.
    Heart3d { layers: u32, samples: u32, radius: f32 },
    /// Uniform disk scatter, `radius` as a fraction of the smaller canvas
    /// dimension.
    Scatter { count: u32, radius: f32 },
}

impl ShapeSource {
    /// Whether the points live in 3D world space rather than canvas pixels.
    pub fn is_volumetric(&self) -> bool {
        matches!(self, ShapeSource::Sphere { .. } | ShapeSource::Heart3d { .. })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let check = |field: &'static str, v: f32| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, format!("must be finite and >= 0, got {}", v)))
            }
        };
        let bounded = |field: &'static str, n: u64| {
            if n <= MAX_SHAPE_POINTS as u64 {
                Ok(())
            } else {
                Err(ConfigError::invalid(
                    field,
                    format!("{} points exceeds the maximum of {}", n, MAX_SHAPE_POINTS),
                ))
            }
        };
        match self {
            ShapeSource::None | ShapeSource::Text => Ok(()),
            ShapeSource::Heart { samples, scale } => {
                bounded("shape.samples", *samples as u64)?;
                check("shape.scale", *scale)
            }
            ShapeSource::Sphere { count, radius } | ShapeSource::Scatter { count, radius } => {
                bounded("shape.count", *count as u64)?;
                check("shape.radius", *radius)
            }
            ShapeSource::Heart3d {
                layers,
                samples,
                radius,
            } => {
                bounded("shape.layers", *layers as u64 * *samples as u64)?;
                check("shape.radius", *radius)
            }
        }
    }
}

/// An immutable set of target points plus a coarse column index.
///
/// The column index buckets points by x so that a falling particle can find a
/// nearby target without scanning the whole set.
#[derive(Debug, Clone)]
pub struct TargetSet {
    points: Vec<Vec3>,
    min: Vec2,
    max: Vec2,
    generation: u64,
    column_width: f32,
    reach: f32,
    columns: Vec<Vec<usize>>,
}

impl TargetSet {
    /// An empty set for `generation`.
    pub fn empty(generation: u64) -> Self {
        Self {
            points: Vec::new(),
            min: Vec2::ZERO,
            max: Vec2::ZERO,
            generation,
            column_width: 1.0,
            reach: 1.0,
            columns: Vec::new(),
        }
    }

    /// Build a set from points, bucketing columns `column_width` wide.
    ///
    /// `column_width` is also the search reach of [`nearby`](Self::nearby).
    /// Columns widen as needed to keep the bucket count bounded.
    pub fn new(points: Vec<Vec3>, column_width: f32, generation: u64) -> Self {
        if points.is_empty() {
            return Self::empty(generation);
        }

        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in &points {
            min = min.min(p.truncate());
            max = max.max(p.truncate());
        }

        let reach = if column_width > 0.0 && column_width.is_finite() {
            column_width
        } else {
            1.0
        };
        let span = max.x - min.x;
        let column_width = reach.max(span / MAX_COLUMNS as f32);
        let count = ((span / column_width).floor() as usize + 1).min(MAX_COLUMNS);
        let mut columns = vec![Vec::new(); count];
        for (i, p) in points.iter().enumerate() {
            let c = (((p.x - min.x) / column_width) as usize).min(count - 1);
            columns[c].push(i);
        }

        Self {
            points,
            min,
            max,
            generation,
            column_width,
            reach,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// Generation this set was sampled under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 2D bounding box (xy) of the points, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        if self.is_empty() {
            None
        } else {
            Some((self.min, self.max))
        }
    }

    /// Whether `pos` is inside the capture band: the bounding box grown by
    /// `band` vertically and `reach` horizontally.
    pub fn band_contains(&self, pos: Vec2, band: f32, reach: f32) -> bool {
        match self.bounds() {
            Some((min, max)) => {
                pos.x >= min.x - reach
                    && pos.x <= max.x + reach
                    && pos.y >= min.y - band
                    && pos.y <= max.y + band
            }
            None => false,
        }
    }

    /// A random target from the column nearest to `x` that has any points.
    ///
    /// Only columns within the search reach of `x` are considered; `None`
    /// means the particle should keep falling. Many particles may receive
    /// the same point.
    pub fn nearby<R: Rng + ?Sized>(&self, x: f32, rng: &mut R) -> Option<usize> {
        if self.columns.is_empty() || !x.is_finite() {
            return None;
        }
        let last = self.columns.len() as isize - 1;
        let window = ((self.reach / self.column_width).ceil() as isize).max(1);
        let home = ((x - self.min.x) / self.column_width)
            .floor()
            .clamp(-(window as f32) - 1.0, (last + window + 1) as f32) as isize;

        for d in 0..=window {
            let left = home - d;
            let right = home + d;
            let filled = |c: isize| c >= 0 && c <= last && !self.columns[c as usize].is_empty();
            let left_ok = filled(left);
            let right_ok = d > 0 && filled(right);
            let col = match (left_ok, right_ok) {
                (true, true) => {
                    if rng.gen::<bool>() {
                        left
                    } else {
                        right
                    }
                }
                (true, false) => left,
                (false, true) => right,
                (false, false) => continue,
            };
            let bucket = &self.columns[col as usize];
            return Some(bucket[rng.gen_range(0..bucket.len())]);
        }
        None
    }

    /// Whether every point lies inside a `width` x `height` canvas.
    pub fn all_within(&self, width: f32, height: f32) -> bool {
        self.points
            .iter()
            .all(|p| p.x >= 0.0 && p.x <= width && p.y >= 0.0 && p.y <= height)
    }
}

/// Produces [`TargetSet`]s from a [`ShapeSource`].
pub struct ShapeSampler {
    rasterizer: Box<dyn GlyphRasterizer>,
    generation: u64,
}

impl Default for ShapeSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeSampler {
    /// Sampler using the built-in bitmap font.
    pub fn new() -> Self {
        Self::with_rasterizer(Box::new(BitmapFont::new()))
    }

    pub fn with_rasterizer(rasterizer: Box<dyn GlyphRasterizer>) -> Self {
        Self {
            rasterizer,
            generation: 0,
        }
    }

    /// Swap the glyph rasterizer. Generations keep counting up.
    pub fn set_rasterizer(&mut self, rasterizer: Box<dyn GlyphRasterizer>) {
        self.rasterizer = rasterizer;
    }

    /// Generation of the most recent set.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sample `source` for the given canvas.
    ///
    /// `column_width` sizes the nearby-target index (use the capture radius).
    /// Degenerate input yields an empty set, never an error.
    pub fn sample<R: Rng + ?Sized>(
        &mut self,
        source: &ShapeSource,
        text: &TextConfig,
        canvas: CanvasSize,
        column_width: f32,
        rng: &mut R,
    ) -> TargetSet {
        self.generation += 1;

        let points = match source {
            ShapeSource::None => Vec::new(),
            ShapeSource::Text => {
                let (points, layout) = text::sample(self.rasterizer.as_ref(), text, canvas, rng);
                if let Some(layout) = layout {
                    log::debug!(
                        "Sampled {:?}: font {:.1}px, gap {:.2}px, {} points",
                        text.text,
                        layout.font_size,
                        layout.gap,
                        points.len()
                    );
                }
                points
            }
            ShapeSource::Heart { samples, scale } => curve::heart(*samples, *scale, canvas),
            ShapeSource::Sphere { count, radius } => volume::fibonacci_sphere(*count, *radius),
            ShapeSource::Heart3d {
                layers,
                samples,
                radius,
            } => volume::heart_volume(*layers, *samples, *radius),
            ShapeSource::Scatter { count, radius } => volume::scatter(*count, *radius, canvas, rng),
        };

        if points.is_empty() && *source != ShapeSource::None {
            log::debug!(
                "Shape {:?} produced no points for {}x{} canvas",
                source,
                canvas.width,
                canvas.height
            );
        }

        TargetSet::new(points, column_width, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn love(width: u32, height: u32, seed: u64) -> TargetSet {
        let mut sampler = ShapeSampler::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        sampler.sample(
            &ShapeSource::Text,
            &TextConfig::default(),
            CanvasSize::new(width, height),
            60.0,
            &mut rng,
        )
    }

    #[test]
    fn test_sampler_determinism_across_seeds() {
        let a = love(800, 600, 1);
        let b = love(800, 600, 99);
        // Shuffle order differs, count and coverage do not
        assert_eq!(a.len(), b.len());
        assert_eq!(a.bounds(), b.bounds());
    }

    #[test]
    fn test_generation_increments() {
        let mut sampler = ShapeSampler::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let text = TextConfig::default();
        let canvas = CanvasSize::new(100, 100);
        let a = sampler.sample(&ShapeSource::None, &text, canvas, 10.0, &mut rng);
        let b = sampler.sample(&ShapeSource::None, &text, canvas, 10.0, &mut rng);
        assert!(a.is_empty());
        assert!(b.generation() > a.generation());
    }

    #[test]
    fn test_nearby_prefers_home_column() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(5.0, 1.0, 0.0),
            Vec3::new(100.0, 0.0, 0.0),
        ];
        let set = TargetSet::new(points, 10.0, 1);
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..20 {
            let i = set.nearby(3.0, &mut rng).unwrap();
            assert!(i == 0 || i == 1);
            assert_eq!(set.nearby(97.0, &mut rng), Some(2));
        }
        // An empty neighbour column falls back to the next filled one
        assert_eq!(set.nearby(92.0, &mut rng), Some(2));
        assert_eq!(set.nearby(-8.0, &mut rng).map(|i| i < 2), Some(true));
    }

    #[test]
    fn test_nearby_stays_within_reach() {
        let points = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(100.0, 0.0, 0.0)];
        let set = TargetSet::new(points, 10.0, 1);
        let mut rng = SmallRng::seed_from_u64(8);
        assert_eq!(set.nearby(50.0, &mut rng), None);
        assert_eq!(set.nearby(-500.0, &mut rng), None);
        assert_eq!(set.nearby(1e9, &mut rng), None);
        assert_eq!(set.nearby(f32::NAN, &mut rng), None);
    }

    #[test]
    fn test_tiny_column_width_is_bounded() {
        let points: Vec<Vec3> = (0..640).map(|i| Vec3::new(i as f32, 10.0, 0.0)).collect();
        for width in [1e-30, 1e-6, 0.0, -3.0, f32::NAN, f32::INFINITY] {
            let set = TargetSet::new(points.clone(), width, 1);
            assert!(set.columns.len() <= MAX_COLUMNS);
            let mut rng = SmallRng::seed_from_u64(2);
            assert!(set.nearby(320.0, &mut rng).is_some());
        }
    }

    #[test]
    fn test_oversized_shapes_are_rejected() {
        let shapes = [
            ShapeSource::Heart3d {
                layers: 70_000,
                samples: 70_000,
                radius: 1.0,
            },
            ShapeSource::Sphere {
                count: u32::MAX,
                radius: 1.0,
            },
            ShapeSource::Scatter {
                count: MAX_SHAPE_POINTS + 1,
                radius: 0.3,
            },
            ShapeSource::Heart {
                samples: u32::MAX,
                scale: 0.5,
            },
        ];
        for shape in shapes {
            assert!(shape.validate().is_err(), "{:?}", shape);
        }
        let ok = ShapeSource::Heart3d {
            layers: 40,
            samples: 200,
            radius: 1.0,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_band_contains() {
        let set = TargetSet::new(vec![Vec3::new(100.0, 100.0, 0.0), Vec3::new(200.0, 150.0, 0.0)], 20.0, 1);
        assert!(set.band_contains(Vec2::new(150.0, 70.0), 40.0, 10.0));
        assert!(!set.band_contains(Vec2::new(150.0, 50.0), 40.0, 10.0));
        assert!(!set.band_contains(Vec2::new(250.0, 120.0), 40.0, 10.0));
        assert!(!TargetSet::empty(0).band_contains(Vec2::ZERO, 1e9, 1e9));
    }

    #[test]
    fn test_empty_set_has_no_nearby() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(TargetSet::empty(3).nearby(0.0, &mut rng), None);
    }
}
