//! Volumetric and scatter distributions.
//!
//! Sphere and heart volumes are in world units centred on the origin and are
//! meant to be viewed through the perspective [`Projector`](crate::camera::Projector).
//! Scatter points are in canvas pixels.

use super::curve::heart_point;
use super::MAX_SHAPE_POINTS;
use crate::config::CanvasSize;
use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Angle between successive points of the golden spiral.
const GOLDEN_ANGLE: f32 = PI * 0.763_932; // PI * (3 - sqrt(5))

/// Half-height of the raw heart curve, used to normalise slices to ~[-1, 1].
const HEART_EXTENT: f32 = 17.0;

/// `count` points evenly spread over a sphere using the golden-angle spiral.
///
/// Deterministic: the same inputs always give the same points.
pub fn fibonacci_sphere(count: u32, radius: f32) -> Vec<Vec3> {
    if count == 0 || !(radius > 0.0) {
        return Vec::new();
    }

    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * i as f32;
            Vec3::new(theta.cos() * r, y, theta.sin() * r) * radius
        })
        .collect()
}

/// A heart volume made of `layers` heart-curve slices stacked along z.
///
/// Each slice is scaled by `sqrt(1 - z²)` so the volume rounds off front and
/// back, and the depth is half the width.
pub fn heart_volume(layers: u32, samples: u32, radius: f32) -> Vec<Vec3> {
    if layers == 0 || samples == 0 || !(radius > 0.0) {
        return Vec::new();
    }

    let total = (layers as usize).saturating_mul(samples as usize);
    let mut points = Vec::with_capacity(total.min(MAX_SHAPE_POINTS as usize));
    for layer in 0..layers {
        let z = -1.0 + 2.0 * (layer as f32 + 0.5) / layers as f32;
        let k = (1.0 - z * z).max(0.0).sqrt();
        for i in 0..samples {
            let t = TAU * i as f32 / samples as f32;
            let p = heart_point(t) / HEART_EXTENT * k * radius;
            points.push(Vec3::new(p.x, p.y, z * radius * 0.5));
        }
    }
    points
}

/// `count` points uniformly scattered in a disk around the canvas centre.
///
/// The disk radius is `radius * min(width, height)`.
pub fn scatter<R: Rng + ?Sized>(count: u32, radius: f32, canvas: CanvasSize, rng: &mut R) -> Vec<Vec3> {
    if count == 0 || canvas.is_empty() || !(radius > 0.0) {
        return Vec::new();
    }

    let max_r = radius.min(0.5) * canvas.width.min(canvas.height) as f32;
    let center = canvas.center();
    (0..count)
        .map(|_| {
            let theta = rng.gen_range(0.0..TAU);
            // sqrt for uniform density over the disk
            let r = max_r * rng.gen::<f32>().sqrt();
            (center + Vec2::new(theta.cos(), theta.sin()) * r).extend(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_sphere_points_on_surface() {
        let points = fibonacci_sphere(500, 2.0);
        assert_eq!(points.len(), 500);
        for p in &points {
            assert!((p.length() - 2.0).abs() < 1e-3);
        }
        assert_eq!(points, fibonacci_sphere(500, 2.0));
    }

    #[test]
    fn test_sphere_is_balanced() {
        let points = fibonacci_sphere(1000, 1.0);
        let centroid = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        assert!(centroid.length() < 0.05, "centroid {centroid}");
    }

    #[test]
    fn test_heart_volume_bounds() {
        let points = heart_volume(10, 40, 1.0);
        assert_eq!(points.len(), 400);
        for p in points {
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0 && p.z.abs() <= 0.5);
        }
    }

    #[test]
    fn test_scatter_inside_disk() {
        let mut rng = SmallRng::seed_from_u64(3);
        let canvas = CanvasSize::new(400, 300);
        for p in scatter(200, 0.4, canvas, &mut rng) {
            assert!(p.truncate().distance(canvas.center()) <= 120.0 + 1e-3);
        }
    }
}
