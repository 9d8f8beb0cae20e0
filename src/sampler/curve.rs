//! Parametric curve sampling.

use crate::config::CanvasSize;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Width of the raw heart curve in curve units (`x` spans `[-16, 16]`).
const HEART_WIDTH: f32 = 32.0;
/// Vertical midpoint of the raw heart curve (`y` spans about `[-12, 17]`).
const HEART_MID_Y: f32 = 2.5;

/// The classic heart curve in curve units, `y` pointing down.
///
/// `x = 16 sin³ t`, `y = −(13 cos t − 5 cos 2t − 2 cos 3t − cos 4t)`.
#[inline]
pub fn heart_point(t: f32) -> Vec2 {
    let s = t.sin();
    Vec2::new(
        16.0 * s * s * s,
        -(13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos()),
    )
}

/// Sample `samples` evenly spaced points of the heart curve, scaled so the
/// heart is `scale * min(width, height)` wide and centred on the canvas.
pub fn heart(samples: u32, scale: f32, canvas: CanvasSize) -> Vec<Vec3> {
    if samples == 0 || canvas.is_empty() || !(scale > 0.0) {
        return Vec::new();
    }

    let size = canvas.width.min(canvas.height) as f32;
    let k = scale.min(1.0) * size / HEART_WIDTH;
    let center = canvas.center() - Vec2::new(0.0, HEART_MID_Y * k);

    (0..samples)
        .map(|i| {
            let t = TAU * i as f32 / samples as f32;
            (center + heart_point(t) * k).extend(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_point_landmarks() {
        // t = 0 is the top notch, t = PI the bottom tip
        let notch = heart_point(0.0);
        assert!(notch.x.abs() < 1e-4);
        assert!((notch.y + 5.0).abs() < 1e-4);
        let tip = heart_point(std::f32::consts::PI);
        assert!((tip.y - 17.0).abs() < 1e-3);
    }

    #[test]
    fn test_heart_fits_canvas() {
        let canvas = CanvasSize::new(800, 600);
        let points = heart(720, 0.9, canvas);
        assert_eq!(points.len(), 720);
        for p in points {
            assert!(p.x > 0.0 && p.x < 800.0, "{p}");
            assert!(p.y > 0.0 && p.y < 600.0, "{p}");
        }
    }

    #[test]
    fn test_heart_degenerate() {
        assert!(heart(0, 0.5, CanvasSize::new(800, 600)).is_empty());
        assert!(heart(100, 0.5, CanvasSize::new(0, 600)).is_empty());
        assert!(heart(100, f32::NAN, CanvasSize::new(800, 600)).is_empty());
    }
}
