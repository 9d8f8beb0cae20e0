//! Forward Euler integration helpers.
//!
//! Units are pixels per tick for 2D scenes and world units per tick for 3D
//! scenes. Screen `y` points down, so positive gravity pulls toward the
//! bottom of the canvas.

use glam::Vec3;

/// `v.y += g`.
#[inline]
pub fn apply_gravity(velocity: &mut Vec3, gravity: f32) {
    velocity.y += gravity;
}

/// Multiplicative decay, `v *= 1 - drag`.
#[inline]
pub fn apply_drag(velocity: &mut Vec3, drag: f32) {
    *velocity *= 1.0 - drag;
}

/// Clamp the speed to `max`. Non-finite velocities are zeroed.
#[inline]
pub fn clamp_speed(velocity: &mut Vec3, max: f32) {
    if !velocity.is_finite() {
        *velocity = Vec3::ZERO;
        return;
    }
    *velocity = velocity.clamp_length_max(max);
}

/// Clamp downward speed to `terminal`; upward motion is untouched.
#[inline]
pub fn clamp_fall(velocity: &mut Vec3, terminal: f32) {
    if velocity.y > terminal {
        velocity.y = terminal;
    }
}

/// Exponential approach: cover `factor` of the remaining distance.
#[inline]
pub fn steer_toward(position: Vec3, target: Vec3, factor: f32) -> Vec3 {
    position + (target - position) * factor
}

/// `position += velocity`.
#[inline]
pub fn integrate(position: &mut Vec3, velocity: Vec3) {
    *position += velocity;
}

/// Smooth deterministic noise in `[-1, 1]` per axis.
///
/// Each axis averages two incommensurate sinusoids keyed by the particle's
/// `noise_phase` and the simulation time, so neighbors flicker out of step.
pub fn turbulence(noise_phase: f32, time: f32) -> Vec3 {
    let t = time;
    let n = noise_phase;
    Vec3::new(
        0.5 * ((t * 7.3 + n).sin() + (t * 11.9 + n * 1.7).sin()),
        0.5 * ((t * 6.1 + n * 0.7).cos() + (t * 13.3 + n * 2.3).sin()),
        0.5 * ((t * 5.7 + n * 1.3).sin() + (t * 9.1 + n * 0.4).cos()),
    )
}

/// Initial upward speed that brings a projectile to rest after climbing
/// `height` under `gravity`.
pub fn launch_speed(gravity: f32, height: f32) -> f32 {
    if gravity <= 0.0 || height <= 0.0 {
        return 0.0;
    }
    (2.0 * gravity * height).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_gravity_keeps_velocity() {
        let mut v = Vec3::new(0.0, 2.0, 0.0);
        for _ in 0..100 {
            apply_gravity(&mut v, 0.0);
            clamp_fall(&mut v, 5.0);
        }
        assert_eq!(v.y, 2.0);
    }

    #[test]
    fn test_drag_decays() {
        let mut v = Vec3::new(10.0, 0.0, 0.0);
        apply_drag(&mut v, 0.1);
        assert!((v.x - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_speed() {
        let mut v = Vec3::new(30.0, 40.0, 0.0);
        clamp_speed(&mut v, 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);

        let mut bad = Vec3::new(f32::NAN, 1.0, 0.0);
        clamp_speed(&mut bad, 10.0);
        assert_eq!(bad, Vec3::ZERO);
    }

    #[test]
    fn test_clamp_fall_only_downward() {
        let mut v = Vec3::new(0.0, -20.0, 0.0);
        clamp_fall(&mut v, 5.0);
        assert_eq!(v.y, -20.0);
        v.y = 20.0;
        clamp_fall(&mut v, 5.0);
        assert_eq!(v.y, 5.0);
    }

    #[test]
    fn test_steer_converges() {
        let target = Vec3::new(100.0, 50.0, 0.0);
        let mut p = Vec3::ZERO;
        for _ in 0..200 {
            p = steer_toward(p, target, 0.08);
        }
        assert!(p.distance(target) < 0.01);
    }

    #[test]
    fn test_turbulence_bounded() {
        for i in 0..1000 {
            let n = turbulence(i as f32 * 0.37, i as f32 * 0.016);
            assert!(n.abs().max_element() <= 1.0);
        }
    }

    #[test]
    fn test_launch_speed_reaches_height() {
        let g = 0.12;
        let mut v = Vec3::new(0.0, -launch_speed(g, 300.0), 0.0);
        let mut p = Vec3::ZERO;
        while v.y < 0.0 {
            apply_gravity(&mut v, g);
            integrate(&mut p, v);
        }
        assert!((p.y + 300.0).abs() < 10.0, "apex at {}", p.y);
        assert_eq!(launch_speed(0.0, 100.0), 0.0);
    }
}
