//! The particle record and its lifecycle phase.
//!
//! Every effect shares one record type; behavior is selected by [`Phase`]
//! and implemented by the free functions in [`crate::lifecycle`].

use crate::visuals::{Hsl, ParticleShape};
use glam::Vec3;
use std::collections::VecDeque;

/// Lifecycle phase of a particle.
///
/// `Idle` marks an unused slot that the pool may hand out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Firework shell climbing toward its apex.
    Launch,
    /// Spark flying outward from a burst.
    Explode,
    /// Projectile motion until the particle reaches the target band.
    Fall,
    /// Steering onto an assigned target point.
    Assemble,
    /// Flickering in place around the target point.
    Burn,
    /// Rising and swaying, fading with age.
    Drift,
    /// Expanding outline that fades with age.
    Ripple,
}

impl Phase {
    /// Phases that end the particle once alpha reaches zero.
    pub fn fades_out(self) -> bool {
        matches!(self, Phase::Explode | Phase::Burn | Phase::Drift | Phase::Ripple)
    }

    /// Phases that hold a target index.
    pub fn seeks_target(self) -> bool {
        matches!(self, Phase::Assemble | Phase::Burn)
    }
}

/// Bounded FIFO of recent positions.
///
/// The buffer is allocated once; pushing past the limit evicts the oldest
/// sample.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec3>,
    max_len: usize,
}

impl Trail {
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len),
            max_len,
        }
    }

    pub fn push(&mut self, point: Vec3) {
        if self.max_len == 0 {
            return;
        }
        while self.points.len() >= self.max_len {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Change the limit, dropping the oldest samples if it shrinks.
    pub fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len;
        while self.points.len() > max_len {
            self.points.pop_front();
        }
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> + '_ {
        self.points.iter()
    }
}

/// One pooled particle.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub phase: Phase,
    /// Index into the current [`TargetSet`](crate::sampler::TargetSet).
    pub target: Option<usize>,
    /// Generation of the target set `target` was assigned from.
    pub target_generation: u64,
    pub color: Hsl,
    /// Hue rotation in degrees per second.
    pub hue_drift: f32,
    pub size: f32,
    /// Size before burn oscillation.
    pub base_size: f32,
    pub alpha: f32,
    pub trail: Trail,
    pub birth_tick: u64,
    /// Seconds since spawn.
    pub age: f32,
    /// Ticks spent in the current phase.
    pub phase_ticks: u32,
    /// Seconds spent in the current phase.
    pub phase_age: f32,
    /// Per-particle offset into the turbulence function.
    pub noise_phase: f32,
    /// Lifetime in seconds for drifting particles and ripples.
    pub lifetime: f32,
    pub shape: ParticleShape,
}

impl Particle {
    /// An idle particle with room for `trail_len` trail samples.
    pub fn new(trail_len: usize) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            phase: Phase::Idle,
            target: None,
            target_generation: 0,
            color: Hsl::default(),
            hue_drift: 0.0,
            size: 0.0,
            base_size: 0.0,
            alpha: 0.0,
            trail: Trail::new(trail_len),
            birth_tick: 0,
            age: 0.0,
            phase_ticks: 0,
            phase_age: 0.0,
            noise_phase: 0.0,
            lifetime: 0.0,
            shape: ParticleShape::Circle,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Reinitialize in place for reuse. The trail keeps its allocation.
    pub fn reset(&mut self, phase: Phase, origin: Vec3, tick: u64) {
        self.position = origin;
        self.velocity = Vec3::ZERO;
        self.phase = phase;
        self.target = None;
        self.target_generation = 0;
        self.color = Hsl::default();
        self.hue_drift = 0.0;
        self.size = 1.0;
        self.base_size = 1.0;
        self.alpha = 1.0;
        self.trail.clear();
        self.birth_tick = tick;
        self.age = 0.0;
        self.phase_ticks = 0;
        self.phase_age = 0.0;
        self.noise_phase = 0.0;
        self.lifetime = 0.0;
        self.shape = ParticleShape::Circle;
    }

    /// Enter `phase`, restarting the phase clock.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_ticks = 0;
        self.phase_age = 0.0;
    }

    /// Return the slot to the pool.
    pub fn kill(&mut self) {
        self.phase = Phase::Idle;
        self.alpha = 0.0;
        self.target = None;
        self.velocity = Vec3::ZERO;
        self.trail.clear();
    }

    /// Set both `size` and `base_size`.
    pub fn set_size(&mut self, size: f32) {
        self.size = size;
        self.base_size = size;
    }

    /// Force `alpha` into `[0, 1]` and `size` to be non-negative.
    ///
    /// NaN collapses to zero, which makes the particle invisible.
    pub fn clamp_visuals(&mut self) {
        self.alpha = if self.alpha.is_nan() { 0.0 } else { self.alpha.clamp(0.0, 1.0) };
        self.size = if self.size.is_nan() { 0.0 } else { self.size.max(0.0) };
        self.base_size = if self.base_size.is_nan() { 0.0 } else { self.base_size.max(0.0) };
    }

    /// Whether the renderer should draw this particle at all.
    pub fn is_visible(&self) -> bool {
        self.is_alive() && self.alpha > 0.0 && self.size > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_evicts_oldest() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(Vec3::splat(i as f32));
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_trail_zero_len_stores_nothing() {
        let mut trail = Trail::new(0);
        trail.push(Vec3::ONE);
        assert!(trail.is_empty());
    }

    #[test]
    fn test_trail_shrink() {
        let mut trail = Trail::new(5);
        for i in 0..5 {
            trail.push(Vec3::splat(i as f32));
        }
        trail.set_max_len(2);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.iter().next().unwrap().x, 3.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut p = Particle::new(4);
        p.reset(Phase::Fall, Vec3::ONE, 0);
        p.trail.push(Vec3::ONE);
        p.target = Some(3);
        p.phase_ticks = 40;
        p.reset(Phase::Launch, Vec3::new(5.0, 6.0, 0.0), 10);
        assert_eq!(p.phase, Phase::Launch);
        assert_eq!(p.target, None);
        assert!(p.trail.is_empty());
        assert_eq!(p.trail.max_len(), 4);
        assert_eq!(p.phase_ticks, 0);
        assert_eq!(p.birth_tick, 10);
    }

    #[test]
    fn test_clamp_visuals() {
        let mut p = Particle::new(0);
        p.alpha = 1.7;
        p.size = -2.0;
        p.clamp_visuals();
        assert_eq!(p.alpha, 1.0);
        assert_eq!(p.size, 0.0);

        p.alpha = f32::NAN;
        p.clamp_visuals();
        assert_eq!(p.alpha, 0.0);
    }

    #[test]
    fn test_kill_makes_idle() {
        let mut p = Particle::new(2);
        p.reset(Phase::Burn, Vec3::ZERO, 0);
        assert!(p.is_alive());
        p.kill();
        assert!(!p.is_alive());
        assert!(!p.is_visible());
    }
}
