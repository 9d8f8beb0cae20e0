//! Fixed-capacity particle pool.
//!
//! All records are allocated when the pool is built. Spawning reuses a dead
//! slot in place; when every active slot is alive the request is dropped.
//! The active limit selects a prefix of the pool, so raising or lowering the
//! particle count never reallocates.
//!
//! ```ignore
//! let mut pool = ParticlePool::new(2000, 1500, 6);
//! if let Some(i) = pool.spawn(Phase::Launch, origin, tick, |p| {
//!     p.velocity = Vec3::new(0.0, -9.0, 0.0);
//! }) {
//!     log::trace!("shell in slot {}", i);
//! }
//! ```

use crate::particle::{Particle, Phase};
use crate::sampler::TargetSet;
use glam::Vec3;

/// Pre-allocated particle storage.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    active_limit: usize,
    /// Slot after the most recent spawn; scanning starts here.
    cursor: usize,
}

impl ParticlePool {
    /// Allocate `capacity` idle particles with `active` of them usable.
    pub fn new(capacity: usize, active: usize, trail_len: usize) -> Self {
        Self {
            particles: (0..capacity).map(|_| Particle::new(trail_len)).collect(),
            active_limit: active.min(capacity),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_limit(&self) -> usize {
        self.active_limit
    }

    /// Resize the active subset, clamped to capacity.
    ///
    /// Shrinking kills every particle beyond the new limit. Returns how many
    /// live particles were killed.
    pub fn set_active_limit(&mut self, limit: usize) -> usize {
        let limit = limit.min(self.capacity());
        let mut killed = 0;
        for p in &mut self.particles[limit..] {
            if p.is_alive() {
                p.kill();
                killed += 1;
            }
        }
        if limit != self.active_limit {
            log::debug!(
                "Active particle limit {} -> {} ({} killed)",
                self.active_limit,
                limit,
                killed
            );
        }
        self.active_limit = limit;
        if self.cursor >= limit {
            self.cursor = 0;
        }
        killed
    }

    /// Reset a dead slot to `phase` at `origin`, then let `init` customize it.
    ///
    /// Returns the slot index, or `None` when every active slot is alive. A
    /// full pool is not an error; the request is simply dropped.
    pub fn spawn<F>(&mut self, phase: Phase, origin: Vec3, tick: u64, init: F) -> Option<usize>
    where
        F: FnOnce(&mut Particle),
    {
        let n = self.active_limit;
        if n == 0 {
            return None;
        }

        for offset in 0..n {
            let i = (self.cursor + offset) % n;
            let p = &mut self.particles[i];
            if p.is_alive() {
                continue;
            }
            p.reset(phase, origin, tick);
            init(p);
            p.clamp_visuals();
            self.cursor = (i + 1) % n;
            return Some(i);
        }

        log::trace!("Pool full ({} active), spawn dropped", n);
        None
    }

    /// Number of live particles.
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Number of live particles in `phase`.
    pub fn count_phase(&self, phase: Phase) -> usize {
        self.particles.iter().filter(|p| p.phase == phase).count()
    }

    /// Live particles with their slot index.
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &Particle)> + '_ {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_alive())
    }

    /// The active subset, dead slots included.
    pub fn active(&self) -> &[Particle] {
        &self.particles[..self.active_limit]
    }

    pub fn active_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.active_limit]
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn kill_all(&mut self) {
        for p in &mut self.particles {
            p.kill();
        }
        self.cursor = 0;
    }

    /// Apply a new trail length to every record.
    pub fn set_trail_length(&mut self, len: usize) {
        for p in &mut self.particles {
            p.trail.set_max_len(len);
        }
    }

    /// Re-seek every target held against an older set.
    ///
    /// Indices wrap into the new set; when the new set is empty, seeking
    /// particles drop back to `Fall`. Returns how many particles changed.
    pub fn retarget(&mut self, targets: &TargetSet) -> usize {
        let generation = targets.generation();
        let len = targets.len();
        let mut changed = 0;

        for p in &mut self.particles {
            if !p.is_alive() || p.target_generation == generation {
                continue;
            }
            match p.target {
                Some(i) if len > 0 => {
                    p.target = Some(i % len);
                    p.target_generation = generation;
                    changed += 1;
                }
                Some(_) => {
                    p.target = None;
                    if p.phase.seeks_target() {
                        p.set_phase(Phase::Fall);
                        p.velocity = Vec3::ZERO;
                    }
                    changed += 1;
                }
                None => {}
            }
        }
        changed
    }
}
