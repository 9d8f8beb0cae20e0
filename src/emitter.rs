//! Spawn patterns for scenes and pointer interactions.
//!
//! An emitter decides where new particles appear and how fast they leave.
//! It never touches the pool directly: scenes ask it for samples and hand
//! them to [`ParticlePool::spawn`](crate::pool::ParticlePool::spawn), so
//! every spawn obeys the pool's capacity.
//!
//! # Emitter Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Emitter::Burst`] | `count` particles flying outward at once |
//! | [`Emitter::Line`] | Random point on a segment, shared velocity |
//!
//! # Example
//!
//! ```ignore
//! // Hearts rising from the bottom edge
//! let emitter = Emitter::Line {
//!     start: Vec3::new(0.0, 610.0, 0.0),
//!     end: Vec3::new(800.0, 610.0, 0.0),
//!     velocity: Vec3::new(0.0, -1.2, 0.0),
//! };
//! let mut ctx = SpawnContext::new(&mut rng);
//! let (position, velocity) = emitter.sample(&mut ctx);
//! ```

use crate::spawn::SpawnContext;
use glam::Vec3;

/// Where and how particles are emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Emitter {
    /// Outward burst, e.g. a firework or a click splash.
    ///
    /// Each sample gets a speed between 20% and 100% of `speed` so the
    /// burst fills in rather than forming a ring.
    Burst {
        position: Vec3,
        /// Number of particles in one burst.
        count: u32,
        speed: f32,
    },

    /// Random point along a segment.
    Line {
        start: Vec3,
        end: Vec3,
        velocity: Vec3,
    },
}

impl Emitter {
    /// Particles produced per trigger: `count` for bursts, one otherwise.
    pub fn count(&self) -> u32 {
        match self {
            Emitter::Burst { count, .. } => *count,
            _ => 1,
        }
    }

    /// One `(position, velocity)` sample.
    pub fn sample(&self, ctx: &mut SpawnContext) -> (Vec3, Vec3) {
        match self {
            Emitter::Burst { position, speed, .. } => {
                let dir = ctx.random_direction_2d().extend(0.0);
                let s = *speed * ctx.random_range(0.2, 1.0);
                (*position, dir * s)
            }
            Emitter::Line {
                start,
                end,
                velocity,
            } => (ctx.random_on_line(*start, *end), *velocity),
        }
    }
}

/// Turns a per-second rate into whole spawns per tick.
///
/// The fractional remainder carries into the next tick, so a rate of 1.5/s
/// at 60 ticks per second yields exactly 3 spawns every 2 seconds.
#[derive(Debug, Clone, Default)]
pub struct RateClock {
    /// Spawns per second.
    pub rate: f32,
    carry: f32,
}

impl RateClock {
    pub fn new(rate: f32) -> Self {
        Self { rate, carry: 0.0 }
    }

    /// Advance by `dt` seconds and return the spawns due.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !(self.rate > 0.0) || !(dt > 0.0) {
            return 0;
        }
        self.carry += self.rate * dt;
        let due = self.carry.floor();
        self.carry -= due;
        due as u32
    }

    pub fn reset(&mut self) {
        self.carry = 0.0;
    }
}
