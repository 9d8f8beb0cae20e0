//! Particle lifecycle state machine.
//!
//! Each [`Phase`] has a free function that first advances the particle's
//! physics and then evaluates its transition. [`step`] dispatches on the
//! phase, applies the bookkeeping shared by every phase (age, hue drift,
//! trail, visual clamping) and reports anything the scheduler must act on
//! after the particle loop.
//!
//! # Transitions
//!
//! | From | To | When |
//! |------|----|------|
//! | `Launch` | `Explode` | upward speed below `apex_velocity`, or top edge reached |
//! | `Explode` | `Fall` | speed below `settle_speed`, or `explode_max_ticks` elapsed |
//! | `Fall` | `Assemble` | inside the target band and a target is available |
//! | `Fall` | `Idle` | below the floor, or rising far above the top |
//! | `Assemble` | `Burn` | within `assemble_epsilon` of the target |
//! | `Assemble`/`Burn` | `Fall` | target no longer valid |
//! | `Burn` | `Idle` | faded out after `burn_hold` |
//! | `Drift`/`Ripple` | `Idle` | faded out or off screen |
//!
//! ```ignore
//! let ctx = StepContext::new(&config, &targets, time.delta(), time.elapsed());
//! for p in pool.active_mut().iter_mut().filter(|p| p.is_alive()) {
//!     if let Some(event) = lifecycle::step(p, &ctx, &mut rng) {
//!         events.push(event);
//!     }
//! }
//! ```

use crate::config::{Appearance, EngineConfig, PhysicsConfig, Thresholds};
use crate::particle::{Particle, Phase};
use crate::physics;
use crate::sampler::TargetSet;
use crate::spawn::SpawnContext;
use crate::visuals::Hsl;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;

/// Something a particle step asks the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleEvent {
    /// A shell reached its apex and exploded; spawn its sparks.
    Burst { origin: Vec3, color: Hsl },
}

/// Everything a phase function reads besides the particle itself.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub physics: &'a PhysicsConfig,
    pub thresholds: &'a Thresholds,
    pub appearance: &'a Appearance,
    pub targets: &'a TargetSet,
    /// Seconds covered by this tick.
    pub dt: f32,
    /// Simulation time in seconds, drives turbulence.
    pub time: f32,
    /// Top edge of the simulation space.
    pub top: f32,
    /// Falling particles below this are recycled.
    pub floor: f32,
    /// Whether burn turbulence may move particles along z.
    pub volumetric: bool,
}

impl<'a> StepContext<'a> {
    /// Context for the canvas and shape described by `config`.
    pub fn new(config: &'a EngineConfig, targets: &'a TargetSet, dt: f32, time: f32) -> Self {
        let volumetric = config.shape.is_volumetric();
        let (top, floor) = if volumetric {
            let reach = config.camera.distance * 4.0;
            (-reach, reach)
        } else {
            (
                0.0,
                config.canvas.height as f32 + config.thresholds.offscreen_margin,
            )
        };
        Self {
            physics: &config.physics,
            thresholds: &config.thresholds,
            appearance: &config.appearance,
            targets,
            dt,
            time,
            top,
            floor,
            volumetric,
        }
    }
}

/// Advance one live particle by one tick.
pub fn step(p: &mut Particle, ctx: &StepContext, rng: &mut SmallRng) -> Option<LifecycleEvent> {
    let event = match p.phase {
        Phase::Idle => return None,
        Phase::Launch => launch(p, ctx, rng),
        Phase::Explode => {
            explode(p, ctx);
            None
        }
        Phase::Fall => {
            fall(p, ctx, rng);
            None
        }
        Phase::Assemble => {
            assemble(p, ctx);
            None
        }
        Phase::Burn => {
            burn(p, ctx);
            None
        }
        Phase::Drift => {
            drift(p, ctx);
            None
        }
        Phase::Ripple => {
            ripple(p, ctx);
            None
        }
    };

    finish(p, ctx);
    event
}

/// Shared per-tick bookkeeping after the phase function ran.
fn finish(p: &mut Particle, ctx: &StepContext) {
    if !p.is_alive() {
        return;
    }

    p.age += ctx.dt;
    p.phase_age += ctx.dt;
    p.phase_ticks = p.phase_ticks.saturating_add(1);
    if p.hue_drift != 0.0 {
        p.color = p.color.shifted(p.hue_drift * ctx.dt);
    }
    if !p.position.is_finite() {
        p.kill();
        return;
    }
    p.trail.push(p.position);
    p.clamp_visuals();

    if p.phase.fades_out() && p.alpha <= 0.0 {
        p.kill();
    }
}

/// Give an exploding particle its outward velocity.
///
/// Speed is between 20% and 100% of `force` in a random screen-plane
/// direction. A zero force leaves the particle at rest.
pub fn ignite(p: &mut Particle, force: f32, spawn: &mut SpawnContext) {
    let dir = spawn.random_direction_2d();
    let speed = force * spawn.random_range(0.2, 1.0);
    p.velocity = (dir * speed).extend(0.0);
    p.set_phase(Phase::Explode);
}

// =============================================================================
// PHASES
// =============================================================================

/// Climb under gravity until the apex, then burst.
pub fn launch(p: &mut Particle, ctx: &StepContext, rng: &mut SmallRng) -> Option<LifecycleEvent> {
    physics::apply_gravity(&mut p.velocity, ctx.physics.gravity);
    physics::clamp_speed(&mut p.velocity, ctx.physics.max_speed);
    physics::integrate(&mut p.position, p.velocity);

    let at_apex = p.velocity.y > -ctx.thresholds.apex_velocity;
    if at_apex || p.position.y <= ctx.top {
        let mut spawn = SpawnContext::new(rng);
        ignite(p, ctx.physics.explosion_force, &mut spawn);
        return Some(LifecycleEvent::Burst {
            origin: p.position,
            color: p.color,
        });
    }
    None
}

/// Drag and gravity until the spark settles.
pub fn explode(p: &mut Particle, ctx: &StepContext) {
    physics::apply_drag(&mut p.velocity, ctx.physics.drag);
    physics::apply_gravity(&mut p.velocity, ctx.physics.gravity);
    physics::clamp_speed(&mut p.velocity, ctx.physics.max_speed);
    physics::integrate(&mut p.position, p.velocity);
    p.alpha *= ctx.appearance.explode_fade;

    let settled = p.velocity.length() < ctx.thresholds.settle_speed;
    let timed_out = p.phase_ticks + 1 >= ctx.thresholds.explode_max_ticks;
    if settled || timed_out {
        p.set_phase(Phase::Fall);
    }
}

/// Projectile motion until captured by the target band or lost below the
/// floor.
pub fn fall(p: &mut Particle, ctx: &StepContext, rng: &mut SmallRng) {
    physics::apply_gravity(&mut p.velocity, ctx.physics.gravity);
    p.velocity.x *= 1.0 - ctx.physics.drag;
    physics::clamp_fall(&mut p.velocity, ctx.physics.terminal_velocity);
    physics::clamp_speed(&mut p.velocity, ctx.physics.max_speed);
    physics::integrate(&mut p.position, p.velocity);

    let escaped = p.velocity.y < 0.0 && p.position.y < ctx.top - (ctx.floor - ctx.top);
    if p.position.y > ctx.floor || escaped {
        p.kill();
        return;
    }

    let t = ctx.thresholds;
    let pos = Vec2::new(p.position.x, p.position.y);
    if !ctx.targets.band_contains(pos, t.target_band, t.capture_radius) {
        return;
    }
    if let Some(i) = ctx.targets.nearby(pos.x, rng) {
        p.target = Some(i);
        p.target_generation = ctx.targets.generation();
        p.velocity = Vec3::ZERO;
        p.set_phase(Phase::Assemble);
    }
}

/// Steer onto the target and brighten.
pub fn assemble(p: &mut Particle, ctx: &StepContext) {
    let Some(target) = resolve_target(p, ctx) else {
        return;
    };

    let next = physics::steer_toward(p.position, target, ctx.physics.steer_factor);
    p.velocity = next - p.position;
    p.position = next;
    p.alpha = (p.alpha + ctx.appearance.assemble_alpha_rate).min(1.0);

    if p.position.distance(target) < ctx.thresholds.assemble_epsilon {
        p.velocity = Vec3::ZERO;
        p.set_phase(Phase::Burn);
    }
}

/// Flicker around the target.
pub fn burn(p: &mut Particle, ctx: &StepContext) {
    let Some(target) = resolve_target(p, ctx) else {
        return;
    };

    let phys = ctx.physics;
    let a = ctx.appearance;
    let amplitude = phys
        .turbulence
        .min(phys.turbulence_size_multiple * p.base_size);
    let mut offset = physics::turbulence(p.noise_phase, ctx.time) * amplitude;
    if !ctx.volumetric {
        offset.z = 0.0;
    }
    p.position = target + offset;
    p.velocity = Vec3::ZERO;

    let wave = 0.5 + 0.5 * (ctx.time * 9.0 + p.noise_phase).sin();
    let mut alpha = a.burn_alpha_min + (1.0 - a.burn_alpha_min) * wave;
    p.size = p.base_size * (1.0 + 0.2 * (ctx.time * 5.0 + p.noise_phase * 1.3).sin());

    let held = p.phase_age - a.burn_hold;
    if a.burn_hold > 0.0 && held > 0.0 {
        let decayed = held / ctx.dt.max(f32::EPSILON) * a.decay_rate;
        let fade = (1.0 - decayed).max(0.0);
        alpha *= fade;
        p.size *= fade;
        if fade <= 0.0 {
            p.kill();
            return;
        }
    }
    p.alpha = alpha;
}

/// Rise and sway, fading with age.
pub fn drift(p: &mut Particle, ctx: &StepContext) {
    let phys = ctx.physics;
    let sway = physics::turbulence(p.noise_phase, ctx.time * 0.2).x;
    p.velocity.x = (p.velocity.x + sway * phys.sway) * (1.0 - phys.drag);
    // Ease toward the steady rise speed
    p.velocity.y += (-phys.rise_speed - p.velocity.y) * 0.05;
    physics::clamp_speed(&mut p.velocity, phys.max_speed);
    physics::integrate(&mut p.position, p.velocity);

    let life = life_fraction(p);
    p.alpha = p.alpha.min(1.0 - life);

    let margin = ctx.thresholds.offscreen_margin + p.size;
    if life >= 1.0 || p.position.y < ctx.top - margin {
        p.kill();
    }
}

/// Grow the outline and fade it.
pub fn ripple(p: &mut Particle, ctx: &StepContext) {
    p.size += ctx.physics.ripple_speed;
    p.base_size = p.size;
    p.alpha = 1.0 - life_fraction(p);
    if p.alpha <= 0.0 {
        p.kill();
    }
}

/// The particle's target point, if it still refers to the current set.
///
/// A stale or missing target drops the particle back to `Fall`.
fn resolve_target(p: &mut Particle, ctx: &StepContext) -> Option<Vec3> {
    let target = p
        .target
        .filter(|_| p.target_generation == ctx.targets.generation())
        .and_then(|i| ctx.targets.get(i));
    if target.is_none() {
        p.target = None;
        p.set_phase(Phase::Fall);
    }
    target
}

/// Fraction of the particle's lifetime already used, `1.0` once expired.
fn life_fraction(p: &Particle) -> f32 {
    if p.lifetime > 0.0 {
        (p.age / p.lifetime).min(1.0)
    } else {
        1.0
    }
}
