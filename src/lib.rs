//! # Reverie - procedural particle effects for romantic occasions
//!
//! Particle text, fireworks, floating hearts, heart ripples and 3D hearts,
//! driven by a small deterministic simulation and drawn onto any 2D surface.
//!
//! Reverie owns the particles, the physics and the per-frame lifecycle; the
//! host owns the canvas, the event loop and everything around it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use reverie::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut sim = Simulation::new(EngineConfig::text_fireworks("LOVE"))?;
//!     let mut surface = RasterSurface::new(800, 600, sim.config().visuals.background);
//!
//!     for frame in 0..600 {
//!         sim.frame(&mut surface);
//!         if frame % 60 == 0 {
//!             surface.save_png(format!("frame_{frame:04}.png"))?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Target shapes
//!
//! A [`ShapeSource`] (text, a parametric heart, a sphere, a volumetric heart
//! or a scatter of sites) is sampled into a [`TargetSet`] of points. The set
//! is rebuilt only when its inputs change, for example on resize.
//!
//! ### Particles and phases
//!
//! Particles live in a fixed-capacity [`ParticlePool`] and move through
//! phases:
//!
//! ```text
//! Launch -> Explode -> Fall -> Assemble -> Burn
//!                        \-> (lost below the canvas)
//! Drift, Ripple: ambient phases for hearts and ponds
//! ```
//!
//! Each phase has a function in [`lifecycle`] that integrates its physics and
//! then evaluates the transition out of it.
//!
//! ### Scenes
//!
//! [`SceneKind`] picks the spawning policy: fireworks, a bloom onto a 3D
//! shape, floating hearts or a ripple pond. Pointer events pushed with
//! [`Simulation::push_event`] launch shells, spawn hearts and ripples, or
//! orbit the 3D camera.
//!
//! ### Drawing
//!
//! The [`render::Renderer`] draws onto anything implementing
//! [`render::Surface`]: the bundled [`RasterSurface`] writes PNGs,
//! [`RecordingSurface`] records draw calls for replay on a real canvas, and
//! [`Simulation::instances`] packs sprite data for GPU hosts.
//!
//! ## Feature Overview
//!
//! | Preset | Scene | Shape |
//! |--------|-------|-------|
//! | `text_fireworks` | Fireworks | text |
//! | `heart_fireworks` | Fireworks | heart curve |
//! | `floating_hearts` | FloatingHearts | none |
//! | `ripple_pond` | RipplePond | scatter sites |
//! | `photo_sphere` | Bloom | sphere |
//! | `heart_3d` | Bloom | volumetric heart |

pub mod camera;
pub mod config;
mod emitter;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod particle;
pub mod physics;
mod pool;
pub mod render;
pub mod sampler;
pub mod scene;
mod simulation;
mod spawn;
pub mod time;
pub mod visuals;

pub use bytemuck;
pub use camera::{Camera, Projected, Projection, Projector};
pub use config::{CanvasSize, EngineConfig, SceneKind};
pub use emitter::{Emitter, RateClock};
pub use error::{ConfigError, RenderError};
pub use glam::{Vec2, Vec3, Vec4};
pub use input::InputEvent;
pub use particle::{Particle, Phase};
pub use pool::ParticlePool;
pub use render::{RasterSurface, RecordingSurface, Surface};
pub use sampler::{ShapeSampler, ShapeSource, TargetSet};
pub use simulation::Simulation;
pub use spawn::SpawnContext;
pub use visuals::{BlendMode, Hsl, Palette, ParticleShape, TrailMode, VisualConfig};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use reverie::prelude::*;
/// ```
///
/// This imports:
/// - [`Simulation`] and [`EngineConfig`] - the runner and its settings
/// - [`RasterSurface`], [`RecordingSurface`], [`Surface`] - drawing targets
/// - [`InputEvent`] - host events
/// - [`Vec2`], [`Vec3`], [`Vec4`] - glam vector types
pub mod prelude {
    pub use crate::config::{CanvasSize, EngineConfig, SceneKind};
    pub use crate::emitter::Emitter;
    pub use crate::input::InputEvent;
    pub use crate::particle::{Particle, Phase};
    pub use crate::render::{RasterSurface, RecordingSurface, Surface};
    pub use crate::sampler::ShapeSource;
    pub use crate::simulation::Simulation;
    pub use crate::spawn::SpawnContext;
    pub use crate::time::Time;
    pub use crate::visuals::{BlendMode, Palette, ParticleShape, TrailMode, VisualConfig};
    pub use crate::{Vec2, Vec3, Vec4};
}
