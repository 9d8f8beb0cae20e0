//! Orbit camera and screen projection.
//!
//! 2D scenes use [`Projection::Flat`]: simulation space is already canvas
//! pixels. 3D scenes use [`Projection::Perspective`], which transforms a
//! world point into camera space (offset by the orbit target, yaw about Y,
//! then pitch about X) and divides by depth.
//!
//! Points at or behind the camera plane, and any non-finite input, project to
//! [`Projected::INVALID`]. Callers must check [`Projected::is_valid`] before
//! drawing.

use crate::config::{CameraConfig, CanvasSize};
use glam::{Vec2, Vec3};

/// Camera-space depth at or below which a point is treated as behind the
/// camera.
pub const NEAR_EPSILON: f32 = 1e-3;

/// Pitch is kept short of straight up or down.
const PITCH_LIMIT: f32 = 1.5;

/// Orbit camera for viewing 3D shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl Camera {
    /// Create a new camera with default positioning.
    pub fn new() -> Self {
        Self::from_config(&CameraConfig::default())
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: config.distance,
            target: Vec3::ZERO,
        }
    }

    /// Rotate the orbit by `delta` radians (x = yaw, y = pitch).
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw = (self.yaw + delta.x).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Transform a world point into camera space.
    ///
    /// The returned `z` already includes the orbit distance, so points in
    /// front of the camera have positive depth.
    pub fn to_camera_space(&self, point: Vec3) -> Vec3 {
        let p = point - self.target;

        let (sy, cy) = self.yaw.sin_cos();
        let x = p.x * cy - p.z * sy;
        let z = p.x * sy + p.z * cy;

        let (sp, cp) = self.pitch.sin_cos();
        let y = p.y * cp - z * sp;
        let z = p.y * sp + z * cp;

        Vec3::new(x, y, z + self.distance)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// How simulation space maps to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Identity: simulation space is canvas pixels.
    #[default]
    Flat,
    /// Orbit camera with perspective divide.
    Perspective,
}

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Position on the canvas in pixels.
    pub screen: Vec2,
    /// Camera-space depth; `-1` marks an invalid projection.
    pub depth: f32,
    /// Multiplier for on-screen size.
    pub scale: f32,
}

impl Projected {
    /// Sentinel for points that must not be drawn.
    pub const INVALID: Projected = Projected {
        screen: Vec2::ZERO,
        depth: -1.0,
        scale: 0.0,
    };

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.depth >= 0.0
    }
}

/// Maps simulation-space points to the canvas.
#[derive(Debug, Clone)]
pub struct Projector {
    pub camera: Camera,
    projection: Projection,
    focal_length: f32,
    center: Vec2,
    focal: f32,
}

impl Projector {
    pub fn new(projection: Projection, camera: Camera, canvas: CanvasSize, focal_length: f32) -> Self {
        let mut projector = Self {
            camera,
            projection,
            focal_length,
            center: Vec2::ZERO,
            focal: 0.0,
        };
        projector.resize(canvas);
        projector
    }

    /// Identity projection for 2D scenes.
    pub fn flat(canvas: CanvasSize) -> Self {
        Self::new(Projection::Flat, Camera::new(), canvas, 1.0)
    }

    pub fn from_config(config: &CameraConfig, canvas: CanvasSize) -> Self {
        let projection = if config.perspective {
            Projection::Perspective
        } else {
            Projection::Flat
        };
        Self::new(projection, Camera::from_config(config), canvas, config.focal_length)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn is_perspective(&self) -> bool {
        self.projection == Projection::Perspective
    }

    /// Recalibrate the screen centre and focal scale for a new canvas.
    pub fn resize(&mut self, canvas: CanvasSize) {
        self.center = canvas.center();
        self.focal = self.focal_length * canvas.width.min(canvas.height) as f32;
    }

    /// Project a simulation-space point.
    pub fn project(&self, point: Vec3) -> Projected {
        if !point.is_finite() {
            return Projected::INVALID;
        }

        match self.projection {
            Projection::Flat => Projected {
                screen: point.truncate(),
                depth: 0.0,
                scale: 1.0,
            },
            Projection::Perspective => {
                let c = self.camera.to_camera_space(point);
                if !(c.z > NEAR_EPSILON) {
                    return Projected::INVALID;
                }
                let inv = 1.0 / c.z;
                let screen = self.center + Vec2::new(c.x, c.y) * self.focal * inv;
                let scale = self.camera.distance * inv;
                if !screen.is_finite() || !scale.is_finite() {
                    return Projected::INVALID;
                }
                Projected {
                    screen,
                    depth: c.z,
                    scale,
                }
            }
        }
    }
}
