//! A surface that records draw calls instead of executing them.
//!
//! Useful for asserting renderer behavior in tests, and for hosts that want
//! to replay a frame onto a real canvas context.

use super::{DrawState, Path, Surface};
use crate::visuals::BlendMode;
use glam::{Vec2, Vec3, Vec4};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    SetGlobalAlpha(f32),
    SetBlendMode(BlendMode),
    Clear(Vec3),
    FillRect { min: Vec2, max: Vec2, color: Vec4 },
    FillCircle { center: Vec2, radius: f32, color: Vec4 },
    FillRadialGradient { center: Vec2, radius: f32, inner: Vec4, outer: Vec4 },
    FillPath { path: Path, color: Vec4 },
    StrokePath { path: Path, width: f32, color: Vec4 },
}

impl DrawOp {
    /// Whether this op puts pixels on the surface.
    pub fn is_draw(&self) -> bool {
        !matches!(
            self,
            DrawOp::Save | DrawOp::Restore | DrawOp::SetGlobalAlpha(_) | DrawOp::SetBlendMode(_)
        )
    }
}

/// Records every [`Surface`] call in order.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    state: DrawState,
    stack: Vec<DrawState>,
    max_depth: usize,
    unbalanced: bool,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            state: DrawState::default(),
            stack: Vec::new(),
            max_depth: 0,
            unbalanced: false,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Take the recorded ops, leaving the log empty.
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    /// Forget all recorded ops and state.
    pub fn clear_log(&mut self) {
        self.ops.clear();
        self.stack.clear();
        self.state = DrawState::default();
        self.max_depth = 0;
        self.unbalanced = false;
    }

    /// Current save depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Deepest save nesting seen.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Every save had a matching restore and no restore underflowed.
    pub fn is_balanced(&self) -> bool {
        self.stack.is_empty() && !self.unbalanced
    }

    /// Current global alpha as the surface would apply it.
    pub fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    /// Number of ops that put pixels on the surface.
    pub fn draw_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_draw()).count()
    }

    pub fn count(&self, predicate: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.max_depth = self.max_depth.max(self.stack.len());
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => self.unbalanced = true,
        }
        self.ops.push(DrawOp::Restore);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
        self.ops.push(DrawOp::SetGlobalAlpha(alpha));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
        self.ops.push(DrawOp::SetBlendMode(mode));
    }

    fn clear(&mut self, color: Vec3) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Vec4) {
        self.ops.push(DrawOp::FillRect { min, max, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        self.ops.push(DrawOp::FillCircle { center, radius, color });
    }

    fn fill_radial_gradient(&mut self, center: Vec2, radius: f32, inner: Vec4, outer: Vec4) {
        self.ops.push(DrawOp::FillRadialGradient {
            center,
            radius,
            inner,
            outer,
        });
    }

    fn fill_path(&mut self, path: &Path, color: Vec4) {
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &Path, width: f32, color: Vec4) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            width,
            color,
        });
    }
}
