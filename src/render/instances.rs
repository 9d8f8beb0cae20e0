//! Packed per-particle sprite data for GPU hosts.
//!
//! Hosts that draw with instanced quads instead of a 2D context can upload
//! [`as_bytes`] directly as an instance buffer. Instances come out in the
//! same painter's order the [`Renderer`](super::Renderer) uses.

use super::visible;
use crate::camera::Projector;
use crate::pool::ParticlePool;
use bytemuck::{Pod, Zeroable};

/// One projected particle, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Screen position in pixels.
    pub position: [f32; 2],
    /// On-screen radius in pixels.
    pub size: f32,
    /// Camera depth, 0 for flat scenes.
    pub depth: f32,
    /// Straight RGBA.
    pub color: [f32; 4],
}

/// Build instances for every drawable particle.
pub fn build(pool: &ParticlePool, projector: &Projector) -> Vec<SpriteInstance> {
    let mut order = Vec::new();
    visible(pool, projector, &mut order);
    order
        .into_iter()
        .filter_map(|(i, projected)| {
            let p = pool.get(i)?;
            Some(SpriteInstance {
                position: projected.screen.to_array(),
                size: p.size * projected.scale,
                depth: projected.depth,
                color: p.color.to_rgb().extend(p.alpha).to_array(),
            })
        })
        .collect()
}

/// View instances as raw bytes for upload.
pub fn as_bytes(instances: &[SpriteInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasSize;
    use crate::particle::Phase;
    use glam::Vec3;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }

    #[test]
    fn test_build_skips_dead() {
        let mut pool = ParticlePool::new(4, 4, 0);
        pool.spawn(Phase::Burn, Vec3::new(3.0, 4.0, 0.0), 0, |p| p.set_size(2.0));
        let dead = pool.spawn(Phase::Burn, Vec3::ZERO, 0, |_| {}).unwrap();
        pool.get_mut(dead).unwrap().kill();

        let instances = build(&pool, &Projector::flat(CanvasSize::new(10, 10)));
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].position, [3.0, 4.0]);
        assert_eq!(instances[0].size, 2.0);
        assert_eq!(as_bytes(&instances).len(), 32);
    }
}
