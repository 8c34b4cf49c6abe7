//! Per-sprite GPU instance data

use bytemuck::{Pod, Zeroable};

use super::compositor::{GlowSprite, MAX_STOPS};

/// One radial-gradient sprite as the shader sees it (must match `glow.wgsl`)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlowInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub stop_count: u32,
    /// Stop offsets in [0, 1], unused entries set to 1
    pub offsets: [f32; MAX_STOPS],
    /// Straight-alpha stop colors
    pub colors: [[f32; 4]; MAX_STOPS],
}

impl GlowInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32,
        2 => Uint32,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlowInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&GlowSprite> for GlowInstance {
    fn from(sprite: &GlowSprite) -> Self {
        let mut offsets = [1.0; MAX_STOPS];
        let mut colors = [[0.0; 4]; MAX_STOPS];
        for (i, stop) in sprite.stops().iter().enumerate() {
            offsets[i] = stop.offset.clamp(0.0, 1.0);
            colors[i] = stop.color.to_array();
        }
        Self {
            center: sprite.center.to_array(),
            radius: sprite.radius,
            stop_count: sprite.stop_count as u32,
            offsets,
            colors,
        }
    }
}
