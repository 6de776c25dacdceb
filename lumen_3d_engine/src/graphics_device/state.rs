/// Fixed-function render state, clear flags and primitive topology

use bitflags::bitflags;

bitflags! {
    /// Fixed-function capabilities toggled with `GraphicsDevice::enable`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderState: u32 {
        const DEPTH_TEST = 1 << 0;
        const CULL_FACE  = 1 << 1;
        const BLEND      = 1 << 2;
    }
}

bitflags! {
    /// Framebuffer planes cleared by `GraphicsDevice::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u32 {
        const COLOR   = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Triangle list
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Line list
    Lines,
    /// Point list
    Points,
}

impl PrimitiveTopology {
    /// Number of primitives formed by `vertex_count` vertices
    pub fn primitive_count(&self, vertex_count: u32) -> u32 {
        match self {
            PrimitiveTopology::Triangles => vertex_count / 3,
            PrimitiveTopology::TriangleStrip => vertex_count.saturating_sub(2),
            PrimitiveTopology::Lines => vertex_count / 2,
            PrimitiveTopology::Points => vertex_count,
        }
    }
}
