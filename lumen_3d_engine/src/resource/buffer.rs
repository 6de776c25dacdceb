//! Vertex and element buffers.
//!
//! A `VertexBuffer` owns an immutable block of vertex data and, once set,
//! the attribute layout describing it. The layout can be assigned exactly
//! once and only before the buffer is first bound through a vertex array.

use std::cell::Cell;
use bytemuck::Pod;

use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug};
use crate::graphics_device::{misuse, BufferHandle, BufferKind, Gpu, IndexType};
use crate::resource::{AttributeDescriptor, VertexLayout};

const SOURCE: &str = "lumen3d::VertexBuffer";

// ============================================================================
// VERTEX BUFFER
// ============================================================================

/// GPU vertex buffer with an optional attribute layout
pub struct VertexBuffer {
    gpu: Gpu,
    handle: BufferHandle,
    size_bytes: u64,
    layout: Option<VertexLayout>,
    bound_once: Cell<bool>,
}

impl VertexBuffer {
    /// Upload raw vertex bytes
    pub fn new(gpu: &Gpu, data: &[u8]) -> Result<Self> {
        let handle = gpu.device_mut().create_buffer(BufferKind::Vertex, data)?;
        engine_debug!(SOURCE, "Created vertex buffer {:?} ({} bytes)", handle, data.len());
        Ok(Self {
            gpu: gpu.clone(),
            handle,
            size_bytes: data.len() as u64,
            layout: None,
            bound_once: Cell::new(false),
        })
    }

    /// Upload a slice of plain-old-data vertices
    pub fn from_slice<T: Pod>(gpu: &Gpu, vertices: &[T]) -> Result<Self> {
        Self::new(gpu, bytemuck::cast_slice(vertices))
    }

    /// Assign the interleaved attribute layout
    ///
    /// Fails if a layout is already set, if the buffer has already been
    /// bound, or if the buffer size is not a whole number of vertices.
    pub fn set_attributes(&mut self, descriptors: Vec<AttributeDescriptor>) -> Result<()> {
        if self.bound_once.get() {
            return Err(misuse(format!(
                "Attributes set on vertex buffer {:?} after it was bound", self.handle
            )));
        }
        if self.layout.is_some() {
            return Err(misuse(format!(
                "Attributes set twice on vertex buffer {:?}", self.handle
            )));
        }

        let layout = VertexLayout::new(descriptors)?;
        if self.size_bytes % layout.stride() as u64 != 0 {
            engine_bail!(SOURCE, Error::InvalidResource(format!(
                "Vertex buffer {:?} holds {} bytes, not a multiple of the {}-byte stride",
                self.handle, self.size_bytes, layout.stride()
            )));
        }

        self.layout = Some(layout);
        Ok(())
    }

    /// Record this buffer's attribute pointers into the bound vertex array
    pub(crate) fn apply_attributes(&self) -> Result<()> {
        let layout = self.layout.as_ref().ok_or_else(|| Error::InvalidResource(format!(
            "Vertex buffer {:?} has no attributes and cannot be bound for drawing", self.handle
        )))?;

        let mut device = self.gpu.device_mut();
        device.bind_buffer(BufferKind::Vertex, Some(self.handle))?;
        for pointer in layout.pointers() {
            device.set_vertex_attribute(&pointer)?;
        }
        device.bind_buffer(BufferKind::Vertex, None)?;
        self.bound_once.set(true);
        Ok(())
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Attribute layout, if set
    pub fn layout(&self) -> Option<&VertexLayout> {
        self.layout.as_ref()
    }

    /// Bytes per vertex (0 until attributes are set)
    pub fn stride(&self) -> u32 {
        self.layout.as_ref().map_or(0, VertexLayout::stride)
    }

    /// Number of whole vertices (0 until attributes are set)
    pub fn vertex_count(&self) -> u32 {
        match self.stride() {
            0 => 0,
            stride => (self.size_bytes / stride as u64) as u32,
        }
    }

    /// True once the buffer has been bound through a vertex array
    pub fn has_been_bound(&self) -> bool {
        self.bound_once.get()
    }

    pub(crate) fn gpu(&self) -> &Gpu {
        &self.gpu
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.gpu.device_mut().destroy_buffer(self.handle);
    }
}

impl std::fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("handle", &self.handle)
            .field("size_bytes", &self.size_bytes)
            .field("layout", &self.layout)
            .finish()
    }
}

// ============================================================================
// ELEMENT BUFFER
// ============================================================================

/// GPU index buffer
pub struct ElementBuffer {
    gpu: Gpu,
    handle: BufferHandle,
    index_type: IndexType,
    count: u32,
}

impl ElementBuffer {
    /// Upload 32-bit indices
    pub fn from_u32(gpu: &Gpu, indices: &[u32]) -> Result<Self> {
        Self::create(gpu, bytemuck::cast_slice(indices), IndexType::U32, indices.len())
    }

    /// Upload 16-bit indices
    pub fn from_u16(gpu: &Gpu, indices: &[u16]) -> Result<Self> {
        Self::create(gpu, bytemuck::cast_slice(indices), IndexType::U16, indices.len())
    }

    fn create(gpu: &Gpu, bytes: &[u8], index_type: IndexType, count: usize) -> Result<Self> {
        let handle = gpu.device_mut().create_buffer(BufferKind::Index, bytes)?;
        Ok(Self {
            gpu: gpu.clone(),
            handle,
            index_type,
            count: count as u32,
        })
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Number of indices
    pub fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn gpu(&self) -> &Gpu {
        &self.gpu
    }
}

impl Drop for ElementBuffer {
    fn drop(&mut self) {
        self.gpu.device_mut().destroy_buffer(self.handle);
    }
}

impl std::fmt::Debug for ElementBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementBuffer")
            .field("handle", &self.handle)
            .field("index_type", &self.index_type)
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
