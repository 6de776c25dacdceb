//! Vertex array: one vertex buffer plus an optional element buffer, bound
//! and drawn as a unit.
//!
//! Binding goes through [`VertexArray::bind`], which returns a
//! [`BoundVertexArray`] guard. Draw calls are issued on the guard and the
//! array is unbound when the guard is dropped, on every exit path.

use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug};
use crate::graphics_device::{BufferKind, Gpu, PrimitiveTopology, VertexArrayHandle};
use crate::resource::{ElementBuffer, VertexBuffer};

const SOURCE: &str = "lumen3d::VertexArray";

/// Drawable pairing of a vertex buffer and an optional element buffer
pub struct VertexArray {
    gpu: Gpu,
    handle: VertexArrayHandle,
    vertex_buffer: Option<VertexBuffer>,
    element_buffer: Option<ElementBuffer>,
}

impl VertexArray {
    /// Create an empty vertex array
    pub fn new(gpu: &Gpu) -> Result<Self> {
        let handle = gpu.device_mut().create_vertex_array()?;
        Ok(Self {
            gpu: gpu.clone(),
            handle,
            vertex_buffer: None,
            element_buffer: None,
        })
    }

    /// Take ownership of `buffer`, releasing the previous one if any
    pub fn set_vertex_buffer(&mut self, buffer: VertexBuffer) -> Result<()> {
        if !buffer.gpu().ptr_eq(&self.gpu) {
            engine_bail!(SOURCE, Error::InvalidResource(
                "Vertex buffer belongs to another GPU context".to_string()
            ));
        }
        if let Some(previous) = self.vertex_buffer.replace(buffer) {
            engine_debug!(SOURCE, "Vertex array {:?} released vertex buffer {:?}", self.handle, previous.handle());
        }
        Ok(())
    }

    /// Take ownership of `buffer`, releasing the previous one if any
    pub fn set_element_buffer(&mut self, buffer: ElementBuffer) -> Result<()> {
        if !buffer.gpu().ptr_eq(&self.gpu) {
            engine_bail!(SOURCE, Error::InvalidResource(
                "Element buffer belongs to another GPU context".to_string()
            ));
        }
        if let Some(previous) = self.element_buffer.replace(buffer) {
            engine_debug!(SOURCE, "Vertex array {:?} released element buffer {:?}", self.handle, previous.handle());
        }
        Ok(())
    }

    /// Give the vertex buffer back to the caller
    pub fn take_vertex_buffer(&mut self) -> Option<VertexBuffer> {
        self.vertex_buffer.take()
    }

    pub fn vertex_buffer(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn element_buffer(&self) -> Option<&ElementBuffer> {
        self.element_buffer.as_ref()
    }

    pub fn handle(&self) -> VertexArrayHandle {
        self.handle
    }

    /// Vertices in the owned buffer
    pub fn vertex_count(&self) -> u32 {
        self.vertex_buffer.as_ref().map_or(0, VertexBuffer::vertex_count)
    }

    /// Bind the array and re-establish its attribute pointers
    ///
    /// Fails if there is no vertex buffer or it has no attributes.
    pub fn bind(&self) -> Result<BoundVertexArray<'_>> {
        let vertex_buffer = match &self.vertex_buffer {
            Some(buffer) if buffer.layout().is_some() => buffer,
            Some(_) => engine_bail!(SOURCE, Error::InvalidResource(format!(
                "Vertex array {:?}: vertex buffer has no attributes", self.handle
            ))),
            None => engine_bail!(SOURCE, Error::InvalidResource(format!(
                "Vertex array {:?} has no vertex buffer", self.handle
            ))),
        };

        self.gpu.acquire_vertex_array(self.handle)?;
        let bound = BoundVertexArray { array: self };

        vertex_buffer.apply_attributes()?;
        if let Some(element_buffer) = &self.element_buffer {
            self.gpu.device_mut().bind_buffer(BufferKind::Index, Some(element_buffer.handle()))?;
        }
        Ok(bound)
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.gpu.device_mut().destroy_vertex_array(self.handle);
    }
}

impl std::fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexArray")
            .field("handle", &self.handle)
            .field("vertex_buffer", &self.vertex_buffer)
            .field("element_buffer", &self.element_buffer)
            .finish()
    }
}

// ============================================================================
// BOUND VERTEX ARRAY
// ============================================================================

/// Scope during which a vertex array is bound
///
/// Unbinds on drop.
pub struct BoundVertexArray<'a> {
    array: &'a VertexArray,
}

impl<'a> BoundVertexArray<'a> {
    /// Draw `count` vertices starting at `first`
    pub fn draw_arrays(&self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()> {
        self.array.gpu.draw_arrays(topology, first, count)
    }

    /// Draw `count` indices from the element buffer
    pub fn draw_elements(&self, topology: PrimitiveTopology, count: u32) -> Result<()> {
        let element_buffer = self.array.element_buffer.as_ref().ok_or_else(|| {
            Error::InvalidResource(format!("Vertex array {:?} has no element buffer", self.array.handle))
        })?;
        self.array.gpu.draw_elements(topology, count, element_buffer.index_type())
    }

    /// Draw the whole array: every index if indexed, every vertex otherwise
    pub fn draw(&self, topology: PrimitiveTopology) -> Result<()> {
        match &self.array.element_buffer {
            Some(element_buffer) => self.draw_elements(topology, element_buffer.count()),
            None => self.draw_arrays(topology, 0, self.array.vertex_count()),
        }
    }

    pub fn vertex_array(&self) -> &'a VertexArray {
        self.array
    }
}

impl Drop for BoundVertexArray<'_> {
    fn drop(&mut self) {
        self.array.gpu.release_vertex_array(self.array.handle);
    }
}

#[cfg(test)]
#[path = "vertex_array_tests.rs"]
mod tests;
