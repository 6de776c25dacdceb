/// GraphicsDevice trait - raw immediate-mode GPU interface

use crate::error::Result;
use crate::graphics_device::{
    BufferHandle, BufferKind, VertexArrayHandle, VertexAttributePointer, IndexType,
    ShaderHandle, ShaderStage, ProgramHandle, UniformLocation, UniformValue,
    TextureHandle, TextureDesc, TextureInfo,
    RenderState, ClearFlags, PrimitiveTopology,
};

/// Device statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Draw calls issued since creation
    pub draw_calls: u64,
    /// Vertices (or indices) submitted since creation
    pub vertices_submitted: u64,
    /// Shader stages compiled since creation (failed compiles included)
    pub shader_compiles: u64,
    /// Programs linked since creation (failed links included)
    pub program_links: u64,
    /// Uniform uploads since creation
    pub uniform_uploads: u64,
    /// Live buffers
    pub live_buffers: u32,
    /// Live vertex arrays
    pub live_vertex_arrays: u32,
    /// Live shader stages
    pub live_shaders: u32,
    /// Live programs
    pub live_programs: u32,
    /// Live textures
    pub live_textures: u32,
}

impl DeviceStats {
    /// Total number of live GPU objects
    pub fn live_objects(&self) -> u32 {
        self.live_buffers
            + self.live_vertex_arrays
            + self.live_shaders
            + self.live_programs
            + self.live_textures
    }
}

/// Raw GPU device
///
/// This is the backend seam: one implementation per graphics API.
/// Operations mirror an immediate-mode API with a single implicit binding
/// context; callers never use this trait directly for binding, they go
/// through [`Gpu`](crate::graphics_device::Gpu), which tracks bind state.
///
/// Destroy operations ignore unknown handles.
pub trait GraphicsDevice {
    /// Human-readable backend name
    fn name(&self) -> &str;

    // ===== BUFFERS =====

    /// Create a buffer and upload `data` into it
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BufferHandle>;

    /// Destroy a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Bind (or unbind with `None`) a buffer to its target
    fn bind_buffer(&mut self, kind: BufferKind, buffer: Option<BufferHandle>) -> Result<()>;

    /// Size in bytes of a live buffer
    fn buffer_size(&self, buffer: BufferHandle) -> Option<u64>;

    // ===== VERTEX ARRAYS =====

    /// Create an empty vertex array
    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle>;

    /// Destroy a vertex array
    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Bind (or unbind with `None`) a vertex array
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()>;

    /// Record an attribute pointer into the bound vertex array, sourcing the
    /// bound vertex buffer
    fn set_vertex_attribute(&mut self, pointer: &VertexAttributePointer) -> Result<()>;

    // ===== SHADERS =====

    /// Compile one shader stage. On failure returns the compiler diagnostics.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> std::result::Result<ShaderHandle, String>;

    /// Destroy a compiled stage
    fn destroy_shader(&mut self, shader: ShaderHandle);

    /// Link two compiled stages. On failure returns the linker diagnostics.
    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> std::result::Result<ProgramHandle, String>;

    /// Destroy a program
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Make a program current (or none)
    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()>;

    /// Resolve an active uniform by name
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Upload a value to a uniform of the current program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()>;

    /// Read back the last value uploaded to a uniform
    fn read_uniform(&self, program: ProgramHandle, name: &str) -> Option<UniformValue>;

    // ===== TEXTURES =====

    /// Create a 2D texture and upload level 0
    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<TextureHandle>;

    /// Generate the full mipmap chain of a texture
    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()>;

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Bind (or clear with `None`) a texture on a numbered unit
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) -> Result<()>;

    /// Description of a live texture
    fn texture_info(&self, texture: TextureHandle) -> Option<TextureInfo>;

    /// Number of texture units
    fn max_texture_units(&self) -> u32;

    // ===== STATE & DRAWING =====

    /// Enable fixed-function capabilities
    fn enable(&mut self, state: RenderState);

    /// Currently enabled capabilities
    fn render_state(&self) -> RenderState;

    /// Set the color used by `clear`
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Clear framebuffer planes
    fn clear(&mut self, flags: ClearFlags);

    /// Set the viewport size
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draw `count` vertices of the bound vertex array starting at `first`
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()>;

    /// Draw `count` indices from the bound element buffer
    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, index_type: IndexType) -> Result<()>;

    /// Get statistics about the device
    fn stats(&self) -> DeviceStats;
}
