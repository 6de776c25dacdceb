/// OpenGL graphics device (glow)
///
/// Drives an OpenGL 3.3 core context through `glow`. Objects live in the
/// driver; the device keeps generational handle tables over them, so a
/// stale handle is rejected before it can reach GL as a recycled name.
/// Uploaded uniform values are mirrored on the CPU for `read_uniform`.
///
/// Every call assumes the context that created the device is current on
/// this thread. `WinitSurface` creates the context and keeps it current.

use glow::HasContext;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::engine_info;
use crate::error::{Error, Result};
use crate::graphics_device::headless_graphics_device::{from_raw, to_raw};
use crate::graphics_device::{
    GraphicsDevice, DeviceStats,
    BufferHandle, BufferKind, VertexArrayHandle, VertexAttributePointer, ComponentType, IndexType,
    ShaderHandle, ShaderStage, ProgramHandle, UniformLocation, UniformValue,
    TextureHandle, TextureDesc, TextureInfo, TextureFormat, TextureWrap, TextureFilter,
    RenderState, ClearFlags, PrimitiveTopology,
};

const SOURCE: &str = "lumen3d::GlGraphicsDevice";

new_key_type! {
    struct BufferKey;
    struct VertexArrayKey;
    struct ShaderKey;
    struct ProgramKey;
    struct TextureKey;
}

// ===== GL ENUMS =====

pub(crate) fn gl_shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

pub(crate) fn gl_topology(topology: PrimitiveTopology) -> u32 {
    match topology {
        PrimitiveTopology::Triangles => glow::TRIANGLES,
        PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveTopology::Lines => glow::LINES,
        PrimitiveTopology::Points => glow::POINTS,
    }
}

pub(crate) fn gl_index_type(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::U16 => glow::UNSIGNED_SHORT,
        IndexType::U32 => glow::UNSIGNED_INT,
    }
}

pub(crate) fn gl_wrap(wrap: TextureWrap) -> i32 {
    (match wrap {
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        TextureWrap::ClampToBorder => glow::CLAMP_TO_BORDER,
    }) as i32
}

pub(crate) fn gl_filter(filter: TextureFilter) -> i32 {
    (match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        TextureFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        TextureFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

/// Internal format and pixel format for 8-bit data
pub(crate) fn gl_texture_format(format: TextureFormat) -> (u32, u32) {
    match format {
        TextureFormat::R8 => (glow::R8, glow::RED),
        TextureFormat::RG8 => (glow::RG8, glow::RG),
        TextureFormat::RGB8 => (glow::RGB8, glow::RGB),
        TextureFormat::RGBA8 => (glow::RGBA8, glow::RGBA),
    }
}

pub(crate) fn gl_clear_mask(flags: ClearFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= glow::STENCIL_BUFFER_BIT;
    }
    mask
}

// ===== OBJECTS =====

struct GlBuffer {
    kind: BufferKind,
    buffer: glow::Buffer,
    size: u64,
}

struct GlVertexArray {
    array: glow::VertexArray,
    element_buffer: Option<BufferKey>,
}

struct GlShader {
    stage: ShaderStage,
    shader: glow::Shader,
}

struct GlProgram {
    program: glow::Program,
    values: FxHashMap<i32, UniformValue>,
}

struct GlTexture {
    texture: glow::Texture,
    desc: TextureDesc,
    mip_levels: u32,
}

// ===== DEVICE =====

/// Hardware graphics device over a current OpenGL context
pub struct GlGraphicsDevice {
    gl: glow::Context,

    buffers: SlotMap<BufferKey, GlBuffer>,
    vertex_arrays: SlotMap<VertexArrayKey, GlVertexArray>,
    shaders: SlotMap<ShaderKey, GlShader>,
    programs: SlotMap<ProgramKey, GlProgram>,
    textures: SlotMap<TextureKey, GlTexture>,

    bound_vertex_buffer: Option<BufferKey>,
    bound_vertex_array: Option<VertexArrayKey>,
    current_program: Option<ProgramKey>,
    texture_units: Vec<Option<TextureKey>>,

    render_state: RenderState,
    stats: DeviceStats,
}

impl GlGraphicsDevice {
    /// Wrap a loaded context; it must be current on the calling thread
    pub fn new(gl: glow::Context) -> Self {
        let units = unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS)
        };
        let units = units.max(1) as usize;

        unsafe {
            engine_info!(SOURCE, "OpenGL {} on {} ({} texture units)",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER),
                units);
        }

        Self {
            gl,
            buffers: SlotMap::with_key(),
            vertex_arrays: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            bound_vertex_buffer: None,
            bound_vertex_array: None,
            current_program: None,
            texture_units: vec![None; units],
            render_state: RenderState::empty(),
            stats: DeviceStats::default(),
        }
    }

    fn buffer_key(&self, buffer: BufferHandle) -> Result<BufferKey> {
        let key: BufferKey = from_raw(buffer.0);
        if self.buffers.contains_key(key) {
            Ok(key)
        } else {
            Err(Error::InvalidResource(format!("Stale or unknown buffer handle {:?}", buffer)))
        }
    }

    fn texture_key(&self, texture: TextureHandle) -> Result<TextureKey> {
        let key: TextureKey = from_raw(texture.0);
        if self.textures.contains_key(key) {
            Ok(key)
        } else {
            Err(Error::InvalidResource(format!("Stale or unknown texture handle {:?}", texture)))
        }
    }

    fn check_program_in_use(&self) -> Result<ProgramKey> {
        self.current_program
            .ok_or_else(|| Error::ApplicationState("No program in use".to_string()))
    }

    fn check_vertex_array_bound(&self) -> Result<VertexArrayKey> {
        self.bound_vertex_array
            .ok_or_else(|| Error::ApplicationState("Draw with no vertex array bound".to_string()))
    }

    /// Run `upload` with `texture` bound on unit 0, then restore the unit
    fn with_texture_on_unit_zero(&self, texture: glow::Texture, upload: impl FnOnce(&glow::Context)) {
        let previous = self.texture_units[0]
            .and_then(|key| self.textures.get(key))
            .map(|t| t.texture);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            upload(&self.gl);
            self.gl.bind_texture(glow::TEXTURE_2D, previous);
        }
    }

    /// Last GL error raised by the previous call, as an engine error
    fn take_gl_error(&self, action: impl FnOnce() -> String) -> Result<()> {
        let code = unsafe { self.gl.get_error() };
        if code == glow::NO_ERROR {
            Ok(())
        } else {
            Err(Error::BackendError(format!("{} failed with GL error 0x{:04X}", action(), code)))
        }
    }
}

impl GraphicsDevice for GlGraphicsDevice {
    fn name(&self) -> &str {
        "opengl"
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BufferHandle> {
        if data.is_empty() {
            return Err(Error::InvalidResource("Cannot create an empty buffer".to_string()));
        }
        // Uploads go through ARRAY_BUFFER so the element binding of a bound
        // vertex array is never replaced
        let restore = self.bound_vertex_buffer
            .and_then(|key| self.buffers.get(key))
            .map(|b| b.buffer);
        let buffer = unsafe {
            let buffer = self.gl.create_buffer().map_err(Error::BackendError)?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, restore);
            buffer
        };
        let key = self.buffers.insert(GlBuffer { kind, buffer, size: data.len() as u64 });
        Ok(BufferHandle(to_raw(key)))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        let key: BufferKey = from_raw(buffer.0);
        if let Some(removed) = self.buffers.remove(key) {
            unsafe { self.gl.delete_buffer(removed.buffer) };
            if self.bound_vertex_buffer == Some(key) {
                self.bound_vertex_buffer = None;
            }
        }
    }

    fn bind_buffer(&mut self, kind: BufferKind, buffer: Option<BufferHandle>) -> Result<()> {
        let key = match buffer {
            Some(handle) => {
                let key = self.buffer_key(handle)?;
                if self.buffers[key].kind != kind {
                    return Err(Error::InvalidResource(format!(
                        "Buffer {:?} is a {:?} buffer, cannot bind as {:?}",
                        handle, self.buffers[key].kind, kind
                    )));
                }
                Some(key)
            }
            None => None,
        };
        let raw = key.map(|key| self.buffers[key].buffer);

        match kind {
            BufferKind::Vertex => {
                unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, raw) };
                self.bound_vertex_buffer = key;
            }
            BufferKind::Index => {
                let array_key = self.bound_vertex_array
                    .ok_or_else(|| Error::ApplicationState("No vertex array bound".to_string()))?;
                unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, raw) };
                if let Some(array) = self.vertex_arrays.get_mut(array_key) {
                    array.element_buffer = key;
                }
            }
        }
        Ok(())
    }

    fn buffer_size(&self, buffer: BufferHandle) -> Option<u64> {
        self.buffers.get(from_raw::<BufferKey>(buffer.0)).map(|b| b.size)
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle> {
        let array = unsafe { self.gl.create_vertex_array() }.map_err(Error::BackendError)?;
        let key = self.vertex_arrays.insert(GlVertexArray { array, element_buffer: None });
        Ok(VertexArrayHandle(to_raw(key)))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        let key: VertexArrayKey = from_raw(vertex_array.0);
        if let Some(removed) = self.vertex_arrays.remove(key) {
            unsafe { self.gl.delete_vertex_array(removed.array) };
            if self.bound_vertex_array == Some(key) {
                self.bound_vertex_array = None;
            }
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()> {
        let key = match vertex_array {
            Some(handle) => {
                let key: VertexArrayKey = from_raw(handle.0);
                if !self.vertex_arrays.contains_key(key) {
                    return Err(Error::InvalidResource(format!(
                        "Stale or unknown vertex array handle {:?}", handle
                    )));
                }
                Some(key)
            }
            None => None,
        };
        let raw = key.map(|key| self.vertex_arrays[key].array);
        unsafe { self.gl.bind_vertex_array(raw) };
        self.bound_vertex_array = key;
        Ok(())
    }

    fn set_vertex_attribute(&mut self, pointer: &VertexAttributePointer) -> Result<()> {
        if !(1..=4).contains(&pointer.components) {
            return Err(Error::InvalidResource(format!(
                "Attribute {} has {} components (expected 1..=4)",
                pointer.index, pointer.components
            )));
        }
        if self.bound_vertex_buffer.is_none() {
            return Err(Error::ApplicationState("No vertex buffer bound".to_string()));
        }
        if self.bound_vertex_array.is_none() {
            return Err(Error::ApplicationState("No vertex array bound".to_string()));
        }

        let (size, stride, offset) = (pointer.components as i32, pointer.stride as i32, pointer.offset as i32);
        unsafe {
            match pointer.component_type {
                ComponentType::Float => {
                    self.gl.vertex_attrib_pointer_f32(pointer.index, size, glow::FLOAT, false, stride, offset)
                }
                ComponentType::Int => {
                    self.gl.vertex_attrib_pointer_i32(pointer.index, size, glow::INT, stride, offset)
                }
                ComponentType::UnsignedInt => {
                    self.gl.vertex_attrib_pointer_i32(pointer.index, size, glow::UNSIGNED_INT, stride, offset)
                }
            }
            self.gl.enable_vertex_attrib_array(pointer.index);
        }
        self.take_gl_error(|| format!("Attribute {} setup", pointer.index))
    }

    // ===== SHADERS =====

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> std::result::Result<ShaderHandle, String> {
        self.stats.shader_compiles += 1;
        let shader = unsafe {
            let shader = self.gl.create_shader(gl_shader_stage(stage))?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(log);
            }
            shader
        };
        let key = self.shaders.insert(GlShader { stage, shader });
        Ok(ShaderHandle(to_raw(key)))
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        if let Some(removed) = self.shaders.remove(from_raw::<ShaderKey>(shader.0)) {
            unsafe { self.gl.delete_shader(removed.shader) };
        }
    }

    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> std::result::Result<ProgramHandle, String> {
        self.stats.program_links += 1;

        let vertex_shader = self.shaders
            .get(from_raw::<ShaderKey>(vertex.0))
            .ok_or_else(|| "ERROR: vertex stage handle is not a compiled shader".to_string())?;
        let fragment_shader = self.shaders
            .get(from_raw::<ShaderKey>(fragment.0))
            .ok_or_else(|| "ERROR: fragment stage handle is not a compiled shader".to_string())?;

        if vertex_shader.stage != ShaderStage::Vertex {
            return Err(format!("ERROR: expected a vertex stage, got a {} stage", vertex_shader.stage));
        }
        if fragment_shader.stage != ShaderStage::Fragment {
            return Err(format!("ERROR: expected a fragment stage, got a {} stage", fragment_shader.stage));
        }

        let program = unsafe {
            let program = self.gl.create_program()?;
            self.gl.attach_shader(program, vertex_shader.shader);
            self.gl.attach_shader(program, fragment_shader.shader);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vertex_shader.shader);
            self.gl.detach_shader(program, fragment_shader.shader);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(log);
            }
            program
        };
        let key = self.programs.insert(GlProgram { program, values: FxHashMap::default() });
        Ok(ProgramHandle(to_raw(key)))
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        let key: ProgramKey = from_raw(program.0);
        if let Some(removed) = self.programs.remove(key) {
            unsafe { self.gl.delete_program(removed.program) };
            if self.current_program == Some(key) {
                self.current_program = None;
            }
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()> {
        let key = match program {
            Some(handle) => {
                let key: ProgramKey = from_raw(handle.0);
                if !self.programs.contains_key(key) {
                    return Err(Error::InvalidResource(format!(
                        "Stale or unknown program handle {:?}", handle
                    )));
                }
                Some(key)
            }
            None => None,
        };
        let raw = key.map(|key| self.programs[key].program);
        unsafe { self.gl.use_program(raw) };
        self.current_program = key;
        Ok(())
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let program = self.programs.get(from_raw::<ProgramKey>(program.0))?;
        let location = unsafe { self.gl.get_uniform_location(program.program, name) }?;
        i32::try_from(location.0).ok().map(UniformLocation)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()> {
        let key = self.check_program_in_use()?;
        let raw = u32::try_from(location.0)
            .map(glow::NativeUniformLocation)
            .map_err(|_| Error::InvalidResource(format!("Invalid uniform location {}", location.0)))?;

        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(Some(&raw), v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(Some(&raw), v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(Some(&raw), v.x, v.y, v.z),
                UniformValue::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(Some(&raw), false, &m.to_cols_array()),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(Some(&raw), false, &m.to_cols_array()),
            }
        }
        self.take_gl_error(|| format!("Upload of a {} to uniform location {}", value.type_name(), location.0))?;

        if let Some(program) = self.programs.get_mut(key) {
            program.values.insert(location.0, value);
        }
        self.stats.uniform_uploads += 1;
        Ok(())
    }

    fn read_uniform(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let location = self.uniform_location(program, name)?;
        let program = self.programs.get(from_raw::<ProgramKey>(program.0))?;
        program.values.get(&location.0).copied()
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<TextureHandle> {
        desc.validate(pixels)?;

        let texture = unsafe { self.gl.create_texture() }.map_err(Error::BackendError)?;
        let (internal_format, format) = gl_texture_format(desc.format);
        self.with_texture_on_unit_zero(texture, |gl| unsafe {
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, gl_wrap(desc.params.wrap_s));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, gl_wrap(desc.params.wrap_t));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, gl_filter(desc.params.min_filter));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, gl_filter(desc.params.mag_filter));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format as i32,
                desc.width as i32,
                desc.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            );
        });
        if let Err(err) = self.take_gl_error(|| format!("{}x{} {:?} texture upload", desc.width, desc.height, desc.format)) {
            unsafe { self.gl.delete_texture(texture) };
            return Err(err);
        }

        let key = self.textures.insert(GlTexture { texture, desc: *desc, mip_levels: 1 });
        Ok(TextureHandle(to_raw(key)))
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()> {
        let key = self.texture_key(texture)?;
        let raw = self.textures[key].texture;
        self.with_texture_on_unit_zero(raw, |gl| unsafe { gl.generate_mipmap(glow::TEXTURE_2D) });
        let entry = &mut self.textures[key];
        entry.mip_levels = entry.desc.full_mip_levels();
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        let key: TextureKey = from_raw(texture.0);
        if let Some(removed) = self.textures.remove(key) {
            unsafe { self.gl.delete_texture(removed.texture) };
            for unit in self.texture_units.iter_mut() {
                if *unit == Some(key) {
                    *unit = None;
                }
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) -> Result<()> {
        if unit as usize >= self.texture_units.len() {
            return Err(Error::InvalidResource(format!("Texture unit {} out of range", unit)));
        }
        let key = texture.map(|handle| self.texture_key(handle)).transpose()?;
        let raw = key.map(|key| self.textures[key].texture);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, raw);
        }
        self.texture_units[unit as usize] = key;
        Ok(())
    }

    fn texture_info(&self, texture: TextureHandle) -> Option<TextureInfo> {
        self.textures
            .get(from_raw::<TextureKey>(texture.0))
            .map(|t| TextureInfo { desc: t.desc, mip_levels: t.mip_levels })
    }

    fn max_texture_units(&self) -> u32 {
        self.texture_units.len() as u32
    }

    // ===== STATE & DRAWING =====

    fn enable(&mut self, state: RenderState) {
        unsafe {
            if state.contains(RenderState::DEPTH_TEST) {
                self.gl.enable(glow::DEPTH_TEST);
            }
            if state.contains(RenderState::CULL_FACE) {
                self.gl.enable(glow::CULL_FACE);
            }
            if state.contains(RenderState::BLEND) {
                self.gl.enable(glow::BLEND);
                self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            }
        }
        self.render_state |= state;
    }

    fn render_state(&self) -> RenderState {
        self.render_state
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        unsafe { self.gl.clear_color(color[0], color[1], color[2], color[3]) };
    }

    fn clear(&mut self, flags: ClearFlags) {
        unsafe { self.gl.clear(gl_clear_mask(flags)) };
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, width as i32, height as i32) };
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()> {
        self.check_program_in_use()?;
        self.check_vertex_array_bound()?;
        unsafe { self.gl.draw_arrays(gl_topology(topology), first as i32, count as i32) };
        self.stats.draw_calls += 1;
        self.stats.vertices_submitted += count as u64;
        Ok(())
    }

    fn draw_elements(&mut self, topology: PrimitiveTopology, count: u32, index_type: IndexType) -> Result<()> {
        self.check_program_in_use()?;
        let key = self.check_vertex_array_bound()?;
        let element_key = self.vertex_arrays
            .get(key)
            .and_then(|array| array.element_buffer)
            .ok_or_else(|| Error::InvalidResource("Indexed draw with no element buffer".to_string()))?;
        let element_bytes = self.buffers
            .get(element_key)
            .map(|b| b.size)
            .ok_or_else(|| Error::InvalidResource("Element buffer was destroyed".to_string()))?;
        if count as u64 * index_type.size_bytes() as u64 > element_bytes {
            return Err(Error::InvalidResource(format!(
                "Indexed draw of {} indices exceeds element buffer of {} bytes",
                count, element_bytes
            )));
        }
        unsafe {
            self.gl.draw_elements(gl_topology(topology), count as i32, gl_index_type(index_type), 0);
        }
        self.stats.draw_calls += 1;
        self.stats.vertices_submitted += count as u64;
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            live_buffers: self.buffers.len() as u32,
            live_vertex_arrays: self.vertex_arrays.len() as u32,
            live_shaders: self.shaders.len() as u32,
            live_programs: self.programs.len() as u32,
            live_textures: self.textures.len() as u32,
            ..self.stats
        }
    }
}

#[cfg(test)]
#[path = "gl_graphics_device_tests.rs"]
mod tests;
