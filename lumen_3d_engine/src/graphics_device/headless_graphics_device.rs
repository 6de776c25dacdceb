/// Headless graphics device (no GPU required)
///
/// A complete software implementation of [`GraphicsDevice`] that keeps every
/// object in CPU memory. It validates usage the way a strict driver would
/// (stale handles, draws past the end of a buffer, uniform type mismatches)
/// and reflects active uniforms from GLSL sources, so the resource layer,
/// the content cache and the application loop can run and be tested without
/// a window or a graphics driver.
///
/// Object tables are generational slot maps: a handle that outlives its
/// object is reported as stale instead of aliasing a newer object.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DeviceStats,
    BufferHandle, BufferKind, VertexArrayHandle, VertexAttributePointer, IndexType,
    ShaderHandle, ShaderStage, ProgramHandle, UniformLocation, UniformValue,
    TextureHandle, TextureDesc, TextureInfo,
    RenderState, ClearFlags, PrimitiveTopology,
};

new_key_type! {
    struct BufferKey;
    struct VertexArrayKey;
    struct ShaderKey;
    struct ProgramKey;
    struct TextureKey;
}

pub(super) fn to_raw<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

pub(super) fn from_raw<K: From<KeyData>>(raw: u64) -> K {
    KeyData::from_ffi(raw).into()
}

/// Number of texture units exposed by the headless device
const TEXTURE_UNITS: u32 = 16;

// ===== REFLECTION TYPES =====

/// GLSL type of an active uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
    Sampler3D,
    /// Any other sampler kind (`sampler2DArray`, `isampler2D`, ...)
    Sampler,
    /// Valid GLSL type with no matching [`UniformValue`] (`mat2`, `ivec3`, ...)
    Opaque,
}

impl UniformType {
    /// Parse a GLSL type keyword
    pub fn from_glsl(keyword: &str) -> Option<Self> {
        match keyword {
            "bool" => Some(UniformType::Bool),
            "int" => Some(UniformType::Int),
            "float" => Some(UniformType::Float),
            "vec2" => Some(UniformType::Vec2),
            "vec3" => Some(UniformType::Vec3),
            "vec4" => Some(UniformType::Vec4),
            "mat3" => Some(UniformType::Mat3),
            "mat4" => Some(UniformType::Mat4),
            "sampler2D" => Some(UniformType::Sampler2D),
            "samplerCube" => Some(UniformType::SamplerCube),
            "sampler3D" => Some(UniformType::Sampler3D),
            "uint" | "double" | "mat2" | "mat2x2" | "mat2x3" | "mat2x4" | "mat3x2" | "mat3x3"
            | "mat3x4" | "mat4x2" | "mat4x3" | "mat4x4" | "ivec2" | "ivec3" | "ivec4" | "uvec2"
            | "uvec3" | "uvec4" | "bvec2" | "bvec3" | "bvec4" | "dvec2" | "dvec3" | "dvec4"
            | "dmat2" | "dmat3" | "dmat4" => Some(UniformType::Opaque),
            other if other.trim_start_matches(['i', 'u']).starts_with("sampler") => {
                Some(UniformType::Sampler)
            }
            _ => None,
        }
    }

    /// True when `value` can be uploaded to a uniform of this type
    pub fn accepts(&self, value: &UniformValue) -> bool {
        matches!(
            (self, value),
            (
                UniformType::Bool
                    | UniformType::Int
                    | UniformType::Sampler2D
                    | UniformType::SamplerCube
                    | UniformType::Sampler3D
                    | UniformType::Sampler,
                UniformValue::Int(_)
            )
                | (UniformType::Float, UniformValue::Float(_))
                | (UniformType::Vec3, UniformValue::Vec3(_))
                | (UniformType::Mat3, UniformValue::Mat3(_))
                | (UniformType::Mat4, UniformValue::Mat4(_))
        )
    }
}

/// Active uniform found in a shader stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedUniform {
    /// Fully qualified name (`light.position` for struct members)
    pub name: String,
    /// GLSL type
    pub ty: UniformType,
}

// ===== OBJECTS =====

struct HeadlessBuffer {
    kind: BufferKind,
    data: Vec<u8>,
}

#[derive(Default)]
struct HeadlessVertexArray {
    attributes: Vec<(VertexAttributePointer, BufferKey)>,
    element_buffer: Option<BufferKey>,
}

struct HeadlessShader {
    stage: ShaderStage,
    uniforms: Vec<ReflectedUniform>,
}

struct HeadlessProgram {
    uniforms: Vec<ReflectedUniform>,
    values: Vec<Option<UniformValue>>,
}

struct HeadlessTexture {
    desc: TextureDesc,
    mip_levels: u32,
}

// ===== DEVICE =====

/// Software graphics device
pub struct HeadlessGraphicsDevice {
    buffers: SlotMap<BufferKey, HeadlessBuffer>,
    vertex_arrays: SlotMap<VertexArrayKey, HeadlessVertexArray>,
    shaders: SlotMap<ShaderKey, HeadlessShader>,
    programs: SlotMap<ProgramKey, HeadlessProgram>,
    textures: SlotMap<TextureKey, HeadlessTexture>,

    bound_vertex_buffer: Option<BufferKey>,
    bound_vertex_array: Option<VertexArrayKey>,
    current_program: Option<ProgramKey>,
    texture_units: [Option<TextureKey>; TEXTURE_UNITS as usize],

    render_state: RenderState,
    clear_color: [f32; 4],
    viewport: (u32, u32),
    stats: DeviceStats,
}

impl HeadlessGraphicsDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self {
            buffers: SlotMap::with_key(),
            vertex_arrays: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            bound_vertex_buffer: None,
            bound_vertex_array: None,
            current_program: None,
            texture_units: [None; TEXTURE_UNITS as usize],
            render_state: RenderState::empty(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            viewport: (0, 0),
            stats: DeviceStats::default(),
        }
    }

    /// Last clear color set
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Last viewport set
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn buffer_key(&self, buffer: BufferHandle) -> Result<BufferKey> {
        let key: BufferKey = from_raw(buffer.0);
        if self.buffers.contains_key(key) {
            Ok(key)
        } else {
            Err(Error::InvalidResource(format!("Stale or unknown buffer handle {:?}", buffer)))
        }
    }

    fn bound_array(&mut self) -> Result<&mut HeadlessVertexArray> {
        let key = self.bound_vertex_array
            .ok_or_else(|| Error::ApplicationState("No vertex array bound".to_string()))?;
        self.vertex_arrays
            .get_mut(key)
            .ok_or_else(|| Error::InvalidResource("Bound vertex array was destroyed".to_string()))
    }

    fn check_program_in_use(&self) -> Result<ProgramKey> {
        self.current_program
            .ok_or_else(|| Error::ApplicationState("No program in use".to_string()))
    }

    /// Number of vertices every attribute of the bound array can supply
    fn bound_vertex_capacity(&self) -> Result<(VertexArrayKey, u64)> {
        let key = self.bound_vertex_array
            .ok_or_else(|| Error::ApplicationState("Draw with no vertex array bound".to_string()))?;
        let array = self.vertex_arrays
            .get(key)
            .ok_or_else(|| Error::InvalidResource("Bound vertex array was destroyed".to_string()))?;
        if array.attributes.is_empty() {
            return Err(Error::InvalidResource("Vertex array has no attribute pointers".to_string()));
        }

        let mut capacity = u64::MAX;
        for (pointer, buffer_key) in &array.attributes {
            let buffer = self.buffers
                .get(*buffer_key)
                .ok_or_else(|| Error::InvalidResource("Attribute source buffer was destroyed".to_string()))?;
            let attribute_size = (pointer.components * pointer.component_type.size_bytes()) as u64;
            let stride = if pointer.stride == 0 { attribute_size } else { pointer.stride as u64 };
            let len = buffer.data.len() as u64;
            let vertices = if len < pointer.offset as u64 + attribute_size {
                0
            } else {
                (len - pointer.offset as u64 - attribute_size) / stride + 1
            };
            capacity = capacity.min(vertices);
        }
        Ok((key, capacity))
    }
}

impl Default for HeadlessGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessGraphicsDevice {
    fn name(&self) -> &str {
        "headless"
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> Result<BufferHandle> {
        if data.is_empty() {
            return Err(Error::InvalidResource("Cannot create an empty buffer".to_string()));
        }
        let key = self.buffers.insert(HeadlessBuffer { kind, data: data.to_vec() });
        Ok(BufferHandle(to_raw(key)))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        let key: BufferKey = from_raw(buffer.0);
        if self.buffers.remove(key).is_some() && self.bound_vertex_buffer == Some(key) {
            self.bound_vertex_buffer = None;
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

        match kind {
            BufferKind::Vertex => self.bound_vertex_buffer = key,
            BufferKind::Index => self.bound_array()?.element_buffer = key,
        }
        Ok(())
    }

    fn buffer_size(&self, buffer: BufferHandle) -> Option<u64> {
        let key: BufferKey = from_raw(buffer.0);
        self.buffers.get(key).map(|b| b.data.len() as u64)
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&mut self) -> Result<VertexArrayHandle> {
        let key = self.vertex_arrays.insert(HeadlessVertexArray::default());
        Ok(VertexArrayHandle(to_raw(key)))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        let key: VertexArrayKey = from_raw(vertex_array.0);
        if self.vertex_arrays.remove(key).is_some() && self.bound_vertex_array == Some(key) {
            self.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) -> Result<()> {
        self.bound_vertex_array = match vertex_array {
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
        Ok(())
    }

    fn set_vertex_attribute(&mut self, pointer: &VertexAttributePointer) -> Result<()> {
        if !(1..=4).contains(&pointer.components) {
            return Err(Error::InvalidResource(format!(
                "Attribute {} has {} components (expected 1..=4)",
                pointer.index, pointer.components
            )));
        }
        let buffer = self.bound_vertex_buffer
            .ok_or_else(|| Error::ApplicationState("No vertex buffer bound".to_string()))?;
        let array = self.bound_array()?;
        array.attributes.retain(|(existing, _)| existing.index != pointer.index);
        array.attributes.push((*pointer, buffer));
        Ok(())
    }

    // ===== SHADERS =====

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> std::result::Result<ShaderHandle, String> {
        self.stats.shader_compiles += 1;
        let uniforms = reflect_uniforms(source)?;
        let key = self.shaders.insert(HeadlessShader { stage, uniforms });
        Ok(ShaderHandle(to_raw(key)))
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        let key: ShaderKey = from_raw(shader.0);
        self.shaders.remove(key);
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

        let mut uniforms: Vec<ReflectedUniform> = Vec::new();
        for uniform in vertex_shader.uniforms.iter().chain(fragment_shader.uniforms.iter()) {
            match uniforms.iter().find(|u| u.name == uniform.name) {
                Some(existing) if existing.ty != uniform.ty => {
                    return Err(format!(
                        "ERROR: uniform '{}' declared as {:?} and {:?} in different stages",
                        uniform.name, existing.ty, uniform.ty
                    ));
                }
                Some(_) => {}
                None => uniforms.push(uniform.clone()),
            }
        }

        let values = vec![None; uniforms.len()];
        let key = self.programs.insert(HeadlessProgram { uniforms, values });
        Ok(ProgramHandle(to_raw(key)))
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        let key: ProgramKey = from_raw(program.0);
        if self.programs.remove(key).is_some() && self.current_program == Some(key) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<()> {
        self.current_program = match program {
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
        Ok(())
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let program = self.programs.get(from_raw::<ProgramKey>(program.0))?;
        program.uniforms
            .iter()
            .position(|u| u.name == name)
            .map(|index| UniformLocation(index as i32))
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()> {
        let key = self.check_program_in_use()?;
        let program = self.programs
            .get_mut(key)
            .ok_or_else(|| Error::InvalidResource("Program in use was destroyed".to_string()))?;

        let index = usize::try_from(location.0)
            .ok()
            .filter(|index| *index < program.uniforms.len())
            .ok_or_else(|| Error::InvalidResource(format!("Invalid uniform location {}", location.0)))?;

        let uniform = &program.uniforms[index];
        if !uniform.ty.accepts(&value) {
            return Err(Error::InvalidResource(format!(
                "Uniform '{}' has type {:?}, cannot upload a {}",
                uniform.name, uniform.ty, value.type_name()
            )));
        }

        program.values[index] = Some(value);
        self.stats.uniform_uploads += 1;
        Ok(())
    }

    fn read_uniform(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let program = self.programs.get(from_raw::<ProgramKey>(program.0))?;
        let index = program.uniforms.iter().position(|u| u.name == name)?;
        program.values[index]
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Result<TextureHandle> {
        desc.validate(pixels)?;
        let key = self.textures.insert(HeadlessTexture { desc: *desc, mip_levels: 1 });
        Ok(TextureHandle(to_raw(key)))
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()> {
        let texture = self.textures
            .get_mut(from_raw::<TextureKey>(texture.0))
            .ok_or_else(|| Error::InvalidResource(format!("Stale or unknown texture handle {:?}", texture)))?;
        texture.mip_levels = texture.desc.full_mip_levels();
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        let key: TextureKey = from_raw(texture.0);
        if self.textures.remove(key).is_some() {
            for unit in self.texture_units.iter_mut() {
                if *unit == Some(key) {
                    *unit = None;
                }
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) -> Result<()> {
        if unit >= TEXTURE_UNITS {
            return Err(Error::InvalidResource(format!("Texture unit {} out of range", unit)));
        }
        let key = match texture {
            Some(handle) => {
                let key: TextureKey = from_raw(handle.0);
                if !self.textures.contains_key(key) {
                    return Err(Error::InvalidResource(format!(
                        "Stale or unknown texture handle {:?}", handle
                    )));
                }
                Some(key)
            }
            None => None,
        };
        self.texture_units[unit as usize] = key;
        Ok(())
    }

    fn texture_info(&self, texture: TextureHandle) -> Option<TextureInfo> {
        self.textures
            .get(from_raw::<TextureKey>(texture.0))
            .map(|t| TextureInfo { desc: t.desc, mip_levels: t.mip_levels })
    }

    fn max_texture_units(&self) -> u32 {
        TEXTURE_UNITS
    }

    // ===== STATE & DRAWING =====

    fn enable(&mut self, state: RenderState) {
        self.render_state |= state;
    }

    fn render_state(&self) -> RenderState {
        self.render_state
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    fn clear(&mut self, _flags: ClearFlags) {}

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn draw_arrays(&mut self, _topology: PrimitiveTopology, first: u32, count: u32) -> Result<()> {
        self.check_program_in_use()?;
        let (_, capacity) = self.bound_vertex_capacity()?;
        if first as u64 + count as u64 > capacity {
            return Err(Error::InvalidResource(format!(
                "Draw of {} vertices from {} exceeds the {} vertices available",
                count, first, capacity
            )));
        }
        self.stats.draw_calls += 1;
        self.stats.vertices_submitted += count as u64;
        Ok(())
    }

    fn draw_elements(&mut self, _topology: PrimitiveTopology, count: u32, index_type: IndexType) -> Result<()> {
        self.check_program_in_use()?;
        let (key, _) = self.bound_vertex_capacity()?;
        let element_key = self.vertex_arrays[key]
            .element_buffer
            .ok_or_else(|| Error::InvalidResource("Indexed draw with no element buffer".to_string()))?;
        let element_bytes = self.buffers
            .get(element_key)
            .map(|b| b.data.len() as u64)
            .ok_or_else(|| Error::InvalidResource("Element buffer was destroyed".to_string()))?;
        if count as u64 * index_type.size_bytes() as u64 > element_bytes {
            return Err(Error::InvalidResource(format!(
                "Indexed draw of {} indices exceeds element buffer of {} bytes",
                count, element_bytes
            )));
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

// ============================================================================
// GLSL reflection
// ============================================================================

const PRECISION_QUALIFIERS: [&str; 3] = ["lowp", "mediump", "highp"];

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut previous = '\0';
            for next in chars.by_ref() {
                if previous == '*' && next == '/' {
                    break;
                }
                if next == '\n' {
                    out.push('\n');
                }
                previous = next;
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// Drop preprocessor lines, failing on `#error`
fn preprocess(source: &str) -> std::result::Result<String, String> {
    let mut code = String::with_capacity(source.len());
    for (number, line) in strip_comments(source).lines().enumerate() {
        let trimmed = line.trim_start();
        if let Some(directive) = trimmed.strip_prefix('#') {
            let directive = directive.trim_start();
            if let Some(message) = directive.strip_prefix("error") {
                return Err(format!("ERROR: 0:{}: '#error' : {}", number + 1, message.trim()));
            }
            code.push('\n');
            continue;
        }
        code.push_str(line);
        code.push('\n');
    }
    Ok(code)
}

fn tokenize(code: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = code.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_alphanumeric() || c == '_' {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(ident);
        } else {
            tokens.push(c.to_string());
            chars.next();
        }
    }
    tokens
}

fn token_at(tokens: &[String], index: usize) -> std::result::Result<&str, String> {
    tokens
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| "ERROR: unexpected end of shader source".to_string())
}

/// Parse `name[N], name2;` declarators, returning the names
fn parse_declarators(tokens: &[String], index: &mut usize) -> std::result::Result<Vec<String>, String> {
    let mut names = Vec::new();
    loop {
        names.push(token_at(tokens, *index)?.to_string());
        *index += 1;
        if token_at(tokens, *index)? == "[" {
            while token_at(tokens, *index)? != "]" {
                *index += 1;
            }
            *index += 1;
        }
        if token_at(tokens, *index)? == "=" {
            skip_initializer(tokens, index)?;
        }
        match token_at(tokens, *index)? {
            "," => *index += 1,
            ";" => {
                *index += 1;
                return Ok(names);
            }
            other => return Err(format!("ERROR: syntax error, unexpected '{}' in declaration", other)),
        }
    }
}

/// Skip `= expr` up to the next top-level `,` or `;`
fn skip_initializer(tokens: &[String], index: &mut usize) -> std::result::Result<(), String> {
    *index += 1;
    let mut nesting = 0;
    loop {
        match token_at(tokens, *index)? {
            "(" | "[" | "{" => nesting += 1,
            ")" | "]" | "}" => nesting -= 1,
            "," | ";" if nesting == 0 => return Ok(()),
            _ => {}
        }
        *index += 1;
    }
}

/// Skip a `{ ... } instance[N];` uniform block body
fn skip_block(tokens: &[String], index: &mut usize) -> std::result::Result<(), String> {
    let mut nesting = 0;
    loop {
        match token_at(tokens, *index)? {
            "{" => nesting += 1,
            "}" => {
                nesting -= 1;
                if nesting == 0 {
                    break;
                }
            }
            _ => {}
        }
        *index += 1;
    }
    *index += 1;
    while token_at(tokens, *index)? != ";" {
        *index += 1;
    }
    *index += 1;
    Ok(())
}

/// Extract the active uniforms of a shader stage
///
/// A declared uniform is active only if the stage references it outside
/// its declaration, mirroring how drivers strip unused uniforms. Members of
/// struct uniforms are reported as `instance.member`. Uniform blocks are
/// backed by buffers rather than individual locations and are skipped.
pub(crate) fn reflect_uniforms(source: &str) -> std::result::Result<Vec<ReflectedUniform>, String> {
    let code = preprocess(source)?;
    let tokens = tokenize(&code);

    let mut structs: FxHashMap<String, Vec<(String, String)>> = FxHashMap::default();
    let mut declared: Vec<(String, String)> = Vec::new();
    let mut usage: Vec<&str> = Vec::new();
    let mut depth: i32 = 0;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();

        if depth == 0 && token == "struct" {
            let name = token_at(&tokens, i + 1)?.to_string();
            i += 2;
            if token_at(&tokens, i)? != "{" {
                return Err(format!("ERROR: syntax error, expected '{{' after struct {}", name));
            }
            i += 1;
            let mut fields = Vec::new();
            while token_at(&tokens, i)? != "}" {
                let ty = token_at(&tokens, i)?.to_string();
                i += 1;
                for field in parse_declarators(&tokens, &mut i)? {
                    fields.push((ty.clone(), field));
                }
            }
            i += 1;
            if tokens.get(i).map(String::as_str) == Some(";") {
                i += 1;
            }
            structs.insert(name, fields);
            continue;
        }

        if depth == 0 && token == "uniform" {
            i += 1;
            while PRECISION_QUALIFIERS.contains(&token_at(&tokens, i)?) {
                i += 1;
            }
            let ty = token_at(&tokens, i)?.to_string();
            i += 1;
            if token_at(&tokens, i)? == "{" {
                skip_block(&tokens, &mut i)?;
                continue;
            }
            for name in parse_declarators(&tokens, &mut i)? {
                declared.push((ty.clone(), name));
            }
            continue;
        }

        match token {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth < 0 {
                    return Err("ERROR: syntax error, unbalanced '}'".to_string());
                }
            }
            _ => {}
        }
        usage.push(token);
        i += 1;
    }

    if depth != 0 {
        return Err("ERROR: syntax error, unexpected end of file (unbalanced braces)".to_string());
    }
    if !usage.windows(3).any(|w| w == ["void", "main", "("]) {
        return Err("ERROR: 0:1: 'main' : function not defined".to_string());
    }

    let mut uniforms = Vec::new();
    for (ty, name) in &declared {
        expand_uniform(name, ty, &structs, &usage, &mut uniforms, 0)?;
    }
    Ok(uniforms)
}

fn expand_uniform(
    path: &str,
    ty: &str,
    structs: &FxHashMap<String, Vec<(String, String)>>,
    usage: &[&str],
    out: &mut Vec<ReflectedUniform>,
    nesting: u32,
) -> std::result::Result<(), String> {
    if nesting > 8 {
        return Err(format!("ERROR: struct nesting too deep at '{}'", path));
    }
    if let Some(fields) = structs.get(ty) {
        for (field_ty, field) in fields {
            expand_uniform(&format!("{}.{}", path, field), field_ty, structs, usage, out, nesting + 1)?;
        }
        return Ok(());
    }
    let uniform_type = UniformType::from_glsl(ty)
        .ok_or_else(|| format!("ERROR: '{}' : unknown uniform type", ty))?;
    if is_referenced(path, usage) {
        out.push(ReflectedUniform { name: path.to_string(), ty: uniform_type });
    }
    Ok(())
}

fn is_referenced(path: &str, usage: &[&str]) -> bool {
    let mut pattern: Vec<&str> = Vec::new();
    for (n, part) in path.split('.').enumerate() {
        if n > 0 {
            pattern.push(".");
        }
        pattern.push(part);
    }
    usage.windows(pattern.len()).any(|w| w == pattern.as_slice())
}

#[cfg(test)]
#[path = "headless_graphics_device_tests.rs"]
mod tests;
