/// Tests for HeadlessGraphicsDevice
///
/// Covers object lifetime, vertex array capture semantics, draw validation
/// and GLSL uniform reflection.

use super::*;
use crate::graphics_device::{ComponentType, TextureFormat, TextureFilter, TextureParams};
use crate::test_support::{VERTEX_SRC, FRAGMENT_SRC};
use glam::{Mat4, Vec3};

// ============================================================================
// Helper Functions
// ============================================================================

fn float_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn position_pointer(stride: u32) -> VertexAttributePointer {
    VertexAttributePointer {
        index: 0,
        components: 3,
        component_type: ComponentType::Float,
        stride,
        offset: 0,
    }
}

/// Vertex array with `vertices` tightly packed vec3 positions
fn setup_triangle_array(device: &mut HeadlessGraphicsDevice, vertices: usize) -> (BufferHandle, VertexArrayHandle) {
    let buffer = device
        .create_buffer(BufferKind::Vertex, &float_bytes(&vec![0.5; vertices * 3]))
        .unwrap();
    let array = device.create_vertex_array().unwrap();
    device.bind_vertex_array(Some(array)).unwrap();
    device.bind_buffer(BufferKind::Vertex, Some(buffer)).unwrap();
    device.set_vertex_attribute(&position_pointer(12)).unwrap();
    (buffer, array)
}

fn link_test_program(device: &mut HeadlessGraphicsDevice) -> ProgramHandle {
    let vs = device.compile_shader(ShaderStage::Vertex, VERTEX_SRC).unwrap();
    let fs = device.compile_shader(ShaderStage::Fragment, FRAGMENT_SRC).unwrap();
    device.link_program(vs, fs).unwrap()
}

fn rgba_desc(width: u32, height: u32) -> TextureDesc {
    TextureDesc {
        width,
        height,
        format: TextureFormat::RGBA8,
        params: TextureParams::default(),
    }
}

// ============================================================================
// Buffers & Vertex Arrays
// ============================================================================

#[test]
fn test_create_and_destroy_buffer() {
    let mut device = HeadlessGraphicsDevice::new();
    let buffer = device.create_buffer(BufferKind::Vertex, &[1, 2, 3, 4]).unwrap();

    assert_eq!(device.buffer_size(buffer), Some(4));
    assert_eq!(device.stats().live_buffers, 1);

    device.destroy_buffer(buffer);
    assert_eq!(device.buffer_size(buffer), None);
    assert_eq!(device.stats().live_buffers, 0);
}

#[test]
fn test_empty_buffer_rejected() {
    let mut device = HeadlessGraphicsDevice::new();
    assert!(device.create_buffer(BufferKind::Vertex, &[]).is_err());
}

#[test]
fn test_stale_buffer_handle_does_not_alias() {
    let mut device = HeadlessGraphicsDevice::new();
    let first = device.create_buffer(BufferKind::Vertex, &[0; 8]).unwrap();
    device.destroy_buffer(first);
    let second = device.create_buffer(BufferKind::Vertex, &[0; 16]).unwrap();

    assert_ne!(first, second);
    assert!(device.bind_buffer(BufferKind::Vertex, Some(first)).is_err());
    assert_eq!(device.buffer_size(second), Some(16));
}

#[test]
fn test_bind_buffer_kind_mismatch() {
    let mut device = HeadlessGraphicsDevice::new();
    let buffer = device.create_buffer(BufferKind::Vertex, &[0; 8]).unwrap();
    let result = device.bind_buffer(BufferKind::Index, Some(buffer));
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_index_bind_requires_vertex_array() {
    let mut device = HeadlessGraphicsDevice::new();
    let indices = device.create_buffer(BufferKind::Index, &[0; 6]).unwrap();
    let result = device.bind_buffer(BufferKind::Index, Some(indices));
    assert!(matches!(result, Err(Error::ApplicationState(_))));
}

#[test]
fn test_attribute_requires_bound_vertex_buffer() {
    let mut device = HeadlessGraphicsDevice::new();
    let array = device.create_vertex_array().unwrap();
    device.bind_vertex_array(Some(array)).unwrap();
    let result = device.set_vertex_attribute(&position_pointer(12));
    assert!(matches!(result, Err(Error::ApplicationState(_))));
}

#[test]
fn test_attribute_component_count_validated() {
    let mut device = HeadlessGraphicsDevice::new();
    let (_, _) = setup_triangle_array(&mut device, 3);
    let mut pointer = position_pointer(12);
    pointer.components = 5;
    assert!(device.set_vertex_attribute(&pointer).is_err());
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_draw_arrays_counts_vertices() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    setup_triangle_array(&mut device, 36);
    device.use_program(Some(program)).unwrap();

    device.draw_arrays(PrimitiveTopology::Triangles, 0, 36).unwrap();

    let stats = device.stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.vertices_submitted, 36);
}

#[test]
fn test_draw_arrays_past_end_rejected() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    setup_triangle_array(&mut device, 3);
    device.use_program(Some(program)).unwrap();

    assert!(device.draw_arrays(PrimitiveTopology::Triangles, 0, 4).is_err());
    assert!(device.draw_arrays(PrimitiveTopology::Triangles, 1, 3).is_err());
    assert_eq!(device.stats().draw_calls, 0);
}

#[test]
fn test_draw_without_program_rejected() {
    let mut device = HeadlessGraphicsDevice::new();
    setup_triangle_array(&mut device, 3);
    let result = device.draw_arrays(PrimitiveTopology::Triangles, 0, 3);
    assert!(matches!(result, Err(Error::ApplicationState(_))));
}

#[test]
fn test_draw_respects_interleaved_stride() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);

    // 4 vertices of (vec3 position, vec2 uv) = 20 bytes each
    let buffer = device.create_buffer(BufferKind::Vertex, &float_bytes(&[0.0; 20])).unwrap();
    let array = device.create_vertex_array().unwrap();
    device.bind_vertex_array(Some(array)).unwrap();
    device.bind_buffer(BufferKind::Vertex, Some(buffer)).unwrap();
    device.set_vertex_attribute(&position_pointer(20)).unwrap();
    device.set_vertex_attribute(&VertexAttributePointer {
        index: 1,
        components: 2,
        component_type: ComponentType::Float,
        stride: 20,
        offset: 12,
    }).unwrap();
    device.use_program(Some(program)).unwrap();

    assert!(device.draw_arrays(PrimitiveTopology::Triangles, 0, 4).is_ok());
    assert!(device.draw_arrays(PrimitiveTopology::Triangles, 0, 5).is_err());
}

#[test]
fn test_draw_elements_uses_vertex_array_element_buffer() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    let (_, array) = setup_triangle_array(&mut device, 4);

    let indices: Vec<u8> = [0u16, 1, 2, 2, 3, 0].iter().flat_map(|i| i.to_ne_bytes()).collect();
    let element_buffer = device.create_buffer(BufferKind::Index, &indices).unwrap();
    device.bind_buffer(BufferKind::Index, Some(element_buffer)).unwrap();

    // Rebinding the array restores its element buffer
    device.bind_vertex_array(None).unwrap();
    device.bind_vertex_array(Some(array)).unwrap();
    device.use_program(Some(program)).unwrap();

    device.draw_elements(PrimitiveTopology::Triangles, 6, IndexType::U16).unwrap();
    assert!(device.draw_elements(PrimitiveTopology::Triangles, 6, IndexType::U32).is_err());
    assert_eq!(device.stats().vertices_submitted, 6);
}

#[test]
fn test_draw_elements_without_element_buffer() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    setup_triangle_array(&mut device, 3);
    device.use_program(Some(program)).unwrap();
    assert!(device.draw_elements(PrimitiveTopology::Triangles, 3, IndexType::U16).is_err());
}

#[test]
fn test_destroyed_source_buffer_invalidates_draw() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    let (buffer, _) = setup_triangle_array(&mut device, 3);
    device.use_program(Some(program)).unwrap();
    device.destroy_buffer(buffer);
    assert!(device.draw_arrays(PrimitiveTopology::Triangles, 0, 3).is_err());
}

// ============================================================================
// Shaders & Uniforms
// ============================================================================

#[test]
fn test_link_reflects_active_uniforms() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);

    for name in ["model", "view", "projection", "normal", "light.position", "light.diffuse",
                 "shininess", "useTexture", "boxTexture"] {
        assert!(device.uniform_location(program, name).is_some(), "missing uniform {}", name);
    }
    assert!(device.uniform_location(program, "unusedTint").is_none());
    assert!(device.uniform_location(program, "light").is_none());
    assert!(device.uniform_location(program, "doesNotExist").is_none());
}

#[test]
fn test_compile_counts_failures() {
    let mut device = HeadlessGraphicsDevice::new();
    assert!(device.compile_shader(ShaderStage::Vertex, "void notMain() {}").is_err());
    assert_eq!(device.stats().shader_compiles, 1);
    assert_eq!(device.stats().live_shaders, 0);
}

#[test]
fn test_compile_error_directive() {
    let mut device = HeadlessGraphicsDevice::new();
    let source = "#version 330 core\n#error broken on purpose\nvoid main() {}\n";
    let log = device.compile_shader(ShaderStage::Fragment, source).unwrap_err();
    assert!(log.contains("broken on purpose"));
    assert!(log.contains("0:2"));
}

#[test]
fn test_compile_unbalanced_braces() {
    let mut device = HeadlessGraphicsDevice::new();
    assert!(device.compile_shader(ShaderStage::Vertex, "void main() { {").is_err());
    assert!(device.compile_shader(ShaderStage::Vertex, "void main() { } }").is_err());
}

#[test]
fn test_link_rejects_swapped_stages() {
    let mut device = HeadlessGraphicsDevice::new();
    let vs = device.compile_shader(ShaderStage::Vertex, VERTEX_SRC).unwrap();
    let fs = device.compile_shader(ShaderStage::Fragment, FRAGMENT_SRC).unwrap();
    assert!(device.link_program(fs, vs).is_err());
    assert_eq!(device.stats().program_links, 1);
}

#[test]
fn test_link_rejects_conflicting_uniform_types() {
    let mut device = HeadlessGraphicsDevice::new();
    let vs = device
        .compile_shader(ShaderStage::Vertex, "uniform float tint; void main() { gl_Position = vec4(tint); }")
        .unwrap();
    let fs = device
        .compile_shader(ShaderStage::Fragment, "uniform vec3 tint; out vec4 c; void main() { c = vec4(tint, 1.0); }")
        .unwrap();
    let log = device.link_program(vs, fs).unwrap_err();
    assert!(log.contains("tint"));
}

#[test]
fn test_set_uniform_type_checked() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    device.use_program(Some(program)).unwrap();

    let model = device.uniform_location(program, "model").unwrap();
    let sampler = device.uniform_location(program, "boxTexture").unwrap();

    device.set_uniform(model, UniformValue::Mat4(Mat4::IDENTITY)).unwrap();
    device.set_uniform(sampler, UniformValue::Int(1)).unwrap();
    assert!(device.set_uniform(model, UniformValue::Float(1.0)).is_err());
    assert!(device.set_uniform(UniformLocation(-1), UniformValue::Int(0)).is_err());

    assert_eq!(device.read_uniform(program, "model"), Some(UniformValue::Mat4(Mat4::IDENTITY)));
    assert_eq!(device.read_uniform(program, "boxTexture"), Some(UniformValue::Int(1)));
    assert_eq!(device.read_uniform(program, "view"), None);
    assert_eq!(device.stats().uniform_uploads, 2);
}

#[test]
fn test_set_uniform_requires_program_in_use() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    let location = device.uniform_location(program, "light.diffuse").unwrap();
    let result = device.set_uniform(location, UniformValue::Vec3(Vec3::ONE));
    assert!(matches!(result, Err(Error::ApplicationState(_))));
}

#[test]
fn test_destroy_program_in_use_clears_current() {
    let mut device = HeadlessGraphicsDevice::new();
    let program = link_test_program(&mut device);
    device.use_program(Some(program)).unwrap();
    device.destroy_program(program);
    assert!(device.use_program(Some(program)).is_err());
    assert_eq!(device.stats().live_programs, 0);
}

// ============================================================================
// Textures
// ============================================================================

#[test]
fn test_texture_data_size_validated() {
    let mut device = HeadlessGraphicsDevice::new();
    assert!(device.create_texture(&rgba_desc(2, 2), &[0; 15]).is_err());
    assert!(device.create_texture(&rgba_desc(0, 2), &[]).is_err());
    assert!(device.create_texture(&rgba_desc(2, 2), &[0; 16]).is_ok());
}

#[test]
fn test_texture_mipmap_chain() {
    let mut device = HeadlessGraphicsDevice::new();
    let texture = device.create_texture(&rgba_desc(256, 64), &vec![0; 256 * 64 * 4]).unwrap();
    assert_eq!(device.texture_info(texture).unwrap().mip_levels, 1);

    device.generate_mipmaps(texture).unwrap();
    assert_eq!(device.texture_info(texture).unwrap().mip_levels, 9);
}

#[test]
fn test_texture_rejects_mipmap_mag_filter() {
    let mut device = HeadlessGraphicsDevice::new();
    let mut desc = rgba_desc(1, 1);
    desc.params.mag_filter = TextureFilter::LinearMipmapLinear;
    assert!(device.create_texture(&desc, &[0; 4]).is_err());
}

#[test]
fn test_texture_unit_range() {
    let mut device = HeadlessGraphicsDevice::new();
    let texture = device.create_texture(&rgba_desc(1, 1), &[0; 4]).unwrap();
    assert!(device.bind_texture(15, Some(texture)).is_ok());
    assert!(device.bind_texture(16, Some(texture)).is_err());

    device.destroy_texture(texture);
    assert!(device.bind_texture(0, Some(texture)).is_err());
    assert_eq!(device.stats().live_textures, 0);
}

// ============================================================================
// Reflection
// ============================================================================

#[test]
fn test_reflect_ignores_comments() {
    let source = "
        // uniform float commented;
        /* uniform float blockCommented; */
        uniform float used;
        void main() { gl_Position = vec4(used); /* commented */ }
    ";
    let uniforms = reflect_uniforms(source).unwrap();
    assert_eq!(uniforms, vec![ReflectedUniform { name: "used".to_string(), ty: UniformType::Float }]);
}

#[test]
fn test_reflect_struct_members_individually() {
    let source = "
        struct Material { sampler2D texture_diffuse1; float shininess; };
        uniform Material material;
        out vec4 c;
        void main() { c = texture(material.texture_diffuse1, vec2(0.0)); }
    ";
    let uniforms = reflect_uniforms(source).unwrap();
    assert_eq!(uniforms.len(), 1);
    assert_eq!(uniforms[0].name, "material.texture_diffuse1");
    assert_eq!(uniforms[0].ty, UniformType::Sampler2D);
}

#[test]
fn test_reflect_multiple_declarators_and_precision() {
    let source = "
        uniform highp vec3 a, b;
        void main() { gl_Position = vec4(a + b, 1.0); }
    ";
    let names: Vec<String> = reflect_uniforms(source).unwrap().into_iter().map(|u| u.name).collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_reflect_unknown_type() {
    assert!(reflect_uniforms("uniform Foo foo; void main() { foo; }").is_err());
}

#[test]
fn test_reflect_skips_initializers() {
    let source = "
        uniform float gain = 1.0;
        uniform vec3 tint = vec3(1.0, 0.5, 0.25), offset;
        out vec4 c;
        void main() { c = vec4(tint * gain + offset, 1.0); }
    ";
    let uniforms = reflect_uniforms(source).unwrap();
    assert_eq!(
        uniforms,
        vec![
            ReflectedUniform { name: "gain".to_string(), ty: UniformType::Float },
            ReflectedUniform { name: "tint".to_string(), ty: UniformType::Vec3 },
            ReflectedUniform { name: "offset".to_string(), ty: UniformType::Vec3 },
        ]
    );
}

#[test]
fn test_reflect_builtin_types_outside_value_set() {
    let source = "
        uniform samplerCube skybox;
        uniform sampler3D volume;
        uniform isampler2D ids;
        uniform mat2 rotation;
        uniform ivec3 cells;
        out vec4 c;
        void main() {
            c = texture(skybox, vec3(0.0)) + texture(volume, vec3(0.0));
            c.xy += rotation * vec2(cells.xy) + vec2(texture(ids, vec2(0.0)).x);
        }
    ";
    let uniforms = reflect_uniforms(source).unwrap();
    let types: Vec<UniformType> = uniforms.iter().map(|u| u.ty).collect();
    assert_eq!(
        types,
        vec![
            UniformType::SamplerCube,
            UniformType::Sampler3D,
            UniformType::Sampler,
            UniformType::Opaque,
            UniformType::Opaque,
        ]
    );
}

#[test]
fn test_reflect_skips_uniform_blocks() {
    let source = "
        layout(std140) uniform Matrices {
            mat4 projection;
            mat4 view;
        } matrices;
        uniform mat4 model;
        in vec3 aPos;
        void main() { gl_Position = matrices.projection * matrices.view * model * vec4(aPos, 1.0); }
    ";
    let uniforms = reflect_uniforms(source).unwrap();
    assert_eq!(uniforms, vec![ReflectedUniform { name: "model".to_string(), ty: UniformType::Mat4 }]);
}

#[test]
fn test_reflect_skips_anonymous_uniform_block() {
    let source = "
        layout(std140) uniform Lights { vec3 lightPos; };
        out vec4 c;
        void main() { c = vec4(lightPos, 1.0); }
    ";
    assert!(reflect_uniforms(source).unwrap().is_empty());
}

#[test]
fn test_uniform_type_accepts() {
    assert!(UniformType::Sampler2D.accepts(&UniformValue::Int(0)));
    assert!(UniformType::Bool.accepts(&UniformValue::Int(1)));
    assert!(!UniformType::Vec3.accepts(&UniformValue::Float(0.0)));
    assert!(!UniformType::Vec2.accepts(&UniformValue::Vec3(Vec3::ZERO)));
    assert!(UniformType::SamplerCube.accepts(&UniformValue::Int(3)));
    assert!(!UniformType::Opaque.accepts(&UniformValue::Int(0)));
}
