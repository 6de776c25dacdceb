/// Tests for Gpu bind-state tracking
///
/// Conflicting binds are programming errors: in debug builds (which is how
/// tests run) they panic, hence the `should_panic` tests.

use super::*;
use crate::graphics_device::{
    BufferKind, ComponentType, ShaderStage, TextureDesc, TextureFormat, TextureParams,
    VertexAttributePointer,
};
use crate::test_support::{headless_gpu, VERTEX_SRC, FRAGMENT_SRC};

// ============================================================================
// Helper Functions
// ============================================================================

fn create_program(gpu: &Gpu) -> ProgramHandle {
    let mut device = gpu.device_mut();
    let vs = device.compile_shader(ShaderStage::Vertex, VERTEX_SRC).unwrap();
    let fs = device.compile_shader(ShaderStage::Fragment, FRAGMENT_SRC).unwrap();
    device.link_program(vs, fs).unwrap()
}

fn create_texture(gpu: &Gpu) -> TextureHandle {
    let desc = TextureDesc {
        width: 1,
        height: 1,
        format: TextureFormat::RGBA8,
        params: TextureParams::default(),
    };
    gpu.device_mut().create_texture(&desc, &[255; 4]).unwrap()
}

/// Vertex array holding one triangle, left unbound
fn create_triangle(gpu: &Gpu) -> VertexArrayHandle {
    let bytes: Vec<u8> = [0.0f32; 9].iter().flat_map(|v| v.to_ne_bytes()).collect();
    let mut device = gpu.device_mut();
    let buffer = device.create_buffer(BufferKind::Vertex, &bytes).unwrap();
    let array = device.create_vertex_array().unwrap();
    device.bind_vertex_array(Some(array)).unwrap();
    device.bind_buffer(BufferKind::Vertex, Some(buffer)).unwrap();
    device.set_vertex_attribute(&VertexAttributePointer {
        index: 0,
        components: 3,
        component_type: ComponentType::Float,
        stride: 12,
        offset: 0,
    }).unwrap();
    device.bind_vertex_array(None).unwrap();
    array
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_clones_share_device() {
    let gpu = headless_gpu();
    let other = gpu.clone();
    let unrelated = headless_gpu();

    assert!(gpu.ptr_eq(&other));
    assert!(!gpu.ptr_eq(&unrelated));
    assert_eq!(gpu.device().name(), "headless");
}

#[test]
fn test_enable_depth_test() {
    let gpu = headless_gpu();
    gpu.enable(RenderState::DEPTH_TEST);
    assert!(gpu.device().render_state().contains(RenderState::DEPTH_TEST));
}

#[test]
fn test_fresh_context_has_no_bindings() {
    let gpu = headless_gpu();
    assert!(!gpu.has_bindings());
    assert!(gpu.end_frame().is_ok());
}

// ============================================================================
// Program
// ============================================================================

#[test]
fn test_acquire_release_program() {
    let gpu = headless_gpu();
    let program = create_program(&gpu);

    gpu.acquire_program(program).unwrap();
    assert_eq!(gpu.active_program(), Some(program));
    assert!(gpu.has_bindings());

    gpu.release_program(program);
    assert_eq!(gpu.active_program(), None);
    assert!(gpu.end_frame().is_ok());
}

#[test]
#[should_panic(expected = "still in use")]
fn test_nested_program_use_panics_in_debug() {
    let gpu = headless_gpu();
    let first = create_program(&gpu);
    let second = create_program(&gpu);

    gpu.acquire_program(first).unwrap();
    let _ = gpu.acquire_program(second);
}

#[test]
#[should_panic(expected = "Stale bindings")]
fn test_end_frame_with_program_in_use_panics_in_debug() {
    let gpu = headless_gpu();
    let program = create_program(&gpu);
    gpu.acquire_program(program).unwrap();
    let _ = gpu.end_frame();
}

#[test]
fn test_end_frame_releases_leaked_bindings() {
    let gpu = headless_gpu();
    let program = create_program(&gpu);
    let array = create_triangle(&gpu);
    gpu.acquire_program(program).unwrap();
    gpu.acquire_vertex_array(array).unwrap();

    // Debug builds panic after the release, release builds return the error
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| gpu.end_frame()));
    assert!(!matches!(result, Ok(Ok(()))));

    assert!(!gpu.has_bindings());
    assert!(gpu.end_frame().is_ok());
    // The device agrees: binding again does not conflict and a draw
    // without a program is rejected by the device itself
    assert!(gpu.device_mut().draw_arrays(PrimitiveTopology::Triangles, 0, 3).is_err());
    gpu.acquire_program(program).unwrap();
    gpu.release_program(program);
}

#[test]
fn test_acquire_stale_program_fails_without_binding() {
    let gpu = headless_gpu();
    let program = create_program(&gpu);
    gpu.device_mut().destroy_program(program);

    assert!(gpu.acquire_program(program).is_err());
    assert_eq!(gpu.active_program(), None);
}

// ============================================================================
// Vertex Array & Drawing
// ============================================================================

#[test]
fn test_draw_with_bindings() {
    let gpu = headless_gpu();
    let program = create_program(&gpu);
    let array = create_triangle(&gpu);

    gpu.acquire_program(program).unwrap();
    gpu.acquire_vertex_array(array).unwrap();
    gpu.draw_arrays(PrimitiveTopology::Triangles, 0, 3).unwrap();
    gpu.release_vertex_array(array);
    gpu.release_program(program);

    assert_eq!(gpu.stats().draw_calls, 1);
    assert!(!gpu.has_bindings());
}

#[test]
#[should_panic(expected = "no program in use")]
fn test_draw_without_program_panics_in_debug() {
    let gpu = headless_gpu();
    let array = create_triangle(&gpu);
    gpu.acquire_vertex_array(array).unwrap();
    let _ = gpu.draw_arrays(PrimitiveTopology::Triangles, 0, 3);
}

#[test]
#[should_panic(expected = "still bound")]
fn test_overlapping_vertex_array_bind_panics_in_debug() {
    let gpu = headless_gpu();
    let first = create_triangle(&gpu);
    let second = create_triangle(&gpu);
    gpu.acquire_vertex_array(first).unwrap();
    let _ = gpu.acquire_vertex_array(second);
}

// ============================================================================
// Texture Units
// ============================================================================

#[test]
fn test_texture_units_are_independent() {
    let gpu = headless_gpu();
    let box_texture = create_texture(&gpu);
    let face_texture = create_texture(&gpu);

    gpu.acquire_texture_unit(0, box_texture).unwrap();
    gpu.acquire_texture_unit(1, face_texture).unwrap();
    assert_eq!(gpu.bound_texture(0), Some(box_texture));
    assert_eq!(gpu.bound_texture(1), Some(face_texture));

    gpu.release_texture_unit(0, box_texture);
    gpu.release_texture_unit(1, face_texture);
    assert!(!gpu.has_bindings());
}

#[test]
fn test_texture_unit_out_of_range_is_an_error() {
    let gpu = headless_gpu();
    let texture = create_texture(&gpu);
    let max = gpu.device().max_texture_units();

    let result = gpu.acquire_texture_unit(max, texture);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(gpu.bound_texture(max), None);
}

#[test]
#[should_panic(expected = "still bound there")]
fn test_occupied_texture_unit_panics_in_debug() {
    let gpu = headless_gpu();
    let first = create_texture(&gpu);
    let second = create_texture(&gpu);
    gpu.acquire_texture_unit(3, first).unwrap();
    let _ = gpu.acquire_texture_unit(3, second);
}
