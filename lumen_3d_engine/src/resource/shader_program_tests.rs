/// Tests for ShaderProgram compilation, scoping and uniform plumbing

use super::*;
use crate::log::{self, LogSeverity};
use crate::test_support::{headless_gpu, scratch_dir, CaptureLogger, VERTEX_SRC, FRAGMENT_SRC};
use serial_test::serial;

fn test_program(gpu: &Gpu) -> ShaderProgram {
    ShaderProgram::from_source(gpu, "test", VERTEX_SRC, FRAGMENT_SRC).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_from_source_links_and_releases_stages() {
    let gpu = headless_gpu();
    let program = test_program(&gpu);

    let stats = gpu.stats();
    assert_eq!(stats.shader_compiles, 2);
    assert_eq!(stats.program_links, 1);
    assert_eq!(stats.live_programs, 1);
    assert_eq!(stats.live_shaders, 0);
    assert_eq!(program.label(), "test.vert + test.frag");
    assert!(!program.is_in_use());
}

#[test]
fn test_vertex_compile_error_carries_stage_and_log() {
    let gpu = headless_gpu();
    let broken = "#version 330 core\n#error missing semicolon\nvoid main() {}\n";

    let err = ShaderProgram::from_source(&gpu, "broken", broken, FRAGMENT_SRC).unwrap_err();
    match err {
        Error::ShaderCompilation { stage, source, log } => {
            assert_eq!(stage, Some(ShaderStage::Vertex));
            assert_eq!(source, "broken.vert");
            assert!(log.contains("missing semicolon"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(gpu.stats().live_objects(), 0);
}

#[test]
fn test_fragment_compile_error_releases_vertex_stage() {
    let gpu = headless_gpu();
    let err = ShaderProgram::from_source(&gpu, "broken", VERTEX_SRC, "void main() {").unwrap_err();

    assert!(matches!(err, Error::ShaderCompilation { stage: Some(ShaderStage::Fragment), .. }));
    assert_eq!(gpu.stats().live_shaders, 0);
    assert_eq!(gpu.stats().live_programs, 0);
}

#[test]
fn test_link_error_has_no_stage() {
    let gpu = headless_gpu();
    let vs = "uniform float tint; void main() { gl_Position = vec4(tint); }";
    let fs = "uniform vec3 tint; out vec4 c; void main() { c = vec4(tint, 1.0); }";

    let err = ShaderProgram::from_source(&gpu, "mismatch", vs, fs).unwrap_err();
    assert!(matches!(err, Error::ShaderCompilation { stage: None, .. }));
    assert_eq!(gpu.stats().live_objects(), 0);
}

#[test]
fn test_from_files() {
    let dir = scratch_dir("shader_from_files");
    let vert = dir.join("basic.vert");
    let frag = dir.join("basic.frag");
    std::fs::write(&vert, VERTEX_SRC).unwrap();
    std::fs::write(&frag, FRAGMENT_SRC).unwrap();

    let gpu = headless_gpu();
    let program = ShaderProgram::from_files(&gpu, &vert, &frag).unwrap();
    assert!(program.label().contains("basic.vert"));
    assert!(program.has_uniform("model"));
}

#[test]
fn test_from_files_missing_stage() {
    let dir = scratch_dir("shader_missing");
    let vert = dir.join("only.vert");
    std::fs::write(&vert, VERTEX_SRC).unwrap();

    let gpu = headless_gpu();
    let err = ShaderProgram::from_files(&gpu, &vert, dir.join("absent.frag")).unwrap_err();
    match err {
        Error::ResourceLoad { path, .. } => assert!(path.ends_with("absent.frag")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(gpu.stats().shader_compiles, 0);
}

// ============================================================================
// Use / Unuse
// ============================================================================

#[test]
fn test_scope_toggles_in_use() {
    let gpu = headless_gpu();
    let program = test_program(&gpu);

    {
        let scope = program.use_program().unwrap();
        assert!(scope.is_in_use());
        assert_eq!(gpu.active_program(), Some(program.handle()));
    }

    assert!(!program.is_in_use());
    assert_eq!(gpu.active_program(), None);
}

#[test]
fn test_program_can_be_reused_after_scope() {
    let gpu = headless_gpu();
    let program = test_program(&gpu);
    drop(program.use_program().unwrap());
    let scope = program.use_program().unwrap();
    scope.set_float("shininess", 32.0);
    assert_eq!(program.uniform_value("shininess"), Some(UniformValue::Float(32.0)));
}

// ============================================================================
// Uniforms
// ============================================================================

#[test]
fn test_typed_setters_upload_values() {
    let gpu = headless_gpu();
    let program = test_program(&gpu);
    let scope = program.use_program().unwrap();

    let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    scope.set_mat4("model", model);
    scope.set_mat3("normal", Mat3::IDENTITY);
    scope.set_vec3("light.diffuse", Vec3::splat(0.5));
    scope.set_float("shininess", 128.0);
    scope.set_int("boxTexture", 0);
    scope.set_bool("useTexture", true);

    assert_eq!(program.uniform_value("model"), Some(UniformValue::Mat4(model)));
    assert_eq!(program.uniform_value("normal"), Some(UniformValue::Mat3(Mat3::IDENTITY)));
    assert_eq!(program.uniform_value("light.diffuse"), Some(UniformValue::Vec3(Vec3::splat(0.5))));
    assert_eq!(program.uniform_value("shininess"), Some(UniformValue::Float(128.0)));
    assert_eq!(program.uniform_value("boxTexture"), Some(UniformValue::Int(0)));
    assert_eq!(program.uniform_value("useTexture"), Some(UniformValue::Int(1)));
}

#[test]
#[serial]
fn test_unknown_uniform_warns_once_and_is_ignored() {
    let capture = CaptureLogger::new();
    log::set_logger(capture.clone());

    let gpu = headless_gpu();
    let program = test_program(&gpu);
    {
        let scope = program.use_program().unwrap();
        scope.set_vec3("unusedTint", Vec3::ONE);
        scope.set_vec3("unusedTint", Vec3::ZERO);
        scope.set_float("shininess", 2.0);
    }
    log::reset_logger();

    let warnings: Vec<String> = capture
        .messages_at(LogSeverity::Warn)
        .into_iter()
        .filter(|m| m.contains("unusedTint"))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(program.uniform_value("unusedTint"), None);
    assert_eq!(program.uniform_value("shininess"), Some(UniformValue::Float(2.0)));
    assert_eq!(gpu.stats().uniform_uploads, 1);
}

#[test]
#[serial]
fn test_type_mismatch_is_logged_not_fatal() {
    let capture = CaptureLogger::new();
    log::set_logger(capture.clone());

    let gpu = headless_gpu();
    let program = test_program(&gpu);
    {
        let scope = program.use_program().unwrap();
        scope.set_float("model", 1.0);
    }
    log::reset_logger();

    let errors = capture.messages_at(LogSeverity::Error);
    assert!(errors.iter().any(|m| m.contains("'model'")));
    assert_eq!(program.uniform_value("model"), None);
}

#[test]
#[should_panic(expected = "while it is not in use")]
fn test_setter_outside_scope_panics_in_debug() {
    let gpu = headless_gpu();
    let program = test_program(&gpu);
    program.set_float("shininess", 1.0);
}

#[test]
fn test_drop_releases_program() {
    let gpu = headless_gpu();
    let program = test_program(&gpu);
    drop(program);
    assert_eq!(gpu.stats().live_programs, 0);
}
