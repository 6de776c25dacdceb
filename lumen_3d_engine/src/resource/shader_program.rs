//! Linked two-stage shader program with typed, name-based uniform setters.
//!
//! Uniform values live on the GPU; the program only caches name to location
//! lookups. Setters are valid only while the program is in use, i.e. while
//! a [`ProgramScope`] obtained from [`ShaderProgram::use_program`] is alive.
//! A name that does not resolve (typo, or stripped by the compiler because
//! the shader never reads it) is reported once as a warning and ignored.

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::path::Path;
use glam::{Mat3, Mat4, Vec3};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::{engine_debug, engine_error, engine_err, engine_warn};
use crate::graphics_device::{
    misuse, Gpu, ProgramHandle, ShaderHandle, ShaderStage, UniformLocation, UniformValue,
};

const SOURCE: &str = "lumen3d::ShaderProgram";

/// Linked GPU program
pub struct ShaderProgram {
    gpu: Gpu,
    handle: ProgramHandle,
    label: String,
    in_use: Cell<bool>,
    locations: RefCell<FxHashMap<String, Option<UniformLocation>>>,
}

impl ShaderProgram {
    /// Read, compile and link a vertex and a fragment stage from disk
    pub fn from_files(gpu: &Gpu, vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> Result<Self> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();

        let vertex_source = std::fs::read_to_string(vertex_path)
            .map_err(|e| engine_err!(SOURCE, Error::resource_load(vertex_path, e)))?;
        let fragment_source = std::fs::read_to_string(fragment_path)
            .map_err(|e| engine_err!(SOURCE, Error::resource_load(fragment_path, e)))?;

        let vertex_label = vertex_path.display().to_string();
        let fragment_label = fragment_path.display().to_string();
        Self::build(
            gpu,
            (vertex_label.as_str(), vertex_source.as_str()),
            (fragment_label.as_str(), fragment_source.as_str()),
        )
    }

    /// Compile and link in-memory sources; `label` names the program in diagnostics
    pub fn from_source(gpu: &Gpu, label: &str, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex_label = format!("{}.vert", label);
        let fragment_label = format!("{}.frag", label);
        Self::build(
            gpu,
            (vertex_label.as_str(), vertex_source),
            (fragment_label.as_str(), fragment_source),
        )
    }

    fn build(gpu: &Gpu, vertex: (&str, &str), fragment: (&str, &str)) -> Result<Self> {
        let label = format!("{} + {}", vertex.0, fragment.0);
        let handle = {
            let mut device = gpu.device_mut();
            let vs = compile_stage(&mut *device, ShaderStage::Vertex, vertex)?;
            let fs = match compile_stage(&mut *device, ShaderStage::Fragment, fragment) {
                Ok(fs) => fs,
                Err(err) => {
                    device.destroy_shader(vs);
                    return Err(err);
                }
            };

            let linked = device.link_program(vs, fs);
            device.destroy_shader(vs);
            device.destroy_shader(fs);
            linked.map_err(|log| engine_err!(SOURCE, Error::ShaderCompilation {
                stage: None,
                source: label.clone(),
                log,
            }))?
        };

        engine_debug!(SOURCE, "Linked program {:?} ({})", handle, label);
        Ok(Self {
            gpu: gpu.clone(),
            handle,
            label,
            in_use: Cell::new(false),
            locations: RefCell::new(FxHashMap::default()),
        })
    }

    /// Make this the active program for the lifetime of the returned scope
    pub fn use_program(&self) -> Result<ProgramScope<'_>> {
        self.gpu.acquire_program(self.handle)?;
        self.in_use.set(true);
        Ok(ProgramScope { program: self })
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.get()
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Stage sources this program was built from
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when the program has an active uniform called `name`
    pub fn has_uniform(&self, name: &str) -> bool {
        self.gpu.device().uniform_location(self.handle, name).is_some()
    }

    /// Last value uploaded to `name`, read back from the device
    pub fn uniform_value(&self, name: &str) -> Option<UniformValue> {
        self.gpu.device().read_uniform(self.handle, name)
    }

    // ===== UNIFORM SETTERS =====

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Int(value as i32));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    pub fn set_mat3(&self, name: &str, value: Mat3) {
        self.set_uniform(name, UniformValue::Mat3(value));
    }

    pub fn set_mat4(&self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_uniform(&self, name: &str, value: UniformValue) {
        if !self.in_use.get() {
            misuse(format!(
                "Uniform '{}' set on program '{}' while it is not in use",
                name, self.label
            ));
            return;
        }

        let Some(location) = self.location(name) else {
            return;
        };
        if let Err(err) = self.gpu.device_mut().set_uniform(location, value) {
            engine_error!(SOURCE, "Failed to set uniform '{}' on '{}': {}", name, self.label, err);
        }
    }

    fn location(&self, name: &str) -> Option<UniformLocation> {
        if let Some(cached) = self.locations.borrow().get(name) {
            return *cached;
        }

        let location = self.gpu.device().uniform_location(self.handle, name);
        if location.is_none() {
            engine_warn!(SOURCE, "Uniform '{}' not found in program '{}'", name, self.label);
        }
        self.locations.borrow_mut().insert(name.to_string(), location);
        location
    }
}

fn compile_stage(
    device: &mut dyn crate::graphics_device::GraphicsDevice,
    stage: ShaderStage,
    (path, source): (&str, &str),
) -> Result<ShaderHandle> {
    device.compile_shader(stage, source).map_err(|log| engine_err!(SOURCE, Error::ShaderCompilation {
        stage: Some(stage),
        source: path.to_string(),
        log,
    }))
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.gpu.device_mut().destroy_program(self.handle);
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("label", &self.label)
            .field("in_use", &self.in_use.get())
            .finish()
    }
}

// ============================================================================
// PROGRAM SCOPE
// ============================================================================

/// Scope during which a program is the active one
///
/// Dereferences to the program so setters can be called directly; the
/// program is unused when the scope is dropped.
pub struct ProgramScope<'a> {
    program: &'a ShaderProgram,
}

impl<'a> ProgramScope<'a> {
    pub fn program(&self) -> &'a ShaderProgram {
        self.program
    }
}

impl Deref for ProgramScope<'_> {
    type Target = ShaderProgram;

    fn deref(&self) -> &ShaderProgram {
        self.program
    }
}

impl Drop for ProgramScope<'_> {
    fn drop(&mut self) {
        self.program.in_use.set(false);
        self.program.gpu.release_program(self.program.handle);
    }
}

#[cfg(test)]
#[path = "shader_program_tests.rs"]
mod tests;
