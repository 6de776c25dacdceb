/// Gpu - shared device context and explicit bind-state token
///
/// Every GPU resource keeps a clone of the `Gpu` it was created on, so the
/// device always outlives the resources that reference it. The context also
/// owns the binding state (program in use, bound vertex array, texture
/// units). Resources only change that state through scoped guards, and the
/// context rejects overlapping binds: in debug builds a conflicting bind is
/// a panic, in release builds it is logged and skipped.
///
/// `Gpu` is `!Send`: the device and its binding context belong to the thread
/// that created them.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DeviceStats,
    ProgramHandle, VertexArrayHandle, TextureHandle, IndexType,
    RenderState, ClearFlags, PrimitiveTopology,
};

const SOURCE: &str = "lumen3d::Gpu";

/// Current bindings of the device context
#[derive(Debug, Default, Clone)]
struct BindState {
    program: Option<ProgramHandle>,
    vertex_array: Option<VertexArrayHandle>,
    texture_units: FxHashMap<u32, TextureHandle>,
}

struct GpuShared {
    device: RefCell<Box<dyn GraphicsDevice>>,
    bindings: RefCell<BindState>,
}

/// Shared GPU context (cheap to clone)
#[derive(Clone)]
pub struct Gpu {
    shared: Rc<GpuShared>,
}

/// Report API misuse: panics in debug builds, logs and returns an error in release
pub(crate) fn misuse(message: String) -> Error {
    crate::engine_error!(SOURCE, "{}", message);
    debug_assert!(false, "{}", message);
    Error::ApplicationState(message)
}

impl Gpu {
    /// Wrap a device into a new context
    pub fn new<D: GraphicsDevice + 'static>(device: D) -> Self {
        Self::from_boxed(Box::new(device))
    }

    /// Wrap an already boxed device into a new context
    pub fn from_boxed(device: Box<dyn GraphicsDevice>) -> Self {
        crate::engine_debug!(SOURCE, "Created GPU context on device '{}'", device.name());
        Self {
            shared: Rc::new(GpuShared {
                device: RefCell::new(device),
                bindings: RefCell::new(BindState::default()),
            }),
        }
    }

    /// Read access to the raw device
    pub fn device(&self) -> Ref<'_, dyn GraphicsDevice> {
        Ref::map(self.shared.device.borrow(), |device| device.as_ref())
    }

    /// Write access to the raw device (resource creation / destruction)
    pub(crate) fn device_mut(&self) -> RefMut<'_, dyn GraphicsDevice> {
        RefMut::map(self.shared.device.borrow_mut(), |device| device.as_mut())
    }

    /// True when both contexts share the same device
    pub fn ptr_eq(&self, other: &Gpu) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Device statistics
    pub fn stats(&self) -> DeviceStats {
        self.device().stats()
    }

    // ===== GLOBAL STATE =====

    /// Enable fixed-function capabilities
    pub fn enable(&self, state: RenderState) {
        self.device_mut().enable(state);
    }

    /// Clear the framebuffer with `color`
    pub fn clear(&self, color: [f32; 4], flags: ClearFlags) {
        let mut device = self.device_mut();
        device.set_clear_color(color);
        device.clear(flags);
    }

    /// Set the viewport size
    pub fn set_viewport(&self, width: u32, height: u32) {
        self.device_mut().set_viewport(width, height);
    }

    // ===== BIND STATE QUERIES =====

    /// Program currently in use
    pub fn active_program(&self) -> Option<ProgramHandle> {
        self.shared.bindings.borrow().program
    }

    /// Vertex array currently bound
    pub fn active_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.shared.bindings.borrow().vertex_array
    }

    /// Texture bound on `unit`
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.shared.bindings.borrow().texture_units.get(&unit).copied()
    }

    /// True when anything is still bound
    pub fn has_bindings(&self) -> bool {
        let bindings = self.shared.bindings.borrow();
        bindings.program.is_some()
            || bindings.vertex_array.is_some()
            || !bindings.texture_units.is_empty()
    }

    /// Check that a frame left no binding behind
    ///
    /// Leaked bindings are unbound on the device before they are reported,
    /// so the next frame starts from a clean context.
    pub fn end_frame(&self) -> Result<()> {
        if !self.has_bindings() {
            return Ok(());
        }
        let leaked = self.release_all();
        Err(misuse(format!(
            "Stale bindings at end of frame: program={:?}, vertex_array={:?}, texture_units={:?}",
            leaked.program, leaked.vertex_array, leaked.texture_units
        )))
    }

    /// Unbind everything without going through the guards
    fn release_all(&self) -> BindState {
        let leaked = std::mem::take(&mut *self.shared.bindings.borrow_mut());
        let mut device = self.device_mut();
        if leaked.program.is_some() {
            if let Err(err) = device.use_program(None) {
                crate::engine_error!(SOURCE, "Failed to release leaked program: {}", err);
            }
        }
        if leaked.vertex_array.is_some() {
            if let Err(err) = device.bind_vertex_array(None) {
                crate::engine_error!(SOURCE, "Failed to unbind leaked vertex array: {}", err);
            }
        }
        for &unit in leaked.texture_units.keys() {
            if let Err(err) = device.bind_texture(unit, None) {
                crate::engine_error!(SOURCE, "Failed to clear leaked texture unit {}: {}", unit, err);
            }
        }
        leaked
    }

    // ===== PROGRAM =====

    pub(crate) fn acquire_program(&self, program: ProgramHandle) -> Result<()> {
        if let Some(active) = self.active_program() {
            return Err(misuse(format!(
                "Program {:?} used while program {:?} is still in use",
                program, active
            )));
        }
        self.device_mut().use_program(Some(program))?;
        self.shared.bindings.borrow_mut().program = Some(program);
        Ok(())
    }

    pub(crate) fn release_program(&self, program: ProgramHandle) {
        if self.active_program() != Some(program) {
            misuse(format!("Program {:?} released but it is not in use", program));
            return;
        }
        if let Err(err) = self.device_mut().use_program(None) {
            crate::engine_error!(SOURCE, "Failed to release program {:?}: {}", program, err);
        }
        self.shared.bindings.borrow_mut().program = None;
    }

    // ===== VERTEX ARRAY =====

    pub(crate) fn acquire_vertex_array(&self, vertex_array: VertexArrayHandle) -> Result<()> {
        if let Some(active) = self.active_vertex_array() {
            return Err(misuse(format!(
                "Vertex array {:?} bound while vertex array {:?} is still bound",
                vertex_array, active
            )));
        }
        self.device_mut().bind_vertex_array(Some(vertex_array))?;
        self.shared.bindings.borrow_mut().vertex_array = Some(vertex_array);
        Ok(())
    }

    pub(crate) fn release_vertex_array(&self, vertex_array: VertexArrayHandle) {
        if self.active_vertex_array() != Some(vertex_array) {
            misuse(format!("Vertex array {:?} unbound but it is not bound", vertex_array));
            return;
        }
        if let Err(err) = self.device_mut().bind_vertex_array(None) {
            crate::engine_error!(SOURCE, "Failed to unbind vertex array {:?}: {}", vertex_array, err);
        }
        self.shared.bindings.borrow_mut().vertex_array = None;
    }

    // ===== TEXTURE UNITS =====

    pub(crate) fn acquire_texture_unit(&self, unit: u32, texture: TextureHandle) -> Result<()> {
        let max_units = self.device().max_texture_units();
        if unit >= max_units {
            return Err(Error::InvalidResource(format!(
                "Texture unit {} out of range (device has {} units)",
                unit, max_units
            )));
        }
        if let Some(bound) = self.bound_texture(unit) {
            return Err(misuse(format!(
                "Texture {:?} bound to unit {} while texture {:?} is still bound there",
                texture, unit, bound
            )));
        }
        self.device_mut().bind_texture(unit, Some(texture))?;
        self.shared.bindings.borrow_mut().texture_units.insert(unit, texture);
        Ok(())
    }

    pub(crate) fn release_texture_unit(&self, unit: u32, texture: TextureHandle) {
        if self.bound_texture(unit) != Some(texture) {
            misuse(format!("Texture {:?} released from unit {} but it is not bound there", texture, unit));
            return;
        }
        if let Err(err) = self.device_mut().bind_texture(unit, None) {
            crate::engine_error!(SOURCE, "Failed to clear texture unit {}: {}", unit, err);
        }
        self.shared.bindings.borrow_mut().texture_units.remove(&unit);
    }

    // ===== DRAWING =====

    fn check_draw_bindings(&self) -> Result<()> {
        let bindings = self.shared.bindings.borrow();
        if bindings.program.is_none() {
            return Err(misuse("Draw issued with no program in use".to_string()));
        }
        if bindings.vertex_array.is_none() {
            return Err(misuse("Draw issued with no vertex array bound".to_string()));
        }
        Ok(())
    }

    pub(crate) fn draw_arrays(&self, topology: PrimitiveTopology, first: u32, count: u32) -> Result<()> {
        self.check_draw_bindings()?;
        self.device_mut().draw_arrays(topology, first, count)
    }

    pub(crate) fn draw_elements(&self, topology: PrimitiveTopology, count: u32, index_type: IndexType) -> Result<()> {
        self.check_draw_bindings()?;
        self.device_mut().draw_elements(topology, count, index_type)
    }
}

impl fmt::Debug for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gpu")
            .field("device", &self.device().name())
            .field("bindings", &*self.shared.bindings.borrow())
            .finish()
    }
}

#[cfg(test)]
#[path = "gpu_tests.rs"]
mod tests;
