/// Graphics device module - raw GPU operations, shared context and bind-state tracking

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod shader;
pub mod texture;
pub mod state;
pub mod gpu;
pub mod headless_graphics_device;
pub mod gl_graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use shader::*;
pub use texture::*;
pub use state::*;
pub use gpu::Gpu;
pub(crate) use gpu::misuse;
pub use headless_graphics_device::HeadlessGraphicsDevice;
pub use gl_graphics_device::GlGraphicsDevice;
