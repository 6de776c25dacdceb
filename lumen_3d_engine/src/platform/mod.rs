/// Platform module - surfaces the application loop renders into

pub mod surface;
pub mod headless_surface;
pub mod winit_surface;

pub use surface::Surface;
pub use headless_surface::{HeadlessSurface, DEFAULT_TIMESTEP};
pub use winit_surface::WinitSurface;
