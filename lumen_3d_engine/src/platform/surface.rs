/// Surface trait - the window (or stand-in) the application loop drives

use crate::error::Result;
use crate::graphics_device::Gpu;
use crate::input::InputHandler;

/// Platform surface
///
/// Owns the GPU context it presents. The application loop is the only
/// caller; every method runs on the thread that created the surface.
pub trait Surface {
    /// GPU context rendering into this surface
    fn gpu(&self) -> &Gpu;

    /// Seconds since the surface was created
    fn elapsed_time(&self) -> f64;

    /// Drawable size in pixels
    fn size(&self) -> (u32, u32);

    /// Present the frame that was just rendered
    fn swap_buffers(&mut self) -> Result<()>;

    /// Process pending platform events, forwarding input to `handler` once
    /// input has been activated
    fn poll_events(&mut self, handler: &mut dyn InputHandler);

    /// True once closing was requested (by the user or the application)
    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, value: bool);

    /// Start forwarding input events (and capture the pointer, if any)
    fn activate_input(&mut self);
}
