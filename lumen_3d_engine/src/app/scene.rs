/// Scene trait - the per-variant part of an application

use glam::Mat4;

use crate::app::FrameTime;
use crate::camera::Camera3D;
use crate::content::ContentManager;
use crate::error::Result;
use crate::graphics_device::Gpu;
use crate::input::InputSource;

/// Everything a scene needs to render one frame
pub struct FrameContext<'a> {
    pub gpu: &'a Gpu,
    pub camera: &'a Camera3D,
    pub content: &'a ContentManager,
    /// Camera view matrix for this frame
    pub view: Mat4,
    /// Camera projection for this frame's aspect ratio
    pub projection: Mat4,
    /// Surface size in pixels
    pub viewport: (u32, u32),
    pub time: FrameTime,
}

/// One demo scene driven by [`Application`](crate::app::Application)
///
/// The application owns the loop, camera, input and content cache; a scene
/// owns the resources it draws. Resources fetched from the content cache are
/// shared with it; the cache is cleared after `unload_content`.
pub trait Scene {
    /// Scene-specific GPU state, after the baseline (depth test) is set
    fn initialize(&mut self, _gpu: &Gpu) -> Result<()> {
        Ok(())
    }

    /// Create or fetch every resource the scene draws
    fn load_content(&mut self, gpu: &Gpu, content: &mut ContentManager) -> Result<()>;

    /// Release directly held resources, in reverse creation order
    fn unload_content(&mut self);

    /// Per-frame simulation, before the camera moves
    fn update(&mut self, _time: &FrameTime, _input: &dyn InputSource) -> Result<()> {
        Ok(())
    }

    /// Bind resources, set uniforms and issue draws
    ///
    /// Every binding made here must be released before returning.
    fn render(&mut self, frame: &FrameContext<'_>) -> Result<()>;

    /// Framebuffer clear color
    fn clear_color(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }
}
