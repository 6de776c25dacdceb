/// WinitSurface - desktop window with an OpenGL context, driven by winit's pump API
///
/// The loop stays in control: each `poll_events` pumps the winit event loop
/// without blocking and returns. Window events are buffered by the handler
/// and forwarded as engine input once input is active.
///
/// The window owns an OpenGL 3.3 core context created through glutin. The
/// surface builds its own [`Gpu`] over a [`GlGraphicsDevice`] on that
/// context and presents with a real buffer swap.
///
/// Mouse look reads raw device motion. Once the platform delivers it,
/// absolute cursor moves are dropped so the camera does not turn twice, and
/// a locked cursor keeps turning the camera past the window edge.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface as GlutinSurface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Window, WindowId};

use crate::config::ApplicationConfig;
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_err, engine_info, engine_warn};
use crate::graphics_device::{GlGraphicsDevice, Gpu};
use crate::input::{translate_device_event, translate_window_event, InputEvent, InputHandler};
use crate::platform::Surface;

const SOURCE: &str = "lumen3d::WinitSurface";

/// Pumps allowed for the window to appear after startup
const STARTUP_PUMPS: u32 = 100;

// ============================================================================
// OpenGL context
// ============================================================================

/// Context and window surface; dropped before the window they render to
struct GlWindowContext {
    surface: GlutinSurface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlWindowContext {
    fn resize(&self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            self.surface.resize(&self.context, width, height);
        }
    }
}

#[cfg(target_os = "windows")]
fn display_preference(raw_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::WglThenEgl(Some(raw_window))
}

#[cfg(target_os = "macos")]
fn display_preference(_raw_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(any(
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn display_preference(_raw_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::EglThenGlx(Box::new(winit::platform::x11::register_xlib_error_hook))
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn display_preference(_raw_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

/// Create a current OpenGL 3.3 core context rendering to `window`
fn create_gl_context(window: &Window) -> std::result::Result<(GlWindowContext, glow::Context), String> {
    let raw_display = window.display_handle().map_err(|e| e.to_string())?.as_raw();
    let raw_window = window.window_handle().map_err(|e| e.to_string())?.as_raw();

    let display = unsafe { Display::new(raw_display, display_preference(raw_window)) }
        .map_err(|e| format!("display: {}", e))?;

    let template = ConfigTemplateBuilder::new()
        .with_depth_size(24)
        .compatible_with_native_window(raw_window)
        .build();
    let config = unsafe { display.find_configs(template) }
        .map_err(|e| format!("config: {}", e))?
        .max_by_key(|config| config.num_samples())
        .ok_or_else(|| "no framebuffer configuration with a 24-bit depth buffer".to_string())?;

    let attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(raw_window));
    let not_current = unsafe { display.create_context(&config, &attributes) }
        .map_err(|e| format!("context: {}", e))?;

    let size = window.inner_size();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window,
        NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN),
    );
    let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
        .map_err(|e| format!("surface: {}", e))?;
    let context = not_current
        .make_current(&surface)
        .map_err(|e| format!("make current: {}", e))?;

    if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
        engine_warn!(SOURCE, "Vsync unavailable: {}", err);
    }

    let gl = unsafe { glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name)) };
    Ok((GlWindowContext { surface, context }, gl))
}

// ============================================================================
// Event handler
// ============================================================================

struct WindowState {
    title: String,
    requested_size: (u32, u32),
    size: PhysicalSize<u32>,
    gl: Option<GlWindowContext>,
    window: Option<Window>,
    loader: Option<glow::Context>,
    creation_error: Option<String>,
    pending: Vec<InputEvent>,
    raw_motion: bool,
    close_requested: bool,
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.requested_size.0, self.requested_size.1));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(err) => {
                self.creation_error = Some(format!("Window creation failed: {}", err));
                event_loop.exit();
                return;
            }
        };

        match create_gl_context(&window) {
            Ok((gl, loader)) => {
                self.size = window.inner_size();
                self.gl = Some(gl);
                self.loader = Some(loader);
                self.window = Some(window);
            }
            Err(reason) => {
                self.creation_error = Some(format!("OpenGL context creation failed: {}", reason));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                self.size = size;
                if let Some(gl) = &self.gl {
                    gl.resize(size);
                }
            }
            other => {
                if let Some(input) = translate_window_event(&other) {
                    self.pending.push(input);
                }
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let Some(input) = translate_device_event(&event) {
            self.raw_motion = true;
            self.pending.push(input);
        }
    }
}

/// Drop absolute pointer moves once raw motion is known to arrive
fn pointer_source_filter(events: Vec<InputEvent>, raw_motion: bool) -> impl Iterator<Item = InputEvent> {
    events
        .into_iter()
        .filter(move |event| !(raw_motion && matches!(event, InputEvent::PointerMoved { .. })))
}

// ============================================================================
// Surface
// ============================================================================

pub struct WinitSurface {
    gpu: Gpu,
    event_loop: EventLoop<()>,
    state: WindowState,
    start: Instant,
    should_close: bool,
    input_active: bool,
}

impl WinitSurface {
    /// Open a window titled and sized after `config`, with its OpenGL device
    pub fn new(config: &ApplicationConfig) -> Result<Self> {
        let mut event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(err) => engine_bail!(SOURCE, Error::InitializationFailed(format!(
                "Event loop creation failed: {}", err
            ))),
        };

        let mut state = WindowState {
            title: config.title.clone(),
            requested_size: (config.width, config.height),
            size: PhysicalSize::new(config.width, config.height),
            gl: None,
            window: None,
            loader: None,
            creation_error: None,
            pending: Vec::new(),
            raw_motion: false,
            close_requested: false,
        };

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut state);
            if state.window.is_some() || matches!(status, PumpStatus::Exit(_)) {
                break;
            }
        }

        if let Some(reason) = state.creation_error.take() {
            engine_bail!(SOURCE, Error::InitializationFailed(reason));
        }
        let Some(gl) = state.loader.take() else {
            engine_bail!(SOURCE, Error::InitializationFailed(
                "Window did not appear after startup".to_string()
            ));
        };
        let gpu = Gpu::new(GlGraphicsDevice::new(gl));

        engine_info!(SOURCE, "Opened window '{}' ({}x{})",
            config.title, state.size.width, state.size.height);

        Ok(Self {
            gpu,
            event_loop,
            state,
            start: Instant::now(),
            should_close: false,
            input_active: false,
        })
    }

    pub fn window(&self) -> Option<&Window> {
        self.state.window.as_ref()
    }
}

impl Surface for WinitSurface {
    fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    fn elapsed_time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn size(&self) -> (u32, u32) {
        (self.state.size.width, self.state.size.height)
    }

    fn swap_buffers(&mut self) -> Result<()> {
        let (Some(window), Some(gl)) = (&self.state.window, &self.state.gl) else {
            return Ok(());
        };
        window.pre_present_notify();
        gl.surface
            .swap_buffers(&gl.context)
            .map_err(|err| engine_err!(SOURCE, Error::BackendError(format!("Buffer swap failed: {}", err))))
    }

    fn poll_events(&mut self, handler: &mut dyn InputHandler) {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            engine_debug!(SOURCE, "Event loop exited with code {}", code);
            self.should_close = true;
        }
        if self.state.close_requested {
            self.should_close = true;
        }

        let events = std::mem::take(&mut self.state.pending);
        if self.input_active {
            for event in pointer_source_filter(events, self.state.raw_motion) {
                handler.handle_event(event);
            }
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn activate_input(&mut self) {
        self.input_active = true;
        self.state.pending.clear();

        let Some(window) = &self.state.window else {
            return;
        };
        // Locked keeps raw motion flowing with the cursor pinned in place
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(err) = grabbed {
            engine_warn!(SOURCE, "Cursor capture unavailable: {}", err);
        }
        window.set_cursor_visible(false);
    }
}

#[cfg(test)]
#[path = "winit_surface_tests.rs"]
mod tests;
