/// Application - single-pass lifecycle and frame loop around a Scene
///
/// Lifecycle: Constructed -> Initialized -> ContentLoaded -> Running ->
/// ContentUnloaded -> Terminated. `run` walks it once; a second `run` is an
/// `ApplicationState` error.
///
/// Each frame, in order: read elapsed time and compute the delta, update
/// (escape check, scene, camera, input reset), render (clear, view and
/// projection, scene draws, stale-binding check), present, poll events.
/// A close request is only checked at the top of the loop, so the frame in
/// which it is raised always renders to completion.

use crate::app::{FrameClock, FrameContext, FrameTime, Scene};
use crate::camera::Camera3D;
use crate::config::ApplicationConfig;
use crate::content::ContentManager;
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_error, engine_info};
use crate::graphics_device::{ClearFlags, Gpu, RenderState};
use crate::input::{InputManager, InputSource, Key};
use crate::platform::Surface;
use crate::resource::ImageFileDecoder;

const SOURCE: &str = "lumen3d::Application";

/// Lifecycle position of an [`Application`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationState {
    Constructed,
    Initialized,
    ContentLoaded,
    Running,
    ContentUnloaded,
    Terminated,
}

pub struct Application<S: Scene> {
    config: ApplicationConfig,
    state: ApplicationState,
    surface: Box<dyn Surface>,
    gpu: Gpu,
    input: InputManager,
    camera: Camera3D,
    content: ContentManager,
    scene: S,
    frames_rendered: u64,
}

impl<S: Scene> Application<S> {
    /// Create an application rendering `scene` into `surface`
    pub fn new(config: ApplicationConfig, surface: Box<dyn Surface>, scene: S) -> Self {
        let gpu = surface.gpu().clone();
        let content = ContentManager::new(&gpu, config.content_root.clone())
            .with_decoder(ImageFileDecoder::new(config.flip_textures))
            .with_texture_params(config.texture_params);

        Self {
            camera: Camera3D::new(config.camera),
            config,
            state: ApplicationState::Constructed,
            surface,
            gpu,
            input: InputManager::new(),
            content,
            scene,
            frames_rendered: 0,
        }
    }

    /// Replace the content cache (custom decoder or parser)
    pub fn with_content(mut self, content: ContentManager) -> Self {
        self.content = content;
        self
    }

    // ===== LIFECYCLE =====

    /// Run the whole lifecycle: initialize, load, loop until close, unload
    ///
    /// Initialization and load failures abort the run after releasing what
    /// was loaded. Per-frame failures other than load errors are logged and
    /// the frame goes on.
    pub fn run(&mut self) -> Result<()> {
        if self.state != ApplicationState::Constructed {
            engine_bail!(SOURCE, Error::ApplicationState(format!(
                "run called in state {:?}; an application runs once", self.state
            )));
        }

        if let Err(err) = self.initialize() {
            self.state = ApplicationState::Terminated;
            return Err(err);
        }
        if let Err(err) = self.load_content() {
            self.unload_content();
            self.state = ApplicationState::Terminated;
            return Err(err);
        }

        let result = self.run_loop();

        self.unload_content();
        self.state = ApplicationState::Terminated;
        engine_info!(SOURCE, "Terminated after {} frames", self.frames_rendered);
        result
    }

    fn initialize(&mut self) -> Result<()> {
        self.surface.activate_input();
        self.input.reset_pointer();
        self.camera = Camera3D::new(self.config.camera);
        self.gpu.enable(RenderState::DEPTH_TEST);
        self.scene.initialize(&self.gpu)?;

        self.state = ApplicationState::Initialized;
        engine_debug!(SOURCE, "Initialized '{}'", self.config.title);
        Ok(())
    }

    fn load_content(&mut self) -> Result<()> {
        self.scene.load_content(&self.gpu, &mut self.content)?;

        self.state = ApplicationState::ContentLoaded;
        let stats = self.content.stats();
        engine_info!(SOURCE, "Content loaded: {} shaders, {} models, {} textures",
            stats.shaders, stats.models, stats.textures);
        Ok(())
    }

    fn unload_content(&mut self) {
        self.scene.unload_content();
        self.content.clear();
        self.state = ApplicationState::ContentUnloaded;
    }

    fn run_loop(&mut self) -> Result<()> {
        self.state = ApplicationState::Running;
        let mut clock = FrameClock::new();

        while !self.surface.should_close() {
            let time = clock.tick(self.surface.elapsed_time());

            self.update(&time)?;
            self.render(time)?;
            self.frames_rendered += 1;

            self.surface.swap_buffers()?;
            self.surface.poll_events(&mut self.input);
        }
        Ok(())
    }

    // ===== FRAME =====

    fn update(&mut self, time: &FrameTime) -> Result<()> {
        if self.input.is_key_down(Key::Escape) && !self.surface.should_close() {
            engine_info!(SOURCE, "Escape pressed, closing");
            self.surface.set_should_close(true);
        }

        let result = self.scene.update(time, &self.input);
        self.camera.update(time.delta, &self.input);
        self.input.reset_state();

        tolerate(result, "Scene update")
    }

    fn render(&mut self, time: FrameTime) -> Result<()> {
        let (width, height) = self.surface.size();
        self.gpu.set_viewport(width, height);
        self.gpu.clear(self.scene.clear_color(), ClearFlags::COLOR | ClearFlags::DEPTH);

        let aspect_ratio = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        let frame = FrameContext {
            gpu: &self.gpu,
            camera: &self.camera,
            content: &self.content,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(aspect_ratio, self.config.near, self.config.far),
            viewport: (width, height),
            time,
        };
        let result = self.scene.render(&frame);

        // The context reports leaked bindings and unbinds them
        let _ = self.gpu.end_frame();

        tolerate(result, "Scene render")
    }

    // ===== ACCESSORS =====

    pub fn state(&self) -> ApplicationState {
        self.state
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn content(&self) -> &ContentManager {
        &self.content
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Frames rendered by `run`
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

/// Load errors end the run; anything else degrades to a logged error
fn tolerate(result: Result<()>, phase: &str) -> Result<()> {
    match result {
        Err(err) if err.is_load_error() => Err(err),
        Err(err) => {
            engine_error!(SOURCE, "{} failed, frame continues: {}", phase, err);
            Ok(())
        }
        Ok(()) => Ok(()),
    }
}

#[cfg(test)]
#[path = "application_tests.rs"]
mod tests;
