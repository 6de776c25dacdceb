//! Lumen3D demo - runs one of the sample scenes
//!
//! Opens a winit window rendering through OpenGL by default. With
//! `--headless-frames N` the scene runs N frames on the headless device and
//! prints the device statistics, which is how the scenes are checked without
//! a display.

mod args;
mod scenes;

use args::{Args, SceneKind};
use clap::Parser;
use lumen_3d_engine::lumen3d::device::{Gpu, HeadlessGraphicsDevice};
use lumen_3d_engine::lumen3d::log::{set_logger, DefaultLogger};
use lumen_3d_engine::lumen3d::platform::{HeadlessSurface, Surface, WinitSurface};
use lumen_3d_engine::lumen3d::{Application, ApplicationConfig, Result, Scene};
use lumen_3d_engine::{engine_error, engine_info};
use scenes::{GettingStartedScene, LightingScene, ModelScene};
use std::process::ExitCode;

const SOURCE: &str = "lumen3d_demo";

fn main() -> ExitCode {
    let args = Args::parse();
    let config = args.to_config();
    set_logger(DefaultLogger::new(config.log_severity));

    match run(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!(SOURCE, "{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: ApplicationConfig) -> Result<()> {
    match args.scene {
        SceneKind::GettingStarted => run_scene(args, config, GettingStartedScene::new()),
        SceneKind::Lighting => {
            let scene = LightingScene::new(config.flip_textures);
            run_scene(args, config, scene)
        }
        SceneKind::Model => run_scene(args, config, ModelScene::with_model(args.model.clone())),
    }
}

fn run_scene<S: Scene>(args: &Args, config: ApplicationConfig, scene: S) -> Result<()> {
    let surface: Box<dyn Surface> = match args.headless_frames {
        Some(frames) => Box::new(
            HeadlessSurface::new(Gpu::new(HeadlessGraphicsDevice::new()), config.width, config.height)
                .with_frame_limit(frames),
        ),
        None => Box::new(WinitSurface::new(&config)?),
    };
    let gpu = surface.gpu().clone();

    engine_info!(SOURCE, "Running '{}' from '{}'", config.title, config.content_root.display());
    let mut app = Application::new(config, surface, scene);
    app.run()?;

    let stats = gpu.stats();
    engine_info!(
        SOURCE,
        "{} frames, {} draw calls, {} vertices, {} shader compiles, {} live objects",
        app.frames_rendered(),
        stats.draw_calls,
        stats.vertices_submitted,
        stats.shader_compiles,
        stats.live_objects()
    );
    Ok(())
}
