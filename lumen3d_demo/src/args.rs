//! Command line arguments for the demo binary

use clap::{Parser, ValueEnum};
use lumen_3d_engine::lumen3d::log::LogSeverity;
use lumen_3d_engine::lumen3d::ApplicationConfig;
use std::path::PathBuf;

/// Scene to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Ten textured cubes
    GettingStarted,
    /// One lit crate with diffuse and specular maps
    Lighting,
    /// OBJ model lit by an orbiting light
    Model,
}

/// Minimum log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LogSeverity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LogSeverity::Trace,
            LogLevel::Debug => LogSeverity::Debug,
            LogLevel::Info => LogSeverity::Info,
            LogLevel::Warn => LogSeverity::Warn,
            LogLevel::Error => LogSeverity::Error,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "lumen3d_demo",
    about = "Lumen3D demo scenes",
    long_about = "Runs one of the Lumen3D demo scenes.\n\n\
        CONTROLS:\n\
          W/A/S/D      move\n\
          Space/Ctrl   up / down\n\
          Mouse        look around\n\
          Wheel        zoom\n\
          Escape       quit\n\
        \n\
        EXAMPLES:\n\
          # Open a window on the model scene\n\
          ./lumen3d_demo --scene model\n\
        \n\
          # Run 120 frames without a window\n\
          ./lumen3d_demo --scene lighting --headless-frames 120",
    version
)]
pub struct Args {
    /// Scene to run
    #[arg(long, value_enum, default_value = "model")]
    pub scene: SceneKind,

    /// Initial window width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Directory shader, model and texture paths are resolved against
    #[arg(long, default_value = "Content")]
    pub content: PathBuf,

    /// OBJ file shown by the model scene, relative to the content root
    #[arg(long, default_value = "Models/crate/crate.obj")]
    pub model: String,

    /// Run N frames on the headless surface instead of opening a window
    #[arg(long)]
    pub headless_frames: Option<u64>,

    /// Minimum log level printed to the terminal
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    pub fn to_config(&self) -> ApplicationConfig {
        let title = match self.scene {
            SceneKind::GettingStarted => "Lumen3D - Getting Started",
            SceneKind::Lighting => "Lumen3D - Lighting",
            SceneKind::Model => "Lumen3D - Model",
        };
        ApplicationConfig::default()
            .with_title(title)
            .with_size(self.width, self.height)
            .with_content_root(&self.content)
            .with_log_severity(self.log_level.into())
    }
}
