//! Error types for the Lumen3D engine
//!
//! Every fallible engine operation returns [`Result`]. Load-time failures
//! (missing files, undecodable images, shader compile/link errors) are fatal
//! for the run that hits them and travel up to the process entry point.
//! Missing uniforms are not errors: they are logged as warnings.

use std::fmt;
use crate::graphics_device::ShaderStage;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// An image or model file could not be read or decoded
    ResourceLoad {
        /// Path of the file that failed to load
        path: String,
        /// Decoder / file system diagnostic
        reason: String,
    },

    /// A shader stage failed to compile, or the program failed to link
    ShaderCompilation {
        /// Failing stage, `None` when linking failed
        stage: Option<ShaderStage>,
        /// Source file (or label) of the failing stage / program
        source: String,
        /// Compiler or linker diagnostics
        log: String,
    },

    /// API misuse (wrong lifecycle order, binding conflicts, ...)
    ApplicationState(String),

    /// Invalid resource (stale handle, mismatched layout, bad data size, ...)
    InvalidResource(String),

    /// Backend-specific error
    BackendError(String),

    /// Initialization failed (window, device, subsystems)
    InitializationFailed(String),
}

impl Error {
    /// Build a `ResourceLoad` error for `path`
    pub fn resource_load(path: impl AsRef<std::path::Path>, reason: impl fmt::Display) -> Self {
        Error::ResourceLoad {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for errors raised while loading content from disk
    pub fn is_load_error(&self) -> bool {
        matches!(self, Error::ResourceLoad { .. } | Error::ShaderCompilation { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResourceLoad { path, reason } => {
                write!(f, "Failed to load resource '{}': {}", path, reason)
            }
            Error::ShaderCompilation { stage: Some(stage), source, log } => {
                write!(f, "Shader compilation failed ({} stage, '{}'): {}", stage, source, log)
            }
            Error::ShaderCompilation { stage: None, source, log } => {
                write!(f, "Shader program link failed ('{}'): {}", source, log)
            }
            Error::ApplicationState(msg) => write!(f, "Application state error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
