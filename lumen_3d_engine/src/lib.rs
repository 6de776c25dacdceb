/*!
# Lumen 3D Engine

A small immediate-mode 3D rendering framework: a single-threaded frame loop
drives a fly camera, a path-keyed content cache and thin owning wrappers
around GPU objects (vertex buffers and arrays, shader programs, textures).

## Architecture

- **GraphicsDevice**: raw immediate-mode GPU interface (backend seam)
- **Gpu**: shared device context tracking the active program, vertex array
  and texture units; binds happen through scoped guards
- **Resources**: `VertexBuffer`, `VertexArray`, `ShaderProgram`, `Texture`, `Model`
- **ContentManager**: loads each shader / model / texture once per path
- **Camera3D**: WASD + pointer fly camera producing view / projection matrices
- **Application**: lifecycle and frame loop around a `Scene`, rendering into a `Surface`

`HeadlessGraphicsDevice` and `HeadlessSurface` run the whole stack without a
window or GPU, which is how the test suite drives it.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod graphics_device;
pub mod resource;
pub mod content;
pub mod camera;
pub mod input;
pub mod platform;
pub mod app;

#[cfg(test)]
mod test_support;

// Main lumen3d namespace module
pub mod lumen3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{ApplicationConfig, CameraSettings};

    // Application loop
    pub use crate::app::{Application, ApplicationState, FrameClock, FrameContext, FrameTime, Scene};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Device sub-module
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Content cache sub-module
    pub mod content {
        pub use crate::content::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Input sub-module
    pub mod input {
        pub use crate::input::*;
    }

    // Platform sub-module
    pub mod platform {
        pub use crate::platform::*;
    }
}

// Re-export math library at crate root
pub use glam;
