//! Shared helpers for unit tests

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::graphics_device::{Gpu, HeadlessGraphicsDevice};
use crate::log::{LogEntry, LogSeverity, Logger};

/// Logger that records every entry for later inspection
#[derive(Clone, Default)]
pub struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages_at(&self, severity: LogSeverity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message)
            .collect()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Fresh headless GPU context
pub fn headless_gpu() -> Gpu {
    Gpu::new(HeadlessGraphicsDevice::new())
}

/// Minimal vertex shader declaring the usual transform uniforms
pub const VERTEX_SRC: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aNormal;
out vec3 Normal;
uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;
uniform mat3 normal;
void main()
{
    Normal = normal * aNormal;
    gl_Position = projection * view * model * vec4(aPos, 1.0);
}
";

/// Fragment shader with a struct uniform, a sampler and one unused uniform
pub const FRAGMENT_SRC: &str = "#version 330 core
out vec4 FragColor;
in vec3 Normal;
struct Light {
    vec3 position;
    vec3 diffuse;
};
uniform Light light;
uniform float shininess;
uniform int useTexture;
uniform sampler2D boxTexture;
uniform vec3 unusedTint; // never read, stripped by the compiler
void main()
{
    vec3 color = light.diffuse * shininess + light.position * 0.0 + Normal * 0.0;
    if (useTexture == 1)
        color = color * texture(boxTexture, vec2(0.5)).rgb;
    FragColor = vec4(color, 1.0);
}
";

/// Unique scratch directory under the system temp dir
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "lumen3d_unit_{}_{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
