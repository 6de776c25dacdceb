/// Application and camera configuration

use std::path::PathBuf;
use glam::Vec3;

use crate::graphics_device::TextureParams;
use crate::log::LogSeverity;

/// Fly camera configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Start position
    pub position: Vec3,
    /// World up axis
    pub world_up: Vec3,
    /// Start yaw in degrees (-90 looks down -Z)
    pub yaw: f32,
    /// Start pitch in degrees
    pub pitch: f32,
    /// Start vertical field of view in degrees
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Pitch is kept within [-pitch_limit, pitch_limit] degrees
    pub pitch_limit: f32,
    /// Movement speed in units per second
    pub speed: f32,
    /// Degrees of rotation per pixel of pointer movement
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            zoom: 45.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
            pitch_limit: 89.0,
            speed: 2.5,
            sensitivity: 0.1,
        }
    }
}

impl CameraSettings {
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    /// Window title
    pub title: String,
    /// Initial surface width in pixels
    pub width: u32,
    /// Initial surface height in pixels
    pub height: u32,
    /// Directory content paths are resolved against
    pub content_root: PathBuf,
    /// Projection near plane
    pub near: f32,
    /// Projection far plane
    pub far: f32,
    /// Flip decoded images so row 0 is the bottom row
    pub flip_textures: bool,
    /// Sampling parameters for textures loaded through the content cache
    pub texture_params: TextureParams,
    /// Minimum severity printed by the default logger
    pub log_severity: LogSeverity,
    pub camera: CameraSettings,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            title: "Lumen3D".to_string(),
            width: 800,
            height: 600,
            content_root: PathBuf::from("Content"),
            near: 0.1,
            far: 100.0,
            flip_textures: true,
            texture_params: TextureParams::default(),
            log_severity: LogSeverity::Info,
            camera: CameraSettings::default(),
        }
    }
}

impl ApplicationConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn with_flip_textures(mut self, flip: bool) -> Self {
        self.flip_textures = flip;
        self
    }

    pub fn with_texture_params(mut self, params: TextureParams) -> Self {
        self.texture_params = params;
        self
    }

    pub fn with_log_severity(mut self, severity: LogSeverity) -> Self {
        self.log_severity = severity;
        self
    }

    pub fn with_camera(mut self, camera: CameraSettings) -> Self {
        self.camera = camera;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
