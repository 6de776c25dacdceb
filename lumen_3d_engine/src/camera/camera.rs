/// Camera3D - fly camera driven by keys, pointer deltas and scroll
///
/// - W / S: move along front
/// - A / D: strafe along right
/// - Space / LeftControl: move along the camera up vector
/// - Pointer: yaw / pitch (moving the pointer down pitches down)
/// - Scroll: zoom (field of view), scrolling away from the user zooms in
///
/// Pitch stays strictly inside the configured limit (89 degrees by default)
/// so the front vector never becomes parallel to world up. Exactly vertical
/// views are not reachable.

use glam::{Mat4, Vec3};

use crate::config::CameraSettings;
use crate::input::{InputSource, Key};

/// Distance in degrees kept between the pitch and its limit
const PITCH_MARGIN: f32 = 1.0e-3;

/// Clamp a pitch into the open interval (-limit, limit)
fn clamp_pitch(pitch: f32, limit: f32) -> f32 {
    let bound = (limit - PITCH_MARGIN).max(0.0);
    pitch.clamp(-bound, bound)
}

#[derive(Debug, Clone)]
pub struct Camera3D {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    settings: CameraSettings,
}

impl Camera3D {
    /// Create a camera from its settings
    ///
    /// Start pitch and zoom are clamped like any later update.
    pub fn new(settings: CameraSettings) -> Self {
        let mut camera = Self {
            position: settings.position,
            front: Vec3::NEG_Z,
            up: settings.world_up,
            right: Vec3::X,
            yaw: settings.yaw,
            pitch: clamp_pitch(settings.pitch, settings.pitch_limit),
            zoom: settings.zoom.clamp(settings.min_zoom, settings.max_zoom),
            settings,
        };
        camera.update_vectors();
        camera
    }

    // ===== UPDATE =====

    /// Apply one frame of input
    ///
    /// Movement scales with `delta_time`; pointer and scroll deltas do not,
    /// so a zero delta still turns and zooms the camera.
    pub fn update(&mut self, delta_time: f32, input: &dyn InputSource) {
        self.process_movement(delta_time, input);

        let pointer = input.pointer_delta();
        if pointer.x != 0.0 || pointer.y != 0.0 {
            self.process_pointer(pointer.x, pointer.y);
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            self.process_scroll(scroll);
        }
    }

    /// Move along the camera basis for every held movement key
    pub fn process_movement(&mut self, delta_time: f32, input: &dyn InputSource) {
        let velocity = self.settings.speed * delta_time;

        if input.is_key_down(Key::W) {
            self.position += self.front * velocity;
        }
        if input.is_key_down(Key::S) {
            self.position -= self.front * velocity;
        }
        if input.is_key_down(Key::A) {
            self.position -= self.right * velocity;
        }
        if input.is_key_down(Key::D) {
            self.position += self.right * velocity;
        }
        if input.is_key_down(Key::Space) {
            self.position += self.up * velocity;
        }
        if input.is_key_down(Key::LeftControl) {
            self.position -= self.up * velocity;
        }
    }

    /// Turn by a pointer delta in pixels (x right, y down)
    pub fn process_pointer(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.settings.sensitivity;
        self.pitch = clamp_pitch(self.pitch - dy * self.settings.sensitivity, self.settings.pitch_limit);
        self.update_vectors();
    }

    /// Zoom by a scroll amount
    pub fn process_scroll(&mut self, delta: f32) {
        self.zoom = (self.zoom - delta).clamp(self.settings.min_zoom, self.settings.max_zoom);
    }

    /// Recompute front / right / up from yaw and pitch
    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.settings.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    // ===== MATRICES =====

    /// World-to-view transform, recomputed on every call
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with the current zoom as vertical field of view
    pub fn projection_matrix(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.zoom.to_radians(), aspect_ratio, near, far)
    }

    // ===== ACCESSORS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Yaw in degrees (unbounded)
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }
}

impl Default for Camera3D {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
