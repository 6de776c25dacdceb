/// Camera module - fly camera and its view / projection transforms

pub mod camera;

pub use camera::Camera3D;
pub use crate::config::CameraSettings;
