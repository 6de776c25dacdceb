/// Content module - path-keyed cache of shaders, models and textures

pub mod content_manager;

pub use content_manager::{ContentManager, ContentStats};
