/// Input module - key state, pointer / scroll deltas and winit translation

pub mod types;
pub mod input_manager;
pub mod winit_input;

pub use types::{InputEvent, InputHandler, InputSource, Key};
pub use input_manager::InputManager;
pub use winit_input::{translate_device_event, translate_key_code, translate_window_event};
