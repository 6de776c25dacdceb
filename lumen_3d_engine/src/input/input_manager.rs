/// InputManager - key state plus per-frame pointer and scroll accumulation
///
/// Key state persists across frames. Pointer and scroll deltas accumulate
/// from every event received since the last [`InputManager::reset_state`],
/// which the application loop calls once per frame after `update`.

use glam::Vec2;
use rustc_hash::FxHashSet;

use crate::engine_trace;
use crate::input::{InputEvent, InputHandler, InputSource, Key};

const SOURCE: &str = "lumen3d::InputManager";

#[derive(Debug, Default)]
pub struct InputManager {
    keys_down: FxHashSet<Key>,
    last_pointer: Option<Vec2>,
    pointer_delta: Vec2,
    scroll_delta: f32,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the one-shot deltas (keys stay down)
    pub fn reset_state(&mut self) {
        self.pointer_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Forget the last pointer position; the next move yields no delta
    pub fn reset_pointer(&mut self) {
        self.last_pointer = None;
    }

    /// Currently held keys
    pub fn keys_down(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_down.iter().copied()
    }

    /// Last known pointer position
    pub fn pointer_position(&self) -> Option<Vec2> {
        self.last_pointer
    }
}

impl InputHandler for InputManager {
    fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { key, pressed: true } => {
                if self.keys_down.insert(key) {
                    engine_trace!(SOURCE, "Key down: {:?}", key);
                }
            }
            InputEvent::Key { key, pressed: false } => {
                if self.keys_down.remove(&key) {
                    engine_trace!(SOURCE, "Key up: {:?}", key);
                }
            }
            InputEvent::PointerMoved { x, y } => {
                let position = Vec2::new(x, y);
                if let Some(last) = self.last_pointer {
                    self.pointer_delta += position - last;
                }
                self.last_pointer = Some(position);
            }
            InputEvent::PointerMotion { dx, dy } => {
                self.pointer_delta += Vec2::new(dx, dy);
            }
            InputEvent::Scroll { delta } => {
                self.scroll_delta += delta;
            }
            InputEvent::FocusLost => {
                // Releases are not delivered while unfocused
                self.keys_down.clear();
                self.last_pointer = None;
            }
        }
    }
}

impl InputSource for InputManager {
    fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

#[cfg(test)]
#[path = "input_manager_tests.rs"]
mod tests;
