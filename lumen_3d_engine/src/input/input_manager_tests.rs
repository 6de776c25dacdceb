/// Tests for InputManager

use super::*;

fn moved(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMoved { x, y }
}

#[test]
fn test_key_state_follows_events() {
    let mut input = InputManager::new();
    assert!(!input.is_key_down(Key::W));

    input.handle_event(InputEvent::Key { key: Key::W, pressed: true });
    assert!(input.is_key_down(Key::W));

    // Held keys survive the per-frame reset
    input.reset_state();
    assert!(input.is_key_down(Key::W));

    input.handle_event(InputEvent::Key { key: Key::W, pressed: false });
    assert!(!input.is_key_down(Key::W));
}

#[test]
fn test_first_pointer_position_gives_no_delta() {
    let mut input = InputManager::new();
    input.handle_event(moved(400.0, 300.0));
    assert_eq!(input.pointer_delta(), Vec2::ZERO);

    input.handle_event(moved(410.0, 295.0));
    assert_eq!(input.pointer_delta(), Vec2::new(10.0, -5.0));
}

#[test]
fn test_deltas_accumulate_until_reset() {
    let mut input = InputManager::new();
    input.handle_event(moved(0.0, 0.0));
    input.handle_event(moved(3.0, 1.0));
    input.handle_event(moved(5.0, 4.0));
    input.handle_event(InputEvent::Scroll { delta: 1.0 });
    input.handle_event(InputEvent::Scroll { delta: 0.5 });

    assert_eq!(input.pointer_delta(), Vec2::new(5.0, 4.0));
    assert_eq!(input.scroll_delta(), 1.5);

    input.reset_state();
    assert_eq!(input.pointer_delta(), Vec2::ZERO);
    assert_eq!(input.scroll_delta(), 0.0);

    // Position is kept, so the next move is relative to (5, 4)
    input.handle_event(moved(6.0, 4.0));
    assert_eq!(input.pointer_delta(), Vec2::new(1.0, 0.0));
}

#[test]
fn test_relative_motion_needs_no_prior_position() {
    let mut input = InputManager::new();
    input.handle_event(InputEvent::PointerMotion { dx: 4.0, dy: -2.0 });
    input.handle_event(InputEvent::PointerMotion { dx: 1.5, dy: 0.5 });

    assert_eq!(input.pointer_delta(), Vec2::new(5.5, -1.5));
    assert_eq!(input.pointer_position(), None);

    input.reset_state();
    assert_eq!(input.pointer_delta(), Vec2::ZERO);
}

#[test]
fn test_relative_motion_continues_past_window_edge() {
    let mut input = InputManager::new();
    // Cursor pinned at the right edge: absolute moves stop changing
    input.handle_event(moved(799.0, 300.0));
    input.handle_event(moved(799.0, 300.0));
    input.handle_event(InputEvent::PointerMotion { dx: 30.0, dy: 0.0 });

    assert_eq!(input.pointer_delta(), Vec2::new(30.0, 0.0));
}

#[test]
fn test_reset_pointer_swallows_next_jump() {
    let mut input = InputManager::new();
    input.handle_event(moved(10.0, 10.0));
    input.reset_pointer();
    input.handle_event(moved(500.0, 500.0));

    assert_eq!(input.pointer_delta(), Vec2::ZERO);
    assert_eq!(input.pointer_position(), Some(Vec2::new(500.0, 500.0)));
}

#[test]
fn test_focus_lost_releases_keys() {
    let mut input = InputManager::new();
    input.handle_event(InputEvent::Key { key: Key::A, pressed: true });
    input.handle_event(InputEvent::Key { key: Key::LeftShift, pressed: true });
    input.handle_event(moved(1.0, 1.0));

    input.handle_event(InputEvent::FocusLost);

    assert_eq!(input.keys_down().count(), 0);
    assert_eq!(input.pointer_position(), None);
}
