use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, PointerMoveEvent};

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels; `None` once the pointer leaves.
    pub pointer_pos: Option<(f32, f32)>,

    /// Last known pointer position, kept after the pointer leaves the window.
    pub last_pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an input event to the current state and records deltas into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
                self.last_pointer_pos = Some((*x, *y));
                frame.pointer_moved = true;
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, repeat } => match state {
                KeyState::Pressed => {
                    let inserted = self.keys_down.insert(*key);
                    if inserted && !*repeat {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
