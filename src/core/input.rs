use std::collections::HashSet;

use glam::Vec2;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Keyboard and cursor state seen by the application during a frame
#[derive(Debug, Default)]
pub struct Input {
    held_keys: HashSet<KeyCode>,
    cursor_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    /// Cursor motion accumulated since the previous frame, in device units
    #[inline(always)]
    pub fn cursor_delta(&self) -> Vec2 {
        self.cursor_delta
    }

    pub fn on_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held_keys.insert(key);
            }
            ElementState::Released => {
                self.held_keys.remove(&key);
            }
        }
    }

    pub fn on_cursor_motion(&mut self, dx: f64, dy: f64) {
        self.cursor_delta += Vec2::new(dx as f32, dy as f32);
    }

    /// Called once the frame consumed the cursor motion
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
    }

    /// Drop every held key, used when the window loses focus
    pub fn release_all(&mut self) {
        self.held_keys.clear();
    }
}
