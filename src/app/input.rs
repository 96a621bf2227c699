use glam::Vec2;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Paints while held.
    Left,
    /// Zooms the camera while dragging.
    Right,
}

/// Polled input, sampled once per frame by the app.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pointer: Vec2,
    left: bool,
    right: bool,
    held_keys: FxHashSet<char>,
}

impl InputState {
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Records the new position and returns the movement since the last one.
    pub fn move_pointer(&mut self, position: Vec2) -> Vec2 {
        let delta = position - self.pointer;
        self.pointer = position;
        delta
    }

    pub fn set_button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Left => self.left = pressed,
            PointerButton::Right => self.right = pressed,
        }
    }

    pub fn is_pressed(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Left => self.left,
            PointerButton::Right => self.right,
        }
    }

    pub fn key_down(&mut self, key: char) {
        self.held_keys.insert(key.to_ascii_lowercase());
    }

    pub fn key_up(&mut self, key: char) {
        self.held_keys.remove(&key.to_ascii_lowercase());
    }

    pub fn is_key_held(&self, key: char) -> bool {
        self.held_keys.contains(&key.to_ascii_lowercase())
    }

    /// WASD as a map-space direction: x right, y forward.
    pub fn pan_direction(&self) -> Vec2 {
        let axis = |negative: char, positive: char| {
            (self.is_key_held(positive) as i32 - self.is_key_held(negative) as i32) as f32
        };
        Vec2::new(axis('a', 'd'), axis('s', 'w'))
    }
}
