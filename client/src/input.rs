//! Keyboard sampling through macroquad.

use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};
use shared::InputSource;

/// Maps an input symbol onto the key that produces it.
pub fn key_for(symbol: u8) -> Option<KeyCode> {
    match symbol.to_ascii_uppercase() {
        b'W' => Some(KeyCode::W),
        b'A' => Some(KeyCode::A),
        b'S' => Some(KeyCode::S),
        b'D' => Some(KeyCode::D),
        b'R' => Some(KeyCode::R),
        _ => None,
    }
}

/// Reads the live keyboard state. Only meaningful inside the macroquad
/// window loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyboardInput;

impl KeyboardInput {
    pub fn new() -> Self {
        Self
    }

    /// Restart the solo game
    pub fn restart_requested(&self) -> bool {
        is_key_pressed(KeyCode::R)
    }

    pub fn quit_requested(&self) -> bool {
        is_key_pressed(KeyCode::Escape)
    }
}

impl InputSource for KeyboardInput {
    fn is_pressed(&self, symbol: u8) -> bool {
        key_for(symbol).map(is_key_down).unwrap_or(false)
    }
}
