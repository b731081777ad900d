use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::sim::{Button, ButtonStates};

/// Keyboard decoder feeding the simulation's logical buttons.
///
/// Held state only; the simulation reads it once per tick.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    buttons: ButtonStates,
    quit_requested: bool,
}

impl InputCollector {
    pub(crate) fn buttons(&self) -> &ButtonStates {
        &self.buttons
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_from_physical_key(key_event.physical_key, is_pressed);
    }

    /// Keys released while the window is unfocused never arrive, so
    /// everything is treated as released.
    pub(crate) fn handle_focus_lost(&mut self) {
        self.buttons.reset();
    }

    fn update_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        if let Some(button) = button_for_key(key) {
            self.buttons.set(button, is_pressed);
        } else if key == PhysicalKey::Code(KeyCode::Escape) && is_pressed {
            self.mark_quit_requested();
        }
    }
}

fn button_for_key(key: PhysicalKey) -> Option<Button> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::ArrowLeft => Some(Button::Left),
        KeyCode::ArrowRight => Some(Button::Right),
        KeyCode::ArrowDown => Some(Button::Down),
        KeyCode::KeyJ | KeyCode::KeyX => Some(Button::Jump),
        KeyCode::KeyZ => Some(Button::Run),
        _ => None,
    }
}
