#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Run,
    Jump,
    Down,
    Left,
    Right,
}

const BUTTON_COUNT: usize = 5;

impl Button {
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Run,
        Button::Jump,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    const fn index(self) -> usize {
        match self {
            Button::Run => 0,
            Button::Jump => 1,
            Button::Down => 2,
            Button::Left => 3,
            Button::Right => 4,
        }
    }
}

/// Debounced logical button state. Raw key decoding happens upstream.
pub trait InputState {
    fn is_down(&self, button: Button) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonStates {
    down: [bool; BUTTON_COUNT],
}

impl ButtonStates {
    pub fn set(&mut self, button: Button, is_down: bool) {
        self.down[button.index()] = is_down;
    }

    pub fn with_down(mut self, button: Button) -> Self {
        self.set(button, true);
        self
    }

    pub fn reset(&mut self) {
        self.down = [false; BUTTON_COUNT];
    }

    pub fn any_down(&self) -> bool {
        self.down.iter().any(|down| *down)
    }
}

impl InputState for ButtonStates {
    fn is_down(&self, button: Button) -> bool {
        self.down[button.index()]
    }
}
