use lapse_types::capture::{DateKey, Step};

/// Keys the viewer reacts to, independent of any terminal or browser API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Left,
    Right,
    Up,
    Down,
    Char(char),
}

/// Discrete navigation inputs accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavInput {
    SelectIndex(usize),
    StepImage(Step),
    StepDay(Step),
    JumpToDate(DateKey),
    OpenDatePicker,
}

impl NavInput {
    /// Left/right step images, up/down step days, `d` opens the date picker.
    pub fn from_key(key: KeyPress) -> Option<Self> {
        match key {
            KeyPress::Left => Some(NavInput::StepImage(Step::Previous)),
            KeyPress::Right => Some(NavInput::StepImage(Step::Next)),
            KeyPress::Up => Some(NavInput::StepDay(Step::Previous)),
            KeyPress::Down => Some(NavInput::StepDay(Step::Next)),
            KeyPress::Char('d' | 'D') => Some(NavInput::OpenDatePicker),
            KeyPress::Char(_) => None,
        }
    }
}
