use glam::Vec2;

/// Keys the sandbox reacts to. Everything else arrives as [`KeyInput::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    Enter,
    Escape,
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
    Other,
}

impl KeyInput {
    /// Maps a logical key name as produced by a keyboard layout.
    ///
    /// Single-character names become [`KeyInput::Char`]; multi-character text such as
    /// dead-key compositions is ignored.
    pub fn from_text(text: &str) -> Self {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_control() => KeyInput::Char(ch),
            _ => KeyInput::Other,
        }
    }
}

/// Discrete input drained by the session at tick boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { screen_px: Vec2 },
    PointerClicked { screen_px: Vec2 },
    KeyPressed(KeyInput),
}
