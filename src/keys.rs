//! Key classification.
//!
//! Keys are identified by their legacy DOM key codes so hosts that only have a
//! numeric code can still drive the controller; terminal front ends build
//! [`Key`] values directly.

pub const TAB: u32 = 9;
pub const ENTER: u32 = 13;
pub const ESC: u32 = 27;
pub const SPACE: u32 = 32;
pub const LEFT: u32 = 37;
pub const UP: u32 = 38;
pub const RIGHT: u32 = 39;
pub const DOWN: u32 = 40;
pub const SHIFT: u32 = 16;
pub const CTRL: u32 = 17;
pub const ALT: u32 = 18;
pub const PAGE_UP: u32 = 33;
pub const PAGE_DOWN: u32 = 34;
pub const HOME: u32 = 36;
pub const END: u32 = 35;
pub const BACKSPACE: u32 = 8;
pub const DELETE: u32 = 46;
pub const COMMAND: u32 = 91;
const F1: u32 = 112;
const F12: u32 = 123;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Esc,
    Space,
    Left,
    Up,
    Right,
    Down,
    Shift,
    Ctrl,
    Alt,
    PageUp,
    PageDown,
    Home,
    End,
    Backspace,
    Delete,
    Command,
    /// F1..=F12.
    Function(u8),
    /// A printable character.
    Char(char),
    Other(u32),
}

impl Key {
    pub fn from_code(code: u32) -> Key {
        match code {
            TAB => Key::Tab,
            ENTER => Key::Enter,
            ESC => Key::Esc,
            SPACE => Key::Space,
            LEFT => Key::Left,
            UP => Key::Up,
            RIGHT => Key::Right,
            DOWN => Key::Down,
            SHIFT => Key::Shift,
            CTRL => Key::Ctrl,
            ALT => Key::Alt,
            PAGE_UP => Key::PageUp,
            PAGE_DOWN => Key::PageDown,
            HOME => Key::Home,
            END => Key::End,
            BACKSPACE => Key::Backspace,
            DELETE => Key::Delete,
            COMMAND => Key::Command,
            F1..=F12 => Key::Function((code - F1 + 1) as u8),
            other => Key::Other(other),
        }
    }

    /// Numeric key code; printable characters report their uppercase code point.
    pub fn code(self) -> u32 {
        match self {
            Key::Tab => TAB,
            Key::Enter => ENTER,
            Key::Esc => ESC,
            Key::Space => SPACE,
            Key::Left => LEFT,
            Key::Up => UP,
            Key::Right => RIGHT,
            Key::Down => DOWN,
            Key::Shift => SHIFT,
            Key::Ctrl => CTRL,
            Key::Alt => ALT,
            Key::PageUp => PAGE_UP,
            Key::PageDown => PAGE_DOWN,
            Key::Home => HOME,
            Key::End => END,
            Key::Backspace => BACKSPACE,
            Key::Delete => DELETE,
            Key::Command => COMMAND,
            Key::Function(n) => F1 + u32::from(n) - 1,
            Key::Char(c) => c.to_ascii_uppercase() as u32,
            Key::Other(code) => code,
        }
    }

    pub fn is_function_key(self) -> bool {
        matches!(self, Key::Function(1..=12))
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Key::Up | Key::Down)
    }

    /// Keys that move between tokens in multiple mode.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Key::Left | Key::Right | Key::Backspace | Key::Delete)
    }
}

/// A key press plus the one modifier the controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Command/meta held.
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        KeyEvent { key, meta: false }
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_control(&self) -> bool {
        self.meta || matches!(self.key, Key::Command | Key::Shift | Key::Ctrl | Key::Alt)
    }

    pub fn is_function_key(&self) -> bool {
        self.key.is_function_key()
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        KeyEvent::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_both_ways() {
        for code in [8, 9, 13, 16, 17, 18, 27, 32, 33, 34, 35, 36, 37, 38, 39, 40, 46, 91, 112, 123] {
            assert_eq!(Key::from_code(code).code(), code, "{code}");
        }
        assert_eq!(Key::from_code(113), Key::Function(2));
        assert_eq!(Key::from_code(65), Key::Other(65));
        assert_eq!(Key::Char('a').code(), 65);
    }

    #[test]
    fn classification() {
        assert!(Key::Up.is_vertical() && Key::Down.is_vertical());
        assert!(!Key::Left.is_vertical());
        for k in [Key::Left, Key::Right, Key::Backspace, Key::Delete] {
            assert!(k.is_horizontal());
        }
        assert!(!Key::Tab.is_horizontal());
        assert!(Key::from_code(112).is_function_key());
        assert!(!Key::from_code(124).is_function_key());
    }

    #[test]
    fn control_includes_meta_modifier() {
        assert!(KeyEvent::new(Key::Shift).is_control());
        assert!(KeyEvent::new(Key::Char('x')).with_meta(true).is_control());
        assert!(!KeyEvent::new(Key::Char('x')).is_control());
    }
}
