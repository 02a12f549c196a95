//! Logical input events.
//!
//! The controller never sees raw bytes or terminal key codes. The binary
//! translates whatever the terminal layer decodes into one of these.

pub use crate::buffer::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    /// A printable character.
    Char(char),
    /// Arrow key.
    Move(Direction),
    Esc,
    Enter,
    Tab,
    Backspace,
    /// Ctrl-R.
    Redo,
}

impl Input {
    /// Every char of `s` as a [`Input::Char`].
    pub fn text(s: &str) -> impl Iterator<Item = Self> + '_ {
        s.chars().map(Self::Char)
    }
}
