//! Status-line prompt.
//!
//! The bottom row of the screen shows at most one [`Prompt`]. Most prompts
//! are *ephemeral*: they vanish on the next key press outside Command mode.
//! The command line itself and unsaved-changes warnings persist until
//! something replaces them.

/// How a prompt should be coloured. The terminal layer picks the actual
/// colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Command line, hints, reports and warnings.
    Hint,
    /// `[INSERT]`.
    Insert,
    /// `[NORMAL]`.
    Normal,
    /// Failed writes.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub tone: Tone,
    pub ephemeral: bool,
}

impl Prompt {
    /// A prompt cleared by the next key.
    #[must_use]
    pub fn flash(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone,
            ephemeral: true,
        }
    }

    /// A prompt that stays until replaced.
    #[must_use]
    pub fn sticky(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone,
            ephemeral: false,
        }
    }

    /// Hint-coloured flash, the common case.
    #[must_use]
    pub fn hint(text: impl Into<String>) -> Self {
        Self::flash(Tone::Hint, text)
    }
}
