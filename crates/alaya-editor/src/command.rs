//! Command-line mode: the `:` prompt and its grammar.
//!
//! # Commands
//!
//! | Input                     | Command                                   |
//! |---------------------------|-------------------------------------------|
//! | `q` / `q!`                | quit / quit discarding changes            |
//! | `w` / `w!`                | write the current buffer                  |
//! | `wq` / `wq!`              | write and quit / quit even if write fails |
//! | `wa` / `wa!`              | write every unsaved buffer                |
//! | `next` `n` (`!`)          | next file                                 |
//! | `prev` `p` (`!`)          | previous file                             |
//! | `first` / `last` (`!`)    | first / last file                         |
//! | `file`                    | show name, size and saved state           |
//! | `set number` / `nonumber` | toggle the line-number gutter             |
//! | `N` (digits only)         | jump to line N                            |
//! | `s/pat/rep/g`             | replace on the cursor line                |
//! | `%s/pat/rep/g`            | replace on every line                     |
//!
//! A trailing `!` on a navigation or quit command skips the unsaved-changes
//! guard. Everything is case-sensitive and matched literally; there is no
//! abbreviation beyond `n` and `p`.
//!
//! # Substitution grammar
//!
//! ```text
//!   [%] s / pattern / replacement / g
//! ```
//!
//! The pattern runs to the first `/` after `s/` and may not be empty. The
//! replacement is everything between that `/` and the final `/g`, so it may
//! itself contain `/`. The whole command (after `%`) is at least five chars.
//! Both parts are literal text: no escapes, no regular expressions.

use std::fmt;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Which lines a substitution touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `s/.../g`: the cursor line.
    Line,
    /// `%s/.../g`: every line.
    Buffer,
}

/// A recognised command-line command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit { force: bool },
    Write,
    WriteQuit { force: bool },
    WriteAll,
    Next { force: bool },
    Prev { force: bool },
    First { force: bool },
    Last { force: bool },
    FileInfo,
    SetNumber(bool),
    /// 1-indexed. Numbers too large for `usize` saturate, which no buffer
    /// can satisfy.
    JumpTo(usize),
    Substitute {
        scope: Scope,
        pattern: String,
        replacement: String,
    },
}

/// Why an input string is not a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing was typed.
    Empty,
    /// Starts like a substitution but breaks the grammar.
    MalformedSubstitution,
    /// `s//.../g`.
    EmptyPattern,
    /// Anything else.
    Unknown(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::MalformedSubstitution => f.write_str("malformed substitution"),
            Self::EmptyPattern => f.write_str("empty substitution pattern"),
            Self::Unknown(s) => write!(f, "unknown command {s:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// Text typed after `:`. The `:` itself is not stored.
///
/// Editing is append-only: characters go on the end and BACKSPACE takes
/// them off. There is no cursor inside the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    input: String,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Remove the last char. Returns `false` if the line was already empty.
    pub fn pop(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Parse the typed text.
    ///
    /// # Errors
    ///
    /// A [`Rejection`] when the text is not a command.
    pub fn parse(&self) -> Result<Command, Rejection> {
        parse(&self.input)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a command string (without the leading `:`).
///
/// # Errors
///
/// A [`Rejection`] describing why `input` is not a command.
pub fn parse(input: &str) -> Result<Command, Rejection> {
    let cmd = match input {
        "" => return Err(Rejection::Empty),
        "q" => Command::Quit { force: false },
        "q!" => Command::Quit { force: true },
        "w" | "w!" => Command::Write,
        "wq" => Command::WriteQuit { force: false },
        "wq!" => Command::WriteQuit { force: true },
        "wa" | "wa!" => Command::WriteAll,
        "next" | "n" => Command::Next { force: false },
        "next!" | "n!" => Command::Next { force: true },
        "prev" | "p" => Command::Prev { force: false },
        "prev!" | "p!" => Command::Prev { force: true },
        "first" => Command::First { force: false },
        "first!" => Command::First { force: true },
        "last" => Command::Last { force: false },
        "last!" => Command::Last { force: true },
        "file" => Command::FileInfo,
        "set number" => Command::SetNumber(true),
        "set nonumber" => Command::SetNumber(false),
        s if s.bytes().all(|b| b.is_ascii_digit()) => {
            Command::JumpTo(s.parse().unwrap_or(usize::MAX))
        }
        s if s.starts_with("s/") || s.starts_with("%s/") => parse_substitution(s)?,
        s => return Err(Rejection::Unknown(s.to_owned())),
    };
    Ok(cmd)
}

fn parse_substitution(input: &str) -> Result<Command, Rejection> {
    let (scope, body) = match input.strip_prefix('%') {
        Some(rest) => (Scope::Buffer, rest),
        None => (Scope::Line, input),
    };
    let c: Vec<char> = body.chars().collect();
    let len = c.len();
    if len < 5 || c[0] != 's' || c[1] != '/' || c[len - 2] != '/' || c[len - 1] != 'g' {
        return Err(Rejection::MalformedSubstitution);
    }

    let mut i = 2;
    while i + 2 < len && c[i] != '/' {
        i += 1;
    }
    if i + 2 >= len {
        return Err(Rejection::MalformedSubstitution);
    }
    if i == 2 {
        return Err(Rejection::EmptyPattern);
    }

    Ok(Command::Substitute {
        scope,
        pattern: c[2..i].iter().collect(),
        replacement: c[i + 1..len - 2].iter().collect(),
    })
}
