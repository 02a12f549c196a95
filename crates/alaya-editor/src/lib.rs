//! # alaya-editor: buffer engine for alaya
//!
//! Everything between a logical key press and the rows painted on screen,
//! with no dependency on the terminal:
//!
//! - **[`edit_log`]**: reversible timestamped changes, undo/redo with
//!   500 ms coalescing
//! - **[`buffer`]**: `TextBuffer`, one file's lines, cursor and log
//! - **[`substitute`]**: literal `s/pattern/replacement/g` on a line
//! - **[`view`]**: line wrapping, gutter, scroll offset
//! - **[`command`]**: the `:` command grammar
//! - **[`controller`]**: Normal / Insert / Command state machine
//! - **[`buffer_set`]**: open files, switching, save-all
//!
//! The terminal layer lives in `alaya-term`; the binary translates its key
//! events into [`key::Input`] and paints [`controller::Screen`]s.

pub mod buffer;
pub mod buffer_set;
pub mod clock;
pub mod command;
pub mod controller;
pub mod edit_log;
pub mod error;
pub mod key;
pub mod mode;
pub mod options;
pub mod position;
pub mod prompt;
pub mod register;
pub mod substitute;
pub mod view;
