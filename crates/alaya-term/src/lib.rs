// SPDX-License-Identifier: MIT
//
// alaya-term: the terminal side of alaya.
//
// Raw mode and the alternate screen, a byte-to-key decoder, a stdin reader
// thread, and a frame painter that redraws the whole screen in one write.
// Direct termios and ANSI output; no TUI framework underneath.

pub mod ansi;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
