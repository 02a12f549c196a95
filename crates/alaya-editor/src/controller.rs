//! Modal controller: the editor's state machine.
//!
//! Every logical [`Input`] goes through [`ModalController::handle`], which
//! routes it by [`Mode`] to a buffer edit, a cursor move, or the command
//! line, and updates the status prompt. Nothing here is fatal: refused
//! commands become prompts and the controller returns to Normal mode.
//!
//! ```text
//!            i                 :
//!   Insert <---- Normal ----------> Command
//!          ---->        <----------
//!           ESC      ENTER, or BACKSPACE on an empty line
//! ```
//!
//! # Normal mode keys
//!
//! | Key              | Action                                  |
//! |------------------|-----------------------------------------|
//! | `h` `j` `k` `l`  | move left / down / up / right           |
//! | arrows           | move                                    |
//! | `0` / `$`        | line start / last char                  |
//! | `gg` / `G`       | first / last line                       |
//! | `dd`             | delete line                             |
//! | `yy` / `p`       | copy line / paste below                 |
//! | `u` / Ctrl-R     | undo / redo                             |
//! | BACKSPACE        | one char left, wrapping to previous line |
//! | ENTER            | start of next line                      |
//! | `i` / `:`        | Insert / Command mode                   |
//! | ESC              | quit hint                               |

use log::{debug, error, info};

use crate::buffer::ReplaceStats;
use crate::buffer_set::{BufferSet, Switch};
use crate::command::{Command, CommandLine, Rejection, Scope};
use crate::key::{Direction, Input};
use crate::mode::Mode;
use crate::options::Options;
use crate::position::Position;
use crate::prompt::{Prompt, Tone};
use crate::view::DisplayRow;

const QUIT_HINT: &str = "[Hint] Type :q to quit";
const QUIT_WARNING: &str = "[Warning] You should save by :w first, or :wq.";
const SWITCH_WARNING: &str = "[Warning] You should save by :w first. (Or add ! to override)";

/// What the caller should do after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub rows: Vec<DisplayRow>,
    /// Shown on the last row when present.
    pub status: Option<Prompt>,
    /// Screen position of the terminal cursor, gutter included. On the
    /// status row while a command is being typed.
    pub cursor: Position,
}

#[derive(Debug)]
pub struct ModalController {
    buffers: BufferSet,
    options: Options,
    mode: Mode,
    command: CommandLine,
    /// First key of `gg`, `dd` or `yy`.
    pending: Option<char>,
    prompt: Option<Prompt>,
}

impl ModalController {
    #[must_use]
    pub const fn new(buffers: BufferSet, options: Options) -> Self {
        Self {
            buffers,
            options,
            mode: Mode::Normal,
            command: CommandLine::new(),
            pending: None,
            prompt: None,
        }
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    #[must_use]
    pub fn command_line(&self) -> &str {
        self.command.input()
    }

    // -- Dispatch -----------------------------------------------------------

    /// Process one input event.
    pub fn handle(&mut self, input: Input) -> Outcome {
        if self.mode != Mode::Command && self.prompt.as_ref().is_some_and(|p| p.ephemeral) {
            self.prompt = None;
        }
        let pending = self.pending.take();

        match (self.mode, input) {
            (Mode::Normal, Input::Char(ch)) => self.normal_char(ch, pending),
            (Mode::Insert, Input::Char(ch)) => self.buffers.active_mut().insert_char(ch),
            (Mode::Command, Input::Char(ch)) => {
                self.command.push(ch);
                self.show_command_line();
            }

            (Mode::Normal | Mode::Insert, Input::Move(dir)) => {
                self.buffers.active_mut().move_cursor(dir);
            }
            (Mode::Command, Input::Move(_)) => {}

            (Mode::Normal, Input::Esc) => self.prompt = Some(Prompt::hint(QUIT_HINT)),
            (Mode::Insert, Input::Esc) => {
                self.mode = Mode::Normal;
                self.prompt = Some(Prompt::flash(Tone::Normal, format!("[{}]", self.mode)));
            }
            (Mode::Command, Input::Esc) => {}

            (Mode::Normal, Input::Enter) => self.buffers.active_mut().to_next_line(),
            (Mode::Insert, Input::Enter) => self.buffers.active_mut().enter(),
            (Mode::Command, Input::Enter) => return self.run_command(),

            (Mode::Insert, Input::Tab) => {
                let tab = self.options.tab_text();
                self.buffers.active_mut().insert_str(&tab);
            }
            (Mode::Normal | Mode::Command, Input::Tab) => {}

            (Mode::Normal, Input::Backspace) => self.buffers.active_mut().retreat(),
            (Mode::Insert, Input::Backspace) => self.buffers.active_mut().backspace(),
            (Mode::Command, Input::Backspace) => {
                if self.command.pop() {
                    self.show_command_line();
                } else {
                    self.mode = Mode::Normal;
                    self.prompt = None;
                }
            }

            (Mode::Normal, Input::Redo) => self.redo(),
            (Mode::Insert | Mode::Command, Input::Redo) => {}
        }
        Outcome::Continue
    }

    fn normal_char(&mut self, ch: char, pending: Option<char>) {
        let buf = self.buffers.active_mut();
        match ch {
            'h' => buf.move_cursor(Direction::Left),
            'j' => buf.move_cursor(Direction::Down),
            'k' => buf.move_cursor(Direction::Up),
            'l' => buf.move_cursor(Direction::Right),
            '0' => buf.to_line_front(),
            '$' => buf.to_line_end(),
            'G' => buf.to_last_line(),
            'p' => {
                buf.paste_line();
            }
            'u' => self.undo(),
            'i' => {
                self.mode = Mode::Insert;
                self.prompt = Some(Prompt::flash(Tone::Insert, format!("[{}]", self.mode)));
            }
            ':' => {
                self.mode = Mode::Command;
                self.command.clear();
                self.show_command_line();
            }
            'g' | 'd' | 'y' if pending == Some(ch) => match ch {
                'g' => buf.to_first_line(),
                'd' => buf.delete_line(),
                _ => buf.copy_line(),
            },
            'g' | 'd' | 'y' => self.pending = Some(ch),
            _ => {}
        }
    }

    fn undo(&mut self) {
        let text = if self.buffers.active_mut().undo() {
            "Undo finished."
        } else {
            "No more undo."
        };
        self.prompt = Some(Prompt::hint(text));
    }

    fn redo(&mut self) {
        let text = if self.buffers.active_mut().redo() {
            "Redo finished."
        } else {
            "No more redo."
        };
        self.prompt = Some(Prompt::hint(text));
    }

    fn show_command_line(&mut self) {
        self.prompt = Some(Prompt::sticky(
            Tone::Hint,
            format!(":{}", self.command.input()),
        ));
    }

    // -- Commands -----------------------------------------------------------

    fn run_command(&mut self) -> Outcome {
        self.mode = Mode::Normal;
        self.prompt = None;
        let parsed = self.command.parse();
        self.command.clear();
        match parsed {
            Ok(cmd) => {
                debug!("command: {cmd:?}");
                self.execute(cmd)
            }
            Err(Rejection::Empty) => Outcome::Continue,
            Err(rejection) => {
                info!("rejected command: {rejection}");
                self.prompt = Some(Prompt::hint("Invalid Command."));
                Outcome::Continue
            }
        }
    }

    fn execute(&mut self, cmd: Command) -> Outcome {
        match cmd {
            Command::Quit { force } => {
                if force || self.buffers.active().is_saved() {
                    return Outcome::Quit;
                }
                self.prompt = Some(Prompt::sticky(Tone::Hint, QUIT_WARNING));
            }
            Command::Write => {
                self.write_active();
            }
            Command::WriteQuit { force } => {
                if self.write_active() || force {
                    return Outcome::Quit;
                }
            }
            Command::WriteAll => {
                self.write_all();
            }
            Command::Next { force } => {
                let s = self.buffers.next(force);
                self.report_switch(s);
            }
            Command::Prev { force } => {
                let s = self.buffers.prev(force);
                self.report_switch(s);
            }
            Command::First { force } => {
                let s = self.buffers.first(force);
                self.report_switch(s);
            }
            Command::Last { force } => {
                let s = self.buffers.last(force);
                self.report_switch(s);
            }
            Command::FileInfo => self.prompt = Some(Prompt::hint(self.file_info())),
            Command::SetNumber(on) => self.options.number = on,
            Command::JumpTo(line) => {
                if !self.buffers.active_mut().jump_to(line) {
                    self.prompt = Some(Prompt::hint("Invalid Line Number."));
                }
            }
            Command::Substitute {
                scope,
                pattern,
                replacement,
            } => {
                let buf = self.buffers.active_mut();
                let stats = match scope {
                    Scope::Line => buf.replace_in_line(&pattern, &replacement),
                    Scope::Buffer => buf.replace_across_buffer(&pattern, &replacement),
                };
                self.prompt = Some(Prompt::hint(substitution_report(stats)));
            }
        }
        Outcome::Continue
    }

    /// Save the active buffer and report. Returns whether it was written.
    fn write_active(&mut self) -> bool {
        let buf = self.buffers.active_mut();
        match buf.save() {
            Ok(()) => {
                let name = buf.path().display().to_string();
                info!("saved {name}");
                self.prompt = Some(Prompt::hint(format!("[Saved {name}]")));
                true
            }
            Err(e) => {
                error!("{e}");
                self.prompt = Some(Prompt::flash(Tone::Error, format!("[Error] {e}")));
                false
            }
        }
    }

    /// Save every unsaved buffer and report.
    fn write_all(&mut self) {
        let report = self.buffers.save_all();
        if report.failed.is_empty() {
            self.prompt = Some(Prompt::hint(format!(
                "[Saved all {} files ({} modified)]",
                self.buffers.len(),
                report.written
            )));
        } else {
            self.prompt = Some(Prompt::flash(
                Tone::Error,
                format!("[Error] Could not write {} file(s)", report.failed.len()),
            ));
        }
    }

    fn report_switch(&mut self, switch: Switch) {
        self.prompt = Some(match switch {
            Switch::Opened => Prompt::hint(format!(
                "[Opened {}]",
                self.buffers.active().path().display()
            )),
            Switch::Unsaved => Prompt::sticky(Tone::Hint, SWITCH_WARNING),
            Switch::NoNext => Prompt::hint("No next file."),
            Switch::NoPrevious => Prompt::hint("No previous file."),
            Switch::AlreadyFirst => Prompt::hint("Already at the first file."),
            Switch::AlreadyLast => Prompt::hint("Already at the last file."),
        });
    }

    /// `name [N lines] [B bytes] [Saved]`.
    fn file_info(&self) -> String {
        let buf = self.buffers.active();
        format!(
            "{} [{} lines] [{} bytes] [{}]",
            buf.path().display(),
            buf.line_count(),
            buf.byte_len(),
            if buf.is_saved() { "Saved" } else { "Not Saved" }
        )
    }

    // -- Display ------------------------------------------------------------

    /// Lay out the active buffer and the status line.
    pub fn screen(&mut self) -> Screen {
        let status = self.prompt.clone().filter(|p| !p.text.is_empty());
        let numbered = self.options.number;
        let buf = self.buffers.active_mut();
        let rendered = buf.render(numbered, status.is_some());

        let cursor = if self.mode == Mode::Command {
            let status_row = buf.size().rows.saturating_sub(1);
            Position::new(status_row, 1 + self.command.input().chars().count())
        } else {
            rendered.cursor
        };
        Screen {
            rows: rendered.rows,
            status,
            cursor,
        }
    }
}

fn substitution_report(stats: ReplaceStats) -> String {
    if stats.occurrences == 0 {
        "Pattern not found.".to_owned()
    } else {
        format!(
            "Replaced {} occurrence(s) in {} line(s).",
            stats.occurrences, stats.lines
        )
    }
}
