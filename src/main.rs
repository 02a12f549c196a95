// SPDX-License-Identifier: MIT
//
// alaya: a small modal terminal text editor.
//
// This binary wires the two crates together:
//
//   alaya-term   → raw mode, key decoding, frame painting, event loop
//   alaya-editor → buffers, edit log, viewport, command line, modes
//
// `Editor` implements alaya-term's `App`. Each key flows through:
//
//   stdin → decoder → on_key → Input → ModalController::handle
//   paint → ModalController::screen → Frame → one write to the terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ gutter │ wrapped text        │  ← every row, or all but the last
//   ├──────────────────────────────┤
//   │ prompt / command line        │  ← only while there is something to say
//   └──────────────────────────────┘

mod logging;

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use log::{error, info};

use alaya_editor::buffer_set::BufferSet;
use alaya_editor::clock::{Clock, SystemClock};
use alaya_editor::controller::{ModalController, Outcome};
use alaya_editor::key::{Direction, Input};
use alaya_editor::options::Options;
use alaya_editor::prompt::Tone;
use alaya_editor::view::ScreenSize;

use alaya_term::ansi::Color;
use alaya_term::event_loop::{Action, App, EventLoop};
use alaya_term::frame::{Frame, Span};
use alaya_term::input::{KeyCode, KeyEvent, Modifiers};

const USAGE: &str = "\
usage: alaya [--] FILE...

Opens every FILE; missing files start empty and are created on :w.

environment:
  ALAYA_LOG=PATH         append a log to PATH
  ALAYA_LOG_LEVEL=LEVEL  error, warn, info (default), debug or trace";

const NO_FILES: &str = "Please open at least one file.";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Args {
    Help,
    Files(Vec<PathBuf>),
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<Args, String> {
    let mut files = Vec::new();
    let mut options_done = false;

    for arg in args {
        if !options_done {
            match arg.to_str() {
                Some("-h" | "--help") => return Ok(Args::Help),
                Some("--") => {
                    options_done = true;
                    continue;
                }
                Some(flag) if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(format!("unknown option {flag}"));
                }
                _ => {}
            }
        }
        files.push(PathBuf::from(arg));
    }

    if files.is_empty() {
        return Err(NO_FILES.to_owned());
    }
    Ok(Args::Files(files))
}

// ─── Key translation ────────────────────────────────────────────────────────

/// Turn a decoded key into editor inputs. Most keys give one input or none.
/// ESC typed quickly before a character arrives as Alt+char and is split
/// back into the two keys.
fn translate(key: &KeyEvent) -> Vec<Input> {
    let alt = key.modifiers.contains(Modifiers::ALT);
    let single = match key.code {
        KeyCode::Char('r') if key.is_ctrl() => Input::Redo,
        KeyCode::Char(_) if key.modifiers.contains(Modifiers::CTRL) => return Vec::new(),
        KeyCode::Char(ch) => Input::Char(ch),
        KeyCode::Escape => Input::Esc,
        KeyCode::Enter => Input::Enter,
        KeyCode::Tab => Input::Tab,
        KeyCode::Backspace => Input::Backspace,
        KeyCode::Up => Input::Move(Direction::Up),
        KeyCode::Down => Input::Move(Direction::Down),
        KeyCode::Left => Input::Move(Direction::Left),
        KeyCode::Right => Input::Move(Direction::Right),
        _ => return Vec::new(),
    };
    if alt {
        vec![Input::Esc, single]
    } else {
        vec![single]
    }
}

const fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Hint => Color::Purple,
        Tone::Insert | Tone::Error => Color::Red,
        Tone::Normal => Color::Cyan,
    }
}

// ─── Editor ─────────────────────────────────────────────────────────────────

struct Editor {
    controller: ModalController,
}

impl App for Editor {
    fn on_key(&mut self, key: &KeyEvent) -> Action {
        for input in translate(key) {
            if self.controller.handle(input) == Outcome::Quit {
                info!("quit");
                return Action::Quit;
            }
        }
        Action::Continue
    }

    fn paint(&mut self, frame: &mut Frame) {
        let screen = self.controller.screen();

        for (y, row) in screen.rows.iter().enumerate() {
            if !row.gutter.is_empty() {
                frame.push(y, Span::new(row.gutter.as_str(), Color::Grey));
            }
            frame.push(y, Span::plain(row.text.as_str()));
        }
        if let Some(prompt) = &screen.status {
            let last = usize::from(frame.size().rows).saturating_sub(1);
            frame.push(last, Span::new(prompt.text.as_str(), tone_color(prompt.tone)));
        }
        frame.set_cursor(Some((screen.cursor.row, screen.cursor.col)));
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let paths = match parse_args(env::args_os().skip(1)) {
        Ok(Args::Help) => {
            println!("{USAGE}");
            return;
        }
        Ok(Args::Files(paths)) => paths,
        Err(msg) => {
            eprintln!("alaya: {msg}");
            process::exit(1);
        }
    };

    if let Err(e) = logging::init_from_env() {
        eprintln!("alaya: cannot open log file: {e}");
    }

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("alaya: failed to initialize terminal: {e}");
        process::exit(1);
    });
    let size = event_loop.size();
    let screen = ScreenSize::new(usize::from(size.rows), usize::from(size.cols));

    let options = Options::default();
    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let Some(buffers) = BufferSet::open(&paths, screen, &options, &clock) else {
        eprintln!("alaya: {NO_FILES}");
        process::exit(1);
    };
    info!("opened {} file(s) on a {}x{} screen", buffers.len(), size.cols, size.rows);

    let mut editor = Editor {
        controller: ModalController::new(buffers, options),
    };
    if let Err(e) = event_loop.run(&mut editor) {
        error!("{e}");
        eprintln!("alaya: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
