// SPDX-License-Identifier: MIT
//
// Key-driven event loop.
//
// stdin bytes arrive from the reader thread, the decoder turns them into
// keys, the app handles each key, and the screen is repainted in full
// after every batch. Nothing happens between key presses, so the loop
// blocks on the channel with no timeout, except while the decoder holds a
// lone ESC. Then it waits at most `escape_timeout` before deciding the
// byte was the Escape key.

use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use log::{debug, warn};

use crate::ansi;
use crate::frame::Frame;
use crate::input::{Decoder, KeyEvent};
use crate::output::OutputBuffer;
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

/// Wait after a lone ESC before treating it as the Escape key.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

// ─── App ─────────────────────────────────────────────────────────────────────

/// What the app wants after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// An application driven by [`EventLoop`].
pub trait App {
    fn on_key(&mut self, key: &KeyEvent) -> Action;

    /// Fill `frame`, which arrives cleared and sized to the terminal.
    /// Set the frame cursor to show it.
    fn paint(&mut self, frame: &mut Frame);
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

pub struct EventLoop {
    terminal: Terminal,
    decoder: Decoder,
    out: OutputBuffer,
    escape_timeout: Duration,
}

impl EventLoop {
    /// # Errors
    ///
    /// Fails if the terminal cannot be set up.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            decoder: Decoder::new(),
            out: OutputBuffer::new(),
            escape_timeout: ESCAPE_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// Size measured when the loop was created.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal and run `app` until it quits or stdin
    /// closes. The terminal is restored on every exit path.
    ///
    /// # Errors
    ///
    /// Fails if the terminal cannot be entered, drawn on or restored.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        let (mut reader, rx) = match StdinReader::spawn() {
            Ok(spawned) => spawned,
            Err(e) => {
                self.terminal.leave()?;
                return Err(e);
            }
        };

        let result = self.run_inner(app, &rx);

        reader.stop();
        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let mut frame = Frame::new(self.terminal.size());
        self.draw(app, &mut frame)?;

        loop {
            let received = if self.decoder.has_pending() {
                rx.recv_timeout(self.escape_timeout)
            } else {
                rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
            };

            let keys = match received {
                Ok(bytes) => self.decoder.advance(&bytes),
                Err(RecvTimeoutError::Timeout) => self.decoder.flush(),
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("stdin closed, leaving");
                    return Ok(());
                }
            };
            if keys.is_empty() {
                continue;
            }

            for key in &keys {
                debug!("key {key:?}");
                if app.on_key(key) == Action::Quit {
                    return Ok(());
                }
            }
            self.draw(app, &mut frame)?;
        }
    }

    fn draw(&mut self, app: &mut impl App, frame: &mut Frame) -> io::Result<()> {
        frame.clear();
        app.paint(frame);

        ansi::begin_sync(&mut self.out)?;
        frame.render(&mut self.out)?;
        ansi::end_sync(&mut self.out)?;
        self.out.flush_stdout()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Span;
    use crate::input::KeyCode;

    struct Counter {
        keys: usize,
    }

    impl App for Counter {
        fn on_key(&mut self, key: &KeyEvent) -> Action {
            self.keys += 1;
            if key.code == KeyCode::Char('q') {
                Action::Quit
            } else {
                Action::Continue
            }
        }

        fn paint(&mut self, frame: &mut Frame) {
            frame.push(0, Span::plain(self.keys.to_string()));
            frame.set_cursor(Some((0, 0)));
        }
    }

    #[test]
    fn app_sees_keys_and_quits() {
        let mut app = Counter { keys: 0 };
        let mut decoder = Decoder::new();
        let actions: Vec<Action> = decoder
            .advance(b"abq")
            .iter()
            .map(|k| app.on_key(k))
            .collect();
        assert_eq!(actions, [Action::Continue, Action::Continue, Action::Quit]);
        assert_eq!(app.keys, 3);
    }

    #[test]
    fn paint_fills_a_cleared_frame() {
        let mut app = Counter { keys: 7 };
        let mut frame = Frame::new(Size { cols: 10, rows: 2 });
        frame.push(1, Span::plain("stale"));
        frame.clear();
        app.paint(&mut frame);
        assert_eq!(frame.row(0), &[Span::plain("7")]);
        assert!(frame.row(1).is_empty());
        assert_eq!(frame.cursor(), Some((0, 0)));
    }

    #[test]
    fn escape_timeout_is_short() {
        assert!(ESCAPE_TIMEOUT <= Duration::from_millis(50));
        let el = EventLoop::new().unwrap().with_escape_timeout(Duration::from_millis(5));
        assert_eq!(el.escape_timeout, Duration::from_millis(5));
    }
}
