// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into key events. Covers what a plain xterm-style
// terminal sends in raw mode without any extended protocol switched on:
//
// - ASCII printable characters and UTF-8 multi-byte characters
// - C0 control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences for arrows and editing keys, with xterm modifiers
// - SS3 sequences for arrows (application cursor mode)
// - Alt+key as ESC followed by a printable byte
//
// Sequences may be split across reads, so undecoded bytes stay buffered
// until the next [`Decoder::advance`]. A lone ESC is ambiguous: it may be
// the Escape key or the start of a sequence. It stays pending until the
// caller times out and calls [`Decoder::flush`].

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Ctrl held, and no Alt.
    #[must_use]
    pub const fn is_ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL) && !self.modifiers.contains(Modifiers::ALT)
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character. Ctrl+letter arrives as the lowercase letter
    /// with [`Modifiers::CTRL`].
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys, in xterm's `1 + bitmask` parameter order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Incremental byte-to-key decoder.
#[derive(Debug, Default)]
pub struct Decoder {
    pending: Vec<u8>,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(16),
        }
    }

    /// Feed bytes and return every key that can be decoded so far.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.pending.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.pending.len() {
            match decode(&self.pending[pos..]) {
                Step::Key(key, used) => {
                    keys.push(key);
                    pos += used;
                }
                Step::Skip(used) => pos += used,
                Step::Incomplete => break,
            }
        }

        self.pending.drain(..pos);
        keys
    }

    /// Bytes are held back waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Give up waiting: a held ESC becomes the Escape key, and whatever
    /// followed it is decoded on its own.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        let rest = std::mem::take(&mut self.pending);
        let mut bytes = rest.as_slice();

        while let Some((&first, tail)) = bytes.split_first() {
            if first == 0x1B {
                keys.push(KeyEvent::plain(KeyCode::Escape));
                bytes = tail;
                continue;
            }
            match decode(bytes) {
                Step::Key(key, used) => {
                    keys.push(key);
                    bytes = &bytes[used..];
                }
                // A truncated UTF-8 char or a stray byte; drop one byte.
                Step::Skip(_) | Step::Incomplete => bytes = tail,
            }
        }
        keys
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

enum Step {
    Key(KeyEvent, usize),
    Skip(usize),
    Incomplete,
}

fn decode(buf: &[u8]) -> Step {
    let Some(&first) = buf.first() else {
        return Step::Incomplete;
    };
    match first {
        0x1B => decode_escape(buf),
        0x00 => Step::Key(ctrl('@'), 1),
        0x09 => Step::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Step::Key(KeyEvent::plain(KeyCode::Enter), 1),
        0x08 | 0x7F => Step::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        b @ 0x01..=0x1A => Step::Key(ctrl(char::from(b + b'a' - 1)), 1),
        0x1C..=0x1F => Step::Skip(1),
        b @ 0x20..=0x7E => Step::Key(KeyEvent::plain(KeyCode::Char(char::from(b))), 1),
        _ => decode_utf8(buf),
    }
}

fn decode_escape(buf: &[u8]) -> Step {
    let Some(&second) = buf.get(1) else {
        return Step::Incomplete;
    };
    match second {
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        0x1B => Step::Key(KeyEvent::new(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Step::Key(
            KeyEvent::new(KeyCode::Char(char::from(b)), Modifiers::ALT),
            2,
        ),
        _ => Step::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

/// `ESC [ params final`. Parameter bytes are 0x30..=0x3F; the final byte
/// is 0x40..=0x7E.
fn decode_csi(buf: &[u8]) -> Step {
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Step::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Step::Skip(end + 1);
        }
        end += 1;
    }

    let params = csi_params(&buf[2..end]);
    let used = end + 1;
    let param = |i: usize| params.get(i).copied().unwrap_or(0);
    let modifiers = decode_modifiers(param(1));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => KeyCode::BackTab,
        b'~' => match param(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Step::Skip(used),
        },
        _ => return Step::Skip(used),
    };
    Step::Key(KeyEvent::new(code, modifiers), used)
}

fn decode_ss3(buf: &[u8]) -> Step {
    let Some(&b) = buf.get(2) else {
        return Step::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Step::Skip(3),
    };
    Step::Key(KeyEvent::plain(code), 3)
}

fn decode_utf8(buf: &[u8]) -> Step {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Step::Skip(1),
    };
    if buf.len() < len {
        return Step::Incomplete;
    }
    match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => Step::Key(KeyEvent::plain(KeyCode::Char(ch)), len),
        None => Step::Skip(1),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), Modifiers::CTRL)
}

/// Semicolon-separated decimal parameters; empty fields read as 0.
fn csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm sends `1 + bitmask`; 0 and 1 both mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = param.saturating_sub(1);
    Modifiers::from_bits_truncate(bits as u8)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<KeyEvent> {
        Decoder::new().advance(data)
    }

    fn parse_one(data: &[u8]) -> KeyEvent {
        let keys = parse(data);
        assert_eq!(keys.len(), 1, "expected 1 key, got {keys:?}");
        keys[0]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::plain(code)
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(
            parse(b"hi:"),
            vec![
                key(KeyCode::Char('h')),
                key(KeyCode::Char('i')),
                key(KeyCode::Char(':')),
            ]
        );
    }

    #[test]
    fn control_keys() {
        assert_eq!(parse_one(b"\r"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\t"), key(KeyCode::Tab));
        assert_eq!(parse_one(b"\x7f"), key(KeyCode::Backspace));
        assert_eq!(parse_one(b"\x08"), key(KeyCode::Backspace));
    }

    #[test]
    fn ctrl_r_is_r_with_ctrl() {
        let k = parse_one(b"\x12");
        assert_eq!(k, KeyEvent::new(KeyCode::Char('r'), Modifiers::CTRL));
        assert!(k.is_ctrl());
    }

    #[test]
    fn utf8_chars() {
        assert_eq!(parse_one("é".as_bytes()), key(KeyCode::Char('é')));
        assert_eq!(parse_one("語".as_bytes()), key(KeyCode::Char('語')));
        assert_eq!(parse_one("🦀".as_bytes()), key(KeyCode::Char('🦀')));
    }

    #[test]
    fn stray_continuation_byte_is_skipped() {
        assert_eq!(parse(b"\x80a"), vec![key(KeyCode::Char('a'))]);
    }

    // ── Sequences ───────────────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(parse_one(b"\x1b[A"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[B"), key(KeyCode::Down));
        assert_eq!(parse_one(b"\x1b[C"), key(KeyCode::Right));
        assert_eq!(parse_one(b"\x1b[D"), key(KeyCode::Left));
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(parse_one(b"\x1bOA"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1bOD"), key(KeyCode::Left));
    }

    #[test]
    fn modified_arrow() {
        assert_eq!(
            parse_one(b"\x1b[1;5C"),
            KeyEvent::new(KeyCode::Right, Modifiers::CTRL)
        );
        assert_eq!(
            parse_one(b"\x1b[1;2A"),
            KeyEvent::new(KeyCode::Up, Modifiers::SHIFT)
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse_one(b"\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[1~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[4~"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[6~"), key(KeyCode::PageDown));
    }

    #[test]
    fn unknown_sequence_is_dropped() {
        assert_eq!(parse(b"\x1b[99~x"), vec![key(KeyCode::Char('x'))]);
        assert_eq!(parse(b"\x1b[5Xy"), vec![key(KeyCode::Char('y'))]);
    }

    #[test]
    fn alt_char() {
        assert_eq!(
            parse_one(b"\x1bj"),
            KeyEvent::new(KeyCode::Char('j'), Modifiers::ALT)
        );
    }

    // ── Pending bytes ───────────────────────────────────────────────────

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut d = Decoder::new();
        assert!(d.advance(b"\x1b").is_empty());
        assert!(d.has_pending());
        assert_eq!(d.flush(), vec![key(KeyCode::Escape)]);
        assert!(!d.has_pending());
    }

    #[test]
    fn sequence_split_across_reads() {
        let mut d = Decoder::new();
        assert!(d.advance(b"\x1b[").is_empty());
        assert!(d.advance(b"1;5").is_empty());
        assert_eq!(
            d.advance(b"D"),
            vec![KeyEvent::new(KeyCode::Left, Modifiers::CTRL)]
        );
        assert!(!d.has_pending());
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "ü".as_bytes();
        let mut d = Decoder::new();
        assert!(d.advance(&bytes[..1]).is_empty());
        assert_eq!(d.advance(&bytes[1..]), vec![key(KeyCode::Char('ü'))]);
    }

    #[test]
    fn flush_escape_then_bracket() {
        let mut d = Decoder::new();
        assert!(d.advance(b"\x1b[").is_empty());
        assert_eq!(
            d.flush(),
            vec![key(KeyCode::Escape), key(KeyCode::Char('['))]
        );
    }

    #[test]
    fn escape_then_typing_in_one_read() {
        // ESC followed by ':' reads as Alt+':'; the caller decides what that means.
        assert_eq!(
            parse_one(b"\x1b:"),
            KeyEvent::new(KeyCode::Char(':'), Modifiers::ALT)
        );
    }
}
