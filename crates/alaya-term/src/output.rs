// SPDX-License-Identifier: MIT
//
// Frame output buffer.
//
// Every escape and glyph of a frame goes into memory first and reaches the
// terminal in one write, so a redraw never shows half-painted rows.

use std::io::{self, Write};

const CAPACITY: usize = 8192;

/// Bytes of one frame, written out together.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(CAPACITY),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write everything to `w` and empty the buffer, keeping its capacity.
    ///
    /// # Errors
    ///
    /// Fails if `w` fails; the buffer is left intact in that case.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        w.write_all(&self.buf)?;
        w.flush()?;
        self.buf.clear();
        Ok(())
    }

    /// [`flush_to`](Self::flush_to) on locked stdout.
    ///
    /// # Errors
    ///
    /// Fails if stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        self.flush_to(&mut io::stdout().lock())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    // Bytes only leave through flush_to / flush_stdout.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accumulates_then_flushes_once() {
        let mut out = OutputBuffer::new();
        write!(out, "ab").unwrap();
        out.write_all(b"c").unwrap();
        assert_eq!(out.as_bytes(), b"abc");
        assert_eq!(out.len(), 3);

        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"abc");
        assert!(out.is_empty());
    }

    #[test]
    fn empty_flush_writes_nothing() {
        let mut out = OutputBuffer::default();
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }
}
