//! Buffered input cursor with position tracking.
//!
//! Wraps any `Read` source with a fixed-size compact-then-refill buffer and
//! gives the tokenizer byte-level peek/advance plus a contiguous window for
//! memchr-based scans. Line and column are maintained on every advance, so
//! any diagnostic can name the exact spot it fired at.

use std::io::{ErrorKind, Read};

use memchr::{memchr_iter, memrchr};

use crate::error::{ParseError, Pos};

const BUF_SIZE: usize = 8 * 1024;

/// Longest marker the tokenizer must see whole: `<![CDATA[`.
pub(crate) const MAX_LOOKAHEAD: usize = 9;

pub struct Cursor<R> {
    reader: R,
    buf: Vec<u8>,
    /// Read index into `buf`.
    pos: usize,
    /// One past the last valid byte in `buf`.
    end: usize,
    eof: bool,
    offset: u64,
    line: u32,
    column: u32,
}

impl<R: Read> Cursor<R> {
    pub fn new(reader: R) -> Self {
        Cursor {
            reader,
            buf: vec![0u8; BUF_SIZE],
            pos: 0,
            end: 0,
            eof: false,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current position in the stream.
    pub fn pos(&self) -> Pos {
        Pos {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn available(&self) -> usize {
        self.end - self.pos
    }

    /// Buffer at least `n` bytes (up to `MAX_LOOKAHEAD`), or as many as
    /// remain before end of stream. Returns the number now available.
    fn ensure(&mut self, n: usize) -> Result<usize, ParseError> {
        debug_assert!(n <= BUF_SIZE);
        while self.available() < n && !self.eof {
            // Compact: move the unread tail to the front.
            if self.pos > 0 {
                self.buf.copy_within(self.pos..self.end, 0);
                self.end -= self.pos;
                self.pos = 0;
            }
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => self.eof = true,
                Ok(read) => self.end += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ParseError::Io {
                        source: e,
                        pos: self.pos(),
                    })
                }
            }
        }
        Ok(self.available())
    }

    /// Next byte without consuming it. `None` at end of stream.
    pub fn peek(&mut self) -> Result<Option<u8>, ParseError> {
        if self.ensure(1)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    /// Byte `i` positions ahead, if the stream has that many left.
    pub fn peek_at(&mut self, i: usize) -> Result<Option<u8>, ParseError> {
        if self.ensure(i + 1)? <= i {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos + i]))
    }

    /// Whether the unconsumed input begins with `needle`.
    /// `needle` must fit in the lookahead window.
    pub fn starts_with(&mut self, needle: &[u8]) -> Result<bool, ParseError> {
        debug_assert!(needle.len() <= MAX_LOOKAHEAD);
        if self.ensure(needle.len())? < needle.len() {
            return Ok(false);
        }
        Ok(self.buf[self.pos..self.pos + needle.len()].starts_with(needle))
    }

    /// The contiguous buffered window, refilled if empty. An empty slice
    /// means end of stream.
    pub fn window(&mut self) -> Result<&[u8], ParseError> {
        self.ensure(1)?;
        Ok(&self.buf[self.pos..self.end])
    }

    /// Consume `n` already-buffered bytes, updating line and column in bulk.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        if n == 0 {
            return;
        }
        let window = &self.buf[self.pos..self.pos + n];
        let newlines = memchr_iter(b'\n', window).count();
        if newlines > 0 {
            self.line += newlines as u32;
            // Column restarts after the last newline in the consumed span.
            let tail = match memrchr(b'\n', window) {
                Some(i) => n - i - 1,
                None => n,
            };
            self.column = tail as u32 + 1;
        } else {
            self.column += n as u32;
        }
        self.pos += n;
        self.offset += n as u64;
    }
}
