//! Parse error taxonomy and source positions.

use std::fmt;
use std::io;
use thiserror::Error;

/// A position in the input stream.
///
/// `line` is 1-based and increments on `\n`; `column` is the 1-based byte
/// column within the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    /// Absolute byte offset from the start of the stream.
    pub offset: u64,
    pub line: u32,
    pub column: u32,
}

impl Pos {
    /// The position of the first byte of the stream.
    pub fn start() -> Self {
        Pos {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Pos::start()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Everything that can go wrong during a parse.
///
/// `Io` and `Encoding` always abort the parse. `Malformed` and
/// `WellFormedness` abort by default but can be skipped past when
/// resynchronization is enabled in [`ParseOptions`](crate::ParseOptions).
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying source failed mid-read.
    #[error("I/O error at {pos}: {source}")]
    Io {
        #[source]
        source: io::Error,
        pos: Pos,
    },

    /// Input bytes are not valid UTF-8.
    #[error("{message} at {pos}")]
    Encoding { message: String, pos: Pos },

    /// Lexical-level syntax violation: unterminated construct, bad name,
    /// unquoted attribute, malformed character reference.
    #[error("{message} at {pos}")]
    Malformed { message: String, pos: Pos },

    /// Structural violation: mismatched tags, multiple roots, content
    /// outside the root, duplicate attributes under the strict policy.
    #[error("{message} at {pos}")]
    WellFormedness { message: String, pos: Pos },
}

impl ParseError {
    pub(crate) fn encoding(message: impl Into<String>, pos: Pos) -> Self {
        ParseError::Encoding {
            message: message.into(),
            pos,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>, pos: Pos) -> Self {
        ParseError::Malformed {
            message: message.into(),
            pos,
        }
    }

    pub(crate) fn well_formedness(message: impl Into<String>, pos: Pos) -> Self {
        ParseError::WellFormedness {
            message: message.into(),
            pos,
        }
    }

    /// The position the error was detected at.
    pub fn pos(&self) -> Pos {
        match self {
            ParseError::Io { pos, .. }
            | ParseError::Encoding { pos, .. }
            | ParseError::Malformed { pos, .. }
            | ParseError::WellFormedness { pos, .. } => *pos,
        }
    }

    /// The bare message, without the position suffix. This is what the
    /// `error` callback receives alongside line and column.
    pub fn message(&self) -> String {
        match self {
            ParseError::Io { source, .. } => source.to_string(),
            ParseError::Encoding { message, .. }
            | ParseError::Malformed { message, .. }
            | ParseError::WellFormedness { message, .. } => message.clone(),
        }
    }

    /// I/O and encoding failures abort the parse even when
    /// resynchronization is enabled.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::Io { .. } | ParseError::Encoding { .. })
    }
}
