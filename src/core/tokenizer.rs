//! Tokenizer: turns the cursor's byte stream into XML lexical tokens.
//!
//! A single forward pass over the input, no restart, no buffering beyond
//! the token being built. Each token carries the position of its first byte
//! so the structural layer can point diagnostics at the offending construct.
//!
//! Text runs and quoted attribute values are scanned in chunks with memchr
//! over the cursor's buffered window; entity and character references are
//! decoded inline, exactly once.

use std::io::Read;

use memchr::{memchr, memchr2, memchr3, memchr_iter, memrchr};

use crate::core::cursor::Cursor;
use crate::core::entities::{append_reference, MAX_REF_LEN};
use crate::error::{ParseError, Pos};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Which token payloads the consumer wants materialized. Scanning and
/// termination checks are identical either way; this only controls whether
/// the content string gets built.
#[derive(Debug, Clone, Copy)]
pub struct Retention {
    pub comments: bool,
    pub cdata: bool,
}

impl Default for Retention {
    fn default() -> Self {
        Retention {
            comments: true,
            cdata: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<?target name="value" ...?>`
    Instruct {
        target: String,
        attrs: Vec<(String, String)>,
    },
    /// `<!DOCTYPE ...>`, body reported verbatim (trimmed), never resolved.
    Doctype { value: String },
    /// `None` when comment retention is off.
    Comment { value: Option<String> },
    /// `None` when CDATA retention is off.
    CData { value: Option<String> },
    /// Character data with references already decoded. `all_whitespace` is
    /// false for any run that contained a reference.
    Text { value: String, all_whitespace: bool },
    ElementStart {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    ElementEnd { name: String },
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

/// Outcome of one chunked scan over the buffered window.
enum Scan {
    Eof,
    Boundary(u8),
    Continue,
}

pub struct Tokenizer<R> {
    cursor: Cursor<R>,
    retention: Retention,
    decode_numeric: bool,
    /// Reused accumulator for the token currently being built.
    scratch: Vec<u8>,
    at_start: bool,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(source: R, retention: Retention, decode_numeric: bool) -> Self {
        Tokenizer {
            cursor: Cursor::new(source),
            retention,
            decode_numeric,
            scratch: Vec::with_capacity(256),
            at_start: true,
        }
    }

    pub fn pos(&self) -> Pos {
        self.cursor.pos()
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if self.at_start {
            self.at_start = false;
            if self.cursor.starts_with(UTF8_BOM)? {
                self.cursor.advance(UTF8_BOM.len());
            }
        }
        let pos = self.cursor.pos();
        match self.cursor.peek()? {
            None => Ok(Token {
                kind: TokenKind::Eof,
                pos,
            }),
            Some(b'<') => self.read_markup(pos),
            Some(_) => self.read_text(pos),
        }
    }

    /// Resync after a token that failed, guaranteeing forward progress.
    /// `failed_at` is the offset where the failed token began; if the
    /// cursor has not moved past it, one byte is consumed before scanning
    /// so the same construct cannot be re-lexed into the same error.
    pub fn resync_after(&mut self, failed_at: u64) -> Result<(), ParseError> {
        if self.cursor.pos().offset == failed_at && self.cursor.peek()?.is_some() {
            self.cursor.advance(1);
        }
        self.resync()
    }

    /// Skip forward to the next plausible tag boundary: a `<` followed by
    /// `/`, `!`, `?`, or a name-start byte. Used by error recovery; leaves
    /// the `<` unconsumed.
    pub fn resync(&mut self) -> Result<(), ParseError> {
        loop {
            loop {
                let (skip, found) = {
                    let w = self.cursor.window()?;
                    match memchr(b'<', w) {
                        Some(i) => (i, true),
                        None => (w.len(), false),
                    }
                };
                self.cursor.advance(skip);
                if found {
                    break;
                }
                if skip == 0 {
                    return Ok(()); // end of stream
                }
            }
            match self.cursor.peek_at(1)? {
                Some(b'/' | b'!' | b'?') => return Ok(()),
                Some(c) if is_name_start_char(c) => return Ok(()),
                Some(_) => self.cursor.advance(1),
                None => {
                    self.cursor.advance(1);
                    return Ok(());
                }
            }
        }
    }

    fn read_markup(&mut self, pos: Pos) -> Result<Token, ParseError> {
        if self.cursor.starts_with(b"<!--")? {
            self.cursor.advance(4);
            let value = self.read_terminated(b"-->", self.retention.comments, "comment")?;
            return Ok(Token {
                kind: TokenKind::Comment { value },
                pos,
            });
        }
        if self.cursor.starts_with(b"<![CDATA[")? {
            self.cursor.advance(9);
            let value = self.read_terminated(b"]]>", self.retention.cdata, "CDATA section")?;
            return Ok(Token {
                kind: TokenKind::CData { value },
                pos,
            });
        }
        if self.cursor.starts_with(b"<!DOCTYPE")? {
            self.cursor.advance(9);
            return self.read_doctype(pos);
        }
        match self.cursor.peek_at(1)? {
            Some(b'/') => {
                self.cursor.advance(2);
                self.read_end_tag(pos)
            }
            Some(b'?') => {
                self.cursor.advance(2);
                self.read_instruct(pos)
            }
            Some(b'!') => Err(ParseError::malformed("unrecognized markup declaration", pos)),
            Some(c) if is_name_start_char(c) => {
                self.cursor.advance(1);
                self.read_start_tag(pos)
            }
            Some(_) => Err(ParseError::malformed("invalid character after '<'", pos)),
            None => Err(ParseError::malformed("unexpected end of input after '<'", pos)),
        }
    }

    fn read_start_tag(&mut self, pos: Pos) -> Result<Token, ParseError> {
        let name = self.read_name("element name")?;
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace()?;
            match self.cursor.peek()? {
                Some(b'>') => {
                    self.cursor.advance(1);
                    return Ok(Token {
                        kind: TokenKind::ElementStart {
                            name,
                            attrs,
                            self_closing: false,
                        },
                        pos,
                    });
                }
                Some(b'/') => {
                    if self.cursor.peek_at(1)? != Some(b'>') {
                        return Err(ParseError::malformed(
                            "expected '>' after '/' in start tag",
                            self.cursor.pos(),
                        ));
                    }
                    self.cursor.advance(2);
                    return Ok(Token {
                        kind: TokenKind::ElementStart {
                            name,
                            attrs,
                            self_closing: true,
                        },
                        pos,
                    });
                }
                Some(c) if is_name_start_char(c) => attrs.push(self.read_attribute()?),
                Some(_) => {
                    return Err(ParseError::malformed(
                        "invalid character in start tag",
                        self.cursor.pos(),
                    ));
                }
                None => {
                    return Err(ParseError::malformed(
                        "unterminated start tag",
                        self.cursor.pos(),
                    ));
                }
            }
        }
    }

    fn read_end_tag(&mut self, pos: Pos) -> Result<Token, ParseError> {
        let name = self.read_name("element name")?;
        self.skip_whitespace()?;
        match self.cursor.peek()? {
            Some(b'>') => {
                self.cursor.advance(1);
                Ok(Token {
                    kind: TokenKind::ElementEnd { name },
                    pos,
                })
            }
            Some(_) => Err(ParseError::malformed(
                "malformed end tag",
                self.cursor.pos(),
            )),
            None => Err(ParseError::malformed(
                "unterminated end tag",
                self.cursor.pos(),
            )),
        }
    }

    fn read_instruct(&mut self, pos: Pos) -> Result<Token, ParseError> {
        let target = self.read_name("processing instruction target")?;
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace()?;
            if self.cursor.starts_with(b"?>")? {
                self.cursor.advance(2);
                return Ok(Token {
                    kind: TokenKind::Instruct { target, attrs },
                    pos,
                });
            }
            match self.cursor.peek()? {
                Some(c) if is_name_start_char(c) => attrs.push(self.read_attribute()?),
                Some(b'?') => {
                    // A lone '?' at end of stream means the '?>' never came.
                    return match self.cursor.peek_at(1)? {
                        None => Err(ParseError::malformed(
                            "unterminated processing instruction",
                            self.cursor.pos(),
                        )),
                        Some(_) => Err(ParseError::malformed(
                            "invalid character in processing instruction",
                            self.cursor.pos(),
                        )),
                    };
                }
                Some(_) => {
                    return Err(ParseError::malformed(
                        "invalid character in processing instruction",
                        self.cursor.pos(),
                    ));
                }
                None => {
                    return Err(ParseError::malformed(
                        "unterminated processing instruction",
                        self.cursor.pos(),
                    ));
                }
            }
        }
    }

    fn read_doctype(&mut self, pos: Pos) -> Result<Token, ParseError> {
        self.scratch.clear();
        let content_start = self.cursor.pos();
        // Track '[' depth so an internal subset's '>' doesn't end the
        // declaration early. The subset is reported verbatim, never parsed.
        let mut depth = 0u32;
        loop {
            match self.cursor.peek()? {
                Some(b'[') => {
                    depth += 1;
                    self.scratch.push(b'[');
                    self.cursor.advance(1);
                }
                Some(b']') => {
                    depth = depth.saturating_sub(1);
                    self.scratch.push(b']');
                    self.cursor.advance(1);
                }
                Some(b'>') if depth == 0 => {
                    self.cursor.advance(1);
                    break;
                }
                Some(c) => {
                    self.scratch.push(c);
                    self.cursor.advance(1);
                }
                None => {
                    return Err(ParseError::malformed(
                        "unterminated DOCTYPE declaration",
                        self.cursor.pos(),
                    ));
                }
            }
        }
        let value = match std::str::from_utf8(&self.scratch) {
            Ok(s) => s.trim().to_owned(),
            Err(e) => {
                return Err(ParseError::encoding(
                    "invalid UTF-8 in DOCTYPE declaration",
                    pos_after(content_start, &self.scratch[..e.valid_up_to()]),
                ));
            }
        };
        Ok(Token {
            kind: TokenKind::Doctype { value },
            pos,
        })
    }

    fn read_text(&mut self, pos: Pos) -> Result<Token, ParseError> {
        self.scratch.clear();
        let mut all_ws = true;
        loop {
            let (advanced, hit) = {
                let w = self.cursor.window()?;
                if w.is_empty() {
                    (0, Scan::Eof)
                } else {
                    match memchr2(b'<', b'&', w) {
                        Some(i) => {
                            if all_ws && !w[..i].iter().all(|&b| is_whitespace(b)) {
                                all_ws = false;
                            }
                            self.scratch.extend_from_slice(&w[..i]);
                            (i, Scan::Boundary(w[i]))
                        }
                        None => {
                            if all_ws && !w.iter().all(|&b| is_whitespace(b)) {
                                all_ws = false;
                            }
                            self.scratch.extend_from_slice(w);
                            (w.len(), Scan::Continue)
                        }
                    }
                }
            };
            self.cursor.advance(advanced);
            match hit {
                Scan::Eof | Scan::Boundary(b'<') => break,
                Scan::Boundary(_) => {
                    // A run with a reference never counts as whitespace-only,
                    // even when the reference decodes to whitespace.
                    all_ws = false;
                    self.read_reference()?;
                }
                Scan::Continue => {}
            }
        }
        let value = match std::str::from_utf8(&self.scratch) {
            Ok(s) => s.to_owned(),
            Err(e) => {
                return Err(ParseError::encoding(
                    "invalid UTF-8 in character data",
                    pos_after(pos, &self.scratch[..e.valid_up_to()]),
                ));
            }
        };
        Ok(Token {
            kind: TokenKind::Text {
                value,
                all_whitespace: all_ws,
            },
            pos,
        })
    }

    fn read_attribute(&mut self) -> Result<(String, String), ParseError> {
        let name = self.read_name("attribute name")?;
        self.skip_whitespace()?;
        if self.cursor.peek()? != Some(b'=') {
            return Err(ParseError::malformed(
                format!("expected '=' after attribute name '{name}'"),
                self.cursor.pos(),
            ));
        }
        self.cursor.advance(1);
        self.skip_whitespace()?;
        let quote = match self.cursor.peek()? {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => {
                return Err(ParseError::malformed(
                    "attribute value must be quoted",
                    self.cursor.pos(),
                ));
            }
            None => {
                return Err(ParseError::malformed(
                    "unterminated attribute value",
                    self.cursor.pos(),
                ));
            }
        };
        self.cursor.advance(1);
        let value_pos = self.cursor.pos();
        let value = self.read_quoted(quote, value_pos)?;
        Ok((name, value))
    }

    /// Accumulate a quoted attribute value, decoding references, until the
    /// matching quote.
    fn read_quoted(&mut self, quote: u8, pos: Pos) -> Result<String, ParseError> {
        self.scratch.clear();
        loop {
            let (advanced, hit) = {
                let w = self.cursor.window()?;
                if w.is_empty() {
                    (0, Scan::Eof)
                } else {
                    match memchr3(quote, b'&', b'<', w) {
                        Some(i) => {
                            self.scratch.extend_from_slice(&w[..i]);
                            (i, Scan::Boundary(w[i]))
                        }
                        None => {
                            self.scratch.extend_from_slice(w);
                            (w.len(), Scan::Continue)
                        }
                    }
                }
            };
            self.cursor.advance(advanced);
            match hit {
                Scan::Eof => {
                    return Err(ParseError::malformed(
                        "unterminated attribute value",
                        self.cursor.pos(),
                    ));
                }
                Scan::Boundary(b'&') => self.read_reference()?,
                Scan::Boundary(b'<') => {
                    return Err(ParseError::malformed(
                        "attribute value cannot contain '<'",
                        self.cursor.pos(),
                    ));
                }
                Scan::Boundary(_) => {
                    self.cursor.advance(1); // closing quote
                    break;
                }
                Scan::Continue => {}
            }
        }
        match std::str::from_utf8(&self.scratch) {
            Ok(s) => Ok(s.to_owned()),
            Err(e) => Err(ParseError::encoding(
                "invalid UTF-8 in attribute value",
                pos_after(pos, &self.scratch[..e.valid_up_to()]),
            )),
        }
    }

    /// Consume `&body;` at the cursor and append its replacement to the
    /// scratch buffer.
    fn read_reference(&mut self) -> Result<(), ParseError> {
        let pos = self.cursor.pos();
        self.cursor.advance(1); // '&'
        let mut body = [0u8; MAX_REF_LEN];
        let mut len = 0usize;
        loop {
            match self.cursor.peek()? {
                Some(b';') => {
                    self.cursor.advance(1);
                    break;
                }
                Some(b'#') if len == 0 => {
                    body[0] = b'#';
                    len = 1;
                    self.cursor.advance(1);
                }
                Some(c) if is_name_char(c) => {
                    if len == MAX_REF_LEN {
                        return Err(ParseError::malformed("malformed character reference", pos));
                    }
                    body[len] = c;
                    len += 1;
                    self.cursor.advance(1);
                }
                Some(_) | None => {
                    return Err(ParseError::malformed("malformed character reference", pos));
                }
            }
        }
        append_reference(&body[..len], self.decode_numeric, &mut self.scratch)
            .map_err(|msg| ParseError::malformed(msg, pos))
    }

    fn read_name(&mut self, what: &'static str) -> Result<String, ParseError> {
        let start = self.cursor.pos();
        let mut name = Vec::new();
        match self.cursor.peek()? {
            Some(c) if is_name_start_char(c) => {
                name.push(c);
                self.cursor.advance(1);
            }
            Some(_) => {
                return Err(ParseError::malformed(
                    format!("invalid character in {what}"),
                    start,
                ));
            }
            None => {
                return Err(ParseError::malformed(
                    format!("unexpected end of input in {what}"),
                    start,
                ));
            }
        }
        while let Some(c) = self.cursor.peek()? {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.cursor.advance(1);
        }
        String::from_utf8(name)
            .map_err(|_| ParseError::encoding(format!("invalid UTF-8 in {what}"), start))
    }

    /// Accumulate until `term`, chunk-scanning for its first byte. Content
    /// is only retained when `keep` is set; termination is checked always.
    fn read_terminated(
        &mut self,
        term: &[u8],
        keep: bool,
        what: &'static str,
    ) -> Result<Option<String>, ParseError> {
        self.scratch.clear();
        let content_start = self.cursor.pos();
        let first = term[0];
        loop {
            let (advanced, found_first) = {
                let w = self.cursor.window()?;
                if w.is_empty() {
                    return Err(ParseError::malformed(
                        format!("unterminated {what}"),
                        self.cursor.pos(),
                    ));
                }
                match memchr(first, w) {
                    Some(i) => {
                        if keep {
                            self.scratch.extend_from_slice(&w[..i]);
                        }
                        (i, true)
                    }
                    None => {
                        if keep {
                            self.scratch.extend_from_slice(w);
                        }
                        (w.len(), false)
                    }
                }
            };
            self.cursor.advance(advanced);
            if found_first {
                if self.cursor.starts_with(term)? {
                    self.cursor.advance(term.len());
                    break;
                }
                // First byte of the terminator, but not the terminator.
                if keep {
                    self.scratch.push(first);
                }
                self.cursor.advance(1);
            }
        }
        if !keep {
            return Ok(None);
        }
        match std::str::from_utf8(&self.scratch) {
            Ok(s) => Ok(Some(s.to_owned())),
            Err(e) => Err(ParseError::encoding(
                format!("invalid UTF-8 in {what}"),
                pos_after(content_start, &self.scratch[..e.valid_up_to()]),
            )),
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.cursor.peek()? {
            if !is_whitespace(c) {
                break;
            }
            self.cursor.advance(1);
        }
        Ok(())
    }
}

/// Position of the byte following `prefix` when `start` is the position of
/// its first byte. Used to point encoding diagnostics at the offending byte
/// of an accumulated run. References decoded earlier in the run shift the
/// result by the difference between reference and replacement length.
fn pos_after(start: Pos, prefix: &[u8]) -> Pos {
    let mut pos = start;
    pos.offset += prefix.len() as u64;
    let newlines = memchr_iter(b'\n', prefix).count() as u32;
    if newlines > 0 {
        pos.line += newlines;
        let tail = match memrchr(b'\n', prefix) {
            Some(i) => prefix.len() - i - 1,
            None => prefix.len(),
        };
        pos.column = tail as u32 + 1;
    } else {
        pos.column += prefix.len() as u32;
    }
    pos
}

/// Valid XML name start byte: ASCII letters, underscore, colon, or the
/// start of a multi-byte UTF-8 sequence.
#[inline]
fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Valid XML name continuation byte.
#[inline]
fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(input: &[u8]) -> Tokenizer<&[u8]> {
        Tokenizer::new(input, Retention::default(), true)
    }

    fn all_tokens(input: &[u8]) -> Vec<TokenKind> {
        let mut t = tokenizer(input);
        let mut out = Vec::new();
        loop {
            let tok = t.next_token().unwrap();
            let eof = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if eof {
                break;
            }
        }
        out
    }

    #[test]
    fn test_simple_document() {
        let tokens = all_tokens(b"<a x=\"1\">hi</a>");
        assert_eq!(
            tokens,
            vec![
                TokenKind::ElementStart {
                    name: "a".into(),
                    attrs: vec![("x".into(), "1".into())],
                    self_closing: false,
                },
                TokenKind::Text {
                    value: "hi".into(),
                    all_whitespace: false,
                },
                TokenKind::ElementEnd { name: "a".into() },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_self_closing() {
        let tokens = all_tokens(b"<br/>");
        assert_eq!(
            tokens[0],
            TokenKind::ElementStart {
                name: "br".into(),
                attrs: vec![],
                self_closing: true,
            }
        );
    }

    #[test]
    fn test_comment_and_cdata() {
        let tokens = all_tokens(b"<!-- a-b --><![CDATA[x < y && z]]>");
        assert_eq!(
            tokens[0],
            TokenKind::Comment {
                value: Some(" a-b ".into())
            }
        );
        assert_eq!(
            tokens[1],
            TokenKind::CData {
                value: Some("x < y && z".into())
            }
        );
    }

    #[test]
    fn test_retention_off_still_validates() {
        let retention = Retention {
            comments: false,
            cdata: false,
        };
        let mut t = Tokenizer::new(&b"<!-- hidden -->"[..], retention, true);
        assert_eq!(
            t.next_token().unwrap().kind,
            TokenKind::Comment { value: None }
        );

        let mut t = Tokenizer::new(&b"<!-- never closed"[..], retention, true);
        let err = t.next_token().unwrap_err();
        assert!(err.to_string().contains("unterminated comment"));
    }

    #[test]
    fn test_unterminated_comment_position_is_end_of_input() {
        let input = b"<!-- not closed";
        let mut t = tokenizer(input);
        let err = t.next_token().unwrap_err();
        assert_eq!(err.pos().offset, input.len() as u64);
        assert_eq!(err.pos().column, input.len() as u32 + 1);
    }

    #[test]
    fn test_entity_decoding_in_text_and_attrs() {
        let tokens = all_tokens(b"<a t=\"&lt;x&gt;\">&amp;&#65;&#x41;</a>");
        assert_eq!(
            tokens[0],
            TokenKind::ElementStart {
                name: "a".into(),
                attrs: vec![("t".into(), "<x>".into())],
                self_closing: false,
            }
        );
        assert_eq!(
            tokens[1],
            TokenKind::Text {
                value: "&AA".into(),
                all_whitespace: false,
            }
        );
    }

    #[test]
    fn test_no_double_decoding() {
        let tokens = all_tokens(b"<a>&amp;lt;</a>");
        assert_eq!(
            tokens[1],
            TokenKind::Text {
                value: "&lt;".into(),
                all_whitespace: false,
            }
        );
    }

    #[test]
    fn test_instruct_with_attrs() {
        let tokens = all_tokens(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        assert_eq!(
            tokens[0],
            TokenKind::Instruct {
                target: "xml".into(),
                attrs: vec![
                    ("version".into(), "1.0".into()),
                    ("encoding".into(), "UTF-8".into()),
                ],
            }
        );
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        let tokens = all_tokens(b"<!DOCTYPE html [<!ENTITY x \"y\">]>");
        assert_eq!(
            tokens[0],
            TokenKind::Doctype {
                value: "html [<!ENTITY x \"y\">]".into()
            }
        );
    }

    #[test]
    fn test_attribute_errors() {
        let mut t = tokenizer(b"<a x>");
        assert!(t
            .next_token()
            .unwrap_err()
            .to_string()
            .contains("expected '='"));

        let mut t = tokenizer(b"<a x=1>");
        assert!(t
            .next_token()
            .unwrap_err()
            .to_string()
            .contains("must be quoted"));

        let mut t = tokenizer(b"<a x=\"1>");
        assert!(t
            .next_token()
            .unwrap_err()
            .to_string()
            .contains("unterminated attribute value"));
    }

    #[test]
    fn test_bad_reference_positions() {
        let mut t = tokenizer(b"<a>oops &nope; more</a>");
        t.next_token().unwrap(); // <a>
        let err = t.next_token().unwrap_err();
        assert!(err.to_string().contains("unknown entity reference"));
        // The '&' is at offset 8.
        assert_eq!(err.pos().offset, 8);
        assert_eq!(err.pos().column, 9);
    }

    #[test]
    fn test_invalid_utf8_position_points_at_byte() {
        let mut t = tokenizer(b"<a>ab\xFFcd</a>");
        t.next_token().unwrap(); // <a>
        let err = t.next_token().unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8 in character data"));
        assert_eq!(err.pos().offset, 5);
        assert_eq!(err.pos().column, 6);

        let mut t = tokenizer(b"<a x=\"a\xFFb\"/>");
        let err = t.next_token().unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8 in attribute value"));
        assert_eq!(err.pos().offset, 7);
        assert_eq!(err.pos().column, 8);
    }

    #[test]
    fn test_invalid_utf8_in_comment_tracks_lines() {
        let mut t = tokenizer(b"<!--\n\xFF-->");
        let err = t.next_token().unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8 in comment"));
        assert_eq!(err.pos().offset, 5);
        assert_eq!(err.pos().line, 2);
        assert_eq!(err.pos().column, 1);
    }

    #[test]
    fn test_whitespace_only_text_is_flagged() {
        let tokens = all_tokens(b"<a> \t\n </a>");
        assert_eq!(
            tokens[1],
            TokenKind::Text {
                value: " \t\n ".into(),
                all_whitespace: true,
            }
        );
    }

    #[test]
    fn test_positions_across_lines() {
        let mut t = tokenizer(b"<a>\n  <b/>\n</a>");
        t.next_token().unwrap();
        t.next_token().unwrap(); // "\n  "
        let tok = t.next_token().unwrap();
        assert!(matches!(tok.kind, TokenKind::ElementStart { .. }));
        assert_eq!(tok.pos.line, 2);
        assert_eq!(tok.pos.column, 3);
    }

    #[test]
    fn test_bom_is_skipped() {
        let tokens = all_tokens(b"\xEF\xBB\xBF<a/>");
        assert!(matches!(tokens[0], TokenKind::ElementStart { .. }));
    }

    #[test]
    fn test_markers_split_across_reads() {
        // One byte per read() call, forcing refills inside every marker.
        struct Trickle<'a>(&'a [u8]);
        impl Read for Trickle<'_> {
            fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
                match self.0.split_first() {
                    Some((&b, rest)) if !out.is_empty() => {
                        out[0] = b;
                        self.0 = rest;
                        Ok(1)
                    }
                    _ => Ok(0),
                }
            }
        }
        let mut t = Tokenizer::new(
            Trickle(b"<a><![CDATA[ok]]></a>"),
            Retention::default(),
            true,
        );
        t.next_token().unwrap();
        assert_eq!(
            t.next_token().unwrap().kind,
            TokenKind::CData {
                value: Some("ok".into())
            }
        );
        assert_eq!(
            t.next_token().unwrap().kind,
            TokenKind::ElementEnd { name: "a".into() }
        );
    }

    #[test]
    fn test_resync_finds_next_tag() {
        let mut t = tokenizer(b"<1bad junk<b/>");
        assert!(t.next_token().is_err());
        t.resync().unwrap();
        let tok = t.next_token().unwrap();
        assert_eq!(
            tok.kind,
            TokenKind::ElementStart {
                name: "b".into(),
                attrs: vec![],
                self_closing: true,
            }
        );
    }
}
