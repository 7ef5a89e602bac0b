//! Structural state machine and handler dispatch
//!
//! The engine sits between the tokenizer and the handler: it tracks where
//! the parse stands in the document (before the root, inside an element,
//! after the root), maintains the open-element stack, enforces
//! well-formedness, and decides which tokens reach which callbacks.

use std::io::Read;

use tracing::{debug, trace};

use crate::core::attrs::{apply_duplicate_policy, find_duplicate, Attributes};
use crate::core::tokenizer::{Retention, Token, TokenKind, Tokenizer};
use crate::error::{ParseError, Pos};
use crate::options::{DuplicatePolicy, ParseOptions};
use crate::sax::handler::{Capabilities, SaxHandler};

/// Parse XML from any `Read` source, driving `handler` callbacks.
///
/// Returns `Err` with the first error encountered, even when
/// `resync_on_error` allowed the parse to continue past it. Every error is
/// also delivered through the handler's `error` callback before this
/// returns.
pub fn parse<H, R>(handler: &mut H, source: R, options: ParseOptions) -> Result<(), ParseError>
where
    H: SaxHandler,
    R: Read,
{
    Engine::new(handler, source, options).run()
}

/// Convenience wrapper over [`parse`] for in-memory input.
pub fn parse_str<H>(handler: &mut H, input: &str, options: ParseOptions) -> Result<(), ParseError>
where
    H: SaxHandler,
{
    parse(handler, input.as_bytes(), options)
}

/// Where the parse stands relative to the document element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeRoot,
    InElement,
    AfterRoot,
    Failed,
    Done,
}

struct Engine<'h, H, R> {
    tokenizer: Tokenizer<R>,
    handler: &'h mut H,
    options: ParseOptions,
    caps: Capabilities,
    state: State,
    /// Names of currently open elements, outermost first.
    stack: Vec<String>,
    /// First error seen; what `run` ultimately returns when nonempty.
    first_error: Option<ParseError>,
}

impl<'h, H: SaxHandler, R: Read> Engine<'h, H, R> {
    fn new(handler: &'h mut H, source: R, options: ParseOptions) -> Self {
        let caps = handler.capabilities();
        let retention = Retention {
            comments: caps.contains(Capabilities::COMMENT),
            cdata: caps.contains(Capabilities::CDATA),
        };
        let tokenizer = Tokenizer::new(source, retention, options.decode_numeric_char_refs);
        Engine {
            tokenizer,
            handler,
            options,
            caps,
            state: State::BeforeRoot,
            stack: Vec::new(),
            first_error: None,
        }
    }

    fn run(mut self) -> Result<(), ParseError> {
        debug!(
            resync = self.options.resync_on_error,
            fragments = self.options.allow_fragments,
            "parse start"
        );
        while !matches!(self.state, State::Failed | State::Done) {
            let before = self.tokenizer.pos().offset;
            match self.tokenizer.next_token() {
                Ok(token) => self.step(token),
                Err(err) => {
                    if self.report(err) {
                        // Lossy recovery: drop input up to the next thing
                        // that looks like a tag.
                        trace!(offset = before, "resyncing after lexical error");
                        if let Err(io) = self.tokenizer.resync_after(before) {
                            self.report(io);
                        }
                    }
                }
            }
        }
        debug!(errors = self.first_error.is_some(), "parse end");
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Deliver an error to the handler and record it. Returns true when the
    /// parse should attempt recovery, false when it is over.
    fn report(&mut self, err: ParseError) -> bool {
        let pos = err.pos();
        self.handler.error(&err.message(), pos.line, pos.column);
        let recover = self.options.resync_on_error && !err.is_fatal();
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
        if !recover {
            self.state = State::Failed;
        }
        recover
    }

    fn step(&mut self, token: Token) {
        let pos = token.pos;
        match token.kind {
            TokenKind::Eof => self.finish(pos),
            TokenKind::Instruct { target, attrs } => self.on_instruct(target, attrs, pos),
            TokenKind::Doctype { value } => self.on_doctype(value, pos),
            TokenKind::Comment { value } => {
                if let Some(value) = value {
                    self.handler.comment(&value);
                }
            }
            TokenKind::CData { value } => self.on_cdata(value, pos),
            TokenKind::Text {
                value,
                all_whitespace,
            } => self.on_text(value, all_whitespace, pos),
            TokenKind::ElementStart {
                name,
                attrs,
                self_closing,
            } => self.on_element_start(name, attrs, self_closing, pos),
            TokenKind::ElementEnd { name } => self.on_element_end(name, pos),
        }
    }

    fn on_instruct(&mut self, target: String, attrs: Vec<(String, String)>, pos: Pos) {
        if self.state == State::AfterRoot && !self.options.allow_fragments {
            self.report(ParseError::well_formedness(
                "processing instruction after document element",
                pos,
            ));
            return;
        }
        if self.caps.contains(Capabilities::INSTRUCT) {
            let attrs = Attributes::from_pairs(attrs);
            self.handler.instruct(&target, &attrs);
        }
    }

    fn on_doctype(&mut self, value: String, pos: Pos) {
        if self.state != State::BeforeRoot {
            self.report(ParseError::well_formedness(
                "misplaced DOCTYPE declaration",
                pos,
            ));
            return;
        }
        if self.caps.contains(Capabilities::DOCTYPE) {
            self.handler.doctype(&value);
        }
    }

    fn on_cdata(&mut self, value: Option<String>, pos: Pos) {
        if self.state != State::InElement && !self.options.allow_fragments {
            self.report(ParseError::well_formedness(
                "CDATA section outside the document element",
                pos,
            ));
            return;
        }
        if let Some(value) = value {
            self.handler.cdata(&value);
        }
    }

    fn on_text(&mut self, value: String, all_whitespace: bool, pos: Pos) {
        if all_whitespace {
            // Legal anywhere, but outside an element it is consumed
            // silently; only fragment mode treats top-level runs as content.
            if self.state != State::InElement && !self.options.allow_fragments {
                return;
            }
            if !self.options.skip_whitespace_text && self.caps.contains(Capabilities::TEXT) {
                self.handler.text(&value);
            }
            return;
        }
        if self.state != State::InElement && !self.options.allow_fragments {
            self.report(ParseError::well_formedness(
                "text outside the document element",
                pos,
            ));
            return;
        }
        if self.caps.contains(Capabilities::TEXT) {
            self.handler.text(&value);
        }
    }

    fn on_element_start(
        &mut self,
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
        pos: Pos,
    ) {
        if self.state == State::AfterRoot && !self.options.allow_fragments {
            self.report(ParseError::well_formedness(
                "multiple top-level elements",
                pos,
            ));
            return;
        }
        if self.stack.len() >= self.options.max_nesting_depth {
            // The depth bound exists to bound memory; recovery would keep
            // growing the stack, so this one always ends the parse.
            let err = ParseError::well_formedness("maximum nesting depth exceeded", pos);
            self.handler.error(&err.message(), pos.line, pos.column);
            if self.first_error.is_none() {
                self.first_error = Some(err);
            }
            self.state = State::Failed;
            return;
        }
        let mut policy = self.options.duplicate_attrs;
        if policy == DuplicatePolicy::Reject {
            if let Some(dup) = find_duplicate(&attrs) {
                let err = ParseError::well_formedness(
                    format!("duplicate attribute '{dup}'"),
                    pos,
                );
                if !self.report(err) {
                    return;
                }
                // Recovering: the element stays in the tree with the first
                // occurrence of each attribute.
                trace!(element = %name, "continuing past duplicate attribute");
                policy = DuplicatePolicy::KeepFirst;
            }
        }
        let attrs = match apply_duplicate_policy(attrs, policy, pos) {
            Ok(attrs) => attrs,
            Err(err) => {
                self.report(err);
                return;
            }
        };
        if self.caps.contains(Capabilities::START_ELEMENT) {
            self.handler.start_element(&name, &attrs);
        }
        if self_closing {
            if self.caps.contains(Capabilities::END_ELEMENT) {
                self.handler.end_element(&name);
            }
            if self.stack.is_empty() {
                self.state = State::AfterRoot;
            }
        } else {
            self.stack.push(name);
            self.state = State::InElement;
        }
    }

    fn on_element_end(&mut self, name: String, pos: Pos) {
        match self.stack.last() {
            Some(open) if *open == name => {
                self.stack.pop();
                if self.caps.contains(Capabilities::END_ELEMENT) {
                    self.handler.end_element(&name);
                }
                if self.stack.is_empty() {
                    self.state = State::AfterRoot;
                }
            }
            Some(open) => {
                let message =
                    format!("mismatched end tag: expected '</{open}>', found '</{name}>'");
                self.report(ParseError::well_formedness(message, pos));
                // Recovery ignores the stray end tag; the open stack is
                // left alone so a later correct end tag still matches.
            }
            None => {
                self.report(ParseError::well_formedness(
                    format!("unexpected end tag '</{name}>'"),
                    pos,
                ));
            }
        }
    }

    /// End of input. Always lands in `Done` so the run loop terminates even
    /// when the document ends mid-element.
    fn finish(&mut self, pos: Pos) {
        let err = match self.state {
            State::InElement => self.stack.last().map(|name| {
                ParseError::well_formedness(format!("unclosed element '{name}'"), pos)
            }),
            State::BeforeRoot if !self.options.allow_fragments => Some(
                ParseError::well_formedness("document has no root element", pos),
            ),
            _ => None,
        };
        self.state = State::Done;
        if let Some(err) = err {
            self.handler.error(&err.message(), pos.line, pos.column);
            if self.first_error.is_none() {
                self.first_error = Some(err);
            }
        }
    }
}
