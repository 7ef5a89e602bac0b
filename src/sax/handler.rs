//! Handler trait and capability descriptor
//!
//! A `SaxHandler` receives parse events as borrowed data; every callback has
//! a no-op default body so implementors override only what they care about.
//! The `capabilities()` descriptor tells the engine which callbacks are
//! live, letting it skip building content for the inert ones. The `error`
//! callback is always live.

use crate::core::attrs::Attributes;

/// Bitflag set naming the callbacks a handler actually implements.
///
/// The engine skips content assembly for events whose flag is absent: a
/// comment in a handler without `COMMENT` is scanned for termination and
/// position but its text is never materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const INSTRUCT: Capabilities = Capabilities(1 << 0);
    pub const DOCTYPE: Capabilities = Capabilities(1 << 1);
    pub const COMMENT: Capabilities = Capabilities(1 << 2);
    pub const CDATA: Capabilities = Capabilities(1 << 3);
    pub const TEXT: Capabilities = Capabilities(1 << 4);
    pub const START_ELEMENT: Capabilities = Capabilities(1 << 5);
    pub const END_ELEMENT: Capabilities = Capabilities(1 << 6);

    /// Every callback live.
    pub const ALL: Capabilities = Capabilities(0x7F);

    /// No callbacks live (well-formedness check only; errors still fire).
    pub const NONE: Capabilities = Capabilities(0);

    #[inline]
    pub fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn union(self, other: Capabilities) -> Capabilities {
        Capabilities(self.0 | other.0)
    }
}

impl std::ops::BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Capabilities) -> Capabilities {
        self.union(rhs)
    }
}

/// Event sink for a parse. All callbacks default to no-ops.
///
/// Borrowed arguments are valid only for the duration of the call; a
/// handler that needs to keep them must copy.
pub trait SaxHandler {
    /// Which callbacks this handler implements. Defaults to all of them;
    /// override to let the engine skip content assembly for the rest.
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    /// Processing instruction, e.g. the XML declaration. `attrs` holds the
    /// pseudo-attributes of the instruction body.
    fn instruct(&mut self, _target: &str, _attrs: &Attributes) {}

    /// DOCTYPE declaration, body verbatim.
    fn doctype(&mut self, _value: &str) {}

    fn comment(&mut self, _value: &str) {}

    fn cdata(&mut self, _value: &str) {}

    /// Character data with entity and character references decoded.
    fn text(&mut self, _value: &str) {}

    fn start_element(&mut self, _name: &str, _attrs: &Attributes) {}

    fn end_element(&mut self, _name: &str) {}

    /// Called once per parse error, with the position of the construct at
    /// fault. Fires regardless of `capabilities()`.
    fn error(&mut self, _message: &str, _line: u32, _column: u32) {}
}
