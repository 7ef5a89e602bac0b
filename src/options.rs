//! Per-parse configuration.
//!
//! Every knob is an explicit value handed to [`parse`](crate::parse); there
//! is no process-wide default state.

/// What to do when a start tag repeats an attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Report a well-formedness error (the XML 1.0 rule).
    #[default]
    Reject,
    /// Keep the first occurrence, drop later ones.
    KeepFirst,
    /// Keep the last occurrence.
    KeepLast,
}

/// Configuration for a single parse invocation.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Suppress `text` callbacks for whitespace-only runs.
    pub skip_whitespace_text: bool,
    /// Permit multiple (or zero) top-level elements and top-level text.
    pub allow_fragments: bool,
    /// After a markup or well-formedness error, skip to the next plausible
    /// tag boundary and keep going instead of aborting. Recovery is lossy:
    /// start/end events emitted after an error may not nest consistently
    /// with what came before it.
    pub resync_on_error: bool,
    /// Upper bound on open-element nesting, guarding against hostile input.
    pub max_nesting_depth: usize,
    /// Decode `&#NN;` / `&#xHH;` references. When off they pass through
    /// verbatim; the five named entities are always decoded.
    pub decode_numeric_char_refs: bool,
    /// Policy for repeated attribute names within one tag.
    pub duplicate_attrs: DuplicatePolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            skip_whitespace_text: false,
            allow_fragments: false,
            resync_on_error: false,
            max_nesting_depth: 1024,
            decode_numeric_char_refs: true,
            duplicate_attrs: DuplicatePolicy::Reject,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_whitespace_text(mut self, yes: bool) -> Self {
        self.skip_whitespace_text = yes;
        self
    }

    pub fn allow_fragments(mut self, yes: bool) -> Self {
        self.allow_fragments = yes;
        self
    }

    pub fn resync_on_error(mut self, yes: bool) -> Self {
        self.resync_on_error = yes;
        self
    }

    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn decode_numeric_char_refs(mut self, yes: bool) -> Self {
        self.decode_numeric_char_refs = yes;
        self
    }

    pub fn duplicate_attrs(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_attrs = policy;
        self
    }
}
