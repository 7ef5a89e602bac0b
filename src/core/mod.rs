//! Core parsing primitives
//!
//! The low-level machinery shared by the SAX layer:
//! - Cursor: buffered byte cursor with position tracking over any `Read`
//! - Tokenizer: single-pass lexer producing positioned XML tokens
//! - Entities: named and numeric reference decoding
//! - Attrs: attribute ordering and duplicate-name policy

pub mod attrs;
pub mod cursor;
pub mod entities;
pub mod tokenizer;
