//! SAX (Simple API for XML) layer
//!
//! Event-driven parsing: the engine walks the token stream once and calls
//! into a [`SaxHandler`] as constructs complete.
//!
//! ```text
//! Read source ---> Tokenizer ---> Engine ---> SaxHandler callbacks
//! ```
//!
//! Handlers declare their live callbacks through [`Capabilities`]; the
//! engine skips assembling content nobody will see. [`EventCollector`] is
//! the batteries-included handler that records everything.

pub mod collector;
pub mod handler;
pub mod parser;

pub use collector::{EventCollector, SaxEvent};
pub use handler::{Capabilities, SaxHandler};
pub use parser::{parse, parse_str};
