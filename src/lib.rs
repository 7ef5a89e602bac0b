//! saxine - streaming SAX-style XML parsing
//!
//! A single forward pass over any [`std::io::Read`] source, bounded memory,
//! and callbacks as constructs complete. Nothing is resolved against
//! external resources and no tree is ever built.
//!
//! # Example
//!
//! ```
//! use saxine::{parse_str, Attributes, ParseOptions, SaxHandler};
//!
//! #[derive(Default)]
//! struct TitleGrabber {
//!     titles: Vec<String>,
//!     in_title: bool,
//! }
//!
//! impl SaxHandler for TitleGrabber {
//!     fn start_element(&mut self, name: &str, _attrs: &Attributes) {
//!         self.in_title = name == "title";
//!     }
//!     fn end_element(&mut self, _name: &str) {
//!         self.in_title = false;
//!     }
//!     fn text(&mut self, value: &str) {
//!         if self.in_title {
//!             self.titles.push(value.to_owned());
//!         }
//!     }
//! }
//!
//! let mut grabber = TitleGrabber::default();
//! parse_str(
//!     &mut grabber,
//!     "<feed><title>hello</title></feed>",
//!     ParseOptions::new(),
//! )?;
//! assert_eq!(grabber.titles, ["hello"]);
//! # Ok::<(), saxine::ParseError>(())
//! ```
//!
//! # Errors
//!
//! Every problem is reported through the handler's `error` callback with a
//! one-based line and column. I/O and encoding errors always end the parse;
//! markup and well-formedness errors end it too unless
//! [`ParseOptions::resync_on_error`] is set, in which case the parser skips
//! to the next plausible tag and keeps going. Either way, [`parse`] returns
//! `Err` with the first error encountered.

mod core;
mod error;
mod options;
mod sax;

pub use crate::core::attrs::Attributes;
pub use crate::error::{ParseError, Pos};
pub use crate::options::{DuplicatePolicy, ParseOptions};
pub use crate::sax::{parse, parse_str, Capabilities, EventCollector, SaxEvent, SaxHandler};
