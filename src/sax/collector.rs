//! Event collector
//!
//! A ready-made handler that records every event as an owned `SaxEvent`.
//! Useful for tests and for callers who want the whole event stream rather
//! than streaming callbacks.

use crate::core::attrs::Attributes;
use crate::sax::handler::{Capabilities, SaxHandler};

/// An owned record of one handler callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    Instruct {
        target: String,
        attrs: Vec<(String, String)>,
    },
    Doctype {
        value: String,
    },
    Comment {
        value: String,
    },
    CData {
        value: String,
    },
    Text {
        value: String,
    },
    StartElement {
        name: String,
        attrs: Vec<(String, String)>,
    },
    EndElement {
        name: String,
    },
    Error {
        message: String,
        line: u32,
        column: u32,
    },
}

/// Records all events in order, including errors.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SaxEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        EventCollector {
            events: Vec::with_capacity(64),
        }
    }

    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }
}

fn owned_attrs(attrs: &Attributes) -> Vec<(String, String)> {
    attrs
        .iter()
        .map(|(n, v)| (n.to_owned(), v.to_owned()))
        .collect()
}

impl SaxHandler for EventCollector {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn instruct(&mut self, target: &str, attrs: &Attributes) {
        self.events.push(SaxEvent::Instruct {
            target: target.to_owned(),
            attrs: owned_attrs(attrs),
        });
    }

    fn doctype(&mut self, value: &str) {
        self.events.push(SaxEvent::Doctype {
            value: value.to_owned(),
        });
    }

    fn comment(&mut self, value: &str) {
        self.events.push(SaxEvent::Comment {
            value: value.to_owned(),
        });
    }

    fn cdata(&mut self, value: &str) {
        self.events.push(SaxEvent::CData {
            value: value.to_owned(),
        });
    }

    fn text(&mut self, value: &str) {
        self.events.push(SaxEvent::Text {
            value: value.to_owned(),
        });
    }

    fn start_element(&mut self, name: &str, attrs: &Attributes) {
        self.events.push(SaxEvent::StartElement {
            name: name.to_owned(),
            attrs: owned_attrs(attrs),
        });
    }

    fn end_element(&mut self, name: &str) {
        self.events.push(SaxEvent::EndElement {
            name: name.to_owned(),
        });
    }

    fn error(&mut self, message: &str, line: u32, column: u32) {
        self.events.push(SaxEvent::Error {
            message: message.to_owned(),
            line,
            column,
        });
    }
}
