use alloc::{string::String, vec::Vec};

use serde::Serialize;

use crate::{BasicParser, Error, Handler, ParseOptions};

/// One handler callback, with text converted for readable assertions and
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Event {
    DocumentBegin,
    DocumentEnd,
    ObjectBegin,
    ObjectEnd(usize),
    ArrayBegin,
    ArrayEnd(usize),
    KeyPart(String),
    Key(String),
    StringPart(String),
    String(String),
    NumberPart(String),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    Bool(bool),
    Null,
    CommentPart(String),
    Comment(String),
}

fn text(part: &[u8]) -> String {
    String::from_utf8_lossy(part).into_owned()
}

/// Records every event. `MAX` bounds every container and text size, and
/// `fail_on` makes the callback with that (zero-based) index fail.
#[derive(Debug, Default)]
pub struct Recorder<const MAX: usize = { usize::MAX }> {
    pub events: Vec<Event>,
    pub fail_on: Option<usize>,
}

impl<const MAX: usize> Recorder<MAX> {
    pub fn failing_on(n: usize) -> Self {
        Self {
            events: Vec::new(),
            fail_on: Some(n),
        }
    }

    fn record(&mut self, event: Event) -> Result<(), Error> {
        if self.fail_on == Some(self.events.len()) {
            return Err(Error::TestFailure);
        }
        self.events.push(event);
        Ok(())
    }
}

impl<const MAX: usize> Handler for Recorder<MAX> {
    const MAX_OBJECT_SIZE: usize = MAX;
    const MAX_ARRAY_SIZE: usize = MAX;
    const MAX_KEY_SIZE: usize = MAX;
    const MAX_STRING_SIZE: usize = MAX;

    fn on_document_begin(&mut self) -> Result<(), Error> {
        self.record(Event::DocumentBegin)
    }

    fn on_document_end(&mut self) -> Result<(), Error> {
        self.record(Event::DocumentEnd)
    }

    fn on_object_begin(&mut self) -> Result<(), Error> {
        self.record(Event::ObjectBegin)
    }

    fn on_object_end(&mut self, len: usize) -> Result<(), Error> {
        self.record(Event::ObjectEnd(len))
    }

    fn on_array_begin(&mut self) -> Result<(), Error> {
        self.record(Event::ArrayBegin)
    }

    fn on_array_end(&mut self, len: usize) -> Result<(), Error> {
        self.record(Event::ArrayEnd(len))
    }

    fn on_key_part(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.record(Event::KeyPart(text(part)))
    }

    fn on_key(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.record(Event::Key(text(part)))
    }

    fn on_string_part(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.record(Event::StringPart(text(part)))
    }

    fn on_string(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.record(Event::String(text(part)))
    }

    fn on_number_part(&mut self, part: &[u8]) -> Result<(), Error> {
        self.record(Event::NumberPart(text(part)))
    }

    fn on_int64(&mut self, value: i64, _part: &[u8]) -> Result<(), Error> {
        self.record(Event::Int64(value))
    }

    fn on_uint64(&mut self, value: u64, _part: &[u8]) -> Result<(), Error> {
        self.record(Event::Uint64(value))
    }

    fn on_double(&mut self, value: f64, _part: &[u8]) -> Result<(), Error> {
        self.record(Event::Double(value))
    }

    fn on_bool(&mut self, value: bool) -> Result<(), Error> {
        self.record(Event::Bool(value))
    }

    fn on_null(&mut self) -> Result<(), Error> {
        self.record(Event::Null)
    }

    fn on_comment_part(&mut self, part: &[u8]) -> Result<(), Error> {
        self.record(Event::CommentPart(text(part)))
    }

    fn on_comment(&mut self, part: &[u8]) -> Result<(), Error> {
        self.record(Event::Comment(text(part)))
    }
}

/// Splits `data` into pieces whose sizes are taken, in turn, from `sizes`
/// (each at least one byte). The remainder becomes the last piece.
pub fn split<'a>(data: &'a [u8], sizes: &[usize]) -> Vec<&'a [u8]> {
    let mut pieces = Vec::new();
    let mut rest = data;
    for &s in sizes {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(1 + s % rest.len());
        pieces.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

/// Feeds `pieces` to a recording parser, ending the input after the last.
pub fn record_pieces(pieces: &[&[u8]], options: ParseOptions) -> Result<Vec<Event>, Error> {
    let mut p = BasicParser::new(options, Recorder::<{ usize::MAX }>::default());
    for piece in pieces {
        p.write(true, piece)?;
    }
    p.write(false, &[])?;
    Ok(p.into_handler().events)
}
