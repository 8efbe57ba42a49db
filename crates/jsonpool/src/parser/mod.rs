//! Parsing JSON text.
//!
//! [`BasicParser`] is the event-level parser; [`Parser`] and
//! [`StreamParser`] put a [`ValueStack`](crate::ValueStack) behind it to
//! build [`Value`]s. The free functions cover the one-shot case.

mod basic;
mod escape_buffer;
mod handler;
mod literal_buffer;
mod options;
mod stream_parser;
mod utf8;
mod value_parser;

pub use basic::BasicParser;
pub use handler::Handler;
pub use options::ParseOptions;
pub use stream_parser::StreamParser;
pub use value_parser::Parser;

use crate::{Error, StoragePtr, Value};

/// Parses `data` as one JSON document on the default resource.
///
/// ```
/// let v = jsonpool::parse(br#"{"a": [1, 2.5, "x"]}"#).unwrap();
/// assert_eq!(v["a"][1].as_f64(), Some(2.5));
/// ```
///
/// # Errors
///
/// Any parse error, [`Error::ExtraData`] when bytes follow the document, or
/// an allocation error.
pub fn parse(data: &[u8]) -> Result<Value, Error> {
    parse_with(data, StoragePtr::default(), ParseOptions::default())
}

/// Parses `data` as one JSON document, building the value on `sp`.
///
/// # Errors
///
/// As for [`parse`].
pub fn parse_in(data: &[u8], sp: StoragePtr) -> Result<Value, Error> {
    parse_with(data, sp, ParseOptions::default())
}

/// Parses `data` as one JSON document with the given options.
///
/// # Errors
///
/// As for [`parse`].
pub fn parse_with(data: &[u8], sp: StoragePtr, options: ParseOptions) -> Result<Value, Error> {
    let mut p = Parser::new(sp, options);
    p.write(data)?;
    p.release()
}
