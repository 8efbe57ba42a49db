use super::{BasicParser, Handler, ParseOptions};
use crate::{Array, Error, JsonString, Object, StoragePtr, Value, ValueStack};

/// The handler behind [`Parser`] and [`StreamParser`](crate::StreamParser):
/// forwards every event to a [`ValueStack`].
#[derive(Debug, Default)]
pub(crate) struct ValueBuilder {
    pub(crate) st: ValueStack,
}

impl Handler for ValueBuilder {
    const MAX_OBJECT_SIZE: usize = Object::max_size();
    const MAX_ARRAY_SIZE: usize = Array::max_size();
    const MAX_KEY_SIZE: usize = JsonString::max_size();
    const MAX_STRING_SIZE: usize = JsonString::max_size();

    fn on_object_begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn on_object_end(&mut self, len: usize) -> Result<(), Error> {
        self.st.push_object(len)
    }

    fn on_array_begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn on_array_end(&mut self, len: usize) -> Result<(), Error> {
        self.st.push_array(len)
    }

    fn on_key_part(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.st.push_chars(part);
        Ok(())
    }

    fn on_key(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.st.push_key(part)
    }

    fn on_string_part(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.st.push_chars(part);
        Ok(())
    }

    fn on_string(&mut self, part: &[u8], _total: usize) -> Result<(), Error> {
        self.st.push_string(part)
    }

    fn on_int64(&mut self, value: i64, _part: &[u8]) -> Result<(), Error> {
        self.st.push_int64(value);
        Ok(())
    }

    fn on_uint64(&mut self, value: u64, _part: &[u8]) -> Result<(), Error> {
        self.st.push_uint64(value);
        Ok(())
    }

    fn on_double(&mut self, value: f64, _part: &[u8]) -> Result<(), Error> {
        self.st.push_double(value);
        Ok(())
    }

    fn on_bool(&mut self, value: bool) -> Result<(), Error> {
        self.st.push_bool(value);
        Ok(())
    }

    fn on_null(&mut self) -> Result<(), Error> {
        self.st.push_null();
        Ok(())
    }
}

/// Parses one complete document held in memory into a [`Value`].
///
/// Every write implies the end of input. For input that arrives in pieces,
/// use [`StreamParser`](crate::StreamParser).
///
/// ```
/// use jsonpool::{ParseOptions, Parser, StoragePtr};
///
/// let mut p = Parser::new(StoragePtr::default(), ParseOptions::default());
/// assert_eq!(p.write_some(b"[1, 2] tail").unwrap(), 7);
/// let v = p.release().unwrap();
/// assert_eq!(v.to_string(), "[1,2]");
/// ```
#[derive(Debug)]
pub struct Parser {
    p: BasicParser<ValueBuilder>,
}

impl Parser {
    /// A parser building values on `sp`.
    #[must_use]
    pub fn new(sp: StoragePtr, options: ParseOptions) -> Self {
        Self {
            p: BasicParser::new(options, ValueBuilder {
                st: ValueStack::new(sp),
            }),
        }
    }

    /// Discards any progress or error and builds the next value on `sp`.
    pub fn reset(&mut self, sp: StoragePtr) {
        self.p.reset();
        self.p.handler_mut().st.reset(sp);
    }

    /// `true` once a complete document has been parsed.
    #[must_use]
    pub fn done(&self) -> bool {
        self.p.done()
    }

    /// Parses `data` as a whole document, returning how many bytes were
    /// consumed. Bytes after the document are left alone.
    ///
    /// # Errors
    ///
    /// Any parse error, or an allocation error from the resource.
    pub fn write_some(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.p.write_some(false, data)
    }

    /// Parses `data` as a whole document.
    ///
    /// # Errors
    ///
    /// As for [`write_some`](Self::write_some), plus [`Error::ExtraData`]
    /// when bytes follow the document.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.p.write(false, data)
    }

    /// Takes the parsed value. The parser must be [`reset`](Self::reset)
    /// before parsing another document.
    ///
    /// # Errors
    ///
    /// The parser's error, or [`Error::Incomplete`] when no document has
    /// been parsed.
    pub fn release(&mut self) -> Result<Value, Error> {
        release(&mut self.p)
    }
}

pub(crate) fn release(p: &mut BasicParser<ValueBuilder>) -> Result<Value, Error> {
    if let Some(err) = p.error() {
        return Err(err);
    }
    if !p.done() {
        return Err(Error::Incomplete);
    }
    let value = p.handler_mut().st.release()?;
    // the document has been handed out; further writes need a reset
    p.fail(Error::Incomplete);
    Ok(value)
}
