use super::{BasicParser, ParseOptions, value_parser::ValueBuilder};
use crate::{Error, StoragePtr, Value, ValueStack};

/// Parses a document that arrives in pieces.
///
/// Feed each piece with [`write`](Self::write) or
/// [`write_some`](Self::write_some), then call [`finish`](Self::finish) when
/// the input ends. A number at the very end of the input is only known to be
/// complete after `finish`.
///
/// ```
/// use jsonpool::{ParseOptions, StoragePtr, StreamParser};
///
/// let mut p = StreamParser::new(StoragePtr::default(), ParseOptions::default());
/// p.write(b"{\"k\": [tr").unwrap();
/// p.write(b"ue, 12").unwrap();
/// p.write(b"]}").unwrap();
/// p.finish().unwrap();
/// assert_eq!(p.release().unwrap().to_string(), r#"{"k":[true,12]}"#);
/// ```
#[derive(Debug)]
pub struct StreamParser {
    p: BasicParser<ValueBuilder>,
}

impl StreamParser {
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

    /// Parses the next piece, returning how many bytes were consumed. Fewer
    /// than `data.len()` are consumed only when the document ended.
    ///
    /// # Errors
    ///
    /// Any parse error, or an allocation error from the resource.
    pub fn write_some(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.p.write_some(true, data)
    }

    /// Parses the next piece, which must not extend past the document.
    ///
    /// # Errors
    ///
    /// As for [`write_some`](Self::write_some), plus [`Error::ExtraData`].
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.p.write(true, data)
    }

    /// Signals the end of input.
    ///
    /// # Errors
    ///
    /// [`Error::Incomplete`] when the document is not complete, or the
    /// parser's sticky error.
    pub fn finish(&mut self) -> Result<(), Error> {
        if self.p.done() {
            return Ok(());
        }
        self.p.write_some(false, &[]).map(drop)
    }

    /// Takes the parsed value, finishing the input first if needed. The
    /// parser must be [`reset`](Self::reset) before parsing another
    /// document.
    ///
    /// # Errors
    ///
    /// As for [`finish`](Self::finish).
    pub fn release(&mut self) -> Result<Value, Error> {
        if !self.p.done() && self.p.error().is_none() {
            self.finish()?;
        }
        super::value_parser::release(&mut self.p)
    }
}
