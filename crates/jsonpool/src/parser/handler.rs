use crate::Error;

/// Receives the events of a [`BasicParser`](crate::BasicParser).
///
/// Text that spans several writes arrives as any number of `*_part` calls
/// followed by exactly one final call; `total` is the number of bytes
/// delivered so far for the current token, the current part included. Parts
/// of a string are decoded (escapes resolved) but may split a multi-byte
/// character. Number and comment parts are raw input.
///
/// Every callback may fail. The error aborts parsing and becomes the
/// parser's sticky error.
///
/// The `MAX_*` constants bound container and text sizes. The parser checks
/// them before delivering the event that would exceed them.
pub trait Handler {
    /// Largest number of members in an object.
    const MAX_OBJECT_SIZE: usize = usize::MAX;
    /// Largest number of elements in an array.
    const MAX_ARRAY_SIZE: usize = usize::MAX;
    /// Largest key, in bytes.
    const MAX_KEY_SIZE: usize = usize::MAX;
    /// Largest string, in bytes.
    const MAX_STRING_SIZE: usize = usize::MAX;

    /// Before anything else.
    fn on_document_begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// After the top-level value and its trailing whitespace.
    fn on_document_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// `{`
    fn on_object_begin(&mut self) -> Result<(), Error>;
    /// `}` closing an object of `len` members, duplicates included.
    fn on_object_end(&mut self, len: usize) -> Result<(), Error>;
    /// `[`
    fn on_array_begin(&mut self) -> Result<(), Error>;
    /// `]` closing an array of `len` elements.
    fn on_array_end(&mut self, len: usize) -> Result<(), Error>;

    /// Part of a key.
    fn on_key_part(&mut self, part: &[u8], total: usize) -> Result<(), Error>;
    /// The last part of a key.
    fn on_key(&mut self, part: &[u8], total: usize) -> Result<(), Error>;
    /// Part of a string.
    fn on_string_part(&mut self, part: &[u8], total: usize) -> Result<(), Error>;
    /// The last part of a string.
    fn on_string(&mut self, part: &[u8], total: usize) -> Result<(), Error>;

    /// Raw text of a number that continues in a later write.
    fn on_number_part(&mut self, _part: &[u8]) -> Result<(), Error> {
        Ok(())
    }

    /// A number that fits `i64` and has no fraction or exponent.
    fn on_int64(&mut self, value: i64, part: &[u8]) -> Result<(), Error>;
    /// A non-negative integer above `i64::MAX` that fits `u64`.
    fn on_uint64(&mut self, value: u64, part: &[u8]) -> Result<(), Error>;
    /// Any other number.
    fn on_double(&mut self, value: f64, part: &[u8]) -> Result<(), Error>;
    /// `true` or `false`.
    fn on_bool(&mut self, value: bool) -> Result<(), Error>;
    /// `null`
    fn on_null(&mut self) -> Result<(), Error>;

    /// Raw text of a comment that continues in a later write.
    fn on_comment_part(&mut self, _part: &[u8]) -> Result<(), Error> {
        Ok(())
    }

    /// The last part of a comment, delimiters included.
    fn on_comment(&mut self, _part: &[u8]) -> Result<(), Error> {
        Ok(())
    }
}
