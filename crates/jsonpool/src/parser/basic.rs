//! The resumable push parser.
//!
//! [`BasicParser`] is a byte-level state machine. Each write consumes as much
//! input as it can, reports what it recognised to its [`Handler`], and
//! remembers where it stopped. Nothing is buffered except what a token that
//! crosses a write boundary needs to finish: the text of a number, the digits
//! of a `\u` escape, the remaining bytes of a literal. Containers are tracked
//! on an explicit stack, so nesting depth never turns into recursion.
//!
//! Strings are delivered zero-copy when they contain no escapes: the part
//! handed to the handler borrows the input. Once an escape appears the
//! decoded bytes for the rest of the current write are collected in a
//! scratch buffer.

use alloc::vec::Vec;

use super::{
    Handler, ParseOptions,
    escape_buffer::UnicodeEscapeBuffer,
    literal_buffer::{Literal, PartialLiteral, Step},
    utf8::Utf8Validator,
};
use crate::Error;

// ------------------------------------------------------------------------------------------------
// States
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Begin,
    /// A value is expected: at the top level or after `:`.
    Value,
    ArrayFirst,
    ArrayNext,
    ArrayAfterComma,
    ObjectFirst,
    ObjectNext,
    ObjectAfterComma,
    Colon,
    Literal,
    String,
    Number,
    /// The top-level value is complete; only whitespace may follow.
    End,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array(usize),
    Object(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Backslash,
    Unicode,
    /// A high surrogate was decoded; `\` must follow.
    SurrogateBackslash,
    /// `u` must follow.
    SurrogateU,
    LowUnicode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comment {
    None,
    Slash,
    Line,
    Block,
    BlockStar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Num {
    Start,
    Sign,
    Zero,
    Int,
    Dot,
    Frac,
    Exp,
    ExpSign,
    ExpInt,
}

impl Num {
    fn is_accepting(self) -> bool {
        matches!(self, Num::Zero | Num::Int | Num::Frac | Num::ExpInt)
    }
}

// ------------------------------------------------------------------------------------------------
// Parser
// ------------------------------------------------------------------------------------------------

/// A resumable SAX-style JSON parser.
///
/// Feed input with [`write_some`](Self::write_some) or
/// [`write`](Self::write); events go to the [`Handler`]. Pass `more = true`
/// while further input may follow. The parser stops after the first complete
/// top-level value and the whitespace after it.
///
/// Errors are sticky: once a write fails, every later write returns the same
/// error until [`reset`](Self::reset).
///
/// ```
/// use jsonpool::{BasicParser, Error, Handler, ParseOptions};
///
/// #[derive(Default)]
/// struct Count(usize);
///
/// impl Handler for Count {
///     fn on_object_begin(&mut self) -> Result<(), Error> { Ok(()) }
///     fn on_object_end(&mut self, _: usize) -> Result<(), Error> { Ok(()) }
///     fn on_array_begin(&mut self) -> Result<(), Error> { Ok(()) }
///     fn on_array_end(&mut self, _: usize) -> Result<(), Error> { Ok(()) }
///     fn on_key_part(&mut self, _: &[u8], _: usize) -> Result<(), Error> { Ok(()) }
///     fn on_key(&mut self, _: &[u8], _: usize) -> Result<(), Error> { Ok(()) }
///     fn on_string_part(&mut self, _: &[u8], _: usize) -> Result<(), Error> { Ok(()) }
///     fn on_string(&mut self, _: &[u8], _: usize) -> Result<(), Error> { Ok(()) }
///     fn on_int64(&mut self, _: i64, _: &[u8]) -> Result<(), Error> { self.0 += 1; Ok(()) }
///     fn on_uint64(&mut self, _: u64, _: &[u8]) -> Result<(), Error> { self.0 += 1; Ok(()) }
///     fn on_double(&mut self, _: f64, _: &[u8]) -> Result<(), Error> { self.0 += 1; Ok(()) }
///     fn on_bool(&mut self, _: bool) -> Result<(), Error> { Ok(()) }
///     fn on_null(&mut self) -> Result<(), Error> { Ok(()) }
/// }
///
/// let mut p = BasicParser::new(ParseOptions::default(), Count::default());
/// p.write_some(true, b"[1, 2.5, 1").unwrap();
/// p.write_some(false, b"8]").unwrap();
/// assert!(p.done());
/// assert_eq!(p.handler().0, 3);
/// ```
#[derive(Debug)]
pub struct BasicParser<H> {
    handler: H,
    options: ParseOptions,
    state: State,
    stack: Vec<Frame>,
    error: Option<Error>,
    more: bool,

    // strings and keys
    key: bool,
    escape: Escape,
    hex: UnicodeEscapeBuffer,
    high: u16,
    utf8: Utf8Validator,
    text_total: usize,
    /// Decoded bytes of the current string part once it contained an escape.
    scratch: Vec<u8>,

    // numbers
    num: Num,
    num_text: Vec<u8>,
    exponent: i64,

    literal: PartialLiteral,
    comment: Comment,
}

impl<H: Handler> BasicParser<H> {
    /// Creates a parser that reports to `handler`.
    pub fn new(options: ParseOptions, handler: H) -> Self {
        Self {
            handler,
            options,
            state: State::Begin,
            stack: Vec::new(),
            error: None,
            more: false,
            key: false,
            escape: Escape::None,
            hex: UnicodeEscapeBuffer::new(),
            high: 0,
            utf8: Utf8Validator::default(),
            text_total: 0,
            scratch: Vec::new(),
            num: Num::Start,
            num_text: Vec::new(),
            exponent: 0,
            literal: PartialLiteral::none(),
            comment: Comment::None,
        }
    }

    /// The handler receiving events.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consumes the parser, returning the handler.
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// The options the parser was created with.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Maximum nesting depth, from the options.
    pub fn max_depth(&self) -> usize {
        self.options.max_depth
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `true` once a complete document has been parsed.
    pub fn done(&self) -> bool {
        self.state == State::Done
    }

    /// The sticky error, if a write has failed.
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Forgets all progress and any error so that a new document can be
    /// parsed. The handler is left untouched.
    pub fn reset(&mut self) {
        log::debug!("parser reset at depth {}", self.stack.len());
        self.state = State::Begin;
        self.stack.clear();
        self.error = None;
        self.escape = Escape::None;
        self.hex.reset();
        self.utf8.reset();
        self.scratch.clear();
        self.num_text.clear();
        self.literal = PartialLiteral::none();
        self.comment = Comment::None;
    }

    /// Puts the parser into the failed state with `err`, unless it already
    /// failed.
    pub fn fail(&mut self, err: Error) {
        if self.error.is_none() {
            log::debug!("parse error: {err}");
            self.error = Some(err);
        }
    }

    /// Parses as much of `data` as possible and returns the number of bytes
    /// consumed.
    ///
    /// Consumption stops early only after a complete document; the rest of
    /// `data` is left for the caller. With `more == false` the document must
    /// be complete at the end of `data`.
    ///
    /// # Errors
    ///
    /// The first syntax, limit or handler error, which then sticks.
    pub fn write_some(&mut self, more: bool, data: &[u8]) -> Result<usize, Error> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.more = more;
        match self.run(data) {
            Ok(n) => {
                if !self.done() {
                    log::trace!("parser suspended at depth {} after {n} bytes", self.stack.len());
                }
                Ok(n)
            }
            Err(err) => {
                self.fail(err);
                Err(err)
            }
        }
    }

    /// Like [`write_some`](Self::write_some), but every byte of `data` must
    /// be consumed.
    ///
    /// # Errors
    ///
    /// As for `write_some`, plus [`Error::ExtraData`] when bytes remain after
    /// the document.
    pub fn write(&mut self, more: bool, data: &[u8]) -> Result<usize, Error> {
        let n = self.write_some(more, data)?;
        if n < data.len() {
            self.fail(Error::ExtraData);
            return Err(Error::ExtraData);
        }
        Ok(n)
    }

    // --------------------------------------------------------------------------------------------
    // Structure
    // --------------------------------------------------------------------------------------------

    fn run(&mut self, data: &[u8]) -> Result<usize, Error> {
        let mut i = 0;
        loop {
            match self.state {
                State::Begin => {
                    self.handler.on_document_begin()?;
                    self.state = State::Value;
                }
                State::Value => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    self.begin_value(data[i], &mut i)?;
                }
                State::ArrayFirst | State::ArrayAfterComma => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    let trailing_ok =
                        self.state == State::ArrayFirst || self.options.allow_trailing_commas;
                    if data[i] == b']' && trailing_ok {
                        i += 1;
                        self.close()?;
                    } else {
                        if let Some(Frame::Array(n)) = self.stack.last() {
                            if *n >= H::MAX_ARRAY_SIZE {
                                return Err(Error::ArrayTooLarge);
                            }
                        }
                        self.begin_value(data[i], &mut i)?;
                    }
                }
                State::ArrayNext => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    match data[i] {
                        b',' => self.state = State::ArrayAfterComma,
                        b']' => self.close()?,
                        _ => return Err(Error::Syntax),
                    }
                    i += 1;
                }
                State::ObjectFirst | State::ObjectAfterComma => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    let trailing_ok =
                        self.state == State::ObjectFirst || self.options.allow_trailing_commas;
                    match data[i] {
                        b'}' if trailing_ok => self.close()?,
                        b'"' => {
                            if let Some(Frame::Object(n)) = self.stack.last() {
                                if *n >= H::MAX_OBJECT_SIZE {
                                    return Err(Error::ObjectTooLarge);
                                }
                            }
                            self.begin_text(true);
                        }
                        _ => return Err(Error::Syntax),
                    }
                    i += 1;
                }
                State::ObjectNext => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    match data[i] {
                        b',' => self.state = State::ObjectAfterComma,
                        b'}' => self.close()?,
                        _ => return Err(Error::Syntax),
                    }
                    i += 1;
                }
                State::Colon => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    if data[i] != b':' {
                        return Err(Error::Syntax);
                    }
                    i += 1;
                    self.state = State::Value;
                }
                State::String => {
                    if !self.parse_text(data, &mut i)? {
                        return Ok(i);
                    }
                }
                State::Number => {
                    if !self.parse_number(data, &mut i)? {
                        return Ok(i);
                    }
                }
                State::Literal => {
                    if !self.parse_literal(data, &mut i)? {
                        return Ok(i);
                    }
                }
                State::End => {
                    if !self.skip_ws(data, &mut i)? {
                        return self.out_of_data(i);
                    }
                    self.finish_document()?;
                    return Ok(i);
                }
                State::Done => return Ok(i),
            }
        }
    }

    /// The input ran out in a whitespace position.
    fn out_of_data(&mut self, consumed: usize) -> Result<usize, Error> {
        if self.more {
            Ok(consumed)
        } else if self.state == State::End {
            self.finish_document()?;
            Ok(consumed)
        } else {
            Err(Error::Incomplete)
        }
    }

    fn finish_document(&mut self) -> Result<(), Error> {
        self.handler.on_document_end()?;
        self.state = State::Done;
        Ok(())
    }

    fn begin_value(&mut self, b: u8, i: &mut usize) -> Result<(), Error> {
        match b {
            b'{' => {
                self.open(Frame::Object(0))?;
                self.handler.on_object_begin()?;
                self.state = State::ObjectFirst;
                *i += 1;
            }
            b'[' => {
                self.open(Frame::Array(0))?;
                self.handler.on_array_begin()?;
                self.state = State::ArrayFirst;
                *i += 1;
            }
            b'"' => {
                self.begin_text(false);
                *i += 1;
            }
            b'-' | b'0'..=b'9' => {
                self.num = Num::Start;
                self.num_text.clear();
                self.exponent = 0;
                self.state = State::Number;
            }
            b't' | b'f' | b'n' => {
                self.literal = PartialLiteral::new(b);
                self.state = State::Literal;
                *i += 1;
            }
            _ => return Err(Error::Syntax),
        }
        Ok(())
    }

    fn open(&mut self, frame: Frame) -> Result<(), Error> {
        if self.stack.len() >= self.options.max_depth {
            return Err(Error::TooDeep);
        }
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(Frame::Array(n)) => self.handler.on_array_end(n)?,
            Some(Frame::Object(n)) => self.handler.on_object_end(n)?,
            None => return Err(Error::Syntax),
        }
        self.value_done();
        Ok(())
    }

    fn value_done(&mut self) {
        self.state = match self.stack.last_mut() {
            Some(Frame::Array(n)) => {
                *n += 1;
                State::ArrayNext
            }
            Some(Frame::Object(n)) => {
                *n += 1;
                State::ObjectNext
            }
            None => State::End,
        };
    }

    /// Skips whitespace and, when enabled, comments. `Ok(true)` when a
    /// significant byte is at `data[*i]`.
    fn skip_ws(&mut self, data: &[u8], i: &mut usize) -> Result<bool, Error> {
        let mut start = *i;
        while *i < data.len() {
            let b = data[*i];
            match self.comment {
                Comment::None => match b {
                    b' ' | b'\t' | b'\n' | b'\r' => *i += 1,
                    b'/' if self.options.allow_comments => {
                        start = *i;
                        *i += 1;
                        self.comment = Comment::Slash;
                    }
                    _ => return Ok(true),
                },
                Comment::Slash => {
                    self.comment = match b {
                        b'/' => Comment::Line,
                        b'*' => Comment::Block,
                        _ => return Err(Error::Syntax),
                    };
                    *i += 1;
                }
                Comment::Line => {
                    *i += 1;
                    if b == b'\n' {
                        self.comment = Comment::None;
                        self.handler.on_comment(&data[start..*i])?;
                    }
                }
                Comment::Block => {
                    *i += 1;
                    if b == b'*' {
                        self.comment = Comment::BlockStar;
                    }
                }
                Comment::BlockStar => {
                    *i += 1;
                    self.comment = match b {
                        b'/' => {
                            self.handler.on_comment(&data[start..*i])?;
                            Comment::None
                        }
                        b'*' => Comment::BlockStar,
                        _ => Comment::Block,
                    };
                }
            }
        }
        match self.comment {
            Comment::None => {}
            // a line comment may end the input
            Comment::Line if !self.more => {
                self.comment = Comment::None;
                self.handler.on_comment(&data[start..])?;
            }
            _ if !self.more => return Err(Error::Incomplete),
            _ => {
                if start < data.len() {
                    self.handler.on_comment_part(&data[start..])?;
                }
            }
        }
        Ok(false)
    }

    // --------------------------------------------------------------------------------------------
    // Tokens
    // --------------------------------------------------------------------------------------------

    fn parse_literal(&mut self, data: &[u8], i: &mut usize) -> Result<bool, Error> {
        while *i < data.len() {
            match self.literal.step(data[*i]) {
                Step::NeedMore => *i += 1,
                Step::Done(literal) => {
                    *i += 1;
                    match literal {
                        Literal::Null => self.handler.on_null()?,
                        Literal::True => self.handler.on_bool(true)?,
                        Literal::False => self.handler.on_bool(false)?,
                    }
                    self.value_done();
                    return Ok(true);
                }
                Step::Reject => return Err(Error::Syntax),
            }
        }
        if self.more {
            Ok(false)
        } else {
            Err(Error::Incomplete)
        }
    }

    fn parse_number(&mut self, data: &[u8], i: &mut usize) -> Result<bool, Error> {
        let start = *i;
        while *i < data.len() {
            let b = data[*i];
            self.num = match (self.num, b) {
                (Num::Start, b'-') => Num::Sign,
                (Num::Start | Num::Sign, b'0') => Num::Zero,
                (Num::Start | Num::Sign | Num::Int, b'1'..=b'9') | (Num::Int, b'0') => Num::Int,
                (Num::Zero | Num::Int, b'.') => Num::Dot,
                (Num::Dot | Num::Frac, b'0'..=b'9') => Num::Frac,
                (Num::Zero | Num::Int | Num::Frac, b'e' | b'E') => Num::Exp,
                (Num::Exp, b'+' | b'-') => Num::ExpSign,
                (Num::Exp | Num::ExpSign | Num::ExpInt, b'0'..=b'9') => {
                    self.exponent = self.exponent * 10 + i64::from(b - b'0');
                    if self.exponent > i64::from(i32::MAX) {
                        return Err(Error::ExponentOverflow);
                    }
                    Num::ExpInt
                }
                // leading zeros
                (Num::Zero, b'0'..=b'9') => return Err(Error::Syntax),
                (num, _) if num.is_accepting() => {
                    self.num_text.extend_from_slice(&data[start..*i]);
                    self.finish_number(&data[start..*i])?;
                    return Ok(true);
                }
                _ => return Err(Error::Syntax),
            };
            *i += 1;
        }
        self.num_text.extend_from_slice(&data[start..]);
        if self.more {
            if start < data.len() {
                self.handler.on_number_part(&data[start..])?;
            }
            return Ok(false);
        }
        if !self.num.is_accepting() {
            return Err(Error::Incomplete);
        }
        self.finish_number(&data[start..])?;
        Ok(true)
    }

    fn finish_number(&mut self, part: &[u8]) -> Result<(), Error> {
        let text = core::str::from_utf8(&self.num_text).map_err(|_| Error::Syntax)?;
        let integral = matches!(self.num, Num::Zero | Num::Int);
        // `-0` keeps its sign only as a double
        if integral && text != "-0" {
            if let Ok(v) = text.parse::<i64>() {
                self.handler.on_int64(v, part)?;
            } else if let Ok(v) = text.parse::<u64>() {
                self.handler.on_uint64(v, part)?;
            } else {
                let v = text.parse::<f64>().map_err(|_| Error::Syntax)?;
                self.handler.on_double(v, part)?;
            }
        } else {
            let v = text.parse::<f64>().map_err(|_| Error::Syntax)?;
            self.handler.on_double(v, part)?;
        }
        self.value_done();
        Ok(())
    }

    fn begin_text(&mut self, key: bool) {
        self.key = key;
        self.escape = Escape::None;
        self.hex.reset();
        self.utf8.reset();
        self.text_total = 0;
        self.state = State::String;
    }

    fn parse_text(&mut self, data: &[u8], i: &mut usize) -> Result<bool, Error> {
        self.scratch.clear();
        let check_utf8 = !self.options.allow_invalid_utf8;
        // start of the bytes not yet copied to `scratch`
        let mut run = *i;
        while *i < data.len() {
            let b = data[*i];
            match self.escape {
                Escape::None => {
                    if check_utf8 && (b >= 0x80 || !self.utf8.is_idle()) {
                        self.utf8.feed(b)?;
                        *i += 1;
                        continue;
                    }
                    match b {
                        b'"' => {
                            let end = *i;
                            *i += 1;
                            self.emit_text(&data[run..end], true)?;
                            if self.key {
                                self.state = State::Colon;
                            } else {
                                self.value_done();
                            }
                            return Ok(true);
                        }
                        b'\\' => {
                            self.scratch.extend_from_slice(&data[run..*i]);
                            self.escape = Escape::Backslash;
                        }
                        0x00..=0x1f => return Err(Error::Syntax),
                        _ => {}
                    }
                    *i += 1;
                }
                Escape::Backslash => {
                    *i += 1;
                    let decoded = match b {
                        b'"' | b'\\' | b'/' => b,
                        b'b' => 0x08,
                        b'f' => 0x0c,
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b't' => b'\t',
                        b'u' => {
                            self.escape = Escape::Unicode;
                            continue;
                        }
                        _ => return Err(Error::Syntax),
                    };
                    self.scratch.push(decoded);
                    self.escape = Escape::None;
                    run = *i;
                }
                Escape::Unicode | Escape::LowUnicode => {
                    *i += 1;
                    let Some(unit) = self.hex.feed(b)? else {
                        continue;
                    };
                    let code = if self.escape == Escape::LowUnicode {
                        if !(0xdc00..=0xdfff).contains(&unit) {
                            return Err(Error::IllegalTrailingSurrogate);
                        }
                        0x10000 + ((u32::from(self.high) - 0xd800) << 10) + (u32::from(unit) - 0xdc00)
                    } else {
                        match unit {
                            0xd800..=0xdbff => {
                                self.high = unit;
                                self.escape = Escape::SurrogateBackslash;
                                continue;
                            }
                            0xdc00..=0xdfff => return Err(Error::IllegalLeadingSurrogate),
                            _ => u32::from(unit),
                        }
                    };
                    let ch = char::from_u32(code).ok_or(Error::IllegalTrailingSurrogate)?;
                    let mut buf = [0; 4];
                    self.scratch.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    self.escape = Escape::None;
                    run = *i;
                }
                Escape::SurrogateBackslash => {
                    if b != b'\\' {
                        return Err(Error::ExpectedUtf16Escape);
                    }
                    *i += 1;
                    self.escape = Escape::SurrogateU;
                }
                Escape::SurrogateU => {
                    if b != b'u' {
                        return Err(Error::ExpectedUtf16Escape);
                    }
                    *i += 1;
                    self.escape = Escape::LowUnicode;
                }
            }
        }
        if !self.more {
            return Err(Error::Incomplete);
        }
        let tail = if self.escape == Escape::None {
            &data[run..]
        } else {
            &[][..]
        };
        if !tail.is_empty() || !self.scratch.is_empty() {
            self.emit_text(tail, false)?;
        }
        Ok(false)
    }

    /// Delivers decoded string bytes: `scratch` followed by `tail`.
    fn emit_text(&mut self, tail: &[u8], last: bool) -> Result<(), Error> {
        let part: &[u8] = if self.scratch.is_empty() {
            tail
        } else {
            self.scratch.extend_from_slice(tail);
            &self.scratch
        };
        let total = self.text_total.saturating_add(part.len());
        if self.key && total > H::MAX_KEY_SIZE {
            return Err(Error::KeyTooLarge);
        }
        if !self.key && total > H::MAX_STRING_SIZE {
            return Err(Error::StringTooLarge);
        }
        self.text_total = total;
        match (self.key, last) {
            (true, false) => self.handler.on_key_part(part, total),
            (true, true) => self.handler.on_key(part, total),
            (false, false) => self.handler.on_string_part(part, total),
            (false, true) => self.handler.on_string(part, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::BasicParser;
    use crate::{
        Error, ParseOptions,
        tests::utils::{Event, Recorder},
    };

    fn parser<const MAX: usize>(options: ParseOptions) -> BasicParser<Recorder<MAX>> {
        BasicParser::new(options, Recorder::default())
    }

    fn parse_all(text: &str) -> Result<Vec<Event>, Error> {
        let mut p = parser::<{ usize::MAX }>(ParseOptions::default());
        p.write(false, text.as_bytes())?;
        Ok(p.into_handler().events)
    }

    #[rstest]
    #[case("0", Event::Int64(0))]
    #[case("-12", Event::Int64(-12))]
    #[case("9223372036854775807", Event::Int64(i64::MAX))]
    #[case("-9223372036854775808", Event::Int64(i64::MIN))]
    #[case("9223372036854775808", Event::Uint64(9_223_372_036_854_775_808))]
    #[case("18446744073709551615", Event::Uint64(u64::MAX))]
    #[case("18446744073709551616", Event::Double(18_446_744_073_709_551_616.0))]
    #[case("-9223372036854775809", Event::Double(-9_223_372_036_854_775_809.0))]
    #[case("1.5", Event::Double(1.5))]
    #[case("1e3", Event::Double(1000.0))]
    #[case("-0", Event::Double(-0.0))]
    #[case("2E-2", Event::Double(0.02))]
    fn number_classification(#[case] text: &str, #[case] expected: Event) {
        let events = parse_all(text).unwrap();
        assert_eq!(events[1], expected);
        if let Event::Double(d) = expected {
            assert!(matches!(events[1], Event::Double(v) if v.is_sign_negative() == d.is_sign_negative()));
        }
    }

    #[rstest]
    #[case("01", Error::Syntax)]
    #[case("1.", Error::Incomplete)]
    #[case("-", Error::Incomplete)]
    #[case("1e", Error::Incomplete)]
    #[case("1e2147483648", Error::ExponentOverflow)]
    #[case("[1,]", Error::Syntax)]
    #[case("{\"a\" 1}", Error::Syntax)]
    #[case("[1 2]", Error::Syntax)]
    #[case("tru", Error::Incomplete)]
    #[case("nul1", Error::Syntax)]
    #[case("\"\\x\"", Error::Syntax)]
    #[case("\"\\u12g4\"", Error::ExpectedHexDigit)]
    #[case("\"\\udc00\"", Error::IllegalLeadingSurrogate)]
    #[case("\"\\ud800\\u0041\"", Error::IllegalTrailingSurrogate)]
    #[case("\"\\ud800x\"", Error::ExpectedUtf16Escape)]
    #[case("\"\\ud800\\x\"", Error::ExpectedUtf16Escape)]
    #[case("\"a\tb\"", Error::Syntax)]
    #[case("1 2", Error::ExtraData)]
    #[case("", Error::Incomplete)]
    #[case("/* no */ 1", Error::Syntax)]
    fn rejects(#[case] text: &str, #[case] expected: Error) {
        assert_eq!(parse_all(text), Err(expected));
    }

    #[test]
    fn invalid_utf8_is_rejected_unless_allowed() {
        let input = b"\"\xff\"";
        let mut strict = parser::<{ usize::MAX }>(ParseOptions::default());
        assert_eq!(strict.write(false, input), Err(Error::Syntax));

        let options = ParseOptions {
            allow_invalid_utf8: true,
            ..ParseOptions::default()
        };
        let mut lenient = parser::<{ usize::MAX }>(options);
        assert_eq!(lenient.write(false, input), Ok(3));
    }

    #[test]
    fn depth_limit() {
        let options = ParseOptions {
            max_depth: 4,
            ..ParseOptions::default()
        };
        let mut ok = parser::<{ usize::MAX }>(options);
        ok.write(false, b"[[[[]]]]").unwrap();
        assert!(ok.done());

        let mut deep = parser::<{ usize::MAX }>(options);
        assert_eq!(deep.write(false, b"[[[[[]]]]]"), Err(Error::TooDeep));
        assert_eq!(deep.depth(), 4);

        let mut flat = parser::<{ usize::MAX }>(ParseOptions {
            max_depth: 0,
            ..ParseOptions::default()
        });
        assert_eq!(flat.write(false, b"{}"), Err(Error::TooDeep));
    }

    #[rstest]
    #[case(b"[1,2,3]", Error::ArrayTooLarge)]
    #[case(b"{\"a\":1,\"b\":2,\"c\":3}", Error::ObjectTooLarge)]
    #[case(b"\"abc\"", Error::StringTooLarge)]
    #[case(b"{\"abc\":1}", Error::KeyTooLarge)]
    fn size_limits_come_from_the_handler(#[case] input: &[u8], #[case] expected: Error) {
        let mut p = parser::<2>(ParseOptions::default());
        assert_eq!(p.write(false, input), Err(expected));
    }

    #[test]
    fn string_limit_is_checked_before_the_part_is_delivered() {
        let mut p = parser::<2>(ParseOptions::default());
        p.write_some(true, b"\"ab").unwrap();
        assert_eq!(p.write_some(true, b"c"), Err(Error::StringTooLarge));
        assert!(
            !p.handler()
                .events
                .iter()
                .any(|e| matches!(e, Event::StringPart(s) if s.contains('c')))
        );
    }

    #[test]
    fn errors_are_sticky_until_reset() {
        let mut p = parser::<{ usize::MAX }>(ParseOptions::default());
        assert_eq!(p.write_some(true, b"[}"), Err(Error::Syntax));
        assert_eq!(p.write_some(true, b"1"), Err(Error::Syntax));
        assert_eq!(p.error(), Some(Error::Syntax));
        p.reset();
        p.write(false, b"[1]").unwrap();
        assert!(p.done());
    }

    #[test]
    fn stops_after_the_document() {
        let mut p = parser::<{ usize::MAX }>(ParseOptions::default());
        assert_eq!(p.write_some(false, b"{} []"), Ok(3));
        assert!(p.done());
        assert_eq!(p.write_some(false, b"[]"), Ok(0));
    }

    #[test]
    fn failures_injected_by_the_caller_stick() {
        let mut p = parser::<{ usize::MAX }>(ParseOptions::default());
        p.write_some(true, b"[").unwrap();
        p.fail(Error::Exception);
        assert_eq!(p.write_some(true, b"]"), Err(Error::Exception));
    }

    #[test]
    fn extensions() {
        let options = ParseOptions {
            allow_comments: true,
            allow_trailing_commas: true,
            ..ParseOptions::default()
        };
        let mut p = parser::<{ usize::MAX }>(options);
        p.write(false, b"// lead\n[1, /* two */ 2,] // trail").unwrap();
        let comments: Vec<_> = p
            .handler()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Comment(c) => Some(c.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(comments, ["// lead\n", "/* two */", "// trail"]);
    }
}
