//! Resumable conversion of values to JSON text.

use alloc::{string::String, vec::Vec};
use core::slice;
use std::io;

use crate::{
    Array, KeyValuePair, Object, Value, ValueRef,
    format::{MAX_NUMBER_LEN, format_double, format_int64, format_uint64},
};

// ------------------------------------------------------------------------------------------------
// Pending output
// ------------------------------------------------------------------------------------------------

/// Bytes produced but not yet handed out: punctuation, a number, one escape.
#[derive(Debug, Clone, Copy)]
struct Pending {
    bytes: [u8; MAX_NUMBER_LEN],
    start: usize,
    end: usize,
}

impl Pending {
    const fn new() -> Self {
        Self {
            bytes: [0; MAX_NUMBER_LEN],
            start: 0,
            end: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Only called when empty or nearly so; nothing pushed at once exceeds a
    /// formatted number.
    fn push(&mut self, text: &[u8]) {
        if self.is_empty() {
            self.start = 0;
            self.end = 0;
        }
        self.bytes[self.end..self.end + text.len()].copy_from_slice(text);
        self.end += text.len();
    }

    /// Copies as much as fits into `out`, returning the count.
    fn drain(&mut self, out: &mut [u8]) -> usize {
        let n = (self.end - self.start).min(out.len());
        out[..n].copy_from_slice(&self.bytes[self.start..self.start + n]);
        self.start += n;
        n
    }
}

// ------------------------------------------------------------------------------------------------
// Frames
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Frame<'a> {
    /// Not started yet.
    Value(&'a Value),
    Array {
        iter: slice::Iter<'a, Value>,
        first: bool,
    },
    Object {
        iter: slice::Iter<'a, KeyValuePair>,
        first: bool,
    },
    /// Inside the quotes. `key` adds the `:` after the closing quote.
    String {
        bytes: &'a [u8],
        pos: usize,
        key: bool,
    },
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn needs_escape(b: u8) -> bool {
    b < 0x20 || b == b'"' || b == b'\\'
}

fn escape(b: u8) -> ([u8; 6], usize) {
    let short = match b {
        b'"' => b'"',
        b'\\' => b'\\',
        0x08 => b'b',
        0x0c => b'f',
        b'\n' => b'n',
        b'\r' => b'r',
        b'\t' => b't',
        _ => {
            let hi = HEX[usize::from(b >> 4)];
            let lo = HEX[usize::from(b & 0xf)];
            return ([b'\\', b'u', b'0', b'0', hi, lo], 6);
        }
    };
    ([b'\\', short, 0, 0, 0, 0], 2)
}

// ------------------------------------------------------------------------------------------------
// Serializer
// ------------------------------------------------------------------------------------------------

/// Produces the JSON text of a value in caller-sized pieces.
///
/// After [`reset`](Self::reset) each [`read`](Self::read) fills as much of
/// the buffer as it can and resumes exactly where the last call stopped. The
/// only internal state is one frame per open container plus a few pending
/// bytes, so serializing never builds the whole text in memory.
///
/// ```
/// use jsonpool::{Serializer, parse};
///
/// let v = parse(br#"{"k": [1, "two"]}"#).unwrap();
/// let mut sr = Serializer::new();
/// sr.reset(&v);
/// let mut out = Vec::new();
/// let mut buf = [0u8; 3];
/// while !sr.done() {
///     let n = sr.read(&mut buf);
///     out.extend_from_slice(&buf[..n]);
/// }
/// assert_eq!(out, br#"{"k":[1,"two"]}"#);
/// ```
#[derive(Debug, Clone)]
pub struct Serializer<'a> {
    stack: Vec<Frame<'a>>,
    pending: Pending,
}

impl Default for Serializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Serializer<'a> {
    /// A serializer with nothing to produce; it reports [`done`](Self::done)
    /// until reset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stack: Vec::new(),
            pending: Pending::new(),
        }
    }

    /// Starts over with `value`.
    pub fn reset(&mut self, value: &'a Value) {
        self.clear();
        self.stack.push(Frame::Value(value));
    }

    /// Starts over with an array.
    pub fn reset_array(&mut self, array: &'a Array) {
        self.clear();
        self.pending.push(b"[");
        self.stack.push(Frame::Array {
            iter: array.iter(),
            first: true,
        });
    }

    /// Starts over with an object.
    pub fn reset_object(&mut self, object: &'a Object) {
        self.clear();
        self.pending.push(b"{");
        self.stack.push(Frame::Object {
            iter: object.iter(),
            first: true,
        });
    }

    /// Starts over with a string.
    pub fn reset_string(&mut self, s: &'a [u8]) {
        self.clear();
        self.pending.push(b"\"");
        self.stack.push(Frame::String {
            bytes: s,
            pos: 0,
            key: false,
        });
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.pending = Pending::new();
    }

    /// `true` once the whole text has been read.
    #[must_use]
    pub fn done(&self) -> bool {
        self.stack.is_empty() && self.pending.is_empty()
    }

    /// Writes the next part of the text into `out`, returning how many bytes
    /// were written. Returns less than `out.len()` only when done.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let mut n = 0;
        loop {
            n += self.pending.drain(&mut out[n..]);
            if n == out.len() || !self.pending.is_empty() {
                return n;
            }
            let Some(frame) = self.stack.pop() else {
                return n;
            };
            match frame {
                Frame::Value(value) => self.start(value),
                Frame::Array { mut iter, first } => match iter.next() {
                    Some(value) => {
                        if !first {
                            self.pending.push(b",");
                        }
                        self.stack.push(Frame::Array { iter, first: false });
                        self.stack.push(Frame::Value(value));
                    }
                    None => self.pending.push(b"]"),
                },
                Frame::Object { mut iter, first } => match iter.next() {
                    Some(kv) => {
                        self.pending.push(if first { b"\"" } else { b",\"" });
                        self.stack.push(Frame::Object { iter, first: false });
                        self.stack.push(Frame::Value(kv.value()));
                        self.stack.push(Frame::String {
                            bytes: kv.key().as_bytes(),
                            pos: 0,
                            key: true,
                        });
                    }
                    None => self.pending.push(b"}"),
                },
                Frame::String { bytes, pos, key } => {
                    let rest = &bytes[pos..];
                    let run = rest.iter().position(|&b| needs_escape(b)).unwrap_or(rest.len());
                    let take = run.min(out.len() - n);
                    out[n..n + take].copy_from_slice(&rest[..take]);
                    n += take;
                    let pos = pos + take;
                    if take < run {
                        self.stack.push(Frame::String { bytes, pos, key });
                        return n;
                    }
                    if pos == bytes.len() {
                        self.pending.push(if key { b"\":" } else { b"\"" });
                    } else {
                        let (text, len) = escape(bytes[pos]);
                        self.pending.push(&text[..len]);
                        self.stack.push(Frame::String {
                            bytes,
                            pos: pos + 1,
                            key,
                        });
                    }
                }
            }
        }
    }

    fn start(&mut self, value: &'a Value) {
        match value.view() {
            ValueRef::Null => self.pending.push(b"null"),
            ValueRef::Bool(true) => self.pending.push(b"true"),
            ValueRef::Bool(false) => self.pending.push(b"false"),
            ValueRef::Int64(v) => self.pending.push(format_int64(v).as_bytes()),
            ValueRef::Uint64(v) => self.pending.push(format_uint64(v).as_bytes()),
            ValueRef::Double(v) => self.pending.push(format_double(v).as_bytes()),
            ValueRef::String(s) => {
                self.pending.push(b"\"");
                self.stack.push(Frame::String {
                    bytes: s.as_bytes(),
                    pos: 0,
                    key: false,
                });
            }
            ValueRef::Array(a) => {
                self.pending.push(b"[");
                self.stack.push(Frame::Array {
                    iter: a.iter(),
                    first: true,
                });
            }
            ValueRef::Object(o) => {
                self.pending.push(b"{");
                self.stack.push(Frame::Object {
                    iter: o.iter(),
                    first: true,
                });
            }
        }
    }
}

impl io::Read for Serializer<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Serializer::read(self, buf))
    }
}

/// The JSON text of `value`.
#[must_use]
pub fn serialize(value: &Value) -> Vec<u8> {
    const CHUNK: usize = 256;
    let mut sr = Serializer::new();
    sr.reset(value);
    let mut out = Vec::new();
    while !sr.done() {
        let len = out.len();
        out.resize(len + CHUNK, 0);
        let n = sr.read(&mut out[len..]);
        out.truncate(len + n);
    }
    out
}

/// The JSON text of `value` as a `String`. Strings holding invalid UTF-8 are
/// converted lossily.
#[must_use]
pub fn to_string(value: &Value) -> String {
    match String::from_utf8(serialize(value)) {
        Ok(s) => s,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use rstest::rstest;

    use super::{Serializer, serialize, to_string};
    use crate::{Array, JsonString, Object, StoragePtr, Value, parse};

    fn read_in_pieces(sr: &mut Serializer<'_>, size: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; size];
        while !sr.done() {
            let n = sr.read(&mut buf);
            assert!(n == size || sr.done(), "short read before the end");
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    #[case(4096)]
    fn any_buffer_size_gives_the_same_text(#[case] size: usize) {
        let text = br#"{"a":[1,-2,18446744073709551615,2.5e0,true,false,null],"b\n":"x\"y\\z","c":{}}"#;
        let v = parse(text).unwrap();
        let mut sr = Serializer::new();
        sr.reset(&v);
        assert_eq!(read_in_pieces(&mut sr, size), text.to_vec());
    }

    #[rstest]
    #[case("plain", r#""plain""#)]
    #[case("q\"b\\", r#""q\"b\\""#)]
    #[case("\u{8}\u{c}\n\r\t", r#""\b\f\n\r\t""#)]
    #[case("\u{1}\u{1f}\u{7f}", "\"\\u0001\\u001f\u{7f}\"")]
    #[case("caf\u{e9} \u{1f600}", "\"caf\u{e9} \u{1f600}\"")]
    fn string_escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_string(&Value::from(input)), expected);
    }

    #[rstest]
    #[case(Value::from(0.5), "5e-1")]
    #[case(Value::from(f64::INFINITY), "1e99999")]
    #[case(Value::from(f64::NEG_INFINITY), "-1e99999")]
    #[case(Value::from(f64::NAN), "null")]
    #[case(Value::from(-7i8), "-7")]
    #[case(Value::from(u64::MAX), "18446744073709551615")]
    fn numbers(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(to_string(&value), expected);
    }

    #[test]
    fn infinities_come_back_as_infinite_doubles() {
        let v = parse(&serialize(&Value::from(f64::NEG_INFINITY))).unwrap();
        assert_eq!(v.as_f64(), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn containers_and_strings_directly() {
        let arr: Array = [Value::from(1), Value::from("x")].into_iter().collect();
        let obj: Object = [("k", Value::from(()))].into_iter().collect();
        let s = JsonString::from_str_in("a\tb", StoragePtr::default()).unwrap();

        let mut sr = Serializer::new();
        assert!(sr.done());
        sr.reset_array(&arr);
        assert_eq!(read_in_pieces(&mut sr, 1), br#"[1,"x"]"#);
        sr.reset_object(&obj);
        assert_eq!(read_in_pieces(&mut sr, 3), br#"{"k":null}"#);
        sr.reset_string(&s);
        assert_eq!(read_in_pieces(&mut sr, 2), br#""a\tb""#);
    }

    #[test]
    fn reset_abandons_the_previous_value() {
        let long = Value::from("a fairly long string that is not read to the end");
        let short = Value::from(true);
        let mut sr = Serializer::new();
        sr.reset(&long);
        let mut buf = [0u8; 4];
        assert_eq!(sr.read(&mut buf), 4);
        sr.reset(&short);
        assert_eq!(read_in_pieces(&mut sr, 64), b"true");
    }

    #[test]
    fn implements_io_read() {
        let v = parse(b"[[],{}]").unwrap();
        let mut sr = Serializer::new();
        sr.reset(&v);
        let mut text = String::new();
        sr.read_to_string(&mut text).unwrap();
        assert_eq!(text, "[[],{}]");
    }

    #[test]
    fn invalid_utf8_is_lossy_in_to_string() {
        let s = JsonString::from_bytes_in(b"a\xffb", StoragePtr::default()).unwrap();
        let v = Value::from(s);
        assert_eq!(serialize(&v), b"\"a\xffb\"");
        assert_eq!(to_string(&v), "\"a\u{fffd}b\"");
    }
}
