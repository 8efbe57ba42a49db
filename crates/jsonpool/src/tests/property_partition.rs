use alloc::vec::Vec;

use quickcheck::QuickCheck;

use crate::{
    ParseOptions, Serializer, StoragePtr, StreamParser, Value, parse, serialize,
    tests::utils::split,
};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: serializing then parsing gives back an equal value.
#[test]
fn serialize_parse_roundtrip() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        parse(&serialize(&value)).is_ok_and(|back| back == value)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: feeding a document in arbitrary pieces yields the same value as
/// feeding it at once.
#[test]
fn partition_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value, sizes: Vec<usize>) -> bool {
        let text = serialize(&value);
        let mut p = StreamParser::new(StoragePtr::default(), ParseOptions::default());
        for piece in split(&text, &sizes) {
            if p.write(piece).is_err() {
                return false;
            }
        }
        p.release().is_ok_and(|back| back == value)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value, Vec<usize>) -> bool);
}

/// Property: reading the serializer's output through buffers of any size
/// yields the same text.
#[test]
fn serializer_buffer_size_is_invisible() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value, size: usize) -> bool {
        let size = 1 + size % 17;
        let mut sr = Serializer::new();
        sr.reset(&value);
        let mut out = Vec::new();
        let mut buf = vec![0u8; size];
        while !sr.done() {
            let n = sr.read(&mut buf);
            out.extend_from_slice(&buf[..n]);
        }
        out == serialize(&value)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Value, usize) -> bool);
}
