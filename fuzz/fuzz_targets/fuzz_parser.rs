#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsonpool::{
    MonotonicResource, ParseOptions, StoragePtr, StreamParser, Value, parse_with, serialize,
};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::Map;

const HEADER: usize = 5; // 1 flag byte + 4-byte split seed

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r", b"/* c */", b"// c\n"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x0F);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        prefix += append_whitespace(&mut data[prefix..], max_size - prefix);
        prefix += append_value(&mut data[prefix..], size, max_size - prefix);
        prefix += append_whitespace(&mut data[prefix..], max_size - prefix);
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends up to eight whitespace runs or comments, never exceeding `limit`.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let mut written = 0;
        for _ in 0..rng.random_range(1..=limit.min(8)) {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };
    let serialized = serde_json::to_vec(&value.0).expect("serde_json serializes any value");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(serde_json::Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => serde_json::Value::Null,
            1 => serde_json::Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                serde_json::Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => serde_json::Value::Number(u.arbitrary::<i64>()?.into()),
            4 => serde_json::Value::Number(u.arbitrary::<u64>()?.into()),
            5..=10 => serde_json::Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                serde_json::Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                serde_json::Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

fn options(flags: u8) -> ParseOptions {
    ParseOptions {
        allow_comments: flags & 1 != 0,
        allow_trailing_commas: flags & 2 != 0,
        allow_invalid_utf8: flags & 4 != 0,
        max_depth: if flags & 8 != 0 { 4 } else { 64 },
    }
}

/// Splits `data` into pieces of at least one byte using `seed`.
fn split(data: &[u8], seed: u64) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut rest = data;
    let mut state = seed | 1;
    while !rest.is_empty() {
        // xorshift
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let size = 1 + (state as usize % rest.len());
        let (head, tail) = rest.split_at(size);
        pieces.push(head);
        rest = tail;
    }
    pieces
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let seed = u64::from(u32::from_le_bytes([data[1], data[2], data[3], data[4]]));
    let data = &data[HEADER..];
    let options = options(flags);

    // the whole input at once
    let whole = parse_with(data, StoragePtr::new(MonotonicResource::new()), options);

    // the same input in pieces must give the same outcome
    let mut p = StreamParser::new(StoragePtr::default(), options);
    let mut pieced = Ok(());
    for piece in split(data, seed) {
        if let Err(err) = p.write(piece) {
            pieced = Err(err);
            break;
        }
    }
    let pieced = pieced.and_then(|()| p.release());
    assert_eq!(whole, pieced, "split input disagrees with whole input");

    let Ok(value) = whole else {
        return;
    };

    // strict documents must agree with serde_json
    if flags & 7 == 0 {
        if let Ok(theirs) = serde_json::from_slice::<serde_json::Value>(data) {
            if value_is_finite(&value) {
                assert_eq!(serde_json::to_value(&value).expect("finite values serialize"), theirs);
            }
        }
    }

    // serializing and parsing again is the identity
    let text = serialize(&value);
    let again = parse_with(&text, StoragePtr::default(), ParseOptions {
        allow_invalid_utf8: true,
        max_depth: usize::MAX,
        ..ParseOptions::default()
    })
    .expect("serialized output parses");
    assert_eq!(again, value);
}

fn value_is_finite(value: &Value) -> bool {
    if let Some(d) = value.as_f64() {
        return d.is_finite();
    }
    if let Some(arr) = value.as_array() {
        return arr.iter().all(value_is_finite);
    }
    if let Some(obj) = value.as_object() {
        return obj.values().all(value_is_finite);
    }
    true
}

fuzz_target!(|data: &[u8]| parser(data));
