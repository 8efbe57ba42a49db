use rstest::rstest;

use crate::{
    ParseOptions, StoragePtr, StreamParser, parse,
    tests::utils::{Event, record_pieces, split},
};

fn oracle(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap()
}

#[rstest]
#[case("[]")]
#[case("{}")]
#[case("  true \n")]
#[case("null")]
#[case("0")]
#[case("-1.25e-3")]
#[case("1E+2")]
#[case("0.5")]
#[case("9223372036854775808")]
#[case("123456789012345678901234567890")]
#[case(r#""é""#)]
#[case(r#""😀""#)]
#[case(r#""\"\\\/\b\f\n\r\t""#)]
#[case("\"caf\u{e9} \u{1f600}\"")]
#[case(r#"[1, [2, [3, {"a": null}]]]"#)]
#[case(r#"{"a":1,"b":[true,false],"c":{"d":"e"}}"#)]
#[case(r#"{"a":1,"b":2,"a":3}"#)]
#[case("[\r\n\t1 ,2\n]")]
fn accepted_documents_match_serde_json(#[case] text: &str) {
    let v = parse(text.as_bytes()).unwrap();
    assert_eq!(serde_json::to_value(&v).unwrap(), oracle(text));
}

#[test]
fn surrogate_pairs_become_four_byte_utf8() {
    let v = parse(r#""𝄞""#.as_bytes()).unwrap();
    assert_eq!(v.as_string().unwrap().as_bytes(), "\u{1d11e}".as_bytes());
}

#[test]
fn every_two_piece_split_gives_the_same_value() {
    let text = r#"{"kéy": [1, -2.5e3, "s\ntrAing", true, null, {"n": 18446744073709551615}]}"#.as_bytes();
    let expected = parse(text).unwrap();
    for at in 0..=text.len() {
        let (head, tail) = text.split_at(at);
        let mut p = StreamParser::new(StoragePtr::default(), ParseOptions::default());
        p.write(head).unwrap();
        p.write(tail).unwrap();
        assert_eq!(p.release().unwrap(), expected, "split at {at}");
    }
}

#[test]
fn one_byte_pieces_produce_the_whole_event_stream() {
    let text = br#"[12, "ab"]"#;
    let pieces = split(text, &[0; 16]);
    assert_eq!(pieces.len(), text.len());
    let events = record_pieces(&pieces, ParseOptions::default()).unwrap();
    assert_eq!(events.first(), Some(&Event::DocumentBegin));
    assert_eq!(events.last(), Some(&Event::DocumentEnd));
}

#[test]
fn deep_nesting_up_to_the_limit() {
    let depth = 500;
    let text = "[".repeat(depth) + &"]".repeat(depth);
    let options = ParseOptions {
        max_depth: depth,
        ..ParseOptions::default()
    };
    let v = crate::parse_with(text.as_bytes(), StoragePtr::default(), options).unwrap();
    let mut cur = &v;
    let mut levels = 0;
    while let Some(arr) = cur.as_array() {
        levels += 1;
        match arr.first() {
            Some(inner) => cur = inner,
            None => break,
        }
    }
    assert_eq!(levels, depth);
}

#[test]
fn values_survive_a_round_trip() {
    let text = r#"{"a":[1,-2,2.5e0,"x"],"b":{"c":null,"d":true}}"#;
    let v = parse(text.as_bytes()).unwrap();
    assert_eq!(v.to_string(), text);
    assert_eq!(parse(v.to_string().as_bytes()).unwrap(), v);
}
