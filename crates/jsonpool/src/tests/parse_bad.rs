use rstest::rstest;

use crate::{
    BasicParser, Error, ParseOptions, parse,
    tests::utils::{Recorder, record_pieces},
};

#[rstest]
#[case(b"", Error::Incomplete)]
#[case(b"   ", Error::Incomplete)]
#[case(b"[", Error::Incomplete)]
#[case(b"{\"a\"", Error::Incomplete)]
#[case(b"\"abc", Error::Incomplete)]
#[case(b"fals", Error::Incomplete)]
#[case(b"]", Error::Syntax)]
#[case(b"[1,,2]", Error::Syntax)]
#[case(b"{,}", Error::Syntax)]
#[case(b"{1:2}", Error::Syntax)]
#[case(b"{\"a\":1,}", Error::Syntax)]
#[case(b"[-]", Error::Syntax)]
#[case(b"[+1]", Error::Syntax)]
#[case(b"[.5]", Error::Syntax)]
#[case(b"[1.e5]", Error::Syntax)]
#[case(b"[1e+]", Error::Syntax)]
#[case(b"[00]", Error::Syntax)]
#[case(b"[-01]", Error::Syntax)]
#[case(b"[NaN]", Error::Syntax)]
#[case(b"[Infinity]", Error::Syntax)]
#[case(b"[True]", Error::Syntax)]
#[case(b"['a']", Error::Syntax)]
#[case(b"\"\x01\"", Error::Syntax)]
#[case(b"\"\\a\"", Error::Syntax)]
#[case(b"\"\\u00\"", Error::ExpectedHexDigit)]
#[case(b"\"\\ude00\"", Error::IllegalLeadingSurrogate)]
#[case(b"\"\\ud83d\"", Error::ExpectedUtf16Escape)]
#[case(b"\"\\ud83d\\ud83d\"", Error::IllegalTrailingSurrogate)]
#[case(b"\"\xc3\x28\"", Error::Syntax)]
#[case(b"\"\xed\xa0\x80\"", Error::Syntax)]
#[case(b"[1e99999999999]", Error::ExponentOverflow)]
#[case(b"[] x", Error::ExtraData)]
#[case(b"1 1", Error::ExtraData)]
fn rejected_documents(#[case] input: &[u8], #[case] expected: Error) {
    assert_eq!(parse(input), Err(expected));
    assert!(
        serde_json::from_slice::<serde_json::Value>(input).is_err(),
        "serde_json accepts {:?}",
        String::from_utf8_lossy(input)
    );
}

#[rstest]
#[case(b"[1,2,]")]
#[case(b"// c\n1")]
#[case(b"/* c */ 1")]
fn extensions_are_off_by_default(#[case] input: &[u8]) {
    assert_eq!(parse(input), Err(Error::Syntax));
}

#[test]
fn unterminated_block_comment() {
    let options = ParseOptions {
        allow_comments: true,
        ..ParseOptions::default()
    };
    assert_eq!(record_pieces(&[b"[1] /* open"], options), Err(Error::Incomplete));
}

#[test]
fn every_callback_can_fail() {
    let text = br#"{"a": [1, 18446744073709551615, 2.5, "s", true, null], "b": {}}"#;
    let mut p = BasicParser::new(ParseOptions::default(), Recorder::<{ usize::MAX }>::default());
    p.write(false, text).unwrap();
    let calls = p.into_handler().events.len();

    for n in 0..calls {
        let mut p = BasicParser::new(ParseOptions::default(), Recorder::<{ usize::MAX }>::failing_on(n));
        assert_eq!(p.write(false, text), Err(Error::TestFailure), "callback {n}");
        assert_eq!(p.handler().events.len(), n);
        assert_eq!(p.write(false, b"[]"), Err(Error::TestFailure));
    }
}
