//! Every operation that allocates is retried with the first, second, third
//! (and so on) allocation failing. A failed attempt must leave the receiver
//! as it was and must not leak.

use crate::{
    Array, Error, JsonString, Object, StoragePtr, StreamParser, Value, parse, parse_in,
    tests::fail::fail_loop,
};

const LONG: &str = "a string that is comfortably longer than the inline buffer";

fn numbers(sp: &StoragePtr) -> Result<Array, Error> {
    Array::try_from_iter_in((1..=3).map(Value::from), sp.clone())
}

#[test]
fn parse_builds_or_frees_everything() {
    let text = br#"{"list": [1, "a string long enough to live on the heap", {"k": [null]}], "flag": true}"#;
    let expected = parse(text).unwrap();
    let attempts = fail_loop(|sp| {
        let v = parse_in(text, sp.clone())?;
        assert_eq!(v, expected);
        Ok(())
    });
    assert!(attempts > 3);
}

#[test]
fn stream_parser_builds_or_frees_everything() {
    let pieces: [&[u8]; 3] = [b"[\"first half of a long str", b"ing value\", {\"a\"", b": 1}]"];
    fail_loop(|sp| {
        let mut p = StreamParser::new(sp.clone(), crate::ParseOptions::default());
        for piece in pieces {
            p.write(piece)?;
        }
        let v = p.release()?;
        assert_eq!(v.to_string(), r#"["first half of a long string value",{"a":1}]"#);
        Ok(())
    });
}

#[test]
fn element_set_is_all_or_nothing() {
    let source = Value::from(Array::from_iter([Value::from(LONG), Value::from(LONG)]));
    fail_loop(|sp| {
        let mut arr = numbers(sp)?;
        let result = arr.at_mut(1)?.set_from(&source);
        if result.is_err() {
            assert_eq!(arr, numbers(&StoragePtr::default()).unwrap());
        } else {
            assert_eq!(arr[1], source);
            assert_eq!(arr[1][1].storage(), sp);
        }
        result
    });
}

#[test]
fn array_insert_is_all_or_nothing() {
    fail_loop(|sp| {
        let mut arr = numbers(sp)?;
        match arr.insert(0, Value::from(LONG)) {
            Ok(()) => {
                assert_eq!(arr.len(), 4);
                assert_eq!(arr[0].as_string().unwrap(), LONG);
                Ok(())
            }
            Err(err) => {
                assert_eq!(arr, numbers(&StoragePtr::default()).unwrap());
                Err(err)
            }
        }
    });
}

#[test]
fn array_insert_within_copies_first() {
    fail_loop(|sp| {
        let mut arr = numbers(sp)?;
        arr.insert_within(0, 1)?;
        let expected: Array = [2, 1, 2, 3].into_iter().map(Value::from).collect();
        assert_eq!(arr, expected);
        Ok(())
    });
}

#[test]
fn object_insert_is_all_or_nothing() {
    fail_loop(|sp| {
        let mut obj = Object::try_from_iter_in(
            (0..18).map(|i| (format!("key{i}"), Value::from(i))),
            sp.clone(),
        )?;
        // the nineteenth member switches the object to a hashed index
        match obj.insert_or_assign("key18", Value::from(LONG)) {
            Ok(_) => {
                assert_eq!(obj.len(), 19);
                assert_eq!(obj["key18"].as_string().unwrap(), LONG);
                Ok(())
            }
            Err(err) => {
                assert_eq!(obj.len(), 18);
                assert!(obj.get("key18").is_none());
                assert_eq!(obj["key17"], Value::from(17));
                Err(err)
            }
        }
    });
}

#[test]
fn string_append_is_all_or_nothing() {
    fail_loop(|sp| {
        let mut s = JsonString::from_str_in("short", sp.clone())?;
        match s.append(LONG.as_bytes()) {
            Ok(()) => {
                assert_eq!(s.len(), 5 + LONG.len());
                Ok(())
            }
            Err(err) => {
                assert_eq!(s, "short");
                Err(err)
            }
        }
    });
}

#[test]
fn assign_from_keeps_the_old_value_on_failure() {
    let source = parse(br#"{"deep": [[1, 2], {"s": "a string long enough to live on the heap"}]}"#)
        .unwrap();
    fail_loop(|sp| {
        let mut target = Value::string_in("before", sp.clone())?;
        match target.assign_from(&source) {
            Ok(()) => {
                assert_eq!(target, source);
                assert_eq!(target["deep"][1]["s"].storage(), sp);
                Ok(())
            }
            Err(err) => {
                assert_eq!(target.as_str(), Some("before"));
                Err(err)
            }
        }
    });
}

#[test]
fn swap_across_resources_copies_both_sides() {
    fail_loop(|sp| {
        let mut ours = Value::from(numbers(sp)?);
        let mut theirs = Value::from(LONG);
        match ours.swap(&mut theirs) {
            Ok(()) => {
                assert_eq!(ours.as_string().unwrap(), LONG);
                assert_eq!(ours.storage(), sp);
                assert!(theirs.storage().is_default());
                assert_eq!(theirs.to_string(), "[1,2,3]");
                Ok(())
            }
            Err(err) => {
                assert_eq!(ours.to_string(), "[1,2,3]");
                assert_eq!(theirs.as_string().unwrap(), LONG);
                Err(err)
            }
        }
    });
}
