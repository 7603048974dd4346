use alloc::{string::ToString, vec::Vec};

use rstest::rstest;

use super::{map_options, owned};
use crate::{Heap, HeapObject, JsString, ParserOptions, TaggedValue, parse_str, parse_tagged, parse_utf16};

#[test]
fn object_with_int_and_array_properties() {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, "{\"x\":1,\"y\":[2,3,null]}", &ParserOptions::default()).unwrap();
    let x = heap.get_property(v, "x").unwrap().unwrap();
    assert!(x.is_int());
    assert_eq!(x.as_int(), Some(1));

    let y = heap.get_property(v, "y").unwrap().unwrap();
    let elements = heap.array(y).unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0], TaggedValue::from_int(2));
    assert_eq!(elements[1], TaggedValue::from_int(3));
    assert!(elements[2].is_null());
}

#[test]
fn escape_free_string_is_one_byte() {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, "\"abc\"", &ParserOptions::default()).unwrap();
    let s = heap.string(v).unwrap();
    assert!(s.is_one_byte());
    assert_eq!(*s, JsString::from("abc"));
    assert_eq!(s.len(), 3);
}

#[test]
fn exponent_literal_is_a_double() {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, "3.14e2", &ParserOptions::default()).unwrap();
    assert!(v.is_double());
    assert_eq!(v.as_double(), Some(314.0));
}

#[test]
fn negative_zero_is_a_signed_double() {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, "-0", &ParserOptions::default()).unwrap();
    assert!(v.is_double());
    let d = v.as_double().unwrap();
    assert_eq!(d, 0.0);
    assert!(d.is_sign_negative());

    let zero = parse_str(&mut heap, "0", &ParserOptions::default()).unwrap();
    assert!(zero.is_int());
    assert_ne!(v.raw(), zero.raw());
}

#[test]
fn malformed_object_yields_exception_and_no_object() {
    let mut heap = Heap::default();
    let v = parse_tagged(&mut heap, "{\"a\":}", &ParserOptions::default());
    assert!(v.is_exception());
    // Only the key string was allocated; no object was ever materialized.
    assert_eq!(heap.len(), 1);
    assert!(matches!(heap.get(TaggedValue::from_heap(crate::HeapRef::new(0))), Some(HeapObject::String(_))));
}

#[rstest]
#[case("0")]
#[case("-0")]
#[case("0.5")]
fn leading_zero_accepted(#[case] text: &str) {
    assert!(owned(text).is_ok());
}

#[rstest]
#[case("01")]
#[case("-01")]
#[case("00")]
fn leading_zero_rejected(#[case] text: &str) {
    assert!(owned(text).is_err());
}

#[rstest]
#[case("123 456")]
#[case("{} x")]
#[case("[1,2] ,")]
fn trailing_garbage_rejected(#[case] text: &str) {
    assert!(owned(text).is_err());
}

#[test]
fn string_escape_fidelity() {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, "\"a\\u0041b\"", &ParserOptions::default()).unwrap();
    assert_eq!(*heap.string(v).unwrap(), JsString::from("aAb"));

    let v = parse_str(&mut heap, "\"x\\uD800y\"", &ParserOptions::default()).unwrap();
    let units: Vec<u16> = heap.string(v).unwrap().units().collect();
    assert_eq!(units, [0x78, 0xD800, 0x79]);
}

#[test]
fn deeply_nested_empty_arrays() {
    let depth = 100_000;
    let text = "[".repeat(depth) + &"]".repeat(depth);
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, &text, &ParserOptions::default()).unwrap();
    assert_eq!(heap.len(), depth);

    let mut current = v;
    let mut levels = 1;
    while let [inner] = heap.array(current).unwrap() {
        current = *inner;
        levels += 1;
    }
    assert_eq!(levels, depth);

    // The innermost `[]` never opens a continuation.
    let options = ParserOptions {
        max_depth: Some(depth - 1),
        ..Default::default()
    };
    assert!(parse_str(&mut Heap::default(), &text, &options).is_ok());
}

#[test]
fn map_key_order_is_insertion_order() {
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, r##"#{"b":1,"a":2,"c":3}"##, &map_options()).unwrap();
    let keys: Vec<_> = heap
        .map_entries(v)
        .unwrap()
        .iter()
        .map(|&(k, _)| heap.string(k).unwrap().to_string_lossy())
        .collect();
    assert_eq!(keys, ["b", "a", "c"]);
    assert_eq!(heap.display(v).to_string(), r##"#{"b":1,"a":2,"c":3}"##);
}

#[test]
fn utf16_offsets_count_code_units() {
    let wide: Vec<u16> = "[\"\u{1f600}\", x]".encode_utf16().collect();
    let err = parse_utf16(&mut Heap::default(), &wide, &ParserOptions::default()).unwrap_err();
    // The emoji is two UTF-16 units but four UTF-8 bytes.
    assert_eq!(err.offset, 7);
    let err = parse_str(&mut Heap::default(), "[\"\u{1f600}\", x]", &ParserOptions::default()).unwrap_err();
    assert_eq!(err.offset, 9);
}
