use alloc::string::ToString;

use rstest::rstest;

use crate::{
    ErrorSource, Heap, HeapError, HeapOptions, ParserError, ParserOptions, SyntaxError, TaggedValue, TransformType,
    parse_str, parse_tagged, parse_utf8,
};

fn sendable() -> ParserOptions {
    ParserOptions {
        map_literals: true,
        transform: TransformType::Sendable,
        ..Default::default()
    }
}

/// Every heap value reachable from `v`, depth first.
fn reachable(heap: &Heap, v: TaggedValue) -> alloc::vec::Vec<TaggedValue> {
    let mut out = alloc::vec::Vec::new();
    let mut stack = alloc::vec![v];
    while let Some(v) = stack.pop() {
        if !v.is_heap_object() {
            continue;
        }
        out.push(v);
        if let Ok(elements) = heap.array(v) {
            stack.extend_from_slice(elements);
        }
        for entries in [heap.properties(v), heap.map_entries(v)].into_iter().flatten() {
            for &(k, value) in entries {
                stack.push(k);
                stack.push(value);
            }
        }
    }
    out
}

#[test]
fn sendable_mode_shares_every_object() {
    let text = r##"{"a":["s",#{"k":1},{}],"b":"t"}"##;
    let mut heap = Heap::default();
    let v = parse_str(&mut heap, text, &sendable()).unwrap();
    let all = reachable(&heap, v);
    assert_eq!(all.len(), 9);
    assert!(all.iter().all(|&o| heap.is_shared(o)));

    let plain = parse_str(&mut heap, text, &ParserOptions { map_literals: true, ..Default::default() }).unwrap();
    assert!(reachable(&heap, plain).iter().all(|&o| !heap.is_shared(o)));

    // Same grammar, same result.
    assert_eq!(heap.display(v).to_string(), heap.display(plain).to_string());
}

#[rstest]
#[case(TransformType::Normal)]
#[case(TransformType::Sendable)]
fn allocation_failure_propagates(#[case] transform: TransformType) {
    let options = ParserOptions {
        transform,
        ..Default::default()
    };
    let mut heap = Heap::new(HeapOptions { max_objects: Some(2) });
    let err = parse_str(&mut heap, r#"[["a"],"b"]"#, &options).unwrap_err();
    assert_eq!(err, ParserError::heap(HeapError::OutOfMemory(2), 10));
    assert_eq!(heap.len(), 2);

    let mut heap = Heap::new(HeapOptions { max_objects: Some(0) });
    assert!(parse_tagged(&mut heap, "[]", &options).is_exception());
    // Scalars never touch the heap.
    assert_eq!(parse_tagged(&mut heap, "42", &options), TaggedValue::from_int(42));
}

#[test]
fn allocation_failure_on_close_reports_the_closing_offset() {
    let mut heap = Heap::new(HeapOptions { max_objects: Some(1) });
    let err = parse_str(&mut heap, "{\"k\": [1, 2] }", &ParserOptions::default()).unwrap_err();
    assert_eq!(err.source, ErrorSource::Heap(HeapError::OutOfMemory(1)));
    assert_eq!(err.offset, 12);
}

#[rstest]
#[case("[[1]]", Some(2), true)]
#[case("[[1]]", Some(1), false)]
#[case("[[]]", Some(1), true)]
#[case("{\"a\":{\"b\":[0]}}", Some(2), false)]
#[case("{\"a\":{\"b\":[0]}}", Some(3), true)]
#[case("{\"a\":{\"b\":[0]}}", None, true)]
fn depth_limit(#[case] text: &str, #[case] max_depth: Option<usize>, #[case] ok: bool) {
    let options = ParserOptions {
        max_depth,
        ..Default::default()
    };
    let result = parse_str(&mut Heap::default(), text, &options);
    assert_eq!(result.is_ok(), ok, "{text} with {max_depth:?}: {result:?}");
    if let Err(err) = result {
        assert_eq!(err.syntax_error(), Some(&SyntaxError::NestingTooDeep(max_depth.unwrap_or_default())));
    }
}

#[test]
fn invalid_utf8_decodes_lossily() {
    let mut heap = Heap::default();
    let v = parse_utf8(&mut heap, b"[\"a\xffb\", \"\xe2\x82\"]", &ParserOptions::default()).unwrap();
    assert_eq!(heap.display(v).to_string(), "[\"a\u{fffd}b\",\"\u{fffd}\"]");
}
