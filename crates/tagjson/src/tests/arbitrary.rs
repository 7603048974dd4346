use alloc::{boxed::Box, string::String, vec::Vec};

use quickcheck::{Arbitrary, Gen};

use crate::{Array, Object, Value};

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct JsonNumber(pub(crate) f64);

impl Arbitrary for JsonNumber {
    fn arbitrary(g: &mut Gen) -> Self {
        // Small integers exercise the fast path; arbitrary doubles the slow one.
        if bool::arbitrary(g) {
            return Self(f64::from(i32::arbitrary(g)));
        }
        let mut value = f64::arbitrary(g);
        while !value.is_finite() {
            value = f64::arbitrary(g);
        }

        Self(value)
    }
}

fn entries(g: &mut Gen, depth: usize, maps: bool) -> Object {
    let len = usize::arbitrary(g) % 4;
    let mut out = Object::new();
    for _ in 0..len {
        let key = String::arbitrary(g);
        // Duplicate keys collapse on parse.
        if out.iter().any(|(k, _)| *k == key) {
            continue;
        }
        out.push((key, gen_value(g, depth - 1, maps)));
    }
    out
}

fn gen_value(g: &mut Gen, depth: usize, maps: bool) -> Value {
    let kinds = match (depth, maps) {
        (0, _) => 4,
        (_, false) => 6,
        (_, true) => 7,
    };
    match usize::arbitrary(g) % kinds {
        0 => Value::Null,
        1 => Value::Boolean(bool::arbitrary(g)),
        2 => Value::Number(JsonNumber::arbitrary(g).0),
        3 => Value::String(String::arbitrary(g)),
        4 => {
            let len = usize::arbitrary(g) % 4;
            let mut vec = Array::new();
            for _ in 0..len {
                vec.push(gen_value(g, depth - 1, maps));
            }
            Value::Array(vec)
        }
        5 => Value::Object(entries(g, depth, maps)),
        _ => Value::Map(entries(g, depth, maps)),
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 4;
        gen_value(g, depth, true)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Value::Array(items) => Box::new(items.clone().into_iter()),
            Value::Object(entries) | Value::Map(entries) => {
                let children: Vec<Value> = entries.iter().map(|(_, v)| v.clone()).collect();
                Box::new(children.into_iter())
            }
            _ => Box::new(core::iter::empty()),
        }
    }
}

/// A value with no map literals, i.e. one plain JSON can express.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlainJson(pub(crate) Value);

impl Arbitrary for PlainJson {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 4;
        Self(gen_value(g, depth, false))
    }
}
