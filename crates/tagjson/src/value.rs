//! Owned value trees.
//!
//! This module defines the [`Value`] enum, a heap-independent copy of a
//! parsed value, and [`Heap::to_value`] to produce one.
//!
use alloc::{string::String, vec, vec::Vec};

use crate::{
    error::HeapError,
    heap::{Heap, HeapObject},
    stringify::{write_escaped_units, write_number},
    tagged::TaggedValue,
};

pub type Array = Vec<Value>;
/// Object properties or map entries in insertion order.
pub type Object = Vec<(String, Value)>;

/// A JSON value as defined by [RFC 8259], plus the map literal extension
/// and `undefined` (which a reviver may leave in an array).
///
/// Strings are converted lossily: an unpaired surrogate becomes U+FFFD.
///
/// # Examples
///
/// ```
/// use tagjson::Value;
///
/// let v = Value::Object(vec![
///     ("key".to_string(), Value::String("value".into())),
///     ("n".to_string(), Value::Number(1.5)),
/// ]);
/// assert_eq!(v.to_string(), r#"{"key":"value","n":1.5}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    Undefined,
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Object),
    Map(Object),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    ///
    /// # Examples
    ///
    /// ```
    /// use tagjson::Value;
    ///
    /// assert!(Value::Null.is_null());
    /// assert!(!Value::Undefined.is_null());
    /// ```
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` if the value is [`Boolean`].
    ///
    /// [`Boolean`]: Value::Boolean
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Boolean(..))
    }

    /// Returns `true` if the value is [`Number`].
    ///
    /// [`Number`]: Value::Number
    ///
    /// # Examples
    ///
    /// ```
    /// use tagjson::Value;
    ///
    /// assert!(Value::Number(42.0).is_number());
    /// assert!(!Value::Null.is_number());
    /// ```
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(..))
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is [`Object`].
    ///
    /// [`Object`]: Value::Object
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }

    /// Returns `true` if the value is [`Map`].
    ///
    /// [`Map`]: Value::Map
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }
}

fn write_str_literal(s: &str, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str("\"")?;
    write_escaped_units(s.encode_utf16(), f)?;
    f.write_str("\"")
}

/// Pending output of [`Value`]'s `Display`.
enum Piece<'v> {
    Value(&'v Value),
    Key(&'v str),
    Text(&'static str),
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut stack = vec![Piece::Value(self)];
        while let Some(piece) = stack.pop() {
            let value = match piece {
                Piece::Value(value) => value,
                Piece::Key(key) => {
                    write_str_literal(key, f)?;
                    f.write_str(":")?;
                    continue;
                }
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
            };
            match value {
                Value::Undefined | Value::Null => f.write_str("null")?,
                Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" })?,
                Value::Number(n) => write_number(*n, f)?,
                Value::String(s) => write_str_literal(s, f)?,
                Value::Array(arr) => {
                    f.write_str("[")?;
                    stack.push(Piece::Text("]"));
                    for (i, v) in arr.iter().enumerate().rev() {
                        stack.push(Piece::Value(v));
                        if i > 0 {
                            stack.push(Piece::Text(","));
                        }
                    }
                }
                Value::Object(entries) | Value::Map(entries) => {
                    f.write_str(if value.is_map() { "#{" } else { "{" })?;
                    stack.push(Piece::Text("}"));
                    for (i, (k, v)) in entries.iter().enumerate().rev() {
                        stack.push(Piece::Value(v));
                        stack.push(Piece::Key(k));
                        if i > 0 {
                            stack.push(Piece::Text(","));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Value {
    /// Moves the children of an aggregate into `out`, leaving it empty.
    fn detach_children(&mut self, out: &mut Vec<Value>) {
        match self {
            Value::Array(arr) => out.append(arr),
            Value::Object(entries) | Value::Map(entries) => {
                out.extend(core::mem::take(entries).into_iter().map(|(_, v)| v));
            }
            _ => {}
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        // Each popped value is childless by the time it drops.
        while let Some(mut value) = pending.pop() {
            value.detach_children(&mut pending);
        }
    }
}

#[cfg(any(test, feature = "serde"))]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Object(entries) | Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Heap conversion
// ------------------------------------------------------------------------------------------------

/// An aggregate whose children are being converted.
enum Frame<'h> {
    Array {
        elements: &'h [TaggedValue],
        out: Array,
    },
    Entries {
        entries: &'h [(TaggedValue, TaggedValue)],
        out: Object,
        map: bool,
    },
}

impl<'h> Frame<'h> {
    fn next_child(&self) -> Option<TaggedValue> {
        match self {
            Frame::Array { elements, out } => elements.get(out.len()).copied(),
            Frame::Entries { entries, out, .. } => entries.get(out.len()).map(|&(_, v)| v),
        }
    }

    fn push(&mut self, heap: &Heap, value: Value) -> Result<(), HeapError> {
        match self {
            Frame::Array { out, .. } => out.push(value),
            Frame::Entries { entries, out, .. } => {
                let (key, _) = entries[out.len()];
                out.push((heap.string(key)?.to_string_lossy(), value));
            }
        }
        Ok(())
    }

    fn finish(self) -> Value {
        match self {
            Frame::Array { out, .. } => Value::Array(out),
            Frame::Entries { out, map: true, .. } => Value::Map(out),
            Frame::Entries { out, map: false, .. } => Value::Object(out),
        }
    }
}

enum Step<'h> {
    Ready(Value),
    Open(Frame<'h>),
}

impl Heap {
    /// Copies `value` and everything reachable from it into an owned tree.
    ///
    /// # Errors
    ///
    /// [`HeapError`] if an object key is not a heap string.
    pub fn to_value(&self, value: TaggedValue) -> Result<Value, HeapError> {
        let mut stack: Vec<Frame<'_>> = Vec::new();
        let mut step = self.step(value);
        loop {
            let mut ready = match step {
                Step::Ready(value) => Some(value),
                Step::Open(frame) => {
                    stack.push(frame);
                    None
                }
            };
            // Fold finished values upwards until some frame has a child left.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Ok(ready.unwrap_or_default());
                };
                if let Some(value) = ready.take() {
                    frame.push(self, value)?;
                }
                if let Some(child) = frame.next_child() {
                    step = self.step(child);
                    break;
                }
                if let Some(frame) = stack.pop() {
                    ready = Some(frame.finish());
                }
            }
        }
    }

    fn step(&self, value: TaggedValue) -> Step<'_> {
        if let Some(n) = value.as_number() {
            return Step::Ready(Value::Number(n));
        }
        if let Some(b) = value.as_bool() {
            return Step::Ready(Value::Boolean(b));
        }
        if value.is_null() {
            return Step::Ready(Value::Null);
        }
        match self.get(value) {
            Some(HeapObject::String(s)) => Step::Ready(Value::String(s.to_string_lossy())),
            Some(HeapObject::Array(elements)) => Step::Open(Frame::Array {
                elements,
                out: Array::with_capacity(elements.len()),
            }),
            Some(HeapObject::Object(entries)) => Step::Open(Frame::Entries {
                entries,
                out: Object::with_capacity(entries.len()),
                map: false,
            }),
            Some(HeapObject::Map(entries)) => Step::Open(Frame::Entries {
                entries,
                out: Object::with_capacity(entries.len()),
                map: true,
            }),
            None => Step::Ready(Value::Undefined),
        }
    }
}
