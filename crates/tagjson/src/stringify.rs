//! JSON text output for heap values.
//!
//! [`Heap::display`] renders compact JSON: no whitespace, object keys in
//! insertion order, map literals as `#{...}`. Values that JSON cannot express
//! (`undefined`, non-finite numbers) render as `null`. Rendering keeps its own
//! work stack, so nesting depth is not limited by the native stack.

use alloc::{vec, vec::Vec};
use core::fmt::{self, Write};

use crate::{
    heap::{Heap, HeapObject},
    tagged::TaggedValue,
};

/// Writes `units` as the body of a JSON string literal.
///
/// Quotes, backslashes, control characters and the Unicode line separators
/// are escaped as `\uXXXX` (quote and backslash with a backslash). Unpaired
/// surrogates, which UTF-8 cannot carry, are escaped the same way.
pub(crate) fn write_escaped_units<W: Write>(units: impl IntoIterator<Item = u16>, f: &mut W) -> fmt::Result {
    for unit in char::decode_utf16(units) {
        match unit {
            Ok('"') => f.write_str("\\\"")?,
            Ok('\\') => f.write_str("\\\\")?,
            // Pre-2019 JSON parsers reject raw line separators.
            Ok(c @ ('\u{2028}' | '\u{2029}')) => write!(f, "\\u{:04X}", u32::from(c))?,
            Ok(c) if c.is_control() => write!(f, "\\u{:04X}", u32::from(c))?,
            Ok(c) => f.write_char(c)?,
            Err(e) => write!(f, "\\u{:04X}", e.unpaired_surrogate())?,
        }
    }
    Ok(())
}

/// Shortest round-trip form; `-0` becomes `0`.
pub(crate) fn write_number<W: Write>(n: f64, f: &mut W) -> fmt::Result {
    if !n.is_finite() {
        f.write_str("null")
    } else if n == 0.0 {
        f.write_char('0')
    } else {
        write!(f, "{n}")
    }
}

/// Lazily formatted JSON text of a heap value. See [`Heap::display`].
#[derive(Debug, Clone, Copy)]
pub struct HeapDisplay<'h> {
    heap: &'h Heap,
    value: TaggedValue,
}

enum Emit {
    Value(TaggedValue),
    /// A property key followed by `:`.
    Key(TaggedValue),
    Text(&'static str),
}

impl Heap {
    /// Formats `value` as compact JSON text.
    ///
    /// ```rust
    /// use tagjson::{Heap, ParserOptions, parse_str};
    ///
    /// let mut heap = Heap::default();
    /// let v = parse_str(&mut heap, r#" { "b": [1, 2.5], "a": "é" } "#, &ParserOptions::default()).unwrap();
    /// assert_eq!(heap.display(v).to_string(), r#"{"b":[1,2.5],"a":"é"}"#);
    /// ```
    #[must_use]
    pub fn display(&self, value: TaggedValue) -> HeapDisplay<'_> {
        HeapDisplay { heap: self, value }
    }
}

impl HeapDisplay<'_> {
    fn write_value(&self, value: TaggedValue, f: &mut fmt::Formatter<'_>, stack: &mut Vec<Emit>) -> fmt::Result {
        if let Some(n) = value.as_int() {
            return write!(f, "{n}");
        }
        if let Some(d) = value.as_double() {
            return write_number(d, f);
        }
        if let Some(b) = value.as_bool() {
            return f.write_str(if b { "true" } else { "false" });
        }
        match self.heap.get(value) {
            Some(HeapObject::String(s)) => {
                f.write_char('"')?;
                write_escaped_units(s.units(), f)?;
                f.write_char('"')
            }
            Some(HeapObject::Array(elements)) => {
                f.write_char('[')?;
                stack.push(Emit::Text("]"));
                for (i, &element) in elements.iter().enumerate().rev() {
                    stack.push(Emit::Value(element));
                    if i > 0 {
                        stack.push(Emit::Text(","));
                    }
                }
                Ok(())
            }
            Some(HeapObject::Object(entries)) => Self::open_entries("{", entries, f, stack),
            Some(HeapObject::Map(entries)) => Self::open_entries("#{", entries, f, stack),
            // null, undefined, and anything else without a JSON form.
            None => f.write_str("null"),
        }
    }

    fn open_entries(
        open: &str,
        entries: &[(TaggedValue, TaggedValue)],
        f: &mut fmt::Formatter<'_>,
        stack: &mut Vec<Emit>,
    ) -> fmt::Result {
        f.write_str(open)?;
        stack.push(Emit::Text("}"));
        for (i, &(key, value)) in entries.iter().enumerate().rev() {
            stack.push(Emit::Value(value));
            stack.push(Emit::Key(key));
            if i > 0 {
                stack.push(Emit::Text(","));
            }
        }
        Ok(())
    }
}

impl fmt::Display for HeapDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Emit::Value(self.value)];
        while let Some(emit) = stack.pop() {
            match emit {
                Emit::Value(value) => self.write_value(value, f, &mut stack)?,
                Emit::Key(key) => {
                    f.write_char('"')?;
                    if let Ok(name) = self.heap.string(key) {
                        write_escaped_units(name.units(), f)?;
                    }
                    f.write_str("\":")?;
                }
                Emit::Text(text) => f.write_str(text)?,
            }
        }
        Ok(())
    }
}
