//! A JSON parser that builds NaN-boxed [`TaggedValue`]s on a managed [`Heap`].
//!
//! The parser is written once over UTF-8 and UTF-16 input, never recurses
//! on nested aggregates, and materializes every string, array, object and
//! map through an [`ObjectFactory`]. The factory decides what kind of heap
//! objects are produced; [`TransformType`] picks between the two built-in
//! ones.
//!
//! ```rust
//! use tagjson::{Heap, ParserOptions, parse_str};
//!
//! let mut heap = Heap::default();
//! let v = parse_str(&mut heap, r#"{"x":1,"y":[2,3,null]}"#, &ParserOptions::default()).unwrap();
//! let x = heap.get_property(v, "x").unwrap().unwrap();
//! assert_eq!(x.as_int(), Some(1));
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod factory;
mod heap;
mod internalize;
mod number;
mod options;
mod parser;
mod string;
mod stringify;
mod tagged;
mod text;
mod value;

#[cfg(test)]
mod tests;

pub use error::{ErrorSource, HeapError, ParserError, SyntaxError};
pub use factory::{ObjectFactory, PlainFactory, SendableFactory};
pub use heap::{Heap, HeapObject, JsString, Properties, Sharing};
pub use internalize::{PropertyKey, internalize};
pub use options::{HeapOptions, ParserOptions, TransformType};
pub use parser::JsonParser;
pub use stringify::HeapDisplay;
pub use tagged::{HeapRef, TaggedValue};
pub use text::CodeUnit;
pub use value::{Array, Object, Value};

/// Parses UTF-8 text.
///
/// # Errors
///
/// A [`ParserError`] carrying the offending byte offset.
pub fn parse_str(heap: &mut Heap, text: &str, options: &ParserOptions) -> Result<TaggedValue, ParserError> {
    parse_with(heap, text.as_bytes(), options)
}

/// Parses 8-bit text. Invalid UTF-8 inside string literals decodes to U+FFFD.
///
/// # Errors
///
/// A [`ParserError`] carrying the offending byte offset.
pub fn parse_utf8(heap: &mut Heap, text: &[u8], options: &ParserOptions) -> Result<TaggedValue, ParserError> {
    parse_with(heap, text, options)
}

/// Parses UTF-16 text. Unpaired surrogates in string literals are kept.
///
/// # Errors
///
/// A [`ParserError`] carrying the offending code-unit offset.
pub fn parse_utf16(heap: &mut Heap, text: &[u16], options: &ParserOptions) -> Result<TaggedValue, ParserError> {
    parse_with(heap, text, options)
}

/// Parses UTF-8 text, returning [`TaggedValue::exception`] on any failure.
#[must_use]
pub fn parse_tagged(heap: &mut Heap, text: &str, options: &ParserOptions) -> TaggedValue {
    parse_str(heap, text, options).unwrap_or_else(|_| TaggedValue::exception())
}

fn parse_with<T: CodeUnit>(heap: &mut Heap, text: &[T], options: &ParserOptions) -> Result<TaggedValue, ParserError> {
    match options.transform {
        TransformType::Normal => JsonParser::new(text, PlainFactory::new(heap), options).parse(),
        TransformType::Sendable => JsonParser::new(text, SendableFactory::new(heap), options).parse(),
    }
}
