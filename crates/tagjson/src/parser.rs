//! The JSON parser core.
//!
//! Nesting is tracked by an explicit stack of [`JsonContinuation`]s rather
//! than native recursion, so input depth is bounded only by memory (or
//! [`ParserOptions::max_depth`]). Every open aggregate records where its
//! elements start in one shared accumulation buffer; closing it drains that
//! tail into the [`ObjectFactory`].
//!
//! Parsing alternates between two phases:
//!
//! - *descend*: dispatch on the next token until a complete value has been
//!   produced, pushing a continuation for every non-empty aggregate opened
//!   along the way;
//! - *fold*: hand the value to the innermost continuation, which either asks
//!   for the next element or closes its aggregate and folds that in turn.
//!
//! # Examples
//!
//! ```rust
//! use tagjson::{Heap, JsonParser, ParserOptions, PlainFactory};
//!
//! let mut heap = Heap::default();
//! let text: Vec<u16> = r#"{"key": [null, true, 3.14]}"#.encode_utf16().collect();
//! let value = JsonParser::new(&text[..], PlainFactory::new(&mut heap), &ParserOptions::default())
//!     .parse()
//!     .unwrap();
//! assert_eq!(heap.display(value).to_string(), r#"{"key":[null,true,3.14]}"#);
//! ```

use alloc::vec::Vec;

use crate::{
    error::{HeapError, ParserError, SyntaxError},
    factory::ObjectFactory,
    number::parse_number,
    options::ParserOptions,
    string::decode_string,
    tagged::TaggedValue,
    text::{CodeUnit, Cursor, MAP_MARKER, Token},
};

// ------------------------------------------------------------------------------------------------
// Continuations
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContinuationKind {
    /// Bottom of the stack: the completed value is the result.
    Return,
    Array,
    Object,
    Map,
}

/// A pending aggregate whose elements start at `index` in the accumulation
/// buffer.
#[derive(Debug, Clone, Copy)]
struct JsonContinuation {
    kind: ContinuationKind,
    index: usize,
}

// ------------------------------------------------------------------------------------------------
// Parser
// ------------------------------------------------------------------------------------------------

/// Parses one JSON text into heap values produced by `F`.
///
/// The same state machine runs over UTF-8 (`T = u8`) and UTF-16
/// (`T = u16`) input.
#[derive(Debug)]
pub struct JsonParser<'t, T: CodeUnit, F: ObjectFactory> {
    cursor: Cursor<'t, T>,
    factory: F,
    options: ParserOptions,
    continuations: Vec<JsonContinuation>,
    /// Array elements and alternating object keys and values of every open
    /// aggregate, innermost last.
    elements: Vec<TaggedValue>,
}

impl<'t, T: CodeUnit, F: ObjectFactory> JsonParser<'t, T, F> {
    pub fn new(text: &'t [T], factory: F, options: &ParserOptions) -> Self {
        Self {
            cursor: Cursor::new(text),
            factory,
            options: *options,
            continuations: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Runs the parser to completion.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error, or the first heap error raised by the
    /// factory. Objects allocated before the failure stay on the heap but are
    /// unreachable from any returned value.
    pub fn parse(mut self) -> Result<TaggedValue, ParserError> {
        let result = self.parse_json_text();
        if let Err(err) = &result {
            log::debug!("JSON parse failed: {err}");
        }
        result
    }

    fn parse_json_text(&mut self) -> Result<TaggedValue, ParserError> {
        self.cursor.skip_end_whitespace();
        self.continuations.push(JsonContinuation {
            kind: ContinuationKind::Return,
            index: 0,
        });

        'descend: loop {
            let mut value = self.parse_value()?;

            loop {
                debug_assert!(!value.is_hole());
                let Some(&continuation) = self.continuations.last() else {
                    return Ok(value);
                };
                match continuation.kind {
                    ContinuationKind::Return => {
                        self.cursor.skip_start_whitespace();
                        if !self.cursor.at_end() {
                            return Err(self.error(SyntaxError::TrailingCharacters));
                        }
                        self.continuations.pop();
                        debug_assert!(self.elements.is_empty());
                        return Ok(value);
                    }
                    ContinuationKind::Array => {
                        self.elements.push(value);
                        if self.cursor.consume_char(b',') {
                            continue 'descend;
                        }
                        if !self.cursor.consume_char(b']') {
                            return Err(self.error(SyntaxError::ExpectedCommaOrClose));
                        }
                    }
                    ContinuationKind::Object | ContinuationKind::Map => {
                        self.elements.push(value);
                        if self.cursor.consume_char(b',') {
                            self.parse_property_name()?;
                            continue 'descend;
                        }
                        if !self.cursor.consume_char(b'}') {
                            return Err(self.error(SyntaxError::ExpectedCommaOrClose));
                        }
                    }
                }
                value = self.close(continuation)?;
            }
        }
    }

    /// Descends until a complete value has been produced.
    fn parse_value(&mut self) -> Result<TaggedValue, ParserError> {
        loop {
            let token = self.cursor.parse_token(self.options.map_literals);
            let start = self.cursor.offset();
            let value = match token {
                Token::Array => {
                    self.cursor.advance(1);
                    if self.cursor.empty_array_check() {
                        self.factory.new_array(&[])
                    } else {
                        self.open(ContinuationKind::Array, start)?;
                        continue;
                    }
                }
                Token::Object | Token::Map => {
                    let (kind, marker_len) = if token == Token::Map {
                        (ContinuationKind::Map, MAP_MARKER.len())
                    } else {
                        (ContinuationKind::Object, 1)
                    };
                    self.cursor.advance(marker_len);
                    if self.cursor.empty_object_check() {
                        match kind {
                            ContinuationKind::Map => self.factory.new_map(&[]),
                            _ => self.factory.new_object(&[]),
                        }
                    } else {
                        self.open(kind, start)?;
                        self.parse_property_name()?;
                        continue;
                    }
                }
                Token::String => {
                    let s = decode_string(&mut self.cursor)?;
                    self.factory.new_string(s)
                }
                Token::Number => return parse_number(&mut self.cursor),
                Token::LiteralTrue => return self.parse_literal(b"true", TaggedValue::from_bool(true)),
                Token::LiteralFalse => return self.parse_literal(b"false", TaggedValue::from_bool(false)),
                Token::LiteralNull => return self.parse_literal(b"null", TaggedValue::null()),
                Token::Illegal => {
                    return Err(match self.cursor.peek() {
                        Some(c) => ParserError::syntax(SyntaxError::UnexpectedToken(c), start),
                        None => ParserError::syntax(SyntaxError::UnexpectedEndOfInput, start),
                    });
                }
            };
            return materialized(value, self.cursor.offset());
        }
    }

    fn parse_literal(&mut self, keyword: &[u8], value: TaggedValue) -> Result<TaggedValue, ParserError> {
        if self.cursor.match_text(keyword) {
            Ok(value)
        } else {
            Err(self.error(SyntaxError::InvalidLiteral))
        }
    }

    /// Reads `"key" :` and pushes the key onto the accumulation buffer.
    fn parse_property_name(&mut self) -> Result<(), ParserError> {
        if self.cursor.next_non_space_char() != Some(u32::from(b'"')) {
            return Err(self.error(SyntaxError::ExpectedPropertyName));
        }
        let key = decode_string(&mut self.cursor)?;
        let key = self.factory.new_string(key);
        let key = materialized(key, self.cursor.offset())?;
        if !self.cursor.consume_char(b':') {
            return Err(self.error(SyntaxError::ExpectedColon));
        }
        self.elements.push(key);
        Ok(())
    }

    fn open(&mut self, kind: ContinuationKind, offset: usize) -> Result<(), ParserError> {
        // The `Return` frame is not an aggregate.
        let depth = self.continuations.len() - 1;
        if let Some(max) = self.options.max_depth.filter(|&max| depth >= max) {
            return Err(ParserError::syntax(SyntaxError::NestingTooDeep(max), offset));
        }
        log::trace!("open {kind:?} at depth {}", depth + 1);
        self.continuations.push(JsonContinuation {
            kind,
            index: self.elements.len(),
        });
        Ok(())
    }

    /// Materializes the innermost aggregate, whose closing bracket has just
    /// been consumed, and pops its continuation.
    fn close(&mut self, continuation: JsonContinuation) -> Result<TaggedValue, ParserError> {
        let slots = &self.elements[continuation.index..];
        let value = match continuation.kind {
            ContinuationKind::Array => self.factory.new_array(slots),
            ContinuationKind::Object => self.factory.new_object(slots),
            ContinuationKind::Map => self.factory.new_map(slots),
            ContinuationKind::Return => unreachable!("the return continuation never closes"),
        };
        let value = materialized(value, self.cursor.offset())?;
        self.elements.truncate(continuation.index);
        self.continuations.pop();
        log::trace!("close {:?} at depth {}", continuation.kind, self.continuations.len());
        Ok(value)
    }

    /// A syntax error at the next non-whitespace unit, or an end-of-input
    /// error if there is none.
    fn error(&mut self, kind: SyntaxError) -> ParserError {
        self.cursor.skip_start_whitespace();
        let offset = self.cursor.offset();
        if self.cursor.at_end() {
            ParserError::syntax(SyntaxError::UnexpectedEndOfInput, offset)
        } else {
            ParserError::syntax(kind, offset)
        }
    }
}
/// Checks a factory result; `offset` is where the parse stops if it failed.
fn materialized(result: Result<TaggedValue, HeapError>, offset: usize) -> Result<TaggedValue, ParserError> {
    match result {
        Ok(value) if value.is_exception() => Err(ParserError::heap(HeapError::Exception, offset)),
        Ok(value) => Ok(value),
        Err(e) => Err(ParserError::heap(e, offset)),
    }
}
