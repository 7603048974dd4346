//! String literal decoding.
//!
//! The common case, a literal without escapes, is decided by one scan and
//! copied straight out of the source. A literal with escapes is walked twice
//! by [`Segments`]: once by [`parse_string_length`] to validate it and size
//! the destination, and once by [`copy_char_with_backslash`] to fill it.

use alloc::vec::Vec;

use crate::{
    error::{ParserError, SyntaxError},
    heap::JsString,
    text::{CodeUnit, Cursor},
};

const QUOTE: u32 = 0x22;
const BACKSLASH: u32 = 0x5C;
const ASCII_END: u32 = 0x7F;

/// What stopped the fast scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Quote,
    Backslash,
    Control(u32),
    End,
}

/// Result of scanning from just after the opening quote.
#[derive(Debug, Clone, Copy)]
struct Scan {
    stop: Stop,
    len: usize,
    ascii: bool,
}

fn scan_string<T: CodeUnit>(units: &[T]) -> Scan {
    let mut ascii = true;
    for (len, &u) in units.iter().enumerate() {
        let c = u.to_u32();
        let stop = match c {
            QUOTE => Stop::Quote,
            BACKSLASH => Stop::Backslash,
            0x00..=0x1F => Stop::Control(c),
            _ => {
                ascii &= c <= ASCII_END;
                continue;
            }
        };
        return Scan { stop, len, ascii };
    }
    Scan {
        stop: Stop::End,
        len: units.len(),
        ascii,
    }
}

#[inline]
fn hex_val(c: u32) -> Option<u32> {
    char::from_u32(c)?.to_digit(16)
}

#[inline]
const fn is_high_surrogate(u: u32) -> bool {
    matches!(u, 0xD800..=0xDBFF)
}

#[inline]
const fn is_low_surrogate(u: u32) -> bool {
    matches!(u, 0xDC00..=0xDFFF)
}

/// A decoded piece of a literal with escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'t, T> {
    /// Source units copied as they are.
    Raw(&'t [T]),
    /// One code unit from a simple or `\u` escape; may be a lone surrogate.
    Unit(u16),
    /// A `\uXXXX\uXXXX` surrogate pair.
    Pair(char),
}

type SegmentError = (SyntaxError, usize);

/// Walks a literal from just after its opening quote up to, not including,
/// its closing quote. `pos` is left on the closing quote.
struct Segments<'t, T> {
    units: &'t [T],
    pos: usize,
    done: bool,
}

impl<'t, T: CodeUnit> Segments<'t, T> {
    fn new(units: &'t [T]) -> Self {
        Self {
            units,
            pos: 0,
            done: false,
        }
    }

    fn at(&self, i: usize) -> Option<u32> {
        self.units.get(i).map(|u| u.to_u32())
    }

    fn hex4(&self, start: usize) -> Option<u32> {
        (start..start + 4).try_fold(0, |acc, i| Some(acc << 4 | hex_val(self.at(i)?)?))
    }

    /// Decodes the escape whose backslash is at `self.pos`.
    fn parse_backslash(&mut self) -> Result<Segment<'t, T>, SegmentError> {
        let letter_at = self.pos + 1;
        let Some(letter) = self.at(letter_at) else {
            return Err((SyntaxError::UnterminatedString, letter_at));
        };
        let unit = match char::from_u32(letter).unwrap_or(char::REPLACEMENT_CHARACTER) {
            '"' => 0x22,
            '\\' => 0x5C,
            '/' => 0x2F,
            'b' => 0x08,
            'f' => 0x0C,
            'n' => 0x0A,
            'r' => 0x0D,
            't' => 0x09,
            'u' => return self.parse_unicode_escape(),
            _ => return Err((SyntaxError::InvalidEscape(letter), letter_at)),
        };
        self.pos += 2;
        Ok(Segment::Unit(unit))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn parse_unicode_escape(&mut self) -> Result<Segment<'t, T>, SegmentError> {
        let first = self
            .hex4(self.pos + 2)
            .ok_or((SyntaxError::InvalidUnicodeEscape, self.pos))?;
        self.pos += 6;
        if is_high_surrogate(first)
            && self.at(self.pos) == Some(BACKSLASH)
            && self.at(self.pos + 1) == Some(u32::from(b'u'))
        {
            if let Some(second) = self.hex4(self.pos + 2).filter(|&u| is_low_surrogate(u)) {
                let code = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                if let Some(c) = char::from_u32(code) {
                    self.pos += 6;
                    return Ok(Segment::Pair(c));
                }
            }
        }
        Ok(Segment::Unit(first as u16))
    }

    fn raw_run(&mut self) -> Result<Segment<'t, T>, SegmentError> {
        let start = self.pos;
        let scan = scan_string(self.units.get(start..).unwrap_or_default());
        match scan.stop {
            Stop::Control(c) => Err((SyntaxError::ControlCharacterInString(c), start + scan.len)),
            Stop::End => Err((SyntaxError::UnterminatedString, start + scan.len)),
            Stop::Quote | Stop::Backslash => {
                self.pos = start + scan.len;
                Ok(Segment::Raw(&self.units[start..self.pos]))
            }
        }
    }
}

impl<'t, T: CodeUnit> Iterator for Segments<'t, T> {
    type Item = Result<Segment<'t, T>, SegmentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = match self.at(self.pos) {
            Some(QUOTE) => {
                self.done = true;
                return None;
            }
            Some(BACKSLASH) => self.parse_backslash(),
            _ => self.raw_run(),
        };
        self.done = item.is_err();
        Some(item)
    }
}

/// Decoded length in UTF-16 units, whether every unit is ASCII, and the
/// offset of the closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringLength {
    pub(crate) len: usize,
    pub(crate) ascii: bool,
    pub(crate) closing_quote: usize,
}

pub(crate) fn parse_string_length<T: CodeUnit>(units: &[T]) -> Result<StringLength, SegmentError> {
    let mut segments = Segments::new(units);
    let mut len = 0;
    let mut ascii = true;
    for segment in segments.by_ref() {
        match segment? {
            Segment::Raw(run) => {
                len += T::utf16_len(run);
                ascii &= run.iter().all(|u| u.is_ascii_unit());
            }
            Segment::Unit(u) => {
                len += 1;
                ascii &= u32::from(u) <= ASCII_END;
            }
            Segment::Pair(_) => {
                len += 2;
                ascii = false;
            }
        }
    }
    Ok(StringLength {
        len,
        ascii,
        closing_quote: segments.pos,
    })
}

/// Fills a buffer of exactly `length.len` units. The literal must already
/// have been validated by [`parse_string_length`].
pub(crate) fn copy_char_with_backslash<T: CodeUnit>(
    units: &[T],
    length: StringLength,
) -> Result<JsString, SegmentError> {
    let segments = Segments::new(units);
    if length.ascii {
        let mut out = Vec::with_capacity(length.len);
        for segment in segments {
            match segment? {
                #[allow(clippy::cast_possible_truncation)]
                Segment::Raw(run) => out.extend(run.iter().map(|u| u.to_u32() as u8)),
                #[allow(clippy::cast_possible_truncation)]
                Segment::Unit(u) => out.push(u as u8),
                Segment::Pair(_) => unreachable!("pairs are never ASCII"),
            }
        }
        debug_assert_eq!(out.len(), length.len);
        return Ok(JsString::from_ascii(out));
    }

    let mut out = Vec::with_capacity(length.len);
    let mut buf = [0u16; 2];
    for segment in segments {
        match segment? {
            Segment::Raw(run) => T::push_utf16(run, &mut out),
            Segment::Unit(u) => out.push(u),
            Segment::Pair(c) => out.extend_from_slice(c.encode_utf16(&mut buf)),
        }
    }
    debug_assert_eq!(out.len(), length.len);
    Ok(JsString::from_utf16(out))
}

/// Decodes the string literal whose opening quote is at the cursor and
/// advances past its closing quote.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decode_string<T: CodeUnit>(cursor: &mut Cursor<'_, T>) -> Result<JsString, ParserError> {
    debug_assert_eq!(cursor.peek(), Some(QUOTE));
    cursor.advance(1);
    let start = cursor.offset();
    let units = cursor.rest();
    let fail = |(kind, at): SegmentError| ParserError::syntax(kind, start + at);

    let scan = scan_string(units);
    let (string, closing_quote) = match scan.stop {
        Stop::Quote => {
            let run = &units[..scan.len];
            let string = if scan.ascii {
                JsString::from_ascii(run.iter().map(|u| u.to_u32() as u8).collect())
            } else {
                let mut out = Vec::with_capacity(T::utf16_len(run));
                T::push_utf16(run, &mut out);
                JsString::from_utf16(out)
            };
            (string, scan.len)
        }
        Stop::Backslash => {
            let length = parse_string_length(units).map_err(fail)?;
            (copy_char_with_backslash(units, length).map_err(fail)?, length.closing_quote)
        }
        Stop::Control(c) => return Err(fail((SyntaxError::ControlCharacterInString(c), scan.len))),
        Stop::End => return Err(fail((SyntaxError::UnterminatedString, scan.len))),
    };
    cursor.advance(closing_quote + 1);
    Ok(string)
}
