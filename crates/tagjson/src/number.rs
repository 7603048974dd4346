//! Number literals.
//!
//! The literal is validated one character class at a time while scanning, so
//! conversion only ever sees well-formed input. Short integers skip the
//! decimal-to-double conversion entirely.

use alloc::string::String;

use crate::{
    error::{ParserError, SyntaxError},
    tagged::TaggedValue,
    text::{CodeUnit, Cursor},
};

/// Longest digit string that always fits an `i32`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const INTEGER_MAX_LEN: usize = i32::MAX.ilog10() as usize;

/// Extent and shape of a validated literal, relative to its first unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberRange {
    pub(crate) len: usize,
    pub(crate) negative: bool,
    pub(crate) fast_integer: bool,
}

#[inline]
fn is_digit(c: Option<u32>) -> bool {
    c.is_some_and(|c| (u32::from(b'0')..=u32::from(b'9')).contains(&c))
}

/// Scans `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?` and returns
/// the offset of the offending unit on failure.
pub(crate) fn read_number_range<T: CodeUnit>(units: &[T]) -> Result<NumberRange, usize> {
    let at = |i: usize| units.get(i).map(|u| u.to_u32());
    let mut i = 0;

    let negative = at(0) == Some(u32::from(b'-'));
    if negative {
        i += 1;
    }

    let digits_start = i;
    match at(i) {
        Some(0x30) => {
            i += 1;
            if is_digit(at(i)) {
                return Err(i);
            }
        }
        c if is_digit(c) => {
            while is_digit(at(i)) {
                i += 1;
            }
        }
        _ => return Err(i),
    }
    let int_digits = i - digits_start;

    let mut fraction = false;
    if at(i) == Some(u32::from(b'.')) {
        fraction = true;
        i += 1;
        if !is_digit(at(i)) {
            return Err(i);
        }
        while is_digit(at(i)) {
            i += 1;
        }
    }

    let mut exponent = false;
    if matches!(at(i), Some(0x45 | 0x65)) {
        exponent = true;
        i += 1;
        if matches!(at(i), Some(0x2B | 0x2D)) {
            i += 1;
        }
        if !is_digit(at(i)) {
            return Err(i);
        }
        while is_digit(at(i)) {
            i += 1;
        }
    }

    Ok(NumberRange {
        len: i,
        negative,
        fast_integer: !fraction && !exponent && int_digits <= INTEGER_MAX_LEN,
    })
}

/// Converts a fast-path literal. `-0` has no int encoding and becomes the
/// double `-0.0`.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn fast_integer<T: CodeUnit>(units: &[T], negative: bool) -> TaggedValue {
    let digits = if negative { units.get(1..).unwrap_or_default() } else { units };
    let magnitude = digits
        .iter()
        .fold(0i32, |acc, u| acc * 10 + (u.to_u32() - u32::from(b'0')) as i32);
    match (negative, magnitude) {
        (true, 0) => TaggedValue::from_double(-0.0),
        (true, m) => TaggedValue::from_int(-m),
        (false, m) => TaggedValue::from_int(m),
    }
}

/// Converts any validated literal through the correctly rounded decimal
/// conversion.
pub(crate) fn slow_double<T: CodeUnit>(units: &[T]) -> Option<f64> {
    let literal: String = units
        .iter()
        .map(|u| char::from_u32(u.to_u32()).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    literal.parse().ok()
}

/// Parses the number at the cursor and advances past it.
pub(crate) fn parse_number<T: CodeUnit>(cursor: &mut Cursor<'_, T>) -> Result<TaggedValue, ParserError> {
    let start = cursor.offset();
    let units = cursor.rest();
    let range = read_number_range(units)
        .map_err(|at| ParserError::syntax(SyntaxError::InvalidNumber, start + at))?;
    let literal = &units[..range.len];

    let value = if range.fast_integer {
        fast_integer(literal, range.negative)
    } else {
        let d = slow_double(literal)
            .ok_or_else(|| ParserError::syntax(SyntaxError::InvalidNumber, start))?;
        TaggedValue::from_double(d)
    };
    cursor.advance(range.len);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::*;

    fn parse(s: &str) -> Result<TaggedValue, ParserError> {
        parse_number(&mut Cursor::new(s.as_bytes()))
    }

    #[test]
    fn integer_max_len_is_derived_from_i32() {
        assert_eq!(INTEGER_MAX_LEN, 9);
        assert!(10i64.pow(INTEGER_MAX_LEN as u32) - 1 <= i64::from(i32::MAX));
    }

    #[rstest]
    #[case("0", 0)]
    #[case("7", 7)]
    #[case("-12", -12)]
    #[case("999999999", 999_999_999)]
    #[case("-999999999", -999_999_999)]
    fn fast_path_ints(#[case] input: &str, #[case] expected: i32) {
        assert_eq!(parse(input).unwrap().as_int(), Some(expected));
    }

    #[rstest]
    #[case("1000000000", 1e9)]
    #[case("2147483648", 2_147_483_648.0)]
    #[case("3.14e2", 314.0)]
    #[case("0.5", 0.5)]
    #[case("-1.5E-3", -0.0015)]
    #[case("1e400", f64::INFINITY)]
    #[case("12e+2", 1200.0)]
    fn slow_path_doubles(#[case] input: &str, #[case] expected: f64) {
        let v = parse(input).unwrap();
        assert!(v.is_double(), "{input} -> {v:?}");
        assert_eq!(v.as_double(), Some(expected));
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let v = parse("-0").unwrap();
        let d = v.as_double().unwrap();
        assert_eq!(d.to_bits(), (-0.0f64).to_bits());
        assert!(parse("0").unwrap().is_int());
    }

    #[rstest]
    #[case("-", 1)]
    #[case("01", 1)]
    #[case("-01", 2)]
    #[case("00", 1)]
    #[case("1.", 2)]
    #[case(".5", 0)]
    #[case("1e", 2)]
    #[case("1e+", 3)]
    #[case("--1", 1)]
    #[case("+1", 0)]
    fn rejects_malformed(#[case] input: &str, #[case] offset: usize) {
        let err = parse(input).unwrap_err();
        assert_eq!(err, ParserError::syntax(SyntaxError::InvalidNumber, offset));
    }

    #[test]
    fn stops_at_first_non_number_unit() {
        let mut cursor = Cursor::new(b"12,3".as_slice());
        assert_eq!(parse_number(&mut cursor).unwrap().as_int(), Some(12));
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn utf16_input() {
        let wide: alloc::vec::Vec<u16> = "-2.5e1".encode_utf16().collect();
        let v = parse_number(&mut Cursor::new(&wide[..])).unwrap();
        assert_eq!(v.as_double(), Some(-25.0));
    }

    #[quickcheck]
    fn fast_and_slow_paths_agree(n: i32, negative: bool) -> bool {
        let magnitude = n.unsigned_abs() % 1_000_000_000;
        let literal = alloc::format!("{}{magnitude}", if negative { "-" } else { "" });
        let units = literal.as_bytes();
        let range = read_number_range(units).unwrap();
        assert!(range.fast_integer);
        let fast = fast_integer(units, range.negative).as_number().unwrap();
        let slow = slow_double(units).unwrap();
        fast.to_bits() == slow.to_bits()
    }
}
