//! Code-unit access and the lexer cursor.
//!
//! The parser is written once over [`CodeUnit`]; the `u8` (UTF-8) and `u16`
//! (UTF-16) implementations only differ in how an escape-free run of a string
//! literal is transcoded.
//!
//! Nothing here reports errors. Classification returns [`Token::Illegal`] or
//! `false` and the parser decides what syntax error that is.

use alloc::vec::Vec;
use core::fmt::Debug;

use bstr::ByteSlice;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// A unit of source text: a UTF-8 byte or a UTF-16 code unit.
pub trait CodeUnit: Copy + Eq + Debug + sealed::Sealed + 'static {
    fn to_u32(self) -> u32;

    #[inline]
    fn is_ascii_unit(self) -> bool {
        self.to_u32() < 0x80
    }

    /// Number of UTF-16 code units `run` decodes to.
    fn utf16_len(run: &[Self]) -> usize;

    /// Appends the UTF-16 decoding of `run` to `out`.
    fn push_utf16(run: &[Self], out: &mut Vec<u16>);
}

impl CodeUnit for u8 {
    #[inline]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }

    fn utf16_len(run: &[u8]) -> usize {
        if run.is_ascii() {
            run.len()
        } else {
            run.chars().map(char::len_utf16).sum()
        }
    }

    // Invalid UTF-8 decodes to U+FFFD, one per maximal invalid subsequence.
    fn push_utf16(run: &[u8], out: &mut Vec<u16>) {
        let mut buf = [0u16; 2];
        for ch in run.chars() {
            out.extend_from_slice(ch.encode_utf16(&mut buf));
        }
    }
}

impl CodeUnit for u16 {
    #[inline]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }

    fn utf16_len(run: &[u16]) -> usize {
        run.len()
    }

    fn push_utf16(run: &[u16], out: &mut Vec<u16>) {
        out.extend_from_slice(run);
    }
}

/// JSON whitespace: space, tab, LF, CR. Not the Unicode set.
#[inline]
pub(crate) const fn is_whitespace(c: u32) -> bool {
    matches!(c, 0x20 | 0x09 | 0x0A | 0x0D)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Object,
    Array,
    Number,
    String,
    LiteralTrue,
    LiteralFalse,
    LiteralNull,
    Map,
    Illegal,
}

/// Opening marker of a map literal, `#{`.
pub(crate) const MAP_MARKER: [u8; 2] = *b"#{";

/// A position in `text[..end]`. `end` shrinks when trailing whitespace is
/// skipped; reads past it return `None`.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'t, T> {
    text: &'t [T],
    current: usize,
    end: usize,
}

impl<'t, T: CodeUnit> Cursor<'t, T> {
    pub(crate) fn new(text: &'t [T]) -> Self {
        Self {
            text,
            current: 0,
            end: text.len(),
        }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.current
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.current >= self.end
    }

    /// The unread text.
    #[inline]
    pub(crate) fn rest(&self) -> &'t [T] {
        self.text.get(self.current..self.end).unwrap_or_default()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u32> {
        self.peek_at(0)
    }

    #[inline]
    pub(crate) fn peek_at(&self, ahead: usize) -> Option<u32> {
        self.rest().get(ahead).map(|u| u.to_u32())
    }

    /// Moves forward by `n`, never past the end.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.current = self.current.saturating_add(n).min(self.end);
    }

    pub(crate) fn skip_start_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.current += 1;
        }
    }

    pub(crate) fn skip_end_whitespace(&mut self) {
        while self.end > self.current && is_whitespace(self.text[self.end - 1].to_u32()) {
            self.end -= 1;
        }
    }

    pub(crate) fn next_non_space_char(&mut self) -> Option<u32> {
        self.skip_start_whitespace();
        self.peek()
    }

    /// Classifies the next value without consuming it.
    pub(crate) fn parse_token(&mut self, map_literals: bool) -> Token {
        let Some(c) = self.next_non_space_char() else {
            return Token::Illegal;
        };
        match char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER) {
            '{' => Token::Object,
            '[' => Token::Array,
            '"' => Token::String,
            '0'..='9' | '-' => Token::Number,
            't' => Token::LiteralTrue,
            'f' => Token::LiteralFalse,
            'n' => Token::LiteralNull,
            '#' if map_literals && self.peek_at(1) == Some(u32::from(MAP_MARKER[1])) => Token::Map,
            _ => Token::Illegal,
        }
    }

    /// Consumes `keyword` if the text continues with exactly it.
    pub(crate) fn match_text(&mut self, keyword: &[u8]) -> bool {
        let matches = self
            .rest()
            .get(..keyword.len())
            .is_some_and(|head| head.iter().zip(keyword).all(|(u, &k)| u.to_u32() == u32::from(k)));
        if matches {
            self.advance(keyword.len());
        }
        matches
    }

    /// Skips whitespace, then consumes `c` if it is next.
    pub(crate) fn consume_char(&mut self, c: u8) -> bool {
        if self.next_non_space_char() == Some(u32::from(c)) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// After `[`: consumes a directly following `]`.
    pub(crate) fn empty_array_check(&mut self) -> bool {
        self.consume_char(b']')
    }

    /// After `{` or `#{`: consumes a directly following `}`.
    pub(crate) fn empty_object_check(&mut self) -> bool {
        self.consume_char(b'}')
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn units(s: &str) -> alloc::vec::Vec<u16> {
        s.encode_utf16().collect()
    }

    #[rstest]
    #[case("{", Token::Object)]
    #[case("  [", Token::Array)]
    #[case("\t\"x\"", Token::String)]
    #[case("-1", Token::Number)]
    #[case("7", Token::Number)]
    #[case("true", Token::LiteralTrue)]
    #[case("fals", Token::LiteralFalse)]
    #[case("\r\nnull", Token::LiteralNull)]
    #[case("#{", Token::Map)]
    #[case("#[", Token::Illegal)]
    #[case("+1", Token::Illegal)]
    #[case("\u{a0}1", Token::Illegal)]
    #[case("", Token::Illegal)]
    #[case("   ", Token::Illegal)]
    fn classifies_tokens(#[case] input: &str, #[case] expected: Token) {
        assert_eq!(Cursor::new(input.as_bytes()).parse_token(true), expected);
        let wide = units(input);
        assert_eq!(Cursor::new(&wide[..]).parse_token(true), expected);
    }

    #[test]
    fn map_marker_requires_option() {
        assert_eq!(Cursor::new(b"#{}".as_slice()).parse_token(false), Token::Illegal);
    }

    #[test]
    fn parse_token_does_not_consume() {
        let mut c = Cursor::new(b"  #{".as_slice());
        assert_eq!(c.parse_token(true), Token::Map);
        assert_eq!(c.offset(), 2);
        assert_eq!(c.peek(), Some(u32::from(b'#')));
    }

    #[test]
    fn match_text_advances_only_on_success() {
        let mut c = Cursor::new(b"nul".as_slice());
        assert!(!c.match_text(b"null"));
        assert_eq!(c.offset(), 0);

        let mut c = Cursor::new(b"nullx".as_slice());
        assert!(c.match_text(b"null"));
        assert_eq!(c.offset(), 4);
        assert_eq!(c.peek(), Some(u32::from(b'x')));
    }

    #[test]
    fn end_whitespace_shrinks_the_window() {
        let mut c = Cursor::new(b" 1 \n\t ".as_slice());
        c.skip_end_whitespace();
        c.skip_start_whitespace();
        assert_eq!(c.rest(), b"1");
        c.advance(5);
        assert!(c.at_end());
        assert_eq!(c.peek(), None);
    }

    #[test]
    fn empty_checks() {
        let mut c = Cursor::new(b" \n]".as_slice());
        assert!(c.empty_array_check());
        assert!(c.at_end());

        let mut c = Cursor::new(b" 1]".as_slice());
        assert!(!c.empty_array_check());
        assert_eq!(c.peek(), Some(u32::from(b'1')));

        let mut c = Cursor::new(b"}".as_slice());
        assert!(c.empty_object_check());
    }

    #[test]
    fn utf8_runs_transcode_to_utf16() {
        let run = "a\u{e9}\u{1f600}".as_bytes();
        assert_eq!(<u8 as CodeUnit>::utf16_len(run), 4);
        let mut out = Vec::new();
        <u8 as CodeUnit>::push_utf16(run, &mut out);
        assert_eq!(out, units("a\u{e9}\u{1f600}"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let run = b"a\xffb";
        let mut out = Vec::new();
        <u8 as CodeUnit>::push_utf16(run, &mut out);
        assert_eq!(out, units("a\u{fffd}b"));
        assert_eq!(<u8 as CodeUnit>::utf16_len(run), 3);
    }
}
