use thiserror::Error;

fn unit_char(unit: &u32) -> char {
    char::from_u32(*unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// A failed parse, with the code-unit offset at which it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source} at offset {offset}")]
pub struct ParserError {
    pub source: ErrorSource,
    pub offset: usize,
}

impl ParserError {
    pub(crate) fn syntax(kind: SyntaxError, offset: usize) -> Self {
        Self {
            source: ErrorSource::Syntax(kind),
            offset,
        }
    }

    pub(crate) fn heap(error: HeapError, offset: usize) -> Self {
        Self {
            source: ErrorSource::Heap(error),
            offset,
        }
    }

    /// Returns the syntax error, if this is one.
    #[must_use]
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match &self.source {
            ErrorSource::Syntax(e) => Some(e),
            ErrorSource::Heap(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("heap error: {0}")]
    Heap(#[from] HeapError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected token '{}'", unit_char(.0))]
    UnexpectedToken(u32),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unexpected characters after the JSON value")]
    TrailingCharacters,
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid literal, expected true, false or null")]
    InvalidLiteral,
    #[error("invalid escape character '{}'", unit_char(.0))]
    InvalidEscape(u32),
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscape,
    #[error("unescaped control character {0:#04x} in string")]
    ControlCharacterInString(u32),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("expected property name")]
    ExpectedPropertyName,
    #[error("expected ':' after property name")]
    ExpectedColon,
    #[error("expected ',' or closing bracket")]
    ExpectedCommaOrClose,
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// Failure reported by the heap while materializing a value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    #[error("out of memory after {0} objects")]
    OutOfMemory(usize),
    #[error("not a heap object")]
    NotAnObject,
    #[error("wrong object kind, expected {0}")]
    WrongKind(&'static str),
    /// A factory returned the exception sentinel instead of an error.
    #[error("factory returned an exception value")]
    Exception,
}
