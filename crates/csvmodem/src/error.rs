use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::record::Record;

/// The reader configuration was rejected before any input was read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A delimiter is `"`, `\r`, `\n`, or U+FFFD.
    #[error("invalid field or comment delimiter {0:?}")]
    InvalidDelimiter(char),
    /// The comma and the comment character are the same rune.
    #[error("comma and comment delimiter are both {0:?}")]
    DelimiterCollision(char),
    /// A delimiter given as text was empty or longer than one code point.
    #[error("delimiter {0:?} is not a single code point")]
    NotSingleCodePoint(String),
}

/// What went wrong while parsing a record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A `"` appeared in an unquoted field and lazy quotes are off.
    #[error("bare \" in non-quoted-field")]
    BareQuote,
    /// A quoted field was not terminated properly.
    #[error("extraneous or missing \" in quoted-field")]
    Quote,
    /// The record width differs from the expected number of fields.
    #[error("wrong number of fields")]
    FieldCount,
}

/// A malformed record.
///
/// Lines are 1-based physical lines. Columns are counted in runes, not bytes,
/// and are only meaningful for [`ParseErrorKind::BareQuote`] and
/// [`ParseErrorKind::Quote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub start_line: usize,
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
    pub(crate) record: Option<Record>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, start_line: usize, line: usize, column: usize) -> Self {
        Self {
            start_line,
            line,
            column,
            kind,
            record: None,
        }
    }

    pub(crate) fn field_count(start_line: usize, record: Record) -> Self {
        Self {
            start_line,
            line: start_line,
            column: 0,
            kind: ParseErrorKind::FieldCount,
            record: Some(record),
        }
    }

    /// The fully decoded record that failed the field count check.
    ///
    /// Always `None` for quoting errors, which abort the record before it is
    /// complete.
    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Takes ownership of the record attached to a field count error.
    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        self.record
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ParseErrorKind::FieldCount {
            return write!(f, "record on line {}: {}", self.line, self.kind);
        }
        if self.start_line != self.line {
            return write!(
                f,
                "record on line {}; parse error on line {}, column {}: {}",
                self.start_line, self.line, self.column, self.kind
            );
        }
        write!(
            f,
            "parse error on line {}, column {}: {}",
            self.line, self.column, self.kind
        )
    }
}

impl core::error::Error for ParseError {}

/// The chunk source failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source kept returning empty chunks.
    #[error("no progress after {attempts} empty reads")]
    NoProgress { attempts: usize },
    /// The source reported an error of its own.
    #[error("source error: {0}")]
    Upstream(String),
}

/// Any error returned while reading records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("csv: {0}")]
    Config(#[from] ConfigError),
    #[error("csv: {0}")]
    Parse(#[from] ParseError),
    #[error("csv: {0}")]
    Source(#[from] SourceError),
}

impl CsvError {
    /// The parse error, if this is one.
    #[must_use]
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            CsvError::Parse(err) => Some(err),
            _ => None,
        }
    }
}
