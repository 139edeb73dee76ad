#![allow(clippy::struct_excessive_bools)]

use alloc::string::ToString;

use crate::{error::ConfigError, utf8::RUNE_ERROR};

/// Default number of consecutive empty chunks tolerated by `fill`.
pub const DEFAULT_EMPTY_READ_BUDGET: usize = 100;

/// How the reader checks the number of fields in each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldsPerRecord {
    /// The first record's width becomes binding for all later records.
    #[default]
    Learn,
    /// Every record must have exactly this many fields.
    Exact(usize),
    /// Records may have any number of fields.
    Unchecked,
}

impl FieldsPerRecord {
    /// Maps the conventional integer form: positive counts are enforced, zero
    /// learns the width from the first record, negative disables the check.
    #[must_use]
    pub fn from_count(count: isize) -> Self {
        match usize::try_from(count) {
            Ok(0) => FieldsPerRecord::Learn,
            Ok(n) => FieldsPerRecord::Exact(n),
            Err(_) => FieldsPerRecord::Unchecked,
        }
    }
}

/// Configuration options for the CSV reader.
///
/// # Examples
///
/// ```rust
/// use csvmodem::{FieldsPerRecord, ReaderOptions};
///
/// let mut options = ReaderOptions {
///     lazy_quotes: true,
///     fields_per_record: FieldsPerRecord::Unchecked,
///     ..Default::default()
/// };
/// options.set_comma(";").unwrap();
/// options.set_comment("#").unwrap();
/// assert!(options.validate().is_ok());
/// ```
///
/// # Default
///
/// Comma-separated, no comment character, field count learned from the first
/// record, strict quoting, no trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderOptions {
    /// The field delimiter.
    ///
    /// Must not be `"`, `\r`, `\n`, or U+FFFD. It may be any other single
    /// code point, including one encoded in several bytes.
    ///
    /// # Default
    ///
    /// `','`
    pub comma: char,

    /// The comment character, if any.
    ///
    /// A line whose first rune is the comment character is skipped. The
    /// check happens only where a record starts: a comment character inside
    /// a multi-line quoted field is data.
    ///
    /// # Default
    ///
    /// `None`
    pub comment: Option<char>,

    /// The record width policy.
    ///
    /// # Default
    ///
    /// [`FieldsPerRecord::Learn`]
    pub fields_per_record: FieldsPerRecord,

    /// Whether a quote may appear in an unquoted field, and a non-doubled
    /// quote may appear in a quoted field.
    ///
    /// # Default
    ///
    /// `false`
    pub lazy_quotes: bool,

    /// Whether leading white space in a field is ignored. This is done even
    /// if the field delimiter is itself white space.
    ///
    /// # Default
    ///
    /// `false`
    pub trim_leading_space: bool,

    /// How many consecutive empty chunks a pull source may return during one
    /// `fill` before the reader gives up with
    /// [`SourceError::NoProgress`](crate::SourceError::NoProgress).
    ///
    /// # Default
    ///
    /// `100`
    pub empty_read_budget: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            comma: ',',
            comment: None,
            fields_per_record: FieldsPerRecord::Learn,
            lazy_quotes: false,
            trim_leading_space: false,
            empty_read_budget: DEFAULT_EMPTY_READ_BUDGET,
        }
    }
}

fn single_code_point(s: &str) -> Result<char, ConfigError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::NotSingleCodePoint(s.to_string())),
    }
}

fn valid_delim(c: char) -> bool {
    !matches!(c, '"' | '\r' | '\n' | RUNE_ERROR)
}

impl ReaderOptions {
    /// Sets the field delimiter from text holding exactly one code point.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotSingleCodePoint`] for empty text or text with
    /// more than one code point.
    pub fn set_comma(&mut self, comma: &str) -> Result<&mut Self, ConfigError> {
        self.comma = single_code_point(comma)?;
        Ok(self)
    }

    /// Sets the comment character from text holding exactly one code point.
    /// Empty text disables comments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotSingleCodePoint`] for text with more than one
    /// code point.
    pub fn set_comment(&mut self, comment: &str) -> Result<&mut Self, ConfigError> {
        self.comment = if comment.is_empty() {
            None
        } else {
            Some(single_code_point(comment)?)
        };
        Ok(self)
    }

    /// Returns the options with `comma` as the field delimiter.
    #[must_use]
    pub fn with_comma(mut self, comma: char) -> Self {
        self.comma = comma;
        self
    }

    /// Returns the options with `comment` as the comment character.
    #[must_use]
    pub fn with_comment(mut self, comment: char) -> Self {
        self.comment = Some(comment);
        self
    }

    /// Returns the options with the given record width policy.
    #[must_use]
    pub fn with_fields_per_record(mut self, policy: FieldsPerRecord) -> Self {
        self.fields_per_record = policy;
        self
    }

    /// Returns the options with lazy quoting switched on or off.
    #[must_use]
    pub fn with_lazy_quotes(mut self, lazy_quotes: bool) -> Self {
        self.lazy_quotes = lazy_quotes;
        self
    }

    /// Returns the options with leading white space trimming switched on or
    /// off.
    #[must_use]
    pub fn with_trim_leading_space(mut self, trim: bool) -> Self {
        self.trim_leading_space = trim;
        self
    }

    /// Checks the delimiter invariants.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidDelimiter`] if the comma or comment character is
    /// `"`, `\r`, `\n`, or U+FFFD; [`ConfigError::DelimiterCollision`] if they
    /// are equal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !valid_delim(self.comma) {
            return Err(ConfigError::InvalidDelimiter(self.comma));
        }
        if let Some(comment) = self.comment {
            if !valid_delim(comment) {
                return Err(ConfigError::InvalidDelimiter(comment));
            }
            if comment == self.comma {
                return Err(ConfigError::DelimiterCollision(comment));
            }
        }
        Ok(())
    }
}
