//! The resumable record parser.
//!
//! # Overview
//!
//! [`RecordParser`] turns buffered lines into records. It never performs I/O:
//! each call to [`RecordParser::step`] consumes what the [`SliceReader`]
//! already holds and returns [`Step::Pending`] when it needs more. All state
//! needed to resume (including a partially read multi-line quoted field) is
//! kept in the parser, so the caller may fill the reader and call `step`
//! again at any time.
//!
//! Lines are read whole, up to and including `\n`, with `\r\n` normalized
//! to `\n`. The current physical line is retained until the next one is read
//! so that error columns can be counted in runes.
//!
//! # Examples
//!
//! ```rust
//! use csvmodem::{ReaderOptions, RecordParser, SliceReader, Step};
//!
//! let mut parser = RecordParser::new(ReaderOptions::default()).unwrap();
//! let mut input = SliceReader::from_bytes("a,b\nc,d\n");
//! let mut records = Vec::new();
//! while let Step::Record(record) = parser.step(&mut input).unwrap() {
//!     records.push(record);
//! }
//! assert_eq!(records, [["a", "b"], ["c", "d"]]);
//! ```

use alloc::vec::Vec;

use bstr::ByteSlice;

use crate::{
    error::{ConfigError, ParseError, ParseErrorKind},
    options::ReaderOptions,
    record::Record,
    record_buffer::RecordBuffer,
    runes::{index_not, index_rune, length_nl, next_rune},
    slice_reader::SliceReader,
    unicode::{CharClass, DEFAULT_CHAR_CLASS},
    utf8::rune_count,
};

/// The outcome of one [`RecordParser::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A complete record.
    Record(Record),
    /// The buffered input ends before the next record does; fill and retry.
    Pending,
    /// The input is exhausted.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the first line of the next record.
    AcquireLine,
    /// At the start of a field within the current line.
    Field,
    /// Inside a quoted field. `need_line` is set when the rest of the current
    /// line has been consumed and the field continues on the next one.
    QuotedField { need_line: bool },
    Done,
}

enum LineRead {
    Ready,
    Pending,
    Eof,
}

#[derive(Debug)]
struct ParserState {
    phase: Phase,
    /// The current physical line.
    line: Vec<u8>,
    /// Parse position in `line`.
    pos: usize,
    /// Line on which the current record started.
    rec_line: usize,
    num_line: usize,
}

impl ParserState {
    fn new() -> Self {
        Self {
            phase: Phase::AcquireLine,
            line: Vec::new(),
            pos: 0,
            rec_line: 0,
            num_line: 0,
        }
    }

    fn read_line<S>(&mut self, input: &mut SliceReader<S>) -> LineRead {
        let eof = input.is_eof();
        let Some(slice) = input.read_slice(b'\n') else {
            if eof {
                self.num_line += 1;
                return LineRead::Eof;
            }
            return LineRead::Pending;
        };
        self.line.clear();
        self.line.extend_from_slice(slice);
        self.pos = 0;
        self.num_line += 1;

        let n = self.line.len();
        if n >= 2 && self.line[n - 2..] == *b"\r\n" {
            self.line[n - 2] = b'\n';
            self.line.truncate(n - 1);
        } else if self.line.last() == Some(&b'\r') {
            // Only an unterminated final line can end in `\r`.
            self.line.pop();
        }
        LineRead::Ready
    }

    fn error(&self, kind: ParseErrorKind, column: usize) -> ParseError {
        ParseError::new(kind, self.rec_line, self.num_line, column)
    }
}

/// Incremental CSV record parser over a [`SliceReader`].
#[derive(Debug)]
pub struct RecordParser {
    options: ReaderOptions,
    char_class: &'static dyn CharClass,
    comma_len: usize,
    state: ParserState,
    fields: RecordBuffer,
}

impl RecordParser {
    /// Creates a parser after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the delimiters are unusable.
    pub fn new(options: ReaderOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            options,
            char_class: &DEFAULT_CHAR_CLASS,
            comma_len: options.comma.len_utf8(),
            state: ParserState::new(),
            fields: RecordBuffer::new(options.fields_per_record),
        })
    }

    /// Replaces the code point classification used to trim leading space.
    #[must_use]
    pub fn with_char_class(mut self, char_class: &'static dyn CharClass) -> Self {
        self.char_class = char_class;
        self
    }

    /// The validated options this parser was built with.
    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// The number of physical lines read so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.state.num_line
    }

    /// Advances over the buffered input.
    ///
    /// After an error the rest of the offending line is dropped and the next
    /// call starts a new record.
    ///
    /// # Errors
    ///
    /// A [`ParseError`] for malformed quoting or a record of the wrong width.
    pub fn step<S>(&mut self, input: &mut SliceReader<S>) -> Result<Step, ParseError> {
        let result = self.advance(input);
        if let Err(err) = &result {
            tracing::debug!(
                start_line = err.start_line,
                line = err.line,
                column = err.column,
                kind = ?err.kind,
                "parse error"
            );
            self.state.phase = Phase::AcquireLine;
        }
        result
    }

    fn advance<S>(&mut self, input: &mut SliceReader<S>) -> Result<Step, ParseError> {
        loop {
            let step = match self.state.phase {
                Phase::Done => return Ok(Step::End),
                Phase::AcquireLine => self.acquire_line(input),
                Phase::Field => self.parse_field()?,
                Phase::QuotedField { need_line } => self.parse_quoted(input, need_line)?,
            };
            if let Some(step) = step {
                return Ok(step);
            }
        }
    }

    /// Reads lines until one can start a record, skipping comments and blank
    /// lines.
    fn acquire_line<S>(&mut self, input: &mut SliceReader<S>) -> Option<Step> {
        loop {
            match self.state.read_line(input) {
                LineRead::Pending => return Some(Step::Pending),
                LineRead::Eof => {
                    self.state.phase = Phase::Done;
                    return Some(Step::End);
                }
                LineRead::Ready => {}
            }
            let line = &self.state.line;
            if self
                .options
                .comment
                .is_some_and(|comment| next_rune(line) == comment)
            {
                tracing::debug!(line = self.state.num_line, "skipped comment");
                continue;
            }
            if line.len() == length_nl(line) {
                continue;
            }
            self.state.rec_line = self.state.num_line;
            self.fields.reset();
            self.state.phase = Phase::Field;
            return None;
        }
    }

    fn parse_field(&mut self) -> Result<Option<Step>, ParseError> {
        let st = &mut self.state;
        if self.options.trim_leading_space {
            let class = self.char_class;
            let rest = &st.line[st.pos..];
            let skip = index_not(rest, |c| class.is_space(c)).unwrap_or(rest.len());
            st.pos += skip;
        }

        let rest = &st.line[st.pos..];
        if rest.first() == Some(&b'"') {
            st.pos += 1;
            st.phase = Phase::QuotedField { need_line: false };
            return Ok(None);
        }

        let comma = index_rune(rest, self.options.comma);
        let field = match comma {
            Some(i) => &rest[..i],
            None => &rest[..rest.len() - length_nl(rest)],
        };
        if !self.options.lazy_quotes {
            if let Some(j) = field.find_byte(b'"') {
                let column = rune_count(&st.line[..st.pos + j]);
                return Err(st.error(ParseErrorKind::BareQuote, column));
            }
        }
        self.fields.append(field);
        self.fields.demarcate_field();

        match comma {
            Some(i) => {
                st.pos += i + self.comma_len;
                Ok(None)
            }
            None => self.complete().map(Some),
        }
    }

    fn parse_quoted<S>(
        &mut self,
        input: &mut SliceReader<S>,
        mut need_line: bool,
    ) -> Result<Option<Step>, ParseError> {
        loop {
            if need_line {
                match self.state.read_line(input) {
                    LineRead::Pending => {
                        self.state.phase = Phase::QuotedField { need_line: true };
                        return Ok(Some(Step::Pending));
                    }
                    LineRead::Eof => {
                        self.state.line.clear();
                        self.state.pos = 0;
                    }
                    LineRead::Ready => {}
                }
                need_line = false;
                self.state.phase = Phase::QuotedField { need_line: false };
            }

            let st = &mut self.state;
            let rest = &st.line[st.pos..];
            if let Some(i) = rest.find_byte(b'"') {
                self.fields.append(&rest[..i]);
                st.pos += i + 1;
                let rest = &st.line[st.pos..];
                let rn = next_rune(rest);
                if rn == '"' {
                    // `""` is an escaped quote.
                    self.fields.push_byte(b'"');
                    st.pos += 1;
                } else if rn == self.options.comma {
                    st.pos += self.comma_len;
                    self.fields.demarcate_field();
                    st.phase = Phase::Field;
                    return Ok(None);
                } else if length_nl(rest) == rest.len() {
                    self.fields.demarcate_field();
                    return self.complete().map(Some);
                } else if self.options.lazy_quotes {
                    self.fields.push_byte(b'"');
                } else {
                    let column = rune_count(&st.line[..st.pos - 1]);
                    return Err(st.error(ParseErrorKind::Quote, column));
                }
            } else if !rest.is_empty() {
                self.fields.append(rest);
                st.pos = st.line.len();
                need_line = true;
            } else {
                // The input ended inside the field.
                if !self.options.lazy_quotes {
                    let column = rune_count(&st.line);
                    return Err(st.error(ParseErrorKind::Quote, column));
                }
                self.fields.demarcate_field();
                return self.complete().map(Some);
            }
        }
    }

    fn complete(&mut self) -> Result<Step, ParseError> {
        self.state.phase = Phase::AcquireLine;
        self.fields.to_record(self.state.rec_line).map(Step::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options::FieldsPerRecord, source::Chunk};

    fn open(options: ReaderOptions) -> (RecordParser, SliceReader<()>) {
        (RecordParser::new(options).unwrap(), SliceReader::new((), 100))
    }

    fn push(input: &mut SliceReader<()>, text: &str) {
        input.compact();
        assert!(input.accept(Some(Chunk::from(text))));
    }

    #[test]
    fn suspends_inside_quoted_field() {
        let (mut parser, mut input) = open(ReaderOptions::default());
        assert_eq!(parser.step(&mut input), Ok(Step::Pending));

        push(&mut input, "a,\"b\n");
        assert_eq!(parser.step(&mut input), Ok(Step::Pending));
        assert_eq!(parser.state.phase, Phase::QuotedField { need_line: true });

        push(&mut input, "c\"");
        assert_eq!(parser.step(&mut input), Ok(Step::Pending));

        push(&mut input, ",d\n");
        match parser.step(&mut input) {
            Ok(Step::Record(record)) => assert_eq!(record, ["a", "b\nc", "d"]),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(parser.step(&mut input), Ok(Step::Pending));

        input.accept(None);
        assert_eq!(parser.step(&mut input), Ok(Step::End));
        assert_eq!(parser.step(&mut input), Ok(Step::End));
        assert_eq!(parser.line(), 3);
    }

    #[test]
    fn resumes_after_error() {
        let (mut parser, mut input) = open(ReaderOptions::default());
        push(&mut input, "a\"b,c\nd,e\n");
        input.accept(None);

        let err = parser.step(&mut input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::BareQuote);
        assert_eq!((err.line, err.column), (1, 1));

        match parser.step(&mut input) {
            Ok(Step::Record(record)) => assert_eq!(record, ["d", "e"]),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(parser.step(&mut input), Ok(Step::End));
    }

    #[test]
    fn multibyte_comma_split_across_chunks() {
        let options = ReaderOptions::default().with_comma('€');
        let (mut parser, mut input) = open(options);
        let text = "a€b\n".as_bytes();
        input.compact();
        input.accept(Some(Chunk::from(&text[..2])));
        assert_eq!(parser.step(&mut input), Ok(Step::Pending));
        input.accept(Some(Chunk::from(&text[2..])));
        input.accept(None);
        match parser.step(&mut input) {
            Ok(Step::Record(record)) => assert_eq!(record, ["a", "b"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn counts_columns_in_runes() {
        let (mut parser, mut input) = open(ReaderOptions::default());
        push(&mut input, "\"λλ\"x\n");
        input.accept(None);
        let err = parser.step(&mut input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Quote);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn field_count_error_keeps_width() {
        let options = ReaderOptions::default().with_fields_per_record(FieldsPerRecord::Exact(2));
        let (mut parser, mut input) = open(options);
        push(&mut input, "a\nb,c\n");
        input.accept(None);
        let err = parser.step(&mut input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::FieldCount);
        assert_eq!(err.record().unwrap(), &["a"]);
        assert!(matches!(parser.step(&mut input), Ok(Step::Record(_))));
    }

    #[test]
    fn custom_char_class_controls_trimming() {
        struct Underscore;
        impl CharClass for Underscore {
            fn is_space(&self, c: char) -> bool {
                c == '_'
            }
            fn is_digit(&self, c: char) -> bool {
                c.is_ascii_digit()
            }
            fn is_upper(&self, c: char) -> bool {
                c.is_ascii_uppercase()
            }
        }
        static UNDERSCORE: Underscore = Underscore;

        let options = ReaderOptions::default().with_trim_leading_space(true);
        let mut parser = RecordParser::new(options)
            .unwrap()
            .with_char_class(&UNDERSCORE);
        let mut input = SliceReader::from_bytes("__a, b\n");
        match parser.step(&mut input) {
            Ok(Step::Record(record)) => assert_eq!(record, ["a", " b"]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
