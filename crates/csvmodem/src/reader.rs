//! Blocking driving loops.
//!
//! # Overview
//!
//! [`Reader`] pairs a [`SliceReader`] with a [`RecordParser`] and alternates
//! between the two: parse whatever is buffered, and fill from the source
//! when the parser reports that it needs more. Records are delivered in
//! input order.
//!
//! # Examples
//!
//! ```rust
//! use csvmodem::{Reader, ReaderOptions};
//!
//! let chunks = ["a,\"multi", "\nline\",c\n", "d,e,f\n"];
//! let mut reader = Reader::from_chunks(chunks, ReaderOptions::default()).unwrap();
//! let mut seen = Vec::new();
//! reader
//!     .read_all(|record| {
//!         seen.push(record);
//!         false
//!     })
//!     .unwrap();
//! assert_eq!(seen, [["a", "multi\nline", "c"], ["d", "e", "f"]]);
//! ```

use alloc::vec::Vec;

use crate::{
    error::{ConfigError, CsvError, SourceError},
    options::ReaderOptions,
    parser::{RecordParser, Step},
    record::Record,
    slice_reader::SliceReader,
    source::{Chunk, ChunkSource, Complete, IterSource},
    unicode::CharClass,
};

/// A CSV reader over a pull source.
#[derive(Debug)]
pub struct Reader<S = Complete> {
    input: SliceReader<S>,
    parser: RecordParser,
    failed: Option<SourceError>,
}

impl Reader<Complete> {
    /// Reads from a complete text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` are invalid.
    pub fn from_text(text: &str, options: ReaderOptions) -> Result<Self, ConfigError> {
        Self::from_bytes(text, options)
    }

    /// Reads from complete bytes. Invalid UTF-8 in fields is replaced with
    /// U+FFFD.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` are invalid.
    pub fn from_bytes(
        bytes: impl Into<Vec<u8>>,
        options: ReaderOptions,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            parser: RecordParser::new(options)?,
            input: SliceReader::from_bytes(bytes),
            failed: None,
        })
    }
}

impl<I> Reader<IterSource<I>>
where
    I: Iterator,
    I::Item: Into<Chunk>,
{
    /// Reads from a sequence of chunks.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` are invalid.
    pub fn from_chunks<T>(chunks: T, options: ReaderOptions) -> Result<Self, ConfigError>
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self::from_source(IterSource::new(chunks.into_iter()), options)
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Reader<crate::source::ReadSource<R>> {
    /// Reads from a [`std::io::Read`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` are invalid.
    pub fn from_read(read: R, options: ReaderOptions) -> Result<Self, ConfigError> {
        Self::from_source(crate::source::ReadSource::new(read), options)
    }
}

impl<S> Reader<S> {
    /// Replaces the code point classification used to trim leading space.
    #[must_use]
    pub fn with_char_class(mut self, char_class: &'static dyn CharClass) -> Self {
        self.parser = self.parser.with_char_class(char_class);
        self
    }

    /// The validated options this reader was built with.
    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        self.parser.options()
    }

    /// The number of physical lines read so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.parser.line()
    }
}

impl<S: ChunkSource> Reader<S> {
    /// Reads from any [`ChunkSource`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` are invalid.
    pub fn from_source(source: S, options: ReaderOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            parser: RecordParser::new(options)?,
            input: SliceReader::new(source, options.empty_read_budget),
            failed: None,
        })
    }

    fn fill(&mut self) -> Result<(), SourceError> {
        if let Err(err) = self.input.fill() {
            self.failed = Some(err.clone());
            return Err(err);
        }
        Ok(())
    }

    /// Reads the next record, or `None` at the end of the input.
    ///
    /// A parse error only affects the record it is reported for; the next
    /// call continues with the following line. A source error is final and
    /// is returned again by every later call.
    ///
    /// # Errors
    ///
    /// [`CsvError::Parse`] for a malformed record, [`CsvError::Source`] when
    /// the source fails.
    pub fn read_record(&mut self) -> Result<Option<Record>, CsvError> {
        if let Some(err) = &self.failed {
            return Err(err.clone().into());
        }
        loop {
            match self.parser.step(&mut self.input)? {
                Step::Record(record) => return Ok(Some(record)),
                Step::End => return Ok(None),
                Step::Pending => self.fill()?,
            }
        }
    }

    /// Hands every record to `callback` until the input ends or `callback`
    /// returns `true`.
    ///
    /// # Errors
    ///
    /// Stops at the first error, see [`Reader::read_record`].
    pub fn read_all<F>(&mut self, mut callback: F) -> Result<(), CsvError>
    where
        F: FnMut(Record) -> bool,
    {
        while let Some(record) = self.read_record()? {
            if callback(record) {
                break;
            }
        }
        Ok(())
    }

    /// Like [`Reader::read_all`], but also stops after `n` records.
    ///
    /// # Errors
    ///
    /// Stops at the first error, see [`Reader::read_record`].
    pub fn read_n<F>(&mut self, n: usize, mut callback: F) -> Result<(), CsvError>
    where
        F: FnMut(Record) -> bool,
    {
        for _ in 0..n {
            let Some(record) = self.read_record()? else {
                break;
            };
            if callback(record) {
                break;
            }
        }
        Ok(())
    }

    /// Iterates over the remaining records.
    pub fn records(&mut self) -> Records<'_, S> {
        Records {
            reader: self,
            done: false,
        }
    }

    /// Converts the reader into an iterator over its records.
    pub fn into_records(self) -> IntoRecords<S> {
        IntoRecords {
            reader: self,
            done: false,
        }
    }
}

fn next_item<S: ChunkSource>(
    reader: &mut Reader<S>,
    done: &mut bool,
) -> Option<Result<Record, CsvError>> {
    if *done {
        return None;
    }
    match reader.read_record() {
        Ok(Some(record)) => Some(Ok(record)),
        Ok(None) => {
            *done = true;
            None
        }
        Err(err) => {
            *done = matches!(err, CsvError::Source(_));
            Some(Err(err))
        }
    }
}

/// Borrowing iterator returned by [`Reader::records`].
///
/// Parse errors are yielded in place of the affected record and iteration
/// continues; a source error ends the iteration.
#[derive(Debug)]
pub struct Records<'r, S> {
    reader: &'r mut Reader<S>,
    done: bool,
}

impl<S: ChunkSource> Iterator for Records<'_, S> {
    type Item = Result<Record, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        next_item(self.reader, &mut self.done)
    }
}

/// Owning iterator returned by [`Reader::into_records`].
#[derive(Debug)]
pub struct IntoRecords<S> {
    reader: Reader<S>,
    done: bool,
}

impl<S> IntoRecords<S> {
    /// Returns the underlying reader.
    pub fn into_reader(self) -> Reader<S> {
        self.reader
    }
}

impl<S: ChunkSource> Iterator for IntoRecords<S> {
    type Item = Result<Record, CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        next_item(&mut self.reader, &mut self.done)
    }
}
