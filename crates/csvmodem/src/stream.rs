//! Asynchronous driving loops over a `futures` stream of chunks.
//!
//! [`AsyncReader`] shares the parser and buffering with [`Reader`]; the only
//! difference is that filling awaits the next chunk of the stream. Dropping a
//! pending future between records loses nothing, since all state lives in the
//! reader.
//!
//! ```rust
//! use csvmodem::{AsyncReader, ReaderOptions};
//! use futures::{executor::block_on, stream};
//!
//! let chunks = stream::iter(["a,b\n", "c,", "d\n"].map(Ok::<_, std::io::Error>));
//! let mut reader = AsyncReader::new(chunks, ReaderOptions::default()).unwrap();
//! block_on(async {
//!     assert_eq!(reader.read_record().await.unwrap().unwrap(), ["a", "b"]);
//!     assert_eq!(reader.read_record().await.unwrap().unwrap(), ["c", "d"]);
//!     assert_eq!(reader.read_record().await.unwrap(), None);
//! });
//! ```
//!
//! [`Reader`]: crate::Reader

use alloc::string::ToString;
use core::fmt::Display;

use futures_util::{Stream, StreamExt, stream};

use crate::{
    error::{ConfigError, CsvError, SourceError},
    options::ReaderOptions,
    parser::{RecordParser, Step},
    record::Record,
    slice_reader::SliceReader,
    source::Chunk,
    unicode::CharClass,
};

/// A CSV reader over a stream of fallible chunks.
#[derive(Debug)]
pub struct AsyncReader<St> {
    input: SliceReader<St>,
    parser: RecordParser,
    failed: Option<SourceError>,
}

impl<St, C, E> AsyncReader<St>
where
    St: Stream<Item = Result<C, E>> + Unpin,
    C: Into<Chunk>,
    E: Display,
{
    /// Creates a reader over `stream`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` are invalid.
    pub fn new(stream: St, options: ReaderOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            parser: RecordParser::new(options)?,
            input: SliceReader::new(stream, options.empty_read_budget),
            failed: None,
        })
    }

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

    async fn fill(&mut self) -> Result<(), SourceError> {
        if self.input.is_eof() {
            return Ok(());
        }
        self.input.compact();
        for _ in 0..self.input.budget() {
            let pulled = match self.input.source_mut().next().await {
                Some(Ok(chunk)) => Some(chunk.into()),
                Some(Err(err)) => {
                    let err = SourceError::Upstream(err.to_string());
                    self.failed = Some(err.clone());
                    return Err(err);
                }
                None => None,
            };
            if self.input.accept(pulled) {
                return Ok(());
            }
        }
        let err = self.input.no_progress();
        self.failed = Some(err.clone());
        Err(err)
    }

    /// Reads the next record, or `None` at the end of the input.
    ///
    /// # Errors
    ///
    /// Same as [`Reader::read_record`](crate::Reader::read_record).
    pub async fn read_record(&mut self) -> Result<Option<Record>, CsvError> {
        if let Some(err) = &self.failed {
            return Err(err.clone().into());
        }
        loop {
            match self.parser.step(&mut self.input)? {
                Step::Record(record) => return Ok(Some(record)),
                Step::End => return Ok(None),
                Step::Pending => self.fill().await?,
            }
        }
    }

    /// Hands every record to `callback` until the input ends or `callback`
    /// returns `true`.
    ///
    /// # Errors
    ///
    /// Stops at the first error.
    pub async fn read_all<F>(&mut self, mut callback: F) -> Result<(), CsvError>
    where
        F: FnMut(Record) -> bool,
    {
        while let Some(record) = self.read_record().await? {
            if callback(record) {
                break;
            }
        }
        Ok(())
    }

    /// Like [`AsyncReader::read_all`], but also stops after `n` records.
    ///
    /// # Errors
    ///
    /// Stops at the first error.
    pub async fn read_n<F>(&mut self, n: usize, mut callback: F) -> Result<(), CsvError>
    where
        F: FnMut(Record) -> bool,
    {
        for _ in 0..n {
            let Some(record) = self.read_record().await? else {
                break;
            };
            if callback(record) {
                break;
            }
        }
        Ok(())
    }

    /// Converts the reader into a stream of records. Parse errors are yielded
    /// in place of the affected record; a source error ends the stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record, CsvError>> {
        stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            match reader.read_record().await {
                Ok(Some(record)) => Some((Ok(record), Some(reader))),
                Ok(None) => None,
                Err(err) => {
                    let next = if matches!(err, CsvError::Source(_)) {
                        None
                    } else {
                        Some(reader)
                    };
                    Some((Err(err), next))
                }
            }
        })
    }
}
