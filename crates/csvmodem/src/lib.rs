//! A streaming, incremental RFC 4180 CSV reader.
//!
//! Input may be a complete text, complete bytes, or a source that produces
//! chunks over time. Records are parsed as soon as their last line is
//! buffered, and a chunk may end anywhere: inside a line, inside a quoted
//! field, or inside a multi-byte rune.
//!
//! ```rust
//! use csvmodem::{Reader, ReaderOptions};
//!
//! let options = ReaderOptions::default().with_comment('#');
//! let mut reader = Reader::from_text("#name,qty\n\"pens, blue\",3\n", options).unwrap();
//! let record = reader.read_record().unwrap().unwrap();
//! assert_eq!(record, ["pens, blue", "3"]);
//! assert!(reader.read_record().unwrap().is_none());
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod error;
mod options;
mod parser;
mod reader;
mod record;
mod record_buffer;
mod runes;
mod slice_reader;
mod source;
#[cfg(feature = "stream")]
mod stream;
mod unicode;
pub mod utf8;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, CsvError, ParseError, ParseErrorKind, SourceError};
pub use options::{DEFAULT_EMPTY_READ_BUDGET, FieldsPerRecord, ReaderOptions};
pub use parser::{RecordParser, Step};
pub use reader::{IntoRecords, Reader, Records};
pub use record::Record;
pub use slice_reader::SliceReader;
#[cfg(feature = "std")]
pub use source::ReadSource;
pub use source::{Chunk, ChunkSource, Complete, IterSource, TryIterSource};
#[cfg(feature = "stream")]
pub use stream::AsyncReader;
pub use unicode::{CharClass, DEFAULT_CHAR_CLASS, DefaultCharClass};

#[cfg(any(test, feature = "fuzzing"))]
mod chunk_utils;
#[cfg(any(test, feature = "fuzzing"))]
pub use chunk_utils::{produce_chunks, split_at};
