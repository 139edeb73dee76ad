//! Pull sources that feed a [`SliceReader`](crate::SliceReader).
//!
//! A source hands out discrete chunks until it signals that it is done. Chunk
//! boundaries carry no meaning: a chunk may end in the middle of a line, a
//! quoted field, or a multi-byte rune.

use alloc::{string::String, vec::Vec};

use crate::error::SourceError;

/// One piece of input, as bytes or as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Bytes(Vec<u8>),
    Text(String),
}

impl Chunk {
    /// The chunk's bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Chunk::Bytes(b) => b,
            Chunk::Text(s) => s.as_bytes(),
        }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the chunk holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(b: Vec<u8>) -> Self {
        Chunk::Bytes(b)
    }
}

impl From<&[u8]> for Chunk {
    fn from(b: &[u8]) -> Self {
        Chunk::Bytes(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Chunk {
    fn from(b: &[u8; N]) -> Self {
        Chunk::Bytes(b.to_vec())
    }
}

impl From<String> for Chunk {
    fn from(s: String) -> Self {
        Chunk::Text(s)
    }
}

impl From<&str> for Chunk {
    fn from(s: &str) -> Self {
        Chunk::Text(s.into())
    }
}

/// A pull-based supplier of chunks.
pub trait ChunkSource {
    /// Pulls the next chunk. `Ok(None)` is the done signal; a source must
    /// keep returning it once given.
    ///
    /// # Errors
    ///
    /// Any error the underlying supplier reports.
    fn pull(&mut self) -> Result<Option<Chunk>, SourceError>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    fn pull(&mut self) -> Result<Option<Chunk>, SourceError> {
        (**self).pull()
    }
}

/// The source behind a complete in-memory input: it has nothing to give.
#[derive(Debug, Clone, Copy, Default)]
pub struct Complete;

impl ChunkSource for Complete {
    fn pull(&mut self) -> Result<Option<Chunk>, SourceError> {
        Ok(None)
    }
}

/// Adapts an iterator of chunks.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I> {
    /// Wraps `iter`; the iterator ending is the done signal.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I, C> ChunkSource for IterSource<I>
where
    I: Iterator<Item = C>,
    C: Into<Chunk>,
{
    fn pull(&mut self) -> Result<Option<Chunk>, SourceError> {
        Ok(self.iter.next().map(Into::into))
    }
}

/// Adapts an iterator of fallible chunks; the first error is passed through
/// as [`SourceError::Upstream`].
#[derive(Debug, Clone)]
pub struct TryIterSource<I> {
    iter: I,
}

impl<I> TryIterSource<I> {
    /// Wraps `iter`; the iterator ending is the done signal.
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I, C, E> ChunkSource for TryIterSource<I>
where
    I: Iterator<Item = Result<C, E>>,
    C: Into<Chunk>,
    E: core::fmt::Display,
{
    fn pull(&mut self) -> Result<Option<Chunk>, SourceError> {
        use alloc::string::ToString;

        match self.iter.next() {
            Some(Ok(chunk)) => Ok(Some(chunk.into())),
            Some(Err(err)) => Err(SourceError::Upstream(err.to_string())),
            None => Ok(None),
        }
    }
}

#[cfg(feature = "std")]
pub use self::io::ReadSource;

#[cfg(feature = "std")]
mod io {
    use alloc::{string::ToString, vec, vec::Vec};
    use std::io::{ErrorKind, Read};

    use super::{Chunk, ChunkSource};
    use crate::error::SourceError;

    const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

    /// Adapts a [`std::io::Read`]; a zero-length read is the done signal.
    #[derive(Debug)]
    pub struct ReadSource<R> {
        inner: R,
        scratch: Vec<u8>,
        done: bool,
    }

    impl<R: Read> ReadSource<R> {
        /// Wraps `inner`, reading up to 8 KiB per chunk.
        pub fn new(inner: R) -> Self {
            Self::with_chunk_size(inner, DEFAULT_CHUNK_SIZE)
        }

        /// Wraps `inner`, reading up to `size` bytes per chunk (at least one).
        pub fn with_chunk_size(inner: R, size: usize) -> Self {
            Self {
                inner,
                scratch: vec![0; size.max(1)],
                done: false,
            }
        }

        /// Returns the wrapped reader.
        pub fn into_inner(self) -> R {
            self.inner
        }
    }

    impl<R: Read> ChunkSource for ReadSource<R> {
        fn pull(&mut self) -> Result<Option<Chunk>, SourceError> {
            if self.done {
                return Ok(None);
            }
            loop {
                match self.inner.read(&mut self.scratch) {
                    Ok(0) => {
                        self.done = true;
                        return Ok(None);
                    }
                    Ok(n) => return Ok(Some(Chunk::Bytes(self.scratch[..n].to_vec()))),
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(err) => return Err(SourceError::Upstream(err.to_string())),
                }
            }
        }
    }
}
