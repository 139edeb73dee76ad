//! Delimiter-seekable buffering over a chunked pull source.
//!
//! # Overview
//!
//! [`SliceReader`] keeps one growable byte buffer and a read cursor. The
//! parser asks it for the next slice ending in a delimiter byte; when no
//! delimiter is buffered yet the caller has to [`fill`](SliceReader::fill)
//! and ask again. `fill` is the only operation that talks to the source, so
//! the parser itself never blocks and never suspends mid-step.
//!
//! Bytes already searched are remembered between calls, so a long line that
//! arrives in many small chunks is scanned once in total.

use alloc::vec::Vec;

use bstr::ByteSlice;

use crate::{
    error::SourceError,
    options::DEFAULT_EMPTY_READ_BUDGET,
    source::{Chunk, ChunkSource, Complete},
};

/// Buffered input for the record parser.
#[derive(Debug)]
pub struct SliceReader<S = Complete> {
    buf: Vec<u8>,
    /// Read position in `buf`.
    r: usize,
    /// Bytes after `r` known not to contain the delimiter.
    scanned: usize,
    eof: bool,
    source: S,
    budget: usize,
}

impl SliceReader<Complete> {
    /// A reader over input that is already complete.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: bytes.into(),
            r: 0,
            scanned: 0,
            eof: true,
            source: Complete,
            budget: DEFAULT_EMPTY_READ_BUDGET,
        }
    }
}

impl<S> SliceReader<S> {
    /// A reader that pulls from `source`, tolerating up to `budget`
    /// consecutive empty chunks per fill.
    pub fn new(source: S, budget: usize) -> Self {
        Self {
            buf: Vec::new(),
            r: 0,
            scanned: 0,
            eof: false,
            source,
            budget,
        }
    }

    /// Whether the source has signalled that it is done. Never clears.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// The bytes buffered but not yet returned.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.r..]
    }

    /// Returns the bytes up to and including the next `delim`, advancing past
    /// them.
    ///
    /// Without a buffered `delim` this returns the remaining bytes once the
    /// source is done, and `None` otherwise: the caller must fill and retry.
    /// Returns `None` whenever nothing is left unread.
    pub fn read_slice(&mut self, delim: u8) -> Option<&[u8]> {
        let start = self.r;
        let n = self.buf.len();
        if start == n {
            return None;
        }
        let end = match self.buf[start + self.scanned..].find_byte(delim) {
            Some(i) => start + self.scanned + i + 1,
            None if self.eof => n,
            None => {
                self.scanned = n - start;
                return None;
            }
        };
        self.r = end;
        self.scanned = 0;
        Some(&self.buf[start..end])
    }

    #[cfg(feature = "stream")]
    pub(crate) fn budget(&self) -> usize {
        self.budget
    }

    #[cfg(feature = "stream")]
    pub(crate) fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Moves the unread tail to the front of the buffer.
    pub(crate) fn compact(&mut self) {
        if self.r > 0 {
            self.buf.drain(..self.r);
            self.r = 0;
        }
    }

    /// Takes one pulled item into the buffer. Returns `true` once the fill is
    /// complete: data arrived or the source is done. Empty chunks return
    /// `false` so the caller pulls again.
    pub(crate) fn accept(&mut self, pulled: Option<Chunk>) -> bool {
        match pulled {
            None => {
                tracing::trace!(buffered = self.buf.len() - self.r, "source done");
                self.eof = true;
                true
            }
            Some(chunk) if chunk.is_empty() => false,
            Some(chunk) => {
                tracing::trace!(bytes = chunk.len(), "pulled chunk");
                self.buf.extend_from_slice(chunk.as_bytes());
                true
            }
        }
    }

    pub(crate) fn no_progress(&self) -> SourceError {
        tracing::warn!(attempts = self.budget, "source made no progress");
        SourceError::NoProgress {
            attempts: self.budget,
        }
    }
}

impl<S: ChunkSource> SliceReader<S> {
    /// Pulls from the source until a non-empty chunk arrives or the source is
    /// done. A no-op once the source is done.
    ///
    /// # Errors
    ///
    /// [`SourceError::NoProgress`] after the empty-read budget is exhausted,
    /// or whatever the source itself reports.
    pub fn fill(&mut self) -> Result<(), SourceError> {
        if self.eof {
            return Ok(());
        }
        self.compact();
        for _ in 0..self.budget {
            let pulled = self.source.pull()?;
            if self.accept(pulled) {
                return Ok(());
            }
        }
        Err(self.no_progress())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::source::IterSource;

    #[test]
    fn reads_complete_text() {
        let mut r = SliceReader::from_bytes("abc,def");
        assert_eq!(r.read_slice(b','), Some(&b"abc,"[..]));
        assert_eq!(r.read_slice(b','), Some(&b"def"[..]));
        assert_eq!(r.read_slice(b','), None);
        assert!(r.is_eof());
    }

    #[test]
    fn reads_chunked_stream() {
        let chunks = "abc,def\n123,456\n".repeat(3);
        let parts: alloc::vec::Vec<_> = chunks
            .as_bytes()
            .chunks(16)
            .map(<[u8]>::to_vec)
            .collect();
        let mut r = SliceReader::new(IterSource::new(parts.into_iter()), 100);
        for _ in 0..3 {
            r.fill().unwrap();
            assert_eq!(r.read_slice(b'\n'), Some(&b"abc,def\n"[..]));
            assert_eq!(r.read_slice(b'\n'), Some(&b"123,456\n"[..]));
            assert_eq!(r.read_slice(b'\n'), None);
            assert!(!r.is_eof());
        }
        r.fill().unwrap();
        assert_eq!(r.read_slice(b'\n'), None);
        assert!(r.is_eof());
    }

    #[test]
    fn reads_partial_lines() {
        let mut r = SliceReader::new(IterSource::new(vec!["abc,", "def\n"].into_iter()), 100);
        r.fill().unwrap();
        assert_eq!(r.read_slice(b'\n'), None);
        assert!(!r.is_eof());
        r.fill().unwrap();
        assert_eq!(r.read_slice(b'\n'), Some(&b"abc,def\n"[..]));
        assert_eq!(r.read_slice(b'\n'), None);
        r.fill().unwrap();
        assert!(r.is_eof());
    }

    #[test]
    fn returns_unterminated_tail_at_eof() {
        let mut r = SliceReader::new(IterSource::new(vec!["a\nb"].into_iter()), 100);
        r.fill().unwrap();
        assert_eq!(r.read_slice(b'\n'), Some(&b"a\n"[..]));
        assert_eq!(r.read_slice(b'\n'), None);
        r.fill().unwrap();
        assert_eq!(r.read_slice(b'\n'), Some(&b"b"[..]));
        assert_eq!(r.read_slice(b'\n'), None);
    }

    #[test]
    fn skips_empty_chunks() {
        let mut r = SliceReader::new(IterSource::new(vec!["", "", "x\n"].into_iter()), 3);
        r.fill().unwrap();
        assert_eq!(r.buffered(), b"x\n");
    }

    #[test]
    fn gives_up_without_progress() {
        let mut r = SliceReader::new(IterSource::new(core::iter::repeat("")), 5);
        assert_eq!(r.fill(), Err(SourceError::NoProgress { attempts: 5 }));
        assert!(!r.is_eof());
    }

    #[test]
    fn compacts_consumed_bytes() {
        let mut r = SliceReader::new(IterSource::new(vec!["ab\ncd", "ef\n"].into_iter()), 100);
        r.fill().unwrap();
        assert_eq!(r.read_slice(b'\n'), Some(&b"ab\n"[..]));
        assert_eq!(r.read_slice(b'\n'), None);
        r.fill().unwrap();
        assert_eq!(r.buffered(), b"cdef\n");
        assert_eq!(r.read_slice(b'\n'), Some(&b"cdef\n"[..]));
    }
}
