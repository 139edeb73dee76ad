//! Rune-aware searches over byte slices.
//!
//! Field data is kept as bytes until a record completes, so delimiter lookup
//! and white space trimming happen on `&[u8]`. Searches for ASCII bytes go
//! straight to `memchr` through `bstr`; a multi-byte delimiter is encoded once
//! and searched as a substring, which cannot match inside another rune
//! because UTF-8 is self-synchronizing.

use bstr::ByteSlice;

use crate::utf8::{self, RUNE_SELF, UTF_MAX};

/// Number of bytes taken by a trailing `\n`.
#[inline]
pub(crate) fn length_nl(b: &[u8]) -> usize {
    usize::from(b.last() == Some(&b'\n'))
}

/// The first rune in `b`, or [`RUNE_ERROR`](utf8::RUNE_ERROR) if `b` is
/// empty or does not start with a valid sequence.
#[inline]
pub(crate) fn next_rune(b: &[u8]) -> char {
    utf8::decode_rune(b).0
}

/// Byte index of the first occurrence of `r` in `s`.
///
/// `r` is a validated delimiter, never [`RUNE_ERROR`](utf8::RUNE_ERROR), so
/// an encoded match is always a whole rune.
pub(crate) fn index_rune(s: &[u8], r: char) -> Option<usize> {
    let code = u32::from(r);
    if code < RUNE_SELF {
        return u8::try_from(code).ok().and_then(|b| s.find_byte(b));
    }
    let mut buf = [0u8; UTF_MAX];
    s.find(utf8::encode_rune(code, &mut buf))
}

/// Byte index of the first rune in `s` for which `keep_going` is false, or
/// `None` if every rune satisfies it.
pub(crate) fn index_not<F>(s: &[u8], mut keep_going: F) -> Option<usize>
where
    F: FnMut(char) -> bool,
{
    let mut i = 0;
    while i < s.len() {
        let (c, width) = if u32::from(s[i]) < RUNE_SELF {
            (s[i] as char, 1)
        } else {
            utf8::decode_rune(&s[i..])
        };
        if !keep_going(c) {
            return Some(i);
        }
        i += width;
    }
    None
}
