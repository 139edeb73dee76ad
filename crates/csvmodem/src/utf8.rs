//! Rune-level UTF-8 primitives.
//!
//! The reader works on raw bytes and only decodes runes where the grammar
//! needs them: to compare against a (possibly multi-byte) delimiter, to skip
//! leading white space, and to count columns in error positions. These
//! functions never panic on malformed input; they substitute [`RUNE_ERROR`]
//! with a width of one byte so a scan always makes progress.
//!
//! The decoder is table-driven: the first byte selects the sequence length
//! and the accepted range of the second byte, which rejects overlong forms
//! and surrogate halves without further branching.

/// The "error" rune, U+FFFD REPLACEMENT CHARACTER.
pub const RUNE_ERROR: char = '\u{FFFD}';

/// Runes below this value are represented as themselves in a single byte.
pub const RUNE_SELF: u32 = 0x80;

/// Maximum valid Unicode code point.
pub const MAX_RUNE: u32 = 0x0010_FFFF;

/// Maximum number of bytes of a UTF-8 encoded rune.
pub const UTF_MAX: usize = 4;

const SURROGATE_MIN: u32 = 0xD800;
const SURROGATE_MAX: u32 = 0xDFFF;

const T2: u8 = 0b1100_0000;
const T3: u8 = 0b1110_0000;
const T4: u8 = 0b1111_0000;
const TX: u8 = 0b1000_0000;

const MASKX: u8 = 0b0011_1111;
const MASK2: u8 = 0b0001_1111;
const MASK3: u8 = 0b0000_1111;
const MASK4: u8 = 0b0000_0111;

const RUNE1_MAX: u32 = (1 << 7) - 1;
const RUNE2_MAX: u32 = (1 << 11) - 1;
const RUNE3_MAX: u32 = (1 << 16) - 1;

// Default lowest and highest continuation byte.
const LOCB: u8 = 0b1000_0000;
const HICB: u8 = 0b1011_1111;

// High nibble: index into ACCEPT_RANGES, or F for the one-byte cases.
// Low nibble: sequence length, or the status for the one-byte cases.
const XX: u8 = 0xF1; // invalid: size 1
const AS: u8 = 0xF0; // ASCII: size 1
const S1: u8 = 0x02; // accept 0, size 2
const S2: u8 = 0x13; // accept 1, size 3
const S3: u8 = 0x03; // accept 0, size 3
const S4: u8 = 0x23; // accept 2, size 3
const S5: u8 = 0x34; // accept 3, size 4
const S6: u8 = 0x04; // accept 0, size 4
const S7: u8 = 0x44; // accept 4, size 4

#[rustfmt::skip]
static FIRST: [u8; 256] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x00-0x0F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x10-0x1F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x20-0x2F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x30-0x3F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x40-0x4F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x50-0x5F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x60-0x6F
    AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, AS, // 0x70-0x7F
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 0x80-0x8F
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 0x90-0x9F
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 0xA0-0xAF
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 0xB0-0xBF
    XX, XX, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, // 0xC0-0xCF
    S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, S1, // 0xD0-0xDF
    S2, S3, S3, S3, S3, S3, S3, S3, S3, S3, S3, S3, S3, S4, S3, S3, // 0xE0-0xEF
    S5, S6, S6, S6, S7, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 0xF0-0xFF
];

/// Valid range for the second byte of a sequence, `(lo, hi)` inclusive.
static ACCEPT_RANGES: [(u8, u8); 5] = [
    (LOCB, HICB),
    (0xA0, HICB),
    (LOCB, 0x9F),
    (0x90, HICB),
    (LOCB, 0x8F),
];

#[inline]
fn is_continuation(b: u8) -> bool {
    (LOCB..=HICB).contains(&b)
}

#[inline]
fn scalar(code: u32) -> char {
    // The accept tables only let valid scalar values through.
    char::from_u32(code).unwrap_or(RUNE_ERROR)
}

/// Decodes the first UTF-8 sequence in `p`, returning the rune and its width
/// in bytes.
///
/// Returns `(RUNE_ERROR, 0)` for empty input and `(RUNE_ERROR, 1)` for an
/// invalid sequence: incorrect UTF-8, an out-of-range rune, a surrogate half,
/// or an overlong encoding. Neither result is possible for correct, non-empty
/// UTF-8 other than an encoded U+FFFD, which reports width 3.
#[must_use]
pub fn decode_rune(p: &[u8]) -> (char, usize) {
    let Some(&p0) = p.first() else {
        return (RUNE_ERROR, 0);
    };
    let x = FIRST[p0 as usize];
    if x >= AS {
        return if x == AS {
            (p0 as char, 1)
        } else {
            (RUNE_ERROR, 1)
        };
    }
    let size = (x & 7) as usize;
    let (lo, hi) = ACCEPT_RANGES[(x >> 4) as usize];
    if p.len() < size {
        return (RUNE_ERROR, 1);
    }
    let b1 = p[1];
    if b1 < lo || hi < b1 {
        return (RUNE_ERROR, 1);
    }
    if size == 2 {
        let code = (u32::from(p0 & MASK2) << 6) | u32::from(b1 & MASKX);
        return (scalar(code), 2);
    }
    let b2 = p[2];
    if !is_continuation(b2) {
        return (RUNE_ERROR, 1);
    }
    if size == 3 {
        let code = (u32::from(p0 & MASK3) << 12)
            | (u32::from(b1 & MASKX) << 6)
            | u32::from(b2 & MASKX);
        return (scalar(code), 3);
    }
    let b3 = p[3];
    if !is_continuation(b3) {
        return (RUNE_ERROR, 1);
    }
    let code = (u32::from(p0 & MASK4) << 18)
        | (u32::from(b1 & MASKX) << 12)
        | (u32::from(b2 & MASKX) << 6)
        | u32::from(b3 & MASKX);
    (scalar(code), 4)
}

/// Decodes the last UTF-8 sequence in `p`, returning the rune and its width
/// in bytes. Same error contract as [`decode_rune`].
///
/// The backward scan for a start byte looks at no more than [`UTF_MAX`]
/// bytes, so long runs of continuation bytes cannot make repeated calls
/// quadratic.
#[must_use]
pub fn decode_last_rune(p: &[u8]) -> (char, usize) {
    let end = p.len();
    let Some(&last) = p.last() else {
        return (RUNE_ERROR, 0);
    };
    if u32::from(last) < RUNE_SELF {
        return (last as char, 1);
    }
    let lim = end.saturating_sub(UTF_MAX);
    let mut start = end - 1;
    while start > lim {
        start -= 1;
        if rune_start(p[start]) {
            break;
        }
    }
    let (r, size) = decode_rune(&p[start..end]);
    if start + size != end {
        return (RUNE_ERROR, 1);
    }
    (r, size)
}

/// Writes the UTF-8 encoding of `r` into `dst` and returns the written
/// prefix. Out-of-range runes and surrogate halves are encoded as
/// [`RUNE_ERROR`].
#[allow(clippy::cast_possible_truncation)] // casts keep only the masked bits
pub fn encode_rune(r: u32, dst: &mut [u8; UTF_MAX]) -> &[u8] {
    if r <= RUNE1_MAX {
        dst[0] = r as u8;
        return &dst[..1];
    }
    if r <= RUNE2_MAX {
        dst[0] = T2 | (r >> 6) as u8;
        dst[1] = TX | (r as u8 & MASKX);
        return &dst[..2];
    }
    let r = if r > MAX_RUNE || (SURROGATE_MIN..=SURROGATE_MAX).contains(&r) {
        RUNE_ERROR as u32
    } else {
        r
    };
    if r <= RUNE3_MAX {
        dst[0] = T3 | (r >> 12) as u8;
        dst[1] = TX | ((r >> 6) as u8 & MASKX);
        dst[2] = TX | (r as u8 & MASKX);
        &dst[..3]
    } else {
        dst[0] = T4 | (r >> 18) as u8;
        dst[1] = TX | ((r >> 12) as u8 & MASKX);
        dst[2] = TX | ((r >> 6) as u8 & MASKX);
        dst[3] = TX | (r as u8 & MASKX);
        &dst[..4]
    }
}

/// Reports whether `r` can be legally encoded as UTF-8.
#[must_use]
pub fn valid_rune(r: u32) -> bool {
    r < SURROGATE_MIN || (SURROGATE_MAX < r && r <= MAX_RUNE)
}

/// Number of bytes needed to encode `r`, or `None` if it is not a valid
/// rune.
#[must_use]
pub fn rune_len(r: u32) -> Option<usize> {
    match r {
        0..=RUNE1_MAX => Some(1),
        0x80..=RUNE2_MAX => Some(2),
        SURROGATE_MIN..=SURROGATE_MAX => None,
        0x800..=RUNE3_MAX => Some(3),
        0x1_0000..=MAX_RUNE => Some(4),
        _ => None,
    }
}

/// Reports whether `b` could be the first byte of an encoded, possibly
/// invalid rune.
#[must_use]
#[inline]
pub fn rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Counts the runes in `p`. Each invalid or truncated sequence counts as one
/// rune per byte consumed by [`decode_rune`].
#[must_use]
pub fn rune_count(p: &[u8]) -> usize {
    let mut n = 0;
    let mut i = 0;
    while i < p.len() {
        if u32::from(p[i]) < RUNE_SELF {
            i += 1;
        } else {
            let (_, width) = decode_rune(&p[i..]);
            i += width;
        }
        n += 1;
    }
    n
}
