//! Code point classification consumed by the reader.
//!
//! The reader only asks three questions about a rune. They are collected in
//! the [`CharClass`] capability so a caller (or a test) can substitute its own
//! tables; [`DefaultCharClass`] answers them from static range tables with a
//! Latin-1 fast path.

/// Boolean predicates over code points.
pub trait CharClass: Sync {
    /// Reports whether `c` is white space (the Unicode `White_Space`
    /// property).
    fn is_space(&self, c: char) -> bool;

    /// Reports whether `c` is a decimal digit (general category `Nd`).
    fn is_digit(&self, c: char) -> bool;

    /// Reports whether `c` is an upper case letter.
    fn is_upper(&self, c: char) -> bool;
}

impl core::fmt::Debug for dyn CharClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CharClass")
    }
}

/// The classification used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCharClass;

/// Shared instance of [`DefaultCharClass`].
pub static DEFAULT_CHAR_CLASS: DefaultCharClass = DefaultCharClass;

const MAX_LATIN1: u32 = 0xFF;

// Ranges of general category Nd above Latin-1, sorted, inclusive, stride 1.
#[rustfmt::skip]
static DECIMAL_DIGITS: &[(u32, u32)] = &[
    (0x0660, 0x0669), (0x06f0, 0x06f9), (0x07c0, 0x07c9), (0x0966, 0x096f),
    (0x09e6, 0x09ef), (0x0a66, 0x0a6f), (0x0ae6, 0x0aef), (0x0b66, 0x0b6f),
    (0x0be6, 0x0bef), (0x0c66, 0x0c6f), (0x0ce6, 0x0cef), (0x0d66, 0x0d6f),
    (0x0de6, 0x0def), (0x0e50, 0x0e59), (0x0ed0, 0x0ed9), (0x0f20, 0x0f29),
    (0x1040, 0x1049), (0x1090, 0x1099), (0x17e0, 0x17e9), (0x1810, 0x1819),
    (0x1946, 0x194f), (0x19d0, 0x19d9), (0x1a80, 0x1a89), (0x1a90, 0x1a99),
    (0x1b50, 0x1b59), (0x1bb0, 0x1bb9), (0x1c40, 0x1c49), (0x1c50, 0x1c59),
    (0xa620, 0xa629), (0xa8d0, 0xa8d9), (0xa900, 0xa909), (0xa9d0, 0xa9d9),
    (0xa9f0, 0xa9f9), (0xaa50, 0xaa59), (0xabf0, 0xabf9), (0xff10, 0xff19),
    (0x104a0, 0x104a9), (0x10d30, 0x10d39), (0x11066, 0x1106f), (0x110f0, 0x110f9),
    (0x11136, 0x1113f), (0x111d0, 0x111d9), (0x112f0, 0x112f9), (0x11450, 0x11459),
    (0x114d0, 0x114d9), (0x11650, 0x11659), (0x116c0, 0x116c9), (0x11730, 0x11739),
    (0x118e0, 0x118e9), (0x11c50, 0x11c59), (0x11d50, 0x11d59), (0x11da0, 0x11da9),
    (0x16a60, 0x16a69), (0x16b50, 0x16b59), (0x1d7ce, 0x1d7ff), (0x1e140, 0x1e149),
    (0x1e2f0, 0x1e2f9), (0x1e950, 0x1e959),
];

fn in_ranges(ranges: &[(u32, u32)], r: u32) -> bool {
    ranges
        .binary_search_by(|&(lo, hi)| {
            if hi < r {
                core::cmp::Ordering::Less
            } else if lo > r {
                core::cmp::Ordering::Greater
            } else {
                core::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

impl CharClass for DefaultCharClass {
    fn is_space(&self, c: char) -> bool {
        if u32::from(c) <= MAX_LATIN1 {
            return matches!(c, '\t' | '\n' | '\x0B' | '\x0C' | '\r' | ' ' | '\u{85}' | '\u{A0}');
        }
        c.is_whitespace()
    }

    fn is_digit(&self, c: char) -> bool {
        let r = u32::from(c);
        if r <= MAX_LATIN1 {
            return c.is_ascii_digit();
        }
        in_ranges(DECIMAL_DIGITS, r)
    }

    fn is_upper(&self, c: char) -> bool {
        if u32::from(c) <= MAX_LATIN1 {
            return matches!(c, 'A'..='Z' | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{DE}');
        }
        c.is_uppercase()
    }
}
