use alloc::{string::String, vec::Vec};

use quickcheck::QuickCheck;

use super::utils::{records_chunked, records_whole};
use crate::{CsvError, FieldsPerRecord, ParseErrorKind, ReaderOptions, split_at};

/// Input fragments chosen to hit quoting, line ending, and multi-byte rune
/// edge cases far more often than uniform bytes would.
const TOKENS: &[&[u8]] = &[
    b"a",
    b"b",
    b",",
    b"\"",
    b"\"\"",
    b"\n",
    b"\r",
    b"\r\n",
    b" ",
    b"\t",
    b"#",
    b"\xb4",
    "λ".as_bytes(),
    "θ".as_bytes(),
    "€".as_bytes(),
    "\u{3000}".as_bytes(),
];

const COMMAS: [char; 4] = [',', '€', 'λ', '\t'];

fn build_input(picks: &[u8]) -> Vec<u8> {
    picks
        .iter()
        .flat_map(|&p| TOKENS[usize::from(p) % TOKENS.len()].iter().copied())
        .collect()
}

fn build_options(lazy: bool, trim: bool, comma: u8, comment: bool) -> ReaderOptions {
    let mut options = ReaderOptions {
        comma: COMMAS[usize::from(comma) % COMMAS.len()],
        lazy_quotes: lazy,
        trim_leading_space: trim,
        empty_read_budget: 1_000,
        ..Default::default()
    };
    if comment {
        options.comment = Some('#');
    }
    options
}

fn test_count() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: splitting the input at arbitrary byte offsets (inside runes,
/// inside quoted fields, between `\r` and `\n`) yields exactly the same
/// records and errors as reading it whole.
#[test]
fn partition_matches_whole_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(
        picks: Vec<u8>,
        splits: Vec<usize>,
        lazy: bool,
        trim: bool,
        comma: u8,
        comment: bool,
    ) -> bool {
        let input = build_input(&picks);
        let options = build_options(lazy, trim, comma, comment);
        let whole = records_whole(&input, options);
        let chunks = split_at(&input, &splits);
        records_chunked(&chunks, options) == whole
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>, bool, bool, u8, bool) -> bool);
}

/// Property: with the width check disabled, only quoting can fail.
#[test]
fn unchecked_width_never_fails_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(picks: Vec<u8>, lazy: bool, comma: u8) -> bool {
        let input = build_input(&picks);
        let options = build_options(lazy, false, comma, false)
            .with_fields_per_record(FieldsPerRecord::Unchecked);
        records_whole(&input, options).iter().all(|result| match result {
            Ok(_) => true,
            // Lazy quoting accepts every input.
            Err(CsvError::Parse(err)) => !lazy && err.kind != ParseErrorKind::FieldCount,
            Err(_) => false,
        })
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>, bool, u8) -> bool);
}

/// Property: fields written with every value quoted, and embedded quotes
/// doubled, read back unchanged.
#[test]
fn quoted_fields_read_back_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(rows: Vec<Vec<String>>, comma: u8) -> bool {
        let comma = COMMAS[usize::from(comma) % COMMAS.len()];
        // `\r\n` inside a quoted field is read back as `\n`.
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.into_iter().map(|f| f.replace('\r', "")).collect())
            .collect();

        let mut text = String::new();
        for row in &rows {
            for (i, field) in row.iter().enumerate() {
                if i > 0 {
                    text.push(comma);
                }
                text.push('"');
                text.push_str(&field.replace('"', "\"\""));
                text.push('"');
            }
            text.push('\n');
        }

        let options = ReaderOptions::default()
            .with_comma(comma)
            .with_fields_per_record(FieldsPerRecord::Unchecked);
        let read: Result<Vec<_>, _> = records_whole(text.as_bytes(), options)
            .into_iter()
            .collect();
        read.is_ok_and(|records| {
            records.len() == rows.len()
                && records.iter().zip(&rows).all(|(record, row)| record == row)
        })
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<Vec<String>>, u8) -> bool);
}
