use alloc::vec::Vec;

use crate::{CsvError, Reader, ReaderOptions, Record};

/// Every result the reader yields for `input` given as one complete buffer,
/// parse errors included.
pub(crate) fn records_whole(
    input: &[u8],
    options: ReaderOptions,
) -> Vec<Result<Record, CsvError>> {
    Reader::from_bytes(input, options)
        .unwrap()
        .into_records()
        .collect()
}

/// Same as [`records_whole`], but `input` arrives as `chunks`.
pub(crate) fn records_chunked(
    chunks: &[&[u8]],
    options: ReaderOptions,
) -> Vec<Result<Record, CsvError>> {
    let owned: Vec<Vec<u8>> = chunks.iter().map(|c| c.to_vec()).collect();
    Reader::from_chunks(owned, options)
        .unwrap()
        .into_records()
        .collect()
}

/// Reads up to the first error, like a caller collecting into a `Result`.
pub(crate) fn read_to_end(
    input: &[u8],
    options: ReaderOptions,
) -> Result<Vec<Record>, CsvError> {
    Reader::from_bytes(input, options)
        .unwrap()
        .records()
        .collect()
}

/// Same as [`read_to_end`], one byte per chunk.
pub(crate) fn read_to_end_bytewise(
    input: &[u8],
    options: ReaderOptions,
) -> Result<Vec<Record>, CsvError> {
    let chunks: Vec<&[u8]> = input.chunks(1).collect();
    Reader::from_chunks(chunks, options)
        .unwrap()
        .records()
        .collect()
}

pub(crate) fn as_strs(records: &[Record]) -> Vec<Vec<&str>> {
    records
        .iter()
        .map(|r| r.iter().map(alloc::string::String::as_str).collect())
        .collect()
}
