use alloc::vec::Vec;

/// Split `payload` into approximately equal-sized byte chunks.
///
/// Boundaries ignore UTF-8: a chunk may end in the middle of a rune.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at arbitrary points derived from `splits`.
///
/// Each entry picks the size of the next chunk modulo the remaining length;
/// whatever is left after the last entry forms the final chunk. Sizes may be
/// zero, producing empty chunks.
#[must_use]
pub fn split_at<'a>(payload: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(splits.len() + 1);
    let mut rest = payload;
    for &s in splits {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(s % (rest.len() + 1));
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
