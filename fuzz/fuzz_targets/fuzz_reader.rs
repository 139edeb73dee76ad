#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use csvmodem::{FieldsPerRecord, Reader, ReaderOptions, split_at};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

static COMMAS: &[char] = &[',', ';', '\t', '€', 'λ'];

static LINE_ENDINGS: &[&str] = &["\n", "\r\n", "\r", "\r\r\n"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

#[derive(Debug, Arbitrary)]
enum Field {
    Plain(String),
    Quoted(String),
    /// A quoted field with a stray quote or a missing close.
    Broken(String),
}

#[derive(Debug, Arbitrary)]
struct Table {
    rows: Vec<Vec<Field>>,
}

fn render_table(table: &Table, comma: char) -> Vec<u8> {
    let mut out = String::new();
    for (r, row) in table.rows.iter().enumerate() {
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                out.push(comma);
            }
            match field {
                Field::Plain(s) => out.push_str(s),
                Field::Quoted(s) => {
                    out.push('"');
                    out.push_str(&s.replace('"', "\"\""));
                    out.push('"');
                }
                Field::Broken(s) => {
                    out.push('"');
                    out.push_str(s);
                }
            }
        }
        out.push_str(with_rng(|rng| LINE_ENDINGS[rng.random_range(0..LINE_ENDINGS.len())]));
        if r % 7 == 6 {
            out.push_str("#comment\n");
        }
    }
    out.into_bytes()
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let limit = max_size - HEADER;
        let table = loop {
            let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
            let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
            if let Ok(table) = Table::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
                break table;
            }
        };
        let comma = COMMAS[usize::from(data[0] >> 3) % COMMAS.len()];
        let rendered = render_table(&table, comma);
        let len = rendered.len().min(limit);
        data[HEADER..HEADER + len].copy_from_slice(&rendered[..len]);
        HEADER + len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fn options(flags: u8) -> ReaderOptions {
    let mut options = ReaderOptions {
        comma: COMMAS[usize::from(flags >> 3) % COMMAS.len()],
        lazy_quotes: flags & 1 != 0,
        trim_leading_space: flags & 2 != 0,
        fields_per_record: if flags & 4 != 0 {
            FieldsPerRecord::Learn
        } else {
            FieldsPerRecord::Unchecked
        },
        empty_read_budget: usize::MAX,
        ..Default::default()
    };
    if flags & 0x80 != 0 {
        options.comment = Some('#');
    }
    options
}

/// Derive split points from the seed; chunk boundaries may fall anywhere,
/// including inside a multi-byte rune.
fn splits(len: usize, seed: u32) -> Vec<usize> {
    let mut rng = SmallRng::seed_from_u64(u64::from(seed));
    (0..len.min(64)).map(|_| rng.random_range(0..=len)).collect()
}

fn reader(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    let data = &data[HEADER..];
    let options = options(flags);

    let whole: Vec<_> = Reader::from_bytes(data, options)
        .expect("options are valid")
        .into_records()
        .collect();

    let splits = splits(data.len(), split_seed);
    let chunks = split_at(data, &splits);
    let chunked: Vec<_> = Reader::from_chunks(chunks, options)
        .expect("options are valid")
        .into_records()
        .collect();

    assert_eq!(whole, chunked, "chunking changed the result");
}

fuzz_target!(|data: &[u8]| reader(data));
