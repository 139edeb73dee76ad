#![allow(missing_docs)]
#![allow(dead_code)]

use core::fmt::Write;

use csvmodem::{CsvError, Record};

/// One line per result: `ok [fields]` or `err message`.
pub fn render<I>(results: I) -> String
where
    I: IntoIterator<Item = Result<Record, CsvError>>,
{
    let mut out = String::new();
    for (i, result) in results.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match result {
            Ok(record) => write!(out, "ok {:?}", record.fields()).unwrap(),
            Err(err) => write!(out, "err {err}").unwrap(),
        }
    }
    out
}

pub const INVENTORY: &str = "name,qty\n\"pens, blue\",3\nbad\"quote,1\n\"multi\nline\",2\nshort\n";
