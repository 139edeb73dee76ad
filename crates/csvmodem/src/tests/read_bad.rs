use alloc::string::ToString;

use rstest::rstest;

use super::utils::{read_to_end, read_to_end_bytewise};
use crate::{
    ConfigError, CsvError, FieldsPerRecord, ParseErrorKind, Reader, ReaderOptions,
    utf8::RUNE_ERROR,
};

fn opts() -> ReaderOptions {
    ReaderOptions::default().with_fields_per_record(FieldsPerRecord::Unchecked)
}

#[rstest]
#[case::bad_double_quotes("a\"\"b,c", opts(), ParseErrorKind::BareQuote, 1, 1, 1)]
#[case::bad_bare_quote("a \"word\",\"b\"", opts(), ParseErrorKind::BareQuote, 1, 1, 2)]
#[case::bad_trailing_quote("\"a word\",b\"", opts(), ParseErrorKind::BareQuote, 1, 1, 10)]
#[case::extraneous_quote("\"a \"word\",\"b\"", opts(), ParseErrorKind::Quote, 1, 1, 3)]
#[case::bad_field_count(
    "a,b,c\nd,e",
    opts().with_fields_per_record(FieldsPerRecord::Learn),
    ParseErrorKind::FieldCount,
    2,
    2,
    0
)]
#[case::bad_field_count1(
    "a,b,c",
    opts().with_fields_per_record(FieldsPerRecord::Exact(2)),
    ParseErrorKind::FieldCount,
    1,
    1,
    0
)]
#[case::start_line1("a,\"b\nc\"d,e", opts(), ParseErrorKind::Quote, 1, 2, 1)]
#[case::start_line2("a,b\n\"d\n\n,e", opts(), ParseErrorKind::Quote, 2, 5, 0)]
#[case::quoted_trailing_crcr("\"field\"\r\r", opts(), ParseErrorKind::Quote, 1, 1, 6)]
#[case::quote_with_trailing_crlf("\"foo\"bar\"\r\n", opts(), ParseErrorKind::Quote, 1, 1, 4)]
#[case::odd_quotes("\"\"\"\"\"\"\"", opts(), ParseErrorKind::Quote, 1, 1, 7)]
#[case::multibyte_before_bare_quote("λ€x\"", opts(), ParseErrorKind::BareQuote, 1, 1, 3)]
#[case::replacement_char_is_one_rune("\u{FFFD}a,\"b\"c", opts(), ParseErrorKind::Quote, 1, 1, 5)]
fn read_bad(
    #[case] input: &str,
    #[case] options: ReaderOptions,
    #[case] kind: ParseErrorKind,
    #[case] start_line: usize,
    #[case] line: usize,
    #[case] column: usize,
) {
    let err = read_to_end(input.as_bytes(), options).unwrap_err();
    let parse = err.as_parse().unwrap();
    assert_eq!(parse.kind, kind);
    assert_eq!(
        (parse.start_line, parse.line, parse.column),
        (start_line, line, column),
        "{parse}"
    );

    let bytewise = read_to_end_bytewise(input.as_bytes(), options).unwrap_err();
    assert_eq!(bytewise, err);
}

#[rstest]
#[case::bad_comma1(opts().with_comma('\n'))]
#[case::bad_comma2(opts().with_comma('\r'))]
#[case::bad_comma3(opts().with_comma('"'))]
#[case::bad_comma4(opts().with_comma(RUNE_ERROR))]
#[case::bad_comment1(opts().with_comment('\n'))]
#[case::bad_comment2(opts().with_comment('\r'))]
#[case::bad_comment3(opts().with_comment(RUNE_ERROR))]
#[case::bad_comma_comment(opts().with_comma('X').with_comment('X'))]
fn rejects_delimiters(#[case] options: ReaderOptions) {
    let err = Reader::from_text("a,b\n", options).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidDelimiter(_) | ConfigError::DelimiterCollision(_)
    ));
    assert!(Reader::from_chunks(["a,b\n"], options).is_err());
}

#[test]
fn field_count_error_carries_record() {
    let options = opts().with_fields_per_record(FieldsPerRecord::Learn);
    let mut reader = Reader::from_text("a,b,c\nd,\"e\nf\"\ng,h,i\n", options).unwrap();
    assert!(reader.read_record().unwrap().is_some());

    let err = reader.read_record().unwrap_err();
    let CsvError::Parse(parse) = err else {
        panic!("expected a parse error");
    };
    assert_eq!(parse.kind, ParseErrorKind::FieldCount);
    assert_eq!((parse.start_line, parse.line), (2, 2));
    assert_eq!(parse.to_string(), "record on line 2: wrong number of fields");
    assert_eq!(parse.into_record().unwrap(), ["d", "e\nf"]);

    assert_eq!(reader.read_record().unwrap().unwrap(), ["g", "h", "i"]);
}

#[test]
fn unterminated_quote_reports_eof_line() {
    let err = read_to_end(b"a\n\"b\nc", opts()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "csv: record on line 2; parse error on line 4, column 0: extraneous or missing \" in quoted-field"
    );
}

#[test]
fn lazy_unterminated_quote_closes_field() {
    let records = read_to_end(b"a,\"b\nc", opts().with_lazy_quotes(true)).unwrap();
    assert_eq!(records, [["a", "b\nc"]]);
}
