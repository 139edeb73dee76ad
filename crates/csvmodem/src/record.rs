use alloc::{string::String, vec::Vec};
use core::ops::Deref;

/// One decoded CSV row: the ordered fields of a logical line.
///
/// A record is built once when its last field is parsed and is not mutated
/// afterwards. It dereferences to `[String]`.
///
/// ```rust
/// use csvmodem::{Reader, ReaderOptions};
///
/// let mut reader = Reader::from_text("a,\"b\nc\"\n", ReaderOptions::default()).unwrap();
/// let record = reader.read_record().unwrap().unwrap();
/// assert_eq!(record.len(), 2);
/// assert_eq!(record[1], "b\nc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record(Vec<String>);

impl Record {
    /// The fields of the record.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Consumes the record, returning its fields.
    #[must_use]
    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Record {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl From<Record> for Vec<String> {
    fn from(record: Record) -> Self {
        record.0
    }
}

impl IntoIterator for Record {
    type Item = String;
    type IntoIter = alloc::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a String;
    type IntoIter = core::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: AsRef<str>> PartialEq<[S]> for Record {
    fn eq(&self, other: &[S]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<S: AsRef<str>> PartialEq<Vec<S>> for Record {
    fn eq(&self, other: &Vec<S>) -> bool {
        *self == other[..]
    }
}

impl<S: AsRef<str>, const N: usize> PartialEq<[S; N]> for Record {
    fn eq(&self, other: &[S; N]) -> bool {
        *self == other[..]
    }
}
