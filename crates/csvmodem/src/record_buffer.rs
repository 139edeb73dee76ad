use alloc::{string::String, vec::Vec};

use bstr::ByteSlice;

use crate::{error::ParseError, options::FieldsPerRecord, record::Record};

/// Accumulates the fields of one record as raw bytes.
///
/// All fields share one arena; `ends` holds the cumulative end offset of each
/// demarcated field. Decoding to text happens once, in [`Self::to_record`].
#[derive(Debug)]
pub(crate) struct RecordBuffer {
    bytes: Vec<u8>,
    ends: Vec<usize>,
    policy: FieldsPerRecord,
}

impl RecordBuffer {
    pub(crate) fn new(policy: FieldsPerRecord) -> Self {
        Self {
            bytes: Vec::new(),
            ends: Vec::new(),
            policy,
        }
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub(crate) fn push_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    pub(crate) fn reset(&mut self) {
        self.bytes.clear();
        self.ends.clear();
    }

    pub(crate) fn demarcate_field(&mut self) {
        self.ends.push(self.bytes.len());
    }

    #[cfg(test)]
    pub(crate) fn policy(&self) -> FieldsPerRecord {
        self.policy
    }

    /// Decodes the demarcated fields and applies the width policy.
    ///
    /// Invalid UTF-8 becomes U+FFFD. A learning policy turns into an exact
    /// one with this record's width.
    pub(crate) fn to_record(&mut self, start_line: usize) -> Result<Record, ParseError> {
        let mut fields: Vec<String> = Vec::with_capacity(self.ends.len());
        let mut prev = 0;
        for &end in &self.ends {
            fields.push(self.bytes[prev..end].to_str_lossy().into_owned());
            prev = end;
        }
        let record = Record::from(fields);

        match self.policy {
            FieldsPerRecord::Exact(n) if n != record.len() => {
                tracing::debug!(
                    line = start_line,
                    expected = n,
                    found = record.len(),
                    "wrong number of fields"
                );
                return Err(ParseError::field_count(start_line, record));
            }
            FieldsPerRecord::Learn => {
                tracing::debug!(fields = record.len(), "learned record width");
                self.policy = FieldsPerRecord::Exact(record.len());
            }
            FieldsPerRecord::Exact(_) | FieldsPerRecord::Unchecked => {}
        }
        Ok(record)
    }
}
