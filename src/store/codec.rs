//! Encoding of the content file: one `title,filename` row per line, no header
//! and no escaping. A title or filename containing the delimiter cannot be
//! represented, which is why the store validates fields before writing.

use log::debug;

use crate::models::Record;

use super::error::StoreError;

/// Field separator used by every row.
pub const DELIMITER: char = ',';

/// Parse the raw content file into an ordered list of records.
///
/// Blank lines are skipped. Fields past the second are ignored, matching files
/// written by older versions of the tool. A row with fewer than two fields is
/// rejected so the caller never sees a half-populated record.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>, StoreError> {
    let text = std::str::from_utf8(bytes).map_err(|err| StoreError::Format {
        line: line_of_offset(bytes, err.valid_up_to()),
        reason: "content is not valid UTF-8".to_string(),
    })?;

    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(DELIMITER);
        let title = fields.next().unwrap_or_default();
        let filename = fields.next().ok_or_else(|| StoreError::Format {
            line: index + 1,
            reason: format!("expected `title{DELIMITER}filename`, found {line:?}"),
        })?;

        let extra = fields.count();
        if extra > 0 {
            debug!("content file line {}: ignoring {extra} trailing field(s)", index + 1);
        }

        records.push(Record::new(title, filename));
    }

    Ok(records)
}

/// Serialize records in order, terminating every row with a newline.
pub fn encode(records: &[Record]) -> String {
    let mut out = String::with_capacity(records.iter().map(encoded_len).sum());
    for record in records {
        out.push_str(&record.title);
        out.push(DELIMITER);
        out.push_str(&record.filename);
        out.push('\n');
    }
    out
}

/// Whether a field can be written without corrupting the row structure.
pub(crate) fn is_encodable(field: &str) -> bool {
    !field.contains(DELIMITER) && !field.contains(['\n', '\r'])
}

fn encoded_len(record: &Record) -> usize {
    record.title.len() + record.filename.len() + 2
}

fn line_of_offset(bytes: &[u8], offset: usize) -> usize {
    bytes[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
