pub mod lookup;

use std::path::Path;

use crate::error::Error;
use crate::model::{ROW_FIELDS, Row};

/// One parsed CSV record and the line it starts on (1-based).
pub(crate) struct Record {
    pub(crate) line: usize,
    pub(crate) fields: Vec<String>,
}

pub(crate) fn read_text(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })
}

/// Split semicolon-delimited text into records. Fields may be quoted with `"`
/// (doubled quotes escape one); quoted fields may span lines. A quote inside
/// an unquoted field is literal. Fields are trimmed; blank lines are skipped.
pub(crate) fn parse_records(text: &str) -> Result<Vec<Record>, Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        records.push(Record {
            line: record.position().map_or(0, |p| p.line() as usize),
            fields: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(records)
}

/// Parse the allocation table export. The first record is the header row.
pub fn parse_rows(text: &str) -> Result<Vec<Row>, Error> {
    parse_records(text)?
        .into_iter()
        .skip(1)
        .map(|record| {
            let count = record.fields.len();
            Row::from_fields(record.fields).ok_or_else(|| Error::Csv {
                line: record.line,
                message: format!("expected {ROW_FIELDS} fields, found {count}"),
            })
        })
        .collect()
}

pub fn read_rows(path: &Path) -> Result<Vec<Row>, Error> {
    let rows = parse_rows(&read_text(path)?)?;
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
