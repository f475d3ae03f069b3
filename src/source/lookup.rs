use std::path::Path;

use crate::error::Error;
use crate::layout::links::Lookup;

use super::{parse_records, read_text};

const KEY_COLUMNS: [&str; 4] = ["title", "identifier", "reference", "standard"];
const URL_COLUMNS: [&str; 4] = ["pdf", "url", "hyperlink", "link"];

fn find_column(header: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| header.iter().position(|h| h.trim().eq_ignore_ascii_case(c)))
}

/// First `http…` run of a cell; cells may list several URLs.
pub fn first_url(cell: &str) -> Option<&str> {
    let start = cell.find("http")?;
    let rest = &cell[start..];
    let end = rest
        .find(|c: char| c == '"' || c == ',' || c.is_whitespace())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Parse a semicolon-delimited identifier → URL table with a header row.
pub fn parse_lookup(text: &str) -> Result<Lookup, Error> {
    let mut records = parse_records(text)?.into_iter();
    let Some(header) = records.next() else {
        return Ok(Lookup::new());
    };
    let key_col = find_column(&header.fields, &KEY_COLUMNS).ok_or_else(|| Error::Csv {
        line: header.line,
        message: "lookup has no Title/Identifier column".into(),
    })?;
    let url_col = find_column(&header.fields, &URL_COLUMNS).ok_or_else(|| Error::Csv {
        line: header.line,
        message: "lookup has no pdf/URL/Hyperlink column".into(),
    })?;

    let mut pairs = Vec::new();
    for record in records {
        let key = record.fields.get(key_col).map(|k| k.trim()).unwrap_or("");
        if key.is_empty() {
            continue;
        }
        match record.fields.get(url_col).and_then(|u| first_url(u)) {
            Some(url) => pairs.push((key.to_string(), url.to_string())),
            None => log::warn!("lookup line {}: {key:?} has no URL, skipped", record.line),
        }
    }
    Ok(Lookup::from_pairs(pairs))
}

pub fn read_lookup(path: &Path) -> Result<Lookup, Error> {
    let lookup = parse_lookup(&read_text(path)?)?;
    log::debug!("read {} lookup entries from {}", lookup.len(), path.display());
    Ok(lookup)
}
