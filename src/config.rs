use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Constants of the wrapping and height estimators.
///
/// The defaults are tuned for landscape A4 with 8 pt cell text; a different
/// page or font needs its own values rather than edits to the estimators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Wrap budget for allocation cells, in relative width units.
    pub max_line_width: f32,
    /// Width charged to the indent marker of a continuation line.
    pub continuation_indent: f32,
    /// Page budget in line units.
    pub max_lines_per_page: f32,
    /// Usage right after a continuation page break (repeated column header).
    pub header_overhead: f32,
    /// Usage right after a chapter break (chapter heading and column header).
    pub chapter_overhead: f32,
    /// Constant added to every band estimate (band heading and spacing).
    pub band_overhead: f32,
    /// Scale applied to wrapped allocation line counts.
    pub service_line_factor: f32,
    pub notes_chars_per_line: usize,
    pub glossary_chars_per_line: usize,
    /// Reserved usage value meaning "open a new chapter on the next check".
    pub chapter_break_sentinel: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_line_width: 28.0,
            continuation_indent: 2.0,
            max_lines_per_page: 36.0,
            header_overhead: 2.0,
            chapter_overhead: 4.0,
            band_overhead: 3.7,
            service_line_factor: 0.85,
            notes_chars_per_line: 40,
            glossary_chars_per_line: 110,
            chapter_break_sentinel: 100.0,
        }
    }
}

impl LayoutConfig {
    /// Read a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", e, path.display()),
            ))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, Error> {
        let config: LayoutConfig =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.max_line_width > 0.0) {
            return Err(Error::Config("max_line_width must be positive".into()));
        }
        if !(self.max_lines_per_page > self.header_overhead)
            || !(self.max_lines_per_page > self.chapter_overhead)
        {
            return Err(Error::Config(
                "max_lines_per_page must exceed the header and chapter overheads".into(),
            ));
        }
        if self.notes_chars_per_line == 0 || self.glossary_chars_per_line == 0 {
            return Err(Error::Config("chars-per-line divisors must be non-zero".into()));
        }
        Ok(())
    }
}
