use std::fmt;

use crate::model::Section;

/// Where in the row stream a cell-level failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLocation {
    pub row: usize,
    pub field: &'static str,
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Csv {
        line: usize,
        message: String,
    },
    /// A character outside the width table reached the wrapper.
    MissingGlyphWidth {
        ch: char,
        location: Option<CellLocation>,
    },
    /// A sentinel value showed up in a section where no transition accepts it.
    MalformedSectionSentinel {
        row: usize,
        section: Section,
        sentinel: String,
    },
    Config(String),
    /// The layout plan could not be written out as JSON.
    PlanExport(serde_json::Error),
    Pdf(String),
}

impl Error {
    /// Attach the row index and field name to a cell-level error.
    pub(crate) fn at_cell(self, row: usize, field: &'static str) -> Self {
        match self {
            Error::MissingGlyphWidth { ch, location: None } => Error::MissingGlyphWidth {
                ch,
                location: Some(CellLocation { row, field }),
            },
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Csv { line, message } => write!(f, "CSV error on line {line}: {message}"),
            Error::MissingGlyphWidth { ch, location } => {
                write!(f, "no width known for character {ch:?}")?;
                if let Some(loc) = location {
                    write!(f, " (row {}, field {})", loc.row, loc.field)?;
                }
                Ok(())
            }
            Error::MalformedSectionSentinel {
                row,
                section,
                sentinel,
            } => write!(
                f,
                "unexpected section sentinel {sentinel:?} at row {row} while in {section}"
            ),
            Error::Config(msg) => write!(f, "invalid layout configuration: {msg}"),
            Error::PlanExport(e) => write!(f, "could not serialize layout plan: {e}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::PlanExport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map_or(0, |p| p.line() as usize);
        let message = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            _ => Error::Csv { line, message },
        }
    }
}
