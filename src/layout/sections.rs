use std::fmt;

use crate::error::Error;
use crate::model::{Row, Section};

/// Reserved values of the upper-frequency column that mark section boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentinel {
    FootnoteText,
    Title,
    Description,
}

impl Sentinel {
    pub fn parse(field: &str) -> Option<Self> {
        match field.trim() {
            "footnotetext" => Some(Sentinel::FootnoteText),
            "title" => Some(Sentinel::Title),
            "description" => Some(Sentinel::Description),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentinel::FootnoteText => "footnotetext",
            Sentinel::Title => "title",
            Sentinel::Description => "description",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The whole transition table. The same sentinel leads to different sections
/// depending on where the stream currently is.
pub fn transition(current: Section, sentinel: Sentinel) -> Option<Section> {
    use Section::*;
    match (current, sentinel) {
        (MainTable, Sentinel::FootnoteText) => Some(EcaFootnoteText),
        (EcaFootnoteText, Sentinel::FootnoteText) => Some(RrFootnoteText),
        (EcaFootnoteText | RrFootnoteText, Sentinel::Title) => Some(CeptDeliverableGlossary),
        (CeptDeliverableGlossary, Sentinel::Title) => Some(EtsiStandardGlossary),
        (EtsiStandardGlossary, Sentinel::Title) => Some(EtsiReceiveOnlyGlossary),
        (AbbreviationGlossary, _) => None,
        (_, Sentinel::Description) => Some(AbbreviationGlossary),
        _ => None,
    }
}

/// Section assignment of one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classified {
    pub index: usize,
    pub section: Section,
    /// The row is the sentinel that opened `section`.
    pub starts_section: bool,
}

/// History-dependent classifier over the row stream.
#[derive(Clone, Debug)]
pub struct Demultiplexer {
    state: Section,
    next_index: usize,
}

impl Default for Demultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Demultiplexer {
    pub fn new() -> Self {
        Self {
            state: Section::MainTable,
            next_index: 0,
        }
    }

    pub fn state(&self) -> Section {
        self.state
    }

    /// Classify the next row. A sentinel with no transition from the current
    /// section is an error; the abbreviation glossary absorbs everything.
    pub fn classify(&mut self, row: &Row) -> Result<Classified, Error> {
        let index = self.next_index;
        self.next_index += 1;

        if self.state == Section::AbbreviationGlossary {
            return Ok(Classified {
                index,
                section: self.state,
                starts_section: false,
            });
        }

        let Some(sentinel) = Sentinel::parse(&row.upper) else {
            return Ok(Classified {
                index,
                section: self.state,
                starts_section: false,
            });
        };

        match transition(self.state, sentinel) {
            Some(next) => {
                log::debug!("row {index}: {sentinel} moves {} -> {next}", self.state);
                self.state = next;
                Ok(Classified {
                    index,
                    section: next,
                    starts_section: true,
                })
            }
            None => Err(Error::MalformedSectionSentinel {
                row: index,
                section: self.state,
                sentinel: sentinel.as_str().to_string(),
            }),
        }
    }
}

/// Classify every row of a stream, failing on the first malformed sentinel.
pub fn classify_rows(rows: &[Row]) -> Result<Vec<Classified>, Error> {
    let mut demux = Demultiplexer::new();
    rows.iter().map(|row| demux.classify(row)).collect()
}

/// Content of one section after the main table.
#[derive(Clone, Debug)]
pub struct SectionPart<'a> {
    pub section: Section,
    /// Chapter title carried by the sentinel row, if any.
    pub title: Option<String>,
    /// Index of the first content row (the one after the sentinel).
    pub first_row: usize,
    pub rows: &'a [Row],
}

impl SectionPart<'_> {
    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| self.section.default_title())
    }
}

/// A row stream split into its sections. Sections only move forward, so each
/// one is a contiguous slice of the input.
#[derive(Clone, Debug)]
pub struct Demultiplexed<'a> {
    pub main: &'a [Row],
    pub parts: Vec<SectionPart<'a>>,
}

impl<'a> Demultiplexed<'a> {
    pub fn part(&self, section: Section) -> Option<&SectionPart<'a>> {
        self.parts.iter().find(|p| p.section == section)
    }
}

pub fn demultiplex(rows: &[Row]) -> Result<Demultiplexed<'_>, Error> {
    let classified = classify_rows(rows)?;
    let starts: Vec<&Classified> = classified.iter().filter(|c| c.starts_section).collect();

    let main_end = starts.first().map_or(rows.len(), |c| c.index);
    let mut parts = Vec::with_capacity(starts.len());
    for (i, start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(rows.len(), |c| c.index);
        let sentinel_row = &rows[start.index];
        let title = Some(sentinel_row.lower.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        parts.push(SectionPart {
            section: start.section,
            title,
            first_row: start.index + 1,
            rows: &rows[start.index + 1..end],
        });
    }

    Ok(Demultiplexed {
        main: &rows[..main_end],
        parts,
    })
}
