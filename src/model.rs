use std::fmt;

use serde::Serialize;

/// Number of columns in a table export row.
pub const ROW_FIELDS: usize = 10;

/// One record of the flat table export. Row order is meaningful and never changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub lower: String,
    pub upper: String,
    pub rr_allocation: String,
    pub rr_footnotes: String,
    pub eca_allocation: String,
    pub eca_footnotes: String,
    pub deliverables: String,
    pub applications: String,
    pub standards: String,
    pub notes: String,
}

impl Row {
    /// Build a row from exactly [`ROW_FIELDS`] fields; any other count is rejected.
    pub fn from_fields(fields: Vec<String>) -> Option<Row> {
        let [
            lower,
            upper,
            rr_allocation,
            rr_footnotes,
            eca_allocation,
            eca_footnotes,
            deliverables,
            applications,
            standards,
            notes,
        ]: [String; ROW_FIELDS] = fields.try_into().ok()?;
        Some(Row {
            lower,
            upper,
            rr_allocation,
            rr_footnotes,
            eca_allocation,
            eca_footnotes,
            deliverables,
            applications,
            standards,
            notes,
        })
    }

    pub fn fields(&self) -> [&str; ROW_FIELDS] {
        [
            &self.lower,
            &self.upper,
            &self.rr_allocation,
            &self.rr_footnotes,
            &self.eca_allocation,
            &self.eca_footnotes,
            &self.deliverables,
            &self.applications,
            &self.standards,
            &self.notes,
        ]
    }

    /// Identifier of a glossary row (first column).
    pub fn glossary_key(&self) -> &str {
        self.lower.trim()
    }

    /// Description of a glossary row: the non-empty fields after the sentinel column.
    pub fn glossary_text(&self) -> String {
        self.fields()[2..]
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    MainTable,
    EcaFootnoteText,
    RrFootnoteText,
    CeptDeliverableGlossary,
    EtsiStandardGlossary,
    EtsiReceiveOnlyGlossary,
    AbbreviationGlossary,
}

impl Section {
    /// Render order of the sections in the document.
    pub const ORDER: [Section; 7] = [
        Section::MainTable,
        Section::EcaFootnoteText,
        Section::RrFootnoteText,
        Section::CeptDeliverableGlossary,
        Section::EtsiStandardGlossary,
        Section::EtsiReceiveOnlyGlossary,
        Section::AbbreviationGlossary,
    ];

    pub fn is_footnote_text(self) -> bool {
        matches!(self, Section::EcaFootnoteText | Section::RrFootnoteText)
    }

    pub fn default_title(self) -> &'static str {
        match self {
            Section::MainTable => "European Common Allocation Table",
            Section::EcaFootnoteText => "ECA Footnotes",
            Section::RrFootnoteText => "RR Footnotes",
            Section::CeptDeliverableGlossary => "CEPT Deliverables",
            Section::EtsiStandardGlossary => "ETSI Harmonised Standards",
            Section::EtsiReceiveOnlyGlossary => "ETSI Standards for Receive-Only Equipment",
            Section::AbbreviationGlossary => "Abbreviations",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Section::MainTable => "chapter_allocation_table",
            Section::EcaFootnoteText => "chapter_eca_footnotes",
            Section::RrFootnoteText => "chapter_rr_footnotes",
            Section::CeptDeliverableGlossary => "chapter_cept_deliverables",
            Section::EtsiStandardGlossary => "chapter_etsi_standards",
            Section::EtsiReceiveOnlyGlossary => "chapter_etsi_receive_only",
            Section::AbbreviationGlossary => "chapter_abbreviations",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::MainTable => "MainTable",
            Section::EcaFootnoteText => "ECAFootnoteText",
            Section::RrFootnoteText => "RRFootnoteText",
            Section::CeptDeliverableGlossary => "CEPTDeliverableGlossary",
            Section::EtsiStandardGlossary => "ETSIStandardGlossary",
            Section::EtsiReceiveOnlyGlossary => "ETSIReceiveOnlyGlossary",
            Section::AbbreviationGlossary => "AbbreviationGlossary",
        };
        f.write_str(name)
    }
}

/// A maximal run of main-table rows sharing one (lower, upper) frequency pair.
#[derive(Clone, Copy, Debug)]
pub struct FrequencyBand<'a> {
    pub lower: &'a str,
    pub upper: &'a str,
    /// Index of the first row in the source stream.
    pub first_row: usize,
    pub rows: &'a [Row],
}

impl FrequencyBand<'_> {
    pub fn title(&self) -> String {
        format!("{} - {}", self.lower, self.upper)
    }

    pub fn slug(&self) -> String {
        format!("band_{}_{}", slugify(self.lower), slugify(self.upper))
    }
}

/// Map every non-alphanumeric character to `_`.
pub fn slugify(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Target {
    /// External hyperlink.
    Url(String),
    /// Jump to an anchor slug inside the document.
    Internal(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub target: Option<Target>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            target: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    /// Continuation line: starts with the indent marker.
    pub indent: bool,
    pub spans: Vec<Span>,
}

impl Line {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }
}

/// Cell text with explicit line breaks. Immutable once produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WrappedText {
    lines: Vec<Line>,
}

impl WrappedText {
    pub fn new(lines: Vec<Line>) -> Self {
        WrappedText {
            lines: lines.into_iter().filter(|l| !l.is_empty()).collect(),
        }
    }

    /// Unwrapped text; explicit newlines become line breaks.
    pub fn plain(text: &str) -> Self {
        WrappedText::new(
            text.lines()
                .map(|l| Line {
                    indent: false,
                    spans: vec![Span::plain(l.trim())],
                })
                .collect(),
        )
    }

    /// A single (possibly linked) line.
    pub fn single(span: Span) -> Self {
        WrappedText::new(vec![Line {
            indent: false,
            spans: vec![span],
        }])
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append `other` below this text.
    pub fn then(mut self, other: WrappedText) -> Self {
        self.lines.extend(other.lines);
        self
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FootnoteReference {
    pub id: String,
    /// Glossary text; `None` when the id is unknown to the glossary.
    pub text: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TableKind {
    ColumnHeader,
    Band,
    Glossary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<WrappedText>,
    /// Anchor slug other cells can link to.
    pub anchor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableBlock {
    pub kind: TableKind,
    pub section: Section,
    pub rows: Vec<TableRow>,
    /// Leading columns merged across all rows (only row 0 carries them).
    pub span_columns: usize,
    pub estimated_height: f32,
    pub page_usage_before: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub text: String,
    pub slug: String,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    pub title: String,
    pub slug: String,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Instruction {
    AddHeading(Heading),
    AddBookmark(Bookmark),
    AddTableBlock(TableBlock),
    AddPageBreak,
}

/// Output of the layout planner, consumed by a renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Plan {
    pub instructions: Vec<Instruction>,
    /// Footnotes referenced by the main table, in first-encounter order.
    pub footnotes: Vec<FootnoteReference>,
}

impl Plan {
    pub fn estimated_pages(&self) -> usize {
        1 + self
            .instructions
            .iter()
            .filter(|i| matches!(i, Instruction::AddPageBreak))
            .count()
    }

    pub fn table_blocks(&self) -> impl Iterator<Item = &TableBlock> {
        self.instructions.iter().filter_map(|i| match i {
            Instruction::AddTableBlock(b) => Some(b),
            _ => None,
        })
    }
}
