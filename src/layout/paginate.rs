use crate::config::LayoutConfig;
use crate::model::{
    Bookmark, FrequencyBand, Heading, Instruction, Row, Section, TableBlock, TableKind, TableRow,
    WrappedText,
};

pub const MAIN_COLUMNS: [&str; 6] = [
    "RR Region 1",
    "European Common Allocations",
    "Applications",
    "CEPT Deliverables",
    "Standards",
    "Notes",
];

pub fn glossary_columns(section: Section) -> [&'static str; 2] {
    match section {
        Section::EcaFootnoteText | Section::RrFootnoteText => ["Footnote", "Text"],
        Section::CeptDeliverableGlossary => ["Deliverable", "Title"],
        Section::EtsiStandardGlossary | Section::EtsiReceiveOnlyGlossary => ["Standard", "Title"],
        Section::AbbreviationGlossary => ["Abbreviation", "Meaning"],
        Section::MainTable => ["", ""],
    }
}

/// Consumed vertical units on the current page.
#[derive(Clone, Debug)]
pub struct PageBudget {
    used: f32,
    max: f32,
    sentinel: f32,
    chapter_pending: bool,
}

impl PageBudget {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            used: 0.0,
            max: config.max_lines_per_page,
            sentinel: config.chapter_break_sentinel,
            chapter_pending: false,
        }
    }

    pub fn used(&self) -> f32 {
        self.used
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fits(&self, estimate: f32) -> bool {
        self.used + estimate <= self.max
    }

    pub fn consume(&mut self, estimate: f32) {
        self.used += estimate;
    }

    /// A break was emitted: usage restarts at the page's fixed overhead.
    pub fn start_page(&mut self, overhead: f32) {
        self.used = overhead;
        self.chapter_pending = false;
    }

    /// Park usage at the reserved sentinel so the next check opens a chapter.
    pub fn force_chapter_break(&mut self) {
        self.used = self.sentinel;
        self.chapter_pending = true;
    }

    pub fn chapter_break_pending(&self) -> bool {
        self.chapter_pending
    }
}

/// Group main-table rows into maximal runs of equal (lower, upper) pairs.
/// `first_index` is the stream index of `rows[0]`.
pub fn group_bands(rows: &[Row], first_index: usize) -> Vec<FrequencyBand<'_>> {
    let mut bands = Vec::new();
    let mut start = 0usize;
    for i in 1..=rows.len() {
        let boundary = i == rows.len()
            || rows[i].lower.trim() != rows[start].lower.trim()
            || rows[i].upper.trim() != rows[start].upper.trim();
        if boundary && i > start {
            bands.push(FrequencyBand {
                lower: rows[start].lower.trim(),
                upper: rows[start].upper.trim(),
                first_row: first_index + start,
                rows: &rows[start..i],
            });
            start = i;
        }
    }
    bands
}

/// Height contribution of one main-table row beyond its own line: the
/// longest of the deliverable/standard lists and the notes length.
pub fn row_comma_weight(row: &Row, config: &LayoutConfig) -> f32 {
    let standards = row.standards.matches(',').count();
    let deliverables = row.deliverables.matches(',').count();
    let notes = row.notes.trim().chars().count() / config.notes_chars_per_line;
    standards.max(deliverables).max(notes) as f32
}

/// `max(service_height, comma_weighted_height + row_count) + band_overhead`.
pub fn band_estimate(rows: &[Row], service_lines: usize, config: &LayoutConfig) -> f32 {
    let service_height = config.service_line_factor * service_lines as f32;
    let comma_weighted: f32 = rows.iter().map(|r| row_comma_weight(r, config)).sum();
    service_height.max(comma_weighted + rows.len() as f32) + config.band_overhead
}

/// One line plus `len / chars_per_line` plus explicit breaks.
pub fn glossary_row_estimate(text: &str, config: &LayoutConfig) -> f32 {
    let text = text.trim();
    let wrapped = text.chars().count() / config.glossary_chars_per_line;
    let breaks = text.matches('\n').count();
    (1 + wrapped + breaks) as f32
}

fn header_block(columns: &[&str], section: Section, usage: f32) -> TableBlock {
    TableBlock {
        kind: TableKind::ColumnHeader,
        section,
        rows: vec![TableRow {
            cells: columns.iter().map(|c| WrappedText::plain(c)).collect(),
            anchor: None,
        }],
        span_columns: 0,
        estimated_height: 0.0,
        page_usage_before: usage,
    }
}

struct OpenGlossary {
    section: Section,
    title: String,
    columns: [&'static str; 2],
    block: Option<TableBlock>,
}

/// Decides page breaks and assembles the instruction stream.
///
/// Blocks are placed decide-then-emit: the caller hands over a fully wrapped
/// block with its estimate, and the break (if any) is emitted before it.
pub struct Paginator<'c> {
    config: &'c LayoutConfig,
    budget: PageBudget,
    instructions: Vec<Instruction>,
    blocks_on_page: usize,
    glossary: Option<OpenGlossary>,
}

impl<'c> Paginator<'c> {
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self {
            config,
            budget: PageBudget::new(config),
            instructions: Vec::new(),
            blocks_on_page: 0,
            glossary: None,
        }
    }

    pub fn budget(&self) -> &PageBudget {
        &self.budget
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    fn chapter(&mut self, section: Section, title: &str) {
        if !self.instructions.is_empty() {
            self.instructions.push(Instruction::AddPageBreak);
        }
        self.instructions.push(Instruction::AddBookmark(Bookmark {
            title: title.to_string(),
            slug: section.slug().to_string(),
            level: 0,
        }));
        self.instructions.push(Instruction::AddHeading(Heading {
            text: title.to_string(),
            slug: section.slug().to_string(),
            level: 0,
        }));
        self.budget.start_page(self.config.chapter_overhead);
        self.blocks_on_page = 0;
    }

    fn continuation_break(&mut self, columns: &[&str], section: Section) {
        self.instructions.push(Instruction::AddPageBreak);
        self.budget.start_page(self.config.header_overhead);
        self.blocks_on_page = 0;
        self.instructions
            .push(Instruction::AddTableBlock(header_block(columns, section, self.budget.used())));
    }

    /// Open the main table chapter with its column header.
    pub fn open_main_table(&mut self, title: &str) {
        self.finish_glossary();
        self.chapter(Section::MainTable, title);
        let usage = self.budget.used();
        self.instructions.push(Instruction::AddTableBlock(header_block(
            &MAIN_COLUMNS,
            Section::MainTable,
            usage,
        )));
    }

    /// Place one band's block, breaking first when it does not fit the page.
    pub fn place_band(&mut self, band: &FrequencyBand<'_>, rows: Vec<TableRow>, estimate: f32) {
        if rows.is_empty() {
            return;
        }
        if self.blocks_on_page > 0 && !self.budget.fits(estimate) {
            log::debug!(
                "BAND {} break: used={:.1} est={:.1} max={:.1}",
                band.title(),
                self.budget.used(),
                estimate,
                self.budget.max()
            );
            self.continuation_break(&MAIN_COLUMNS, Section::MainTable);
        }
        if !self.budget.fits(estimate) {
            // First block on its page: nothing above it to break away from.
            log::warn!(
                "BAND {} overflows its page (est={:.1} used={:.1} max={:.1}); placed as is",
                band.title(),
                estimate,
                self.budget.used(),
                self.budget.max()
            );
        }
        log::debug!(
            "BAND {} rows={} est={:.1} used={:.1}",
            band.title(),
            rows.len(),
            estimate,
            self.budget.used()
        );

        let slug = band.slug();
        self.instructions.push(Instruction::AddBookmark(Bookmark {
            title: band.title(),
            slug: slug.clone(),
            level: 1,
        }));
        self.instructions.push(Instruction::AddHeading(Heading {
            text: band.title(),
            slug,
            level: 1,
        }));
        self.instructions.push(Instruction::AddTableBlock(TableBlock {
            kind: TableKind::Band,
            section: Section::MainTable,
            rows,
            span_columns: 2,
            estimated_height: estimate,
            page_usage_before: self.budget.used(),
        }));
        self.budget.consume(estimate);
        self.blocks_on_page += 1;
    }

    /// Start a glossary section. Nothing is emitted until its first row: the
    /// budget is parked at the chapter sentinel instead.
    pub fn begin_glossary(&mut self, section: Section, title: &str) {
        self.finish_glossary();
        self.budget.force_chapter_break();
        self.glossary = Some(OpenGlossary {
            section,
            title: title.to_string(),
            columns: glossary_columns(section),
            block: None,
        });
    }

    /// Append one glossary row, flushing the current block on a break.
    pub fn push_glossary_row(&mut self, row: TableRow, estimate: f32) {
        let Some((section, title, columns)) = self
            .glossary
            .as_ref()
            .map(|g| (g.section, g.title.clone(), g.columns))
        else {
            log::warn!("Glossary row outside a glossary section dropped");
            return;
        };

        if self.budget.chapter_break_pending() {
            self.flush_glossary_block();
            log::debug!("{section}: opening chapter {title:?}");
            self.chapter(section, &title);
            let usage = self.budget.used();
            self.instructions
                .push(Instruction::AddTableBlock(header_block(&columns, section, usage)));
        } else if !self.budget.fits(estimate) && self.page_has_rows() {
            self.flush_glossary_block();
            self.continuation_break(&columns, section);
        }

        let usage = self.budget.used();
        if let Some(open) = self.glossary.as_mut() {
            let block = open.block.get_or_insert_with(|| TableBlock {
                kind: TableKind::Glossary,
                section,
                rows: Vec::new(),
                span_columns: 0,
                estimated_height: 0.0,
                page_usage_before: usage,
            });
            block.rows.push(row);
            block.estimated_height += estimate;
        }
        self.budget.consume(estimate);
    }

    fn page_has_rows(&self) -> bool {
        self.blocks_on_page > 0
            || self
                .glossary
                .as_ref()
                .and_then(|g| g.block.as_ref())
                .is_some_and(|b| !b.rows.is_empty())
    }

    fn flush_glossary_block(&mut self) {
        if let Some(block) = self.glossary.as_mut().and_then(|g| g.block.take())
            && !block.rows.is_empty()
        {
            self.instructions.push(Instruction::AddTableBlock(block));
            self.blocks_on_page += 1;
        }
    }

    fn finish_glossary(&mut self) {
        self.flush_glossary_block();
        self.glossary = None;
    }

    pub fn finish(mut self) -> Vec<Instruction> {
        self.finish_glossary();
        self.instructions
    }
}
