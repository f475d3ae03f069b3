pub mod footnotes;
pub mod links;
pub mod paginate;
pub mod sections;
pub mod widths;
pub mod wrap;

use std::collections::HashSet;

use crate::config::LayoutConfig;
use crate::error::Error;
use crate::model::{FrequencyBand, Plan, Row, Section, Span, TableRow, WrappedText};

use footnotes::{FootnoteGlossary, FootnoteTracker, footnote_anchor};
use links::{Lookups, link_identifier, link_list};
use paginate::{Paginator, band_estimate, glossary_row_estimate, group_bands};
use sections::demultiplex;
use widths::WidthModel;
use wrap::Wrapper;

/// Plan a document with the built-in Helvetica width model.
pub fn plan_document(rows: &[Row], lookups: &Lookups, config: &LayoutConfig) -> Result<Plan, Error> {
    plan_document_with(rows, lookups, config, &WidthModel::helvetica())
}

/// Turn the row stream into an ordered instruction stream.
///
/// The main table is laid out first so the set of referenced footnotes is
/// complete before the footnote appendices are pruned against it. Either the
/// whole plan is returned or the first fatal error; nothing partial.
pub fn plan_document_with(
    rows: &[Row],
    lookups: &Lookups,
    config: &LayoutConfig,
    widths: &WidthModel,
) -> Result<Plan, Error> {
    config.validate()?;
    let demuxed = demultiplex(rows)?;

    let glossary = FootnoteGlossary::from_rows(
        demuxed
            .parts
            .iter()
            .filter(|p| p.section.is_footnote_text())
            .flat_map(|p| p.rows.iter()),
    );
    let mut tracker = FootnoteTracker::new();
    let wrapper = Wrapper::new(widths, config);
    let mut paginator = Paginator::new(config);

    let bands = group_bands(demuxed.main, 0);
    if !bands.is_empty() {
        paginator.open_main_table(Section::MainTable.default_title());
    }
    for band in &bands {
        let (rows, service_lines) = band_rows(band, &wrapper, &glossary, &mut tracker, lookups)?;
        let estimate = band_estimate(band.rows, service_lines, config);
        paginator.place_band(band, rows, estimate);
    }
    log::debug!(
        "main table: {} bands, {} distinct footnotes referenced",
        bands.len(),
        tracker.len()
    );

    for &section in &Section::ORDER[1..] {
        let Some(part) = demuxed.part(section) else {
            continue;
        };
        paginator.begin_glossary(section, part.title());
        let mut emitted: HashSet<&str> = HashSet::new();
        for row in part.rows {
            let key = row.glossary_key();
            if key.is_empty() {
                continue;
            }
            if section.is_footnote_text() && !tracker.contains(key) {
                continue;
            }
            if !emitted.insert(key) {
                log::warn!("{section}: duplicate entry {key:?} skipped");
                continue;
            }
            let text = row.glossary_text();
            let estimate = glossary_row_estimate(&text, config);
            paginator.push_glossary_row(glossary_row(section, key, &text, lookups), estimate);
        }
    }

    Ok(Plan {
        instructions: paginator.finish(),
        footnotes: tracker.into_references(),
    })
}

/// Wrap every row of a band. The allocation columns span the whole band, so
/// they are shown on the first row only; a later row whose allocation text
/// differs is appended below it. Every row is still wrapped so its footnotes
/// get recorded and its errors carry its own row index. Returns the rows and
/// the allocation line count used for the height estimate.
fn band_rows(
    band: &FrequencyBand<'_>,
    wrapper: &Wrapper<'_>,
    glossary: &FootnoteGlossary,
    tracker: &mut FootnoteTracker,
    lookups: &Lookups,
) -> Result<(Vec<TableRow>, usize), Error> {
    let mut out = Vec::with_capacity(band.rows.len());
    let mut rr_span = WrappedText::default();
    let mut eca_span = WrappedText::default();

    for (i, row) in band.rows.iter().enumerate() {
        let index = band.first_row + i;
        let rr = wrap_service_cell(
            wrapper,
            (row.rr_allocation.as_str(), row.rr_footnotes.as_str()),
            ("rr_allocation", "rr_footnotes"),
            index,
            glossary,
            tracker,
        )?;
        let eca = wrap_service_cell(
            wrapper,
            (row.eca_allocation.as_str(), row.eca_footnotes.as_str()),
            ("eca_allocation", "eca_footnotes"),
            index,
            glossary,
            tracker,
        )?;
        rr_span = merge_spanned(rr_span, rr);
        eca_span = merge_spanned(eca_span, eca);

        out.push(TableRow {
            cells: vec![
                WrappedText::default(),
                WrappedText::default(),
                WrappedText::plain(&row.applications),
                link_list(&row.deliverables, &lookups.documents, "deliverable"),
                link_list(&row.standards, &lookups.standards, "standard"),
                WrappedText::plain(&row.notes),
            ],
            anchor: None,
        });
    }

    let service_lines = rr_span.line_count().max(eca_span.line_count());
    if let Some(first) = out.first_mut() {
        first.cells[0] = rr_span;
        first.cells[1] = eca_span;
    }
    Ok((out, service_lines))
}

/// Allocation text followed by its footnote list, with failures pinned to
/// the cell they came from.
fn wrap_service_cell(
    wrapper: &Wrapper<'_>,
    (allocation, footnotes): (&str, &str),
    (allocation_field, footnotes_field): (&'static str, &'static str),
    index: usize,
    glossary: &FootnoteGlossary,
    tracker: &mut FootnoteTracker,
) -> Result<WrappedText, Error> {
    let text = wrapper
        .wrap_allocation(allocation, glossary, tracker)
        .map_err(|e| e.at_cell(index, allocation_field))?;
    let list = wrapper
        .wrap_footnote_list(footnotes, glossary, tracker)
        .map_err(|e| e.at_cell(index, footnotes_field))?;
    Ok(text.then(list))
}

fn merge_spanned(shown: WrappedText, next: WrappedText) -> WrappedText {
    if next.is_empty() || next.text() == shown.text() {
        shown
    } else {
        shown.then(next)
    }
}

fn glossary_row(section: Section, key: &str, text: &str, lookups: &Lookups) -> TableRow {
    let key_span = match section {
        Section::CeptDeliverableGlossary => link_identifier(key, &lookups.documents, "deliverable"),
        Section::EtsiStandardGlossary => link_identifier(key, &lookups.standards, "standard"),
        Section::EtsiReceiveOnlyGlossary => {
            link_identifier(key, &lookups.receive_only_standards, "standard")
        }
        _ => Span::plain(key),
    };
    TableRow {
        cells: vec![WrappedText::single(key_span), WrappedText::plain(text)],
        anchor: section
            .is_footnote_text()
            .then(|| footnote_anchor(key)),
    }
}
