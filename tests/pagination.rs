mod common;

use common::{band_row, glossary_row, sentinel};
use ecatable_pdf::layout::paginate::{
    Paginator, band_estimate, glossary_row_estimate, group_bands, row_comma_weight,
};
use ecatable_pdf::model::{Instruction, Row, Section, TableKind, TableRow, WrappedText};
use ecatable_pdf::{LayoutConfig, Lookups, plan_document};
use proptest::prelude::*;

fn cell_row(text: &str) -> TableRow {
    TableRow {
        cells: vec![WrappedText::plain(text)],
        anchor: None,
    }
}

fn band_blocks(instructions: &[Instruction]) -> Vec<(usize, f32, f32)> {
    instructions
        .iter()
        .enumerate()
        .filter_map(|(i, ins)| match ins {
            Instruction::AddTableBlock(b) if b.kind == TableKind::Band => {
                Some((i, b.page_usage_before, b.estimated_height))
            }
            _ => None,
        })
        .collect()
}

#[test]
fn overflowing_band_breaks_and_resets_usage() {
    common::init_logging();
    let config = LayoutConfig {
        max_lines_per_page: 44.0,
        ..LayoutConfig::default()
    };
    let rows = vec![
        band_row("1 MHz", "2 MHz", "FIXED", "FIXED"),
        band_row("2 MHz", "3 MHz", "MOBILE", "MOBILE"),
    ];
    let bands = group_bands(&rows, 0);
    let mut paginator = Paginator::new(&config);
    paginator.open_main_table("Table");

    // Chapter overhead 4 + 36 brings the page to 40.
    paginator.place_band(&bands[0], vec![cell_row("a")], 36.0);
    assert_eq!(paginator.budget().used(), 40.0);
    paginator.place_band(&bands[1], vec![cell_row("b")], 10.0);

    let instructions = paginator.finish();
    let placed = band_blocks(&instructions);
    assert_eq!(placed.len(), 2);
    let (first, _, _) = placed[0];
    let (second, usage, _) = placed[1];
    assert_eq!(usage, config.header_overhead);
    let breaks: Vec<usize> = (first..second)
        .filter(|&i| matches!(instructions[i], Instruction::AddPageBreak))
        .collect();
    assert_eq!(breaks.len(), 1);
    // The continuation page repeats the column header.
    assert!(matches!(
        &instructions[breaks[0] + 1],
        Instruction::AddTableBlock(b) if b.kind == TableKind::ColumnHeader
    ));
}

#[test]
fn main_table_opens_without_a_page_break() {
    let config = LayoutConfig::default();
    let rows = vec![band_row("1 MHz", "2 MHz", "FIXED", "FIXED")];
    let plan = plan_document(&rows, &Lookups::default(), &config).unwrap();
    assert!(matches!(plan.instructions[0], Instruction::AddBookmark(ref b) if b.level == 0));
    assert!(!plan.instructions.iter().any(|i| matches!(i, Instruction::AddPageBreak)));
    assert_eq!(plan.estimated_pages(), 1);
}

#[test]
fn band_heading_and_bookmark_share_a_slug() {
    let rows = vec![band_row("8.3 kHz", "9 kHz", "FIXED", "FIXED")];
    let plan = plan_document(&rows, &Lookups::default(), &LayoutConfig::default()).unwrap();
    let level_one: Vec<(&str, &str)> = plan
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::AddBookmark(b) if b.level == 1 => Some(("bookmark", b.slug.as_str())),
            Instruction::AddHeading(h) if h.level == 1 => Some(("heading", h.slug.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        level_one,
        vec![("bookmark", "band_8_3_kHz_9_kHz"), ("heading", "band_8_3_kHz_9_kHz")]
    );
}

#[test]
fn empty_band_is_a_no_op() {
    let config = LayoutConfig::default();
    let rows = vec![band_row("1 MHz", "2 MHz", "FIXED", "FIXED")];
    let bands = group_bands(&rows, 0);
    let mut paginator = Paginator::new(&config);
    paginator.open_main_table("Table");
    let before = paginator.instructions().len();
    let used = paginator.budget().used();

    paginator.place_band(&bands[0], Vec::new(), 12.0);

    assert_eq!(paginator.instructions().len(), before);
    assert_eq!(paginator.budget().used(), used);
}

#[test]
fn only_the_first_band_row_carries_the_allocation_columns() {
    let rows = common::sample_rows();
    let plan = plan_document(&rows, &Lookups::default(), &LayoutConfig::default()).unwrap();
    let first = plan
        .table_blocks()
        .find(|b| b.kind == TableKind::Band)
        .unwrap();
    assert_eq!(first.span_columns, 2);
    assert_eq!(first.rows.len(), 2);
    assert!(!first.rows[0].cells[0].is_empty());
    assert!(first.rows[1].cells[0].is_empty());
    assert!(first.rows[1].cells[1].is_empty());
    assert_eq!(first.rows[1].cells[2].text(), "Active medical implants");
    // One identifier per line; all but the last keep their comma.
    assert_eq!(first.rows[0].cells[3].text(), "ERC/REC 70-03,\nECC/DEC/(05)01");
}

#[test]
fn oversized_opening_band_is_placed_without_a_break() {
    common::init_logging();
    let config = LayoutConfig::default();
    let mut rows: Vec<Row> = (0..40).map(|_| band_row("1 MHz", "2 MHz", "FIXED", "FIXED")).collect();
    rows.push(band_row("2 MHz", "3 MHz", "MOBILE", "MOBILE"));
    let plan = plan_document(&rows, &Lookups::default(), &config).unwrap();

    let placed = band_blocks(&plan.instructions);
    assert_eq!(placed.len(), 2);
    let (first, usage, estimate) = placed[0];
    assert_eq!(usage, config.chapter_overhead);
    assert!(usage + estimate > config.max_lines_per_page);
    assert!(!after_break(&plan.instructions, first));
    assert!(!plan.instructions[..first].iter().any(|i| matches!(i, Instruction::AddPageBreak)));

    // The next band cannot share the overflowing page.
    let (second, usage, _) = placed[1];
    assert!(after_break(&plan.instructions, second));
    assert_eq!(usage, config.header_overhead);
}

#[test]
fn estimators_follow_their_formulas() {
    let config = LayoutConfig::default();
    let mut row = Row {
        standards: "EN 1, EN 2, EN 3".into(),
        deliverables: "A, B".into(),
        ..Row::default()
    };
    assert_eq!(row_comma_weight(&row, &config), 2.0);
    row.notes = "x".repeat(130);
    assert_eq!(row_comma_weight(&row, &config), 3.0);

    // max(0.85 * 4, 3 + 1) + 3.7
    let estimate = band_estimate(&[row], 4, &config);
    assert!((estimate - 7.7).abs() < 1e-4);
    // Allocation lines dominate: max(0.85 * 10, 0 + 1) + 3.7
    let estimate = band_estimate(&[Row::default()], 10, &config);
    assert!((estimate - 12.2).abs() < 1e-4);

    assert_eq!(glossary_row_estimate("short", &config), 1.0);
    assert_eq!(glossary_row_estimate(&"y".repeat(230), &config), 3.0);
    assert_eq!(glossary_row_estimate("a\nb\nc", &config), 3.0);
}

#[test]
fn each_glossary_section_opens_a_new_chapter() {
    let plan = plan_document(&common::sample_rows(), &Lookups::default(), &LayoutConfig::default())
        .unwrap();
    let chapters = common::heading_texts(&plan, 0);
    assert_eq!(
        chapters,
        vec![
            "European Common Allocation Table",
            "ECA Footnotes",
            "RR Footnotes",
            "CEPT Deliverables",
            "ETSI Harmonised Standards",
            "Abbreviations",
        ]
    );
    // One break per chapter after the first.
    assert_eq!(plan.estimated_pages(), 6);
    for section in [Section::EcaFootnoteText, Section::AbbreviationGlossary] {
        let headers = common::blocks_of(&plan, section, TableKind::ColumnHeader);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].page_usage_before, LayoutConfig::default().chapter_overhead);
    }
}

#[test]
fn long_glossary_continues_on_a_new_page_with_its_header() {
    let config = LayoutConfig {
        max_lines_per_page: 10.0,
        ..LayoutConfig::default()
    };
    let mut rows = vec![sentinel("", "description")];
    for i in 0..20 {
        rows.push(glossary_row(&format!("ABBR{i}"), "meaning"));
    }
    let plan = plan_document(&rows, &Lookups::default(), &config).unwrap();

    let glossary = common::blocks_of(&plan, Section::AbbreviationGlossary, TableKind::Glossary);
    let headers = common::blocks_of(&plan, Section::AbbreviationGlossary, TableKind::ColumnHeader);
    assert!(glossary.len() > 1);
    assert_eq!(headers.len(), glossary.len());
    let total: usize = glossary.iter().map(|b| b.rows.len()).sum();
    assert_eq!(total, 20);
    for block in &glossary {
        assert!(block.page_usage_before + block.estimated_height <= config.max_lines_per_page);
    }
}

// Bands of eight or more rows are taller than a default page.
fn band_layout() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..10, 1..30)
}

/// The block at `i` sits right under a continuation page's column header.
fn after_break(instructions: &[Instruction], i: usize) -> bool {
    i >= 4
        && matches!(instructions[i - 4], Instruction::AddPageBreak)
        && matches!(&instructions[i - 3], Instruction::AddTableBlock(b) if b.kind == TableKind::ColumnHeader)
        && matches!(instructions[i - 2], Instruction::AddBookmark(_))
        && matches!(instructions[i - 1], Instruction::AddHeading(_))
}

fn rows_for(layout: &[usize]) -> Vec<Row> {
    let mut rows = Vec::new();
    for (b, &n) in layout.iter().enumerate() {
        for r in 0..n {
            let mut row = band_row(&format!("{b} MHz"), &format!("{b}.5 MHz"), "FIXED", "MOBILE");
            row.standards = ", ".repeat(r);
            rows.push(row);
        }
    }
    rows
}

proptest! {
    #[test]
    fn bands_partition_rows_in_order(layout in band_layout()) {
        let rows = rows_for(&layout);
        let bands = group_bands(&rows, 0);

        prop_assert_eq!(bands.len(), layout.len());
        let mut next = 0usize;
        for (band, &n) in bands.iter().zip(&layout) {
            prop_assert_eq!(band.first_row, next);
            prop_assert_eq!(band.rows.len(), n);
            prop_assert!(band.rows.iter().all(|r| r.lower == band.lower && r.upper == band.upper));
            next += n;
        }
        prop_assert_eq!(next, rows.len());
    }

    #[test]
    fn every_band_fits_or_directly_follows_a_break(layout in band_layout()) {
        let config = LayoutConfig::default();
        let rows = rows_for(&layout);
        let plan = plan_document(&rows, &Lookups::default(), &config).unwrap();

        for (i, usage, estimate) in band_blocks(&plan.instructions) {
            let fits = usage + estimate <= config.max_lines_per_page;
            // Only a band that opens the chapter page may overflow in place:
            // there is nothing above it that a break could push away.
            let opens_chapter = usage == config.chapter_overhead && !after_break(&plan.instructions, i);
            prop_assert!(
                fits || after_break(&plan.instructions, i) || opens_chapter,
                "band at {} overflows: used={} est={}", i, usage, estimate
            );
        }
        prop_assert_eq!(band_blocks(&plan.instructions).len(), layout.len());
    }
}
