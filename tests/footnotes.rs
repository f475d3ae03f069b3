mod common;

use common::{band_row, glossary_keys, glossary_row, heading_texts, sample_rows, sentinel};
use ecatable_pdf::layout::footnotes::{FootnoteGlossary, FootnoteTracker, footnote_anchor, is_footnote_id};
use ecatable_pdf::model::{Section, TableKind};
use ecatable_pdf::{LayoutConfig, Lookups, plan_document};

#[test]
fn recording_twice_is_the_same_as_recording_once() {
    let glossary = FootnoteGlossary::from_rows(&[glossary_row("5.149", "text")]);
    let mut once = FootnoteTracker::new();
    let mut twice = FootnoteTracker::new();

    assert!(once.record("5.149", &glossary));
    assert!(twice.record("5.149", &glossary));
    assert!(!twice.record("5.149", &glossary));

    for id in ["5.149", "5.150"] {
        assert_eq!(once.contains(id), twice.contains(id));
    }
    assert_eq!(once.references(), twice.references());
    assert_eq!(twice.references()[0].text.as_deref(), Some("text"));
}

#[test]
fn footnote_id_syntax() {
    assert!(is_footnote_id("5.149"));
    assert!(is_footnote_id("ECA12"));
    assert!(!is_footnote_id("5."));
    assert!(!is_footnote_id("MOBILE"));
    assert_eq!(footnote_anchor("5.54A"), "fn_5_54A");
}

#[test]
fn glossary_keeps_the_first_text_of_a_duplicate() {
    let glossary = FootnoteGlossary::from_rows(&[
        glossary_row("ECA1", "first"),
        glossary_row("ECA1", "second"),
        glossary_row("", "no key"),
    ]);
    assert_eq!(glossary.len(), 1);
    assert_eq!(glossary.get("ECA1"), Some("first"));
}

#[test]
fn unreferenced_footnote_is_absent_from_the_appendix() {
    let plan = plan_document(&sample_rows(), &Lookups::default(), &LayoutConfig::default()).unwrap();

    let rr = glossary_keys(&plan, Section::RrFootnoteText);
    assert!(!rr.iter().any(|k| k == "5.340"));
    assert_eq!(rr, vec!["5.54A", "5.149"]);

    let eca = glossary_keys(&plan, Section::EcaFootnoteText);
    assert_eq!(eca, vec!["ECA12"]);
}

#[test]
fn referenced_footnotes_appear_exactly_once() {
    // 5.54A is referenced by two bands.
    let plan = plan_document(&sample_rows(), &Lookups::default(), &LayoutConfig::default()).unwrap();
    let referenced: Vec<&str> = plan.footnotes.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(referenced, vec!["5.54A", "ECA12", "5.149"]);

    let mut appendix = glossary_keys(&plan, Section::EcaFootnoteText);
    appendix.extend(glossary_keys(&plan, Section::RrFootnoteText));
    for id in &referenced {
        assert_eq!(appendix.iter().filter(|k| k == id).count(), 1, "{id}");
    }
}

#[test]
fn appendix_rows_carry_the_anchor_main_table_links_point_at() {
    let plan = plan_document(&sample_rows(), &Lookups::default(), &LayoutConfig::default()).unwrap();
    let anchors: Vec<String> = common::blocks_of(&plan, Section::RrFootnoteText, TableKind::Glossary)
        .into_iter()
        .flat_map(|b| b.rows.iter())
        .filter_map(|r| r.anchor.clone())
        .collect();
    assert_eq!(anchors, vec!["fn_5_54A", "fn_5_149"]);
}

#[test]
fn footnote_section_without_referenced_rows_opens_no_chapter() {
    let rows = vec![
        band_row("1 MHz", "2 MHz", "FIXED", "FIXED (ECA1)"),
        sentinel("", "footnotetext"),
        glossary_row("ECA1", "text"),
        sentinel("", "footnotetext"),
        glossary_row("5.340", "never referenced"),
    ];
    let plan = plan_document(&rows, &Lookups::default(), &LayoutConfig::default()).unwrap();
    let chapters = heading_texts(&plan, 0);
    assert_eq!(chapters, vec!["European Common Allocation Table", "ECA Footnotes"]);
}

#[test]
fn duplicate_appendix_rows_render_once() {
    let rows = vec![
        band_row("1 MHz", "2 MHz", "FIXED", "FIXED (ECA1)"),
        sentinel("", "footnotetext"),
        glossary_row("ECA1", "first"),
        glossary_row("ECA1", "second"),
    ];
    let plan = plan_document(&rows, &Lookups::default(), &LayoutConfig::default()).unwrap();
    assert_eq!(glossary_keys(&plan, Section::EcaFootnoteText), vec!["ECA1"]);
    let blocks = common::blocks_of(&plan, Section::EcaFootnoteText, TableKind::Glossary);
    assert_eq!(blocks[0].rows[0].cells[1].text(), "first");
}

#[test]
fn footnote_cited_only_by_a_later_band_row_is_kept() {
    let mut first = band_row("5 MHz", "6 MHz", "FIXED", "FIXED");
    first.rr_footnotes = "5.149".into();
    let mut second = band_row("5 MHz", "6 MHz", "", "");
    second.rr_footnotes = "5.340".into();
    let rows = vec![
        first,
        second,
        sentinel("", "footnotetext"),
        sentinel("", "footnotetext"),
        glossary_row("5.149", "radio astronomy"),
        glossary_row("5.340", "all emissions are prohibited"),
    ];
    let plan = plan_document(&rows, &Lookups::default(), &LayoutConfig::default()).unwrap();

    assert_eq!(glossary_keys(&plan, Section::RrFootnoteText), vec!["5.149", "5.340"]);
    let referenced: Vec<&str> = plan.footnotes.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(referenced, vec!["5.149", "5.340"]);

    // The spanned cell on the first row shows both rows' lists.
    let bands = common::blocks_of(&plan, Section::MainTable, TableKind::Band);
    assert_eq!(bands[0].rows[0].cells[0].text(), "FIXED\n5.149\n5.340");
    assert!(bands[0].rows[1].cells[0].is_empty());
}
