#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::fs;

use ecatable_pdf::model::{Instruction, Row, Section, TableBlock, TableKind};
use ecatable_pdf::Plan;

/// Route library logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A main-table row with allocations only.
pub fn band_row(lower: &str, upper: &str, rr: &str, eca: &str) -> Row {
    Row {
        lower: lower.into(),
        upper: upper.into(),
        rr_allocation: rr.into(),
        eca_allocation: eca.into(),
        ..Row::default()
    }
}

/// A sentinel row; `title` lands in the first column.
pub fn sentinel(title: &str, value: &str) -> Row {
    Row {
        lower: title.into(),
        upper: value.into(),
        ..Row::default()
    }
}

/// A glossary row: identifier in column 1, description in column 3.
pub fn glossary_row(key: &str, text: &str) -> Row {
    Row {
        lower: key.into(),
        rr_allocation: text.into(),
        ..Row::default()
    }
}

/// A small document touching every section.
pub fn sample_rows() -> Vec<Row> {
    let mut first = band_row("8.3 kHz", "9 kHz", "METEOROLOGICAL AIDS (5.54A)", "METEOROLOGICAL AIDS (ECA12)");
    first.deliverables = "ERC/REC 70-03, ECC/DEC/(05)01".into();
    first.standards = "EN 300 220".into();
    first.applications = "Meteorology".into();
    let mut second = band_row("8.3 kHz", "9 kHz", "", "");
    second.applications = "Active medical implants".into();
    vec![
        first,
        second,
        band_row("9 kHz", "11.3 kHz", "METEOROLOGICAL AIDS, RADIONAVIGATION (5.54A, 5.149)", "RADIONAVIGATION"),
        sentinel("", "footnotetext"),
        glossary_row("ECA12", "Used for lightning detection"),
        glossary_row("ECA99", "Never referenced"),
        sentinel("", "footnotetext"),
        glossary_row("5.54A", "Use of the band by the meteorological aids service"),
        glossary_row("5.149", "Administrations are urged to protect radio astronomy"),
        glossary_row("5.340", "All emissions are prohibited"),
        sentinel("", "title"),
        glossary_row("ERC/REC 70-03", "Short Range Devices"),
        sentinel("", "title"),
        glossary_row("EN 300 220", "Short Range Devices operating in 25 MHz to 1000 MHz"),
        sentinel("", "description"),
        glossary_row("SRD", "Short Range Device"),
    ]
}

/// Semicolon CSV text of `rows` with a header line.
pub fn to_csv(rows: &[Row]) -> String {
    let mut out = String::from("Lower;Upper;RR;RR footnotes;ECA;ECA footnotes;Deliverables;Applications;Standards;Notes\n");
    for row in rows {
        let fields: Vec<String> = row
            .fields()
            .iter()
            .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
            .collect();
        out.push_str(&fields.join(";"));
        out.push('\n');
    }
    out
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn blocks_of(plan: &Plan, section: Section, kind: TableKind) -> Vec<&TableBlock> {
    plan.table_blocks()
        .filter(|b| b.section == section && b.kind == kind)
        .collect()
}

/// First-column texts of every glossary row of `section`.
pub fn glossary_keys(plan: &Plan, section: Section) -> Vec<String> {
    blocks_of(plan, section, TableKind::Glossary)
        .into_iter()
        .flat_map(|b| b.rows.iter())
        .map(|r| r.cells[0].text())
        .collect()
}

pub fn heading_texts(plan: &Plan, level: u8) -> Vec<String> {
    plan.instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::AddHeading(h) if h.level == level => Some(h.text.clone()),
            _ => None,
        })
        .collect()
}
