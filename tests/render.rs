mod common;

use ecatable_pdf::layout::links::Lookup;
use ecatable_pdf::model::Plan;
use ecatable_pdf::{Error, LayoutConfig, Lookups, convert_csv_to_pdf, plan_document, plan_to_json, read_lookups, render_plan};

fn sample_lookups() -> Lookups {
    Lookups::new(
        Lookup::from_pairs([("ERC/REC 70-03", "https://docdb.cept.org/70-03.pdf")]),
        Lookup::from_pairs([("EN 300 220", "https://www.etsi.org/en300220")]),
    )
}

#[test]
fn plan_renders_to_a_pdf() {
    common::init_logging();
    let plan = plan_document(&common::sample_rows(), &sample_lookups(), &LayoutConfig::default()).unwrap();
    let bytes = render_plan(&plan).unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Outlines"));
    assert!(text.contains("/URI"));
    assert!(text.contains("/GoTo"));
    assert!(text.contains("/Helvetica-Bold"));
}

#[test]
fn empty_plan_is_rejected() {
    assert!(matches!(render_plan(&Plan::default()), Err(Error::Pdf(_))));
}

#[test]
fn many_bands_spill_over_several_pages() {
    let rows: Vec<_> = (0..120)
        .map(|i| common::band_row(&format!("{i} MHz"), &format!("{} MHz", i + 1), "FIXED, MOBILE", "MOBILE"))
        .collect();
    let plan = plan_document(&rows, &Lookups::default(), &LayoutConfig::default()).unwrap();
    assert!(plan.estimated_pages() > 1);

    let bytes = render_plan(&plan).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn csv_converts_end_to_end() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_file(dir.path(), "table.csv", &common::to_csv(&common::sample_rows()));
    let docs = common::write_file(
        dir.path(),
        "docs.csv",
        "Title;pdf\nERC/REC 70-03;https://docdb.cept.org/70-03.pdf\n",
    );
    let output = dir.path().join("out.pdf");

    let lookups = read_lookups(Some(docs.as_path()), None, None).unwrap();
    assert_eq!(lookups.documents.len(), 1);
    assert!(lookups.receive_only_standards.is_empty());

    let plan = convert_csv_to_pdf(&input, &lookups, &output, &LayoutConfig::default()).unwrap();
    assert_eq!(plan.footnotes.len(), 3);
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn plan_serializes_to_json() {
    let plan = plan_document(&common::sample_rows(), &Lookups::default(), &LayoutConfig::default()).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert!(json["instructions"].as_array().is_some_and(|a| !a.is_empty()));
    assert_eq!(json["footnotes"][0]["id"], "5.54A");

    let text = plan_to_json(&plan).unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), json);
}

#[test]
fn plan_export_errors_are_not_reported_as_config_or_io() {
    let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = Error::PlanExport(cause);
    assert!(err.to_string().starts_with("could not serialize layout plan"));
    assert!(std::error::Error::source(&err).is_some());
}
