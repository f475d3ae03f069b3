pub mod config;
mod error;
mod fonts;
pub mod layout;
pub mod model;
mod pdf;
pub mod source;

pub use config::LayoutConfig;
pub use error::{CellLocation, Error};
pub use layout::links::{Lookup, Lookups};
pub use layout::{plan_document, plan_document_with};
pub use model::{Instruction, Plan, Row};

use std::path::Path;
use std::time::Instant;

/// Render a plan with the built-in reference renderer.
pub fn render_plan(plan: &Plan) -> Result<Vec<u8>, Error> {
    pdf::render(plan)
}

/// The plan as pretty-printed JSON, for inspecting layout decisions.
pub fn plan_to_json(plan: &Plan) -> Result<String, Error> {
    serde_json::to_string_pretty(plan).map_err(Error::PlanExport)
}

/// Read the optional lookup tables. A missing receive-only table falls back
/// to the standards table.
pub fn read_lookups(
    deliverables: Option<&Path>,
    standards: Option<&Path>,
    receive_only: Option<&Path>,
) -> Result<Lookups, Error> {
    let read = |path: Option<&Path>| match path {
        Some(p) => source::lookup::read_lookup(p),
        None => Ok(Lookup::new()),
    };
    let lookups = Lookups::new(read(deliverables)?, read(standards)?);
    Ok(match receive_only {
        Some(p) => lookups.with_receive_only(source::lookup::read_lookup(p)?),
        None => lookups,
    })
}

/// Read the table export, plan it and write the PDF. The plan is returned so
/// callers can inspect or serialize it.
pub fn convert_csv_to_pdf(
    input: &Path,
    lookups: &Lookups,
    output: &Path,
    config: &LayoutConfig,
) -> Result<Plan, Error> {
    let t0 = Instant::now();

    let rows = source::read_rows(input)?;
    let t_read = t0.elapsed();

    let plan = plan_document(&rows, lookups, config)?;
    let t_plan = t0.elapsed();

    let bytes = pdf::render(&plan)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: read={:.1}ms, plan={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms ({} rows, {} instructions, ~{} pages, output {} bytes)",
        t_read.as_secs_f64() * 1000.0,
        (t_plan - t_read).as_secs_f64() * 1000.0,
        (t_render - t_plan).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        rows.len(),
        plan.instructions.len(),
        plan.estimated_pages(),
        bytes.len(),
    );

    Ok(plan)
}
