use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use ecatable_pdf::{Error, LayoutConfig, Plan};

#[derive(Parser)]
#[command(
    name = "ecatable-pdf",
    version,
    about = "Turn the ECA frequency allocation table export into a paginated PDF"
)]
struct Cli {
    /// Semicolon-separated export of the allocation table
    input: PathBuf,

    /// Output PDF path
    #[arg(short, long, default_value = "output.pdf")]
    output: PathBuf,

    /// CEPT deliverables lookup (Title;...;pdf)
    #[arg(long)]
    deliverables: Option<PathBuf>,

    /// ETSI harmonised standards lookup
    #[arg(long)]
    standards: Option<PathBuf>,

    /// ETSI receive-only standards lookup (default: the standards lookup)
    #[arg(long)]
    receive_only_standards: Option<PathBuf>,

    /// Layout constants as JSON; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the page budget in line units
    #[arg(long)]
    max_lines_per_page: Option<f32>,

    /// Override the allocation wrap width
    #[arg(long)]
    max_line_width: Option<f32>,

    /// Also write the layout plan as JSON
    #[arg(long)]
    emit_plan: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG still wins)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let mut config = match &cli.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(n) = cli.max_lines_per_page {
        config.max_lines_per_page = n;
    }
    if let Some(w) = cli.max_line_width {
        config.max_line_width = w;
    }
    config.validate()?;

    let lookups = ecatable_pdf::read_lookups(
        cli.deliverables.as_deref(),
        cli.standards.as_deref(),
        cli.receive_only_standards.as_deref(),
    )?;

    let plan = ecatable_pdf::convert_csv_to_pdf(&cli.input, &lookups, &cli.output, &config)?;
    if let Some(path) = &cli.emit_plan {
        write_plan(&plan, path)?;
    }
    println!(
        "{} -> {} (~{} pages, {} footnotes referenced)",
        cli.input.display(),
        cli.output.display(),
        plan.estimated_pages(),
        plan.footnotes.len()
    );
    Ok(())
}

fn write_plan(plan: &Plan, path: &Path) -> Result<(), Error> {
    let json = ecatable_pdf::plan_to_json(plan)?;
    std::fs::write(path, json)?;
    log::info!("wrote layout plan to {}", path.display());
    Ok(())
}
