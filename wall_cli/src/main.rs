//! # Terrace CLI
//!
//! `terrace analyze <design>` runs the wall analysis, prints one line per
//! failure mode and writes the requested Typst, PDF and JSON outputs.
//!
//! Exit codes: 0 when the design is acceptable, 1 on any error, 2 when the
//! analysis ran but the design is not acceptable.

mod cli;
mod error;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use wall_core::analysis::PreparedWall;
use wall_core::equations::generate_equations_markdown;
use wall_core::pdf::render_report_pdf;
use wall_core::render::render_report_typst;
use wall_core::{analyze, load_design, save_report_json, write_atomic};

use crate::cli::{AnalyzeArgs, CheckArgs, Cli, Commands};
use crate::error::Result;

/// How a successful run ended
enum Outcome {
    Acceptable,
    NotAcceptable,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::from(1);
    }
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let result = match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Check(args) => run_check(args),
        Commands::Equations => {
            print!("{}", generate_equations_markdown());
            Ok(Outcome::Acceptable)
        }
    };

    match result {
        Ok(Outcome::Acceptable) => ExitCode::SUCCESS,
        Ok(Outcome::NotAcceptable) => ExitCode::from(2),
        Err(e) => {
            error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<Outcome> {
    let design = load_design(&args.design)?;
    let mut input = design.analysis_input()?;
    if args.parallel {
        input.options.parallel = true;
    }

    let report = analyze(&input)?;
    for line in report.summary_lines() {
        println!("{line}");
    }

    if let Some(path) = &args.json {
        save_report_json(&report, path)?;
        announce("JSON report", path);
    }
    if let Some(path) = &args.typst {
        let source = render_report_typst(&report, &design.project);
        write_atomic(path, source.as_bytes())?;
        announce("Typst report", path);
    }
    if let Some(path) = &args.pdf {
        let pdf = render_report_pdf(&report, &design.project)?;
        write_atomic(path, &pdf)?;
        announce("PDF report", path);
    }

    Ok(if report.acceptable {
        Outcome::Acceptable
    } else {
        Outcome::NotAcceptable
    })
}

fn run_check(args: CheckArgs) -> Result<Outcome> {
    let design = load_design(&args.design)?;
    let input = design.analysis_input()?;
    let wall = PreparedWall::prepare(&input)?;
    println!(
        "{}: OK ({} courses, {:.3} m high, {} geogrid layers)",
        args.design.display(),
        wall.geometry.courses.len(),
        wall.geometry.height_m,
        wall.layers.len()
    );
    Ok(Outcome::Acceptable)
}

fn announce(what: &str, path: &Path) {
    info!(path = %path.display(), "wrote {what}");
    println!("Wrote {what} to {}", path.display());
}
