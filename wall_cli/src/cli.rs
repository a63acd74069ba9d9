use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "terrace",
    version,
    about = "Terrace - segmental retaining wall analysis with geogrid reinforcement",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a wall design and write the requested reports.
    Analyze(AnalyzeArgs),
    /// Validate a design file without running the failure mode checks.
    Check(CheckArgs),
    /// Print the equations reference (EQUATIONS.md) to stdout.
    Equations,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Design file (.json or .toml)
    #[arg(value_name = "DESIGN")]
    pub design: PathBuf,

    /// Write the report as Typst markup
    #[arg(long, value_name = "PATH")]
    pub typst: Option<PathBuf>,

    /// Compile the report to PDF
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Dump the full report as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Evaluate the failure modes in parallel
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Design file (.json or .toml)
    #[arg(value_name = "DESIGN")]
    pub design: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::try_parse_from([
            "terrace", "-vv", "analyze", "wall.toml", "--pdf", "wall.pdf", "--parallel",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.design, PathBuf::from("wall.toml"));
                assert_eq!(args.pdf, Some(PathBuf::from("wall.pdf")));
                assert!(args.typst.is_none());
                assert!(args.parallel);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["terrace", "-q", "-v", "equations"]).is_err());
        assert!(Cli::try_parse_from(["terrace", "check"]).is_err());
    }
}
