//! CLI command definitions for stockgrade.
//!
//! The binary grades the bundled reference inventory, optionally against the
//! source text of a learner submission, and appends the verdicts to a report.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use crate::anti_hardcoding::{scan_suites, RedFlagScanner, SubmissionSource};
use crate::inventory::{InventoryModel, REFERENCE_SOURCE};
use crate::runner::{Harness, HarnessConfig};
use crate::test_framework::TestSuite;

/// Grading harness for inventory exercises.
#[derive(Parser)]
#[command(name = "stockgrade")]
#[command(about = "Grade inventory submissions with behavioural cases and anti-hardcoding heuristics")]
#[command(version)]
#[command(
    long_about = "stockgrade runs visible and hidden cases against an inventory implementation, \
scans the submission source for stubs, hardcoded returns and missing logic, and appends \
one verdict line per case to a text report.\n\nExample usage:\n  stockgrade grade --source submission.rs --report ./student_workspace/report.txt"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Grade the reference inventory and append the verdicts to the report.
    Grade(GradeArgs),

    /// Report red flags in a submission's source without running anything.
    Scan(ScanArgs),

    /// Print the built-in suites as YAML.
    Suite(SuiteArgs),
}

/// Output format for `grade`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Verdict lines and a summary.
    #[default]
    Text,
    /// The full suite report as JSON.
    Json,
}

/// Arguments for `stockgrade grade`.
#[derive(Parser, Debug)]
pub struct GradeArgs {
    /// Submission source scanned for red flags only; the cases always run on the
    /// bundled reference inventory (defaults to the bundled reference source).
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Report file to append to (overrides the config file).
    #[arg(short, long, env = "STOCKGRADE_REPORT")]
    pub report: Option<PathBuf>,

    /// YAML harness configuration.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// YAML file with the suites to run (defaults to the built-in visible and hidden suites).
    #[arg(long)]
    pub suite: Option<PathBuf>,

    /// Seed for the randomized probe.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for `stockgrade scan`.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Submission source to scan.
    #[arg(short, long)]
    pub source: PathBuf,

    /// YAML harness configuration (only the heuristics section is used).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// YAML file with the suites whose expectations are checked.
    #[arg(long)]
    pub suite: Option<PathBuf>,
}

/// Arguments for `stockgrade suite`.
#[derive(Parser, Debug)]
pub struct SuiteArgs {
    /// Print only the hidden suite.
    #[arg(long, conflicts_with = "visible")]
    pub hidden: bool,

    /// Print only the visible suite.
    #[arg(long)]
    pub visible: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parse arguments and run.
pub fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli())
}

/// Run an already-parsed command line.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Grade(args) => run_grade(args),
        Commands::Scan(args) => run_scan(args),
        Commands::Suite(args) => run_suite(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<HarnessConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading harness config");
            Ok(HarnessConfig::from_yaml_file(path)?)
        }
        None => Ok(HarnessConfig::default()),
    }
}

fn load_suites(path: Option<&PathBuf>) -> anyhow::Result<Vec<TestSuite>> {
    match path {
        Some(path) => Ok(TestSuite::load_yaml(path)?),
        None => Ok(TestSuite::defaults()),
    }
}

fn load_source(path: Option<&PathBuf>) -> anyhow::Result<SubmissionSource> {
    match path {
        Some(path) => Ok(SubmissionSource::from_path(path)?),
        None => Ok(SubmissionSource::new(REFERENCE_SOURCE)),
    }
}

fn run_grade(args: GradeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(report) = args.report {
        config = config.with_report_path(report);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config = config.with_echo(args.format == OutputFormat::Text);

    let suites = load_suites(args.suite.as_ref())?;
    let source = load_source(args.source.as_ref())?;

    info!(
        suites = suites.len(),
        report = %config.report_path.display(),
        "Starting grading run"
    );

    let harness = Harness::new(config)?;
    let report = harness.run_and_record(&suites, InventoryModel::new, &source)?;

    match args.format {
        OutputFormat::Text => println!("{}", report.summary()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn run_scan(args: ScanArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let suites = load_suites(args.suite.as_ref())?;
    let source = SubmissionSource::from_path(&args.source)?;

    let findings = scan_suites(&RedFlagScanner::new(config.heuristics), &source, &suites);
    for finding in &findings {
        let verdict = match (&finding.flag, &finding.error) {
            (_, Some(error)) => format!("error: {}", error),
            (Some(flag), None) => flag.to_string(),
            (None, None) => "clean".to_string(),
        };
        println!(
            "{} Test Case {} [{}]: {} | {}",
            finding.section, finding.number, finding.operation, finding.description, verdict
        );
    }

    let flagged = findings.iter().filter(|f| !f.is_clean()).count();
    println!("{} of {} cases flagged", flagged, findings.len());
    Ok(())
}

fn run_suite(args: SuiteArgs) -> anyhow::Result<()> {
    let suites = if args.hidden {
        vec![TestSuite::hidden()]
    } else if args.visible {
        vec![TestSuite::visible()]
    } else {
        TestSuite::defaults()
    };
    print!("{}", serde_yaml::to_string(&suites)?);
    Ok(())
}
