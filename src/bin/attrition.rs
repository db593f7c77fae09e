//! Attrition CLI - Command-line interface for Attrition Insight
//!
//! Commands:
//! - report: Compute the full dashboard report for a filter state
//! - kpis: Print the headline KPI block
//! - validate: Check the input file and list dropped rows
//! - export: Write flat section tables as CSV files
//! - options: Print filter dropdown values
//! - doctor: Diagnose input and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use attrition_insight::encoder::{export_sections_csv, ReportEncoder};
use attrition_insight::filter::FilterSelection;
use attrition_insight::pipeline::{AttritionAggregator, Dataset};
use attrition_insight::schema::REQUIRED_COLUMNS;
use attrition_insight::{AggregatorConfig, AttritionError, LoaderOptions, CRATE_VERSION, PRODUCER_NAME};

/// Attrition - dashboard aggregates for HR attrition data
#[derive(Parser)]
#[command(name = "attrition")]
#[command(author = "Synheart AI Inc")]
#[command(version = CRATE_VERSION)]
#[command(about = "Compute HR attrition dashboard aggregates", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Aggregation config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Employee CSV/TSV file
    #[arg(short, long, default_value = "united.csv")]
    input: PathBuf,

    /// Field delimiter (defaults to tab for .tsv, comma otherwise)
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(clap::Args, Clone)]
struct FilterArgs {
    /// Department filter
    #[arg(long, default_value = "All")]
    department: String,

    /// Overtime filter (All, Yes, No)
    #[arg(long, default_value = "All")]
    overtime: String,

    /// Job level filter
    #[arg(long, default_value = "All")]
    job_level: String,

    /// Tenure bucket filter (e.g. "0–2 years")
    #[arg(long, default_value = "All")]
    tenure: String,

    /// Override the minimum distance/role cell size
    #[arg(long)]
    min_group_size: Option<usize>,

    /// Override the distance bucket width
    #[arg(long)]
    bucket_width: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full dashboard report
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format (defaults to pretty JSON on a terminal)
        #[arg(long)]
        output_format: Option<OutputFormat>,
    },

    /// Print the headline KPIs
    Kpis {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the input file and list dropped rows
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write flat section tables as CSV files
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,
    },

    /// Print filter dropdown values
    Options {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Diagnose input and configuration
    Doctor {
        /// Input file to check
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing subscriber on stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), AttritionCliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Report {
            input,
            filter,
            output,
            output_format,
        } => cmd_report(&input, &filter, load_config(config_path)?, &output, output_format),

        Commands::Kpis { input, json } => cmd_kpis(&input, load_config(config_path)?, json),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Export {
            input,
            filter,
            out_dir,
        } => cmd_export(&input, &filter, load_config(config_path)?, &out_dir),

        Commands::Options { input } => cmd_options(&input),

        // doctor reads the config itself so a bad file shows up as a failed check
        Commands::Doctor { input, json } => cmd_doctor(input.as_deref(), config_path, json),
    }
}

fn cmd_report(
    input: &InputArgs,
    filter: &FilterArgs,
    config: AggregatorConfig,
    output: &Path,
    output_format: Option<OutputFormat>,
) -> Result<(), AttritionCliError> {
    let dashboard_filter = selection(filter).parse()?;
    let aggregator = aggregator(config, filter)?;
    let dataset = load_dataset(input)?;

    let encoder = ReportEncoder::new();
    let report = encoder.encode(&dataset, &aggregator, &dashboard_filter);

    let pretty = match output_format {
        Some(OutputFormat::Json) => false,
        Some(OutputFormat::JsonPretty) => true,
        None => is_stdout(output) && atty::is(atty::Stream::Stdout),
    };
    let json = encoder.to_json(&report, pretty)?;

    if is_stdout(output) {
        println!("{}", json);
    } else {
        fs::write(output, json)?;
    }

    Ok(())
}

fn cmd_kpis(input: &InputArgs, config: AggregatorConfig, json: bool) -> Result<(), AttritionCliError> {
    let aggregator = AttritionAggregator::with_config(config)?;
    let dataset = load_dataset(input)?;
    let kpis = aggregator.kpis(dataset.employees());

    if json {
        println!("{}", serde_json::to_string_pretty(&kpis)?);
    } else {
        println!("Attrition KPIs");
        println!("==============");
        println!("Overall attrition rate: {:.1}%", kpis.overall_attrition_rate);
        println!("Entry-level attrition:  {:.1}%", kpis.entry_level_attrition_rate);
        println!("Early tenure attrition: {:.1}%", kpis.early_tenure_attrition_rate);
        match &kpis.highest_risk_role {
            Some(role) => println!("Highest risk role:      {} ({:.1}%)", role.job_role, role.left_rate),
            None => println!("Highest risk role:      N/A (0.0%)"),
        }
    }

    Ok(())
}

fn cmd_validate(input: &InputArgs, json: bool) -> Result<(), AttritionCliError> {
    let dataset = load_dataset(input)?;

    let report = ValidationReport {
        source: dataset.source().to_string(),
        total_rows: dataset.rows_read(),
        valid_rows: dataset.employees().len(),
        dropped_rows: dataset.dropped().len(),
        errors: dataset
            .dropped()
            .iter()
            .map(|d| ValidationErrorDetail {
                row: d.row,
                employee_id: d.employee_id.clone(),
                error: d.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Source:       {}", report.source);
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Dropped rows: {}", report.dropped_rows);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Employee {} (row {}): {}",
                    err.employee_id.as_deref().unwrap_or("unknown"),
                    err.row,
                    err.error
                );
            }
        }
    }

    if report.dropped_rows > 0 {
        Err(AttritionCliError::ValidationFailed(report.dropped_rows))
    } else {
        Ok(())
    }
}

fn cmd_export(
    input: &InputArgs,
    filter: &FilterArgs,
    config: AggregatorConfig,
    out_dir: &Path,
) -> Result<(), AttritionCliError> {
    let dashboard_filter = selection(filter).parse()?;
    let aggregator = aggregator(config, filter)?;
    let dataset = load_dataset(input)?;

    let sections = aggregator.sections(&dataset, &dashboard_filter);
    let written = export_sections_csv(&sections, out_dir)?;

    for path in written {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_options(input: &InputArgs) -> Result<(), AttritionCliError> {
    let dataset = load_dataset(input)?;
    println!("{}", serde_json::to_string_pretty(&dataset.filter_options())?);
    Ok(())
}

fn cmd_doctor(input: Option<&Path>, config: Option<&Path>, json: bool) -> Result<(), AttritionCliError> {
    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CRATE_VERSION.to_string(),
        checks: doctor_checks(input, config),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Attrition Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(AttritionCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Run every doctor check; never fails, problems become `Error` checks
fn doctor_checks(input: Option<&Path>, config: Option<&Path>) -> Vec<DoctorCheck> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, CRATE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "required_columns".to_string(),
        status: CheckStatus::Ok,
        message: REQUIRED_COLUMNS.join(", "),
    });

    if let Some(config_path) = config {
        let check = match fs::read_to_string(config_path) {
            Ok(content) => match AggregatorConfig::from_json(&content) {
                Ok(cfg) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (bucket width {}, min group size {})",
                        cfg.distance_bucket_width, cfg.min_group_size
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            },
        };
        checks.push(check);
    }

    if let Some(input_path) = input {
        let check = if !input_path.exists() {
            DoctorCheck {
                name: "input".to_string(),
                status: CheckStatus::Error,
                message: format!("{} does not exist", input_path.display()),
            }
        } else {
            match Dataset::load(input_path) {
                Ok(dataset) if dataset.dropped().is_empty() => DoctorCheck {
                    name: "input".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} rows loaded", dataset.employees().len()),
                },
                Ok(dataset) => DoctorCheck {
                    name: "input".to_string(),
                    status: CheckStatus::Warning,
                    message: format!(
                        "{} rows loaded, {} dropped (run 'attrition validate' for details)",
                        dataset.employees().len(),
                        dataset.dropped().len()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "input".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            }
        };
        checks.push(check);
    }

    checks
}

// Helper functions

fn is_stdout(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn load_config(path: Option<&Path>) -> Result<AggregatorConfig, AttritionCliError> {
    match path {
        Some(p) => Ok(AggregatorConfig::from_json(&fs::read_to_string(p)?)?),
        None => Ok(AggregatorConfig::default()),
    }
}

fn load_dataset(input: &InputArgs) -> Result<Dataset, AttritionCliError> {
    let options = match input.delimiter {
        Some(c) if c.is_ascii() => LoaderOptions { delimiter: c as u8 },
        Some(c) => return Err(AttritionCliError::BadDelimiter(c)),
        None => LoaderOptions::for_path(&input.input),
    };
    let dataset = Dataset::load_with(&input.input, options)?;
    if dataset.is_empty() {
        tracing::warn!(source = %dataset.source(), "no valid employee rows loaded");
    }
    Ok(dataset)
}

fn selection(filter: &FilterArgs) -> FilterSelection {
    FilterSelection {
        department: filter.department.clone(),
        overtime: filter.overtime.clone(),
        job_level: filter.job_level.clone(),
        tenure: filter.tenure.clone(),
    }
}

fn aggregator(mut config: AggregatorConfig, filter: &FilterArgs) -> Result<AttritionAggregator, AttritionCliError> {
    if let Some(size) = filter.min_group_size {
        config.min_group_size = size;
    }
    if let Some(width) = filter.bucket_width {
        config.distance_bucket_width = width;
    }
    Ok(AttritionAggregator::with_config(config)?)
}

// Error types

#[derive(Debug)]
enum AttritionCliError {
    Io(io::Error),
    Compute(AttritionError),
    Json(serde_json::Error),
    BadDelimiter(char),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for AttritionCliError {
    fn from(e: io::Error) -> Self {
        AttritionCliError::Io(e)
    }
}

impl From<AttritionError> for AttritionCliError {
    fn from(e: AttritionError) -> Self {
        AttritionCliError::Compute(e)
    }
}

impl From<serde_json::Error> for AttritionCliError {
    fn from(e: serde_json::Error) -> Self {
        AttritionCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AttritionCliError> for CliError {
    fn from(e: AttritionCliError) -> Self {
        match e {
            AttritionCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            AttritionCliError::Compute(e) => {
                let (code, hint) = match &e {
                    AttritionError::DataLoad(_) | AttritionError::Csv(_) | AttritionError::Io(_) => {
                        ("DATA_LOAD_ERROR", "Check that the input file exists and is well-formed")
                    }
                    AttritionError::MissingColumn(_) => {
                        ("MISSING_COLUMN", "Run 'attrition doctor' to list required columns")
                    }
                    AttritionError::Json(_) => ("JSON_ERROR", "Check JSON syntax"),
                    AttritionError::InvalidFilter { .. } => {
                        ("INVALID_FILTER", "Run 'attrition options' to list valid filter values")
                    }
                    AttritionError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Fix the configuration values and retry")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            AttritionCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            AttritionCliError::BadDelimiter(c) => CliError {
                code: "BAD_DELIMITER".to_string(),
                message: format!("Delimiter must be a single ASCII character, got {:?}", c),
                hint: None,
            },
            AttritionCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix the listed rows or accept that they are dropped".to_string()),
            },
            AttritionCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    source: String,
    total_rows: usize,
    valid_rows: usize,
    dropped_rows: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    row: usize,
    employee_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
