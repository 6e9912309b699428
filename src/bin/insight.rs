//! Insight CLI - Command-line interface for Wellness Insight
//!
//! Commands:
//! - report: Analyze user snapshots into wellness reports
//! - aggregate: Bucket one metric into a daily chart series
//! - validate: Check samples for non-finite or out-of-range values
//! - score: Score a PHQ-9 / GAD-7 style questionnaire
//! - doctor: Diagnose configuration and environment

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use wellness_insight::config::{parse_utc_offset, EngineConfig};
use wellness_insight::input::{parse_ndjson, parse_one_or_many};
use wellness_insight::pipeline::{InsightProcessor, MetricSeries, UserSnapshot, WellnessReport};
use wellness_insight::screener::{responses_in_order, score_responses, screener_risk_level};
use wellness_insight::validation::validate_samples;
use wellness_insight::{
    summary, BehavioralSample, ComputeError, Metric, RiskLevel, ScreenerKind,
    TimeSeriesAggregator, ENGINE_VERSION, PRODUCER_NAME,
};

/// Insight - Behavioral analytics and recommendation engine
#[derive(Parser)]
#[command(name = "insight")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Turn wellness samples into risk, advice, trends and charts", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze user snapshots into wellness reports
    Report {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured UTC offset (e.g. "+05:30")
        #[arg(long)]
        utc_offset: Option<String>,
    },

    /// Bucket one metric into a daily chart series
    Aggregate {
        /// Samples file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Metric to aggregate
        #[arg(long, value_parser = parse_metric)]
        metric: Metric,

        /// Window length in days
        #[arg(long, default_value = "30")]
        days: u32,

        /// End of the window (RFC 3339); defaults to now
        #[arg(long)]
        reference_time: Option<String>,

        /// Offset used for local calendar days
        #[arg(long, default_value = "UTC")]
        utc_offset: String,
    },

    /// Check samples for non-finite or out-of-range values
    Validate {
        /// Samples file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a questionnaire
    Score {
        /// Instrument (phq9, gad7, stress_scale, wellness_check)
        #[arg(long, value_parser = parse_kind)]
        kind: ScreenerKind,

        /// Answers in question order, comma separated (e.g. 0,1,2,3)
        #[arg(long, value_delimiter = ',')]
        responses: Vec<u8>,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records (or a single object)
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn parse_metric(raw: &str) -> Result<Metric, String> {
    raw.parse()
}

fn parse_kind(raw: &str) -> Result<ScreenerKind, String> {
    raw.parse()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), InsightCliError> {
    match cli.command {
        Commands::Report {
            input,
            output,
            input_format,
            output_format,
            config,
            utc_offset,
        } => cmd_report(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            utc_offset.as_deref(),
        ),

        Commands::Aggregate {
            input,
            input_format,
            metric,
            days,
            reference_time,
            utc_offset,
        } => cmd_aggregate(
            &input,
            input_format,
            metric,
            days,
            reference_time.as_deref(),
            &utc_offset,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Score { kind, responses } => cmd_score(kind, &responses),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_report(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    utc_offset: Option<&str>,
) -> Result<(), InsightCliError> {
    let mut engine_config = match config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if let Some(offset) = utc_offset {
        engine_config.utc_offset = offset.to_string();
    }
    let processor = InsightProcessor::with_config(engine_config)?;

    let input_data = read_input(input)?;
    let snapshots: Vec<UserSnapshot> = match input_format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => parse_one_or_many(&input_data)?,
    };

    if snapshots.is_empty() {
        return Err(InsightCliError::NoSnapshots);
    }

    let reports: Vec<WellnessReport> = snapshots.iter().map(|s| processor.analyze(s)).collect();
    let output_data = format_output(&reports, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_aggregate(
    input: &Path,
    input_format: InputFormat,
    metric: Metric,
    days: u32,
    reference_time: Option<&str>,
    utc_offset: &str,
) -> Result<(), InsightCliError> {
    let aggregator = TimeSeriesAggregator::new(parse_utc_offset(utc_offset)?);
    let reference_time = match reference_time {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| ComputeError::DateParseError(format!("{raw}: {e}")))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let samples = read_samples(input, input_format)?;
    let points = aggregator.aggregate(&samples, metric, days, reference_time);
    let series = MetricSeries {
        metric,
        unit: metric.default_unit().to_string(),
        summary: summary(&points),
        points,
    };

    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), InsightCliError> {
    let samples = read_samples(input, input_format)?;
    let results = validate_samples(&samples);

    let report = ValidationReport {
        total_samples: samples.len(),
        valid_samples: samples.len() - results.len(),
        invalid_samples: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                sample_id: r.sample_id.clone(),
                error: r.issue.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total samples:   {}", report.total_samples);
        println!("Valid samples:   {}", report.valid_samples);
        println!("Invalid samples: {}", report.invalid_samples);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Sample {} (index {}): {}", err.sample_id, err.index, err.error);
            }
        }
    }

    if report.invalid_samples > 0 {
        Err(InsightCliError::ValidationFailed(report.invalid_samples))
    } else {
        Ok(())
    }
}

fn cmd_score(kind: ScreenerKind, answers: &[u8]) -> Result<(), InsightCliError> {
    let responses = responses_in_order(answers);
    let score = score_responses(kind, &responses)?;

    let result = ScoreReport {
        kind,
        score,
        risk_level: screener_risk_level(score),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), InsightCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Insight version {}", ENGINE_VERSION),
    });

    if let Some(config_path) = config {
        let check = if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (offset {}, risk window {} days, screener window {} days)",
                            config.utc_offset, config.risk_window_days, config.screener_window_days
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        } else {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, defaults will be used".to_string(),
            }
        };
        checks.push(check);
    }

    let log_filter = std::env::var("RUST_LOG").ok();
    checks.push(DoctorCheck {
        name: "logging".to_string(),
        status: CheckStatus::Ok,
        message: match log_filter {
            Some(filter) => format!("RUST_LOG={}", filter),
            None => "RUST_LOG unset (warn, use -v for more)".to_string(),
        },
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass -i <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (-i - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Insight Doctor Report");
        println!("=====================");
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
        Err(InsightCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, InsightCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_samples(input: &Path, format: InputFormat) -> Result<Vec<BehavioralSample>, InsightCliError> {
    let input_data = read_input(input)?;
    let samples = match format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => parse_one_or_many(&input_data)?,
    };
    log::debug!("read {} samples", samples.len());
    Ok(samples)
}

fn format_output(reports: &[WellnessReport], format: &OutputFormat) -> Result<String, InsightCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)?),
    }
}

// Error handling

#[derive(Debug)]
enum InsightCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoSnapshots,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for InsightCliError {
    fn from(e: io::Error) -> Self {
        InsightCliError::Io(e)
    }
}

impl From<ComputeError> for InsightCliError {
    fn from(e: ComputeError) -> Self {
        InsightCliError::Compute(e)
    }
}

impl From<serde_json::Error> for InsightCliError {
    fn from(e: serde_json::Error) -> Self {
        InsightCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<InsightCliError> for CliError {
    fn from(e: InsightCliError) -> Self {
        match e {
            InsightCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            InsightCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::InvalidTimezone(_) => {
                        ("INVALID_TIMEZONE", "Use UTC or an offset like +05:30")
                    }
                    ComputeError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Run 'insight doctor --config <file>' for details")
                    }
                    ComputeError::InvalidScreenerResponse(_) => {
                        ("INVALID_RESPONSES", "Answer every question with 0-3")
                    }
                    ComputeError::DateParseError(_) => {
                        ("DATE_ERROR", "Use RFC 3339 timestamps, e.g. 2024-01-15T12:00:00Z")
                    }
                    _ => ("PARSE_ERROR", "Ensure input matches the snapshot or sample format"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            InsightCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            InsightCliError::NoSnapshots => CliError {
                code: "NO_SNAPSHOTS".to_string(),
                message: "No snapshots found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            InsightCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} samples failed validation", count),
                hint: Some("Invalid samples are skipped during analysis".to_string()),
            },
            InsightCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_samples: usize,
    valid_samples: usize,
    invalid_samples: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    sample_id: String,
    error: String,
}

#[derive(Serialize)]
struct ScoreReport {
    kind: ScreenerKind,
    score: u32,
    risk_level: RiskLevel,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
