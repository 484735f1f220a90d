//! motionlog CLI - Command-line interface for motion-log
//!
//! Commands:
//! - replay: Feed scripted session events into a log and print it (batch mode)
//! - stream: Classify accelerometer samples from stdin as one live session
//! - manual: Validate a manual entry and print its record
//! - classify: Show the live and session tiers for a net motion value
//! - validate: Validate session event input
//! - doctor: Diagnose environment and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use chrono::Utc;
use motion_log::schema::{SessionEventAdapter, SCHEMA_VERSION};
use motion_log::sensor::{NoSensor, ReplaySensor, SensorService};
use motion_log::{
    classify_instant, classify_session, InstantReading, MotionLogError, MotionLogProcessor,
    Sample, SensorSession, SessionRecord, MOTION_LOG_VERSION, PRODUCER_NAME,
};

/// motionlog - Activity session log with accelerometer intensity classification
#[derive(Parser)]
#[command(name = "motionlog")]
#[command(version = MOTION_LOG_VERSION)]
#[command(about = "Log activity sessions and classify accelerometer intensity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay session events into a fresh log (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Classify samples from stdin as one live session (streaming mode)
    Stream {
        /// Session length in milliseconds; defaults to wall-clock time until EOF
        #[arg(long)]
        elapsed_ms: Option<i64>,

        /// Only print the final record, not one reading per sample
        #[arg(long)]
        quiet: bool,

        /// Behave like a device without an accelerometer
        #[arg(long)]
        no_sensor: bool,

        /// Flush output after each reading
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate a manual entry and print its record
    Manual {
        /// Activity name
        #[arg(long)]
        name: String,

        /// Duration in minutes (free text)
        #[arg(long)]
        duration: String,
    },

    /// Show live and session tiers for a net motion value
    Classify {
        /// Net motion value (m/s², gravity already removed)
        #[arg(long, allow_hyphen_values = true)]
        value: f64,
    },

    /// Validate session event input
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose environment and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable rows
    Table,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MotionLogCliError> {
    match cli.command {
        Commands::Replay {
            input,
            input_format,
            output_format,
        } => cmd_replay(&input, input_format, output_format),

        Commands::Stream {
            elapsed_ms,
            quiet,
            no_sensor,
            flush,
        } => cmd_stream(elapsed_ms, quiet, no_sensor, flush),

        Commands::Manual { name, duration } => cmd_manual(&name, &duration),

        Commands::Classify { value } => cmd_classify(value),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_replay(
    input: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), MotionLogCliError> {
    let input_data = read_input(input)?;

    let events = match input_format {
        InputFormat::Ndjson => SessionEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => SessionEventAdapter::parse_array(&input_data)?,
    };

    if events.is_empty() {
        return Err(MotionLogCliError::NoEvents);
    }

    let mut processor = MotionLogProcessor::new();
    processor.process_events(&events)?;

    let records: Vec<&SessionRecord> = processor.log().all().collect();
    print!("{}", format_output(&records, &output_format)?);

    Ok(())
}

/// One stdin line: either `{"x":..,"y":..,"z":..}` or `[x, y, z]`
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SampleLine {
    Object(Sample),
    Array([f64; 3]),
}

impl From<SampleLine> for Sample {
    fn from(line: SampleLine) -> Self {
        match line {
            SampleLine::Object(sample) => sample,
            SampleLine::Array(v) => Sample::from(v),
        }
    }
}

fn cmd_stream(
    elapsed_ms: Option<i64>,
    quiet: bool,
    no_sensor: bool,
    flush: bool,
) -> Result<(), MotionLogCliError> {
    let mut replay = ReplaySensor::new();
    let mut absent = NoSensor;
    let sensor: &mut dyn SensorService = if no_sensor { &mut absent } else { &mut replay };

    let mut session = SensorSession::new();
    let sampling = session.resume(sensor);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (line_num, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let sample: Sample = serde_json::from_str::<SampleLine>(trimmed)
            .map_err(|e| {
                MotionLogCliError::ParseError(format!("Failed to parse sample on line {}: {}", line_num + 1, e))
            })?
            .into();

        if !sampling {
            continue;
        }

        replay.queue(sample);
        replay.deliver_next();

        if !quiet {
            if let Some(reading) = session.last_reading() {
                writeln!(stdout, "{}", serde_json::to_string(&ReadingLine::from(reading))?)?;
                if flush {
                    stdout.flush()?;
                }
            }
        }
    }

    let sensor: &mut dyn SensorService = if no_sensor { &mut absent } else { &mut replay };
    let record = match elapsed_ms {
        Some(ms) => session.finish_with_elapsed(sensor, ms, Utc::now()),
        None => session.finish_at(sensor, Utc::now()),
    };

    writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
    stdout.flush()?;

    Ok(())
}

fn cmd_manual(name: &str, duration: &str) -> Result<(), MotionLogCliError> {
    let mut processor = MotionLogProcessor::new();
    let record = processor.add_manual(name, duration)?;
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

fn cmd_classify(value: f64) -> Result<(), MotionLogCliError> {
    let reading = classify_instant(value);
    let report = ClassifyReport {
        value,
        instant: ReadingLine::from(reading),
        session: classify_session(value).label().to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), MotionLogCliError> {
    let input_data = read_input(input)?;

    let events = match input_format {
        InputFormat::Ndjson => SessionEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => SessionEventAdapter::parse_array(&input_data)?,
    };

    let results = SessionEventAdapter::validate_events(&events);

    let report = ValidationReport {
        total_events: events.len(),
        valid_events: events.len() - results.len(),
        invalid_events: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                event_id: r.event_id.clone(),
                error: r.result.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Event {} (index {}): {}",
                    err.event_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(MotionLogCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_doctor(json: bool) -> Result<(), MotionLogCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("motion-log version {}", MOTION_LOG_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    checks.push(DoctorCheck {
        name: "log_filter".to_string(),
        status: CheckStatus::Ok,
        message: match std::env::var("RUST_LOG") {
            Ok(filter) => format!("RUST_LOG={}", filter),
            Err(_) => "RUST_LOG unset, logging warnings only".to_string(),
        },
    });

    // Streaming mode needs samples piped in
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Warning,
            message: "stdin is a TTY (type samples by hand or pipe them for 'stream')".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MOTION_LOG_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("motionlog Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, MotionLogCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn format_output(records: &[&SessionRecord], format: &OutputFormat) -> Result<String, MotionLogCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Table => {
            let mut out = String::new();
            for record in records {
                out.push_str(&format!(
                    "{}  {:<6}  {:>10}  {}\n",
                    record.formatted_date(),
                    record.activity_type.as_str(),
                    record.duration,
                    record.name
                ));
            }
            Ok(out)
        }
    }
}

// Error types

#[derive(Debug)]
enum MotionLogCliError {
    Io(io::Error),
    Compute(MotionLogError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    ParseError(String),
}

impl From<io::Error> for MotionLogCliError {
    fn from(e: io::Error) -> Self {
        MotionLogCliError::Io(e)
    }
}

impl From<MotionLogError> for MotionLogCliError {
    fn from(e: MotionLogError) -> Self {
        MotionLogCliError::Compute(e)
    }
}

impl From<serde_json::Error> for MotionLogCliError {
    fn from(e: serde_json::Error) -> Self {
        MotionLogCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MotionLogCliError> for CliError {
    fn from(e: MotionLogCliError) -> Self {
        match e {
            MotionLogCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MotionLogCliError::Compute(MotionLogError::BlankField(field)) => CliError {
                code: "BLANK_FIELD".to_string(),
                message: format!("Please fill in the {} field", field),
                hint: Some("Both name and duration are required".to_string()),
            },
            MotionLogCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches {} schema", SCHEMA_VERSION)),
            },
            MotionLogCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MotionLogCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            MotionLogCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            MotionLogCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Samples are {\"x\",\"y\",\"z\"} objects or [x, y, z] arrays".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ReadingLine {
    value: f64,
    tier: motion_log::IntensityTier,
    label: &'static str,
}

impl From<InstantReading> for ReadingLine {
    fn from(reading: InstantReading) -> Self {
        ReadingLine {
            value: reading.value,
            tier: reading.tier,
            label: reading.label(),
        }
    }
}

#[derive(serde::Serialize)]
struct ClassifyReport {
    value: f64,
    instant: ReadingLine,
    session: String,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    event_id: Option<String>,
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
enum CheckStatus {
    Ok,
    Warning,
}
