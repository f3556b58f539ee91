//! Lens CLI - Command-line interface for Hinge Lens
//!
//! Commands:
//! - transform: Convert an export into interaction rows
//! - summary: Print headline statistics for an export
//! - flows: Aggregate like → match flows for diagramming
//! - validate: Check every interaction for malformed timestamps
//! - schema: Describe the input and output shapes

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hinge_lens::config::AnalyzerConfig;
use hinge_lens::logging::init_logging;
use hinge_lens::schema::{ExportAdapter, RawInteraction};
use hinge_lens::summary::ExportSummary;
use hinge_lens::table::InteractionTable;
use hinge_lens::transformer::InteractionTransformer;
use hinge_lens::types::COLUMN_NAMES;
use hinge_lens::{ExportProcessor, LENS_VERSION, PRODUCER_NAME};

/// Lens - turn a dating-app export into analysis-ready rows
#[derive(Parser)]
#[command(name = "lens")]
#[command(version = LENS_VERSION)]
#[command(about = "Transform a matches export into interaction rows", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter, overrides the configuration file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an export into one row per interaction
    Transform {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Print headline statistics for an export
    Summary {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate flows between categorical columns
    Flows {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Comma-separated columns, overrides the configuration file
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Minimum pair count, overrides the configuration file
        #[arg(long)]
        threshold: Option<usize>,

        /// Output the flow graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check every interaction for malformed timestamps
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of interactions (the export's matches file)
    Json,
    /// Newline-delimited JSON (one interaction per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one row per line)
    Ndjson,
    /// JSON array of rows
    Json,
    /// Pretty-printed JSON array of rows
    JsonPretty,
    /// JSON object of column name to cells
    Columnar,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (matches export)
    Input,
    /// Output schema (interaction rows)
    Output,
}

fn main() -> ExitCode {
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

fn run(cli: Cli) -> Result<(), LensCliError> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.log_json {
        config.logging.json = true;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Transform {
            input,
            output,
            input_format,
            output_format,
        } => cmd_transform(&input, &output, input_format, output_format),

        Commands::Summary {
            input,
            input_format,
            json,
        } => cmd_summary(config, &input, input_format, json),

        Commands::Flows {
            input,
            input_format,
            columns,
            threshold,
            json,
        } => {
            if let Some(columns) = columns {
                config.flows.columns = columns;
            }
            if let Some(threshold) = threshold {
                config.flows.threshold = threshold;
            }
            cmd_flows(config, &input, input_format, json)
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_transform(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), LensCliError> {
    let interactions = read_interactions(input, &input_format)?;
    let table = InteractionTable::new(InteractionTransformer::transform(&interactions)?);

    let output_data = format_output(&table, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
        tracing::info!(rows = table.len(), path = %output.display(), "wrote interaction rows");
    }

    Ok(())
}

fn cmd_summary(
    config: AnalyzerConfig,
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), LensCliError> {
    let interactions = read_interactions(input, &input_format)?;
    let table = InteractionTable::new(InteractionTransformer::transform(&interactions)?);
    let summary = ExportProcessor::with_config(config).summarize(&table);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn cmd_flows(
    config: AnalyzerConfig,
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), LensCliError> {
    let interactions = read_interactions(input, &input_format)?;
    let table = InteractionTable::new(InteractionTransformer::transform(&interactions)?);
    let graph = ExportProcessor::with_config(config).flows(&table)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        println!("Flows");
        println!("=====");
        for link in &graph.links {
            println!(
                "  {} -> {}: {}",
                graph.display_labels[link.source], graph.display_labels[link.target], link.count
            );
        }
    }

    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat, json: bool) -> Result<(), LensCliError> {
    let interactions = read_interactions(input, &input_format)?;

    let results = ExportAdapter::validate_interactions(&interactions);

    let report = ValidationReport {
        total_interactions: interactions.len(),
        valid_interactions: interactions.len() - results.len(),
        invalid_interactions: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total interactions:   {}", report.total_interactions);
        println!("Valid interactions:   {}", report.valid_interactions);
        println!("Invalid interactions: {}", report.invalid_interactions);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - index {}: {}", err.index, err.error);
            }
        }
    }

    if report.invalid_interactions > 0 {
        Err(LensCliError::ValidationFailed(report.invalid_interactions))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), LensCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: matches export (JSON array of interactions)");
                println!();
                println!("Each interaction may carry any of these groups (all optional):");
                println!();
                println!("- match:       [{{ timestamp }}]           absent = no match");
                println!("- like:        [{{ timestamp, comment? }}] absent = like received");
                println!("- block:       [{{ block_type, timestamp }}]");
                println!("- we_met:      [{{ did_meet_subject }}]");
                println!("- chats:       [{{ timestamp, body? }}]");
                println!("- voice_notes: [...]                     only the count is used");
                println!();
                println!("Timestamps must be written as YYYY-MM-DD HH:MM:SS.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: {} (one row per interaction)", PRODUCER_NAME);
                println!();
                for column in COLUMN_NAMES {
                    println!("- {}", column);
                }
                println!();
                println!("Durations are in seconds; null means not computable.");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, LensCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            tracing::warn!("reading export from an interactive stdin; finish with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_interactions(
    input: &Path,
    input_format: &InputFormat,
) -> Result<Vec<RawInteraction>, LensCliError> {
    let input_data = read_input(input)?;

    let interactions = match input_format {
        InputFormat::Json => ExportAdapter::parse_array(&input_data)?,
        InputFormat::Ndjson => ExportAdapter::parse_ndjson(&input_data)?,
    };

    tracing::debug!(interactions = interactions.len(), "read export");
    Ok(interactions)
}

fn format_output(table: &InteractionTable, format: &OutputFormat) -> Result<String, LensCliError> {
    match format {
        OutputFormat::Ndjson => Ok(table.to_ndjson()?),
        OutputFormat::Json => Ok(table.to_records_json()?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(table.rows())?),
        OutputFormat::Columnar => Ok(table.to_columnar_json()?),
    }
}

fn print_summary(s: &ExportSummary) {
    let pct = |v: Option<f64>| v.map_or("n/a".to_string(), |p| format!("{:.2}%", p));
    let num = |v: Option<f64>| v.map_or("n/a".to_string(), |n| format!("{:.2}", n));

    println!("Likes and Matches");
    println!("=================");
    println!("Total likes (sent + received): {}", s.total_likes);
    println!(
        "Total matches:                 {} ({})",
        s.total_matches,
        pct(s.pct_matches_from_total_likes)
    );
    println!(
        "Likes received:                {} ({} of likes)",
        s.likes_received,
        pct(s.pct_likes_received)
    );
    println!(
        "Matches from received likes:   {} ({})",
        s.matches_from_received_likes,
        pct(s.pct_matches_from_received_likes)
    );
    println!(
        "Likes sent:                    {} ({} of likes)",
        s.likes_sent,
        pct(s.pct_likes_sent)
    );
    println!(
        "Matches from sent likes:       {} ({})",
        s.matches_from_sent_likes,
        pct(s.pct_matches_from_sent_likes)
    );
    println!();
    println!("Other");
    println!("=====");
    println!("Total messages:                {}", s.total_messages);
    println!("Messages per match:            {}", num(s.avg_messages_per_match));
    println!("Total voice notes:             {}", s.total_voice_notes);
    println!("Total matches met:             {}", s.total_met);
    println!(
        "Likes sent per day:            {}",
        num(s.like_activity.avg_likes_sent_per_day)
    );
    println!(
        "Likes received per day:        {}",
        num(s.like_activity.avg_likes_received_per_day)
    );
    println!(
        "Matches per day:               {}",
        num(s.like_activity.avg_matches_per_day)
    );
    if let Some(days) = s.like_activity.span_days {
        println!();
        println!("Daily rates cover the {} days between the first and last like.", days);
    }
}

fn get_input_json_schema() -> String {
    let timestamp = serde_json::json!({
        "type": "string",
        "pattern": "^\\d{4}-\\d{2}-\\d{2} \\d{2}:\\d{2}:\\d{2}$"
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "matches export",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "match": {
                    "type": "array",
                    "items": { "type": "object", "required": ["timestamp"], "properties": { "timestamp": timestamp } }
                },
                "like": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["timestamp"],
                        "properties": { "timestamp": timestamp, "comment": { "type": "string" } }
                    }
                },
                "block": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["block_type", "timestamp"],
                        "properties": { "block_type": { "type": "string" }, "timestamp": timestamp }
                    }
                },
                "we_met": {
                    "type": "array",
                    "items": { "type": "object", "properties": { "did_meet_subject": {} } }
                },
                "chats": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["timestamp"],
                        "properties": { "timestamp": timestamp, "body": { "type": ["string", "null"] } }
                    }
                },
                "voice_notes": { "type": "array" }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let nullable_number = serde_json::json!({ "type": ["number", "null"] });
    let nullable_timestamp = serde_json::json!({ "type": ["string", "null"] });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "interaction row",
        "type": "object",
        "required": COLUMN_NAMES,
        "properties": {
            "match_type": { "enum": ["match", "no_match"] },
            "match_timestamp": nullable_timestamp,
            "like_type": { "enum": ["sent", "received"] },
            "like_timestamp": nullable_timestamp,
            "block_type": { "type": ["string", "null"] },
            "blocked_timestamp": nullable_timestamp,
            "met": {},
            "num_messages": { "type": "integer" },
            "time_between_first_and_last_message": nullable_number,
            "avg_time_between_messages": nullable_number,
            "avg_message_length": { "type": "number" },
            "time_between_match_and_first_message": nullable_number,
            "time_between_like_and_match": nullable_number,
            "num_voice_notes": { "type": "integer" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum LensCliError {
    Io(io::Error),
    Compute(hinge_lens::ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for LensCliError {
    fn from(e: io::Error) -> Self {
        LensCliError::Io(e)
    }
}

impl From<hinge_lens::ComputeError> for LensCliError {
    fn from(e: hinge_lens::ComputeError) -> Self {
        LensCliError::Compute(e)
    }
}

impl From<serde_json::Error> for LensCliError {
    fn from(e: serde_json::Error) -> Self {
        LensCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LensCliError> for CliError {
    fn from(e: LensCliError) -> Self {
        use hinge_lens::ComputeError;

        match e {
            LensCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LensCliError::Compute(e @ ComputeError::TimestampFormat { .. }) => CliError {
                code: "TIMESTAMP_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Timestamps must look like 2023-01-01 10:00:00; run 'lens validate' to list them all".to_string()),
            },
            LensCliError::Compute(e @ ComputeError::ConfigError(_)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the --config file and --log-level value".to_string()),
            },
            LensCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is the export's matches file; see 'lens schema input'".to_string()),
            },
            LensCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LensCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} interactions failed validation", count),
                hint: Some("Fix the listed timestamps and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_interactions: usize,
    valid_interactions: usize,
    invalid_interactions: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}
