use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formdata_core::{ParsedForm, boundary_from_content_type, decode};
use glob::glob;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Report schema version (not the binary version).
const REPORT_VERSION: u32 = 1;
/// Fallback timestamp when the system clock cannot be formatted.
const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("FORMDATA_BUILD_COMMIT"),
    " ",
    env!("FORMDATA_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "formdata")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for raw multipart/form-data payload files.",
    long_about = None,
    after_help = "Examples:\n  formdata decode payload.bin --boundary ----WebKitFormBoundary -o form.json\n  formdata decode payload.bin --content-type 'multipart/form-data; boundary=xyz' --stdout"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a payload file and generate a versioned JSON report.
    #[command(alias = "parse")]
    #[command(
        after_help = "Examples:\n  formdata decode payload.bin --boundary ----WebKitFormBoundary -o form.json\n  formdata decode payload.bin --content-type 'multipart/form-data; boundary=xyz' --stdout"
    )]
    Decode {
        /// Path to a file holding the raw payload bytes
        input: PathBuf,

        /// Boundary token (the delimiter is `--` + token)
        #[arg(
            short = 'b',
            long,
            required_unless_present = "content_type",
            allow_hyphen_values = true
        )]
        boundary: Option<String>,

        /// Content-Type header value to extract the boundary token from
        #[arg(long, conflicts_with = "boundary")]
        content_type: Option<String>,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            boundary,
            content_type,
            report,
            stdout,
            pretty,
            compact,
            quiet,
        } => cmd_decode(
            input,
            boundary,
            content_type,
            report,
            stdout,
            pretty,
            compact,
            quiet,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

/// JSON report envelope around a decoded form.
#[derive(Debug, Serialize)]
struct DecodeReport {
    report_version: u32,
    tool: ToolInfo,
    generated_at: String,
    input: InputInfo,
    fields: ParsedForm,
}

#[derive(Debug, Serialize)]
struct ToolInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct InputInfo {
    path: String,
    bytes: u64,
}

fn cmd_decode(
    input: PathBuf,
    boundary: Option<String>,
    content_type: Option<String>,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    if !resolved_input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", resolved_input.display()),
            Some("pass a file holding the raw payload bytes".to_string()),
        ));
    }
    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", resolved_input.display()),
            Some("pass a file holding the raw payload bytes".to_string()),
        ));
    }

    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    let boundary = match (boundary, content_type) {
        (Some(token), None) => token,
        (None, Some(header)) => boundary_from_content_type(&header).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("pass the token directly with -b/--boundary".to_string()),
            )
        })?,
        _ => {
            return Err(CliError::new(
                "missing boundary token",
                Some("use -b/--boundary or --content-type".to_string()),
            ));
        }
    };

    let payload = fs::read(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;

    let form = decode(&payload, &boundary)
        .with_context(|| format!("Decoding failed for {}", resolved_input.display()))?;

    let decoded = DecodeReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "formdata".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: generated_at(),
        input: InputInfo {
            path: resolved_input.display().to_string(),
            bytes: meta.len(),
        },
        fields: form,
    };
    let json = serialize_report(&decoded, pretty, compact)?;

    if stdout {
        print!("{}", json);
        return Ok(());
    }

    let report = report.expect("report required when not using stdout");
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    Ok(())
}

fn generated_at() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string())
}

fn serialize_report(
    report: &DecodeReport,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches)",
                pattern,
                matches.len()
            ),
            Some("pass a single payload file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
