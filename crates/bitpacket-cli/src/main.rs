use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bitpacket_core::{
    AnalysisError, AnalysisOptions, PacketError, ReaderSource, Report, SourceError,
};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bitpacket")]
#[command(version)]
#[command(
    about = "Decoder for hexadecimal BITS transmissions (version sum and expression value).",
    long_about = None,
    after_help = "Examples:\n  bitpacket decode input.txt\n  bitpacket decode --hex 9C0141080250320F1802104A08 --tree\n  bitpacket solve input.txt -o report.json --pretty"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one transmission and print the version sum and the value.
    #[command(alias = "solve")]
    #[command(
        after_help = "Examples:\n  bitpacket decode input.txt\n  cat input.txt | bitpacket decode -\n  bitpacket decode input.txt --json --pretty"
    )]
    Decode {
        /// Transmission file, glob pattern matching one file, or `-` for stdin
        #[arg(required_unless_present = "hex", conflicts_with = "hex")]
        input: Option<PathBuf>,

        /// Transmission given inline instead of a file
        #[arg(long)]
        hex: Option<String>,

        /// Write the JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        json: bool,

        /// Output report path (JSON)
        #[arg(short = 'o', long)]
        report: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Print the decoded packet tree (and embed it in JSON reports)
        #[arg(long)]
        tree: bool,

        /// Suppress non-error output on stderr
        #[arg(long)]
        quiet: bool,

        /// Enable debug logging (RUST_LOG overrides)
        #[arg(short = 'v', long)]
        verbose: bool,
    },
}

#[derive(Debug)]
enum InputArg {
    Inline(String),
    Stdin,
    File(PathBuf),
}

#[derive(Debug)]
struct OutputArgs {
    json: bool,
    report: Option<PathBuf>,
    pretty: bool,
    compact: bool,
    tree: bool,
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            hex,
            json,
            report,
            pretty,
            compact,
            tree,
            quiet,
            verbose,
        } => {
            init_tracing(verbose);
            let input = match (hex, input) {
                (Some(hex), _) => InputArg::Inline(hex),
                (None, Some(path)) if path.as_os_str() == "-" => InputArg::Stdin,
                (None, Some(path)) => InputArg::File(path),
                (None, None) => InputArg::Stdin,
            };
            cmd_decode(
                input,
                OutputArgs {
                    json,
                    report,
                    pretty,
                    compact,
                    tree,
                    quiet,
                },
            )
        }
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

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("bitpacket=debug,bitpacket_core=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });
    // Fails only when a global subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
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
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        let hint = match &err {
            AnalysisError::Source(SourceError::Io(_)) => "check that the input file is readable",
            AnalysisError::Source(SourceError::Empty { .. }) => {
                "the input must contain a hexadecimal transmission"
            }
            AnalysisError::Hex(_) => "transmissions contain only the digits 0-9 and A-F",
            AnalysisError::Packet(PacketError::Truncated { .. }) => {
                "the transmission ends before its packet tree is complete"
            }
            AnalysisError::Packet(PacketError::LiteralOverflow { .. }) => {
                "literal values must fit in 64 bits"
            }
            AnalysisError::Packet(PacketError::TooDeep { .. }) => {
                "operator packets are nested deeper than the decoder accepts"
            }
            AnalysisError::Eval(_) => "the packet tree does not form a valid expression",
        };
        CliError::new(err.to_string(), Some(hint.to_string()))
    }
}

fn cmd_decode(input: InputArg, output: OutputArgs) -> Result<(), CliError> {
    if output.pretty && output.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let options = AnalysisOptions {
        include_tree: output.tree,
    };

    let (rep, input_path) = match input {
        InputArg::Inline(hex) => (bitpacket_core::analyze_transmission(&hex, options)?, None),
        InputArg::Stdin => {
            let source = ReaderSource::new(io::stdin().lock(), "<stdin>");
            (bitpacket_core::analyze_source(source, options)?, None)
        }
        InputArg::File(path) => {
            let resolved = resolve_input_path(&path)?;
            validate_input_file(&resolved)?;
            let rep = bitpacket_core::analyze_file(&resolved, options)?;
            (rep, Some(resolved))
        }
    };
    debug!(
        version_sum = rep.summary.version_sum,
        value = rep.summary.value,
        "decoded transmission"
    );

    if let Some(report_path) = output.report.as_ref() {
        if let Some(input_path) = input_path.as_ref() {
            ensure_distinct_paths(input_path, report_path)?;
        }
        let json = serialize_report(&rep, output.pretty)?;
        if let Some(parent) = report_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        fs::write(report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        if !output.quiet {
            eprintln!("OK: report written -> {}", report_path.display());
        }
        return Ok(());
    }

    if output.json {
        println!("{}", serialize_report(&rep, output.pretty)?);
        return Ok(());
    }

    println!("{}", rep.summary.version_sum);
    println!("{}", rep.summary.value);
    if let Some(packet) = rep.packet.as_ref() {
        println!("{}", packet);
    }
    Ok(())
}

fn serialize_report(rep: &Report, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn ensure_distinct_paths(input: &Path, report: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = match report.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    // The output directory may not exist yet; then it cannot hold the input.
    let Ok(report_dir) = fs::canonicalize(&report_dir) else {
        return Ok(());
    };
    let file_name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", report.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a text file holding one transmission, or `-` for stdin".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a text file holding one transmission".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
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

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}",
                    pattern, count, listed
                ),
                Some("pass a single transmission file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
