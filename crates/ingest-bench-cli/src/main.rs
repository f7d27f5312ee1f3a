// crates/ingest-bench-cli/src/main.rs
// ============================================================================
// Module: Ingest Bench CLI Entry Point
// Description: Command dispatcher for benchmark writes, reads, and checks.
// Purpose: Run the synthetic workload against every configured backend.
// Dependencies: clap, ingest-bench-cli, ingest-bench-config, rand, thiserror
// ============================================================================

//! ## Overview
//! `ingest-bench write` generates batch pairs and writes every stage of their
//! jobs. `ingest-bench read` runs the query catalog at a named scale.
//! `ingest-bench run` alternates the two. `catalog list` and `config check`
//! validate inputs without touching any backend. Results go to stdout as
//! JSON lines; structured log events go to the configured log sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use ingest_bench_cli::READ_REPETITIONS;
use ingest_bench_cli::ReadOutcome;
use ingest_bench_cli::RoundReport;
use ingest_bench_cli::SampleSource;
use ingest_bench_cli::build_bench;
use ingest_bench_config::BenchConfig;
use ingest_bench_config::GeneratorConfig;
use ingest_bench_config::load_catalog;
use ingest_bench_core::Backend;
use ingest_bench_core::QueryCatalog;
use ingest_bench_core::QueryPayload;
use ingest_bench_metrics::summarize;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "ingest-bench", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to `INGEST_BENCH_CONFIG`, then ingest-bench.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate batch pairs and write every stage to each backend.
    Write(WriteCommand),
    /// Run the query catalog against each backend.
    Read(ReadCommand),
    /// Alternate write phases and reads at growing scale.
    Run(RunCommand),
    /// Query catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `write`.
#[derive(Args, Debug)]
struct WriteCommand {
    /// Batch pairs to generate.
    #[arg(long, default_value_t = 1)]
    pairs: usize,
}

/// Arguments for `read`.
#[derive(Args, Debug)]
struct ReadCommand {
    /// Scale label recorded in each operation name (for example `3x`).
    #[arg(long)]
    scale: String,
    /// Timed repetitions per shape and backend.
    #[arg(long, default_value_t = READ_REPETITIONS)]
    repetitions: usize,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Write-then-read iterations.
    #[arg(long, default_value_t = 8)]
    iterations: usize,
    /// Batch pairs written per iteration.
    #[arg(long, default_value_t = 10)]
    pairs: usize,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// List every shape and the backends it covers.
    List,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration and its query catalog.
    Check,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Write(command) => command_write(config_path, &command),
        Commands::Read(command) => command_read(config_path, &command),
        Commands::Run(command) => command_run(config_path, &command),
        Commands::Catalog {
            command: CatalogCommand::List,
        } => command_catalog_list(config_path),
        Commands::Config {
            command: ConfigCommand::Check,
        } => command_config_check(config_path),
    }
}

// ============================================================================
// SECTION: Benchmark Commands
// ============================================================================

/// Executes `write`.
fn command_write(config_path: Option<&Path>, command: &WriteCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let bench = build_bench(&config).map_err(|err| CliError::new(err.to_string()))?;
    let mut rng = workload_rng(&config.generator);
    let rounds = bench.driver.write_batch_pairs(&config.generator, command.pairs, &mut rng);
    report_rounds(&rounds)?;
    report_summaries(&bench.samples)?;
    Ok(exit_code(rounds.iter().any(RoundReport::has_failures)))
}

/// Executes `read`.
fn command_read(config_path: Option<&Path>, command: &ReadCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let catalog = load_query_catalog(&config)?;
    let bench = build_bench(&config).map_err(|err| CliError::new(err.to_string()))?;
    let reads = bench.driver.read_catalog(&catalog, &command.scale, command.repetitions);
    report_reads(&reads)?;
    report_summaries(&bench.samples)?;
    Ok(exit_code(reads.iter().any(|read| read.error.is_some())))
}

/// Executes `run`.
fn command_run(config_path: Option<&Path>, command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let catalog = load_query_catalog(&config)?;
    let bench = build_bench(&config).map_err(|err| CliError::new(err.to_string()))?;
    let mut rng = workload_rng(&config.generator);
    let report = bench.driver.run_iterations(&config.generator, &catalog, command.iterations, command.pairs, &mut rng);
    report_rounds(&report.rounds)?;
    report_reads(&report.reads)?;
    report_summaries(&bench.samples)?;
    Ok(exit_code(report.has_failures()))
}

// ============================================================================
// SECTION: Inspection Commands
// ============================================================================

/// Executes `catalog list`.
fn command_catalog_list(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let catalog = load_query_catalog(&config)?;
    for (shape, queries) in catalog.iter() {
        for backend in Backend::ALL {
            let summary = match queries.payload(backend) {
                QueryPayload::Text(text) => text.lines().next().unwrap_or_default().trim().to_string(),
                QueryPayload::Json(body) => {
                    let keys: Vec<&str> = body.as_object().map(|map| map.keys().map(String::as_str).collect()).unwrap_or_default();
                    format!("{{{}}}", keys.join(", "))
                }
            };
            write_line(&format!("{shape}\t{backend}\t{summary}"))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let catalog = load_query_catalog(&config)?;
    let backends: Vec<&str> = config.enabled_backends().into_iter().map(Backend::as_str).collect();
    let shapes = catalog.iter().count();
    write_line(&format!("config ok: backends [{}]; catalog shapes {shapes}", backends.join(", ")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates the configuration.
fn load_config(path: Option<&Path>) -> CliResult<BenchConfig> {
    BenchConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Loads the catalog named by the configuration.
fn load_query_catalog(config: &BenchConfig) -> CliResult<QueryCatalog> {
    load_catalog(&config.catalog_path).map_err(|err| CliError::new(format!("catalog load failed: {err}")))
}

/// Seeds the workload generator.
fn workload_rng(generator: &GeneratorConfig) -> StdRng {
    generator.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Prints one JSON line per write round.
fn report_rounds(rounds: &[RoundReport]) -> CliResult<()> {
    rounds.iter().try_for_each(|round| write_json_line(&JsonLine::new("round", round)))
}

/// Prints one JSON line per read outcome.
fn report_reads(reads: &[ReadOutcome]) -> CliResult<()> {
    reads.iter().try_for_each(|read| write_json_line(&JsonLine::new("read", read)))
}

/// Prints one JSON line per backend operation summary.
fn report_summaries(samples: &SampleSource) -> CliResult<()> {
    let Some(samples) = samples.samples().map_err(|err| CliError::new(err.to_string()))? else {
        return Ok(());
    };
    summarize(&samples).iter().try_for_each(|summary| write_json_line(&JsonLine::new("summary", summary)))
}

/// Tagged stdout line.
#[derive(Serialize)]
struct JsonLine<'a, T: Serialize> {
    /// Line kind.
    kind: &'static str,
    /// Line payload.
    #[serde(flatten)]
    payload: &'a T,
}

impl<'a, T: Serialize> JsonLine<'a, T> {
    /// Tags a payload.
    const fn new(kind: &'static str, payload: &'a T) -> Self {
        Self {
            kind,
            payload,
        }
    }
}

/// Serializes a value as one stdout line.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value).map_err(|err| CliError::new(format!("output encoding failed: {err}")))?;
    write_line(&line)
}

/// Writes a line to stdout.
fn write_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Maps failure presence to the process exit code.
const fn exit_code(failed: bool) -> ExitCode {
    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
