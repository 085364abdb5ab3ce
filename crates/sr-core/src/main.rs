//! Sentiment/Rating Core - command line entry point
//!
//! Subcommands:
//! - `analyze`: stream a JSONL review file and print the report
//! - `inspect`: verify and print a snapshot bundle
//! - `config`: show or validate the effective configuration
//! - `schema`: JSON Schemas of the output types
//! - `completions`, `version`

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use sr_common::error::format_error_human;
use sr_common::{Error, OutputFormat, RunId, StructuredError, SCHEMA_VERSION};
use sr_config::{load_analysis_config, validate_analysis, LoadOptions, LoadedConfig, PresetName};
use sr_core::bundle::{read_bundle, write_bundle};
use sr_core::exit_codes::ExitCode;
use sr_core::log_event;
use sr_core::logging::{
    event_names, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use sr_core::output::render_report;
use sr_core::pipeline::Analyzer;
use sr_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use sr_core::stream::JsonlSource;

/// Sentiment/Rating Core - memory-bounded review statistics
#[derive(Parser)]
#[command(name = "sr-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to analysis.json (overrides SR_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Configuration preset (standard, quick, thorough)
    #[arg(long, global = true, default_value = "standard")]
    preset: String,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSONL review file
    Analyze(AnalyzeArgs),
    /// Verify a snapshot bundle and print its report
    Inspect(InspectArgs),
    /// Configuration management
    Config(ConfigArgs),
    /// Print JSON Schemas of output types
    Schema(SchemaArgs),
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// JSONL file, one review per line
    input: PathBuf,

    /// Write a .srb snapshot bundle here
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Write every time-series feature row as JSONL here
    #[arg(long)]
    rows: Option<PathBuf>,

    /// Worker threads for moment accumulation
    #[arg(long)]
    workers: Option<usize>,

    /// Records per batch
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Number of clusters
    #[arg(long, short = 'k')]
    clusters: Option<usize>,

    /// Directory for external sort spill files
    #[arg(long)]
    spill_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Bundle file
    bundle: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Validate a config file (defaults to the resolved one)
    Validate { path: Option<PathBuf> },
    /// List presets
    Presets,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name
    name: Option<String>,

    /// List available types
    #[arg(long)]
    list: bool,

    /// Every schema, keyed by type name
    #[arg(long)]
    all: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.global.quiet {
        LogLevel::Error
    } else {
        match cli.global.verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    };
    let level = (cli.global.verbose > 0 || cli.global.quiet).then_some(level);
    // Machine-readable stdout gets machine-readable stderr.
    let format = (cli.global.format == OutputFormat::Json).then_some(LogFormat::Jsonl);
    init_logging(&LogConfig::from_env(level, format));

    let exit_code = match &cli.command {
        None => {
            let _ = Cli::command().print_help();
            ExitCode::ArgsError
        }
        Some(Commands::Analyze(args)) => run_analyze(&cli.global, args),
        Some(Commands::Inspect(args)) => run_inspect(&cli.global, args),
        Some(Commands::Config(args)) => run_config(&cli.global, args),
        Some(Commands::Schema(args)) => run_schema(&cli.global, args),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "sr-core",
                &mut std::io::stdout(),
            );
            ExitCode::Clean
        }
        Some(Commands::Version) => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Print an error in the requested format and map it to an exit code.
fn output_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    match global.format {
        OutputFormat::Json => eprintln!("{}", StructuredError::from(err).to_json_pretty()),
        _ => {
            let color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, color));
        }
    }
    ExitCode::for_error(err)
}

fn load_config(global: &GlobalOpts) -> Result<LoadedConfig, Error> {
    let preset: PresetName = global.preset.parse()?;
    let loaded = load_analysis_config(&LoadOptions {
        path: global.config.clone(),
        preset,
    })?;

    let ctx = LogContext::new("-");
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "Configuration loaded",
        preset = loaded.preset.as_str(),
        source = loaded.paths.source.to_string().as_str()
    );
    Ok(loaded)
}

fn run_analyze(global: &GlobalOpts, args: &AnalyzeArgs) -> ExitCode {
    match analyze(global, args) {
        Ok(code) => code,
        Err(e) => output_error(global, &e),
    }
}

fn analyze(global: &GlobalOpts, args: &AnalyzeArgs) -> Result<ExitCode, Error> {
    let mut loaded = load_config(global)?;
    let mut config = loaded.config.clone();
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(chunk_size) = args.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(k) = args.clusters {
        config = config.with_clusters(k);
    }
    if let Some(dir) = &args.spill_dir {
        config = config.with_spill_dir(dir);
    }
    validate_analysis(&config)?;
    loaded.config = config.clone();

    if !args.input.exists() {
        return Err(Error::Config(format!(
            "input file not found: {}",
            args.input.display()
        )));
    }

    let mut analyzer = Analyzer::new(config, loaded.snapshot()).with_run_id(RunId::new());
    if let Some(rows) = &args.rows {
        analyzer = analyzer.with_rows_output(rows);
    }

    let run = analyzer.run(&JsonlSource::new(&args.input))?;
    if let Some(path) = &args.bundle {
        write_bundle(&run, path)?;
    }

    println!("{}", render_report(&run.report, global.format)?);
    Ok(if run.report.has_warnings() {
        ExitCode::CleanWithWarnings
    } else {
        ExitCode::Clean
    })
}

fn run_inspect(global: &GlobalOpts, args: &InspectArgs) -> ExitCode {
    let contents = match read_bundle(&args.bundle) {
        Ok(c) => c,
        Err(e) => return output_error(global, &e),
    };

    if !contents.failed_checksums.is_empty() {
        let err = Error::Bundle(format!(
            "checksum mismatch: {}",
            contents.failed_checksums.join(", ")
        ));
        return output_error(global, &err);
    }

    let rendered = match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "manifest": &contents.manifest,
                "report": &contents.report,
                "moments": &contents.moments,
                "clusters": &contents.clusters,
            });
            serde_json::to_string_pretty(&response).map_err(Error::from)
        }
        format => render_report(&contents.report, format),
    };

    match rendered {
        Ok(text) => {
            println!("{text}");
            if contents.report.has_warnings() {
                ExitCode::CleanWithWarnings
            } else {
                ExitCode::Clean
            }
        }
        Err(e) => output_error(global, &e),
    }
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => match load_config(global) {
            Ok(loaded) => {
                let snapshot = loaded.snapshot();
                match global.format {
                    OutputFormat::Json => print_json(&snapshot),
                    OutputFormat::Summary => println!(
                        "preset {} from {}, hash {}",
                        snapshot.preset, snapshot.source, snapshot.effective_hash
                    ),
                    OutputFormat::Md => {
                        println!("# Configuration");
                        println!();
                        println!("Preset: {}", snapshot.preset);
                        match &snapshot.file_path {
                            Some(path) => println!("File: {path}"),
                            None => println!("File: using built-in defaults"),
                        }
                        println!();
                        println!("```json");
                        print_json(&snapshot.effective);
                        println!("```");
                    }
                }
                ExitCode::Clean
            }
            Err(e) => output_error(global, &e),
        },
        ConfigCommands::Validate { path } => {
            let preset = match global.preset.parse::<PresetName>() {
                Ok(p) => p,
                Err(e) => return output_error(global, &e.into()),
            };
            let options = LoadOptions {
                path: path.clone().or_else(|| global.config.clone()),
                preset,
            };
            match load_analysis_config(&options) {
                Ok(loaded) => {
                    let response = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "status": "valid",
                        "path": loaded.paths.analysis.as_ref().map(|p| p.display().to_string()),
                        "source": loaded.paths.source.to_string(),
                        "preset": loaded.preset.as_str(),
                    });
                    match global.format {
                        OutputFormat::Json => print_json(&response),
                        _ => println!("config validate: OK ({})", loaded.paths.source),
                    }
                    ExitCode::Clean
                }
                Err(e) => output_error(global, &e.into()),
            }
        }
        ConfigCommands::Presets => {
            match global.format {
                OutputFormat::Json => {
                    let presets: Vec<_> = PresetName::ALL
                        .iter()
                        .map(|p| {
                            serde_json::json!({
                                "name": p.as_str(),
                                "description": p.description(),
                            })
                        })
                        .collect();
                    print_json(&presets);
                }
                _ => {
                    for p in PresetName::ALL {
                        println!("{:<10} {}", p.as_str(), p.description());
                    }
                }
            }
            ExitCode::Clean
        }
    }
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> ExitCode {
    if args.list {
        for (name, description) in available_schemas() {
            println!("{name:<22} {description}");
        }
        return ExitCode::Clean;
    }
    if args.all {
        print_json(&generate_all_schemas());
        return ExitCode::Clean;
    }

    let Some(name) = &args.name else {
        let err = Error::Config("schema name required (or --list / --all)".to_string());
        return output_error(global, &err);
    };
    match generate_schema(name) {
        Some(schema) => {
            print_json(&schema);
            ExitCode::Clean
        }
        None => output_error(
            global,
            &Error::Config(format!("unknown schema type '{name}'; see --list")),
        ),
    }
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "sr_core_version": env!("CARGO_PKG_VERSION"),
            "rust_version": env!("CARGO_PKG_RUST_VERSION"),
        })),
        _ => {
            println!("sr-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {SCHEMA_VERSION}");
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}
