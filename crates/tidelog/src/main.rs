use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tidelog_core::frame::merged_to_dataframe;
use tidelog_core::ingestion::{ingest_files, FileInput, IngestionBatch};
use tidelog_core::EngineConfig;
use tidelog_parser::{merge_files, validate_merge, DateFormat, FileFamily, MergeMode};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod report;

const DEFAULT_CONFIG_PATH: &str = "tidelog.toml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Parse, validate and merge field logger exports", long_about = None)]
struct Cli {
    /// Engine config (TOML with a [limits] table)
    #[arg(long, global = true, env = "TIDELOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse files and summarise what was found in each
    Parse(ParseArgs),
    /// Check whether files can be merged, without merging them
    Validate(ValidateArgs),
    /// Merge files and write the result as CSV
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Files or glob patterns
    #[arg(required = true)]
    paths: Vec<String>,

    /// Treat every file as this family instead of inferring it from the name
    #[arg(long)]
    family: Option<FileFamily>,

    /// Skip date-format inference (day-first, month-first or iso)
    #[arg(long)]
    date_format: Option<DateFormat>,
}

#[derive(Args, Debug)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Print the full parse results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value = "sequential")]
    mode: MergeMode,
}

#[derive(Args, Debug)]
struct MergeArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value = "sequential")]
    mode: MergeMode,

    /// Write the merged CSV here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the first rows of the merged table
    #[arg(long)]
    preview: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse(args) => {
            let batch = ingest(&args.input, &config).await?;
            if args.json {
                let json = serde_json::to_string_pretty(&batch.parsed)
                    .context("failed to serialize parse results")?;
                println!("{json}");
            } else {
                println!("{}", report::files_table(&batch));
                report::print_file_errors(&batch);
            }
            Ok(())
        }
        Command::Validate(args) => {
            let batch = ingest(&args.input, &config).await?;
            let validation = validate_merge(&batch.parsed, args.mode);
            println!("{}", report::validation_table(&validation));
            if !validation.is_valid {
                bail!("{} files cannot be merged as {}", batch.parsed.len(), args.mode);
            }
            info!(mode = %args.mode, "merge validation passed");
            Ok(())
        }
        Command::Merge(args) => {
            let batch = ingest(&args.input, &config).await?;
            let validation = validate_merge(&batch.parsed, args.mode);
            if !validation.is_valid {
                eprintln!("{}", report::validation_table(&validation));
                bail!("merge blocked by {} validation errors", validation.errors.len());
            }
            for warning in &validation.warnings {
                warn!(mode = %args.mode, "{warning}");
            }

            let merged = merge_files(&batch.parsed, args.mode);
            if args.preview {
                let df = merged_to_dataframe(&merged).context("failed to build merged table")?;
                eprintln!("{}", df.head(Some(10)));
            }

            let csv = merged.to_csv().context("failed to write merged CSV")?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, csv)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(
                        output = %path.display(),
                        rows = merged.data.len(),
                        columns = merged.headers.len(),
                        "merged data written"
                    );
                }
                None => print!("{csv}"),
            }
            Ok(())
        }
    }
}

/// An explicit path must exist; the default one is optional.
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            EngineConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => EngineConfig::load(Path::new(DEFAULT_CONFIG_PATH))
            .context("failed to load tidelog.toml"),
    }
}

async fn ingest(args: &InputArgs, config: &EngineConfig) -> Result<IngestionBatch> {
    let paths = expand_paths(&args.paths)?;
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut input = FileInput::new(path.display().to_string(), contents);
        input.family = args.family;
        input.date_format = args.date_format;
        inputs.push(input);
    }

    info!(files = inputs.len(), "ingesting files");
    Ok(ingest_files(inputs, config.limits).await)
}

fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let before = paths.len();
        for entry in glob::glob(pattern).with_context(|| format!("invalid path pattern '{pattern}'"))? {
            let path = entry.context("could not read path from glob pattern")?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            warn!(pattern = %pattern, "pattern matched no files");
        }
    }

    if paths.is_empty() {
        bail!("no input files matched");
    }
    Ok(paths)
}
