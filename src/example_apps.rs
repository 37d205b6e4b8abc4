use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::builder::DatasetBuilder;
use crate::config::{
    DatasetLengthConfig, StorageLocation, builder_config, builder_configs, validate_window_size,
};
use crate::constants::storage::{DEFAULT_BUCKET, DEFAULT_PREFIX, DEFAULT_PROJECT};
use crate::info::dataset_info;
use crate::schema::DEFAULT_SPEC;
use crate::sink::JsonLinesSink;
use crate::transport::fs::LocalObjectStore;

#[derive(Debug, Parser)]
#[command(
    name = "build_dataset",
    disable_help_subcommand = true,
    about = "Build windowed tree mortality examples",
    long_about = "Read TFRecord exports from a local bucket mirror, drop pixels with no observed year, and write every fully observed window as JSON lines.",
    after_help = "The window length comes from --config or --time-series-length, defaulting to the shortest registered config (2_years)."
)]
/// CLI for `build_dataset`.
///
/// Common usage:
/// - List registered configs: `--list-configs`
/// - Print feature shapes for a config: `--config 5_years --info`
/// - Build from a mirrored bucket: `--root /data/gcs --config 5_years --output windows.jsonl`
struct BuildDatasetCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Directory holding one subdirectory per bucket"
    )]
    root: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_PROJECT, help = "Project that owns the bucket")]
    project: String,
    #[arg(long, default_value = DEFAULT_BUCKET, help = "Bucket holding the export")]
    bucket: String,
    #[arg(long, default_value = DEFAULT_PREFIX, help = "Object-name prefix to list under")]
    prefix: String,
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with = "time_series_length",
        help = "Registered config name, e.g. 5_years"
    )]
    config: Option<String>,
    #[arg(
        long = "time-series-length",
        value_name = "YEARS",
        value_parser = parse_time_series_length,
        help = "Window length in years (2-20)"
    )]
    time_series_length: Option<usize>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Write JSON lines here instead of stdout"
    )]
    output: Option<PathBuf>,
    #[arg(long, help = "Print dataset info for the selected config and exit")]
    info: bool,
    #[arg(long = "list-configs", help = "Print registered configs and exit")]
    list_configs: bool,
}

/// Run the `build_dataset` CLI over `args_iter` (program name excluded).
pub fn run_build_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let Some(cli) = parse_build_cli(std::iter::once("build_dataset".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    if cli.list_configs {
        for config in builder_configs() {
            println!("{}\t{} years", config.name, config.time_series_length());
        }
        return Ok(());
    }

    let config = match (&cli.config, cli.time_series_length) {
        (Some(name), _) => builder_config(name)?,
        (None, Some(length)) => DatasetLengthConfig::new(length)?,
        (None, None) => DatasetLengthConfig::default(),
    }
    .with_storage(StorageLocation::new(cli.project, cli.bucket, cli.prefix));

    if cli.info {
        let info = dataset_info(&config, &DEFAULT_SPEC);
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let Some(root) = cli.root else {
        return Err("--root is required to build the dataset".into());
    };
    let store = LocalObjectStore::new(root);
    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut sink = JsonLinesSink::new(writer);
    let summary = DatasetBuilder::new(config, store).write_to(&mut sink)?;
    eprintln!(
        "Wrote {} windows from {} TFRecord objects{}",
        summary.windows,
        summary.objects,
        cli.output
            .map(|path| format!(" to {}", path.display()))
            .unwrap_or_default()
    );
    Ok(())
}

/// `None` when clap printed help or version text and there is nothing to run.
fn parse_build_cli(
    args: impl IntoIterator<Item = String>,
) -> Result<Option<BuildDatasetCli>, Box<dyn Error>> {
    let err = match BuildDatasetCli::try_parse_from(args) {
        Ok(cli) => return Ok(Some(cli)),
        Err(err) => err,
    };
    if err.use_stderr() {
        return Err(err.into());
    }
    err.print()?;
    Ok(None)
}

fn parse_time_series_length(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --time-series-length value '{}' as a positive integer",
            raw
        )
    })?;
    validate_window_size(parsed).map_err(|err| err.to_string())?;
    Ok(parsed)
}
