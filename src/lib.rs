pub mod cli;
pub mod data;
pub mod io_utils;
pub mod mapping;
pub mod schema;
pub mod update;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::cli::{Cli, Commands};
use crate::data::RawTable;
use crate::mapping::IdMapping;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("schema_allowed", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Process-wide configuration, built once from parsed arguments and passed
/// explicitly to every command handler.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// When set, every update runs in preview mode and no file is written.
    pub dry_run: bool,
    /// Recorded for reproducibility; no current command consumes it.
    pub seed: u64,
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = RunConfig {
        dry_run: cli.dry_run,
        seed: cli.seed,
    };
    debug!(
        "Run configuration: dry_run={}, seed={}",
        config.dry_run, config.seed
    );
    match cli.command {
        Commands::Ids(args) => handle_ids(&args, config),
        Commands::Raw(args) => handle_raw(&args, config),
        Commands::Sync(args) => handle_sync(&args, config),
    }
}

fn handle_ids(args: &cli::IdsArgs, config: RunConfig) -> Result<()> {
    let ids = load_mapping(&args.mapping)?;
    for schema_path in &args.schemas {
        let outcome = update::update_schema_with_ids(schema_path, &ids, config.dry_run)
            .with_context(|| format!("Updating schema {schema_path:?}"))?;
        update::report(&outcome);
    }
    Ok(())
}

fn handle_raw(args: &cli::RawArgs, config: RunConfig) -> Result<()> {
    let table = load_table(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
    )?;
    let outcome = update::update_schema_with_raw(
        &args.schema,
        &table,
        !args.keep_missing_markers,
        config.dry_run,
    )
    .with_context(|| format!("Updating schema {:?}", args.schema))?;
    update::report(&outcome);
    Ok(())
}

fn handle_sync(args: &cli::SyncArgs, config: RunConfig) -> Result<()> {
    let ids = load_mapping(&args.mapping)?;
    for schema_path in [&args.raw_schema, &args.model_schema] {
        let outcome = update::update_schema_with_ids(schema_path, &ids, config.dry_run)
            .with_context(|| format!("Updating schema {schema_path:?}"))?;
        update::report(&outcome);
    }

    let table = load_table(
        &args.input,
        args.delimiter,
        args.input_encoding.as_deref(),
    )?;
    let outcome = update::update_schema_with_raw(
        &args.model_schema,
        &table,
        args.drop_missing_markers,
        config.dry_run,
    )
    .with_context(|| format!("Updating schema {:?}", args.model_schema))?;
    update::report(&outcome);
    Ok(())
}

fn load_mapping(path: &std::path::Path) -> Result<IdMapping> {
    let ids = mapping::load(path)?;
    info!(
        "Parsed {} section(s) from {:?} ({} row(s) skipped)",
        ids.sections.len(),
        path,
        ids.skipped.len()
    );
    for row in &ids.skipped {
        debug!(
            "Skipped mapping row at line {} in section '{}': {:?}",
            row.line_number, row.section, row.reason
        );
    }
    Ok(ids)
}

fn load_table(
    path: &std::path::Path,
    delimiter: Option<u8>,
    encoding_label: Option<&str>,
) -> Result<RawTable> {
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let encoding = io_utils::resolve_encoding(encoding_label)?;
    let table = RawTable::read(path, delimiter, encoding)
        .with_context(|| format!("Reading raw dataset {path:?}"))?;
    Ok(table)
}
