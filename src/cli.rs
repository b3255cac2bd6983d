use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Refresh allowed-value lists in JSON schema documents", long_about = None)]
pub struct Cli {
    /// Preview every update without writing any schema file
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
    /// Random seed recorded in the run configuration (reserved for sampling features)
    #[arg(long, global = true, default_value_t = 1234)]
    pub seed: u64,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply identifier sets from a sectioned mapping CSV to one or more schema files
    Ids(IdsArgs),
    /// Apply unique cleaned values from a raw dataset CSV to a schema file
    Raw(RawArgs),
    /// Run the full pipeline: mapping into both schemas, then raw data into the model schema
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Sectioned mapping CSV listing valid identifiers per field
    #[arg(short = 'm', long = "mapping")]
    pub mapping: PathBuf,
    /// Schema JSON file(s) to update
    #[arg(short = 's', long = "schema", required = true, action = clap::ArgAction::Append)]
    pub schemas: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RawArgs {
    /// Raw dataset CSV supplying unique column values
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Schema JSON file to update
    #[arg(short = 's', long = "schema")]
    pub schema: PathBuf,
    /// Keep literal '?' missing-value markers in text columns
    #[arg(long = "keep-missing-markers")]
    pub keep_missing_markers: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Sectioned mapping CSV listing valid identifiers per field
    #[arg(short = 'm', long = "mapping")]
    pub mapping: PathBuf,
    /// Raw dataset CSV supplying unique column values
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Raw schema JSON file (receives identifier sets only)
    #[arg(long = "raw-schema")]
    pub raw_schema: PathBuf,
    /// Model schema JSON file (receives identifier sets, then raw-data values)
    #[arg(long = "model-schema")]
    pub model_schema: PathBuf,
    /// Drop literal '?' missing-value markers from text columns in the raw-data pass
    #[arg(long = "drop-missing-markers")]
    pub drop_missing_markers: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the raw dataset file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
