//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "payload", version, about = "Package generated artifacts into a payload")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect files into a payload and serialize it
    Pack(PackArgs),
    /// Print the entry names a pack would produce, in archive order
    List(SourceArgs),
}

/// Where payload content comes from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Payload prefix prepended to every entry name (overrides config)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Directory (walked recursively) or single file to add
    #[arg(long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Add one file under an explicit entry name
    #[arg(long = "file", value_name = "NAME=PATH", value_parser = parse_named_file)]
    pub files: Vec<(String, PathBuf)>,

    /// YAML payload config
    #[arg(long, env = "PAYLOAD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format (default: from config, else zip)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Output file, directory for --format dir, or "-" for stdout
    #[arg(long, short = 'o', default_value = "-")]
    pub output: PathBuf,

    /// Fail instead of omitting entries that cannot be archived
    #[arg(long)]
    pub strict: bool,

    /// Version string recorded in the manifest
    #[arg(long = "version-string", env = "PAYLOAD_VERSION")]
    pub version_string: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Zip,
    Plain,
    Dir,
}

fn parse_named_file(raw: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{raw}'"))?;
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got '{raw}'"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}
