use std::path::PathBuf;

use clap::Parser;
use dirtree::layout::DEFAULT_LAYOUT_FILE_NAME;

use crate::application::data::LogLevel;

/// Materializes a directory layout described in a YAML file.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// The layout file to materialize
    #[clap(default_value = DEFAULT_LAYOUT_FILE_NAME)]
    pub layout: PathBuf,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory to materialize into, overrides the layout's `root`
    #[clap(long, short)]
    pub root: Option<PathBuf>,

    /// Copy existing files to `<name>.bak` before overwriting them
    #[clap(long, short)]
    pub backup: bool,

    /// Print the tree before materializing it
    #[clap(long, short)]
    pub print: bool,

    /// Print the tree and stop without touching the filesystem
    #[clap(long)]
    pub dry_run: bool,
}
