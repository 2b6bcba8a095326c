use std::path::PathBuf;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub layout: PathBuf,
    pub root: Option<PathBuf>,
    pub backup: bool,
    pub print: bool,
    pub dry_run: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            layout: cli.layout,
            root: cli.root,
            backup: cli.backup,
            print: cli.print,
            dry_run: cli.dry_run,
        }
    }
}
