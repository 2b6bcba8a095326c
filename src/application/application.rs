use dirtree::{Layout, LayoutError, TreeError, TreePrinter};
use snafu::Snafu;
use snafu::prelude::*;
use supports_color::Stream;
use tracing::{debug, info};

use crate::application::RuntimeConfig;

pub struct Application;

impl Application {
    pub fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let layout = Layout::read(&app_config.layout).context(LayoutSnafu)?;
        debug!("Loaded layout: {:?}", layout);

        let mut tree = layout
            .build(app_config.root.as_deref(), app_config.backup)
            .context(LayoutSnafu)?;
        let top = tree.top();
        tree.mark_as_root(top).context(TreeSnafu)?;

        if app_config.print || app_config.dry_run {
            let colored = supports_color::on(Stream::Stdout).is_some();
            let rendered = TreePrinter::new(&tree)
                .with_color(colored)
                .render(top)
                .context(TreeSnafu)?;
            print!("{rendered}");
        }

        if app_config.dry_run {
            info!("Dry run, nothing was written");
            return Ok(());
        }

        tree.materialize(top).context(MaterializeSnafu)?;
        info!("Materialized {} nodes", tree.node_count());

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the layout"))]
    LayoutError { source: LayoutError },
    #[snafu(display("Critical failure encountered while preparing the tree"))]
    TreeError { source: TreeError },
    #[snafu(display("Critical failure encountered during materialization"))]
    MaterializeError { source: TreeError },
}
