use std::fs;
use std::io;
use std::path::Path;

use snafu::{OptionExt, ResultExt};
use tracing::{debug, info, trace, warn};

use crate::ext::PathExt;
use crate::filesystem::error::{
    BackupSnafu, CreateDirectorySnafu, NotFromRootSnafu, UnknownNodeSnafu, WriteFileSnafu,
};
use crate::filesystem::{DirectoryTree, NodeId, NodeKind, RootState, TreeError};

const BACKUP_SUFFIX: &str = ".bak";

impl DirectoryTree {
    /// Creates the directories and writes the files of the subtree at `id`.
    ///
    /// Directories are created depth-first before anything beneath them is
    /// written. Children run in insertion order. When a directory has
    /// `backup` set, an existing file is copied to `<path>.bak` right before
    /// its handler overwrites it.
    ///
    /// Once the top has been marked as root, interior nodes may only be
    /// materialized as part of a run started at the root; calling them
    /// directly fails with [`TreeError::NotFromRootError`]. Trees that were
    /// never marked accept calls on any node.
    ///
    /// A failed run leaves whatever was already created on disk.
    pub fn materialize(&mut self, id: NodeId) -> Result<(), TreeError> {
        match self.node(id)?.kind() {
            NodeKind::Directory => self.enter(id),
            NodeKind::File => self.write_file(id, false),
        }
    }

    fn enter(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.ensure_entered_from_root(id)?;

        let marked = self.is_root(id);
        if !marked {
            return self.materialize_directory(id);
        }

        info!("Materializing tree from {}", self.abspath(id)?.display());
        self.set_root_state(id, RootState::Entered)?;
        let result = self.materialize_directory(id);
        self.set_root_state(id, RootState::Idle)?;

        match &result {
            Ok(()) => info!("Finished materializing {}", self.abspath(id)?.display()),
            Err(error) => warn!("Materialization stopped: {}", error),
        }
        result
    }

    fn ensure_entered_from_root(&self, id: NodeId) -> Result<(), TreeError> {
        if self.node(id)?.parent().is_none() {
            return Ok(());
        }

        match self.root_state(self.top()) {
            Some(RootState::Idle) => NotFromRootSnafu {
                path: self.abspath(id)?,
            }
            .fail(),
            Some(RootState::Entered) => Ok(()),
            None => {
                trace!("No root marked, materializing {} directly", id);
                Ok(())
            }
        }
    }

    fn materialize_directory(&mut self, id: NodeId) -> Result<(), TreeError> {
        create_directory(&self.abspath(id)?)?;

        let backup = self.directory(id)?.backup();
        let children: Vec<NodeId> = self
            .children(id)?
            .into_iter()
            .map(|(_, child)| child)
            .collect();

        for child in children {
            match self.node(child)?.kind() {
                NodeKind::Directory => self.enter(child)?,
                NodeKind::File => self.write_file(child, backup)?,
            }
        }

        Ok(())
    }

    fn write_file(&self, id: NodeId, backup: bool) -> Result<(), TreeError> {
        let path = self.abspath(id)?;
        let file = self
            .node(id)?
            .as_file()
            .context(UnknownNodeSnafu { id })?;

        if backup && path.is_file() {
            back_up(&path)?;
        }

        file.handler().write(&path).context(WriteFileSnafu { path: &path })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

fn create_directory(path: &Path) -> Result<(), TreeError> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!("Created directory {}", path.display());
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
            trace!("Directory {} already exists", path.display());
            Ok(())
        }
        Err(error) => Err(error).context(CreateDirectorySnafu { path }),
    }
}

fn back_up(path: &Path) -> Result<(), TreeError> {
    let target = path.with_appended_suffix(BACKUP_SUFFIX);
    fs::copy(path, &target).context(BackupSnafu { path })?;
    warn!(
        "Backed up {} to {}",
        path.best_effort_display(),
        target.best_effort_display()
    );
    Ok(())
}
