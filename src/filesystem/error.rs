use std::path::PathBuf;

use snafu::Snafu;

use crate::ext::PathExt;
use crate::filesystem::NodeId;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("Node already exists: {}", path))]
    DuplicateNameError { path: String },
    #[snafu(display("Unsupported node type for '{}': {}", path, found))]
    UnsupportedNodeTypeError { path: String, found: String },
    #[snafu(display("Invalid node name '{}' in {}", name, path.best_effort_display()))]
    InvalidNameError { name: String, path: PathBuf },
    #[snafu(display(
        "Could not mark {} as root, it {}",
        path.best_effort_display(),
        if *already_root { "is already marked" } else { "already has a parent" }
    ))]
    AlreadyHasParentError { path: PathBuf, already_root: bool },
    #[snafu(display("A tree marked as root cannot be inserted as child '{}'", path))]
    RootAsChildError { path: String },
    #[snafu(display(
        "Directory {} called but not from its virtual root",
        path.best_effort_display()
    ))]
    NotFromRootError { path: PathBuf },
    #[snafu(display("{} is a file and cannot hold children", path.best_effort_display()))]
    NotADirectoryError { path: PathBuf },
    #[snafu(display("No child named '{}' in {}", name, path.best_effort_display()))]
    NoSuchChildError { name: String, path: PathBuf },
    #[snafu(display("Node {} does not belong to this tree", id))]
    UnknownNodeError { id: NodeId },
    #[snafu(display("Failed to create directory {}", path.best_effort_display()))]
    CreateDirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to back up {}", path.best_effort_display()))]
    BackupError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write file {}", path.best_effort_display()))]
    WriteFileError {
        path: PathBuf,
        source: std::io::Error,
    },
}
