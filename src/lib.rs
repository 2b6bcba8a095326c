//! In-memory directory trees that mirror a filesystem layout and can
//! materialize it on disk.
//!
//! A [`DirectoryTree`] owns directory and file nodes. Directories are created
//! eagerly and depth-first, file nodes are invoked through their
//! [`FileHandler`] once their parent directory exists, and existing files can
//! optionally be copied to `<name>.bak` before they are overwritten.
//!
//! ```no_run
//! use dirtree::{Child, DirectoryTree, StaticFile};
//!
//! # fn main() -> Result<(), dirtree::TreeError> {
//! let mut tree = DirectoryTree::new("out", false);
//! let top = tree.top();
//! let src = tree.get_or_create(top, "src")?;
//! tree.set_child(src, "main.rs", Child::file(StaticFile::new("fn main() {}\n")))?;
//! tree.mark_as_root(top)?;
//! tree.materialize(top)?;
//! # Ok(())
//! # }
//! ```
#![allow(clippy::enum_variant_names)]

mod ext;
pub mod filesystem;
pub mod layout;

pub use filesystem::{
    Child, ChildAdded, DirectoryNode, DirectoryTree, FileHandler, FileNode, LoggingObserver, Node,
    NodeId, NodeKind, RootState, StaticFile, TreeError, TreeObserver, TreePrinter,
};
pub use layout::{Layout, LayoutEntry, LayoutError};
