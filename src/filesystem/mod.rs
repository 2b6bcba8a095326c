//! Directory tree that mirrors a target filesystem layout.
//!
//! Nodes live in an arena owned by [`DirectoryTree`] and are addressed by
//! [`NodeId`]. Directories own ordered, uniquely named children; files are
//! opaque [`FileHandler`]s that write their own content. Materialization
//! walks the tree depth-first, creating directories before any file beneath
//! them is written.

mod error;
mod file_handler;
mod materialize;
mod node;
mod observer;
mod printer;
mod tree;

pub use error::TreeError;
pub(crate) use error::UnsupportedNodeTypeSnafu;
pub use file_handler::{FileHandler, StaticFile};
pub use node::{DirectoryNode, FileNode, Node, NodeId, NodeKind, RootState};
pub use observer::{ChildAdded, LoggingObserver, TreeObserver};
pub use printer::TreePrinter;
pub use tree::{Child, DirectoryTree};
