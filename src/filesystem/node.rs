use std::fmt;

use derive_more::{Display, From};
use hashlink::LinkedHashMap;

use crate::filesystem::FileHandler;

/// Handle to a node inside the [`DirectoryTree`](super::DirectoryTree) that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Whether a run started at the marked root is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootState {
    #[default]
    Idle,
    Entered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub(crate) backup: bool,
    pub(crate) root: Option<RootState>,
    pub(crate) children: LinkedHashMap<String, NodeId>,
}

impl DirectoryNode {
    pub(crate) fn new(backup: bool) -> Self {
        Self {
            backup,
            root: None,
            children: LinkedHashMap::new(),
        }
    }

    pub fn backup(&self) -> bool {
        self.backup
    }

    /// `Some` only on the node marked as root.
    pub fn root_state(&self) -> Option<RootState> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

pub struct FileNode {
    pub(crate) handler: Box<dyn FileHandler>,
}

impl FileNode {
    pub fn handler(&self) -> &dyn FileHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for FileNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileNode").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) enum NodeBody {
    Directory(DirectoryNode),
    File(FileNode),
}

#[derive(Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) body: NodeBody,
}

impl Node {
    pub(crate) fn directory(name: String, parent: Option<NodeId>, backup: bool) -> Self {
        Self {
            name,
            parent,
            body: NodeBody::Directory(DirectoryNode::new(backup)),
        }
    }

    pub(crate) fn file(name: String, parent: NodeId, handler: Box<dyn FileHandler>) -> Self {
        Self {
            name,
            parent: Some(parent),
            body: NodeBody::File(FileNode { handler }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Directory(_) => NodeKind::Directory,
            NodeBody::File(_) => NodeKind::File,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match &self.body {
            NodeBody::Directory(directory) => Some(directory),
            NodeBody::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match &self.body {
            NodeBody::File(file) => Some(file),
            NodeBody::Directory(_) => None,
        }
    }

    pub(crate) fn as_directory_mut(&mut self) -> Option<&mut DirectoryNode> {
        match &mut self.body {
            NodeBody::Directory(directory) => Some(directory),
            NodeBody::File(_) => None,
        }
    }
}
