use std::fmt;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, PathBuf};

use hashlink::LinkedHashMap;
use snafu::{OptionExt, ensure};
use tracing::{debug, trace};

use crate::filesystem::error::{
    AlreadyHasParentSnafu, DuplicateNameSnafu, InvalidNameSnafu, NoSuchChildSnafu,
    NotADirectorySnafu, RootAsChildSnafu, UnknownNodeSnafu,
};
use crate::filesystem::node::NodeBody;
use crate::filesystem::{
    ChildAdded, DirectoryNode, FileHandler, LoggingObserver, Node, NodeId, NodeKind, RootState,
    TreeError, TreeObserver,
};

/// Value inserted with [`DirectoryTree::set_child`].
pub enum Child {
    /// No explicit node: an empty directory inheriting the parent's `backup`.
    Unset,
    /// A detached tree grafted under the new name, keeping its own settings.
    Directory(DirectoryTree),
    File(Box<dyn FileHandler>),
}

impl Child {
    pub fn file(handler: impl FileHandler + 'static) -> Self {
        Child::File(Box::new(handler))
    }
}

impl From<DirectoryTree> for Child {
    fn from(tree: DirectoryTree) -> Self {
        Child::Directory(tree)
    }
}

impl From<Box<dyn FileHandler>> for Child {
    fn from(handler: Box<dyn FileHandler>) -> Self {
        Child::File(handler)
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Child::Unset => f.write_str("Unset"),
            Child::Directory(tree) => f.debug_tuple("Directory").field(tree).finish(),
            Child::File(_) => f.write_str("File(..)"),
        }
    }
}

/// Arena holding one tree. The top node has no parent and is the only node
/// that can be marked as root.
///
/// Slots of removed nodes are reused by later insertions, so a [`NodeId`]
/// kept across [`remove_child`](Self::remove_child) may come to name a
/// different node.
pub struct DirectoryTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    observer: Box<dyn TreeObserver>,
}

impl DirectoryTree {
    /// Creates a tree whose top directory is called `name`. The top name is
    /// usually the target location on disk, e.g. `/srv/site` or `out`.
    pub fn new(name: impl Into<String>, backup: bool) -> Self {
        Self::with_observer(name, backup, LoggingObserver)
    }

    pub fn with_observer(
        name: impl Into<String>,
        backup: bool,
        observer: impl TreeObserver + 'static,
    ) -> Self {
        Self {
            nodes: vec![Some(Node::directory(name.into(), None, backup))],
            free: Vec::new(),
            observer: Box::new(observer),
        }
    }

    pub fn top(&self) -> NodeId {
        NodeId::from(0)
    }

    /// Number of live nodes, the top included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .context(UnknownNodeSnafu { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .context(UnknownNodeSnafu { id })
    }

    pub fn directory(&self, id: NodeId) -> Result<&DirectoryNode, TreeError> {
        let node = self.node(id)?;
        match node.as_directory() {
            Some(directory) => Ok(directory),
            None => NotADirectorySnafu {
                path: self.abspath(id)?,
            }
            .fail(),
        }
    }

    fn directory_mut(&mut self, id: NodeId) -> Result<&mut DirectoryNode, TreeError> {
        if self.node(id)?.is_file() {
            return NotADirectorySnafu {
                path: self.abspath(id)?,
            }
            .fail();
        }
        self.node_mut(id)?
            .as_directory_mut()
            .context(UnknownNodeSnafu { id })
    }

    /// Names from the top down to `id`, both included.
    pub fn path(&self, id: NodeId) -> Result<Vec<&str>, TreeError> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(current_id) = current {
            let node = self.node(current_id)?;
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        Ok(names)
    }

    /// Path of `id` on disk, recomputed from the live parent chain.
    pub fn abspath(&self, id: NodeId) -> Result<PathBuf, TreeError> {
        Ok(PathBuf::from(self.path(id)?.join(MAIN_SEPARATOR_STR)))
    }

    fn intended_path(&self, parent: NodeId, name: &str) -> Result<String, TreeError> {
        let mut names = self.path(parent)?;
        names.push(name);
        Ok(names.join("/"))
    }

    /// Looks `name` up without creating anything.
    pub fn try_get(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, TreeError> {
        Ok(self.directory(parent)?.children.get(name).copied())
    }

    /// Looks `name` up, creating an empty directory with the parent's
    /// `backup` setting when it is missing. No event is emitted for nodes
    /// created this way.
    pub fn get_or_create(&mut self, parent: NodeId, name: &str) -> Result<NodeId, TreeError> {
        if let Some(existing) = self.try_get(parent, name)? {
            return Ok(existing);
        }

        self.validate_name(parent, name)?;
        let backup = self.directory(parent)?.backup;
        let id = self.insert(parent, Node::directory(name.to_string(), Some(parent), backup))?;
        trace!("Auto-created directory '{}' under {}", name, parent);
        Ok(id)
    }

    /// Chains [`get_or_create`](Self::get_or_create) over `names`.
    pub fn get_or_create_path<I, S>(&mut self, parent: NodeId, names: I) -> Result<NodeId, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(parent, |current, name| self.get_or_create(current, name.as_ref()))
    }

    /// Inserts a new child. Fails when `name` is already taken or is not a
    /// single path component.
    pub fn set_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        child: Child,
    ) -> Result<NodeId, TreeError> {
        let name = name.into();
        self.validate_name(parent, &name)?;
        let parent_directory = self.directory(parent)?;
        let backup = parent_directory.backup;
        if parent_directory.children.contains_key(&name) {
            return DuplicateNameSnafu {
                path: self.intended_path(parent, &name)?,
            }
            .fail();
        }

        let id = match child {
            Child::Unset => self.insert(parent, Node::directory(name, Some(parent), backup))?,
            Child::File(handler) => self.insert(parent, Node::file(name, parent, handler))?,
            Child::Directory(subtree) => {
                ensure!(
                    !subtree.is_root(subtree.top()),
                    RootAsChildSnafu {
                        path: self.intended_path(parent, &name)?,
                    }
                );
                self.graft(parent, name, subtree)?
            }
        };

        self.notify_child_added(id)?;
        Ok(id)
    }

    /// Drops the child called `name` together with its whole subtree.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> Result<(), TreeError> {
        let parent_path = self.abspath(parent)?;
        let removed = self
            .directory_mut(parent)?
            .children
            .remove(name)
            .context(NoSuchChildSnafu {
                name,
                path: parent_path,
            })?;

        let mut pending = vec![removed];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(id.index()).and_then(Option::take) {
                self.free.push(id);
                if let NodeBody::Directory(directory) = node.body {
                    pending.extend(directory.children.values().copied());
                }
            }
        }

        debug!("Removed '{}' from {}", name, parent);
        Ok(())
    }

    /// Renames a child in place, keeping its position among its siblings.
    pub fn rename_child(&mut self, parent: NodeId, old: &str, new: &str) -> Result<(), TreeError> {
        let Some(id) = self.directory(parent)?.children.get(old).copied() else {
            return NoSuchChildSnafu {
                name: old,
                path: self.abspath(parent)?,
            }
            .fail();
        };
        if old == new {
            return Ok(());
        }
        self.validate_name(parent, new)?;
        if self.directory(parent)?.children.contains_key(new) {
            return DuplicateNameSnafu {
                path: self.intended_path(parent, new)?,
            }
            .fail();
        }

        let directory = self.directory_mut(parent)?;
        let renamed: LinkedHashMap<String, NodeId> = std::mem::take(&mut directory.children)
            .into_iter()
            .map(|(name, child)| {
                if child == id {
                    (new.to_string(), child)
                } else {
                    (name, child)
                }
            })
            .collect();
        directory.children = renamed;
        self.node_mut(id)?.name = new.to_string();

        debug!("Renamed '{}' to '{}' in {}", old, new, parent);
        Ok(())
    }

    /// Direct children of `id` in insertion order.
    pub fn children(&self, id: NodeId) -> Result<Vec<(&str, NodeId)>, TreeError> {
        Ok(self
            .directory(id)?
            .children
            .iter()
            .map(|(name, child)| (name.as_str(), *child))
            .collect())
    }

    pub fn child_files(&self, id: NodeId) -> Result<Vec<(&str, NodeId)>, TreeError> {
        self.children_of_kind(id, NodeKind::File)
    }

    pub fn child_directories(&self, id: NodeId) -> Result<Vec<(&str, NodeId)>, TreeError> {
        self.children_of_kind(id, NodeKind::Directory)
    }

    fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> Result<Vec<(&str, NodeId)>, TreeError> {
        let mut selected = Vec::new();
        for (name, child) in self.children(id)? {
            if self.node(child)?.kind() == kind {
                selected.push((name, child));
            }
        }
        Ok(selected)
    }

    /// Marks `id` as the root materialization must start from. Only the top
    /// can carry the marker, and only once.
    pub fn mark_as_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        let has_parent = self.node(id)?.parent.is_some();
        let already_root = self.is_root(id);
        if has_parent || already_root {
            return AlreadyHasParentSnafu {
                path: self.abspath(id)?,
                already_root,
            }
            .fail();
        }

        self.directory_mut(id)?.root = Some(RootState::Idle);
        debug!("Marked {} as root", id);
        Ok(())
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.root_state(id).is_some()
    }

    pub fn root_state(&self, id: NodeId) -> Option<RootState> {
        self.node(id)
            .ok()
            .and_then(Node::as_directory)
            .and_then(DirectoryNode::root_state)
    }

    pub(crate) fn set_root_state(&mut self, id: NodeId, state: RootState) -> Result<(), TreeError> {
        self.directory_mut(id)?.root = Some(state);
        Ok(())
    }

    /// A child name must be exactly one component of `abspath`.
    fn validate_name(&self, parent: NodeId, name: &str) -> Result<(), TreeError> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains(MAIN_SEPARATOR);
        if invalid {
            return InvalidNameSnafu {
                name,
                path: self.abspath(parent)?,
            }
            .fail();
        }
        Ok(())
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            if let Some(slot) = self.nodes.get_mut(id.index()) {
                *slot = Some(node);
                return id;
            }
        }
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    fn insert(&mut self, parent: NodeId, node: Node) -> Result<NodeId, TreeError> {
        self.directory(parent)?;
        let name = node.name.clone();
        let id = self.allocate(node);
        self.directory_mut(parent)?.children.insert(name, id);
        Ok(id)
    }

    /// Moves every node of `subtree` into this arena, its top becoming the
    /// child `name` of `parent`.
    fn graft(
        &mut self,
        parent: NodeId,
        name: String,
        mut subtree: DirectoryTree,
    ) -> Result<NodeId, TreeError> {
        let top = subtree.top();
        let adopted = self.adopt(&mut subtree.nodes, top, parent, name.clone());
        let id = adopted.context(UnknownNodeSnafu { id: top })?;
        self.directory_mut(parent)?.children.insert(name, id);
        Ok(id)
    }

    fn adopt(
        &mut self,
        source: &mut [Option<Node>],
        source_id: NodeId,
        parent: NodeId,
        name: String,
    ) -> Option<NodeId> {
        let node = source.get_mut(source_id.index())?.take()?;

        let id = match node.body {
            NodeBody::File(file) => self.allocate(Node::file(name, parent, file.handler)),
            NodeBody::Directory(directory) => {
                let id = self.allocate(Node::directory(name, Some(parent), directory.backup));

                let mut children = LinkedHashMap::with_capacity(directory.children.len());
                for (child_name, child_id) in directory.children {
                    if let Some(adopted) = self.adopt(source, child_id, id, child_name.clone()) {
                        children.insert(child_name, adopted);
                    }
                }

                if let Some(directory) = self
                    .nodes
                    .get_mut(id.index())
                    .and_then(Option::as_mut)
                    .and_then(Node::as_directory_mut)
                {
                    directory.children = children;
                }
                id
            }
        };

        Some(id)
    }

    fn notify_child_added(&self, id: NodeId) -> Result<(), TreeError> {
        let node = self.node(id)?;
        let path = self.abspath(id)?;
        let parent = node.parent.unwrap_or(id);
        self.observer.child_added(&ChildAdded {
            id,
            parent,
            name: &node.name,
            kind: node.kind(),
            path: &path,
        });
        Ok(())
    }
}

impl fmt::Debug for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryTree")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
