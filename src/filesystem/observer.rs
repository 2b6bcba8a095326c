use std::path::Path;

use tracing::debug;

use crate::filesystem::{NodeId, NodeKind};

/// Emitted after `set_child` inserted a node.
#[derive(Debug, Clone, Copy)]
pub struct ChildAdded<'a> {
    pub id: NodeId,
    pub parent: NodeId,
    pub name: &'a str,
    pub kind: NodeKind,
    pub path: &'a Path,
}

/// Receives tree notifications. Delivery is fire-and-forget: nothing an
/// observer does can fail the operation that notified it.
pub trait TreeObserver {
    fn child_added(&self, event: &ChildAdded<'_>);
}

impl<F> TreeObserver for F
where
    F: Fn(&ChildAdded<'_>),
{
    fn child_added(&self, event: &ChildAdded<'_>) {
        self(event)
    }
}

/// Default observer, reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl TreeObserver for LoggingObserver {
    fn child_added(&self, event: &ChildAdded<'_>) {
        debug!(
            "Added {} '{}' ({}) at {}",
            event.kind,
            event.name,
            event.id,
            event.path.display()
        );
    }
}
