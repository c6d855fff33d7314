use std::fmt;

use fiber_core::{AttrValue, EventHandler, HostAdapter, HostError, HostKind, MemoryHost, NodeId};

/// One host call, as seen by [`RecordingHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    CreateNode { node: NodeId, kind: String },
    SetAttribute { node: NodeId, name: String },
    RemoveAttribute { node: NodeId, name: String },
    AddListener { node: NodeId, category: String },
    RemoveListener { node: NodeId, category: String },
    AppendChild { parent: NodeId, child: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
}

impl HostOp {
    /// True for calls that change the shape of the host tree.
    pub fn is_structural(&self) -> bool {
        matches!(self, HostOp::AppendChild { .. } | HostOp::RemoveChild { .. })
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOp::CreateNode { node, kind } => write!(f, "create {kind} #{node}"),
            HostOp::SetAttribute { node, name } => write!(f, "set #{node}.{name}"),
            HostOp::RemoveAttribute { node, name } => write!(f, "unset #{node}.{name}"),
            HostOp::AddListener { node, category } => write!(f, "listen #{node} {category}"),
            HostOp::RemoveListener { node, category } => write!(f, "unlisten #{node} {category}"),
            HostOp::AppendChild { parent, child } => write!(f, "append #{child} to #{parent}"),
            HostOp::RemoveChild { parent, child } => write!(f, "remove #{child} from #{parent}"),
        }
    }
}

/// [`MemoryHost`] that journals every successful host call.
#[derive(Debug, Default)]
pub struct RecordingHost {
    memory: MemoryHost,
    journal: Vec<HostOp>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a container. Not journaled.
    pub fn create_container(&mut self) -> NodeId {
        self.memory.create_container()
    }

    pub fn memory(&self) -> &MemoryHost {
        &self.memory
    }

    pub fn journal(&self) -> &[HostOp] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.journal)
    }

    /// Structural calls only, in order.
    pub fn structural_ops(&self) -> Vec<&HostOp> {
        self.journal.iter().filter(|op| op.is_structural()).collect()
    }

    fn record<T>(
        &mut self,
        result: Result<T, HostError>,
        op: impl FnOnce(&T) -> HostOp,
    ) -> Result<T, HostError> {
        if let Ok(value) = &result {
            self.journal.push(op(value));
        }
        result
    }
}

impl HostAdapter for RecordingHost {
    fn create_node(&mut self, kind: HostKind<'_>) -> Result<NodeId, HostError> {
        let label = match kind {
            HostKind::Element(tag) => tag.to_owned(),
            HostKind::Text => "#text".to_owned(),
        };
        let result = self.memory.create_node(kind);
        self.record(result, |node| HostOp::CreateNode {
            node: *node,
            kind: label,
        })
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        let result = self.memory.set_attribute(node, name, value);
        self.record(result, |_| HostOp::SetAttribute {
            node,
            name: name.to_owned(),
        })
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        let result = self.memory.remove_attribute(node, name);
        self.record(result, |_| HostOp::RemoveAttribute {
            node,
            name: name.to_owned(),
        })
    }

    fn add_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        let result = self.memory.add_event_listener(node, category, handler);
        self.record(result, |_| HostOp::AddListener {
            node,
            category: category.to_owned(),
        })
    }

    fn remove_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        let result = self.memory.remove_event_listener(node, category, handler);
        self.record(result, |_| HostOp::RemoveListener {
            node,
            category: category.to_owned(),
        })
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let result = self.memory.append_child(parent, child);
        self.record(result, |_| HostOp::AppendChild { parent, child })
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let result = self.memory.remove_child(parent, child);
        self.record(result, |_| HostOp::RemoveChild { parent, child })
    }
}
