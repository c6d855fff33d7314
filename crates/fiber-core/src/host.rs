//! The boundary between the reconciler and the host tree.

use std::fmt;

use crate::collections::map::HashMap;
use crate::element::{AttrValue, Attributes, EventHandler, HostEvent, NODE_VALUE_ATTRIBUTE};

pub type NodeId = usize;

/// What the host should allocate for a fiber.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostKind<'a> {
    Element(&'a str),
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Missing { id: NodeId },
    NotAChild { parent: NodeId, child: NodeId },
    UnsupportedAttribute { id: NodeId, name: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Missing { id } => write!(f, "host node {id} missing"),
            HostError::NotAChild { parent, child } => {
                write!(f, "host node {child} is not a child of {parent}")
            }
            HostError::UnsupportedAttribute { id, name } => {
                write!(f, "host node {id} cannot hold attribute `{name}`")
            }
        }
    }
}

impl std::error::Error for HostError {}

/// Host tree primitives consumed by the work loop and the commit engine.
///
/// Attribute names reaching `set_attribute`/`remove_attribute` never include
/// `children` or `on*` handler names; handlers go through the listener
/// methods with the lower-cased event category.
pub trait HostAdapter {
    fn create_node(&mut self, kind: HostKind<'_>) -> Result<NodeId, HostError>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &AttrValue)
        -> Result<(), HostError>;
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError>;
    fn add_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;
    fn remove_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryNodeKind {
    Container,
    Element(String),
    Text,
}

#[derive(Debug)]
pub struct MemoryNode {
    kind: MemoryNodeKind,
    attributes: Attributes,
    listeners: HashMap<String, Vec<EventHandler>>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl MemoryNode {
    fn new(kind: MemoryNodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::default(),
            listeners: HashMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn kind(&self) -> &MemoryNodeKind {
        &self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn listener_count(&self, category: &str) -> usize {
        self.listeners.get(category).map_or(0, Vec::len)
    }
}

/// In-memory host tree. Nodes are never freed; detached nodes stay addressable.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocates a detached container suitable as a render root.
    pub fn create_container(&mut self) -> NodeId {
        self.push(MemoryNodeKind::Container)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| &node.children)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.nodes.get(id)?.attributes.get(name)
    }

    /// Concatenated `nodeValue` of every text node below `id`, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut output = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            if node.kind == MemoryNodeKind::Text {
                if let Some(text) = node.attributes.get(NODE_VALUE_ATTRIBUTE).and_then(AttrValue::as_text) {
                    output.push_str(text);
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
        output
    }

    /// Invokes every listener registered on `target` for `category`.
    /// Returns the number of listeners called.
    pub fn dispatch_event(&self, target: NodeId, category: &str) -> usize {
        let handlers: Vec<EventHandler> = self
            .nodes
            .get(target)
            .and_then(|node| node.listeners.get(category))
            .cloned()
            .unwrap_or_default();
        let event = HostEvent {
            category: category.to_owned(),
            target,
        };
        for handler in &handlers {
            handler.call(&event);
        }
        handlers.len()
    }

    /// Finds the first node below `root` (pre-order) whose tag is `tag`.
    pub fn find_element(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.find_all_elements(root, tag).into_iter().next()
    }

    pub fn find_all_elements(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            if matches!(&node.kind, MemoryNodeKind::Element(name) if name == tag) {
                found.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    pub fn dump_tree(&self, root: NodeId) -> String {
        let mut output = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            let Some(node) = self.nodes.get(id) else {
                output.push_str(&format!("{indent}[{id}] (missing)\n"));
                continue;
            };
            match &node.kind {
                MemoryNodeKind::Container => output.push_str(&format!("{indent}[{id}] #root\n")),
                MemoryNodeKind::Text => {
                    let text = node
                        .attributes
                        .get(NODE_VALUE_ATTRIBUTE)
                        .and_then(AttrValue::as_text)
                        .unwrap_or_default();
                    output.push_str(&format!("{indent}[{id}] {text:?}\n"));
                }
                MemoryNodeKind::Element(tag) => {
                    output.push_str(&format!("{indent}[{id}] <{tag}>"));
                    for (name, value) in &node.attributes {
                        output.push_str(&format!(" {name}={value:?}"));
                    }
                    output.push('\n');
                }
            }
            for child in node.children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
        output
    }

    fn push(&mut self, kind: MemoryNodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(MemoryNode::new(kind));
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes.get_mut(id).ok_or(HostError::Missing { id })
    }

    fn detach(&mut self, child: NodeId) -> Result<(), HostError> {
        if let Some(parent) = self.node_mut(child)?.parent.take() {
            self.node_mut(parent)?.children.retain(|id| *id != child);
        }
        Ok(())
    }
}

impl HostAdapter for MemoryHost {
    fn create_node(&mut self, kind: HostKind<'_>) -> Result<NodeId, HostError> {
        let kind = match kind {
            HostKind::Element(tag) => MemoryNodeKind::Element(tag.to_owned()),
            HostKind::Text => MemoryNodeKind::Text,
        };
        Ok(self.push(kind))
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        if matches!(value, AttrValue::Handler(_) | AttrValue::Opaque(_)) {
            return Err(HostError::UnsupportedAttribute {
                id: node,
                name: name.to_owned(),
            });
        }
        self.node_mut(node)?
            .attributes
            .insert(name.to_owned(), value.clone());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        self.node_mut(node)?.attributes.shift_remove(name);
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        let listeners = self
            .node_mut(node)?
            .listeners
            .entry(category.to_owned())
            .or_default();
        if !listeners.iter().any(|existing| existing.ptr_eq(handler)) {
            listeners.push(handler.clone());
        }
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        node: NodeId,
        category: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        if let Some(listeners) = self.node_mut(node)?.listeners.get_mut(category) {
            listeners.retain(|existing| !existing.ptr_eq(handler));
        }
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.node_mut(parent)?;
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let children = &mut self.node_mut(parent)?.children;
        let index = children
            .iter()
            .position(|id| *id == child)
            .ok_or(HostError::NotAChild { parent, child })?;
        children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(())
    }
}
