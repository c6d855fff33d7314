//! Fiber records and the arena that owns them.
//!
//! Links between fibers are [`FiberId`]s, never references. An id carries the
//! generation of its slot, so an `alternate` pointing into a generation that
//! has been freed resolves to `None` instead of to whatever reused the slot.

use std::any::Any;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::element::{Attributes, ComponentRef, Element, ElementKind};
use crate::host::NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FiberId {
    index: u32,
    generation: u32,
}

impl FiberId {
    fn slot(self) -> usize {
        self.index as usize
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectTag {
    #[default]
    None,
    Placement,
    Update,
    Deletion,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FiberKind {
    /// Synthetic root; its host node is the container.
    Root,
    Host(Rc<str>),
    Text,
    Component(ComponentRef),
}

impl FiberKind {
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match (self, kind) {
            (FiberKind::Host(a), ElementKind::Host(b)) => a == b,
            (FiberKind::Text, ElementKind::Text) => true,
            (FiberKind::Component(a), ElementKind::Component(b)) => a == b,
            _ => false,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FiberKind::Root => "#root",
            FiberKind::Host(tag) => tag,
            FiberKind::Text => "#text",
            FiberKind::Component(component) => component.name(),
        }
    }
}

impl From<&ElementKind> for FiberKind {
    fn from(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Host(tag) => FiberKind::Host(Rc::clone(tag)),
            ElementKind::Text => FiberKind::Text,
            ElementKind::Component(component) => FiberKind::Component(component.clone()),
        }
    }
}

#[derive(Debug)]
pub struct Fiber {
    pub(crate) kind: FiberKind,
    pub(crate) attributes: Rc<Attributes>,
    pub(crate) children: Rc<Vec<Element>>,
    pub(crate) host_node: Option<NodeId>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: EffectTag,
    pub(crate) hooks: Vec<Rc<dyn Any>>,
}

impl Fiber {
    pub(crate) fn root(
        container: NodeId,
        children: Rc<Vec<Element>>,
        alternate: Option<FiberId>,
    ) -> Self {
        Self {
            kind: FiberKind::Root,
            attributes: Rc::new(Attributes::default()),
            children,
            host_node: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: EffectTag::None,
            hooks: Vec::new(),
        }
    }

    /// Fresh fiber for an element with no reusable predecessor.
    pub(crate) fn placement(element: &Element, parent: FiberId) -> Self {
        Self {
            kind: FiberKind::from(element.kind()),
            attributes: element.shared_attributes(),
            children: element.shared_children(),
            host_node: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::Placement,
            hooks: Vec::new(),
        }
    }

    /// Fiber reusing `old`'s host node with the element's new attributes.
    pub(crate) fn update(element: &Element, old_id: FiberId, old: &Fiber, parent: FiberId) -> Self {
        Self {
            kind: old.kind.clone(),
            attributes: element.shared_attributes(),
            children: element.shared_children(),
            host_node: old.host_node,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: Some(old_id),
            effect: EffectTag::Update,
            hooks: Vec::new(),
        }
    }

    pub fn kind(&self) -> &FiberKind {
        &self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn host_node(&self) -> Option<NodeId> {
        self.host_node
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn child(&self) -> Option<FiberId> {
        self.child
    }

    pub fn sibling(&self) -> Option<FiberId> {
        self.sibling
    }

    pub fn alternate(&self) -> Option<FiberId> {
        self.alternate
    }

    pub fn effect(&self) -> EffectTag {
        self.effect
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    fiber: Option<Fiber>,
}

/// Generational arena holding every live fiber of a render root.
#[derive(Debug, Default)]
pub struct FiberStore {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

/// Index of the slot appended after `len` existing ones.
///
/// # Panics
///
/// When the store already holds as many slots as a `u32` index can address.
fn next_slot_index(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(index) => index,
        Err(_) => panic!("fiber store full: {len} slots exceed the u32 index space"),
    }
}

impl FiberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, fiber: Fiber) -> FiberId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.fiber = Some(fiber);
            return FiberId {
                index,
                generation: slot.generation,
            };
        }
        let index = next_slot_index(self.slots.len());
        self.slots.push(Slot {
            generation: 1,
            fiber: Some(fiber),
        });
        FiberId {
            index,
            generation: 1,
        }
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.fiber.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.fiber.as_mut())
    }

    pub fn is_alive(&self, id: FiberId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn remove(&mut self, id: FiberId) -> Option<Fiber> {
        let slot = self
            .slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation)?;
        let fiber = slot.fiber.take()?;
        self.free_list.push(id.index);
        Some(fiber)
    }

    /// Child fibers of `id`, in sibling order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut children = Vec::new();
        let mut cursor = self.get(id).and_then(|fiber| fiber.child);
        while let Some(child) = cursor {
            children.push(child);
            cursor = self.get(child).and_then(|fiber| fiber.sibling);
        }
        children
    }

    /// `id` and all of its descendants in pre-order. Siblings of `id` are not included.
    pub fn subtree(&self, id: FiberId) -> Vec<FiberId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.is_alive(current) {
                continue;
            }
            order.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        order
    }

    /// Next unit of work after `id` in pre-order: the first child, else the
    /// nearest next sibling walking up through the ancestors.
    pub fn next_in_preorder(&self, id: FiberId) -> Option<FiberId> {
        let fiber = self.get(id)?;
        if let Some(child) = fiber.child {
            return Some(child);
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let fiber = self.get(current)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            cursor = fiber.parent;
        }
        None
    }

    /// Frees `id` and everything below it. Returns the number of fibers freed.
    pub(crate) fn free_subtree(&mut self, id: FiberId) -> usize {
        let ids = self.subtree(id);
        for fiber in &ids {
            self.remove(*fiber);
        }
        ids.len()
    }
}

impl Index<FiberId> for FiberStore {
    type Output = Fiber;

    fn index(&self, id: FiberId) -> &Fiber {
        match self.get(id) {
            Some(fiber) => fiber,
            None => panic!("stale fiber id {id:?}"),
        }
    }
}

impl IndexMut<FiberId> for FiberStore {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber {
        match self.get_mut(id) {
            Some(fiber) => fiber,
            None => panic!("stale fiber id {id:?}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/fiber_tests.rs"]
mod tests;
