//! Commit phase: one synchronous pass that mirrors the finished work tree into
//! the host.
//!
//! Deletions run first, so a replaced node always leaves its host parent
//! before its successor is appended. The new tree is then walked in pre-order;
//! a placed parent is attached before its children are appended to it.

use std::rc::Rc;

use crate::element::{event_category, is_event_attribute, is_property_attribute, AttrValue, Attributes};
use crate::fiber::{EffectTag, FiberId};
use crate::host::{HostAdapter, NodeId};
use crate::root::RenderRoot;
use crate::FiberError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectRecord {
    pub fiber: FiberId,
    pub label: String,
    pub effect: EffectTag,
}

/// What a commit did, in the order it did it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    effects: Vec<EffectRecord>,
    attribute_ops: usize,
    freed_fibers: usize,
}

impl CommitReport {
    pub fn effects(&self) -> &[EffectRecord] {
        &self.effects
    }

    pub fn count(&self, effect: EffectTag) -> usize {
        self.effects
            .iter()
            .filter(|record| record.effect == effect)
            .count()
    }

    /// Labels of the fibers that carried `effect`, in commit order.
    pub fn labels(&self, effect: EffectTag) -> Vec<&str> {
        self.effects
            .iter()
            .filter(|record| record.effect == effect)
            .map(|record| record.label.as_str())
            .collect()
    }

    /// Host attribute and listener calls issued by updates.
    pub fn attribute_ops(&self) -> usize {
        self.attribute_ops
    }

    pub fn freed_fibers(&self) -> usize {
        self.freed_fibers
    }
}

impl<H: HostAdapter> RenderRoot<H> {
    /// Applies the finished work tree. On failure the work-in-progress tree
    /// is dropped and the committed tree is left as it was; the host may be
    /// partially mutated and needs a fresh `render` to be brought back in line.
    pub(crate) fn commit_root(&mut self) -> Result<CommitReport, FiberError> {
        let Some(wip) = self.wip_root else {
            return Ok(CommitReport::default());
        };
        self.apply_commit(wip).map_err(|err| {
            let freed = self.discard_work_in_progress();
            log::error!("commit failed, dropped work-in-progress tree ({freed} fibers): {err}");
            err
        })
    }

    fn apply_commit(&mut self, wip: FiberId) -> Result<CommitReport, FiberError> {
        let mut report = CommitReport::default();
        for index in 0..self.deletions.len() {
            let id = self.deletions[index];
            self.commit_deletion(id)?;
            report.effects.push(self.record(id));
        }
        self.deletions.clear();

        let mut stack: Vec<FiberId> = self.fibers[wip].child.into_iter().collect();
        while let Some(id) = stack.pop() {
            let fiber = &self.fibers[id];
            let effect = fiber.effect;
            let host_node = fiber.host_node;
            if let Some(sibling) = fiber.sibling {
                stack.push(sibling);
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }

            match (effect, host_node) {
                (EffectTag::Placement, Some(node)) => {
                    let parent = self.host_parent(id)?;
                    self.host.append_child(parent, node)?;
                }
                (EffectTag::Update, Some(node)) => {
                    let previous = self.fibers[id]
                        .alternate
                        .and_then(|alternate| self.fibers.get(alternate))
                        .map(|alternate| Rc::clone(&alternate.attributes))
                        .unwrap_or_default();
                    let next = Rc::clone(&self.fibers[id].attributes);
                    report.attribute_ops +=
                        apply_attribute_diff(&mut self.host, node, &previous, &next);
                }
                _ => {}
            }
            if effect != EffectTag::None {
                report.effects.push(self.record(id));
            }
            self.fibers[id].alternate = None;
        }

        if let Some(previous) = self.current_root.replace(wip) {
            report.freed_fibers = self.fibers.free_subtree(previous);
        }
        self.fibers[wip].alternate = None;
        self.wip_root = None;
        log::debug!(
            "committed {} effects ({} placements, {} updates, {} deletions)",
            report.effects.len(),
            report.count(EffectTag::Placement),
            report.count(EffectTag::Update),
            report.count(EffectTag::Deletion),
        );
        Ok(report)
    }

    /// Detaches the topmost host nodes of `id`'s subtree. Fibers without a
    /// host node are descended through, all of their children included.
    fn commit_deletion(&mut self, id: FiberId) -> Result<(), FiberError> {
        let parent = self.host_parent(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.fibers[current].host_node {
                self.host.remove_child(parent, node)?;
                continue;
            }
            stack.extend(self.fibers.children(current).into_iter().rev());
        }
        Ok(())
    }

    /// Host node of the nearest ancestor that has one. The root always carries
    /// the container, so running out of ancestors means the tree is broken.
    fn host_parent(&self, id: FiberId) -> Result<NodeId, FiberError> {
        let mut cursor = self.fibers.get(id).and_then(|fiber| fiber.parent);
        while let Some(ancestor) = cursor {
            let fiber = self
                .fibers
                .get(ancestor)
                .ok_or(FiberError::MalformedTree { fiber: id })?;
            if let Some(node) = fiber.host_node {
                return Ok(node);
            }
            cursor = fiber.parent;
        }
        Err(FiberError::MalformedTree { fiber: id })
    }

    fn record(&self, id: FiberId) -> EffectRecord {
        let fiber = &self.fibers[id];
        EffectRecord {
            fiber: id,
            label: fiber.kind.label().to_owned(),
            effect: fiber.effect,
        }
    }
}

/// Brings `node` from `previous` to `next` attributes and returns the number
/// of host calls issued.
///
/// Stale or changed listeners are removed first, then vanished attributes,
/// then new or changed attributes are set and new or changed listeners added.
/// Host failures here are logged and skipped; they never abort a commit.
pub(crate) fn apply_attribute_diff<H: HostAdapter + ?Sized>(
    host: &mut H,
    node: NodeId,
    previous: &Attributes,
    next: &Attributes,
) -> usize {
    let changed = |name: &str| previous.get(name) != next.get(name);
    let mut ops = 0;

    for (name, value) in previous {
        if !is_event_attribute(name) || !changed(name) {
            continue;
        }
        if let AttrValue::Handler(handler) = value {
            ops += 1;
            if let Err(err) = host.remove_event_listener(node, &event_category(name), handler) {
                log::warn!("failed to remove `{name}` listener: {err}");
            }
        }
    }

    for name in previous.keys() {
        if is_property_attribute(name) && !next.contains_key(name) {
            ops += 1;
            if let Err(err) = host.remove_attribute(node, name) {
                log::warn!("failed to remove attribute `{name}`: {err}");
            }
        }
    }

    for (name, value) in next {
        if is_property_attribute(name) && changed(name) {
            ops += 1;
            if let Err(err) = host.set_attribute(node, name, value) {
                log::warn!("failed to set attribute `{name}`: {err}");
            }
        }
    }

    for (name, value) in next {
        if !is_event_attribute(name) || !changed(name) {
            continue;
        }
        match value {
            AttrValue::Handler(handler) => {
                ops += 1;
                if let Err(err) = host.add_event_listener(node, &event_category(name), handler) {
                    log::warn!("failed to add `{name}` listener: {err}");
                }
            }
            _ => log::warn!("`{name}` is not an event handler; ignored"),
        }
    }

    ops
}

#[cfg(test)]
#[path = "tests/commit_tests.rs"]
mod tests;
