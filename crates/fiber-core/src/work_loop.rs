//! Cooperative, time-sliced render phase.
//!
//! [`RenderRoot::tick`] is a resumable step function. It processes whole
//! fibers in pre-order until the deadline runs low, then returns; all of its
//! progress lives in the root's `next_unit` and `wip_root` fields. When the
//! walk finishes, the tree is committed before the tick returns.

use std::rc::Rc;
use std::time::Duration;

use crate::commit::{apply_attribute_diff, CommitReport};
use crate::element::Attributes;
use crate::fiber::{FiberId, FiberKind};
use crate::hooks::RenderScope;
use crate::host::{HostAdapter, HostKind};
use crate::platform::Deadline;
use crate::reconcile::reconcile_children;
use crate::root::RenderRoot;
use crate::FiberError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkLoopConfig {
    /// The loop yields once `time_remaining()` drops below this.
    pub yield_threshold: Duration,
}

impl Default for WorkLoopConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Rendering,
    CommitPending,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Nothing to do.
    Idle,
    /// The deadline ran low with fibers left to process.
    Yielded { processed: usize },
    /// The render completed and was committed during this tick.
    Committed {
        processed: usize,
        report: CommitReport,
    },
}

impl<H: HostAdapter> RenderRoot<H> {
    /// Runs one idle slot worth of work.
    ///
    /// At least one fiber is processed if any is pending, and a fiber is
    /// never left half-processed. Render requests raised by state updates are
    /// applied between fibers by restarting from the committed tree.
    pub fn tick(&mut self, deadline: &dyn Deadline) -> Result<TickOutcome, FiberError> {
        if self.runtime.take_render_request() {
            self.restart_from_current();
        }

        let mut processed = 0;
        let mut should_yield = false;
        while let Some(unit) = self.next_unit {
            if should_yield {
                break;
            }
            self.next_unit = self.perform_unit_of_work(unit)?;
            processed += 1;
            if self.runtime.take_render_request() {
                log::debug!("render requested mid-walk; restarting from committed tree");
                self.restart_from_current();
            }
            should_yield = deadline.time_remaining() < self.config.yield_threshold;
        }

        if self.next_unit.is_none() && self.wip_root.is_some() {
            let report = self.commit_root()?;
            self.last_commit = Some(report.clone());
            return Ok(TickOutcome::Committed { processed, report });
        }
        if self.next_unit.is_some() {
            log::trace!("yielding after {processed} fibers");
            return Ok(TickOutcome::Yielded { processed });
        }
        Ok(TickOutcome::Idle)
    }

    /// Renders one fiber and returns the next unit in pre-order.
    pub(crate) fn perform_unit_of_work(
        &mut self,
        id: FiberId,
    ) -> Result<Option<FiberId>, FiberError> {
        let kind = self.fibers[id].kind.clone();
        log::trace!("perform unit of work {id:?} ({})", kind.label());
        let elements = match &kind {
            FiberKind::Component(component) => {
                let previous = self.fibers[id]
                    .alternate
                    .and_then(|alternate| self.fibers.get(alternate))
                    .map(|alternate| alternate.hooks.clone())
                    .unwrap_or_default();
                let attributes = Rc::clone(&self.fibers[id].attributes);
                let mut scope = RenderScope::new(&previous, self.runtime.handle());
                let child = component.render(&mut scope, &attributes);
                self.fibers[id].hooks = scope.into_hooks();
                Rc::new(vec![child])
            }
            FiberKind::Root => Rc::clone(&self.fibers[id].children),
            FiberKind::Host(_) | FiberKind::Text => {
                if self.fibers[id].host_node.is_none() {
                    self.create_host_node(id)?;
                }
                Rc::clone(&self.fibers[id].children)
            }
        };
        reconcile_children(&mut self.fibers, &mut self.deletions, id, &elements);
        Ok(self.fibers.next_in_preorder(id))
    }

    fn create_host_node(&mut self, id: FiberId) -> Result<(), FiberError> {
        let fiber = &self.fibers[id];
        let kind = match &fiber.kind {
            FiberKind::Host(tag) => HostKind::Element(tag),
            FiberKind::Text => HostKind::Text,
            FiberKind::Root | FiberKind::Component(_) => return Ok(()),
        };
        let node = self.host.create_node(kind)?;
        let attributes = Rc::clone(&fiber.attributes);
        apply_attribute_diff(&mut self.host, node, &Attributes::default(), &attributes);
        self.fibers[id].host_node = Some(node);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/work_loop_tests.rs"]
mod tests;
