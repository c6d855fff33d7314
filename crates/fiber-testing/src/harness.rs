use fiber_core::{Element, FiberError, MemoryHost, NodeId, RenderRoot, TickOutcome};

use crate::budget::{UnitBudget, Unlimited};
use crate::recording::{HostOp, RecordingHost};

/// Headless harness owning a render root over a [`RecordingHost`].
///
/// Drives the work loop with deterministic deadlines and exposes the host
/// tree and the journal of host calls for assertions.
pub struct TestRoot {
    root: RenderRoot<RecordingHost>,
}

impl TestRoot {
    pub fn new() -> Self {
        let mut host = RecordingHost::new();
        let container = host.create_container();
        Self {
            root: RenderRoot::new(host, container),
        }
    }

    /// Starts a render of `element`. Nothing is processed until the next tick.
    pub fn render(&mut self, element: Element) {
        self.root.render(element);
    }

    /// Renders `element` and drives the loop until it is committed.
    pub fn mount(&mut self, element: Element) -> Result<(), FiberError> {
        self.render(element);
        self.settle().map(|_| ())
    }

    /// One tick that may process at most `units` fibers.
    pub fn tick_units(&mut self, units: usize) -> Result<TickOutcome, FiberError> {
        self.root.tick(&UnitBudget::new(units))
    }

    /// Ticks with an unlimited deadline until nothing is pending.
    /// Returns the number of ticks taken.
    pub fn settle(&mut self) -> Result<usize, FiberError> {
        let mut ticks = 0;
        while self.root.has_pending_work() {
            self.root.tick(&Unlimited)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Like [`settle`](Self::settle), but every tick may only process `units` fibers.
    pub fn settle_in_units(&mut self, units: usize) -> Result<usize, FiberError> {
        let mut ticks = 0;
        while self.root.has_pending_work() {
            self.tick_units(units)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    pub fn root(&self) -> &RenderRoot<RecordingHost> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RenderRoot<RecordingHost> {
        &mut self.root
    }

    pub fn container(&self) -> NodeId {
        self.root.container()
    }

    pub fn memory(&self) -> &MemoryHost {
        self.root.host().memory()
    }

    pub fn journal(&self) -> &[HostOp] {
        self.root.host().journal()
    }

    pub fn take_journal(&mut self) -> Vec<HostOp> {
        self.root.host_mut().take_journal()
    }

    /// Text content of the whole container.
    pub fn text(&self) -> String {
        self.memory().text_content(self.container())
    }

    pub fn dump(&self) -> String {
        self.memory().dump_tree(self.container())
    }

    /// First committed element with `tag`, in document order.
    pub fn find(&self, tag: &str) -> Option<NodeId> {
        self.memory().find_element(self.container(), tag)
    }

    /// Dispatches `category` to the first element with `tag`. Returns the
    /// number of listeners invoked, zero when no such element exists.
    pub fn dispatch(&self, tag: &str, category: &str) -> usize {
        self.find(tag)
            .map_or(0, |node| self.memory().dispatch_event(node, category))
    }

    pub fn click(&self, tag: &str) -> usize {
        self.dispatch(tag, "click")
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// [`TestRoot`].
pub fn run_test_root<R>(f: impl FnOnce(&mut TestRoot) -> R) -> R {
    let mut root = TestRoot::new();
    f(&mut root)
}
