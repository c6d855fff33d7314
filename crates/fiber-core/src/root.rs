use std::rc::Rc;

use crate::commit::CommitReport;
use crate::element::Element;
use crate::fiber::{EffectTag, Fiber, FiberId, FiberStore};
use crate::host::{HostAdapter, NodeId};
use crate::runtime::{Runtime, RuntimeHandle};
use crate::work_loop::{Phase, WorkLoopConfig};

/// One render root: the committed fiber tree, the render in flight, and the
/// host tree they are mirrored into.
///
/// Roots are independent; each carries its own arena, runtime and host.
pub struct RenderRoot<H: HostAdapter> {
    pub(crate) host: H,
    pub(crate) container: NodeId,
    pub(crate) fibers: FiberStore,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) wip_root: Option<FiberId>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    pub(crate) runtime: Runtime,
    pub(crate) config: WorkLoopConfig,
    pub(crate) last_commit: Option<CommitReport>,
}

impl<H: HostAdapter> RenderRoot<H> {
    pub fn new(host: H, container: NodeId) -> Self {
        Self::with_runtime(host, container, Runtime::default())
    }

    pub fn with_runtime(host: H, container: NodeId, runtime: Runtime) -> Self {
        Self {
            host,
            container,
            fibers: FiberStore::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            runtime,
            config: WorkLoopConfig::default(),
            last_commit: None,
        }
    }

    pub fn with_config(mut self, config: WorkLoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts a render of `element` into the container.
    ///
    /// The previous commit becomes the alternate of the new tree. A render
    /// already in flight is abandoned.
    pub fn render(&mut self, element: Element) {
        self.runtime.take_render_request();
        self.begin_render(Rc::new(vec![element]));
        self.runtime.schedule_idle_slot();
    }

    pub fn phase(&self) -> Phase {
        match (self.next_unit, self.wip_root) {
            (Some(_), _) => Phase::Rendering,
            (None, Some(_)) => Phase::CommitPending,
            (None, None) => Phase::Idle,
        }
    }

    /// True while a render is in flight or has been requested.
    pub fn has_pending_work(&self) -> bool {
        self.wip_root.is_some() || self.runtime.has_render_request()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn fibers(&self) -> &FiberStore {
        &self.fibers
    }

    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    pub fn work_in_progress_root(&self) -> Option<FiberId> {
        self.wip_root
    }

    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    pub fn deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    pub fn config(&self) -> &WorkLoopConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn last_commit(&self) -> Option<&CommitReport> {
        self.last_commit.as_ref()
    }

    /// Starts over from the committed tree, or from the render in flight when
    /// nothing has been committed yet.
    pub(crate) fn restart_from_current(&mut self) {
        let Some(source) = self.current_root.or(self.wip_root) else {
            log::debug!("render requested before anything was rendered; ignoring");
            return;
        };
        let children = Rc::clone(&self.fibers[source].children);
        self.begin_render(children);
    }

    fn begin_render(&mut self, children: Rc<Vec<Element>>) {
        if self.wip_root.is_some() {
            let freed = self.discard_work_in_progress();
            log::debug!("abandoned in-flight render ({freed} fibers)");
        }
        let root = self
            .fibers
            .insert(Fiber::root(self.container, children, self.current_root));
        self.wip_root = Some(root);
        self.next_unit = Some(root);
    }

    /// Frees the work-in-progress tree and forgets its pending deletions.
    /// The committed tree is untouched. Returns the number of freed fibers.
    pub(crate) fn discard_work_in_progress(&mut self) -> usize {
        self.next_unit = None;
        let freed = self
            .wip_root
            .take()
            .map_or(0, |wip| self.fibers.free_subtree(wip));
        for id in self.deletions.drain(..) {
            if let Some(fiber) = self.fibers.get_mut(id) {
                fiber.effect = EffectTag::None;
            }
        }
        freed
    }
}
