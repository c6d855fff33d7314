use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::platform::RuntimeScheduler;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    render_requested: Cell<bool>,
    requests: Cell<u64>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            render_requested: Cell::new(false),
            requests: Cell::new(0),
        }
    }

    fn request_render(&self) {
        self.render_requested.set(true);
        self.requests.set(self.requests.get() + 1);
        self.scheduler.schedule_idle_slot();
    }
}

/// Signal hub shared between a render root and the state handles it hands out.
///
/// State handles only hold a [`RuntimeHandle`]; requesting a render records
/// the request and asks the scheduler for an idle slot. The render root picks
/// the request up at the next fiber boundary.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn has_render_request(&self) -> bool {
        self.inner.render_requested.get()
    }

    /// Clears and returns the pending render request.
    pub fn take_render_request(&self) -> bool {
        self.inner.render_requested.replace(false)
    }

    /// Total number of render requests seen by this runtime.
    pub fn request_count(&self) -> u64 {
        self.inner.requests.get()
    }

    pub(crate) fn schedule_idle_slot(&self) {
        self.inner.scheduler.schedule_idle_slot();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_idle_slot(&self) {}
}

#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    /// Requests a new render from the current tree. A no-op once the runtime is gone.
    pub fn request_render(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.request_render();
        }
    }

    pub fn has_render_request(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.render_requested.get())
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}
