//! Per-fiber local state.
//!
//! A component fiber owns an ordered list of hook cells. On every render the
//! N-th `use_state` call reads the N-th cell of the fiber's alternate, folds
//! that cell's pending updates into its state, and appends a fresh cell to the
//! new fiber. Identity is the call index and nothing else.
//!
//! Pending queues are read, never drained, during render. A render that is
//! abandoned and restarted therefore folds the same updates again from the
//! same committed state, and the cells of the abandoned walk are simply
//! dropped.

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::runtime::RuntimeHandle;

type Update<T> = Rc<dyn Fn(&T) -> T>;

pub(crate) struct HookCell<T> {
    state: RefCell<T>,
    pending: RefCell<Vec<Update<T>>>,
}

impl<T: Clone> HookCell<T> {
    fn new(state: T) -> Self {
        Self {
            state: RefCell::new(state),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// State with every queued update applied in enqueue order.
    fn resolve(&self) -> T {
        let updates: Vec<Update<T>> = self.pending.borrow().clone();
        let mut state = self.state.borrow().clone();
        for update in updates {
            state = update(&state);
        }
        state
    }
}

/// Hook context handed to a component while it renders.
pub struct RenderScope<'a> {
    previous: &'a [Rc<dyn Any>],
    hooks: Vec<Rc<dyn Any>>,
    runtime: RuntimeHandle,
}

impl<'a> RenderScope<'a> {
    pub(crate) fn new(previous: &'a [Rc<dyn Any>], runtime: RuntimeHandle) -> Self {
        Self {
            previous,
            hooks: Vec::with_capacity(previous.len()),
            runtime,
        }
    }

    /// Local state for the next hook index of this component.
    ///
    /// `initial` is only used the first time this index renders at this tree
    /// position. Must be called unconditionally and in the same order on
    /// every render.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, SetState<T>) {
        let index = self.hooks.len();
        let state = match self.previous_hook::<T>(index) {
            Some(previous) => previous.resolve(),
            None => initial,
        };
        let cell = Rc::new(HookCell::new(state.clone()));
        let setter = SetState {
            hook: Rc::downgrade(&cell),
            runtime: self.runtime.clone(),
        };
        self.hooks.push(cell);
        (state, setter)
    }

    /// Number of hooks requested so far in this render.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub(crate) fn into_hooks(self) -> Vec<Rc<dyn Any>> {
        self.hooks
    }

    fn previous_hook<T: 'static>(&self, index: usize) -> Option<Rc<HookCell<T>>> {
        let previous = Rc::clone(self.previous.get(index)?);
        match previous.downcast::<HookCell<T>>() {
            Ok(cell) => Some(cell),
            Err(_) => {
                log::warn!(
                    "hook {index} changed type to {}; hooks must be called in the same order every render",
                    type_name::<T>()
                );
                None
            }
        }
    }
}

/// Enqueues updates for one hook cell and requests a render.
pub struct SetState<T> {
    hook: Weak<HookCell<T>>,
    runtime: RuntimeHandle,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            hook: Weak::clone(&self.hook),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Clone + 'static> SetState<T> {
    /// Queues `update` and schedules a render from the committed tree.
    pub fn update(&self, update: impl Fn(&T) -> T + 'static) {
        match self.hook.upgrade() {
            Some(hook) => hook.pending.borrow_mut().push(Rc::new(update)),
            None => log::debug!("state update dropped: hook no longer mounted"),
        }
        self.runtime.request_render();
    }

    /// Queues a constant update.
    pub fn set(&self, value: T) {
        self.update(move |_| value.clone());
    }

    /// False once the fiber owning the hook has been freed.
    pub fn is_mounted(&self) -> bool {
        self.hook.strong_count() > 0
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("mounted", &(self.hook.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod tests;
