//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform traits
//! defined in `fiber-core`, plus a small driver that feeds a
//! [`fiber_core::RenderRoot`] wall-clock idle slots. Applications construct a
//! [`StdRuntime`], hand its [`Runtime`] to the root, and call
//! [`StdRuntime::run_tick`] whenever the scheduler asks for a slot.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use fiber_core::{
    Clock, Deadline, FiberError, HostAdapter, RenderRoot, Runtime, RuntimeHandle,
    RuntimeScheduler, TickOutcome,
};

/// Budget of an idle slot when none is configured, roughly one frame at 60 Hz.
pub const DEFAULT_SLOT_BUDGET: Duration = Duration::from_millis(16);

type Waker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records idle slot requests and wakes the driving loop.
pub struct StdScheduler {
    idle_slot_requested: AtomicBool,
    idle_waker: RwLock<Option<Waker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            idle_slot_requested: AtomicBool::new(false),
            idle_waker: RwLock::new(None),
        }
    }

    /// Returns whether an idle slot has been requested since the last call.
    pub fn take_idle_slot_request(&self) -> bool {
        self.idle_slot_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker invoked whenever a new idle slot is requested.
    pub fn set_idle_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .idle_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    /// Clears any registered idle waker.
    pub fn clear_idle_waker(&self) {
        *self
            .idle_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn wake(&self) {
        let waker = self
            .idle_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "idle_slot_requested",
                &self.idle_slot_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_idle_slot(&self) {
        self.idle_slot_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Default, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed(&self, since: Self::Instant) -> Duration {
        since.elapsed()
    }
}

/// Deadline measured against the wall clock from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct StdDeadline {
    started: Instant,
    budget: Duration,
}

impl StdDeadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl Deadline for StdDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}

/// Convenience container bundling the standard scheduler, clock and the
/// runtime shared with a render root.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    clock: Arc<StdClock>,
    runtime: Runtime,
    slot_budget: Duration,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self::with_slot_budget(DEFAULT_SLOT_BUDGET)
    }

    /// Creates a runtime whose idle slots last `slot_budget`.
    pub fn with_slot_budget(slot_budget: Duration) -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self {
            scheduler,
            clock: Arc::new(StdClock),
            runtime,
            slot_budget,
        }
    }

    /// Returns the [`fiber_core::Runtime`] to pass to
    /// [`RenderRoot::with_runtime`].
    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn clock(&self) -> Arc<StdClock> {
        Arc::clone(&self.clock)
    }

    pub fn slot_budget(&self) -> Duration {
        self.slot_budget
    }

    /// Returns whether an idle slot was requested since the last poll.
    pub fn take_idle_slot_request(&self) -> bool {
        self.scheduler.take_idle_slot_request()
    }

    /// Registers a waker to be called when the runtime requests an idle slot.
    pub fn set_idle_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_idle_waker(waker);
    }

    pub fn clear_idle_waker(&self) {
        self.scheduler.clear_idle_waker();
    }

    /// A fresh deadline covering one idle slot.
    pub fn deadline(&self) -> StdDeadline {
        StdDeadline::new(self.slot_budget)
    }

    /// Runs one idle slot against `root`.
    ///
    /// If work remains afterwards another slot is requested, so a driver
    /// that only ticks on request never stalls a yielded render.
    pub fn run_tick<H: HostAdapter>(
        &self,
        root: &mut RenderRoot<H>,
    ) -> Result<TickOutcome, FiberError> {
        self.scheduler.take_idle_slot_request();
        let started = self.clock.now();
        let outcome = root.tick(&self.deadline()).map_err(|err| {
            log::error!("render tick failed: {err}");
            err
        })?;
        log::trace!(
            "idle slot used {:?} of {:?}",
            self.clock.elapsed(started),
            self.slot_budget
        );
        if root.has_pending_work() {
            self.scheduler.schedule_idle_slot();
        }
        Ok(outcome)
    }

    /// Ticks until nothing is pending. Returns the number of ticks taken.
    pub fn run_until_idle<H: HostAdapter>(
        &self,
        root: &mut RenderRoot<H>,
    ) -> Result<usize, FiberError> {
        let mut ticks = 0;
        while root.has_pending_work() {
            self.run_tick(root)?;
            ticks += 1;
        }
        Ok(ticks)
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("clock", &self.clock)
            .field("slot_budget", &self.slot_budget)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}
