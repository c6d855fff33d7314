//! Platform abstraction traits for the fiber runtime.
//!
//! The work loop never reads a clock or registers callbacks on its own. The
//! host hands it a [`Deadline`] for every idle slot and is asked, through a
//! [`RuntimeScheduler`], to provide another slot whenever new work appears.

use std::time::Duration;

/// Requests idle slots from the host.
///
/// Implementations must be safe to poke from event handlers that run between
/// ticks; they only record that work is waiting and wake the driver.
pub trait RuntimeScheduler: Send + Sync {
    /// Ask the host to invoke the work loop in an upcoming idle slot.
    fn schedule_idle_slot(&self);
}

/// Budget handed to a single work loop tick.
pub trait Deadline {
    /// Time left in the current idle slot.
    fn time_remaining(&self) -> Duration;
}

impl<F> Deadline for F
where
    F: Fn() -> Duration,
{
    fn time_remaining(&self) -> Duration {
        self()
    }
}

/// Provides timing information for deadline implementations.
pub trait Clock: Send + Sync {
    /// Instant type produced by this clock implementation.
    type Instant: Copy + Send + Sync;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the time elapsed since `since`.
    fn elapsed(&self, since: Self::Instant) -> Duration;
}
