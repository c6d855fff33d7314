//! Deterministic deadlines for driving the work loop in tests.

use std::cell::Cell;
use std::time::Duration;

use fiber_core::Deadline;

/// Allows exactly `units` fibers before asking the loop to yield.
///
/// The work loop checks the deadline once after every fiber, so the first
/// `units - 1` checks report plenty of time and every later check reports
/// none. Use a fresh budget for every tick.
#[derive(Debug)]
pub struct UnitBudget {
    units: usize,
    checks: Cell<usize>,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self {
            units: units.max(1),
            checks: Cell::new(0),
        }
    }

    /// Number of times the loop has consulted this budget.
    pub fn checks(&self) -> usize {
        self.checks.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let checks = self.checks.get() + 1;
        self.checks.set(checks);
        if checks < self.units {
            Duration::MAX
        } else {
            Duration::ZERO
        }
    }
}

/// A deadline that never runs out.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl Deadline for Unlimited {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}
