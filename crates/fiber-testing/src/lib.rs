//! Testing utilities and harness for fiber-rs

pub mod budget;
pub mod harness;
pub mod recording;

pub use budget::{UnitBudget, Unlimited};
pub use harness::{run_test_root, TestRoot};
pub use recording::{HostOp, RecordingHost};

pub mod prelude {
    pub use crate::budget::*;
    pub use crate::harness::*;
    pub use crate::recording::*;
}
