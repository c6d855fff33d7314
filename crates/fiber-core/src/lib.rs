#![doc = r"Fiber reconciler, cooperative work loop and hook store for fiber-rs."]
//!
//! A [`RenderRoot`] turns [`Element`] descriptions into host mutations in two
//! phases. The render phase walks a fresh work-in-progress fiber tree one
//! fiber per step, diffing each fiber's children against the previous commit
//! by position; it can stop between any two fibers when the host's
//! [`Deadline`] runs low. The commit phase then applies the tagged effects to
//! the [`HostAdapter`] in one synchronous pass.
//!
//! ```
//! use fiber_core::{Element, MemoryHost, RenderRoot};
//! use std::time::Duration;
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container();
//! let mut root = RenderRoot::new(host, container);
//! root.render(Element::host("div").with_child("Count: 1"));
//! while root.has_pending_work() {
//!     root.tick(&|| Duration::from_millis(16)).unwrap();
//! }
//! assert_eq!(root.host().text_content(container), "Count: 1");
//! ```

pub mod collections;
pub mod commit;
pub mod element;
pub mod fiber;
pub mod hash;
pub mod hooks;
pub mod host;
pub mod platform;
pub mod reconcile;
pub mod root;
pub mod runtime;
pub mod work_loop;

pub use commit::{CommitReport, EffectRecord};
pub use element::{
    create_element, AttrValue, Attributes, Child, Component, ComponentRef, Element, ElementKind,
    EventHandler, HostEvent,
};
pub use fiber::{EffectTag, Fiber, FiberId, FiberKind, FiberStore};
pub use hooks::{RenderScope, SetState};
pub use host::{HostAdapter, HostError, HostKind, MemoryHost, MemoryNode, MemoryNodeKind, NodeId};
pub use platform::{Clock, Deadline, RuntimeScheduler};
pub use root::RenderRoot;
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use work_loop::{Phase, TickOutcome, WorkLoopConfig};

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiberError {
    /// A fiber has no host-bearing ancestor, so its host node has nowhere to go.
    MalformedTree { fiber: FiberId },
    /// The host rejected a structural mutation. The host tree may no longer
    /// match the committed fibers; remount to recover.
    Host(HostError),
}

impl fmt::Display for FiberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiberError::MalformedTree { fiber } => {
                write!(f, "fiber {fiber:?} has no host-bearing ancestor")
            }
            FiberError::Host(err) => write!(f, "host mutation failed: {err}"),
        }
    }
}

impl std::error::Error for FiberError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FiberError::Host(err) => Some(err),
            FiberError::MalformedTree { .. } => None,
        }
    }
}

impl From<HostError> for FiberError {
    fn from(err: HostError) -> Self {
        FiberError::Host(err)
    }
}
