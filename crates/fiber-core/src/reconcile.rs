//! Position-keyed child diff.
//!
//! New elements and the previous child chain are walked in lock-step. At each
//! position a matching kind reuses the old fiber's host node (Update); anything
//! else places a new fiber and deletes the old one. There is no key matching:
//! moving a child to another position shows up as a deletion plus a placement.

use crate::element::Element;
use crate::fiber::{EffectTag, Fiber, FiberId, FiberStore};

/// Builds the child chain of `wip` from `elements`, pushing orphaned previous
/// children onto `deletions`.
pub(crate) fn reconcile_children(
    fibers: &mut FiberStore,
    deletions: &mut Vec<FiberId>,
    wip: FiberId,
    elements: &[Element],
) {
    let mut old = fibers[wip]
        .alternate
        .and_then(|alternate| fibers.get(alternate))
        .and_then(|alternate| alternate.child);
    let mut previous: Option<FiberId> = None;
    let mut index = 0;

    fibers[wip].child = None;

    while index < elements.len() || old.is_some() {
        let element = elements.get(index);
        let next_old = old.and_then(|id| fibers.get(id)).and_then(|fiber| fiber.sibling);

        let reused = match (element, old) {
            (Some(element), Some(old_id)) if fibers[old_id].kind.matches(element.kind()) => {
                Some(Fiber::update(element, old_id, &fibers[old_id], wip))
            }
            _ => None,
        };

        let new_fiber = match (reused, element) {
            (Some(fiber), _) => Some(fiber),
            (None, element) => {
                if let Some(old_id) = old {
                    fibers[old_id].effect = EffectTag::Deletion;
                    deletions.push(old_id);
                }
                element.map(|element| Fiber::placement(element, wip))
            }
        };

        if let Some(fiber) = new_fiber {
            let id = fibers.insert(fiber);
            match previous {
                None => fibers[wip].child = Some(id),
                Some(previous) => fibers[previous].sibling = Some(id),
            }
            previous = Some(id);
        }

        old = next_old;
        index += 1;
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
