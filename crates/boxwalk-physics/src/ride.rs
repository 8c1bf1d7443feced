//! The ride graph: which bodies are carried by which.
//!
//! An edge is the pair `child.ride_parent == Some(parent)` and
//! `parent.ride_children.contains(child)`. Both halves are always written
//! together by [`attach`] and [`detach`]; any disagreement between them is a
//! broken tick ordering and panics.
//!
//! Only the resolver attaches (on a from-below push-out). Only
//! [`fix_ride_graph`] and body removal detach.

use tracing::debug;

use crate::arena::{BodyId, BodySet};
use crate::geom::Rect;

/// Make `child` ride `parent`.
///
/// # Panics
///
/// Panics if `child` already rides something, or if either handle is stale.
pub(crate) fn attach(bodies: &mut BodySet, parent: BodyId, child: BodyId) {
    let (p, c) = bodies
        .pair_mut(parent, child)
        .unwrap_or_else(|| panic!("ride attach with missing body: parent {parent}, child {child}"));
    assert!(
        c.ride_parent.is_none(),
        "ride attach: {child} already rides {:?}, cannot attach to {parent}",
        c.ride_parent
    );
    c.ride_parent = Some(parent);
    let inserted = p.ride_children.insert(child);
    assert!(inserted, "ride attach: {parent} already lists {child} as a child");
    debug!(%parent, %child, "ride attach");
}

/// Stop `child` riding `parent`.
///
/// # Panics
///
/// Panics if `child` is not currently attached to `parent`.
pub(crate) fn detach(bodies: &mut BodySet, parent: BodyId, child: BodyId) {
    let (p, c) = bodies
        .pair_mut(parent, child)
        .unwrap_or_else(|| panic!("ride detach with missing body: parent {parent}, child {child}"));
    assert!(
        c.ride_parent == Some(parent) && p.ride_children.contains(&child),
        "ride detach: {child} is not attached to {parent} (child's parent is {:?})",
        c.ride_parent
    );
    c.ride_parent = None;
    p.ride_children.remove(&child);
    debug!(%parent, %child, "ride detach");
}

/// Whether a rider is still resting on its parent: horizontally overlapping
/// and with its bottom within `tolerance` of the parent's top.
pub fn is_adjacent(child: Rect, parent: Rect, tolerance: f64) -> bool {
    let overlaps = child.left() < parent.right() && child.right() > parent.left();
    overlaps && f64::from(child.bottom() - parent.top()).abs() < tolerance
}

/// Detach every rider that no longer rests on its parent. Returns the
/// removed `(parent, child)` edges in processing order.
///
/// No edges are created here. Running it twice with no motion in between
/// detaches nothing the second time.
///
/// # Panics
///
/// Panics if a child's parent pointer disagrees with its parent's child set.
pub fn fix_ride_graph(bodies: &mut BodySet, tolerance: f64) -> Vec<(BodyId, BodyId)> {
    let mut detached = Vec::new();
    for parent_id in bodies.ids() {
        let parent = &bodies[parent_id];
        if parent.ride_children.is_empty() {
            continue;
        }
        let parent_rect = parent.rect;
        let stale: Vec<BodyId> = parent
            .ride_children
            .iter()
            .copied()
            .filter(|&child_id| {
                let child = &bodies[child_id];
                assert_eq!(
                    child.ride_parent,
                    Some(parent_id),
                    "ride graph disagreement: {parent_id} lists {child_id} as a child"
                );
                !is_adjacent(child.rect, parent_rect, tolerance)
            })
            .collect();
        for child_id in stale {
            detach(bodies, parent_id, child_id);
            detached.push((parent_id, child_id));
        }
    }
    detached
}
