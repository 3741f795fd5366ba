//! Event Module — routing, selection chain, focus traversal.
//!
//! Responsibilities:
//! - Top-down routing: each node sees an event before its descendants
//! - Primary-press hit testing that moves the selection chain
//! - Selection queries and deselect notification
//! - Tab advancement with a single wrap point at the root
//! - Synthetic pointer-leave dispatch

use tracing::trace;

use crate::clipboard::Clipboard;
use crate::element::EventCx;
use crate::tree::ElementTree;
use crate::types::{Event, Point};

/// Shared services threaded through a routing pass.
pub struct Services<'a> {
    pub clipboard: &'a mut dyn Clipboard,
    pub suggestion_owner: &'a mut Option<u32>,
}

/// Route `event` into the subtree at `handle`. Positions are translated into
/// each node's local space on the way down, so `event` is left in the
/// coordinates of the deepest node reached. Returns whether it was consumed.
pub fn route(tree: &mut ElementTree, handle: u32, event: &mut Event, services: &mut Services<'_>) -> bool {
    let Some(rect) = tree.get(handle).map(|n| n.rect) else {
        return false;
    };
    if let Some(pos) = event.pos.as_mut() {
        *pos = *pos - rect.origin();
    }

    if offer(tree, handle, event, services) {
        trace!(handle, kind = ?event.kind, "event consumed");
        return true;
    }

    if event.is_primary_press() {
        let hit = event.pos.and_then(|pos| hit_test_children(tree, handle, pos));
        let current = tree.get(handle).and_then(|n| n.selected_child);
        if hit != current {
            if let Some(old) = current {
                clear_selection(tree, old);
            }
            if let Some(node) = tree.get_mut(handle) {
                node.selected_child = hit;
            }
            if let Some(new) = hit.and_then(|h| tree.get_mut(h)) {
                new.selected_child = None;
            }
        }
    }

    match tree.get(handle).and_then(|n| n.selected_child) {
        Some(child) => route(tree, child, event, services),
        None => false,
    }
}

/// Offer the event to one node's element without descending.
fn offer(tree: &mut ElementTree, handle: u32, event: &Event, services: &mut Services<'_>) -> bool {
    let focused = is_selected(tree, handle, true);
    let Some(node) = tree.get_mut(handle) else {
        return false;
    };
    let mut cx = EventCx {
        handle,
        size: (node.rect.w, node.rect.h),
        focused,
        clipboard: &mut *services.clipboard,
        suggestion_owner: &mut *services.suggestion_owner,
    };
    node.element.handle_event(event, &mut cx)
}

/// First visible child, in declaration order, whose rectangle contains `pos`.
pub fn hit_test_children(tree: &ElementTree, handle: u32, pos: Point) -> Option<u32> {
    let node = tree.get(handle)?;
    node.children.iter().copied().find(|&c| {
        tree.get(c)
            .is_some_and(|child| child.visible && child.rect.contains(pos))
    })
}

/// Notify every node on the chain starting at `handle` that it lost focus,
/// unlinking the chain as it goes.
pub fn clear_selection(tree: &mut ElementTree, handle: u32) {
    let mut cursor = Some(handle);
    while let Some(h) = cursor {
        let Some(node) = tree.get_mut(h) else {
            break;
        };
        node.element.deselect();
        cursor = node.selected_child.take();
    }
}

/// Whether `handle` is on the selection chain. With `strict`, it must also
/// be the end of the chain.
pub fn is_selected(tree: &ElementTree, handle: u32, strict: bool) -> bool {
    let Some(node) = tree.get(handle) else {
        return false;
    };
    if strict && node.selected_child.is_some() {
        return false;
    }
    let mut current = handle;
    let mut parent = node.parent;
    while let Some(p) = parent {
        let Some(pn) = tree.get(p) else {
            return false;
        };
        if pn.selected_child != Some(current) {
            return false;
        }
        current = p;
        parent = pn.parent;
    }
    true
}

/// Deepest node on the chain below `handle`, or `None` if `handle` has no
/// selected child.
pub fn selected_element(tree: &ElementTree, handle: u32) -> Option<u32> {
    let mut current = handle;
    while let Some(next) = tree.get(current).and_then(|n| n.selected_child) {
        current = next;
    }
    (current != handle).then_some(current)
}

/// Move focus to the next element after `handle` in tab order.
///
/// A node selects its first child when it has none selected, otherwise the
/// sibling after its selected child. Running off the end hands the request
/// to the parent; only the root wraps back to its first child.
pub fn select_next(tree: &mut ElementTree, handle: u32) {
    let Some(node) = tree.get(handle) else {
        return;
    };
    let parent = node.parent;

    let Some(selected) = node.selected_child else {
        if let Some(&first) = node.children.first() {
            select_child(tree, handle, first);
        } else if let Some(p) = parent {
            select_next(tree, p);
        }
        return;
    };

    let index = node.children.iter().position(|&c| c == selected).map_or(0, |i| i + 1);
    let next = match (node.children.get(index).copied(), parent) {
        (Some(next), _) => next,
        (None, Some(p)) => {
            select_next(tree, p);
            return;
        }
        (None, None) => match node.children.first() {
            Some(&first) => first,
            None => return,
        },
    };

    clear_selection(tree, selected);
    select_child(tree, handle, next);
}

fn select_child(tree: &mut ElementTree, parent: u32, child: u32) {
    if let Some(node) = tree.get_mut(parent) {
        node.selected_child = Some(child);
    }
    if let Some(node) = tree.get_mut(child) {
        node.selected_child = None;
    }
    trace!(parent, child, "select_child");
}

/// Derive the pointer-leave event from `motion` and offer it to the root's
/// children whose rectangle held the pointer before it moved. Stops at the
/// first child that consumes it.
pub fn dispatch_leave(tree: &mut ElementTree, root: u32, motion: &Event, services: &mut Services<'_>) -> bool {
    let Some(mut leave) = Event::leave_from(motion) else {
        return false;
    };
    let Some(origin) = tree.get(root).map(|n| n.rect.origin()) else {
        return false;
    };
    if let Some(pos) = leave.pos.as_mut() {
        *pos = *pos - origin;
    }
    let Some(prior) = leave.pos else {
        return false;
    };

    let children = tree.get(root).map(|n| n.children.clone()).unwrap_or_default();
    for child in children {
        let inside = tree
            .get(child)
            .is_some_and(|c| c.visible && c.rect.contains(prior));
        if inside && route(tree, child, &mut leave.clone(), services) {
            return true;
        }
    }
    false
}
