//! Tree Module — element arena and CRUD operations.
//!
//! Responsibilities:
//! - Handle allocation (sequential u32 starting at 1, never recycled)
//! - Node creation/destruction
//! - Parent-child relationships, with parents as non-owning handles
//! - Absolute geometry for things drawn outside their node (popups)

use std::collections::HashMap;

use tracing::debug;

use crate::element::Element;
use crate::error::{OverlayError, Result};
use crate::types::{Buffer, Rect};

/// One element in the tree.
pub struct Node {
    /// Position relative to the parent's origin, plus size.
    pub rect: Rect,
    /// The node's own drawing surface, sized to `rect`.
    pub buffer: Buffer,
    /// Children in declaration order. Earlier children win hit tests.
    pub children: Vec<u32>,
    pub parent: Option<u32>,
    /// Always one of `children` when set.
    pub selected_child: Option<u32>,
    /// Invisible nodes are skipped by hit testing and rendering.
    pub visible: bool,
    pub element: Box<dyn Element>,
}

impl Node {
    fn new(rect: Rect, element: Box<dyn Element>) -> Self {
        Self {
            rect,
            buffer: Buffer::new(rect.w, rect.h),
            children: Vec::new(),
            parent: None,
            selected_child: None,
            visible: true,
            element,
        }
    }
}

pub struct ElementTree {
    nodes: HashMap<u32, Node>,
    next_handle: u32,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_handle: 1, // Handle(0) is reserved as invalid
        }
    }

    pub fn get(&self, handle: u32) -> Option<&Node> {
        self.nodes.get(&handle)
    }

    pub fn get_mut(&mut self, handle: u32) -> Option<&mut Node> {
        self.nodes.get_mut(&handle)
    }

    pub fn contains(&self, handle: u32) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow the element as a concrete type.
    pub fn element<T: Element>(&self, handle: u32) -> Option<&T> {
        self.nodes.get(&handle)?.element.as_any().downcast_ref::<T>()
    }

    pub fn element_mut<T: Element>(&mut self, handle: u32) -> Option<&mut T> {
        self.nodes
            .get_mut(&handle)?
            .element
            .as_any_mut()
            .downcast_mut::<T>()
    }

    fn node(&self, handle: u32) -> Result<&Node> {
        self.nodes
            .get(&handle)
            .ok_or(OverlayError::InvalidHandle(handle))
    }

    fn node_mut(&mut self, handle: u32) -> Result<&mut Node> {
        self.nodes
            .get_mut(&handle)
            .ok_or(OverlayError::InvalidHandle(handle))
    }
}

/// Allocate a handle and create a detached node.
pub fn create_node(tree: &mut ElementTree, rect: Rect, element: Box<dyn Element>) -> u32 {
    let handle = tree.next_handle;
    tree.next_handle += 1;
    tree.nodes.insert(handle, Node::new(rect, element));
    debug!(handle, ?rect, "create_node");
    handle
}

/// Append `child` to `parent`, detaching it from any previous parent.
pub fn append_child(tree: &mut ElementTree, parent: u32, child: u32) -> Result<()> {
    tree.node(parent)?;
    let old_parent = tree.node(child)?.parent;

    // Walk up from the parent; meeting the child means a cycle.
    let mut cursor = Some(parent);
    while let Some(h) = cursor {
        if h == child {
            return Err(OverlayError::CycleDetected { parent, child });
        }
        cursor = tree.get(h).and_then(|n| n.parent);
    }

    if let Some(old) = old_parent {
        detach(tree, old, child);
    }

    tree.node_mut(child)?.parent = Some(parent);
    let p = tree.node_mut(parent)?;
    if !p.children.contains(&child) {
        p.children.push(child);
    }
    debug!(parent, child, "append_child");
    Ok(())
}

/// Remove `child` from `parent`'s children. The child becomes detached but
/// is not destroyed.
pub fn remove_child(tree: &mut ElementTree, parent: u32, child: u32) -> Result<()> {
    if tree.node(child)?.parent != Some(parent) {
        return Err(OverlayError::InvalidParent(child));
    }
    tree.node(parent)?;
    detach(tree, parent, child);
    debug!(parent, child, "remove_child");
    Ok(())
}

/// Destroy a node and everything under it.
pub fn destroy_subtree(tree: &mut ElementTree, handle: u32) -> Result<()> {
    let parent = tree.node(handle)?.parent;
    if let Some(p) = parent {
        detach(tree, p, handle);
    }

    let mut stack = vec![handle];
    let mut removed = 0usize;
    while let Some(h) = stack.pop() {
        if let Some(node) = tree.nodes.remove(&h) {
            stack.extend(node.children);
            removed += 1;
        }
    }
    debug!(handle, removed, "destroy_subtree");
    Ok(())
}

fn detach(tree: &mut ElementTree, parent: u32, child: u32) {
    if let Some(p) = tree.nodes.get_mut(&parent) {
        p.children.retain(|&h| h != child);
        if p.selected_child == Some(child) {
            p.selected_child = None;
        }
    }
    if let Some(c) = tree.nodes.get_mut(&child) {
        c.parent = None;
    }
}

/// Change a node's rectangle, resizing its buffer.
pub fn set_rect(tree: &mut ElementTree, handle: u32, rect: Rect) -> Result<()> {
    let node = tree.node_mut(handle)?;
    node.rect = rect;
    node.buffer.resize(rect.w, rect.h);
    Ok(())
}

pub fn set_visible(tree: &mut ElementTree, handle: u32, visible: bool) -> Result<()> {
    tree.node_mut(handle)?.visible = visible;
    Ok(())
}

/// The node's rectangle in the coordinate space of the topmost ancestor.
/// The topmost ancestor's own origin is not included.
pub fn absolute_rect(tree: &ElementTree, handle: u32) -> Result<Rect> {
    let node = tree.node(handle)?;
    let mut rect = node.rect;
    if node.parent.is_none() {
        return Ok(Rect::new(0, 0, rect.w, rect.h));
    }
    let mut cursor = node.parent;
    while let Some(h) = cursor {
        let ancestor = tree.node(h)?;
        if ancestor.parent.is_none() {
            break;
        }
        rect.x += ancestor.rect.x;
        rect.y += ancestor.rect.y;
        cursor = ancestor.parent;
    }
    Ok(rect)
}

/// Whether `handle` is `ancestor` or lies beneath it.
pub fn is_descendant(tree: &ElementTree, handle: u32, ancestor: u32) -> bool {
    let mut cursor = Some(handle);
    while let Some(h) = cursor {
        if h == ancestor {
            return true;
        }
        cursor = tree.get(h).and_then(|n| n.parent);
    }
    false
}
