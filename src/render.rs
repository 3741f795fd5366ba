//! Render Module — depth-first composition and frame diffing.
//!
//! Responsibilities:
//! - Render each visible node's body and border into its own buffer
//! - Composite children onto their parent at their rectangle offsets
//! - Draw the suggestion popup over the finished frame
//! - Diff frames into minimal CellUpdate lists for the backend

use tracing::debug;

use crate::event::is_selected;
use crate::element::RenderCx;
use crate::input::TextInput;
use crate::suggest::render_popup;
use crate::theme::Theme;
use crate::tree::{absolute_rect, ElementTree};
use crate::types::{Buffer, CellUpdate};

/// Render the subtree at `root` into the root's buffer.
pub fn render_tree(tree: &mut ElementTree, root: u32, theme: &Theme, tab_mode: bool) {
    let start = std::time::Instant::now();
    let drawn = render_node(tree, root, theme, tab_mode);
    debug!(
        nodes = drawn,
        elapsed_us = start.elapsed().as_micros() as u64,
        "render_tree"
    );
}

/// Returns the number of nodes drawn.
fn render_node(tree: &mut ElementTree, handle: u32, theme: &Theme, tab_mode: bool) -> usize {
    let focused = is_selected(tree, handle, true);
    let Some(node) = tree.get_mut(handle) else {
        return 0;
    };
    if !node.visible {
        return 0;
    }
    let cx = RenderCx {
        theme,
        focused,
        tab_mode,
    };
    node.element.render_body(&mut node.buffer, &cx);
    node.element.render_border(&mut node.buffer, &cx);

    let mut drawn = 1;
    let children = node.children.clone();
    for child in children {
        drawn += render_node(tree, child, theme, tab_mode);
        composite(tree, handle, child);
    }
    drawn
}

/// Blit `child`'s buffer onto `parent`'s at the child's offset.
fn composite(tree: &mut ElementTree, parent: u32, child: u32) {
    let Some(node) = tree.get_mut(child) else {
        return;
    };
    if !node.visible {
        return;
    }
    let (x, y) = (node.rect.x, node.rect.y);
    let src = std::mem::replace(&mut node.buffer, Buffer::new(0, 0));
    if let Some(p) = tree.get_mut(parent) {
        p.buffer.blit(&src, x, y);
    }
    if let Some(node) = tree.get_mut(child) {
        node.buffer = src;
    }
}

/// The popup for `owner`'s suggestions and where it goes in root
/// coordinates: just below the input, aligned with the replaced text.
pub fn suggestion_popup(tree: &ElementTree, owner: u32, theme: &Theme) -> Option<(Buffer, i32, i32)> {
    let input = tree.element::<TextInput>(owner)?;
    let state = input.editor().suggestions();
    if !state.is_visible() {
        return None;
    }
    let abs = absolute_rect(tree, owner).ok()?;
    // The popup's left border sits one column before the first letter.
    let x = abs.x + input.letter_x(state.replace_start(), abs.w) - 1;
    let y = abs.bottom();
    Some((render_popup(state, theme), x, y))
}

/// Cells of `front` that differ from `back`. A missing or differently sized
/// `back` yields every cell.
pub fn diff_buffers(front: &Buffer, back: Option<&Buffer>) -> Vec<CellUpdate> {
    let back = back.filter(|b| b.width == front.width && b.height == front.height);
    let mut updates = Vec::new();
    for y in 0..front.height {
        for x in 0..front.width {
            let Some(cell) = front.get(x, y) else {
                continue;
            };
            let changed = match back.and_then(|b| b.get(x, y)) {
                Some(old) => cell != old,
                None => true,
            };
            if changed {
                updates.push(CellUpdate { x, y, cell: *cell });
            }
        }
    }
    updates
}
