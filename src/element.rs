//! Element Module — the per-kind behavior attached to each tree node.
//!
//! A node in the [`ElementTree`](crate::tree::ElementTree) owns its geometry,
//! buffer, and selection links; the boxed [`Element`] supplies what varies
//! between kinds: how it reacts to events, how it draws, and what it does when
//! it loses focus.

use std::any::Any;

use crate::clipboard::Clipboard;
use crate::style;
use crate::theme::Theme;
use crate::types::{Buffer, Event};

/// Services handed to an element while it handles one event.
pub struct EventCx<'a> {
    /// Handle of the node being offered the event.
    pub handle: u32,
    /// Size of the node's rectangle.
    pub size: (u16, u16),
    /// Whether the node is the end of the selection chain.
    pub focused: bool,
    pub clipboard: &'a mut dyn Clipboard,
    /// The text input whose suggestion popup the overlay should draw.
    pub suggestion_owner: &'a mut Option<u32>,
}

impl EventCx<'_> {
    /// Claim the suggestion popup for this node.
    pub fn claim_suggestions(&mut self) {
        *self.suggestion_owner = Some(self.handle);
    }
}

/// Read-only state handed to an element while it draws.
pub struct RenderCx<'a> {
    pub theme: &'a Theme,
    /// Whether the node is the end of the selection chain.
    pub focused: bool,
    /// Whether keyboard focus traversal is active.
    pub tab_mode: bool,
}

pub trait Element: Any {
    /// Offer an event to this element. `event.pos`, when present, is already
    /// in the node's local coordinates. Return `true` to consume it.
    fn handle_event(&mut self, _event: &Event, _cx: &mut EventCx<'_>) -> bool {
        false
    }

    /// Draw the element's body into its own buffer. Children are composited
    /// afterwards by the render pass.
    fn render_body(&mut self, buf: &mut Buffer, cx: &RenderCx<'_>) {
        buf.fill(cx.theme.primary);
    }

    /// Draw the border over the body. The focus ring replaces the bevel for
    /// the focused node while tab mode is active.
    fn render_border(&mut self, buf: &mut Buffer, cx: &RenderCx<'_>) {
        draw_default_border(buf, cx, self.inset());
    }

    /// Sunken bevel instead of raised.
    fn inset(&self) -> bool {
        false
    }

    /// Called when the node leaves the selection chain.
    fn deselect(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub fn draw_default_border(buf: &mut Buffer, cx: &RenderCx<'_>, inset: bool) {
    if cx.tab_mode && cx.focused {
        style::draw_focus_ring(buf, cx.theme.focus_ring);
    } else {
        style::draw_bevel(buf, cx.theme.border_light, cx.theme.border_dark, inset);
    }
}

/// Plain container: primary fill with a raised bevel.
#[derive(Debug, Default, Clone, Copy)]
pub struct Panel {
    pub inset: bool,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sunken() -> Self {
        Self { inset: true }
    }
}

impl Element for Panel {
    fn inset(&self) -> bool {
        self.inset
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The overlay's root. Draws the host's last frame tinted with the theme's
/// primary color, or nothing when the host hasn't supplied one.
#[derive(Debug, Default, Clone)]
pub struct Backdrop {
    frame: Option<Buffer>,
}

impl Backdrop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frame(&mut self, frame: Buffer) {
        self.frame = Some(frame);
    }

    pub fn clear_frame(&mut self) {
        self.frame = None;
    }

    pub fn frame(&self) -> Option<&Buffer> {
        self.frame.as_ref()
    }
}

impl Element for Backdrop {
    fn render_body(&mut self, buf: &mut Buffer, cx: &RenderCx<'_>) {
        buf.clear();
        if let Some(frame) = &self.frame {
            buf.blit(frame, 0, 0);
            style::tint(buf, cx.theme.primary, cx.theme.secondary);
        }
    }

    fn render_border(&mut self, _buf: &mut Buffer, _cx: &RenderCx<'_>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
