//! Overlay — the root that owns all overlay state.
//!
//! The host feeds it one [`Event`] at a time and asks it to render once per
//! frame. The overlay owns the element tree, the palette, the clipboard and
//! the suggestion popup, and runs the root-level rules before normal routing:
//!
//! 1. The toggle key opens and closes the overlay; nothing else is handled
//!    while it is closed.
//! 2. Up/Down/Tab go to a visible suggestion popup first.
//! 3. Tab enters tab mode and advances focus; any other key leaves it.
//! 4. Pointer motion also dispatches a synthetic leave event.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clipboard::{Clipboard, MemoryClipboard};
use crate::element::{Backdrop, Element};
use crate::error::{OverlayError, Result};
use crate::event::{self, Services};
use crate::input::{TextInput, TextInputConfig};
use crate::render;
use crate::terminal::TerminalBackend;
use crate::theme::Theme;
use crate::tree::{self, ElementTree};
use crate::types::{key, Buffer, Event, EventKind, Rect};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Key code that toggles the overlay.
    pub toggle_key: u32,
    pub start_open: bool,
    pub theme: Theme,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            toggle_key: key::BACKTICK,
            start_open: false,
            theme: Theme::default(),
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub struct Overlay {
    tree: ElementTree,
    root: u32,
    theme: Theme,
    clipboard: Box<dyn Clipboard>,
    open: bool,
    tab_mode: bool,
    toggle_key: u32,
    suggestion_owner: Option<u32>,
    last_frame: Option<Buffer>,
}

impl Overlay {
    pub fn new(width: u16, height: u16, config: OverlayConfig) -> Self {
        let mut tree = ElementTree::new();
        let root = tree::create_node(
            &mut tree,
            Rect::new(0, 0, width, height),
            Box::new(Backdrop::new()),
        );
        Self {
            tree,
            root,
            theme: config.theme,
            clipboard: Box::new(MemoryClipboard::new()),
            open: config.start_open,
            tab_mode: false,
            toggle_key: config.toggle_key,
            suggestion_owner: None,
            last_frame: None,
        }
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ElementTree {
        &mut self.tree
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        self.clipboard.as_mut()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn in_tab_mode(&self) -> bool {
        self.tab_mode
    }

    /// Text input whose suggestions the popup shows.
    pub fn suggestion_owner(&self) -> Option<u32> {
        self.suggestion_owner
    }

    /// End of the selection chain, if anything is selected.
    pub fn focused(&self) -> Option<u32> {
        event::selected_element(&self.tree, self.root)
    }

    // ------------------------------------------------------------------
    // Building the tree
    // ------------------------------------------------------------------

    pub fn add_element(&mut self, parent: u32, rect: Rect, element: Box<dyn Element>) -> Result<u32> {
        if !self.tree.contains(parent) {
            return Err(OverlayError::InvalidHandle(parent));
        }
        let handle = tree::create_node(&mut self.tree, rect, element);
        tree::append_child(&mut self.tree, parent, handle)?;
        Ok(handle)
    }

    pub fn add_text_input(&mut self, parent: u32, config: TextInputConfig) -> Result<u32> {
        let rect = config.rect;
        self.add_element(parent, rect, Box::new(TextInput::new(config)))
    }

    /// Destroy a subtree. The root cannot be removed.
    pub fn remove(&mut self, handle: u32) -> Result<()> {
        if handle == self.root {
            return Err(OverlayError::InvalidParent(handle));
        }
        if !self.tree.contains(handle) {
            return Err(OverlayError::InvalidHandle(handle));
        }
        if event::is_selected(&self.tree, handle, false) {
            event::clear_selection(&mut self.tree, handle);
        }
        if self
            .suggestion_owner
            .is_some_and(|owner| tree::is_descendant(&self.tree, owner, handle))
        {
            self.suggestion_owner = None;
        }
        tree::destroy_subtree(&mut self.tree, handle)
    }

    pub fn text_input(&self, handle: u32) -> Option<&TextInput> {
        self.tree.element::<TextInput>(handle)
    }

    pub fn text_input_mut(&mut self, handle: u32) -> Option<&mut TextInput> {
        self.tree.element_mut::<TextInput>(handle)
    }

    /// Make `handle` the end of the selection chain.
    pub fn focus(&mut self, handle: u32) -> Result<()> {
        if !tree::is_descendant(&self.tree, handle, self.root) {
            return Err(OverlayError::InvalidHandle(handle));
        }
        let current = self
            .tree
            .get_mut(self.root)
            .and_then(|n| n.selected_child.take());
        if let Some(first) = current {
            event::clear_selection(&mut self.tree, first);
        }

        // Relink from the target up to the root.
        let mut child = handle;
        let mut parent = self.tree.get(handle).and_then(|n| n.parent);
        while let Some(p) = parent {
            let Some(node) = self.tree.get_mut(p) else {
                break;
            };
            node.selected_child = Some(child);
            child = p;
            parent = node.parent;
        }
        debug!(handle, "focus");
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if tree::set_rect(&mut self.tree, self.root, Rect::new(0, 0, width, height)).is_ok() {
            self.last_frame = None;
            debug!(width, height, "resize");
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Feed one input event. Returns whether the overlay consumed it; the
    /// host should handle unconsumed events itself.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        if event.is_key_down(self.toggle_key) {
            self.open = !self.open;
            debug!(open = self.open, "toggle overlay");
            return true;
        }
        if self.is_toggle_text(event) {
            return true;
        }
        if event.kind == EventKind::Resize {
            if let Some((w, h)) = event.size {
                self.resize(w, h);
            }
            return false;
        }
        if !self.open {
            return false;
        }

        if self.route_to_popup(event) {
            return true;
        }

        if event.kind == EventKind::KeyDown {
            if event.key == Some(key::TAB) {
                self.tab_mode = true;
                self.advance_focus();
                return true;
            }
            self.tab_mode = false;
        }

        let mut services = Services {
            clipboard: self.clipboard.as_mut(),
            suggestion_owner: &mut self.suggestion_owner,
        };
        if event.kind == EventKind::PointerMove {
            event::dispatch_leave(&mut self.tree, self.root, event, &mut services);
        }
        let mut routed = event.clone();
        event::route(&mut self.tree, self.root, &mut routed, &mut services)
    }

    /// The text event that follows the toggle key press. Only printable
    /// ASCII toggle keys produce one; other codes are not characters.
    fn is_toggle_text(&self, event: &Event) -> bool {
        let Some(toggle) = u8::try_from(self.toggle_key)
            .ok()
            .filter(u8::is_ascii_graphic)
            .map(char::from)
        else {
            return false;
        };
        event.kind == EventKind::TextInput
            && event
                .text
                .as_deref()
                .is_some_and(|t| t.chars().eq(std::iter::once(toggle)))
    }

    fn route_to_popup(&mut self, event: &Event) -> bool {
        if event.kind != EventKind::KeyDown {
            return false;
        }
        let Some(code) = event.key.filter(|c| matches!(*c, key::UP | key::DOWN | key::TAB)) else {
            return false;
        };
        let Some(owner) = self.suggestion_owner else {
            return false;
        };
        let Some(input) = self.tree.element_mut::<TextInput>(owner) else {
            self.suggestion_owner = None;
            return false;
        };
        if !input.editor().suggestions().is_visible() {
            return false;
        }
        let editor = input.editor_mut();
        match code {
            key::DOWN => editor.cycle_suggestion(1),
            key::UP => editor.cycle_suggestion(-1),
            _ => {
                editor.accept_suggestion();
            }
        }
        true
    }

    fn advance_focus(&mut self) {
        let from = event::selected_element(&self.tree, self.root).unwrap_or(self.root);
        event::select_next(&mut self.tree, from);
        debug!(from, to = ?self.focused(), "tab advance");
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Supply the host's frame for this render; the overlay draws over a
    /// tinted copy of it.
    pub fn set_backdrop(&mut self, frame: &Buffer) {
        if let Some(backdrop) = self.tree.element_mut::<Backdrop>(self.root) {
            backdrop.set_frame(frame.clone());
        }
    }

    /// Recompose the root buffer. While closed it is just the host frame.
    pub fn render(&mut self) {
        if !self.open {
            let frame = self
                .tree
                .element::<Backdrop>(self.root)
                .and_then(|b| b.frame().cloned());
            if let Some(node) = self.tree.get_mut(self.root) {
                node.buffer.clear();
                if let Some(frame) = frame {
                    node.buffer.blit(&frame, 0, 0);
                }
            }
            return;
        }

        render::render_tree(&mut self.tree, self.root, &self.theme, self.tab_mode);

        let popup = self
            .suggestion_owner
            .and_then(|owner| render::suggestion_popup(&self.tree, owner, &self.theme));
        if let (Some((popup, x, y)), Some(node)) = (popup, self.tree.get_mut(self.root)) {
            node.buffer.blit(&popup, x, y);
        }
    }

    /// The composed frame.
    pub fn surface(&self) -> Option<&Buffer> {
        self.tree.get(self.root).map(|n| &n.buffer)
    }

    /// Write the cells that changed since the last present. Returns how many.
    pub fn present(&mut self, backend: &mut dyn TerminalBackend) -> Result<usize> {
        let frame = self
            .surface()
            .ok_or(OverlayError::InvalidHandle(self.root))?
            .clone();
        let diff = render::diff_buffers(&frame, self.last_frame.as_ref());
        backend.write_diff(&diff)?;
        backend.flush()?;
        self.last_frame = Some(frame);
        Ok(diff.len())
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::element::{EventCx, Panel};
    use crate::suggest::{Candidate, Suggestions};
    use crate::terminal::MockBackend;
    use crate::types::{Cell, Modifiers, MouseButton};

    fn open_overlay() -> Overlay {
        Overlay::new(
            40,
            12,
            OverlayConfig {
                start_open: true,
                ..OverlayConfig::default()
            },
        )
    }

    fn press(x: i32, y: i32) -> Event {
        Event::pointer_down(x, y, MouseButton::Left)
    }

    fn key_down(code: u32) -> Event {
        Event::key_down(code, Modifiers::empty())
    }

    #[test]
    fn test_toggle_key_gates_everything() {
        let mut overlay = Overlay::new(20, 5, OverlayConfig::default());
        let input = overlay
            .add_text_input(overlay.root(), TextInputConfig::new(Rect::new(0, 0, 10, 3)))
            .unwrap();

        assert!(!overlay.is_open());
        assert!(!overlay.handle_event(&press(2, 1)));
        assert_eq!(overlay.focused(), None);

        assert!(overlay.handle_event(&key_down(key::BACKTICK)));
        assert!(overlay.handle_event(&Event::text_input("`")));
        assert!(overlay.is_open());

        assert!(overlay.handle_event(&press(2, 1)));
        assert_eq!(overlay.focused(), Some(input));

        overlay.handle_event(&Event::text_input("a"));
        assert_eq!(overlay.text_input(input).unwrap().editor().text(), "a");
        // The toggle character never reaches the field.
        overlay.handle_event(&Event::text_input("`"));
        assert_eq!(overlay.text_input(input).unwrap().editor().text(), "a");
    }

    #[test]
    fn test_tab_mode_and_focus_advance() {
        let mut overlay = open_overlay();
        let root = overlay.root();
        let a = overlay.add_element(root, Rect::new(0, 0, 5, 3), Box::new(Panel::new())).unwrap();
        let b = overlay.add_element(root, Rect::new(6, 0, 5, 3), Box::new(Panel::new())).unwrap();

        assert!(overlay.handle_event(&key_down(key::TAB)));
        assert!(overlay.in_tab_mode());
        assert_eq!(overlay.focused(), Some(a));
        overlay.handle_event(&key_down(key::TAB));
        assert_eq!(overlay.focused(), Some(b));
        overlay.handle_event(&key_down(key::TAB));
        assert_eq!(overlay.focused(), Some(a));

        overlay.handle_event(&key_down('q' as u32));
        assert!(!overlay.in_tab_mode());
    }

    #[test]
    fn test_tab_out_of_text_input_cancels_edit() {
        let mut overlay = open_overlay();
        let root = overlay.root();
        let input = overlay
            .add_text_input(
                root,
                TextInputConfig::new(Rect::new(0, 0, 10, 3)).getter(|| "v".to_string()),
            )
            .unwrap();
        let other = overlay.add_element(root, Rect::new(0, 4, 5, 3), Box::new(Panel::new())).unwrap();

        overlay.handle_event(&press(2, 1));
        overlay.handle_event(&Event::text_input("zz"));
        assert!(overlay.text_input(input).unwrap().editor().is_editing());

        overlay.handle_event(&key_down(key::TAB));
        assert_eq!(overlay.focused(), Some(other));
        let editor = overlay.text_input(input).unwrap().editor();
        assert!(!editor.is_editing());
        assert_eq!(editor.text(), "v");
    }

    fn suggesting_input(overlay: &mut Overlay) -> u32 {
        let root = overlay.root();
        let config = TextInputConfig::new(Rect::new(1, 1, 20, 3)).suggestions(|text: &str| {
            let words = ["print", "pi", "pow"];
            let candidates = words
                .iter()
                .filter(|w| !text.is_empty() && w.starts_with(text))
                .map(|w| Candidate::new(*w, "fn"))
                .collect();
            Suggestions::new(0, candidates)
        });
        overlay.add_text_input(root, config).unwrap()
    }

    #[test]
    fn test_popup_takes_up_down_tab() {
        let mut overlay = open_overlay();
        let input = suggesting_input(&mut overlay);
        overlay.handle_event(&press(3, 2));
        overlay.handle_event(&Event::text_input("p"));
        assert_eq!(overlay.suggestion_owner(), Some(input));

        assert!(overlay.handle_event(&key_down(key::DOWN)));
        assert!(overlay.handle_event(&key_down(key::DOWN)));
        assert!(overlay.handle_event(&key_down(key::UP)));
        let state = overlay.text_input(input).unwrap().editor().suggestions();
        assert_eq!(state.selected().unwrap().name, "pi");

        assert!(overlay.handle_event(&key_down(key::TAB)));
        assert!(!overlay.in_tab_mode());
        assert_eq!(overlay.text_input(input).unwrap().editor().text(), "pi");
        assert_eq!(overlay.focused(), Some(input));
    }

    #[test]
    fn test_hidden_popup_leaves_keys_to_history_and_tab() {
        let mut overlay = open_overlay();
        let input = suggesting_input(&mut overlay);
        overlay.handle_event(&press(3, 2));
        overlay.handle_event(&Event::text_input("x"));
        assert!(!overlay
            .text_input(input)
            .unwrap()
            .editor()
            .suggestions()
            .is_visible());

        overlay.handle_event(&key_down(key::TAB));
        assert!(overlay.in_tab_mode());
    }

    #[test]
    fn test_render_draws_popup_below_owner() {
        let mut overlay = open_overlay();
        suggesting_input(&mut overlay);
        overlay.handle_event(&press(3, 2));
        overlay.handle_event(&Event::text_input("p"));
        overlay.render();

        let frame = overlay.surface().unwrap();
        // input at (1,1) h=3 -> popup top at row 4, left border at column 1
        assert_eq!(frame.get(1, 4).unwrap().ch, '┌');
        assert_eq!(frame.get(2, 5).unwrap().ch, 'p');
        assert_eq!(frame.get(2, 5).unwrap().bg, overlay.theme().highlight);
    }

    #[test]
    fn test_closed_render_shows_host_frame_untinted() {
        let mut overlay = Overlay::new(4, 1, OverlayConfig::default());
        let mut host = Buffer::new(4, 1);
        host.set(0, 0, Cell::new('h', 0, crate::types::rgb(255, 255, 255)));
        overlay.set_backdrop(&host);

        overlay.render();
        assert_eq!(overlay.surface().unwrap(), &host);

        overlay.set_open(true);
        overlay.render();
        assert_eq!(overlay.surface().unwrap().get(0, 0).unwrap().bg, overlay.theme().primary);
    }

    #[test]
    fn test_present_sends_only_changes() {
        let mut overlay = open_overlay();
        let root = overlay.root();
        overlay.add_element(root, Rect::new(0, 0, 4, 3), Box::new(Panel::new())).unwrap();
        let mut backend = MockBackend::new(40, 12);

        overlay.render();
        assert_eq!(overlay.present(&mut backend).unwrap(), 40 * 12);
        overlay.render();
        assert_eq!(overlay.present(&mut backend).unwrap(), 0);

        overlay.handle_event(&key_down(key::TAB));
        overlay.render();
        // Focus ring replaces the panel's border cells.
        assert_eq!(overlay.present(&mut backend).unwrap(), 10);
        assert_eq!(backend.flushes, 3);
    }

    struct LeaveCounter(Rc<RefCell<u32>>);

    impl Element for LeaveCounter {
        fn handle_event(&mut self, event: &Event, _cx: &mut EventCx<'_>) -> bool {
            if event.kind == EventKind::PointerLeave {
                *self.0.borrow_mut() += 1;
            }
            false
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_pointer_motion_dispatches_leave() {
        let mut overlay = open_overlay();
        let hits = Rc::new(RefCell::new(0));
        let root = overlay.root();
        overlay
            .add_element(root, Rect::new(0, 0, 5, 5), Box::new(LeaveCounter(hits.clone())))
            .unwrap();

        overlay.handle_event(&Event::pointer_move(10, 2, 8, 0));
        assert_eq!(*hits.borrow(), 1);
        overlay.handle_event(&Event::pointer_move(12, 2, 2, 0));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_remove_clears_focus_and_popup_owner() {
        let mut overlay = open_overlay();
        let input = suggesting_input(&mut overlay);
        overlay.handle_event(&press(3, 2));
        overlay.handle_event(&Event::text_input("p"));

        overlay.remove(input).unwrap();
        assert_eq!(overlay.focused(), None);
        assert_eq!(overlay.suggestion_owner(), None);
        assert!(overlay.remove(overlay.root()).is_err());
        assert!(matches!(overlay.remove(input), Err(OverlayError::InvalidHandle(_))));
    }

    #[test]
    fn test_focus_links_whole_chain() {
        let mut overlay = open_overlay();
        let root = overlay.root();
        let win = overlay.add_element(root, Rect::new(0, 0, 30, 10), Box::new(Panel::new())).unwrap();
        let inner = overlay.add_element(win, Rect::new(1, 1, 10, 3), Box::new(Panel::new())).unwrap();
        let other = overlay.add_element(root, Rect::new(31, 0, 5, 5), Box::new(Panel::new())).unwrap();

        overlay.focus(other).unwrap();
        assert_eq!(overlay.focused(), Some(other));
        overlay.focus(inner).unwrap();
        assert_eq!(overlay.focused(), Some(inner));
        assert!(event::is_selected(overlay.tree(), win, false));
        assert!(!event::is_selected(overlay.tree(), other, false));
        assert!(overlay.focus(999).is_err());
    }

    #[test]
    fn test_resize_event_resizes_root() {
        let mut overlay = open_overlay();
        assert!(!overlay.handle_event(&Event::resize(20, 6)));
        let frame = overlay.surface().unwrap();
        assert_eq!((frame.width, frame.height), (20, 6));
    }

    #[test]
    fn test_function_key_toggle_leaves_text_alone() {
        let mut overlay = Overlay::new(
            20,
            5,
            OverlayConfig {
                toggle_key: key::F1,
                start_open: true,
                ..OverlayConfig::default()
            },
        );
        let input = overlay
            .add_text_input(overlay.root(), TextInputConfig::new(Rect::new(0, 0, 10, 3)))
            .unwrap();
        overlay.handle_event(&press(2, 1));

        // U+0110 shares the F1 code but is ordinary text.
        assert!(overlay.handle_event(&Event::text_input("\u{110}")));
        overlay.handle_event(&Event::text_input("`"));
        assert_eq!(overlay.text_input(input).unwrap().editor().text(), "\u{110}`");

        assert!(overlay.handle_event(&key_down(key::F1)));
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_config_from_json() {
        let cfg = OverlayConfig::from_json(r#"{ "toggle_key": 272, "start_open": true }"#).unwrap();
        assert_eq!(cfg.toggle_key, key::F1);
        assert!(cfg.start_open);
        assert_eq!(cfg.theme, Theme::default());
        assert!(OverlayConfig::from_json("{ nope").is_err());
    }
}
