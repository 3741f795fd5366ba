//! Overlay TUI — embeddable developer overlay for terminal applications.
//!
//! The host owns the terminal loop. Each frame it:
//! 1. Translates raw input into [`Event`]s and passes each one to
//!    [`Overlay::handle_event`], handling whatever comes back unconsumed
//! 2. Hands its own frame to [`Overlay::set_backdrop`]
//! 3. Calls [`Overlay::render`] and [`Overlay::present`]
//!
//! Inside, an [`ElementTree`] holds the overlay's widgets. Events travel down
//! a single selection chain from the root, and a primary press re-targets the
//! chain. [`TextInput`] is a console-grade single-line editor with history,
//! selection, clipboard, and a suggestion popup.

pub mod clipboard;
pub mod element;
pub mod error;
pub mod event;
pub mod input;
pub mod log_view;
pub mod overlay;
pub mod render;
pub mod sink;
pub mod style;
pub mod suggest;
pub mod terminal;
pub mod text_edit;
pub mod theme;
pub mod tree;
pub mod types;

mod text_utils;

pub use clipboard::{Clipboard, MemoryClipboard, Osc52Clipboard};
pub use element::{Backdrop, Element, EventCx, Panel, RenderCx};
pub use error::{OverlayError, Result};
pub use input::{Alignment, TextInput, TextInputConfig};
pub use log_view::LogView;
pub use overlay::{Overlay, OverlayConfig};
pub use sink::{LineSink, LogBuffer};
pub use suggest::{Candidate, Suggestions};
pub use terminal::{CrosstermBackend, HeadlessBackend, MockBackend, TerminalBackend};
pub use text_edit::{EditOptions, TextEditor};
pub use theme::Theme;
pub use tree::ElementTree;
pub use types::{key, Buffer, Cell, Event, EventKind, Modifiers, MouseButton, Point, Rect};
