//! Suggestion popup state and drawing.
//!
//! A text input with a suggestion function recomputes the candidate list on
//! every content-changing edit. The overlay draws the popup for whichever
//! input recomputed last and routes Up/Down/Tab to it while it is visible.

use unicode_width::UnicodeWidthStr;

use crate::style;
use crate::text_utils::truncate_with_ellipsis;
use crate::theme::Theme;
use crate::types::{Buffer, CellAttrs};

/// Hints longer than this are cut and end in `...`.
pub const MAX_HINT_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    /// Short type or kind label shown right-aligned.
    pub kind: String,
    /// Draw the kind label in italics.
    pub emphasis: bool,
}

impl Candidate {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            emphasis: true,
        }
    }

    pub fn plain(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            emphasis: false,
            ..Self::new(name, kind)
        }
    }
}

/// What a suggestion function returns for the current text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    /// Grapheme offset where an accepted candidate starts replacing text.
    pub replace_start: usize,
    pub candidates: Vec<Candidate>,
}

impl Suggestions {
    pub fn new(replace_start: usize, candidates: Vec<Candidate>) -> Self {
        Self {
            replace_start,
            candidates,
        }
    }
}

pub type SuggestFn = Box<dyn Fn(&str) -> Suggestions>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    candidates: Vec<Candidate>,
    replace_start: usize,
    index: usize,
    visible: bool,
}

impl SuggestionState {
    /// Replace the list with a fresh result. `caret` bounds the replace start.
    pub fn update(&mut self, result: Suggestions, caret: usize) {
        self.replace_start = result.replace_start.min(caret);
        self.visible = !result.candidates.is_empty();
        self.candidates = result.candidates;
        self.index = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn replace_start(&self) -> usize {
        self.replace_start
    }

    pub fn selected(&self) -> Option<&Candidate> {
        if !self.is_visible() {
            return None;
        }
        self.candidates.get(self.index)
    }

    /// Move the highlight by `delta`, wrapping at both ends.
    pub fn cycle(&mut self, delta: isize) {
        let len = self.candidates.len() as isize;
        if len == 0 {
            return;
        }
        self.index = (self.index as isize + delta).rem_euclid(len) as usize;
    }
}

/// Draw the popup into a buffer sized to its content.
pub fn render_popup(state: &SuggestionState, theme: &Theme) -> Buffer {
    let options = state.candidates();
    let gap = usize::from(options.iter().any(|o| !o.kind.is_empty()));
    let content_w = options
        .iter()
        .map(|o| {
            UnicodeWidthStr::width(o.name.trim_end())
                + UnicodeWidthStr::width(o.kind.as_str()).min(MAX_HINT_LEN)
                + gap
        })
        .max()
        .unwrap_or(0);
    let w = (content_w + 2).min(u16::MAX as usize) as u16;
    let h = (options.len() + 2).min(u16::MAX as usize) as u16;

    let mut buf = Buffer::new(w, h);
    buf.fill(theme.primary);
    for (i, option) in options.iter().enumerate() {
        let y = i as i32 + 1;
        let (name_fg, hint_fg) = if i == state.index() {
            style::highlight_band(&mut buf, 1, w as i32 - 1, y, y + 1, theme.highlight);
            (theme.primary_text, theme.secondary_text)
        } else {
            (theme.secondary_text, theme.border_light)
        };
        style::write_text(&mut buf, 1, y, w as i32 - 1, &option.name, name_fg, CellAttrs::empty());

        let hint = truncate_with_ellipsis(&option.kind, MAX_HINT_LEN);
        let hint_x = w as i32 - 1 - UnicodeWidthStr::width(hint.as_str()) as i32;
        let attrs = if option.emphasis {
            CellAttrs::ITALIC
        } else {
            CellAttrs::empty()
        };
        style::write_text(&mut buf, hint_x, y, w as i32 - 1, &hint, hint_fg, attrs);
    }
    style::draw_bevel(&mut buf, theme.border_light, theme.border_dark, false);
    buf
}
