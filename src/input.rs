//! Input Module — the editable text field element.
//!
//! Maps keys and pointer presses onto the [`TextEditor`] and draws its state:
//! fill, selection band, text, caret cell and a sunken bevel.

use std::any::Any;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{Element, EventCx, RenderCx};
use crate::error::OverlayError;
use crate::style;
use crate::suggest::{SuggestFn, Suggestions};
use crate::text_edit::{Callbacks, EditOptions, TextEditor};
use crate::text_utils::grapheme_count;
use crate::types::{key, Buffer, CellAttrs, Event, EventKind, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(OverlayError::InvalidAlignment(s.to_string())),
        }
    }
}

/// Everything needed to build a [`TextInput`].
pub struct TextInputConfig {
    pub rect: Rect,
    pub callbacks: Callbacks,
    pub options: EditOptions,
    pub alignment: Alignment,
    pub select_all_on_click: bool,
}

impl TextInputConfig {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            callbacks: Callbacks::default(),
            options: EditOptions::default(),
            alignment: Alignment::Left,
            select_all_on_click: true,
        }
    }

    pub fn getter(mut self, f: impl Fn() -> String + 'static) -> Self {
        self.callbacks.getter = Some(Box::new(f));
        self
    }

    pub fn setter(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.callbacks.setter = Box::new(f);
        self
    }

    pub fn validator(mut self, f: impl Fn(&str) -> bool + 'static) -> Self {
        self.callbacks.validator = Box::new(f);
        self
    }

    pub fn suggestions(mut self, f: impl Fn(&str) -> Suggestions + 'static) -> Self {
        let f: SuggestFn = Box::new(f);
        self.callbacks.suggest = Some(f);
        self
    }

    pub fn clear_on_send(mut self, on: bool) -> Self {
        self.options.clear_on_send = on;
        self
    }

    pub fn lose_focus_on_send(mut self, on: bool) -> Self {
        self.options.lose_focus_on_send = on;
        self
    }

    pub fn select_all_on_click(mut self, on: bool) -> Self {
        self.select_all_on_click = on;
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.options.max_len = Some(max);
        self
    }
}

pub struct TextInput {
    editor: TextEditor,
    alignment: Alignment,
    select_all_on_click: bool,
    /// `max_len` tracks the node width instead of a configured limit.
    fit_max_len: bool,
}

impl TextInput {
    pub fn new(config: TextInputConfig) -> Self {
        let mut options = config.options;
        let fit_max_len = options.max_len.is_none();
        if fit_max_len {
            options.max_len = Some(fitted_max_len(config.rect.w));
        }
        Self {
            editor: TextEditor::new(config.callbacks, options),
            alignment: config.alignment,
            select_all_on_click: config.select_all_on_click,
            fit_max_len,
        }
    }

    pub fn editor(&self) -> &TextEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TextEditor {
        &mut self.editor
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Column of the cell holding grapheme `pos` of the displayed text, for
    /// a field `width` cells wide.
    pub fn letter_x(&self, pos: usize, width: u16) -> i32 {
        let len = grapheme_count(&self.editor.display_text()) as i32;
        let pos = pos as i32;
        let w = width as i32;
        match self.alignment {
            Alignment::Left => 1 + pos,
            Alignment::Center => w / 2 + pos - len / 2,
            Alignment::Right => w - 2 - (len - pos),
        }
    }

    fn fit_to(&mut self, width: u16) {
        if self.fit_max_len {
            self.editor.set_max_len(Some(fitted_max_len(width)));
        }
    }

    fn inside(event: &Event, (w, h): (u16, u16)) -> bool {
        event
            .pos
            .is_some_and(|p| p.x > 0 && p.x < w as i32 && p.y > 0 && p.y < h as i32)
    }

    fn handle_key(&mut self, event: &Event, cx: &mut EventCx<'_>) {
        let Some(code) = event.key else {
            return;
        };
        let ctrl = event.ctrl();
        let ed = &mut self.editor;
        match code {
            key::ENTER => {
                ed.commit();
            }
            key::BACKSPACE => ed.backspace(ctrl),
            key::DELETE => ed.delete_forward(ctrl),
            key::LEFT => ed.move_caret(-1, event.shift(), ctrl),
            key::RIGHT => ed.move_caret(1, event.shift(), ctrl),
            key::HOME => ed.move_caret(-(ed.len() as isize), event.shift(), false),
            key::END => ed.move_caret(ed.len() as isize, event.shift(), false),
            key::UP => {
                ed.history_prev();
            }
            key::DOWN => {
                ed.history_next();
            }
            c if ctrl && is_char(c, 'a') => ed.select_all(),
            c if ctrl && is_char(c, 'c') => {
                if let Some(text) = ed.copy() {
                    cx.clipboard.set(&text);
                }
            }
            c if ctrl && is_char(c, 'x') => {
                if let Some(text) = ed.cut() {
                    cx.clipboard.set(&text);
                }
            }
            c if ctrl && is_char(c, 'v') => {
                if let Some(text) = cx.clipboard.get() {
                    ed.paste(&text);
                }
            }
            _ => {}
        }
    }
}

/// One cell of border on each side plus one for the trailing caret.
fn fitted_max_len(width: u16) -> usize {
    (width as usize).saturating_sub(3)
}

fn is_char(code: u32, c: char) -> bool {
    code == c as u32 || code == c.to_ascii_uppercase() as u32
}

impl Element for TextInput {
    fn handle_event(&mut self, event: &Event, cx: &mut EventCx<'_>) -> bool {
        self.fit_to(cx.size.0);
        let consumed = match event.kind {
            EventKind::PointerDown if Self::inside(event, cx.size) => {
                self.editor.begin_edit();
                if self.select_all_on_click {
                    self.editor.select_all();
                }
                true
            }
            EventKind::KeyDown if self.editor.is_editing() && event.key == Some(key::ESCAPE) => {
                self.editor.cancel();
                true
            }
            EventKind::TextInput if self.editor.is_editing() => {
                for c in event.text.as_deref().unwrap_or_default().chars() {
                    self.editor.insert_char(c);
                }
                true
            }
            EventKind::KeyDown if self.editor.is_editing() => {
                self.handle_key(event, cx);
                true
            }
            EventKind::KeyUp => true,
            _ => false,
        };
        if self.editor.take_refreshed() {
            cx.claim_suggestions();
        }
        consumed
    }

    fn render_body(&mut self, buf: &mut Buffer, cx: &RenderCx<'_>) {
        let theme = cx.theme;
        let editing = self.editor.is_editing();
        buf.fill(if editing { theme.secondary } else { theme.primary });

        let width = buf.width;
        let inner_right = width as i32 - 1;
        let inner_bottom = buf.height as i32 - 1;
        if let Some((a, b)) = self.editor.selection() {
            style::highlight_band(
                buf,
                self.letter_x(a.min(b), width).max(1),
                self.letter_x(a.max(b), width).min(inner_right),
                1,
                inner_bottom.max(2),
                theme.highlight,
            );
        }

        let text = self.editor.display_text();
        let color = if !self.editor.is_valid(&text) {
            theme.error
        } else if editing {
            theme.primary_text
        } else {
            theme.secondary_text
        };
        let row = buf.height as i32 / 2;
        let start = self.letter_x(0, width);
        // Clip columns outside the border without shifting the text.
        let skip = (1 - start).max(0) as usize;
        let visible: String = unicode_segmentation::UnicodeSegmentation::graphemes(text.as_str(), true)
            .skip(skip)
            .collect();
        style::write_text(buf, start.max(1), row, inner_right, &visible, color, CellAttrs::empty());

        if editing && self.editor.selection().is_none() {
            let x = self.letter_x(self.editor.caret(), width);
            if x >= 1 && x < inner_right {
                style::invert_cell(buf, x, row, theme.primary_text);
            }
        }
    }

    fn inset(&self) -> bool {
        true
    }

    fn deselect(&mut self) {
        if self.editor.is_editing() {
            self.editor.cancel();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
