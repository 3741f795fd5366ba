//! Text Edit Module — the single-line editing engine behind `TextInput`.
//!
//! Responsibilities:
//! - Text, caret and selection, indexed by grapheme cluster
//! - Word jumps over space, comma and period
//! - Paired-delimiter wrapping of a selection
//! - Commit/cancel against external getter, setter and validator callables
//! - Command history with deduplication
//! - Feeding the suggestion state after content changes
//!
//! Invariant: `caret <= grapheme_count(text)` after every public operation.

use tracing::debug;

use crate::suggest::{SuggestFn, SuggestionState, Suggestions};
use crate::text_utils::{
    find_grapheme, grapheme_count, grapheme_slice, grapheme_to_byte_idx, insert_at_grapheme,
    remove_graphemes, rfind_grapheme,
};

const WORD_STOPS: &[&str] = &[" ", ".", ","];

const PAIRED_DELIMITERS: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
];

pub type Getter = Box<dyn Fn() -> String>;
pub type Setter = Box<dyn FnMut(&str)>;
pub type Validator = Box<dyn Fn(&str) -> bool>;

/// Callables supplied by whoever owns the edited value.
pub struct Callbacks {
    /// Source of truth for the committed value. Without one, cancel keeps the
    /// current text.
    pub getter: Option<Getter>,
    pub setter: Setter,
    pub validator: Validator,
    pub suggest: Option<SuggestFn>,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            getter: None,
            setter: Box::new(|_| {}),
            validator: Box::new(|_| true),
            suggest: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    pub clear_on_send: bool,
    pub lose_focus_on_send: bool,
    /// Insertions stop at this many graphemes unless replacing a selection.
    pub max_len: Option<usize>,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            clear_on_send: false,
            lose_focus_on_send: true,
            max_len: None,
        }
    }
}

pub struct TextEditor {
    text: String,
    caret: usize,
    /// (anchor, active); either order, possibly empty.
    selection: Option<(usize, usize)>,
    history: Vec<String>,
    /// Steps back from the newest entry while browsing; 0 is "past the newest".
    history_offset: usize,
    browsing: bool,
    editing: bool,
    callbacks: Callbacks,
    options: EditOptions,
    suggestions: SuggestionState,
    refreshed: bool,
}

impl TextEditor {
    pub fn new(callbacks: Callbacks, options: EditOptions) -> Self {
        let text = callbacks.getter.as_ref().map(|g| g()).unwrap_or_default();
        Self {
            text,
            caret: 0,
            selection: None,
            history: Vec::new(),
            history_offset: 0,
            browsing: false,
            editing: false,
            callbacks,
            options,
            suggestions: SuggestionState::default(),
            refreshed: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_browsing(&self) -> bool {
        self.browsing
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn options(&self) -> EditOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        grapheme_count(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn suggestions(&self) -> &SuggestionState {
        &self.suggestions
    }

    /// Text to draw: the live buffer while editing, the committed value
    /// otherwise.
    pub fn display_text(&self) -> String {
        if self.editing {
            self.text.clone()
        } else {
            self.pull()
        }
    }

    pub fn is_valid(&self, text: &str) -> bool {
        (self.callbacks.validator)(text)
    }

    /// Whether suggestions were recomputed since the last call.
    pub fn take_refreshed(&mut self) -> bool {
        std::mem::take(&mut self.refreshed)
    }

    // ------------------------------------------------------------------
    // Mode
    // ------------------------------------------------------------------

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Replace the buffer programmatically. Caret moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.len();
        self.selection = None;
        self.browsing = false;
    }

    pub fn set_max_len(&mut self, max_len: Option<usize>) {
        self.options.max_len = max_len;
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Type one character. Returns whether the buffer changed.
    pub fn insert_char(&mut self, c: char) -> bool {
        let at_limit = self
            .options
            .max_len
            .is_some_and(|max| self.len() >= max);
        if at_limit && self.selection.is_none() {
            return false;
        }

        if let Some(close) = closer_for(c) {
            if let Some((a, b)) = self.selection.filter(|(a, b)| a != b) {
                let (lo, hi) = (a.min(b), a.max(b));
                insert_at_grapheme(&mut self.text, hi, close.encode_utf8(&mut [0; 4]));
                insert_at_grapheme(&mut self.text, lo, c.encode_utf8(&mut [0; 4]));
                self.selection = Some((a + 1, b + 1));
                return true;
            }
        }

        self.browsing = false;
        self.erase_selection();
        // The caret lands after the cluster holding `c`; a combining mark
        // joins the previous cluster instead of adding one.
        let end = grapheme_to_byte_idx(&self.text, self.caret) + c.len_utf8();
        insert_at_grapheme(&mut self.text, self.caret, c.encode_utf8(&mut [0; 4]));
        self.caret = grapheme_count(&self.text[..end]).min(self.len());
        self.refresh_suggestions();
        true
    }

    pub fn backspace(&mut self, word: bool) {
        self.delete(-1, word);
    }

    pub fn delete_forward(&mut self, word: bool) {
        self.delete(1, word);
    }

    fn delete(&mut self, direction: isize, word: bool) {
        self.browsing = false;
        if self.selection.is_some() {
            self.erase_selection();
        } else {
            self.step(direction, false, word, true);
        }
        self.refresh_suggestions();
    }

    /// Move the caret by `delta` positions, or by a word when `word` is set.
    /// With `extend`, grow or start a selection anchored at the old caret.
    pub fn move_caret(&mut self, delta: isize, extend: bool, word: bool) {
        self.browsing = false;
        self.step(delta, extend, word, false);
    }

    fn step(&mut self, delta: isize, extend: bool, word: bool, delete: bool) {
        let len = self.len();
        let original = self.caret;

        let amount = if word {
            let target = match delta.signum() {
                1 => find_grapheme(&self.text, self.caret, WORD_STOPS).unwrap_or(len) as isize,
                -1 => rfind_grapheme(&self.text, self.caret.saturating_sub(1), WORD_STOPS)
                    .map_or(-1, |i| i as isize),
                _ => return,
            };
            target + 1 - self.caret as isize
        } else {
            delta
        };

        match self.selection {
            Some((a, b)) if !extend => {
                if amount > 0 {
                    self.caret = a.max(b);
                } else if amount < 0 {
                    self.caret = a.min(b);
                }
            }
            _ => {
                self.caret = (self.caret as isize + amount).clamp(0, len as isize) as usize;
            }
        }

        if delete {
            remove_graphemes(&mut self.text, self.caret, original);
            self.caret = self.caret.min(original);
        }

        if !extend {
            self.selection = None;
        } else if let Some((_, active)) = self.selection.as_mut() {
            *active = self.caret;
        } else {
            self.selection = Some((original, self.caret));
        }
    }

    fn erase_selection(&mut self) {
        if let Some((a, b)) = self.selection.take() {
            remove_graphemes(&mut self.text, a, b);
            self.caret = a.min(b).min(self.len());
        }
    }

    pub fn select_all(&mut self) {
        if !self.text.is_empty() {
            self.selection = Some((0, self.len()));
        }
    }

    /// The selected text, if the selection is non-empty.
    pub fn copy(&self) -> Option<String> {
        match self.selection {
            Some((a, b)) if a != b => Some(grapheme_slice(&self.text, a, b).to_string()),
            _ => None,
        }
    }

    /// Remove and return the selected text.
    pub fn cut(&mut self) -> Option<String> {
        self.browsing = false;
        let taken = self.copy()?;
        self.erase_selection();
        self.refresh_suggestions();
        Some(taken)
    }

    pub fn paste(&mut self, clip: &str) {
        self.browsing = false;
        if clip.is_empty() {
            return;
        }
        self.erase_selection();
        insert_at_grapheme(&mut self.text, self.caret, clip);
        self.step(grapheme_count(clip) as isize, false, false, false);
        self.refresh_suggestions();
    }

    /// Enter. Returns whether the text was accepted.
    pub fn commit(&mut self) -> bool {
        self.browsing = false;
        if !self.is_valid(&self.text) {
            debug!(text = %self.text, "commit rejected by validator");
            self.cancel();
            return false;
        }
        if self.options.lose_focus_on_send {
            self.editing = false;
        }
        (self.callbacks.setter)(&self.text);
        if !self.text.is_empty() {
            let text = self.text.clone();
            self.history.retain(|h| *h != text);
            self.history.push(text);
        }
        debug!(text = %self.text, history = self.history.len(), "commit");
        if self.options.clear_on_send {
            self.text.clear();
            self.caret = 0;
        }
        self.refresh_suggestions();
        self.selection = None;
        self.history_offset = 0;
        true
    }

    /// Escape. Drops uncommitted edits.
    pub fn cancel(&mut self) {
        self.editing = false;
        self.browsing = false;
        self.history_offset = 0;
        self.selection = None;
        self.text = self.pull();
        self.caret = self.caret.min(self.len());
        self.suggestions.hide();
    }

    fn pull(&self) -> String {
        match &self.callbacks.getter {
            Some(getter) => getter(),
            None => self.text.clone(),
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    fn can_browse(&self) -> bool {
        self.text.is_empty() || self.browsing
    }

    /// Up. Returns whether history browsing was active.
    pub fn history_prev(&mut self) -> bool {
        if !self.can_browse() {
            return false;
        }
        if !self.browsing {
            self.history_offset = 0;
        }
        self.browsing = true;
        if self.history_offset < self.history.len() {
            self.history_offset += 1;
            self.text = self.history[self.history.len() - self.history_offset].clone();
        }
        self.snap_to_end();
        true
    }

    /// Down. Returns whether history browsing was active.
    pub fn history_next(&mut self) -> bool {
        if !self.can_browse() {
            return false;
        }
        if !self.browsing {
            self.history_offset = 0;
        }
        self.browsing = true;
        if self.history_offset > 0 {
            self.history_offset -= 1;
            self.text = match self.history_offset {
                0 => String::new(),
                n => self.history[self.history.len() - n].clone(),
            };
        }
        self.snap_to_end();
        true
    }

    fn snap_to_end(&mut self) {
        self.caret = self.len();
        self.selection = None;
    }

    // ------------------------------------------------------------------
    // Suggestions
    // ------------------------------------------------------------------

    fn refresh_suggestions(&mut self) {
        let Some(suggest) = &self.callbacks.suggest else {
            return;
        };
        let result: Suggestions = suggest(&self.text);
        self.suggestions.update(result, self.caret);
        self.refreshed = true;
    }

    pub fn cycle_suggestion(&mut self, delta: isize) {
        self.suggestions.cycle(delta);
    }

    /// Replace `[replace_start, caret)` with the highlighted candidate.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(name) = self.suggestions.selected().map(|c| c.name.clone()) else {
            return false;
        };
        let start = self.suggestions.replace_start().min(self.caret);
        remove_graphemes(&mut self.text, start, self.caret);
        insert_at_grapheme(&mut self.text, start, &name);
        self.caret = (start + grapheme_count(&name)).min(self.len());
        self.selection = None;
        self.browsing = false;
        self.refresh_suggestions();
        true
    }
}

fn closer_for(c: char) -> Option<char> {
    PAIRED_DELIMITERS
        .iter()
        .find(|(open, _)| *open == c)
        .map(|&(_, close)| close)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::suggest::Candidate;

    fn editor() -> TextEditor {
        TextEditor::new(Callbacks::default(), EditOptions::default())
    }

    fn editor_with(text: &str) -> TextEditor {
        let mut ed = editor();
        ed.begin_edit();
        ed.set_text(text);
        ed
    }

    fn type_str(ed: &mut TextEditor, s: &str) {
        for c in s.chars() {
            ed.insert_char(c);
        }
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut ed = editor_with("");
        type_str(&mut ed, "abc");
        assert_eq!((ed.text(), ed.caret()), ("abc", 3));
        ed.move_caret(-1, false, false);
        ed.insert_char('X');
        assert_eq!(ed.text(), "abXc");
        ed.backspace(false);
        ed.delete_forward(false);
        assert_eq!((ed.text(), ed.caret()), ("ab", 2));
    }

    #[test]
    fn test_grapheme_clusters_are_single_positions() {
        let mut ed = editor_with("e\u{301}x");
        assert_eq!(ed.caret(), 2);
        ed.move_caret(-1, false, false);
        ed.backspace(false);
        assert_eq!(ed.text(), "x");
        assert_eq!(ed.caret(), 0);
    }

    #[test]
    fn test_combining_mark_keeps_caret_in_place() {
        let mut ed = editor_with("ab");
        ed.move_caret(-1, false, false);
        ed.insert_char('\u{301}');
        assert_eq!(ed.text(), "a\u{301}b");
        assert_eq!(ed.len(), 2);
        // Still between the accented `a` and `b`.
        assert_eq!(ed.caret(), 1);
        ed.insert_char('x');
        assert_eq!(ed.text(), "a\u{301}xb");
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut ed = editor_with("hello");
        ed.select_all();
        ed.insert_char('x');
        assert_eq!((ed.text(), ed.caret(), ed.selection()), ("x", 1, None));
    }

    #[test]
    fn test_paired_delimiter_wraps_selection() {
        let mut ed = editor_with("foo");
        ed.select_all();
        ed.insert_char('(');
        assert_eq!(ed.text(), "(foo)");
        assert_eq!(ed.selection(), Some((1, 4)));

        ed.insert_char('"');
        assert_eq!(ed.text(), "(\"foo\")");
        assert_eq!(ed.selection(), Some((2, 5)));
    }

    #[test]
    fn test_delimiter_without_selection_inserts_plainly() {
        let mut ed = editor_with("ab");
        ed.insert_char('[');
        assert_eq!(ed.text(), "ab[");
        ed.selection = Some((1, 1));
        ed.insert_char('{');
        assert_eq!(ed.text(), "a{b[");
    }

    #[test]
    fn test_max_len_blocks_insertion_unless_selection() {
        let mut ed = TextEditor::new(
            Callbacks::default(),
            EditOptions {
                max_len: Some(3),
                ..EditOptions::default()
            },
        );
        ed.begin_edit();
        type_str(&mut ed, "abcd");
        assert_eq!(ed.text(), "abc");
        assert!(!ed.insert_char('z'));
        ed.select_all();
        assert!(ed.insert_char('z'));
        assert_eq!(ed.text(), "z");
    }

    #[test]
    fn test_word_jump_backward_from_end() {
        let mut ed = editor_with("hello world");
        assert_eq!(ed.caret(), 11);
        ed.move_caret(-1, true, true);
        assert_eq!(ed.caret(), 6);
        assert_eq!(ed.selection(), Some((11, 6)));
        assert_eq!(ed.copy().as_deref(), Some("world"));
    }

    #[test]
    fn test_word_jump_backward_skips_adjacent_separator() {
        let mut ed = editor_with("ab cd");
        ed.caret = 3; // just after the space
        ed.move_caret(-1, false, true);
        assert_eq!(ed.caret(), 0);
    }

    #[test]
    fn test_word_jump_forward_stops_past_nearest_separator() {
        let mut ed = editor_with("one two,three");
        ed.caret = 0;
        ed.move_caret(1, false, true);
        assert_eq!(ed.caret(), 4);
        ed.move_caret(1, false, true);
        assert_eq!(ed.caret(), 8);
        ed.move_caret(1, false, true);
        assert_eq!(ed.caret(), 13);
        ed.move_caret(1, false, true);
        assert_eq!(ed.caret(), 13);
    }

    #[test]
    fn test_word_delete() {
        let mut ed = editor_with("foo bar baz");
        ed.backspace(true);
        assert_eq!((ed.text(), ed.caret()), ("foo bar ", 8));
        ed.caret = 0;
        ed.delete_forward(true);
        assert_eq!((ed.text(), ed.caret()), ("bar ", 0));
    }

    #[test]
    fn test_plain_move_collapses_selection() {
        let mut ed = editor_with("abcdef");
        ed.selection = Some((4, 1));
        ed.move_caret(1, false, false);
        assert_eq!((ed.caret(), ed.selection()), (4, None));

        ed.selection = Some((4, 1));
        ed.move_caret(-1, false, false);
        assert_eq!((ed.caret(), ed.selection()), (1, None));
    }

    #[test]
    fn test_extend_grows_existing_selection() {
        let mut ed = editor_with("abcdef");
        ed.caret = 2;
        ed.move_caret(1, true, false);
        ed.move_caret(1, true, false);
        assert_eq!(ed.selection(), Some((2, 4)));
        ed.move_caret(-3, true, false);
        assert_eq!(ed.selection(), Some((2, 1)));
    }

    #[test]
    fn test_backspace_deletes_selection_exactly() {
        let mut ed = editor_with("abcdef");
        ed.selection = Some((4, 1));
        ed.backspace(false);
        assert_eq!((ed.text(), ed.caret()), ("aef", 1));
    }

    #[test]
    fn test_degenerate_selection_copy_is_noop() {
        let mut ed = editor_with("abcdef");
        ed.selection = Some((2, 2));
        assert_eq!(ed.copy(), None);
        assert_eq!(ed.cut(), None);
        assert_eq!(ed.text(), "abcdef");
    }

    #[test]
    fn test_cut_and_paste() {
        let mut ed = editor_with("hello world");
        ed.caret = 0;
        ed.move_caret(1, true, true);
        assert_eq!(ed.cut().as_deref(), Some("hello "));
        assert_eq!((ed.text(), ed.caret()), ("world", 0));

        ed.move_caret(5, false, false);
        ed.paste(" hello");
        assert_eq!((ed.text(), ed.caret()), ("world hello", 11));

        ed.select_all();
        ed.paste("x");
        assert_eq!((ed.text(), ed.caret(), ed.selection()), ("x", 1, None));

        ed.paste("");
        assert_eq!(ed.text(), "x");
    }

    #[test]
    fn test_select_all_requires_text() {
        let mut ed = editor_with("");
        ed.select_all();
        assert_eq!(ed.selection(), None);
    }

    #[test]
    fn test_commit_calls_setter_and_dedups_history() {
        let sent = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = sent.clone();
        let mut ed = TextEditor::new(
            Callbacks {
                setter: Box::new(move |s| sink.borrow_mut().push(s.to_string())),
                ..Callbacks::default()
            },
            EditOptions {
                clear_on_send: true,
                ..EditOptions::default()
            },
        );
        for word in ["a", "b", "a"] {
            ed.begin_edit();
            type_str(&mut ed, word);
            assert!(ed.commit());
        }
        assert_eq!(ed.history(), ["b", "a"]);
        assert_eq!(*sent.borrow(), vec!["a", "b", "a"]);
        assert_eq!((ed.text(), ed.caret()), ("", 0));
        assert!(!ed.is_editing());
    }

    #[test]
    fn test_commit_empty_text_skips_history() {
        let mut ed = editor_with("");
        assert!(ed.commit());
        assert!(ed.history().is_empty());
    }

    #[test]
    fn test_commit_keeps_focus_when_configured() {
        let mut ed = TextEditor::new(
            Callbacks::default(),
            EditOptions {
                lose_focus_on_send: false,
                ..EditOptions::default()
            },
        );
        ed.begin_edit();
        type_str(&mut ed, "x");
        ed.commit();
        assert!(ed.is_editing());
        assert_eq!(ed.text(), "x");
    }

    #[test]
    fn test_invalid_commit_behaves_as_cancel() {
        let committed = Rc::new(RefCell::new(String::from("42")));
        let source = committed.clone();
        let target = committed.clone();
        let mut ed = TextEditor::new(
            Callbacks {
                getter: Some(Box::new(move || source.borrow().clone())),
                setter: Box::new(move |s| *target.borrow_mut() = s.to_string()),
                validator: Box::new(|s| s.parse::<i32>().is_ok()),
                suggest: None,
            },
            EditOptions::default(),
        );
        assert_eq!(ed.text(), "42");
        ed.begin_edit();
        ed.select_all();
        type_str(&mut ed, "abc");
        assert!(!ed.is_valid(ed.text()));

        assert!(!ed.commit());
        assert_eq!(ed.text(), "42");
        assert!(!ed.is_editing());
        assert_eq!(*committed.borrow(), "42");
        assert!(ed.caret() <= ed.len());
    }

    #[test]
    fn test_cancel_restores_getter_value() {
        let value = Rc::new(RefCell::new(String::from("saved")));
        let source = value.clone();
        let mut ed = TextEditor::new(
            Callbacks {
                getter: Some(Box::new(move || source.borrow().clone())),
                ..Callbacks::default()
            },
            EditOptions::default(),
        );
        ed.begin_edit();
        ed.move_caret(5, false, false);
        type_str(&mut ed, " and more");
        *value.borrow_mut() = "new".to_string();

        ed.cancel();
        assert_eq!(ed.text(), "new");
        assert_eq!(ed.caret(), 3);
        assert_eq!(ed.display_text(), "new");
    }

    #[test]
    fn test_cancel_ends_history_browsing() {
        let mut ed = TextEditor::new(
            Callbacks {
                getter: Some(Box::new(|| "foo".to_string())),
                ..Callbacks::default()
            },
            EditOptions::default(),
        );
        ed.begin_edit();
        ed.set_text("");
        type_str(&mut ed, "old");
        assert!(ed.commit());
        ed.begin_edit();
        ed.set_text("");
        assert!(ed.history_prev());
        assert!(ed.is_browsing());

        ed.cancel();
        assert_eq!(ed.text(), "foo");
        assert!(!ed.is_browsing());

        // Restored text is not empty, so Up no longer browses.
        ed.begin_edit();
        assert!(!ed.history_prev());
        assert_eq!(ed.text(), "foo");

        // From empty text, browsing restarts at the newest entry.
        ed.set_text("");
        assert!(ed.history_prev());
        assert_eq!(ed.text(), "old");
    }

    #[test]
    fn test_cancel_without_getter_keeps_text() {
        let mut ed = editor_with("draft");
        ed.cancel();
        assert_eq!(ed.text(), "draft");
        assert!(!ed.is_editing());
    }

    #[test]
    fn test_history_browsing() {
        let mut ed = TextEditor::new(
            Callbacks::default(),
            EditOptions {
                clear_on_send: true,
                lose_focus_on_send: false,
                max_len: None,
            },
        );
        ed.begin_edit();
        for word in ["one", "two", "three"] {
            type_str(&mut ed, word);
            ed.commit();
        }

        assert!(ed.history_prev());
        assert_eq!((ed.text(), ed.caret()), ("three", 5));
        ed.history_prev();
        ed.history_prev();
        assert_eq!(ed.text(), "one");
        ed.history_prev();
        assert_eq!(ed.text(), "one");

        ed.history_next();
        assert_eq!(ed.text(), "two");
        ed.history_next();
        ed.history_next();
        assert_eq!(ed.text(), "");
        ed.history_next();
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn test_history_inactive_with_unrelated_text() {
        let mut ed = editor_with("typing");
        ed.history.push("old".into());
        assert!(!ed.history_prev());
        assert_eq!(ed.text(), "typing");
    }

    #[test]
    fn test_editing_exits_browsing() {
        let mut ed = editor_with("");
        ed.history.push("old".into());
        ed.history_prev();
        assert!(ed.is_browsing());
        ed.insert_char('!');
        assert!(!ed.is_browsing());
        assert!(!ed.history_prev());
    }

    fn suggesting_editor() -> TextEditor {
        let words = ["print", "pi", "range"];
        TextEditor::new(
            Callbacks {
                suggest: Some(Box::new(move |text: &str| {
                    let start = text.rfind(' ').map_or(0, |i| i + 1);
                    let stem = &text[start..];
                    let candidates = words
                        .iter()
                        .filter(|w| !stem.is_empty() && w.starts_with(stem))
                        .map(|w| Candidate::new(*w, "fn"))
                        .collect();
                    Suggestions::new(grapheme_count(&text[..start]), candidates)
                })),
                ..Callbacks::default()
            },
            EditOptions::default(),
        )
    }

    #[test]
    fn test_suggestions_follow_edits() {
        let mut ed = suggesting_editor();
        ed.begin_edit();
        ed.insert_char('p');
        assert!(ed.take_refreshed());
        assert!(!ed.take_refreshed());
        assert_eq!(ed.suggestions().candidates().len(), 2);

        ed.insert_char('r');
        assert_eq!(ed.suggestions().candidates().len(), 1);

        ed.backspace(false);
        ed.backspace(false);
        assert!(!ed.suggestions().is_visible());
    }

    #[test]
    fn test_accept_suggestion_replaces_stem() {
        let mut ed = suggesting_editor();
        ed.begin_edit();
        type_str(&mut ed, "x = p");
        ed.cycle_suggestion(1);
        assert_eq!(ed.suggestions().selected().unwrap().name, "pi");
        assert!(ed.accept_suggestion());
        assert_eq!((ed.text(), ed.caret()), ("x = pi", 6));
    }

    #[test]
    fn test_accept_without_visible_popup_is_noop() {
        let mut ed = editor_with("abc");
        assert!(!ed.accept_suggestion());
        assert_eq!(ed.text(), "abc");
    }

    #[test]
    fn test_cancel_hides_suggestions() {
        let mut ed = suggesting_editor();
        ed.begin_edit();
        ed.insert_char('p');
        ed.cancel();
        assert!(!ed.suggestions().is_visible());
    }

    #[test]
    fn test_wrap_does_not_recompute_suggestions() {
        let mut ed = suggesting_editor();
        ed.begin_edit();
        ed.insert_char('p');
        ed.take_refreshed();
        ed.select_all();
        ed.insert_char('(');
        assert!(!ed.take_refreshed());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        Backspace(bool),
        Delete(bool),
        Move(isize, bool, bool),
        SelectAll,
        Cut,
        Paste(String),
        Commit,
        Cancel,
        Up,
        Down,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::sample::select(vec!['a', ' ', '.', '(', '"', 'é']).prop_map(Op::Insert),
            any::<bool>().prop_map(Op::Backspace),
            any::<bool>().prop_map(Op::Delete),
            (-3isize..=3, any::<bool>(), any::<bool>()).prop_map(|(d, s, w)| Op::Move(d, s, w)),
            Just(Op::SelectAll),
            Just(Op::Cut),
            "[a-c ,]{0,4}".prop_map(Op::Paste),
            Just(Op::Commit),
            Just(Op::Cancel),
            Just(Op::Up),
            Just(Op::Down),
        ]
    }

    proptest! {
        #[test]
        fn test_caret_and_selection_stay_in_bounds(ops in prop::collection::vec(op(), 0..60)) {
            let mut ed = TextEditor::new(
                Callbacks::default(),
                EditOptions { max_len: Some(12), ..EditOptions::default() },
            );
            ed.begin_edit();
            for op in ops {
                match op {
                    Op::Insert(c) => { ed.insert_char(c); }
                    Op::Backspace(w) => ed.backspace(w),
                    Op::Delete(w) => ed.delete_forward(w),
                    Op::Move(d, s, w) => ed.move_caret(d, s, w),
                    Op::SelectAll => ed.select_all(),
                    Op::Cut => { ed.cut(); }
                    Op::Paste(s) => ed.paste(&s),
                    Op::Commit => { ed.commit(); ed.begin_edit(); }
                    Op::Cancel => { ed.cancel(); ed.begin_edit(); }
                    Op::Up => { ed.history_prev(); }
                    Op::Down => { ed.history_next(); }
                }
                let len = ed.len();
                prop_assert!(ed.caret() <= len);
                if let Some((a, b)) = ed.selection() {
                    prop_assert!(a <= len && b <= len);
                }
            }
        }
    }
}
