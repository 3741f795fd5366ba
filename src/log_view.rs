//! Scrollback element showing the tail of a [`LogBuffer`].

use std::any::Any;

use crate::element::{Element, EventCx, RenderCx};
use crate::sink::LogBuffer;
use crate::style;
use crate::text_utils::truncate_with_ellipsis;
use crate::types::{key, Buffer, CellAttrs, Event, EventKind};

pub struct LogView {
    log: LogBuffer,
    /// Lines scrolled back from the newest.
    scroll: usize,
}

impl LogView {
    pub fn new(log: LogBuffer) -> Self {
        Self { log, scroll: 0 }
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Lines shown for a view of `rows` inner rows, oldest first.
    pub fn visible_lines(&self, rows: usize) -> Vec<String> {
        let all = self.log.lines();
        let end = all.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(rows);
        all[start..end].to_vec()
    }
}

impl Element for LogView {
    fn handle_event(&mut self, event: &Event, cx: &mut EventCx<'_>) -> bool {
        if event.kind != EventKind::KeyDown || !cx.focused {
            return false;
        }
        let page = (cx.size.1 as usize).saturating_sub(2).max(1);
        let max_scroll = self.log.len().saturating_sub(page);
        match event.key {
            Some(key::PAGE_UP) => self.scroll = (self.scroll + page).min(max_scroll),
            Some(key::PAGE_DOWN) => self.scroll = self.scroll.saturating_sub(page),
            Some(key::END) => self.scroll = 0,
            _ => return false,
        }
        true
    }

    fn render_body(&mut self, buf: &mut Buffer, cx: &RenderCx<'_>) {
        buf.fill(cx.theme.secondary);
        let rows = (buf.height as usize).saturating_sub(2);
        let cols = (buf.width as usize).saturating_sub(2);
        for (i, line) in self.visible_lines(rows).iter().enumerate() {
            let shown = truncate_with_ellipsis(line, cols);
            style::write_text(
                buf,
                1,
                i as i32 + 1,
                buf.width as i32 - 1,
                &shown,
                cx.theme.secondary_text,
                CellAttrs::empty(),
            );
        }
    }

    fn inset(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
