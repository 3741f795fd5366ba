//! Style Module — shared drawing primitives.
//!
//! Free functions over a node's own buffer, parameterised by explicit colors
//! so every element kind draws borders and highlights the same way.

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{color_tag, rgb, BorderStyle, Buffer, Cell, CellAttrs};

/// Draw a one-cell bevel around the buffer edge. Top and left edges use the
/// lead color, bottom and right the trailing one; `inset` swaps them.
pub fn draw_bevel(buf: &mut Buffer, light: u32, dark: u32, inset: bool) {
    let (lead, trail) = if inset { (dark, light) } else { (light, dark) };
    draw_frame(buf, BorderStyle::Single, lead, trail);
}

/// Draw the tab-mode focus ring over the buffer edge.
pub fn draw_focus_ring(buf: &mut Buffer, color: u32) {
    draw_frame(buf, BorderStyle::Bold, color, color);
}

fn draw_frame(buf: &mut Buffer, border: BorderStyle, lead: u32, trail: u32) {
    let (w, h) = (buf.width as i32, buf.height as i32);
    if w == 0 || h == 0 {
        return;
    }
    let (tl, tr, bl, br, horiz, vert) = border.chars();
    let mut put = |x: i32, y: i32, ch: char, fg: u32| {
        let bg = buf.get(x as u16, y as u16).map(|c| c.bg).unwrap_or(0);
        buf.put(x, y, Cell::new(ch, fg, bg));
    };

    for col in 1..(w - 1) {
        put(col, 0, horiz, lead);
        if h > 1 {
            put(col, h - 1, horiz, trail);
        }
    }
    for row in 1..(h - 1) {
        put(0, row, vert, lead);
        if w > 1 {
            put(w - 1, row, vert, trail);
        }
    }

    put(0, 0, tl, lead);
    if w > 1 {
        put(w - 1, 0, tr, lead);
    }
    if h > 1 {
        put(0, h - 1, bl, trail);
    }
    if w > 1 && h > 1 {
        put(w - 1, h - 1, br, trail);
    }
}

/// Repaint the background of cells in columns `[x0, x1)` and rows `[y0, y1)`.
pub fn highlight_band(buf: &mut Buffer, x0: i32, x1: i32, y0: i32, y1: i32, bg: u32) {
    for y in y0.max(0)..y1.min(buf.height as i32) {
        for x in x0.max(0)..x1.min(buf.width as i32) {
            if let Some(cell) = buf.get_mut(x as u16, y as u16) {
                cell.bg = bg;
            }
        }
    }
}

/// Write text one grapheme per cell starting at `(x, y)`, stopping before
/// column `max_x`. Cell backgrounds are kept, so this draws over fills and
/// highlight bands.
pub fn write_text(buf: &mut Buffer, x: i32, y: i32, max_x: i32, text: &str, fg: u32, attrs: CellAttrs) {
    let mut col = x;
    for g in text.graphemes(true) {
        if col >= max_x {
            break;
        }
        let ch = g.chars().next().unwrap_or(' ');
        if col >= 0 && y >= 0 {
            if let Some(cell) = buf.get_mut(col as u16, y as u16) {
                cell.ch = ch;
                cell.fg = fg;
                cell.attrs = attrs;
            }
        }
        col += 1;
    }
}

/// Multiply every truecolor channel by `mult`. Cells on the terminal default
/// background get `fallback_bg`.
pub fn tint(buf: &mut Buffer, mult: u32, fallback_bg: u32) {
    for cell in &mut buf.cells {
        cell.fg = multiply(cell.fg, mult);
        cell.bg = if color_tag(cell.bg) == 0x00 {
            fallback_bg
        } else {
            multiply(cell.bg, mult)
        };
    }
}

fn multiply(color: u32, mult: u32) -> u32 {
    if color_tag(color) != 0x01 || color_tag(mult) != 0x01 {
        return color;
    }
    let channel = |shift: u32| (((color >> shift) & 0xFF) * ((mult >> shift) & 0xFF) / 255) as u8;
    rgb(channel(16), channel(8), channel(0))
}

/// Swap a cell's colors in place. Used for the text caret.
pub fn invert_cell(buf: &mut Buffer, x: i32, y: i32, fallback_fg: u32) {
    if x < 0 || y < 0 {
        return;
    }
    if let Some(cell) = buf.get_mut(x as u16, y as u16) {
        let fg = if cell.fg != 0 { cell.fg } else { fallback_fg };
        cell.fg = cell.bg;
        cell.bg = fg;
    }
}
