//! Shared types, enums, and constants.
//!
//! Everything that crosses module boundaries lives here: geometry, the packed
//! color encoding, cells and buffers, key codes, and the input event shape.

use bitflags::bitflags;

// ============================================================================
// Geometry
// ============================================================================

/// A point in some node's coordinate space. Signed, because translating a
/// position into a child's local space can move it left of or above the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Rectangle with its origin relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(self) -> i32 {
        self.y + self.h as i32
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }
}

// ============================================================================
// Color Encoding (u32)
// ============================================================================
//
// Bits 31-24: Mode tag
//   0x00 = Default (terminal default)
//   0x01 = RGB truecolor (bits 23-0 = 0xRRGGBB)
//   0x02 = Indexed (bits 7-0 = palette index 0-255)

pub const COLOR_DEFAULT: u32 = 0x00000000;

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0x01000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub fn color_tag(color: u32) -> u8 {
    ((color >> 24) & 0xFF) as u8
}

pub fn color_to_crossterm(color: u32) -> Option<crossterm::style::Color> {
    match color_tag(color) {
        0x00 => None,
        0x01 => {
            let r = ((color >> 16) & 0xFF) as u8;
            let g = ((color >> 8) & 0xFF) as u8;
            let b = (color & 0xFF) as u8;
            Some(crossterm::style::Color::Rgb { r, g, b })
        }
        0x02 => {
            let index = (color & 0xFF) as u8;
            Some(crossterm::style::Color::AnsiValue(index))
        }
        _ => None, // Invalid tag — treat as Default
    }
}

// ============================================================================
// Border Style
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Single,
    Double,
    Rounded,
    Bold,
}

impl BorderStyle {
    /// Returns the border characters: (top-left, top-right, bottom-left, bottom-right, horizontal, vertical)
    pub fn chars(self) -> (char, char, char, char, char, char) {
        match self {
            Self::Single => ('┌', '┐', '└', '┘', '─', '│'),
            Self::Double => ('╔', '╗', '╚', '╝', '═', '║'),
            Self::Rounded => ('╭', '╮', '╰', '╯', '─', '│'),
            Self::Bold => ('┏', '┓', '┗', '┛', '━', '┃'),
        }
    }
}

// ============================================================================
// Cell Attributes (bitflags)
// ============================================================================

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellAttrs: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const STRIKETHROUGH = 0b0000_1000;
    }
}

// ============================================================================
// Cell & Buffer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: u32,
    pub bg: u32,
    pub attrs: CellAttrs,
}

impl Cell {
    pub const fn new(ch: char, fg: u32, bg: u32) -> Self {
        Self {
            ch,
            fg,
            bg,
            attrs: CellAttrs::empty(),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(' ', 0, 0)
    }
}

/// Fixed-size cell grid. Every element node owns one sized to its rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = (width as usize) * (height as usize);
        self.cells.resize(size, Cell::default());
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::default();
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[(y as usize) * (self.width as usize) + (x as usize)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            Some(&mut self.cells[(y as usize) * (self.width as usize) + (x as usize)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(slot) = self.get_mut(x, y) {
            *slot = cell;
        }
    }

    /// Signed-coordinate write; anything outside the grid is dropped.
    pub fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && x <= u16::MAX as i32 && y <= u16::MAX as i32 {
            self.set(x as u16, y as u16, cell);
        }
    }

    /// Fill the whole grid with blank cells of the given background.
    pub fn fill(&mut self, bg: u32) {
        for cell in &mut self.cells {
            *cell = Cell::new(' ', 0, bg);
        }
    }

    /// Copy `src` onto this buffer with its top-left corner at `(x, y)`,
    /// clipping whatever falls outside.
    pub fn blit(&mut self, src: &Buffer, x: i32, y: i32) {
        for row in 0..src.height {
            let dy = y + row as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for col in 0..src.width {
                let dx = x + col as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                if let Some(cell) = src.get(col, row) {
                    self.set(dx as u16, dy as u16, *cell);
                }
            }
        }
    }

    /// Row `y` as a string, handy for assertions.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y).map(|c| c.ch))
            .collect()
    }
}

// ============================================================================
// Cell Update (for TerminalBackend trait)
// ============================================================================

#[derive(Debug, Clone)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

// ============================================================================
// Key Code Constants
// ============================================================================
//
// Printable keys use their Unicode code point; named keys live above the
// Latin-1 range.

pub mod key {
    pub const BACKSPACE: u32 = 0x0100;
    pub const ENTER: u32 = 0x0101;
    pub const LEFT: u32 = 0x0102;
    pub const RIGHT: u32 = 0x0103;
    pub const UP: u32 = 0x0104;
    pub const DOWN: u32 = 0x0105;
    pub const HOME: u32 = 0x0106;
    pub const END: u32 = 0x0107;
    pub const PAGE_UP: u32 = 0x0108;
    pub const PAGE_DOWN: u32 = 0x0109;
    pub const TAB: u32 = 0x010A;
    pub const BACK_TAB: u32 = 0x010B;
    pub const DELETE: u32 = 0x010C;
    pub const INSERT: u32 = 0x010D;
    pub const ESCAPE: u32 = 0x010E;
    pub const F1: u32 = 0x0110;
    pub const SPACE: u32 = ' ' as u32;
    pub const BACKTICK: u32 = '`' as u32;
}

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0x01;
        const CTRL  = 0x02;
        const ALT   = 0x04;
        const SUPER = 0x08;
    }
}

// ============================================================================
// Input Events
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PointerDown,
    PointerUp,
    PointerMove,
    /// Synthesized from a motion event; `pos` is the position before the move.
    PointerLeave,
    KeyDown,
    KeyUp,
    TextInput,
    Resize,
}

/// One input event. Which optional fields are present depends on `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub pos: Option<Point>,
    pub rel: Option<Point>,
    pub button: Option<MouseButton>,
    pub key: Option<u32>,
    pub mods: Modifiers,
    pub text: Option<String>,
    pub size: Option<(u16, u16)>,
}

impl Event {
    fn bare(kind: EventKind) -> Self {
        Self {
            kind,
            pos: None,
            rel: None,
            button: None,
            key: None,
            mods: Modifiers::empty(),
            text: None,
            size: None,
        }
    }

    pub fn pointer_down(x: i32, y: i32, button: MouseButton) -> Self {
        Self {
            pos: Some(Point::new(x, y)),
            button: Some(button),
            ..Self::bare(EventKind::PointerDown)
        }
    }

    pub fn pointer_up(x: i32, y: i32, button: MouseButton) -> Self {
        Self {
            pos: Some(Point::new(x, y)),
            button: Some(button),
            ..Self::bare(EventKind::PointerUp)
        }
    }

    pub fn pointer_move(x: i32, y: i32, dx: i32, dy: i32) -> Self {
        Self {
            pos: Some(Point::new(x, y)),
            rel: Some(Point::new(dx, dy)),
            ..Self::bare(EventKind::PointerMove)
        }
    }

    pub fn key_down(code: u32, mods: Modifiers) -> Self {
        Self {
            key: Some(code),
            mods,
            ..Self::bare(EventKind::KeyDown)
        }
    }

    pub fn key_up(code: u32, mods: Modifiers) -> Self {
        Self {
            key: Some(code),
            mods,
            ..Self::bare(EventKind::KeyUp)
        }
    }

    pub fn text_input(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::bare(EventKind::TextInput)
        }
    }

    pub fn resize(width: u16, height: u16) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::bare(EventKind::Resize)
        }
    }

    /// Derive the synthetic leave event for a motion event: same payload,
    /// positioned where the pointer was before it moved.
    pub fn leave_from(motion: &Event) -> Option<Self> {
        if motion.kind != EventKind::PointerMove {
            return None;
        }
        let pos = motion.pos?;
        let rel = motion.rel.unwrap_or_default();
        Some(Self {
            kind: EventKind::PointerLeave,
            pos: Some(pos - rel),
            ..motion.clone()
        })
    }

    pub fn is_primary_press(&self) -> bool {
        self.kind == EventKind::PointerDown && self.button == Some(MouseButton::Left)
    }

    pub fn is_key_down(&self, code: u32) -> bool {
        self.kind == EventKind::KeyDown && self.key == Some(code)
    }

    pub fn ctrl(&self) -> bool {
        self.mods.contains(Modifiers::CTRL)
    }

    pub fn shift(&self) -> bool {
        self.mods.contains(Modifiers::SHIFT)
    }
}
