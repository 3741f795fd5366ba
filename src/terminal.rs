//! TerminalBackend trait + CrosstermBackend implementation.
//!
//! The overlay depends on this trait, not on crossterm directly. Backends turn
//! raw terminal input into [`Event`]s and write cell diffs; the headless and
//! mock backends make the whole stack testable without a terminal.

use crossterm::event::{
    self as ct, KeyCode, KeyEventKind, KeyModifiers, MouseButton as CtButton, MouseEventKind,
};

use crate::error::{OverlayError, Result};
use crate::types::{key, CellUpdate, Event, Modifiers, MouseButton, Point};

// ============================================================================
// TerminalBackend Trait
// ============================================================================

pub trait TerminalBackend {
    fn init(&mut self) -> Result<()>;
    fn shutdown(&mut self) -> Result<()>;
    fn size(&self) -> (u16, u16);
    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn read_events(&mut self, timeout_ms: u32) -> Vec<Event>;
}

fn backend_err(what: &str) -> impl FnOnce(std::io::Error) -> OverlayError + '_ {
    move |e| OverlayError::Backend(format!("{what}: {e}"))
}

// ============================================================================
// Input translation
// ============================================================================

fn map_modifiers(m: KeyModifiers) -> Modifiers {
    let mut mods = Modifiers::empty();
    if m.contains(KeyModifiers::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    if m.contains(KeyModifiers::CONTROL) {
        mods |= Modifiers::CTRL;
    }
    if m.contains(KeyModifiers::ALT) {
        mods |= Modifiers::ALT;
    }
    if m.contains(KeyModifiers::SUPER) {
        mods |= Modifiers::SUPER;
    }
    mods
}

fn map_key_code(code: KeyCode) -> Option<u32> {
    Some(match code {
        KeyCode::Char(c) => c as u32,
        KeyCode::Backspace => key::BACKSPACE,
        KeyCode::Enter => key::ENTER,
        KeyCode::Left => key::LEFT,
        KeyCode::Right => key::RIGHT,
        KeyCode::Up => key::UP,
        KeyCode::Down => key::DOWN,
        KeyCode::Home => key::HOME,
        KeyCode::End => key::END,
        KeyCode::PageUp => key::PAGE_UP,
        KeyCode::PageDown => key::PAGE_DOWN,
        KeyCode::Tab => key::TAB,
        KeyCode::BackTab => key::BACK_TAB,
        KeyCode::Delete => key::DELETE,
        KeyCode::Insert => key::INSERT,
        KeyCode::Esc => key::ESCAPE,
        KeyCode::F(n) if n >= 1 => key::F1 + (n as u32 - 1),
        _ => return None,
    })
}

/// Stateful crossterm → [`Event`] translation. Tracks the last pointer
/// position so motion events carry a relative delta.
#[derive(Debug, Default)]
pub struct InputTranslator {
    last_pointer: Option<Point>,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, raw: ct::Event, out: &mut Vec<Event>) {
        match raw {
            ct::Event::Key(k) => {
                let Some(code) = map_key_code(k.code) else {
                    return;
                };
                let mods = map_modifiers(k.modifiers);
                match k.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        out.push(Event::key_down(code, mods));
                        if let KeyCode::Char(c) = k.code {
                            if !mods.intersects(Modifiers::CTRL | Modifiers::ALT) {
                                out.push(Event::text_input(c.to_string()));
                            }
                        }
                    }
                    KeyEventKind::Release => out.push(Event::key_up(code, mods)),
                }
            }
            ct::Event::Mouse(m) => {
                let (x, y) = (m.column as i32, m.row as i32);
                let pos = Point::new(x, y);
                let mut event = match m.kind {
                    MouseEventKind::Down(b) => Event::pointer_down(x, y, map_button(b)),
                    MouseEventKind::Up(b) => Event::pointer_up(x, y, map_button(b)),
                    MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                        let rel = self.last_pointer.map_or(Point::default(), |last| pos - last);
                        Event::pointer_move(x, y, rel.x, rel.y)
                    }
                    _ => return,
                };
                event.mods = map_modifiers(m.modifiers);
                self.last_pointer = Some(pos);
                out.push(event);
            }
            ct::Event::Resize(w, h) => out.push(Event::resize(w, h)),
            _ => {}
        }
    }
}

fn map_button(b: CtButton) -> MouseButton {
    match b {
        CtButton::Left => MouseButton::Left,
        CtButton::Middle => MouseButton::Middle,
        CtButton::Right => MouseButton::Right,
    }
}

// ============================================================================
// CrosstermBackend
// ============================================================================

pub struct CrosstermBackend {
    width: u16,
    height: u16,
    input: InputTranslator,
}

impl CrosstermBackend {
    pub fn new() -> Self {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        Self {
            width: w,
            height: h,
            input: InputTranslator::new(),
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBackend for CrosstermBackend {
    fn init(&mut self) -> Result<()> {
        use crossterm::{
            cursor,
            event::EnableMouseCapture,
            terminal::{enable_raw_mode, EnterAlternateScreen},
            ExecutableCommand,
        };

        enable_raw_mode().map_err(backend_err("raw mode"))?;
        let mut stdout = std::io::stdout();
        stdout
            .execute(EnterAlternateScreen)
            .map_err(backend_err("alternate screen"))?;
        stdout
            .execute(EnableMouseCapture)
            .map_err(backend_err("mouse capture"))?;
        // The caret is an inverted cell; the OS cursor would trail the last
        // written cell.
        stdout.execute(cursor::Hide).map_err(backend_err("hide cursor"))?;

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        self.width = w;
        self.height = h;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        use crossterm::{
            cursor,
            event::DisableMouseCapture,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
            ExecutableCommand,
        };

        let mut stdout = std::io::stdout();
        stdout.execute(cursor::Show).map_err(backend_err("show cursor"))?;
        stdout
            .execute(DisableMouseCapture)
            .map_err(backend_err("disable mouse"))?;
        stdout
            .execute(LeaveAlternateScreen)
            .map_err(backend_err("leave alternate screen"))?;
        disable_raw_mode().map_err(backend_err("disable raw mode"))?;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        crossterm::terminal::size().unwrap_or((self.width, self.height))
    }

    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<()> {
        use crate::types::{color_to_crossterm, CellAttrs};
        use crossterm::{
            cursor::MoveTo,
            style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
            QueueableCommand,
        };

        let mut stdout = std::io::stdout();

        for update in diff {
            let cell = &update.cell;
            stdout
                .queue(MoveTo(update.x, update.y))
                .map_err(backend_err("move"))?;
            stdout
                .queue(SetForegroundColor(color_to_crossterm(cell.fg).unwrap_or(Color::Reset)))
                .map_err(backend_err("fg"))?;
            stdout
                .queue(SetBackgroundColor(color_to_crossterm(cell.bg).unwrap_or(Color::Reset)))
                .map_err(backend_err("bg"))?;

            for (flag, attr) in [
                (CellAttrs::BOLD, Attribute::Bold),
                (CellAttrs::ITALIC, Attribute::Italic),
                (CellAttrs::UNDERLINE, Attribute::Underlined),
                (CellAttrs::STRIKETHROUGH, Attribute::CrossedOut),
            ] {
                if cell.attrs.contains(flag) {
                    stdout.queue(SetAttribute(attr)).map_err(backend_err("attr"))?;
                }
            }

            stdout.queue(Print(cell.ch)).map_err(backend_err("print"))?;
            stdout
                .queue(SetAttribute(Attribute::Reset))
                .map_err(backend_err("reset"))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush().map_err(backend_err("flush"))
    }

    fn read_events(&mut self, timeout_ms: u32) -> Vec<Event> {
        let mut events = Vec::new();
        let timeout = std::time::Duration::from_millis(timeout_ms as u64);

        if ct::poll(timeout).unwrap_or(false) {
            while ct::poll(std::time::Duration::ZERO).unwrap_or(false) {
                match ct::read() {
                    Ok(raw) => {
                        if let ct::Event::Resize(w, h) = &raw {
                            self.width = *w;
                            self.height = *h;
                        }
                        self.input.translate(raw, &mut events);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal read failed");
                        break;
                    }
                }
            }
        }
        events
    }
}

// ============================================================================
// HeadlessBackend (for CI environments)
// ============================================================================

pub struct HeadlessBackend {
    pub width: u16,
    pub height: u16,
}

impl HeadlessBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl TerminalBackend for HeadlessBackend {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_diff(&mut self, _diff: &[CellUpdate]) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_events(&mut self, _timeout_ms: u32) -> Vec<Event> {
        Vec::new()
    }
}

// ============================================================================
// MockBackend (records output, replays injected input)
// ============================================================================

pub struct MockBackend {
    pub width: u16,
    pub height: u16,
    pub diff_log: Vec<CellUpdate>,
    pub injected_events: Vec<Event>,
    pub flushes: usize,
}

impl MockBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            diff_log: Vec::new(),
            injected_events: Vec::new(),
            flushes: 0,
        }
    }

    pub fn inject(&mut self, events: impl IntoIterator<Item = Event>) {
        self.injected_events.extend(events);
    }
}

impl TerminalBackend for MockBackend {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<()> {
        self.diff_log.extend_from_slice(diff);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn read_events(&mut self, _timeout_ms: u32) -> Vec<Event> {
        std::mem::take(&mut self.injected_events)
    }
}
