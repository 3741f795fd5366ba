//! Clipboard capability.
//!
//! Text widgets never touch the system clipboard directly; the overlay hands
//! them a `&mut dyn Clipboard`. A failing clipboard only means "nothing to
//! paste this frame".

use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};

pub trait Clipboard {
    /// Current clipboard contents, if any are available.
    fn get(&mut self) -> Option<String>;
    /// Stage `text` as the new clipboard contents.
    fn set(&mut self, text: &str);
}

/// Process-local clipboard. The default for hosts that don't wire one in.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    content: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn get(&mut self) -> Option<String> {
        self.content.clone()
    }

    fn set(&mut self, text: &str) {
        self.content = Some(text.to_string());
    }
}

/// Writes copies to the hosting terminal with OSC 52 so they reach the
/// system clipboard (terminal permitting). Terminals rarely answer OSC 52
/// queries, so pastes come from the last staged copy.
#[derive(Debug)]
pub struct Osc52Clipboard<W: Write> {
    writer: W,
    staged: Option<String>,
    max_payload: usize,
}

impl<W: Write> Osc52Clipboard<W> {
    /// Common terminal limit on the base64 payload.
    pub const DEFAULT_MAX_PAYLOAD: usize = 74_994;

    pub fn new(writer: W) -> Self {
        Self {
            writer,
            staged: None,
            max_payload: Self::DEFAULT_MAX_PAYLOAD,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn sequence(&self, text: &str) -> Option<String> {
        let payload = STANDARD.encode(text.as_bytes());
        if payload.len() > self.max_payload {
            return None;
        }
        Some(format!("\x1b]52;c;{payload}\x07"))
    }
}

impl Osc52Clipboard<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn get(&mut self) -> Option<String> {
        self.staged.clone()
    }

    fn set(&mut self, text: &str) {
        self.staged = Some(text.to_string());
        let Some(seq) = self.sequence(text) else {
            tracing::warn!(bytes = text.len(), "clipboard payload exceeds OSC 52 limit");
            return;
        };
        if let Err(e) = self
            .writer
            .write_all(seq.as_bytes())
            .and_then(|()| self.writer.flush())
        {
            tracing::warn!(error = %e, "OSC 52 clipboard write failed");
        }
    }
}
