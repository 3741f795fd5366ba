//! Output capability.
//!
//! Code that wants to print into the overlay takes a `&mut dyn LineSink`
//! instead of writing to stdout. [`LogBuffer`] is the sink the overlay's
//! log view draws from; it also plugs into `tracing_subscriber` as a writer
//! so diagnostics land in the same place.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

pub trait LineSink {
    fn write_line(&mut self, line: &str);
}

impl<F: FnMut(&str)> LineSink for F {
    fn write_line(&mut self, line: &str) {
        self(line)
    }
}

#[derive(Debug)]
struct Lines {
    lines: VecDeque<String>,
    capacity: usize,
    /// Bytes written without a trailing newline yet.
    partial: Vec<u8>,
}

impl Lines {
    fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.partial.extend_from_slice(bytes);
        while let Some(nl) = self.partial.iter().position(|&b| b == b'\n') {
            let rest = self.partial.split_off(nl + 1);
            let mut raw = std::mem::replace(&mut self.partial, rest);
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            self.push(String::from_utf8_lossy(&raw).into_owned());
        }
    }
}

/// Bounded, shared ring of output lines. Clones share storage.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Lines>>,
}

impl LogBuffer {
    pub const DEFAULT_CAPACITY: usize = 500;

    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Lines {
                lines: VecDeque::with_capacity(capacity.min(4096)),
                capacity,
                partial: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lines> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_line(&self, line: impl Into<String>) {
        let line: String = line.into();
        let mut inner = self.lock();
        for part in line.split('\n') {
            inner.push(part.to_string());
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.iter().cloned().collect()
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let inner = self.lock();
        let skip = inner.lines.len().saturating_sub(n);
        inner.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.lines.clear();
        inner.partial.clear();
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl LineSink for LogBuffer {
    fn write_line(&mut self, line: &str) {
        self.push_line(line);
    }
}

/// `io::Write` handle splitting output into lines.
pub struct LogWriter {
    buffer: LogBuffer,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().push_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.clone(),
        }
    }
}
