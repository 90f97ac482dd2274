//! Console sinks for flashing tool output
//!
//! The flashing tool draws progress by writing backspace characters over
//! text it has already printed. `ConsoleBuffer` replays that convention so
//! the accumulated text matches what a terminal would show.

use std::io::Write;

/// Append-only destination for raw tool output
pub trait ConsoleSink: Send {
    fn write_chunk(&mut self, chunk: &str);
}

/// Accumulates output, applying `\b` as "delete the previous character"
#[derive(Debug, Clone, Default)]
pub struct ConsoleBuffer {
    text: String,
}

impl ConsoleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one raw chunk. Backspaces may erase text from earlier chunks.
    pub fn push(&mut self, chunk: &str) {
        for c in chunk.chars() {
            if c == '\u{8}' {
                self.text.pop();
            } else {
                self.text.push(c);
            }
        }
    }

    /// Corrected display text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl ConsoleSink for ConsoleBuffer {
    fn write_chunk(&mut self, chunk: &str) {
        self.push(chunk);
    }
}

/// Passes chunks straight to stdout; terminals handle backspace themselves
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn write_chunk(&mut self, chunk: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(chunk.as_bytes()).and_then(|_| stdout.flush()) {
            log::warn!("Failed to write tool output to stdout: {}", e);
        }
    }
}
