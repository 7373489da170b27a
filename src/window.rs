// src/window.rs
use std::collections::VecDeque;

/// Default cap on rendered log lines.
pub const MAX_LINES: usize = 500;

/// Bounded buffer of recently rendered log lines. Oldest lines beyond the
/// cap are discarded. This bounds the display only; extraction values are
/// never trimmed.
#[derive(Debug)]
pub struct DisplayWindow {
    max_lines: usize,
    lines: VecDeque<String>,
}

impl DisplayWindow {
    pub fn new(max_lines: usize) -> Self {
        DisplayWindow {
            max_lines,
            lines: VecDeque::with_capacity(max_lines.min(MAX_LINES)),
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);

        // Keep buffer at target size
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// The most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self::new(MAX_LINES)
    }
}
