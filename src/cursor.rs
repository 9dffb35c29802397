//! Pull-based line cursor
//!
//! Command handlers consume lines at their own pace through this cursor.
//! One cursor exists per scanned file and it is never shared between
//! threads.

/// Stateful position over the fixed lines of one file.
#[derive(Debug, Clone)]
pub struct LineCursor {
    lines: Vec<String>,
    index: usize,
}

impl LineCursor {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines, index: 0 }
    }

    /// Split `content` on `\n`, the way the scanner numbers lines.
    ///
    /// A trailing newline yields a final empty line. A `\r` before each
    /// `\n` is dropped, so CRLF files produce the same lines as LF files.
    pub fn from_content(content: &str) -> Self {
        Self::new(
            content
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect(),
        )
    }

    /// Current line without advancing. `None` at end of input.
    pub fn peek(&self) -> Option<&str> {
        self.lines.get(self.index).map(String::as_str)
    }

    /// Current line, advancing by one. `None` at end of input.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&str> {
        let line = self.lines.get(self.index)?;
        self.index += 1;
        Some(line.as_str())
    }

    /// Consume lines up to, not including, the first one matching
    /// `predicate`. Runs to end of input when nothing matches.
    pub fn take_until<P>(&mut self, mut predicate: P) -> Vec<String>
    where
        P: FnMut(&str) -> bool,
    {
        let mut taken = Vec::new();
        while let Some(line) = self.lines.get(self.index) {
            if predicate(line) {
                break;
            }
            taken.push(line.clone());
            self.index += 1;
        }
        taken
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.lines.len()
    }
}
