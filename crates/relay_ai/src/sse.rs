//! Newline-delimited event framing shared by every protocol adapter.
//!
//! Network reads can split an event anywhere, including inside a multi-byte
//! character, so bytes are buffered raw and only converted to text one
//! complete line at a time. The trailing fragment of a read is never
//! dropped: it stays in the buffer until the next read completes it, or
//! until [`LineBuffer::finish`] flushes it at end of stream.

// ---------------------------------------------------------------------------
// Line buffering
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one network read and drain every line it completes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let rest = self.buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buf, rest);
            line.pop(); // the newline itself
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream has closed, if anything. Servers
    /// normally terminate the last event with a newline, so this is usually
    /// `None`.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.buf).into_owned())
        }
    }
}

// ---------------------------------------------------------------------------
// Event field extraction
// ---------------------------------------------------------------------------

/// The payload of a `data:` line. Blank lines, `:` comments, and other SSE
/// fields (`event:`, `id:`, ...) yield `None`.
pub(crate) fn data_payload(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data: ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
