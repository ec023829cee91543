/// Longest partial line kept while waiting for its terminator.
const MAX_PENDING_LINE: usize = 4096;

/// Most lines one reply may carry; a longer continuation run is cut here.
const MAX_REPLY_LINES: usize = 256;

/// A complete SMTP reply. Multi-line replies (`250-...` continuations) are
/// reassembled, so `lines` holds every raw line including the code prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }
}

/// Accumulates inbound bytes and yields replies once they are complete,
/// whatever the chunking of the underlying stream.
#[derive(Debug, Default)]
pub(crate) struct ReplyBuffer {
    pending: Vec<u8>,
    lines: Vec<String>,
}

impl ReplyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and drains every reply it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Reply> {
        self.pending.extend_from_slice(chunk);
        let mut replies = Vec::new();
        while let Some(line) = self.next_line() {
            self.lines.push(line);
            let last = !is_continuation(&self.lines[self.lines.len() - 1])
                || self.lines.len() >= MAX_REPLY_LINES;
            if last {
                let lines = std::mem::take(&mut self.lines);
                replies.push(Reply {
                    code: reply_code(&lines[0]),
                    lines,
                });
            }
        }
        replies
    }

    fn next_line(&mut self) -> Option<String> {
        let end = match self.pending.iter().position(|byte| *byte == b'\n') {
            Some(pos) => pos + 1,
            None if self.pending.len() > MAX_PENDING_LINE => self.pending.len(),
            None => return None,
        };
        let mut raw: Vec<u8> = self.pending.drain(..end).collect();
        if raw.ends_with(b"\n") {
            raw.pop();
        }
        if raw.ends_with(b"\r") {
            raw.pop();
        }
        Some(String::from_utf8_lossy(&raw).into_owned())
    }
}

fn is_continuation(line: &str) -> bool {
    line.as_bytes().get(3) == Some(&b'-') && line.as_bytes()[..3].iter().all(u8::is_ascii_digit)
}

/// The 3-digit status prefix, or 0 when the line does not start with one.
fn reply_code(line: &str) -> u16 {
    match line.as_bytes().get(..3) {
        Some(digits) if digits.iter().all(u8::is_ascii_digit) => digits
            .iter()
            .fold(0, |code, digit| code * 10 + u16::from(digit - b'0')),
        _ => 0,
    }
}
