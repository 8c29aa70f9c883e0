use super::sentence::PREFIXES;

const TERMINATOR: &[u8] = b"\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramerEvent {
    /// A complete sentence starting at a recognized prefix, terminator stripped
    Sentence(String),
    /// A terminator arrived but no recognized prefix was buffered
    Unrecognized,
    /// The buffer filled without a terminator and was cleared
    Overflow,
}

/// Accumulates serial bytes into a fixed-capacity buffer and cuts sentences.
///
/// The buffer is cleared on every terminator and whenever it fills, so stale
/// partial data never survives into the next sentence.
#[derive(Debug)]
pub struct SentenceFramer {
    buffer: Vec<u8>,
    capacity: usize,
}

impl SentenceFramer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(TERMINATOR.len() + 1);
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds raw bytes, returning every event they completed in order.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<FramerEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            self.buffer.push(byte);
            if self.buffer.ends_with(TERMINATOR) {
                events.push(self.cut());
            } else if self.buffer.len() >= self.capacity {
                self.buffer.clear();
                events.push(FramerEvent::Overflow);
            }
        }
        events
    }

    fn cut(&mut self) -> FramerEvent {
        let body = &self.buffer[..self.buffer.len() - TERMINATOR.len()];
        let start = PREFIXES
            .iter()
            .filter_map(|prefix| find(body, prefix.as_bytes()))
            .min();
        let event = match start {
            Some(start) => {
                FramerEvent::Sentence(String::from_utf8_lossy(&body[start..]).into_owned())
            }
            None => FramerEvent::Unrecognized,
        };
        self.buffer.clear();
        event
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
