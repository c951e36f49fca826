//! Command line assembly from received bytes

use heapless::Vec;

use crate::config::LINE_BUFFER_SIZE;

pub const BACKSPACE: u8 = 0x08;
pub const DELETE: u8 = 0x7F;
pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';

pub type Line = Vec<u8, LINE_BUFFER_SIZE>;

/// Outcome of feeding one byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feed {
    /// Byte appended to the line
    Stored,
    /// Previous byte removed
    Erased,
    /// Backspace on an empty line
    Ignored,
    /// LF completing a CRLF pair, the line was already dispatched on the CR
    Swallowed,
    /// Line ended by CR or LF, take it with [`LineBuffer::take`]
    Complete,
    /// Line too long, buffer cleared
    Overflow,
}

#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Line,
    after_cr: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            after_cr: false,
        }
    }

    pub fn feed(&mut self, byte: u8) -> Feed {
        let after_cr = core::mem::replace(&mut self.after_cr, false);

        match byte {
            LF if after_cr => Feed::Swallowed,
            CR | LF => {
                self.after_cr = byte == CR;
                Feed::Complete
            }
            BACKSPACE | DELETE => match self.buf.pop() {
                Some(_) => Feed::Erased,
                None => Feed::Ignored,
            },
            _ => match self.buf.push(byte) {
                Ok(()) => Feed::Stored,
                Err(_) => {
                    self.buf.clear();
                    Feed::Overflow
                }
            },
        }
    }

    /// Hand out the finished line and start a new one
    pub fn take(&mut self) -> Line {
        core::mem::take(&mut self.buf)
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(buffer: &mut LineBuffer, bytes: &[u8]) -> Feed {
        let mut last = Feed::Ignored;
        for &byte in bytes {
            last = buffer.feed(byte);
        }
        last
    }

    #[test]
    fn collects_until_terminator() {
        let mut buffer = LineBuffer::new();
        assert_eq!(feed_all(&mut buffer, b"help"), Feed::Stored);
        assert_eq!(buffer.feed(CR), Feed::Complete);
        assert_eq!(buffer.take().as_slice(), b"help");
        assert!(buffer.as_bytes().is_empty());
    }

    #[test]
    fn crlf_completes_once() {
        let mut buffer = LineBuffer::new();
        feed_all(&mut buffer, b"status");
        assert_eq!(buffer.feed(CR), Feed::Complete);
        buffer.take();
        assert_eq!(buffer.feed(LF), Feed::Swallowed);
        assert_eq!(buffer.feed(LF), Feed::Complete);
        assert_eq!(buffer.feed(CR), Feed::Complete);
    }

    #[test]
    fn backspace_edits_the_line() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.feed(BACKSPACE), Feed::Ignored);
        feed_all(&mut buffer, b"helo");
        assert_eq!(buffer.feed(DELETE), Feed::Erased);
        feed_all(&mut buffer, b"p");
        assert_eq!(buffer.as_bytes(), b"help");
    }

    #[test]
    fn overflow_clears() {
        let mut buffer = LineBuffer::new();
        assert_eq!(feed_all(&mut buffer, &[b'x'; LINE_BUFFER_SIZE]), Feed::Stored);
        assert_eq!(buffer.feed(b'x'), Feed::Overflow);
        assert!(buffer.as_bytes().is_empty());
    }
}
