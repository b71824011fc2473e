//! Line framing.
//!
//! [`LineFramer`] is the sans-IO splitter: feed it whatever the socket
//! returned and it hands back every complete line, keeping the unterminated
//! tail for the next call. [`LineCodec`] applies the same rule inside a
//! tokio codec and adds a bound on the carry-over buffer.
//!
//! Lines end at LF. A CR right before the LF is part of the terminator and is
//! stripped, so servers sending bare LF work too. Bytes are decoded as UTF-8
//! lossily: an invalid sequence becomes U+FFFD instead of losing the line.

use bytes::BytesMut;

/// Longest line the codec buffers before giving up (IRCv3 tags included).
pub const MAX_LINE_LEN: usize = 8191;

/// Split one complete line off the front of `buf`.
///
/// `scan_from` remembers how far a previous call already searched, so bytes
/// are never rescanned. The returned line has its terminator removed.
fn split_line(buf: &mut BytesMut, scan_from: &mut usize) -> Option<String> {
    let offset = buf[*scan_from..].iter().position(|b| *b == b'\n');
    match offset {
        Some(offset) => {
            let end = *scan_from + offset;
            let mut line = buf.split_to(end + 1);
            *scan_from = 0;

            line.truncate(end);
            if line.last() == Some(&b'\r') {
                line.truncate(end - 1);
            }
            Some(String::from_utf8_lossy(&line).into_owned())
        }
        None => {
            *scan_from = buf.len();
            None
        }
    }
}

/// Incremental splitter from byte chunks to protocol lines.
///
/// ```
/// use slirc_client::line::LineFramer;
///
/// let mut framer = LineFramer::new();
/// assert!(framer.push(b"PING :ab").is_empty());
/// assert_eq!(framer.push(b"c\r\nPI"), vec!["PING :abc".to_string()]);
/// assert_eq!(framer.pending(), 2);
/// ```
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
    next_index: usize,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(line) = split_line(&mut self.buffer, &mut self.next_index) {
            lines.push(line);
        }
        lines
    }

    /// Number of buffered bytes not yet forming a complete line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Take the unterminated tail, leaving the framer empty.
    pub fn take_pending(&mut self) -> BytesMut {
        self.next_index = 0;
        self.buffer.split()
    }
}

/// Errors raised by [`LineCodec`].
#[derive(Debug, thiserror::Error)]
pub enum LineCodecError {
    /// The unterminated tail grew past the limit.
    #[error("line exceeds {limit} bytes")]
    LineTooLong {
        /// Buffer limit.
        limit: usize,
    },
    /// Socket failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tokio codec reading CRLF/LF-terminated lines and writing raw lines.
///
/// Outgoing items must already carry their terminator; the command encoder
/// produces them that way.
#[cfg(feature = "tokio")]
#[derive(Debug)]
pub struct LineCodec {
    next_index: usize,
    max_len: usize,
}

#[cfg(feature = "tokio")]
impl LineCodec {
    /// Create a codec with the default limit of [`MAX_LINE_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a codec with a custom limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

#[cfg(feature = "tokio")]
impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "tokio")]
impl tokio_util::codec::Decoder for LineCodec {
    type Item = String;
    type Error = LineCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, LineCodecError> {
        if let Some(line) = split_line(src, &mut self.next_index) {
            return Ok(Some(line));
        }
        if src.len() > self.max_len {
            return Err(LineCodecError::LineTooLong {
                limit: self.max_len,
            });
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, LineCodecError> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                // An unterminated tail at EOF is not a line; drop it quietly.
                if !src.is_empty() {
                    tracing::debug!(bytes = src.len(), "discarding unterminated tail at eof");
                    src.clear();
                }
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

#[cfg(feature = "tokio")]
impl tokio_util::codec::Encoder<String> for LineCodec {
    type Error = LineCodecError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), LineCodecError> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}
