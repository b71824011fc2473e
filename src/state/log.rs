//! Bounded in-memory message logs.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Lines kept per view before the oldest are dropped.
pub const MAX_LOG_LINES: usize = 500;

/// How a log line was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineKind {
    /// PRIVMSG from someone else.
    Message,
    /// NOTICE.
    Notice,
    /// Sent by this client.
    Own,
}

/// One entry in a channel, conversation or server log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogLine {
    /// When the line was recorded locally.
    pub timestamp: DateTime<Local>,
    /// Nickname or server name of the author.
    pub sender: String,
    /// Message body.
    pub text: String,
    /// Origin of the line.
    pub kind: LineKind,
}

impl LogLine {
    /// Stamp a new line with the current local time.
    pub fn now(sender: impl Into<String>, text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            timestamp: Local::now(),
            sender: sender.into(),
            text: text.into(),
            kind,
        }
    }
}

/// Append-only log that forgets its oldest lines past a capacity.
#[derive(Clone, Debug)]
pub struct MessageLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(MAX_LOG_LINES)
    }
}

impl MessageLog {
    /// Create a log holding at most `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a line, dropping the oldest if full.
    pub fn push(&mut self, line: LogLine) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Fold `other` into this log, interleaving by timestamp. The
    /// capacity still holds; the oldest lines go first.
    pub fn merge(&mut self, other: MessageLog) {
        let mut lines: Vec<LogLine> = self.lines.drain(..).chain(other.lines).collect();
        lines.sort_by_key(|line| line.timestamp);
        let skip = lines.len().saturating_sub(self.capacity);
        self.lines.extend(lines.into_iter().skip(skip));
    }

    /// Lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    /// Most recent line.
    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_drops_oldest() {
        let mut log = MessageLog::with_capacity(2);
        for text in ["one", "two", "three"] {
            log.push(LogLine::now("bob", text, LineKind::Message));
        }
        let texts: Vec<_> = log.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.last().map(|l| l.text.as_str()), Some("three"));
    }

    #[test]
    fn test_merge_interleaves_and_keeps_capacity() {
        let at = |secs: i64, text: &str| LogLine {
            timestamp: DateTime::from_timestamp(secs, 0)
                .expect("valid timestamp")
                .with_timezone(&Local),
            sender: "bob".into(),
            text: text.into(),
            kind: LineKind::Message,
        };

        let mut log = MessageLog::with_capacity(3);
        log.push(at(1, "a"));
        log.push(at(3, "c"));
        let mut other = MessageLog::default();
        other.push(at(2, "b"));
        other.push(at(4, "d"));

        log.merge(other);
        let texts: Vec<_> = log.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);
    }
}
