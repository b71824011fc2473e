use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ParseError;
use crate::prefix::Prefix;

use super::nom_parser::ParsedMessage;

/// One parsed IRC line.
///
/// The command is stored upper-cased; numerics are kept as their three
/// digits. Messages are immutable once parsed and live for one dispatch.
///
/// ```
/// use slirc_client::Message;
///
/// let msg: Message = ":bob!b@host PRIVMSG #rust :hello there".parse().unwrap();
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.source_nickname(), Some("bob"));
/// assert_eq!(msg.params, vec!["#rust", "hello there"]);
/// assert_eq!(msg.to_string(), ":bob!b@host PRIVMSG #rust :hello there");
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Origin of the message, if the server sent one.
    pub prefix: Option<Prefix>,
    /// Command name (upper-case) or numeric.
    pub command: String,
    /// Ordered parameters; the last one may contain spaces.
    pub params: Vec<String>,
}

impl Message {
    /// Build a message without a prefix.
    pub fn new<I, S>(command: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Message {
            prefix: None,
            command: command.to_ascii_uppercase(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Parse one line (terminator optional).
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        ParsedMessage::parse(line).map(Message::from)
    }

    /// Nickname of the sender, when the prefix is a user mask.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Parameter at `index`.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Numeric code, if the command is a three-digit reply.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

impl<'a> From<ParsedMessage<'a>> for Message {
    fn from(parsed: ParsedMessage<'a>) -> Self {
        Message {
            prefix: parsed.prefix.map(Prefix::new_from_str),
            command: parsed.command.to_ascii_uppercase(),
            params: parsed.params.into_iter().map(str::to_owned).collect(),
        }
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

/// Whether the last parameter must be written with a leading `:`.
#[inline]
pub(crate) fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

impl Display for Message {
    /// Serialize without the line terminator.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            if needs_colon_prefix(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_uppercased() {
        let msg: Message = "privmsg #a :b".parse().unwrap();
        assert_eq!(msg.command, "PRIVMSG");
    }

    #[test]
    fn test_numeric() {
        let msg: Message = ":srv 433 * alice :Nickname is already in use".parse().unwrap();
        assert_eq!(msg.numeric(), Some(433));
        assert_eq!(msg.param(1), Some("alice"));

        let msg: Message = "JOIN #a".parse().unwrap();
        assert_eq!(msg.numeric(), None);
        let msg: Message = "1234 x".parse().unwrap();
        assert_eq!(msg.numeric(), None);
    }

    #[test]
    fn test_display_trailing_rules() {
        assert_eq!(Message::new("JOIN", ["#a"]).to_string(), "JOIN #a");
        assert_eq!(Message::new("PART", ["#a", "bye now"]).to_string(), "PART #a :bye now");
        assert_eq!(Message::new("PRIVMSG", ["#a", ""]).to_string(), "PRIVMSG #a :");
        assert_eq!(Message::new("PRIVMSG", ["#a", ":)"]).to_string(), "PRIVMSG #a ::)");
        assert_eq!(Message::new("QUIT", Vec::<String>::new()).to_string(), "QUIT");
    }

    #[test]
    fn test_round_trip_preserves_values() {
        for line in [
            ":nick!user@host PRIVMSG #channel :Hello, world!",
            ":irc.example.net 353 me = #c :@op +voice plain",
            "PING :irc.example.net",
            ":a!b@c PRIVMSG #x ::-)",
        ] {
            let msg: Message = line.parse().unwrap();
            let reparsed: Message = msg.to_string().parse().unwrap();
            assert_eq!(msg, reparsed, "{}", line);
        }
    }
}
