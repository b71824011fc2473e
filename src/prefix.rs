//! IRC message prefix (source) types.
//!
//! An IRC message prefix identifies the origin of a message. It can be either
//! a server name or a user's `nick!user@host` mask.

use std::fmt;

/// IRC message prefix - identifies the origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prefix {
    /// Server name (e.g., "irc.example.com")
    ServerName(String),
    /// User prefix: (nickname, username, hostname); user and host may be empty
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix string into a Prefix.
    ///
    /// This is a lenient parser that does not validate the components. A dot
    /// in the leading name (before any `!` or `@`) marks a server name.
    ///
    /// ```
    /// use slirc_client::Prefix;
    ///
    /// assert_eq!(Prefix::new_from_str("irc.example.net"), Prefix::ServerName("irc.example.net".into()));
    /// assert_eq!(Prefix::new_from_str("bob!b@host.example").nick(), Some("bob"));
    /// ```
    pub fn new_from_str(s: &str) -> Self {
        let (name, user, host) = match s.split_once('@') {
            Some((front, host)) => match front.split_once('!') {
                Some((name, user)) => (name, user, host),
                None => (front, "", host),
            },
            None => match s.split_once('!') {
                Some((name, user)) => (name, user, ""),
                None => (s, "", ""),
            },
        };

        if user.is_empty() && host.is_empty() && name.contains('.') {
            Prefix::ServerName(name.to_owned())
        } else {
            Prefix::Nickname(name.to_owned(), user.to_owned(), host.to_owned())
        }
    }

    /// Get the nickname if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// Name to show as the sender: the nickname or the server name.
    pub fn display_name(&self) -> &str {
        match self {
            Prefix::ServerName(name) => name,
            Prefix::Nickname(nick, _, _) => nick,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}
