//! Typed view over incoming IRC commands.
//!
//! [`Command::classify`] borrows from a [`Message`] and sorts it into the
//! verbs the dispatcher acts on. A known verb with too few parameters is
//! treated as [`Command::Unknown`] rather than an error, so a misbehaving
//! server can never take the session down.

use crate::message::Message;
use crate::response::Response;

/// An incoming command the client knows how to handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// `PING <token>`
    Ping { token: &'a str },
    /// `ERROR :<reason>`
    Error { reason: &'a str },
    /// `NICK <new>`
    Nick { nickname: &'a str },
    /// `JOIN <channel>`
    Join { channel: &'a str },
    /// `PART <channel> [:reason]`
    Part {
        channel: &'a str,
        reason: Option<&'a str>,
    },
    /// `QUIT [:reason]`
    Quit { reason: Option<&'a str> },
    /// `KICK <channel> <nick> [:reason]`
    Kick {
        channel: &'a str,
        nick: &'a str,
        reason: Option<&'a str>,
    },
    /// `PRIVMSG <target> :<text>`
    Privmsg { target: &'a str, text: &'a str },
    /// `NOTICE <target> :<text>`
    Notice { target: &'a str, text: &'a str },
    /// `TOPIC <channel> :<topic>`
    Topic { channel: &'a str, topic: &'a str },
    /// A numeric reply the client names.
    Response(Response, &'a [String]),
    /// Any other three-digit numeric.
    Numeric(u16, &'a [String]),
    /// Anything else, including malformed known verbs.
    Unknown,
}

impl<'a> Command<'a> {
    /// Classify a parsed message.
    ///
    /// ```
    /// use slirc_client::{Command, Message};
    ///
    /// let msg: Message = ":bob!b@h PART #rust :later".parse().unwrap();
    /// assert_eq!(
    ///     Command::classify(&msg),
    ///     Command::Part { channel: "#rust", reason: Some("later") }
    /// );
    /// ```
    pub fn classify(msg: &'a Message) -> Self {
        let p = |i: usize| msg.param(i);
        let params = msg.params.as_slice();

        if let Some(code) = msg.numeric() {
            return match Response::from_code(code) {
                Some(response) => Command::Response(response, params),
                None => Command::Numeric(code, params),
            };
        }

        let command = match (msg.command.as_str(), params.len()) {
            // Some servers send a bare PING.
            ("PING", _) => Some(Command::Ping {
                token: p(0).unwrap_or(""),
            }),
            ("ERROR", _) => Some(Command::Error {
                reason: p(0).unwrap_or(""),
            }),
            ("NICK", n) if n >= 1 => p(0).map(|nickname| Command::Nick { nickname }),
            ("JOIN", n) if n >= 1 => p(0).map(|channel| Command::Join { channel }),
            ("PART", n) if n >= 1 => p(0).map(|channel| Command::Part {
                channel,
                reason: p(1),
            }),
            ("QUIT", _) => Some(Command::Quit { reason: p(0) }),
            ("KICK", n) if n >= 2 => match (p(0), p(1)) {
                (Some(channel), Some(nick)) => Some(Command::Kick {
                    channel,
                    nick,
                    reason: p(2),
                }),
                _ => None,
            },
            ("PRIVMSG", 2) => match (p(0), p(1)) {
                (Some(target), Some(text)) => Some(Command::Privmsg { target, text }),
                _ => None,
            },
            ("NOTICE", 2) => match (p(0), p(1)) {
                (Some(target), Some(text)) => Some(Command::Notice { target, text }),
                _ => None,
            },
            ("TOPIC", 2) => match (p(0), p(1)) {
                (Some(channel), Some(topic)) => Some(Command::Topic { channel, topic }),
                _ => None,
            },
            _ => None,
        };

        command.unwrap_or(Command::Unknown)
    }
}
