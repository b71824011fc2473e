//! Error types for the IRC client.
//!
//! Errors are split by where they originate: incoming lines that fail to
//! parse, outgoing actions that fail validation, local commands that are
//! malformed, server-side rejections, and connection failures. Only
//! [`ConnectionError`] ends a session.
//!
//! Every type here is `Clone` so it can travel inside a UI
//! [`Event`](crate::event::Event).

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::response::Response;
use crate::validation::ValidationError;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Any error the client surfaces to the user.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// An incoming line could not be parsed.
    #[error("invalid line from server: {0}")]
    Parse(#[from] ParseError),

    /// An outgoing action failed validation.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// A locally typed command was malformed.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The server rejected an action.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection failed or was closed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl ClientError {
    /// Whether this error ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }
}

/// Errors encountered when parsing an incoming IRC line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Line was empty (or only whitespace).
    #[error("empty message")]
    EmptyMessage,

    /// No command token followed the prefix.
    #[error("missing command in {line:?}")]
    MissingCommand {
        /// The offending line.
        line: String,
    },

    /// The command token contained characters other than letters or digits.
    #[error("invalid command at position {position} in {line:?}")]
    InvalidCommand {
        /// The offending line.
        line: String,
        /// Byte offset where the command stopped being valid.
        position: usize,
    },
}

/// Errors produced while encoding an outgoing action.
///
/// These are raised before anything reaches the socket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// Channel name failed validation.
    #[error("invalid channel name {name:?}: {cause}")]
    InvalidChannel {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        #[source]
        cause: ValidationError,
    },

    /// Nickname failed validation.
    #[error("invalid nickname {nick:?}: {cause}")]
    InvalidNickname {
        /// The rejected nickname.
        nick: String,
        /// Why it was rejected.
        #[source]
        cause: ValidationError,
    },

    /// A message target is neither a channel nor a nickname.
    #[error("invalid message target {0:?}")]
    InvalidTarget(String),

    /// Free text contained a line terminator or NUL.
    #[error("text contains illegal character {ch:?} at position {position}")]
    IllegalText {
        /// The offending character.
        ch: char,
        /// Character position.
        position: usize,
    },

    /// Message text was empty.
    #[error("message text is empty")]
    EmptyText,

    /// The encoded line exceeds the protocol limit.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Encoded length including CRLF.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}

/// Errors in locally typed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InputError {
    /// Nothing to send.
    #[error("nothing to send")]
    EmptyLine,

    /// `/something` that is not a known command.
    #[error("unknown command /{0}")]
    UnknownCommand(String),

    /// A command received fewer arguments than it needs.
    #[error("/{command} needs at least {expected} argument(s), got {got}; usage: {usage}")]
    NotEnoughArguments {
        /// Command name.
        command: &'static str,
        /// Minimum number of arguments.
        expected: usize,
        /// Number supplied.
        got: usize,
        /// Usage string.
        usage: &'static str,
    },

    /// A command received more arguments than it accepts.
    #[error("/{command} takes at most {expected} argument(s), got {got}; usage: {usage}")]
    TooManyArguments {
        /// Command name.
        command: &'static str,
        /// Maximum number of arguments.
        expected: usize,
        /// Number supplied.
        got: usize,
        /// Usage string.
        usage: &'static str,
    },

    /// A channel argument is malformed.
    #[error("invalid channel name {name:?}: {cause}")]
    InvalidChannel {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        cause: ValidationError,
    },

    /// A nickname argument is malformed.
    #[error("invalid nickname {nick:?}: {cause}")]
    InvalidNickname {
        /// The rejected nickname.
        nick: String,
        /// Why it was rejected.
        cause: ValidationError,
    },

    /// `/switch` to a channel that is not joined.
    #[error("not in channel {0}")]
    NotJoined(String),

    /// Plain text or a channel-less command with no active channel.
    #[error("no active channel; /join one first")]
    NoActiveChannel,
}

/// Rejections reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// 433/436: the nickname is taken.
    #[error("nickname {nick} is already in use; pick another with /nick")]
    NicknameInUse {
        /// The nickname that was refused.
        nick: String,
    },

    /// 431/432: the nickname was refused as invalid.
    #[error("nickname {nick} was refused: {reason}; pick another with /nick")]
    ErroneousNickname {
        /// The nickname that was refused.
        nick: String,
        /// Server-provided reason.
        reason: String,
    },

    /// A JOIN was refused.
    #[error("cannot join {channel}: {reason}")]
    JoinRefused {
        /// The channel.
        channel: String,
        /// The numeric that refused it.
        response: Response,
        /// Server-provided reason.
        reason: String,
    },

    /// Any other error numeric.
    #[error("server error {code:03}: {text}")]
    Rejected {
        /// Numeric code.
        code: u16,
        /// Remaining reply parameters.
        text: String,
    },

    /// The server sent ERROR, usually just before closing.
    #[error("server closed link: {0}")]
    ServerError(String),
}

/// Connection failures. Always terminal.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// Could not establish the TCP connection.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialled.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Read or write failure on an established connection.
    #[error("connection error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// The server sent a line longer than the framer will buffer.
    #[error("line from server exceeds {limit} bytes")]
    LineTooLong {
        /// Buffer limit.
        limit: usize,
    },

    /// The server closed the connection.
    #[error("connection closed by server")]
    Closed,

    /// The client was closed locally.
    #[error("connection closed")]
    Cancelled,
}

/// Startup configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No host to connect to.
    #[error("host must not be empty")]
    EmptyHost,

    /// Port 0 cannot be dialled.
    #[error("port must be non-zero")]
    InvalidPort,

    /// The configured nickname is not valid.
    #[error("invalid nickname {nick:?}: {cause}")]
    InvalidNickname {
        /// The rejected nickname.
        nick: String,
        /// Why it was rejected.
        cause: ValidationError,
    },

    /// User info contains a line terminator or NUL.
    #[error("invalid user info: {0}")]
    InvalidUserInfo(ValidationError),

    /// The default channel is not a valid channel name.
    #[error("invalid default channel {name:?}: {cause}")]
    InvalidChannel {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        cause: ValidationError,
    },
}

impl From<io::Error> for ConnectionError {
    fn from(err: io::Error) -> Self {
        ConnectionError::Io(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_error_display() {
        let err = InputError::NotEnoughArguments {
            command: "whisp",
            expected: 2,
            got: 1,
            usage: "/whisp <nick> <message>",
        };
        assert_eq!(
            err.to_string(),
            "/whisp needs at least 2 argument(s), got 1; usage: /whisp <nick> <message>"
        );

        let err = ProtocolError::Rejected {
            code: 42,
            text: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "server error 042: nope");
    }

    #[test]
    fn test_encode_error_source_chaining() {
        let err = EncodeError::InvalidChannel {
            name: "general".to_string(),
            cause: ValidationError::MissingPrefix,
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("missing required prefix"));
    }

    #[test]
    fn test_only_connection_errors_are_terminal() {
        assert!(ClientError::from(ConnectionError::Closed).is_terminal());
        assert!(!ClientError::from(ParseError::EmptyMessage).is_terminal());
        assert!(!ClientError::from(InputError::NoActiveChannel).is_terminal());
        assert!(!ClientError::from(ProtocolError::ServerError("bye".into())).is_terminal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe");
        let err: ConnectionError = io_err.into();
        assert!(matches!(err, ConnectionError::Io(_)));
        // Clone keeps the shared source.
        let cloned = err.clone();
        assert_eq!(cloned.to_string(), "connection error: broken pipe");
    }
}
