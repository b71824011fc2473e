//! Events delivered to the user interface.
//!
//! The dispatcher emits exactly one event per state change, so a UI that
//! only renders events never drifts from the session state.

use crate::error::{ClientError, ConnectionError, ProtocolError};
use crate::state::{LogLine, RegistrationState};

/// Where a log line was appended.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum View {
    /// Server notices and unrouted messages.
    Server,
    /// A channel, by display name.
    Channel(String),
    /// A private conversation, by peer nickname.
    Private(String),
}

impl View {
    /// Label shown to the user.
    pub fn label(&self) -> &str {
        match self {
            View::Server => "*server*",
            View::Channel(name) | View::Private(name) => name,
        }
    }
}

/// Why the client is no longer in a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveReason {
    /// Our own PART was confirmed.
    Parted,
    /// Someone kicked us.
    Kicked {
        /// Kicker's nickname.
        by: String,
        /// Kick reason, if any.
        reason: Option<String>,
    },
    /// The server refused the join.
    Refused(ProtocolError),
}

/// A change the UI should reflect.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Event {
    /// TCP connection established.
    Connected {
        /// `host:port`.
        server: String,
    },
    /// Registration lines were written.
    Registering {
        /// Nickname requested.
        nickname: String,
    },
    /// The server accepted the registration.
    Registered {
        /// Confirmed nickname.
        nickname: String,
    },
    /// A nickname changed. `own` is set when it is ours.
    NicknameChanged {
        /// Previous nickname.
        old: String,
        /// New nickname.
        new: String,
        /// Whether this was our nickname.
        own: bool,
    },
    /// A join was written; waiting for confirmation.
    ChannelRequested {
        /// Channel name.
        channel: String,
    },
    /// The server confirmed our join.
    ChannelJoined {
        /// Channel name.
        channel: String,
        /// Whether it became the active channel.
        active: bool,
    },
    /// We are no longer in a channel.
    ChannelLeft {
        /// Channel name.
        channel: String,
        /// Why.
        reason: LeaveReason,
        /// Active channel afterwards.
        active: Option<String>,
    },
    /// The active channel changed.
    ActiveChannelChanged {
        /// New active channel.
        channel: String,
    },
    /// Another user joined a channel.
    MemberJoined {
        /// Channel name.
        channel: String,
        /// Nickname.
        nick: String,
    },
    /// Another user parted or was kicked.
    MemberLeft {
        /// Channel name.
        channel: String,
        /// Nickname.
        nick: String,
        /// Part or kick reason.
        reason: Option<String>,
    },
    /// Another user quit.
    MemberQuit {
        /// Nickname.
        nick: String,
        /// Channels they were removed from.
        channels: Vec<String>,
        /// Quit message.
        reason: Option<String>,
    },
    /// A NAMES reply replaced the member list.
    MembersReplaced {
        /// Channel name.
        channel: String,
        /// Full member list after the update.
        members: Vec<String>,
    },
    /// A channel topic changed or was reported.
    TopicChanged {
        /// Channel name.
        channel: String,
        /// New topic; `None` when cleared or unset.
        topic: Option<String>,
    },
    /// A line was added to a log.
    MessageAppended {
        /// Target log.
        view: View,
        /// The line.
        line: LogLine,
        /// Whether the view was created for this line.
        new_view: bool,
    },
    /// Informational server output that changes nothing.
    Info {
        /// Text to show.
        text: String,
    },
    /// A non-terminal error.
    Error(ClientError),
    /// The session ended.
    Disconnected {
        /// Why.
        reason: ConnectionError,
        /// Registration state before the disconnect.
        was: RegistrationState,
    },
}

impl From<ClientError> for Event {
    fn from(err: ClientError) -> Self {
        Event::Error(err)
    }
}
