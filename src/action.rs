//! Outgoing actions.

/// Something the client wants to do, produced by the input interpreter or
/// as a follow-up by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Register the connection: `NICK` then `USER`.
    Register {
        /// Requested nickname.
        nickname: String,
        /// Free-form user info (the USER real name).
        user_info: String,
    },
    /// Change nickname.
    Nick(String),
    /// Join a channel.
    Join(String),
    /// Leave a channel.
    Part(String),
    /// Send a message to a channel or a nickname.
    PrivMsg {
        /// Channel or nickname.
        target: String,
        /// Message body.
        text: String,
    },
    /// Ask for a channel's member list.
    Names(String),
    /// Answer a server PING.
    Pong(String),
    /// Make another joined channel active. Never sent to the server.
    Switch(String),
    /// Leave the network.
    Quit(Option<String>),
}

impl Action {
    /// Whether the action only changes local state.
    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, Action::Switch(_))
    }

    /// Short verb used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Register { .. } => "register",
            Action::Nick(_) => "nick",
            Action::Join(_) => "join",
            Action::Part(_) => "part",
            Action::PrivMsg { .. } => "privmsg",
            Action::Names(_) => "names",
            Action::Pong(_) => "pong",
            Action::Switch(_) => "switch",
            Action::Quit(_) => "quit",
        }
    }
}
