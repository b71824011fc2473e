//! Session state: identity, channels, conversations and logs.
//!
//! Channel and nickname lookups are keyed by their RFC 1459 folded form;
//! the spelling the server used is kept for display. Everything here is
//! read-only outside the crate; the [`Dispatcher`](super::Dispatcher) is the
//! only writer.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::casemap::{irc_eq, irc_to_lower};

use super::log::MessageLog;

/// Where the connection is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistrationState {
    /// Nothing sent yet, or the nickname was refused.
    #[default]
    Unregistered,
    /// NICK/USER written, waiting for the welcome reply.
    Registering,
    /// Welcome received.
    Registered,
    /// The connection is gone. Final.
    Disconnected,
}

/// Connection identity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    /// Current (or requested, before registration) nickname.
    pub nickname: String,
    /// User info sent at registration.
    pub user_info: String,
    /// Registration state.
    pub registration: RegistrationState,
}

/// Join progress of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelState {
    /// JOIN written, not yet confirmed.
    Requested,
    /// Confirmed by the server.
    Joined,
}

/// A channel the client asked to join or is in.
#[derive(Clone, Debug)]
pub struct Channel {
    name: String,
    state: ChannelState,
    members: BTreeMap<String, String>,
    topic: Option<String>,
    log: MessageLog,
}

impl Channel {
    pub(crate) fn new(name: &str, state: ChannelState) -> Self {
        Self {
            name: name.to_owned(),
            state,
            members: BTreeMap::new(),
            topic: None,
            log: MessageLog::default(),
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Join progress.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Whether the join was confirmed.
    pub fn is_joined(&self) -> bool {
        self.state == ChannelState::Joined
    }

    /// Member nicknames, ordered by folded name.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.values().map(String::as_str)
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether `nick` is a member.
    pub fn has_member(&self, nick: &str) -> bool {
        self.members.contains_key(&irc_to_lower(nick))
    }

    /// Current topic.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Message log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    pub(crate) fn mark_joined(&mut self) {
        self.state = ChannelState::Joined;
    }

    pub(crate) fn set_topic(&mut self, topic: Option<String>) {
        self.topic = topic;
    }

    /// Adopt the server's spelling of the channel name.
    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Returns false if the member was already present.
    pub(crate) fn add_member(&mut self, nick: &str) -> bool {
        self.members
            .insert(irc_to_lower(nick), nick.to_owned())
            .is_none()
    }

    /// Returns false if the member was absent.
    pub(crate) fn remove_member(&mut self, nick: &str) -> bool {
        self.members.remove(&irc_to_lower(nick)).is_some()
    }

    /// Returns false if `old` was not a member.
    pub(crate) fn rename_member(&mut self, old: &str, new: &str) -> bool {
        if self.remove_member(old) {
            self.add_member(new);
            true
        } else {
            false
        }
    }

    pub(crate) fn clear_members(&mut self) {
        self.members.clear();
    }

    fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            name: self.name.clone(),
            state: self.state,
            members: self.members().map(str::to_owned).collect(),
            topic: self.topic.clone(),
        }
    }
}

/// A private conversation with one peer.
#[derive(Clone, Debug)]
pub struct Conversation {
    peer: String,
    log: MessageLog,
}

impl Conversation {
    fn new(peer: &str) -> Self {
        Self {
            peer: peer.to_owned(),
            log: MessageLog::default(),
        }
    }

    /// Peer nickname.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Message log.
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }
}

/// Complete client-side view of the connection.
#[derive(Clone, Debug)]
pub struct Session {
    identity: Identity,
    server: Option<String>,
    channels: BTreeMap<String, Channel>,
    conversations: BTreeMap<String, Conversation>,
    active: Option<String>,
    server_log: MessageLog,
}

impl Session {
    /// A fresh, unregistered session.
    pub fn new(nickname: &str, user_info: &str) -> Self {
        Self {
            identity: Identity {
                nickname: nickname.to_owned(),
                user_info: user_info.to_owned(),
                registration: RegistrationState::Unregistered,
            },
            server: None,
            channels: BTreeMap::new(),
            conversations: BTreeMap::new(),
            active: None,
            server_log: MessageLog::default(),
        }
    }

    /// Connection identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Our nickname.
    pub fn nickname(&self) -> &str {
        &self.identity.nickname
    }

    /// Registration state.
    pub fn registration(&self) -> RegistrationState {
        self.identity.registration
    }

    /// Whether the welcome reply was received and the connection is open.
    pub fn is_registered(&self) -> bool {
        self.identity.registration == RegistrationState::Registered
    }

    /// Whether `nick` is our nickname.
    pub fn is_own_nick(&self, nick: &str) -> bool {
        irc_eq(nick, &self.identity.nickname)
    }

    /// Server name from the welcome reply.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Look up a channel by any spelling of its name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&irc_to_lower(name))
    }

    /// All channels, ordered by folded name.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Whether the channel exists and its join was confirmed.
    pub fn is_joined(&self, name: &str) -> bool {
        self.channel(name).is_some_and(Channel::is_joined)
    }

    /// The active channel's display name.
    pub fn active_channel(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|key| self.channels.get(key))
            .map(Channel::name)
    }

    /// Look up a private conversation.
    pub fn conversation(&self, nick: &str) -> Option<&Conversation> {
        self.conversations.get(&irc_to_lower(nick))
    }

    /// All private conversations.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    /// Server log.
    pub fn server_log(&self) -> &MessageLog {
        &self.server_log
    }

    /// Owned copy of what the UI lists.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            nickname: self.identity.nickname.clone(),
            registration: self.identity.registration,
            server: self.server.clone(),
            channels: self.channels.values().map(Channel::snapshot).collect(),
            conversations: self
                .conversations
                .values()
                .map(|c| c.peer.clone())
                .collect(),
            active: self.active_channel().map(str::to_owned),
        }
    }

    pub(crate) fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    pub(crate) fn set_server(&mut self, server: Option<String>) {
        self.server = server;
    }

    pub(crate) fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.channels.get_mut(&irc_to_lower(name))
    }

    pub(crate) fn channels_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.values_mut()
    }

    /// Insert a channel unless present. Returns false if it already existed.
    pub(crate) fn insert_channel(&mut self, name: &str, state: ChannelState) -> bool {
        let key = irc_to_lower(name);
        if self.channels.contains_key(&key) {
            return false;
        }
        self.channels.insert(key, Channel::new(name, state));
        true
    }

    /// Remove a channel. If it was active, the first remaining joined
    /// channel becomes active.
    pub(crate) fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        let key = irc_to_lower(name);
        let removed = self.channels.remove(&key)?;
        if self.active.as_deref() == Some(key.as_str()) {
            self.active = self
                .channels
                .iter()
                .find(|(_, channel)| channel.is_joined())
                .map(|(key, _)| key.clone());
        }
        Some(removed)
    }

    pub(crate) fn clear_channels(&mut self) {
        self.channels.clear();
        self.active = None;
    }

    /// Make a joined channel active. Returns false if it is not joined.
    pub(crate) fn set_active(&mut self, name: &str) -> bool {
        let key = irc_to_lower(name);
        match self.channels.get(&key) {
            Some(channel) if channel.is_joined() => {
                self.active = Some(key);
                true
            }
            _ => false,
        }
    }

    /// Whether `name` is the active channel.
    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(irc_to_lower(name).as_str())
    }

    /// Fetch or create the conversation with `peer`. The flag is true when
    /// it was created.
    pub(crate) fn conversation_entry(&mut self, peer: &str) -> (&mut Conversation, bool) {
        let key = irc_to_lower(peer);
        let created = !self.conversations.contains_key(&key);
        let conversation = self
            .conversations
            .entry(key)
            .or_insert_with(|| Conversation::new(peer));
        (conversation, created)
    }

    /// Move a conversation to a peer's new nickname. An existing
    /// conversation under the new nickname keeps its lines; the two logs
    /// are merged.
    pub(crate) fn rename_conversation(&mut self, old: &str, new: &str) -> bool {
        let Some(mut moved) = self.conversations.remove(&irc_to_lower(old)) else {
            return false;
        };
        match self.conversations.entry(irc_to_lower(new)) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                existing.peer = new.to_owned();
                existing.log.merge(moved.log);
            }
            Entry::Vacant(slot) => {
                moved.peer = new.to_owned();
                slot.insert(moved);
            }
        }
        true
    }

    pub(crate) fn server_log_mut(&mut self) -> &mut MessageLog {
        &mut self.server_log
    }
}

/// Read-only copy of the session for rendering lists.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    /// Our nickname.
    pub nickname: String,
    /// Registration state.
    pub registration: RegistrationState,
    /// Server name, once known.
    pub server: Option<String>,
    /// Channels ordered by folded name.
    pub channels: Vec<ChannelSnapshot>,
    /// Peers with a private conversation.
    pub conversations: Vec<String>,
    /// Active channel.
    pub active: Option<String>,
}

/// One channel in a [`SessionSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSnapshot {
    /// Display name.
    pub name: String,
    /// Join progress.
    pub state: ChannelState,
    /// Members ordered by folded name.
    pub members: Vec<String>,
    /// Topic.
    pub topic: Option<String>,
}
