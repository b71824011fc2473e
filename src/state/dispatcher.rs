//! Applies incoming messages and written actions to the session.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::action::Action;
use crate::casemap::{irc_eq, irc_to_lower};
use crate::command::Command;
use crate::config::ClientConfig;
use crate::error::{ConnectionError, ProtocolError};
use crate::event::{Event, LeaveReason, View};
use crate::message::Message;
use crate::response::{is_error_code, Response};
use crate::validation::CHANNEL_PREFIX;

use super::log::{LineKind, LogLine};
use super::session::{ChannelState, RegistrationState, Session, SessionSnapshot};

/// Membership prefixes a NAMES reply may put in front of a nickname.
const MEMBERSHIP_PREFIXES: &[char] = &['~', '&', '@', '%', '+'];

/// Result of dispatching one message.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Events for the UI, in order.
    pub events: Vec<Event>,
    /// Actions to send back immediately (PONG, the default JOIN).
    pub replies: Vec<Action>,
}

impl Dispatch {
    fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    fn info(&mut self, text: String) {
        self.events.push(Event::Info { text });
    }

    fn error(&mut self, err: ProtocolError) {
        self.events.push(Event::Error(err.into()));
    }
}

/// Sole owner of the [`Session`].
///
/// The dispatcher is sans-IO: feed it parsed messages with [`dispatch`] and
/// report every action written to the socket with [`record_sent`]. It never
/// performs I/O itself; replies come back as [`Action`]s for the caller to
/// encode and write.
///
/// ```
/// use slirc_client::{ClientConfig, Dispatcher, Message, RegistrationState};
///
/// let config = ClientConfig::new("localhost", 6667, "alice");
/// let mut dispatcher = Dispatcher::new(&config);
/// dispatcher.record_sent(&config.register_action());
///
/// let welcome: Message = ":irc.example.net 001 alice :Welcome".parse().unwrap();
/// dispatcher.dispatch(&welcome);
/// assert_eq!(dispatcher.session().registration(), RegistrationState::Registered);
/// ```
///
/// [`dispatch`]: Dispatcher::dispatch
/// [`record_sent`]: Dispatcher::record_sent
#[derive(Debug)]
pub struct Dispatcher {
    session: Session,
    default_channel: Option<String>,
    /// Folded channels with a NAMES reply in progress.
    names_pending: HashSet<String>,
}

impl Dispatcher {
    /// Start an unregistered session for `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            session: Session::new(&config.nickname, &config.user_info),
            default_channel: config.default_channel.clone(),
            names_pending: HashSet::new(),
        }
    }

    /// Read-only session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Owned copy for the UI.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Whether [`disconnect`](Self::disconnect) was called.
    pub fn is_disconnected(&self) -> bool {
        self.session.registration() == RegistrationState::Disconnected
    }

    /// Apply one incoming message.
    pub fn dispatch(&mut self, msg: &Message) -> Dispatch {
        let mut out = Dispatch::default();
        if self.is_disconnected() {
            debug!(command = %msg.command, "ignoring message after disconnect");
            return out;
        }

        let source = msg.source_nickname();
        match Command::classify(msg) {
            Command::Ping { token } => out.replies.push(Action::Pong(token.to_owned())),
            Command::Error { reason } => out.error(ProtocolError::ServerError(reason.to_owned())),
            Command::Nick { nickname } => match source {
                Some(old) => self.on_nick(old, nickname, &mut out),
                None => out.info(msg.to_string()),
            },
            Command::Join { channel } => match source {
                Some(nick) => self.on_join(nick, channel, &mut out),
                None => out.info(msg.to_string()),
            },
            Command::Part { channel, reason } => match source {
                Some(nick) => self.on_part(nick, channel, reason, &mut out),
                None => out.info(msg.to_string()),
            },
            Command::Quit { reason } => match source {
                Some(nick) => self.on_quit(nick, reason, &mut out),
                None => out.info(msg.to_string()),
            },
            Command::Kick {
                channel,
                nick,
                reason,
            } => {
                let by = msg.prefix.as_ref().map_or("", |p| p.display_name());
                self.on_kick(by, channel, nick, reason, &mut out);
            }
            Command::Privmsg { target, text } => {
                self.on_message(msg, target, text, LineKind::Message, &mut out)
            }
            Command::Notice { target, text } => {
                self.on_message(msg, target, text, LineKind::Notice, &mut out)
            }
            Command::Topic { channel, topic } => {
                self.on_topic(channel, Some(topic), &mut out);
            }
            Command::Response(response, params) => {
                self.on_response(msg, response, params, &mut out)
            }
            Command::Numeric(code, params) => {
                if is_error_code(code) {
                    out.error(ProtocolError::Rejected {
                        code,
                        text: reply_text(params),
                    });
                } else {
                    out.info(reply_text(params));
                }
            }
            Command::Unknown => out.info(msg.to_string()),
        }
        out
    }

    /// Record an action that was written to the socket.
    pub fn record_sent(&mut self, action: &Action) -> Vec<Event> {
        if self.is_disconnected() {
            return Vec::new();
        }

        match action {
            Action::Register {
                nickname,
                user_info,
            } => {
                if self.session.registration() != RegistrationState::Unregistered {
                    return Vec::new();
                }
                let identity = self.session.identity_mut();
                identity.nickname = nickname.clone();
                identity.user_info = user_info.clone();
                identity.registration = RegistrationState::Registering;
                vec![Event::Registering {
                    nickname: nickname.clone(),
                }]
            }
            Action::Nick(nickname) => match self.session.registration() {
                RegistrationState::Unregistered | RegistrationState::Registering => {
                    let identity = self.session.identity_mut();
                    identity.nickname = nickname.clone();
                    identity.registration = RegistrationState::Registering;
                    vec![Event::Registering {
                        nickname: nickname.clone(),
                    }]
                }
                // Wait for the server's NICK echo.
                _ => Vec::new(),
            },
            Action::Join(channel) => {
                if self.session.insert_channel(channel, ChannelState::Requested) {
                    vec![Event::ChannelRequested {
                        channel: channel.clone(),
                    }]
                } else {
                    Vec::new()
                }
            }
            Action::PrivMsg { target, text } => {
                let line = LogLine::now(self.session.nickname(), text.as_str(), LineKind::Own);
                vec![self.append_to_target(target, line)]
            }
            Action::Switch(channel) => {
                if !self.session.is_active(channel) && self.session.set_active(channel) {
                    vec![Event::ActiveChannelChanged {
                        channel: self.active_name(),
                    }]
                } else {
                    Vec::new()
                }
            }
            Action::Part(_) | Action::Names(_) | Action::Pong(_) | Action::Quit(_) => Vec::new(),
        }
    }

    /// End the session. Every later call is a no-op.
    pub fn disconnect(&mut self, reason: ConnectionError) -> Vec<Event> {
        if self.is_disconnected() {
            return Vec::new();
        }
        let was = self.session.registration();
        info!(%reason, "session disconnected");

        self.session.identity_mut().registration = RegistrationState::Disconnected;
        self.session.clear_channels();
        self.names_pending.clear();
        vec![Event::Disconnected { reason, was }]
    }

    fn active_name(&self) -> String {
        self.session.active_channel().unwrap_or_default().to_owned()
    }

    fn on_nick(&mut self, old: &str, new: &str, out: &mut Dispatch) {
        if self.session.is_own_nick(old) {
            self.session.identity_mut().nickname = new.to_owned();
            for channel in self.session.channels_mut() {
                channel.rename_member(old, new);
            }
            out.push(Event::NicknameChanged {
                old: old.to_owned(),
                new: new.to_owned(),
                own: true,
            });
            return;
        }

        let mut changed = false;
        for channel in self.session.channels_mut() {
            changed |= channel.rename_member(old, new);
        }
        changed |= self.session.rename_conversation(old, new);
        if changed {
            out.push(Event::NicknameChanged {
                old: old.to_owned(),
                new: new.to_owned(),
                own: false,
            });
        }
    }

    fn on_join(&mut self, nick: &str, channel: &str, out: &mut Dispatch) {
        if !self.session.is_own_nick(nick) {
            if let Some(chan) = self.session.channel_mut(channel) {
                if chan.add_member(nick) {
                    out.push(Event::MemberJoined {
                        channel: chan.name().to_owned(),
                        nick: nick.to_owned(),
                    });
                }
            }
            return;
        }

        if self.session.is_joined(channel) {
            return;
        }
        // The server may join us to channels we never asked for.
        self.session.insert_channel(channel, ChannelState::Requested);
        if let Some(chan) = self.session.channel_mut(channel) {
            chan.set_name(channel);
            chan.mark_joined();
            chan.add_member(nick);
        }

        let is_default = self
            .default_channel
            .as_deref()
            .is_some_and(|default| irc_eq(default, channel));
        let active = (is_default || self.session.active_channel().is_none())
            && self.session.set_active(channel);

        info!(channel, active, "joined channel");
        out.push(Event::ChannelJoined {
            channel: channel.to_owned(),
            active,
        });
    }

    fn on_part(&mut self, nick: &str, channel: &str, reason: Option<&str>, out: &mut Dispatch) {
        if self.session.is_own_nick(nick) {
            self.leave(channel, LeaveReason::Parted, out);
        } else if let Some(chan) = self.session.channel_mut(channel) {
            if chan.remove_member(nick) {
                out.push(Event::MemberLeft {
                    channel: chan.name().to_owned(),
                    nick: nick.to_owned(),
                    reason: reason.map(str::to_owned),
                });
            }
        }
    }

    fn on_kick(
        &mut self,
        by: &str,
        channel: &str,
        nick: &str,
        reason: Option<&str>,
        out: &mut Dispatch,
    ) {
        if self.session.is_own_nick(nick) {
            let reason = LeaveReason::Kicked {
                by: by.to_owned(),
                reason: reason.map(str::to_owned),
            };
            self.leave(channel, reason, out);
        } else if let Some(chan) = self.session.channel_mut(channel) {
            if chan.remove_member(nick) {
                out.push(Event::MemberLeft {
                    channel: chan.name().to_owned(),
                    nick: nick.to_owned(),
                    reason: reason.map(str::to_owned),
                });
            }
        }
    }

    fn leave(&mut self, channel: &str, reason: LeaveReason, out: &mut Dispatch) {
        let Some(removed) = self.session.remove_channel(channel) else {
            return;
        };
        self.names_pending.remove(&irc_to_lower(channel));
        info!(channel = removed.name(), ?reason, "left channel");
        out.push(Event::ChannelLeft {
            channel: removed.name().to_owned(),
            reason,
            active: self.session.active_channel().map(str::to_owned),
        });
    }

    fn on_quit(&mut self, nick: &str, reason: Option<&str>, out: &mut Dispatch) {
        if self.session.is_own_nick(nick) {
            return;
        }
        let channels: Vec<String> = self
            .session
            .channels_mut()
            .filter_map(|chan| chan.remove_member(nick).then(|| chan.name().to_owned()))
            .collect();
        if !channels.is_empty() {
            out.push(Event::MemberQuit {
                nick: nick.to_owned(),
                channels,
                reason: reason.map(str::to_owned),
            });
        }
    }

    fn on_message(
        &mut self,
        msg: &Message,
        target: &str,
        text: &str,
        kind: LineKind,
        out: &mut Dispatch,
    ) {
        let sender = msg
            .prefix
            .as_ref()
            .map(|p| p.display_name())
            .or_else(|| self.session.server())
            .unwrap_or("*");
        let line = LogLine::now(sender, text, kind);

        let private_peer = match msg.source_nickname() {
            Some(peer) if self.is_server(peer) => None,
            Some(peer) if self.session.is_own_nick(target) => match kind {
                LineKind::Notice if !self.session.is_registered() => None,
                _ => Some(peer),
            },
            _ => None,
        };

        let event = match private_peer {
            Some(peer) => self.append_private(peer, line),
            None => self.append_to_target(target, line),
        };
        out.push(event);
    }

    /// Whether `name` is the server we registered with. Dotless server
    /// names such as `localhost` parse as nickname prefixes.
    fn is_server(&self, name: &str) -> bool {
        self.session.server().is_some_and(|server| irc_eq(server, name))
    }

    /// Append to a channel log when `target` is a known channel, to a
    /// private conversation when it is a nickname, otherwise to the server
    /// log.
    fn append_to_target(&mut self, target: &str, line: LogLine) -> Event {
        if target.starts_with(CHANNEL_PREFIX) {
            if let Some(chan) = self.session.channel_mut(target) {
                chan.log_mut().push(line.clone());
                return Event::MessageAppended {
                    view: View::Channel(chan.name().to_owned()),
                    line,
                    new_view: false,
                };
            }
        } else if line.kind == LineKind::Own {
            return self.append_private(target, line);
        }

        self.session.server_log_mut().push(line.clone());
        Event::MessageAppended {
            view: View::Server,
            line,
            new_view: false,
        }
    }

    fn append_private(&mut self, peer: &str, line: LogLine) -> Event {
        let (conversation, created) = self.session.conversation_entry(peer);
        conversation.log_mut().push(line.clone());
        Event::MessageAppended {
            view: View::Private(conversation.peer().to_owned()),
            line,
            new_view: created,
        }
    }

    fn on_topic(&mut self, channel: &str, topic: Option<&str>, out: &mut Dispatch) {
        let topic = topic.filter(|t| !t.is_empty()).map(str::to_owned);
        match self.session.channel_mut(channel) {
            Some(chan) => {
                if chan.topic() != topic.as_deref() {
                    chan.set_topic(topic.clone());
                    out.push(Event::TopicChanged {
                        channel: chan.name().to_owned(),
                        topic,
                    });
                }
            }
            None => out.info(format!(
                "topic for {}: {}",
                channel,
                topic.as_deref().unwrap_or("(none)")
            )),
        }
    }

    fn on_response(
        &mut self,
        msg: &Message,
        response: Response,
        params: &[String],
        out: &mut Dispatch,
    ) {
        match response {
            Response::RPL_WELCOME => self.on_welcome(msg, params, out),
            Response::RPL_TOPIC => match (params.get(1), params.get(2)) {
                (Some(channel), Some(topic)) => self.on_topic(channel, Some(topic), out),
                _ => out.info(reply_text(params)),
            },
            Response::RPL_NOTOPIC => match params.get(1) {
                Some(channel) => self.on_topic(channel, None, out),
                None => out.info(reply_text(params)),
            },
            Response::RPL_NAMREPLY => self.on_names(params, out),
            Response::RPL_ENDOFNAMES => {
                if let Some(channel) = params.get(1) {
                    self.names_pending.remove(&irc_to_lower(channel));
                }
            }
            Response::ERR_NOTREGISTERED => self.on_not_registered(params, out),
            r if r.is_nick_rejection() => self.on_nick_rejected(response, params, out),
            r if r.is_join_refusal() => self.on_join_refused(response, params, out),
            r if r.is_error() => out.error(ProtocolError::Rejected {
                code: r.code(),
                text: reply_text(params),
            }),
            _ => out.info(reply_text(params)),
        }
    }

    fn on_welcome(&mut self, msg: &Message, params: &[String], out: &mut Dispatch) {
        if self.session.is_registered() {
            out.info(reply_text(params));
            return;
        }

        let server = msg.prefix.as_ref().map(|p| p.display_name().to_owned());
        self.session.set_server(server);
        let identity = self.session.identity_mut();
        if let Some(nick) = params.first().filter(|n| !n.is_empty()) {
            identity.nickname = nick.clone();
        }
        identity.registration = RegistrationState::Registered;
        let nickname = identity.nickname.clone();

        info!(%nickname, "registered");
        out.push(Event::Registered { nickname });

        if let Some(default) = &self.default_channel {
            if self.session.channel(default).is_none() {
                out.replies.push(Action::Join(default.clone()));
            }
        }
    }

    fn on_names(&mut self, params: &[String], out: &mut Dispatch) {
        // `<me> <symbol> <channel> :names`; some servers omit the symbol.
        let (channel, names) = match params {
            [_, _, channel, names] | [_, channel, names] => (channel.as_str(), names.as_str()),
            _ => {
                out.info(reply_text(params));
                return;
            }
        };

        let key = irc_to_lower(channel);
        let Some(chan) = self.session.channel_mut(channel) else {
            out.info(format!("names in {}: {}", channel, names));
            return;
        };

        // First line of a reply replaces; continuations before 366 merge.
        if self.names_pending.insert(key) {
            chan.clear_members();
        }
        for name in names.split_whitespace() {
            let nick = name.trim_start_matches(MEMBERSHIP_PREFIXES);
            if !nick.is_empty() {
                chan.add_member(nick);
            }
        }

        out.push(Event::MembersReplaced {
            channel: chan.name().to_owned(),
            members: chan.members().map(str::to_owned).collect(),
        });
    }

    fn on_nick_rejected(&mut self, response: Response, params: &[String], out: &mut Dispatch) {
        let reason = params.last().cloned().unwrap_or_default();
        let nick = match params {
            [_, nick, _, ..] => nick.clone(),
            _ => self.session.nickname().to_owned(),
        };

        // 437 is also sent for channels that are temporarily unavailable.
        if nick.starts_with(CHANNEL_PREFIX) {
            out.error(ProtocolError::Rejected {
                code: response.code(),
                text: reply_text(params),
            });
            return;
        }

        let err = match response {
            Response::ERR_NICKNAMEINUSE | Response::ERR_NICKCOLLISION => {
                ProtocolError::NicknameInUse { nick }
            }
            _ => ProtocolError::ErroneousNickname { nick, reason },
        };

        if self.session.registration() == RegistrationState::Registering {
            self.session.identity_mut().registration = RegistrationState::Unregistered;
        }
        out.error(err);
    }

    /// 451 does not say which command it refused, so every join still
    /// waiting for confirmation is dropped with it.
    fn on_not_registered(&mut self, params: &[String], out: &mut Dispatch) {
        let err = ProtocolError::Rejected {
            code: Response::ERR_NOTREGISTERED.code(),
            text: reply_text(params),
        };
        let pending: Vec<String> = self
            .session
            .channels()
            .filter(|chan| chan.state() == ChannelState::Requested)
            .map(|chan| chan.name().to_owned())
            .collect();
        if pending.is_empty() {
            out.error(err);
            return;
        }
        for channel in pending {
            self.leave(&channel, LeaveReason::Refused(err.clone()), out);
        }
    }

    fn on_join_refused(&mut self, response: Response, params: &[String], out: &mut Dispatch) {
        let Some(channel) = params.get(1) else {
            out.error(ProtocolError::Rejected {
                code: response.code(),
                text: reply_text(params),
            });
            return;
        };
        let err = ProtocolError::JoinRefused {
            channel: channel.clone(),
            response,
            reason: params.get(2..).map(|rest| rest.join(" ")).unwrap_or_default(),
        };

        let requested = self
            .session
            .channel(channel)
            .is_some_and(|chan| chan.state() == ChannelState::Requested);
        if requested {
            self.leave(channel, LeaveReason::Refused(err), out);
        } else {
            out.error(err);
        }
    }
}

/// Reply parameters after our own nickname, joined for display.
fn reply_text(params: &[String]) -> String {
    params.get(1..).unwrap_or_default().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        let config = ClientConfig::new("localhost", 6667, "me").with_default_channel("#general");
        let mut dispatcher = Dispatcher::new(&config);
        dispatcher.record_sent(&config.register_action());
        dispatcher
    }

    fn feed(dispatcher: &mut Dispatcher, line: &str) -> Dispatch {
        dispatcher.dispatch(&line.parse().unwrap())
    }

    fn joined(channel: &str) -> Dispatcher {
        let mut d = dispatcher();
        feed(&mut d, ":srv 001 me :Welcome");
        d.record_sent(&Action::Join(channel.into()));
        feed(&mut d, &format!(":me!u@h JOIN {}", channel));
        d
    }

    #[test]
    fn test_not_registered_drops_pending_joins() {
        let mut d = dispatcher();
        d.record_sent(&Action::Join("#early".into()));
        assert_eq!(
            d.session().channel("#early").map(|c| c.state()),
            Some(ChannelState::Requested)
        );

        let out = feed(&mut d, ":srv 451 * JOIN :You have not registered");
        assert!(matches!(
            &out.events[..],
            [Event::ChannelLeft { channel, reason: LeaveReason::Refused(ProtocolError::Rejected { code: 451, .. }), .. }]
                if channel == "#early"
        ));
        assert!(d.session().channel("#early").is_none());

        let out = feed(&mut d, ":srv 451 * :You have not registered");
        assert!(matches!(&out.events[..], [Event::Error(_)]));
    }

    #[test]
    fn test_dotless_server_name_is_not_a_peer() {
        let mut d = dispatcher();
        feed(&mut d, ":localhost 001 me :Welcome");
        assert_eq!(d.session().server(), Some("localhost"));

        let out = feed(&mut d, ":localhost NOTICE me :*** Looking up your hostname");
        assert!(matches!(
            &out.events[..],
            [Event::MessageAppended { view: View::Server, .. }]
        ));
        assert!(d.session().conversation("localhost").is_none());
        assert_eq!(d.session().server_log().len(), 1);

        let out = feed(&mut d, ":bob!b@h NOTICE me :hi");
        assert!(matches!(
            &out.events[..],
            [Event::MessageAppended { view: View::Private(peer), .. }] if peer == "bob"
        ));
    }

    #[test]
    fn test_ping_replies_pong_without_events() {
        let mut d = dispatcher();
        let out = feed(&mut d, "PING :abc");
        assert!(out.events.is_empty());
        assert_eq!(out.replies, vec![Action::Pong("abc".into())]);
    }

    #[test]
    fn test_welcome_registers_and_joins_default() {
        let mut d = dispatcher();
        assert_eq!(d.session().registration(), RegistrationState::Registering);

        let out = feed(&mut d, ":irc.example.net 001 me_ :Welcome");
        assert_eq!(d.session().registration(), RegistrationState::Registered);
        assert_eq!(d.session().nickname(), "me_");
        assert_eq!(d.session().server(), Some("irc.example.net"));
        assert!(matches!(&out.events[..], [Event::Registered { nickname }] if nickname == "me_"));
        assert_eq!(out.replies, vec![Action::Join("#general".into())]);
    }

    #[test]
    fn test_nick_in_use_before_registration_resets_state() {
        let mut d = dispatcher();
        let out = feed(&mut d, ":srv 433 * me :Nickname is already in use");
        assert_eq!(d.session().registration(), RegistrationState::Unregistered);
        assert!(matches!(
            &out.events[..],
            [Event::Error(crate::ClientError::Protocol(ProtocolError::NicknameInUse { nick }))] if nick == "me"
        ));

        let events = d.record_sent(&Action::Nick("me2".into()));
        assert!(matches!(&events[..], [Event::Registering { nickname }] if nickname == "me2"));
        feed(&mut d, ":srv 001 me2 :Welcome");
        assert!(d.session().is_registered());
    }

    #[test]
    fn test_join_lifecycle() {
        let mut d = dispatcher();
        feed(&mut d, ":srv 001 me :Welcome");
        let events = d.record_sent(&Action::Join("#general".into()));
        assert!(matches!(&events[..], [Event::ChannelRequested { .. }]));
        assert_eq!(
            d.session().channel("#general").map(|c| c.state()),
            Some(ChannelState::Requested)
        );
        assert_eq!(d.session().active_channel(), None);

        let out = feed(&mut d, ":me!u@h JOIN #general");
        assert!(matches!(&out.events[..], [Event::ChannelJoined { active: true, .. }]));
        assert!(d.session().is_joined("#general"));
        assert_eq!(d.session().active_channel(), Some("#general"));

        // Duplicate echo changes nothing.
        assert!(feed(&mut d, ":me!u@h JOIN #general").events.is_empty());
    }

    #[test]
    fn test_second_channel_does_not_steal_active() {
        let mut d = joined("#general");
        d.record_sent(&Action::Join("#rust".into()));
        let out = feed(&mut d, ":me!u@h JOIN #rust");
        assert!(matches!(&out.events[..], [Event::ChannelJoined { active: false, .. }]));
        assert_eq!(d.session().active_channel(), Some("#general"));

        let events = d.record_sent(&Action::Switch("#RUST".into()));
        assert!(matches!(&events[..], [Event::ActiveChannelChanged { channel }] if channel == "#rust"));
        assert!(d.record_sent(&Action::Switch("#rust".into())).is_empty());
    }

    #[test]
    fn test_join_refused_removes_requested_channel() {
        let mut d = dispatcher();
        feed(&mut d, ":srv 001 me :Welcome");
        d.record_sent(&Action::Join("#secret".into()));
        let out = feed(&mut d, ":srv 473 me #secret :Cannot join channel (+i)");
        assert!(d.session().channel("#secret").is_none());
        assert!(matches!(
            &out.events[..],
            [Event::ChannelLeft {
                reason: LeaveReason::Refused(ProtocolError::JoinRefused {
                    response: Response::ERR_INVITEONLYCHAN,
                    ..
                }),
                ..
            }]
        ));
    }

    #[test]
    fn test_names_replace_then_merge() {
        let mut d = joined("#general");
        feed(&mut d, ":srv 353 me = #general :@alice +bob me");
        feed(&mut d, ":srv 353 me = #general :~carol");
        feed(&mut d, ":srv 366 me #general :End of /NAMES list.");
        let members: Vec<_> = d.session().channel("#general").unwrap().members().collect();
        assert_eq!(members, vec!["alice", "bob", "carol", "me"]);

        let out = feed(&mut d, ":srv 353 me = #general :dave");
        feed(&mut d, ":srv 366 me #general :End of /NAMES list.");
        let members: Vec<_> = d.session().channel("#general").unwrap().members().collect();
        assert_eq!(members, vec!["dave"]);
        assert!(matches!(&out.events[..], [Event::MembersReplaced { members, .. }] if members == &["dave"]));
    }

    #[test]
    fn test_member_part_twice_is_noop() {
        let mut d = joined("#general");
        feed(&mut d, ":srv 353 me = #general :me bob");
        let out = feed(&mut d, ":bob!b@h PART #general :bye");
        assert_eq!(out.events.len(), 1);
        let out = feed(&mut d, ":bob!b@h PART #general :bye");
        assert!(out.events.is_empty());
        assert!(!d.session().channel("#general").unwrap().has_member("bob"));
    }

    #[test]
    fn test_quit_and_nick_touch_every_channel() {
        let mut d = joined("#a");
        d.record_sent(&Action::Join("#b".into()));
        feed(&mut d, ":me!u@h JOIN #b");
        feed(&mut d, ":bob!b@h JOIN #a");
        feed(&mut d, ":bob!b@h JOIN #b");

        let out = feed(&mut d, ":bob!b@h NICK rob");
        assert!(matches!(&out.events[..], [Event::NicknameChanged { own: false, .. }]));
        assert!(d.session().channel("#b").unwrap().has_member("rob"));

        let out = feed(&mut d, ":rob!b@h QUIT :gone");
        assert!(matches!(&out.events[..], [Event::MemberQuit { channels, .. }] if channels.len() == 2));
        assert!(!d.session().channel("#a").unwrap().has_member("rob"));
    }

    #[test]
    fn test_own_nick_change() {
        let mut d = joined("#a");
        let out = feed(&mut d, ":me!u@h NICK newme");
        assert!(matches!(&out.events[..], [Event::NicknameChanged { own: true, .. }]));
        assert_eq!(d.session().nickname(), "newme");
        assert!(d.session().channel("#a").unwrap().has_member("newme"));
    }

    #[test]
    fn test_message_routing() {
        let mut d = joined("#general");
        let out = feed(&mut d, ":bob!b@h PRIVMSG #general :hi all");
        assert!(matches!(
            &out.events[..],
            [Event::MessageAppended { view: View::Channel(c), .. }] if c == "#general"
        ));

        let out = feed(&mut d, ":bob!b@h PRIVMSG me :psst");
        assert!(matches!(
            &out.events[..],
            [Event::MessageAppended { view: View::Private(p), new_view: true, .. }] if p == "bob"
        ));
        let out = feed(&mut d, ":bob!b@h PRIVMSG ME :again");
        assert!(matches!(&out.events[..], [Event::MessageAppended { new_view: false, .. }]));
        assert_eq!(d.session().conversation("bob").unwrap().log().len(), 2);

        let out = feed(&mut d, ":irc.example.net NOTICE me :maintenance soon");
        assert!(matches!(&out.events[..], [Event::MessageAppended { view: View::Server, .. }]));
    }

    #[test]
    fn test_own_messages_are_logged() {
        let mut d = joined("#general");
        let events = d.record_sent(&Action::PrivMsg {
            target: "#general".into(),
            text: "hello".into(),
        });
        assert!(matches!(&events[..], [Event::MessageAppended { line, .. }] if line.kind == LineKind::Own));

        d.record_sent(&Action::PrivMsg {
            target: "Bob".into(),
            text: "hi".into(),
        });
        assert!(d.session().conversation("bob").is_some());
    }

    #[test]
    fn test_kick_self() {
        let mut d = joined("#general");
        let out = feed(&mut d, ":op!o@h KICK #general me :behave");
        assert!(matches!(
            &out.events[..],
            [Event::ChannelLeft { reason: LeaveReason::Kicked { by, .. }, active: None, .. }] if by == "op"
        ));
        assert!(d.session().channel("#general").is_none());
    }

    #[test]
    fn test_topic() {
        let mut d = joined("#general");
        let out = feed(&mut d, ":srv 332 me #general :Rust talk");
        assert!(matches!(&out.events[..], [Event::TopicChanged { topic: Some(t), .. }] if t == "Rust talk"));
        assert!(feed(&mut d, ":srv 332 me #general :Rust talk").events.is_empty());
        feed(&mut d, ":bob!b@h TOPIC #general :");
        assert_eq!(d.session().channel("#general").unwrap().topic(), None);
    }

    #[test]
    fn test_unknown_input_is_informational() {
        let mut d = joined("#general");
        let before = d.snapshot();
        let out = feed(&mut d, ":srv 251 me :There are 3 users");
        assert!(matches!(&out.events[..], [Event::Info { .. }]));
        let out = feed(&mut d, ":srv FOO bar");
        assert!(matches!(&out.events[..], [Event::Info { .. }]));
        let out = feed(&mut d, ":srv 499 me :odd error");
        assert!(matches!(
            &out.events[..],
            [Event::Error(crate::ClientError::Protocol(ProtocolError::Rejected { code: 499, .. }))]
        ));
        assert_eq!(d.snapshot(), before);
    }

    #[test]
    fn test_disconnect_is_final() {
        let mut d = joined("#general");
        let events = d.disconnect(ConnectionError::Closed);
        assert!(matches!(
            &events[..],
            [Event::Disconnected { was: RegistrationState::Registered, .. }]
        ));
        assert_eq!(d.session().channels().count(), 0);
        assert_eq!(d.session().active_channel(), None);

        assert!(feed(&mut d, "PING :x").replies.is_empty());
        assert!(feed(&mut d, ":bob!b@h PRIVMSG me :hi").events.is_empty());
        assert!(d.record_sent(&Action::Join("#x".into())).is_empty());
        assert!(d.disconnect(ConnectionError::Closed).is_empty());
    }
}
