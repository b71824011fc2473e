//! Line-mode terminal front end.

use std::io::{self, Write};

use slirc_client::state::ChannelState;
use slirc_client::{Event, LeaveReason, LineKind, SessionSnapshot, Ui, View};

/// Prints events to stdout, one per line.
pub struct TerminalUi {
    out: io::Stdout,
    last: Option<SessionSnapshot>,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            last: None,
        }
    }

    fn line(&mut self, text: &str) {
        let mut out = self.out.lock();
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }
}

fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::Connected { server } => format!("-- connected to {}", server),
        Event::Registering { nickname } => format!("-- registering as {}", nickname),
        Event::Registered { nickname } => {
            format!("-- registered as {}; /join #channel to start", nickname)
        }
        Event::NicknameChanged { old, new, own } => {
            if *own {
                format!("-- you are now known as {}", new)
            } else {
                format!("-- {} is now known as {}", old, new)
            }
        }
        Event::ChannelRequested { channel } => format!("-- joining {}...", channel),
        Event::ChannelJoined { channel, active } => {
            if *active {
                format!("-- joined {} (active)", channel)
            } else {
                format!("-- joined {}; /switch {} to talk there", channel, channel)
            }
        }
        Event::ChannelLeft {
            channel,
            reason,
            active,
        } => {
            let why = match reason {
                LeaveReason::Parted => "left".to_owned(),
                LeaveReason::Kicked { by, reason } => match reason {
                    Some(reason) => format!("kicked by {} ({})", by, reason),
                    None => format!("kicked by {}", by),
                },
                LeaveReason::Refused(err) => err.to_string(),
            };
            match active {
                Some(active) => format!("-- {}: {}; now in {}", channel, why, active),
                None => format!("-- {}: {}", channel, why),
            }
        }
        Event::ActiveChannelChanged { channel } => format!("-- now talking in {}", channel),
        Event::MemberJoined { channel, nick } => format!("[{}] -> {} joined", channel, nick),
        Event::MemberLeft {
            channel,
            nick,
            reason,
        } => match reason {
            Some(reason) => format!("[{}] <- {} left ({})", channel, nick, reason),
            None => format!("[{}] <- {} left", channel, nick),
        },
        Event::MemberQuit { nick, reason, .. } => match reason {
            Some(reason) => format!("<- {} quit ({})", nick, reason),
            None => format!("<- {} quit", nick),
        },
        Event::MembersReplaced { channel, members } => {
            format!("[{}] members: {}", channel, members.join(" "))
        }
        Event::TopicChanged { channel, topic } => match topic {
            Some(topic) => format!("[{}] topic: {}", channel, topic),
            None => format!("[{}] no topic", channel),
        },
        Event::MessageAppended { view, line, .. } => {
            let stamp = line.timestamp.format("%H:%M");
            match (view, line.kind) {
                (View::Server, _) => format!("{} -{}- {}", stamp, line.sender, line.text),
                (_, LineKind::Notice) => {
                    format!("{} [{}] -{}- {}", stamp, view.label(), line.sender, line.text)
                }
                (View::Private(peer), LineKind::Own) => {
                    format!("{} [{}] -> {}", stamp, peer, line.text)
                }
                _ => format!("{} [{}] <{}> {}", stamp, view.label(), line.sender, line.text),
            }
        }
        Event::Info { text } => format!("* {}", text),
        Event::Error(err) => format!("!! {}", err),
        Event::Disconnected { reason, .. } => format!("-- disconnected: {}", reason),
        _ => return None,
    };
    Some(text)
}

impl Ui for TerminalUi {
    fn render(&mut self, event: &Event) {
        if let Some(text) = describe(event) {
            self.line(&text);
        }
    }

    fn present(&mut self, snapshot: &SessionSnapshot) {
        let changed = self.last.as_ref().map_or(true, |last| {
            last.active != snapshot.active
                || last.channels.len() != snapshot.channels.len()
                || last
                    .channels
                    .iter()
                    .zip(&snapshot.channels)
                    .any(|(a, b)| a.name != b.name || a.state != b.state)
        });
        if changed && !snapshot.channels.is_empty() {
            let list: Vec<String> = snapshot
                .channels
                .iter()
                .map(|chan| {
                    let marker = match chan.state {
                        ChannelState::Requested => "?",
                        ChannelState::Joined
                            if snapshot.active.as_deref() == Some(chan.name.as_str()) =>
                        {
                            "*"
                        }
                        ChannelState::Joined => "",
                    };
                    format!("{}{} ({})", chan.name, marker, chan.members.len())
                })
                .collect();
            self.line(&format!("== {} | {}", snapshot.nickname, list.join(", ")));
        }
        self.last = Some(snapshot.clone());
    }
}
