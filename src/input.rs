//! User command interpreter.
//!
//! Turns one typed line into an [`Action`]. Lines starting with `/` are
//! commands; anything else is a message to the active channel. `//text`
//! sends `/text` literally. The interpreter only reads the session.

use crate::action::Action;
use crate::error::InputError;
use crate::state::Session;
use crate::validation::{validate_channel_name, validate_nickname};

/// One entry of the command grammar.
#[derive(Clone, Copy, Debug)]
struct CommandSpec {
    name: &'static str,
    aliases: &'static [&'static str],
    min: usize,
    /// `None` when the last argument takes the rest of the line.
    max: Option<usize>,
    usage: &'static str,
}

/// Grammar table.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "join",
        aliases: &["j"],
        min: 1,
        max: Some(1),
        usage: "/join <#channel>",
    },
    CommandSpec {
        name: "part",
        aliases: &["leave"],
        min: 0,
        max: Some(1),
        usage: "/part [#channel]",
    },
    CommandSpec {
        name: "switch",
        aliases: &["sw"],
        min: 1,
        max: Some(1),
        usage: "/switch <#channel>",
    },
    CommandSpec {
        name: "whisp",
        aliases: &["msg"],
        min: 2,
        max: None,
        usage: "/whisp <nick> <message>",
    },
    CommandSpec {
        name: "nick",
        aliases: &[],
        min: 1,
        max: Some(1),
        usage: "/nick <nickname>",
    },
    CommandSpec {
        name: "names",
        aliases: &[],
        min: 0,
        max: Some(1),
        usage: "/names [#channel]",
    },
    CommandSpec {
        name: "quit",
        aliases: &["exit"],
        min: 0,
        max: None,
        usage: "/quit [reason]",
    },
];

fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| {
        spec.name.eq_ignore_ascii_case(name)
            || spec.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    })
}

/// Usage strings for every command, for help output.
pub fn usage() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|spec| spec.usage)
}

/// Split off the first whitespace-delimited word.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], &s[end..])),
        None => Some((s, "")),
    }
}

/// Arguments of one command. With an unbounded maximum, the argument at
/// index `min - 1` (or the only one, for `min == 0`) takes the rest of the
/// line verbatim.
fn split_args<'a>(spec: &CommandSpec, mut rest: &'a str) -> Result<Vec<&'a str>, InputError> {
    let mut args = Vec::new();
    loop {
        let greedy = spec.max.is_none() && args.len() + 1 >= spec.min.max(1);
        if greedy {
            let tail = rest.trim();
            if !tail.is_empty() {
                args.push(tail);
            }
            break;
        }
        match next_word(rest) {
            Some((word, tail)) => {
                args.push(word);
                rest = tail;
            }
            None => break,
        }
    }

    if args.len() < spec.min {
        return Err(InputError::NotEnoughArguments {
            command: spec.name,
            expected: spec.min,
            got: args.len(),
            usage: spec.usage,
        });
    }
    if let Some(max) = spec.max {
        if args.len() > max {
            return Err(InputError::TooManyArguments {
                command: spec.name,
                expected: max,
                got: args.len(),
                usage: spec.usage,
            });
        }
    }
    Ok(args)
}

fn channel_arg(name: &str) -> Result<String, InputError> {
    validate_channel_name(name).map_err(|cause| InputError::InvalidChannel {
        name: name.to_owned(),
        cause,
    })?;
    Ok(name.to_owned())
}

fn channel_or_active(arg: Option<&str>, session: &Session) -> Result<String, InputError> {
    match arg {
        Some(name) => channel_arg(name),
        None => session
            .active_channel()
            .map(str::to_owned)
            .ok_or(InputError::NoActiveChannel),
    }
}

fn message_to_active(text: &str, session: &Session) -> Result<Action, InputError> {
    if text.is_empty() {
        return Err(InputError::EmptyLine);
    }
    let target = session.active_channel().ok_or(InputError::NoActiveChannel)?;
    Ok(Action::PrivMsg {
        target: target.to_owned(),
        text: text.to_owned(),
    })
}

/// Interpret one line of user input.
///
/// ```
/// use slirc_client::{interpret, Action, Session};
///
/// let session = Session::new("me", "me");
/// assert_eq!(
///     interpret("/whisp Bob Hello there", &session),
///     Ok(Action::PrivMsg { target: "Bob".into(), text: "Hello there".into() })
/// );
/// assert!(interpret("hello", &session).is_err()); // no active channel
/// ```
pub fn interpret(line: &str, session: &Session) -> Result<Action, InputError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(body) = line.strip_prefix('/') else {
        return message_to_active(line, session);
    };
    if body.starts_with('/') {
        return message_to_active(body, session);
    }

    // "/ foo" has no command name.
    if body.starts_with(char::is_whitespace) {
        return Err(InputError::UnknownCommand(String::new()));
    }
    let Some((name, rest)) = next_word(body) else {
        return Err(InputError::UnknownCommand(String::new()));
    };
    let spec = lookup(name).ok_or_else(|| InputError::UnknownCommand(name.to_owned()))?;
    let args = split_args(spec, rest)?;

    match spec.name {
        "join" => Ok(Action::Join(channel_arg(args[0])?)),
        "part" => Ok(Action::Part(channel_or_active(args.first().copied(), session)?)),
        "switch" => {
            let channel = channel_arg(args[0])?;
            match session.channel(&channel) {
                Some(chan) if chan.is_joined() => Ok(Action::Switch(chan.name().to_owned())),
                _ => Err(InputError::NotJoined(channel)),
            }
        }
        "whisp" => {
            validate_nickname(args[0]).map_err(|cause| InputError::InvalidNickname {
                nick: args[0].to_owned(),
                cause,
            })?;
            Ok(Action::PrivMsg {
                target: args[0].to_owned(),
                text: args[1].to_owned(),
            })
        }
        "nick" => {
            validate_nickname(args[0]).map_err(|cause| InputError::InvalidNickname {
                nick: args[0].to_owned(),
                cause,
            })?;
            Ok(Action::Nick(args[0].to_owned()))
        }
        "names" => Ok(Action::Names(channel_or_active(args.first().copied(), session)?)),
        "quit" => Ok(Action::Quit(args.first().map(|s| (*s).to_owned()))),
        other => Err(InputError::UnknownCommand(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use crate::{ClientConfig, Dispatcher, Message};

    fn session_in(channels: &[&str]) -> Dispatcher {
        let config = ClientConfig::new("localhost", 6667, "me");
        let mut d = Dispatcher::new(&config);
        d.record_sent(&config.register_action());
        d.dispatch(&":srv 001 me :hi".parse::<Message>().unwrap());
        for channel in channels {
            d.record_sent(&Action::Join((*channel).into()));
            d.dispatch(&format!(":me!u@h JOIN {}", channel).parse::<Message>().unwrap());
        }
        d
    }

    #[test]
    fn test_join() {
        let session = Session::new("me", "me");
        assert_eq!(
            interpret("/join #general", &session),
            Ok(Action::Join("#general".into()))
        );
        assert_eq!(
            interpret("/JOIN #general", &session),
            Ok(Action::Join("#general".into()))
        );
        assert!(matches!(
            interpret("/join", &session),
            Err(InputError::NotEnoughArguments { command: "join", expected: 1, got: 0, .. })
        ));
        assert!(matches!(
            interpret("/join #a #b", &session),
            Err(InputError::TooManyArguments { command: "join", got: 2, .. })
        ));
        assert_eq!(
            interpret("/join general", &session),
            Err(InputError::InvalidChannel {
                name: "general".into(),
                cause: ValidationError::MissingPrefix
            })
        );
    }

    #[test]
    fn test_part_and_names_default_to_active() {
        let session = Session::new("me", "me");
        assert_eq!(interpret("/part", &session), Err(InputError::NoActiveChannel));

        let d = session_in(&["#general"]);
        assert_eq!(
            interpret("/part", d.session()),
            Ok(Action::Part("#general".into()))
        );
        assert_eq!(
            interpret("/part #other", d.session()),
            Ok(Action::Part("#other".into()))
        );
        assert_eq!(
            interpret("/names", d.session()),
            Ok(Action::Names("#general".into()))
        );
    }

    #[test]
    fn test_switch_requires_joined_channel() {
        let d = session_in(&["#general", "#rust"]);
        assert_eq!(
            interpret("/switch #RUST", d.session()),
            Ok(Action::Switch("#rust".into()))
        );
        assert_eq!(
            interpret("/switch #missing", d.session()),
            Err(InputError::NotJoined("#missing".into()))
        );
    }

    #[test]
    fn test_whisp_takes_rest_of_line() {
        let session = Session::new("me", "me");
        assert_eq!(
            interpret("/whisp Bob Hello", &session),
            Ok(Action::PrivMsg {
                target: "Bob".into(),
                text: "Hello".into()
            })
        );
        assert_eq!(
            interpret("/msg Bob   two  spaced words ", &session),
            Ok(Action::PrivMsg {
                target: "Bob".into(),
                text: "two  spaced words".into()
            })
        );
        assert!(matches!(
            interpret("/whisp Bob", &session),
            Err(InputError::NotEnoughArguments { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            interpret("/whisp #chan hi", &session),
            Err(InputError::InvalidNickname { .. })
        ));
    }

    #[test]
    fn test_quit_and_nick() {
        let session = Session::new("me", "me");
        assert_eq!(interpret("/quit", &session), Ok(Action::Quit(None)));
        assert_eq!(
            interpret("/quit see you all", &session),
            Ok(Action::Quit(Some("see you all".into())))
        );
        assert_eq!(interpret("/nick other", &session), Ok(Action::Nick("other".into())));
        assert!(matches!(
            interpret("/nick 1bad", &session),
            Err(InputError::InvalidNickname { .. })
        ));
    }

    #[test]
    fn test_plain_text_and_escapes() {
        let session = Session::new("me", "me");
        assert_eq!(interpret("hello", &session), Err(InputError::NoActiveChannel));

        let d = session_in(&["#general"]);
        assert_eq!(
            interpret("hello world", d.session()),
            Ok(Action::PrivMsg {
                target: "#general".into(),
                text: "hello world".into()
            })
        );
        assert_eq!(
            interpret("//shrug", d.session()),
            Ok(Action::PrivMsg {
                target: "#general".into(),
                text: "/shrug".into()
            })
        );
        assert_eq!(interpret("", d.session()), Err(InputError::EmptyLine));
    }

    #[test]
    fn test_unknown_command() {
        let session = Session::new("me", "me");
        assert_eq!(
            interpret("/frobnicate x", &session),
            Err(InputError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(
            interpret("/", &session),
            Err(InputError::UnknownCommand(String::new()))
        );
    }
}
